mod client;
mod dryrun;
pub mod models;
mod service;

pub use client::RockonClient;
pub use dryrun::DemoAppliance;
pub use service::{
    create_service, DryrunService, LiveService, PrerequisiteSet, Prerequisites, RockonService,
};
