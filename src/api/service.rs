use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::client::RockonClient;
use super::dryrun::DemoAppliance;
use super::models::{
    Container, ContainerLabel, Device, InstallRequest, KeyValue, NetworkConnection, Port,
    Rocknet, Rockon, ServiceStatus, Share, UpdateRequest, Volume,
};
use crate::error::Result;

/// Which prerequisite collections a wizard needs before its steps are known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrerequisiteSet {
    /// volumes, ports, devices, custom config, environment, shares
    Install,
    /// everything the install wizard needs plus labels, containers and networks
    Settings,
    /// nothing beyond the add-on itself
    Info,
}

/// Collections fetched for one add-on before a wizard computes its steps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prerequisites {
    pub volumes: Vec<Volume>,
    pub ports: Vec<Port>,
    pub custom_config: Vec<KeyValue>,
    pub devices: Vec<Device>,
    pub environment: Vec<KeyValue>,
    pub shares: Vec<Share>,
    pub labels: Vec<ContainerLabel>,
    pub containers: Vec<Container>,
    pub rocknets: Vec<Rocknet>,
    pub networks: Vec<NetworkConnection>,
}

/// Trait abstracting the appliance backend
#[async_trait]
pub trait RockonService: Send + Sync {
    /// Host used to build add-on UI links
    fn host(&self) -> String;

    // Query methods
    async fn list_rockons(&self) -> Result<Vec<Rockon>>;
    async fn docker_status(&self) -> Result<ServiceStatus>;
    async fn load_prerequisites(&self, rid: i64, set: PrerequisiteSet) -> Result<Prerequisites>;

    // Mutating methods
    async fn install(&self, rid: i64, request: &InstallRequest) -> Result<()>;
    async fn uninstall(&self, rid: i64) -> Result<()>;
    async fn start(&self, rid: i64) -> Result<()>;
    async fn stop(&self, rid: i64) -> Result<()>;
    async fn update_catalog(&self) -> Result<()>;
    async fn update(&self, rid: i64, request: &UpdateRequest) -> Result<()>;
}

/// Live service talking to the appliance over HTTP
pub struct LiveService {
    client: RockonClient,
}

impl LiveService {
    pub fn new(client: RockonClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RockonService for LiveService {
    fn host(&self) -> String {
        self.client.host()
    }

    async fn list_rockons(&self) -> Result<Vec<Rockon>> {
        self.client.list_rockons().await
    }

    async fn docker_status(&self) -> Result<ServiceStatus> {
        self.client.docker_status().await
    }

    async fn load_prerequisites(&self, rid: i64, set: PrerequisiteSet) -> Result<Prerequisites> {
        if set == PrerequisiteSet::Info {
            return Ok(Prerequisites::default());
        }

        debug!("Loading {:?} prerequisites for rock-on {}", set, rid);
        let c = &self.client;
        let (volumes, ports, devices, custom_config, environment, shares) = futures::try_join!(
            c.volumes(rid),
            c.ports(rid),
            c.devices(rid),
            c.custom_config(rid),
            c.environment(rid),
            c.shares(),
        )?;

        let mut prereqs = Prerequisites {
            volumes,
            ports,
            custom_config,
            devices,
            environment,
            shares,
            ..Prerequisites::default()
        };

        if set == PrerequisiteSet::Settings {
            let (labels, containers, rocknets, networks) = futures::try_join!(
                c.labels(rid),
                c.containers(rid),
                c.rocknets(rid),
                c.network_connections(),
            )?;
            prereqs.labels = labels;
            prereqs.containers = containers;
            prereqs.rocknets = rocknets;
            prereqs.networks = networks;
        }

        Ok(prereqs)
    }

    async fn install(&self, rid: i64, request: &InstallRequest) -> Result<()> {
        info!("Installing rock-on {}", rid);
        self.client.install(rid, request).await
    }

    async fn uninstall(&self, rid: i64) -> Result<()> {
        info!("Uninstalling rock-on {}", rid);
        self.client.uninstall(rid).await
    }

    async fn start(&self, rid: i64) -> Result<()> {
        info!("Starting rock-on {}", rid);
        self.client.start(rid).await
    }

    async fn stop(&self, rid: i64) -> Result<()> {
        info!("Stopping rock-on {}", rid);
        self.client.stop(rid).await
    }

    async fn update_catalog(&self) -> Result<()> {
        info!("Refreshing rock-on catalog");
        self.client.update_catalog().await
    }

    async fn update(&self, rid: i64, request: &UpdateRequest) -> Result<()> {
        info!("Updating rock-on {} settings", rid);
        self.client.update(rid, request).await
    }
}

/// Dryrun service backed by an in-memory demo appliance
pub struct DryrunService {
    appliance: DemoAppliance,
}

impl DryrunService {
    pub fn new() -> Self {
        Self {
            appliance: DemoAppliance::new(),
        }
    }
}

impl Default for DryrunService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RockonService for DryrunService {
    fn host(&self) -> String {
        "localhost".to_string()
    }

    async fn list_rockons(&self) -> Result<Vec<Rockon>> {
        Ok(self.appliance.poll())
    }

    async fn docker_status(&self) -> Result<ServiceStatus> {
        Ok(ServiceStatus {
            name: Some("docker".to_string()),
            status: true,
        })
    }

    async fn load_prerequisites(&self, rid: i64, set: PrerequisiteSet) -> Result<Prerequisites> {
        self.appliance.prerequisites(rid, set)
    }

    async fn install(&self, rid: i64, _request: &InstallRequest) -> Result<()> {
        self.appliance.transition(rid, "pending_install", None)
    }

    async fn uninstall(&self, rid: i64) -> Result<()> {
        self.appliance.transition(rid, "pending_uninstall", None)
    }

    async fn start(&self, rid: i64) -> Result<()> {
        self.appliance.transition(rid, "installed", Some("pending_start"))
    }

    async fn stop(&self, rid: i64) -> Result<()> {
        self.appliance.transition(rid, "installed", Some("pending_stop"))
    }

    async fn update_catalog(&self) -> Result<()> {
        Ok(())
    }

    async fn update(&self, rid: i64, request: &UpdateRequest) -> Result<()> {
        self.appliance.apply_update(rid, request)
    }
}

/// Create the appropriate service based on dryrun mode
pub fn create_service(dryrun: bool, client: Option<RockonClient>) -> Arc<dyn RockonService> {
    match (dryrun, client) {
        (false, Some(client)) => Arc::new(LiveService::new(client)),
        _ => Arc::new(DryrunService::new()),
    }
}
