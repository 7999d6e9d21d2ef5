//! Wire types for the appliance REST API.
//!
//! Every collection endpoint is paginated server side; [`Page`] accepts both
//! the paginated envelope and a bare JSON array.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Paginated collection envelope
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Page<T> {
    Paginated {
        #[serde(default)]
        count: Option<u64>,
        results: Vec<T>,
    },
    Bare(Vec<T>),
}

impl<T> Page<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Page::Paginated { results, .. } => results,
            Page::Bare(items) => items,
        }
    }
}

/// A Rock-on as returned by the add-on collection
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Rockon {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub website: Option<String>,
    /// Lifecycle state: available, installed, install_failed, pending_install, pending_uninstall
    pub state: String,
    /// Runtime status: stopped, started, pending_start, pending_stop
    pub status: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub https: bool,
    #[serde(default)]
    pub ui: bool,
    #[serde(default)]
    pub ui_port: Option<u16>,
    #[serde(default)]
    pub ui_publish: bool,
    #[serde(default)]
    pub volume_add_support: bool,
    #[serde(default)]
    pub more_info: Option<String>,
    #[serde(default)]
    pub host_network: bool,
}

impl Rockon {
    pub fn is_pending(&self) -> bool {
        self.state.contains("pending") || self.status.contains("pending")
    }

    pub fn is_installed(&self) -> bool {
        self.state == "installed"
    }

    pub fn is_started(&self) -> bool {
        self.status == "started"
    }

    /// Whether the add-on belongs on the installed tab
    pub fn on_installed_tab(&self) -> bool {
        self.state == "installed" || self.state.contains("pending")
    }

    /// Whether the add-on belongs on the available tab
    pub fn on_available_tab(&self) -> bool {
        self.state == "available" || self.state == "install_failed"
    }

    pub fn install_failed(&self) -> bool {
        self.state == "install_failed"
    }

    /// Progress text for an add-on with backend work in flight
    pub fn pending_label(&self) -> Option<&'static str> {
        if !self.is_pending() {
            return None;
        }
        let text = if self.state == "pending_uninstall" {
            "Uninstalling ..."
        } else if self.status == "pending_start" {
            "Starting ..."
        } else if self.status == "pending_stop" {
            "Stopping ..."
        } else {
            "Installing ..."
        };
        Some(text)
    }

    /// Web UI address on the given appliance host, if the add-on has one
    pub fn ui_link(&self, host: &str) -> Option<String> {
        if !self.ui {
            return None;
        }
        let protocol = if self.https { "https://" } else { "http://" };
        let mut link = format!("{protocol}{host}");
        if let Some(port) = self.ui_port {
            link.push_str(&format!(":{port}"));
        }
        if let Some(path) = self.link.as_deref().filter(|p| !p.is_empty()) {
            link.push('/');
            link.push_str(path);
        }
        Some(link)
    }
}

/// Container volume that can be backed by a share
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Volume {
    pub id: i64,
    pub dest_dir: String,
    #[serde(default)]
    pub share_name: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Port {
    pub id: i64,
    pub hostp: u16,
    pub containerp: u16,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_publish")]
    pub publish: bool,
}

fn default_publish() -> bool {
    true
}

/// Keyed configuration value; shared shape for custom config and environment
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct KeyValue {
    pub id: i64,
    pub key: String,
    #[serde(default)]
    pub val: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl KeyValue {
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Device {
    pub id: i64,
    pub dev: String,
    #[serde(default)]
    pub val: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ContainerLabel {
    pub id: i64,
    #[serde(default)]
    pub container_name: Option<String>,
    pub key: String,
    #[serde(default)]
    pub val: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Container {
    pub id: i64,
    pub name: String,
}

/// Network attached to one container of a Rock-on (a "rocknet")
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Rocknet {
    pub id: i64,
    pub container_name: String,
    pub docker_name: String,
}

/// Appliance network connection; only user-defined docker networks can be
/// attached to containers
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NetworkConnection {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub docker_name: Option<String>,
    #[serde(default)]
    pub user_dnet: bool,
}

impl NetworkConnection {
    pub fn attach_name(&self) -> &str {
        self.docker_name.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Share {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServiceStatus {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: bool,
}

/// Body of `POST /api/rockons/{id}/install`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InstallRequest {
    /// host port -> container port
    pub ports: BTreeMap<String, String>,
    /// share name -> container directory
    pub shares: BTreeMap<String, String>,
    /// custom config key -> value
    pub cc: BTreeMap<String, String>,
    /// device variable -> host device path
    pub devices: BTreeMap<String, String>,
    /// environment key -> value
    pub environment: BTreeMap<String, String>,
}

/// Body of `POST /api/rockons/{id}/update`; empty members are omitted
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateRequest {
    /// container directory -> share name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub shares: BTreeMap<String, String>,
    /// label -> container name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// port id -> "checked" | "unchecked"
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub edit_ports: BTreeMap<String, String>,
    /// container name -> attached networks
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub cnets: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_mode: Option<String>,
}

impl UpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
            && self.labels.is_empty()
            && self.edit_ports.is_empty()
            && self.cnets.is_empty()
            && self.update_mode.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rockon(state: &str, status: &str) -> Rockon {
        Rockon {
            id: 1,
            name: "Plex".to_string(),
            description: String::new(),
            website: None,
            state: state.to_string(),
            status: status.to_string(),
            link: None,
            https: false,
            ui: false,
            ui_port: None,
            ui_publish: false,
            volume_add_support: false,
            more_info: None,
            host_network: false,
        }
    }

    #[test]
    fn pending_label_prefers_uninstall_then_status() {
        assert_eq!(rockon("pending_uninstall", "stopped").pending_label(), Some("Uninstalling ..."));
        assert_eq!(rockon("installed", "pending_start").pending_label(), Some("Starting ..."));
        assert_eq!(rockon("installed", "pending_stop").pending_label(), Some("Stopping ..."));
        assert_eq!(rockon("pending_install", "stopped").pending_label(), Some("Installing ..."));
        assert_eq!(rockon("installed", "started").pending_label(), None);
    }

    #[test]
    fn ui_link_includes_port_and_path() {
        let mut r = rockon("installed", "started");
        assert_eq!(r.ui_link("nas.local"), None);

        r.ui = true;
        assert_eq!(r.ui_link("nas.local").as_deref(), Some("http://nas.local"));

        r.https = true;
        r.ui_port = Some(32400);
        r.link = Some("web".to_string());
        assert_eq!(r.ui_link("nas.local").as_deref(), Some("https://nas.local:32400/web"));
    }

    #[test]
    fn tabs_partition_by_state() {
        assert!(rockon("pending_install", "stopped").on_installed_tab());
        assert!(rockon("installed", "stopped").on_installed_tab());
        assert!(!rockon("available", "stopped").on_installed_tab());
        assert!(rockon("install_failed", "stopped").on_available_tab());
        assert!(!rockon("pending_uninstall", "stopped").on_available_tab());
    }

    #[test]
    fn page_accepts_envelope_and_array() {
        let paged: Page<Share> =
            serde_json::from_str(r#"{"count":1,"results":[{"id":3,"name":"media"}]}"#).unwrap();
        assert_eq!(paged.into_items().len(), 1);

        let bare: Page<Share> = serde_json::from_str(r#"[{"id":3,"name":"media"}]"#).unwrap();
        assert_eq!(bare.into_items()[0].name, "media");
    }

    #[test]
    fn update_request_omits_empty_members() {
        let mut req = UpdateRequest::default();
        req.labels.insert("web".to_string(), "plex".to_string());
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({"labels": {"web": "plex"}}));
    }
}
