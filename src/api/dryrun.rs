use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tracing::info;

use super::models::{
    Container, ContainerLabel, Device, KeyValue, NetworkConnection, Port, Rocknet, Rockon, Share,
    UpdateRequest, Volume,
};
use super::service::{PrerequisiteSet, Prerequisites};
use crate::error::{Result, RockonError};

/// Polls a pending transition stays visible for
const PENDING_POLLS: u8 = 2;

struct DemoState {
    rockons: Vec<Rockon>,
    details: HashMap<i64, Prerequisites>,
    countdown: HashMap<i64, u8>,
    next_id: i64,
}

/// In-memory appliance used in dryrun mode
pub struct DemoAppliance {
    state: Mutex<DemoState>,
}

impl DemoAppliance {
    pub fn new() -> Self {
        let rockons = vec![
            demo_rockon(1, "Syncthing", "Continuous file synchronization.", "installed", "started", Some(8384)),
            demo_rockon(2, "Plex", "Media server for your movies and music.", "installed", "stopped", Some(32400)),
            demo_rockon(3, "Transmission", "Lightweight BitTorrent client.", "available", "stopped", Some(9091)),
            demo_rockon(4, "Nextcloud", "Self-hosted file sharing and collaboration.", "install_failed", "stopped", None),
        ];

        let mut details = HashMap::new();
        details.insert(1, syncthing_details());
        details.insert(2, plex_details());
        details.insert(3, transmission_details());
        details.insert(4, nextcloud_details());

        Self {
            state: Mutex::new(DemoState {
                rockons,
                details,
                countdown: HashMap::new(),
                next_id: 100,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DemoState> {
        // A poisoned lock only means a panic happened mid-update in a test
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Return the catalog, advancing any pending transition by one poll
    pub fn poll(&self) -> Vec<Rockon> {
        let mut guard = self.lock();
        let state = &mut *guard;

        for rockon in state.rockons.iter_mut() {
            let Some(remaining) = state.countdown.get_mut(&rockon.id) else {
                continue;
            };
            if *remaining > 0 {
                *remaining -= 1;
                continue;
            }
            state.countdown.remove(&rockon.id);
            resolve(rockon);
            info!("Demo: rock-on {} is now {}/{}", rockon.name, rockon.state, rockon.status);
        }

        state.rockons.clone()
    }

    pub fn prerequisites(&self, rid: i64, set: PrerequisiteSet) -> Result<Prerequisites> {
        let state = self.lock();
        if !state.rockons.iter().any(|r| r.id == rid) {
            return Err(RockonError::UnknownRockon(rid));
        }
        if set == PrerequisiteSet::Info {
            return Ok(Prerequisites::default());
        }

        let mut prereqs = state.details.get(&rid).cloned().unwrap_or_default();
        prereqs.shares = demo_shares();
        prereqs.networks = demo_networks();
        if set == PrerequisiteSet::Install {
            prereqs.labels.clear();
            prereqs.containers.clear();
            prereqs.rocknets.clear();
            prereqs.networks.clear();
        }
        Ok(prereqs)
    }

    /// Move a rock-on into a pending state
    pub fn transition(&self, rid: i64, state_value: &str, status_value: Option<&str>) -> Result<()> {
        let mut state = self.lock();
        let rockon = state
            .rockons
            .iter_mut()
            .find(|r| r.id == rid)
            .ok_or(RockonError::UnknownRockon(rid))?;

        rockon.state = state_value.to_string();
        if let Some(status) = status_value {
            rockon.status = status.to_string();
        }
        info!("Demo: rock-on {} -> {}/{}", rockon.name, rockon.state, rockon.status);
        state.countdown.insert(rid, PENDING_POLLS);
        Ok(())
    }

    pub fn apply_update(&self, rid: i64, request: &UpdateRequest) -> Result<()> {
        let mut guard = self.lock();
        let state = &mut *guard;
        if !state.rockons.iter().any(|r| r.id == rid) {
            return Err(RockonError::UnknownRockon(rid));
        }

        let details = state.details.entry(rid).or_default();
        for (dest_dir, share) in &request.shares {
            state.next_id += 1;
            details.volumes.push(Volume {
                id: state.next_id,
                dest_dir: dest_dir.clone(),
                share_name: Some(share.clone()),
                label: None,
                description: None,
            });
        }
        for (label, container) in &request.labels {
            state.next_id += 1;
            details.labels.push(ContainerLabel {
                id: state.next_id,
                container_name: Some(container.clone()),
                key: label.clone(),
                val: None,
            });
        }
        for port in details.ports.iter_mut() {
            if let Some(publish) = request.edit_ports.get(&port.id.to_string()) {
                port.publish = publish == "checked";
            }
        }
        if request.update_mode.is_some() {
            details.rocknets.clear();
            for (container, nets) in &request.cnets {
                for net in nets {
                    state.next_id += 1;
                    details.rocknets.push(Rocknet {
                        id: state.next_id,
                        container_name: container.clone(),
                        docker_name: net.clone(),
                    });
                }
            }
        }

        if request.update_mode.as_deref() != Some("live") {
            if let Some(rockon) = state.rockons.iter_mut().find(|r| r.id == rid) {
                rockon.state = "pending_install".to_string();
                state.countdown.insert(rid, PENDING_POLLS);
            }
        }
        Ok(())
    }
}

impl Default for DemoAppliance {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve(rockon: &mut Rockon) {
    match (rockon.state.as_str(), rockon.status.as_str()) {
        ("pending_install", _) => {
            rockon.state = "installed".to_string();
            rockon.status = "stopped".to_string();
        }
        ("pending_uninstall", _) => {
            rockon.state = "available".to_string();
            rockon.status = "stopped".to_string();
        }
        (_, "pending_start") => rockon.status = "started".to_string(),
        (_, "pending_stop") => rockon.status = "stopped".to_string(),
        _ => {}
    }
}

fn demo_rockon(
    id: i64,
    name: &str,
    description: &str,
    state: &str,
    status: &str,
    ui_port: Option<u16>,
) -> Rockon {
    Rockon {
        id,
        name: name.to_string(),
        description: description.to_string(),
        website: Some(format!("https://{}.example.org", name.to_lowercase())),
        state: state.to_string(),
        status: status.to_string(),
        link: None,
        https: false,
        ui: ui_port.is_some(),
        ui_port,
        ui_publish: true,
        volume_add_support: id != 3,
        more_info: (id == 2).then(|| "Claim your server at plex.tv/claim before first start.".to_string()),
        host_network: id == 2,
    }
}

fn port(id: i64, hostp: u16, containerp: u16, label: &str) -> Port {
    Port {
        id,
        hostp,
        containerp,
        protocol: Some("tcp".to_string()),
        label: Some(label.to_string()),
        description: None,
        publish: true,
    }
}

fn volume(id: i64, dest_dir: &str, share: Option<&str>) -> Volume {
    Volume {
        id,
        dest_dir: dest_dir.to_string(),
        share_name: share.map(str::to_string),
        label: None,
        description: Some(format!("Storage for {dest_dir}")),
    }
}

fn key_value(id: i64, key: &str, label: &str, val: Option<&str>) -> KeyValue {
    KeyValue {
        id,
        key: key.to_string(),
        val: val.map(str::to_string),
        label: Some(label.to_string()),
        description: None,
    }
}

fn syncthing_details() -> Prerequisites {
    Prerequisites {
        volumes: vec![volume(11, "/var/syncthing", Some("sync-data"))],
        ports: vec![port(12, 8384, 8384, "WebUI"), port(13, 22000, 22000, "Sync protocol")],
        containers: vec![Container { id: 14, name: "syncthing".to_string() }],
        rocknets: vec![Rocknet {
            id: 15,
            container_name: "syncthing".to_string(),
            docker_name: "lan".to_string(),
        }],
        ..Prerequisites::default()
    }
}

fn plex_details() -> Prerequisites {
    Prerequisites {
        volumes: vec![volume(21, "/config", Some("plex-config")), volume(22, "/data", Some("media"))],
        ports: vec![port(23, 32400, 32400, "WebUI")],
        environment: vec![key_value(24, "PLEX_CLAIM", "Claim token", None)],
        containers: vec![Container { id: 25, name: "plex".to_string() }],
        ..Prerequisites::default()
    }
}

fn transmission_details() -> Prerequisites {
    Prerequisites {
        volumes: vec![volume(31, "/downloads", None), volume(32, "/config", None)],
        ports: vec![port(33, 9091, 9091, "WebUI"), port(34, 51413, 51413, "Peer port")],
        custom_config: vec![
            key_value(35, "user", "WebUI username", Some("admin")),
            key_value(36, "pass", "WebUI password", None),
        ],
        containers: vec![Container { id: 37, name: "transmission".to_string() }],
        ..Prerequisites::default()
    }
}

fn nextcloud_details() -> Prerequisites {
    Prerequisites {
        volumes: vec![volume(41, "/var/www/html", None)],
        devices: vec![Device {
            id: 42,
            dev: "TRANSCODE_DEV".to_string(),
            val: None,
            label: Some("Transcoding device".to_string()),
            description: None,
        }],
        environment: vec![key_value(43, "TZ", "Timezone", Some("UTC"))],
        containers: vec![Container { id: 44, name: "nextcloud".to_string() }],
        ..Prerequisites::default()
    }
}

fn demo_shares() -> Vec<Share> {
    ["sync-data", "plex-config", "media", "downloads", "backups"]
        .iter()
        .enumerate()
        .map(|(idx, name)| Share {
            id: idx as i64 + 1,
            name: name.to_string(),
        })
        .collect()
}

fn demo_networks() -> Vec<NetworkConnection> {
    vec![
        NetworkConnection {
            id: 1,
            name: "eth0".to_string(),
            docker_name: None,
            user_dnet: false,
        },
        NetworkConnection {
            id: 2,
            name: "lan".to_string(),
            docker_name: Some("lan".to_string()),
            user_dnet: true,
        },
        NetworkConnection {
            id: 3,
            name: "media-net".to_string(),
            docker_name: Some("medianet".to_string()),
            user_dnet: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_resolves_after_pending_polls() {
        let appliance = DemoAppliance::new();
        appliance.transition(3, "pending_install", None).unwrap();

        let state_of = |rockons: Vec<Rockon>| {
            rockons.into_iter().find(|r| r.id == 3).map(|r| r.state).unwrap()
        };

        assert_eq!(state_of(appliance.poll()), "pending_install");
        assert_eq!(state_of(appliance.poll()), "pending_install");
        assert_eq!(state_of(appliance.poll()), "installed");
    }

    #[test]
    fn install_prerequisites_omit_settings_collections() {
        let appliance = DemoAppliance::new();
        let prereqs = appliance.prerequisites(1, PrerequisiteSet::Install).unwrap();
        assert!(!prereqs.ports.is_empty());
        assert!(prereqs.containers.is_empty());
        assert!(prereqs.networks.is_empty());

        let settings = appliance.prerequisites(1, PrerequisiteSet::Settings).unwrap();
        assert_eq!(settings.containers.len(), 1);
        assert!(settings.networks.iter().any(|n| n.user_dnet));
    }

    #[test]
    fn unknown_rockon_is_an_error() {
        let appliance = DemoAppliance::new();
        assert!(matches!(
            appliance.transition(999, "pending_install", None),
            Err(RockonError::UnknownRockon(999))
        ));
    }

    #[test]
    fn live_update_keeps_rockon_installed() {
        let appliance = DemoAppliance::new();
        let mut request = UpdateRequest::default();
        request.cnets.insert("syncthing".to_string(), vec!["medianet".to_string()]);
        request.update_mode = Some("live".to_string());
        appliance.apply_update(1, &request).unwrap();

        let rockons = appliance.poll();
        assert_eq!(rockons[0].state, "installed");
        let prereqs = appliance.prerequisites(1, PrerequisiteSet::Settings).unwrap();
        assert_eq!(prereqs.rocknets.len(), 1);
        assert_eq!(prereqs.rocknets[0].docker_name, "medianet");
    }
}
