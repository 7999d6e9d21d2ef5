use std::collections::{BTreeMap, BTreeSet};

use crate::api::models::{InstallRequest, Port, Rockon, UpdateRequest};
use crate::api::Prerequisites;

/// Upper bound on label inputs shown on the add-label page
pub const MAX_LABEL_FIELDS: usize = 10;
pub const MAX_LABELS_MESSAGE: &str = "Maximum number of labels reached.";

/// How the backend applies a port/network change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Containers are recreated
    Normal,
    /// Networks are attached or detached on running containers
    Live,
}

impl UpdateMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateMode::Normal => "normal",
            UpdateMode::Live => "live",
        }
    }
}

/// Everything one wizard run accumulates. Created when the wizard opens and
/// dropped when it closes.
#[derive(Debug, Clone)]
pub struct WizardSession {
    pub rockon: Rockon,
    pub prereqs: Prerequisites,

    // Install answers
    /// share name -> container directory
    pub share_map: BTreeMap<String, String>,
    /// host port -> container port
    pub port_map: BTreeMap<String, String>,
    pub cc_map: BTreeMap<String, String>,
    /// device variable -> host device path
    pub dev_map: BTreeMap<String, String>,
    pub env_map: BTreeMap<String, String>,

    // Settings answers
    /// container directory -> share name
    pub new_shares: BTreeMap<String, String>,
    /// (container directory, share) last saved by the add-storage page
    pub pending_share: Option<(String, String)>,
    /// (label, container name) in the order typed
    pub new_labels: Vec<(String, String)>,
    /// port id -> "checked" | "unchecked"
    pub edit_ports: BTreeMap<String, String>,
    /// container name -> networks it should be attached to
    pub new_cnets: BTreeMap<String, Vec<String>>,
    pub update_mode: Option<UpdateMode>,

    /// Label inputs currently shown on the add-label page
    pub label_field_count: usize,
}

impl WizardSession {
    pub fn new(rockon: Rockon, prereqs: Prerequisites) -> Self {
        Self {
            rockon,
            prereqs,
            share_map: BTreeMap::new(),
            port_map: BTreeMap::new(),
            cc_map: BTreeMap::new(),
            dev_map: BTreeMap::new(),
            env_map: BTreeMap::new(),
            new_shares: BTreeMap::new(),
            pending_share: None,
            new_labels: Vec::new(),
            edit_ports: BTreeMap::new(),
            new_cnets: BTreeMap::new(),
            update_mode: None,
            label_field_count: 1,
        }
    }

    pub fn install_request(&self) -> InstallRequest {
        InstallRequest {
            ports: self.port_map.clone(),
            shares: self.share_map.clone(),
            cc: self.cc_map.clone(),
            devices: self.dev_map.clone(),
            environment: self.env_map.clone(),
        }
    }

    pub fn update_request(&self) -> UpdateRequest {
        UpdateRequest {
            shares: self.new_shares.clone(),
            labels: self.new_labels.iter().cloned().collect(),
            edit_ports: self.edit_ports.clone(),
            cnets: self.new_cnets.clone(),
            update_mode: self.update_mode.map(|m| m.as_str().to_string()),
        }
    }

    /// Publish state of a port, preferring an edit made in this run
    pub fn port_published(&self, port: &Port) -> bool {
        match self.edit_ports.get(&port.id.to_string()).map(String::as_str) {
            Some("checked") => true,
            Some("unchecked") => false,
            _ => port.publish,
        }
    }

    /// Persisted publish state of every port keyed by port id
    pub fn persisted_publish_map(&self) -> BTreeMap<String, String> {
        self.prereqs
            .ports
            .iter()
            .map(|p| (p.id.to_string(), publish_value(p.publish).to_string()))
            .collect()
    }

    /// Persisted network attachments, one entry per container
    pub fn persisted_networks(&self) -> BTreeMap<String, BTreeSet<String>> {
        let mut nets: BTreeMap<String, BTreeSet<String>> = self
            .prereqs
            .containers
            .iter()
            .map(|c| (c.name.clone(), BTreeSet::new()))
            .collect();
        for rocknet in &self.prereqs.rocknets {
            nets.entry(rocknet.container_name.clone())
                .or_default()
                .insert(rocknet.docker_name.clone());
        }
        nets
    }

    /// Networks currently shown for a container: pending edits first, then
    /// what the backend reports
    pub fn container_networks(&self, container: &str) -> Vec<String> {
        if let Some(nets) = self.new_cnets.get(container) {
            return nets.clone();
        }
        self.prereqs
            .rocknets
            .iter()
            .filter(|r| r.container_name == container)
            .map(|r| r.docker_name.clone())
            .collect()
    }

    /// Shares already backing a volume of this add-on, persisted or pending
    pub fn used_shares(&self) -> BTreeSet<String> {
        self.prereqs
            .volumes
            .iter()
            .filter_map(|v| v.share_name.clone())
            .chain(self.new_shares.values().cloned())
            .collect()
    }

    /// Shares that can still be attached as new storage
    pub fn free_shares(&self) -> Vec<String> {
        self.shares_unused_except(None)
    }

    /// Shares the add-storage page offers: the free ones plus its own
    /// earlier answer, so revisiting the page never needs a new pick
    pub fn add_page_shares(&self) -> Vec<String> {
        let own = self.pending_share.as_ref().map(|(_, share)| share.as_str());
        self.shares_unused_except(own)
    }

    fn shares_unused_except(&self, keep: Option<&str>) -> Vec<String> {
        let used = self.used_shares();
        self.prereqs
            .shares
            .iter()
            .map(|s| s.name.clone())
            .filter(|name| keep == Some(name.as_str()) || !used.contains(name))
            .collect()
    }

    /// Record the add-storage answer, replacing the one saved before it
    pub fn replace_pending_share(&mut self, path: String, share: String) {
        if let Some((old_path, _)) = self.pending_share.take() {
            self.new_shares.remove(&old_path);
        }
        self.new_shares.insert(path.clone(), share.clone());
        self.pending_share = Some((path, share));
    }

    /// Networks a container can be attached to
    pub fn attachable_networks(&self) -> Vec<String> {
        self.prereqs
            .networks
            .iter()
            .filter(|n| n.user_dnet)
            .map(|n| n.attach_name().to_string())
            .collect()
    }

    pub fn add_label_field(&mut self) -> Result<(), &'static str> {
        if self.label_field_count >= MAX_LABEL_FIELDS {
            return Err(MAX_LABELS_MESSAGE);
        }
        self.label_field_count += 1;
        Ok(())
    }

    pub fn remove_label_field(&mut self) -> bool {
        if self.label_field_count > 1 {
            self.label_field_count -= 1;
            true
        } else {
            false
        }
    }
}

pub fn publish_value(published: bool) -> &'static str {
    if published {
        "checked"
    } else {
        "unchecked"
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::models::{Container, Rocknet, Share, Volume};

    pub(crate) fn rockon(volume_add_support: bool) -> Rockon {
        Rockon {
            id: 7,
            name: "Syncthing".to_string(),
            description: String::new(),
            website: None,
            state: "installed".to_string(),
            status: "stopped".to_string(),
            link: None,
            https: false,
            ui: true,
            ui_port: Some(8384),
            ui_publish: true,
            volume_add_support,
            more_info: None,
            host_network: false,
        }
    }

    pub(crate) fn prereqs() -> Prerequisites {
        Prerequisites {
            volumes: vec![Volume {
                id: 1,
                dest_dir: "/var/syncthing".to_string(),
                share_name: Some("sync".to_string()),
                label: None,
                description: None,
            }],
            ports: vec![
                Port {
                    id: 10,
                    hostp: 8384,
                    containerp: 8384,
                    protocol: None,
                    label: Some("WebUI".to_string()),
                    description: None,
                    publish: true,
                },
                Port {
                    id: 11,
                    hostp: 22000,
                    containerp: 22000,
                    protocol: None,
                    label: None,
                    description: None,
                    publish: false,
                },
            ],
            shares: vec![
                Share { id: 1, name: "sync".to_string() },
                Share { id: 2, name: "media".to_string() },
            ],
            containers: vec![Container { id: 3, name: "syncthing".to_string() }],
            rocknets: vec![Rocknet {
                id: 4,
                container_name: "syncthing".to_string(),
                docker_name: "lan".to_string(),
            }],
            ..Prerequisites::default()
        }
    }

    pub(crate) fn session_for(volume_add_support: bool) -> WizardSession {
        WizardSession::new(rockon(volume_add_support), prereqs())
    }

    #[test]
    fn update_request_carries_mode_string() {
        let mut session = session_for(true);
        session.update_mode = Some(UpdateMode::Live);
        session
            .new_cnets
            .insert("syncthing".to_string(), vec!["lan".to_string()]);

        let request = session.update_request();
        assert_eq!(request.update_mode.as_deref(), Some("live"));
        assert!(request.shares.is_empty());
    }

    #[test]
    fn port_publish_prefers_pending_edit() {
        let mut session = session_for(false);
        let port = session.prereqs.ports[0].clone();
        assert!(session.port_published(&port));

        session.edit_ports.insert("10".to_string(), "unchecked".to_string());
        assert!(!session.port_published(&port));
    }

    #[test]
    fn free_shares_exclude_used_ones() {
        let mut session = session_for(true);
        assert_eq!(session.free_shares(), vec!["media".to_string()]);

        session.new_shares.insert("/media".to_string(), "media".to_string());
        assert!(session.free_shares().is_empty());
    }

    #[test]
    fn add_page_keeps_its_own_share_selectable() {
        let mut session = session_for(true);
        session.replace_pending_share("/media".to_string(), "media".to_string());
        assert!(session.free_shares().is_empty());
        assert_eq!(session.add_page_shares(), vec!["media".to_string()]);

        session.replace_pending_share("/srv/media".to_string(), "media".to_string());
        assert_eq!(session.new_shares.len(), 1);
        assert_eq!(session.new_shares["/srv/media"], "media");
    }

    #[test]
    fn update_request_sends_labels_as_a_map() {
        let mut session = session_for(false);
        session.new_labels = vec![
            ("zeta".to_string(), "syncthing".to_string()),
            ("alpha".to_string(), "syncthing".to_string()),
        ];
        let request = session.update_request();
        assert_eq!(request.labels.len(), 2);
        assert_eq!(request.labels["zeta"], "syncthing");
    }

    #[test]
    fn label_field_counter_is_bounded() {
        let mut session = session_for(false);
        for _ in 1..MAX_LABEL_FIELDS {
            session.add_label_field().unwrap();
        }
        assert_eq!(session.add_label_field(), Err(MAX_LABELS_MESSAGE));
        assert_eq!(session.label_field_count, MAX_LABEL_FIELDS);

        while session.remove_label_field() {}
        assert_eq!(session.label_field_count, 1);
    }

    #[test]
    fn persisted_networks_cover_every_container() {
        let mut session = session_for(false);
        session.prereqs.containers.push(Container { id: 5, name: "relay".to_string() });

        let nets = session.persisted_networks();
        assert_eq!(nets["syncthing"].len(), 1);
        assert!(nets["relay"].is_empty());
    }
}
