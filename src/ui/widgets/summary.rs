//! Table contents for the summary pages. Kept free of ratatui types so the
//! wording can be tested without a terminal.

use crate::api::models::KeyValue;
use crate::wizard::validation::is_secret_label;
use crate::wizard::WizardSession;

const MASK: &str = "********";

/// One titled two-column table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: &'static str,
    pub rows: Vec<(String, String)>,
}

impl Section {
    fn new(title: &'static str) -> Self {
        Self {
            title,
            rows: Vec::new(),
        }
    }

    fn row(&mut self, left: impl Into<String>, right: impl Into<String>) {
        self.rows.push((left.into(), right.into()));
    }
}

fn keyed_value(entries: &[KeyValue], key: &str, value: &str) -> String {
    let secret = entries
        .iter()
        .find(|e| e.key == key)
        .is_some_and(|e| is_secret_label(e.display_label()));
    if secret {
        MASK.to_string()
    } else {
        value.to_string()
    }
}

fn non_empty(sections: Vec<Section>) -> Vec<Section> {
    sections.into_iter().filter(|s| !s.rows.is_empty()).collect()
}

/// Answers collected by the install wizard
pub fn install_summary(session: &WizardSession) -> Vec<Section> {
    let mut shares = Section::new("Storage");
    for (share, dest) in &session.share_map {
        shares.row(dest.as_str(), share.as_str());
    }

    let mut ports = Section::new("Ports");
    for (host, container) in &session.port_map {
        ports.row(format!("host {host}"), format!("container {container}"));
    }

    let mut devices = Section::new("Devices");
    for (dev, path) in &session.dev_map {
        let shown = if path.is_empty() { "(none)" } else { path.as_str() };
        devices.row(dev.as_str(), shown);
    }

    let mut env = Section::new("Environment");
    for (key, value) in &session.env_map {
        env.row(key.as_str(), keyed_value(&session.prereqs.environment, key, value));
    }

    let mut cc = Section::new("Custom configuration");
    for (key, value) in &session.cc_map {
        cc.row(key.as_str(), keyed_value(&session.prereqs.custom_config, key, value));
    }

    non_empty(vec![shares, ports, devices, env, cc])
}

/// Current settings plus the changes queued in this run
pub fn settings_summary(session: &WizardSession) -> Vec<Section> {
    let prereqs = &session.prereqs;

    let mut storage = Section::new("Storage");
    for volume in &prereqs.volumes {
        storage.row(
            volume.dest_dir.as_str(),
            volume.share_name.as_deref().unwrap_or("-"),
        );
    }
    for (dest, share) in &session.new_shares {
        storage.row(dest.as_str(), format!("{share} (new)"));
    }

    let mut ports = Section::new("Ports");
    for port in &prereqs.ports {
        let mut mapping = format!("{} -> {}", port.hostp, port.containerp);
        if !session.port_published(port) {
            mapping.push_str(" (Unpublished)");
        }
        ports.row(port.label.clone().unwrap_or_else(|| port.containerp.to_string()), mapping);
    }

    let mut cc = Section::new("Custom configuration");
    for entry in &prereqs.custom_config {
        let value = entry.val.as_deref().unwrap_or_default();
        cc.row(entry.display_label(), keyed_value(&prereqs.custom_config, &entry.key, value));
    }

    let mut devices = Section::new("Devices");
    for device in &prereqs.devices {
        devices.row(
            device.label.as_deref().unwrap_or(&device.dev),
            device.val.as_deref().filter(|v| !v.is_empty()).unwrap_or("(none)"),
        );
    }

    let mut env = Section::new("Environment");
    for entry in &prereqs.environment {
        let value = entry.val.as_deref().unwrap_or_default();
        env.row(entry.display_label(), keyed_value(&prereqs.environment, &entry.key, value));
    }

    let mut labels = Section::new("Labels");
    for label in &prereqs.labels {
        labels.row(label.key.as_str(), label.container_name.as_deref().unwrap_or("-"));
    }
    for (label, container) in &session.new_labels {
        labels.row(format!("{label} (new)"), container.as_str());
    }

    let mut networks = Section::new("Networks");
    for container in &prereqs.containers {
        let nets = session.container_networks(&container.name);
        let mut shown = if nets.is_empty() {
            "(default)".to_string()
        } else {
            nets.join(", ")
        };
        if session.new_cnets.contains_key(&container.name) {
            shown.push_str(" (new)");
        }
        networks.row(container.name.as_str(), shown);
    }

    non_empty(vec![storage, ports, cc, devices, env, labels, networks])
}

/// Text of the final page
pub fn completion_text(session: &WizardSession, install: bool) -> String {
    let name = &session.rockon.name;
    if install {
        format!(
            "Installation of {name} has been scheduled. Follow its progress on the Installed tab."
        )
    } else {
        format!("New settings for {name} have been submitted and are being applied.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::session::tests::session_for;

    fn section<'a>(sections: &'a [Section], title: &str) -> &'a Section {
        sections.iter().find(|s| s.title == title).unwrap()
    }

    #[test]
    fn unpublished_ports_follow_pending_edits() {
        let mut session = session_for(true);
        let sections = settings_summary(&session);
        let ports = section(&sections, "Ports");
        assert_eq!(ports.rows[0], ("WebUI".to_string(), "8384 -> 8384".to_string()));
        assert_eq!(
            ports.rows[1],
            ("22000".to_string(), "22000 -> 22000 (Unpublished)".to_string())
        );

        session.edit_ports.insert("10".to_string(), "unchecked".to_string());
        session.edit_ports.insert("11".to_string(), "checked".to_string());
        let sections = settings_summary(&session);
        let ports = section(&sections, "Ports");
        assert!(ports.rows[0].1.ends_with("(Unpublished)"));
        assert!(!ports.rows[1].1.ends_with("(Unpublished)"));
    }

    #[test]
    fn settings_summary_marks_queued_changes() {
        let mut session = session_for(true);
        session.new_shares.insert("/data".to_string(), "media".to_string());
        session.new_labels.push(("backup".to_string(), "syncthing".to_string()));
        session
            .new_cnets
            .insert("syncthing".to_string(), vec!["lan".to_string(), "medianet".to_string()]);

        let sections = settings_summary(&session);
        assert!(section(&sections, "Storage")
            .rows
            .contains(&("/data".to_string(), "media (new)".to_string())));
        assert_eq!(
            section(&sections, "Labels").rows,
            vec![("backup (new)".to_string(), "syncthing".to_string())]
        );
        assert_eq!(
            section(&sections, "Networks").rows,
            vec![("syncthing".to_string(), "lan, medianet (new)".to_string())]
        );
        assert!(sections.iter().all(|s| s.title != "Devices"));
    }

    #[test]
    fn install_summary_masks_passwords() {
        let mut session = session_for(false);
        session.prereqs.custom_config = vec![KeyValue {
            id: 1,
            key: "pass".to_string(),
            val: None,
            label: Some("Admin password".to_string()),
            description: None,
        }];
        session.cc_map.insert("pass".to_string(), "hunter2".to_string());
        session.share_map.insert("sync".to_string(), "/var/syncthing".to_string());
        session.dev_map.insert("GPU".to_string(), String::new());

        let sections = install_summary(&session);
        assert_eq!(
            section(&sections, "Custom configuration").rows,
            vec![("pass".to_string(), MASK.to_string())]
        );
        assert_eq!(
            section(&sections, "Devices").rows,
            vec![("GPU".to_string(), "(none)".to_string())]
        );
        assert_eq!(
            section(&sections, "Storage").rows,
            vec![("/var/syncthing".to_string(), "sync".to_string())]
        );
    }
}
