//! Validate-and-save for every wizard page.
//!
//! A save checks the whole form first and only writes to the session when
//! every field passed, so a rejected page leaves the session untouched.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;
use tracing::debug;

use super::form::StepForm;
use super::session::{UpdateMode, WizardSession};
use super::steps::StepKind;
use super::validation::{self, FieldError};

pub const NOTHING_CHANGED: &str =
    "Please customize either ports or rocknets before proceeding further.";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SaveError {
    #[error("{} field(s) need attention", .0.len())]
    Invalid(Vec<FieldError>),
    #[error("{0}")]
    Rejected(String),
}

pub fn save(step: StepKind, form: &StepForm, session: &mut WizardSession) -> Result<(), SaveError> {
    debug!("Saving wizard page {:?}", step);
    match step {
        StepKind::ShareChoice => save_shares(form, session),
        StepKind::PortChoice => save_ports(form, session),
        StepKind::CustomConfigChoice => {
            session.cc_map = save_key_values(form, session.prereqs.custom_config.iter().map(|c| &c.key))?;
            Ok(())
        }
        StepKind::EnvironmentChoice => {
            session.env_map = save_key_values(form, session.prereqs.environment.iter().map(|e| &e.key))?;
            Ok(())
        }
        StepKind::DeviceChoice => save_devices(form, session),
        StepKind::AddShare => save_new_share(form, session),
        StepKind::AddLabel => save_labels(form, session),
        StepKind::EditPorts => save_edit_ports(form, session),
        StepKind::Summary | StepKind::Complete | StepKind::InfoSummary => Ok(()),
    }
}

fn check(errors: Vec<FieldError>) -> Result<(), SaveError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(SaveError::Invalid(errors))
    }
}

fn save_shares(form: &StepForm, session: &mut WizardSession) -> Result<(), SaveError> {
    let mut errors = Vec::new();
    let mut share_map = BTreeMap::new();

    for (idx, volume) in session.prereqs.volumes.iter().enumerate() {
        let share = form.value(idx);
        if share.is_empty() {
            errors.push(FieldError::new(
                idx,
                "Please read the tooltip and make the right selection",
            ));
        } else if share_map.contains_key(&share) {
            errors.push(FieldError::new(idx, "Each volume needs its own share."));
        } else {
            share_map.insert(share, volume.dest_dir.clone());
        }
    }

    check(errors)?;
    session.share_map = share_map;
    Ok(())
}

fn save_ports(form: &StepForm, session: &mut WizardSession) -> Result<(), SaveError> {
    let mut errors = Vec::new();
    let mut port_map = BTreeMap::new();

    for (idx, port) in session.prereqs.ports.iter().enumerate() {
        match validation::port_number(&form.value(idx)) {
            Ok(hostp) => {
                let key = hostp.to_string();
                if port_map.contains_key(&key) {
                    errors.push(FieldError::new(idx, "This host port is already used above."));
                } else {
                    port_map.insert(key, port.containerp.to_string());
                }
            }
            Err(message) => errors.push(FieldError::new(idx, message)),
        }
    }

    check(errors)?;
    session.port_map = port_map;
    Ok(())
}

fn save_key_values<'a>(
    form: &StepForm,
    keys: impl Iterator<Item = &'a String>,
) -> Result<BTreeMap<String, String>, SaveError> {
    let mut errors = Vec::new();
    let mut map = BTreeMap::new();

    for (idx, key) in keys.enumerate() {
        let value = form.value(idx);
        match validation::required(&value) {
            Ok(()) => {
                map.insert(key.clone(), value);
            }
            Err(message) => errors.push(FieldError::new(idx, message)),
        }
    }

    check(errors)?;
    Ok(map)
}

fn save_devices(form: &StepForm, session: &mut WizardSession) -> Result<(), SaveError> {
    let mut errors = Vec::new();
    let mut dev_map = BTreeMap::new();

    for (idx, device) in session.prereqs.devices.iter().enumerate() {
        let path = form.value(idx);
        match validation::device_path(&path) {
            Ok(()) => {
                dev_map.insert(device.dev.clone(), path);
            }
            Err(message) => errors.push(FieldError::new(idx, message)),
        }
    }

    check(errors)?;
    session.dev_map = dev_map;
    Ok(())
}

fn save_new_share(form: &StepForm, session: &mut WizardSession) -> Result<(), SaveError> {
    let mut errors = Vec::new();
    let share = form.value(0);
    let path = form.value(1);

    if share.is_empty() {
        errors.push(FieldError::new(0, "Select an appropriate Share to map"));
    } else if !session.add_page_shares().contains(&share) {
        errors.push(FieldError::new(0, "This share is already used by the rock-on."));
    }
    if let Err(message) = validation::absolute_path(&path) {
        errors.push(FieldError::new(1, message));
    } else if session.prereqs.volumes.iter().any(|v| v.dest_dir == path) {
        errors.push(FieldError::new(1, "This path is already mapped to a share."));
    }

    check(errors)?;
    session.replace_pending_share(path, share);
    Ok(())
}

fn save_labels(form: &StepForm, session: &mut WizardSession) -> Result<(), SaveError> {
    let mut errors = Vec::new();
    let container = form.value(0);
    if container.is_empty() {
        errors.push(FieldError::new(0, "Please select a container"));
    }

    let mut labels: Vec<String> = Vec::new();
    for idx in 1..form.fields.len() {
        let label = form.value(idx);
        if label.is_empty() {
            errors.push(FieldError::new(idx, "Please enter a label"));
        } else if !labels.contains(&label) {
            labels.push(label);
        }
    }

    check(errors)?;
    session.new_labels = labels
        .into_iter()
        .map(|label| (label, container.clone()))
        .collect();
    Ok(())
}

fn save_edit_ports(form: &StepForm, session: &mut WizardSession) -> Result<(), SaveError> {
    let port_count = session.prereqs.ports.len();
    let options = session.attachable_networks();
    let mut errors = Vec::new();

    let edit_ports: BTreeMap<String, String> = session
        .prereqs
        .ports
        .iter()
        .enumerate()
        .map(|(idx, port)| (port.id.to_string(), form.value(idx)))
        .collect();

    let mut submitted: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (offset, container) in session.prereqs.containers.iter().enumerate() {
        let idx = port_count + offset;
        let Some(field) = form.fields.get(idx) else {
            continue;
        };
        let mut nets = BTreeSet::new();
        for name in field.network_values() {
            if !options.contains(&name) {
                if let Err(message) = validation::network_name(&name) {
                    errors.push(FieldError::new(idx, message));
                    continue;
                }
            }
            nets.insert(name);
        }
        if !nets.is_empty() {
            submitted.insert(container.name.clone(), nets);
        }
    }
    check(errors)?;

    let mut persisted = session.persisted_networks();
    persisted.retain(|_, nets| !nets.is_empty());

    let mode = if edit_ports != session.persisted_publish_map() {
        UpdateMode::Normal
    } else if submitted != persisted {
        UpdateMode::Live
    } else {
        return Err(SaveError::Rejected(NOTHING_CHANGED.to_string()));
    };
    debug!("Port/network edit resolved to {} mode", mode.as_str());

    session.edit_ports = edit_ports;
    session.new_cnets = submitted
        .into_iter()
        .map(|(container, nets)| (container, nets.into_iter().collect()))
        .collect();
    session.update_mode = Some(mode);
    Ok(())
}
