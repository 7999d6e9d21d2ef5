//! Form model for wizard pages.
//!
//! A form is rebuilt from the session every time a page is entered, so values
//! saved earlier in the run show up prefilled when the user steps back.

use super::session::{publish_value, WizardSession};
use super::steps::StepKind;
use super::validation::{is_secret_label, FieldError};
use crate::vim::InputBuffer;

#[derive(Clone)]
pub enum FieldKind {
    /// Free text, typed in insert mode
    Text,
    /// Free text, masked while typing
    Secret,
    /// One value out of a fixed list
    Choice(Vec<String>),
    /// On/off switch
    Toggle,
    /// Comma separated network names for one container
    Networks(Vec<String>),
}

#[derive(Clone)]
pub struct FormField {
    pub label: String,
    pub help: Option<String>,
    pub kind: FieldKind,
    pub input: InputBuffer,
    pub selected: Option<usize>,
    pub checked: bool,
}

impl FormField {
    fn text(label: impl Into<String>, value: &str) -> Self {
        let mut input = InputBuffer::new();
        input.set(value);
        Self {
            label: label.into(),
            help: None,
            kind: FieldKind::Text,
            input,
            selected: None,
            checked: false,
        }
    }

    fn secret(label: impl Into<String>, value: &str) -> Self {
        let mut input = InputBuffer::masked();
        input.set(value);
        Self {
            kind: FieldKind::Secret,
            input,
            ..Self::text(label, "")
        }
    }

    /// Text or masked input depending on whether the label reads like a password
    fn keyed(label: &str, value: &str) -> Self {
        if is_secret_label(label) {
            Self::secret(label, value)
        } else {
            Self::text(label, value)
        }
    }

    fn choice(label: impl Into<String>, options: Vec<String>, current: Option<&str>) -> Self {
        let selected = current.and_then(|c| options.iter().position(|o| o == c));
        Self {
            kind: FieldKind::Choice(options),
            selected,
            ..Self::text(label, "")
        }
    }

    fn toggle(label: impl Into<String>, checked: bool) -> Self {
        Self {
            kind: FieldKind::Toggle,
            checked,
            ..Self::text(label, "")
        }
    }

    fn networks(label: impl Into<String>, options: Vec<String>, current: &[String]) -> Self {
        Self {
            kind: FieldKind::Networks(options),
            ..Self::text(label, &current.join(", "))
        }
    }

    fn with_help(mut self, help: Option<&str>) -> Self {
        self.help = help.filter(|h| !h.is_empty()).map(str::to_string);
        self
    }

    /// Whether the field is edited by typing
    pub fn is_typed(&self) -> bool {
        matches!(
            self.kind,
            FieldKind::Text | FieldKind::Secret | FieldKind::Networks(_)
        )
    }

    /// Current value as the page save sees it
    pub fn value(&self) -> String {
        match &self.kind {
            FieldKind::Choice(options) => self
                .selected
                .and_then(|idx| options.get(idx))
                .cloned()
                .unwrap_or_default(),
            FieldKind::Toggle => publish_value(self.checked).to_string(),
            _ => self.input.content().trim().to_string(),
        }
    }

    /// Network names typed into a network list field
    pub fn network_values(&self) -> Vec<String> {
        self.input
            .content()
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Text shown in the form for this field
    pub fn display(&self) -> String {
        match &self.kind {
            FieldKind::Choice(options) => match self.selected.and_then(|idx| options.get(idx)) {
                Some(value) => format!("< {value} >"),
                None if options.is_empty() => "(nothing to choose)".to_string(),
                None => "< select >".to_string(),
            },
            FieldKind::Toggle => (if self.checked { "[x]" } else { "[ ]" }).to_string(),
            _ => self.input.display('*'),
        }
    }

    /// Space on a choice or toggle field
    pub fn activate(&mut self) {
        match &self.kind {
            FieldKind::Toggle => self.checked = !self.checked,
            FieldKind::Choice(_) => self.cycle(true),
            _ => {}
        }
    }

    pub fn cycle(&mut self, forward: bool) {
        let FieldKind::Choice(options) = &self.kind else {
            return;
        };
        if options.is_empty() {
            return;
        }
        let len = options.len();
        self.selected = Some(match (self.selected, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(idx), true) => (idx + 1) % len,
            (Some(idx), false) => (idx + len - 1) % len,
        });
    }
}

/// Form state for the page currently shown
#[derive(Clone, Default)]
pub struct StepForm {
    pub fields: Vec<FormField>,
    pub focused: usize,
    pub errors: Vec<FieldError>,
}

impl StepForm {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focused = (self.focused + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focused = (self.focused + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn focused_field(&self) -> Option<&FormField> {
        self.fields.get(self.focused)
    }

    pub fn focused_field_mut(&mut self) -> Option<&mut FormField> {
        self.fields.get_mut(self.focused)
    }

    pub fn value(&self, idx: usize) -> String {
        self.fields.get(idx).map(FormField::value).unwrap_or_default()
    }

    pub fn error_for(&self, idx: usize) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == idx)
            .map(|e| e.message.as_str())
    }

    /// Append an empty label input on the add-label page
    pub fn push_label_field(&mut self) {
        self.fields.push(FormField::text("Label", ""));
        self.focused = self.fields.len() - 1;
    }

    /// Drop the focused label input; the container choice at index 0 stays
    pub fn remove_label_field(&mut self) -> bool {
        if self.focused == 0 || self.fields.len() <= 2 {
            return false;
        }
        self.fields.remove(self.focused);
        self.errors.clear();
        if self.focused >= self.fields.len() {
            self.focused = self.fields.len() - 1;
        }
        true
    }
}

/// Build the form for a page, prefilled from what the session already holds
pub fn build(step: StepKind, session: &WizardSession) -> StepForm {
    let prereqs = &session.prereqs;
    let fields = match step {
        StepKind::ShareChoice => {
            let shares: Vec<String> = prereqs.shares.iter().map(|s| s.name.clone()).collect();
            prereqs
                .volumes
                .iter()
                .map(|volume| {
                    let current = session
                        .share_map
                        .iter()
                        .find(|(_, dest)| **dest == volume.dest_dir)
                        .map(|(share, _)| share.as_str());
                    FormField::choice(volume.dest_dir.clone(), shares.clone(), current)
                        .with_help(volume.description.as_deref())
                })
                .collect()
        }
        StepKind::PortChoice => prereqs
            .ports
            .iter()
            .map(|port| {
                let containerp = port.containerp.to_string();
                let current = session
                    .port_map
                    .iter()
                    .find(|(_, c)| **c == containerp)
                    .map(|(host, _)| host.clone())
                    .unwrap_or_else(|| port.hostp.to_string());
                let name = port.label.as_deref().unwrap_or("Port");
                FormField::text(format!("{name} (container port {containerp})"), &current)
                    .with_help(port.description.as_deref())
            })
            .collect(),
        StepKind::CustomConfigChoice => prereqs
            .custom_config
            .iter()
            .map(|cc| {
                let value = session
                    .cc_map
                    .get(&cc.key)
                    .or(cc.val.as_ref())
                    .map(String::as_str)
                    .unwrap_or_default();
                FormField::keyed(cc.display_label(), value).with_help(cc.description.as_deref())
            })
            .collect(),
        StepKind::EnvironmentChoice => prereqs
            .environment
            .iter()
            .map(|env| {
                let value = session
                    .env_map
                    .get(&env.key)
                    .or(env.val.as_ref())
                    .map(String::as_str)
                    .unwrap_or_default();
                FormField::keyed(env.display_label(), value).with_help(env.description.as_deref())
            })
            .collect(),
        StepKind::DeviceChoice => prereqs
            .devices
            .iter()
            .map(|device| {
                let value = session
                    .dev_map
                    .get(&device.dev)
                    .or(device.val.as_ref())
                    .map(String::as_str)
                    .unwrap_or_default();
                let label = device.label.clone().unwrap_or_else(|| device.dev.clone());
                FormField::text(label, value).with_help(device.description.as_deref())
            })
            .collect(),
        StepKind::EditPorts => {
            let mut fields: Vec<FormField> = prereqs
                .ports
                .iter()
                .map(|port| {
                    let label = format!(
                        "Publish {} ({} -> {})",
                        port.label.as_deref().unwrap_or("port"),
                        port.hostp,
                        port.containerp
                    );
                    FormField::toggle(label, session.port_published(port))
                })
                .collect();
            let options = session.attachable_networks();
            fields.extend(prereqs.containers.iter().map(|container| {
                FormField::networks(
                    format!("Networks for {}", container.name),
                    options.clone(),
                    &session.container_networks(&container.name),
                )
            }));
            fields
        }
        StepKind::AddLabel => {
            let containers: Vec<String> =
                prereqs.containers.iter().map(|c| c.name.clone()).collect();
            let current = session.new_labels.first().map(|(_, c)| c.as_str());
            let mut fields = vec![FormField::choice("Container", containers, current)];

            for idx in 0..session.label_field_count {
                let value = session
                    .new_labels
                    .get(idx)
                    .map(|(label, _)| label.as_str())
                    .unwrap_or_default();
                fields.push(FormField::text("Label", value));
            }
            fields
        }
        StepKind::AddShare => {
            let (path, share) = match &session.pending_share {
                Some((path, share)) => (path.as_str(), Some(share.as_str())),
                None => ("", None),
            };
            vec![
                FormField::choice("Share", session.add_page_shares(), share),
                FormField::text("Container path", path)
                    .with_help(Some("Must be a valid unix path. Eg: /data/media")),
            ]
        }
        StepKind::Summary | StepKind::Complete | StepKind::InfoSummary => Vec::new(),
    };

    StepForm {
        fields,
        focused: 0,
        errors: Vec::new(),
    }
}
