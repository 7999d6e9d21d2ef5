use super::session::WizardSession;
use crate::api::Prerequisites;

/// Unique identifier for each wizard step page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    ShareChoice,
    PortChoice,
    CustomConfigChoice,
    DeviceChoice,
    EnvironmentChoice,
    EditPorts,
    AddLabel,
    AddShare,
    Summary,
    Complete,
    InfoSummary,
}

impl StepKind {
    pub fn title(&self) -> &'static str {
        match self {
            StepKind::ShareChoice => "Assign shares",
            StepKind::PortChoice => "Configure ports",
            StepKind::CustomConfigChoice => "Custom configuration",
            StepKind::DeviceChoice => "Map devices",
            StepKind::EnvironmentChoice => "Environment variables",
            StepKind::EditPorts => "Edit ports and networks",
            StepKind::AddLabel => "Add labels",
            StepKind::AddShare => "Add storage",
            StepKind::Summary => "Summary",
            StepKind::Complete => "Complete",
            StepKind::InfoSummary => "More information",
        }
    }

    /// Whether the page collects user input through a form
    pub fn has_form(&self) -> bool {
        matches!(
            self,
            StepKind::ShareChoice
                | StepKind::PortChoice
                | StepKind::CustomConfigChoice
                | StepKind::DeviceChoice
                | StepKind::EnvironmentChoice
                | StepKind::EditPorts
                | StepKind::AddLabel
                | StepKind::AddShare
        )
    }
}

/// Which flavor of wizard is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardKind {
    Install,
    Settings,
    Info,
}

/// Step list of the install wizard: one page per non-empty collection, then
/// the fixed summary and completion pages
pub fn install_steps(prereqs: &Prerequisites) -> Vec<StepKind> {
    let mut steps = Vec::new();

    if !prereqs.volumes.is_empty() {
        steps.push(StepKind::ShareChoice);
    }
    if !prereqs.ports.is_empty() {
        steps.push(StepKind::PortChoice);
    }
    if !prereqs.devices.is_empty() {
        steps.push(StepKind::DeviceChoice);
    }
    if !prereqs.environment.is_empty() {
        steps.push(StepKind::EnvironmentChoice);
    }
    if !prereqs.custom_config.is_empty() {
        steps.push(StepKind::CustomConfigChoice);
    }

    steps.push(StepKind::Summary);
    steps.push(StepKind::Complete);
    steps
}

/// Initial step list of the settings wizard. Page 0 shows the current
/// settings; with storage support the "Add Storage" path follows it.
pub fn settings_steps(volume_add_support: bool) -> Vec<StepKind> {
    if volume_add_support {
        vec![
            StepKind::Summary,
            StepKind::AddShare,
            StepKind::Summary,
            StepKind::Complete,
        ]
    } else {
        vec![StepKind::Summary]
    }
}

pub fn info_steps() -> Vec<StepKind> {
    vec![StepKind::InfoSummary]
}

/// The settings step list after one of the side actions replaced slot 1
pub fn settings_steps_with(secondary: StepKind) -> Vec<StepKind> {
    vec![
        StepKind::Summary,
        secondary,
        StepKind::Summary,
        StepKind::Complete,
    ]
}

/// Which page slot 1 of the settings wizard must hold, judged by which
/// accumulated maps actually carry data
pub fn resolve_secondary_step(session: &WizardSession) -> StepKind {
    if !session.new_labels.is_empty() {
        StepKind::AddLabel
    } else if !session.edit_ports.is_empty()
        || !session.new_cnets.is_empty()
        || session.update_mode.is_some()
    {
        StepKind::EditPorts
    } else if session.rockon.volume_add_support {
        StepKind::AddShare
    } else {
        StepKind::AddLabel
    }
}

/// Rewrite slot 1 of a settings step list in place; a no-op on lists too
/// short to have one
pub fn recompute_secondary(steps: &mut [StepKind], session: &WizardSession) {
    if steps.len() > 2 {
        steps[1] = resolve_secondary_step(session);
    }
}
