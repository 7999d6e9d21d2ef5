//! Multi-page wizard engine used for install, settings and info dialogs.
//!
//! The engine owns the step list, the current index and the form for the
//! current page. Network calls are not made here: a page that needs one
//! returns [`NextOutcome::Submit`] and the caller reports back through
//! [`Wizard::on_submit_result`].

pub mod form;
pub mod pages;
pub mod session;
pub mod steps;
pub mod validation;

pub use form::{FieldKind, FormField, StepForm};
pub use pages::SaveError;
pub use session::{UpdateMode, WizardSession};
pub use steps::{StepKind, WizardKind};

use tracing::{debug, info};

use crate::api::models::{InstallRequest, Rockon, UpdateRequest};
use crate::api::{PrerequisiteSet, Prerequisites};

pub const STARTED_MESSAGE: &str = "Rock-on must be turned off to change its settings.";
pub const HOST_NETWORK_MESSAGE: &str =
    "Network settings cannot be altered for this rock-on as it uses host networking.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardPhase {
    /// Prerequisites are being fetched
    Loading,
    Ready,
    /// An install or update request is in flight; advancing is disabled
    Saving,
}

/// Request the caller must send before the wizard can move on
#[derive(Debug, Clone, PartialEq)]
pub enum WizardSubmit {
    Install(i64, InstallRequest),
    Update(i64, UpdateRequest),
}

/// Result of pressing "next"
#[derive(Debug, Clone, PartialEq)]
pub enum NextOutcome {
    /// Field errors are attached to the form
    Invalid,
    /// Page refused to save; show the message
    Rejected(String),
    Advanced,
    Submit(WizardSubmit),
    /// Past the last page; close the overlay
    Finished,
    /// Button hidden or a request is in flight
    Ignored,
}

/// Navigation buttons of the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buttons {
    pub prev: bool,
    pub next: Option<&'static str>,
    pub add_label: bool,
    pub edit_ports: bool,
}

/// Side actions offered on the first settings page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideAction {
    AddLabel,
    EditPorts,
}

pub struct Wizard {
    pub kind: WizardKind,
    pub session: WizardSession,
    pub form: StepForm,
    steps: Vec<StepKind>,
    index: usize,
    phase: WizardPhase,
}

impl Wizard {
    /// Open a wizard for the add-on; pages appear once prerequisites load
    pub fn new(kind: WizardKind, rockon: Rockon) -> Self {
        let (steps, phase) = match kind {
            WizardKind::Info => (steps::info_steps(), WizardPhase::Ready),
            _ => (Vec::new(), WizardPhase::Loading),
        };
        info!("Opening {:?} wizard for {}", kind, rockon.name);
        Self {
            kind,
            session: WizardSession::new(rockon, Prerequisites::default()),
            form: StepForm::default(),
            steps,
            index: 0,
            phase,
        }
    }

    pub fn prerequisite_set(&self) -> PrerequisiteSet {
        match self.kind {
            WizardKind::Install => PrerequisiteSet::Install,
            WizardKind::Settings => PrerequisiteSet::Settings,
            WizardKind::Info => PrerequisiteSet::Info,
        }
    }

    pub fn rockon_id(&self) -> i64 {
        self.session.rockon.id
    }

    /// Compute the step list from the fetched collections
    pub fn on_prerequisites(&mut self, prereqs: Prerequisites) {
        self.steps = match self.kind {
            WizardKind::Install => steps::install_steps(&prereqs),
            WizardKind::Settings => steps::settings_steps(self.session.rockon.volume_add_support),
            WizardKind::Info => steps::info_steps(),
        };
        self.session.prereqs = prereqs;
        self.index = 0;
        self.phase = WizardPhase::Ready;
        debug!("Wizard steps: {:?}", self.steps);
        self.enter_step();
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    pub fn steps(&self) -> &[StepKind] {
        &self.steps
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current_step(&self) -> Option<StepKind> {
        self.steps.get(self.index).copied()
    }

    fn is_last(&self) -> bool {
        self.index + 1 >= self.steps.len()
    }

    pub fn buttons(&self) -> Buttons {
        let hidden = Buttons {
            prev: false,
            next: None,
            add_label: false,
            edit_ports: false,
        };
        if self.phase == WizardPhase::Loading || self.steps.is_empty() {
            return hidden;
        }

        let len = self.steps.len();
        match self.kind {
            WizardKind::Info => hidden,
            WizardKind::Install => {
                if self.index == len - 1 {
                    Buttons {
                        next: Some("Close"),
                        ..hidden
                    }
                } else if self.index == len - 2 {
                    Buttons {
                        prev: self.index > 0,
                        next: Some("Submit"),
                        ..hidden
                    }
                } else {
                    Buttons {
                        prev: self.index > 0,
                        next: Some("Next"),
                        ..hidden
                    }
                }
            }
            WizardKind::Settings => {
                if self.index == 0 {
                    Buttons {
                        prev: false,
                        next: self
                            .session
                            .rockon
                            .volume_add_support
                            .then_some("Add Storage"),
                        add_label: true,
                        edit_ports: true,
                    }
                } else if self.index == len - 1 {
                    Buttons {
                        prev: true,
                        next: Some("Submit"),
                        ..hidden
                    }
                } else {
                    Buttons {
                        prev: true,
                        next: Some("Next"),
                        ..hidden
                    }
                }
            }
        }
    }

    /// Save the current page and move forward
    pub fn next(&mut self) -> NextOutcome {
        if self.phase != WizardPhase::Ready || self.buttons().next.is_none() {
            return NextOutcome::Ignored;
        }
        let Some(step) = self.current_step() else {
            return NextOutcome::Ignored;
        };
        if self.kind == WizardKind::Settings && self.index == 0 && self.session.rockon.is_started() {
            return NextOutcome::Rejected(STARTED_MESSAGE.to_string());
        }

        match pages::save(step, &self.form, &mut self.session) {
            Ok(()) => self.form.errors.clear(),
            Err(SaveError::Invalid(errors)) => {
                debug!("Wizard page {:?} has {} invalid field(s)", step, errors.len());
                self.form.errors = errors;
                return NextOutcome::Invalid;
            }
            Err(SaveError::Rejected(message)) => return NextOutcome::Rejected(message),
        }

        if let Some(submit) = self.submission(step) {
            self.phase = WizardPhase::Saving;
            return NextOutcome::Submit(submit);
        }
        if self.kind == WizardKind::Settings && self.index == 0 {
            // "Add Storage" always leads to the add-share page
            self.steps = steps::settings_steps(true);
        }
        self.advance()
    }

    /// Request to send when leaving this page, if any
    fn submission(&self, step: StepKind) -> Option<WizardSubmit> {
        let rid = self.rockon_id();
        match self.kind {
            WizardKind::Install if step == StepKind::Summary => {
                Some(WizardSubmit::Install(rid, self.session.install_request()))
            }
            WizardKind::Settings if self.index > 0 && self.is_last() => {
                Some(WizardSubmit::Update(rid, self.session.update_request()))
            }
            _ => None,
        }
    }

    fn advance(&mut self) -> NextOutcome {
        if self.is_last() {
            info!("Wizard for {} finished", self.session.rockon.name);
            return NextOutcome::Finished;
        }
        self.index += 1;
        self.enter_step();
        NextOutcome::Advanced
    }

    /// Continue after the submitted request completed
    pub fn on_submit_result(&mut self, result: Result<(), String>) -> NextOutcome {
        if self.phase != WizardPhase::Saving {
            return NextOutcome::Ignored;
        }
        self.phase = WizardPhase::Ready;
        match result {
            Ok(()) => self.advance(),
            Err(message) => NextOutcome::Rejected(message),
        }
    }

    /// Step back one page without saving
    pub fn prev(&mut self) -> bool {
        if self.phase != WizardPhase::Ready || !self.buttons().prev || self.index == 0 {
            return false;
        }
        self.index -= 1;
        self.enter_step();
        true
    }

    /// Replace slot 1 of the settings wizard and move onto it
    pub fn side_action(&mut self, action: SideAction) -> Result<(), String> {
        if self.kind != WizardKind::Settings || self.index != 0 || self.phase != WizardPhase::Ready {
            return Ok(());
        }
        let rockon = &self.session.rockon;
        if rockon.is_started() {
            return Err(STARTED_MESSAGE.to_string());
        }
        let secondary = match action {
            SideAction::AddLabel => StepKind::AddLabel,
            SideAction::EditPorts if rockon.host_network => {
                return Err(HOST_NETWORK_MESSAGE.to_string());
            }
            SideAction::EditPorts => StepKind::EditPorts,
        };

        self.steps = steps::settings_steps_with(secondary);
        self.index = 1;
        self.enter_step();
        Ok(())
    }

    /// Add a label input on the add-label page
    pub fn add_label_field(&mut self) -> Result<(), String> {
        if self.current_step() != Some(StepKind::AddLabel) {
            return Ok(());
        }
        self.session.add_label_field()?;
        self.form.push_label_field();
        Ok(())
    }

    pub fn remove_label_field(&mut self) {
        if self.current_step() == Some(StepKind::AddLabel) && self.form.remove_label_field() {
            self.session.remove_label_field();
        }
    }

    fn enter_step(&mut self) {
        if self.kind == WizardKind::Settings
            && self.index >= 1
            && self.current_step() == Some(StepKind::Summary)
        {
            steps::recompute_secondary(&mut self.steps, &self.session);
        }
        if let Some(step) = self.current_step() {
            debug!("Wizard page {} of {}: {:?}", self.index + 1, self.steps.len(), step);
            self.form = form::build(step, &self.session);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::session::tests::{prereqs, rockon};

    fn install_wizard() -> Wizard {
        let mut wizard = Wizard::new(WizardKind::Install, rockon(false));
        let mut p = prereqs();
        p.volumes.clear();
        wizard.on_prerequisites(p);
        wizard
    }

    fn settings_wizard(volume_add_support: bool) -> Wizard {
        let mut wizard = Wizard::new(WizardKind::Settings, rockon(volume_add_support));
        wizard.on_prerequisites(prereqs());
        wizard
    }

    #[test]
    fn install_flow_submits_on_summary_and_closes_on_complete() {
        let mut wizard = install_wizard();
        assert_eq!(
            wizard.steps(),
            &[StepKind::PortChoice, StepKind::Summary, StepKind::Complete]
        );
        assert!(!wizard.buttons().prev);
        assert_eq!(wizard.buttons().next, Some("Next"));

        assert_eq!(wizard.next(), NextOutcome::Advanced);
        assert_eq!(wizard.buttons().next, Some("Submit"));
        assert!(wizard.buttons().prev);

        let NextOutcome::Submit(WizardSubmit::Install(rid, request)) = wizard.next() else {
            panic!("expected install submission");
        };
        assert_eq!(rid, 7);
        assert_eq!(request.ports["8384"], "8384");
        assert_eq!(wizard.phase(), WizardPhase::Saving);
        assert_eq!(wizard.next(), NextOutcome::Ignored);

        assert_eq!(wizard.on_submit_result(Ok(())), NextOutcome::Advanced);
        assert_eq!(
            wizard.buttons(),
            Buttons {
                prev: false,
                next: Some("Close"),
                add_label: false,
                edit_ports: false
            }
        );
        assert_eq!(wizard.next(), NextOutcome::Finished);
    }

    #[test]
    fn failed_submit_reenables_next_without_moving() {
        let mut wizard = install_wizard();
        wizard.next();
        assert!(matches!(wizard.next(), NextOutcome::Submit(_)));

        let outcome = wizard.on_submit_result(Err("Docker is not running".to_string()));
        assert_eq!(outcome, NextOutcome::Rejected("Docker is not running".to_string()));
        assert_eq!(wizard.index(), 1);
        assert_eq!(wizard.phase(), WizardPhase::Ready);
    }

    #[test]
    fn invalid_page_does_not_advance() {
        let mut wizard = install_wizard();
        wizard.form.fields[0].input.set("http");

        assert_eq!(wizard.next(), NextOutcome::Invalid);
        assert_eq!(wizard.index(), 0);
        assert!(wizard.form.error_for(0).is_some());
    }

    #[test]
    fn prev_steps_back_without_saving() {
        let mut wizard = install_wizard();
        assert!(!wizard.prev());

        wizard.next();
        wizard.session.port_map.clear();
        assert!(wizard.prev());
        assert_eq!(wizard.index(), 0);
        assert!(wizard.session.port_map.is_empty());
        assert!(!wizard.prev());
    }

    #[test]
    fn settings_first_page_buttons() {
        let wizard = settings_wizard(true);
        let buttons = wizard.buttons();
        assert!(!buttons.prev);
        assert_eq!(buttons.next, Some("Add Storage"));
        assert!(buttons.add_label && buttons.edit_ports);

        let wizard = settings_wizard(false);
        assert_eq!(wizard.buttons().next, None);
    }

    #[test]
    fn started_rockon_blocks_settings_actions() {
        let mut started = rockon(true);
        started.status = "started".to_string();
        let mut wizard = Wizard::new(WizardKind::Settings, started);
        wizard.on_prerequisites(prereqs());

        assert_eq!(wizard.side_action(SideAction::AddLabel), Err(STARTED_MESSAGE.to_string()));
        assert_eq!(wizard.next(), NextOutcome::Rejected(STARTED_MESSAGE.to_string()));
        assert_eq!(wizard.index(), 0);
    }

    #[test]
    fn host_network_blocks_edit_ports_only() {
        let mut host = rockon(false);
        host.host_network = true;
        let mut wizard = Wizard::new(WizardKind::Settings, host);
        wizard.on_prerequisites(prereqs());

        assert_eq!(
            wizard.side_action(SideAction::EditPorts),
            Err(HOST_NETWORK_MESSAGE.to_string())
        );
        assert_eq!(wizard.side_action(SideAction::AddLabel), Ok(()));
        assert_eq!(wizard.current_step(), Some(StepKind::AddLabel));
    }

    #[test]
    fn settings_label_flow_posts_update() {
        let mut wizard = settings_wizard(true);
        wizard.side_action(SideAction::AddLabel).unwrap();
        assert_eq!(wizard.steps().len(), 4);

        wizard.form.fields[0].activate();
        wizard.form.fields[1].input.set("web");
        assert_eq!(wizard.next(), NextOutcome::Advanced);
        assert_eq!(wizard.current_step(), Some(StepKind::Summary));
        assert_eq!(wizard.steps()[1], StepKind::AddLabel);
        assert_eq!(wizard.buttons().next, Some("Next"));

        assert_eq!(wizard.next(), NextOutcome::Advanced);
        assert_eq!(wizard.buttons().next, Some("Submit"));
        let NextOutcome::Submit(WizardSubmit::Update(_, request)) = wizard.next() else {
            panic!("expected update submission");
        };
        assert_eq!(request.labels["web"], "syncthing");
        assert_eq!(wizard.on_submit_result(Ok(())), NextOutcome::Finished);
    }

    #[test]
    fn summary_restores_add_share_slot() {
        let mut wizard = settings_wizard(true);
        wizard.side_action(SideAction::EditPorts).unwrap();
        wizard.prev();
        assert_eq!(wizard.index(), 0);

        // Take the storage path instead; the summary looks back at empty maps
        assert_eq!(wizard.next(), NextOutcome::Advanced);
        assert_eq!(wizard.current_step(), Some(StepKind::AddShare));
        wizard.form.fields[0].activate();
        wizard.form.fields[1].input.set("/media");
        assert_eq!(wizard.next(), NextOutcome::Advanced);
        assert_eq!(wizard.steps()[1], StepKind::AddShare);
    }

    #[test]
    fn add_share_page_can_be_revisited() {
        let mut wizard = settings_wizard(true);
        assert_eq!(wizard.next(), NextOutcome::Advanced);
        wizard.form.fields[0].activate();
        wizard.form.fields[1].input.set("/media");
        assert_eq!(wizard.next(), NextOutcome::Advanced);
        assert_eq!(wizard.current_step(), Some(StepKind::Summary));

        assert!(wizard.prev());
        assert_eq!(wizard.current_step(), Some(StepKind::AddShare));
        assert_eq!(wizard.form.value(0), "media");
        assert_eq!(wizard.form.value(1), "/media");

        assert_eq!(wizard.next(), NextOutcome::Advanced);
        assert_eq!(wizard.current_step(), Some(StepKind::Summary));
        assert_eq!(wizard.session.new_shares.len(), 1);
        assert_eq!(wizard.session.new_shares["/media"], "media");
    }

    #[test]
    fn label_fields_are_capped() {
        let mut wizard = settings_wizard(false);
        wizard.side_action(SideAction::AddLabel).unwrap();
        for _ in 1..session::MAX_LABEL_FIELDS {
            wizard.add_label_field().unwrap();
        }
        assert_eq!(
            wizard.add_label_field(),
            Err(session::MAX_LABELS_MESSAGE.to_string())
        );
        assert_eq!(wizard.form.fields.len(), session::MAX_LABEL_FIELDS + 1);

        wizard.remove_label_field();
        assert_eq!(wizard.session.label_field_count, session::MAX_LABEL_FIELDS - 1);
    }

    #[test]
    fn info_wizard_has_no_navigation() {
        let mut wizard = Wizard::new(WizardKind::Info, rockon(false));
        assert_eq!(wizard.phase(), WizardPhase::Ready);
        assert_eq!(wizard.steps(), &[StepKind::InfoSummary]);
        assert_eq!(wizard.buttons().next, None);
        assert!(!wizard.buttons().prev);
        assert_eq!(wizard.next(), NextOutcome::Ignored);
    }
}
