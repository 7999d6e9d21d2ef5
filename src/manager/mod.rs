mod config;
pub mod poller;
mod status_bar;

pub use config::{ApiConfig, GeneralConfig, ManagerConfig, PollConfig};
pub use poller::{pending_ops, FetchOutcome, PollDecision, Poller};
pub use status_bar::StatusBarState;

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::models::Rockon;
use crate::api::{PrerequisiteSet, Prerequisites, RockonService};
use crate::ui::Theme;
use crate::vim::{parse_command, Command, InputBuffer, ModeAction, VimMode};
use crate::wizard::{
    NextOutcome, SideAction, StepKind, Wizard, WizardKind, WizardPhase, WizardSubmit,
};

/// Side effects requested by key handling; run by [`ManagerApp::perform`]
#[derive(Debug, Clone, PartialEq)]
pub enum ManagerAction {
    /// Fetch the list now and keep polling while anything is pending
    Refresh,
    UpdateCatalog,
    Start(i64),
    Stop(i64),
    Uninstall(i64),
    LoadPrerequisites { rid: i64, set: PrerequisiteSet },
    Submit(WizardSubmit),
}

/// Which backend action a finished task belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Toggle,
    Uninstall,
    UpdateCatalog,
}

/// Results sent back to the main loop by background tasks
#[derive(Debug)]
pub enum AppMessage {
    Polled {
        generation: u64,
        elapsed: Duration,
        result: Result<Vec<Rockon>, String>,
    },
    /// A poll timer fired
    PollDue(u64),
    DockerStatus(Result<bool, String>),
    ActionDone {
        kind: ActionKind,
        result: Result<(), String>,
    },
    Prerequisites {
        rid: i64,
        result: Result<Prerequisites, String>,
    },
    Submitted(Result<(), String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Installed,
    Available,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Installed => "Installed",
            Tab::Available => "All available",
        }
    }

    pub fn other(&self) -> Tab {
        match self {
            Tab::Installed => Tab::Available,
            Tab::Available => Tab::Installed,
        }
    }

    pub fn contains(&self, rockon: &Rockon) -> bool {
        match self {
            Tab::Installed => rockon.on_installed_tab(),
            Tab::Available => rockon.on_available_tab(),
        }
    }

    pub fn empty_text(&self) -> &'static str {
        match self {
            Tab::Installed => "There are no Rock-ons installed currently.",
            Tab::Available => "Refresh the catalog to check for new Rock-ons.",
        }
    }
}

/// Message displayed to the user
pub struct Message {
    pub text: String,
    pub is_error: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    Uninstall { rid: i64, name: String },
}

impl ConfirmAction {
    pub fn prompt(&self) -> String {
        match self {
            ConfirmAction::Uninstall { name, .. } => {
                format!("Are you sure you want to uninstall this Rock-on ({name})?")
            }
        }
    }
}

/// Main application state. Mutated only on the main loop; background work
/// reports back through [`AppMessage`].
pub struct ManagerApp {
    pub config: ManagerConfig,
    pub theme: Theme,
    service: Arc<dyn RockonService>,
    tx: mpsc::UnboundedSender<AppMessage>,
    pub host: String,

    // Catalog state
    pub rockons: Vec<Rockon>,
    pub loaded: bool,
    pub tab: Tab,
    pub selected: usize,
    pub docker_running: Option<bool>,

    poller: Poller,
    pub wizard: Option<Wizard>,

    // Vim mode state
    pub vim_mode: VimMode,
    pub command_buffer: InputBuffer,

    // UI state
    pub message: Option<Message>,
    pub confirm_action: Option<ConfirmAction>,
    pub show_help: bool,
    pub should_exit: bool,
    /// Label of the backend action in flight, if any
    pub busy: Option<String>,
    pub status_bar: StatusBarState,
    spinner_frame: usize,
}

impl ManagerApp {
    pub fn new(
        config: ManagerConfig,
        service: Arc<dyn RockonService>,
    ) -> (Self, mpsc::UnboundedReceiver<AppMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let host = service.host();
        let poller = Poller::new(&config.poll);

        let mut app = Self {
            config,
            theme: Theme::default(),
            service,
            tx,
            host,
            rockons: Vec::new(),
            loaded: false,
            tab: Tab::Installed,
            selected: 0,
            docker_running: None,
            poller,
            wizard: None,
            vim_mode: VimMode::Normal,
            command_buffer: InputBuffer::new(),
            message: None,
            confirm_action: None,
            show_help: false,
            should_exit: false,
            busy: None,
            status_bar: StatusBarState::default(),
            spinner_frame: 0,
        };
        app.update_status_bar();
        (app, rx)
    }

    pub fn is_dryrun(&self) -> bool {
        self.config.general.dryrun
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_active()
    }

    /// Add-ons shown on the current tab
    pub fn visible_rockons(&self) -> Vec<&Rockon> {
        self.rockons.iter().filter(|r| self.tab.contains(r)).collect()
    }

    pub fn selected_rockon(&self) -> Option<&Rockon> {
        self.visible_rockons().get(self.selected).copied()
    }

    fn set_rockons(&mut self, rockons: Vec<Rockon>) {
        self.rockons = rockons;
        self.loaded = true;
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_rockons().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    fn switch_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            self.tab = tab;
            self.selected = 0;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<ManagerAction> {
        // Clear message on any key (unless working)
        if self.message.is_some() && self.busy.is_none() {
            self.message = None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_exit = true;
            return None;
        }

        let result = if let Some(action) = self.confirm_action.clone() {
            self.handle_confirm_key(key, action)
        } else if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')) {
                self.show_help = false;
            }
            None
        } else if self.wizard.is_some() {
            match self.vim_mode {
                VimMode::Insert => self.handle_wizard_insert(key),
                _ => self.handle_wizard_normal(key),
            }
        } else {
            match self.vim_mode {
                VimMode::Command => self.handle_command_mode(key),
                _ => self.handle_list_key(key),
            }
        };

        self.update_status_bar();
        result
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Option<ManagerAction> {
        match key.code {
            KeyCode::Char(':') => {
                self.vim_mode = self.vim_mode.transition(ModeAction::EnterCommand);
                self.command_buffer.clear();
            }
            KeyCode::Char('j') | KeyCode::Down => {
                let len = self.visible_rockons().len();
                if self.selected + 1 < len {
                    self.selected += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Char('g') | KeyCode::Home => self.selected = 0,
            KeyCode::Char('G') | KeyCode::End => {
                self.selected = self.visible_rockons().len().saturating_sub(1);
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Char('h') | KeyCode::Char('l') => {
                self.switch_tab(self.tab.other());
            }
            KeyCode::Enter => {
                return match self.tab {
                    Tab::Available => self.open_install(),
                    Tab::Installed => self.open_settings(),
                };
            }
            KeyCode::Char(' ') => return self.toggle_selected(None),
            KeyCode::Char('u') => self.confirm_uninstall(),
            KeyCode::Char('m') => return self.open_info(),
            KeyCode::Char('r') => return Some(ManagerAction::Refresh),
            KeyCode::Char('?') | KeyCode::F(1) => self.show_help = true,
            _ => {}
        }
        None
    }

    fn handle_command_mode(&mut self, key: KeyEvent) -> Option<ManagerAction> {
        match key.code {
            KeyCode::Esc => {
                self.vim_mode = self.vim_mode.transition(ModeAction::Escape);
                self.command_buffer.clear();
            }
            KeyCode::Enter => {
                let cmd = self.command_buffer.content().to_string();
                self.vim_mode = self.vim_mode.transition(ModeAction::Execute);
                self.command_buffer.clear();
                return self.execute_command(&cmd);
            }
            KeyCode::Backspace => {
                if self.command_buffer.is_empty() {
                    self.vim_mode = self.vim_mode.transition(ModeAction::Escape);
                } else {
                    self.command_buffer.delete_back();
                }
            }
            KeyCode::Char(c) => self.command_buffer.insert(c),
            _ => {}
        }
        None
    }

    fn execute_command(&mut self, input: &str) -> Option<ManagerAction> {
        let command = match parse_command(input) {
            Ok(command) => command,
            Err(e) => {
                self.set_error(e.to_string());
                return None;
            }
        };
        debug!("Executing command {:?}", command);

        match command {
            Command::Install => self.open_install(),
            Command::Uninstall => {
                self.confirm_uninstall();
                None
            }
            Command::Settings => self.open_settings(),
            Command::Info => self.open_info(),
            Command::Start => self.toggle_selected(Some(true)),
            Command::Stop => self.toggle_selected(Some(false)),
            Command::Update => Some(ManagerAction::UpdateCatalog),
            Command::Refresh => Some(ManagerAction::Refresh),
            Command::Tab(name) => {
                match name.as_deref() {
                    Some("installed") | Some("i") => self.switch_tab(Tab::Installed),
                    Some("available") | Some("all") | Some("a") => self.switch_tab(Tab::Available),
                    None => self.switch_tab(self.tab.other()),
                    Some(other) => self.set_error(format!("Unknown tab: {other}")),
                }
                None
            }
            Command::Help => {
                self.show_help = true;
                None
            }
            Command::Quit => {
                self.should_exit = true;
                None
            }
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent, action: ConfirmAction) -> Option<ManagerAction> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.confirm_action = None;
                match action {
                    ConfirmAction::Uninstall { rid, .. } => Some(ManagerAction::Uninstall(rid)),
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm_action = None;
                None
            }
            _ => None,
        }
    }

    fn docker_guard(&mut self) -> bool {
        if self.docker_running == Some(false) {
            self.set_error(
                "The Rock-on service is not running. Start it on the appliance first.".to_string(),
            );
            return false;
        }
        true
    }

    fn open_install(&mut self) -> Option<ManagerAction> {
        let Some(rockon) = self.selected_rockon().filter(|r| r.on_available_tab()).cloned() else {
            self.set_error("Select an available Rock-on to install.".to_string());
            return None;
        };
        if !self.docker_guard() {
            return None;
        }
        self.open_wizard(WizardKind::Install, rockon)
    }

    fn open_settings(&mut self) -> Option<ManagerAction> {
        let rockon = self.selected_rockon()?.clone();
        if !rockon.is_installed() || rockon.is_pending() {
            self.set_error("Settings are available once the Rock-on is installed.".to_string());
            return None;
        }
        self.open_wizard(WizardKind::Settings, rockon)
    }

    fn open_info(&mut self) -> Option<ManagerAction> {
        let rockon = self.selected_rockon()?.clone();
        if rockon.more_info.as_deref().is_none_or(str::is_empty) {
            self.set_info(format!("No additional information for {}.", rockon.name));
            return None;
        }
        self.open_wizard(WizardKind::Info, rockon)
    }

    fn open_wizard(&mut self, kind: WizardKind, rockon: Rockon) -> Option<ManagerAction> {
        // Poller and wizard never run together
        self.poller.stop();
        self.vim_mode = VimMode::Normal;

        let wizard = Wizard::new(kind, rockon);
        let action = (wizard.phase() == WizardPhase::Loading).then(|| {
            ManagerAction::LoadPrerequisites {
                rid: wizard.rockon_id(),
                set: wizard.prerequisite_set(),
            }
        });
        self.wizard = Some(wizard);
        action
    }

    /// Close the overlay and re-render, which restarts polling
    fn finish_wizard(&mut self) -> Option<ManagerAction> {
        let wizard = self.wizard.take()?;
        if wizard.kind == WizardKind::Install {
            self.switch_tab(Tab::Installed);
        }
        self.vim_mode = VimMode::Normal;
        Some(ManagerAction::Refresh)
    }

    fn toggle_selected(&mut self, desired: Option<bool>) -> Option<ManagerAction> {
        let rockon = self.selected_rockon()?.clone();
        if !rockon.is_installed() {
            return None;
        }
        if rockon.is_pending() {
            self.set_info(format!("{} is busy, please wait.", rockon.name));
            return None;
        }

        let start = desired.unwrap_or(!rockon.is_started());
        if start == rockon.is_started() {
            let state = if start { "running" } else { "stopped" };
            self.set_info(format!("{} is already {state}.", rockon.name));
            return None;
        }
        if start && !self.docker_guard() {
            return None;
        }
        Some(if start {
            ManagerAction::Start(rockon.id)
        } else {
            ManagerAction::Stop(rockon.id)
        })
    }

    fn confirm_uninstall(&mut self) {
        let Some(rockon) = self.selected_rockon().cloned() else {
            return;
        };
        if !rockon.on_installed_tab() || rockon.is_pending() {
            return;
        }
        if rockon.is_started() {
            self.set_error("Stop the Rock-on before uninstalling it.".to_string());
            return;
        }
        self.confirm_action = Some(ConfirmAction::Uninstall {
            rid: rockon.id,
            name: rockon.name,
        });
    }

    fn handle_wizard_normal(&mut self, key: KeyEvent) -> Option<ManagerAction> {
        let wizard = self.wizard.as_mut()?;
        let step = wizard.current_step();

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                if wizard.phase() == WizardPhase::Saving {
                    return None;
                }
                info!("Wizard for {} cancelled", wizard.session.rockon.name);
                return self.finish_wizard();
            }
            KeyCode::Char('n') => {
                let outcome = wizard.next();
                return self.apply_outcome(outcome);
            }
            KeyCode::Char('p') => {
                wizard.prev();
            }
            KeyCode::Char('a') if wizard.buttons().add_label => {
                if let Err(message) = wizard.side_action(SideAction::AddLabel) {
                    self.set_error(message);
                }
            }
            KeyCode::Char('e') if wizard.buttons().edit_ports => {
                if let Err(message) = wizard.side_action(SideAction::EditPorts) {
                    self.set_error(message);
                }
            }
            KeyCode::Char('+') if step == Some(StepKind::AddLabel) => {
                if let Err(message) = wizard.add_label_field() {
                    self.set_error(message);
                }
            }
            KeyCode::Char('-') if step == Some(StepKind::AddLabel) => {
                wizard.remove_label_field();
            }
            KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => wizard.form.focus_next(),
            KeyCode::Char('k') | KeyCode::Up | KeyCode::BackTab => wizard.form.focus_prev(),
            KeyCode::Char('h') | KeyCode::Left => {
                if let Some(field) = wizard.form.focused_field_mut() {
                    field.cycle(false);
                }
            }
            KeyCode::Char('l') | KeyCode::Right => {
                if let Some(field) = wizard.form.focused_field_mut() {
                    field.cycle(true);
                }
            }
            KeyCode::Char(' ') => {
                if let Some(field) = wizard.form.focused_field_mut() {
                    field.activate();
                }
            }
            KeyCode::Char('i') => {
                if wizard.form.focused_field().is_some_and(|f| f.is_typed()) {
                    self.vim_mode = self.vim_mode.transition(ModeAction::EnterInsert);
                }
            }
            KeyCode::Enter => match wizard.form.focused_field() {
                Some(field) if field.is_typed() => {
                    self.vim_mode = self.vim_mode.transition(ModeAction::EnterInsert);
                }
                Some(_) => {
                    if let Some(field) = wizard.form.focused_field_mut() {
                        field.activate();
                    }
                }
                None => {
                    let outcome = wizard.next();
                    return self.apply_outcome(outcome);
                }
            },
            _ => {}
        }
        None
    }

    fn handle_wizard_insert(&mut self, key: KeyEvent) -> Option<ManagerAction> {
        let Some(wizard) = self.wizard.as_mut() else {
            self.vim_mode = VimMode::Normal;
            return None;
        };

        match key.code {
            KeyCode::Esc => {
                self.vim_mode = self.vim_mode.transition(ModeAction::Escape);
            }
            KeyCode::Enter | KeyCode::Tab => {
                wizard.form.focus_next();
                if !wizard.form.focused_field().is_some_and(|f| f.is_typed()) {
                    self.vim_mode = VimMode::Normal;
                }
            }
            KeyCode::BackTab => {
                wizard.form.focus_prev();
                if !wizard.form.focused_field().is_some_and(|f| f.is_typed()) {
                    self.vim_mode = VimMode::Normal;
                }
            }
            _ => {
                let Some(field) = wizard.form.focused_field_mut() else {
                    return None;
                };
                let input = &mut field.input;
                match key.code {
                    KeyCode::Backspace => {
                        input.delete_back();
                    }
                    KeyCode::Delete => {
                        input.delete_forward();
                    }
                    KeyCode::Left => input.move_left(),
                    KeyCode::Right => input.move_right(),
                    KeyCode::Home => input.move_start(),
                    KeyCode::End => input.move_end(),
                    KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => match c {
                        'u' => input.clear(),
                        'a' => input.move_start(),
                        'e' => input.move_end(),
                        _ => {}
                    },
                    KeyCode::Char(c) => input.insert(c),
                    _ => {}
                }
            }
        }
        None
    }

    fn apply_outcome(&mut self, outcome: NextOutcome) -> Option<ManagerAction> {
        match outcome {
            NextOutcome::Invalid => {
                self.set_error("Please correct the highlighted fields.".to_string());
                None
            }
            NextOutcome::Rejected(message) => {
                self.set_error(message);
                None
            }
            NextOutcome::Submit(submit) => Some(ManagerAction::Submit(submit)),
            NextOutcome::Finished => self.finish_wizard(),
            NextOutcome::Advanced | NextOutcome::Ignored => None,
        }
    }

    /// Run an action as background tasks
    pub fn perform(&mut self, action: ManagerAction) {
        debug!("Performing {:?}", action);
        match action {
            ManagerAction::Refresh => self.start_polling(),
            ManagerAction::UpdateCatalog => {
                self.busy = Some("Updating the Rock-on catalog".to_string());
                let service = self.service.clone();
                self.spawn_action(ActionKind::UpdateCatalog, async move {
                    service.update_catalog().await
                });
            }
            ManagerAction::Start(rid) => {
                self.poller.stop();
                self.busy = Some("Starting Rock-on".to_string());
                let service = self.service.clone();
                self.spawn_action(ActionKind::Toggle, async move { service.start(rid).await });
            }
            ManagerAction::Stop(rid) => {
                self.poller.stop();
                self.busy = Some("Stopping Rock-on".to_string());
                let service = self.service.clone();
                self.spawn_action(ActionKind::Toggle, async move { service.stop(rid).await });
            }
            ManagerAction::Uninstall(rid) => {
                self.busy = Some("Uninstalling Rock-on".to_string());
                let service = self.service.clone();
                self.spawn_action(ActionKind::Uninstall, async move {
                    service.uninstall(rid).await
                });
            }
            ManagerAction::LoadPrerequisites { rid, set } => {
                let service = self.service.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = service
                        .load_prerequisites(rid, set)
                        .await
                        .map_err(|e| e.user_message());
                    let _ = tx.send(AppMessage::Prerequisites { rid, result });
                });
            }
            ManagerAction::Submit(submit) => {
                let service = self.service.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = match submit {
                        WizardSubmit::Install(rid, request) => service.install(rid, &request).await,
                        WizardSubmit::Update(rid, request) => service.update(rid, &request).await,
                    };
                    let _ = tx.send(AppMessage::Submitted(result.map_err(|e| e.user_message())));
                });
            }
        }
        self.update_status_bar();
    }

    fn spawn_action<F>(&self, kind: ActionKind, fut: F)
    where
        F: std::future::Future<Output = crate::error::Result<()>> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = fut.await.map_err(|e| e.user_message());
            let _ = tx.send(AppMessage::ActionDone { kind, result });
        });
    }

    fn start_polling(&mut self) {
        let generation = self.poller.start();
        self.spawn_fetch(generation);
        self.spawn_docker_status();
    }

    fn spawn_fetch(&self, generation: u64) {
        let service = self.service.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let started = Instant::now();
            let result = service.list_rockons().await.map_err(|e| e.user_message());
            let _ = tx.send(AppMessage::Polled {
                generation,
                elapsed: started.elapsed(),
                result,
            });
        });
    }

    fn spawn_docker_status(&self) {
        let service = self.service.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = service
                .docker_status()
                .await
                .map(|s| s.status)
                .map_err(|e| e.user_message());
            let _ = tx.send(AppMessage::DockerStatus(result));
        });
    }

    fn schedule_poll(&mut self, delay: Duration) {
        let generation = self.poller.generation();
        let tx = self.tx.clone();
        debug!("Next poll in {:?}", delay);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(AppMessage::PollDue(generation));
        });
        self.poller.arm(timer);
    }

    /// Apply a background task's result
    pub fn handle_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::Polled {
                generation,
                elapsed,
                result,
            } => self.on_polled(generation, elapsed, result),
            AppMessage::PollDue(generation) => {
                if self.poller.is_current(generation) {
                    self.spawn_fetch(generation);
                }
            }
            AppMessage::DockerStatus(result) => match result {
                Ok(running) => self.docker_running = Some(running),
                Err(e) => {
                    warn!("Could not read Rock-on service status: {}", e);
                    self.docker_running = None;
                }
            },
            AppMessage::ActionDone { kind, result } => {
                self.busy = None;
                match result {
                    Ok(()) => {
                        info!("{:?} finished", kind);
                        let tab = match kind {
                            ActionKind::UpdateCatalog => Tab::Available,
                            ActionKind::Toggle | ActionKind::Uninstall => Tab::Installed,
                        };
                        self.switch_tab(tab);
                        // An open wizard owns the screen; closing it refreshes
                        if self.wizard.is_none() {
                            self.start_polling();
                        }
                    }
                    Err(e) => self.set_error(e),
                }
            }
            AppMessage::Prerequisites { rid, result } => self.on_prerequisites(rid, result),
            AppMessage::Submitted(result) => {
                let Some(wizard) = self.wizard.as_mut() else {
                    return;
                };
                let outcome = wizard.on_submit_result(result);
                if let Some(action) = self.apply_outcome(outcome) {
                    self.perform(action);
                }
            }
        }
        self.update_status_bar();
    }

    fn on_polled(&mut self, generation: u64, elapsed: Duration, result: Result<Vec<Rockon>, String>) {
        if !self.poller.is_current(generation) {
            debug!("Ignoring poll result from generation {}", generation);
            return;
        }

        let (outcome, error) = match result {
            Ok(rockons) => {
                let pending = pending_ops(&rockons);
                self.set_rockons(rockons);
                (FetchOutcome::Loaded { pending }, None)
            }
            Err(e) => (FetchOutcome::Failed, Some(e)),
        };

        match self.poller.on_fetched(generation, elapsed, outcome) {
            Some(PollDecision::Reschedule(delay)) => self.schedule_poll(delay),
            Some(PollDecision::Retry { attempt, delay }) => {
                self.set_error(format!(
                    "Could not load Rock-ons: {}. Retrying ({}/{}).",
                    error.unwrap_or_default(),
                    attempt,
                    self.config.poll.retry_limit
                ));
                self.schedule_poll(delay);
            }
            Some(PollDecision::GiveUp) => {
                self.set_error(format!(
                    "Could not load Rock-ons: {}. Press r to try again.",
                    error.unwrap_or_default()
                ));
            }
            Some(PollDecision::Stop) | None => {}
        }
    }

    fn on_prerequisites(&mut self, rid: i64, result: Result<Prerequisites, String>) {
        let Some(wizard) = self.wizard.as_mut() else {
            return;
        };
        if wizard.rockon_id() != rid || wizard.phase() != WizardPhase::Loading {
            return;
        }
        match result {
            Ok(prereqs) => wizard.on_prerequisites(prereqs),
            Err(e) => {
                self.set_error(format!("Could not load Rock-on details: {e}"));
                if let Some(action) = self.finish_wizard() {
                    self.perform(action);
                }
            }
        }
    }

    pub fn set_error(&mut self, text: String) {
        self.message = Some(Message {
            text,
            is_error: true,
        });
    }

    pub fn set_info(&mut self, text: String) {
        self.message = Some(Message {
            text,
            is_error: false,
        });
    }

    pub fn tick(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % 4;
    }

    pub fn spinner_char(&self) -> char {
        const SPINNER: [char; 4] = ['|', '/', '-', '\\'];
        SPINNER[self.spinner_frame]
    }

    /// Update status bar based on current application state
    pub fn update_status_bar(&mut self) {
        self.status_bar = if self.busy.is_some() {
            StatusBarState::executing()
        } else if self.confirm_action.is_some() {
            StatusBarState::confirm()
        } else if self.vim_mode == VimMode::Command {
            StatusBarState::command_mode()
        } else if let Some(wizard) = &self.wizard {
            match (wizard.current_step(), self.vim_mode) {
                _ if wizard.phase() == WizardPhase::Saving => StatusBarState::executing(),
                (_, VimMode::Insert) => StatusBarState::wizard_form_insert(),
                (Some(StepKind::InfoSummary), _) => StatusBarState::wizard_info(),
                (Some(StepKind::AddLabel), _) => StatusBarState::wizard_add_label(),
                (Some(step), _) if step.has_form() => StatusBarState::wizard_form_normal(),
                (Some(StepKind::Summary), _)
                    if wizard.kind == WizardKind::Settings && wizard.index() == 0 =>
                {
                    StatusBarState::wizard_settings_home(wizard.session.rockon.volume_add_support)
                }
                _ => StatusBarState::wizard_page(),
            }
        } else {
            match self.selected_rockon() {
                Some(r) if self.tab == Tab::Installed => {
                    StatusBarState::installed(r.is_started(), r.is_pending())
                }
                Some(_) => StatusBarState::available(),
                None => StatusBarState::empty_tab(),
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DryrunService;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> (ManagerApp, mpsc::UnboundedReceiver<AppMessage>) {
        let mut config = ManagerConfig::default();
        config.general.dryrun = true;
        let (mut app, rx) = ManagerApp::new(config, Arc::new(DryrunService::new()));
        app.set_rockons(crate::api::DemoAppliance::new().poll());
        (app, rx)
    }

    fn select(app: &mut ManagerApp, name: &str) {
        let idx = app
            .visible_rockons()
            .iter()
            .position(|r| r.name == name)
            .unwrap();
        app.selected = idx;
    }

    /// Run the action and feed every resulting message back until idle
    async fn drive(
        app: &mut ManagerApp,
        rx: &mut mpsc::UnboundedReceiver<AppMessage>,
        action: ManagerAction,
    ) {
        app.perform(action);
        while let Ok(Some(message)) =
            tokio::time::timeout(Duration::from_millis(200), rx.recv()).await
        {
            app.handle_message(message);
        }
    }

    #[test]
    fn tabs_partition_the_catalog() {
        let (mut app, _rx) = app();
        let installed: Vec<_> = app.visible_rockons().iter().map(|r| r.name.clone()).collect();
        assert_eq!(installed, vec!["Syncthing", "Plex"]);

        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.tab, Tab::Available);
        let available: Vec<_> = app.visible_rockons().iter().map(|r| r.name.clone()).collect();
        assert_eq!(available, vec!["Transmission", "Nextcloud"]);
    }

    #[test]
    fn selection_stays_in_bounds() {
        let (mut app, _rx) = app();
        app.handle_key(key(KeyCode::Char('k')));
        assert_eq!(app.selected, 0);
        for _ in 0..5 {
            app.handle_key(key(KeyCode::Char('j')));
        }
        assert_eq!(app.selected, 1);
    }

    #[test]
    fn space_toggles_started_state() {
        let (mut app, _rx) = app();
        select(&mut app, "Syncthing");
        assert_eq!(app.handle_key(key(KeyCode::Char(' '))), Some(ManagerAction::Stop(1)));

        select(&mut app, "Plex");
        assert_eq!(app.handle_key(key(KeyCode::Char(' '))), Some(ManagerAction::Start(2)));
    }

    #[test]
    fn uninstall_needs_stopped_rockon_and_confirmation() {
        let (mut app, _rx) = app();
        select(&mut app, "Syncthing");
        assert_eq!(app.handle_key(key(KeyCode::Char('u'))), None);
        assert!(app.message.as_ref().is_some_and(|m| m.is_error));
        assert!(app.confirm_action.is_none());

        select(&mut app, "Plex");
        app.handle_key(key(KeyCode::Char('u')));
        assert_eq!(
            app.confirm_action.as_ref().map(ConfirmAction::prompt).as_deref(),
            Some("Are you sure you want to uninstall this Rock-on (Plex)?")
        );
        assert_eq!(app.handle_key(key(KeyCode::Char('y'))), Some(ManagerAction::Uninstall(2)));
        assert!(app.confirm_action.is_none());
    }

    #[test]
    fn enter_opens_wizard_for_tab() {
        let (mut app, _rx) = app();
        app.handle_key(key(KeyCode::Tab));
        select(&mut app, "Transmission");
        assert_eq!(
            app.handle_key(key(KeyCode::Enter)),
            Some(ManagerAction::LoadPrerequisites {
                rid: 3,
                set: PrerequisiteSet::Install
            })
        );
        assert_eq!(app.wizard.as_ref().map(|w| w.kind), Some(WizardKind::Install));
        assert!(!app.is_polling());
    }

    #[test]
    fn info_needs_more_info() {
        let (mut app, _rx) = app();
        select(&mut app, "Syncthing");
        assert_eq!(app.handle_key(key(KeyCode::Char('m'))), None);
        assert!(app.wizard.is_none());

        select(&mut app, "Plex");
        assert_eq!(app.handle_key(key(KeyCode::Char('m'))), None);
        assert_eq!(app.wizard.as_ref().map(|w| w.kind), Some(WizardKind::Info));

        assert_eq!(app.handle_key(key(KeyCode::Esc)), Some(ManagerAction::Refresh));
        assert!(app.wizard.is_none());
    }

    #[test]
    fn commands_route_to_actions() {
        let (mut app, _rx) = app();
        for c in ":update".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(app.vim_mode, VimMode::Command);
        assert_eq!(app.handle_key(key(KeyCode::Enter)), Some(ManagerAction::UpdateCatalog));
        assert_eq!(app.vim_mode, VimMode::Normal);

        for c in ":bogus".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.message.as_ref().map(|m| m.text.as_str()), Some("Unknown command: bogus"));
    }

    #[test]
    fn stale_poll_results_are_ignored() {
        let (mut app, _rx) = app();
        app.handle_message(AppMessage::Polled {
            generation: 42,
            elapsed: Duration::ZERO,
            result: Ok(Vec::new()),
        });
        assert_eq!(app.rockons.len(), 4);
    }

    #[tokio::test]
    async fn toggle_polls_until_settled() {
        let (mut app, mut rx) = app();
        app.config.poll.interval_ms = 10;
        app.poller = Poller::new(&app.config.poll);

        select(&mut app, "Plex");
        drive(&mut app, &mut rx, ManagerAction::Start(2)).await;

        let plex = app.rockons.iter().find(|r| r.id == 2).unwrap();
        assert!(plex.is_started());
        assert!(!app.is_polling());
        assert!(app.busy.is_none());
        assert_eq!(app.tab, Tab::Installed);
    }

    #[tokio::test]
    async fn finished_toggle_leaves_open_wizard_unpolled() {
        let (mut app, _rx) = app();
        app.perform(ManagerAction::Stop(1));
        assert!(app.busy.is_some());

        select(&mut app, "Plex");
        let action = app.handle_key(key(KeyCode::Enter));
        assert!(matches!(action, Some(ManagerAction::LoadPrerequisites { rid: 2, .. })));

        app.handle_message(AppMessage::ActionDone {
            kind: ActionKind::Toggle,
            result: Ok(()),
        });
        assert!(app.wizard.is_some());
        assert!(app.busy.is_none());
        assert!(!app.is_polling());

        // Closing the overlay is what brings polling back
        assert_eq!(app.handle_key(key(KeyCode::Esc)), Some(ManagerAction::Refresh));
    }

    #[tokio::test]
    async fn install_wizard_end_to_end() {
        let (mut app, mut rx) = app();
        app.handle_key(key(KeyCode::Tab));
        select(&mut app, "Transmission");
        let action = app.handle_key(key(KeyCode::Enter)).unwrap();
        drive(&mut app, &mut rx, action).await;

        let wizard = app.wizard.as_ref().unwrap();
        assert_eq!(
            wizard.steps(),
            &[
                StepKind::ShareChoice,
                StepKind::PortChoice,
                StepKind::CustomConfigChoice,
                StepKind::Summary,
                StepKind::Complete
            ]
        );

        // Shares: pick distinct shares for both volumes
        app.handle_key(key(KeyCode::Char(' ')));
        app.handle_key(key(KeyCode::Char('j')));
        app.handle_key(key(KeyCode::Char(' ')));
        app.handle_key(key(KeyCode::Char('l')));
        assert_eq!(app.handle_key(key(KeyCode::Char('n'))), None);
        assert_eq!(app.wizard.as_ref().unwrap().index(), 1);

        // Ports keep their defaults
        app.handle_key(key(KeyCode::Char('n')));

        // Custom config: the password field is empty and required
        app.handle_key(key(KeyCode::Char('n')));
        assert!(app.message.as_ref().is_some_and(|m| m.is_error));
        app.handle_key(key(KeyCode::Char('j')));
        app.handle_key(key(KeyCode::Char('i')));
        assert_eq!(app.vim_mode, VimMode::Insert);
        for c in "s3cret".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Esc));
        app.handle_key(key(KeyCode::Char('n')));

        // Summary submits the install
        let submit = app.handle_key(key(KeyCode::Char('n'))).unwrap();
        assert!(matches!(submit, ManagerAction::Submit(WizardSubmit::Install(3, _))));
        drive(&mut app, &mut rx, submit).await;
        assert_eq!(app.wizard.as_ref().unwrap().current_step(), Some(StepKind::Complete));

        // Close hands control back and restarts polling
        let refresh = app.handle_key(key(KeyCode::Char('n'))).unwrap();
        assert_eq!(refresh, ManagerAction::Refresh);
        assert!(app.wizard.is_none());
        assert_eq!(app.tab, Tab::Installed);
    }
}
