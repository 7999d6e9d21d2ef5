/// Key hints shown in the bottom bar, refreshed after every key press
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusBarState {
    /// Left side hint text (e.g., "j/k: navigate  Tab: switch tab")
    pub left_hint: String,
    /// Right side hint text (e.g., "Enter: install  :help")
    pub right_hint: String,
}

impl StatusBarState {
    fn new(left: &str, right: &str) -> Self {
        Self {
            left_hint: left.to_string(),
            right_hint: right.to_string(),
        }
    }

    /// Installed tab with an add-on selected
    pub fn installed(started: bool, pending: bool) -> Self {
        if pending {
            return Self::new("j/k: navigate  Tab: available", "Working... r: refresh  :help");
        }
        if started {
            Self::new(
                "j/k: navigate  Tab: available",
                "Space: stop  Enter: settings  m: info  :help",
            )
        } else {
            Self::new(
                "j/k: navigate  Tab: available",
                "Space: start  Enter: settings  u: uninstall  :help",
            )
        }
    }

    pub fn available() -> Self {
        Self::new(
            "j/k: navigate  Tab: installed",
            "Enter: install  m: info  :update  :help",
        )
    }

    pub fn empty_tab() -> Self {
        Self::new("Tab: switch tab", ":update  r: refresh  :help")
    }

    pub fn wizard_form_normal() -> Self {
        Self::new(
            "j/k: fields  i: edit  Space: toggle/select",
            "n: next  p: previous  Esc: cancel",
        )
    }

    pub fn wizard_form_insert() -> Self {
        Self::new("Type to enter text", "Esc: normal  Tab: next field")
    }

    pub fn wizard_add_label() -> Self {
        Self::new(
            "j/k: fields  i: edit  +/-: add/remove label",
            "n: next  p: previous  Esc: cancel",
        )
    }

    pub fn wizard_settings_home(volume_add_support: bool) -> Self {
        let right = if volume_add_support {
            "a: add label  e: edit ports  n: add storage  Esc: close"
        } else {
            "a: add label  e: edit ports  Esc: close"
        };
        Self::new("Current settings", right)
    }

    pub fn wizard_page() -> Self {
        Self::new("", "n: next  p: previous  Esc: cancel")
    }

    pub fn wizard_info() -> Self {
        Self::new("", "Esc: close")
    }

    pub fn command_mode() -> Self {
        Self::new("", "Enter: run  Esc: cancel")
    }

    pub fn confirm() -> Self {
        Self::new("", "y: confirm  n: cancel")
    }

    /// Hints while a request is in flight
    pub fn executing() -> Self {
        Self::new("Please wait...", "")
    }
}
