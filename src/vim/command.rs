use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Install,
    Uninstall,
    Settings,
    Info,
    Start,
    Stop,
    /// Refresh the catalog from the upstream Rock-on registry
    Update,
    /// Re-fetch the add-on list and restart polling
    Refresh,
    /// Jump to a tab by name
    Tab(Option<String>),
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),
}

pub fn parse_command(input: &str) -> Result<Command, CommandError> {
    let input = input.trim();
    let mut parts = input.splitn(2, ' ');
    let cmd = parts.next().unwrap_or("");
    let arg = parts.next().map(|s| s.trim().to_string());

    match cmd {
        "install" | "i" => Ok(Command::Install),
        "uninstall" | "un" => Ok(Command::Uninstall),
        "settings" | "set" => Ok(Command::Settings),
        "info" | "more" => Ok(Command::Info),
        "start" => Ok(Command::Start),
        "stop" => Ok(Command::Stop),
        "update" | "up" => Ok(Command::Update),
        "refresh" | "r" => Ok(Command::Refresh),
        "tab" | "t" => Ok(Command::Tab(arg)),
        "help" | "h" | "?" => Ok(Command::Help),
        "q" | "quit" | "exit" => Ok(Command::Quit),
        "" => Err(CommandError::Unknown("empty command".to_string())),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_aliases() {
        assert_eq!(parse_command("install"), Ok(Command::Install));
        assert_eq!(parse_command(" up "), Ok(Command::Update));
        assert_eq!(parse_command("q"), Ok(Command::Quit));
        assert_eq!(parse_command("tab available"), Ok(Command::Tab(Some("available".to_string()))));
        assert_eq!(parse_command("tab"), Ok(Command::Tab(None)));
    }

    #[test]
    fn rejects_unknown_and_empty() {
        assert_eq!(parse_command("reboot"), Err(CommandError::Unknown("reboot".to_string())));
        assert!(parse_command("   ").is_err());
    }
}
