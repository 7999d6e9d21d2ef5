//! Field rules applied before a wizard page writes to the session.

use regex::Regex;
use std::sync::LazyLock;

// Patterns are literals; compiling them cannot fail.
static DEVICE_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/dev/[A-Za-z0-9,-/ ]+$").unwrap());
static NETWORK_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());

/// Docker's built-in networks cannot be created or attached by name
const RESERVED_NETWORKS: [&str; 3] = ["host", "bridge", "null"];

pub const REQUIRED: &str = "This field is required.";

/// Error attached to one field of the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: usize,
    pub message: String,
}

impl FieldError {
    pub fn new(field: usize, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn required(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(REQUIRED.to_string());
    }
    Ok(())
}

/// Host port: required, numeric, in 1..=65535
pub fn port_number(value: &str) -> Result<u16, String> {
    required(value)?;
    let value = value.trim();
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err("Please enter a valid number.".to_string());
    }
    match value.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err("Please enter a port between 1 and 65535.".to_string()),
    }
}

/// Device path is optional; when given it must name something under /dev
pub fn device_path(value: &str) -> Result<(), String> {
    let value = value.trim();
    if value.is_empty() || DEVICE_PATH_RE.is_match(value) {
        Ok(())
    } else {
        Err("Please enter a valid device path (e.g. /dev/dri).".to_string())
    }
}

pub fn absolute_path(value: &str) -> Result<(), String> {
    required(value)?;
    if value.trim().starts_with('/') {
        Ok(())
    } else {
        Err("Please enter an absolute path (starting with /).".to_string())
    }
}

/// Name for a docker network created on the fly
pub fn network_name(value: &str) -> Result<(), String> {
    let value = value.trim();
    if !NETWORK_NAME_RE.is_match(value) {
        return Err(format!(
            "Invalid network name '{value}': only letters and digits are allowed."
        ));
    }
    if RESERVED_NETWORKS.contains(&value) {
        return Err(format!("'{value}' is a reserved network name."));
    }
    Ok(())
}

/// Whether values for this label should be masked while typing
pub fn is_secret_label(label: &str) -> bool {
    label.to_lowercase().contains("password")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_rules() {
        assert_eq!(port_number("8080"), Ok(8080));
        assert_eq!(port_number(" 443 "), Ok(443));
        assert_eq!(port_number(""), Err(REQUIRED.to_string()));
        assert!(port_number("80a").is_err());
        assert!(port_number("-1").is_err());
        assert!(port_number("0").is_err());
        assert!(port_number("65536").is_err());
    }

    #[test]
    fn device_path_is_optional_but_checked() {
        assert!(device_path("").is_ok());
        assert!(device_path("/dev/dri").is_ok());
        assert!(device_path("/dev/dri/renderD128").is_ok());
        assert!(device_path("/tmp/dri").is_err());
        assert!(device_path("/dev/").is_err());
    }

    #[test]
    fn network_names_exclude_reserved_and_symbols() {
        assert!(network_name("medianet").is_ok());
        assert!(network_name("net2").is_ok());
        assert!(network_name("media-net").is_err());
        assert!(network_name("host").is_err());
        assert!(network_name("bridge").is_err());
        assert!(network_name("").is_err());
    }

    #[test]
    fn absolute_path_required() {
        assert!(absolute_path("/srv/data").is_ok());
        assert!(absolute_path("srv/data").is_err());
        assert_eq!(absolute_path("  "), Err(REQUIRED.to_string()));
    }

    #[test]
    fn secret_labels() {
        assert!(is_secret_label("WebUI Password"));
        assert!(!is_secret_label("WebUI username"));
    }
}
