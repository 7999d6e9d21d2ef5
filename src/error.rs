use thiserror::Error;

#[derive(Error, Debug)]
pub enum RockonError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid base URL: {0}")]
    BaseUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Rock-on ({0}) does not exist")]
    UnknownRockon(i64),

    #[error("Terminal error: {0}")]
    Terminal(String),
}

impl RockonError {
    /// Text for the message panel; API errors show the server's own wording
    pub fn user_message(&self) -> String {
        match self {
            RockonError::Api { message, .. } if !message.is_empty() => message.clone(),
            RockonError::Http(e) if e.is_timeout() => "The appliance did not answer in time.".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RockonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_show_server_detail() {
        let err = RockonError::Api {
            status: 500,
            message: "Docker service is not running.".to_string(),
        };
        assert_eq!(err.user_message(), "Docker service is not running.");

        let empty = RockonError::Api {
            status: 502,
            message: String::new(),
        };
        assert_eq!(empty.user_message(), "API error (502): ");
        assert_eq!(
            RockonError::UnknownRockon(4).user_message(),
            "Rock-on (4) does not exist"
        );
    }
}
