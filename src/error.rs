/// Result type alias for the application
pub type Result<T> = std::result::Result<T, Error>;

/// Fixed message returned when a generation request carries no descriptors
pub const INPUT_MISSING_MESSAGE: &str = "Request data is missing or null.";

/// Error types for the application
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    /// The descriptor list was absent, null or empty
    InputMissing,
    /// The request payload could not be decoded
    InvalidRequest(String),
    SerializationError(String),
}

impl Error {
    /// Whether the caller is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InputMissing | Error::InvalidRequest(_))
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::InputMissing => f.write_str(INPUT_MISSING_MESSAGE),
            Error::InvalidRequest(msg) => write!(f, "Invalid request data: {}", msg),
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML serialization error: {}", err))
    }
}
