//! Error types and handling for `skycast`

use std::fmt;

use thiserror::Error;

/// Why the host could not supply a position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationUnavailableReason {
    /// The user or host refused access to the position
    Denied,
    /// No geolocation source exists on this host
    Unsupported,
}

impl fmt::Display for LocationUnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Denied => write!(f, "access denied"),
            Self::Unsupported => write!(f, "not supported"),
        }
    }
}

/// Main error type for `skycast`
#[derive(Error, Debug)]
pub enum SkycastError {
    /// The current-conditions endpoint does not know the requested location
    #[error("location not found: {location}")]
    NotFound { location: String },

    /// Any other non-success status, transport failure or malformed body
    #[error("Upstream failure: {message}")]
    UpstreamFailure { message: String },

    /// The geolocation collaborator could not produce coordinates
    #[error("Location unavailable: {reason}")]
    LocationUnavailable { reason: LocationUnavailableReason },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl SkycastError {
    /// Create a new not-found error for the given location description
    pub fn not_found<S: Into<String>>(location: S) -> Self {
        Self::NotFound {
            location: location.into(),
        }
    }

    /// Create a new upstream failure
    pub fn upstream<S: Into<String>>(message: S) -> Self {
        Self::UpstreamFailure {
            message: message.into(),
        }
    }

    pub fn location_unavailable(reason: LocationUnavailableReason) -> Self {
        Self::LocationUnavailable { reason }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SkycastError::NotFound { .. } => "Location not found.".to_string(),
            SkycastError::UpstreamFailure { .. } => {
                "Unable to retrieve weather data. Please try again.".to_string()
            }
            SkycastError::LocationUnavailable {
                reason: LocationUnavailableReason::Denied,
            } => "Location access denied. Unable to fetch local weather.".to_string(),
            SkycastError::LocationUnavailable {
                reason: LocationUnavailableReason::Unsupported,
            } => "Geolocation not supported on this host.".to_string(),
            SkycastError::Config { .. } => {
                "Configuration error. Please check your config file and API key.".to_string()
            }
            SkycastError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            SkycastError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
