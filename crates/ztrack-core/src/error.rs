use std::fmt;
use std::io;

/// Machine-readable error codes for scripts and operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    UnknownSortKey,
    InvalidStoreKey,
    ConfigParseError,
    StoreReadFailed,
    StoreWriteFailed,
    MalformedValue,
    StoreUnavailable,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::UnknownSortKey => "E1001",
            Self::InvalidStoreKey => "E1002",
            Self::ConfigParseError => "E2001",
            Self::StoreReadFailed => "E3001",
            Self::StoreWriteFailed => "E3002",
            Self::MalformedValue => "E3003",
            Self::StoreUnavailable => "E3004",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::UnknownSortKey => "Unknown sort key",
            Self::InvalidStoreKey => "Invalid store key",
            Self::ConfigParseError => "Config file parse error",
            Self::StoreReadFailed => "State read failed",
            Self::StoreWriteFailed => "State write failed",
            Self::MalformedValue => "Malformed persisted value",
            Self::StoreUnavailable => "State storage unavailable",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::UnknownSortKey => Some("Sort by one of: name, world, distance, elevation, xp."),
            Self::InvalidStoreKey => None,
            Self::ConfigParseError => Some("Fix syntax in config.toml under the state directory."),
            Self::StoreReadFailed | Self::StoreWriteFailed => {
                Some("Check that the state directory exists and is writable.")
            }
            Self::MalformedValue => Some("Run `zt reset` to discard the corrupt state."),
            Self::StoreUnavailable => Some("Changes are kept for this session only."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised by the table state engine.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    /// A column name that does not name a record attribute.
    #[error("unknown sort key '{0}': expected one of name, world, distance, elevation, xp")]
    UnknownSortKey(String),

    /// Store keys map to file names and must stay within `[A-Za-z0-9_-]`.
    #[error("invalid store key '{0}'")]
    InvalidKey(String),

    #[error("failed to read state '{key}': {source}")]
    StoreRead {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write state '{key}': {source}")]
    StoreWrite {
        key: String,
        #[source]
        source: io::Error,
    },

    /// Stored bytes that do not deserialize into the requested type.
    #[error("malformed value for '{key}': {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The durable medium refused the operation outright.
    #[error("state storage unavailable: {0}")]
    Unavailable(String),
}

impl TrackError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownSortKey(_) => ErrorCode::UnknownSortKey,
            Self::InvalidKey(_) => ErrorCode::InvalidStoreKey,
            Self::StoreRead { .. } => ErrorCode::StoreReadFailed,
            Self::StoreWrite { .. } => ErrorCode::StoreWriteFailed,
            Self::Malformed { .. } => ErrorCode::MalformedValue,
            Self::Unavailable(_) => ErrorCode::StoreUnavailable,
        }
    }

    /// Optional remediation hint for operators.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, TrackError>;
