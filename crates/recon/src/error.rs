use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// Record-kind tag other than `route` / `roster`.
    InvalidKind(String),
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (no inputs, empty path, bad attempt count).
    ConfigValidation(String),
    /// A record store rejected a write.
    Store(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKind(tag) => {
                write!(f, "invalid record kind '{tag}' (expected \"route\" or \"roster\")")
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Store(msg) => write!(f, "store error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
