/// Failures surfaced by the episode and training machinery.
///
/// Only `Configuration` and `Parse` are fatal, and only at startup.
/// Everything else is contained to a single episode by the actor loop.
#[derive(Debug)]
pub enum Error {
    /// The oracle or coordinator could not be reached.
    OracleUnavailable(String),
    /// The substrate found a model on an instance assumed to be unsatisfiable.
    UnexpectedSatisfiable(String),
    /// Unknown policy kind, missing option, or inconsistent settings.
    Configuration(String),
    /// Malformed DIMACS or weight file.
    Parse(String),
    Io(std::io::Error),
    /// A background task panicked or was cancelled.
    Task(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OracleUnavailable(s) => write!(f, "oracle unavailable: {}", s),
            Self::UnexpectedSatisfiable(s) => write!(f, "unexpected satisfiable: {}", s),
            Self::Configuration(s) => write!(f, "configuration error: {}", s),
            Self::Parse(s) => write!(f, "parse error: {}", s),
            Self::Io(e) => write!(f, "io error: {}", e),
            Self::Task(s) => write!(f, "task failed: {}", s),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

impl Error {
    /// Whether the long-running service may continue after this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::OracleUnavailable(_) | Self::UnexpectedSatisfiable(_))
    }
}
