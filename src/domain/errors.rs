/// Configuration-time failures. Any of these aborts the run before a report exists.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("duplicate subsystem id: {0}")]
    DuplicateId(String),
    #[error("unknown subsystem: {0}")]
    UnknownSubsystem(String),
    #[error("cyclic dependency: {}", .members.join(" -> "))]
    CyclicDependency { members: Vec<String> },
    #[error("unsupported domain: {0}")]
    UnsupportedDomain(String),
    #[error("run cancelled after {completed} subsystems")]
    Cancelled { completed: usize },
}

pub type EngineResult<T> = Result<T, EngineError>;

/// A model input or output left the numeric domain (zero divisor, log of a
/// non-positive value, non-finite metric). Recovered into a FAILED result.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid operating point: {0}")]
pub struct InvalidOperatingPoint(pub String);
