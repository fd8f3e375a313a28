#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no resolvable identity for name: {0}")]
    NotFound(String),
    #[error("profile service unavailable: {0}")]
    Unavailable(String),
    #[error("malformed texture payload: {0}")]
    Malformed(String),
}

/// Composite failure of one tile's visual. Absorbed by the page builder.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("icon unavailable for {entry}: {cause}")]
pub struct IconUnavailable {
    pub entry: String,
    #[source]
    pub cause: ResolveError,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MenuError {
    #[error("duplicate entry id: {0}")]
    DuplicateEntry(String),
    #[error("more than one tool entry: {0} and {1}")]
    MultipleTools(String, String),
    #[error("grid capacity {0} is below the minimum of {1}")]
    CapacityTooSmall(usize, usize),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("entry {0} must set exactly one of icon, player or texture")]
    AmbiguousIcon(String),
}
