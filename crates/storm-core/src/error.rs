use std::path::PathBuf;

/// Errors surfaced by the animation core.
///
/// Construction-time problems are reported here. Nothing on the per-tick path
/// returns an error: a missing asset or an empty pick is a normal outcome.
#[derive(Debug, thiserror::Error)]
pub enum StormError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Asset(#[from] AssetLoadFailure),
}

/// Why an external asset could not be loaded. Terminal for that asset only.
#[derive(Debug, thiserror::Error)]
pub enum AssetLoadFailure {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("model contains no triangles")]
    Empty,
}

pub type Result<T> = std::result::Result<T, StormError>;

pub(crate) fn invalid(msg: impl Into<String>) -> StormError {
    StormError::InvalidConfig(msg.into())
}
