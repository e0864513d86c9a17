use std::path::PathBuf;

/// Errors raised while building a showreel from configuration.
#[derive(Debug, thiserror::Error)]
pub enum ShowreelError {
    #[error("rotation needs at least one item")]
    EmptyRotation,

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("failed to read manifest {path:?}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest {path:?}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to scan media directory {path:?}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no media files found in directory {0:?}")]
    NoMedia(PathBuf),
}

/// Failure reported by the rendering host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("element is no longer mounted")]
    Unmounted,

    #[error("host error: {0}")]
    Other(String),
}
