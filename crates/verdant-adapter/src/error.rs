//! Startup errors raised while choosing an adapter.

use crate::version::RuntimeVersion;

/// Fatal initialization errors. No adapter is installed when one is returned.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VersionError {
    /// The banner did not contain a `(MC: <major>.<minor>[.<patch>])` token.
    #[error("could not determine host version from banner: {0}")]
    Parse(String),

    /// The version parsed but no adapter targets it.
    #[error(
        "host version {0} is not supported; supported versions are 1.19 through 1.21"
    )]
    Unsupported(RuntimeVersion),
}
