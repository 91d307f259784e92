use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by pear. Every variant is fatal to the current invocation.
#[derive(Debug, Error)]
pub enum Error {
    /// `git` is not on `PATH`.
    #[error("`git` not found in PATH")]
    GitNotFound,

    /// The working directory is not inside a git work tree.
    #[error("Pear only works in a git repository")]
    NotARepository,

    /// A `git` invocation exited unsuccessfully.
    #[error("`git {args}` failed: {message}")]
    Git { args: String, message: String },

    /// `user.name` is not set, so there is no current pair to show.
    #[error("No git user is currently set, try `git config user.name` to confirm")]
    NoUser,

    /// Reading or writing a file failed.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file exists but is not valid YAML for a pear config.
    #[error("cannot parse {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("cannot serialize config: {0}")]
    ConfigSerialize(#[source] serde_yaml::Error),

    /// Terminal input could not be collected.
    #[error("prompt error: {0}")]
    Prompt(String),

    /// A base email without exactly one `@`.
    #[error("invalid base email: {0:?}")]
    InvalidEmail(String),

    /// A key recorded in `pear.devs` is missing from the config file.
    #[error("No dev found: {0}")]
    NoDev(String),

    #[error("A file name as the first argument is required for Augment")]
    MissingMessageFile,

    #[error("cannot determine home directory")]
    NoHomeDir,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
