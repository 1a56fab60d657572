//! Configuration loading errors (§7 `ConfigError`).

use thiserror::Error;

/// Fatal at startup. The core is never entered if loading fails.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read, or is not valid INI syntax.
    #[error("failed to load config file {path}: {source}")]
    Load {
        /// Path that failed to load.
        path: String,
        /// Underlying I/O or parse error.
        #[source]
        source: ini::Error,
    },

    /// A required `[section]` is absent.
    #[error("missing section [{section}]")]
    MissingSection {
        /// Section name.
        section: &'static str,
    },

    /// A required key is absent from a section that is otherwise present.
    #[error("missing key '{key}' in section [{section}]")]
    MissingKey {
        /// Section name.
        section: &'static str,
        /// Key name.
        key: &'static str,
    },

    /// A key's value could not be parsed as the expected type.
    #[error("invalid value for '{key}' in section [{section}]: {value:?}")]
    InvalidValue {
        /// Section name.
        section: &'static str,
        /// Key name.
        key: &'static str,
        /// The offending raw value.
        value: String,
    },
}
