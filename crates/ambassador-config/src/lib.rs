//! INI configuration loading for the ambassador proxy (§6 Configuration
//! file).
//!
//! An external collaborator in the proxy's own trust model (the core never
//! parses its own configuration), but still part of the ambient stack every
//! runnable binary needs, so it gets the same typed-error treatment as the
//! rest of the workspace.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod errors;

use std::path::Path;

use ambassador_core::RoutingConfiguration;
pub use errors::ConfigError;
use url::Url;

/// `[listening]`: the two listen endpoints (§6).
#[derive(Debug, Clone)]
pub struct ListenConfig {
    /// `http_proxy_host`
    pub http_host: String,
    /// `http_proxy_port`
    pub http_port: u16,
    /// `game_proxy_host`
    pub game_host: String,
    /// `game_proxy_port`
    pub game_port: u16,
}

/// `[forwarding]`: the single upstream game websocket (§6).
#[derive(Debug, Clone)]
pub struct ForwardingConfig {
    /// `upstream_game_websocket`
    pub upstream_game_websocket: Url,
}

/// The full, validated configuration record loaded once at startup.
#[derive(Debug, Clone)]
pub struct AmbassadorConfig {
    /// Listen endpoints for both proxies.
    pub listen: ListenConfig,
    /// Upstream game websocket.
    pub forwarding: ForwardingConfig,
    /// The six upstream HTTP base URLs, ready for `ambassador-core::router`.
    pub routing: RoutingConfiguration,
}

impl AmbassadorConfig {
    /// Load and validate configuration from an INI file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, is not valid INI,
    /// or is missing a required section, key, or has a key that fails to
    /// parse as its expected type.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ini = ini::Ini::load_from_file(path)
            .map_err(|source| ConfigError::Load { path: path.display().to_string(), source })?;

        Self::from_ini(&ini)
    }

    fn from_ini(ini: &ini::Ini) -> Result<Self, ConfigError> {
        let listening = section(ini, "listening")?;
        let forwarding = section(ini, "forwarding")?;
        let forwarding_http = section(ini, "forwarding-http")?;

        let listen = ListenConfig {
            http_host: string_key(listening, "listening", "http_proxy_host")?,
            http_port: int_key(listening, "listening", "http_proxy_port")?,
            game_host: string_key(listening, "listening", "game_proxy_host")?,
            game_port: int_key(listening, "listening", "game_proxy_port")?,
        };

        let forwarding = ForwardingConfig {
            upstream_game_websocket: url_key(
                forwarding,
                "forwarding",
                "upstream_game_websocket",
            )?,
        };

        let routing = RoutingConfiguration {
            main_api: url_key(forwarding_http, "forwarding-http", "main_api_base_url")?,
            main_cdn: url_key(forwarding_http, "forwarding-http", "main_cdn_base_url")?,
            image_cdn: url_key(forwarding_http, "forwarding-http", "image_cdn_base_url")?,
            game_image_cdn: url_key(
                forwarding_http,
                "forwarding-http",
                "game_image_cdn_base_url",
            )?,
            cdn_dynamic: url_key(forwarding_http, "forwarding-http", "cdn_dynamic_base_url")?,
            cdn_dynamic_common: url_key(
                forwarding_http,
                "forwarding-http",
                "cdn_dynamic_common_base_url",
            )?,
        };

        Ok(Self { listen, forwarding, routing })
    }
}

fn section<'a>(ini: &'a ini::Ini, name: &'static str) -> Result<&'a ini::Properties, ConfigError> {
    ini.section(Some(name)).ok_or(ConfigError::MissingSection { section: name })
}

fn string_key(
    props: &ini::Properties,
    section: &'static str,
    key: &'static str,
) -> Result<String, ConfigError> {
    props.get(key).map(str::to_owned).ok_or(ConfigError::MissingKey { section, key })
}

fn int_key(
    props: &ini::Properties,
    section: &'static str,
    key: &'static str,
) -> Result<u16, ConfigError> {
    let raw = props.get(key).ok_or(ConfigError::MissingKey { section, key })?;
    raw.parse::<u16>()
        .map_err(|_| ConfigError::InvalidValue { section, key, value: raw.to_owned() })
}

fn url_key(
    props: &ini::Properties,
    section: &'static str,
    key: &'static str,
) -> Result<Url, ConfigError> {
    let raw = props.get(key).ok_or(ConfigError::MissingKey { section, key })?;
    Url::parse(raw).map_err(|_| ConfigError::InvalidValue { section, key, value: raw.to_owned() })
}
