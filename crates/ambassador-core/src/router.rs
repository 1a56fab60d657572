//! Path-prefix routing (C4) and the `main.xml` document it feeds.

use url::Url;

/// The fixed prefix table of §4.4, in match order.
const PREFIX_TABLE: &[&str] = &[
    "/main-api/",
    "/main-cdn/",
    "/image-cdn/",
    "/game-image-cdn/",
    "/cdn-dynamic/",
    "/cdn-dynamic-common/",
];

/// The six upstream base URLs, keyed by the prefixes in [`PREFIX_TABLE`].
///
/// Loaded once at startup by `ambassador-config` and shared read-only across
/// every session and request afterward.
#[derive(Debug, Clone)]
pub struct RoutingConfiguration {
    /// `main_api_base_url`
    pub main_api: Url,
    /// `main_cdn_base_url`
    pub main_cdn: Url,
    /// `image_cdn_base_url`
    pub image_cdn: Url,
    /// `game_image_cdn_base_url`
    pub game_image_cdn: Url,
    /// `cdn_dynamic_base_url`
    pub cdn_dynamic: Url,
    /// `cdn_dynamic_common_base_url`
    pub cdn_dynamic_common: Url,
}

impl RoutingConfiguration {
    fn base_for_prefix(&self, prefix: &str) -> &Url {
        match prefix {
            "/main-api/" => &self.main_api,
            "/main-cdn/" => &self.main_cdn,
            "/image-cdn/" => &self.image_cdn,
            "/game-image-cdn/" => &self.game_image_cdn,
            "/cdn-dynamic/" => &self.cdn_dynamic,
            "/cdn-dynamic-common/" => &self.cdn_dynamic_common,
            _ => unreachable!("prefix always comes from PREFIX_TABLE"),
        }
    }
}

/// Collapse every maximal run of `/` into a single `/` (§4.4 step 1).
fn normalize_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_was_slash = false;
    for ch in path.chars() {
        if ch == '/' {
            if !prev_was_slash {
                out.push('/');
            }
            prev_was_slash = true;
        } else {
            out.push(ch);
            prev_was_slash = false;
        }
    }
    out
}

/// Resolves a client-visible request path to an upstream URL by prefix
/// match, stateless beyond the [`RoutingConfiguration`] it wraps.
pub struct PathRouter<'a> {
    config: &'a RoutingConfiguration,
}

impl<'a> PathRouter<'a> {
    /// Wrap a routing configuration for resolution.
    #[must_use]
    pub fn new(config: &'a RoutingConfiguration) -> Self {
        Self { config }
    }

    /// Resolve `path` to an upstream URL (§4.4 steps 1-4).
    ///
    /// Returns `None` if no table prefix matches. The caller treats this
    /// as a 404-equivalent (`NoRoute`, §7).
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<Url> {
        let normalized = normalize_slashes(path);

        let prefix = PREFIX_TABLE.iter().find(|prefix| normalized.starts_with(*prefix))?;
        let remainder = &normalized[prefix.len()..];
        let base = self.config.base_for_prefix(prefix);

        base.join(remainder).ok()
    }
}

/// Render the static `main.xml` document served at `/ow/static/main.xml`
/// (§4.4, §6).
///
/// Every client-facing base URL is built from the ambassador's own
/// `listen_host`/`listen_port` plus the matching entry in [`PREFIX_TABLE`],
/// per spec.md §4.4 ("client-facing base URLs, reconstructed from the
/// listen host/port") and `routing.py`'s `make_main_xml_data` (every param
/// is `ambassador_base_url + path`, never the upstream base URL). A client
/// that trusted an upstream URL here would bypass the HTTP proxy, and its
/// C5 scanning, entirely.
#[must_use]
pub fn render_main_xml(listen_host: &str, listen_port: u16, _config: &RoutingConfiguration) -> String {
    let base = format!("http://{listen_host}:{listen_port}");
    let client_url = format!("{base}/ow");
    let main_api = format!("{base}/main-api/");
    let main_cdn = format!("{base}/main-cdn/");
    let image_cdn = format!("{base}/image-cdn/");
    let game_image_cdn = format!("{base}/game-image-cdn/");
    let cdn_dynamic = format!("{base}/cdn-dynamic/");
    let cdn_dynamic_common = format!("{base}/cdn-dynamic-common/");

    format!(
        "<supershell v=\"1\"><mobile>\
<url>{client_url}</url>\
<version>1</version>\
<core-version>1</core-version>\
<dsop>0</dsop>\
<main>{main_api}</main>\
<cdn>{main_cdn}</cdn>\
<image>{image_cdn}</image>\
<game-image>{game_image_cdn}</game-image>\
<cdn-dynamic-personal>{cdn_dynamic}</cdn-dynamic-personal>\
<cdn-dynamic-photos>{cdn_dynamic}</cdn-dynamic-photos>\
<cdn-dynamic-contests>{cdn_dynamic}</cdn-dynamic-contests>\
<cdn-dynamic-crews>{cdn_dynamic}</cdn-dynamic-crews>\
<cdn-dynamic-common>{cdn_dynamic_common}</cdn-dynamic-common>\
<env>production</env>\
<landing>{client_url}</landing>\
<future>0</future>\
</mobile></supershell>"
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn config_with_all_bases(base: &str) -> RoutingConfiguration {
        let url = Url::parse(base).expect("valid base");
        RoutingConfiguration {
            main_api: url.clone(),
            main_cdn: url.clone(),
            image_cdn: url.clone(),
            game_image_cdn: url.clone(),
            cdn_dynamic: url.clone(),
            cdn_dynamic_common: url,
        }
    }

    #[test]
    fn resolves_main_api_prefix() {
        let config = {
            let mut c = config_with_all_bases("http://x.example.com/");
            c.main_api = Url::parse("http://main-api.example.com/").unwrap();
            c
        };
        let router = PathRouter::new(&config);
        let resolved = router.resolve("/main-api/1/2/3").expect("routes");
        assert_eq!(resolved.as_str(), "http://main-api.example.com/1/2/3");
    }

    #[test]
    fn normalizes_repeated_slashes_before_matching() {
        let config = {
            let mut c = config_with_all_bases("http://x.example.com/");
            c.main_cdn = Url::parse("http://main-cdn.example.com/").unwrap();
            c
        };
        let router = PathRouter::new(&config);
        let resolved = router.resolve("//main-cdn///4/5").expect("routes");
        assert_eq!(resolved.as_str(), "http://main-cdn.example.com/4/5");
    }

    #[test]
    fn unknown_prefix_yields_no_route() {
        let config = config_with_all_bases("http://x.example.com/");
        let router = PathRouter::new(&config);
        assert!(router.resolve("/unknown/path").is_none());
    }

    #[test]
    fn main_xml_points_every_entry_back_at_the_listen_address() {
        // The upstream base URLs must never leak into main.xml: a client
        // that trusted them would bypass the HTTP proxy entirely.
        let config = config_with_all_bases("http://upstream.example.com/");
        let xml = render_main_xml("127.0.0.1", 8080, &config);
        assert!(xml.starts_with("<supershell v=\"1\"><mobile>"));
        assert!(xml.contains("<url>http://127.0.0.1:8080/ow</url>"));
        assert!(xml.contains("<main>http://127.0.0.1:8080/main-api/</main>"));
        assert!(xml.contains("<cdn>http://127.0.0.1:8080/main-cdn/</cdn>"));
        assert!(xml.contains("<image>http://127.0.0.1:8080/image-cdn/</image>"));
        assert!(xml.contains("<game-image>http://127.0.0.1:8080/game-image-cdn/</game-image>"));
        assert!(xml.contains(
            "<cdn-dynamic-personal>http://127.0.0.1:8080/cdn-dynamic/</cdn-dynamic-personal>"
        ));
        assert!(xml.contains(
            "<cdn-dynamic-common>http://127.0.0.1:8080/cdn-dynamic-common/</cdn-dynamic-common>"
        ));
        assert!(!xml.contains("upstream.example.com"));
        assert!(xml.ends_with("</mobile></supershell>"));
    }
}
