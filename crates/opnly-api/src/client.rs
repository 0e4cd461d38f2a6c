// Firewall REST API client
//
// Wraps `reqwest::Client` with base URL handling, Basic auth, per-method
// timeouts and status classification. Endpoint methods live in sibling
// modules (filter, wireguard, alias, diagnostics, system) as inherent
// methods so this file only deals with transport mechanics.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::{DEFAULT_GET_TIMEOUT, DEFAULT_POST_TIMEOUT, TransportConfig};

/// Largest body excerpt kept in a `Remote` error.
const BODY_PREVIEW: usize = 200;

/// Authenticated HTTP client for one firewall appliance.
///
/// Every request carries HTTP Basic credentials (API key as user, API
/// secret as password). GETs and POSTs use separate timeouts.
pub struct FirewallClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    api_secret: SecretString,
    get_timeout: Duration,
    post_timeout: Duration,
}

impl std::fmt::Debug for FirewallClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirewallClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key)
            .field("get_timeout", &self.get_timeout)
            .field("post_timeout", &self.post_timeout)
            .finish_non_exhaustive()
    }
}

impl FirewallClient {
    /// Create a client from a `TransportConfig`.
    pub fn new(
        base_url: Url,
        api_key: impl Into<String>,
        api_secret: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            api_key: api_key.into(),
            api_secret,
            get_timeout: transport.get_timeout,
            post_timeout: transport.post_timeout,
        })
    }

    /// Create a client around a pre-built `reqwest::Client` with the
    /// default timeouts.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        api_key: impl Into<String>,
        api_secret: SecretString,
    ) -> Self {
        Self {
            http,
            base_url,
            api_key: api_key.into(),
            api_secret,
            get_timeout: DEFAULT_GET_TIMEOUT,
            post_timeout: DEFAULT_POST_TIMEOUT,
        }
    }

    /// Override the per-method timeouts.
    pub fn with_timeouts(mut self, get: Duration, post: Duration) -> Self {
        self.get_timeout = get;
        self.post_timeout = post;
        self
    }

    /// Build the appliance base URL from a stored host and port.
    ///
    /// `host` may carry a scheme (`https://fw.lan`) and a path prefix
    /// (`https://proxy/opnsense`); without a scheme, `https` is assumed.
    /// The port always comes from `port`.
    pub fn base_url_for(host: &str, port: u16) -> Result<Url, Error> {
        let host = host.trim();
        let invalid = |reason: &str| Error::InvalidEndpoint {
            endpoint: host.to_owned(),
            reason: reason.to_owned(),
        };

        if host.is_empty() {
            return Err(invalid("host is empty"));
        }

        let raw = if host.contains("://") {
            host.to_owned()
        } else {
            format!("https://{host}")
        };

        let mut url = Url::parse(&raw).map_err(|e| invalid(&e.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("only http and https are supported"));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid("missing host name"));
        }
        if port == 0 {
            return Err(invalid("port must be between 1 and 65535"));
        }

        url.set_port(Some(port))
            .map_err(|()| invalid("cannot set port"))?;
        url.set_query(None);
        url.set_fragment(None);
        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build `{base}/api/{path}/{params...}`.
    ///
    /// `path` is a static, slash-separated endpoint path. Each entry of
    /// `params` becomes exactly one percent-encoded path segment. A trailing
    /// slash on `path` is kept when there are no params.
    pub(crate) fn endpoint(&self, path: &str, params: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| Error::InvalidEndpoint {
                endpoint: self.base_url.to_string(),
                reason: "base URL cannot carry a path".into(),
            })?;
            segments.pop_if_empty();
            segments.push("api");
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
            segments.extend(params);
            if params.is_empty() && path.ends_with('/') {
                segments.push("");
            }
        }
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and parse the JSON body.
    pub(crate) async fn get_json(&self, url: Url) -> Result<Value, Error> {
        debug!("GET {}", url);
        let builder = self.http.get(url.clone());
        let body = self.send(builder, &url, self.get_timeout).await?;
        parse_json(&body)
    }

    /// Send a POST request with an optional JSON body and parse the JSON
    /// response.
    pub(crate) async fn post_json(&self, url: Url, body: Option<&Value>) -> Result<Value, Error> {
        debug!("POST {}", url);
        let builder = match body {
            Some(json) => self.http.post(url.clone()).json(json),
            None => self.http.post(url.clone()),
        };
        let text = self.send(builder, &url, self.post_timeout).await?;
        parse_json(&text)
    }

    /// Send an empty POST and return the raw response text.
    pub(crate) async fn post_text(&self, url: Url) -> Result<String, Error> {
        debug!("POST {}", url);
        let builder = self.http.post(url.clone());
        self.send(builder, &url, self.post_timeout).await
    }

    /// Attach auth and timeout, send, and classify the response status.
    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        url: &Url,
        timeout: Duration,
    ) -> Result<String, Error> {
        let secs = timeout.as_secs();
        let resp = builder
            .basic_auth(&self.api_key, Some(self.api_secret.expose_secret()))
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Error::from_reqwest(&e, url.as_str(), secs))?;

        let status = resp.status();
        trace!(%status, "response from {}", url);

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized);
        }

        let body = resp
            .text()
            .await
            .map_err(|e| Error::from_reqwest(&e, url.as_str(), secs))?;

        if !status.is_success() {
            return Err(Error::Remote {
                status: status.as_u16(),
                body: preview(&body).to_owned(),
            });
        }

        Ok(body)
    }
}

/// Parse a JSON body. An empty body is `null`.
fn parse_json(body: &str) -> Result<Value, Error> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(BODY_PREVIEW) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> FirewallClient {
        FirewallClient::with_client(
            reqwest::Client::new(),
            Url::parse(base).unwrap(),
            "key",
            SecretString::from("secret"),
        )
    }

    #[test]
    fn base_url_defaults_to_https() {
        let url = FirewallClient::base_url_for("10.0.0.1", 443).unwrap();
        assert_eq!(url.as_str(), "https://10.0.0.1/");

        let url = FirewallClient::base_url_for("10.0.0.1", 8443).unwrap();
        assert_eq!(url.as_str(), "https://10.0.0.1:8443/");
    }

    #[test]
    fn base_url_keeps_explicit_scheme_and_prefix() {
        let url = FirewallClient::base_url_for("http://fw.lan/opnsense", 8080).unwrap();
        assert_eq!(url.as_str(), "http://fw.lan:8080/opnsense");
    }

    #[test]
    fn base_url_rejects_bad_input() {
        for (host, port) in [("", 443), ("ftp://fw", 21), ("https://", 443), ("fw", 0)] {
            assert!(
                matches!(
                    FirewallClient::base_url_for(host, port),
                    Err(Error::InvalidEndpoint { .. })
                ),
                "{host}:{port} should be rejected"
            );
        }
    }

    #[test]
    fn endpoint_encodes_params_as_single_segments() {
        let c = client("https://fw:8443/");
        let url = c
            .endpoint("firewall/filter/toggleRule", &["a/b c", "0"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://fw:8443/api/firewall/filter/toggleRule/a%2Fb%20c/0"
        );
    }

    #[test]
    fn endpoint_under_path_prefix_and_trailing_slash() {
        let c = client("https://fw/opnsense/");
        let url = c.endpoint("core/system/reboot/", &[]).unwrap();
        assert_eq!(url.as_str(), "https://fw/opnsense/api/core/system/reboot/");
    }

    #[test]
    fn debug_output_hides_secret() {
        let rendered = format!("{:?}", client("https://fw/"));
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("https://fw/"));
    }

    #[test]
    fn empty_body_parses_as_null() {
        assert_eq!(parse_json("  ").unwrap(), Value::Null);
        assert!(matches!(
            parse_json("<html>"),
            Err(Error::Deserialization { .. })
        ));
    }
}
