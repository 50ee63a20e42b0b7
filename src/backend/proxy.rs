//! Single-host reverse proxy backend.
//!
//! # Responsibilities
//! - Parse route destinations (`http://host:port/base`)
//! - Rewrite the request URI onto the destination
//! - Strip hop-by-hop headers in both directions
//! - Append `X-Forwarded-For`
//! - Map upstream failures to 502 / 504
//!
//! # Design Decisions
//! - The inbound `Host` header is forwarded unchanged
//! - Requests are always forwarded as HTTP/1.1 over a shared pooled client
//! - `x-request-id` travels with the other end-to-end headers

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{
        HeaderMap, HeaderName, HeaderValue, Request, Uri, Version, header,
        uri::{Authority, Scheme},
    },
    response::Response,
};
use futures_util::future::{BoxFuture, FutureExt};
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use url::Url;

use crate::backend::Backend;
use crate::http::response;
use crate::routing::RouteError;

/// Pooled HTTP client shared by every proxy backend.
pub type ProxyClient = Client<HttpConnector, Body>;

/// Build the shared forwarding client.
pub fn new_client() -> ProxyClient {
    Client::builder(TokioExecutor::new()).build(HttpConnector::new())
}

const HOP_BY_HOP: [HeaderName; 9] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Parse a route destination into a forwarding URL.
///
/// An empty host (`http://:8081/`) means the local machine.
pub fn parse_destination(destination: &str) -> Result<Url, RouteError> {
    let invalid = |reason: String| RouteError::InvalidDestination {
        destination: destination.to_string(),
        reason,
    };

    let trimmed = destination.trim();
    if trimmed.is_empty() {
        return Err(invalid("empty destination".to_string()));
    }

    let normalized = match trimmed.strip_prefix("http://:") {
        Some(rest) => format!("http://127.0.0.1:{}", rest),
        None => trimmed.to_string(),
    };

    let url = Url::parse(&normalized).map_err(|e| invalid(e.to_string()))?;
    if url.scheme() != "http" {
        return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

/// Forwards requests to a single destination.
#[derive(Debug, Clone)]
pub struct ProxyBackend {
    target: Url,
    authority: Authority,
    client: ProxyClient,
    timeout: Duration,
}

impl ProxyBackend {
    /// Create a proxy backend for an already parsed destination.
    pub fn new(target: Url, client: ProxyClient, timeout: Duration) -> Result<Self, RouteError> {
        let host = target.host_str().unwrap_or_default();
        let authority = match target.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let authority = Authority::from_str(&authority).map_err(|e| RouteError::InvalidDestination {
            destination: target.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            target,
            authority,
            client,
            timeout,
        })
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    /// Rewrite an inbound request so it can be sent to the destination.
    pub(crate) fn rewrite(&self, request: Request<Body>) -> Result<Request<Body>, axum::http::Error> {
        let (mut parts, body) = request.into_parts();

        let mut path_and_query = join_paths(self.target.path(), parts.uri.path());
        let query = match (
            self.target.query().filter(|q| !q.is_empty()),
            parts.uri.query().filter(|q| !q.is_empty()),
        ) {
            (Some(a), Some(b)) => Some(format!("{}&{}", a, b)),
            (Some(q), None) | (None, Some(q)) => Some(q.to_string()),
            (None, None) => None,
        };
        if let Some(query) = query {
            path_and_query.push('?');
            path_and_query.push_str(&query);
        }

        parts.uri = Uri::builder()
            .scheme(Scheme::HTTP)
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()?;
        parts.version = Version::HTTP_11;

        strip_hop_by_hop(&mut parts.headers);

        if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
            let client_ip = addr.ip().to_string();
            let forwarded = match parts.headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
                Some(prior) => format!("{}, {}", prior, client_ip),
                None => client_ip,
            };
            if let Ok(value) = HeaderValue::from_str(&forwarded) {
                parts.headers.insert("x-forwarded-for", value);
            }
        }

        Ok(Request::from_parts(parts, body))
    }
}

impl Backend for ProxyBackend {
    fn call(&self, request: Request<Body>) -> BoxFuture<'static, Response> {
        let client = self.client.clone();
        let timeout = self.timeout;
        let target = self.target.to_string();
        let outbound = self.rewrite(request);

        async move {
            let outbound = match outbound {
                Ok(req) => req,
                Err(e) => {
                    tracing::error!(destination = %target, error = %e, "Failed to rewrite request");
                    return response::bad_gateway();
                }
            };

            let uri = outbound.uri().clone();
            match tokio::time::timeout(timeout, client.request(outbound)).await {
                Ok(Ok(upstream)) => {
                    tracing::debug!(uri = %uri, status = %upstream.status(), "Upstream responded");
                    let (mut parts, body) = upstream.into_parts();
                    strip_hop_by_hop(&mut parts.headers);
                    Response::from_parts(parts, Body::new(body))
                }
                Ok(Err(e)) => {
                    tracing::error!(uri = %uri, error = %e, "Upstream error");
                    response::bad_gateway()
                }
                Err(_) => {
                    tracing::warn!(uri = %uri, timeout = ?timeout, "Upstream timed out");
                    response::gateway_timeout()
                }
            }
        }
        .boxed()
    }

    fn describe(&self) -> String {
        format!("proxy {}", self.target)
    }
}

/// Join two path fragments with exactly one slash between them.
fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_str(name.trim()).ok())
        .collect();

    for name in listed.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(dest: &str) -> ProxyBackend {
        let url = parse_destination(dest).unwrap();
        ProxyBackend::new(url, new_client(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn destination_with_empty_host_is_local() {
        let url = parse_destination("http://:8081/").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8081/");
    }

    #[test]
    fn rejects_bad_destinations() {
        for dest in ["", "   ", "not a url", "ftp://example.com/", "https://example.com/"] {
            let err = parse_destination(dest).unwrap_err();
            assert_eq!(err.kind(), "invalid_destination", "{:?}", dest);
        }
    }

    #[test]
    fn joins_paths_with_single_slash() {
        assert_eq!(join_paths("/", "/foo"), "/foo");
        assert_eq!(join_paths("/base", "/foo"), "/base/foo");
        assert_eq!(join_paths("/base/", "/foo/"), "/base/foo/");
        assert_eq!(join_paths("/base", "foo"), "/base/foo");
    }

    #[tokio::test]
    async fn rewrite_targets_destination() {
        let proxy = backend("http://127.0.0.1:9000/api?key=1");
        let mut req = Request::builder()
            .uri("/users?page=2")
            .header("host", "front.example")
            .header("connection", "keep-alive, x-private")
            .header("x-private", "secret")
            .header("x-request-id", "abc")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo("10.0.0.7:5555".parse::<SocketAddr>().unwrap()));

        let out = proxy.rewrite(req).unwrap();
        assert_eq!(out.uri().to_string(), "http://127.0.0.1:9000/api/users?key=1&page=2");
        assert_eq!(out.headers()["host"], "front.example");
        assert_eq!(out.headers()["x-request-id"], "abc");
        assert_eq!(out.headers()["x-forwarded-for"], "10.0.0.7");
        assert!(out.headers().get("connection").is_none());
        assert!(out.headers().get("x-private").is_none());
    }

    #[test]
    fn describe_names_target() {
        let proxy = backend("http://localhost:8082");
        assert_eq!(proxy.describe(), "proxy http://localhost:8082/");
        assert_eq!(proxy.target().port(), Some(8082));
    }
}
