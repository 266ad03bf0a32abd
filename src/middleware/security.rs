use axum::{
    extract::{Request, State},
    http::header::HOST,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{error::AppError, state::AppState};

pub async fn enforce_trusted_hosts(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let host = request
        .headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !host_is_trusted(host, &state.config.trusted_hosts) {
        tracing::warn!(host, "Rejected request for untrusted host");
        return AppError::Forbidden("Host is not allowed.".to_string()).into_response();
    }

    next.run(request).await
}

/// An empty allow-list or a `*` entry trusts every host. Ports are ignored.
fn host_is_trusted(raw_host: &str, trusted_hosts: &[String]) -> bool {
    if trusted_hosts.is_empty() || trusted_hosts.iter().any(|entry| entry == "*") {
        return true;
    }

    let host = strip_port(raw_host.trim()).to_ascii_lowercase();
    trusted_hosts.iter().any(|entry| {
        let entry = entry.trim().to_ascii_lowercase();
        match entry.strip_prefix("*.") {
            Some(suffix) => host.ends_with(&format!(".{suffix}")),
            None => host == entry,
        }
    })
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return host
            .split_once(']')
            .map(|(address, _)| address.trim_start_matches('['))
            .unwrap_or(host);
    }
    host.rsplit_once(':')
        .filter(|(_, port)| port.chars().all(|c| c.is_ascii_digit()))
        .map(|(name, _)| name)
        .unwrap_or(host)
}
