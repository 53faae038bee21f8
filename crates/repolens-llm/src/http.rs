//! Shared HTTP client construction for consistent timeout and proxy configuration.

use std::time::Duration;

use crate::error::{LlmError, Result};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Network egress policy, decided once at startup and applied to every client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EgressConfig {
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY`/`NO_PROXY` from the environment.
    pub use_system_proxy: bool,
}

/// Build a client with the given request timeout and egress policy.
///
/// # Errors
///
/// Returns [`LlmError::ClientBuild`] if the TLS backend cannot be initialized.
pub fn build_client(egress: EgressConfig, timeout: Duration) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .timeout(timeout)
        .user_agent(concat!("repolens/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(10));

    if !egress.use_system_proxy {
        builder = builder.no_proxy();
    }

    builder
        .build()
        .map_err(|e| LlmError::ClientBuild(e.to_string()))
}

/// Client with a 60s request timeout and system proxies disabled.
///
/// # Panics
///
/// Panics if the TLS backend cannot be initialized (should never happen with rustls).
#[must_use]
pub fn default_client() -> reqwest::Client {
    build_client(EgressConfig::default(), Duration::from_secs(60))
        .expect("default HTTP client construction must not fail")
}

pub(crate) fn trim_base_url(mut base_url: String) -> String {
    while base_url.ends_with('/') {
        base_url.pop();
    }
    base_url
}
