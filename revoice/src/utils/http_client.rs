use std::time::Duration;

use tracing::warn;

/// Build the shared `reqwest::Client` used for collaborator calls.
///
/// A zero timeout means "no client-side timeout".
pub fn build_http_client(request_timeout: Duration) -> reqwest::Client {
    let mut builder = reqwest::Client::builder()
        .user_agent(concat!("revoice/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(4);

    if request_timeout > Duration::ZERO {
        builder = builder.timeout(request_timeout);
    }

    builder.build().unwrap_or_else(|error| {
        warn!(
            error = %error,
            "Failed to create configured HTTP client; falling back to reqwest defaults"
        );
        reqwest::Client::new()
    })
}

/// Join a service base URL and an endpoint path without doubling slashes.
pub fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
