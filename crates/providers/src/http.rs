//! HTTP plumbing shared by the providers.

use miniagent_core::error::ProviderError;
use std::time::Duration;
use tracing::warn;

/// Default seconds to wait when a 429 carries no `Retry-After` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

pub(crate) fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to default HTTP client");
            reqwest::Client::new()
        })
}

pub(crate) fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::Network(e.to_string())
    }
}

/// Map a non-success HTTP status to the provider error taxonomy.
///
/// 429 is the overload signal and must stay distinguishable from every
/// other failure.
pub(crate) fn status_error(status: u16, retry_after: Option<&str>, body: String) -> ProviderError {
    match status {
        429 => ProviderError::RateLimited {
            retry_after_secs: retry_after
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        401 | 403 => ProviderError::AuthenticationFailed(
            "Invalid API key or insufficient permissions".into(),
        ),
        404 => ProviderError::ModelNotFound(body),
        _ => ProviderError::ApiError {
            status_code: status,
            message: body,
        },
    }
}

/// Check a response status, turning failures into [`ProviderError`]s.
pub(crate) async fn ensure_success(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = response.text().await.unwrap_or_default();
    warn!(provider, status = status.as_u16(), body = %body, "Provider returned error");
    Err(status_error(status.as_u16(), retry_after.as_deref(), body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_many_requests_is_rate_limited() {
        let err = status_error(429, Some("12"), String::new());
        assert!(matches!(
            err,
            ProviderError::RateLimited {
                retry_after_secs: 12
            }
        ));
        assert!(err.is_rate_limited());
    }

    #[test]
    fn missing_retry_after_uses_default() {
        let err = status_error(429, None, String::new());
        assert!(matches!(
            err,
            ProviderError::RateLimited {
                retry_after_secs: DEFAULT_RETRY_AFTER_SECS
            }
        ));
    }

    #[test]
    fn other_statuses_are_not_rate_limits() {
        assert!(matches!(
            status_error(401, None, String::new()),
            ProviderError::AuthenticationFailed(_)
        ));
        let err = status_error(500, None, "boom".into());
        assert!(!err.is_rate_limited());
        assert!(err.to_string().contains("boom"));
    }
}
