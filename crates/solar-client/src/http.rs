//! Shared HTTP plumbing for the upstream clients.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use roof_common::{ServiceError, ServiceResult};

const USER_AGENT: &str = concat!("roof-measurements/", env!("CARGO_PKG_VERSION"));

/// Longest upstream error body echoed into an error message.
const MAX_ERROR_BODY: usize = 512;

/// Build the single HTTP client shared by every upstream call.
pub fn build_http_client(timeout: Duration) -> ServiceResult<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(5)))
        .build()
        .map_err(|e| ServiceError::Internal(format!("Failed to create HTTP client: {}", e)))
}

/// Map a transport failure for `service` onto the service error taxonomy.
pub fn request_error(service: &str, err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        ServiceError::UpstreamTimeout(service.to_string())
    } else {
        ServiceError::upstream(service, err.to_string())
    }
}

/// Pass 2xx responses through; turn everything else into an error.
///
/// 401 and 403 are authentication failures, any other status is an
/// upstream failure carrying the status code and a trimmed body.
pub async fn check_status(service: &str, response: Response) -> ServiceResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = truncate(body.trim(), MAX_ERROR_BODY);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ServiceError::Authentication(
            format!("{} rejected credentials (HTTP {}): {}", service, status.as_u16(), detail),
        )),
        _ => Err(ServiceError::upstream(
            service,
            format!("HTTP {}: {}", status.as_u16(), detail),
        )),
    }
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("abc", 10), "abc");
        assert_eq!(truncate("abcdef", 3), "abc");
        // 'é' is two bytes; cutting at 2 would split it
        assert_eq!(truncate("aé", 2), "a");
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(Duration::from_secs(10)).is_ok());
    }
}
