use std::time::Duration;

const BACKOFF_CAP_MS: u64 = 30_000;

pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    let raw = headers.get(reqwest::header::RETRY_AFTER)?.to_str().ok()?;
    let seconds = raw.trim().parse::<u64>().ok()?;
    Some(Duration::from_secs(seconds))
}

/// Delay before the next attempt. A server-supplied `Retry-After` wins, with
/// the configured base as a floor; otherwise exponential backoff capped at
/// thirty seconds.
pub(crate) fn retry_delay(
    base_delay_ms: u64,
    attempt: usize,
    retry_after: Option<Duration>,
) -> Duration {
    if let Some(delay) = retry_after {
        return delay.max(Duration::from_millis(base_delay_ms));
    }
    let exponent = attempt.saturating_sub(1).min(10) as u32;
    let scaled = base_delay_ms.saturating_mul(2_u64.saturating_pow(exponent));
    Duration::from_millis(scaled.min(BACKOFF_CAP_MS))
}

pub(crate) fn is_retryable_transport_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request()
}

/// GitHub reports secondary rate limits as 403 with a `Retry-After` header;
/// those are retryable even though an ordinary 403 is terminal.
pub(crate) fn is_retryable_github_status(status: u16, retry_after: Option<Duration>) -> bool {
    status == 429 || status >= 500 || (status == 403 && retry_after.is_some())
}

pub(crate) fn truncate_for_error(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated = text.chars().take(max_chars).collect::<String>();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::{is_retryable_github_status, parse_retry_after, retry_delay, truncate_for_error};
    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
    use std::time::Duration;

    #[test]
    fn unit_parse_retry_after_accepts_seconds_only() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(7)));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct"));
        assert_eq!(parse_retry_after(&headers), None);
        assert_eq!(parse_retry_after(&HeaderMap::new()), None);
    }

    #[test]
    fn unit_retry_delay_backs_off_exponentially_with_a_cap() {
        assert_eq!(retry_delay(100, 1, None), Duration::from_millis(100));
        assert_eq!(retry_delay(100, 2, None), Duration::from_millis(200));
        assert_eq!(retry_delay(100, 4, None), Duration::from_millis(800));
        assert_eq!(retry_delay(5_000, 12, None), Duration::from_millis(30_000));
    }

    #[test]
    fn unit_retry_after_header_wins_but_never_below_the_base() {
        assert_eq!(
            retry_delay(500, 3, Some(Duration::from_millis(100))),
            Duration::from_millis(500)
        );
        assert_eq!(
            retry_delay(500, 3, Some(Duration::from_secs(5))),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn unit_retryable_status_covers_rate_limits_and_server_errors() {
        assert!(is_retryable_github_status(429, None));
        assert!(is_retryable_github_status(503, None));
        assert!(!is_retryable_github_status(404, None));
        assert!(!is_retryable_github_status(403, None));
    }

    #[test]
    fn regression_secondary_rate_limit_403_with_retry_after_is_retryable() {
        assert!(is_retryable_github_status(
            403,
            Some(Duration::from_secs(30))
        ));
        assert!(!is_retryable_github_status(
            404,
            Some(Duration::from_secs(30))
        ));
    }

    #[test]
    fn regression_truncate_for_error_respects_char_boundaries() {
        assert_eq!(truncate_for_error("abcdef", 4), "abcd...");
        assert_eq!(truncate_for_error("short", 10), "short");
    }
}
