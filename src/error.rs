use thiserror::Error;

/// A page could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Transport failure that did not come from reqwest (used by test fetchers
    /// and anything else implementing `PageFetcher`).
    #[error("request to {url} failed: {reason}")]
    Other { url: String, reason: String },
}

impl FetchError {
    /// Whether trying the same request again could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            FetchError::Transport { .. } | FetchError::Other { .. } => true,
        }
    }
}

/// A fetched page did not contain what we expected.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("marker `{marker}` not found")]
    MissingMarker { marker: &'static str },

    #[error("marker `{marker}` has unexpected content: {content:?}")]
    UnexpectedContent {
        marker: &'static str,
        content: String,
    },
}

/// Why a single bill index produced no record.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_not_transient() {
        let err = FetchError::Status {
            url: "https://example.org".to_string(),
            status: 404,
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn server_errors_and_throttling_are_transient() {
        for status in [429, 500, 503] {
            let err = FetchError::Status {
                url: "https://example.org".to_string(),
                status,
            };
            assert!(err.is_transient(), "status {status}");
        }
    }
}
