use thiserror::Error;

/// Failure to retrieve the next remote page. Logged and dropped by the
/// controller; it never changes list state.
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        source: reqwest::Error,
    },
    #[error("{url} answered with an error status: {source}")]
    Status {
        url: String,
        source: reqwest::Error,
    },
    #[error("{url} did not return an article array: {source}")]
    Decode {
        url: String,
        source: reqwest::Error,
    },
}
