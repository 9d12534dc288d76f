/// Failures from a content generator. All of them are recoverable except a
/// portrait failure during recruitment, which the caller surfaces.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("content provider unavailable: {0}")]
    Unavailable(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("malformed reply: {0}")]
    Malformed(String),
    #[error("empty reply")]
    Empty,
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

pub type Result<T> = std::result::Result<T, ContentError>;
