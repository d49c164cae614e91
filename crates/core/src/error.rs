use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid resume file: {0}")]
    InvalidFile(String),

    #[error("text extraction failed: {0}")]
    Extraction(String),

    #[error("path has no file name: {0}")]
    MissingFileName(String),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("embedding backend returned {status}: {details}")]
    Backend { status: u16, details: String },

    #[error("embedding response malformed: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("vector store returned {status}: {details}")]
    Backend { status: u16, details: String },

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum QuerySynthesisError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generation backend returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("model returned no text content")]
    EmptyContent,

    #[error("model output is not a well-formed structured query: {0}")]
    MalformedJson(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("job search returned {status}: {details}")]
    Status { status: u16, details: String },

    #[error("job search api error: {0}")]
    Api(String),
}

/// Pipeline-level error for the retrieve -> synthesize -> search path.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Synthesis(#[from] QuerySynthesisError),

    #[error(transparent)]
    Search(#[from] SearchError),
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;
