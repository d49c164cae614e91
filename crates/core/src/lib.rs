pub mod chunking;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod ingest;
pub mod jobs;
pub mod models;
pub mod normalize;
pub mod orchestrator;
pub mod retrieval;
pub mod stores;
pub mod synthesis;
pub mod traits;

pub use chunking::{
    cluster_indices, cosine_similarity, make_record_id, semantic_chunking, similarity_matrix,
};
pub use embeddings::{
    CohereEmbedder, Embedder, EmbeddingInputType, DEFAULT_EMBEDDING_MODEL, EMBEDDING_DIMENSIONS,
};
pub use error::{
    EmbeddingError, IngestError, MatchError, QuerySynthesisError, RetrievalError, SearchError,
    StoreError,
};
pub use extractor::{LopdfExtractor, TextExtractor};
pub use ingest::{
    discover_resume_files, file_name, parse_resume, persist_parsed_resumes, validate_file,
};
pub use jobs::{build_search_term, truncate_description, JSearchClient, DESCRIPTION_PREVIEW_CHARS};
pub use models::{
    BatchReport, BatchRoleMatches, ChunkingOptions, JobListing, MatchOutcome, PipelineOptions,
    ResumeRecord, RetrievedChunk, SkippedResume, StructuredQuery, VectorMetadata, VectorRecord,
};
pub use normalize::{clean_text, segment_lines};
pub use orchestrator::{MatchCoordinator, DEFAULT_BATCH_ROLES, DEFAULT_RESUME_PROBE};
pub use retrieval::{retrieve_chunks, DEFAULT_TOP_K};
pub use stores::{PineconeAdmin, PineconeStore};
pub use synthesis::{
    build_query_prompt, strip_json_fences, synthesize_query, GeminiClient, GenerativeModel,
    DEFAULT_GENERATIVE_MODEL,
};
pub use traits::{JobSearch, VectorIndex};
