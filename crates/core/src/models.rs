use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One resume parsed end to end: cleaned text plus the semantic chunks
/// derived from it. Serialized as-is into the batch report artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub filename: String,
    pub raw_text: String,
    pub chunks: Vec<String>,
    pub ingested_at: DateTime<Utc>,
}

/// Metadata carried alongside each stored vector so query hits can be
/// rendered without a second lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorMetadata {
    pub filename: String,
    pub text: String,
    pub chunk_index: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: VectorMetadata,
}

/// A stored chunk returned from a similarity query, highest score first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub text: String,
    pub score: f64,
}

/// The role/skills/location triple the generative model emits to drive the
/// job search API. Parsing is strict: a missing or unknown key fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructuredQuery {
    pub role: String,
    pub skills: Vec<String>,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListing {
    pub job_title: String,
    pub employer_name: String,
    pub job_description: String,
    pub job_apply_link: String,
    pub location: String,
}

#[derive(Debug, Clone, Copy)]
pub struct ChunkingOptions {
    /// Cosine similarity a segment must exceed (strictly) against the
    /// cluster seed to join the seed's chunk.
    pub similarity_threshold: f32,
    /// Cleaned lines at or below this many characters are dropped.
    pub min_segment_chars: usize,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.85,
            min_segment_chars: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Vector store partition holding resume chunks.
    pub namespace: String,
    /// Neighbors fetched per retrieval.
    pub top_k: usize,
    /// Location the synthesized query falls back to when the resume
    /// context does not pin one down.
    pub fallback_location: String,
    pub chunking: ChunkingOptions,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            namespace: "resumes".to_string(),
            top_k: 5,
            fallback_location: "Pune, India".to_string(),
            chunking: ChunkingOptions::default(),
        }
    }
}

/// Result of one retrieve -> synthesize -> search pass. `query` is `None`
/// when the store held no resume context for the probe, in which case no
/// generation or search was attempted.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub role: String,
    pub query: Option<StructuredQuery>,
    pub listings: Vec<JobListing>,
}

#[derive(Debug, Clone)]
pub struct SkippedResume {
    pub path: std::path::PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct BatchRoleMatches {
    pub filename: String,
    pub role: String,
    pub listings: Vec<JobListing>,
}

/// Everything a batch run produced. Records are persisted in one write at
/// the end of the run; a crash partway loses unwritten state.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub records: Vec<ResumeRecord>,
    pub role_matches: Vec<BatchRoleMatches>,
    pub skipped: Vec<SkippedResume>,
}
