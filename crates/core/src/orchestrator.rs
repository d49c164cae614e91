use crate::chunking::make_record_id;
use crate::embeddings::{Embedder, EmbeddingInputType};
use crate::error::{IngestError, MatchError};
use crate::extractor::TextExtractor;
use crate::ingest::{discover_resume_files, parse_resume};
use crate::models::{
    BatchReport, BatchRoleMatches, MatchOutcome, PipelineOptions, ResumeRecord, SkippedResume,
    VectorMetadata, VectorRecord,
};
use crate::retrieval::retrieve_chunks;
use crate::synthesis::{synthesize_query, GenerativeModel};
use crate::traits::{JobSearch, VectorIndex};
use std::path::Path;
use tracing::{debug, info, warn};

/// Probe text used when the caller has no resume-specific query.
pub const DEFAULT_RESUME_PROBE: &str = "software development skills";

/// Roles every batch run matches each resume against.
pub const DEFAULT_BATCH_ROLES: [&str; 2] = ["Python Developer", "Cybersecurity Analyst"];

/// Wires the full pipeline: ingestion (extract, normalize, chunk, embed,
/// store) and matching (retrieve, synthesize, search). Every external call
/// is sequential call-and-wait; any failure propagates to the caller
/// untouched.
pub struct MatchCoordinator<E, V, G, J>
where
    E: Embedder,
    V: VectorIndex,
    G: GenerativeModel,
    J: JobSearch,
{
    embedder: E,
    store: V,
    model: G,
    jobs: J,
    options: PipelineOptions,
}

impl<E, V, G, J> MatchCoordinator<E, V, G, J>
where
    E: Embedder + Send + Sync,
    V: VectorIndex + Send + Sync,
    G: GenerativeModel + Send + Sync,
    J: JobSearch + Send + Sync,
{
    pub fn new(embedder: E, store: V, model: G, jobs: J, options: PipelineOptions) -> Self {
        Self {
            embedder,
            store,
            model,
            jobs,
            options,
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Parses one resume and stores its chunks. A resume that yields no
    /// chunks is returned as-is with nothing stored.
    pub async fn ingest_resume(
        &self,
        path: &Path,
        extractor: &dyn TextExtractor,
    ) -> Result<ResumeRecord, IngestError> {
        let record = parse_resume(path, extractor, &self.embedder, &self.options.chunking).await?;

        if record.chunks.is_empty() {
            info!(file = %record.filename, "no chunks to store");
            return Ok(record);
        }

        let stored = self.store_chunks(&record.filename, &record.chunks).await?;
        info!(file = %record.filename, stored, "stored resume chunks");
        Ok(record)
    }

    /// Embeds chunk texts and upserts one record per chunk, keyed by the
    /// deterministic (filename, index, text-prefix) hash so re-ingestion
    /// overwrites in place.
    async fn store_chunks(&self, filename: &str, chunks: &[String]) -> Result<usize, IngestError> {
        let embeddings = self
            .embedder
            .embed(chunks, EmbeddingInputType::SearchDocument)
            .await?;

        let records = chunks
            .iter()
            .zip(embeddings)
            .enumerate()
            .map(|(index, (chunk, values))| {
                let index = index as u64;
                VectorRecord {
                    id: make_record_id(filename, index, chunk),
                    values,
                    metadata: VectorMetadata {
                        filename: filename.to_string(),
                        text: chunk.clone(),
                        chunk_index: index,
                    },
                }
            })
            .collect::<Vec<_>>();

        self.store.upsert(&self.options.namespace, &records).await?;
        Ok(records.len())
    }

    /// One retrieval-and-generation pass: probe the store, synthesize a
    /// structured query from the hits, run the job search. A caller-supplied
    /// location overrides whatever the model inferred. When the store has
    /// no context for the probe, no generation or search happens and the
    /// outcome carries no query.
    pub async fn match_jobs(
        &self,
        probe: &str,
        role: &str,
        location_override: Option<&str>,
    ) -> Result<MatchOutcome, MatchError> {
        let chunks = retrieve_chunks(
            &self.embedder,
            &self.store,
            &self.options.namespace,
            probe,
            self.options.top_k,
        )
        .await?;

        if chunks.is_empty() {
            info!(role, "no resume context retrieved");
            return Ok(MatchOutcome {
                role: role.to_string(),
                query: None,
                listings: Vec::new(),
            });
        }

        let mut query =
            synthesize_query(&self.model, &chunks, role, &self.options.fallback_location).await?;
        if let Some(location) = location_override {
            query.location = location.to_string();
        }
        debug!(role = %query.role, location = %query.location, "synthesized search query");

        let listings = self.jobs.search(&query).await?;
        info!(role, listing_count = listings.len(), "job search complete");

        Ok(MatchOutcome {
            role: role.to_string(),
            query: Some(query),
            listings,
        })
    }

    /// Batch entry point: every resume under `folder` is ingested and then
    /// matched once per role. Files that fail validation or ingestion are
    /// skipped with a reason and the run continues; a failed match drops
    /// the remaining roles for that file but keeps its parsed record. The
    /// caller persists `records` in one write when the run is over.
    pub async fn run_batch(
        &self,
        folder: &Path,
        extractor: &dyn TextExtractor,
        probe: &str,
        roles: &[String],
    ) -> Result<BatchReport, IngestError> {
        let files = discover_resume_files(folder);
        if files.is_empty() {
            return Err(IngestError::InvalidFile(format!(
                "no resume files found in {}",
                folder.display()
            )));
        }

        let mut report = BatchReport::default();

        for path in files {
            let record = match self.ingest_resume(&path, extractor).await {
                Ok(record) => record,
                Err(error) => {
                    warn!(path = %path.display(), %error, "skipping resume");
                    report.skipped.push(SkippedResume {
                        path,
                        reason: error.to_string(),
                    });
                    continue;
                }
            };

            for role in roles {
                match self.match_jobs(probe, role, None).await {
                    Ok(outcome) => report.role_matches.push(BatchRoleMatches {
                        filename: record.filename.clone(),
                        role: role.clone(),
                        listings: outcome.listings,
                    }),
                    Err(error) => {
                        warn!(file = %record.filename, role = %role, %error, "job matching failed");
                        break;
                    }
                }
            }

            report.records.push(record);
        }

        Ok(report)
    }
}
