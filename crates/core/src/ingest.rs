use crate::chunking::semantic_chunking;
use crate::embeddings::Embedder;
use crate::error::IngestError;
use crate::extractor::TextExtractor;
use crate::models::{ChunkingOptions, ResumeRecord};
use crate::normalize::{clean_text, segment_lines};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

const RESUME_EXTENSIONS: [&str; 2] = ["pdf", "docx"];

/// A file is ingestible when it exists and carries a resume extension.
pub fn validate_file(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }

    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            RESUME_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

pub fn discover_resume_files(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let is_resume = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                RESUME_EXTENSIONS
                    .iter()
                    .any(|allowed| ext.eq_ignore_ascii_case(allowed))
            });

        if is_resume {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

pub fn file_name(path: &Path) -> Result<String, IngestError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            IngestError::MissingFileName(format!("path missing filename: {}", path.display()))
        })
}

/// Extracts, cleans, segments, and semantically chunks one resume. A
/// resume with no usable segments comes back with zero chunks rather than
/// an error.
pub async fn parse_resume<E>(
    path: &Path,
    extractor: &dyn TextExtractor,
    embedder: &E,
    options: &ChunkingOptions,
) -> Result<ResumeRecord, IngestError>
where
    E: Embedder + Sync,
{
    if !validate_file(path) {
        return Err(IngestError::InvalidFile(format!(
            "{} is not an existing pdf or docx file",
            path.display()
        )));
    }

    let filename = file_name(path)?;
    let raw = extractor.extract_text(path)?;
    let raw_text = clean_text(&raw);
    let segments = segment_lines(&raw, options.min_segment_chars);
    debug!(file = %filename, segment_count = segments.len(), "segmented resume");

    if segments.is_empty() {
        warn!(file = %filename, "no segments extracted");
        return Ok(ResumeRecord {
            filename,
            raw_text,
            chunks: Vec::new(),
            ingested_at: Utc::now(),
        });
    }

    let chunks = semantic_chunking(&segments, embedder, options).await?;
    debug!(file = %filename, chunk_count = chunks.len(), "chunked resume");

    Ok(ResumeRecord {
        filename,
        raw_text,
        chunks,
        ingested_at: Utc::now(),
    })
}

/// Writes the batch artifact: one JSON array of parsed resume records,
/// written in a single shot at the end of a run.
pub fn persist_parsed_resumes(path: &Path, records: &[ResumeRecord]) -> Result<(), IngestError> {
    let payload = serde_json::to_string_pretty(records)?;
    fs::write(path, payload)?;
    Ok(())
}
