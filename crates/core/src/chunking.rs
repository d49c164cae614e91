use crate::embeddings::{Embedder, EmbeddingInputType};
use crate::error::EmbeddingError;
use crate::models::ChunkingOptions;
use sha2::{Digest, Sha256};
use tracing::debug;

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum::<f32>();
    let norm_a = a.iter().map(|value| value * value).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|value| value * value).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Full pairwise cosine similarity over index-aligned embeddings.
pub fn similarity_matrix(embeddings: &[Vec<f32>]) -> Vec<Vec<f32>> {
    embeddings
        .iter()
        .map(|row| {
            embeddings
                .iter()
                .map(|other| cosine_similarity(row, other))
                .collect()
        })
        .collect()
}

/// Greedy single-pass clustering in original segment order. Each unassigned
/// index opens a cluster and claims every later unassigned index whose
/// similarity to the seed (not to other members) strictly exceeds the
/// threshold. Order-sensitive and non-transitive on purpose.
pub fn cluster_indices(matrix: &[Vec<f32>], threshold: f32) -> Vec<Vec<usize>> {
    let mut used = vec![false; matrix.len()];
    let mut clusters = Vec::new();

    for seed in 0..matrix.len() {
        if used[seed] {
            continue;
        }
        used[seed] = true;
        let mut cluster = vec![seed];

        for candidate in (seed + 1)..matrix.len() {
            if !used[candidate] && matrix[seed][candidate] > threshold {
                used[candidate] = true;
                cluster.push(candidate);
            }
        }
        clusters.push(cluster);
    }

    clusters
}

fn join_clusters(segments: &[String], clusters: &[Vec<usize>]) -> Vec<String> {
    clusters
        .iter()
        .map(|cluster| {
            cluster
                .iter()
                .map(|&index| segments[index].as_str())
                .collect::<Vec<_>>()
                .join(" ")
                .trim()
                .to_string()
        })
        .collect()
}

/// Groups segments into chunks by embedding similarity: one batch embed
/// call, pairwise cosine matrix, greedy seed clustering, space-joined
/// chunk texts in seed order. Empty input yields empty output without
/// touching the embedder.
pub async fn semantic_chunking<E>(
    segments: &[String],
    embedder: &E,
    options: &ChunkingOptions,
) -> Result<Vec<String>, EmbeddingError>
where
    E: Embedder + Sync,
{
    if segments.is_empty() {
        return Ok(Vec::new());
    }

    let embeddings = embedder
        .embed(segments, EmbeddingInputType::SearchDocument)
        .await?;
    debug!(segment_count = segments.len(), "embedded segments");

    let matrix = similarity_matrix(&embeddings);
    let clusters = cluster_indices(&matrix, options.similarity_threshold);
    debug!(cluster_count = clusters.len(), "clustered segments");

    Ok(join_clusters(segments, &clusters))
}

/// Stable identity for a stored chunk: filename, chunk index, and the
/// first 50 characters of the chunk text. Re-ingesting unchanged content
/// under the same filename reproduces the same id.
pub fn make_record_id(filename: &str, index: u64, chunk_text: &str) -> String {
    let prefix: String = chunk_text.chars().take(50).collect();
    let mut hasher = Sha256::new();
    hasher.update(filename.as_bytes());
    hasher.update(index.to_le_bytes());
    hasher.update(prefix.as_bytes());
    format!("{:x}", hasher.finalize())
}
