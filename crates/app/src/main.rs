use chrono::Utc;
use clap::{Parser, Subcommand};
use resume_match_core::{
    persist_parsed_resumes, CohereEmbedder, GeminiClient, JSearchClient, JobListing,
    LopdfExtractor, MatchCoordinator, PineconeAdmin, PineconeStore, PipelineOptions,
    DEFAULT_BATCH_ROLES, DEFAULT_RESUME_PROBE, DEFAULT_TOP_K, EMBEDDING_DIMENSIONS,
};
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod chat;

#[derive(Parser)]
#[command(name = "resume-match", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Cohere API key used for embeddings.
    #[arg(long, env = "COHERE_API_KEY", hide_env_values = true)]
    cohere_api_key: String,

    /// Pinecone API key.
    #[arg(long, env = "PINECONE_API_KEY", hide_env_values = true)]
    pinecone_api_key: String,

    /// Gemini API key used for query synthesis.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: String,

    /// JSearch (RapidAPI) key used for the job search.
    #[arg(long, env = "JSEARCH_API_KEY", hide_env_values = true)]
    jsearch_api_key: String,

    /// Pinecone index holding resume chunks.
    #[arg(long, default_value = "resume-chunks")]
    index_name: String,

    /// Vector namespace for resume chunks.
    #[arg(long, default_value = "resumes")]
    namespace: String,
}

#[derive(Subcommand)]
enum Command {
    /// Parse one resume, chunk it semantically, and store the chunks.
    Ingest {
        /// Resume file (pdf).
        #[arg(long)]
        file: String,
    },
    /// Retrieve resume context and search for matching jobs.
    Ask {
        /// Probe text used to retrieve resume context.
        #[arg(long, default_value = DEFAULT_RESUME_PROBE)]
        query: String,
        /// Target role.
        #[arg(long, default_value = "Python Developer")]
        role: String,
        /// Preferred location; overrides whatever the model infers.
        #[arg(long)]
        location: Option<String>,
        /// Number of resume chunks to retrieve.
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
    },
    /// Ingest a folder of resumes and match each against the default roles.
    Batch {
        /// Folder containing resumes, searched recursively.
        #[arg(long)]
        folder: String,
        /// JSON report written once at the end of the run.
        #[arg(long, default_value = "parsed_resumes.json")]
        output: String,
    },
    /// Chat about jobs on stdin/stdout.
    Chat {
        /// Preferred location applied to every search.
        #[arg(long, default_value = "Pune, India")]
        location: String,
        /// Preferred role.
        #[arg(long, default_value = "Python Developer")]
        role: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    let admin = PineconeAdmin::new(&cli.pinecone_api_key);
    let index_host = admin
        .ensure_index(&cli.index_name, EMBEDDING_DIMENSIONS)
        .await
        .map_err(|error| anyhow::anyhow!(error.to_string()))?;

    let embedder = CohereEmbedder::new(&cli.cohere_api_key);
    let store = PineconeStore::new(format!("https://{index_host}"), &cli.pinecone_api_key);
    let model = GeminiClient::new(&cli.gemini_api_key);
    let jobs = JSearchClient::new(&cli.jsearch_api_key);

    let options = PipelineOptions {
        namespace: cli.namespace.clone(),
        top_k: match &cli.command {
            Command::Ask { top_k, .. } => *top_k,
            _ => DEFAULT_TOP_K,
        },
        ..Default::default()
    };
    let coordinator = MatchCoordinator::new(embedder, store, model, jobs, options);
    let extractor = LopdfExtractor;

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        index = %cli.index_name,
        "resume-match boot"
    );

    match cli.command {
        Command::Ingest { file } => {
            let record = coordinator
                .ingest_resume(Path::new(&file), &extractor)
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            println!("{}", serde_json::to_string_pretty(&record)?);
            if record.chunks.is_empty() {
                println!("no chunks extracted from {}", record.filename);
            } else {
                println!(
                    "{} chunks stored for {} at {}",
                    record.chunks.len(),
                    record.filename,
                    record.ingested_at.to_rfc3339()
                );
            }
        }
        Command::Ask {
            query,
            role,
            location,
            top_k: _,
        } => {
            let outcome = coordinator
                .match_jobs(&query, &role, location.as_deref())
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            match outcome.query {
                None => println!("No relevant resume data found. Ingest a resume first."),
                Some(structured) => {
                    if outcome.listings.is_empty() {
                        println!(
                            "No jobs found for {} in {}. Try a different role or location.",
                            structured.role, structured.location
                        );
                    } else {
                        println!(
                            "Found {} job matches for {} in {}:",
                            outcome.listings.len(),
                            structured.role,
                            structured.location
                        );
                        for listing in &outcome.listings {
                            print_listing(listing);
                        }
                    }
                }
            }
        }
        Command::Batch { folder, output } => {
            let roles: Vec<String> = DEFAULT_BATCH_ROLES
                .iter()
                .map(|role| role.to_string())
                .collect();

            let report = coordinator
                .run_batch(Path::new(&folder), &extractor, DEFAULT_RESUME_PROBE, &roles)
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            for skipped in &report.skipped {
                warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped resume");
            }

            for matches in &report.role_matches {
                println!(
                    "\njob matches for '{}' from {}:",
                    matches.role, matches.filename
                );
                for listing in &matches.listings {
                    print_listing(listing);
                }
            }

            persist_parsed_resumes(Path::new(&output), &report.records)
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;
            println!(
                "{} resumes parsed ({} skipped); report written to {}",
                report.records.len(),
                report.skipped.len(),
                output
            );
        }
        Command::Chat { location, role } => {
            chat::run(&coordinator, &role, &location).await?;
        }
    }

    Ok(())
}

fn print_listing(listing: &JobListing) {
    println!("{} at {}", listing.job_title, listing.employer_name);
    println!("  {}", listing.job_description);
    println!("  apply: {}", listing.job_apply_link);
    println!("  location: {}", listing.location);
}
