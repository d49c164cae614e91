use resume_match_core::{
    Embedder, GenerativeModel, JobListing, JobSearch, MatchCoordinator, VectorIndex,
    DEFAULT_RESUME_PROBE,
};
use std::io::{self, BufRead, Write};

const GREETING: &str =
    "Hi! Ingest your resume or ask about jobs (e.g., 'Find Python Developer jobs in Pune'). Type 'exit' to leave.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub speaker: Speaker,
    pub content: String,
    pub jobs: Vec<JobListing>,
}

/// Conversation state for one interactive session. The matching pipeline
/// itself stays stateless; everything remembered between turns lives here.
#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new() -> Self {
        let mut session = Self::default();
        session.push_assistant(GREETING, Vec::new());
        session
    }

    pub fn push_user(&mut self, content: &str) {
        self.messages.push(ChatMessage {
            speaker: Speaker::User,
            content: content.to_string(),
            jobs: Vec::new(),
        });
    }

    pub fn push_assistant(&mut self, content: &str, jobs: Vec<JobListing>) {
        self.messages.push(ChatMessage {
            speaker: Speaker::Assistant,
            content: content.to_string(),
            jobs,
        });
    }

    /// Every listing shown this session, in the order it appeared.
    pub fn jobs_seen(&self) -> impl Iterator<Item = &JobListing> {
        self.messages.iter().flat_map(|message| message.jobs.iter())
    }
}

/// A prompt that mentions jobs is used verbatim as the retrieval probe;
/// anything else falls back to the generic skills probe.
fn probe_for(prompt: &str) -> String {
    if prompt.to_lowercase().contains("job") {
        prompt.to_string()
    } else {
        DEFAULT_RESUME_PROBE.to_string()
    }
}

pub async fn run<E, V, G, J>(
    coordinator: &MatchCoordinator<E, V, G, J>,
    role: &str,
    location: &str,
) -> anyhow::Result<()>
where
    E: Embedder + Send + Sync,
    V: VectorIndex + Send + Sync,
    G: GenerativeModel + Send + Sync,
    J: JobSearch + Send + Sync,
{
    let mut session = ChatSession::new();
    println!("{GREETING}");
    prompt_marker()?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let prompt = line.trim();

        if prompt.is_empty() {
            prompt_marker()?;
            continue;
        }
        if prompt.eq_ignore_ascii_case("exit") || prompt.eq_ignore_ascii_case("quit") {
            break;
        }

        session.push_user(prompt);

        match coordinator
            .match_jobs(&probe_for(prompt), role, Some(location))
            .await
        {
            Ok(outcome) if outcome.query.is_none() => {
                let reply = "No relevant resume data found. Please ingest a resume first.";
                println!("{reply}");
                session.push_assistant(reply, Vec::new());
            }
            Ok(outcome) if outcome.listings.is_empty() => {
                let reply = "No jobs found. Try a different role or location.";
                println!("{reply}");
                session.push_assistant(reply, Vec::new());
            }
            Ok(outcome) => {
                let reply = format!(
                    "Found {} job matches for {role} in {location}!",
                    outcome.listings.len()
                );
                println!("{reply}");
                for listing in &outcome.listings {
                    crate::print_listing(listing);
                }
                session.push_assistant(&reply, outcome.listings);
            }
            Err(error) => {
                let reply = format!("Error: {error}");
                println!("{reply}");
                session.push_assistant(&reply, Vec::new());
            }
        }

        prompt_marker()?;
    }

    print_session_summary(&session);
    Ok(())
}

fn prompt_marker() -> io::Result<()> {
    print!("> ");
    io::stdout().flush()
}

fn print_session_summary(session: &ChatSession) {
    let jobs: Vec<&JobListing> = session.jobs_seen().collect();
    if jobs.is_empty() {
        return;
    }

    println!("\nYour job matches this session:");
    for job in jobs {
        println!(
            "  {} | {} | {} | {}",
            job.job_title, job.employer_name, job.location, job.job_apply_link
        );
    }
}
