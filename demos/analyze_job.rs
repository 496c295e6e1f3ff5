//! Analyze a job description from stdin against a live backend.
//!
//! Requires `RESUME_AI_API_KEY` (and optionally `RESUME_AI_API_URL`,
//! `RESUME_AI_MODEL`) in the environment:
//!
//! ```bash
//! cat posting.txt | cargo run --example analyze_job
//! ```

use resume_ai::ResumeAi;
use std::io::Read;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut job_description = String::new();
    std::io::stdin().read_to_string(&mut job_description)?;

    let service = ResumeAi::builder().build()?;

    match service.analyze_job_description(&job_description).await {
        Ok(analysis) => {
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
        Err(err) => {
            eprintln!("analysis failed [{}]: {}", err.kind(), err);
            eprintln!("breaker state: {}", service.breaker_state());
            std::process::exit(1);
        }
    }

    Ok(())
}
