//! Command-line front end for the promptpix job controller.
//!
//! Usage:
//!
//! ```text
//! promptpix <prompt>           submit a prompt and wait for the result
//! promptpix history [owner]    list jobs for an owner (anonymous pool by default)
//! promptpix delete <job-id>    delete a job record and its artifact
//! ```
//!
//! Backend settings come from the environment (see
//! [`BackendConfig::from_env`]); a `.env` file is honored.

use anyhow::{bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use promptpix_backend::BackendConfig;
use promptpix_controller::JobController;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "promptpix=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BackendConfig::from_env().context("backend configuration")?;
    let controller = JobController::from_config(config);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("history") => {
            let owner = args.get(1).map(String::as_str);
            let jobs = controller.history(owner).await?;
            for job in jobs {
                println!(
                    "{}  {:?}  {}",
                    job.id,
                    job.status,
                    job.image_url.or(job.error_message).unwrap_or_default()
                );
            }
        }
        Some("delete") => {
            let id = args
                .get(1)
                .context("usage: promptpix delete <job-id>")?
                .parse::<uuid::Uuid>()
                .context("job id must be a UUID")?;
            if !controller.delete_current(id).await {
                let reason = controller.state().error.unwrap_or_default();
                bail!("deletion failed: {reason}");
            }
            println!("deleted {id}");
        }
        Some(prompt) => {
            if prompt.is_empty() || prompt.len() > 500 {
                bail!("prompt must be between 1 and 500 characters");
            }
            tracing::info!(prompt_len = prompt.len(), "Submitting prompt");
            let generated = controller.submit(prompt, None).await?;
            tracing::info!(job_id = %generated.job_id, "Generation completed");
            println!("{}", generated.image_url);
        }
        None => {
            bail!("usage: promptpix <prompt> | history [owner] | delete <job-id>");
        }
    }

    Ok(())
}
