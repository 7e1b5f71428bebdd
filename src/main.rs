use anyhow::{Context, Result};
use clap::Parser;
use scan_reportbot::config::{self, MailCredentials};
use scan_reportbot::feed::FeedClient;
use scan_reportbot::mailer::SmtpMailer;
use scan_reportbot::pipeline::{self, RunOutcome};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
    /// Set when invoked by the scheduler; skips loading a local .env file
    #[arg(long)]
    scheduled: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    match run(&args).await {
        Ok(RunOutcome::NoData) => {
            info!("run finished: no data for today, no email sent");
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Sent { records, .. }) => {
            info!(records, "run finished: report sent");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(?err, "run failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<RunOutcome> {
    if !args.scheduled {
        // Local runs keep credentials in a .env next to the config.
        dotenvy::dotenv().ok();
    }

    let cfg = config::load(Some(&args.config))?;
    // Resolved once, before any network work; a missing credential halts
    // the run without a delivery attempt.
    let creds = MailCredentials::from_env()?;

    let feed = FeedClient::new(&cfg.feed).context("failed to build feed client")?;
    let mailer = SmtpMailer::new(&cfg.mail, &cfg.report.attachment_name, &creds)
        .context("failed to configure mail transport")?;

    pipeline::run(&cfg, &feed, &mailer).await
}
