// src/cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{error, info};

use crate::core::{CvApi, ServiceClient};
use crate::environment::{EnvironmentConfig, DEFAULT_CONFIG_PATH};
use crate::poller::PollOutcome;
use crate::types::{CvSummary, JobId};
use crate::upload::{CvUploadController, LocalFileSelection, NotificationLevel, UploadEvent};
use crate::utils::{format_size, progress_bar};

const PROGRESS_WIDTH: usize = 30;

#[derive(Parser)]
#[command(name = "cv-uploader")]
#[command(about = "Upload a CV to the job marketplace and follow its processing")]
pub struct Cli {
    #[command(subcommand)]
    pub command: CvCommand,

    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Backend base URL, e.g. http://localhost:8080/api
    #[arg(long)]
    pub api_url: Option<String>,

    /// Bearer token of the candidate session
    #[arg(long)]
    pub token: Option<String>,

    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum CvCommand {
    /// Upload a PDF, DOC or DOCX file and wait for processing
    Upload { file: PathBuf },
    /// Show the status of a processing job
    JobStatus { job_id: JobId },
    /// Show the stored CV
    Show,
    /// Check whether a CV is stored
    Status,
    /// Delete the stored CV
    Delete,
    /// Download the stored CV file
    Download { output: PathBuf },
}

impl Cli {
    /// Configuration from file and environment, with command line flags on top
    pub fn resolve_config(&self) -> Result<EnvironmentConfig> {
        let mut config = EnvironmentConfig::load(&self.config)?;
        config.apply_overrides(self.api_url.clone(), self.token.clone());
        if let Some(log_file) = &self.log_file {
            config.log_file = log_file.clone();
        }
        Ok(config)
    }
}

pub async fn handle_cv_command(command: CvCommand, config: EnvironmentConfig) -> Result<()> {
    let client = ServiceClient::new(
        &config.api_base_url,
        config.timeout_seconds,
        config.token.clone(),
    )
    .context("Failed to create HTTP client")?;
    let api: Arc<dyn CvApi> = Arc::new(client);

    let (mut controller, events) = CvUploadController::new(api.clone(), config.poller.clone());

    match command {
        CvCommand::Upload { file } => {
            let selection = LocalFileSelection::from_path(&file).await?;
            println!(
                "📄 {} ({}, {})",
                selection.name,
                format_size(selection.size),
                selection.mime_type
            );

            if let Err(e) = controller.select_file(selection).await {
                anyhow::bail!("❌ {}", e);
            }

            let printer = tokio::spawn(print_events(events));

            let job_id = match controller.upload().await {
                Ok(job_id) => job_id,
                Err(e) => {
                    drop(controller);
                    let _ = printer.await;
                    anyhow::bail!("❌ {}", e);
                }
            };
            info!("Following job {}", job_id);

            let outcome = controller.wait_for_poll().await;
            let state = controller.state().await;
            drop(controller);
            let _ = printer.await;

            match outcome {
                Some(PollOutcome::Completed) => {
                    match &state.cv {
                        Some(cv) => print_cv_summary(cv),
                        None => println!("CV processed, but no summary is available yet"),
                    }
                    Ok(())
                }
                Some(PollOutcome::Failed(message)) => anyhow::bail!("❌ {}", message),
                Some(PollOutcome::TimedOut) => {
                    println!(
                        "⚠️  {}",
                        state.error.as_deref().unwrap_or("Processing is still running")
                    );
                    println!("   Check again later with: cv-uploader job-status {}", job_id);
                    Ok(())
                }
                Some(PollOutcome::Cancelled) | None => {
                    anyhow::bail!("Polling of job {} stopped unexpectedly", job_id)
                }
            }
        }

        CvCommand::JobStatus { job_id } => {
            let job = api
                .job_status(job_id)
                .await
                .with_context(|| format!("Failed to fetch status of job {}", job_id))?;
            println!("Job {}: {}", job_id, job.status);
            if let Some(details) = job.status_details {
                println!("   {}", details);
            }
            if let Some(message) = job.error_message {
                println!("   ❌ {}", message);
            }
            Ok(())
        }

        CvCommand::Show => {
            match controller.refresh_cv().await {
                Some(cv) => print_cv_summary(&cv),
                None => println!("No CV found"),
            }
            Ok(())
        }

        CvCommand::Status => {
            let status = controller.cv_status().await?;
            if status.has_cv {
                println!("✅ A CV is stored for this account");
            } else {
                println!("❌ No CV stored for this account");
            }
            Ok(())
        }

        CvCommand::Delete => {
            let printer = tokio::spawn(print_events(events));
            let result = controller.delete_cv().await;
            drop(controller);
            let _ = printer.await;
            result
        }

        CvCommand::Download { output } => {
            let path = controller.download_cv(&output).await?;
            println!("✅ CV saved to {}", path.display());
            Ok(())
        }
    }
}

async fn print_events(mut events: UnboundedReceiver<UploadEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            UploadEvent::Progress {
                percent,
                status_text,
            } => println!("{} {}", progress_bar(percent, PROGRESS_WIDTH), status_text),
            UploadEvent::Notification { level, message } => match level {
                NotificationLevel::Success => println!("✅ {}", message),
                NotificationLevel::Warning => println!("⚠️  {}", message),
                NotificationLevel::Error => {
                    error!("{}", message);
                    println!("❌ {}", message)
                }
            },
            UploadEvent::Reset => {}
        }
    }
}

fn print_cv_summary(cv: &CvSummary) {
    println!("CV #{}", cv.id);
    if let Some(name) = cv.full_name() {
        println!("   Name: {}", name);
    }
    if let Some(email) = &cv.email {
        println!("   Email: {}", email);
    }
    if let Some(years) = cv.experience_years {
        println!("   Experience: {} years", years);
    }
    if let Some(level) = &cv.education_level {
        println!("   Education: {}", level);
    }
    let skills = cv.technical_skill_list();
    if !skills.is_empty() {
        println!("   Skills: {}", skills.join(", "));
    }
    if let Some(summary) = &cv.professional_summary {
        println!("   Summary: {}", summary);
    }
    if let Some(updated) = cv.updated_at.or(cv.created_at) {
        println!("   Last updated: {}", updated.format("%Y-%m-%d %H:%M"));
    }
}
