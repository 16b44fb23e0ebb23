//! ClipMill CLI binary.

use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cmill_app::{AccountService, AppConfig, AppState, Session, VideoService};
use cmill_models::{JobId, JobStatus, PlanLimits, ProcessingOptions, SocialPlatform};
use cmill_processing::PollProgress;
use cmill_social::{PostComposer, PostScheduler};
use cmill_supabase::SavedResults;

#[derive(Parser)]
#[command(name = "cmill")]
#[command(about = "Turn long videos into short clips from the terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a video and watch it through to clips
    Process {
        /// Video URL to process
        url: String,
        /// Skip transcript-based analysis
        #[arg(long)]
        no_transcript: bool,
        /// Skip scene detection
        #[arg(long)]
        no_scene_detection: bool,
        /// Enable quality enhancement
        #[arg(long)]
        enhance: bool,
    },
    /// Re-attach to a running job and watch it to the end
    Watch {
        /// Job id returned at submission
        job_id: String,
    },
    /// Fetch a job's status once, without polling
    Status {
        /// Job id returned at submission
        job_id: String,
    },
    /// Show monthly usage against the plan limit
    Usage,
    /// List the available plans
    Plans,
    /// Show or clear the saved results of the last run
    Results {
        /// Delete the saved results instead of showing them
        #[arg(long)]
        clear: bool,
    },
    /// Page through past processing runs
    History {
        /// Zero-based page number
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
    /// Validate a social post draft
    Compose {
        /// Post text
        #[arg(long)]
        content: String,
        /// Target platform, repeatable
        #[arg(long = "platform", required = true)]
        platforms: Vec<String>,
        /// Attached media URL, repeatable
        #[arg(long = "media")]
        media: Vec<String>,
    },
    /// Validate a scheduled post and echo it back
    Schedule {
        /// Post title
        #[arg(long)]
        title: String,
        /// Target platform
        #[arg(long)]
        platform: String,
        /// Publish time, RFC 3339 (e.g. 2025-07-01T09:00:00Z)
        #[arg(long)]
        at: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    init_tracing();

    let cli = Cli::parse();

    let config = AppConfig::from_env().context("loading configuration")?;
    let state = AppState::new(config)?;

    match Session::from_env() {
        Some(session) => state.sign_in(session).await,
        None => debug!("No session in the environment; account commands will fail"),
    }

    match cli.command {
        Commands::Process {
            url,
            no_transcript,
            no_scene_detection,
            enhance,
        } => {
            let options = ProcessingOptions {
                use_transcript: !no_transcript,
                detect_scenes: !no_scene_detection,
                enhance_quality: enhance,
                user_id: None,
            };

            let cancel = cancel_on_ctrl_c();
            let printer = spawn_progress_printer(&state);

            let videos = VideoService::new(Arc::clone(&state));
            let result = videos.process(&url, options, &cancel).await;
            printer.abort();

            print_status(&result?);
        }

        Commands::Watch { job_id } => {
            let cancel = cancel_on_ctrl_c();
            let printer = spawn_progress_printer(&state);

            let videos = VideoService::new(Arc::clone(&state));
            let result = videos
                .poll_existing(&JobId::from_string(job_id), &cancel)
                .await;
            printer.abort();

            print_status(&result?);
        }

        Commands::Status { job_id } => {
            let status = state
                .processing
                .fetch_status(&JobId::from_string(job_id))
                .await?;
            print_status(&status);
        }

        Commands::Usage => {
            let account = AccountService::new(Arc::clone(&state));
            let usage = account.usage().await?;
            println!(
                "{} plan: {}/{} clips used this month, {} remaining",
                usage.tier,
                usage.used,
                usage.limit,
                usage.remaining()
            );
            println!("counter resets on {}", account.renewal_hint());
        }

        Commands::Plans => {
            for plan in [&state.plans.free, &state.plans.regular, &state.plans.pro] {
                print_plan(plan);
            }
        }

        Commands::Results { clear } => {
            let videos = VideoService::new(Arc::clone(&state));
            if clear {
                videos.clear_results().await?;
                println!("saved results cleared");
            } else {
                match videos.saved_results().await? {
                    Some(saved) => print_saved_results(&saved),
                    None => println!("no saved results"),
                }
            }
        }

        Commands::History { page } => {
            let videos = VideoService::new(Arc::clone(&state));
            let entries = videos.history(page).await?;
            if entries.is_empty() {
                println!("no runs on page {}", page);
            }
            for entry in entries {
                let highlights = if entry.highlights_url.is_some() {
                    ", with highlights"
                } else {
                    ""
                };
                println!(
                    "{}  {} clip(s){}",
                    entry.created_at.format("%Y-%m-%d %H:%M"),
                    entry.clips.len(),
                    highlights
                );
            }
        }

        Commands::Compose {
            content,
            platforms,
            media,
        } => {
            let platforms = parse_platforms(&platforms)?;
            let draft = PostComposer::compose(&content, media, &platforms)?;
            let targets: Vec<&str> = draft.platforms.iter().map(|p| p.as_str()).collect();
            println!(
                "draft ok: {} characters, {} media, posting to {}",
                draft.content.chars().count(),
                draft.media.len(),
                targets.join(", ")
            );
        }

        Commands::Schedule {
            title,
            platform,
            at,
        } => {
            let platform = SocialPlatform::from_str(&platform)
                .ok_or_else(|| anyhow::anyhow!("unknown platform: {}", platform))?;
            let when: DateTime<Utc> = at
                .parse()
                .with_context(|| format!("invalid RFC 3339 time: {}", at))?;

            let mut scheduler = PostScheduler::new();
            let post = scheduler.schedule(&title, platform, when)?;
            println!(
                "scheduled \"{}\" for {} on {} (id {})",
                post.title, post.scheduled_for, post.platform, post.id
            );
        }
    }

    Ok(())
}

fn init_tracing() {
    let use_json = std::env::var("CMILL_LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("cmill=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

/// Token cancelled by the first Ctrl-C, so an in-flight poll stops
/// between requests instead of being killed.
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal, stopping poll");
            trigger.cancel();
        }
    });
    cancel
}

fn spawn_progress_printer(state: &Arc<AppState>) -> tokio::task::JoinHandle<()> {
    let mut rx = state.progress.subscribe();
    tokio::spawn(async move {
        let mut last_line = String::new();
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            let line = progress_line(&snapshot);
            if line != last_line {
                println!("{}", line);
                last_line = line;
            }
        }
    })
}

fn progress_line(progress: &PollProgress) -> String {
    match (progress.stage, progress.message.as_deref()) {
        (Some(stage), Some(message)) => format!("[{}] {}", stage.label(), message),
        (Some(stage), None) => format!("[{}]", stage.label()),
        (None, Some(message)) => message.to_string(),
        (None, None) => format!("state: {}", progress.state),
    }
}

fn print_status(status: &JobStatus) {
    println!("state: {}", status.state);
    if let Some(highlights) = &status.highlights {
        println!("highlights: {}", highlights);
    }
    for (i, clip) in status.clips.iter().enumerate() {
        let mut line = format!("clip {}: {}", i + 1, clip.url);
        if let Some(score) = clip.viral_potential {
            line.push_str(&format!(" (viral potential {}/10)", score));
        }
        if let Some(duration) = clip.duration_secs() {
            line.push_str(&format!(" [{:.0}s]", duration));
        }
        println!("{}", line);
        if let Some(description) = &clip.description {
            println!("    {}", description);
        }
    }
}

fn print_plan(plan: &PlanLimits) {
    let price = if plan.price_cents == 0 {
        "free".to_string()
    } else {
        format!("${}.{:02}/mo", plan.price_cents / 100, plan.price_cents % 100)
    };
    let duration = match plan.max_clip_duration_secs {
        Some(secs) => format!(", clips up to {}s", secs),
        None => String::new(),
    };
    println!(
        "{}: {} clips/month, {}{}",
        plan.name, plan.clip_limit, price, duration
    );
}

fn print_saved_results(saved: &SavedResults) {
    println!(
        "saved {} ({} clip(s))",
        saved.updated_at.format("%Y-%m-%d %H:%M"),
        saved.clips.len()
    );
    if let Some(highlights) = &saved.highlights_url {
        println!("highlights: {}", highlights);
    }
    for (i, clip) in saved.clips.iter().enumerate() {
        println!("clip {}: {}", i + 1, clip.url);
    }
}

fn parse_platforms(names: &[String]) -> anyhow::Result<Vec<SocialPlatform>> {
    names
        .iter()
        .map(|name| {
            SocialPlatform::from_str(name)
                .ok_or_else(|| anyhow::anyhow!("unknown platform: {}", name))
        })
        .collect()
}
