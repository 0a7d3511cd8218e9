//! DingBridge - DingTalk organization sync and messaging
//!
//! Command-line entry point.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dingbridge_domain::{AppCredential, NewDingApp, TemplateSpec};
use dingbridge_infra::Notification;
use dingbridge_lib::utils::logging::init_tracing;
use dingbridge_lib::AppContext;
use tokio::sync::broadcast::error::TryRecvError;

#[derive(Parser)]
#[command(
    name = "dingbridge",
    about = "Mirror DingTalk organizations and send work notifications",
    version
)]
struct Cli {
    /// Config file (default: environment, then config.{json,toml} / dingbridge.{json,toml})
    #[arg(long, global = true, env = "DINGBRIDGE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage registered DingTalk applications
    App {
        #[command(subcommand)]
        subcommand: AppSubcommand,
    },

    /// Sync the department hierarchy of an application and wait for it
    Sync {
        #[arg(long)]
        app_id: i64,
        /// User the run is performed for; receives the notifications
        #[arg(long, env = "USER")]
        user: String,
    },

    /// Send a work notification
    SendMessage {
        #[arg(long)]
        app_id: i64,
        /// Recipient user id; repeat for several, or pass `to_all_user`
        #[arg(long = "user-id")]
        user_ids: Vec<String>,
        /// Recipient department id; repeat for several
        #[arg(long = "dept-id")]
        dept_ids: Vec<String>,
        /// Message body as JSON, e.g. '{"msgtype":"text","text":{"content":"hi"}}'
        #[arg(long)]
        msg: String,
    },

    /// Upload a media file and print its media id
    UploadMedia {
        #[arg(long)]
        app_id: i64,
        /// One of image, voice, video, file
        #[arg(long = "type")]
        media_type: String,
        #[arg(long)]
        file: PathBuf,
    },

    /// Create or update an official OA approval template from a JSON file
    UpsertTemplate {
        #[arg(long)]
        app_id: i64,
        #[arg(long)]
        file: PathBuf,
    },

    /// Show recent sync audit entries, newest first
    Logs {
        #[arg(long)]
        app_id: i64,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum AppSubcommand {
    /// Register an application
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        app_key: String,
        #[arg(long, env = "DINGBRIDGE_APP_SECRET", hide_env_values = true)]
        app_secret: String,
        #[arg(long)]
        agent_id: String,
        #[arg(long)]
        company_id: i64,
        /// Mirror departments only, without their members
        #[arg(long)]
        departments_only: bool,
        #[arg(long)]
        callback_token: Option<String>,
        #[arg(long)]
        encoding_aes_key: Option<String>,
    },

    /// List registered applications
    List,
}

fn main() -> anyhow::Result<()> {
    // Load .env before the subscriber so RUST_LOG can come from it
    let dotenv = dotenvy::dotenv();
    init_tracing();
    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "could not load .env file"),
    }

    let cli = Cli::parse();
    let config = match cli.config {
        Some(path) => dingbridge_infra::config::load_from_file(Some(path))?,
        None => dingbridge_infra::config::load()?,
    };
    let ctx = AppContext::new_with_config(config).context("failed to initialise DingBridge")?;

    run(&ctx, cli.command)
}

#[allow(clippy::print_stdout)]
fn run(ctx: &AppContext, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::App { subcommand } => run_app(ctx, subcommand)?,
        Commands::Sync { app_id, user } => {
            let mut notifications = ctx.notifications.subscribe();
            let handle = dingbridge_lib::trigger_sync(ctx, app_id, &user)?;
            print_pending(&mut notifications);
            handle.join()?;
            print_pending(&mut notifications);
        }
        Commands::SendMessage { app_id, user_ids, dept_ids, msg } => {
            let msg = serde_json::from_str(&msg).context("--msg is not valid JSON")?;
            let task_id = dingbridge_lib::send_ding_message(ctx, app_id, user_ids, dept_ids, msg)?;
            println!("{task_id}");
        }
        Commands::UploadMedia { app_id, media_type, file } => {
            let content = std::fs::read(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let filename = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload".to_string());
            let media_id =
                dingbridge_lib::upload_media(ctx, app_id, &media_type, content, &filename)?;
            println!("{media_id}");
        }
        Commands::UpsertTemplate { app_id, file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let template: TemplateSpec =
                serde_json::from_str(&raw).context("template file is not a valid template")?;
            let process_code =
                dingbridge_lib::create_or_update_official_oa_template(ctx, app_id, template)?;
            println!("{process_code}");
        }
        Commands::Logs { app_id, limit } => {
            for record in dingbridge_lib::list_logs(ctx, app_id, limit)? {
                println!(
                    "#{} {} by {}\n{}\n",
                    record.id,
                    record.created_at.format("%Y-%m-%d %H:%M:%S"),
                    record.created_by,
                    record.entry.detail
                );
            }
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn run_app(ctx: &AppContext, subcommand: AppSubcommand) -> anyhow::Result<()> {
    match subcommand {
        AppSubcommand::Add {
            name,
            description,
            app_key,
            app_secret,
            agent_id,
            company_id,
            departments_only,
            callback_token,
            encoding_aes_key,
        } => {
            let app = dingbridge_lib::add_app(
                ctx,
                NewDingApp {
                    name,
                    description,
                    credential: AppCredential::new(app_key, app_secret, agent_id),
                    company_id,
                    sync_with_user: !departments_only,
                    callback_token,
                    encoding_aes_key,
                },
            )?;
            println!("registered app {} ({})", app.id, app.name);
        }
        AppSubcommand::List => {
            for app in dingbridge_lib::list_apps(ctx)? {
                println!(
                    "{:>4}  {:<24} company={} agent={} sync_with_user={}",
                    app.id, app.name, app.company_id, app.credential.agent_id, app.sync_with_user
                );
            }
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_pending(notifications: &mut tokio::sync::broadcast::Receiver<Notification>) {
    loop {
        match notifications.try_recv() {
            Ok(Notification { message, .. }) => {
                let level = if message.warning { "warning" } else { "info" };
                println!("[{level}] {}: {}", message.title, message.message);
            }
            Err(TryRecvError::Lagged(skipped)) => {
                println!("[warning] {skipped} notifications were dropped");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}
