//! agent-webhook: terminal front-end for a webhook-backed chat agent.
//!
//! Usage:
//!   agent-webhook send <TEXT>...          Send one message and print the reply
//!   agent-webhook chat                    Interactive chat (/clear, /quit)
//!   agent-webhook probe [URL]             Test an endpoint without saving it
//!   agent-webhook config show             Print effective settings
//!   agent-webhook config set <URL>        Save the endpoint URL

use agent_webhook::notify::{Notification, NotificationLevel, NotificationSink};
use agent_webhook::{
    AgentClient, ChatSession, ConfigStore, FileConfigStore, MemoryConfigStore, Settings,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(name = "agent-webhook", version, about = "Chat with a remote agent behind a webhook")]
struct Cli {
    /// Settings file (default: $AGENT_WEBHOOK_CONFIG or ~/.config/agent-webhook/config.yaml).
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    /// Use this endpoint for this run instead of the saved one.
    #[arg(short = 'u', long = "url", global = true)]
    url: Option<String>,

    /// Chat deadline in seconds.
    #[arg(short = 't', long = "timeout", global = true)]
    timeout: Option<u64>,

    /// Log dispatch details to stderr.
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send one message and print the reply.
    Send {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Interactive chat over stdin.
    Chat,
    /// Test an endpoint (defaults to the configured one).
    Probe { url: Option<String> },
    /// Show or change settings.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    Show,
    Set { url: String },
}

/// Prints notifications to stderr so they never mix with replies on stdout.
struct ConsoleNotificationSink;

#[async_trait]
impl NotificationSink for ConsoleNotificationSink {
    async fn notify(&self, n: Notification) -> agent_webhook::Result<()> {
        let tag = match n.level {
            NotificationLevel::Success => "ok",
            NotificationLevel::Info => "info",
            NotificationLevel::Error => "error",
        };
        eprintln!("[{}] {}", tag, n.text);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file_store = match &cli.config {
        Some(path) => FileConfigStore::open(path.clone()),
        None => FileConfigStore::open_default(),
    }
    .context("failed to load settings")?;

    let mut settings = file_store.settings();
    if let Some(secs) = cli.timeout {
        settings.chat_timeout_secs = secs;
    }

    match cli.command {
        Command::Config { action } => run_config(file_store, &settings, action).await,
        Command::Probe { url } => {
            let session = build_session(&cli.url, file_store, &settings)?;
            let report = session.test_endpoint(url.as_deref()).await?;
            if !report.ok {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Send { text } => {
            let mut session = build_session(&cli.url, file_store, &settings)?;
            let reply = session.send_message(&text.join(" ")).await?;
            println!("{}", reply.message.content);
            if !reply.outcome.is_success() {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Chat => {
            let session = build_session(&cli.url, file_store, &settings)?;
            run_chat(session, settings.chat_deadline()).await
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "agent_webhook=debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn build_session(
    url_override: &Option<String>,
    file_store: FileConfigStore,
    settings: &Settings,
) -> Result<ChatSession> {
    let client = AgentClient::builder().with_settings(settings).build()?;
    let store: Arc<dyn ConfigStore> = match url_override {
        Some(url) => Arc::new(MemoryConfigStore::with_url(url)?),
        None => Arc::new(file_store),
    };
    Ok(ChatSession::new(client, store).with_notifier(Arc::new(ConsoleNotificationSink)))
}

async fn run_config(store: FileConfigStore, settings: &Settings, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("Settings file: {}", store.path().display());
            println!(
                "  endpoint_url:       {}",
                settings.endpoint_url.as_deref().unwrap_or("(not set)")
            );
            println!("  chat_timeout_secs:  {}", settings.chat_timeout_secs);
            println!("  probe_timeout_secs: {}", settings.probe_timeout_secs);
        }
        ConfigAction::Set { url } => {
            let path = store.path().to_path_buf();
            let client = AgentClient::builder().with_settings(settings).build()?;
            let session = ChatSession::new(client, Arc::new(store))
                .with_notifier(Arc::new(ConsoleNotificationSink));

            let check = session.save_endpoint(&url).await?;
            println!("Webhook URL saved to {}", path.display());
            // The save is already on disk; only wait so the check can report before exit.
            check.await.context("connection check task failed")?;
        }
    }
    Ok(())
}

async fn run_chat(mut session: ChatSession, deadline: Duration) -> Result<()> {
    match session.endpoint() {
        Some(url) => println!("Chatting with {} (deadline {}s)", url, deadline.as_secs()),
        None => anyhow::bail!("no webhook URL configured; run `agent-webhook config set <URL>`"),
    }
    println!("Type a message and press Enter. /clear empties the chat, /quit exits.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => session.clear().await,
            text => {
                let reply = session.send_message(text).await?;
                println!("{}\n", reply.message.content);
            }
        }
    }
    Ok(())
}
