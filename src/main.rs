//! Policy Chat entry point.
//!
//! `policy-chat serve` (default) runs the HTTP server; `policy-chat chat`
//! runs the terminal client.

use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use mimalloc::MiMalloc;
use tokio::io::BufReader;
use tracing::info;

use policy_chat::agent::{DummyLegacyApi, PolicyAgent};
use policy_chat::config::{AppConfig, ChatArgs, Cli, Command};
use policy_chat::llm::ChatCompletionsDriver;
use policy_chat::telemetry::{self, LogFormat};
use policy_chat::widget::{ChatBackend, ChatWidget, HttpChatBackend};
use policy_chat::{server, terminal};

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    telemetry::init(LogFormat::from_env());

    let cli = Cli::parse();
    let config = Arc::new(AppConfig::from_cli(&cli)?);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => server::start_server(config).await,
        Command::Chat(args) => run_terminal(&config, &args).await,
    }
}

async fn run_terminal(config: &AppConfig, args: &ChatArgs) -> anyhow::Result<()> {
    let backend: Box<dyn ChatBackend> = if args.local {
        info!(model = %config.llm.model, "Running agent in-process");
        Box::new(PolicyAgent::new(
            Arc::new(ChatCompletionsDriver::new(config.llm_settings())?),
            Arc::new(DummyLegacyApi::default()),
        ))
    } else {
        let http = HttpChatBackend::with_timeout(&config.widget.endpoint, config.widget.timeout())?;
        info!(endpoint = %http.endpoint(), "Using remote chat endpoint");
        Box::new(http)
    };

    let mut widget = ChatWidget::new();
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    terminal::run(&mut widget, backend.as_ref(), stdin, &mut stdout).await
}
