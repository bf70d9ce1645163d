use std::env;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::llm::LlmSettings;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE", global = true)]
    pub config: Option<String>,

    /// LLM model name
    #[arg(long, global = true)]
    pub model: Option<String>,

    #[command(flatten)]
    pub serve: ServeArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve the chat widget page and the /chat endpoint (default)
    Serve,
    /// Chat from the terminal
    Chat(ChatArgs),
}

/// Server flags. Global so they apply whether or not `serve` is typed.
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, env = "PORT", global = true)]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Disable timeout middleware
    #[arg(long, env = "TIMEOUT_DISABLED", global = true)]
    pub timeout_disabled: Option<bool>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ChatArgs {
    /// URL of the /chat endpoint
    #[arg(long, env = "CHAT_ENDPOINT", conflicts_with = "local")]
    pub endpoint: Option<String>,

    /// Run the agent in-process instead of calling a server
    #[arg(long)]
    pub local: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub widget: WidgetConfig,
    pub resilience: ResilienceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WidgetConfig {
    /// Endpoint the terminal client posts to.
    pub endpoint: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResilienceConfig {
    pub timeout_disabled: bool,
    pub request_timeout_secs: u64,
}

impl WidgetConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::from_cli(&cli)
    }

    /// Build the layered configuration.
    ///
    /// Priority: CLI flag > `OLLAMA_*` env > `POLICY_CHAT_*` env > config file > defaults.
    pub fn from_cli(cli: &Cli) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("llm.base_url", "http://localhost:11434")?
            .set_default("llm.model", "llama3.2:3b")?
            .set_default("widget.endpoint", "http://127.0.0.1:3000/chat")?
            .set_default("widget.timeout_secs", 60)?
            .set_default("resilience.timeout_disabled", false)?
            .set_default("resilience.request_timeout_secs", 120)?;

        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        // E.g. POLICY_CHAT_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("POLICY_CHAT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(host) = non_empty_var("OLLAMA_HOST") {
            builder = builder.set_override("llm.base_url", host)?;
        }
        if let Some(model) = non_empty_var("OLLAMA_MODEL") {
            builder = builder.set_override("llm.model", model)?;
        }
        if let Some(key) = non_empty_var("LLM_API_KEY") {
            builder = builder.set_override("llm.api_key", key)?;
        }

        if let Some(model) = &cli.model {
            builder = builder.set_override("llm.model", model.as_str())?;
        }
        let serve = &cli.serve;
        if let Some(port) = serve.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(host) = &serve.host {
            builder = builder.set_override("server.host", host.as_str())?;
        }
        if let Some(td) = serve.timeout_disabled {
            builder = builder.set_override("resilience.timeout_disabled", td)?;
        }
        if let Some(Command::Chat(ChatArgs {
            endpoint: Some(endpoint),
            ..
        })) = &cli.command
        {
            builder = builder.set_override("widget.endpoint", endpoint.as_str())?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }

    /// Settings for the LLM driver.
    ///
    /// LLM calls share the server's request timeout, and have none when the
    /// timeout middleware is disabled.
    pub fn llm_settings(&self) -> LlmSettings {
        LlmSettings {
            base_url: self.llm.base_url.clone(),
            api_key: self.llm.api_key.clone().filter(|k| !k.trim().is_empty()),
            model: self.llm.model.clone(),
            timeout: (!self.resilience.timeout_disabled)
                .then(|| Duration::from_secs(self.resilience.request_timeout_secs)),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
