use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::Value as J;

use crate::core::content::{envelope, InvocationRequest};
use crate::core::error::DispatchError;
use crate::infra::boot;
use crate::infra::config::AppConfig;

#[derive(Parser)]
#[command(name = "concierge-mcp-gateway")]
#[command(about = "Concierge MCP Gateway - server and admin CLI")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the gateway (default)
    Serve,
    /// Health check a running gateway
    Health {
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
    /// Show status and tool availability of a running gateway
    Status {
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
    /// Validate configuration
    Config {
        /// Validate config without starting the service
        #[arg(long)]
        validate: bool,
    },
    /// List the tools this build registers
    Tools,
    /// Invoke a tool locally, without a server
    Call {
        name: String,
        /// Tool arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    run_commands(cli.command.unwrap_or(Commands::Serve)).await
}

fn report(label: &str, res: anyhow::Result<()>) -> ExitCode {
    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {label} failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn run_commands(command: Commands) -> ExitCode {
    match command {
        Commands::Serve => report("Server", serve().await),
        Commands::Health { url } => match health_check(&url).await {
            Ok(()) => {
                println!("✅ Service is healthy");
                ExitCode::SUCCESS
            }
            Err(e) => report("Health check", Err(e)),
        },
        Commands::Status { url } => report("Status check", show_status(&url).await),
        Commands::Config { validate } => match validate_config() {
            Ok(cfg) => {
                if validate {
                    println!("✅ Configuration is valid");
                } else {
                    print_config(&cfg);
                }
                ExitCode::SUCCESS
            }
            Err(e) => report("Configuration validation", Err(e)),
        },
        Commands::Tools => match tool_lines() {
            Ok(lines) => {
                lines.iter().for_each(|l| println!("{l}"));
                ExitCode::SUCCESS
            }
            Err(e) => report("Tool listing", Err(e)),
        },
        Commands::Call { name, args } => match call_local(&name, &args).await {
            Ok(out) => {
                println!("{out}");
                ExitCode::SUCCESS
            }
            Err(e) => report("Call", Err(e)),
        },
    }
}

async fn serve() -> anyhow::Result<()> {
    let cfg = AppConfig::load().context("loading configuration")?;
    boot::run(cfg).await
}

async fn health_check(url: &str) -> anyhow::Result<()> {
    let response = reqwest::Client::new()
        .get(format!("{url}/healthz"))
        .timeout(Duration::from_millis(500))
        .send()
        .await?;
    if !response.status().is_success() {
        bail!("HTTP {}", response.status());
    }
    Ok(())
}

async fn show_status(url: &str) -> anyhow::Result<()> {
    let client = reqwest::Client::new();

    let health = client
        .get(format!("{url}/api/health"))
        .timeout(Duration::from_secs(5))
        .send()
        .await?;
    println!(
        "🏥 Health Status: {}",
        if health.status().is_success() { "✅ Healthy" } else { "❌ Unhealthy" }
    );

    let tools = client
        .post(format!("{url}/v1/rpc"))
        .json(&serde_json::json!({ "jsonrpc": "2.0", "id": 1, "method": "tools/list" }))
        .timeout(Duration::from_millis(500))
        .send()
        .await;
    match tools {
        Ok(resp) if resp.status().is_success() => {
            let count = resp
                .json::<J>()
                .await
                .ok()
                .and_then(|v| v["result"]["tools"].as_array().map(Vec::len));
            match count {
                Some(n) => println!("🔧 Tools: ✅ {n} available"),
                None => println!("🔧 Tools: ❌ unreadable response"),
            }
        }
        Ok(resp) => println!("🔧 Tools: ❌ HTTP {}", resp.status()),
        Err(_) => println!("🔧 Tools: ❌ Unavailable (REST shim may be disabled)"),
    }
    Ok(())
}

fn validate_config() -> anyhow::Result<AppConfig> {
    Ok(AppConfig::load()?)
}

fn print_config(cfg: &AppConfig) {
    let set = |v: Option<&str>| if v.is_some() { "set" } else { "not set" };
    println!("📋 Configuration:");
    println!("  Mode: {}", cfg.server.mode);
    println!("  Port: {}", cfg.server.port);
    println!("  REST shim: {}", if cfg.server.deprecate_rest { "disabled" } else { "enabled" });
    println!("  Tool timeout: {}ms", cfg.server.call_timeout_ms);
    println!("  Vector store: {}", cfg.vector.base_url().unwrap_or("not set"));
    println!("  Stripe key: {}", set(cfg.payments.secret_key.as_deref()));
    println!("  Mail relay: {}", cfg.mail.http.base_url().unwrap_or("not set"));
    println!(
        "  Contact limit: {} per {}s",
        cfg.contact.max_per_window, cfg.contact.window_secs
    );
    println!("  Trust proxy: {}", if cfg.contact.trust_proxy { "yes" } else { "no" });
}

fn tool_lines() -> anyhow::Result<Vec<String>> {
    let dispatcher = boot::build_dispatcher(&AppConfig::default())?;
    Ok(dispatcher
        .descriptors()
        .map(|d| {
            let required: Vec<&str> = d.required_fields().map(|f| f.name).collect();
            format!("{:<26} {} [{}]", d.name(), d.description(), required.join(", "))
        })
        .collect())
}

/// Dispatch through a locally built registry and render the result envelope.
async fn call_local(name: &str, raw_args: &str) -> anyhow::Result<String> {
    let args: J = serde_json::from_str(raw_args).context("--args must be JSON")?;
    let J::Object(arguments) = args else {
        bail!("--args must be a JSON object");
    };
    let cfg = AppConfig::load()?;
    let dispatcher = boot::build_dispatcher(&cfg)?;
    let result = dispatcher.dispatch(InvocationRequest::new(name, arguments)).await;
    let rendered = serde_json::to_string_pretty(&envelope(&result))?;
    match result {
        Ok(_) => Ok(rendered),
        Err(DispatchError::HandlerFailure(_)) => bail!("{rendered}"),
        Err(e) => Err(e.into()),
    }
}
