//! lessonmcp CLI — entry point.
//!
//! # Commands
//!
//! - `lessonmcp serve` — stdio and HTTP transports together
//! - `lessonmcp http` / `lessonmcp stdio` — a single transport
//! - `lessonmcp status` — show configuration and provider status
//! - `lessonmcp call TOOL ARGS` — run one tool call and print the result
//! - `lessonmcp complete PROMPT` — send a raw prompt through the retry engine

mod helpers;
mod http;
mod rpc;
mod status;
mod stdio;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing::{info, warn};

use lessonmcp_tools::ToolRegistry;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// 📚 lessonmcp — lesson-planning assistant over JSON-RPC
#[derive(Parser)]
#[command(name = "lessonmcp", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Debug)]
struct CommonArgs {
    /// Enable debug logging (stderr)
    #[arg(long, default_value_t = false)]
    logs: bool,

    /// Config file (defaults to ~/.lessonmcp/config.json)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Clone, Debug)]
struct ServeArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Skip the LM Studio startup probe
    #[arg(long, default_value_t = false)]
    skip_health_check: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve stdio and HTTP at the same time
    Serve(ServeArgs),

    /// Serve JSON-RPC over HTTP only (POST /mcp)
    Http(ServeArgs),

    /// Serve JSON-RPC over stdin/stdout only
    Stdio(ServeArgs),

    /// Show configuration and provider status
    Status {
        /// Config file (defaults to ~/.lessonmcp/config.json)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Call one tool and print its output
    Call {
        /// Tool name, e.g. generate_suggestion
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(default_value = "{}")]
        args: String,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Send a raw prompt through the retry engine
    Complete {
        prompt: String,

        #[command(flatten)]
        common: CommonArgs,
    },
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            init_logging(args.common.logs);
            run_serve(args).await
        }
        Commands::Http(args) => {
            init_logging(args.common.logs);
            run_http(args).await
        }
        Commands::Stdio(args) => {
            init_logging(args.common.logs);
            run_stdio(args).await
        }
        Commands::Status { config } => status::run(config.as_deref()),
        Commands::Call { tool, args, common } => {
            init_logging(common.logs);
            run_call(&tool, &args, &common).await
        }
        Commands::Complete { prompt, common } => {
            init_logging(common.logs);
            run_complete(&prompt, &common).await
        }
    }
}

// ─────────────────────────────────────────────
// Transports
// ─────────────────────────────────────────────

async fn run_serve(args: ServeArgs) -> Result<()> {
    helpers::print_banner("stdio + HTTP");
    let config = helpers::load(args.common.config.as_deref())?;
    let dispatcher = helpers::build_dispatcher(&config, args.skip_health_check).await?;

    // Stdin EOF ends only this task; HTTP keeps serving until Ctrl+C.
    let stdio_dispatcher = dispatcher.clone();
    tokio::spawn(async move {
        if let Err(e) = stdio::run(stdio_dispatcher).await {
            warn!(error = %e, "stdio transport stopped with an error");
        }
    });

    http::serve(dispatcher, &config.server.host, config.server.port).await
}

async fn run_http(args: ServeArgs) -> Result<()> {
    helpers::print_banner("HTTP");
    let config = helpers::load(args.common.config.as_deref())?;
    let dispatcher = helpers::build_dispatcher(&config, args.skip_health_check).await?;
    http::serve(dispatcher, &config.server.host, config.server.port).await
}

async fn run_stdio(args: ServeArgs) -> Result<()> {
    helpers::print_banner("stdio");
    let config = helpers::load(args.common.config.as_deref())?;
    let dispatcher = helpers::build_dispatcher(&config, args.skip_health_check).await?;
    stdio::run(dispatcher).await
}

// ─────────────────────────────────────────────
// One-shot commands
// ─────────────────────────────────────────────

async fn run_call(tool: &str, raw_args: &str, common: &CommonArgs) -> Result<()> {
    let config = helpers::load(common.config.as_deref())?;
    let arguments: serde_json::Value =
        serde_json::from_str(raw_args).context("tool arguments must be valid JSON")?;

    let engine = helpers::build_engine(&config)?;
    let registry = ToolRegistry::lesson_tools(engine, &config.tools);

    info!(tool, "calling tool");
    match registry.call(tool, arguments).await {
        Ok(output) => {
            for item in &output.content {
                println!("{}", item.text);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{} [{}] {}", "✗".red().bold(), e.code(), e);
            Err(e).with_context(|| format!("tool '{tool}' failed"))
        }
    }
}

async fn run_complete(prompt: &str, common: &CommonArgs) -> Result<()> {
    let config = helpers::load(common.config.as_deref())?;
    let engine = helpers::build_engine(&config)?;

    let completion = engine
        .generate_detailed(prompt)
        .await
        .context("completion failed")?;

    println!("{}", completion.text);
    eprintln!(
        "{}",
        format!(
            "{} · model {} · pass {} · {} failed attempt(s)",
            engine.backend_name(),
            completion.model,
            completion.pass,
            completion.failures.len()
        )
        .dimmed()
    );
    for failure in &completion.failures {
        eprintln!(
            "  {} {} (pass {}): {}",
            "·".dimmed(),
            failure.model,
            failure.pass,
            failure.error
        );
    }
    Ok(())
}

/// Initialize tracing. Always writes to stderr: stdout carries JSON-RPC.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("lessonmcp=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
