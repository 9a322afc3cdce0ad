//! Agent Versions CLI
//!
//! 检查 Claude Code / Codex 的安装版本与运行中会话的版本，并在 tmux 中重启过期会话

use agent_versions::cli::{handle_check, handle_restart, handle_status, RestartArgs, RunContext};
use agent_versions::config::{Config, OutputConfig};
use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "av")]
#[command(about = "Show installed and running versions of coding agents, restart outdated sessions")]
#[command(version)]
struct Cli {
    /// Output JSON
    #[arg(long, global = true)]
    json: bool,

    /// Bracketed status tags instead of colour
    #[arg(long, global = true)]
    plain: bool,

    /// Disable colour
    #[arg(long, global = true)]
    no_color: bool,

    /// Skip fetching latest versions
    #[arg(long, global = true)]
    no_fetch: bool,

    /// Verbose logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show installed and latest versions only
    Check,
    /// Restart outdated sessions running inside tmux
    Restart(RestartArgs),
}

fn init_tracing(verbose: bool) {
    // RUST_LOG 优先，其次 -v
    let default = if verbose {
        "agent_versions=info,av=info"
    } else {
        "agent_versions=warn,av=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();
}

fn run(cli: Cli, ctx: &RunContext) -> Result<()> {
    match cli.command {
        None => handle_status(ctx),
        Some(Commands::Check) => handle_check(ctx),
        Some(Commands::Restart(args)) => handle_restart(ctx, &args),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = OutputConfig::from_env(cli.json, cli.plain, cli.no_color);
    let ctx = RunContext::system(Config::load(), output, cli.no_fetch);

    if let Err(e) = run(cli, &ctx) {
        ctx.printer.error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
