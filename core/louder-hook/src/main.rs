//! louder-hook: sound, haptic, and banner feedback for coding-agent sessions.
//!
//! ## Subcommands
//!
//! - `handle`: Claude Code hook handler, reads one JSON payload from stdin
//! - `listen`: Event subscriber, reads newline-delimited events from stdin
//! - `hooks-json`: Prints the hooks block for `~/.claude/settings.json`

mod logging;

use clap::{Parser, Subcommand};
use louder_core::{
    handle_claude_hook, hooks_settings, EventPlugin, HookInput, PluginEvent, SystemEmitter,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::task::JoinSet;

#[derive(Parser)]
#[command(name = "louder-hook")]
#[command(about = "Audible and haptic feedback for coding-agent sessions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Handle a Claude Code hook event (reads JSON from stdin)
    Handle,

    /// Stream session events from stdin (one JSON object per line)
    Listen {
        /// Directory to load configuration from (defaults to the current directory)
        #[arg(long, value_name = "PATH")]
        dir: Option<PathBuf>,
    },

    /// Print the hooks block for ~/.claude/settings.json
    HooksJson,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let _logging_guard = logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Handle => {
            // The agent host must never see a failing hook.
            if let Err(e) = handle().await {
                tracing::debug!(error = %e, "louder-hook handle failed");
            }
        }
        Commands::Listen { dir } => {
            if let Err(e) = listen(dir).await {
                tracing::error!(error = %e, "louder-hook listen failed");
                std::process::exit(1);
            }
        }
        Commands::HooksJson => match serde_json::to_string_pretty(&hooks_settings()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to render hooks JSON: {}", e);
                std::process::exit(1);
            }
        },
    }
}

async fn handle() -> Result<(), String> {
    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .map_err(|e| format!("Failed to read stdin: {}", e))?;

    if input.trim().is_empty() {
        return Ok(());
    }

    let hook_input: HookInput =
        serde_json::from_str(&input).map_err(|e| format!("Failed to parse hook input: {}", e))?;

    let fired = handle_claude_hook(&hook_input, Arc::new(SystemEmitter::detect())).await;
    tracing::debug!(
        event = ?hook_input.hook_event_name,
        session = ?hook_input.session_id,
        fired,
        "Hook handled"
    );
    Ok(())
}

async fn listen(dir: Option<PathBuf>) -> Result<(), String> {
    let dir = match dir {
        Some(dir) => dir,
        None => std::env::current_dir().map_err(|e| format!("Failed to resolve cwd: {}", e))?,
    };

    let plugin = EventPlugin::new(&dir, Arc::new(SystemEmitter::detect()));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight = JoinSet::new();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| format!("Failed to read stdin: {}", e))?
    {
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<PluginEvent>(&line) {
            Ok(event) => {
                in_flight.spawn(plugin.dispatch(&event));
            }
            Err(e) => tracing::debug!(error = %e, "Skipping malformed event line"),
        }

        // Reap finished feedback so the set doesn't grow unbounded.
        while in_flight.try_join_next().is_some() {}
    }

    while in_flight.join_next().await.is_some() {}
    Ok(())
}
