use std::sync::Arc;

use clap::{Parser, Subcommand};

mod application;
mod components;
mod domain;
mod infrastructure;

use application::dispatch::ActionDispatcher;
use application::services::CommandService;
use components::registry::ComponentInstance;
use domain::entities::{ChatMode, Message, TurnContext, User};
use domain::traits::{Action, FixedJudge, Outcome};
use infrastructure::adapters::console::ConsoleAdapter;
use infrastructure::config::ConfigStore;
use infrastructure::manifest;

#[derive(Parser)]
#[command(name = "lark-bot")]
#[command(about = "A configuration-driven chat component host", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot on the console
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
    /// Validate a plugin manifest
    ValidateManifest {
        /// Path to the manifest JSON file
        path: String,
    },
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            run_bot(cli.config);
        }
        Commands::Version => {
            println!("lark-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config(cli.config);
        }
        Commands::ValidateManifest { path } => {
            validate_manifest(path);
        }
    }
}

fn load_config(config_path: &str) -> Option<ConfigStore> {
    let config = if std::path::Path::new(config_path).exists() {
        match ConfigStore::load(components::config_schema(), config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config: {}, using defaults", e);
                match ConfigStore::from_schema(components::config_schema()) {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::error!("Builtin schema rejected: {}", e);
                        return None;
                    }
                }
            }
        }
    } else {
        match ConfigStore::from_schema(components::config_schema()) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Builtin schema rejected: {}", e);
                return None;
            }
        }
    };
    Some(config)
}

fn run_bot(config_path: String) {
    let Some(config) = load_config(&config_path) else {
        return;
    };
    let config = Arc::new(config);

    tracing::info!("Starting lark-bot");

    // Resolve the active component set from config flags
    let instances = components::registry().resolve(&config);
    let mut actions: Vec<Arc<dyn Action>> = Vec::new();
    let mut commands = CommandService::new();
    for instance in instances {
        match instance {
            ComponentInstance::Action(action) => actions.push(action),
            ComponentInstance::Command(command) => {
                let name = command.name().to_string();
                if let Err(e) = commands.register(command) {
                    tracing::error!("Failed to register command '{}': {}", name, e);
                }
            }
        }
    }
    tracing::info!(
        "{} action(s), {} command(s) active",
        actions.len(),
        commands.len()
    );

    // The judge is a host collaborator; the console runs without one, so
    // judge-gated activation always denies here.
    let dispatcher = ActionDispatcher::new(Arc::new(FixedJudge(false)));

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start runtime: {}", e);
            return;
        }
    };
    rt.block_on(run_console_loop(config, commands, dispatcher, actions));
}

async fn run_console_loop(
    config: Arc<ConfigStore>,
    commands: CommandService,
    dispatcher: ActionDispatcher,
    actions: Vec<Arc<dyn Action>>,
) {
    let console = ConsoleAdapter::new("lark-bot");
    console.send("lark-bot console. Type /help for commands, 'exit' to quit.");

    loop {
        let Some(line) = console.read_line("> ") else {
            break;
        };
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        // The console user counts as the owner so admin-gated commands work
        let message = Message::from_text("console", &line)
            .with_sender(User::new("owner"))
            .with_platform("console");
        let ctx = TurnContext::new(message, ChatMode::Normal);

        if line.starts_with('/') {
            match commands.handle(&ctx).await {
                Ok(Some(Outcome::Reply(reply))) => console.send(&reply),
                Ok(Some(Outcome::Disabled(reason))) => {
                    console.send(&format!("(disabled) {}", reason))
                }
                Ok(None) => console.send("No command matched. Try /help."),
                Err(e) => {
                    tracing::error!("Command failed: {}", e);
                    console.send(&format!("Error: {}", e));
                }
            }
            continue;
        }

        let selected = dispatcher.dispatch(&actions, &ctx).await;
        if selected.is_empty() {
            if config.get_bool("plugin.debug_mode", false) {
                console.send(&format!("Echo: {}", line));
            }
            continue;
        }
        for action in selected {
            match action.execute(&ctx).await {
                Ok(Outcome::Reply(reply)) => console.send(&reply),
                Ok(Outcome::Disabled(reason)) => {
                    tracing::debug!("{} disabled: {}", action.name(), reason)
                }
                Err(e) => tracing::error!("{} failed: {}", action.name(), e),
            }
        }
    }

    tracing::info!("Console session ended");
}

fn init_config(config_path: String) {
    let store = match ConfigStore::from_schema(components::config_schema()) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Builtin schema rejected: {}", e);
            std::process::exit(1);
        }
    };
    match store.save(&config_path) {
        Ok(()) => println!("Wrote default configuration to {}", config_path),
        Err(e) => {
            tracing::error!("Failed to write config: {}", e);
            std::process::exit(1);
        }
    }
}

fn validate_manifest(path: String) {
    let report = manifest::validate_file(&path);

    if !report.errors.is_empty() {
        println!("❌ {} error(s):", report.errors.len());
        for (i, error) in report.errors.iter().enumerate() {
            println!("  {}. {}", i + 1, error);
        }
    }
    if !report.warnings.is_empty() {
        println!("⚠️ {} warning(s):", report.warnings.len());
        for (i, warning) in report.warnings.iter().enumerate() {
            println!("  {}. {}", i + 1, warning);
        }
    }
    if report.is_valid() {
        let summary = std::fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str::<serde_json::Value>(&content).ok())
            .and_then(|doc| manifest::parse(doc).ok())
            .map(|m| format!("{} v{}", m.name, m.version));
        match summary {
            Some(summary) if report.warnings.is_empty() => {
                println!("✅ Manifest valid: {}", summary)
            }
            Some(summary) => println!("✅ Manifest valid with suggestions above: {}", summary),
            None => println!("✅ Manifest is valid."),
        }
    } else {
        println!("❌ Manifest validation failed.");
    }

    // Warnings never affect the exit code
    std::process::exit(if report.is_valid() { 0 } else { 1 });
}
