//! Finance supervisor CLI
//!
//! An interactive session with the finance supervisor and its two workers.
//!
//! # Usage
//!
//! ```bash
//! export OPENAI_API_KEY="sk-..."
//! export NEWS_API_KEY="..."          # optional, headlines are empty without it
//!
//! cargo run --bin finance-supervisor -p agent-finance
//! cargo run --bin finance-supervisor -p agent-finance -- --routing keyword --thread-id 2
//! ```

use agent_core::Context;
use agent_finance::{FinanceConfig, RoutingMode, build_supervisor, register_finance_tools};
use agent_llm::Message;
use agent_llm::providers::{OpenAIConfig, OpenAIProvider};
use agent_runtime::{AgentRuntime, EventHandler, RuntimeConfig};
use agent_tools::ToolRegistry;
use agent_utils::{Config, init_tracing, load_dotenv};
use async_trait::async_trait;
use clap::Parser;
use serde_json::Value;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const PROMPT: &str = "Enter your query ('q' to quit): ";

#[derive(Parser, Debug)]
#[command(name = "finance-supervisor")]
#[command(about = "Interactive finance research supervisor", long_about = None)]
struct Args {
    /// Conversation thread to use
    #[arg(long, default_value = "1")]
    thread_id: String,

    #[arg(long, default_value = "1")]
    user_id: String,

    /// How the supervisor picks a worker
    #[arg(long, value_enum, default_value_t = RoutingMode::Llm)]
    routing: RoutingMode,

    /// Root directory for CSV tables and charts (default: $FINANCE_OUTPUT_DIR or ./output)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Chat model (default: $OPENAI_MODEL or gpt-4o-mini)
    #[arg(long)]
    model: Option<String>,
}

/// Prints every event of a turn as it happens
struct ConsoleEventHandler;

#[async_trait]
impl EventHandler for ConsoleEventHandler {
    async fn on_message(&self, message: &Message) {
        if message.role != agent_llm::Role::User {
            println!("{message}");
        }
    }

    async fn on_handoff(&self, from: &str, to: &str) {
        println!("== {from} -> {to}");
    }

    async fn on_tool_start(&self, agent: &str, _id: &str, name: &str, input: &Value) {
        println!("   [{agent}] calling {name} {input}");
    }

    async fn on_tool_done(
        &self,
        agent: &str,
        _id: &str,
        name: &str,
        result: Result<&Value, &str>,
        duration_ms: u64,
    ) {
        match result {
            Ok(_) => println!("   [{agent}] {name} finished in {duration_ms}ms"),
            Err(e) => println!("   [{agent}] {name} failed after {duration_ms}ms: {e}"),
        }
    }
}

fn resolve_model(flag: Option<String>) -> String {
    flag.or_else(|| std::env::var("OPENAI_MODEL").ok())
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = load_dotenv();
    let args = Args::parse();

    init_tracing(&Config::from_env("finance-supervisor"))?;
    if let Some(path) = dotenv {
        info!(path = %path.display(), "Loaded environment file");
    }

    let mut builder = FinanceConfig::builder().with_env();
    if let Some(dir) = &args.output_dir {
        builder = builder.output_dir(dir);
    }
    let finance_config = Arc::new(builder.build()?);
    finance_config.ensure_dirs()?;

    let model = resolve_model(args.model);
    let provider = Arc::new(OpenAIProvider::with_config(OpenAIConfig::from_env()?)?);

    let registry = Arc::new(ToolRegistry::new());
    register_finance_tools(&registry, Arc::clone(&finance_config))?;

    let runtime = AgentRuntime::builder()
        .provider(provider)
        .tool_registry(registry)
        .config(RuntimeConfig::default().with_model(&model))
        .build()?;
    let supervisor = build_supervisor(&runtime, args.routing)?;

    println!("Configuration:");
    println!("  Model: {model}");
    println!("  Routing: {:?}", args.routing);
    println!("  Output: {}", finance_config.output_dir.display());
    println!("  Thread: {} (user {})", args.thread_id, args.user_id);
    println!();

    let context = Context::for_thread(&args.thread_id, &args.user_id);
    let handler = ConsoleEventHandler;
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{PROMPT}");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                println!();
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "q" | "quit" | "exit") {
            break;
        }

        match supervisor.run_turn(input, &context, &handler).await {
            Ok(outcome) => println!("\n{}\n", outcome.answer),
            Err(e) => eprintln!("Error: {e}\n"),
        }
    }

    println!("Goodbye!");
    Ok(())
}
