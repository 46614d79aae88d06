//! ruleflow: command-line access to the rule store.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rf_core::rule::RuleId;
use rf_editor::commands::{list, rule};
use rf_editor::config::EditorConfig;
use rf_editor::state::EditorSession;
use rf_store::list::RuleList;
use tracing_subscriber::EnvFilter;

/// Browse, run and import ruleflow rules
#[derive(Parser, Debug)]
#[command(name = "ruleflow", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List rules, newest first
    List {
        /// Only rules whose name or id contains this text
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Print a rule's normalized definition
    Show { id: String },
    /// Execute a stored rule and print the result
    Run { id: String },
    /// Rename a rule
    Rename { id: String, name: String },
    /// Delete a rule
    Delete { id: String },
    /// Save a definition file as a new rule, or over an existing one
    Import {
        file: PathBuf,
        /// Update this rule instead of creating one
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = EditorConfig::from_env().context("invalid configuration")?;
    let session = EditorSession::connect(&config).context("failed to build the rule store client")?;

    let result = execute(cli.command, &session).await;
    for notice in session.notices().drain() {
        if notice.is_error() {
            eprintln!("error: {notice}");
        } else {
            eprintln!("{notice}");
        }
    }
    result
}

async fn execute(command: Command, session: &EditorSession) -> anyhow::Result<()> {
    match command {
        Command::List { search } => {
            let mut rules = RuleList::new();
            list::search(&search, &mut rules, session).await?;
            for summary in rules.rules() {
                let updated = summary
                    .updated_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!("{}\t{}\t{}", summary.id, summary.display_name(), updated);
            }
        }
        Command::Show { id } => {
            rule::load(Some(RuleId::from(id)), session).await?;
            println!("{}", session.sync().name());
            let definition = session.graph().serialize();
            println!("{}", serde_json::to_string_pretty(&definition)?);
        }
        Command::Run { id } => {
            rule::load(Some(RuleId::from(id)), session).await?;
            let outcome = rule::run(session).await;
            if let Some(text) = session.run_result().text() {
                println!("{text}");
            }
            outcome?;
        }
        Command::Rename { id, name } => {
            let id = RuleId::from(id);
            let mut rules = RuleList::new();
            list::search("", &mut rules, session).await?;
            if !list::rename(&id, &name, &mut rules, session).await? {
                anyhow::bail!("rule {id} not renamed: unknown rule, or empty or unchanged name");
            }
            println!("Renamed {id} to {}", name.trim());
        }
        Command::Delete { id } => {
            let id = RuleId::from(id);
            let mut rules = RuleList::new();
            list::search("", &mut rules, session).await?;
            if !list::delete(&id, &mut rules, session).await? {
                anyhow::bail!("rule {id} not found");
            }
            println!("Deleted {id}");
        }
        Command::Import { file, id, name } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let definition: serde_json::Value = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not valid JSON", file.display()))?;
            let outcome = rule::import(&definition, id.map(RuleId::from), name, session).await?;
            println!("{}", outcome.rule_id());
        }
    }
    Ok(())
}
