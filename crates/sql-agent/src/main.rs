//! An interactive terminal front end for `sql-agent`.

#[macro_use]
extern crate tracing;

use std::io::Write as _;
use std::path::PathBuf;
use std::pin::pin;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use sql_agent::core::conversation::DEFAULT_MEMORY_EXCHANGES;
use sql_agent::core::{DEFAULT_MAX_STEPS, TurnOutcome};
use sql_agent::{Database, SessionBuilder};
use sql_agent_openai_model::{OpenAIConfigBuilder, OpenAIProvider};
use tokio::io::{self, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::select;
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

const BAR_CHAR: &str = "▎";

/// Crates whose logs `--debug` raises to the debug level.
const AGENT_CRATES: [&str; 3] =
    ["sql_agent", "sql_agent_core", "sql_agent_openai_model"];

/// Ask questions about a SQLite database in plain language.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to the SQLite database file.
    #[arg(long, default_value = "chinook.db")]
    db: PathBuf,

    /// Maximum number of model round-trips per question.
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_STEPS as u16,
        value_parser = clap::value_parser!(u16).range(1..),
    )]
    max_steps: u16,

    /// Number of previous exchanges to remember.
    #[arg(long = "memory", default_value_t = DEFAULT_MEMORY_EXCHANGES)]
    memory_exchanges: usize,

    /// Print debug logs, including every model response.
    #[arg(long)]
    debug: bool,

    /// API key of the OpenAI-compatible endpoint.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Base URL of the OpenAI-compatible endpoint.
    #[arg(long, env = "OPENAI_BASE_URL")]
    base_url: Option<String>,

    /// Model name.
    #[arg(long, env = "OPENAI_MODEL")]
    model: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(args.debug))
        .with_writer(std::io::stderr)
        .init();

    let database = match Database::open(&args.db) {
        Ok(database) => database,
        Err(err) => {
            eprintln!("{}", err.bright_red());
            return ExitCode::FAILURE;
        }
    };

    let mut config_builder = OpenAIConfigBuilder::with_api_key(args.api_key);
    if let Some(base_url) = args.base_url {
        config_builder = config_builder.with_base_url(base_url);
    }
    if let Some(model) = args.model {
        config_builder = config_builder.with_model(model);
    }
    let config = config_builder.build();
    info!("using model `{}` at {}", config.model(), config.base_url());
    let model_provider = OpenAIProvider::new(config);

    let mut session = SessionBuilder::with_model_provider(model_provider, database)
        .with_max_steps(args.max_steps.into())
        .with_memory_capacity(args.memory_exchanges)
        .build();

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    println!(
        "Ask anything about {}. Type `exit` to quit.",
        args.db.display().bright_white().bold()
    );

    let mut lines = BufReader::new(io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = read_line(&mut lines).await else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit")
            || question.eq_ignore_ascii_case("quit")
        {
            break;
        }

        let progress_bar = ProgressBar::new_spinner();
        progress_bar.set_style(progress_style.clone());
        progress_bar.set_message("🤔 Thinking...");

        let mut turn = pin!(session.ask(question));
        let outcome = loop {
            progress_bar.inc(1);
            select! {
                outcome = &mut turn => break outcome,
                _ = sleep(Duration::from_millis(100)) => {}
            }
        };

        // Finish the progress bar before printing anything else.
        progress_bar.finish_and_clear();
        print_outcome(&outcome);
    }

    ExitCode::SUCCESS
}

fn env_filter(debug: bool) -> EnvFilter {
    let mut filter = EnvFilter::from_default_env();
    if debug {
        for target in AGENT_CRATES {
            match format!("{target}=debug").parse::<Directive>() {
                Ok(directive) => filter = filter.add_directive(directive),
                Err(err) => eprintln!("invalid log directive for {target}: {err}"),
            }
        }
    }
    filter
}

fn print_outcome(outcome: &TurnOutcome) {
    if outcome.is_answer() {
        println!(
            "{}🤖 {}\n",
            BAR_CHAR.bright_cyan(),
            outcome.to_string().bright_white()
        );
    } else {
        println!(
            "{}⚠️  {}\n",
            BAR_CHAR.bright_yellow(),
            outcome.to_string().yellow()
        );
    }
}

async fn read_line(lines: &mut Lines<BufReader<Stdin>>) -> Option<String> {
    match lines.next_line().await {
        Ok(line) => line,
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_only_raises_agent_crates() {
        let filter = env_filter(true).to_string();
        let directives = filter.split(',').collect::<Vec<_>>();
        for target in AGENT_CRATES {
            assert!(directives.contains(&format!("{target}=debug").as_str()));
        }
        assert!(!directives.contains(&"debug"));

        let filter = env_filter(false).to_string();
        assert!(!filter.contains("sql_agent_core=debug"));
    }
}
