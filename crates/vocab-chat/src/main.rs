//! Command-line vocabulary tutor powered by vocab-tutor.
//!
//! Profile and prompt records live in the data directory (see
//! `--data-dir`). Chatting reads the API key from the `VOCAB_TUTOR_API_KEY`
//! environment variable.
//!
//! # Examples
//!
//! ```sh
//! vocab-chat profile set --goal work --level advanced --style conversation --interest business
//! vocab-chat prompt set-custom "Only use British spelling."
//! vocab-chat chat --message "Explain 'leverage' with two examples"
//! vocab-chat chat   # interactive; /reset, /prompt, /quit
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use vocab_chat::{ProfileAnswers, TutorConfig, commands};
use vocab_tutor::prelude::*;

/// Command-line vocabulary tutor.
#[derive(Parser)]
#[command(name = "vocab-chat", version)]
struct Cli {
    /// Directory holding profile.json and custom_prompt.json.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log debug output to stderr (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inspect or edit the learner profile.
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Inspect or edit the system prompt.
    Prompt {
        #[command(subcommand)]
        action: PromptAction,
    },
    /// Chat with the tutor.
    Chat(ChatArgs),
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Print the saved profile.
    Show,
    /// Replace the saved profile.
    Set {
        /// EXAM, ABROAD, WORK or INTEREST.
        #[arg(long)]
        goal: LearningGoal,
        /// BEGINNER, INTERMEDIATE or ADVANCED.
        #[arg(long)]
        level: ProficiencyLevel,
        /// PRACTICE, AI_EXPLAIN or CONVERSATION.
        #[arg(long)]
        style: LearningStyle,
        /// NOVEL, TECH, BUSINESS or GAME. Repeatable; order is kept.
        #[arg(long = "interest")]
        interests: Vec<ReadingInterest>,
        /// A word to practice. Repeatable.
        #[arg(long = "word")]
        words: Vec<String>,
        #[arg(long, default_value = "local")]
        id: String,
    },
    /// Delete the saved profile.
    Clear,
}

#[derive(Subcommand)]
enum PromptAction {
    /// Print the prompt that chat would use, and where it came from.
    Show,
    /// Print the built-in default prompt.
    Default,
    /// Save a custom prompt. An active one overrides the profile.
    SetCustom {
        content: String,
        /// Save without activating it.
        #[arg(long)]
        inactive: bool,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        order: i32,
    },
    /// Delete the custom prompt.
    ClearCustom,
}

#[derive(clap::Args)]
struct ChatArgs {
    /// Send one message, print the reply and exit.
    #[arg(long)]
    message: Option<String>,

    #[arg(long)]
    model: Option<String>,

    /// Chat completions URL.
    #[arg(long)]
    endpoint: Option<String>,

    #[arg(long)]
    temperature: Option<f32>,

    #[arg(long)]
    max_tokens: Option<u32>,

    /// Exchanges kept in history.
    #[arg(long)]
    max_turns: Option<usize>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = TutorConfig::default();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    if let Err(e) = run(cli.command, config).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Command, mut config: TutorConfig) -> Result<(), String> {
    debug!("Using data directory {}", config.data_dir.display());
    let store: Arc<dyn ProfileStore> = config.build_store();

    let output = match command {
        Command::Profile { action } => match action {
            ProfileAction::Show => commands::show_profile(store.as_ref()).await?,
            ProfileAction::Set {
                goal,
                level,
                style,
                interests,
                words,
                id,
            } => {
                let answers = ProfileAnswers {
                    id,
                    goal,
                    level,
                    style,
                    interests,
                    words,
                };
                commands::set_profile(store, answers).await?
            }
            ProfileAction::Clear => commands::clear_profile(store.as_ref()).await?,
        },
        Command::Prompt { action } => match action {
            PromptAction::Show => commands::show_prompt(store).await?,
            PromptAction::Default => commands::show_default_prompt(),
            PromptAction::SetCustom {
                content,
                inactive,
                order,
            } => commands::set_custom_prompt(store.as_ref(), &content, !inactive, order).await?,
            PromptAction::ClearCustom => commands::clear_custom_prompt(store.as_ref()).await?,
        },
        Command::Chat(args) => {
            apply_chat_args(&mut config, &args);
            return chat(store, &config, args.message).await;
        }
    };

    println!("{output}");
    Ok(())
}

fn apply_chat_args(config: &mut TutorConfig, args: &ChatArgs) {
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(temperature) = args.temperature {
        config.temperature = temperature;
    }
    if let Some(max_tokens) = args.max_tokens {
        config.max_tokens = max_tokens;
    }
    if let Some(max_turns) = args.max_turns {
        config.max_turns = max_turns;
    }
}

async fn chat(
    store: Arc<dyn ProfileStore>,
    config: &TutorConfig,
    message: Option<String>,
) -> Result<(), String> {
    let client = config.build_client().map_err(|e| e.to_string())?;

    let manager = Arc::new(PromptManager::new(store));
    manager.initialize().await;
    info!(
        "Starting chat: model={}, endpoint={}, prompt source={}",
        config.model,
        config.endpoint,
        manager.current_source()
    );
    let mut session = TutorSession::new(manager.clone(), config.chat_settings());

    if let Some(message) = message {
        let reply = session
            .send(&client, &message)
            .await
            .map_err(|e| e.to_string())?;
        println!("{reply}");
        return Ok(());
    }

    println!(
        "Chatting with {} using the {} prompt. Commands: /reset, /prompt, /quit",
        config.model,
        manager.current_source()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().map_err(|e| e.to_string())?;

        let Some(line) = lines.next_line().await.map_err(|e| e.to_string())? else {
            break;
        };
        let line = line.trim();
        match line {
            "" => continue,
            "/quit" | "/exit" => break,
            "/reset" => {
                debug!("Clearing {} message(s) of history", session.history().len());
                session.reset();
                println!("(history cleared)");
            }
            "/prompt" => {
                println!(
                    "{}",
                    commands::format_prompt(&manager.current_prompt(), manager.current_source())
                );
            }
            _ => match session.send(&client, line).await {
                Ok(reply) => println!("{reply}\n"),
                Err(e) => {
                    warn!("Chat request failed: {e}");
                    eprintln!("Error: {e}");
                }
            },
        }
    }

    Ok(())
}
