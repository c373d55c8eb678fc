//! Application entry point — sign-language translator CLI.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] (defaults on first run) and build the vocabulary.
//!    `--init-config` writes the effective settings back and exits.
//! 3. Create the [`tokio`] runtime.
//! 4. Wire the pipeline (chat-completions client + ffmpeg) and chat history.
//! 5. Translate the phrase given on the command line, or one phrase per
//!    stdin line, each on its own task.  Replies are printed as JSON lines.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use sign_translator::{
    chat::{ChatService, JsonlChatHistory},
    config::AppConfig,
    pipeline::TranslationPipeline,
};

#[derive(Parser)]
#[command(name = "sign-translator")]
#[command(about = "Translate Russian phrases into sign-language videos")]
struct Args {
    /// Path to settings.toml (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// User identity recorded in history and output file names
    #[arg(short, long, env = "SIGN_TRANSLATOR_USER", default_value = "local")]
    user: String,

    /// Print this user's chat history and exit
    #[arg(long)]
    history: bool,

    /// Print the prompt for the phrase instead of translating it
    #[arg(long)]
    print_prompt: bool,

    /// Write the effective settings to the settings file and exit
    #[arg(long)]
    init_config: bool,

    /// Phrase to translate; read from stdin, one per line, when omitted
    phrase: Vec<String>,
}

fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // 2. Configuration
    let config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if args.init_config {
        match &args.config {
            Some(path) => config.save_to(path)?,
            None => config.save()?,
        }
        log::info!("settings written");
        return Ok(());
    }
    let vocabulary = config.vocabulary().context("invalid gesture vocabulary")?;
    log::info!(
        "sign-translator starting: {} gestures, clip store {}",
        vocabulary.len(),
        config.media.clip_store().display()
    );

    // 3. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    // 4. Pipeline + history
    let pipeline = Arc::new(TranslationPipeline::from_config(&config, vocabulary));
    let history = Arc::new(JsonlChatHistory::new(&config.history.path));
    let phrase = args.phrase.join(" ");

    if args.print_prompt {
        println!("{}", pipeline.prompt_builder().build(&phrase));
        return Ok(());
    }

    if args.history {
        let records = rt.block_on(history.load_for_user(&args.user))?;
        for record in records {
            println!("{}", serde_json::to_string(&record)?);
        }
        return Ok(());
    }

    let service = Arc::new(ChatService::new(pipeline, history));

    // 5. Requests
    rt.block_on(async move {
        if !phrase.trim().is_empty() {
            let reply = service.handle(&args.user, &phrase).await;
            println!("{}", serde_json::to_string(&reply)?);
            return Ok(());
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut tasks = Vec::new();
        while let Some(line) = lines.next_line().await? {
            let message = line.trim().to_string();
            if message.is_empty() {
                continue;
            }
            let service = Arc::clone(&service);
            let user = args.user.clone();
            tasks.push(tokio::spawn(async move {
                let reply = service.handle(&user, &message).await;
                match serde_json::to_string(&reply) {
                    Ok(json) => println!("{json}"),
                    Err(e) => log::error!("cannot encode reply: {e}"),
                }
            }));
        }

        for task in tasks {
            if let Err(e) = task.await {
                log::error!("request task failed: {e}");
            }
        }
        Ok(())
    })
}
