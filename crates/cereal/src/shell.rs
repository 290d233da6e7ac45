// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interactive chat shell.
//!
//! Wires the configured collaborators into a [`TurnPipeline`] and runs a
//! readline loop. Reply chunks are printed as they stream in.

use std::io::Write as _;
use std::sync::Arc;

use cereal_config::CerealConfig;
use cereal_core::{CerealError, CompletionProvider, UserId};
use cereal_groq::GroqClient;
use cereal_memory::{MemoryStore, Summarizer};
use cereal_personality::Profiler;
use cereal_pipeline::{Collaborators, PipelineOptions, TurnPipeline};
use cereal_search::{SearchSubsystem, SearxClient};
use colored::Colorize;
use futures::StreamExt;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::info;

/// Builds the pipeline from configuration and runs the readline loop until
/// the user quits.
pub async fn run_shell(config: CerealConfig, user: &str) -> Result<(), CerealError> {
    let pipeline = build_pipeline(&config)?;
    let user = UserId::new(user);

    let mut editor = DefaultEditor::new()
        .map_err(|e| CerealError::Internal(format!("failed to initialize readline: {e}")))?;

    println!(
        "{} — type a message, or {} to leave.",
        config.agent.name.bold(),
        "/quit".cyan()
    );

    let prompt = format!("{}> ", "cereal".green());
    loop {
        match editor.readline(&prompt) {
            Ok(line) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                if line == "/quit" || line == "/exit" {
                    break;
                }
                let _ = editor.add_history_entry(&line);
                stream_reply(&pipeline, &user, line).await;
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                return Err(CerealError::Internal(format!("readline failed: {e}")));
            }
        }
    }

    println!("Bye!");
    Ok(())
}

async fn stream_reply(pipeline: &TurnPipeline, user: &UserId, line: String) {
    let mut stream = pipeline.process_turn(user.clone(), line);
    let mut stdout = std::io::stdout();
    while let Some(chunk) = stream.next().await {
        print!("{chunk}");
        let _ = stdout.flush();
    }
    println!();
}

/// Assembles the collaborators from configuration. The completion provider
/// is mandatory; memory, personality, and search stages come up only when
/// their sections enable them.
fn build_pipeline(config: &CerealConfig) -> Result<TurnPipeline, CerealError> {
    let api_key = config
        .groq
        .api_key
        .clone()
        .or_else(|| std::env::var("GROQ_API_KEY").ok())
        .ok_or_else(|| {
            CerealError::Config(
                "no Groq API key configured; set groq.api_key or the GROQ_API_KEY \
                 environment variable"
                    .into(),
            )
        })?;

    let provider: Arc<dyn CompletionProvider> = Arc::new(GroqClient::new(
        &api_key,
        config.groq.base_url.clone(),
        config.groq.chat_model.clone(),
    )?);

    let summarizer = Summarizer::new(
        provider.clone(),
        Some(config.groq.utility_model.clone()),
        config.groq.utility_temperature,
    );

    let store = Arc::new(MemoryStore::new(
        &config.memory.data_dir,
        config.memory.prune_threshold,
        config.memory.active_window,
        config.memory.cache_cap,
        summarizer.clone(),
    ));

    let profiler = config.personality.enabled.then(|| {
        Profiler::new(
            store.clone(),
            Some(provider.clone()),
            Some(config.groq.utility_model.clone()),
            config.personality.stale_after_days,
            config.personality.recompute_after_messages,
            config.personality.corpus_limit_chars,
        )
    });

    let search = match (&config.search.enabled, &config.search.base_url) {
        (true, Some(base_url)) => {
            let client = SearxClient::new(base_url.clone(), config.search.timeout_secs)?;
            Some(SearchSubsystem::new(
                Arc::new(client),
                summarizer,
                Some(store.clone()),
                config.search.region.clone(),
                config.search.max_results,
                config.memory.freshness_hours,
            ))
        }
        (true, None) => {
            info!("search enabled but no base_url configured; search stage disabled");
            None
        }
        _ => None,
    };

    info!(
        personality = profiler.is_some(),
        search = search.is_some(),
        "pipeline assembled"
    );

    let collab = Collaborators {
        provider,
        memory: Some(store),
        profiler,
        search,
    };
    let opts = PipelineOptions {
        chat_temperature: config.groq.chat_temperature,
        default_user_name: config.agent.default_user_name.clone(),
        default_chat_style: config.agent.default_chat_style.clone(),
    };

    Ok(TurnPipeline::new(collab, opts))
}
