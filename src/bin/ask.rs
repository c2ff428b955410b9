use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

use wikirag::config::AskCli;
use wikirag::responder::{preview, CONTEXT_PREVIEW_CHARS};
use wikirag::{logging, Answer, Responder};

const EXIT_COMMANDS: &[&str] = &["exit", "quit"];

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init();
    let cli = AskCli::parse();
    let config = cli
        .into_config()
        .context("invalid responder configuration")?;

    let embedder = config
        .models
        .embedder(1)
        .context("failed to build embedding client")?;
    let chat = config
        .models
        .chat(&config.llm_model, config.temperature)
        .context("failed to build chat client")?;
    let store = config.store.open();
    let responder =
        Responder::new(embedder.as_ref(), &store, chat.as_ref()).with_top_k(config.top_k);

    if let Some(question) = cli.query.as_deref() {
        let answer = responder.answer(question).context("failed to answer question")?;
        print_answer(question, &answer);
        return Ok(());
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("Ask a question (or 'exit'): ");
        stdout.flush().context("failed to flush prompt")?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).context("failed to read question")? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if EXIT_COMMANDS.contains(&question.to_lowercase().as_str()) {
            break;
        }
        match responder.answer(question) {
            Ok(answer) => print_answer(question, &answer),
            Err(err) => error!(error = %err, "failed to answer question"),
        }
    }
    Ok(())
}

fn print_answer(question: &str, answer: &Answer) {
    println!("\nYou asked: {question}");
    println!(
        "\nRetrieved context:\n{}",
        preview(&answer.context, CONTEXT_PREVIEW_CHARS)
    );
    println!("\nAnswer:\n{}\n", answer.text);
}
