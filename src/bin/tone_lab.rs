//! Terminal driver for toneform.
//!
//! Each line read from stdin is treated as the full new value of the text
//! field. After every line the reconciled characters are printed; tone
//! changes are printed as they arrive.
//!
//! Configuration is read from `$TONEFORM_CONFIG`, else the default config
//! path if it exists. The Gemini key falls back to `GEMINI_API_KEY`, then
//! `API_KEY`.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use toneform::session::INITIAL_TEXT;
use toneform::{ToneConfig, ToneSession, remote};
use tracing_subscriber::EnvFilter;

fn load_config() -> anyhow::Result<ToneConfig> {
    let path = std::env::var_os("TONEFORM_CONFIG")
        .map(PathBuf::from)
        .or_else(|| Some(ToneConfig::default_config_path()).filter(|p| p.exists()));

    let mut config = match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading config");
            ToneConfig::from_file(&path)?
        }
        None => ToneConfig::default(),
    };

    if config.remote.api_key.is_none() {
        config.remote.api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .ok()
            .filter(|k| !k.is_empty());
    }
    Ok(config)
}

fn print_characters(session: &ToneSession) {
    println!("text: {:?}", session.text());
    for (i, record) in session.characters().iter().enumerate() {
        println!("  {i:>3} {:?} {} [{}]", record.ch(), record.id(), record.style());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("toneform=info")),
        )
        .init();

    let config = load_config()?;
    let remote = remote::from_config(&config.remote)?;
    tracing::info!(provider = remote.name(), "tone-lab starting");

    let settle = config.debounce() * 2;
    let mut session = ToneSession::new(&config, Arc::clone(&remote))?.with_initial_text(INITIAL_TEXT);
    print_characters(&session);
    println!("tone: {}", session.tone());

    let mut tones = session.subscribe();
    let watcher = tokio::spawn(async move {
        while tones.changed().await.is_ok() {
            let tone = *tones.borrow_and_update();
            println!("tone: {tone}");
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let stats = session.input(&line);
        print_characters(&session);
        println!(
            "  reused={} created={} dropped={}",
            stats.reused, stats.created, stats.dropped
        );
    }

    // Let the last debounced classification land before exiting.
    tokio::time::sleep(settle).await;
    println!("final tone: {}", session.tone());
    drop(session);
    watcher.abort();
    Ok(())
}
