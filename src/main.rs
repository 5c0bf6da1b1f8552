//! Evaluation adapter command line
//!
//! Runs one generation through a registered provider:
//! `evalshim <provider/model> <prompt...>`

use anyhow::{Context, Result};
use evalshim::config::LoggingConfig;
use evalshim::{ChatMessage, GenerateConfig, ProviderRegistry, Settings, ToolChoice};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::new().context("Failed to load settings")?;

    // Initialize logging
    init_logging(&settings.logging);
    info!("{}", evalshim::version_info());

    let mut args = std::env::args().skip(1);
    let model_path = args
        .next()
        .context("usage: evalshim <provider/model> <prompt...>")?;
    let prompt = args.collect::<Vec<_>>().join(" ");
    if prompt.is_empty() {
        anyhow::bail!("usage: evalshim <provider/model> <prompt...>");
    }

    let registry = ProviderRegistry::with_defaults();
    let config = GenerateConfig::default();
    let model = registry
        .create(&model_path, None, &config)
        .with_context(|| format!("Failed to create adapter for {}", model_path))?;

    let output = match model
        .generate(&[ChatMessage::user(prompt)], &[], &ToolChoice::default(), &config)
        .await
    {
        Ok(output) => output,
        Err(e) => {
            // Machine-readable report for the calling harness
            eprintln!("{}", serde_json::to_string(&e.to_report())?);
            return Err(anyhow::Error::new(e).context("Generation failed"));
        }
    };

    println!("{}", output.completion());

    Ok(())
}

/// Initialize logging system
fn init_logging(logging: &LoggingConfig) {
    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = if logging.format == "json" {
        // JSON format logs (production environment)
        Box::new(tracing_subscriber::fmt()
            .with_env_filter(logging.level.as_str())
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(std::io::stderr)
            .finish())
    } else {
        // Human readable format, kept off stdout so the answer can be piped
        Box::new(tracing_subscriber::fmt()
            .with_env_filter(logging.level.as_str())
            .with_target(false)
            .with_thread_ids(false)
            .with_writer(std::io::stderr)
            .finish())
    };

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Logging was already initialized");
    }
}
