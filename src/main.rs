use std::sync::Arc;

use mail_extract::config::PipelineConfig;
use mail_extract::error::Result;
use mail_extract::llm::{LlmConfig, create_client};
use mail_extract::mailbox::{GmailConfig, GmailMailbox};
use mail_extract::pipeline::ExtractionPipeline;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout carries only the JSON result.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let intent = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if intent.trim().is_empty() {
        eprintln!("Usage: mail-extract <intent>");
        eprintln!("  e.g. mail-extract \"unread invoices this month\"");
        std::process::exit(2);
    }

    let (llm_config, pipeline_config, gmail_config) = load_config()?;

    let llm = create_client(&llm_config)?;
    let gmail = Arc::new(GmailMailbox::new(gmail_config));
    let pipeline = ExtractionPipeline::new(llm, gmail.clone(), pipeline_config);

    eprintln!("📬 mail-extract v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Provider: {} ({})", llm_config.backend, llm_config.model);
    eprintln!(
        "   Chunk size: {}, max limit: {}",
        pipeline.config().chunk_size,
        pipeline.config().max_limit
    );

    let result = pipeline.run(&intent).await?;

    let rendered = serde_json::to_string_pretty(&result)?;
    println!("{rendered}");

    // Optional delivery of the result by email.
    if let Ok(to) = std::env::var("MAIL_EXTRACT_REPORT_TO")
        && !to.trim().is_empty()
    {
        let subject = format!("mail-extract: {}", intent.trim());
        if let Err(e) = gmail.send_plain_text(to.trim(), &subject, &rendered).await {
            tracing::warn!(error = %e, "Failed to email extraction result");
        }
    }

    Ok(())
}

fn load_config() -> Result<(LlmConfig, PipelineConfig, GmailConfig)> {
    Ok((
        LlmConfig::from_env()?,
        PipelineConfig::from_env()?,
        GmailConfig::from_env()?,
    ))
}
