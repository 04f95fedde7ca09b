//! Command-line front end for docx-evidence.
//!
//! Reads a Word template and a JSON form, fills the template, appends any
//! screenshots and writes the generated document to the output directory.

use anyhow::Context;
use clap::Parser;
use docx_evidence_core::{
    generate_evidence, generate_requirement, read_image_sources, read_template, DirectorySink,
    DocumentSink, EvidenceForm, GeneratedDocument, RequirementForm,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::{Command, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();

    info!("Starting docx-evidence v{}", env!("CARGO_PKG_VERSION"));
    info!("  Template: {}", config.template.display());
    info!("  Output: {}", config.output_dir.display());

    let template = read_template(&config.template)
        .await
        .with_context(|| format!("Failed to read template {}", config.template.display()))?;

    let generated = match &config.command {
        Command::Evidence { form, images } => {
            let form: EvidenceForm = read_form(form).await?;
            let sources = read_image_sources(images.as_slice()).await;
            generate_evidence(
                &template,
                &form,
                sources,
                &config.generation_options(),
                chrono::Utc::now(),
            )
            .context("Failed to generate evidence document")?
        }
        Command::Requirement { form } => {
            let form: RequirementForm = read_form(form).await?;
            generate_requirement(&template, &form)
                .context("Failed to generate requirement document")?
        }
    };

    let sink = DirectorySink::new(&config.output_dir);
    let path = sink
        .save(&generated.document)
        .await
        .context("Failed to save generated document")?;

    report(&generated);
    info!("Document saved to {}", path.display());
    Ok(())
}

async fn read_form<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> anyhow::Result<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read form {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid form JSON in {}", path.display()))
}

/// Summarise the outcome once, after the document has been saved.
fn report(generated: &GeneratedDocument) {
    let injection = &generated.injection;
    if !generated.fill.missing.is_empty() {
        let keys: Vec<&str> = generated.fill.missing.iter().map(String::as_str).collect();
        warn!("Placeholders left empty: {}", keys.join(", "));
    }

    if injection.is_complete() {
        info!("{} image(s) added", injection.injected.len());
        return;
    }

    for failure in &injection.failures {
        warn!(
            "  Image {} ({}) skipped: {}",
            failure.position, failure.display_name, failure.reason
        );
    }
    if injection.has_collisions() {
        error!("Some images were skipped because their ids were already in use; try --id-mode above-existing");
    }
    warn!(
        "{} image(s) added, {} skipped",
        injection.injected.len(),
        injection.failures.len()
    );
}
