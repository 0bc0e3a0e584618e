use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    render::NO_VIDEO_NOTICE, Alert, ClassifierConfig, FileSlot, MemoryRegion, Surfaces,
    UploadAndClassify,
};
use shared::domain::ClassificationResult;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod page;

/// Identify the gym equipment in a photo and find a short tutorial video.
#[derive(Parser, Debug)]
struct Args {
    /// Image to classify.
    image: Option<PathBuf>,
    /// Overrides the configured classification endpoint.
    #[arg(long)]
    endpoint_url: Option<String>,
    /// TOML config file; defaults to ./classify.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Also write an HTML page with the rendered result.
    #[arg(long)]
    html_out: Option<PathBuf>,
}

struct TerminalAlert;

impl Alert for TerminalAlert {
    fn alert(&self, message: &str) {
        eprintln!("{message}");
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let args = Args::parse();

    let config =
        ClassifierConfig::load(args.config.as_deref())?.override_endpoint(args.endpoint_url);

    let input = FileSlot::new();
    if let Some(path) = &args.image {
        input.select_path(path).await?;
    }

    let description = MemoryRegion::new();
    let video_link = MemoryRegion::new();
    let handler = UploadAndClassify::new(
        &config,
        Surfaces {
            input: Arc::new(input),
            description: Arc::new(description.clone()),
            video_link: Arc::new(video_link.clone()),
            alert: Arc::new(TerminalAlert),
        },
    )?;
    info!(endpoint = %handler.endpoint(), "classifying image");

    // Failures were already alerted or logged by the handler.
    let Ok(result) = handler.trigger().await else {
        return Ok(ExitCode::FAILURE);
    };
    print_result(&result);

    if let Some(path) = &args.html_out {
        let title = args
            .image
            .as_ref()
            .and_then(|image| image.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Classification".to_string());
        let html = page::render_page(&title, &description.markup(), &video_link.markup());
        tokio::fs::write(path, html)
            .await
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        info!(path = %path.display(), "wrote result page");
    }

    Ok(ExitCode::SUCCESS)
}

fn print_result(result: &ClassificationResult) {
    println!("{}", result.description.replace("\\n", "\n"));
    println!();
    match result.video_link.as_deref().map(str::trim) {
        Some(link) if !link.is_empty() => println!("Tutorial video: {link}"),
        _ => println!("{NO_VIDEO_NOTICE}"),
    }
}
