use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use ocrlens_core::config::AppConfig;
use ocrlens_core::consts::CONFIG_FILE_NAME;
use ocrlens_core::engine::CommandEngine;
use ocrlens_core::io::crop::CropRect;
use ocrlens_core::io::image_io::load_image;
use ocrlens_core::text_box::{joined_text, TextBox};
use ocrlens_core::worker::{OcrWorker, ProgressStage, WorkerEventKind};
use serde::Serialize;

use crate::summary;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Args)]
pub struct RecognizeArgs {
    /// Input image file
    pub file: PathBuf,

    /// Only recognize a region, given as x,y,width,height in image pixels
    #[arg(long)]
    pub crop: Option<CropRect>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Config file (defaults to ./ocrlens.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// OCR program to run instead of the configured one
    #[arg(long)]
    pub engine: Option<String>,

    /// Recognition language
    #[arg(long)]
    pub lang: Option<String>,

    /// Drop boxes below this confidence (0.0..1.0)
    #[arg(long, default_value = "0.0")]
    pub min_confidence: f32,

    /// Write results to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Serialize)]
struct Report<'a> {
    file: String,
    width: u32,
    height: u32,
    crop: Option<CropRect>,
    elapsed_ms: u128,
    boxes: &'a [TextBox],
}

pub fn run(args: &RecognizeArgs) -> Result<()> {
    let config = load_config(args)?;

    let image = load_image(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    let (width, height) = image.dimensions();
    let crop = args
        .crop
        .map(|c| c.validated(width, height))
        .transpose()
        .context("Invalid --crop")?;

    if !args.json {
        summary::print_run_header(&args.file, width, height, crop.as_ref(), &config);
    }

    let mut worker = OcrWorker::new(Arc::new(CommandEngine::from_config(&config.engine)));
    worker.submit(Arc::new(image), crop)?;

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:24} [{bar:40}] {pos}%")?
            .progress_chars("=> "),
    );

    let (boxes, elapsed) = 'run: loop {
        for event in worker.poll() {
            match event.kind {
                WorkerEventKind::Progress(stage) => {
                    pb.set_message(stage.to_string());
                    pb.set_position(stage.percent() as u64);
                }
                WorkerEventKind::Succeeded { boxes, elapsed, .. } => break 'run (boxes, elapsed),
                WorkerEventKind::Failed(message) => {
                    pb.abandon_with_message("Failed");
                    bail!("Recognition failed: {message}");
                }
            }
        }
        std::thread::sleep(POLL_INTERVAL);
    };
    pb.set_position(ProgressStage::Finished.percent() as u64);
    pb.finish_with_message(ProgressStage::Finished.to_string());

    let boxes: Vec<TextBox> = boxes
        .into_iter()
        .filter(|b| b.confidence >= args.min_confidence)
        .collect();

    let rendered = if args.json {
        let report = Report {
            file: args.file.display().to_string(),
            width,
            height,
            crop,
            elapsed_ms: elapsed.as_millis(),
            boxes: &boxes,
        };
        serde_json::to_string_pretty(&report)? + "\n"
    } else {
        summary::print_boxes(&boxes, elapsed);
        joined_text(&boxes) + "\n"
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("\nResults saved to {}", path.display());
        }
        None if args.json => print!("{rendered}"),
        None => {
            println!();
            print!("{rendered}");
        }
    }

    Ok(())
}

fn load_config(args: &RecognizeArgs) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => AppConfig::load_or_default(Path::new(CONFIG_FILE_NAME))
            .with_context(|| format!("Failed to read {CONFIG_FILE_NAME}"))?,
    };
    if let Some(ref program) = args.engine {
        config.engine.program = program.clone();
    }
    if let Some(ref lang) = args.lang {
        config.engine.language = lang.clone();
    }
    config.validate()?;
    Ok(config)
}
