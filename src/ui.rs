// Run loop: walks the image directory, classifies one file at a time and
// prints what the service returned. Everything is sequential.

use crate::api::Predictor;
use crate::config::{OutputFormat, Settings};
use crate::error::{ClassifyError, Result};
use crate::images::{encode_file, list_images};
use crate::schema::ImageClassificationPrediction;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::io::{IsTerminal, Write};
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};

/// Counts reported once the loop finishes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub failed: usize,
}

/// Classify every image in the configured directory with `predictor`,
/// printing results to stdout.
pub fn run<P: Predictor>(settings: &Settings, predictor: &P) -> Result<RunSummary> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    classify_all(settings, predictor, &mut out)
}

/// Classify every file in `settings.images_dir` with `predictor`.
///
/// Stops at the first failure unless `continue_on_error` is set, in which
/// case failures are logged and counted.
pub fn classify_all<P: Predictor, W: Write>(
    settings: &Settings,
    predictor: &P,
    out: &mut W,
) -> Result<RunSummary> {
    let files = list_images(&settings.images_dir)?;
    info!("Found {} file(s) in {}", files.len(), settings.images_dir.display());

    let progress = progress_bar(files.len() as u64);
    let mut summary = RunSummary::default();

    for path in &files {
        progress.set_message(path.display().to_string());
        match classify_one(settings, predictor, path, out, &progress) {
            Ok(()) => summary.processed += 1,
            Err(e) if settings.continue_on_error => {
                progress.suspend(|| error!("Classification failed for {}: {}", path.display(), e));
                summary.failed += 1;
            }
            Err(e) => {
                progress.finish_and_clear();
                return Err(e);
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    if summary.failed > 0 {
        warn!("{} of {} image(s) failed", summary.failed, files.len());
    }
    info!("Classified {} image(s)", summary.processed);
    Ok(summary)
}

fn classify_one<P: Predictor, W: Write>(
    settings: &Settings,
    predictor: &P,
    path: &Path,
    out: &mut W,
    progress: &ProgressBar,
) -> Result<()> {
    let image = encode_file(path)?;
    let instances = [image.to_instance()];
    let response = predictor.predict(&instances, &settings.params)?;

    for prediction in &response.predictions {
        let line = format_prediction(settings.format, path, prediction);
        progress
            .suspend(|| writeln!(out, "{}", line))
            .map_err(|e| ClassifyError::io("<stdout>", e))?;
    }
    Ok(())
}

/// Render one prediction either as the plain text line or as a JSON object.
pub fn format_prediction(
    format: OutputFormat,
    path: &Path,
    prediction: &ImageClassificationPrediction,
) -> String {
    match format {
        OutputFormat::Text => format!(
            " predict for image {}: {{label: {:?}, confidences: {:?}}}",
            path.display(),
            prediction.display_names,
            prediction.confidences
        ),
        OutputFormat::Json => {
            let labels: Vec<_> = prediction
                .labels()
                .map(|(label, confidence)| json!({"label": label, "confidence": confidence}))
                .collect();
            json!({"image": path.display().to_string(), "labels": labels}).to_string()
        }
    }
}

fn progress_bar(len: u64) -> ProgressBar {
    if !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{pos}/{len}] {msg}") {
        bar.set_style(style);
    }
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
