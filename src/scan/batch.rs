//! Batch Data Matrix extraction
//!
//! Walks an ordered list of images, finds every Data Matrix symbol and
//! saves a padded crop of each one under `<output_root>/<image stem>/`.
//! The worker reports through a single ordered stream of events: an
//! image's log lines always precede its progress value, and `Completed`
//! is always the last event.
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use chrono::{Local, NaiveTime};
use futures::channel::mpsc;
use image::{DynamicImage, ImageFormat};

use super::{decoder, loader, preprocess};
use crate::error::{Result, ScanError};
use crate::state::data::{DetectedSymbol, ScanMode};
use crate::state::library::Library;
use crate::state::settings::ScanParams;

/// Events emitted by a running batch, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    /// Human-readable progress line
    Log(String),
    /// Percentage of images finished (0 to 100)
    Progress(u32),
    /// Sent exactly once, after the last image
    Completed,
}

/// One batch run: inputs, output root and scan parameters
#[derive(Debug, Clone)]
pub struct BatchJob {
    inputs: Vec<PathBuf>,
    output_root: PathBuf,
    params: ScanParams,
}

impl BatchJob {
    pub fn new(inputs: Vec<PathBuf>, output_root: PathBuf, params: ScanParams) -> Self {
        Self {
            inputs,
            output_root,
            params,
        }
    }

    /// Every Data Matrix candidate image directly inside `folder`
    pub fn from_folder(folder: &Path, output_root: PathBuf, params: ScanParams) -> Result<Self> {
        let library = Library::open(folder, ScanMode::DataMatrix)?;
        Ok(Self::new(library.paths(), output_root, params))
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Process every image in order, reporting through `emit`.
    ///
    /// Failures are reported as log lines and never stop the batch.
    pub fn run(&self, mut emit: impl FnMut(BatchEvent)) {
        let total = self.inputs.len();
        log::info!(
            "Batch started: {} images -> {}",
            total,
            self.output_root.display()
        );

        if self.is_empty() {
            emit(BatchEvent::Log("No images to process.".to_string()));
        }

        for (index, path) in self.inputs.iter().enumerate() {
            if let Err(err) = self.process_image(path, &mut emit) {
                let line = format!("Error processing {}: {}", display_name(path), err);
                log::warn!("{}", line);
                emit(BatchEvent::Log(line));
            }
            emit(BatchEvent::Progress(progress_percent(index, total)));
        }

        log::info!("Batch finished");
        emit(BatchEvent::Completed);
    }

    fn process_image(&self, path: &Path, emit: &mut impl FnMut(BatchEvent)) -> Result<()> {
        let original = loader::read_image(path)?;

        let image = if self.params.rescales() {
            preprocess::rescale(&original, self.params.scale_percent)?
        } else {
            original
        };

        let out_dir = self.output_root.join(file_stem(path));
        fs::create_dir_all(&out_dir)?;

        let binary = preprocess::binarize(&image, &self.params);
        let symbols = decoder::detect_data_matrix(&binary)?;

        if symbols.is_empty() {
            emit(info(format!("No matrices found in {}", display_name(path))));
            return Ok(());
        }

        save_each(path, &symbols, emit, |symbol| {
            self.save_symbol(&image, symbol, &out_dir, Local::now().time())
        });

        Ok(())
    }

    /// Crop the padded symbol box from the (scaled) colour image and write it
    fn save_symbol(
        &self,
        image: &DynamicImage,
        symbol: &DetectedSymbol,
        out_dir: &Path,
        stamp: NaiveTime,
    ) -> Result<PathBuf> {
        let rect = symbol
            .bounds
            .padded(self.params.crop_padding, image.width(), image.height());
        if rect.is_empty() {
            return Err(ScanError::EmptyRegion);
        }

        let crop = image.crop_imm(rect.x, rect.y, rect.width, rect.height);
        let target = out_dir.join(output_file_name(&symbol.payload, stamp));

        crop.save_with_format(&target, ImageFormat::Png)
            .map_err(|source| ScanError::Save {
                path: target.clone(),
                source,
            })?;

        Ok(target)
    }
}

/// Save every symbol of one image in turn; a failed save is logged and
/// the remaining symbols still go ahead
fn save_each(
    path: &Path,
    symbols: &[DetectedSymbol],
    emit: &mut impl FnMut(BatchEvent),
    mut save: impl FnMut(&DetectedSymbol) -> Result<PathBuf>,
) {
    for symbol in symbols {
        match save(symbol) {
            Ok(saved) => {
                emit(info(format!(
                    "Saved matrix \"{}\" to {}",
                    symbol.payload,
                    saved.display()
                )));
            }
            Err(err) => {
                let line = format!(
                    "Error saving matrix \"{}\" from {}: {}",
                    symbol.payload,
                    display_name(path),
                    err
                );
                log::warn!("{}", line);
                emit(BatchEvent::Log(line));
            }
        }
    }
}

fn info(line: String) -> BatchEvent {
    log::info!("{}", line);
    BatchEvent::Log(line)
}

/// `round((index + 1) / total * 100)`
pub fn progress_percent(index: usize, total: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    ((index + 1) as f64 / total as f64 * 100.0).round() as u32
}

/// Replace every non-alphanumeric character with `_`, one for one
pub fn sanitize_payload(payload: &str) -> String {
    payload
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

/// `<sanitized payload>_<HHMMSS>.png`
pub fn output_file_name(payload: &str, stamp: NaiveTime) -> String {
    format!("{}_{}.png", sanitize_payload(payload), stamp.format("%H%M%S"))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

/// Run `job` on its own thread and stream its events back.
///
/// The receiver ends after `Completed`, when the worker drops its sender.
pub fn spawn(job: BatchJob) -> Result<mpsc::UnboundedReceiver<BatchEvent>> {
    let (sender, receiver) = mpsc::unbounded();

    thread::Builder::new()
        .name("batch-worker".to_string())
        .spawn(move || {
            job.run(|event| {
                // the UI went away; keep going so partial output is still written
                let _ = sender.unbounded_send(event);
            });
        })?;

    Ok(receiver)
}
