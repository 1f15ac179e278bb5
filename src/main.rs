use iced::widget::{
    button, canvas, column, container, horizontal_rule, progress_bar, radio, row, scrollable,
    slider, stack, text, Column,
};
use iced::{Alignment, ContentFit, Element, Length, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;

mod error;
mod scan;
mod state;
mod ui;

use scan::batch::{self, BatchEvent, BatchJob};
use scan::{decoder, loader};
use state::data::{DetectedSymbol, LoadedImage, ScanMode};
use state::library::Library;
use state::selection::ImagePoint;
use state::settings::{ScanParams, MAX_SCALE_PERCENT, MIN_SCALE_PERCENT};
use state::view::ViewState;
use ui::canvas::SelectionOverlay;

/// Main application state
struct RegionScan {
    /// The folder being browsed
    library: Library,
    /// Active symbology for single-region decoding
    mode: ScanMode,
    /// Index of the list entry that is loaded or loading
    selected: Option<usize>,
    /// The displayed image with its selection; rebuilt on every load
    view: Option<ViewState>,
    /// Status message to display to the user
    status: String,
    /// Scan tunables (batch scale is edited from the UI)
    params: ScanParams,
    /// A single-region decode is running
    decoding: bool,
    /// A batch job is running; the start button stays disabled meanwhile
    batch_running: bool,
    batch_progress: u32,
    batch_log: Vec<String>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked the "Open Folder" button
    OpenFolder,
    /// User switched between QR and Data Matrix
    ModeSelected(ScanMode),
    /// User clicked an entry in the file list
    EntrySelected(usize),
    /// Background load finished
    ImageLoaded(PathBuf, Result<LoadedImage, String>),
    /// Selection gesture on the image, in image pixels
    SelectionStarted(ImagePoint),
    SelectionMoved(ImagePoint),
    SelectionFinished(ImagePoint),
    /// User clicked "Detect"
    Detect,
    /// Background decode finished for the image at this path
    DetectFinished(PathBuf, Result<Vec<DetectedSymbol>, String>),
    /// Batch scale slider moved (percent)
    ScaleChanged(u32),
    /// User clicked "Run Batch"
    StartBatch,
    /// Event streamed from the batch worker
    Batch(BatchEvent),
}

impl RegionScan {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        log::info!("Region scanner initialized");

        (
            RegionScan {
                library: Library::default(),
                mode: ScanMode::default(),
                selected: None,
                view: None,
                status: "Open a folder to begin.".to_string(),
                params: ScanParams::default(),
                decoding: false,
                batch_running: false,
                batch_progress: 0,
                batch_log: Vec::new(),
            },
            Task::none(),
        )
    }

    /// Forget the displayed image and its selection
    fn reset_view(&mut self) {
        self.selected = None;
        self.view = None;
        self.decoding = false;
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenFolder => {
                // Show the native folder picker dialog
                let folder = FileDialog::new()
                    .set_title("Select Image Folder")
                    .pick_folder();

                if let Some(folder_path) = folder {
                    match Library::open(&folder_path, self.mode) {
                        Ok(library) => {
                            self.status = format!(
                                "{} images in {}",
                                library.entries().len(),
                                folder_path.display()
                            );
                            self.library = library;
                            self.reset_view();
                        }
                        Err(err) => {
                            log::warn!("Cannot open {}: {}", folder_path.display(), err);
                            self.status = format!("Error: {}", err);
                        }
                    }
                }

                Task::none()
            }
            Message::ModeSelected(mode) => {
                if mode == self.mode {
                    return Task::none();
                }
                self.mode = mode;
                self.reset_view();

                match self.library.reopen(mode) {
                    Ok(library) => self.library = library,
                    Err(err) => {
                        log::warn!("Cannot re-list folder: {}", err);
                        self.status = format!("Error: {}", err);
                    }
                }

                Task::none()
            }
            Message::EntrySelected(index) => {
                let Some(entry) = self.library.get(index) else {
                    return Task::none();
                };
                let path = entry.path.clone();

                self.selected = Some(index);
                self.status = format!("Loading {}...", entry.filename);

                Task::perform(loader::load_image(path.clone()), move |result| {
                    Message::ImageLoaded(path.clone(), result)
                })
            }
            Message::ImageLoaded(path, result) => {
                // ignore loads overtaken by a newer click
                let current = self
                    .selected
                    .and_then(|index| self.library.get(index))
                    .map(|entry| entry.path.as_path());
                if current != Some(path.as_path()) {
                    log::debug!("Dropping stale load of {}", path.display());
                    return Task::none();
                }

                match result {
                    Ok(image) => {
                        self.status = format!(
                            "{} ({}x{})",
                            path.display(),
                            image.width(),
                            image.height()
                        );
                        self.view = Some(ViewState::new(image));
                        self.decoding = false;
                    }
                    Err(err) => {
                        log::warn!("{}", err);
                        self.status = format!("Error: {}", err);
                        self.view = None;
                    }
                }

                Task::none()
            }
            Message::SelectionStarted(point) => {
                if let Some(view) = &mut self.view {
                    view.begin_selection(point);
                }
                Task::none()
            }
            Message::SelectionMoved(point) => {
                if let Some(view) = &mut self.view {
                    view.update_selection(point);
                }
                Task::none()
            }
            Message::SelectionFinished(point) => {
                if let Some(view) = &mut self.view {
                    view.finish_selection(point);
                }
                Task::none()
            }
            Message::Detect => {
                let Some(view) = &mut self.view else {
                    self.status = "Please select an image and an area.".to_string();
                    return Task::none();
                };
                let Some(selection) = view.region() else {
                    view.result = "Please select an area on the image.".to_string();
                    return Task::none();
                };

                self.decoding = true;
                let image = view.image.clone();
                let path = image.path.clone();

                Task::perform(
                    loader::decode_selection(image, selection, self.mode, self.params),
                    move |result| Message::DetectFinished(path.clone(), result),
                )
            }
            Message::DetectFinished(path, result) => {
                self.decoding = false;
                if let Some(view) = &mut self.view {
                    if view.image.path == path {
                        view.result = decoder::summarize(self.mode, &result);
                        log::info!("{}", view.result);
                    }
                }
                Task::none()
            }
            Message::ScaleChanged(percent) => {
                self.params = self.params.with_scale_percent(percent);
                Task::none()
            }
            Message::StartBatch => {
                if self.batch_running {
                    return Task::none();
                }

                let mut input_dialog = FileDialog::new().set_title("Select Folder to Scan");
                if let Some(folder) = self.library.folder() {
                    input_dialog = input_dialog.set_directory(folder);
                }
                let Some(input) = input_dialog.pick_folder() else {
                    return Task::none();
                };
                let Some(output) = FileDialog::new()
                    .set_title("Select Output Folder")
                    .pick_folder()
                else {
                    return Task::none();
                };

                let job = match BatchJob::from_folder(&input, output, self.params) {
                    Ok(job) => job,
                    Err(err) => {
                        self.batch_log.push(format!("Error: {}", err));
                        return Task::none();
                    }
                };

                self.batch_log = vec![format!(
                    "Scanning {} images at {}%",
                    job.len(),
                    self.params.scale_percent
                )];
                self.batch_progress = 0;

                match batch::spawn(job) {
                    Ok(events) => {
                        self.batch_running = true;
                        Task::run(events, Message::Batch)
                    }
                    Err(err) => {
                        log::warn!("Cannot start batch worker: {}", err);
                        self.batch_log.push(format!("Error: {}", err));
                        Task::none()
                    }
                }
            }
            Message::Batch(event) => {
                match event {
                    BatchEvent::Log(line) => self.batch_log.push(line),
                    BatchEvent::Progress(percent) => self.batch_progress = percent,
                    BatchEvent::Completed => {
                        self.batch_running = false;
                        self.batch_log.push("Batch processing finished.".to_string());
                    }
                }
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        row![self.file_panel(), self.image_panel(), self.side_panel()]
            .spacing(10)
            .padding(10)
            .into()
    }

    /// Mode switch, folder button and the scrollable file list
    fn file_panel(&self) -> Element<Message> {
        let modes = ScanMode::ALL.iter().fold(Column::new().spacing(4), |col, mode| {
            col.push(radio(mode.to_string(), *mode, Some(self.mode), Message::ModeSelected))
        });

        let files = self.library.entries().iter().enumerate().fold(
            Column::new().spacing(2),
            |col, (index, entry)| {
                let label = text(&entry.filename).size(14);
                let item = if self.selected == Some(index) {
                    button(label).style(button::primary)
                } else {
                    button(label).style(button::text)
                };
                col.push(
                    item.on_press(Message::EntrySelected(index))
                        .width(Length::Fill),
                )
            },
        );

        column![
            modes,
            button("Open Folder")
                .on_press(Message::OpenFolder)
                .padding(10),
            scrollable(files).height(Length::Fill),
        ]
        .spacing(10)
        .width(220)
        .into()
    }

    /// The image with the selection overlay stacked on top
    fn image_panel(&self) -> Element<Message> {
        let content: Element<Message> = match &self.view {
            Some(view) => stack![
                iced::widget::image(view.handle.clone())
                    .content_fit(ContentFit::Contain)
                    .width(Length::Fill)
                    .height(Length::Fill),
                canvas(SelectionOverlay {
                    image_size: view.image_size(),
                    selection: view.selection(),
                })
                .width(Length::Fill)
                .height(Length::Fill),
            ]
            .into(),
            None => container(text(&self.status).size(16))
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into(),
        };

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Detect button, result label and the batch controls
    fn side_panel(&self) -> Element<Message> {
        let can_detect = self.view.is_some() && !self.decoding;
        let detect_label = format!("Detect {}", self.mode);
        let result = self
            .view
            .as_ref()
            .map(|view| view.result.as_str())
            .unwrap_or(state::view::RESULT_PREFIX);

        let log = self
            .batch_log
            .iter()
            .fold(Column::new().spacing(2), |col, line| col.push(text(line).size(12)));

        column![
            button(text(detect_label))
                .on_press_maybe(can_detect.then_some(Message::Detect))
                .padding(10),
            text(result).size(16),
            text(&self.status).size(12),
            horizontal_rule(1),
            text(format!("Batch scale: {}%", self.params.scale_percent)),
            slider(
                MIN_SCALE_PERCENT..=MAX_SCALE_PERCENT,
                self.params.scale_percent,
                Message::ScaleChanged
            ),
            button("Run Batch")
                .on_press_maybe((!self.batch_running).then_some(Message::StartBatch))
                .padding(10),
            progress_bar(0.0..=100.0, self.batch_progress as f32).height(12),
            scrollable(log).height(Length::Fill),
        ]
        .spacing(12)
        .width(320)
        .align_x(Alignment::Start)
        .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    iced::application(
        "Image and Barcode Analyzer",
        RegionScan::update,
        RegionScan::view,
    )
    .theme(RegionScan::theme)
    .window_size((1200.0, 800.0))
    .centered()
    .run_with(RegionScan::new)
}
