use iced::event::{self, Event};
use iced::keyboard::{self, key};
use iced::widget::{canvas, column, container, image, stack, text};
use iced::{window, ContentFit, Element, Length, Size, Subscription, Task, Theme};
use std::path::{Path, PathBuf};
use std::time::Duration;

use mask_pruner::host::{self, Host, RfdHost};
use mask_pruner::mask::loader::{self, LoadResult};
use mask_pruner::state::data::MaskKind;
use mask_pruner::state::session::{Deleted, Direction, LoadRequest, Rotation, Session};
use mask_pruner::state::settings::Settings;
use mask_pruner::Error;

mod ui;

/// How long to wait for more `FileDropped` events before treating the
/// batch as complete
const DROP_SETTLE: Duration = Duration::from_millis(150);

/// Main application state
struct MaskPruner {
    /// Image set, masks, settings
    session: Session,
    /// Dialogs the session may raise mid-operation
    host: RfdHost,
    /// Status message shown in the status bar
    status: String,
    /// GPU handle for whatever the session currently displays
    preview: Option<image::Handle>,
    /// Contents of the hex color field, applied on submit
    color_input: String,
    /// Files dropped so far in the current batch
    dropped: Vec<PathBuf>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    Next,
    Previous,
    RotateLeft,
    RotateRight,
    Delete,
    SelectInputFolder,
    SelectOutputFolder,
    OpenInputFolder,
    OpenOutputFolder,
    About,
    AutoAdvanceToggled(bool),
    SoundToggled(bool),
    SafeModeToggled(bool),
    MaskKindSelected(MaskKind),
    ColorInputChanged(String),
    ColorSubmitted,
    /// Pointer position in source pixels
    SelectionMoved(f32, f32),
    /// Mouse wheel notches over the canvas
    BrushScrolled(f32),
    ApplyMask,
    /// Background decode finished
    ImageLoaded(LoadResult),
    FileDropped(PathBuf),
    /// No more drops arrived within the settle delay
    DropSettled,
    CloseRequested(window::Id),
}

impl MaskPruner {
    fn new() -> (Self, Task<Message>) {
        let settings_path = Settings::default_path();
        tracing::info!("settings file: {}", settings_path.display());

        let settings = Settings::load_or_default(&settings_path);
        let color_input = settings.mask_color.clone();

        let mut app = MaskPruner {
            session: Session::new(settings, settings_path),
            host: RfdHost,
            status: "Ready. Choose an input folder or drop images here.".to_string(),
            preview: None,
            color_input,
            dropped: Vec::new(),
        };

        // Reopen the last input folder without raising modals before the
        // window exists
        let task = match app.session.settings().input_folder() {
            Some(folder) => match app.session.open_folder(folder.clone(), &mut app.host) {
                Ok(request) => app.begin_load(request),
                Err(e) => {
                    tracing::warn!("could not reopen {}: {}", folder.display(), e);
                    app.status = e.to_string();
                    Task::none()
                }
            },
            None => Task::none(),
        };

        (app, task)
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Next => self.navigate(Direction::Next),
            Message::Previous => self.navigate(Direction::Previous),

            Message::RotateLeft => self.rotate(Rotation::Left),
            Message::RotateRight => self.rotate(Rotation::Right),

            Message::Delete => match self.session.delete_current(&mut self.host) {
                Ok(Deleted::Cancelled) => Task::none(),
                Ok(Deleted::Emptied(path)) => {
                    self.preview = None;
                    self.status = format!("Deleted image: {}", file_name(&path));
                    Task::none()
                }
                Ok(Deleted::Next(path, request)) => {
                    self.status = format!("Deleted image: {}", file_name(&path));
                    self.begin_load(request)
                }
                Err(e) => {
                    self.report(e);
                    Task::none()
                }
            },

            Message::SelectInputFolder => {
                let initial = self.session.input_folder().map(Path::to_path_buf);
                let Some(folder) = host::pick_folder("Select Input Folder", initial.as_deref()) else {
                    self.status = "Input folder selection cancelled.".to_string();
                    return Task::none();
                };

                self.status = format!("Input folder set to: {}", folder.display());
                match self.session.open_folder(folder, &mut self.host) {
                    Ok(request) => self.begin_load(request),
                    Err(e) => {
                        self.report(e);
                        Task::none()
                    }
                }
            }

            Message::SelectOutputFolder => {
                let initial = self.session.output_folder().map(Path::to_path_buf);
                match host::pick_folder("Select Output Folder", initial.as_deref()) {
                    Some(folder) => {
                        self.status = format!("Output folder set to: {}", folder.display());
                        self.session.set_output_folder(folder);
                    }
                    None => self.status = "Output folder selection cancelled.".to_string(),
                }
                Task::none()
            }

            Message::OpenInputFolder => {
                let dir = self.session.input_folder().map(Path::to_path_buf);
                self.open_folder(dir, "Input");
                Task::none()
            }

            Message::OpenOutputFolder => {
                let dir = self.session.output_folder().map(Path::to_path_buf);
                self.open_folder(dir, "Output");
                Task::none()
            }

            Message::About => {
                host::show_about();
                Task::none()
            }

            Message::AutoAdvanceToggled(enabled) => {
                self.session.set_auto_advance(enabled);
                Task::none()
            }

            Message::SoundToggled(enabled) => {
                self.session.set_crop_sound(enabled);
                Task::none()
            }

            Message::SafeModeToggled(enabled) => {
                self.session.set_safe_mode(enabled);
                self.status = if enabled {
                    "Safe mode on: deleting is disabled.".to_string()
                } else {
                    "Safe mode off.".to_string()
                };
                Task::none()
            }

            Message::MaskKindSelected(kind) => {
                self.session.set_mask_kind(kind);
                self.status = format!("Mask type: {}", kind);
                Task::none()
            }

            Message::ColorInputChanged(value) => {
                self.color_input = value;
                Task::none()
            }

            Message::ColorSubmitted => {
                match self.session.set_mask_color(&self.color_input) {
                    Ok(()) => {
                        self.color_input = self.session.settings().mask_color.clone();
                        self.status = format!("Mask color set to {}", self.color_input);
                    }
                    Err(e) => {
                        // Put the last valid color back in the field
                        self.color_input = self.session.settings().mask_color.clone();
                        self.report(e);
                    }
                }
                Task::none()
            }

            Message::SelectionMoved(x, y) => {
                self.session.move_selection(x, y);
                Task::none()
            }

            Message::BrushScrolled(steps) => {
                self.session.scroll_radius(steps);
                Task::none()
            }

            Message::ApplyMask => match self.session.apply_mask() {
                Ok(None) => {
                    self.status = "Selection does not cover the image.".to_string();
                    Task::none()
                }
                Ok(Some(applied)) => {
                    if applied.play_cue {
                        host::play_cue();
                    }
                    self.refresh_preview();
                    self.status = "Mask applied.".to_string();

                    if applied.advance {
                        self.navigate(Direction::Next)
                    } else {
                        Task::none()
                    }
                }
                Err(e) => {
                    self.report(e);
                    Task::none()
                }
            },

            Message::ImageLoaded(result) => {
                match self.session.finish_load(result) {
                    Ok(true) => self.refresh_preview(),
                    // Stale result, a newer load is in flight
                    Ok(false) => {}
                    Err(e) => {
                        self.preview = None;
                        self.report(e);
                    }
                }
                Task::none()
            }

            Message::FileDropped(path) => {
                self.dropped.push(path);
                // The first drop of a batch starts the settle timer
                if self.dropped.len() == 1 {
                    Task::perform(tokio::time::sleep(DROP_SETTLE), |_| Message::DropSettled)
                } else {
                    Task::none()
                }
            }

            Message::DropSettled => {
                let paths = std::mem::take(&mut self.dropped);
                tracing::info!("{} item(s) dropped", paths.len());
                match self.session.open_list(paths, &mut self.host) {
                    Ok(request) => {
                        self.status = format!("Loaded {} images", self.session.images().len());
                        self.begin_load(request)
                    }
                    Err(e) => {
                        self.report(e);
                        Task::none()
                    }
                }
            }

            Message::CloseRequested(id) => {
                if let Err(e) = self.session.close(&mut self.host) {
                    let discard = self.host.confirm(
                        "Unsaved Changes",
                        &format!("{}\n\nDiscard the unsaved mask and exit?", e),
                    );
                    if !discard {
                        self.status = e.to_string();
                        return Task::none();
                    }
                }
                tracing::info!("exiting");
                window::close(id)
            }
        }
    }

    fn view(&self) -> Element<Message> {
        let canvas_area: Element<Message> = match &self.preview {
            Some(handle) => stack![
                image(handle.clone())
                    .content_fit(ContentFit::Contain)
                    .width(Length::Fill)
                    .height(Length::Fill),
                canvas(ui::canvas::SelectionOverlay {
                    image_size: self.session.image_size(),
                    selection: self.session.selection(),
                })
                .width(Length::Fill)
                .height(Length::Fill),
            ]
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
            None => container(text("Drop images here or choose an input folder").size(20))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into(),
        };

        column![
            ui::controls::toolbar(&self.session),
            ui::controls::settings_row(&self.session, &self.color_input),
            canvas_area,
            ui::controls::status_bar(&self.session, &self.status),
        ]
        .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            keyboard::on_key_press(handle_key),
            event::listen_with(handle_window_event),
        ])
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }

    // ========== Helpers ==========

    /// Flush pending work, then move through the image set
    fn navigate(&mut self, direction: Direction) -> Task<Message> {
        // Flushed explicitly first so the saved path can be shown
        match self.session.flush(&mut self.host) {
            Ok(Some(saved)) => self.status = format!("Saved modified image to {}", saved.display()),
            Ok(None) => {}
            Err(e) => {
                self.report(e);
                return Task::none();
            }
        }

        match self.session.navigate(direction, &mut self.host) {
            Ok(request) => self.begin_load(request),
            Err(e) => {
                self.report(e);
                Task::none()
            }
        }
    }

    fn rotate(&mut self, rotation: Rotation) -> Task<Message> {
        match self.session.rotate(rotation) {
            Ok(()) => {
                self.refresh_preview();
                self.status = format!("Image rotated by {} degrees", rotation.degrees());
            }
            Err(e) => self.report(e),
        }
        Task::none()
    }

    /// Start decoding in the background; the old preview stays up until
    /// the new image arrives
    fn begin_load(&self, request: LoadRequest) -> Task<Message> {
        tracing::debug!("loading {} (generation {})", request.path.display(), request.generation);
        Task::perform(
            loader::load_image(request.path, request.generation),
            Message::ImageLoaded,
        )
    }

    fn refresh_preview(&mut self) {
        self.preview = self
            .session
            .display_pixels()
            .map(|pixels| image::Handle::from_rgba(pixels.width(), pixels.height(), pixels.as_raw().clone()));
    }

    fn open_folder(&mut self, dir: Option<PathBuf>, label: &str) {
        match dir.filter(|d| d.is_dir()) {
            Some(dir) => {
                if let Err(e) = host::open_in_file_browser(&dir) {
                    self.report(Error::Io(e));
                }
            }
            None => {
                let message = format!("{} folder is not set or does not exist.", label);
                self.status = message.clone();
                host::show_info("Information", &message);
            }
        }
    }

    /// Show an error on the status line and as a modal
    fn report(&mut self, error: Error) {
        self.status = error.to_string();
        host::report(&error);
    }
}

fn handle_key(key: keyboard::Key, _modifiers: keyboard::Modifiers) -> Option<Message> {
    match key.as_ref() {
        keyboard::Key::Character("w") | keyboard::Key::Character("W") => Some(Message::Next),
        keyboard::Key::Character("s") | keyboard::Key::Character("S") => Some(Message::Previous),
        keyboard::Key::Character("a") | keyboard::Key::Character("A") => Some(Message::RotateLeft),
        keyboard::Key::Character("d") | keyboard::Key::Character("D") => Some(Message::RotateRight),
        keyboard::Key::Named(key::Named::Delete) => Some(Message::Delete),
        _ => None,
    }
}

fn handle_window_event(event: Event, _status: event::Status, id: window::Id) -> Option<Message> {
    match event {
        Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
        Event::Window(window::Event::CloseRequested) => Some(Message::CloseRequested(id)),
        _ => None,
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("MaskPruner starting");

    iced::application("MaskPruner", MaskPruner::update, MaskPruner::view)
        .theme(MaskPruner::theme)
        .subscription(MaskPruner::subscription)
        .window(window::Settings {
            size: Size::new(1280.0, 860.0),
            min_size: Some(Size::new(900.0, 600.0)),
            exit_on_close_request: false,
            ..window::Settings::default()
        })
        .centered()
        .run_with(MaskPruner::new)
}
