//! The masking session: which images are loaded, what has been painted,
//! and when it gets written out.
//!
//! A session is `Clean` while no mask has been applied to the current
//! image and `Dirty` once one has (a working buffer exists). Dirty work
//! is flushed to the output folder before anything replaces the current
//! image: navigation, opening another folder, closing. If the flush
//! can't complete, the replacing operation is cancelled so no edit is
//! silently lost.
//!
//! No iced types live here; the UI translates events into these calls.

use image::imageops;
use image::RgbaImage;
use std::path::{Path, PathBuf};

use super::data::{MaskKind, Selection};
use super::image_set::ImageSet;
use super::settings::Settings;
use crate::error::{Error, Result};
use crate::host::Host;
use crate::mask::engine;
use crate::mask::export;
use crate::mask::loader::LoadResult;

/// The decoded pixels of the current image
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub path: PathBuf,
    pub pixels: RgbaImage,
}

/// A decode the UI should run in the background
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub path: PathBuf,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Quarter turn, as offered by the toolbar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// +90°, counter-clockwise
    Left,
    /// -90°, clockwise
    Right,
}

impl Rotation {
    pub fn degrees(self) -> i32 {
        match self {
            Rotation::Left => 90,
            Rotation::Right => -90,
        }
    }
}

/// What the UI should do after a mask was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    pub play_cue: bool,
    pub advance: bool,
}

/// Result of a confirmed-or-not delete
#[derive(Debug, Clone, PartialEq)]
pub enum Deleted {
    /// The user said no
    Cancelled,
    /// File removed; the set is now empty
    Emptied(PathBuf),
    /// File removed; load the new current image
    Next(PathBuf, LoadRequest),
}

#[derive(Debug)]
pub struct Session {
    settings: Settings,
    settings_path: PathBuf,
    images: ImageSet,
    input_folder: Option<PathBuf>,
    output_folder: Option<PathBuf>,
    current: Option<LoadedImage>,
    /// Copy of `current` with masks applied; present only while Dirty
    working: Option<RgbaImage>,
    selection: Selection,
    /// Bumped on every load request; stale decode results are dropped
    generation: u64,
    masks_applied: u64,
    images_saved: u64,
}

impl Session {
    pub fn new(settings: Settings, settings_path: PathBuf) -> Self {
        let input_folder = settings.input_folder();
        let output_folder = settings.output_folder();
        Session {
            settings,
            settings_path,
            images: ImageSet::default(),
            input_folder,
            output_folder,
            current: None,
            working: None,
            selection: Selection::default(),
            generation: 0,
            masks_applied: 0,
            images_saved: 0,
        }
    }

    // ========== Accessors ==========

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn images(&self) -> &ImageSet {
        &self.images
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn input_folder(&self) -> Option<&Path> {
        self.input_folder.as_deref()
    }

    pub fn output_folder(&self) -> Option<&Path> {
        self.output_folder.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.working.is_some()
    }

    pub fn masks_applied(&self) -> u64 {
        self.masks_applied
    }

    pub fn images_saved(&self) -> u64 {
        self.images_saved
    }

    pub fn current(&self) -> Option<&LoadedImage> {
        self.current.as_ref()
    }

    /// The buffer to show: the working copy when Dirty, else the source
    pub fn display_pixels(&self) -> Option<&RgbaImage> {
        self.working
            .as_ref()
            .or_else(|| self.current.as_ref().map(|c| &c.pixels))
    }

    pub fn image_size(&self) -> Option<(u32, u32)> {
        self.current.as_ref().map(|c| c.pixels.dimensions())
    }

    // ========== Image set ==========

    /// Replace the image set with the images in `folder`
    pub fn open_folder(&mut self, folder: PathBuf, host: &mut dyn Host) -> Result<LoadRequest> {
        let images = ImageSet::from_folder(&folder)?;
        if images.is_empty() {
            return Err(Error::NoImagesFound("selected directory"));
        }
        self.flush(host)?;

        tracing::info!("loaded {} images from {}", images.len(), folder.display());
        self.settings.default_input_folder = folder.to_string_lossy().to_string();
        self.input_folder = Some(folder);
        self.persist_settings();
        self.replace_images(images)
    }

    /// Replace the image set with dropped paths. A single dropped
    /// directory behaves like a folder selection.
    pub fn open_list(&mut self, paths: Vec<PathBuf>, host: &mut dyn Host) -> Result<LoadRequest> {
        if let [only] = paths.as_slice() {
            if only.is_dir() {
                return self.open_folder(only.clone(), host);
            }
        }

        let images = ImageSet::from_list(paths);
        let Some(first) = images.current() else {
            return Err(Error::NoImagesFound("dropped files"));
        };
        let parent = first.parent().map(Path::to_path_buf);
        self.flush(host)?;

        tracing::info!("loaded {} images from dropped files", images.len());
        self.input_folder = parent;
        self.replace_images(images)
    }

    fn replace_images(&mut self, images: ImageSet) -> Result<LoadRequest> {
        self.images = images;
        self.request_load().ok_or(Error::Empty)
    }

    /// Move to the next/previous image, flushing pending work first
    pub fn navigate(&mut self, direction: Direction, host: &mut dyn Host) -> Result<LoadRequest> {
        if self.images.is_empty() {
            return Err(Error::Empty);
        }
        self.flush(host)?;

        match direction {
            Direction::Next => self.images.next()?,
            Direction::Previous => self.images.previous()?,
        };
        self.request_load().ok_or(Error::Empty)
    }

    /// Delete the current image from disk after confirmation
    pub fn delete_current(&mut self, host: &mut dyn Host) -> Result<Deleted> {
        self.delete_current_with(host, |p| std::fs::remove_file(p))
    }

    /// `delete_current` with an injectable remove operation
    pub fn delete_current_with<F>(&mut self, host: &mut dyn Host, remove: F) -> Result<Deleted>
    where
        F: FnOnce(&Path) -> std::io::Result<()>,
    {
        if self.settings.safe_mode {
            return Err(Error::SafeMode);
        }
        if self.images.is_empty() {
            return Err(Error::Empty);
        }
        if !host.confirm(
            "Delete Image",
            "Are you sure you want to permanently delete this image?",
        ) {
            return Ok(Deleted::Cancelled);
        }

        let deleted = self.images.delete_current(remove)?;
        tracing::info!("deleted {}", deleted.display());

        // Pending masks belonged to the deleted file
        self.working = None;

        if self.images.is_empty() {
            self.current = None;
            self.generation += 1;
            return Ok(Deleted::Emptied(deleted));
        }
        let request = self.request_load().ok_or(Error::Empty)?;
        Ok(Deleted::Next(deleted, request))
    }

    // ========== Loading ==========

    /// Drop the current image and ask for the one at the current index.
    ///
    /// Must only run once any Dirty work has been flushed.
    fn request_load(&mut self) -> Option<LoadRequest> {
        let path = self.images.current()?.to_path_buf();
        self.generation += 1;
        self.current = None;
        self.working = None;
        Some(LoadRequest {
            path,
            generation: self.generation,
        })
    }

    /// Install a finished decode. Returns `Ok(false)` for stale results.
    pub fn finish_load(&mut self, result: LoadResult) -> Result<bool> {
        if result.generation != self.generation {
            tracing::debug!("dropping stale load of {}", result.path.display());
            return Ok(false);
        }

        match result.outcome {
            Ok(decoded) => {
                let (width, height) = decoded.pixels.dimensions();
                self.selection.center_x = width as f32 / 2.0;
                self.selection.center_y = height as f32 / 2.0;
                self.selection.fit_to(width, height);
                self.current = Some(LoadedImage {
                    path: decoded.path,
                    pixels: decoded.pixels,
                });
                self.working = None;
                Ok(true)
            }
            Err(message) => {
                self.current = None;
                self.working = None;
                Err(Error::Load(message))
            }
        }
    }

    // ========== Selection ==========

    /// Move the brush to a source-space point, clamped inside the image
    pub fn move_selection(&mut self, x: f32, y: f32) {
        let Some((width, height)) = self.image_size() else {
            return;
        };
        self.selection.center_x = x;
        self.selection.center_y = y;
        self.selection.clamp_center(width, height);
    }

    /// Resize the brush by wheel notches (positive grows)
    pub fn scroll_radius(&mut self, steps: f32) {
        let Some((width, height)) = self.image_size() else {
            return;
        };
        self.selection.scroll(steps, width, height);
    }

    // ========== Editing ==========

    /// Paint the current mask at the selection. `Clean -> Dirty` on the
    /// first application for this image.
    ///
    /// Returns `Ok(None)` when the brush covers no pixel; the image then
    /// stays as it was.
    pub fn apply_mask(&mut self) -> Result<Option<Applied>> {
        let current = self.current.as_ref().ok_or(Error::NoImage)?;
        let was_dirty = self.working.is_some();
        let mut working = self.working.take().unwrap_or_else(|| current.pixels.clone());

        let (center, radius) = self.selection.to_pixels();
        let spec = self.settings.mask_spec();
        let touched = engine::apply_mask(&current.pixels, &mut working, center, radius, spec);

        if touched.is_none() {
            if was_dirty {
                self.working = Some(working);
            }
            tracing::debug!("mask at {:?} r={} covers no pixel", center, radius);
            return Ok(None);
        }

        self.working = Some(working);
        self.masks_applied += 1;
        tracing::debug!("applied {:?} at {:?} r={}", spec, center, radius);

        Ok(Some(Applied {
            play_cue: self.settings.crop_sound,
            advance: self.settings.auto_advance,
        }))
    }

    /// Rotate the source and, when Dirty, the working copy together
    pub fn rotate(&mut self, rotation: Rotation) -> Result<()> {
        let current = self.current.as_mut().ok_or(Error::NoImage)?;
        let turn = |img: &RgbaImage| match rotation {
            Rotation::Left => imageops::rotate270(img),
            Rotation::Right => imageops::rotate90(img),
        };

        current.pixels = turn(&current.pixels);
        if let Some(working) = self.working.as_mut() {
            *working = turn(&*working);
        }

        let (width, height) = current.pixels.dimensions();
        self.selection.fit_to(width, height);
        Ok(())
    }

    /// Write Dirty work to the output folder.
    ///
    /// Returns `Ok(None)` when there was nothing to write. Asks for an
    /// output folder if none is set; declining, or a failed write,
    /// leaves the image Dirty.
    pub fn flush(&mut self, host: &mut dyn Host) -> Result<Option<PathBuf>> {
        if self.working.is_none() || self.current.is_none() {
            return Ok(None);
        }

        let output = match self.output_folder.clone() {
            Some(dir) => dir,
            None => {
                // Start the picker next to the images being masked
                let dir = host
                    .pick_output_folder(self.input_folder.as_deref())
                    .ok_or(Error::OutputFolderNotSet)?;
                self.set_output_folder(dir.clone());
                dir
            }
        };

        let (Some(working), Some(current)) = (self.working.as_ref(), self.current.as_ref()) else {
            return Ok(None);
        };
        let saved = export::save_png(working, &current.path, &output)?;
        self.working = None;
        self.images_saved += 1;
        Ok(Some(saved))
    }

    /// Flush and persist settings before the window goes away
    pub fn close(&mut self, host: &mut dyn Host) -> Result<()> {
        let flushed = self.flush(host);
        self.persist_settings();
        flushed.map(|_| ())
    }

    // ========== Settings ==========

    pub fn set_output_folder(&mut self, dir: PathBuf) {
        tracing::info!("output folder set to {}", dir.display());
        self.settings.default_output_folder = dir.to_string_lossy().to_string();
        self.output_folder = Some(dir);
        self.persist_settings();
    }

    pub fn set_auto_advance(&mut self, enabled: bool) {
        self.settings.auto_advance = enabled;
        self.persist_settings();
    }

    pub fn set_crop_sound(&mut self, enabled: bool) {
        self.settings.crop_sound = enabled;
        self.persist_settings();
    }

    pub fn set_safe_mode(&mut self, enabled: bool) {
        self.settings.safe_mode = enabled;
        self.persist_settings();
    }

    pub fn set_mask_kind(&mut self, kind: MaskKind) {
        self.settings.mask_type = kind;
        self.persist_settings();
    }

    /// Set the fill color from hex; invalid input leaves it unchanged
    pub fn set_mask_color(&mut self, hex: &str) -> Result<()> {
        let color = super::data::parse_hex_color(hex)?;
        self.settings.set_color(color);
        self.persist_settings();
        Ok(())
    }

    pub fn persist_settings(&self) {
        self.settings.save(&self.settings_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::loader::{load_image_blocking, DecodedImage};
    use image::Rgba;
    use std::fs;
    use tempfile::TempDir;

    /// Scripted dialog answers
    #[derive(Default)]
    struct FakeHost {
        folder: Option<PathBuf>,
        confirm: bool,
        prompts: usize,
        initial: Option<PathBuf>,
    }

    impl Host for FakeHost {
        fn pick_output_folder(&mut self, initial: Option<&Path>) -> Option<PathBuf> {
            self.prompts += 1;
            self.initial = initial.map(Path::to_path_buf);
            self.folder.clone()
        }

        fn confirm(&mut self, _title: &str, _message: &str) -> bool {
            self.confirm
        }
    }

    struct Fixture {
        _dir: TempDir,
        input: PathBuf,
        output: PathBuf,
        session: Session,
    }

    fn textured(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 7 % 256) as u8, (y * 5 % 256) as u8, ((x ^ y) % 256) as u8, 255])
        })
    }

    /// Input folder with `count` textured PNGs, empty output folder
    fn fixture(count: usize, width: u32, height: u32) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        fs::create_dir(&input).unwrap();
        fs::create_dir(&output).unwrap();
        for i in 0..count {
            textured(width, height)
                .save(input.join(format!("img{i}.png")))
                .unwrap();
        }

        let mut settings = Settings::default();
        settings.auto_advance = false;
        let session = Session::new(settings, dir.path().join("usersettings.json"));
        Fixture {
            _dir: dir,
            input,
            output,
            session,
        }
    }

    /// Run a load request synchronously, as the UI would in the background
    fn complete(session: &mut Session, request: LoadRequest) {
        let outcome = load_image_blocking(&request.path).map_err(|e| e.to_string());
        let result = LoadResult {
            generation: request.generation,
            path: request.path,
            outcome,
        };
        assert!(session.finish_load(result).unwrap());
    }

    fn opened(count: usize, width: u32, height: u32) -> Fixture {
        let mut fx = fixture(count, width, height);
        let request = fx
            .session
            .open_folder(fx.input.clone(), &mut FakeHost::default())
            .unwrap();
        complete(&mut fx.session, request);
        fx
    }

    #[test]
    fn test_end_to_end_color() {
        let mut fx = opened(1, 1000, 800);
        let mut host = FakeHost {
            folder: Some(fx.output.clone()),
            ..Default::default()
        };
        fx.session.set_mask_color("#FF0000").unwrap();
        fx.session.selection.radius = 50.0;
        fx.session.move_selection(500.0, 400.0);

        fx.session.apply_mask().unwrap();
        assert!(fx.session.is_dirty());

        let saved = fx.session.flush(&mut host).unwrap().unwrap();
        assert_eq!(saved, fx.output.join("img0.png"));
        assert!(!fx.session.is_dirty());
        assert_eq!(fx.session.images_saved(), 1);

        let out = image::open(&saved).unwrap().to_rgb8();
        let source = textured(1000, 800);
        assert_eq!(out.get_pixel(500, 400).0, [255, 0, 0]);
        let above = source.get_pixel(500, 340);
        assert_eq!(out.get_pixel(500, 340).0, [above[0], above[1], above[2]]);
    }

    #[test]
    fn test_end_to_end_mosaic() {
        let mut fx = opened(1, 300, 300);
        fx.session.set_mask_kind(MaskKind::Mosaic);
        fx.session.selection.radius = 64.0;
        fx.session.move_selection(150.0, 150.0);
        fx.session.apply_mask().unwrap();

        let mut host = FakeHost {
            folder: Some(fx.output.clone()),
            ..Default::default()
        };
        let saved = fx.session.flush(&mut host).unwrap().unwrap();
        let out = image::open(&saved).unwrap().to_rgb8();
        let source = textured(300, 300);

        // Inside: constant across each 16-ish block of the center row
        let row: Vec<_> = (90..=210).map(|x| out.get_pixel(x, 150).0).collect();
        let changes = row.windows(2).filter(|w| w[0] != w[1]).count();
        assert!(changes <= 8, "{changes} color changes across 121px");

        // Outside: untouched
        for &(x, y) in &[(10, 10), (150, 80), (220, 150), (299, 299)] {
            let s = source.get_pixel(x, y);
            assert_eq!(out.get_pixel(x, y).0, [s[0], s[1], s[2]]);
        }
    }

    #[test]
    fn test_small_image_mask_is_symmetric() {
        let mut fx = opened(1, 25, 25);
        fx.session.set_mask_color("#FF0000").unwrap();

        assert!(fx.session.apply_mask().unwrap().is_some());

        let pixels = fx.session.display_pixels().unwrap();
        let red = Rgba([255, 0, 0, 255]);
        let column = |x: u32| (0..25).filter(|&y| *pixels.get_pixel(x, y) == red).count();
        assert!(column(0) > 0);
        assert_eq!(column(0), column(24));
    }

    #[test]
    fn test_single_pixel_image_is_masked() {
        let mut fx = opened(1, 1, 1);
        fx.session.set_mask_color("#FF0000").unwrap();

        assert!(fx.session.apply_mask().unwrap().is_some());

        assert!(fx.session.is_dirty());
        assert_eq!(*fx.session.display_pixels().unwrap().get_pixel(0, 0), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_mask_covering_nothing_stays_clean() {
        let mut fx = opened(1, 50, 50);
        fx.session.selection.center_x = -500.0;
        fx.session.selection.center_y = -500.0;

        assert_eq!(fx.session.apply_mask().unwrap(), None);

        assert!(!fx.session.is_dirty());
        assert_eq!(fx.session.masks_applied(), 0);
        assert_eq!(
            fx.session.flush(&mut FakeHost::default()).unwrap(),
            None
        );
    }

    #[test]
    fn test_apply_without_image_fails() {
        let mut fx = fixture(1, 10, 10);
        assert!(matches!(fx.session.apply_mask(), Err(Error::NoImage)));
    }

    #[test]
    fn test_apply_reports_cue_and_advance() {
        let mut fx = opened(2, 100, 100);
        fx.session.set_auto_advance(true);
        fx.session.set_crop_sound(false);

        let applied = fx.session.apply_mask().unwrap().unwrap();
        assert_eq!(
            applied,
            Applied {
                play_cue: false,
                advance: true
            }
        );
        assert_eq!(fx.session.masks_applied(), 1);
    }

    #[test]
    fn test_navigate_flushes_dirty_image() {
        let mut fx = opened(3, 100, 100);
        let mut host = FakeHost {
            folder: Some(fx.output.clone()),
            ..Default::default()
        };

        fx.session.apply_mask().unwrap();
        let request = fx.session.navigate(Direction::Next, &mut host).unwrap();

        assert_eq!(host.prompts, 1);
        assert_eq!(host.initial.as_deref(), Some(fx.input.as_path()));
        assert!(fx.output.join("img0.png").exists());
        assert_eq!(request.path, fx.input.join("img1.png"));
        assert!(!fx.session.is_dirty());
        assert!(fx.session.current().is_none());
        assert_eq!(fx.session.output_folder(), Some(fx.output.as_path()));
    }

    #[test]
    fn test_clean_navigation_writes_nothing() {
        let mut fx = opened(2, 50, 50);
        let mut host = FakeHost::default();

        fx.session.navigate(Direction::Previous, &mut host).unwrap();

        assert_eq!(host.prompts, 0);
        assert_eq!(fs::read_dir(&fx.output).unwrap().count(), 0);
        assert_eq!(fx.session.images().index(), 1);
    }

    #[test]
    fn test_declined_prompt_keeps_dirty_and_cancels_navigation() {
        let mut fx = opened(2, 100, 100);
        let mut host = FakeHost::default();

        fx.session.apply_mask().unwrap();
        let result = fx.session.navigate(Direction::Next, &mut host);

        assert!(matches!(result, Err(Error::OutputFolderNotSet)));
        assert!(fx.session.is_dirty());
        assert_eq!(fx.session.images().index(), 0);
        assert!(fx.session.current().is_some());
    }

    #[test]
    fn test_failed_save_keeps_dirty() {
        let mut fx = opened(1, 100, 100);
        fx.session.set_output_folder(fx.output.join("does-not-exist"));

        fx.session.apply_mask().unwrap();
        let result = fx.session.flush(&mut FakeHost::default());

        assert!(matches!(result, Err(Error::Save { .. })));
        assert!(fx.session.is_dirty());
        assert_eq!(fx.session.images_saved(), 0);
    }

    #[test]
    fn test_stale_load_is_ignored() {
        let mut fx = fixture(2, 40, 40);
        let mut host = FakeHost::default();
        let first = fx.session.open_folder(fx.input.clone(), &mut host).unwrap();
        let second = fx.session.navigate(Direction::Next, &mut host).unwrap();

        let stale = LoadResult {
            generation: first.generation,
            path: first.path.clone(),
            outcome: Ok(DecodedImage {
                path: first.path,
                pixels: RgbaImage::new(40, 40),
            }),
        };
        assert!(!fx.session.finish_load(stale).unwrap());
        assert!(fx.session.current().is_none());

        complete(&mut fx.session, second);
        assert_eq!(fx.session.current().unwrap().path, fx.input.join("img1.png"));
    }

    #[test]
    fn test_failed_decode_leaves_image_unset() {
        let mut fx = fixture(0, 1, 1);
        fs::write(fx.input.join("broken.png"), b"nope").unwrap();

        let request = fx
            .session
            .open_folder(fx.input.clone(), &mut FakeHost::default())
            .unwrap();
        let outcome = load_image_blocking(&request.path).map_err(|e| e.to_string());
        let result = fx.session.finish_load(LoadResult {
            generation: request.generation,
            path: request.path,
            outcome,
        });

        assert!(matches!(result, Err(Error::Load(_))));
        assert!(fx.session.current().is_none());
        assert_eq!(fx.session.images().len(), 1);
    }

    #[test]
    fn test_rotate_while_dirty_keeps_geometry_in_sync() {
        let mut fx = opened(1, 120, 80);
        fx.session.apply_mask().unwrap();

        fx.session.rotate(Rotation::Left).unwrap();

        let current = fx.session.current().unwrap().pixels.dimensions();
        assert_eq!(current, (80, 120));
        assert_eq!(fx.session.display_pixels().unwrap().dimensions(), current);
        assert!(fx.session.selection().radius <= 40.0);
    }

    #[test]
    fn test_rotate_left_is_counter_clockwise() {
        let mut fx = opened(1, 4, 2);
        let top_right = *fx.session.current().unwrap().pixels.get_pixel(3, 0);

        fx.session.rotate(Rotation::Left).unwrap();

        // Top-right corner ends up top-left after a CCW quarter turn
        assert_eq!(*fx.session.current().unwrap().pixels.get_pixel(0, 0), top_right);
        assert_eq!(Rotation::Left.degrees(), 90);
    }

    #[test]
    fn test_selection_clamped_to_image() {
        let mut fx = opened(1, 400, 300);
        fx.session.selection.radius = 50.0;

        fx.session.move_selection(-20.0, 1000.0);
        let sel = fx.session.selection();
        assert_eq!((sel.center_x, sel.center_y), (50.0, 250.0));

        fx.session.scroll_radius(100.0);
        assert_eq!(fx.session.selection().radius, 150.0);
    }

    #[test]
    fn test_radius_is_sticky_across_images() {
        let mut fx = opened(2, 400, 400);
        fx.session.selection.radius = 80.0;
        let request = fx
            .session
            .navigate(Direction::Next, &mut FakeHost::default())
            .unwrap();
        complete(&mut fx.session, request);

        assert_eq!(fx.session.selection().radius, 80.0);
    }

    #[test]
    fn test_delete_respects_safe_mode_and_confirmation() {
        let mut fx = opened(2, 20, 20);
        let mut host = FakeHost::default();

        fx.session.set_safe_mode(true);
        assert!(matches!(fx.session.delete_current(&mut host), Err(Error::SafeMode)));

        fx.session.set_safe_mode(false);
        assert_eq!(fx.session.delete_current(&mut host).unwrap(), Deleted::Cancelled);
        assert!(fx.input.join("img0.png").exists());
    }

    #[test]
    fn test_delete_until_empty() {
        let mut fx = opened(2, 20, 20);
        let mut host = FakeHost {
            confirm: true,
            ..Default::default()
        };

        match fx.session.delete_current(&mut host).unwrap() {
            Deleted::Next(path, request) => {
                assert_eq!(path, fx.input.join("img0.png"));
                assert_eq!(request.path, fx.input.join("img1.png"));
                complete(&mut fx.session, request);
            }
            other => panic!("unexpected {other:?}"),
        }

        assert!(matches!(
            fx.session.delete_current(&mut host).unwrap(),
            Deleted::Emptied(_)
        ));
        assert!(fx.session.current().is_none());
        assert!(fx.session.images().is_empty());
        assert!(matches!(
            fx.session.navigate(Direction::Next, &mut host),
            Err(Error::Empty)
        ));
    }

    #[test]
    fn test_failed_delete_keeps_set() {
        let mut fx = opened(3, 20, 20);
        let mut host = FakeHost {
            confirm: true,
            ..Default::default()
        };
        let before = fx.session.images().clone();

        let result = fx.session.delete_current_with(&mut host, |_| {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "locked"))
        });

        assert!(matches!(result, Err(Error::Delete { .. })));
        assert_eq!(fx.session.images(), &before);
        assert!(fx.session.current().is_some());
    }

    #[test]
    fn test_open_list_filters_and_sets_input_folder() {
        let mut fx = fixture(2, 10, 10);
        let dropped = vec![
            fx.input.join("img1.png"),
            fx.input.join("readme.txt"),
            fx.input.join("img0.png"),
        ];

        let request = fx
            .session
            .open_list(dropped, &mut FakeHost::default())
            .unwrap();

        assert_eq!(request.path, fx.input.join("img1.png"));
        assert_eq!(fx.session.images().len(), 2);
        assert_eq!(fx.session.input_folder(), Some(fx.input.as_path()));

        let result = fx
            .session
            .open_list(vec![fx.input.join("notes.txt")], &mut FakeHost::default());
        assert!(matches!(result, Err(Error::NoImagesFound("dropped files"))));
    }

    #[test]
    fn test_open_empty_folder_reports_no_images() {
        let mut fx = fixture(0, 1, 1);
        let result = fx.session.open_folder(fx.input.clone(), &mut FakeHost::default());
        assert!(matches!(result, Err(Error::NoImagesFound("selected directory"))));
    }

    #[test]
    fn test_close_flushes_and_persists_settings() {
        let mut fx = opened(1, 60, 60);
        fx.session.set_output_folder(fx.output.clone());
        fx.session.apply_mask().unwrap();

        fx.session.close(&mut FakeHost::default()).unwrap();

        assert!(fx.output.join("img0.png").exists());
        let saved = Settings::load_or_default(&fx.session.settings_path);
        assert_eq!(saved.output_folder(), Some(fx.output.clone()));
        assert_eq!(saved.input_folder(), Some(fx.input.clone()));
    }

    #[test]
    fn test_close_with_declined_prompt_still_persists_settings() {
        let mut fx = opened(1, 60, 60);
        fx.session.apply_mask().unwrap();
        fs::remove_file(&fx.session.settings_path).unwrap();

        let result = fx.session.close(&mut FakeHost::default());

        assert!(matches!(result, Err(Error::OutputFolderNotSet)));
        assert!(fx.session.is_dirty());
        assert!(fx.session.settings_path.exists());
        let saved = Settings::load_or_default(&fx.session.settings_path);
        assert_eq!(saved.input_folder(), Some(fx.input.clone()));
    }

    #[test]
    fn test_close_with_failed_save_still_persists_settings() {
        let mut fx = opened(1, 60, 60);
        let missing = fx.output.join("gone");
        fx.session.set_output_folder(missing.clone());
        fx.session.apply_mask().unwrap();
        fs::remove_file(&fx.session.settings_path).unwrap();

        let result = fx.session.close(&mut FakeHost::default());

        assert!(matches!(result, Err(Error::Save { .. })));
        let saved = Settings::load_or_default(&fx.session.settings_path);
        assert_eq!(saved.output_folder(), Some(missing));
    }

    #[test]
    fn test_invalid_color_is_rejected() {
        let mut fx = fixture(0, 1, 1);
        assert!(fx.session.set_mask_color("red").is_err());
        assert_eq!(fx.session.settings().mask_color, "#000000");
    }
}
