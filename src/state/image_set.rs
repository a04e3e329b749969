use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Supported image extensions (lowercase, matched case-insensitively)
pub const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// The ordered, cyclic list of images the user is working through.
///
/// Holds absolute paths plus the current index. Whenever the set is
/// non-empty the index satisfies `0 <= index < len`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageSet {
    paths: Vec<PathBuf>,
    index: usize,
}

impl ImageSet {
    /// Build a set from paths, keeping only supported image files
    pub fn from_list<I>(paths: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let paths = paths.into_iter().filter(|p| is_supported(p)).collect();
        ImageSet { paths, index: 0 }
    }

    /// List the image files directly inside `folder`, sorted by file name.
    ///
    /// Subfolders are not descended into.
    pub fn from_folder(folder: &Path) -> Result<Self> {
        // Surface a missing or unreadable folder instead of an empty set
        std::fs::read_dir(folder)?;

        let mut paths: Vec<PathBuf> = WalkDir::new(folder)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| is_supported(p))
            .collect();

        // Absolute paths so output names and deletes don't depend on the cwd
        if !folder.is_absolute() {
            if let Ok(cwd) = std::env::current_dir() {
                paths = paths.into_iter().map(|p| cwd.join(p)).collect();
            }
        }

        tracing::info!("found {} images in {}", paths.len(), folder.display());
        Ok(ImageSet { paths, index: 0 })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Path at the current index
    pub fn current(&self) -> Option<&Path> {
        self.paths.get(self.index).map(PathBuf::as_path)
    }

    /// Advance by one, wrapping to the start
    pub fn next(&mut self) -> Result<&Path> {
        self.step(1)
    }

    /// Go back by one, wrapping to the end
    pub fn previous(&mut self) -> Result<&Path> {
        self.step(-1)
    }

    fn step(&mut self, delta: isize) -> Result<&Path> {
        let len = self.paths.len();
        if len == 0 {
            return Err(Error::Empty);
        }
        self.index = (self.index as isize + delta).rem_euclid(len as isize) as usize;
        Ok(&self.paths[self.index])
    }

    /// Remove the current image from the set and from disk via `remove`.
    ///
    /// When `remove` fails the path goes back in at the same index so the
    /// set is exactly as before. On success the index is reset to 0 if it
    /// ran off the end. Returns the deleted path.
    pub fn delete_current<F>(&mut self, remove: F) -> Result<PathBuf>
    where
        F: FnOnce(&Path) -> std::io::Result<()>,
    {
        if self.paths.is_empty() {
            return Err(Error::Empty);
        }

        let path = self.paths.remove(self.index);
        if let Err(source) = remove(&path) {
            self.paths.insert(self.index, path.clone());
            return Err(Error::Delete { path, source });
        }

        if self.index >= self.paths.len() {
            self.index = 0;
        }
        Ok(path)
    }
}

/// True if the path has one of the supported image extensions
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sample_set(n: usize) -> ImageSet {
        ImageSet::from_list((0..n).map(|i| PathBuf::from(format!("/img/{i:03}.png"))))
    }

    #[test]
    fn test_filters_extensions() {
        let set = ImageSet::from_list(vec![
            PathBuf::from("/a/one.PNG"),
            PathBuf::from("/a/two.jpeg"),
            PathBuf::from("/a/notes.txt"),
            PathBuf::from("/a/three.WebP"),
            PathBuf::from("/a/noext"),
        ]);
        assert_eq!(set.len(), 3);
        assert_eq!(set.current(), Some(Path::new("/a/one.PNG")));
    }

    #[test]
    fn test_next_wraps_around() {
        let mut set = sample_set(5);
        for _ in 0..5 {
            set.next().unwrap();
        }
        assert_eq!(set.index(), 0);
    }

    #[test]
    fn test_previous_then_next_is_identity() {
        let mut set = sample_set(3);
        set.next().unwrap();
        let before = set.index();
        set.previous().unwrap();
        set.next().unwrap();
        assert_eq!(set.index(), before);

        set.index = 0;
        assert_eq!(set.previous().unwrap(), Path::new("/img/002.png"));
    }

    #[test]
    fn test_empty_set_reports_no_images() {
        let mut set = ImageSet::default();
        assert!(matches!(set.next(), Err(Error::Empty)));
        assert!(matches!(set.previous(), Err(Error::Empty)));
        assert!(matches!(set.delete_current(|_| Ok(())), Err(Error::Empty)));
    }

    #[test]
    fn test_failed_delete_keeps_order() {
        let mut set = sample_set(4);
        set.next().unwrap();
        let before = set.clone();

        let result = set.delete_current(|_| {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "locked"))
        });

        assert!(matches!(result, Err(Error::Delete { .. })));
        assert_eq!(set, before);
    }

    #[test]
    fn test_delete_last_clamps_to_zero() {
        let mut set = sample_set(3);
        set.previous().unwrap(); // index 2
        let deleted = set.delete_current(|_| Ok(())).unwrap();
        assert_eq!(deleted, PathBuf::from("/img/002.png"));
        assert_eq!(set.len(), 2);
        assert_eq!(set.index(), 0);
    }

    #[test]
    fn test_delete_middle_keeps_index() {
        let mut set = sample_set(3);
        set.next().unwrap(); // index 1
        set.delete_current(|_| Ok(())).unwrap();
        assert_eq!(set.index(), 1);
        assert_eq!(set.current(), Some(Path::new("/img/002.png")));
    }

    #[test]
    fn test_from_folder_lists_top_level_images_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.jpg"), b"x").unwrap();
        fs::write(dir.path().join("a.png"), b"x").unwrap();
        fs::write(dir.path().join("c.txt"), b"x").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("d.png"), b"x").unwrap();

        let set = ImageSet::from_folder(dir.path()).unwrap();
        let names: Vec<_> = set
            .paths()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.png", "b.jpg"]);
    }

    #[test]
    fn test_from_missing_folder_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result = ImageSet::from_folder(&dir.path().join("missing"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_real_delete_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.png");
        fs::write(&path, b"x").unwrap();

        let mut set = ImageSet::from_folder(dir.path()).unwrap();
        set.delete_current(|p| fs::remove_file(p)).unwrap();
        assert!(set.is_empty());
        assert!(!path.exists());
    }
}
