use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::data::{ImageEntry, ScanMode};
use crate::error::Result;

/// The Library is the folder currently being browsed.
/// It lists the image files directly inside it (no recursion),
/// filtered by the extensions of the active scan mode.
#[derive(Debug, Clone, Default)]
pub struct Library {
    folder: Option<PathBuf>,
    entries: Vec<ImageEntry>,
}

impl Library {
    /// List the images in `folder`, sorted by filename.
    ///
    /// Fails only when the folder itself cannot be read; unreadable
    /// entries inside it are skipped.
    pub fn open(folder: &Path, mode: ScanMode) -> Result<Self> {
        let mut entries = Vec::new();

        for entry in WalkDir::new(folder)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => return Err(std::io::Error::from(err).into()),
                Err(err) => {
                    log::warn!("Skipping unreadable entry: {}", err);
                    continue;
                }
            };

            let path = entry.path();
            if entry.depth() == 0 || !path.is_file() || !mode.accepts(path) {
                continue;
            }

            let filename = path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();

            entries.push(ImageEntry {
                filename,
                path: path.to_path_buf(),
            });
        }

        log::info!("Listed {} images in {}", entries.len(), folder.display());

        Ok(Library {
            folder: Some(folder.to_path_buf()),
            entries,
        })
    }

    /// Re-list the same folder, e.g. after the scan mode changed
    pub fn reopen(&self, mode: ScanMode) -> Result<Self> {
        match &self.folder {
            Some(folder) => Self::open(folder, mode),
            None => Ok(Self::default()),
        }
    }

    pub fn folder(&self) -> Option<&Path> {
        self.folder.as_deref()
    }

    pub fn entries(&self) -> &[ImageEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&ImageEntry> {
        self.entries.get(index)
    }

    /// Full paths of every listed image, in display order
    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries.iter().map(|entry| entry.path.clone()).collect()
    }
}
