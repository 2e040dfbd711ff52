//! Upload destinations for exported images.

use crate::AppResult;
use crate::panel::Attachment;
use std::fs;
use std::path::{Path, PathBuf};

/// Destination an exported attachment is handed to.
pub trait Uploader {
    fn upload(&mut self, attachment: &Attachment) -> AppResult<()>;
}

/// Keeps uploaded attachments in memory.
#[derive(Debug, Default)]
pub struct MemoryUploader {
    attachments: Vec<Attachment>,
}

impl MemoryUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }
}

impl Uploader for MemoryUploader {
    fn upload(&mut self, attachment: &Attachment) -> AppResult<()> {
        self.attachments.push(attachment.clone());
        Ok(())
    }
}

/// Writes attachments as files into a directory.
///
/// A file name that is already taken gets a numeric suffix, so repeated
/// uploads of `paint.png` produce `paint.png`, `paint-1.png`, ...
#[derive(Debug)]
pub struct DirectoryUploader {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectoryUploader {
    /// Creates the directory if it doesn't exist.
    pub fn new(dir: impl Into<PathBuf>) -> AppResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            written: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, in upload order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn target_path(&self, file_name: &str) -> PathBuf {
        let safe_name: String = file_name
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let (stem, extension) = match safe_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), format!(".{}", ext)),
            _ => (safe_name.clone(), String::new()),
        };

        let mut path = self.dir.join(&safe_name);
        let mut n = 1;
        while path.exists() {
            path = self.dir.join(format!("{}-{}{}", stem, n, extension));
            n += 1;
        }
        path
    }
}

impl Uploader for DirectoryUploader {
    fn upload(&mut self, attachment: &Attachment) -> AppResult<()> {
        let path = self.target_path(&attachment.file_name);
        fs::write(&path, &attachment.bytes)?;
        log::debug!("Wrote {} ({} bytes)", path.display(), attachment.bytes.len());
        self.written.push(path);
        Ok(())
    }
}
