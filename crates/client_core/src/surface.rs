//! The pieces of user interface the classify handler reads from and writes to.
//!
//! The handler never looks these up itself; callers hand them over at
//! construction time, which lets tests and the CLI supply their own.

use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use shared::domain::ImageUpload;

use crate::error::ClassifyError;

pub type SelectedFile = ImageUpload;

/// A file-picking control. Yields the file selected at trigger time, if any.
pub trait FileInput: Send + Sync {
    fn selected_file(&self) -> Option<SelectedFile>;
}

/// A display region whose markup is replaced wholesale on every write.
pub trait OutputRegion: Send + Sync {
    fn replace(&self, markup: &str);
}

/// Blocking, user-visible warning channel.
pub trait Alert: Send + Sync {
    fn alert(&self, message: &str);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory file picker holding zero or one selected file.
#[derive(Clone, Default)]
pub struct FileSlot {
    selected: Arc<Mutex<Option<SelectedFile>>>,
}

impl FileSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&self, file: SelectedFile) {
        *lock(&self.selected) = Some(file);
    }

    pub fn clear(&self) {
        *lock(&self.selected) = None;
    }

    /// Reads `path` from disk and selects it, guessing the content type from
    /// the extension.
    pub async fn select_path(&self, path: &Path) -> Result<(), ClassifyError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ClassifyError::ReadFile {
                path: path.to_path_buf(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let mime_type = mime_guess::from_path(path)
            .first_raw()
            .map(str::to_string);

        self.select(SelectedFile::new(file_name, mime_type, bytes));
        Ok(())
    }
}

impl FileInput for FileSlot {
    fn selected_file(&self) -> Option<SelectedFile> {
        lock(&self.selected).clone()
    }
}

/// Output region kept in memory; counts writes so callers can tell whether
/// it was ever touched.
#[derive(Clone, Default)]
pub struct MemoryRegion {
    state: Arc<Mutex<RegionState>>,
}

#[derive(Default)]
struct RegionState {
    markup: String,
    writes: usize,
}

impl MemoryRegion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markup(&self) -> String {
        lock(&self.state).markup.clone()
    }

    pub fn write_count(&self) -> usize {
        lock(&self.state).writes
    }
}

impl OutputRegion for MemoryRegion {
    fn replace(&self, markup: &str) {
        let mut state = lock(&self.state);
        state.markup = markup.to_string();
        state.writes += 1;
    }
}

/// Alert channel that remembers every message shown.
#[derive(Clone, Default)]
pub struct RecordedAlerts {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordedAlerts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        lock(&self.messages).clone()
    }
}

impl Alert for RecordedAlerts {
    fn alert(&self, message: &str) {
        lock(&self.messages).push(message.to_string());
    }
}
