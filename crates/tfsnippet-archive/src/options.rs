use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone)]
pub struct ExtractOptions {
    pub preserve_permissions: bool,
    pub on_progress: Option<Arc<dyn Fn(Progress) + Send + Sync>>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            preserve_permissions: true,
            on_progress: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Progress {
    pub entries_processed: usize,
    pub bytes_processed: u64,
    pub current_file: PathBuf,
}

impl ExtractOptions {
    pub fn preserve_permissions(mut self, preserve: bool) -> Self {
        self.preserve_permissions = preserve;
        self
    }

    pub fn on_progress(mut self, callback: Arc<dyn Fn(Progress) + Send + Sync>) -> Self {
        self.on_progress = Some(callback);
        self
    }
}

impl std::fmt::Debug for ExtractOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractOptions")
            .field("preserve_permissions", &self.preserve_permissions)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}
