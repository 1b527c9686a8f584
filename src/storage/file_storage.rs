use crate::{
    error::Result,
    storage::{validate_key, KeyValueStorage},
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-based storage, one file per key under `<project>/.kanban/`
pub struct FileStorage {
    root_path: PathBuf,
}

impl FileStorage {
    const KANBAN_DIR: &'static str = ".kanban";
    const ITEM_EXTENSION: &'static str = "item";

    /// Creates a new FileStorage instance for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::KANBAN_DIR),
        }
    }

    /// Directory holding the item files
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Checks whether anything has been written yet
    pub async fn is_initialized(&self) -> bool {
        fs::metadata(&self.root_path).await.is_ok()
    }

    fn item_file(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self
            .root_path
            .join(format!("{}.{}", key, Self::ITEM_EXTENSION)))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if fs::metadata(path).await.is_err() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let file_path = self.item_file(key)?;

        match fs::read_to_string(&file_path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let file_path = self.item_file(key)?;
        self.ensure_directory_exists(&self.root_path).await?;

        // Write then rename so readers never see a half-written value
        let tmp_path = file_path.with_extension("tmp");
        fs::write(&tmp_path, value).await?;
        fs::rename(&tmp_path, &file_path).await?;

        tracing::trace!(key, path = %file_path.display(), "wrote storage item");
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let file_path = self.item_file(key)?;

        match fs::remove_file(&file_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
