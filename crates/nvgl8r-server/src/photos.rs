use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{Result, anyhow};
use tokio::fs;
use tracing::{info, warn};

/// Bounded set of uploaded photos on disk.
///
/// Position 0 is the newest photo. Once `max_photos` is reached, each new
/// upload evicts and deletes the oldest file.
pub struct PhotoStore {
    dir: PathBuf,
    max_photos: usize,
    photos: Mutex<VecDeque<String>>,
}

impl PhotoStore {
    pub fn new(dir: PathBuf, max_photos: usize) -> Self {
        Self {
            dir,
            max_photos,
            photos: Mutex::new(VecDeque::with_capacity(max_photos)),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    fn lock(&self) -> Result<MutexGuard<'_, VecDeque<String>>> {
        self.photos
            .lock()
            .map_err(|e| anyhow!("photo list lock poisoned: {}", e))
    }

    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;
        info!("Photo directory: {}", self.dir.display());
        Ok(())
    }

    /// Record `filename` as the newest photo, deleting the oldest one if full.
    pub async fn rotate(&self, filename: String) -> Result<()> {
        let evicted = {
            let mut photos = self.lock()?;
            // Same-second uploads reuse the name; the file was overwritten in place.
            if photos.front() == Some(&filename) {
                return Ok(());
            }
            let evicted = if photos.len() >= self.max_photos {
                photos.pop_back()
            } else {
                None
            };
            photos.push_front(filename);
            evicted
        };

        if let Some(oldest) = evicted {
            let path = self.path_for(&oldest);
            info!("Deleting oldest photo: {}", path.display());
            if let Err(e) = fs::remove_file(&path).await {
                warn!("Failed to remove oldest photo {}: {}", oldest, e);
            }
        }
        Ok(())
    }

    /// Path of the photo at `pos` (0 = newest), if there is one.
    pub fn get(&self, pos: i64) -> Result<Option<PathBuf>> {
        let photos = self.lock()?;
        let entry = usize::try_from(pos).ok().and_then(|i| photos.get(i));
        Ok(entry.map(|name| self.path_for(name)))
    }

    pub fn list(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.iter().cloned().collect())
    }

    /// Delete every `.jpg` in the photo directory and forget all photos.
    /// Returns the number of files removed.
    pub async fn cleanup(&self) -> Result<usize> {
        let mut removed = 0;
        if fs::try_exists(&self.dir).await? {
            let mut entries = fs::read_dir(&self.dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "jpg") {
                    match fs::remove_file(&path).await {
                        Ok(()) => removed += 1,
                        Err(e) => warn!("Error removing photo {}: {}", path.display(), e),
                    }
                }
            }
        }

        self.lock()?.clear();
        if removed > 0 {
            info!("Cleanup: removed {} photos", removed);
        }
        Ok(removed)
    }
}
