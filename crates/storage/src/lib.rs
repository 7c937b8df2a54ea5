use std::{
    io,
    num::ParseIntError,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access counter file '{}': {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("counter file '{}' holds {contents:?}, not an integer: {source}", path.display())]
    Parse {
        path: PathBuf,
        contents: String,
        source: ParseIntError,
    },
}

/// How the startup value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// The file held a valid count.
    Restored,
    /// No file existed; a fresh `0` was written (or attempted).
    Created,
    /// The file exists but could not be read; left as is.
    Unreadable,
    /// The file exists but is not an integer; left as is until the next save.
    Corrupt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedCount {
    pub subs: i64,
    pub source: LoadSource,
}

impl LoadedCount {
    fn fresh(source: LoadSource) -> Self {
        Self { subs: 0, source }
    }
}

/// Durable home of the subscription counter.
///
/// `load` never fails: anything short of a valid stored count starts the
/// process at zero, logging why.
#[async_trait]
pub trait CounterStore: Send + Sync {
    async fn load(&self) -> LoadedCount;
    async fn save(&self, subs: i64) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: CounterStore + ?Sized> CounterStore for Arc<T> {
    async fn load(&self) -> LoadedCount {
        (**self).load().await
    }

    async fn save(&self, subs: i64) -> Result<(), StoreError> {
        (**self).save(subs).await
    }
}

/// Stores the counter as bare decimal ASCII, no trailing newline, rewriting
/// the whole file on every save.
#[derive(Debug, Clone)]
pub struct FileCounterStore {
    path: PathBuf,
}

impl FileCounterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Strict read used by operator tooling: missing or malformed files are
    /// errors instead of a silent zero.
    pub async fn read(&self) -> Result<i64, StoreError> {
        let contents = self.read_contents().await?;
        contents.parse::<i64>().map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            contents,
            source,
        })
    }

    async fn read_contents(&self) -> Result<String, StoreError> {
        let raw = fs::read(&self.path).await.map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }
}

#[async_trait]
impl CounterStore for FileCounterStore {
    async fn load(&self) -> LoadedCount {
        let output_file = self.path.display().to_string();

        let contents = match self.read_contents().await {
            Ok(contents) => contents,
            Err(StoreError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                return match self.save(0).await {
                    Ok(()) => {
                        info!(%output_file, "previous subcount not found, starting at 0, saved new file");
                        LoadedCount::fresh(LoadSource::Created)
                    }
                    Err(error) => {
                        warn!(%output_file, %error, "previous subcount not found and new file could not be saved, starting at 0");
                        LoadedCount::fresh(LoadSource::Created)
                    }
                };
            }
            Err(error) => {
                warn!(%output_file, %error, "failed to read file, ignoring, starting at 0");
                return LoadedCount::fresh(LoadSource::Unreadable);
            }
        };

        match contents.parse::<i64>() {
            Ok(subs) => {
                info!(subcount = subs, "loaded previous subcount");
                LoadedCount {
                    subs,
                    source: LoadSource::Restored,
                }
            }
            Err(error) => {
                warn!(%output_file, %error, contents = ?contents, "failed to parse previous subcount, ignoring, starting at 0");
                LoadedCount::fresh(LoadSource::Corrupt)
            }
        }
    }

    async fn save(&self, subs: i64) -> Result<(), StoreError> {
        fs::write(&self.path, subs.to_string())
            .await
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
