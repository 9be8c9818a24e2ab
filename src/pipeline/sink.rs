//! Where retrieved bodies end up

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Upper bound on " (n)" suffixes tried for one name
const MAX_NAME_ATTEMPTS: usize = 1000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedFile {
    /// Name the body was stored under, which may differ from the requested one
    pub file_name: String,
    pub path: Option<PathBuf>,
    pub media_type: String,
    pub size: usize,
}

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("could not write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no free file name for \"{0}\"")]
    NameExhausted(String),

    #[error("{0}")]
    Rejected(String),
}

/// Persists one retrieved body under a file name
pub trait Sink {
    fn save(
        &self,
        file_name: &str,
        media_type: &str,
        data: &[u8],
    ) -> impl Future<Output = Result<SavedFile, SaveError>> + Send;
}

/// `name.ext` for attempt 0, `name (n).ext` afterwards
pub fn numbered_file_name(file_name: &str, attempt: usize) -> String {
    if attempt == 0 {
        return file_name.to_string();
    }

    match file_name.rfind('.') {
        Some(dot) if dot > 0 => format!(
            "{} ({}){}",
            &file_name[..dot],
            attempt,
            &file_name[dot..]
        ),
        _ => format!("{} ({})", file_name, attempt),
    }
}

/// Writes into a directory without ever overwriting an existing file
#[derive(Clone, Debug)]
pub struct FsSink {
    dir: PathBuf,
}

impl FsSink {
    pub fn new(dir: impl Into<PathBuf>) -> FsSink {
        FsSink { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Sink for FsSink {
    async fn save(
        &self,
        file_name: &str,
        media_type: &str,
        data: &[u8],
    ) -> Result<SavedFile, SaveError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| SaveError::Io {
                path: self.dir.display().to_string(),
                source,
            })?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let candidate = numbered_file_name(file_name, attempt);
            let path = self.dir.join(&candidate);
            let io_error = |source| SaveError::Io {
                path: path.display().to_string(),
                source,
            };

            let file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(io_error(e)),
            };

            write_or_remove(file, &path, data).await.map_err(io_error)?;

            tracing::debug!("wrote {} bytes to {}", data.len(), path.display());

            return Ok(SavedFile {
                file_name: candidate,
                media_type: media_type.to_string(),
                size: data.len(),
                path: Some(path),
            });
        }

        Err(SaveError::NameExhausted(file_name.to_string()))
    }
}

/// Writes `data` into a freshly created file, removing the file again if the write fails
async fn write_or_remove<W>(mut writer: W, path: &Path, data: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let written = match writer.write_all(data).await {
        Ok(()) => writer.flush().await,
        Err(e) => Err(e),
    };

    if let Err(e) = written {
        drop(writer);
        if let Err(remove_error) = tokio::fs::remove_file(path).await {
            tracing::warn!("cannot remove partial file {}: {}", path.display(), remove_error);
        }
        return Err(e);
    }

    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryFile {
    pub file_name: String,
    pub media_type: String,
    pub data: Vec<u8>,
}

/// Keeps saved bodies in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<Vec<MemoryFile>>,
}

impl MemorySink {
    pub fn new() -> MemorySink {
        MemorySink::default()
    }

    /// Saved files in the order they were stored
    pub fn files(&self) -> Vec<MemoryFile> {
        match self.files.lock() {
            Ok(files) => files.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn get(&self, file_name: &str) -> Option<MemoryFile> {
        self.files()
            .into_iter()
            .find(|file| file.file_name == file_name)
    }
}

impl Sink for MemorySink {
    async fn save(
        &self,
        file_name: &str,
        media_type: &str,
        data: &[u8],
    ) -> Result<SavedFile, SaveError> {
        let mut files = self
            .files
            .lock()
            .map_err(|_| SaveError::Rejected("memory sink is poisoned".to_string()))?;

        let stored_name = (0..MAX_NAME_ATTEMPTS)
            .map(|attempt| numbered_file_name(file_name, attempt))
            .find(|candidate| !files.iter().any(|file| &file.file_name == candidate))
            .ok_or_else(|| SaveError::NameExhausted(file_name.to_string()))?;

        files.push(MemoryFile {
            file_name: stored_name.clone(),
            media_type: media_type.to_string(),
            data: data.to_vec(),
        });

        Ok(SavedFile {
            file_name: stored_name,
            path: None,
            media_type: media_type.to_string(),
            size: data.len(),
        })
    }
}
