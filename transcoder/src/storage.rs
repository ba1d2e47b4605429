//! Video file storage.

use std::path::{Component, Path, PathBuf};

use shoutout_core::BoxFuture;

use crate::error::TranscodeError;

/// Sub-directory holding transcoded files, next to the raw upload.
pub const TRANSCODED_DIR: &str = "mp4";

/// Storage key of the MP4 produced from `original`.
///
/// `orders/talent-1/order-x/viggio-para-ana.mov` becomes
/// `orders/talent-1/order-x/mp4/viggio-para-ana.mp4`.
#[must_use]
pub fn transcoded_key(original: &str) -> String {
    let (dir, file) = original.rsplit_once('/').unwrap_or(("", original));
    let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);
    let dir = if dir == TRANSCODED_DIR {
        ""
    } else {
        dir.strip_suffix("/mp4").unwrap_or(dir)
    };
    if dir.is_empty() {
        format!("{TRANSCODED_DIR}/{stem}.mp4")
    } else {
        format!("{dir}/{TRANSCODED_DIR}/{stem}.mp4")
    }
}

/// Where uploaded and transcoded videos live.
pub trait VideoStorage: Send + Sync {
    /// Copies the object at `key` to a local file.
    fn fetch<'a>(&'a self, key: &'a str, destination: &'a Path) -> BoxFuture<'a, Result<(), TranscodeError>>;

    /// Uploads a local file to `key`, replacing any existing object.
    fn store<'a>(&'a self, source: &'a Path, key: &'a str) -> BoxFuture<'a, Result<(), TranscodeError>>;

    /// Removes the object at `key`. Missing objects are not an error.
    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), TranscodeError>>;

    /// Asks browsers to download rather than play the object. Backends that
    /// cannot store response headers leave this as a no-op.
    fn mark_as_attachment<'a>(&'a self, _key: &'a str) -> BoxFuture<'a, Result<(), TranscodeError>> {
        Box::pin(async { Ok(()) })
    }
}

/// [`VideoStorage`] on the local filesystem under a media root.
#[derive(Debug, Clone)]
pub struct LocalVideoStorage {
    root: PathBuf,
}

impl LocalVideoStorage {
    /// Storage rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute path of `key`.
    ///
    /// # Errors
    ///
    /// [`TranscodeError::Storage`] if the key escapes the root.
    pub fn path_of(&self, key: &str) -> Result<PathBuf, TranscodeError> {
        let relative = Path::new(key);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(TranscodeError::Storage(format!("invalid storage key {key}")));
        }
        Ok(self.root.join(relative))
    }
}

impl VideoStorage for LocalVideoStorage {
    fn fetch<'a>(&'a self, key: &'a str, destination: &'a Path) -> BoxFuture<'a, Result<(), TranscodeError>> {
        Box::pin(async move {
            tokio::fs::copy(self.path_of(key)?, destination).await?;
            Ok(())
        })
    }

    fn store<'a>(&'a self, source: &'a Path, key: &'a str) -> BoxFuture<'a, Result<(), TranscodeError>> {
        Box::pin(async move {
            let target = self.path_of(key)?;
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::copy(source, &target).await?;
            Ok(())
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), TranscodeError>> {
        Box::pin(async move {
            match tokio::fs::remove_file(self.path_of(key)?).await {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            }
        })
    }
}
