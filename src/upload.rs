use std::{
    io,
    path::{Path, PathBuf},
};

/// Web-relative directory holding post covers.
pub const COVER_UPLOAD_PATH: &str = "uploads/covers";

/// Public document root, relative to the project root.
pub const WEB_DIR: &str = "web";

/// Largest accepted cover upload, in bytes.
pub const MAX_COVER_BYTES: u64 = 1_000_000;

/// A file received during the current request and already sitting in a
/// temporary location on disk. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    path: PathBuf,
    client_original_name: String,
    size: u64,
}

impl UploadedFile {
    pub fn new(path: impl Into<PathBuf>, client_original_name: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            client_original_name: client_original_name.into(),
            size,
        }
    }

    /// Builds a handle for a file already on disk, taking its size from the
    /// filesystem.
    pub async fn from_path(
        path: impl Into<PathBuf>,
        client_original_name: impl Into<String>,
    ) -> crate::Result<Self> {
        let path = path.into();
        let size = tokio::fs::metadata(&path).await?.len();
        Ok(Self::new(path, client_original_name, size))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// The name the client sent, reduced to its final path component.
    pub fn client_original_name(&self) -> &str {
        self.client_original_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
    }

    /// Moves the file into `dir` under `name`, creating `dir` when missing.
    /// An existing file with the same name is replaced.
    pub async fn move_to(&self, dir: &Path, name: &str) -> crate::Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let target = dir.join(name);

        match tokio::fs::rename(&self.path, &target).await {
            Ok(()) => {}
            Err(e) if is_cross_device(&e) => {
                tokio::fs::copy(&self.path, &target).await?;
                tokio::fs::remove_file(&self.path).await?;
            }
            Err(e) => return Err(e.into()),
        }

        Ok(target)
    }
}

/// `EXDEV` on Linux, macOS and the BSDs.
#[cfg(unix)]
const CROSS_DEVICE_ERRNO: i32 = 18;

/// `ERROR_NOT_SAME_DEVICE`.
#[cfg(windows)]
const CROSS_DEVICE_ERRNO: i32 = 17;

#[cfg(any(unix, windows))]
fn is_cross_device(e: &io::Error) -> bool {
    e.raw_os_error() == Some(CROSS_DEVICE_ERRNO)
}

#[cfg(not(any(unix, windows)))]
fn is_cross_device(_e: &io::Error) -> bool {
    false
}

/// Resolves where covers live on disk and on the web.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverStorage {
    project_root: PathBuf,
}

impl CoverStorage {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    pub fn absolute_dir(&self) -> PathBuf {
        self.project_root.join(WEB_DIR).join(COVER_UPLOAD_PATH)
    }

    pub fn web_path(&self, filename: &str) -> String {
        format!("{}/{}", COVER_UPLOAD_PATH, filename)
    }

    pub fn absolute_path(&self, filename: &str) -> PathBuf {
        self.absolute_dir().join(filename)
    }

    pub async fn ensure_dir(&self) -> crate::Result<()> {
        tokio::fs::create_dir_all(self.absolute_dir()).await?;
        Ok(())
    }
}
