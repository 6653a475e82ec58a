//! Checker seam: the engine that produces a `ThemeResult`, and the invoker
//! that picks directory or zip mode and classifies failures.

pub mod scan;

use crate::config::CheckConfiguration;
use crate::models::ThemeResult;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use scan::Scanner;

#[derive(Debug, Error)]
/// Failures raised by a checker entry point.
pub enum CheckError {
    #[error("{} is not a directory", .path.display())]
    NotADirectory { path: PathBuf },
    #[error("{} does not exist", .path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("rule catalog is invalid: {0}")]
    Catalog(String),
    #[error("theme scan was interrupted: {0}")]
    Join(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Coarse classification the invoker dispatches on.
pub enum FailureKind {
    NotADirectory,
    Other,
}

impl CheckError {
    pub fn kind(&self) -> FailureKind {
        match self {
            CheckError::NotADirectory { .. } => FailureKind::NotADirectory,
            CheckError::Io { source, .. } if source.kind() == io::ErrorKind::NotADirectory => {
                FailureKind::NotADirectory
            }
            _ => FailureKind::Other,
        }
    }
}

/// Theme checking engine with directory and zip entry points.
pub trait ThemeChecker {
    fn check(
        &self,
        path: &Path,
        cfg: &CheckConfiguration,
    ) -> impl Future<Output = Result<ThemeResult, CheckError>> + Send;

    fn check_zip(
        &self,
        path: &Path,
        cfg: &CheckConfiguration,
    ) -> impl Future<Output = Result<ThemeResult, CheckError>> + Send;
}

#[derive(Debug, Error)]
/// Why no report could be produced.
pub enum InvokeError {
    #[error("Err: ENOTDIR. Did you mean to add -z flag to read a zip file?")]
    ZipHint { path: PathBuf },
    #[error(transparent)]
    Check(#[from] CheckError),
}

/// Run the checker once in the requested mode.
///
/// A directory-mode failure on something that is not a directory becomes
/// `InvokeError::ZipHint`; every other failure is passed through unchanged.
pub async fn invoke<C: ThemeChecker>(
    checker: &C,
    path: &Path,
    as_zip: bool,
    cfg: &CheckConfiguration,
) -> Result<ThemeResult, InvokeError> {
    tracing::debug!(path = %path.display(), as_zip, version = cfg.check_version.as_str(), "invoking checker");
    if as_zip {
        return Ok(checker.check_zip(path, cfg).await?);
    }
    match checker.check(path, cfg).await {
        Ok(result) => Ok(result),
        Err(err) => match err.kind() {
            FailureKind::NotADirectory => Err(InvokeError::ZipHint {
                path: path.to_path_buf(),
            }),
            FailureKind::Other => Err(InvokeError::Check(err)),
        },
    }
}
