//! Built-in theme scanner driven by the rule catalog.
//!
//! Directory mode scans the path in place. Zip mode extracts the archive into
//! a temporary directory first and scans the folder holding `package.json`.

use super::{CheckError, ThemeChecker};
use crate::checks::{run_check, ThemeTree};
use crate::config::CheckConfiguration;
use crate::models::rules::Catalog;
use crate::models::{Finding, ThemeResult};
use glob::{glob, Pattern};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Checker backed by a rule catalog.
#[derive(Clone)]
pub struct Scanner {
    catalog: Arc<Catalog>,
}

impl Scanner {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }

    /// Scanner using the catalog shipped with the binary.
    pub fn builtin() -> Result<Self, CheckError> {
        Catalog::builtin()
            .map(Self::new)
            .map_err(|e| CheckError::Catalog(e.to_string()))
    }

    async fn run_blocking<F>(&self, job: F) -> Result<ThemeResult, CheckError>
    where
        F: FnOnce(&Catalog) -> Result<ThemeResult, CheckError> + Send + 'static,
    {
        let catalog = Arc::clone(&self.catalog);
        tokio::task::spawn_blocking(move || job(catalog.as_ref()))
            .await
            .map_err(|e| CheckError::Join(e.to_string()))?
    }
}

impl ThemeChecker for Scanner {
    async fn check(&self, path: &Path, cfg: &CheckConfiguration) -> Result<ThemeResult, CheckError> {
        let meta = tokio::fs::metadata(path).await.map_err(|e| io_error(path, e))?;
        if !meta.is_dir() {
            return Err(CheckError::NotADirectory {
                path: path.to_path_buf(),
            });
        }
        let root = path.to_path_buf();
        let cfg = *cfg;
        self.run_blocking(move |catalog| scan_tree(catalog, &root, &cfg))
            .await
    }

    async fn check_zip(
        &self,
        path: &Path,
        cfg: &CheckConfiguration,
    ) -> Result<ThemeResult, CheckError> {
        let archive = path.to_path_buf();
        let cfg = *cfg;
        self.run_blocking(move |catalog| {
            let tmp = tempfile::Builder::new()
                .prefix("themecheck-")
                .tempdir()
                .map_err(|e| io_error(&archive, e))?;
            extract_zip(&archive, tmp.path())?;
            let root = locate_theme_root(tmp.path());
            tracing::debug!(root = %root.display(), "extracted theme archive");
            scan_tree(catalog, &root, &cfg)
        })
        .await
    }
}

fn io_error(path: &Path, source: io::Error) -> CheckError {
    if source.kind() == io::ErrorKind::NotFound {
        CheckError::NotFound {
            path: path.to_path_buf(),
        }
    } else {
        CheckError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Run every applicable rule against `root`, in catalog order.
pub fn scan_tree(
    catalog: &Catalog,
    root: &Path,
    cfg: &CheckConfiguration,
) -> Result<ThemeResult, CheckError> {
    let tree = ThemeTree::load(root);
    let mut result = ThemeResult::new(cfg.check_version.ghost_version());
    for rule in catalog.for_version(cfg.check_version) {
        let failures = run_check(&rule.check, &tree)
            .map_err(|e| CheckError::Catalog(format!("{}: {}", rule.code, e)))?;
        tracing::debug!(code = %rule.code, failures = failures.len(), "rule evaluated");
        if failures.is_empty() {
            result.results.pass.push(rule.code.clone());
            continue;
        }
        result.results.push(Finding {
            code: rule.code.clone(),
            rule: rule.rule.clone(),
            level: rule.level,
            details: rule.details.clone(),
            failures,
            fatal: rule.fatal,
        });
    }
    Ok(result)
}

/// Extract `archive` under `dest`, refusing entries that escape it.
pub fn extract_zip(archive: &Path, dest: &Path) -> Result<(), CheckError> {
    let file = fs::File::open(archive).map_err(|e| io_error(archive, e))?;
    let mut zip = zip::ZipArchive::new(file)?;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let Some(rel) = entry.enclosed_name().map(Path::to_path_buf) else {
            tracing::warn!(name = entry.name(), "skipping zip entry outside the archive root");
            continue;
        };
        let out = dest.join(&rel);
        if entry.is_dir() {
            fs::create_dir_all(&out).map_err(|e| io_error(&out, e))?;
            continue;
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        let mut f = fs::File::create(&out).map_err(|e| io_error(&out, e))?;
        io::copy(&mut entry, &mut f).map_err(|e| io_error(&out, e))?;
    }
    Ok(())
}

/// Shallowest directory under `extracted` holding a `package.json`.
pub fn locate_theme_root(extracted: &Path) -> PathBuf {
    let base = Pattern::escape(&extracted.to_string_lossy());
    let pattern = Path::new(&base).join("**").join("package.json");
    let found = glob(&pattern.to_string_lossy())
        .ok()
        .into_iter()
        .flatten()
        .filter_map(Result::ok)
        .filter(|p| {
            !p.components()
                .any(|c| c.as_os_str() == "node_modules" || c.as_os_str() == "__MACOSX")
        })
        .min_by_key(|p| (p.components().count(), p.clone()));
    found
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| extracted.to_path_buf())
}
