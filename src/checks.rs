//! Evaluation of catalog checks against an extracted theme tree.
//!
//! Every check returns the list of failures it found; an empty list means
//! the rule passed.

use crate::models::rules::Check;
use crate::models::FailureRef;
use glob::{glob, Pattern};
use rayon::prelude::*;
use regex::Regex;
use serde_json::Value as Json;
use std::fs;
use std::path::{Path, PathBuf};

/// Theme files loaded once per scan and shared by all checks.
pub struct ThemeTree {
    pub root: PathBuf,
    package: Option<Result<Json, String>>,
}

impl ThemeTree {
    pub fn load(root: &Path) -> Self {
        let pj = root.join("package.json");
        let package = if pj.is_file() {
            Some(
                fs::read_to_string(&pj)
                    .map_err(|e| e.to_string())
                    .and_then(|s| serde_json::from_str(&s).map_err(|e| e.to_string())),
            )
        } else {
            None
        };
        Self {
            root: root.to_path_buf(),
            package,
        }
    }

    fn relative(&self, path: &Path) -> String {
        pathdiff::diff_paths(path, &self.root)
            .unwrap_or_else(|| path.to_path_buf())
            .to_string_lossy()
            .replace('\\', "/")
    }

    /// Files under the theme root matching `pattern`, sorted, skipping
    /// dependency folders. Only `pattern` is treated as a glob; the root is
    /// matched literally.
    fn files(&self, pattern: &str) -> Vec<PathBuf> {
        let base = Pattern::escape(&self.root.to_string_lossy());
        let abs = Path::new(&base).join(pattern).to_string_lossy().to_string();
        let mut out: Vec<PathBuf> = match glob(&abs) {
            Ok(paths) => paths
                .filter_map(Result::ok)
                .filter(|p| p.is_file())
                .filter(|p| {
                    !p.strip_prefix(&self.root)
                        .map(|rel| rel.components().any(|c| c.as_os_str() == "node_modules"))
                        .unwrap_or(false)
                })
                .collect(),
            Err(e) => {
                tracing::warn!(pattern, error = %e, "bad glob pattern in rule catalog");
                Vec::new()
            }
        };
        out.sort();
        out
    }
}

/// Evaluate one check. `Err` carries a catalog problem (bad regex).
pub fn run_check(check: &Check, tree: &ThemeTree) -> Result<Vec<FailureRef>, String> {
    match check {
        Check::RequiredFile { path } => {
            if tree.root.join(path).is_file() {
                Ok(vec![])
            } else {
                Ok(vec![FailureRef::new(path.clone(), "")])
            }
        }
        Check::PackageField { field, pattern } => {
            let re = pattern.as_deref().map(compile).transpose()?;
            Ok(check_package_field(tree, field, re.as_ref()))
        }
        Check::TemplateMatch { files, regex } => {
            let re = compile(regex)?;
            let hits: Vec<FailureRef> = tree
                .files(files)
                .par_iter()
                .filter_map(|p| {
                    let text = fs::read_to_string(p).ok()?;
                    let m = re.find(&text)?;
                    Some(FailureRef::new(tree.relative(p), first_line(m.as_str())))
                })
                .collect();
            Ok(hits)
        }
        Check::TemplateMissing { files, regex } => {
            let re = compile(regex)?;
            let found = tree.files(files).par_iter().any(|p| {
                fs::read_to_string(p)
                    .map(|text| re.is_match(&text))
                    .unwrap_or(false)
            });
            if found {
                Ok(vec![])
            } else {
                Ok(vec![FailureRef::new(files.clone(), "")])
            }
        }
    }
}

fn compile(pattern: &str) -> Result<Regex, String> {
    Regex::new(pattern).map_err(|e| format!("invalid regex '{pattern}': {e}"))
}

fn first_line(s: &str) -> String {
    s.lines().next().unwrap_or("").trim().to_string()
}

fn check_package_field(tree: &ThemeTree, field: &str, pattern: Option<&Regex>) -> Vec<FailureRef> {
    let fail = |msg: String| vec![FailureRef::new("package.json", msg)];
    let pkg = match &tree.package {
        None => return fail("package.json is missing".into()),
        Some(Err(e)) => return fail(format!("package.json could not be parsed: {e}")),
        Some(Ok(v)) => v,
    };
    let Some(value) = lookup(pkg, field) else {
        return fail(format!("`{field}` is missing"));
    };
    let text = match value {
        Json::String(s) => s.clone(),
        Json::Number(n) => n.to_string(),
        Json::Bool(b) => b.to_string(),
        Json::Null => return fail(format!("`{field}` is missing")),
        _ => {
            return if pattern.is_some() {
                fail(format!("`{field}` must be a string"))
            } else {
                vec![]
            }
        }
    };
    match pattern {
        Some(re) if !re.is_match(&text) => fail(format!("`{field}` has invalid value \"{text}\"")),
        _ => vec![],
    }
}

/// Follow a dotted path (`author.email`) into a JSON value.
pub fn lookup<'a>(v: &'a Json, path: &str) -> Option<&'a Json> {
    path.split('.').try_fold(v, |cur, key| cur.get(key))
}
