//! Post-processing of raw check results.
//!
//! `postprocess` is the bridge the report runs first: it calls a
//! `ResultFormatter` and, if that fails, logs the failure and keeps the
//! unformatted result so a report is still produced.
//!
//! `CatalogFormatter` is the built-in formatter. It validates bucket
//! placement, normalizes whitespace, sorts and dedupes failures, and applies
//! fatal-only filtering.

use crate::config::CheckConfiguration;
use crate::models::{Finding, Severity, ThemeResult};
use crate::output::Palette;
use crate::utils::styled_error_prefix;
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("finding {code} has level {level} but was filed under {bucket}")]
    MisplacedFinding {
        code: String,
        bucket: Severity,
        level: Severity,
    },
    #[error("finding {code} has no rule text")]
    MissingRule { code: String },
}

/// Normalizes a raw `ThemeResult`. Must not modify anything on failure.
pub trait ResultFormatter {
    fn format(
        &self,
        result: &ThemeResult,
        cfg: &CheckConfiguration,
    ) -> Result<ThemeResult, FormatError>;
}

/// Run `formatter`, falling back to the unformatted result on failure.
///
/// The failure is written to `err` as two lines: a fixed notice and the
/// underlying error.
pub fn postprocess<F: ResultFormatter, E: Write>(
    formatter: &F,
    result: ThemeResult,
    cfg: &CheckConfiguration,
    palette: &Palette,
    err: &mut E,
) -> io::Result<ThemeResult> {
    match formatter.format(&result, cfg) {
        Ok(formatted) => Ok(formatted),
        Err(e) => {
            tracing::debug!(error = %e, "format step failed; using unformatted results");
            let prefix = styled_error_prefix(palette.is_color());
            writeln!(err, "{prefix} Error formatting result, some results may be missing.")?;
            writeln!(err, "{prefix} {e}")?;
            Ok(result)
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogFormatter;

impl ResultFormatter for CatalogFormatter {
    fn format(
        &self,
        result: &ThemeResult,
        cfg: &CheckConfiguration,
    ) -> Result<ThemeResult, FormatError> {
        let mut out = result.clone();
        for bucket in [
            Severity::Error,
            Severity::Warning,
            Severity::Recommendation,
            Severity::Feature,
        ] {
            for finding in out.results.bucket_mut(bucket).iter_mut() {
                if finding.level != bucket {
                    return Err(FormatError::MisplacedFinding {
                        code: finding.code.clone(),
                        bucket,
                        level: finding.level,
                    });
                }
                normalize(finding)?;
            }
        }

        if cfg.only_fatal_errors {
            out.results.error.retain(|f| f.fatal);
            out.results.warning.clear();
            out.results.recommendation.clear();
        }
        out.formatted = true;
        Ok(out)
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize(finding: &mut Finding) -> Result<(), FormatError> {
    finding.rule = collapse_whitespace(&finding.rule);
    if finding.rule.is_empty() {
        return Err(FormatError::MissingRule {
            code: finding.code.clone(),
        });
    }
    finding.details = collapse_whitespace(&finding.details);
    finding
        .failures
        .sort_by(|a, b| a.reference.cmp(&b.reference).then_with(|| a.message.cmp(&b.message)));
    finding.failures.dedup();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CheckVersion, VersionFlags};
    use crate::models::FailureRef;

    fn finding(code: &str, level: Severity, fatal: bool) -> Finding {
        Finding {
            code: code.into(),
            rule: format!("Rule  {code}\n  wrapped"),
            level,
            details: "line one\nline two  ".into(),
            failures: vec![
                FailureRef::new("post.hbs", "x"),
                FailureRef::new("index.hbs", "y"),
                FailureRef::new("post.hbs", "x"),
            ],
            fatal,
        }
    }

    fn cfg(fatal: bool) -> CheckConfiguration {
        CheckConfiguration::resolve(&VersionFlags::default(), false, fatal)
    }

    fn sample() -> ThemeResult {
        let mut r = ThemeResult::new(CheckVersion::Latest.ghost_version());
        r.results.push(finding("E1", Severity::Error, true));
        r.results.push(finding("E2", Severity::Error, false));
        r.results.push(finding("W1", Severity::Warning, false));
        r.results.push(finding("R1", Severity::Recommendation, false));
        r.results.push(finding("F1", Severity::Feature, false));
        r
    }

    #[test]
    fn test_normalizes_text_and_failures() {
        let out = CatalogFormatter.format(&sample(), &cfg(false)).unwrap();
        assert!(out.formatted);
        let e1 = &out.results.error[0];
        assert_eq!(e1.rule, "Rule E1 wrapped");
        assert_eq!(e1.details, "line one line two");
        let refs: Vec<&str> = e1.failures.iter().map(|f| f.reference.as_str()).collect();
        assert_eq!(refs, vec!["index.hbs", "post.hbs"]);
        assert_eq!(out.results.error.len(), 2);
    }

    #[test]
    fn test_fatal_only_keeps_fatal_errors_and_features() {
        let out = CatalogFormatter.format(&sample(), &cfg(true)).unwrap();
        let codes: Vec<&str> = out.results.error.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, vec!["E1"]);
        assert!(out.results.warning.is_empty());
        assert!(out.results.recommendation.is_empty());
        assert_eq!(out.results.feature.len(), 1);
    }

    #[test]
    fn test_misplaced_finding_fails_without_touching_input() {
        let mut raw = sample();
        raw.results.warning.push(finding("E9", Severity::Error, false));
        let before = raw.clone();
        let err = CatalogFormatter.format(&raw, &cfg(false)).unwrap_err();
        assert!(matches!(err, FormatError::MisplacedFinding { .. }));
        assert_eq!(raw, before);
    }

    #[test]
    fn test_postprocess_falls_back_and_logs_two_lines() {
        let mut raw = sample();
        raw.results.error[1].rule = "   ".into();
        let mut err = Vec::new();
        let out = postprocess(&CatalogFormatter, raw.clone(), &cfg(false), &Palette::plain(), &mut err).unwrap();
        assert_eq!(out, raw);
        let log = String::from_utf8(err).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(
            lines,
            vec![
                "error: Error formatting result, some results may be missing.",
                "error: finding E2 has no rule text",
            ]
        );
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_format_failure_is_quiet_at_default_log_level() {
        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || sink.clone())
            .finish();
        let mut raw = sample();
        raw.results.error[1].rule = String::new();
        let mut err = Vec::new();
        tracing::subscriber::with_default(subscriber, || {
            postprocess(&CatalogFormatter, raw, &cfg(false), &Palette::plain(), &mut err).unwrap();
        });
        assert_eq!(String::from_utf8(err).unwrap().lines().count(), 2);
        assert!(captured.0.lock().unwrap().is_empty());
    }
}
