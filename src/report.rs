//! Report orchestration: format, summarize, list findings, pick the exit code.

use crate::config::{CheckConfiguration, OutputMode};
use crate::format::{postprocess, ResultFormatter};
use crate::models::{Severity, ThemeResult};
use crate::output::{
    compose_json, render_finding, render_footer, render_section_header, render_summary, Palette,
};
use std::io::{self, Write};

/// Exit code for a finished report: 1 when any error remains, else 0.
pub fn exit_code(result: &ThemeResult) -> i32 {
    if result.error_count() > 0 {
        1
    } else {
        0
    }
}

fn write_lines<W: Write>(out: &mut W, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// Human report for an already formatted result.
pub fn write_human<W: Write>(
    result: &ThemeResult,
    cfg: &CheckConfiguration,
    palette: &Palette,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", render_summary(result, cfg, palette))?;

    for level in Severity::REPORTED {
        let findings = result.results.bucket(level);
        if findings.is_empty() {
            continue;
        }
        write_lines(out, &render_section_header(level, palette))?;
        for finding in findings {
            write_lines(out, &render_finding(finding, cfg, palette))?;
        }
    }

    write_lines(out, &render_footer(palette))
}

/// Format `result`, print it in `mode` and return the process exit code.
///
/// Report text goes to `out`; formatter failures are logged to `err` and the
/// unformatted result is reported instead.
pub fn render<F, W, E>(
    formatter: &F,
    result: ThemeResult,
    cfg: &CheckConfiguration,
    mode: OutputMode,
    palette: &Palette,
    out: &mut W,
    err: &mut E,
) -> io::Result<i32>
where
    F: ResultFormatter,
    W: Write,
    E: Write,
{
    let result = postprocess(formatter, result, cfg, palette, err)?;
    match mode {
        OutputMode::Human => write_human(&result, cfg, palette, out)?,
        OutputMode::Json => {
            let doc = compose_json(&result).map_err(io::Error::other)?;
            let text = serde_json::to_string_pretty(&doc).map_err(io::Error::other)?;
            writeln!(out, "{text}")?;
        }
    }
    out.flush()?;
    Ok(exit_code(&result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CheckVersion, VersionFlags};
    use crate::format::{CatalogFormatter, FormatError};
    use crate::models::{FailureRef, Finding};

    struct FailingFormatter;

    impl ResultFormatter for FailingFormatter {
        fn format(
            &self,
            _result: &ThemeResult,
            _cfg: &CheckConfiguration,
        ) -> Result<ThemeResult, FormatError> {
            Err(FormatError::MissingRule {
                code: "GS999".into(),
            })
        }
    }

    /// Formatter that drops every error, to tell pre- and post-format counts apart.
    struct DropErrors;

    impl ResultFormatter for DropErrors {
        fn format(
            &self,
            result: &ThemeResult,
            _cfg: &CheckConfiguration,
        ) -> Result<ThemeResult, FormatError> {
            let mut out = result.clone();
            out.results.error.clear();
            Ok(out)
        }
    }

    fn finding(code: &str, level: Severity) -> Finding {
        Finding {
            code: code.into(),
            rule: format!("rule {code}"),
            level,
            details: format!("details {code}"),
            failures: vec![FailureRef::new("post.hbs", "line 3")],
            fatal: false,
        }
    }

    fn cfg(verbose: bool) -> CheckConfiguration {
        CheckConfiguration::resolve(&VersionFlags::default(), verbose, false)
    }

    fn result(levels: &[Severity]) -> ThemeResult {
        let mut r = ThemeResult::new(CheckVersion::Latest.ghost_version());
        for (i, level) in levels.iter().enumerate() {
            r.results.push(finding(&format!("C{i}"), *level));
        }
        r
    }

    fn run<F: ResultFormatter>(f: &F, r: ThemeResult, c: &CheckConfiguration) -> (i32, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = render(f, r, c, OutputMode::Human, &Palette::plain(), &mut out, &mut err).unwrap();
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_exit_code_only_escalates_on_errors() {
        let quiet = [Severity::Warning, Severity::Recommendation, Severity::Feature];
        let (code, _, _) = run(&CatalogFormatter, result(&quiet), &cfg(false));
        assert_eq!(code, 0);
        let (code, _, _) = run(&CatalogFormatter, result(&[Severity::Error]), &cfg(false));
        assert_eq!(code, 1);
    }

    #[test]
    fn test_exit_code_uses_post_format_counts() {
        let (code, out, _) = run(&DropErrors, result(&[Severity::Error]), &cfg(false));
        assert_eq!(code, 0);
        assert!(out.contains("Your theme is compatible with Ghost 5.x"));
    }

    #[test]
    fn test_sections_in_fixed_order_and_features_hidden() {
        let levels = [
            Severity::Recommendation,
            Severity::Feature,
            Severity::Warning,
            Severity::Error,
            Severity::Error,
        ];
        let (_, out, _) = run(&CatalogFormatter, result(&levels), &cfg(false));
        let e = out.find("\nErrors\n------\n").unwrap();
        let w = out.find("\nWarnings\n--------\n").unwrap();
        let r = out.find("\nRecommendations\n---------------\n").unwrap();
        assert!(e < w && w < r);
        assert!(out.contains("Important to fix, functionality may be degraded."));
        assert!(!out.contains("Features"));
        assert!(!out.contains("rule C1"));
        // Bucket order is preserved.
        assert!(out.find("- Error: rule C3").unwrap() < out.find("- Error: rule C4").unwrap());
        assert!(out.contains("Your theme has 2 errors and 1 warning!\n"));
    }

    #[test]
    fn test_empty_sections_are_skipped_and_footer_printed() {
        let (_, out, _) = run(&CatalogFormatter, result(&[Severity::Warning]), &cfg(false));
        assert!(out.starts_with("\nYour theme has 1 warning!\n-------------------------\n"));
        assert!(!out.contains("Errors"));
        assert!(!out.contains("Recommendations"));
        assert!(out.ends_with(
            "\nGet more help at https://ghost.org/docs/themes/\nYou can also check theme compatibility at https://gscan.ghost.org/\n"
        ));
    }

    #[test]
    fn test_verbose_report_lists_details_and_failures() {
        let (_, out, _) = run(&CatalogFormatter, result(&[Severity::Error]), &cfg(true));
        assert!(out.contains(
            "- Error: rule C0\nDetails: details C0\nFiles:\npost.hbs - line 3\n\n"
        ));
    }

    #[test]
    fn test_formatter_failure_still_reports_raw_result() {
        let raw = result(&[Severity::Error, Severity::Warning]);
        let (code, out, err) = run(&FailingFormatter, raw, &cfg(false));
        assert_eq!(code, 1);
        assert!(out.contains("Your theme has 1 error and 1 warning!"));
        assert!(out.contains("- Error: rule C0"));
        assert!(out.contains("Get more help at"));
        assert_eq!(err.lines().count(), 2);
        assert!(err.contains("Error formatting result, some results may be missing."));
        assert!(err.contains("GS999"));
    }

    #[test]
    fn test_json_mode_prints_formatted_result() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = render(
            &CatalogFormatter,
            result(&[Severity::Warning]),
            &cfg(false),
            OutputMode::Json,
            &Palette::plain(),
            &mut out,
            &mut err,
        )
        .unwrap();
        assert_eq!(code, 0);
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(v["checkedVersion"], "5.x");
        assert_eq!(v["formatted"], true);
        assert_eq!(v["results"]["warning"][0]["code"], "C0");
        assert_eq!(v["summary"]["warnings"], 1);
        assert_eq!(v["summary"]["errors"], 0);
        assert_eq!(v["summary"]["exitCode"], 0);
    }
}
