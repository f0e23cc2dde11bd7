//! Self-contained HTML report

use std::fs;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Duration, Local};
use log::debug;

use crate::config::ReportConfig;
use crate::entry::{EntryId, FailureDetail, ReportEntry, Status};
use crate::error::{ReportError, ReportResult};
use crate::sink::{EntryLog, ReportSink};

const STYLESHEET: &str = r#"
body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; margin: 0; background: #f5f6f8; color: #222; }
header { background: #2b3a4a; color: #fff; padding: 16px 24px; }
header h1 { margin: 0; font-size: 20px; }
header .generated { font-size: 12px; opacity: 0.8; }
.summary { display: flex; gap: 12px; padding: 16px 24px; }
.summary div { background: #fff; border-radius: 4px; padding: 8px 16px; min-width: 80px; }
.summary .count { font-size: 22px; font-weight: bold; }
table { border-collapse: collapse; margin: 0 24px 24px; width: calc(100% - 48px); background: #fff; }
th, td { text-align: left; padding: 8px; border-bottom: 1px solid #e3e5e8; vertical-align: top; }
.status { font-weight: bold; text-transform: uppercase; font-size: 12px; }
.pass { color: #2e7d32; }
.fail { color: #c62828; }
.skip { color: #ef6c00; }
.pending { color: #757575; }
pre { white-space: pre-wrap; margin: 4px 0 0; font-size: 12px; }
img.screenshot { max-width: 320px; border: 1px solid #ccc; display: block; margin-top: 6px; }
"#;

/// Collects entries and writes them as one HTML page on flush.
#[derive(Debug, Clone)]
pub struct HtmlReporter {
    config: ReportConfig,
    log: EntryLog,
}

impl HtmlReporter {
    /// Reporter writing to `config.index_path()`
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            config: config.clone(),
            log: EntryLog::new(),
        }
    }

    /// Path of the document written by `flush`
    pub fn index_path(&self) -> PathBuf {
        self.config.index_path()
    }

    /// Render the document without writing it
    pub fn render(&self) -> String {
        render_document(&self.config, &self.log, Local::now())
    }
}

impl ReportSink for HtmlReporter {
    fn create_entry(&mut self, name: &str) -> EntryId {
        self.log.create(name)
    }

    fn mark_pass(&mut self, id: EntryId, message: &str) -> ReportResult<()> {
        self.log.finalize(id, Status::Pass, Some(message.to_string()), None)
    }

    fn mark_fail(&mut self, id: EntryId, detail: &FailureDetail) -> ReportResult<()> {
        self.log.finalize(id, Status::Fail, None, Some(detail.clone()))
    }

    fn mark_skip(&mut self, id: EntryId, message: &str) -> ReportResult<()> {
        self.log.finalize(id, Status::Skip, Some(message.to_string()), None)
    }

    fn attach_screenshot(&mut self, id: EntryId, path: &Path) -> ReportResult<()> {
        self.log.attach(id, path)
    }

    fn entries(&self) -> &[ReportEntry] {
        self.log.entries()
    }

    fn flush(&mut self) -> ReportResult<()> {
        let dir = self.config.output_dir();
        fs::create_dir_all(dir).map_err(|source| ReportError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = self.config.index_path();
        fs::write(&path, self.render()).map_err(|source| ReportError::Write {
            path: path.clone(),
            source,
        })?;

        debug!(
            "Wrote report with {} entries to {}",
            self.log.entries().len(),
            path.display()
        );
        Ok(())
    }
}

fn render_document(config: &ReportConfig, log: &EntryLog, generated_at: DateTime<Local>) -> String {
    let entries = log.entries();
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!(
        "<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n",
        escape_html(&config.document_title),
        STYLESHEET
    ));

    html.push_str(&format!(
        "<header><h1>{}</h1><div class=\"generated\">Generated {}</div></header>\n",
        escape_html(&config.report_name),
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));

    html.push_str("<section class=\"summary\">\n");
    html.push_str(&summary_tile("Total", entries.len(), ""));
    html.push_str(&summary_tile("Passed", log.count(Status::Pass), "pass"));
    html.push_str(&summary_tile("Failed", log.count(Status::Fail), "fail"));
    html.push_str(&summary_tile("Skipped", log.count(Status::Skip), "skip"));
    html.push_str("</section>\n");

    html.push_str(
        "<table>\n<thead><tr><th>Test</th><th>Status</th><th>Started</th><th>Duration</th><th>Details</th></tr></thead>\n<tbody>\n",
    );
    for entry in entries {
        html.push_str(&entry_row(config, entry));
    }
    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");

    html
}

fn summary_tile(label: &str, count: usize, class: &str) -> String {
    format!(
        "<div class=\"{}\"><div class=\"count\">{}</div>{}</div>\n",
        class, count, label
    )
}

fn entry_row(config: &ReportConfig, entry: &ReportEntry) -> String {
    let mut details = String::new();

    if let Some(message) = entry.message() {
        details.push_str(&escape_html(message));
    }
    if let Some(failure) = entry.failure() {
        details.push_str(&format!("<pre>{}</pre>", escape_html(&failure.to_string())));
    }
    if let Some(path) = entry.screenshot() {
        let href = escape_html(&report_relative(config.output_dir(), path));
        details.push_str(&format!(
            "<a href=\"{0}\"><img class=\"screenshot\" src=\"{0}\" alt=\"screenshot\"></a>",
            href
        ));
    }

    let duration = entry
        .duration()
        .map(format_duration)
        .unwrap_or_else(|| "-".to_string());

    format!(
        "<tr><td>{}</td><td class=\"status {}\">{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
        escape_html(entry.name()),
        entry.status().as_str(),
        entry.status(),
        entry.started_at().format("%H:%M:%S"),
        duration,
        details
    )
}

/// Link target for a file inside the report tree, with `/` separators
fn report_relative(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn format_duration(duration: Duration) -> String {
    let millis = duration.num_milliseconds().max(0);
    format!("{}.{:03}s", millis / 1000, millis % 1000)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_report_relative() {
        let root = Path::new("target/extent-report");
        assert_eq!(
            report_relative(root, Path::new("target/extent-report/screenshots/a.png")),
            "screenshots/a.png"
        );
        assert_eq!(report_relative(root, Path::new("/elsewhere/b.png")), "elsewhere/b.png");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::milliseconds(1234)), "1.234s");
        assert_eq!(format_duration(Duration::milliseconds(7)), "0.007s");
    }

    #[test]
    fn test_render_lists_entries() {
        let config = ReportConfig::new("out").with_report_name("Smoke <suite>");
        let mut reporter = HtmlReporter::new(&config);

        let ok = reporter.create_entry("opensHomePage");
        reporter.mark_pass(ok, "Test passed").unwrap();
        let bad = reporter.create_entry("checkout");
        reporter.mark_fail(bad, &FailureDetail::new("price <0>")).unwrap();
        reporter
            .attach_screenshot(bad, Path::new("out/screenshots/checkout.png"))
            .unwrap();
        reporter.create_entry("stillRunning");

        let html = reporter.render();
        assert!(html.contains("Smoke &lt;suite&gt;"));
        assert!(html.contains("opensHomePage"));
        assert!(html.contains("<pre>price &lt;0&gt;</pre>"));
        assert!(html.contains("src=\"screenshots/checkout.png\""));
        assert!(html.contains("class=\"status pending\""));
        assert!(html.contains("<div class=\"count\">3</div>Total"));
        assert!(html.contains("<div class=\"count\">1</div>Failed"));
    }
}
