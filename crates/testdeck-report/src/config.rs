//! Report configuration

use std::path::{Path, PathBuf};

/// Default report directory, relative to the working directory
pub const DEFAULT_OUTPUT_DIR: &str = "target/extent-report";

/// Where and how the report is written
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReportConfig {
    /// Root directory of the report tree
    pub output_dir: PathBuf,
    /// File name of the HTML document inside `output_dir`
    pub index_file: String,
    /// Directory for failure screenshots, relative to `output_dir`
    pub screenshot_dir: String,
    /// `<title>` of the HTML document
    pub document_title: String,
    /// Heading shown at the top of the report
    pub report_name: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            index_file: "index.html".to_string(),
            screenshot_dir: "screenshots".to_string(),
            document_title: "Test Report".to_string(),
            report_name: "Automation Results".to_string(),
        }
    }
}

impl ReportConfig {
    /// Default settings rooted at `output_dir`
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    /// Set the HTML file name
    pub fn with_index_file<S: Into<String>>(mut self, name: S) -> Self {
        self.index_file = name.into();
        self
    }

    /// Set the screenshot directory name
    pub fn with_screenshot_dir<S: Into<String>>(mut self, name: S) -> Self {
        self.screenshot_dir = name.into();
        self
    }

    /// Set the document title
    pub fn with_document_title<S: Into<String>>(mut self, title: S) -> Self {
        self.document_title = title.into();
        self
    }

    /// Set the report heading
    pub fn with_report_name<S: Into<String>>(mut self, name: S) -> Self {
        self.report_name = name.into();
        self
    }

    /// Root directory of the report tree
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Full path of the HTML document
    pub fn index_path(&self) -> PathBuf {
        self.output_dir.join(&self.index_file)
    }

    /// Directory holding failure screenshots
    pub fn screenshots_path(&self) -> PathBuf {
        self.output_dir.join(&self.screenshot_dir)
    }

    /// `<output_dir>/<screenshot_dir>/<test_name>.png`
    ///
    /// The test name becomes a single file stem: path separators, NUL and
    /// the characters Windows forbids in file names are replaced by `_`, so a
    /// name like `../../x` cannot leave the screenshot directory.
    pub fn screenshot_path(&self, test_name: &str) -> PathBuf {
        self.screenshots_path()
            .join(format!("{}.png", screenshot_stem(test_name)))
    }
}

fn screenshot_stem(test_name: &str) -> String {
    let stem: String = test_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0' => '_',
            c => c,
        })
        .collect();

    match stem.as_str() {
        "" | "." | ".." => stem.replace('.', "_") + "_",
        _ => stem,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = ReportConfig::default();
        assert_eq!(config.index_path(), Path::new("target/extent-report/index.html"));
        assert_eq!(
            config.screenshot_path("loginFails"),
            Path::new("target/extent-report/screenshots/loginFails.png")
        );
    }

    #[test]
    fn test_builders() {
        let config = ReportConfig::new("/tmp/out")
            .with_index_file("report.html")
            .with_screenshot_dir("shots")
            .with_report_name("Nightly");
        assert_eq!(config.index_path(), Path::new("/tmp/out/report.html"));
        assert_eq!(config.screenshot_path("t"), Path::new("/tmp/out/shots/t.png"));
        assert_eq!(config.report_name, "Nightly");
        assert_eq!(config.document_title, "Test Report");
    }

    #[test]
    fn test_screenshot_path_stays_in_screenshot_dir() {
        let config = ReportConfig::new("out");
        let cases = [
            ("../../escaped", "out/screenshots/.._.._escaped.png"),
            ("suite/case", "out/screenshots/suite_case.png"),
            (r"C:\temp\x", "out/screenshots/C__temp_x.png"),
            ("login[admin]", "out/screenshots/login[admin].png"),
            ("..", "out/screenshots/___.png"),
            ("", "out/screenshots/_.png"),
        ];
        for (name, expected) in cases {
            let path = config.screenshot_path(name);
            assert_eq!(path, Path::new(expected), "test name {:?}", name);
            assert_eq!(path.parent(), Some(config.screenshots_path().as_path()));
        }
    }
}
