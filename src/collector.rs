//! Collector stage: keyword list in, article records out.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::Result;
use crate::record::{ArticleRecord, RecordFormat};
use crate::wikipedia::ArticleSource;

/// Name of the collector output file inside the dataset folder.
pub const DATA_FILE_NAME: &str = "data.txt";
/// Default pause between keywords.
pub const DEFAULT_KEYWORD_DELAY: Duration = Duration::from_millis(500);

/// Outcome of a single keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeOutcome {
    /// Search matched and the page was fetched.
    Found,
    /// Search returned no hits.
    NotFound,
    /// Search or fetch failed; an error record was written.
    Failed,
}

/// Counts gathered over one collector run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectReport {
    /// Keywords resolved to an article.
    pub found: usize,
    /// Keywords without a search hit.
    pub not_found: usize,
    /// Keywords whose scrape failed.
    pub failed: usize,
    /// Blank keywords that were skipped.
    pub skipped: usize,
}

impl CollectReport {
    /// Number of records written.
    pub fn written(&self) -> usize {
        self.found + self.not_found + self.failed
    }

    fn record(&mut self, outcome: ScrapeOutcome) {
        match outcome {
            ScrapeOutcome::Found => self.found += 1,
            ScrapeOutcome::NotFound => self.not_found += 1,
            ScrapeOutcome::Failed => self.failed += 1,
        }
    }
}

/// Resolves keywords against an [`ArticleSource`] and writes one record each.
pub struct Collector<'a> {
    source: &'a dyn ArticleSource,
    delay: Duration,
    format: RecordFormat,
}

impl<'a> Collector<'a> {
    /// Creates a collector with the default delay and fragment output.
    pub fn new(source: &'a dyn ArticleSource) -> Self {
        Self {
            source,
            delay: DEFAULT_KEYWORD_DELAY,
            format: RecordFormat::default(),
        }
    }

    /// Sets the pause between consecutive keywords.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the output layout.
    pub fn with_format(mut self, format: RecordFormat) -> Self {
        self.format = format;
        self
    }

    /// Scrapes one keyword. Failures become error records.
    pub fn scrape(&self, keyword: &str) -> (ArticleRecord, ScrapeOutcome) {
        match self.try_scrape(keyword) {
            Ok(Some(record)) => (record, ScrapeOutcome::Found),
            Ok(None) => (ArticleRecord::not_found(keyword), ScrapeOutcome::NotFound),
            Err(err) => {
                warn!(keyword, error = %err, "scrape failed");
                (ArticleRecord::failed(keyword, &err), ScrapeOutcome::Failed)
            }
        }
    }

    fn try_scrape(&self, keyword: &str) -> Result<Option<ArticleRecord>> {
        let Some(title) = self.source.search(keyword)? else {
            return Ok(None);
        };
        let page = self.source.fetch(&title)?;
        let raw_text = wiki_parser::extract_text(&page.html);
        let url = self.source.article_url(&title);
        Ok(Some(ArticleRecord::article(url, title, page.sections, raw_text)))
    }

    /// Writes one record per non-blank keyword to `out`, flushing after each.
    ///
    /// Only I/O errors on `out` abort the run.
    pub fn collect<W, I, S>(&self, keywords: I, out: &mut W) -> Result<CollectReport>
    where
        W: Write,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = CollectReport::default();
        let mut first = true;
        for keyword in keywords {
            let keyword = keyword.as_ref().trim();
            if keyword.is_empty() {
                report.skipped += 1;
                continue;
            }
            if !first && !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
            first = false;

            info!(keyword, "fetching");
            let (record, outcome) = self.scrape(keyword);
            self.format.write(&record, out)?;
            out.flush()?;
            report.record(outcome);
        }
        Ok(report)
    }

    /// Truncates `path` (creating parent directories) and collects into it.
    pub fn collect_to_file<I, S>(&self, keywords: I, path: &Path) -> Result<CollectReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut out = BufWriter::new(File::create(path)?);
        let report = self.collect(keywords, &mut out)?;
        info!(
            found = report.found,
            not_found = report.not_found,
            failed = report.failed,
            skipped = report.skipped,
            path = %path.display(),
            "collection finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::wikipedia::ParsedPage;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::time::Instant;

    #[derive(Default)]
    struct FakeSource {
        searches: RefCell<Vec<String>>,
    }

    impl ArticleSource for FakeSource {
        fn search(&self, keyword: &str) -> Result<Option<String>> {
            self.searches.borrow_mut().push(keyword.to_string());
            match keyword {
                "Photosynthesis" => Ok(Some("Photosynthesis".to_string())),
                "Broken" => Ok(Some("Broken page".to_string())),
                "Offline" => Err(Error::Wikipedia("connection \"refused\"".to_string())),
                _ => Ok(None),
            }
        }

        fn fetch(&self, title: &str) -> Result<ParsedPage> {
            match title {
                "Photosynthesis" => Ok(ParsedPage {
                    sections: vec![
                        "Overview".to_string(),
                        "Light-dependent reactions".to_string(),
                    ],
                    html: concat!(
                        "<div class=\"mw-parser-output\">",
                        "<table class=\"infobox\"><tr><td>Infobox</td></tr></table>",
                        "<p>Photosynthesis   converts light[1] into \"chemical\" energy.",
                        "<sup class=\"reference\">[2]</sup></p>",
                        "<p>Plants use it.</p></div>"
                    )
                    .to_string(),
                }),
                other => Err(Error::Wikipedia(format!("missingtitle: {other}"))),
            }
        }

        fn article_url(&self, title: &str) -> String {
            format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_"))
        }
    }

    fn run(keywords: &[&str]) -> (String, CollectReport) {
        let source = FakeSource::default();
        let collector = Collector::new(&source).with_delay(Duration::ZERO);
        let mut out = Vec::new();
        let report = collector.collect(keywords, &mut out).expect("collect");
        (String::from_utf8(out).expect("utf8"), report)
    }

    #[test]
    fn found_article_fragment_has_title_and_toc() {
        let (text, report) = run(&["Photosynthesis"]);

        assert_eq!(
            text,
            concat!(
                "\"url\":\"https://en.wikipedia.org/wiki/Photosynthesis\",",
                "\"title\":\"Photosynthesis\",",
                "\"table_of_contents\":[\"Overview\", \"Light-dependent reactions\"],",
                "\"raw_text\":\"Photosynthesis converts light into ",
                "\\\"chemical\\\" energy.\nPlants use it.\"\n\n"
            )
        );
        assert!(text.contains("\"title\":\"Photosynthesis\""));
        assert!(!text.contains("[1]"));
        assert_eq!(report.found, 1);
    }

    #[test]
    fn unmatched_keyword_writes_not_found_record() {
        let (text, report) = run(&["Xyzzyq"]);
        assert_eq!(
            text,
            concat!(
                "\"url\": \"\", \"title\": \"Xyzzyq\", \"table_of_contents\": [], ",
                "\"raw_text\": \"No Wikipedia page found.\"\n\n"
            )
        );
        assert_eq!(report.not_found, 1);
    }

    #[test]
    fn failures_are_isolated_per_keyword() {
        let (text, report) = run(&["Offline", "Broken", "Photosynthesis"]);
        let records: Vec<&str> = text.split_terminator("\n\n").collect();

        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0],
            concat!(
                "\"url\": \"\", \"title\": \"Offline\", \"table_of_contents\": [], ",
                "\"raw_text\": \"Error: Wikipedia API error: connection 'refused'\""
            )
        );
        assert!(records[1].contains("\"title\": \"Broken\""));
        assert!(records[1].contains("Error: Wikipedia API error: missingtitle: Broken page"));
        assert!(records[2].contains("\"title\":\"Photosynthesis\""));
        assert_eq!(
            report,
            CollectReport {
                found: 1,
                not_found: 0,
                failed: 2,
                skipped: 0
            }
        );
    }

    /// Records when each search happened.
    #[derive(Default)]
    struct TimedSource {
        searched_at: RefCell<Vec<Instant>>,
    }

    impl ArticleSource for TimedSource {
        fn search(&self, _keyword: &str) -> Result<Option<String>> {
            self.searched_at.borrow_mut().push(Instant::now());
            Ok(None)
        }

        fn fetch(&self, title: &str) -> Result<ParsedPage> {
            Err(Error::Wikipedia(format!("unexpected fetch: {title}")))
        }

        fn article_url(&self, title: &str) -> String {
            title.to_string()
        }
    }

    #[test]
    fn delay_falls_between_keywords_only() {
        let delay = Duration::from_millis(50);
        let source = TimedSource::default();
        let collector = Collector::new(&source).with_delay(delay);
        let mut out = Vec::new();

        let started = Instant::now();
        let report = collector
            .collect(["a", "", "b", "c"], &mut out)
            .expect("collect");
        let finished = Instant::now();

        assert_eq!(report.not_found, 3);
        assert_eq!(report.skipped, 1);
        let searched_at = source.searched_at.borrow();
        assert_eq!(searched_at.len(), 3);
        assert!(searched_at[0] - started < delay, "no pause before the first keyword");
        assert!(searched_at[1] - searched_at[0] >= delay);
        assert!(searched_at[2] - searched_at[1] >= delay);
        assert!(finished - searched_at[2] < delay, "no pause after the last keyword");

        let elapsed = finished - started;
        assert!(elapsed >= delay * 2, "{elapsed:?}");
        assert!(elapsed < delay * 3, "blank keyword must not add a pause: {elapsed:?}");
    }

    #[test]
    fn blank_keywords_are_skipped_and_others_trimmed() {
        let source = FakeSource::default();
        let collector = Collector::new(&source).with_delay(Duration::ZERO);
        let mut out = Vec::new();
        let report = collector
            .collect(["", "   ", "  Xyzzyq  "], &mut out)
            .expect("collect");

        assert_eq!(source.searches.borrow().as_slice(), ["Xyzzyq".to_string()]);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.written(), 1);
    }

    #[test]
    fn json_lines_output_is_one_object_per_keyword() {
        let source = FakeSource::default();
        let collector = Collector::new(&source)
            .with_delay(Duration::ZERO)
            .with_format(RecordFormat::JsonLines);
        let mut out = Vec::new();
        collector
            .collect(["Photosynthesis", "Xyzzyq"], &mut out)
            .expect("collect");

        let text = String::from_utf8(out).expect("utf8");
        let records: Vec<ArticleRecord> = text
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Photosynthesis");
        assert_eq!(records[1], ArticleRecord::not_found("Xyzzyq"));
    }

    #[test]
    fn collect_to_file_creates_folder_and_truncates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("dataset").join(DATA_FILE_NAME);
        let source = FakeSource::default();
        let collector = Collector::new(&source).with_delay(Duration::ZERO);

        collector
            .collect_to_file(["Xyzzyq", "Other"], &path)
            .expect("first run");
        collector.collect_to_file(["Xyzzyq"], &path).expect("second run");

        let text = fs::read_to_string(&path).expect("read output");
        assert_eq!(text.matches("No Wikipedia page found.").count(), 1);
    }
}
