//! Article records written by the collector.
//!
//! The default output is a sequence of pseudo-JSON fragments (key/value pairs
//! without an enclosing object), each followed by a blank line. Downstream
//! consumers only read the file as one text blob, so the layout is kept
//! byte-for-byte. JSON Lines output with the same field names is available as
//! an opt-in.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Body text recorded when a keyword has no search hit.
pub const NOT_FOUND_MESSAGE: &str = "No Wikipedia page found.";

/// One scrape result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Canonical article URL; empty for placeholder records.
    pub url: String,
    /// Article title, or the keyword for placeholder records.
    pub title: String,
    /// Section headings in document order.
    pub table_of_contents: Vec<String>,
    /// Cleaned paragraph text joined with newlines.
    pub raw_text: String,
}

impl ArticleRecord {
    /// Record for a resolved article.
    pub fn article(
        url: impl Into<String>,
        title: impl Into<String>,
        table_of_contents: Vec<String>,
        raw_text: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            table_of_contents,
            raw_text: raw_text.into(),
        }
    }

    /// Placeholder for a keyword whose search returned nothing.
    pub fn not_found(keyword: &str) -> Self {
        Self::placeholder(keyword, NOT_FOUND_MESSAGE.to_string())
    }

    /// Placeholder for a keyword whose scrape failed.
    ///
    /// Double quotes in the message become single quotes so the fragment stays
    /// readable without escaping.
    pub fn failed(keyword: &str, error: &dyn fmt::Display) -> Self {
        let message = error.to_string().replace('"', "'");
        Self::placeholder(keyword, format!("Error: {message}"))
    }

    fn placeholder(keyword: &str, raw_text: String) -> Self {
        Self {
            url: String::new(),
            title: keyword.to_string(),
            table_of_contents: Vec::new(),
            raw_text,
        }
    }

    /// True for not-found and error records.
    pub fn is_placeholder(&self) -> bool {
        self.url.is_empty()
    }

    /// Renders the pseudo-JSON fragment, including the trailing blank line.
    pub fn to_fragment(&self) -> String {
        if self.is_placeholder() {
            return format!(
                "\"url\": \"\", \"title\": \"{}\", \
                 \"table_of_contents\": [], \"raw_text\": \"{}\"\n\n",
                self.title, self.raw_text
            );
        }
        format!(
            "\"url\":\"{}\",\"title\":\"{}\",\"table_of_contents\":{},\"raw_text\":\"{}\"\n\n",
            self.url,
            self.title,
            render_toc(&self.table_of_contents),
            self.raw_text.replace('"', "\\\"")
        )
    }

    /// Renders one JSON Lines entry, including the trailing newline.
    pub fn to_json_line(&self) -> Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// Renders headings as a JSON array with `", "` between items.
fn render_toc(headings: &[String]) -> String {
    let items: Vec<String> = headings
        .iter()
        .map(|heading| serde_json::Value::from(heading.as_str()).to_string())
        .collect();
    format!("[{}]", items.join(", "))
}

/// Output layout of the collector file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecordFormat {
    /// Pseudo-JSON fragments separated by blank lines.
    #[default]
    Fragment,
    /// One JSON object per line.
    JsonLines,
}

impl RecordFormat {
    /// Serializes `record` into `out` using this layout.
    pub fn write<W: Write>(self, record: &ArticleRecord, out: &mut W) -> Result<()> {
        let rendered = match self {
            Self::Fragment => record.to_fragment(),
            Self::JsonLines => record.to_json_line()?,
        };
        out.write_all(rendered.as_bytes())?;
        Ok(())
    }
}

impl FromStr for RecordFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fragment" | "text" => Ok(Self::Fragment),
            "jsonl" | "json-lines" | "jsonlines" => Ok(Self::JsonLines),
            other => Err(format!("unknown record format '{other}' (use fragment or jsonl)")),
        }
    }
}
