//! Blocking client for the MediaWiki search and parse APIs.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

/// Default English Wikipedia API endpoint.
pub const DEFAULT_API_URL: &str = "https://en.wikipedia.org/w/api.php";
/// Default `User-Agent` sent with every request.
pub const DEFAULT_USER_AGENT: &str = "WikipediaStructuredScraper/2.0 (contact@example.com)";
/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Rendered article content returned by the parse API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// Section headings in document order.
    pub sections: Vec<String>,
    /// Rendered article HTML.
    pub html: String,
}

/// Source of Wikipedia pages used by the collector.
pub trait ArticleSource {
    /// Returns the title of the best full-text match for `keyword`, if any.
    fn search(&self, keyword: &str) -> Result<Option<String>>;

    /// Fetches the rendered HTML and section list for `title`.
    fn fetch(&self, title: &str) -> Result<ParsedPage>;

    /// Canonical article URL for `title`.
    fn article_url(&self, title: &str) -> String;
}

/// HTTP-backed [`ArticleSource`].
#[derive(Clone)]
pub struct WikipediaClient {
    client: Client,
    api_url: Url,
    article_base: String,
}

impl WikipediaClient {
    /// Builds a client against `api_url` with a fixed timeout and user agent.
    pub fn new(api_url: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        let api_url = Url::parse(api_url).map_err(|err| {
            Error::InvalidConfig(format!("invalid Wikipedia API URL '{api_url}': {err}"))
        })?;
        let article_base = article_base(&api_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .map_err(|err| Error::InvalidConfig(format!("invalid user agent: {err}")))?,
        );
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_url,
            article_base,
        })
    }

    fn get<T: for<'de> Deserialize<'de>>(&self, params: &[(&str, &str)]) -> Result<T> {
        let resp = self
            .client
            .get(self.api_url.clone())
            .query(params)
            .send()?
            .error_for_status()?;
        Ok(resp.json()?)
    }
}

impl ArticleSource for WikipediaClient {
    fn search(&self, keyword: &str) -> Result<Option<String>> {
        debug!(keyword, "searching Wikipedia");
        let response: SearchResponse = self.get(&[
            ("action", "query"),
            ("list", "search"),
            ("srsearch", keyword),
            ("format", "json"),
        ])?;
        response.into_best_title()
    }

    fn fetch(&self, title: &str) -> Result<ParsedPage> {
        debug!(title, "fetching parsed page");
        let response: ParseResponse = self.get(&[
            ("action", "parse"),
            ("page", title),
            ("format", "json"),
            ("prop", "text|sections"),
            ("formatversion", "2"),
        ])?;
        response.into_page()
    }

    fn article_url(&self, title: &str) -> String {
        format!("{}{}", self.article_base, title.replace(' ', "_"))
    }
}

fn article_base(api_url: &Url) -> Result<String> {
    match api_url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(Error::InvalidConfig(format!(
                "Wikipedia API URL must be http(s), got '{other}'"
            )))
        }
    }
    Ok(format!("{}/wiki/", api_url.origin().ascii_serialization()))
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    info: String,
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        Error::Wikipedia(format!("{}: {}", err.code, err.info))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

impl SearchResponse {
    fn into_best_title(self) -> Result<Option<String>> {
        if let Some(err) = self.error {
            return Err(err.into());
        }
        Ok(self
            .query
            .and_then(|query| query.search.into_iter().next())
            .map(|hit| hit.title))
    }
}

#[derive(Debug, Deserialize)]
struct ParseResponse {
    #[serde(default)]
    parse: Option<ParsePayload>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Default, Deserialize)]
struct ParsePayload {
    #[serde(default)]
    text: String,
    #[serde(default)]
    sections: Vec<ParseSection>,
}

#[derive(Debug, Deserialize)]
struct ParseSection {
    line: String,
}

impl ParseResponse {
    fn into_page(self) -> Result<ParsedPage> {
        if let Some(err) = self.error {
            return Err(err.into());
        }
        let payload = self.parse.unwrap_or_default();
        Ok(ParsedPage {
            sections: payload.sections.into_iter().map(|s| s.line).collect(),
            html: payload.text,
        })
    }
}
