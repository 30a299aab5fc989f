//! Explanation lookups against the upstream idiom dictionary.
//!
//! A lookup never fails the request it belongs to. Whatever happens to one text (a non-200
//! answer, a network error, a timeout, an unparseable page) is folded into that text's
//! [`Explanation`], and the remaining texts are looked up regardless.

use async_trait::async_trait;
use futures::{StreamExt, stream};
use reqwest::{Client, StatusCode};
use std::{fmt, sync::Arc};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::DictionaryConfig;

/// Shown instead of an explanation when the dictionary has none
pub const NOT_FOUND_MARKER: &str = "not found";

/// Result of looking up one text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Explanation {
    Found(String),
    NotFound,
    Failed(String),
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Explanation::Found(text) => f.write_str(text),
            Explanation::NotFound => f.write_str(NOT_FOUND_MARKER),
            Explanation::Failed(message) => write!(f, "lookup failed: {message}"),
        }
    }
}

/// Idiom dictionary interface.
#[async_trait]
pub trait Dictionary: Send + Sync {
    async fn lookup(&self, text: &str) -> Explanation;
}

/// Client for the Ministry of Education idiom dictionary (or anything serving the same pages).
pub struct MoeDictionary {
    client: Client,
    url: Url,
    query_param: String,
}

impl MoeDictionary {
    pub fn new(config: &DictionaryConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
            query_param: config.query_param.clone(),
        })
    }

    fn lookup_url(&self, text: &str) -> Url {
        let mut url = self.url.clone();
        url.query_pairs_mut().append_pair(&self.query_param, text);
        url
    }
}

#[async_trait]
impl Dictionary for MoeDictionary {
    #[instrument(skip(self))]
    async fn lookup(&self, text: &str) -> Explanation {
        let url = self.lookup_url(text);
        debug!("Looking up explanation at {}", url);

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Dictionary request failed: {}", e);
                return Explanation::Failed(e.to_string());
            }
        };

        if response.status() != StatusCode::OK {
            debug!("Dictionary answered {}", response.status());
            return Explanation::NotFound;
        }

        match response.text().await {
            Ok(body) => parse_explanation(&body).map_or(Explanation::NotFound, Explanation::Found),
            Err(e) => {
                warn!("Failed to read dictionary response: {}", e);
                Explanation::Failed(e.to_string())
            }
        }
    }
}

/// Look up every text, at most `concurrency` at a time.
///
/// The output has one entry per input, in input order, duplicates included.
pub async fn lookup_all(dictionary: Arc<dyn Dictionary>, texts: &[String], concurrency: usize) -> Vec<(String, Explanation)> {
    stream::iter(texts.iter().cloned())
        .map(|text| {
            let dictionary = dictionary.clone();
            async move {
                let explanation = dictionary.lookup(&text).await;
                (text, explanation)
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

/// Section headings of a dictionary entry, in page order
const SECTION_LABELS: &[&str] = &["典源", "典故說明", "書證", "用法說明", "辨識", "參考語詞", "近義", "反義"];

const EXPLANATION_LABEL: &str = "釋義";

/// Extract the explanation from a dictionary entry page.
///
/// Markup is reduced to text, then the explanation is whatever follows the first `釋義` label,
/// up to the next section heading. Returns `None` when there is no such label or it is empty.
pub fn parse_explanation(html: &str) -> Option<String> {
    let text = html_to_text(html);
    let start = text.find(EXPLANATION_LABEL)? + EXPLANATION_LABEL.len();
    let rest = text[start..].trim_start_matches([' ', ':', '：']);

    let end = SECTION_LABELS.iter().filter_map(|label| rest.find(label)).min().unwrap_or(rest.len());
    let explanation = rest[..end].trim();

    (!explanation.is_empty()).then(|| explanation.to_string())
}

/// Strip tags, scripts and styles, decode the common entities, collapse whitespace.
fn html_to_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(open) = rest.find('<') {
        text.push_str(&rest[..open]);
        rest = &rest[open..];

        let tag_end = rest.find('>').map_or(rest.len(), |i| i + 1);
        let tag = rest[..tag_end].to_ascii_lowercase();
        rest = &rest[tag_end..];

        for skipped in ["script", "style"] {
            if tag.starts_with(&format!("<{skipped}")) {
                let close = format!("</{skipped}");
                rest = match rest.to_ascii_lowercase().find(&close) {
                    Some(i) => &rest[i..],
                    None => "",
                };
            }
        }
        text.push(' ');
    }
    text.push_str(rest);

    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
