//! 关键字检测器 - 抓取活动页面，在正文中查找购票关键字

use super::{Detector, Outcome};
use crate::error::ConfigurationError;
use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/110.0.0.0 Safari/537.36";

/// 从 HTML 中提取可见正文
struct TextExtractor {
    body: Regex,
    blocks: Regex,
    tags: Regex,
    spaces: Regex,
}

impl TextExtractor {
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            body: Regex::new(r"(?is)<body\b[^>]*>(.*)</body>")?,
            blocks: Regex::new(r"(?is)<script\b.*?</script>|<style\b.*?</style>|<noscript\b.*?</noscript>")?,
            tags: Regex::new(r"(?s)<[^>]*>")?,
            spaces: Regex::new(r"\s+")?,
        })
    }

    /// 返回小写、空白归一后的正文
    fn extract(&self, html: &str) -> String {
        let body = self
            .body
            .captures(html)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .unwrap_or(html);

        let text = self.blocks.replace_all(body, " ");
        let text = self.tags.replace_all(&text, " ");
        let text = text.replace("&nbsp;", " ").replace("&amp;", "&");
        self.spaces.replace_all(&text, " ").trim().to_lowercase()
    }
}

/// 基于关键字的页面检测器
pub struct KeywordDetector {
    client: Client,
    keywords: Vec<String>,
    extractor: TextExtractor,
}

impl KeywordDetector {
    pub fn new(keywords: &[String], timeout: Duration) -> Result<Self, ConfigurationError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(REFERER, HeaderValue::from_static("https://www.google.com/"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ConfigurationError::invalid(format!("failed to create HTTP client: {}", e)))?;

        let extractor = TextExtractor::new()
            .map_err(|e| ConfigurationError::invalid(format!("invalid text pattern: {}", e)))?;

        Ok(Self {
            client,
            keywords: normalize_keywords(keywords),
            extractor,
        })
    }

    /// 在页面正文中查找关键字
    pub fn inspect(&self, html: &str) -> Outcome {
        if html.trim().is_empty() {
            return Outcome::FetchFailed;
        }

        let text = self.extractor.extract(html);
        match self.keywords.iter().find(|k| text.contains(k.as_str())) {
            Some(keyword) => {
                debug!(keyword = %keyword, "Ticket keyword found");
                Outcome::Available
            }
            None => Outcome::Unavailable,
        }
    }
}

fn normalize_keywords(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

#[async_trait]
impl Detector for KeywordDetector {
    async fn check(&self, target: &str) -> Outcome {
        let response = match self.client.get(target).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %target, error = %e, timeout = e.is_timeout(), "Fetch failed");
                return Outcome::FetchFailed;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(url = %target, status = %status, "Fetch failed: non-success status");
            return Outcome::FetchFailed;
        }

        match response.text().await {
            Ok(body) => self.inspect(&body),
            Err(e) => {
                warn!(url = %target, error = %e, "Failed to read page body");
                Outcome::FetchFailed
            }
        }
    }
}
