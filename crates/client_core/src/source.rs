use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::domain::Article;
use tracing::debug;
use url::Url;

use crate::error::FetchFailure;

/// Resolved against the configured base URL the same way a page resolves a
/// relative link.
pub const MORE_ARTICLES_PATH: &str = "./more-articles.json";

#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Local collection, loaded once and never mutated.
    fn bundled(&self) -> &[Article];
    async fn fetch_more(&self) -> Result<Vec<Article>, FetchFailure>;
}

pub fn parse_bundled(json: &str) -> Result<Vec<Article>> {
    serde_json::from_str(json).context("bundled articles are not a valid article array")
}

pub struct HttpArticleSource {
    http: Client,
    bundled: Vec<Article>,
    more_articles_url: Url,
}

impl HttpArticleSource {
    pub fn new(base_url: &str, bundled: Vec<Article>) -> Result<Self> {
        Self::with_client(Client::new(), base_url, bundled)
    }

    pub fn with_client(http: Client, base_url: &str, bundled: Vec<Article>) -> Result<Self> {
        let base = Url::parse(base_url).with_context(|| format!("invalid base url '{base_url}'"))?;
        let more_articles_url = base
            .join(MORE_ARTICLES_PATH)
            .with_context(|| format!("cannot resolve {MORE_ARTICLES_PATH} against '{base}'"))?;
        Ok(Self {
            http,
            bundled,
            more_articles_url,
        })
    }

    pub fn more_articles_url(&self) -> &Url {
        &self.more_articles_url
    }
}

#[async_trait]
impl ArticleSource for HttpArticleSource {
    fn bundled(&self) -> &[Article] {
        &self.bundled
    }

    async fn fetch_more(&self) -> Result<Vec<Article>, FetchFailure> {
        let url = self.more_articles_url.as_str();
        debug!(url, "fetching more articles");
        let response = self
            .http
            .get(self.more_articles_url.clone())
            .send()
            .await
            .map_err(|source| FetchFailure::Transport {
                url: url.to_string(),
                source,
            })?
            .error_for_status()
            .map_err(|source| FetchFailure::Status {
                url: url.to_string(),
                source,
            })?;
        response
            .json::<Vec<Article>>()
            .await
            .map_err(|source| FetchFailure::Decode {
                url: url.to_string(),
                source,
            })
    }
}

#[cfg(test)]
#[path = "tests/source_tests.rs"]
mod tests;
