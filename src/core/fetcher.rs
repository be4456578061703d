use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, REFERER};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Retrieves page bodies. DOM querying is left to the caller.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get_text(&self, url: &str) -> anyhow::Result<String>;
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> anyhow::Result<String>;
    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
        referer: &str,
    ) -> anyhow::Result<String>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn read_body(response: reqwest::Response, url: &str) -> anyhow::Result<String> {
        if !response.status().is_success() {
            return Err(anyhow!("HTTP {} from {}", response.status(), url));
        }
        response.text().await.map_err(Into::into)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get_text(&self, url: &str) -> anyhow::Result<String> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/html,application/xhtml+xml,*/*")
            .send()
            .await?;
        Self::read_body(response, url).await
    }

    async fn post_json(&self, url: &str, body: &serde_json::Value) -> anyhow::Result<String> {
        let payload = serde_json::to_vec(body)?;
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(payload)
            .send()
            .await?;
        Self::read_body(response, url).await
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
        referer: &str,
    ) -> anyhow::Result<String> {
        let payload = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form.iter())
            .finish();
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(REFERER, referer)
            .header(ACCEPT, "*/*")
            .body(payload)
            .send()
            .await?;
        Self::read_body(response, url).await
    }
}
