//! Apabi reader HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use url::Url;

use crate::api::session::Session;
use crate::api::site::{PageFetch, ReaderSite};
use crate::config::SiteConfig;
use crate::error::{Error, Result};
use crate::extract::{extract_form, Document};

/// Fields the IP auto-login form is submitted with.
const LOGIN_FIELDS: [(&str, &str); 2] = [("LoginType", "IPAutoLogin"), ("cult", "CN")];

/// HTTP client for the reader; the cookie jar carries the login between requests.
pub struct ApabiClient {
    client: Client,
    login_url: Url,
}

impl ApabiClient {
    /// Create a new client from the site configuration.
    pub fn new(site: &SiteConfig) -> Result<Self> {
        let login_url = Url::parse(&site.login_url)?;

        let client = Client::builder()
            .user_agent(&site.user_agent)
            .cookie_store(true)
            .timeout(Duration::from_secs(site.request_timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, login_url })
    }

    /// Turn a successful response into a document, keeping its final URL.
    async fn into_document(response: Response) -> Result<Document> {
        let status = response.status();
        let url = response.url().clone();
        tracing::debug!("Response status: {} ({})", status, url);

        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        Ok(Document::new(url, body))
    }

    async fn get(&self, url: &Url, query: &[(&str, String)]) -> Result<Response> {
        tracing::debug!("GET {}", url);
        Ok(self.client.get(url.clone()).query(query).send().await?)
    }
}

#[async_trait]
impl ReaderSite for ApabiClient {
    async fn submit_login(&self) -> Result<Document> {
        let login_page = Self::into_document(self.get(&self.login_url, &[]).await?).await?;

        let Some(form) = extract_form(&login_page)? else {
            tracing::debug!("No login form found, posting directly to {}", self.login_url);
            let response = self
                .client
                .post(self.login_url.clone())
                .form(&LOGIN_FIELDS)
                .send()
                .await?;
            return Self::into_document(response).await;
        };

        // Page-provided fields first, ours override.
        let mut fields: Vec<(String, String)> = form
            .fields
            .into_iter()
            .filter(|(name, _)| !LOGIN_FIELDS.iter().any(|(ours, _)| ours == name))
            .collect();
        fields.extend(
            LOGIN_FIELDS
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string())),
        );

        tracing::debug!("{} {} (login form)", form.method, form.action);
        let request = if form.method == "GET" {
            self.client.get(form.action).query(&fields)
        } else {
            self.client.post(form.action).form(&fields)
        };

        Self::into_document(request.send().await?).await
    }

    async fn get_document(&self, url: &Url) -> Result<Document> {
        Self::into_document(self.get(url, &[]).await?).await
    }

    async fn get_content(&self, session: &Session) -> Result<Document> {
        let endpoint = session.content_endpoint()?;
        let response = self.get(&endpoint, &session.content_query()).await?;
        Self::into_document(response).await
    }

    async fn get_page_image(&self, session: &Session, page: u32) -> Result<PageFetch> {
        let endpoint = session.image_endpoint()?;
        let response = self.get(&endpoint, &session.image_query(page)).await?;

        let status = response.status();
        tracing::debug!("Page {} response status: {}", page, status);

        if status == StatusCode::FORBIDDEN || status == StatusCode::UNAUTHORIZED {
            return Ok(PageFetch::Denied(status.as_u16()));
        }

        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        let bytes = response.bytes().await?;
        Ok(PageFetch::Image(bytes.to_vec()))
    }
}
