//! REST client for the Sync API, the remote key-value list store.
//!
//! Services and lists are addressed by SID or unique name
//! interchangeably; this client creates both under explicit names so a
//! rerun can find what a previous run left behind.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::config::Endpoints;
use crate::credentials::Credentials;

use super::{build_http_client, check_response, ApiError, ListStore, SyncItem, SyncList, SyncService};

/// Page size requested when enumerating list items.
const ITEM_PAGE_SIZE: &str = "100";

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// A Sync service resource.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ServiceResource {
    /// Service SID.
    pub sid: String,
}

/// A Sync list resource.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ListResource {
    /// List SID.
    pub sid: String,
    /// Unique name, if one was assigned.
    pub unique_name: Option<String>,
}

/// One page of a list's items.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ItemsPage {
    /// Items on this page.
    pub items: Vec<ItemResource>,
    /// Pagination block.
    #[serde(default)]
    pub meta: ItemsPageMeta,
}

/// A Sync list item resource.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ItemResource {
    /// Zero-based item index.
    pub index: u64,
    /// Stored JSON payload.
    pub data: serde_json::Value,
}

/// Pagination metadata for item enumeration.
#[doc(hidden)]
#[derive(Debug, Default, Deserialize)]
pub struct ItemsPageMeta {
    /// Absolute URL of the next page, if any.
    pub next_page_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Pure parsing (testable without HTTP)
// ---------------------------------------------------------------------------

/// Parse a service resource body.
///
/// # Errors
///
/// Returns [`ApiError::Parse`] when the body does not match the wire schema.
pub fn parse_service(body: &str) -> Result<ServiceResource, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))
}

/// Parse a list resource body.
///
/// # Errors
///
/// Returns [`ApiError::Parse`] when the body does not match the wire schema.
pub fn parse_list(body: &str) -> Result<ListResource, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))
}

/// Parse one items page.
///
/// # Errors
///
/// Returns [`ApiError::Parse`] when the body does not match the wire schema.
pub fn parse_items_page(body: &str) -> Result<ItemsPage, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))
}

impl ListResource {
    fn into_handle(self) -> SyncList {
        SyncList {
            sid: self.sid,
            unique_name: self.unique_name.unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// REST client for the Sync API, authenticated with basic auth.
pub struct TwilioSync {
    client: reqwest::Client,
    credentials: Credentials,
    base: Url,
}

impl TwilioSync {
    /// Create a client from credentials and endpoint bases.
    pub fn new(credentials: Credentials, endpoints: &Endpoints) -> Self {
        Self {
            client: build_http_client(),
            credentials,
            base: endpoints.sync.clone(),
        }
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|e| ApiError::Parse(format!("invalid request URL {path}: {e}")))
    }

    async fn get(&self, url: Url) -> Result<String, ApiError> {
        let response = self
            .client
            .get(url)
            .basic_auth(&self.credentials.account_sid, Some(self.credentials.auth_token()))
            .send()
            .await?;
        check_response(response).await
    }

    async fn post_form(&self, url: Url, form: &[(&str, &str)]) -> Result<String, ApiError> {
        let response = self
            .client
            .post(url)
            .basic_auth(&self.credentials.account_sid, Some(self.credentials.auth_token()))
            .form(form)
            .send()
            .await?;
        check_response(response).await
    }
}

#[async_trait]
impl ListStore for TwilioSync {
    async fn fetch_service(&self, service_sid: &str) -> Result<SyncService, ApiError> {
        let url = self.url(&format!("Services/{service_sid}"))?;
        let body = self.get(url).await?;
        let resource = parse_service(&body)?;
        Ok(SyncService { sid: resource.sid })
    }

    async fn create_service(&self, service_sid: &str) -> Result<SyncService, ApiError> {
        let url = self.url("Services")?;
        let body = self.post_form(url, &[("UniqueName", service_sid)]).await?;
        let resource = parse_service(&body)?;
        debug!(sid = %resource.sid, "created sync service");
        Ok(SyncService { sid: resource.sid })
    }

    async fn fetch_list(&self, service_sid: &str, name: &str) -> Result<SyncList, ApiError> {
        let url = self.url(&format!("Services/{service_sid}/Lists/{name}"))?;
        let body = self.get(url).await?;
        Ok(parse_list(&body)?.into_handle())
    }

    async fn delete_list(&self, service_sid: &str, list_sid: &str) -> Result<(), ApiError> {
        let url = self.url(&format!("Services/{service_sid}/Lists/{list_sid}"))?;
        let response = self
            .client
            .delete(url)
            .basic_auth(&self.credentials.account_sid, Some(self.credentials.auth_token()))
            .send()
            .await?;
        check_response(response).await?;
        Ok(())
    }

    async fn create_list(&self, service_sid: &str, name: &str) -> Result<SyncList, ApiError> {
        let url = self.url(&format!("Services/{service_sid}/Lists"))?;
        let body = self.post_form(url, &[("UniqueName", name)]).await?;
        let list = parse_list(&body)?.into_handle();
        debug!(sid = %list.sid, name, "created sync list");
        Ok(list)
    }

    async fn create_item(
        &self,
        service_sid: &str,
        list_sid: &str,
        data: serde_json::Value,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("Services/{service_sid}/Lists/{list_sid}/Items"))?;
        let payload =
            serde_json::to_string(&data).map_err(|e| ApiError::Parse(e.to_string()))?;
        self.post_form(url, &[("Data", &payload)]).await?;
        Ok(())
    }

    async fn list_items(
        &self,
        service_sid: &str,
        list_name: &str,
    ) -> Result<Vec<SyncItem>, ApiError> {
        let mut url = self.url(&format!("Services/{service_sid}/Lists/{list_name}/Items"))?;
        url.query_pairs_mut().append_pair("PageSize", ITEM_PAGE_SIZE);

        let mut all = Vec::new();
        loop {
            let body = self.get(url).await?;
            let page = parse_items_page(&body)?;
            all.extend(page.items.into_iter().map(|item| SyncItem {
                index: item.index,
                data: item.data,
            }));
            match page.meta.next_page_url {
                Some(next) => {
                    url = Url::parse(&next)
                        .map_err(|e| ApiError::Parse(format!("invalid next page URL: {e}")))?;
                }
                None => break,
            }
        }
        Ok(all)
    }
}
