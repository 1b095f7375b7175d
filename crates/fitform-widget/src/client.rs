//! HTTP client for the storefront config endpoint.
//!
//! Themes normally reach the app through the platform's app proxy on the shop
//! domain; storefronts where the proxy is not configured get a 404 from the
//! theme path, so the client falls back to the app host directly within the
//! same tick.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use fitform_core::slug::VariantKey;

use crate::error::WidgetError;
use crate::types::ConfigResponse;

const PROXY_PATH: &str = "/apps/fitform/config";
const DIRECT_PATH: &str = "/api/v1/storefront/config";

/// The server wraps every payload in a `{"data": ..., "meta": ...}` envelope.
#[derive(Debug, Deserialize)]
struct Envelope {
    data: ConfigResponse,
}

/// Fetches size-set configuration for the current shop and variant.
#[derive(Debug)]
pub struct ConfigClient {
    client: Client,
    proxy_url: Url,
    direct_url: Url,
}

impl ConfigClient {
    /// Creates a client for a storefront: proxy endpoint on the shop domain,
    /// direct endpoint on the app host.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`WidgetError::InvalidBaseUrl`] if either
    /// derived URL does not parse.
    pub fn new(shop: &str, app_host: &str, timeout_secs: u64) -> Result<Self, WidgetError> {
        let proxy = format!("https://{shop}{PROXY_PATH}");
        let direct = format!("{}{DIRECT_PATH}", app_host.trim_end_matches('/'));
        Self::with_base_urls(&proxy, &direct, timeout_secs)
    }

    /// Creates a client with explicit endpoint URLs (for testing with
    /// wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`WidgetError::InvalidBaseUrl`] if either
    /// URL does not parse.
    pub fn with_base_urls(
        proxy_url: &str,
        direct_url: &str,
        timeout_secs: u64,
    ) -> Result<Self, WidgetError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("fitform-widget/0.1")
            .build()?;
        Ok(Self {
            client,
            proxy_url: Self::parse_url(proxy_url)?,
            direct_url: Self::parse_url(direct_url)?,
        })
    }

    fn parse_url(raw: &str) -> Result<Url, WidgetError> {
        Url::parse(raw).map_err(|e| WidgetError::InvalidBaseUrl {
            url: raw.to_owned(),
            reason: e.to_string(),
        })
    }

    /// Fetches the config for a variant key, preferring the proxy endpoint.
    ///
    /// A 404 from the proxy means the proxy route is not wired up on this
    /// shop, not that the config is missing, so the direct endpoint is tried
    /// once before giving up.
    ///
    /// # Errors
    ///
    /// - [`WidgetError::NotFound`] when both endpoints 404.
    /// - [`WidgetError::UnexpectedStatus`] on other non-2xx statuses.
    /// - [`WidgetError::Http`] on network failure.
    /// - [`WidgetError::Deserialize`] if the body does not match the wire
    ///   contract.
    pub async fn fetch_config(
        &self,
        shop: &str,
        key: &VariantKey,
    ) -> Result<ConfigResponse, WidgetError> {
        match self.fetch_from(&self.proxy_url, shop, key).await {
            Err(WidgetError::NotFound { url }) => {
                tracing::debug!(proxy_url = url, "proxy route missing, retrying the direct URL");
                self.fetch_from(&self.direct_url, shop, key).await
            }
            other => other,
        }
    }

    async fn fetch_from(
        &self,
        base: &Url,
        shop: &str,
        key: &VariantKey,
    ) -> Result<ConfigResponse, WidgetError> {
        let mut url = base.clone();
        url.query_pairs_mut()
            .append_pair("shop", shop)
            .append_pair("variant", key.as_str());

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(WidgetError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(WidgetError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let text = response.text().await?;
        let envelope: Envelope =
            serde_json::from_str(&text).map_err(|e| WidgetError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;
        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_urls_are_derived_from_shop_and_host() {
        let client = ConfigClient::new("demo.myshopify.com", "https://fitform.app/", 10)
            .expect("client construction should not fail");
        assert_eq!(
            client.proxy_url.as_str(),
            "https://demo.myshopify.com/apps/fitform/config"
        );
        assert_eq!(
            client.direct_url.as_str(),
            "https://fitform.app/api/v1/storefront/config"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = ConfigClient::with_base_urls("not a url", "https://fitform.app", 10).unwrap_err();
        assert!(matches!(err, WidgetError::InvalidBaseUrl { .. }));
    }
}
