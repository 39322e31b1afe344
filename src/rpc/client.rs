//! # Storefront JSON-RPC client
//!
//! Posts JSON-RPC `call` envelopes to the storefront's `/payment/turkey_pos/*`
//! routes and unwraps the `result` member.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use serde::{Serialize, de::DeserializeOwned};
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use super::{
    InstallmentBackend,
    schemas::{
        DefaultInstallmentsRequest, DefaultProviderResponse, InstallmentOptionsRequest,
        InstallmentOptionsResponse, InstallmentsResponse, JsonRpcReply, JsonRpcRequest,
        ProductInstallmentsRequest,
    },
};
use crate::{config::AppConfig, consts};

/// No parameters, serialized as `{}`.
#[derive(Serialize)]
struct NoParams {}

pub struct JsonRpcBackend {
    /// HTTP client for making API requests
    client: reqwest::Client,
    /// Storefront base URL, without trailing slash
    base_url: String,
    next_id: AtomicU64,
}

impl JsonRpcBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn from_config(app_config: &AppConfig) -> Result<Self> {
        Self::new(&app_config.backend_url, app_config.http_timeout())
    }

    fn endpoint(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    async fn call<P, R>(&self, route: &str, params: &P) -> Result<R>
    where
        P: Serialize + Sync,
        R: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let url = self.endpoint(route);
        debug!("json-rpc call #{id} to {url}");

        let response = self
            .client
            .post(&url)
            .header("accept", "application/json")
            .json(&JsonRpcRequest::call(id, params))
            .send()
            .await
            .with_context(|| format!("Failed to send request to {url}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());

            anyhow::bail!("{route} returned error status {status}: {body}");
        }

        let reply: JsonRpcReply<R> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {route} response"))?;

        if let Some(error) = reply.error {
            anyhow::bail!("{route} returned json-rpc error {}: {}", error.code, error.message);
        }

        reply
            .result
            .with_context(|| format!("{route} response has no result"))
    }
}

#[async_trait]
impl InstallmentBackend for JsonRpcBackend {
    async fn get_product_installments(
        &self,
        request: &ProductInstallmentsRequest,
    ) -> Result<InstallmentsResponse> {
        self.call(consts::ROUTE_PRODUCT_INSTALLMENTS, request).await
    }

    async fn get_default_installments(
        &self,
        request: &DefaultInstallmentsRequest,
    ) -> Result<InstallmentsResponse> {
        self.call(consts::ROUTE_DEFAULT_INSTALLMENTS, request).await
    }

    async fn get_default_provider(&self) -> Result<DefaultProviderResponse> {
        self.call(consts::ROUTE_DEFAULT_PROVIDER, &NoParams {}).await
    }

    async fn installment_options(
        &self,
        request: &InstallmentOptionsRequest,
    ) -> Result<InstallmentOptionsResponse> {
        self.call(consts::ROUTE_INSTALLMENT_OPTIONS, request).await
    }
}
