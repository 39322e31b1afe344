//! Backend collaborator: the four storefront routes the widget talks to.

pub mod client;
pub mod schemas;

pub use client::JsonRpcBackend;
pub use schemas::{
    DefaultInstallmentsRequest, DefaultProviderResponse, InstallmentOption,
    InstallmentOptionsRequest, InstallmentOptionsResponse, InstallmentsResponse,
    ProductInstallmentsRequest,
};

use async_trait::async_trait;

/// Request/response contract of the installment backend.
///
/// An `Err` means the call did not complete (transport, HTTP status, JSON-RPC
/// error or undecodable body). Application-level failures come back as `Ok` with
/// `success: false`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InstallmentBackend: Send + Sync {
    async fn get_product_installments(
        &self,
        request: &ProductInstallmentsRequest,
    ) -> anyhow::Result<InstallmentsResponse>;

    async fn get_default_installments(
        &self,
        request: &DefaultInstallmentsRequest,
    ) -> anyhow::Result<InstallmentsResponse>;

    async fn get_default_provider(&self) -> anyhow::Result<DefaultProviderResponse>;

    async fn installment_options(
        &self,
        request: &InstallmentOptionsRequest,
    ) -> anyhow::Result<InstallmentOptionsResponse>;
}

pub type ImplInstallmentBackend = std::sync::Arc<dyn InstallmentBackend>;
