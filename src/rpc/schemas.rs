//! Request and response bodies of the storefront installment routes.

use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};

use crate::models::{BankCode, InstallmentPlan, ProductId, ProviderId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductInstallmentsRequest {
    pub bank_code: BankCode,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub product_id: Option<ProductId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefaultInstallmentsRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstallmentOptionsRequest {
    pub provider_id: ProviderId,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Decodes a list entry by entry, dropping the entries that do not decode so one
/// bad row does not cost the whole reply.
fn skip_invalid_entries<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Some(raw) = Option::<Vec<serde_json::Value>>::deserialize(deserializer)? else {
        return Ok(None);
    };

    let entries = raw
        .into_iter()
        .enumerate()
        .filter_map(|(position, entry)| {
            serde_json::from_value(entry)
                .map_err(|e| warn!("skipping undecodable plan entry {position}: {e}"))
                .ok()
        })
        .collect();

    Ok(Some(entries))
}

/// Answer of `get_product_installments` and `get_default_installments`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InstallmentsResponse {
    pub success: bool,
    #[serde(default, deserialize_with = "skip_invalid_entries")]
    pub installments: Option<Vec<InstallmentPlan>>,
    /// Provider display name
    #[serde(default)]
    pub bank: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DefaultProviderResponse {
    #[serde(default)]
    pub provider_id: Option<ProviderId>,
}

/// One entry of `installment_options`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InstallmentOption {
    #[serde(default)]
    pub id: Option<i64>,
    pub installment_count: u32,
    #[serde(default)]
    pub provider_name: Option<String>,
    pub monthly_amount: Decimal,
    pub total_amount: Decimal,
    #[serde(default)]
    pub commission_amount: Option<Decimal>,
    #[serde(default)]
    pub commission_rate: Option<Decimal>,
}

impl From<InstallmentOption> for InstallmentPlan {
    fn from(option: InstallmentOption) -> Self {
        InstallmentPlan {
            count: option.installment_count,
            monthly_amount: option.monthly_amount,
            total_amount: option.total_amount,
            commission_rate: option.commission_rate,
            commission_amount: option.commission_amount,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InstallmentOptionsResponse {
    pub success: bool,
    #[serde(default, deserialize_with = "skip_invalid_entries")]
    pub options: Option<Vec<InstallmentOption>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// JSON-RPC 2.0 `call` envelope the storefront's json routes expect.
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a, P> {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: &'a P,
    pub id: u64,
}

impl<'a, P> JsonRpcRequest<'a, P> {
    pub fn call(id: u64, params: &'a P) -> Self {
        Self {
            jsonrpc: "2.0",
            method: "call",
            params,
            id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcReply<R> {
    pub result: Option<R>,
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}
