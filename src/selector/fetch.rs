//! Plan retrieval with unconditional fallback.
//!
//! None of these functions fail: a transport error, a `success: false` answer or
//! an empty plan set all degrade to the default plans, and ultimately to the
//! single-payment plan alone.

use log::{info, warn};
use rust_decimal::Decimal;

use super::state::{PlanOrigin, PlanSource, RequestTicket};
use crate::{
    errors::PlanFetchError,
    models::{BankCode, InstallmentPlan, ProductId, ProviderId, plan::normalize_plans},
    rpc::{
        DefaultInstallmentsRequest, InstallmentBackend, InstallmentOptionsRequest,
        InstallmentsResponse, ProductInstallmentsRequest,
    },
};

/// A plan request issued by the selector, to be fetched outside of it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub ticket: RequestTicket,
    pub source: PlanSource,
    pub amount: Decimal,
    pub product_id: Option<ProductId>,
}

impl PlanRequest {
    pub async fn fetch(self, backend: &dyn InstallmentBackend) -> FetchedPlans {
        let (origin, plans, failure) = match &self.source {
            PlanSource::Bank(bank) => {
                fetch_plans_for_bank(backend, bank, self.amount, self.product_id).await
            }
            PlanSource::Provider(provider_id) => {
                provider_plans(backend, *provider_id, self.amount).await
            }
            PlanSource::DefaultProvider => match fetch_default_provider(backend).await {
                Some(provider_id) => provider_plans(backend, provider_id, self.amount).await,
                None => (
                    PlanOrigin::SinglePaymentOnly,
                    Vec::new(),
                    Some(PlanFetchError::NoPlans),
                ),
            },
            PlanSource::Default => {
                let (origin, plans) = fetch_default_plans(backend, self.amount).await;
                (origin, plans, None)
            }
        };

        FetchedPlans {
            ticket: self.ticket,
            source: self.source,
            origin,
            plans: normalize_plans(self.amount, plans),
            failure,
        }
    }
}

/// Outcome of a [`PlanRequest`], ready to be applied to the selector.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPlans {
    pub ticket: RequestTicket,
    pub source: PlanSource,
    pub origin: PlanOrigin,
    /// Normalized: the single-payment plan first, then valid installments by count.
    pub plans: Vec<InstallmentPlan>,
    pub failure: Option<PlanFetchError>,
}

async fn provider_plans(
    backend: &dyn InstallmentBackend,
    provider_id: ProviderId,
    amount: Decimal,
) -> (PlanOrigin, Vec<InstallmentPlan>, Option<PlanFetchError>) {
    match fetch_provider_plans(backend, provider_id, amount).await {
        Ok(plans) => (PlanOrigin::Provider(provider_id), plans, None),
        Err(err) => {
            info!("no installment options for provider {provider_id}, single payment only: {err}");
            (PlanOrigin::SinglePaymentOnly, Vec::new(), Some(err))
        }
    }
}

fn plans_from(response: InstallmentsResponse) -> Result<Vec<InstallmentPlan>, PlanFetchError> {
    if !response.success {
        return Err(PlanFetchError::MalformedResponse(
            response
                .message
                .unwrap_or_else(|| "success is false".to_string()),
        ));
    }

    match response.installments {
        None => Err(PlanFetchError::MalformedResponse(
            "installments missing".to_string(),
        )),
        Some(plans) if plans.is_empty() => Err(PlanFetchError::NoPlans),
        Some(plans) => Ok(plans),
    }
}

/// Plans the backend defines for `bank`.
pub async fn fetch_bank_plans(
    backend: &dyn InstallmentBackend,
    bank: &BankCode,
    amount: Decimal,
    product_id: Option<ProductId>,
) -> Result<Vec<InstallmentPlan>, PlanFetchError> {
    let request = ProductInstallmentsRequest {
        bank_code: bank.clone(),
        amount,
        product_id,
    };

    let response = backend
        .get_product_installments(&request)
        .await
        .map_err(|err| PlanFetchError::FetchFailure(format!("{err:#}")))?;

    plans_from(response)
}

/// Bank plans, or the default plans when the bank has none or the call fails.
///
/// The error, if any, is only informational: the returned plans are always usable.
pub async fn fetch_plans_for_bank(
    backend: &dyn InstallmentBackend,
    bank: &BankCode,
    amount: Decimal,
    product_id: Option<ProductId>,
) -> (PlanOrigin, Vec<InstallmentPlan>, Option<PlanFetchError>) {
    match fetch_bank_plans(backend, bank, amount, product_id).await {
        Ok(plans) => (
            PlanOrigin::Bank(bank.clone()),
            normalize_plans(amount, plans),
            None,
        ),
        Err(err) => {
            warn!("plans for bank {bank} unavailable, using default plans: {err}");
            let (origin, plans) = fetch_default_plans(backend, amount).await;
            (origin, plans, Some(err))
        }
    }
}

/// Default bank plans; falls back to single payment only when those fail too.
///
/// The list is normalized, so it always holds at least the single-payment plan.
pub async fn fetch_default_plans(
    backend: &dyn InstallmentBackend,
    amount: Decimal,
) -> (PlanOrigin, Vec<InstallmentPlan>) {
    let result = backend
        .get_default_installments(&DefaultInstallmentsRequest { amount })
        .await
        .map_err(|err| PlanFetchError::FetchFailure(format!("{err:#}")))
        .and_then(plans_from);

    let (origin, plans) = match result {
        Ok(plans) => (PlanOrigin::Default, plans),
        Err(PlanFetchError::NoPlans) => (PlanOrigin::Default, Vec::new()),
        Err(err) => {
            warn!("default plans unavailable, single payment only: {err}");
            (PlanOrigin::SinglePaymentOnly, Vec::new())
        }
    };

    (origin, normalize_plans(amount, plans))
}

pub async fn fetch_provider_plans(
    backend: &dyn InstallmentBackend,
    provider_id: ProviderId,
    amount: Decimal,
) -> Result<Vec<InstallmentPlan>, PlanFetchError> {
    let response = backend
        .installment_options(&InstallmentOptionsRequest {
            provider_id,
            amount,
        })
        .await
        .map_err(|err| PlanFetchError::FetchFailure(format!("{err:#}")))?;

    if !response.success {
        return Err(PlanFetchError::MalformedResponse(
            response
                .error
                .unwrap_or_else(|| "success is false".to_string()),
        ));
    }

    match response.options {
        None => Err(PlanFetchError::MalformedResponse(
            "options missing".to_string(),
        )),
        Some(options) if options.is_empty() => Err(PlanFetchError::NoPlans),
        Some(options) => Ok(options.into_iter().map(InstallmentPlan::from).collect()),
    }
}

/// The storefront's default provider, if it has one and the call succeeds.
pub async fn fetch_default_provider(backend: &dyn InstallmentBackend) -> Option<ProviderId> {
    match backend.get_default_provider().await {
        Ok(response) => response.provider_id,
        Err(err) => {
            warn!("default provider lookup failed: {err:#}");
            None
        }
    }
}
