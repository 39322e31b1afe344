use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProviderId;
use crate::consts;

/// One installment schedule as priced by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InstallmentPlan {
    pub count: u32,
    pub monthly_amount: Decimal,
    pub total_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commission_rate: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commission_amount: Option<Decimal>,
}

impl InstallmentPlan {
    /// The implicit "Tek Çekim" plan: one charge of the whole amount, no commission.
    pub fn single_payment(amount: Decimal) -> Self {
        Self {
            count: 1,
            monthly_amount: amount,
            total_amount: amount,
            commission_rate: None,
            commission_amount: None,
        }
    }

    pub fn is_single_payment(&self) -> bool {
        self.count == 1
    }

    /// Installment fee added on top of the base amount.
    ///
    /// Always zero for single payment.
    pub fn fee(&self) -> Decimal {
        if self.is_single_payment() {
            return Decimal::ZERO;
        }

        self.commission_amount
            .filter(|amount| amount.is_sign_positive())
            .unwrap_or(Decimal::ZERO)
    }

    /// Total the shopper pays for `base_amount` with this plan.
    pub fn grand_total(&self, base_amount: Decimal) -> Decimal {
        base_amount + self.fee()
    }

    fn validation_issue(&self) -> Option<&'static str> {
        if !(consts::MIN_INSTALLMENT_COUNT..=consts::MAX_INSTALLMENT_COUNT).contains(&self.count) {
            return Some("installment count out of range");
        }

        let negative = [
            Some(self.monthly_amount),
            Some(self.total_amount),
            self.commission_rate,
            self.commission_amount,
        ]
        .into_iter()
        .flatten()
        .any(|value| value.is_sign_negative() && !value.is_zero());

        negative.then_some("negative amount")
    }
}

/// Cleans a backend plan list for display.
///
/// Invalid entries are dropped, duplicate counts keep their first occurrence, the
/// list is ordered by count, and exactly one single-payment entry built from
/// `amount` leads it.
pub fn normalize_plans(amount: Decimal, plans: Vec<InstallmentPlan>) -> Vec<InstallmentPlan> {
    let mut normalized = vec![InstallmentPlan::single_payment(amount)];

    for plan in plans {
        if let Some(issue) = plan.validation_issue() {
            warn!("dropping installment plan {}: {}", plan.count, issue);
            continue;
        }
        if plan.is_single_payment() || normalized.iter().any(|p| p.count == plan.count) {
            continue;
        }
        normalized.push(plan);
    }

    normalized.sort_by_key(|plan| plan.count);
    normalized
}

/// Fields handed to the order-submission form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutFields {
    pub installment_count: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub installment_fee: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<ProviderId>,
}
