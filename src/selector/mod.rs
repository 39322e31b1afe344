//! # Installment Selector
//!
//! Drives `NoBankSelected → BankSelected → PlansLoaded → PlanChosen` for one
//! widget. Requests are split in three steps so a host can interleave them:
//! [`InstallmentSelector::select_source`] issues a [`PlanRequest`],
//! [`PlanRequest::fetch`] runs it against the backend, and
//! [`InstallmentSelector::apply`] accepts the result only if no newer request was
//! issued in between.

pub mod fetch;
pub mod state;

pub use fetch::{FetchedPlans, PlanRequest, fetch_default_plans, fetch_plans_for_bank};
pub use state::{PlanOrigin, PlanSource, RequestTicket, SelectionPhase, SelectionState};

use log::{debug, warn};
use rust_decimal::Decimal;

use crate::{
    card::CardIdentification,
    models::{InstallmentPlan, ProductId},
};

/// Finds the plan with `chosen_count`; count 1 always resolves, synthesized from
/// `amount` when the list has no explicit entry.
pub fn select_plan(
    plans: &[InstallmentPlan],
    chosen_count: u32,
    amount: Decimal,
) -> Option<InstallmentPlan> {
    plans
        .iter()
        .find(|plan| plan.count == chosen_count)
        .cloned()
        .or_else(|| (chosen_count == 1).then(|| InstallmentPlan::single_payment(amount)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// A newer request was issued, or the selection was cleared, after this one.
    Stale,
}

#[derive(Debug)]
pub struct InstallmentSelector {
    state: SelectionState,
    product_id: Option<ProductId>,
    last_ticket: u64,
    pending: Option<RequestTicket>,
}

impl InstallmentSelector {
    pub fn new(base_amount: Decimal, product_id: Option<ProductId>) -> Self {
        Self {
            state: SelectionState::new(base_amount),
            product_id,
            last_ticket: 0,
            pending: None,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn pending(&self) -> Option<RequestTicket> {
        self.pending
    }

    pub fn record_card(&mut self, digits: &str, identification: Option<&CardIdentification>) {
        self.state.card_number_digits = digits.to_string();
        self.state.detected_bank = identification.and_then(|id| id.bank.clone());
        self.state.detected_brand = identification.map(|id| id.brand).unwrap_or_default();
    }

    /// Moves to `BankSelected(source)` and issues a request for its plans.
    ///
    /// Re-selecting the current source keeps the loaded plans and the choice, and
    /// issues nothing, unless its request was invalidated before plans arrived. `None` clears the selection and invalidates any request in
    /// flight.
    pub fn select_source(&mut self, source: Option<PlanSource>) -> Option<PlanRequest> {
        let Some(source) = source else {
            self.invalidate();
            self.state.phase = SelectionPhase::NoBankSelected;
            return None;
        };

        // an invalidated request leaves nothing to wait for: ask again
        let settled = self.state.phase.origin().is_some() || self.pending.is_some();
        if settled && self.state.phase.source() == Some(&source) {
            debug!("{source} already selected");
            return None;
        }

        self.last_ticket += 1;
        let ticket = RequestTicket(self.last_ticket);
        self.pending = Some(ticket);
        self.state.phase = SelectionPhase::BankSelected {
            source: source.clone(),
        };

        Some(PlanRequest {
            ticket,
            source,
            amount: self.state.base_amount,
            product_id: self.product_id,
        })
    }

    /// Drops the request in flight, if any. Its result will be stale.
    pub fn invalidate(&mut self) {
        self.pending = None;
    }

    pub fn apply(&mut self, fetched: FetchedPlans) -> ApplyOutcome {
        if self.pending != Some(fetched.ticket) {
            debug!("discarding stale plans {} from {}", fetched.ticket, fetched.source);
            return ApplyOutcome::Stale;
        }

        self.pending = None;
        self.state.phase = SelectionPhase::PlansLoaded {
            source: fetched.source,
            origin: fetched.origin,
            plans: fetched.plans,
        };

        ApplyOutcome::Applied
    }

    /// Chooses the plan with `count` among the loaded ones.
    ///
    /// An unknown count resets to single payment. Returns the plan now in effect.
    pub fn choose(&mut self, count: u32) -> InstallmentPlan {
        let base_amount = self.state.base_amount;
        let plan = match select_plan(self.state.phase.plans(), count, base_amount) {
            Some(plan) => plan,
            None => {
                warn!("installment count {count} is not offered, using single payment");
                InstallmentPlan::single_payment(base_amount)
            }
        };

        let phase = std::mem::replace(&mut self.state.phase, SelectionPhase::NoBankSelected);
        self.state.phase = match phase {
            SelectionPhase::PlansLoaded {
                source,
                origin,
                plans,
            }
            | SelectionPhase::PlanChosen {
                source,
                origin,
                plans,
                ..
            } => SelectionPhase::PlanChosen {
                source,
                origin,
                plans,
                plan: plan.clone(),
            },
            // nothing loaded yet: only the implicit single payment exists
            other => other,
        };

        plan
    }

    pub fn reset_to_single_payment(&mut self) -> InstallmentPlan {
        self.choose(1)
    }
}
