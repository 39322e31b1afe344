use derive_more::Display;
use rust_decimal::Decimal;

use crate::{
    card::CardBrand,
    models::{BankCode, CheckoutFields, InstallmentPlan, ProviderId},
};

/// Sequence number of a plan request. Only the latest one issued may be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display("#{_0}")]
pub struct RequestTicket(pub(crate) u64);

/// Where plans are requested from.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum PlanSource {
    /// Bank plans for the product page (`get_product_installments`)
    #[display("bank {_0}")]
    Bank(BankCode),
    /// Options of a provider picked at checkout (`installment_options`)
    #[display("provider {_0}")]
    Provider(ProviderId),
    /// Options of the storefront's default provider
    #[display("default provider")]
    DefaultProvider,
    /// Default bank plans (`get_default_installments`)
    #[display("default plans")]
    Default,
}

/// Which plans ended up loaded.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum PlanOrigin {
    #[display("bank {_0}")]
    Bank(BankCode),
    #[display("provider {_0}")]
    Provider(ProviderId),
    #[display("default plans")]
    Default,
    #[display("single payment only")]
    SinglePaymentOnly,
}

impl PlanOrigin {
    /// Default and single-payment lists are shown without a commission column.
    pub fn is_default(&self) -> bool {
        matches!(self, PlanOrigin::Default | PlanOrigin::SinglePaymentOnly)
    }

    pub fn provider(&self) -> Option<ProviderId> {
        match self {
            PlanOrigin::Provider(id) => Some(*id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionPhase {
    NoBankSelected,
    BankSelected {
        source: PlanSource,
    },
    PlansLoaded {
        source: PlanSource,
        origin: PlanOrigin,
        plans: Vec<InstallmentPlan>,
    },
    PlanChosen {
        source: PlanSource,
        origin: PlanOrigin,
        plans: Vec<InstallmentPlan>,
        plan: InstallmentPlan,
    },
}

impl SelectionPhase {
    pub fn source(&self) -> Option<&PlanSource> {
        match self {
            SelectionPhase::NoBankSelected => None,
            SelectionPhase::BankSelected { source }
            | SelectionPhase::PlansLoaded { source, .. }
            | SelectionPhase::PlanChosen { source, .. } => Some(source),
        }
    }

    pub fn plans(&self) -> &[InstallmentPlan] {
        match self {
            SelectionPhase::PlansLoaded { plans, .. } | SelectionPhase::PlanChosen { plans, .. } => {
                plans.as_slice()
            }
            _ => &[],
        }
    }

    pub fn origin(&self) -> Option<&PlanOrigin> {
        match self {
            SelectionPhase::PlansLoaded { origin, .. }
            | SelectionPhase::PlanChosen { origin, .. } => Some(origin),
            _ => None,
        }
    }
}

/// Per-widget selection state.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionState {
    pub card_number_digits: String,
    pub detected_bank: Option<BankCode>,
    pub detected_brand: CardBrand,
    /// Amount the page was opened with. Never overwritten by a fee.
    pub base_amount: Decimal,
    pub phase: SelectionPhase,
}

impl SelectionState {
    pub fn new(base_amount: Decimal) -> Self {
        Self {
            card_number_digits: String::new(),
            detected_bank: None,
            detected_brand: CardBrand::Unknown,
            base_amount,
            phase: SelectionPhase::NoBankSelected,
        }
    }

    /// The explicit choice, or the implicit single-payment plan.
    pub fn chosen_plan(&self) -> InstallmentPlan {
        match &self.phase {
            SelectionPhase::PlanChosen { plan, .. } => plan.clone(),
            _ => InstallmentPlan::single_payment(self.base_amount),
        }
    }

    pub fn installment_fee(&self) -> Decimal {
        self.chosen_plan().fee()
    }

    pub fn displayed_total(&self) -> Decimal {
        self.chosen_plan().grand_total(self.base_amount)
    }

    pub fn checkout_fields(&self) -> CheckoutFields {
        let plan = self.chosen_plan();

        CheckoutFields {
            installment_count: plan.count,
            installment_fee: plan.fee(),
            provider_id: self.phase.origin().and_then(PlanOrigin::provider),
        }
    }
}
