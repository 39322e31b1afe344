//! Presentation side of the widget.
//!
//! The core never touches markup; it pushes view-models through
//! [`InstallmentView`]. [`html::HtmlView`] renders them with tera for hosts that
//! splice HTML fragments into the page.

pub mod html;
pub mod table;

pub use table::{PlanRow, PlanTable, format_currency, render_plan_table};

use derive_more::Display;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{card::CardBrand, consts, models::BankCode};

/// Informational messages. None of them is an error for the shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum Notice {
    #[display(
        "Bu kart için taksit seçeneği bulunamadı. Varsayılan banka ile tek çekim ödeme yapabilirsiniz."
    )]
    NoSpecialPlans,
}

/// Brand and bank badges shown under the card number field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardBadge {
    /// Upper-case brand, absent for unknown brands
    pub brand: Option<String>,
    /// Upper-case bank code, absent when the BIN is not in the table
    pub bank: Option<String>,
    pub unknown_bank_label: &'static str,
}

impl CardBadge {
    pub fn new(brand: CardBrand, bank: Option<&BankCode>) -> Self {
        Self {
            brand: brand.is_known().then(|| brand.badge_label()),
            bank: bank.map(|code| code.as_str().to_uppercase()),
            unknown_bank_label: consts::UNKNOWN_BANK_LABEL,
        }
    }
}

/// What the host page exposes to the widget.
pub trait InstallmentView {
    fn show_plans(&mut self, table: &PlanTable);

    fn clear_plans(&mut self);

    /// `None` clears the badges (fewer than 6 digits typed).
    fn show_bank_badge(&mut self, badge: Option<&CardBadge>);

    /// `None` hides the notice.
    fn show_notice(&mut self, notice: Option<Notice>);

    /// Order total as displayed to the shopper.
    fn set_total(&mut self, total: Decimal);

    /// Value of the `installment_fee` checkout field.
    fn set_fee(&mut self, fee: Decimal);
}
