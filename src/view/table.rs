//! View-model of a plan list, independent of any markup.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::{consts, models::InstallmentPlan, selector::PlanOrigin};

/// tr-TR currency text, e.g. `₺1.050,00`.
pub fn format_currency(amount: Decimal) -> String {
    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{}{}", consts::CURRENCY_SYMBOL, format_number(amount.abs()))
}

/// tr-TR number text with 2 decimals, e.g. `1.050,00`.
pub fn format_number(amount: Decimal) -> String {
    let plain = format!("{:.2}", amount.round_dp(2));
    let (integer, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let digits: Vec<char> = integer.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (position, digit) in digits.iter().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*digit);
    }

    format!("{grouped},{fraction}")
}

pub fn plan_label(count: u32) -> String {
    if count == 1 {
        return consts::SINGLE_PAYMENT_LABEL.to_string();
    }
    format!("{count} Taksit")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanRow {
    pub count: u32,
    pub label: String,
    pub monthly: String,
    pub total: String,
    /// Commission column text: `%5` or `-`
    pub commission: String,
    /// Machine values for the option list, plain 2-decimal numbers
    pub fee_value: String,
    pub total_value: String,
    /// Option list text, e.g. `6 Taksit - ₺175,00 x 6 (+₺50,00)`
    pub option_text: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanTable {
    pub rows: Vec<PlanRow>,
    pub show_commission: bool,
    pub is_default: bool,
}

impl PlanTable {
    pub fn mark_selected(&mut self, count: u32) {
        for row in &mut self.rows {
            row.selected = row.count == count;
        }
    }
}

fn plain(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

fn row(plan: &InstallmentPlan, base_amount: Decimal) -> PlanRow {
    if plan.is_single_payment() {
        return PlanRow {
            count: 1,
            label: plan_label(1),
            monthly: format_currency(base_amount),
            total: format_currency(base_amount),
            commission: "-".to_string(),
            fee_value: plain(Decimal::ZERO),
            total_value: plain(base_amount),
            option_text: plan_label(1),
            selected: false,
        };
    }

    let fee = plan.fee();
    let mut option_text = format!(
        "{} - {} x {}",
        plan_label(plan.count),
        format_currency(plan.monthly_amount),
        plan.count
    );
    if !fee.is_zero() {
        option_text.push_str(&format!(" (+{})", format_currency(fee)));
    }

    PlanRow {
        count: plan.count,
        label: plan_label(plan.count),
        monthly: format_currency(plan.monthly_amount),
        total: format_currency(plan.total_amount),
        commission: plan
            .commission_rate
            .map(|rate| format!("%{}", rate.normalize()))
            .unwrap_or_else(|| "-".to_string()),
        fee_value: plain(fee),
        total_value: plain(plan.total_amount),
        option_text,
        selected: false,
    }
}

/// Builds the displayed plan list. The single-payment row always shows
/// `base_amount`.
pub fn render_plan_table(
    plans: &[InstallmentPlan],
    base_amount: Decimal,
    origin: &PlanOrigin,
) -> PlanTable {
    let mut rows: Vec<PlanRow> = plans.iter().map(|plan| row(plan, base_amount)).collect();
    if !rows.iter().any(|row| row.count == 1) {
        rows.insert(0, row(&InstallmentPlan::single_payment(base_amount), base_amount));
    }

    let mut table = PlanTable {
        rows,
        show_commission: !origin.is_default(),
        is_default: origin.is_default(),
    };
    table.mark_selected(1);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BankCode;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(dec!(1050)), "₺1.050,00");
        assert_eq!(format_currency(dec!(175.5)), "₺175,50");
        assert_eq!(format_currency(dec!(1234567.891)), "₺1.234.567,89");
        assert_eq!(format_currency(dec!(0)), "₺0,00");
        assert_eq!(format_currency(dec!(-12.5)), "-₺12,50");
    }

    #[test]
    fn test_render_bank_table() {
        let plans = vec![
            InstallmentPlan::single_payment(dec!(1000)),
            InstallmentPlan {
                count: 6,
                monthly_amount: dec!(175),
                total_amount: dec!(1050),
                commission_rate: Some(dec!(5.00)),
                commission_amount: Some(dec!(50)),
            },
        ];

        let table = render_plan_table(&plans, dec!(1000), &PlanOrigin::Bank(BankCode::from("teb")));

        assert!(table.show_commission);
        assert!(!table.is_default);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].label, "Tek Çekim");
        assert!(table.rows[0].selected);
        assert_eq!(table.rows[1].commission, "%5");
        assert_eq!(table.rows[1].fee_value, "50.00");
        assert_eq!(table.rows[1].option_text, "6 Taksit - ₺175,00 x 6 (+₺50,00)");
    }

    #[test]
    fn test_render_default_table_adds_single_payment() {
        let table = render_plan_table(&[], dec!(250), &PlanOrigin::Default);

        assert!(table.is_default);
        assert!(!table.show_commission);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].total, "₺250,00");
        assert_eq!(table.rows[0].fee_value, "0.00");
    }
}
