//! HTML fragments for hosts that patch the page with server-rendered markup.

use log::error;
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::LazyLock;
use tera::Tera;

use super::{CardBadge, InstallmentView, Notice, PlanTable, table::format_number};
use crate::consts;

const PLAN_TABLE_TEMPLATE: &str = r#"{% if table.is_default %}<div class="alert alert-info">{{ default_banner }}</div>{% endif %}
<table class="table table-bordered table-striped">
<thead><tr><th>Taksit</th><th>Aylık Tutar</th><th>Toplam</th>{% if table.show_commission %}<th>Komisyon</th>{% endif %}</tr></thead>
<tbody>
{% for row in table.rows %}<tr{% if row.selected %} class="table-active"{% endif %}><td>{{ row.label }}</td><td>{{ row.monthly }}</td><td>{{ row.total }}</td>{% if table.show_commission %}<td>{{ row.commission }}</td>{% endif %}</tr>
{% endfor %}</tbody>
</table>"#;

const OPTION_LIST_TEMPLATE: &str = r#"{% for row in table.rows %}<option value="{{ row.count }}" data-fee="{{ row.fee_value }}" data-total="{{ row.total_value }}"{% if row.selected %} selected{% endif %}>{{ row.option_text }}</option>
{% endfor %}"#;

const BADGE_TEMPLATE: &str = r#"{% if badge.brand %}<span class="badge badge-info mr-2">{{ badge.brand }}</span>{% endif %}{% if badge.bank %}<span class="badge badge-success">{{ badge.bank }}</span>{% else %}<span class="badge badge-warning">{{ badge.unknown_bank_label }}</span>{% endif %}"#;

pub static WIDGET_TEMPLATES: LazyLock<Tera> = LazyLock::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("plan_table.html", PLAN_TABLE_TEMPLATE),
        ("option_list.html", OPTION_LIST_TEMPLATE),
        ("badge.html", BADGE_TEMPLATE),
    ])
    .expect("widget templates must parse");
    tera
});

/// How plans are laid out on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanLayout {
    /// Product page table
    Table,
    /// Checkout `<select>` options
    OptionList,
}

impl PlanLayout {
    fn template_name(&self) -> &'static str {
        match self {
            PlanLayout::Table => "plan_table.html",
            PlanLayout::OptionList => "option_list.html",
        }
    }
}

/// Latest rendered fragments, read by the host after each event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HtmlFragments {
    pub plans: String,
    pub badge: String,
    pub notice: Option<String>,
    /// Total text for `#order_total .oe_currency_value`
    pub total: String,
    /// Value of the hidden `installment_fee` input
    pub installment_fee: String,
}

#[derive(Debug)]
pub struct HtmlView {
    layout: PlanLayout,
    fragments: HtmlFragments,
}

impl HtmlView {
    pub fn new(layout: PlanLayout) -> Self {
        Self {
            layout,
            fragments: HtmlFragments::default(),
        }
    }

    pub fn fragments(&self) -> &HtmlFragments {
        &self.fragments
    }

    fn render(template_name: &str, context: serde_json::Value) -> Option<String> {
        let context = tera::Context::from_value(context)
            .map_err(|e| error!("widget context for {template_name} is invalid: {e}"))
            .ok()?;

        WIDGET_TEMPLATES
            .render(template_name, &context)
            .map_err(|e| error!("widget template {template_name} couldnt be rendered: {e}"))
            .ok()
    }
}

impl InstallmentView for HtmlView {
    fn show_plans(&mut self, table: &PlanTable) {
        let context = json!({
            "table": table,
            "default_banner": consts::DEFAULT_BANK_BANNER,
        });

        if let Some(html) = Self::render(self.layout.template_name(), context) {
            self.fragments.plans = html;
        }
    }

    fn clear_plans(&mut self) {
        self.fragments.plans.clear();
    }

    fn show_bank_badge(&mut self, badge: Option<&CardBadge>) {
        let Some(badge) = badge else {
            self.fragments.badge.clear();
            return;
        };

        if let Some(html) = Self::render("badge.html", json!({ "badge": badge })) {
            self.fragments.badge = html;
        }
    }

    fn show_notice(&mut self, notice: Option<Notice>) {
        self.fragments.notice = notice.map(|notice| notice.to_string());
    }

    fn set_total(&mut self, total: Decimal) {
        self.fragments.total = format_number(total);
    }

    fn set_fee(&mut self, fee: Decimal) {
        self.fragments.installment_fee = format!("{:.2}", fee.round_dp(2));
    }
}
