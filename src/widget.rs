//! # Installment widget
//!
//! Page glue composing the [`CardIdentifier`] and the [`InstallmentSelector`]
//! behind an injected [`InstallmentView`]. The host constructs one widget per
//! page section, calls [`InstallmentWidget::on_mount`], forwards input events and
//! calls [`InstallmentWidget::on_unmount`] when the section goes away.
//!
//! Event handlers are synchronous and return the [`PlanRequest`] they issued, if
//! any. The host fetches it with [`PlanRequest::fetch`] (or lets
//! [`InstallmentWidget::resolve`] do it) and hands the result back to
//! [`InstallmentWidget::apply`]; results of superseded requests are dropped.

use log::{debug, info};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    card::{
        CardIdentification, CardIdentifier, format_for_display, sanitize_card_input,
        validation::{format_expiry, sanitize_cvv},
    },
    models::{BankCode, CheckoutFields, InstallmentPlan, ProductId, ProviderId},
    rpc::ImplInstallmentBackend,
    selector::{
        ApplyOutcome, FetchedPlans, InstallmentSelector, PlanRequest, PlanSource, SelectionState,
    },
    view::{CardBadge, InstallmentView, Notice, PlanTable, render_plan_table},
};

/// Bank dropdown of the checkout page: bank code to provider id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderDirectory {
    entries: Vec<(BankCode, ProviderId)>,
}

impl ProviderDirectory {
    pub fn new(entries: Vec<(BankCode, ProviderId)>) -> Self {
        Self { entries }
    }

    pub fn provider_for(&self, bank: &BankCode) -> Option<ProviderId> {
        self.entries
            .iter()
            .find(|(code, _)| code == bank)
            .map(|(_, provider)| *provider)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetMode {
    /// Product page: plans of the card's bank for this product
    Product { product_id: Option<ProductId> },
    /// Checkout page: options of the provider picked in the bank dropdown
    Checkout { providers: ProviderDirectory },
}

/// Result of a card number keystroke.
#[derive(Debug, Clone, PartialEq)]
pub struct CardInput {
    /// Value to put back in the input, grouped by 4
    pub display: String,
    pub identification: Option<CardIdentification>,
    pub request: Option<PlanRequest>,
}

pub struct InstallmentWidget<V: InstallmentView> {
    id: Uuid,
    mode: WidgetMode,
    identifier: CardIdentifier,
    selector: InstallmentSelector,
    backend: ImplInstallmentBackend,
    view: V,
    mounted: bool,
    /// Plans currently on the page, re-rendered when the choice changes
    shown_table: Option<PlanTable>,
}

impl<V: InstallmentView> InstallmentWidget<V> {
    pub fn new(
        mode: WidgetMode,
        base_amount: Decimal,
        backend: ImplInstallmentBackend,
        view: V,
    ) -> Self {
        let product_id = match &mode {
            WidgetMode::Product { product_id } => *product_id,
            WidgetMode::Checkout { .. } => None,
        };

        Self {
            id: Uuid::new_v4(),
            mode,
            identifier: CardIdentifier::default(),
            selector: InstallmentSelector::new(base_amount, product_id),
            backend,
            view,
            mounted: false,
            shown_table: None,
        }
    }

    pub fn with_identifier(mut self, identifier: CardIdentifier) -> Self {
        self.identifier = identifier;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn state(&self) -> &SelectionState {
        self.selector.state()
    }

    pub fn backend(&self) -> ImplInstallmentBackend {
        self.backend.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn checkout_fields(&self) -> CheckoutFields {
        self.selector.state().checkout_fields()
    }

    pub fn on_mount(&mut self) {
        debug!("widget {} mounted", self.id);
        self.mounted = true;
        self.sync_totals();
    }

    /// Drops any request in flight; later results are ignored.
    pub fn on_unmount(&mut self) {
        debug!("widget {} unmounted", self.id);
        self.mounted = false;
        self.selector.invalidate();
    }

    /// Handles a keystroke in the card number field.
    pub fn on_card_input(&mut self, raw: &str) -> CardInput {
        let digits = sanitize_card_input(raw);
        let display = format_for_display(&digits);
        let identification = self.identifier.identify(&digits);
        self.selector.record_card(&digits, identification.as_ref());

        let Some(identified) = identification.clone() else {
            self.view.show_bank_badge(None);
            // a partial number no longer identifies anything on the product page
            let request = match self.mode {
                WidgetMode::Product { .. } => self.select_source(None),
                WidgetMode::Checkout { .. } => None,
            };
            return CardInput {
                display,
                identification,
                request,
            };
        };

        info!(
            "widget {}: bin {} is {} / {}",
            self.id,
            &digits[..crate::consts::BIN_LENGTH],
            identified.brand,
            identified
                .bank
                .as_ref()
                .map(BankCode::as_str)
                .unwrap_or("unknown bank")
        );
        self.view.show_bank_badge(Some(&CardBadge::new(
            identified.brand,
            identified.bank.as_ref(),
        )));

        let source = match (&self.mode, &identified.bank) {
            (WidgetMode::Product { .. }, Some(bank)) => Some(PlanSource::Bank(bank.clone())),
            (WidgetMode::Product { .. }, None) => {
                self.view.show_notice(Some(Notice::NoSpecialPlans));
                Some(PlanSource::Default)
            }
            (WidgetMode::Checkout { providers }, Some(bank)) => Some(
                providers
                    .provider_for(bank)
                    .map(PlanSource::Provider)
                    .unwrap_or(PlanSource::DefaultProvider),
            ),
            // checkout keeps whatever bank the shopper picked by hand
            (WidgetMode::Checkout { .. }, None) => None,
        };

        let request = match source {
            Some(source) => self.select_source(Some(source)),
            None => None,
        };

        CardInput {
            display,
            identification,
            request,
        }
    }

    /// Expiry field text, `MM/YY`.
    pub fn on_expiry_input(&self, raw: &str) -> String {
        format_expiry(raw)
    }

    pub fn on_cvv_input(&self, raw: &str) -> String {
        sanitize_cvv(raw)
    }

    /// Bank chosen (or cleared) on the product page.
    pub fn select_bank(&mut self, bank: Option<BankCode>) -> Option<PlanRequest> {
        self.select_source(bank.map(PlanSource::Bank))
    }

    /// Provider chosen (or cleared) in the checkout bank dropdown.
    pub fn select_provider(&mut self, provider: Option<ProviderId>) -> Option<PlanRequest> {
        self.select_source(provider.map(PlanSource::Provider))
    }

    fn select_source(&mut self, source: Option<PlanSource>) -> Option<PlanRequest> {
        let previous = self.selector.state().phase.source().cloned();
        let request = self.selector.select_source(source);

        if self.selector.state().phase.source() != previous.as_ref() {
            self.shown_table = None;
            if request.is_none() {
                self.view.clear_plans();
                self.view.show_notice(None);
            }
            self.sync_totals();
        }

        request
    }

    /// Accepts fetched plans unless they were superseded. Returns whether the
    /// view changed.
    pub fn apply(&mut self, fetched: FetchedPlans) -> bool {
        if !self.mounted {
            debug!("widget {} is not mounted, ignoring plans {}", self.id, fetched.ticket);
            return false;
        }

        let origin = fetched.origin.clone();
        if self.selector.apply(fetched) == ApplyOutcome::Stale {
            return false;
        }

        let state = self.selector.state();
        let table = render_plan_table(state.phase.plans(), state.base_amount, &origin);
        self.view.show_plans(&table);
        self.shown_table = Some(table);
        self.view
            .show_notice(origin.is_default().then_some(Notice::NoSpecialPlans));
        self.sync_totals();

        true
    }

    /// Fetches `request` and applies the result.
    pub async fn resolve(&mut self, request: PlanRequest) -> bool {
        let backend = self.backend();
        let fetched = request.fetch(backend.as_ref()).await;
        self.apply(fetched)
    }

    /// Card keystroke followed by the fetch it triggers. Returns the display value.
    pub async fn handle_card_input(&mut self, raw: &str) -> String {
        let input = self.on_card_input(raw);
        if let Some(request) = input.request {
            self.resolve(request).await;
        }
        input.display
    }

    /// Installment count picked by the shopper.
    pub fn choose_installment(&mut self, count: u32) -> InstallmentPlan {
        let plan = self.selector.choose(count);
        if let Some(table) = self.shown_table.as_mut() {
            table.mark_selected(plan.count);
            self.view.show_plans(table);
        }
        self.sync_totals();
        plan
    }

    fn sync_totals(&mut self) {
        let state = self.selector.state();
        let total = state.displayed_total();
        let fee = state.installment_fee();

        self.view.set_total(total);
        self.view.set_fee(fee);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        rpc::{
            DefaultProviderResponse, InstallmentOption, InstallmentOptionsResponse,
            InstallmentsResponse, MockInstallmentBackend,
        },
        selector::{PlanOrigin, SelectionPhase},
        view::PlanTable,
    };
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct RecordingView {
        tables: Vec<PlanTable>,
        cleared: usize,
        badges: Vec<Option<CardBadge>>,
        notices: Vec<Option<Notice>>,
        total: Option<Decimal>,
        fee: Option<Decimal>,
    }

    impl InstallmentView for RecordingView {
        fn show_plans(&mut self, table: &PlanTable) {
            self.tables.push(table.clone());
        }

        fn clear_plans(&mut self) {
            self.cleared += 1;
        }

        fn show_bank_badge(&mut self, badge: Option<&CardBadge>) {
            self.badges.push(badge.cloned());
        }

        fn show_notice(&mut self, notice: Option<Notice>) {
            self.notices.push(notice);
        }

        fn set_total(&mut self, total: Decimal) {
            self.total = Some(total);
        }

        fn set_fee(&mut self, fee: Decimal) {
            self.fee = Some(fee);
        }
    }

    fn six_installments() -> InstallmentPlan {
        InstallmentPlan {
            count: 6,
            monthly_amount: dec!(175),
            total_amount: dec!(1050),
            commission_rate: Some(dec!(5)),
            commission_amount: Some(dec!(50)),
        }
    }

    fn bank_plans(plans: Vec<InstallmentPlan>) -> InstallmentsResponse {
        InstallmentsResponse {
            success: true,
            installments: Some(plans),
            ..Default::default()
        }
    }

    fn product_widget(backend: MockInstallmentBackend) -> InstallmentWidget<RecordingView> {
        let mut widget = InstallmentWidget::new(
            WidgetMode::Product {
                product_id: Some(ProductId(42)),
            },
            dec!(1000),
            Arc::new(backend),
            RecordingView::default(),
        );
        widget.on_mount();
        widget
    }

    #[test]
    fn test_mount_shows_base_total() {
        let widget = product_widget(MockInstallmentBackend::new());

        assert_eq!(widget.view().total, Some(dec!(1000)));
        assert_eq!(widget.view().fee, Some(Decimal::ZERO));
        assert_eq!(widget.state().phase, SelectionPhase::NoBankSelected);
    }

    #[tokio::test]
    async fn test_bank_card_loads_bank_plans() {
        let mut backend = MockInstallmentBackend::new();
        backend
            .expect_get_product_installments()
            .withf(|req| req.bank_code.as_str() == "garanti" && req.product_id == Some(ProductId(42)))
            .times(1)
            .returning(|_| Ok(bank_plans(vec![six_installments()])));
        let mut widget = product_widget(backend);

        let display = widget.handle_card_input("5149 1512 3456 7890").await;

        assert_eq!(display, "5149 1512 3456 7890");
        assert_eq!(widget.state().detected_bank, Some(BankCode::from("garanti")));
        let table = widget.view().tables.last().unwrap();
        assert!(table.show_commission);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(widget.view().notices.last(), Some(&None));

        // further keystrokes on the same bank do not refetch
        widget.handle_card_input("5149 1512 3456 78901").await;
        assert_eq!(widget.view().tables.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_bank_fetch_degrades_to_single_payment() {
        let mut backend = MockInstallmentBackend::new();
        backend.expect_get_product_installments().returning(|_| {
            Ok(InstallmentsResponse {
                success: false,
                ..Default::default()
            })
        });
        backend
            .expect_get_default_installments()
            .returning(|_| Err(anyhow::anyhow!("502 Bad Gateway")));
        let mut widget = product_widget(backend);

        widget.handle_card_input("4546711234567890").await;

        let table = widget.view().tables.last().unwrap();
        let single: Vec<_> = table.rows.iter().filter(|row| row.count == 1).collect();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].total_value, "1000.00");
        assert_eq!(widget.view().fee, Some(Decimal::ZERO));
        assert_eq!(widget.view().notices.last(), Some(&Some(Notice::NoSpecialPlans)));
        assert_eq!(widget.checkout_fields().installment_fee, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_unknown_bank_uses_default_plans() {
        let mut backend = MockInstallmentBackend::new();
        backend.expect_get_product_installments().times(0);
        backend
            .expect_get_default_installments()
            .times(1)
            .returning(|_| Ok(bank_plans(vec![six_installments()])));
        let mut widget = product_widget(backend);

        widget.handle_card_input("4111111111111111").await;

        let badge = widget.view().badges.last().unwrap().clone().unwrap();
        assert_eq!(badge.brand.as_deref(), Some("VISA"));
        assert_eq!(badge.bank, None);
        assert!(widget.view().tables.last().unwrap().is_default);
        assert_eq!(
            widget.state().phase.origin(),
            Some(&PlanOrigin::Default)
        );
    }

    #[tokio::test]
    async fn test_fee_applied_and_restored() {
        let mut backend = MockInstallmentBackend::new();
        backend
            .expect_get_product_installments()
            .returning(|_| Ok(bank_plans(vec![six_installments()])));
        let mut widget = product_widget(backend);
        widget.handle_card_input("5149151234567890").await;

        widget.choose_installment(6);
        assert_eq!(widget.view().total, Some(dec!(1050)));
        assert_eq!(widget.view().fee, Some(dec!(50)));
        assert_eq!(widget.checkout_fields().installment_count, 6);

        widget.choose_installment(1);
        assert_eq!(widget.view().total, Some(dec!(1000)));
        assert_eq!(widget.view().fee, Some(Decimal::ZERO));
    }

    #[tokio::test]
    async fn test_late_response_of_previous_bank_is_ignored() {
        let mut backend = MockInstallmentBackend::new();
        backend
            .expect_get_product_installments()
            .withf(|req| req.bank_code.as_str() == "akbank")
            .returning(|_| {
                Ok(bank_plans(vec![InstallmentPlan {
                    count: 3,
                    monthly_amount: dec!(340),
                    total_amount: dec!(1020),
                    commission_rate: Some(dec!(2)),
                    commission_amount: Some(dec!(20)),
                }]))
            });
        backend
            .expect_get_product_installments()
            .withf(|req| req.bank_code.as_str() == "garanti")
            .returning(|_| Ok(bank_plans(vec![six_installments()])));
        let mut widget = product_widget(backend);

        let request_a = widget.select_bank(Some(BankCode::from("akbank"))).unwrap();
        let request_b = widget.select_bank(Some(BankCode::from("garanti"))).unwrap();
        let backend = widget.backend();
        let fetched_b = request_b.fetch(backend.as_ref()).await;
        let fetched_a = request_a.fetch(backend.as_ref()).await;

        assert!(widget.apply(fetched_b));
        assert!(!widget.apply(fetched_a));

        assert_eq!(
            widget.state().phase.origin(),
            Some(&PlanOrigin::Bank(BankCode::from("garanti")))
        );
        let counts: Vec<u32> = widget.state().phase.plans().iter().map(|p| p.count).collect();
        assert_eq!(counts, vec![1, 6]);
        assert_eq!(widget.view().tables.len(), 1);
    }

    #[tokio::test]
    async fn test_unmount_drops_in_flight_results() {
        let mut backend = MockInstallmentBackend::new();
        backend
            .expect_get_product_installments()
            .returning(|_| Ok(bank_plans(vec![six_installments()])));
        let mut widget = product_widget(backend);

        let request = widget.select_bank(Some(BankCode::from("garanti"))).unwrap();
        widget.on_unmount();

        assert!(!widget.resolve(request).await);
        assert!(widget.view().tables.is_empty());
    }

    #[tokio::test]
    async fn test_partial_number_clears_product_selection() {
        let mut backend = MockInstallmentBackend::new();
        backend
            .expect_get_product_installments()
            .returning(|_| Ok(bank_plans(vec![six_installments()])));
        let mut widget = product_widget(backend);
        widget.handle_card_input("514915").await;
        widget.choose_installment(6);

        let input = widget.on_card_input("5149");

        assert_eq!(input.display, "5149");
        assert_eq!(input.request, None);
        assert_eq!(widget.state().phase, SelectionPhase::NoBankSelected);
        assert_eq!(widget.view().cleared, 1);
        assert_eq!(widget.view().total, Some(dec!(1000)));
        assert_eq!(widget.view().badges.last(), Some(&None));
    }

    fn checkout_widget(backend: MockInstallmentBackend) -> InstallmentWidget<RecordingView> {
        let providers = ProviderDirectory::new(vec![
            (BankCode::from("garanti"), ProviderId(3)),
            (BankCode::from("akbank"), ProviderId(4)),
        ]);
        let mut widget = InstallmentWidget::new(
            WidgetMode::Checkout { providers },
            dec!(1000),
            Arc::new(backend),
            RecordingView::default(),
        );
        widget.on_mount();
        widget
    }

    fn options(count: u32, commission: Decimal) -> InstallmentOptionsResponse {
        InstallmentOptionsResponse {
            success: true,
            options: Some(vec![InstallmentOption {
                id: None,
                installment_count: count,
                provider_name: None,
                monthly_amount: (dec!(1000) + commission) / Decimal::from(count),
                total_amount: dec!(1000) + commission,
                commission_amount: Some(commission),
                commission_rate: None,
            }]),
            error: None,
        }
    }

    #[tokio::test]
    async fn test_checkout_card_selects_provider() {
        let mut backend = MockInstallmentBackend::new();
        backend
            .expect_installment_options()
            .withf(|req| req.provider_id == ProviderId(3) && req.amount == dec!(1000))
            .times(1)
            .returning(|_| Ok(options(6, dec!(50))));
        let mut widget = checkout_widget(backend);

        widget.handle_card_input("5409 1512").await;
        widget.handle_card_input("5149151234").await;
        widget.choose_installment(6);

        let fields = widget.checkout_fields();
        assert_eq!(fields.provider_id, Some(ProviderId(3)));
        assert_eq!(fields.installment_fee, dec!(50));
        assert_eq!(widget.view().total, Some(dec!(1050)));
    }

    #[tokio::test]
    async fn test_checkout_bank_without_provider_uses_default_provider() {
        let mut backend = MockInstallmentBackend::new();
        backend
            .expect_get_default_provider()
            .times(1)
            .returning(|| Ok(DefaultProviderResponse { provider_id: Some(ProviderId(7)) }));
        backend
            .expect_installment_options()
            .withf(|req| req.provider_id == ProviderId(7))
            .returning(|_| Ok(options(3, dec!(20))));
        let mut widget = checkout_widget(backend);

        widget.handle_card_input("402589 0000").await;

        assert_eq!(
            widget.state().phase.origin(),
            Some(&PlanOrigin::Provider(ProviderId(7)))
        );
        assert_eq!(widget.checkout_fields().provider_id, Some(ProviderId(7)));
    }

    #[tokio::test]
    async fn test_checkout_manual_provider_and_clear() {
        let mut backend = MockInstallmentBackend::new();
        backend
            .expect_installment_options()
            .returning(|_| Ok(options(6, dec!(50))));
        let mut widget = checkout_widget(backend);

        let request = widget.select_provider(Some(ProviderId(4))).unwrap();
        assert!(widget.resolve(request).await);
        widget.choose_installment(6);
        assert_eq!(widget.view().fee, Some(dec!(50)));

        assert_eq!(widget.select_provider(None), None);
        assert_eq!(widget.view().cleared, 1);
        assert_eq!(widget.view().total, Some(dec!(1000)));
        assert_eq!(widget.view().fee, Some(Decimal::ZERO));

        // an unidentified card leaves the manual choice alone
        let input = widget.on_card_input("5555555555554444");
        assert_eq!(input.request, None);
    }

    #[test]
    fn test_expiry_and_cvv_inputs() {
        let widget = product_widget(MockInstallmentBackend::new());

        assert_eq!(widget.on_expiry_input("0728"), "07/28");
        assert_eq!(widget.on_cvv_input("12x34"), "1234");
    }

    #[tokio::test]
    async fn test_remount_reloads_plans_for_same_card() {
        let mut backend = MockInstallmentBackend::new();
        backend
            .expect_get_product_installments()
            .times(1)
            .returning(|_| Ok(bank_plans(vec![six_installments()])));
        let mut widget = product_widget(backend);

        let dropped = widget.on_card_input("5149151234567890");
        assert!(dropped.request.is_some());
        widget.on_unmount();
        widget.on_mount();

        let retried = widget.on_card_input("5149151234567890");
        let request = retried.request.expect("plans are requested again");
        assert!(widget.resolve(request).await);

        assert_eq!(
            widget.state().phase.origin(),
            Some(&PlanOrigin::Bank(BankCode::from("garanti")))
        );
        assert_eq!(widget.view().tables.len(), 1);
    }

    #[tokio::test]
    async fn test_choice_is_marked_in_rendered_plans() {
        let mut backend = MockInstallmentBackend::new();
        backend
            .expect_get_product_installments()
            .returning(|_| Ok(bank_plans(vec![six_installments()])));
        let mut widget = product_widget(backend);
        widget.handle_card_input("5149151234567890").await;

        widget.choose_installment(6);

        let table = widget.view().tables.last().unwrap();
        let selected: Vec<u32> = table.rows.iter().filter(|r| r.selected).map(|r| r.count).collect();
        assert_eq!(selected, vec![6]);

        widget.choose_installment(1);
        let table = widget.view().tables.last().unwrap();
        let selected: Vec<u32> = table.rows.iter().filter(|r| r.selected).map(|r| r.count).collect();
        assert_eq!(selected, vec![1]);
        assert_eq!(widget.view().tables.len(), 3);
    }

    #[tokio::test]
    async fn test_choice_is_selected_in_option_list() {
        use crate::view::html::{HtmlView, PlanLayout};

        let mut backend = MockInstallmentBackend::new();
        backend
            .expect_installment_options()
            .returning(|_| Ok(options(6, dec!(50))));
        let mut widget = InstallmentWidget::new(
            WidgetMode::Checkout {
                providers: ProviderDirectory::default(),
            },
            dec!(1000),
            Arc::new(backend),
            HtmlView::new(PlanLayout::OptionList),
        );
        widget.on_mount();
        let request = widget.select_provider(Some(ProviderId(3))).unwrap();
        widget.resolve(request).await;

        widget.choose_installment(6);

        let fragments = widget.view().fragments();
        assert!(fragments.plans.contains(r#"data-total="1050.00" selected>"#));
        assert!(!fragments.plans.contains(r#"data-total="1000.00" selected>"#));
        assert_eq!(fragments.installment_fee, "50.00");
    }

    #[tokio::test]
    async fn test_new_source_forgets_rendered_plans() {
        let mut backend = MockInstallmentBackend::new();
        backend
            .expect_get_product_installments()
            .returning(|_| Ok(bank_plans(vec![six_installments()])));
        let mut widget = product_widget(backend);
        widget.handle_card_input("5149151234567890").await;

        widget.select_bank(Some(BankCode::from("akbank")));
        widget.choose_installment(6);

        assert_eq!(widget.view().tables.len(), 1);
        assert_eq!(widget.view().total, Some(dec!(1000)));
    }
}
