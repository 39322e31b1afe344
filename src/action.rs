use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::sync::Arc;

use turkey_pos_installments::{
    card::{BinTable, validation::validate_card},
    config,
    models::{BankCode, CheckoutFields, ProductId, ProviderId},
    rpc::{ImplInstallmentBackend, JsonRpcBackend},
    view::{
        CardBadge, InstallmentView, Notice, PlanTable, format_currency,
        html::{HtmlView, PlanLayout},
    },
    widget::{InstallmentWidget, ProviderDirectory, WidgetMode},
};

#[derive(Args, Debug, Clone)]
pub struct IdentifyArgs {
    /// Card number, spaces and dashes allowed
    card: String,
}

#[derive(Args, Debug, Clone)]
pub struct PlansArgs {
    #[arg(short, long)]
    card: String,

    #[arg(short, long)]
    amount: Decimal,

    #[arg(short, long)]
    product_id: Option<i64>,

    /// Installment count to choose once plans are loaded
    #[arg(long)]
    choose: Option<u32>,

    /// Print the rendered HTML fragments instead of a text table
    #[arg(long)]
    html: bool,
}

#[derive(Args, Debug, Clone)]
pub struct OptionsArgs {
    /// Provider picked by hand in the bank dropdown
    #[arg(long, conflicts_with = "card", required_unless_present = "card")]
    provider: Option<i64>,

    /// Card number, its bank picks the provider
    #[arg(long)]
    card: Option<String>,

    #[arg(short, long)]
    amount: Decimal,

    /// Bank dropdown entry as `bank=provider_id`, repeatable
    #[arg(long = "bank-provider", value_parser = parse_directory_entry)]
    bank_providers: Vec<(BankCode, ProviderId)>,

    #[arg(long)]
    choose: Option<u32>,

    #[arg(long)]
    html: bool,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Action {
    /// Brand, bank and checksum of a card number
    Identify(IdentifyArgs),
    /// BIN table banks and the BINs listed under more than one bank
    Bins,
    /// Product page plans for a card
    Plans(PlansArgs),
    /// Checkout installment options for a provider or a card
    Options(OptionsArgs),
}

/// Installment widget tools against the configured storefront
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct AppArgs {
    /// Debug logging, ignored when ENV=prod
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub action: Action,
}

fn parse_directory_entry(entry: &str) -> Result<(BankCode, ProviderId), String> {
    let (bank, provider) = entry
        .split_once('=')
        .ok_or_else(|| format!("expected bank=provider_id, got {entry}"))?;
    let provider = provider
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid provider id {provider}: {e}"))?;

    Ok((BankCode::from(bank.trim()), ProviderId(provider)))
}

/// Prints what a page would show.
#[derive(Debug, Default)]
struct ConsoleView {
    total: Decimal,
    fee: Decimal,
}

impl InstallmentView for ConsoleView {
    fn show_plans(&mut self, table: &PlanTable) {
        for row in &table.rows {
            let marker = if row.selected { "*" } else { " " };
            if table.show_commission {
                println!(
                    "{marker} {:<10} {:>14} {:>14} {:>6}",
                    row.label, row.monthly, row.total, row.commission
                );
            } else {
                println!("{marker} {:<10} {:>14} {:>14}", row.label, row.monthly, row.total);
            }
        }
    }

    fn clear_plans(&mut self) {
        println!("(plans cleared)");
    }

    fn show_bank_badge(&mut self, badge: Option<&CardBadge>) {
        if let Some(badge) = badge {
            println!(
                "[{}] [{}]",
                badge.brand.as_deref().unwrap_or("?"),
                badge.bank.as_deref().unwrap_or(badge.unknown_bank_label)
            );
        }
    }

    fn show_notice(&mut self, notice: Option<Notice>) {
        if let Some(notice) = notice {
            println!("! {notice}");
        }
    }

    fn set_total(&mut self, total: Decimal) {
        self.total = total;
    }

    fn set_fee(&mut self, fee: Decimal) {
        self.fee = fee;
    }
}

fn backend() -> anyhow::Result<ImplInstallmentBackend> {
    Ok(Arc::new(JsonRpcBackend::from_config(&config::APP_CONFIG)?))
}

enum Input<'a> {
    Card(&'a str),
    Provider(ProviderId),
}

async fn run_widget<V: InstallmentView>(
    mode: WidgetMode,
    amount: Decimal,
    input: Input<'_>,
    choose: Option<u32>,
    view: V,
) -> anyhow::Result<InstallmentWidget<V>> {
    let mut widget = InstallmentWidget::new(mode, amount, backend()?, view);
    widget.on_mount();

    match input {
        Input::Card(card) => {
            widget.handle_card_input(card).await;
        }
        Input::Provider(provider) => {
            if let Some(request) = widget.select_provider(Some(provider)) {
                widget.resolve(request).await;
            }
        }
    }

    if let Some(count) = choose {
        widget.choose_installment(count);
    }
    widget.on_unmount();

    Ok(widget)
}

fn print_fields(fields: &CheckoutFields) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(fields)?);
    Ok(())
}

async fn show(
    mode: WidgetMode,
    amount: Decimal,
    input: Input<'_>,
    choose: Option<u32>,
    html: Option<PlanLayout>,
) -> anyhow::Result<()> {
    println!(
        "{} ({}) at {}",
        format_currency(amount),
        config::APP_CONFIG.currency_code,
        config::APP_CONFIG.backend_url
    );

    let Some(layout) = html else {
        let widget = run_widget(mode, amount, input, choose, ConsoleView::default()).await?;
        println!(
            "total {} / fee {}",
            format_currency(widget.view().total),
            format_currency(widget.view().fee)
        );
        return print_fields(&widget.checkout_fields());
    };

    let widget = run_widget(mode, amount, input, choose, HtmlView::new(layout)).await?;
    let fragments = widget.view().fragments();
    println!("{}", fragments.badge);
    if let Some(notice) = &fragments.notice {
        println!("{notice}");
    }
    println!("{}", fragments.plans);
    println!("total: {} / installment_fee: {}", fragments.total, fragments.installment_fee);

    print_fields(&widget.checkout_fields())
}

fn print_bins(table: &BinTable) {
    for bank in table.banks() {
        let bins = table.bins_of(bank).unwrap_or_default();
        println!("{:<12} {}", bank.as_str(), bins.join(" "));
    }

    for conflict in table.conflicts() {
        let banks: Vec<&str> = conflict.banks.iter().map(BankCode::as_str).collect();
        println!(
            "conflict: {} listed under {}, resolved to {}",
            conflict.bin,
            banks.join(", "),
            conflict.resolved_to()
        );
    }
}

impl AppArgs {
    pub async fn run(&self) -> anyhow::Result<()> {
        match &self.action {
            Action::Identify(IdentifyArgs { card }) => {
                let validation = validate_card(card);
                println!("{}", serde_json::to_string_pretty(&validation)?);
                Ok(())
            }
            Action::Bins => {
                print_bins(&BinTable::reference());
                Ok(())
            }
            Action::Plans(args) => {
                let mode = WidgetMode::Product {
                    product_id: args.product_id.map(ProductId),
                };
                let html = args.html.then_some(PlanLayout::Table);
                show(mode, args.amount, Input::Card(&args.card), args.choose, html).await
            }
            Action::Options(args) => {
                let mode = WidgetMode::Checkout {
                    providers: ProviderDirectory::new(args.bank_providers.clone()),
                };
                let input = match (&args.card, args.provider) {
                    (Some(card), _) => Input::Card(card),
                    (None, Some(provider)) => Input::Provider(ProviderId(provider)),
                    (None, None) => anyhow::bail!("either --card or --provider is required"),
                };
                let html = args.html.then_some(PlanLayout::OptionList);
                show(mode, args.amount, input, args.choose, html).await
            }
        }
    }
}
