/// Card numbers are truncated to this many digits while typing.
pub const MAX_CARD_DIGITS: usize = 16;
/// Length of the bank identification prefix.
pub const BIN_LENGTH: usize = 6;
pub const CARD_DISPLAY_GROUP: usize = 4;
pub const MAX_CVV_DIGITS: usize = 4;
pub const MAX_EXPIRY_DIGITS: usize = 4;

/// Installment counts accepted from the backend.
pub const MIN_INSTALLMENT_COUNT: u32 = 1;
pub const MAX_INSTALLMENT_COUNT: u32 = 24;

pub const ROUTE_PRODUCT_INSTALLMENTS: &str = "/payment/turkey_pos/get_product_installments";
pub const ROUTE_DEFAULT_INSTALLMENTS: &str = "/payment/turkey_pos/get_default_installments";
pub const ROUTE_DEFAULT_PROVIDER: &str = "/payment/turkey_pos/get_default_provider";
pub const ROUTE_INSTALLMENT_OPTIONS: &str = "/payment/turkey_pos/installment_options";

/// Name of the hidden checkout field carrying the installment fee.
pub const INSTALLMENT_FEE_FIELD: &str = "installment_fee";

pub const CURRENCY_SYMBOL: &str = "₺";
pub const SINGLE_PAYMENT_LABEL: &str = "Tek Çekim";
pub const UNKNOWN_BANK_LABEL: &str = "Tanımlanamayan Banka";
pub const DEFAULT_BANK_BANNER: &str = "Varsayılan banka ile tek çekim ödeme";
