//! # Card Identifier
//!
//! Brand detection by prefix pattern and bank detection by exact BIN lookup.
//! Everything here is synchronous and total: a miss is `None` or
//! [`CardBrand::Unknown`], never an error.

pub mod bin_table;
pub mod brand;
pub mod validation;

pub use bin_table::{BinConflict, BinTable, detect_bank};
pub use brand::{BrandPattern, BrandPatternTable, CardBrand, detect_brand};
pub use validation::{format_for_display, sanitize_card_input};

use std::sync::Arc;

use crate::{consts, models::BankCode};

/// Result of identifying a typed card number.
#[derive(Debug, Clone, PartialEq)]
pub struct CardIdentification {
    pub brand: CardBrand,
    pub bank: Option<BankCode>,
}

#[derive(Debug, Clone)]
pub struct CardIdentifier {
    bins: Arc<BinTable>,
    brands: BrandPatternTable,
}

impl CardIdentifier {
    pub fn new(bins: Arc<BinTable>, brands: BrandPatternTable) -> Self {
        Self { bins, brands }
    }

    pub fn detect_brand(&self, prefix_digits: &str) -> CardBrand {
        self.brands.detect(prefix_digits)
    }

    pub fn detect_bank(&self, card_number_raw: &str) -> Option<BankCode> {
        self.bins.detect_bank(card_number_raw).cloned()
    }

    /// Identifies sanitized digits, or returns `None` while fewer than a full BIN
    /// has been typed.
    pub fn identify(&self, digits: &str) -> Option<CardIdentification> {
        if digits.len() < consts::BIN_LENGTH {
            return None;
        }

        Some(CardIdentification {
            brand: self.detect_brand(digits),
            bank: self.detect_bank(digits),
        })
    }

    pub fn bin_table(&self) -> &BinTable {
        &self.bins
    }
}

impl Default for CardIdentifier {
    fn default() -> Self {
        Self::new(BinTable::reference(), BrandPatternTable::default())
    }
}
