//! Input helpers for the card form fields.

use serde::Serialize;

use super::{CardBrand, bin_table, brand};
use crate::{consts, models::BankCode};

/// Keeps the digits of a typed card number, truncated to 16.
pub fn sanitize_card_input(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(consts::MAX_CARD_DIGITS)
        .collect()
}

/// Groups digits in blocks of 4 separated by a single space.
pub fn format_for_display(digits: &str) -> String {
    let compact: Vec<char> = digits.chars().filter(|c| !c.is_whitespace()).collect();

    compact
        .chunks(consts::CARD_DISPLAY_GROUP)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Formats the expiry field as `MM/YY` while typing.
pub fn format_expiry(raw: &str) -> String {
    let digits: String = raw
        .chars()
        .filter(char::is_ascii_digit)
        .take(consts::MAX_EXPIRY_DIGITS)
        .collect();

    if digits.len() < 2 {
        return digits;
    }

    format!("{}/{}", &digits[..2], &digits[2..])
}

pub fn sanitize_cvv(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(consts::MAX_CVV_DIGITS)
        .collect()
}

/// Luhn checksum over the digits of `card_number`. Non-digits are ignored.
pub fn luhn_check(card_number: &str) -> bool {
    let digits: Vec<u32> = card_number.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() < 2 {
        return false;
    }

    let checksum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(position, &digit)| {
            if position % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                digit
            }
        })
        .sum();

    checksum % 10 == 0
}

/// Replaces all but the last 4 digits with `*`. Spaces and hyphens are dropped.
pub fn mask_card_number(card_number: &str) -> String {
    let compact: String = card_number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    let len = compact.chars().count();
    if len < 4 {
        return compact;
    }

    let visible: String = compact.chars().skip(len - 4).collect();
    format!("{}{}", "*".repeat(len - 4), visible)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardValidation {
    pub valid: bool,
    pub brand: CardBrand,
    pub bank: Option<BankCode>,
    pub masked: String,
}

/// Checksum, brand, bank and masked form of a full card number.
pub fn validate_card(card_number: &str) -> CardValidation {
    let compact: String = card_number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    CardValidation {
        valid: luhn_check(&compact),
        brand: brand::detect_brand(&compact),
        bank: bin_table::detect_bank(&compact),
        masked: mask_card_number(&compact),
    }
}
