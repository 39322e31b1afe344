use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Card scheme detected from the leading digits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum CardBrand {
    #[display("visa")]
    Visa,
    #[display("mastercard")]
    Mastercard,
    #[display("amex")]
    Amex,
    #[display("troy")]
    Troy,
    #[default]
    #[display("unknown")]
    Unknown,
}

impl CardBrand {
    pub fn is_known(&self) -> bool {
        *self != CardBrand::Unknown
    }

    /// Badge text, e.g. "MASTERCARD".
    pub fn badge_label(&self) -> String {
        self.to_string().to_uppercase()
    }
}

/// A brand and the prefixes that select it.
#[derive(Debug, Clone, Copy)]
pub struct BrandPattern {
    pub brand: CardBrand,
    pub prefixes: &'static [&'static str],
}

impl BrandPattern {
    pub fn matches(&self, digits: &str) -> bool {
        self.prefixes.iter().any(|prefix| digits.starts_with(prefix))
    }
}

const REFERENCE_PATTERNS: &[BrandPattern] = &[
    BrandPattern {
        brand: CardBrand::Visa,
        prefixes: &["4"],
    },
    BrandPattern {
        brand: CardBrand::Mastercard,
        prefixes: &[
            "51", "52", "53", "54", "55", "22", "23", "24", "25", "26", "27",
        ],
    },
    BrandPattern {
        brand: CardBrand::Amex,
        prefixes: &["34", "37"],
    },
    BrandPattern {
        brand: CardBrand::Troy,
        prefixes: &["9792", "9793", "65"],
    },
];

/// Ordered brand patterns; the first matching pattern wins.
#[derive(Debug, Clone)]
pub struct BrandPatternTable {
    patterns: Vec<BrandPattern>,
}

impl BrandPatternTable {
    pub fn new(patterns: Vec<BrandPattern>) -> Self {
        Self { patterns }
    }

    pub fn detect(&self, prefix_digits: &str) -> CardBrand {
        first_match(&self.patterns, prefix_digits)
    }
}

impl Default for BrandPatternTable {
    fn default() -> Self {
        Self::new(REFERENCE_PATTERNS.to_vec())
    }
}

/// Detects the brand with the reference pattern table.
pub fn detect_brand(prefix_digits: &str) -> CardBrand {
    first_match(REFERENCE_PATTERNS, prefix_digits)
}

fn first_match(patterns: &[BrandPattern], digits: &str) -> CardBrand {
    patterns
        .iter()
        .find(|pattern| pattern.matches(digits))
        .map(|pattern| pattern.brand)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_visa() {
        for digits in ["4", "4111111111111111", "454671"] {
            assert_eq!(detect_brand(digits), CardBrand::Visa);
        }
    }

    #[test]
    fn test_detect_mastercard_ranges() {
        for digits in ["5100", "5599", "2221", "2720", "540130"] {
            assert_eq!(detect_brand(digits), CardBrand::Mastercard, "{digits}");
        }
        assert_eq!(detect_brand("5600"), CardBrand::Unknown);
        assert_eq!(detect_brand("2800"), CardBrand::Unknown);
    }

    #[test]
    fn test_detect_amex_and_troy() {
        assert_eq!(detect_brand("340000"), CardBrand::Amex);
        assert_eq!(detect_brand("371449"), CardBrand::Amex);
        assert_eq!(detect_brand("979200"), CardBrand::Troy);
        assert_eq!(detect_brand("979312"), CardBrand::Troy);
        assert_eq!(detect_brand("650000"), CardBrand::Troy);
    }

    #[test]
    fn test_unknown_is_total() {
        for digits in ["", "0", "3", "35", "9791", "abc", " 4111"] {
            assert_eq!(detect_brand(digits), CardBrand::Unknown, "{digits:?}");
        }
    }

    #[test]
    fn test_custom_table_first_match_wins() {
        let table = BrandPatternTable::new(vec![
            BrandPattern {
                brand: CardBrand::Troy,
                prefixes: &["65"],
            },
            BrandPattern {
                brand: CardBrand::Mastercard,
                prefixes: &["6"],
            },
        ]);

        assert_eq!(table.detect("6500"), CardBrand::Troy);
        assert_eq!(table.detect("6011"), CardBrand::Mastercard);
        assert_eq!(BrandPatternTable::default().detect("6011"), CardBrand::Unknown);
    }

    #[test]
    fn test_brand_labels() {
        assert_eq!(CardBrand::Mastercard.to_string(), "mastercard");
        assert_eq!(CardBrand::Amex.badge_label(), "AMEX");
        assert!(!CardBrand::Unknown.is_known());
    }
}
