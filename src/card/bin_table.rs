//! Exact 6-digit BIN to issuing bank lookup.

use log::warn;
use std::{
    collections::HashMap,
    sync::{Arc, LazyLock},
};

use crate::{consts, errors::BinTableError, models::BankCode};

const REFERENCE_BINS: &[(&str, &[&str])] = &[
    ("akbank", &["454671", "454672", "413252", "520932"]),
    ("garanti", &["514915", "540036", "540037", "541865"]),
    ("isbank", &["450803", "540667", "540668", "541078"]),
    ("ziraat", &["454671", "540130", "541865"]),
    ("halkbank", &["522241", "540435", "543081"]),
    ("vakifbank", &["411724", "411726", "425669"]),
    ("yapikredi", &["545103", "545616", "547564"]),
    ("finansbank", &["525312", "540963", "542404"]),
    ("denizbank", &["552096", "554567", "676366"]),
    ("teb", &["450918", "540638", "543738"]),
    ("sekerbank", &["402275", "402276", "403814"]),
    ("kuveytturk", &["402589", "402590", "410555"]),
];

static REFERENCE_TABLE: LazyLock<Arc<BinTable>> = LazyLock::new(|| {
    Arc::new(
        BinTable::from_entries(REFERENCE_BINS.iter().map(|(bank, bins)| (*bank, bins.to_vec())))
            .expect("reference BIN data is well formed"),
    )
});

/// A BIN listed under more than one bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinConflict {
    pub bin: String,
    /// Every bank listing the BIN, in table order. The first one wins lookups.
    pub banks: Vec<BankCode>,
}

impl BinConflict {
    pub fn resolved_to(&self) -> &BankCode {
        &self.banks[0]
    }
}

/// Bank to BIN list table, read-only after construction.
///
/// Lookups are exact matches on the 6-digit prefix. When the source data lists a
/// BIN under several banks the first bank in table order owns it, and the overlap
/// is kept in [`BinTable::conflicts`].
#[derive(Debug, Clone)]
pub struct BinTable {
    banks: Vec<(BankCode, Vec<String>)>,
    index: HashMap<String, BankCode>,
    conflicts: Vec<BinConflict>,
}

impl BinTable {
    pub fn from_entries<I, B, S>(entries: I) -> Result<Self, BinTableError>
    where
        I: IntoIterator<Item = (B, Vec<S>)>,
        B: Into<String>,
        S: Into<String>,
    {
        let mut banks: Vec<(BankCode, Vec<String>)> = Vec::new();
        let mut index: HashMap<String, BankCode> = HashMap::new();
        let mut conflicts: Vec<BinConflict> = Vec::new();

        for (bank, bins) in entries {
            let bank: String = bank.into();
            if bank.trim().is_empty() {
                return Err(BinTableError::EmptyBankCode);
            }
            let bank = BankCode::new(bank);
            let mut bank_bins: Vec<String> = Vec::new();

            for bin in bins {
                let bin: String = bin.into();
                if !is_valid_bin(&bin) {
                    return Err(BinTableError::InvalidBin {
                        bank: bank.to_string(),
                        bin,
                    });
                }
                if bank_bins.contains(&bin) {
                    continue;
                }

                match index.get(&bin) {
                    Some(owner) => match conflicts.iter_mut().find(|c| c.bin == bin) {
                        Some(conflict) => conflict.banks.push(bank.clone()),
                        None => conflicts.push(BinConflict {
                            bin: bin.clone(),
                            banks: vec![owner.clone(), bank.clone()],
                        }),
                    },
                    None => {
                        index.insert(bin.clone(), bank.clone());
                    }
                }
                bank_bins.push(bin);
            }

            banks.push((bank, bank_bins));
        }

        for conflict in &conflicts {
            warn!(
                "BIN {} is listed under {} banks ({}); lookups resolve to {}",
                conflict.bin,
                conflict.banks.len(),
                conflict
                    .banks
                    .iter()
                    .map(BankCode::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
                conflict.resolved_to()
            );
        }

        Ok(Self {
            banks,
            index,
            conflicts,
        })
    }

    /// The table shipped with the storefront.
    pub fn reference() -> Arc<BinTable> {
        Arc::clone(&REFERENCE_TABLE)
    }

    /// Looks up the bank owning the first 6 characters of `card_number_raw`,
    /// ignoring whitespace.
    pub fn detect_bank(&self, card_number_raw: &str) -> Option<&BankCode> {
        let bin: String = card_number_raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .take(consts::BIN_LENGTH)
            .collect();

        self.index.get(&bin)
    }

    pub fn bins_of(&self, bank: &BankCode) -> Option<&[String]> {
        self.banks
            .iter()
            .find(|(code, _)| code == bank)
            .map(|(_, bins)| bins.as_slice())
    }

    pub fn banks(&self) -> impl Iterator<Item = &BankCode> {
        self.banks.iter().map(|(code, _)| code)
    }

    pub fn conflicts(&self) -> &[BinConflict] {
        &self.conflicts
    }
}

fn is_valid_bin(bin: &str) -> bool {
    bin.len() == consts::BIN_LENGTH && bin.chars().all(|c| c.is_ascii_digit())
}

/// Detects the bank with the reference table.
pub fn detect_bank(card_number_raw: &str) -> Option<BankCode> {
    REFERENCE_TABLE.detect_bank(card_number_raw).cloned()
}
