use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency that multi-rate lookups report against.
pub const HOME_CURRENCY: &str = "NGN";

pub const DEFAULT_RATE_CODES: [&str; 5] = ["USD", "EUR", "GBP", "JPY", "CAD"];

/// Uppercase 3-letter currency identifier. Validity is left to the upstream service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.len() == 3 && trimmed.chars().all(|ch| ch.is_ascii_alphabetic()) {
            Some(Self(trimmed.to_ascii_uppercase()))
        } else {
            None
        }
    }

    pub fn home() -> Self {
        Self(HOME_CURRENCY.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn defaults() -> Vec<Self> {
        DEFAULT_RATE_CODES
            .iter()
            .map(|code| Self((*code).to_string()))
            .collect()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid currency code: {value}"))
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub amount: Decimal,
    pub rate: Decimal,
    pub converted: Decimal,
    pub formatted_amount: String,
    pub formatted_converted: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateEntry {
    pub rate: Decimal,
    pub formatted: String,
}

/// Rates keyed by currency code, in the order they were requested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    entries: Vec<(CurrencyCode, RateEntry)>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the first entry for a code; later duplicates are ignored.
    pub fn insert(&mut self, code: CurrencyCode, entry: RateEntry) {
        if self.get(&code).is_none() {
            self.entries.push((code, entry));
        }
    }

    pub fn get(&self, code: &CurrencyCode) -> Option<&RateEntry> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == code)
            .map(|(_, entry)| entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CurrencyCode, &RateEntry)> {
        self.entries.iter().map(|(code, entry)| (code, entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn formatted_lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(_, entry)| entry.formatted.clone())
            .collect()
    }
}

/// Uniform `{error: text}` value handed to callers on any upstream failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionForm {
    Convert,
    HowMuch,
    WhatIs,
    Bare,
    AssistToNaira,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiRateReason {
    /// Rate keyword plus an aggregation keyword such as "show" or "naira".
    Listing,
    /// Rate keyword alone with no currency code in the text.
    General,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Intent {
    Empty,
    Greeting,
    Help,
    Thanks,
    Convert {
        amount: Decimal,
        from: CurrencyCode,
        to: CurrencyCode,
        form: ConversionForm,
    },
    SingleRate {
        code: CurrencyCode,
    },
    MultiRate {
        reason: MultiRateReason,
    },
    Unknown,
}

impl Intent {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Greeting => "greeting",
            Self::Help => "help",
            Self::Thanks => "thanks",
            Self::Convert { .. } => "convert",
            Self::SingleRate { .. } => "single_rate",
            Self::MultiRate { .. } => "multi_rate",
            Self::Unknown => "unknown",
        }
    }
}
