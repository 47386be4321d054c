use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use rust_decimal::Decimal;

use crate::models::{ConversionForm, CurrencyCode, Intent, MultiRateReason};

static GREETING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(hi|hello|hey|greetings|good\s*(morning|afternoon|evening)|howdy|sup|yo)\b")
        .expect("valid greeting regex")
});

static HELP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(help|assist|what can you do|commands|how to use|guide|instructions|info|about)\b",
    )
    .expect("valid help regex")
});

static THANKS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(thanks|thank you|thx|appreciate|cheers)\b").expect("valid thanks regex")
});

// Tried in order, first match wins.
static CONVERSION_PATTERNS: Lazy<Vec<(ConversionForm, Regex)>> = Lazy::new(|| {
    [
        (
            ConversionForm::Convert,
            r"convert\s+(\d+(?:[.,]\d+)?)\s+([a-z]{3})\s+to\s+([a-z]{3})\b",
        ),
        (
            ConversionForm::HowMuch,
            r"how\s+much\s+is\s+(\d+(?:[.,]\d+)?)\s+([a-z]{3})\s+in\s+([a-z]{3})\b",
        ),
        (
            ConversionForm::WhatIs,
            r"what\s+is\s+(\d+(?:[.,]\d+)?)\s+([a-z]{3})\s+(?:in|to)\s+([a-z]{3})\b",
        ),
        (
            ConversionForm::Bare,
            r"(\d+(?:[.,]\d+)?)\s+([a-z]{3})\s+(?:to|in)\s+([a-z]{3})\b",
        ),
    ]
    .into_iter()
    .map(|(form, pattern)| {
        (
            form,
            Regex::new(pattern).expect("valid conversion regex"),
        )
    })
    .collect()
});

static ASSIST_TO_NAIRA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:help|need|want).*?convert(?:ing)?.*?(\d+(?:[.,]\d+)?)\s+([a-z]{3})\b")
        .expect("valid assisted conversion regex")
});

static SINGLE_RATE_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([a-z]{3})\s+(?:rate|to\s+ngn\b)").expect("valid single rate regex")
});

static SINGLE_RATE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:rates?|price)\s+(?:of|for)\s+([a-z]{3})\b").expect("valid single rate regex")
});

static RATE_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(rates?|exchange)\b").expect("valid rate keyword regex"));

static AGGREGATE_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(ngn|naira|show|all|list)\b").expect("valid aggregate keyword regex")
});

static THREE_LETTER_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([a-z]{3})\b").expect("valid three letter regex"));

/// Three-letter English words that never stand for a currency in a rate question.
const FILLER_WORDS: &[&str] = &[
    "all", "and", "any", "are", "can", "for", "get", "how", "its", "new", "now", "our", "per",
    "pls", "see", "the", "was", "who", "why", "you",
];

pub fn normalize_text(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Maps one message to exactly one intent using a fixed precedence order.
pub fn classify_intent(text: &str) -> Intent {
    let lower = normalize_text(text).to_lowercase();

    if lower.is_empty() {
        return Intent::Empty;
    }
    if GREETING.is_match(&lower) {
        return Intent::Greeting;
    }
    if HELP.is_match(&lower) {
        return Intent::Help;
    }
    if THANKS.is_match(&lower) {
        return Intent::Thanks;
    }
    if let Some(intent) = match_conversion(&lower) {
        return intent;
    }
    if let Some(code) = match_single_rate(&lower) {
        return Intent::SingleRate { code };
    }
    if let Some(reason) = match_multi_rate(&lower) {
        return Intent::MultiRate { reason };
    }

    Intent::Unknown
}

/// Accepts `.` or `,` as the decimal separator.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(&raw.trim().replace(',', ".")).ok()
}

fn match_conversion(lower: &str) -> Option<Intent> {
    for (form, pattern) in CONVERSION_PATTERNS.iter() {
        let intent = pattern
            .captures(lower)
            .and_then(|caps| conversion_from_captures(*form, &caps));
        if intent.is_some() {
            return intent;
        }
    }

    if !(lower.contains("naira") || lower.contains("ngn")) {
        return None;
    }
    let caps = ASSIST_TO_NAIRA.captures(lower)?;
    Some(Intent::Convert {
        amount: parse_amount(caps.get(1)?.as_str())?,
        from: CurrencyCode::parse(caps.get(2)?.as_str())?,
        to: CurrencyCode::home(),
        form: ConversionForm::AssistToNaira,
    })
}

fn conversion_from_captures(form: ConversionForm, caps: &Captures<'_>) -> Option<Intent> {
    Some(Intent::Convert {
        amount: parse_amount(caps.get(1)?.as_str())?,
        from: CurrencyCode::parse(caps.get(2)?.as_str())?,
        to: CurrencyCode::parse(caps.get(3)?.as_str())?,
        form,
    })
}

fn match_single_rate(lower: &str) -> Option<CurrencyCode> {
    let suffix = SINGLE_RATE_SUFFIX
        .captures_iter(lower)
        .filter_map(|caps| caps.get(1))
        .map(|code| code.as_str())
        .find(|code| !is_filler(code));

    let code = suffix.or_else(|| {
        SINGLE_RATE_PREFIX
            .captures_iter(lower)
            .filter_map(|caps| caps.get(1))
            .map(|code| code.as_str())
            .find(|code| !is_filler(code))
    })?;

    CurrencyCode::parse(code)
}

fn match_multi_rate(lower: &str) -> Option<MultiRateReason> {
    if !RATE_KEYWORD.is_match(lower) {
        return None;
    }
    if AGGREGATE_KEYWORD.is_match(lower) {
        return Some(MultiRateReason::Listing);
    }

    let mentions_code = THREE_LETTER_WORD
        .captures_iter(lower)
        .filter_map(|caps| caps.get(1))
        .any(|word| !is_filler(word.as_str()));
    if mentions_code {
        None
    } else {
        Some(MultiRateReason::General)
    }
}

fn is_filler(word: &str) -> bool {
    FILLER_WORDS.contains(&word)
}
