//! Reply texts for every intent. All functions return non-empty strings.

use rust_decimal::Decimal;

use crate::models::{ConversionResult, CurrencyCode, RateEntry, RateTable};

pub const AGENT_NAME: &str = "CurrencyPal";

pub fn empty_prompt() -> String {
    "Please say something! 😊 Try 'convert 10 USD to NGN' or 'help' to see what I can do."
        .to_string()
}

pub fn greeting() -> String {
    format!(
        "Hello! 👋 I'm {AGENT_NAME}, your friendly currency conversion assistant! 💱\n\n\
         I can help you:\n\
         • Convert currencies: 'convert 100 USD to NGN'\n\
         • Check rates: 'show rates to NGN' or 'USD rate'\n\
         • Get help: 'help' or 'what can you do'\n\n\
         What would you like to know?"
    )
}

pub fn help() -> String {
    format!(
        "🌟 {AGENT_NAME} Help Guide 🌟\n\n\
         Here's what I can do:\n\n\
         💱 **Currency Conversion:**\n\
         • 'convert 50 USD to NGN'\n\
         • 'how much is 100 EUR in GBP'\n\
         • 'what is 25.50 CAD in NGN'\n\
         • Just type: '100 USD to NGN'\n\n\
         📊 **Exchange Rates:**\n\
         • 'show rates to NGN' (multiple currencies)\n\
         • 'USD rate' or 'EUR to NGN rate' (single currency)\n\
         • 'rates' (default: USD, EUR, GBP, JPY, CAD)\n\n\
         💬 **Other:**\n\
         • Say 'hi' for a greeting\n\
         • Say 'help' to see this message\n\n\
         I support 160+ currencies with real-time rates! 🌍"
    )
}

pub fn thanks() -> String {
    "You're very welcome! 😊 Happy to help with currency conversions anytime! 💱\n\
     Need anything else? Just ask!"
        .to_string()
}

pub fn fallback() -> String {
    "Hmm, I'm not sure I understood that. 🤔\n\n\
     Here's what I can help with:\n\
     • **Convert currency:** 'convert 50 USD to NGN' or just '50 USD to NGN'\n\
     • **Check rates:** 'USD rate' or 'show rates to NGN'\n\
     • **Get help:** Type 'help'\n\n\
     What would you like to do?"
        .to_string()
}

pub fn conversion_success(result: &ConversionResult) -> String {
    format!("✅ {}", result.message)
}

/// `example` is the corrective command suggested to the user.
pub fn conversion_failure(error: &str, example: &str) -> String {
    format!(
        "Oops! 😕 {error}\n\n\
         Please check:\n\
         • Currency codes are valid (e.g., USD, EUR, NGN)\n\
         • The amount is a positive number\n\n\
         Try: '{example}'"
    )
}

pub fn default_conversion_example() -> String {
    "convert 10 USD to NGN".to_string()
}

pub fn naira_conversion_example(amount: Decimal, from: &CurrencyCode) -> String {
    format!("convert {} {from} to NGN", amount.normalize())
}

pub fn single_rate_found(entry: &RateEntry) -> String {
    format!("💱 Current rate: {}", entry.formatted)
}

pub fn single_rate_missing(code: &CurrencyCode) -> String {
    format!(
        "Sorry, I couldn't find the rate for {code}. 🤔\n\
         Make sure it's a valid 3-letter currency code (e.g., USD, EUR, GBP)."
    )
}

pub fn single_rate_failure(code: &CurrencyCode, error: &str) -> String {
    format!(
        "Sorry, I couldn't fetch the {code} rate right now. 😕\n\
         Error: {error}\n\n\
         Try again in a moment or check the currency code."
    )
}

pub fn rate_listing(table: &RateTable) -> String {
    let lines = table
        .formatted_lines()
        .into_iter()
        .map(|line| format!("💱 {line}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("Here are current rates to Nigerian Naira 🇳🇬:\n\n{lines}")
}

/// `error` is echoed only for explicit listing requests.
pub fn rate_listing_failure(error: Option<&str>) -> String {
    match error {
        Some(error) => format!(
            "Sorry, couldn't fetch rates right now. 😕\n\
             Error: {error}\n\n\
             Please try again in a moment."
        ),
        None => "Sorry, couldn't fetch rates right now. 😕\nPlease try again in a moment."
            .to_string(),
    }
}
