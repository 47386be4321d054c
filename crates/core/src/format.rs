use rust_decimal::{Decimal, RoundingStrategy};

const CURRENCY_SYMBOLS: &[(&str, &str)] = &[
    ("USD", "$"),
    ("EUR", "€"),
    ("GBP", "£"),
    ("JPY", "¥"),
    ("CNY", "¥"),
    ("NGN", "₦"),
    ("CAD", "C$"),
    ("AUD", "A$"),
    ("CHF", "Fr"),
    ("INR", "₹"),
    ("KRW", "₩"),
    ("BRL", "R$"),
    ("ZAR", "R"),
    ("RUB", "₽"),
    ("MXN", "$"),
    ("SGD", "S$"),
    ("HKD", "HK$"),
    ("SEK", "kr"),
    ("NOK", "kr"),
    ("DKK", "kr"),
    ("PLN", "zł"),
    ("TRY", "₺"),
    ("THB", "฿"),
    ("IDR", "Rp"),
    ("MYR", "RM"),
    ("PHP", "₱"),
    ("AED", "د.إ"),
    ("SAR", "﷼"),
    ("EGP", "E£"),
    ("ILS", "₪"),
];

/// Symbol for a currency, or the uppercase code when it has none in the table.
pub fn currency_symbol(code: &str) -> String {
    let upper = code.trim().to_ascii_uppercase();
    CURRENCY_SYMBOLS
        .iter()
        .find(|(candidate, _)| *candidate == upper)
        .map(|(_, symbol)| (*symbol).to_string())
        .unwrap_or(upper)
}

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round_rate(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
}

/// `1234.5` in USD becomes `$1,234.50`.
pub fn format_amount(amount: Decimal, code: &str) -> String {
    format!("{}{}", currency_symbol(code), format_grouped(round_money(amount), 2))
}

/// Up to four decimals, thousands grouped, trailing zeros and point removed.
pub fn format_rate(rate: Decimal) -> String {
    let grouped = format_grouped(round_rate(rate), 4);
    if grouped.contains('.') {
        grouped
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        grouped
    }
}

fn format_grouped(value: Decimal, places: usize) -> String {
    let fixed = format!("{:.*}", places, value);
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let digits = integer.as_bytes();
    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, digit) in digits.iter().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*digit as char);
    }

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}
