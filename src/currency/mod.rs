use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::config::Config;

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("USD")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NegativeStyle {
    Sign,
    Parentheses,
    /// Ledger style: the magnitude followed by `Dr` (positive) or `Cr` (negative).
    DrCr,
}

/// Rendering preferences for monetary amounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoneyFormat {
    pub currency: CurrencyCode,
    pub decimal_separator: char,
    pub grouping_separator: char,
    pub precision: u8,
    pub negative_style: NegativeStyle,
    pub show_symbol: bool,
}

impl Default for MoneyFormat {
    fn default() -> Self {
        Self::for_currency(CurrencyCode::default())
    }
}

impl MoneyFormat {
    pub fn for_currency(currency: CurrencyCode) -> Self {
        let precision = minor_units_for(currency.as_str());
        Self {
            currency,
            decimal_separator: '.',
            grouping_separator: ',',
            precision,
            negative_style: NegativeStyle::Sign,
            show_symbol: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut format = Self::for_currency(CurrencyCode::new(config.currency.as_str()));
        if let Some(precision) = config.currency_precision {
            format.precision = precision;
        }
        if uses_comma_decimal(&config.locale) {
            format.decimal_separator = ',';
            format.grouping_separator = '.';
        }
        format
    }

    pub fn with_negative_style(mut self, style: NegativeStyle) -> Self {
        self.negative_style = style;
        self
    }

    pub fn with_symbol(mut self, show: bool) -> Self {
        self.show_symbol = show;
        self
    }

    pub fn format(&self, amount: Decimal) -> String {
        // Sign follows the displayed value, so -0.004 at two places is "0.00".
        let amount = amount.round_dp_with_strategy(
            self.precision as u32,
            RoundingStrategy::MidpointAwayFromZero,
        );
        let body = format_number(
            amount.abs(),
            self.precision,
            self.decimal_separator,
            self.grouping_separator,
        );
        let body = if self.show_symbol {
            format!("{}{}", symbol_for(self.currency.as_str()), body)
        } else {
            body
        };
        match self.negative_style {
            NegativeStyle::Sign if amount.is_sign_negative() && !amount.is_zero() => {
                format!("-{}", body)
            }
            NegativeStyle::Parentheses if amount.is_sign_negative() && !amount.is_zero() => {
                format!("({})", body)
            }
            NegativeStyle::DrCr if amount > Decimal::ZERO => format!("{} Dr", body),
            NegativeStyle::DrCr if amount < Decimal::ZERO => format!("{} Cr", body),
            _ => body,
        }
    }
}

fn uses_comma_decimal(locale: &str) -> bool {
    let language = locale
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    matches!(
        language.as_str(),
        "de" | "fr" | "es" | "it" | "pt" | "nl" | "tr" | "id"
    )
}

pub fn symbol_for(code: &str) -> String {
    match code {
        "USD" => "$".into(),
        "EUR" => "€".into(),
        "GBP" => "£".into(),
        "JPY" => "¥".into(),
        "INR" => "₹".into(),
        "AUD" => "A$".into(),
        _ => format!("{} ", code),
    }
}

pub fn minor_units_for(code: &str) -> u8 {
    match code {
        "JPY" => 0,
        "KWD" | "BHD" => 3,
        _ => 2,
    }
}

/// Formats `value` with a fixed number of fraction digits and digit grouping.
pub fn format_number(
    value: Decimal,
    precision: u8,
    decimal_separator: char,
    grouping_separator: char,
) -> String {
    let rounded = value.round_dp_with_strategy(precision as u32, RoundingStrategy::MidpointAwayFromZero);
    let body = format!("{:.*}", precision as usize, rounded);
    let (sign, unsigned) = match body.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", body.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (unsigned, None),
    };
    let grouped = group_digits(int_part, grouping_separator);
    match frac_part {
        Some(frac) => format!("{}{}{}{}", sign, grouped, decimal_separator, frac),
        None => format!("{}{}", sign, grouped),
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn groups_thousands_and_pads_fraction() {
        assert_eq!(format_number(dec!(1234567.5), 2, '.', ','), "1,234,567.50");
        assert_eq!(format_number(dec!(-999.999), 2, '.', ','), "-1,000.00");
        assert_eq!(format_number(dec!(12), 0, '.', ','), "12");
    }

    #[test]
    fn dr_cr_style_labels_direction() {
        let format = MoneyFormat::default().with_negative_style(NegativeStyle::DrCr);
        assert_eq!(format.format(dec!(1500)), "1,500.00 Dr");
        assert_eq!(format.format(dec!(-20.5)), "20.50 Cr");
        assert_eq!(format.format(Decimal::ZERO), "0.00");
    }

    #[test]
    fn values_rounding_to_zero_carry_no_sign() {
        let money = MoneyFormat::default();
        assert_eq!(money.format(dec!(-0.004)), "0.00");
        assert_eq!(
            money.clone().with_negative_style(NegativeStyle::Parentheses).format(dec!(-0.004)),
            "0.00"
        );
        assert_eq!(
            money.clone().with_negative_style(NegativeStyle::DrCr).format(dec!(-0.004)),
            "0.00"
        );
        assert_eq!(money.format(dec!(-0.005)), "-0.01");
    }

    #[test]
    fn config_locale_switches_separators() {
        let config = Config {
            locale: "de-DE".into(),
            currency: "eur".into(),
            ..Config::default()
        };
        let format = MoneyFormat::from_config(&config).with_symbol(true);
        assert_eq!(format.currency.as_str(), "EUR");
        assert_eq!(format.format(dec!(-1234.5)), "-€1.234,50");
    }

    #[test]
    fn precision_override_wins() {
        let config = Config {
            currency: "INR".into(),
            currency_precision: Some(0),
            ..Config::default()
        };
        assert_eq!(MoneyFormat::from_config(&config).format(dec!(2500.4)), "2,500");
    }
}
