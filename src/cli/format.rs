//! Locale-aware rendering of amounts for the terminal.

use budtree_config::Config;

#[derive(Debug, Clone, PartialEq)]
pub struct AmountFormat {
    pub symbol: String,
    pub precision: usize,
    pub decimal_separator: char,
    pub grouping_separator: char,
}

impl Default for AmountFormat {
    fn default() -> Self {
        Self::new("USD", "en-US")
    }
}

impl AmountFormat {
    pub fn new(currency: &str, locale: &str) -> Self {
        let (decimal_separator, grouping_separator) = separators_for(locale);
        Self {
            symbol: symbol_for(currency),
            precision: minor_units_for(currency),
            decimal_separator,
            grouping_separator,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.currency, &config.locale)
    }

    /// `$1,234.50`, `-€12,00` and so on.
    pub fn format(&self, amount: f64) -> String {
        let body = self.number(amount.abs());
        if amount < 0.0 {
            format!("-{}{}", self.symbol, body)
        } else {
            format!("{}{}", self.symbol, body)
        }
    }

    fn number(&self, value: f64) -> String {
        let raw = format!("{:.*}", self.precision, value);
        let (int_part, frac_part) = match raw.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (raw.as_str(), None),
        };
        let mut body = group_digits(int_part, self.grouping_separator);
        if let Some(frac) = frac_part {
            body.push(self.decimal_separator);
            body.push_str(frac);
        }
        body
    }
}

fn separators_for(locale: &str) -> (char, char) {
    let language = locale
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    match language.as_str() {
        "es" | "de" | "fr" | "it" | "pt" | "nl" => (',', '.'),
        _ => ('.', ','),
    }
}

fn symbol_for(code: &str) -> String {
    match code {
        "USD" | "MXN" | "ARS" | "CLP" | "COP" => "$".into(),
        "EUR" => "€".into(),
        "GBP" => "£".into(),
        "JPY" => "¥".into(),
        other => format!("{other} "),
    }
}

fn minor_units_for(code: &str) -> usize {
    match code {
        "JPY" | "CLP" => 0,
        "KWD" | "BHD" => 3,
        _ => 2,
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let len = digits.chars().count();
    let mut grouped = String::with_capacity(len + len / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index != 0 && (len - index) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}
