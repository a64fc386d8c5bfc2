use serde::{Deserialize, Serialize};

/// How monetary amounts are rendered in listings and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountFormat {
    pub symbol: String,
    pub decimal_places: u8,
    pub decimal_separator: char,
    pub grouping_separator: Option<char>,
}

impl Default for AmountFormat {
    fn default() -> Self {
        Self {
            symbol: "¥".into(),
            decimal_places: 2,
            decimal_separator: '.',
            grouping_separator: Some(','),
        }
    }
}

impl AmountFormat {
    /// Renders `value` with the currency symbol, e.g. `¥3,600.00`.
    pub fn format(&self, value: f64) -> String {
        let body = self.format_number(value.abs());
        if value < 0.0 {
            format!("-{}{}", self.symbol, body)
        } else {
            format!("{}{}", self.symbol, body)
        }
    }

    /// Renders the bare number without a symbol.
    pub fn format_number(&self, value: f64) -> String {
        let body = format!("{:.*}", self.decimal_places as usize, value);
        let (int_part, frac_part) = match body.split_once('.') {
            Some((int_part, frac)) => (int_part.to_string(), Some(frac.to_string())),
            None => (body, None),
        };
        let int_part = match self.grouping_separator {
            Some(separator) => insert_grouping(&int_part, separator),
            None => int_part,
        };
        match frac_part {
            Some(frac) => format!("{}{}{}", int_part, self.decimal_separator, frac),
            None => int_part,
        }
    }
}

fn insert_grouping(int_part: &str, separator: char) -> String {
    match int_part.strip_prefix('-') {
        Some(digits) => format!("-{}", group_digits(digits, separator)),
        None => group_digits(int_part, separator),
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
