//! Best-effort extraction of `1. ... / 2. ... / 3. ...` answers.
//!
//! Nothing here fails: a line that does not follow the convention simply
//! leaves its field at the default.

use serde::{Deserialize, Serialize};

const FIELD_COUNT: usize = 3;

/// The values found after the first `:` of lines numbered 1 to 3.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberedResponse {
    fields: [Option<String>; FIELD_COUNT],
}

impl NumberedResponse {
    pub fn parse(text: &str) -> Self {
        let mut response = Self::default();

        for line in text.lines() {
            let Some((number, value)) = numbered_value(line) else {
                continue;
            };
            if let Some(slot) = number
                .checked_sub(1)
                .and_then(|index| response.fields.get_mut(index))
            {
                // The first answer for a number wins; models like to restate.
                if slot.is_none() {
                    *slot = Some(value);
                }
            }
        }

        response
    }

    /// Field `number` (1-based), if present.
    pub fn field(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|index| self.fields.get(index))
            .and_then(|value| value.as_deref())
    }

    pub fn text(&self, number: usize) -> String {
        self.field(number).unwrap_or_default().to_string()
    }

    pub fn integer(&self, number: usize) -> u32 {
        self.field(number).and_then(leading_integer).unwrap_or(0)
    }

    pub fn float(&self, number: usize) -> f64 {
        self.field(number).and_then(leading_float).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionAnalysis {
    /// 0-100 as stated by the model; 0 when absent
    pub risk: u32,
    pub explanation: String,
    pub recommendation: String,
}

impl TransactionAnalysis {
    pub fn from_response(text: &str) -> Self {
        let response = NumberedResponse::parse(text);
        Self {
            risk: response.integer(1),
            explanation: response.text(2),
            recommendation: response.text(3),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceAnalysis {
    pub best_price: f64,
    pub confidence: u32,
    pub recommendation: String,
}

impl PriceAnalysis {
    pub fn from_response(text: &str) -> Self {
        let response = NumberedResponse::parse(text);
        Self {
            best_price: response.float(1),
            confidence: response.integer(2),
            recommendation: response.text(3),
        }
    }
}

/// `"  2. Explanation: moves SOL"` → `(2, "moves SOL")`.
fn numbered_value(line: &str) -> Option<(usize, String)> {
    let line = line.trim_start_matches(|c: char| c.is_whitespace() || c == '*' || c == '#');
    let digits_end = line.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 {
        return None;
    }
    let number = line[..digits_end].parse::<usize>().ok()?;

    let rest = line[digits_end..].strip_prefix(['.', ')'])?;
    let (_, value) = rest.split_once(':')?;
    let value = value.trim_matches(|c: char| c.is_whitespace() || c == '*' || c == '_');

    Some((number, value.to_string()))
}

fn numeric_prefix(value: &str, allow_dot: bool) -> &str {
    let value = value.trim_start_matches(['$', '~', ' ']);
    let mut seen_dot = false;
    let end = value
        .char_indices()
        .find(|&(_, c)| {
            if c == '.' && allow_dot && !seen_dot {
                seen_dot = true;
                false
            } else {
                !c.is_ascii_digit()
            }
        })
        .map(|(index, _)| index)
        .unwrap_or(value.len());
    value[..end].trim_end_matches('.')
}

fn leading_integer(value: &str) -> Option<u32> {
    numeric_prefix(value, false).parse().ok()
}

/// Like [`leading_integer`] but also takes a fraction and an `e`/`E` exponent.
fn leading_float(value: &str) -> Option<f64> {
    let value = value.trim_start_matches(['$', '~', ' ']);
    let mantissa = numeric_prefix(value, true);
    let exponent_len = value[mantissa.len()..]
        .strip_prefix(['e', 'E'])
        .and_then(|exponent| {
            let sign = usize::from(exponent.starts_with(['+', '-']));
            let digits = exponent[sign..]
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(exponent.len() - sign);
            (digits > 0).then_some(1 + sign + digits)
        })
        .unwrap_or(0);
    value[..mantissa.len() + exponent_len].parse().ok()
}
