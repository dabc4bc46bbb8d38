// Admin form input -> typed Level
//
// Forms arrive with every field as typed by an admin (strings, sometimes
// numbers). Parsing happens once here; nothing past this point sees raw text.

use super::{Benefits, Level, Requirements};
use crate::config::UNBOUNDED_REFERRALS;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Spellings accepted for "no upper bound" in `maxReferrals`
const UNBOUNDED_SPELLINGS: [&str; 4] = ["unbounded", "infinite", "∞", "-"];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LevelForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub min_referrals: String,
    /// Empty means unbounded
    #[serde(default, deserialize_with = "text_or_number")]
    pub max_referrals: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub rev_total: String,
    #[serde(rename = "revLevel1", default, deserialize_with = "text_or_number")]
    pub rev_level1: String,
    #[serde(rename = "revLevels2to5", default, deserialize_with = "text_or_number")]
    pub rev_levels2to5: String,
    /// Empty means no reward
    #[serde(default, deserialize_with = "text_or_number")]
    pub level_up_reward: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub value: String,
    pub reason: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}='{}' ({})", self.field, self.value, self.reason)
    }
}

/// Every unparsable field of a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormError {
    pub fields: Vec<FieldError>,
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid level form")?;
        for (i, field) in self.fields.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{}", sep, field)?;
        }
        Ok(())
    }
}

impl std::error::Error for FormError {}

impl LevelForm {
    /// Parse into a level with the given id; `default_name` is used when the
    /// form carries no name
    pub fn parse(&self, id: &str, default_name: &str) -> Result<Level, FormError> {
        let mut errors = Vec::new();

        let min = parse_count("minReferrals", &self.min_referrals, &mut errors);
        let max = parse_max("maxReferrals", &self.max_referrals, &mut errors);
        let rev_total = parse_decimal("revTotal", &self.rev_total, false, &mut errors);
        let rev_level1 = parse_decimal("revLevel1", &self.rev_level1, false, &mut errors);
        let rev_levels2to5 =
            parse_decimal("revLevels2to5", &self.rev_levels2to5, false, &mut errors);
        let reward = parse_decimal("levelUpReward", &self.level_up_reward, true, &mut errors);

        match (min, max, rev_total, rev_level1, rev_levels2to5, reward) {
            (Some(min), Some(max), Some(total), Some(level1), Some(levels2to5), Some(reward))
                if errors.is_empty() =>
            {
                let name = self
                    .name
                    .as_deref()
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .unwrap_or(default_name);
                Ok(Level::new(
                    id,
                    name,
                    Requirements::new(min, max),
                    Benefits::new(total, level1, levels2to5).with_level_up_reward(reward),
                ))
            }
            _ => Err(FormError { fields: errors }),
        }
    }
}

fn field_error(field: &'static str, value: &str, reason: &'static str) -> FieldError {
    FieldError {
        field,
        value: value.to_string(),
        reason,
    }
}

fn parse_count(field: &'static str, raw: &str, errors: &mut Vec<FieldError>) -> Option<u64> {
    let value = raw.trim();
    if value.is_empty() {
        errors.push(field_error(field, raw, "required"));
        return None;
    }
    match value.parse::<u64>() {
        Ok(count) => Some(count),
        Err(_) => {
            errors.push(field_error(field, raw, "expected a whole non-negative number"));
            None
        }
    }
}

fn parse_max(field: &'static str, raw: &str, errors: &mut Vec<FieldError>) -> Option<u64> {
    let value = raw.trim();
    if value.is_empty()
        || UNBOUNDED_SPELLINGS
            .iter()
            .any(|spelling| value.eq_ignore_ascii_case(spelling))
    {
        return Some(UNBOUNDED_REFERRALS);
    }
    parse_count(field, raw, errors)
}

/// Accepts `12.5`, `12,5`, `1.250,75`, `10.000`, an optional `%` suffix and
/// `R$` prefix
fn parse_decimal(
    field: &'static str,
    raw: &str,
    empty_is_zero: bool,
    errors: &mut Vec<FieldError>,
) -> Option<f64> {
    let value = raw
        .trim()
        .trim_start_matches("R$")
        .trim_end_matches('%')
        .trim();
    if value.is_empty() {
        if empty_is_zero {
            return Some(0.0);
        }
        errors.push(field_error(field, raw, "required"));
        return None;
    }

    let normalized = if value.contains(',') || is_thousands_grouped(value) {
        // pt-BR: '.' groups thousands, ',' separates decimals
        value.replace('.', "").replace(',', ".")
    } else {
        value.to_string()
    };

    match normalized.parse::<f64>() {
        Ok(number) if number.is_finite() => Some(number),
        _ => {
            errors.push(field_error(field, raw, "expected a decimal number"));
            None
        }
    }
}

/// `10.000` or `1.250.000`: dots only, every group after the first has
/// exactly three digits
fn is_thousands_grouped(value: &str) -> bool {
    let mut groups = value.split('.');
    let leading = groups.next().unwrap_or_default();
    let is_digits = |group: &str| group.bytes().all(|b| b.is_ascii_digit());

    let mut rest = groups.peekable();
    (1..=3).contains(&leading.len())
        && is_digits(leading)
        && rest.peek().is_some()
        && rest.all(|group| group.len() == 3 && is_digits(group))
}

// Form fields may be sent as JSON strings or JSON numbers
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Unsigned(u64),
        Signed(i64),
        Float(f64),
        Null(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Unsigned(n) => n.to_string(),
        Raw::Signed(n) => n.to_string(),
        // decimal comma, so `7.125` is never read as a thousands grouping
        Raw::Float(n) => n.to_string().replace('.', ","),
        Raw::Null(()) => String::new(),
    })
}
