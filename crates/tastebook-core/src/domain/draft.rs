//! Form Draft
//!
//! The editable, text-only staging copy of one record. A draft never aliases
//! a record in the collection; it is converted into a payload on submit.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::{Number, Value};

use super::entity::Entity;
use super::error::CmsError;
use super::schema::{FieldDefault, FieldKind, Schema};
use crate::gateway::Row;

/// Field values keyed by field name, all held as editable text
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormDraft {
    values: BTreeMap<&'static str, String>,
}

impl FormDraft {
    /// Blank draft holding the schema defaults, dated today
    pub fn blank(schema: &Schema) -> Self {
        Self::blank_on(schema, chrono::Local::now().date_naive())
    }

    /// Blank draft with an explicit "today"
    pub fn blank_on(schema: &Schema, today: NaiveDate) -> Self {
        let values = schema
            .fields
            .iter()
            .map(|field| {
                let value = match field.default {
                    FieldDefault::Empty => String::new(),
                    FieldDefault::Today => today.format("%Y-%m-%d").to_string(),
                    FieldDefault::Literal(text) => text.to_string(),
                };
                (field.name, value)
            })
            .collect();
        Self { values }
    }

    /// Copy a record's fields into editable text form
    pub fn from_record<R: Entity>(record: &R) -> Result<Self, serde_json::Error> {
        let row = match serde_json::to_value(record)? {
            Value::Object(map) => map,
            _ => Row::new(),
        };
        Ok(Self::from_row(R::schema(), &row))
    }

    pub fn from_row(schema: &Schema, row: &Row) -> Self {
        let values = schema
            .fields
            .iter()
            .map(|field| {
                let text = match row.get(field.name) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    Some(Value::Bool(b)) => b.to_string(),
                    _ => String::new(),
                };
                (field.name, text)
            })
            .collect();
        Self { values }
    }

    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    /// Set a field's text; returns false for names the schema doesn't know
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Reject drafts with missing required fields, over-long values or
    /// unreadable dates
    pub fn validate(&self, schema: &Schema) -> Result<(), CmsError> {
        let missing: Vec<&str> = schema
            .fields
            .iter()
            .filter(|f| f.required && self.get(f.name).trim().is_empty())
            .map(|f| f.label)
            .collect();
        if !missing.is_empty() {
            return Err(CmsError::Validation(format!(
                "Please fill in the required fields: {}",
                missing.join(", ")
            )));
        }

        for field in schema.fields {
            if let Some(max) = field.max_chars {
                if self.get(field.name).chars().count() > max {
                    return Err(CmsError::Validation(format!(
                        "{} must be at most {} characters",
                        field.label, max
                    )));
                }
            }
            if field.kind == FieldKind::Date {
                let text = self.get(field.name).trim();
                if !text.is_empty() && parse_date(text).is_none() {
                    return Err(CmsError::Validation(format!(
                        "{} must be a date like 2025-11-01",
                        field.label
                    )));
                }
            }
        }
        Ok(())
    }

    /// Build the backend payload: integers coerced, empty optionals as null
    pub fn to_payload(&self, schema: &Schema) -> Row {
        let mut row = Row::new();
        for field in schema.fields {
            let text = self.get(field.name);
            let value = match field.kind {
                FieldKind::Integer => Value::Number(Number::from(parse_leading_int(text).unwrap_or(0))),
                _ if !field.required && text.trim().is_empty() => Value::Null,
                FieldKind::Date => match parse_date(text.trim()) {
                    Some(date) => Value::String(date.format("%Y-%m-%d").to_string()),
                    None => Value::String(text.to_string()),
                },
                _ => Value::String(text.to_string()),
            };
            row.insert(field.name.to_string(), value);
        }
        row
    }
}

/// Dates are stored as `YYYY-MM-DD`
fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// Parse an integer the way a lenient form input does: leading whitespace,
/// optional sign, then as many digits as there are. `"12 people"` is 12,
/// `"abc"` is `None`.
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => ("-", &trimmed[1..]),
        Some(b'+') => ("", &trimmed[1..]),
        _ => ("", trimmed),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    format!("{}{}", sign, digits).parse().ok()
}
