//! Field-level validation for candidate claims.
//!
//! Constraints are expressed as an explicit, ordered list of rules per
//! entity: each rule is a pure predicate over the draft plus a message.
//! Failures come back as an insertion-ordered map from field name to
//! messages so callers can re-render forms with errors in display order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::claim::ClaimItem;

pub const MONTH_RANGE: std::ops::RangeInclusive<i32> = 1..=12;
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 2020..=2030;
pub const MODULE_MAX_CHARS: usize = 50;
pub const DESCRIPTION_MAX_CHARS: usize = 200;

/// The caller-supplied shape of a claim before it is accepted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimDraft {
    pub month: i32,
    pub year: i32,
    #[serde(default)]
    pub items: Vec<ClaimItem>,
}

/// Field name → one-or-more human-readable messages, in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors {
    entries: Vec<(String, Vec<String>)>,
}

impl FieldErrors {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        if let Some((_, messages)) = self.entries.iter_mut().find(|(name, _)| *name == field) {
            messages.push(message.into());
        } else {
            self.entries.push((field, vec![message.into()]));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(field, _)| field.as_str())
    }

    pub fn messages_for(&self, field: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in self.iter() {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

struct Rule<T> {
    field: &'static str,
    check: fn(&T) -> Option<String>,
}

const CLAIM_RULES: &[Rule<ClaimDraft>] = &[
    Rule {
        field: "month",
        check: |draft| {
            (!MONTH_RANGE.contains(&draft.month))
                .then(|| "Month must be between 1 and 12.".to_string())
        },
    },
    Rule {
        field: "year",
        check: |draft| {
            (!YEAR_RANGE.contains(&draft.year))
                .then(|| "Year must be between 2020 and 2030.".to_string())
        },
    },
];

const ITEM_RULES: &[Rule<ClaimItem>] = &[
    Rule {
        field: "date",
        check: |item| item.date.is_none().then(|| "Date is required.".to_string()),
    },
    Rule {
        field: "hours_worked",
        check: |item| {
            let min = Decimal::new(1, 1);
            let max = Decimal::new(24, 0);
            (item.hours_worked < min || item.hours_worked > max)
                .then(|| "Hours must be between 0.1 and 24.".to_string())
        },
    },
    Rule {
        field: "module",
        check: |item| item.module.trim().is_empty().then(|| "Module is required.".to_string()),
    },
    Rule {
        field: "module",
        check: |item| {
            (item.module.chars().count() > MODULE_MAX_CHARS)
                .then(|| format!("Module must be {MODULE_MAX_CHARS} characters or fewer."))
        },
    },
    Rule {
        field: "description",
        check: |item| {
            item.description
                .as_ref()
                .is_some_and(|text| text.chars().count() > DESCRIPTION_MAX_CHARS)
                .then(|| format!("Description must be {DESCRIPTION_MAX_CHARS} characters or fewer."))
        },
    },
    Rule {
        field: "amount",
        check: |item| {
            (item.amount < Decimal::ZERO).then(|| "Amount must not be negative.".to_string())
        },
    },
];

/// Checks required fields and range constraints on a candidate claim.
/// Pure; no side effects. An empty item list is valid (a draft with no
/// billable lines simply totals zero).
pub fn validate_claim(draft: &ClaimDraft) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();

    for rule in CLAIM_RULES {
        if let Some(message) = (rule.check)(draft) {
            errors.push(rule.field, message);
        }
    }

    for (index, item) in draft.items.iter().enumerate() {
        for rule in ITEM_RULES {
            if let Some(message) = (rule.check)(item) {
                errors.push(format!("items[{index}].{}", rule.field), message);
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
