//! # CONSTRAINT RULES
//!
//! **CRITICAL**: Declarative rules attached to type fields and checked by the
//! rule validator.
//! **MANDATE**: A rule that does not apply to a value (for instance `Length` on
//! `null`) passes. Only `NotNull` and `NotBlank` reject missing values.

use crate::errors::{error_codes, BindingError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("email pattern")
});

pub const DEFAULT_GROUP: &str = "Default";

/// Result of a failed rule: rendered message plus the template it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleFailure {
    pub message: String,
    pub template: String,
    pub parameters: BTreeMap<String, String>,
}

impl RuleFailure {
    fn plain(message: &str) -> Self {
        Self {
            message: message.to_string(),
            template: message.to_string(),
            parameters: BTreeMap::new(),
        }
    }

    fn limit(template: &str, limit: impl ToString) -> Self {
        let limit = limit.to_string();
        let mut parameters = BTreeMap::new();
        parameters.insert("{{ limit }}".to_string(), limit.clone());
        Self {
            message: template.replace("{{ limit }}", &limit),
            template: template.to_string(),
            parameters,
        }
    }
}

// ================================================================================================
// RULES
// ================================================================================================

#[derive(Debug, Clone)]
pub enum Rule {
    NotBlank,
    NotNull,
    /// String length in characters.
    Length { min: Option<usize>, max: Option<usize> },
    /// Inclusive numeric bounds.
    Range { min: Option<f64>, max: Option<f64> },
    Pattern(Regex),
    Email,
    Choice(Vec<JsonValue>),
    /// Number of elements in a list or mapping.
    Count { min: Option<usize>, max: Option<usize> },
}

/// A rule, the validation groups it belongs to, and an optional message
/// override.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub rule: Rule,
    pub groups: Vec<String>,
    pub message: Option<String>,
}

impl Constraint {
    pub fn new(rule: Rule) -> Self {
        Self {
            rule,
            groups: vec![DEFAULT_GROUP.to_string()],
            message: None,
        }
    }

    pub fn not_blank() -> Self {
        Self::new(Rule::NotBlank)
    }

    pub fn not_null() -> Self {
        Self::new(Rule::NotNull)
    }

    pub fn length(min: Option<usize>, max: Option<usize>) -> Self {
        Self::new(Rule::Length { min, max })
    }

    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        Self::new(Rule::Range { min, max })
    }

    pub fn count(min: Option<usize>, max: Option<usize>) -> Self {
        Self::new(Rule::Count { min, max })
    }

    pub fn email() -> Self {
        Self::new(Rule::Email)
    }

    pub fn choice(values: impl IntoIterator<Item = JsonValue>) -> Self {
        Self::new(Rule::Choice(values.into_iter().collect()))
    }

    /// **PATTERN CONSTRAINT**
    ///
    /// **RETURNS**: `Err(BindingError::Configuration)` when `pattern` is not a
    /// valid regular expression.
    pub fn pattern(pattern: &str) -> Result<Self, BindingError> {
        let regex = Regex::new(pattern).map_err(|e| {
            BindingError::configuration(
                error_codes::INVALID_PATTERN,
                format!("Invalid constraint pattern: {}", e),
            )
        })?;
        Ok(Self::new(Rule::Pattern(regex)))
    }

    /// Replaces the default groups.
    pub fn in_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// True when any of `groups` is one of this constraint's groups.
    pub fn applies_to(&self, groups: &[String]) -> bool {
        self.groups.iter().any(|own| groups.contains(own))
    }

    /// **RULE EXECUTION**
    ///
    /// **RETURNS**: `None` when `value` satisfies the rule.
    pub fn check(&self, value: &JsonValue) -> Option<RuleFailure> {
        let mut failure = check_rule(&self.rule, value)?;
        if let Some(message) = &self.message {
            failure.message = message.clone();
            failure.template = message.clone();
        }
        Some(failure)
    }
}

fn check_rule(rule: &Rule, value: &JsonValue) -> Option<RuleFailure> {
    match rule {
        Rule::NotNull => value
            .is_null()
            .then(|| RuleFailure::plain("This value should not be null.")),
        Rule::NotBlank => {
            is_blank(value).then(|| RuleFailure::plain("This value should not be blank."))
        }
        Rule::Length { min, max } => {
            let length = match value {
                JsonValue::Null => return None,
                JsonValue::String(text) => text.chars().count(),
                other => other.to_string().chars().count(),
            };
            check_length(length, *min, *max)
        }
        Rule::Range { min, max } => {
            let number = match value {
                JsonValue::Null => return None,
                JsonValue::Number(number) => number.as_f64(),
                JsonValue::String(text) => text.trim().parse::<f64>().ok(),
                _ => None,
            };
            match number {
                Some(number) => check_range(number, *min, *max),
                None => Some(RuleFailure::plain("This value should be a valid number.")),
            }
        }
        Rule::Pattern(regex) => match value {
            JsonValue::Null => None,
            JsonValue::String(text) if text.is_empty() => None,
            JsonValue::String(text) => (!regex.is_match(text))
                .then(|| RuleFailure::plain("This value is not valid.")),
            other => (!regex.is_match(&other.to_string()))
                .then(|| RuleFailure::plain("This value is not valid.")),
        },
        Rule::Email => match value {
            JsonValue::Null => None,
            JsonValue::String(text) if text.is_empty() => None,
            JsonValue::String(text) if EMAIL_PATTERN.is_match(text) => None,
            _ => Some(RuleFailure::plain(
                "This value is not a valid email address.",
            )),
        },
        Rule::Choice(choices) => (!value.is_null() && !choices.contains(value))
            .then(|| RuleFailure::plain("The value you selected is not a valid choice.")),
        Rule::Count { min, max } => {
            let count = match value {
                JsonValue::Array(items) => items.len(),
                JsonValue::Object(map) => map.len(),
                _ => return None,
            };
            check_count(count, *min, *max)
        }
    }
}

fn is_blank(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null | JsonValue::Bool(false) => true,
        JsonValue::String(text) => text.is_empty(),
        JsonValue::Array(items) => items.is_empty(),
        JsonValue::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn plural(limit: usize, singular: &str, plural: &str) -> String {
    if limit == 1 {
        singular.to_string()
    } else {
        plural.to_string()
    }
}

fn check_length(length: usize, min: Option<usize>, max: Option<usize>) -> Option<RuleFailure> {
    if let (Some(min), Some(max)) = (min, max) {
        if min == max && length != min {
            let template = format!(
                "This value should have exactly {{{{ limit }}}} {}.",
                plural(min, "character", "characters")
            );
            return Some(RuleFailure::limit(&template, min));
        }
    }
    if let Some(max) = max {
        if length > max {
            let template = format!(
                "This value is too long. It should have {{{{ limit }}}} {} or less.",
                plural(max, "character", "characters")
            );
            return Some(RuleFailure::limit(&template, max));
        }
    }
    if let Some(min) = min {
        if length < min {
            let template = format!(
                "This value is too short. It should have {{{{ limit }}}} {} or more.",
                plural(min, "character", "characters")
            );
            return Some(RuleFailure::limit(&template, min));
        }
    }
    None
}

fn check_range(number: f64, min: Option<f64>, max: Option<f64>) -> Option<RuleFailure> {
    let below = min.map_or(false, |min| number < min);
    let above = max.map_or(false, |max| number > max);
    if !below && !above {
        return None;
    }

    match (min, max) {
        (Some(min), Some(max)) => {
            let template = "This value should be between {{ min }} and {{ max }}.";
            let mut parameters = BTreeMap::new();
            parameters.insert("{{ min }}".to_string(), min.to_string());
            parameters.insert("{{ max }}".to_string(), max.to_string());
            Some(RuleFailure {
                message: format!("This value should be between {} and {}.", min, max),
                template: template.to_string(),
                parameters,
            })
        }
        (Some(min), None) => Some(RuleFailure::limit(
            "This value should be {{ limit }} or more.",
            min,
        )),
        (None, Some(max)) => Some(RuleFailure::limit(
            "This value should be {{ limit }} or less.",
            max,
        )),
        (None, None) => None,
    }
}

fn check_count(count: usize, min: Option<usize>, max: Option<usize>) -> Option<RuleFailure> {
    if let (Some(min), Some(max)) = (min, max) {
        if min == max && count != min {
            let template = format!(
                "This collection should contain exactly {{{{ limit }}}} {}.",
                plural(min, "element", "elements")
            );
            return Some(RuleFailure::limit(&template, min));
        }
    }
    if let Some(max) = max {
        if count > max {
            let template = format!(
                "This collection should contain {{{{ limit }}}} {} or less.",
                plural(max, "element", "elements")
            );
            return Some(RuleFailure::limit(&template, max));
        }
    }
    if let Some(min) = min {
        if count < min {
            let template = format!(
                "This collection should contain {{{{ limit }}}} {} or more.",
                plural(min, "element", "elements")
            );
            return Some(RuleFailure::limit(&template, min));
        }
    }
    None
}

// ================================================================================================
// UNIT TESTS
// ================================================================================================
