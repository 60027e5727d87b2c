use crate::errors::{error_codes, BindingError};
use crate::validation::DEFAULT_GROUP;
use serde::Deserialize;

/// **BINDING CONFIGURATION**
///
/// **PURPOSE**: Runtime settings shared by every resolution.
/// **USAGE**: `BindingConfig::default()` or `BindingConfig::from_json_str(..)`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BindingConfig {
    /// **MAXIMUM BODY SIZE** - Raw bodies above this are rejected unparsed
    pub max_body_size: usize,

    /// **DEFAULT GROUP** - First validation group; the HTTP method follows
    pub default_group: String,

    /// **CLEAR MISSING** - Reset form fields absent from the payload
    pub clear_missing: bool,

    /// **EXTRA FORM FIELDS** - Accept undeclared keys on form submission
    pub allow_extra_form_fields: bool,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            max_body_size: 10_485_760, // 10MB default limit
            default_group: DEFAULT_GROUP.to_string(),
            clear_missing: false,
            allow_extra_form_fields: false,
        }
    }
}

impl BindingConfig {
    pub fn from_json_str(source: &str) -> Result<Self, BindingError> {
        serde_json::from_str(source).map_err(|e| {
            BindingError::configuration(
                error_codes::INVALID_CONFIG,
                format!("Invalid binding configuration: {}", e),
            )
        })
    }

    /// Validation groups for a request made with `method`.
    pub fn groups_for(&self, method: &str) -> Vec<String> {
        vec![self.default_group.clone(), method.to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_config_default() {
        let config = BindingConfig::default();
        assert_eq!(config.max_body_size, 10_485_760);
        assert_eq!(config.default_group, "Default");
        assert!(!config.clear_missing);
        assert!(!config.allow_extra_form_fields);
    }

    #[test]
    fn test_binding_config_partial_json() {
        let config = BindingConfig::from_json_str(r#"{"max_body_size": 1024}"#).unwrap();
        assert_eq!(config.max_body_size, 1024);
        assert_eq!(config.default_group, "Default");
    }

    #[test]
    fn test_binding_config_invalid_json() {
        let result = BindingConfig::from_json_str(r#"{"max_body_size": "big"}"#);
        assert!(matches!(result, Err(BindingError::Configuration { .. })));
    }

    #[test]
    fn test_groups_for_method() {
        let config = BindingConfig::default();
        assert_eq!(config.groups_for("PATCH"), vec!["Default", "PATCH"]);
    }
}
