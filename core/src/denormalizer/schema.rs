use super::{
    DenormalizationContext, DenormalizeError, Denormalizer, Format, NotNormalizableValue,
    PartialDenormalization,
};
use crate::metadata::{FieldKind, TypeDescriptor, TypeIntrospector, TypeRegistry};
use crate::types::RawPayload;
use crate::validation::validator::join_path;
use serde_json::{Map, Number, Value};
use std::sync::Arc;

/// Why a raw value did not fit its field kind.
#[derive(Debug, Clone, PartialEq)]
pub struct CoercionFailure {
    pub expected_types: Vec<String>,
    pub current_type: String,
    pub message: String,
    pub user_safe: bool,
}

impl CoercionFailure {
    fn mismatch(kind: &FieldKind, value: &Value) -> Self {
        let expected = kind.type_name();
        let current = json_type_name(value);
        Self {
            message: format!("Expected a value of type {}, got {}.", expected, current),
            expected_types: vec![expected],
            current_type: current.to_string(),
            user_safe: false,
        }
    }

    pub fn at(self, path: impl Into<String>) -> NotNormalizableValue {
        NotNormalizableValue {
            path: path.into(),
            expected_types: self.expected_types,
            current_type: self.current_type,
            message: self.message,
            user_safe: self.user_safe,
        }
    }
}

/// Type name of a JSON value as reported in coercion failures.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(number) if number.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Converts `value` to `kind`. With `lenient`, strings are parsed into
/// numbers and booleans and scalars are accepted for string fields.
pub fn coerce(kind: &FieldKind, value: &Value, lenient: bool) -> Result<Value, CoercionFailure> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    let coerced = match (kind, value) {
        (FieldKind::Any, _) => Some(value.clone()),
        (FieldKind::String, Value::String(_)) => Some(value.clone()),
        (FieldKind::String, Value::Number(_) | Value::Bool(_)) if lenient => {
            Some(Value::String(value.to_string()))
        }
        (FieldKind::Integer, Value::Number(number)) if !number.is_f64() => Some(value.clone()),
        (FieldKind::Integer, Value::String(text)) if lenient => {
            text.trim().parse::<i64>().ok().map(Value::from)
        }
        (FieldKind::Float, Value::Number(_)) => Some(value.clone()),
        (FieldKind::Float, Value::String(text)) if lenient => text
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        (FieldKind::Boolean, Value::Bool(_)) => Some(value.clone()),
        (FieldKind::Boolean, Value::String(text)) if lenient => match text.as_str() {
            "1" | "true" => Some(Value::Bool(true)),
            "0" | "false" => Some(Value::Bool(false)),
            _ => None,
        },
        (FieldKind::Boolean, Value::Number(number)) if lenient => match number.as_i64() {
            Some(1) => Some(Value::Bool(true)),
            Some(0) => Some(Value::Bool(false)),
            _ => None,
        },
        (FieldKind::Enum(choices), _) => {
            let text = coerce(&FieldKind::String, value, lenient)?;
            let allowed = text.as_str().map_or(false, |text| choices.iter().any(|c| c == text));
            if !allowed {
                let quoted: Vec<String> = choices.iter().map(|c| format!("\"{}\"", c)).collect();
                return Err(CoercionFailure {
                    expected_types: vec!["string".to_string()],
                    current_type: json_type_name(value).to_string(),
                    message: format!("The value should be one of {}.", quoted.join(", ")),
                    user_safe: true,
                });
            }
            Some(text)
        }
        (FieldKind::List(inner), Value::Array(items)) => {
            let items = items
                .iter()
                .map(|item| coerce(inner, item, lenient))
                .collect::<Result<Vec<_>, _>>()?;
            Some(Value::Array(items))
        }
        (FieldKind::Object(_), Value::Object(_)) => Some(value.clone()),
        _ => None,
    };

    coerced.ok_or_else(|| CoercionFailure::mismatch(kind, value))
}

/// **SCHEMA DENORMALIZER**
///
/// Builds instances from registered type descriptors. Each field is converted
/// by its `FieldKind`; nested objects and lists are walked so that failures
/// carry their full property path (`lines[1].qty`).
#[derive(Debug, Clone)]
pub struct SchemaDenormalizer {
    types: Arc<TypeRegistry>,
}

impl SchemaDenormalizer {
    pub fn new(types: Arc<TypeRegistry>) -> Self {
        Self { types }
    }

    fn descriptor(&self, type_name: &str) -> Result<&TypeDescriptor, DenormalizeError> {
        self.types
            .describe(type_name)
            .ok_or_else(|| DenormalizeError::UnknownType(type_name.to_string()))
    }

    fn object(
        &self,
        descriptor: &TypeDescriptor,
        input: &Map<String, Value>,
        prefix: &str,
        lenient: bool,
        errors: &mut Vec<NotNormalizableValue>,
    ) -> Result<Map<String, Value>, DenormalizeError> {
        let mut output = Map::new();
        for (name, field) in &descriptor.fields {
            let path = join_path(prefix, name);
            match input.get(name) {
                None => {
                    output.insert(name.clone(), field.default.clone().unwrap_or(Value::Null));
                }
                Some(raw) => {
                    if let Some(value) = self.value(&field.kind, raw, &path, lenient, errors)? {
                        output.insert(name.clone(), value);
                    }
                }
            }
        }
        Ok(output)
    }

    /// `Ok(None)` means the value failed and was recorded in `errors`.
    fn value(
        &self,
        kind: &FieldKind,
        raw: &Value,
        path: &str,
        lenient: bool,
        errors: &mut Vec<NotNormalizableValue>,
    ) -> Result<Option<Value>, DenormalizeError> {
        if raw.is_null() {
            return Ok(Some(Value::Null));
        }

        match (kind, raw) {
            (FieldKind::Object(type_name), Value::Object(fields)) => {
                let nested = self.descriptor(type_name)?;
                let object = self.object(nested, fields, path, lenient, errors)?;
                Ok(Some(Value::Object(object)))
            }
            (FieldKind::List(inner), Value::Array(items)) => {
                let mut output = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let item_path = format!("{}[{}]", path, index);
                    let value = self.value(inner, item, &item_path, lenient, errors)?;
                    output.push(value.unwrap_or(Value::Null));
                }
                Ok(Some(Value::Array(output)))
            }
            _ => match coerce(kind, raw, lenient) {
                Ok(value) => Ok(Some(value)),
                Err(failure) => {
                    errors.push(failure.at(path));
                    Ok(None)
                }
            },
        }
    }
}

impl Denormalizer for SchemaDenormalizer {
    fn denormalize(
        &self,
        payload: &RawPayload,
        type_name: &str,
        format: Format,
        context: DenormalizationContext,
    ) -> Result<Value, DenormalizeError> {
        let descriptor = self.descriptor(type_name)?;
        let lenient = format == Format::Csv || context.disable_type_enforcement;

        let mut errors = Vec::new();
        let data = self.object(descriptor, payload, "", lenient, &mut errors)?;

        if errors.is_empty() {
            return Ok(Value::Object(data));
        }
        if context.collect_errors {
            return Err(DenormalizeError::Partial(PartialDenormalization {
                data: Some(Value::Object(data)),
                errors,
            }));
        }
        Err(DenormalizeError::NotNormalizable(errors.swap_remove(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::FieldDescriptor;
    use serde_json::json;

    const STRICT: DenormalizationContext = DenormalizationContext {
        disable_type_enforcement: false,
        collect_errors: true,
    };

    fn registry() -> Arc<TypeRegistry> {
        Arc::new(
            TypeRegistry::new()
                .with(
                    TypeDescriptor::new("Profile")
                        .field("name", FieldDescriptor::new(FieldKind::String))
                        .field("age", FieldDescriptor::new(FieldKind::Integer))
                        .field("score", FieldDescriptor::new(FieldKind::Float))
                        .field(
                            "active",
                            FieldDescriptor::new(FieldKind::Boolean).with_default(json!(true)),
                        )
                        .field(
                            "role",
                            FieldDescriptor::new(FieldKind::Enum(vec![
                                "admin".to_string(),
                                "user".to_string(),
                            ])),
                        )
                        .field(
                            "addresses",
                            FieldDescriptor::new(FieldKind::list_of(FieldKind::object("Address"))),
                        ),
                )
                .with(
                    TypeDescriptor::new("Address")
                        .field("zip", FieldDescriptor::new(FieldKind::String))
                        .field("floor", FieldDescriptor::new(FieldKind::Integer)),
                ),
        )
    }

    fn payload(value: Value) -> RawPayload {
        match value {
            Value::Object(map) => map,
            _ => panic!("payload must be an object"),
        }
    }

    #[test]
    fn test_coerce_strict_json() {
        assert_eq!(coerce(&FieldKind::Integer, &json!(4), false).unwrap(), json!(4));
        assert_eq!(coerce(&FieldKind::Float, &json!(4), false).unwrap(), json!(4));
        assert!(coerce(&FieldKind::Integer, &json!("4"), false).is_err());
        assert!(coerce(&FieldKind::Integer, &json!(4.5), false).is_err());
        assert!(coerce(&FieldKind::String, &json!(4), false).is_err());
    }

    #[test]
    fn test_coerce_lenient_strings() {
        assert_eq!(coerce(&FieldKind::Integer, &json!(" 42 "), true).unwrap(), json!(42));
        assert_eq!(coerce(&FieldKind::Float, &json!("2.5"), true).unwrap(), json!(2.5));
        assert_eq!(coerce(&FieldKind::Boolean, &json!("0"), true).unwrap(), json!(false));
        assert_eq!(coerce(&FieldKind::Boolean, &json!("true"), true).unwrap(), json!(true));
        assert_eq!(coerce(&FieldKind::String, &json!(7), true).unwrap(), json!("7"));
        assert!(coerce(&FieldKind::Boolean, &json!("yes"), true).is_err());
        assert!(coerce(&FieldKind::Float, &json!("NaN"), true).is_err());
    }

    #[test]
    fn test_coerce_failure_details() {
        let failure = coerce(&FieldKind::Integer, &json!("abc"), true).unwrap_err();
        assert_eq!(failure.expected_types, vec!["integer"]);
        assert_eq!(failure.current_type, "string");
        assert!(!failure.user_safe);

        let failure = coerce(
            &FieldKind::Enum(vec!["asc".to_string(), "desc".to_string()]),
            &json!("up"),
            true,
        )
        .unwrap_err();
        assert!(failure.user_safe);
        assert_eq!(failure.message, "The value should be one of \"asc\", \"desc\".");
    }

    #[test]
    fn test_denormalize_success_with_defaults() {
        let denormalizer = SchemaDenormalizer::new(registry());
        let data = denormalizer
            .denormalize(
                &payload(json!({"name": "Ada", "age": 36, "extra": "ignored"})),
                "Profile",
                Format::Json,
                STRICT,
            )
            .unwrap();

        assert_eq!(
            data,
            json!({
                "name": "Ada",
                "age": 36,
                "score": null,
                "active": true,
                "role": null,
                "addresses": null
            })
        );
    }

    #[test]
    fn test_denormalize_csv_coerces_strings() {
        let denormalizer = SchemaDenormalizer::new(registry());
        let data = denormalizer
            .denormalize(
                &payload(json!({"age": "36", "active": "0", "addresses": [{"floor": "3"}]})),
                "Profile",
                Format::Csv,
                STRICT,
            )
            .unwrap();

        assert_eq!(data["age"], json!(36));
        assert_eq!(data["active"], json!(false));
        assert_eq!(data["addresses"][0]["floor"], json!(3));
    }

    #[test]
    fn test_denormalize_collects_all_errors() {
        let denormalizer = SchemaDenormalizer::new(registry());
        let result = denormalizer.denormalize(
            &payload(json!({
                "name": "Ada",
                "age": "abc",
                "role": "root",
                "addresses": [{"zip": "1"}, {"zip": "2", "floor": "high"}]
            })),
            "Profile",
            Format::Json,
            DenormalizationContext::REQUEST,
        );

        let partial = match result {
            Err(DenormalizeError::Partial(partial)) => partial,
            other => panic!("expected partial failure, got {:?}", other),
        };
        let paths: Vec<&str> = partial.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["age", "role", "addresses[1].floor"]);

        let data = partial.data.unwrap();
        assert_eq!(data["name"], json!("Ada"));
        assert!(data.get("age").is_none());
        assert_eq!(data["addresses"][1]["zip"], json!("2"));
    }

    #[test]
    fn test_denormalize_stops_at_first_without_collection() {
        let denormalizer = SchemaDenormalizer::new(registry());
        let result = denormalizer.denormalize(
            &payload(json!({"age": "abc", "score": "x"})),
            "Profile",
            Format::Csv,
            DenormalizationContext {
                disable_type_enforcement: true,
                collect_errors: false,
            },
        );

        match result {
            Err(DenormalizeError::NotNormalizable(error)) => assert_eq!(error.path, "age"),
            other => panic!("expected single failure, got {:?}", other),
        }
    }

    #[test]
    fn test_denormalize_unknown_type() {
        let denormalizer = SchemaDenormalizer::new(registry());
        let result = denormalizer.denormalize(&RawPayload::new(), "Nope", Format::Json, STRICT);
        assert!(matches!(result, Err(DenormalizeError::UnknownType(name)) if name == "Nope"));
    }
}
