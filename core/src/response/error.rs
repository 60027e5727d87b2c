use super::serializer::create_response;
use super::types::{HttpResponse, ResponseBody};
use crate::errors::BindingError;
use serde_json::{json, Value};

/// Builds the response sent when binding an argument fails.
///
/// Validation failures carry the full error tree under `errors`; every other
/// error carries its code.
pub fn error_response(error: &BindingError) -> HttpResponse {
    let body = match error {
        BindingError::Validation { errors } => json!({
            "message": error.to_string(),
            "errors": errors.to_json(),
        }),
        _ => {
            let mut body = serde_json::Map::new();
            body.insert("message".to_string(), Value::String(error.to_string()));
            body.insert("code".to_string(), Value::String(error.code().to_string()));
            Value::Object(body)
        }
    };
    create_response(error.status_code(), ResponseBody::Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::error_codes;
    use crate::validation::ErrorTree;

    #[test]
    fn test_validation_failure_response() {
        let mut errors = ErrorTree::new();
        errors.insert("lines[0].qty", "This value should be 1 or more.");
        errors.insert("email", "This value should not be blank.");

        let response = error_response(&BindingError::Validation { errors });
        assert_eq!(response.status_code, 422);
        assert_eq!(
            response.body,
            ResponseBody::Json(json!({
                "message": "Validation error",
                "errors": {
                    "lines": [{"qty": ["This value should be 1 or more."]}],
                    "email": ["This value should not be blank."]
                }
            }))
        );
    }

    #[test]
    fn test_malformed_payload_response() {
        let error = BindingError::malformed(error_codes::INVALID_JSON, "Invalid JSON body");
        let response = error_response(&error);

        assert_eq!(response.status_code, 400);
        match &response.body {
            ResponseBody::Json(body) => {
                assert_eq!(body["code"], error_codes::INVALID_JSON);
                assert_eq!(body["message"], error.to_string());
            }
            ResponseBody::Empty => panic!("expected a JSON body"),
        }
    }
}
