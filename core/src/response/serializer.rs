use crate::response::types::{HttpResponse, ResponseBody};
use std::collections::HashMap;

pub fn create_response(status: u16, body: ResponseBody) -> HttpResponse {
    let mut headers = HashMap::new();
    if let ResponseBody::Json(_) = &body {
        headers.insert("Content-Type".to_string(), "application/json".to_string());
    }

    HttpResponse {
        status_code: status,
        headers,
        body,
    }
}

pub fn serialize_response_body(body: &ResponseBody) -> Vec<u8> {
    match body {
        ResponseBody::Empty => vec![],
        ResponseBody::Json(value) => serde_json::to_vec(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_json_response() {
        let response = create_response(422, ResponseBody::Json(json!({"message": "x"})));

        assert_eq!(response.status_code, 422);
        assert_eq!(response.header("content-type"), Some("application/json"));
    }

    #[test]
    fn test_empty_response_has_no_content_type() {
        let response = create_response(204, ResponseBody::Empty);
        assert!(response.headers.is_empty());
        assert!(serialize_response_body(&response.body).is_empty());
    }

    #[test]
    fn test_serialize_keeps_key_order() {
        let body = ResponseBody::Json(json!({"message": "m", "errors": {"b": ["1"], "a": ["2"]}}));
        assert_eq!(
            serialize_response_body(&body),
            br#"{"message":"m","errors":{"b":["1"],"a":["2"]}}"#.to_vec()
        );
    }
}
