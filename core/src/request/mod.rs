pub mod parser;
pub mod types;

pub use parser::{
    extract_payload, parse_form_body, parse_json_body, parse_json_mapping, parse_query_string,
};
pub use types::{ContentFormat, HttpMethod, HttpRequest, RequestBody, RequestSource};
