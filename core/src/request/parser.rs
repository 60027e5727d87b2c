use crate::config::BindingConfig;
use crate::errors::{error_codes, BindingError};
use crate::request::types::{ContentFormat, RequestSource};
use crate::types::RawPayload;
use serde_json::{Map, Value};

/// Deepest bracket nesting honoured in query and form keys.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Parses a query string into a nested mapping.
///
/// `a[b]=1` nests, `tags[]=x` appends, and mappings keyed exactly `0..n`
/// become lists. Pairs that fail to percent-decode are dropped. Brackets past
/// `MAX_NESTING_DEPTH` stay part of the innermost key.
pub fn parse_query_string(query: &str) -> RawPayload {
    let mut payload = RawPayload::new();

    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let (key, value) = match (decode_component(key), decode_component(value)) {
            (Some(key), Some(value)) => (key, value),
            _ => continue,
        };
        if key.is_empty() {
            continue;
        }

        let (base, path) = split_key(&key);
        insert_nested(&mut payload, base, &path, Value::String(value));
    }

    for value in payload.values_mut() {
        normalize_lists(value);
    }
    payload
}

fn decode_component(component: &str) -> Option<String> {
    urlencoding::decode(&component.replace('+', " "))
        .ok()
        .map(|decoded| decoded.into_owned())
}

/// `a[b][]` -> (`a`, [`b`, ``]). Keys without a well-formed bracket suffix
/// are kept whole.
fn split_key(key: &str) -> (String, Vec<String>) {
    let open = match key.find('[') {
        Some(open) if open > 0 => open,
        _ => return (key.to_string(), Vec::new()),
    };

    let mut segments: Vec<String> = Vec::new();
    let mut rest = &key[open..];
    while rest.starts_with('[') && segments.len() < MAX_NESTING_DEPTH {
        match rest.find(']') {
            Some(close) => {
                segments.push(rest[1..close].to_string());
                rest = &rest[close + 1..];
            }
            None => break,
        }
    }
    if rest.starts_with('[') && segments.len() == MAX_NESTING_DEPTH {
        if let Some(last) = segments.last_mut() {
            last.push_str(rest);
        }
    }

    if segments.is_empty() {
        (key.to_string(), Vec::new())
    } else {
        (key[..open].to_string(), segments)
    }
}

fn insert_nested(target: &mut Map<String, Value>, key: String, path: &[String], value: Value) {
    let key = if !key.is_empty() {
        key
    } else {
        match next_index(target) {
            Some(index) => index,
            None => {
                log::trace!("dropping appended value: no free index left");
                return;
            }
        }
    };

    match path.split_first() {
        None => {
            target.insert(key, value);
        }
        Some((next, rest)) => {
            let slot = target
                .entry(key)
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(inner) = slot {
                insert_nested(inner, next.clone(), rest, value);
            }
        }
    }
}

/// Index following the largest numeric key, or `None` when that slot is
/// already taken.
fn next_index(map: &Map<String, Value>) -> Option<String> {
    let next = map
        .keys()
        .filter_map(|key| key.parse::<usize>().ok())
        .filter_map(|index| index.checked_add(1))
        .max()
        .unwrap_or(0)
        .to_string();
    (!map.contains_key(&next)).then_some(next)
}

fn normalize_lists(value: &mut Value) {
    if let Value::Object(map) = value {
        for child in map.values_mut() {
            normalize_lists(child);
        }
        let sequential = !map.is_empty()
            && map
                .keys()
                .enumerate()
                .all(|(position, key)| *key == position.to_string());
        if sequential {
            let items = std::mem::take(map).into_iter().map(|(_, item)| item).collect();
            *value = Value::Array(items);
        }
    }
}

pub fn parse_json_body(data: &[u8]) -> Result<Value, BindingError> {
    serde_json::from_slice(data).map_err(|e| {
        BindingError::malformed(error_codes::INVALID_JSON, format!("Invalid JSON: {}", e))
    })
}

/// Parses a JSON body that must be a mapping at the top level.
pub fn parse_json_mapping(data: &[u8]) -> Result<RawPayload, BindingError> {
    match parse_json_body(data)? {
        Value::Object(map) => Ok(map),
        _ => Err(BindingError::malformed(
            error_codes::JSON_NOT_MAPPING,
            "JSON content is not a mapping",
        )),
    }
}

pub fn parse_form_body(data: &[u8]) -> Result<RawPayload, BindingError> {
    let body_str = std::str::from_utf8(data).map_err(|e| {
        BindingError::malformed(
            error_codes::INVALID_UTF8,
            format!("Invalid UTF-8 in form body: {}", e),
        )
    })?;

    Ok(parse_query_string(body_str))
}

/// **PAYLOAD EXTRACTION**
///
/// | method | content format | source |
/// |---|---|---|
/// | POST/PUT/PATCH | json | JSON body mapping |
/// | POST/PUT/PATCH | form | form fields |
/// | POST/PUT/PATCH | other | empty mapping |
/// | anything else | - | query string |
pub fn extract_payload(
    request: &dyn RequestSource,
    config: &BindingConfig,
) -> Result<RawPayload, BindingError> {
    let method = request.method();
    if !method.has_body() {
        log::trace!("reading {} payload from the query string", method);
        return Ok(request.query_params());
    }

    let size = request.body_size();
    if size > config.max_body_size {
        return Err(BindingError::malformed(
            error_codes::BODY_TOO_LARGE,
            format!("Body size {} exceeds limit {}", size, config.max_body_size),
        ));
    }

    match request.content_format() {
        Some(ContentFormat::Json) => {
            log::trace!("reading {} payload from the JSON body", method);
            request.json_body()
        }
        Some(ContentFormat::Form) => {
            log::trace!("reading {} payload from form fields", method);
            request.form_body()
        }
        other => {
            log::trace!("no readable body for {} with format {:?}", method, other);
            Ok(RawPayload::new())
        }
    }
}
