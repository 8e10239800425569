//! Safe nested-lookup helpers over `serde_json::Value`.
//!
//! The ClinicalTrials.gov study payload is deeply nested and every level is
//! optional in practice. These helpers use JSON Pointer paths (`/a/b/0`) so a
//! missing intermediate key or a non-object along the way yields a default
//! instead of an error.

use serde_json::Value;

/// Look up a string at `pointer`, returning `None` if any step is missing
/// or the leaf is not a string.
pub fn pointer_str(value: &Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// Look up an unsigned integer at `pointer`.
pub fn pointer_u64(value: &Value, pointer: &str) -> Option<u64> {
    value.pointer(pointer).and_then(Value::as_u64)
}

/// Look up an array of strings at `pointer`; non-string elements are
/// skipped. Missing path yields an empty list.
pub fn pointer_str_list(value: &Value, pointer: &str) -> Vec<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// Look up an array at `pointer` and clone it; missing path yields an
/// empty list. Used for raw pass-through fields (contacts, locations).
pub fn pointer_array(value: &Value, pointer: &str) -> Vec<Value> {
    value
        .pointer(pointer)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}
