/// Argument Adapter
///
/// Spreads a test case input into positional arguments:
/// - array → its elements
/// - object → its values in JavaScript property order, keys dropped
/// - anything else → a single argument

use serde_json::{Map, Value};

/// Largest valid array index is 2^32 - 2
const MAX_ARRAY_INDEX: u32 = u32::MAX - 1;

pub fn adapt_arguments(input: &Value) -> Vec<Value> {
    match input {
        Value::Array(items) => items.clone(),
        Value::Object(fields) => object_values(fields),
        other => vec![other.clone()],
    }
}

/// Values of `fields` in the order `Object.values` would yield them:
/// array-index keys ascending, then every other key in insertion order.
fn object_values(fields: &Map<String, Value>) -> Vec<Value> {
    let mut indexed: Vec<(u32, &Value)> = Vec::new();
    let mut named: Vec<&Value> = Vec::new();

    for (key, value) in fields {
        match array_index(key) {
            Some(index) => indexed.push((index, value)),
            None => named.push(value),
        }
    }
    indexed.sort_by_key(|(index, _)| *index);

    indexed
        .into_iter()
        .map(|(_, value)| value)
        .chain(named)
        .cloned()
        .collect()
}

/// Canonical decimal form only: "0", "7", "42"; not "007", "-1" or "1.5".
fn array_index(key: &str) -> Option<u32> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if key.len() > 1 && key.starts_with('0') {
        return None;
    }
    key.parse::<u32>().ok().filter(|index| *index <= MAX_ARRAY_INDEX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_is_spread() {
        let args = adapt_arguments(&json!([[2, 7, 11, 15], 9]));
        assert_eq!(args, vec![json!([2, 7, 11, 15]), json!(9)]);
    }

    #[test]
    fn test_empty_array_means_no_arguments() {
        assert!(adapt_arguments(&json!([])).is_empty());
    }

    #[test]
    fn test_object_values_in_insertion_order() {
        let args = adapt_arguments(&json!({ "y": 3, "x": 2 }));
        assert_eq!(args, vec![json!(3), json!(2)]);
    }

    #[test]
    fn test_object_index_keys_come_first() {
        let input: Value =
            serde_json::from_str(r#"{ "b": "b", "10": "ten", "a": "a", "2": "two", "01": "zero-one" }"#).unwrap();
        let args = adapt_arguments(&input);
        assert_eq!(
            args,
            vec![json!("two"), json!("ten"), json!("b"), json!("a"), json!("zero-one")]
        );
    }

    #[test]
    fn test_primitives_are_single_arguments() {
        assert_eq!(adapt_arguments(&json!(5)), vec![json!(5)]);
        assert_eq!(adapt_arguments(&json!("abc")), vec![json!("abc")]);
        assert_eq!(adapt_arguments(&json!(true)), vec![json!(true)]);
        assert_eq!(adapt_arguments(&Value::Null), vec![Value::Null]);
    }

    #[test]
    fn test_nested_values_are_kept_intact() {
        let args = adapt_arguments(&json!({ "matrix": [[1, 2], [3, 4]], "opts": { "k": 1 } }));
        assert_eq!(args, vec![json!([[1, 2], [3, 4]]), json!({ "k": 1 })]);
    }

    #[test]
    fn test_array_index_bounds() {
        assert_eq!(array_index("0"), Some(0));
        assert_eq!(array_index("4294967294"), Some(4_294_967_294));
        assert_eq!(array_index("4294967295"), None);
        assert_eq!(array_index("-1"), None);
        assert_eq!(array_index("1e3"), None);
        assert_eq!(array_index(""), None);
    }
}
