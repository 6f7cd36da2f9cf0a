/// JavaScript value model
///
/// Plain JSON cannot carry every value a submission may return (`undefined`,
/// `NaN`, sparse arrays, functions), so the harness encodes outputs with
/// tagged objects and this module decodes them into [`JsValue`]. Expected
/// values arrive as plain JSON and convert with `From<&Value>`.
///
/// Wire tags (`{"$js": <tag>, ...}`): `undefined`, `NaN`, `Infinity`,
/// `-Infinity`, `bigint` (+`value`), `function` (+`name`), `symbol`
/// (+`description`), `hole`, and `object` (+`entries`: `[[key, value], ...]`).
/// Every plain object is sent as an `object` tag so user keys never collide
/// with the tag field. Objects with a `toJSON` method (such as `Date`) also
/// carry its result in `json`; that result is only used for rendering.

use serde_json::{Map, Number, Value};
use thiserror::Error;

const TAG: &str = "$js";

/// Integral numbers up to 2^53 are rendered without a fraction
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

#[derive(Debug, Clone, PartialEq)]
pub enum JsValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// Decimal digits of a BigInt
    BigInt(String),
    /// Functions and symbols: never strictly equal to anything decoded
    Opaque { kind: OpaqueKind, label: String },
    /// Missing slot of a sparse array
    Hole,
    Array(Vec<JsValue>),
    /// Own enumerable properties in iteration order
    Object(Vec<(String, JsValue)>),
    /// Object with a `toJSON` method: compared by `entries`, rendered as `json`
    Projected {
        entries: Vec<(String, JsValue)>,
        json: Box<JsValue>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpaqueKind {
    Function,
    Symbol,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown value tag `{0}`")]
    UnknownTag(String),
    #[error("malformed `{0}` value")]
    Malformed(&'static str),
}

impl JsValue {
    /// Decode a value produced by the harness encoder
    pub fn decode(wire: &Value) -> Result<Self, DecodeError> {
        match wire {
            Value::Null => Ok(JsValue::Null),
            Value::Bool(b) => Ok(JsValue::Bool(*b)),
            Value::Number(n) => Ok(JsValue::Number(number_to_f64(n))),
            Value::String(s) => Ok(JsValue::String(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(JsValue::decode)
                .collect::<Result<Vec<_>, _>>()
                .map(JsValue::Array),
            Value::Object(fields) => match fields.get(TAG) {
                Some(Value::String(tag)) => decode_tagged(tag, fields),
                Some(_) => Err(DecodeError::Malformed("tag")),
                None => fields
                    .iter()
                    .map(|(key, value)| Ok((key.clone(), JsValue::decode(value)?)))
                    .collect::<Result<Vec<_>, _>>()
                    .map(JsValue::Object),
            },
        }
    }

    /// Arrays and objects: the values the comparator walks key by key
    pub fn is_composite(&self) -> bool {
        matches!(self, JsValue::Array(_) | JsValue::Object(_) | JsValue::Projected { .. })
    }

    /// `Object.keys` of a composite value; empty for primitives.
    /// Array keys are the indices of present (non-hole) elements.
    pub fn keys(&self) -> Vec<String> {
        match self {
            JsValue::Array(items) => items
                .iter()
                .enumerate()
                .filter(|(_, item)| !matches!(item, JsValue::Hole))
                .map(|(index, _)| index.to_string())
                .collect(),
            JsValue::Object(entries) | JsValue::Projected { entries, .. } => {
                entries.iter().map(|(key, _)| key.clone()).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Own property lookup by key
    pub fn get(&self, key: &str) -> Option<&JsValue> {
        match self {
            JsValue::Array(items) => canonical_index(key)
                .and_then(|index| items.get(index))
                .filter(|item| !matches!(item, JsValue::Hole)),
            JsValue::Object(entries) | JsValue::Projected { entries, .. } => entries
                .iter()
                .find(|(candidate, _)| candidate == key)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// JSON rendering with `JSON.stringify` semantics; `None` where
    /// `JSON.stringify` would return `undefined`. BigInts have no JSON form
    /// and are left out as well.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            JsValue::Undefined | JsValue::Opaque { .. } | JsValue::Hole | JsValue::BigInt(_) => None,
            JsValue::Null => Some(Value::Null),
            JsValue::Bool(b) => Some(Value::Bool(*b)),
            JsValue::Number(n) => Some(number_to_json(*n)),
            JsValue::String(s) => Some(Value::String(s.clone())),
            JsValue::Array(items) => Some(Value::Array(
                items
                    .iter()
                    .map(|item| item.to_json().unwrap_or(Value::Null))
                    .collect(),
            )),
            JsValue::Object(entries) => {
                let mut map = Map::new();
                for (key, value) in entries {
                    if let Some(json) = value.to_json() {
                        map.insert(key.clone(), json);
                    }
                }
                Some(Value::Object(map))
            }
            JsValue::Projected { json, .. } => json.to_json(),
        }
    }

    /// Compact text used in mismatch messages (`undefined` when not representable)
    pub fn stringify(&self) -> String {
        if let JsValue::BigInt(digits) = self {
            return format!("{digits}n");
        }
        match self.to_json() {
            Some(json) => json.to_string(),
            None => "undefined".to_string(),
        }
    }
}

impl From<&Value> for JsValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => JsValue::Null,
            Value::Bool(b) => JsValue::Bool(*b),
            Value::Number(n) => JsValue::Number(number_to_f64(n)),
            Value::String(s) => JsValue::String(s.clone()),
            Value::Array(items) => JsValue::Array(items.iter().map(JsValue::from).collect()),
            Value::Object(fields) => JsValue::Object(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), JsValue::from(value)))
                    .collect(),
            ),
        }
    }
}

fn decode_tagged(tag: &str, fields: &Map<String, Value>) -> Result<JsValue, DecodeError> {
    let text = |field: &str, what: &'static str| -> Result<String, DecodeError> {
        match fields.get(field) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Null) | None => Ok(String::new()),
            Some(_) => Err(DecodeError::Malformed(what)),
        }
    };

    match tag {
        "undefined" => Ok(JsValue::Undefined),
        "NaN" => Ok(JsValue::Number(f64::NAN)),
        "Infinity" => Ok(JsValue::Number(f64::INFINITY)),
        "-Infinity" => Ok(JsValue::Number(f64::NEG_INFINITY)),
        "hole" => Ok(JsValue::Hole),
        "bigint" => match fields.get("value") {
            Some(Value::String(digits)) => Ok(JsValue::BigInt(digits.clone())),
            _ => Err(DecodeError::Malformed("bigint")),
        },
        "function" => Ok(JsValue::Opaque {
            kind: OpaqueKind::Function,
            label: text("name", "function")?,
        }),
        "symbol" => Ok(JsValue::Opaque {
            kind: OpaqueKind::Symbol,
            label: text("description", "symbol")?,
        }),
        "object" => {
            let Some(Value::Array(entries)) = fields.get("entries") else {
                return Err(DecodeError::Malformed("object"));
            };
            let entries = entries
                .iter()
                .map(|entry| match entry.as_array().map(Vec::as_slice) {
                    Some([Value::String(key), value]) => Ok((key.clone(), JsValue::decode(value)?)),
                    _ => Err(DecodeError::Malformed("object")),
                })
                .collect::<Result<Vec<_>, _>>()?;
            match fields.get("json") {
                Some(json) => Ok(JsValue::Projected {
                    entries,
                    json: Box::new(JsValue::decode(json)?),
                }),
                None => Ok(JsValue::Object(entries)),
            }
        }
        other => Err(DecodeError::UnknownTag(other.to_string())),
    }
}

fn number_to_f64(n: &Number) -> f64 {
    // Always Some without the arbitrary_precision feature.
    n.as_f64().unwrap_or(f64::NAN)
}

fn number_to_json(n: f64) -> Value {
    if !n.is_finite() {
        return Value::Null;
    }
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        // -0 renders as 0, like JSON.stringify
        return Value::from(n as i64);
    }
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

fn canonical_index(key: &str) -> Option<usize> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}
