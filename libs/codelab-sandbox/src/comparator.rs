/// Structural Comparator
///
/// Deep equality the way lesson tests have always been graded:
/// - strict equality on primitives short-circuits to true
/// - anything that is not an array or object fails at that point
/// - composites compare by key set, then recursively per key
///
/// Arrays are treated as objects whose keys are their indices, so `[1]`
/// equals `{"0": 1}` and sparse arrays compare by present slots only. `NaN`
/// is never equal to `NaN`. Both quirks are relied upon by existing lesson
/// suites and are kept as is.

use crate::value::JsValue;

pub fn structurally_equal(a: &JsValue, b: &JsValue) -> bool {
    if strictly_equal(a, b) {
        return true;
    }
    if !a.is_composite() || !b.is_composite() {
        return false;
    }

    let keys_a = a.keys();
    if keys_a.len() != b.keys().len() {
        return false;
    }

    keys_a.iter().all(|key| match (a.get(key), b.get(key)) {
        (Some(left), Some(right)) => structurally_equal(left, right),
        _ => false,
    })
}

/// `===` for values that never share identity across the process boundary
fn strictly_equal(a: &JsValue, b: &JsValue) -> bool {
    match (a, b) {
        (JsValue::Undefined, JsValue::Undefined) | (JsValue::Null, JsValue::Null) => true,
        (JsValue::Bool(x), JsValue::Bool(y)) => x == y,
        // f64 equality: NaN != NaN, 0 == -0
        (JsValue::Number(x), JsValue::Number(y)) => x == y,
        (JsValue::String(x), JsValue::String(y)) => x == y,
        (JsValue::BigInt(x), JsValue::BigInt(y)) => x == y,
        _ => false,
    }
}
