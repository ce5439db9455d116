use serde_json::Value;

/// Deep structural equality over JSON trees.
///
/// Arrays compare element-wise in order, objects compare by key set (order
/// does not matter) and per-key value. Values of different kinds are never
/// equal. `None` stands for an absent value and only equals another `None`.
pub fn structurally_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => values_equal(a, b),
        _ => false,
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    if std::ptr::eq(a, b) {
        return true;
    }
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xm), Value::Object(ym)) => {
            xm.len() == ym.len()
                && xm
                    .iter()
                    .all(|(k, xv)| ym.get(k).map_or(false, |yv| values_equal(xv, yv)))
        }
        _ => false,
    }
}

/// Detached copy of a possibly-absent value.
///
/// `serde_json::Value` owns its children, so the copy shares no storage with
/// the source and later edits to either side never show through.
pub fn detached(value: Option<&Value>) -> Option<Value> {
    value.cloned()
}
