//! Deep merge of a loaded document onto the canonical defaults.
//!
//! Rules, applied recursively:
//! - a `null` default accepts whatever was loaded
//! - two objects merge key by key; keys only present in the loaded side survive
//! - a loaded value of the same JSON type replaces the default
//! - a loaded value of a different type is discarded in favor of the default
//!
//! Matching JSON types is not enough for a value to decode: a negative count
//! or an unknown enum name survives the merge. [`salvage`] narrows such a
//! document down to the parts a decoder accepts.

use serde_json::Value;
use tracing::debug;

/// Merges `loaded` onto `defaults`.
#[must_use]
pub fn reconcile(defaults: &Value, loaded: Value) -> Value {
    match (defaults, loaded) {
        (Value::Null, loaded) => loaded,
        (Value::Object(default_map), Value::Object(mut loaded_map)) => {
            let mut merged = serde_json::Map::with_capacity(default_map.len().max(loaded_map.len()));
            for (key, default_value) in default_map {
                let value = match loaded_map.remove(key) {
                    Some(loaded_value) => reconcile(default_value, loaded_value),
                    None => default_value.clone(),
                };
                merged.insert(key.clone(), value);
            }
            merged.extend(loaded_map);
            Value::Object(merged)
        },
        (default, loaded) if same_kind(default, &loaded) => loaded,
        (default, loaded) => {
            debug!(
                "Discarding loaded {} where {} was expected",
                kind_name(&loaded),
                kind_name(default)
            );
            default.clone()
        },
    }
}

/// Keeps every part of `merged` that `accepts` can read.
///
/// Each loaded subtree is tried on its own, placed into the defaults. A
/// rejected object is searched key by key, so only the offending leaves fall
/// back to their defaults. Rejected map entries and array elements are
/// dropped.
#[must_use]
pub fn salvage(defaults: &Value, merged: Value, accepts: &dyn Fn(&Value) -> bool) -> Value {
    salvage_node(defaults, merged, "", &|value: Value| value, accepts)
}

fn salvage_node(
    default: &Value,
    loaded: Value,
    path: &str,
    place: &dyn Fn(Value) -> Value,
    accepts: &dyn Fn(&Value) -> bool,
) -> Value {
    match (default, loaded) {
        (Value::Object(default_map), Value::Object(loaded_map)) => {
            let mut kept = default_map.clone();
            for (key, value) in loaded_map {
                let child_path = format!("{path}/{key}");
                let place_child = |child: Value| {
                    let mut parent = default_map.clone();
                    parent.insert(key.clone(), child);
                    place(Value::Object(parent))
                };
                if accepts(&place_child(value.clone())) {
                    kept.insert(key.clone(), value);
                    continue;
                }
                match default_map.get(&key) {
                    Some(child_default) => {
                        let repaired =
                            salvage_node(child_default, value, &child_path, &place_child, accepts);
                        kept.insert(key.clone(), repaired);
                    },
                    None => debug!("Dropping unreadable {child_path}"),
                }
            }
            Value::Object(kept)
        },
        (Value::Array(_), Value::Array(items)) => {
            let total = items.len();
            let readable: Vec<Value> = items
                .into_iter()
                .filter(|item| accepts(&place(Value::Array(vec![item.clone()]))))
                .collect();
            if readable.len() < total {
                debug!("Dropping {} unreadable entries of {path}", total - readable.len());
            }
            let readable = Value::Array(readable);
            if accepts(&place(readable.clone())) {
                readable
            } else {
                default.clone()
            }
        },
        (default, _) => {
            debug!("Resetting unreadable {path} to its default");
            default.clone()
        },
    }
}

fn same_kind(a: &Value, b: &Value) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_missing_keys_take_defaults() {
        let defaults = json!({"time": {"year": 1, "month": 1, "day": 1}, "wars": {"active": []}});
        let merged = reconcile(&defaults, json!({"time": {"year": 5}}));
        assert_eq!(
            merged,
            json!({"time": {"year": 5, "month": 1, "day": 1}, "wars": {"active": []}})
        );
    }

    #[test]
    fn test_unknown_keys_survive() {
        let defaults = json!({"economy": {"goods": {}}});
        let merged = reconcile(
            &defaults,
            json!({"economy": {"goods": {"silk": {"price": 40}}}, "questLog": [1, 2]}),
        );
        assert_eq!(merged["economy"]["goods"]["silk"]["price"], 40);
        assert_eq!(merged["questLog"], json!([1, 2]));
    }

    #[test]
    fn test_type_mismatch_keeps_default() {
        let defaults = json!({"time": {"year": 1}, "rumors": {"rumors": []}});
        let merged = reconcile(&defaults, json!({"time": {"year": "five"}, "rumors": 7}));
        assert_eq!(merged, defaults);
    }

    #[test]
    fn test_null_default_accepts_anything() {
        let defaults = json!({"weather": {"forecast": null}});
        let merged = reconcile(&defaults, json!({"weather": {"forecast": {"kind": "rain"}}}));
        assert_eq!(merged["weather"]["forecast"]["kind"], "rain");
    }

    #[test]
    fn test_arrays_replace_whole() {
        let defaults = json!({"titles": ["a", "b", "c"]});
        let merged = reconcile(&defaults, json!({"titles": ["z"]}));
        assert_eq!(merged["titles"], json!(["z"]));
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "lowercase")]
    enum Sky {
        Rain,
        Snow,
    }

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Inner {
        level: u8,
        sky: Sky,
    }

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Sample {
        count: u32,
        sky: Sky,
        tags: Vec<u8>,
        inner: Inner,
    }

    fn sample_defaults() -> Value {
        json!({"count": 1, "sky": "rain", "tags": [], "inner": {"level": 0, "sky": "rain"}})
    }

    fn sample_accepts(doc: &Value) -> bool {
        Sample::deserialize(doc).is_ok()
    }

    #[test]
    fn test_salvage_resets_only_unreadable_leaves() {
        let merged = json!({
            "count": 7,
            "sky": "hail",
            "tags": [1, 300, 2],
            "inner": {"level": -1, "sky": "snow"},
            "extra": true
        });
        let repaired = salvage(&sample_defaults(), merged, &sample_accepts);
        assert_eq!(
            repaired,
            json!({
                "count": 7,
                "sky": "rain",
                "tags": [1, 2],
                "inner": {"level": 0, "sky": "snow"},
                "extra": true
            })
        );
        assert!(sample_accepts(&repaired));
    }

    #[test]
    fn test_salvage_keeps_readable_document() {
        let merged = json!({"count": 3, "sky": "snow", "tags": [4], "inner": {"level": 9, "sky": "rain"}});
        assert_eq!(salvage(&sample_defaults(), merged.clone(), &sample_accepts), merged);
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(|n| json!(n)),
            "[a-z]{0,6}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_reconcile_with_itself_is_identity(value in arb_json()) {
            prop_assert_eq!(reconcile(&value, value.clone()), value);
        }

        #[test]
        fn prop_reconcile_with_defaults_keeps_every_default_key(
            defaults in arb_json(),
            loaded in arb_json(),
        ) {
            let merged = reconcile(&defaults, loaded);
            if let (Value::Object(d), Value::Object(m)) = (&defaults, &merged) {
                for key in d.keys() {
                    prop_assert!(m.contains_key(key));
                }
            }
        }
    }
}
