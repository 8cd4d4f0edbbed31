//! Folding per-chunk results into one aggregate.

use serde_json::Value;

use crate::pipeline::JsonObject;

/// Merge `source` into `target`, key by key.
///
/// - new key → inserted as is
/// - array in both → `source` elements appended after `target`'s
/// - anything else → `target` keeps its value; the first writer wins
pub fn merge(target: &mut JsonObject, source: JsonObject) {
    for (key, incoming) in source {
        match target.get_mut(&key) {
            None => {
                target.insert(key, incoming);
            }
            Some(Value::Array(existing)) => {
                if let Value::Array(more) = incoming {
                    existing.extend(more);
                }
            }
            Some(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            other => panic!("Expected object, got {other}"),
        }
    }

    #[test]
    fn new_keys_copied_verbatim() {
        let mut target = obj(json!({"a": 1}));
        merge(&mut target, obj(json!({"b": {"nested": [1, 2]}})));
        assert_eq!(Value::Object(target), json!({"a": 1, "b": {"nested": [1, 2]}}));
    }

    #[test]
    fn arrays_concatenate_target_first() {
        let mut target = obj(json!({"items": [1, 2]}));
        merge(&mut target, obj(json!({"items": [2, 3, 4]})));
        assert_eq!(target["items"], json!([1, 2, 2, 3, 4]));
    }

    #[test]
    fn scalar_first_writer_wins() {
        let mut target = obj(json!({"total": 100}));
        merge(&mut target, obj(json!({"total": 250})));
        assert_eq!(target["total"], json!(100));
    }

    #[test]
    fn null_in_target_still_wins() {
        let mut target = obj(json!({"vendor": null}));
        merge(&mut target, obj(json!({"vendor": "Acme"})));
        assert_eq!(target["vendor"], Value::Null);
    }

    #[test]
    fn mismatched_types_keep_target() {
        let mut target = obj(json!({"a": [1], "b": "text", "c": {"x": 1}}));
        merge(&mut target, obj(json!({"a": "scalar", "b": [1, 2], "c": {"y": 2}})));
        assert_eq!(target["a"], json!([1]));
        assert_eq!(target["b"], json!("text"));
        assert_eq!(target["c"], json!({"x": 1}));
    }

    #[test]
    fn empty_source_is_noop() {
        let mut target = obj(json!({"a": [1]}));
        merge(&mut target, JsonObject::new());
        assert_eq!(Value::Object(target), json!({"a": [1]}));
    }

    #[test]
    fn merge_properties_hold() {
        let target_value = json!({"list": [1, 2, 3], "flag": true, "only_target": "t"});
        let source_value = json!({"list": [4, 5], "flag": false, "only_source": {"k": "v"}});
        let target = obj(target_value.clone());
        let source = obj(source_value.clone());

        let mut merged = target.clone();
        merge(&mut merged, source.clone());

        // Key set is the union.
        let mut keys: Vec<&String> = target.keys().chain(source.keys()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(merged.keys().collect::<Vec<_>>(), keys);

        // Source-only key equals source value.
        assert_eq!(merged["only_source"], source_value["only_source"]);

        // Array length is the sum, in target-then-source order.
        assert_eq!(merged["list"], json!([1, 2, 3, 4, 5]));

        // Duplicate non-array keeps target.
        assert_eq!(merged["flag"], target_value["flag"]);
    }
}
