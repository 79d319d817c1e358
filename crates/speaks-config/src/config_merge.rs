use serde_yaml::Value;

/// Right-biased deep merge of two YAML documents.
///
/// A non-mapping override value wins outright, lists included. Mappings on
/// both sides recurse. A mapping overriding a scalar keeps the scalar, so a
/// user document cannot turn a flat setting into a tree. Keys only present
/// in the base survive. The operation is idempotent.
pub fn merge_values(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(mut base_map), Value::Mapping(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get(&key).cloned() {
                    Some(base_value) => {
                        if overlay_value.is_mapping() && !base_value.is_mapping() {
                            continue;
                        }
                        base_map.insert(key, merge_values(base_value, overlay_value));
                    }
                    None => {
                        base_map.insert(key, overlay_value);
                    }
                }
            }
            Value::Mapping(base_map)
        }
        (_, overlay) => overlay,
    }
}
