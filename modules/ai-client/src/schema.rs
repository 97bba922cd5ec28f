use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;

/// Types usable as OpenAI structured output. Blanket-implemented for
/// anything that is `JsonSchema + DeserializeOwned`.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    /// Schema in the shape OpenAI strict mode accepts:
    /// every object carries `additionalProperties: false` with all
    /// properties required, and `$ref`s are fully inlined.
    fn openai_schema() -> serde_json::Value {
        let mut value = serde_json::to_value(schema_for!(Self)).unwrap_or_default();

        let definitions = value.get("definitions").cloned();
        normalize(&mut value, definitions.as_ref());

        if let serde_json::Value::Object(map) = &mut value {
            map.remove("definitions");
            map.remove("$schema");
        }

        value
    }

    fn type_name() -> String {
        <Self as JsonSchema>::schema_name()
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

fn normalize(value: &mut serde_json::Value, definitions: Option<&serde_json::Value>) {
    match value {
        serde_json::Value::Object(map) => {
            // Inline references before anything else so the inlined subtree
            // gets normalized too.
            if let Some(serde_json::Value::String(ref_path)) = map.get("$ref").cloned() {
                if let Some(name) = ref_path.strip_prefix("#/definitions/") {
                    if let Some(def) = definitions.and_then(|d| d.get(name)) {
                        *value = def.clone();
                        normalize(value, definitions);
                        return;
                    }
                }
            }

            if map.get("type") == Some(&serde_json::Value::String("object".to_string())) {
                map.insert(
                    "additionalProperties".to_string(),
                    serde_json::Value::Bool(false),
                );
                if let Some(serde_json::Value::Object(props)) = map.get("properties") {
                    let all_keys: Vec<serde_json::Value> = props
                        .keys()
                        .map(|k| serde_json::Value::String(k.clone()))
                        .collect();
                    map.insert("required".to_string(), serde_json::Value::Array(all_keys));
                }
            }

            for (_, v) in map.iter_mut() {
                normalize(v, definitions);
            }
        }
        serde_json::Value::Array(arr) => {
            for item in arr.iter_mut() {
                normalize(item, definitions);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;

    #[derive(Deserialize, JsonSchema)]
    struct Inner {
        #[allow(dead_code)]
        label: String,
    }

    #[derive(Deserialize, JsonSchema)]
    struct Outer {
        #[allow(dead_code)]
        value: i32,
        #[allow(dead_code)]
        inner: Inner,
    }

    #[test]
    fn objects_are_closed_and_fully_required() {
        let schema = Outer::openai_schema();
        assert_eq!(schema["additionalProperties"], serde_json::json!(false));
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&serde_json::json!("value")));
        assert!(required.contains(&serde_json::json!("inner")));
    }

    #[test]
    fn refs_are_inlined() {
        let schema = Outer::openai_schema();
        let text = schema.to_string();
        assert!(!text.contains("$ref"));
        assert!(!text.contains("definitions"));
        // The inlined Inner object must also be closed.
        assert_eq!(
            schema["properties"]["inner"]["additionalProperties"],
            serde_json::json!(false)
        );
    }
}
