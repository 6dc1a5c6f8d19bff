//! Draft snapshot sanitisation before a draft is synced to the backend.

use serde_json::{Map, Value};

use crate::scope::known_vars::{START_QUERY_ALIAS, SYSTEM_NAMESPACE};

const SYS_QUERY: &str = "sys.query";

/// Strip UI-only `_`-prefixed keys and rewrite the legacy `start_query`
/// alias to `sys.query`, recursively.
pub fn sanitize_draft(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(k, _)| !k.starts_with('_'))
                .map(|(k, v)| (k, sanitize_draft(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) if is_start_query_selector(&items) => {
            let mut segments = vec![Value::String(SYSTEM_NAMESPACE.to_string())];
            segments.extend(items.into_iter().skip(1));
            if segments.len() == 1 {
                segments.push(Value::String("query".to_string()));
            }
            Value::Array(segments)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_draft).collect()),
        Value::String(s) if s.contains(START_QUERY_ALIAS) => Value::String(
            s.replace("start_query.query", SYS_QUERY)
                .replace(START_QUERY_ALIAS, SYS_QUERY),
        ),
        other => other,
    }
}

fn is_start_query_selector(items: &[Value]) -> bool {
    items.first().and_then(Value::as_str) == Some(START_QUERY_ALIAS)
        && items.iter().all(Value::is_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strips_underscore_keys_recursively() {
        let draft = sanitize_draft(json!({
            "title": "Loop",
            "_isShowTips": true,
            "_children": ["a"],
            "nested": {"_runningStatus": "running", "keep": 1}
        }));
        assert_eq!(draft, json!({"title": "Loop", "nested": {"keep": 1}}));
    }

    #[test]
    fn test_rewrites_start_query() {
        let draft = sanitize_draft(json!({
            "iterator_selector": ["start_query", "query"],
            "prompt": "Answer {{#start_query.query#}}",
            "other": ["start_query"]
        }));
        assert_eq!(draft["iterator_selector"], json!(["sys", "query"]));
        assert_eq!(draft["prompt"], json!("Answer {{#sys.query#}}"));
        assert_eq!(draft["other"], json!(["sys", "query"]));
    }

    #[test]
    fn test_plain_values_untouched() {
        let value = json!({"parallel_nums": 4, "items": ["a", "b"], "flag": false});
        assert_eq!(sanitize_draft(value.clone()), value);
    }
}
