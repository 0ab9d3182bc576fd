//! Response body rewriting for file resource paths

use serde_json::Value;

const FILE_PATH_KEY: &str = "filePath";

/// Prefix every relative `filePath` string in `value` with `base`, walking
/// nested objects and arrays (pagination `content` envelopes included).
/// Parsed JSON cannot contain reference cycles, so plain recursion
/// terminates. Already-absolute paths are left untouched, which also makes
/// the rewrite idempotent.
pub(crate) fn rewrite_file_paths(value: &mut Value, base: &str) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                match child {
                    Value::String(path) if key == FILE_PATH_KEY => {
                        if !is_absolute(path) {
                            *path = join(base, path);
                        }
                    }
                    _ => rewrite_file_paths(child, base),
                }
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                rewrite_file_paths(item, base);
            }
        }
        _ => {}
    }
}

fn is_absolute(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

fn join(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASE: &str = "https://files.tabellion.example";

    #[test]
    fn rewrites_relative_and_keeps_absolute() {
        let mut body = json!({
            "items": [
                { "filePath": "x/y.pdf" },
                { "filePath": "https://host/z.pdf" }
            ]
        });
        rewrite_file_paths(&mut body, BASE);
        assert_eq!(
            body["items"][0]["filePath"],
            "https://files.tabellion.example/x/y.pdf"
        );
        assert_eq!(body["items"][1]["filePath"], "https://host/z.pdf");
    }

    #[test]
    fn rewriting_twice_does_not_double_prefix() {
        let mut body = json!({ "filePath": "acte.pdf" });
        rewrite_file_paths(&mut body, BASE);
        let once = body.clone();
        rewrite_file_paths(&mut body, BASE);
        assert_eq!(body, once);
    }

    #[test]
    fn recurses_into_content_envelope_and_nested_objects() {
        let mut body = json!({
            "content": [
                { "dossier": { "filePath": "dossiers/1/acte.pdf" } }
            ],
            "totalElements": 1
        });
        rewrite_file_paths(&mut body, BASE);
        assert_eq!(
            body["content"][0]["dossier"]["filePath"],
            "https://files.tabellion.example/dossiers/1/acte.pdf"
        );
        assert_eq!(body["totalElements"], 1);
    }

    #[test]
    fn tolerates_missing_fields_and_non_object_leaves() {
        let mut scalar = json!("just a string");
        rewrite_file_paths(&mut scalar, BASE);
        assert_eq!(scalar, "just a string");

        let mut odd = json!({ "filePath": 42, "other": null });
        rewrite_file_paths(&mut odd, BASE);
        assert_eq!(odd["filePath"], 42);
    }

    #[test]
    fn slash_handling_does_not_duplicate_separators() {
        let mut body = json!({ "filePath": "/signed/acte.pdf" });
        rewrite_file_paths(&mut body, "https://files.tabellion.example/");
        assert_eq!(
            body["filePath"],
            "https://files.tabellion.example/signed/acte.pdf"
        );
    }
}
