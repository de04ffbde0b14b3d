use serde_json::Value;

/// Node types whose children are inline and run together on one line.
const INLINE_CONTAINERS: &[&str] = &["paragraph", "heading", "codeBlock", "blockquote"];

/// Flatten Jira's Atlassian Document Format (ADF) to plain text.
///
/// Block nodes become separate lines; inline text inside a paragraph is
/// concatenated as written. Plain string descriptions (API v2) pass through.
pub fn extract_text_from_adf(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        other => render(other),
    };
    let text = text.trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(nodes) => nodes
            .iter()
            .map(render)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(obj) => {
            let node_type = obj.get("type").and_then(|v| v.as_str()).unwrap_or_default();
            match node_type {
                "text" => obj
                    .get("text")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                "hardBreak" => "\n".to_string(),
                "mention" | "emoji" => obj
                    .get("attrs")
                    .and_then(|a| a.get("text"))
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                t if INLINE_CONTAINERS.contains(&t) => match obj.get("content") {
                    Some(Value::Array(children)) => children.iter().map(render).collect(),
                    _ => String::new(),
                },
                _ => obj.get("content").map(render).unwrap_or_default(),
            }
        }
        _ => String::new(),
    }
}
