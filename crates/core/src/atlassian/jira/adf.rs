//! Plain-text rendering of issue descriptions for terminal display.
//!
//! Jira Cloud returns descriptions as ADF (Atlassian Document Format) JSON,
//! while older payloads carry a plain string. Canonical results keep the value
//! opaque, this is only used by the CLI.

use serde_json::Value;

/// Render a description value to text. Returns `None` when nothing readable
/// is left.
pub fn description_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        doc @ Value::Object(_) if doc.get("type").and_then(Value::as_str) == Some("doc") => {
            let mut out = String::new();
            render_children(doc, 0, &mut out);
            out.trim().to_string()
        }
        _ => return None,
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn children(node: &Value) -> &[Value] {
    node.get("content")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn render_children(node: &Value, depth: usize, out: &mut String) {
    for child in children(node) {
        render_node(child, depth, out);
    }
}

fn inline_text(node: &Value) -> String {
    let mut text = String::new();
    render_children(node, 0, &mut text);
    text.trim().to_string()
}

fn render_node(node: &Value, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match node.get("type").and_then(Value::as_str).unwrap_or_default() {
        "text" => {
            if let Some(text) = node.get("text").and_then(Value::as_str) {
                out.push_str(text);
            }
        }
        "hardBreak" => out.push('\n'),
        "mention" => {
            if let Some(text) = node.pointer("/attrs/text").and_then(Value::as_str) {
                out.push_str(text);
            }
        }
        "paragraph" => {
            render_children(node, depth, out);
            out.push('\n');
        }
        "heading" => {
            let level = node
                .pointer("/attrs/level")
                .and_then(Value::as_u64)
                .unwrap_or(1)
                .clamp(1, 6) as usize;
            out.push_str(&format!("{indent}{} {}\n", "#".repeat(level), inline_text(node)));
        }
        "bulletList" | "orderedList" => {
            let ordered = node.get("type").and_then(Value::as_str) == Some("orderedList");
            for (i, item) in children(node).iter().enumerate() {
                let marker = if ordered {
                    format!("{}.", i + 1)
                } else {
                    "-".to_string()
                };
                out.push_str(&format!("{indent}{marker} {}\n", inline_text(item)));
            }
        }
        "codeBlock" => {
            out.push_str(&format!("{indent}```\n{}\n{indent}```\n", inline_text(node)));
        }
        _ => render_children(node, depth, out),
    }
}
