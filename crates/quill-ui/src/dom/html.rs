//! Markup serialization

use super::node::{Node, NodeKind};

/// Elements that never have children or a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub(crate) fn serialize(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_node(node: &Node, out: &mut String) {
    match &node.0.kind {
        NodeKind::Text(_) => {
            out.push_str(&escape_text(&node.text_data().unwrap_or_default()));
        }
        NodeKind::Document | NodeKind::Fragment => {
            for child in node.children() {
                write_node(&child, out);
            }
        }
        NodeKind::Element(data) => {
            out.push('<');
            out.push_str(&data.tag);
            for (name, value) in node.attributes() {
                out.push(' ');
                out.push_str(&name);
                if !value.is_empty() {
                    out.push_str("=\"");
                    out.push_str(&escape_attr(&value));
                    out.push('"');
                }
            }

            let style = node.style_pairs();
            if !style.is_empty() {
                let css: Vec<String> = style.iter().map(|(p, v)| format!("{}: {}", p, v)).collect();
                out.push_str(" style=\"");
                out.push_str(&escape_attr(&css.join("; ")));
                out.push('"');
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&data.tag.as_str()) {
                return;
            }
            if data.tag == "textarea" {
                out.push_str(&escape_text(&node.value()));
            }
            for child in node.children() {
                write_node(&child, out);
            }
            out.push_str("</");
            out.push_str(&data.tag);
            out.push('>');
        }
    }
}

/// Escape text content
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape an attribute value for use inside double quotes
pub fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}
