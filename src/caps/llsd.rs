//! LLSD XML encoding for capability acknowledgements
//!
//! Values are rendered from any `serde::Serialize` type by way of
//! `serde_json::Value`. Only the subset viewers read back from upload
//! responses is produced: maps, arrays, strings, integers, reals, booleans
//! and undef.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Content type for LLSD XML bodies
pub const LLSD_XML_CONTENT_TYPE: &str = "application/llsd+xml";

/// LLSD encoding error type
#[derive(Error, Debug)]
pub enum LlsdError {
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Serialize a value as an LLSD XML document
pub fn to_xml<T: Serialize>(value: &T) -> Result<String, LlsdError> {
    let value = serde_json::to_value(value)?;
    let mut out = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><llsd>"#);
    write_value(&mut out, &value);
    out.push_str("</llsd>");
    Ok(out)
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("<undef />"),
        Value::Bool(b) => {
            out.push_str("<boolean>");
            out.push_str(if *b { "1" } else { "0" });
            out.push_str("</boolean>");
        }
        Value::Number(n) if n.is_i64() || n.is_u64() => {
            out.push_str("<integer>");
            out.push_str(&n.to_string());
            out.push_str("</integer>");
        }
        Value::Number(n) => {
            out.push_str("<real>");
            out.push_str(&n.to_string());
            out.push_str("</real>");
        }
        Value::String(s) => {
            out.push_str("<string>");
            escape_into(out, s);
            out.push_str("</string>");
        }
        Value::Array(items) => {
            out.push_str("<array>");
            for item in items {
                write_value(out, item);
            }
            out.push_str("</array>");
        }
        Value::Object(map) => {
            out.push_str("<map>");
            for (key, item) in map {
                out.push_str("<key>");
                escape_into(out, key);
                out.push_str("</key>");
                write_value(out, item);
            }
            out.push_str("</map>");
        }
    }
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
}
