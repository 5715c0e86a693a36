//! Deterministic encoder from value trees to receipt markup.

use thiserror::Error;

use super::decode::{is_block_indicator, split_entry};
use super::scalar::{coerce, is_plain_text};
use super::value::{format_number, Mapping, Value};

/// A value the markup dialect cannot represent.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    #[error("cannot encode non-finite number {0}")]
    NonFiniteNumber(f64),

    #[error("cannot encode key {0:?}: keys must be single-line, trimmed, and free of \": \"")]
    InvalidKey(String),
}

const INDENT: &str = "  ";

/// Encode a value tree at the top level.
pub fn encode(value: &Value) -> Result<String, EncodeError> {
    encode_at(value, 0)
}

/// Encode a value tree with every line indented `indent_level` steps.
///
/// The output has no trailing newline. Encoding the same tree twice always
/// yields identical text.
pub fn encode_at(value: &Value, indent_level: usize) -> Result<String, EncodeError> {
    let mut lines = Vec::new();

    match value {
        Value::Mapping(map) => write_mapping(map, indent_level, &mut lines)?,
        Value::Sequence(items) => write_sequence(items, indent_level, &mut lines)?,
        scalar => lines.push(format!("{}{}", INDENT.repeat(indent_level), token(scalar, false)?)),
    }

    Ok(lines.join("\n"))
}

fn write_mapping(map: &Mapping, level: usize, out: &mut Vec<String>) -> Result<(), EncodeError> {
    let pad = INDENT.repeat(level);

    for (key, value) in map.iter() {
        check_key(key)?;

        match value {
            Value::Mapping(inner) if !inner.is_empty() => {
                out.push(format!("{pad}{key}:"));
                write_mapping(inner, level + 1, out)?;
            }
            Value::Sequence(items) if !items.is_empty() => {
                out.push(format!("{pad}{key}:"));
                write_sequence(items, level + 1, out)?;
            }
            // Empty containers have no body; they read back as null.
            Value::Null | Value::Mapping(_) | Value::Sequence(_) => out.push(format!("{pad}{key}:")),
            Value::Text(text) if needs_block(text) => {
                write_block(&format!("{pad}{key}: "), text, level + 1, out);
            }
            scalar => out.push(format!("{pad}{key}: {}", token(scalar, false)?)),
        }
    }

    Ok(())
}

fn write_sequence(items: &[Value], level: usize, out: &mut Vec<String>) -> Result<(), EncodeError> {
    let pad = INDENT.repeat(level);

    for item in items {
        match item {
            Value::Mapping(map) if !map.is_empty() => {
                // The first entry shares the marker line; the rest line up under it.
                let start = out.len();
                write_mapping(map, level + 1, out)?;
                let body = out[start].split_off(INDENT.len() * (level + 1));
                out[start] = format!("{pad}- {body}");
            }
            Value::Sequence(inner) if !inner.is_empty() => {
                out.push(format!("{pad}-"));
                write_sequence(inner, level + 1, out)?;
            }
            // A bare marker with no body reads back as null.
            Value::Mapping(_) | Value::Sequence(_) => out.push(format!("{pad}-")),
            Value::Text(text) if needs_block(text) => {
                write_block(&format!("{pad}- "), text, level + 1, out);
            }
            scalar => out.push(format!("{pad}- {}", token(scalar, true)?)),
        }
    }

    Ok(())
}

/// Multi-line text, and the empty string (which reads back as null inline).
fn needs_block(text: &str) -> bool {
    text.is_empty() || text.contains('\n')
}

/// Write a string as a literal block after `head`.
///
/// Content sits one level deeper than the head. When the first non-blank
/// line starts with whitespace the header carries that offset explicitly.
fn write_block(head: &str, text: &str, level: usize, out: &mut Vec<String>) {
    let body = text.trim_end_matches('\n');
    let trailing = text.len() - body.len();
    let chomp = match trailing {
        _ if text.is_empty() => "-",
        _ if body.is_empty() => "+",
        0 => "-",
        1 => "",
        _ => "+",
    };
    let indented = body
        .split('\n')
        .find(|line| !line.trim().is_empty())
        .is_some_and(|line| line.starts_with([' ', '\t']));
    let indent = if indented { INDENT.len().to_string() } else { String::new() };

    out.push(format!("{head}|{indent}{chomp}"));

    let pad = INDENT.repeat(level);
    if !body.is_empty() {
        for line in body.split('\n') {
            if line.is_empty() {
                out.push(String::new());
            } else {
                out.push(format!("{pad}{line}"));
            }
        }
    }
    if chomp == "+" {
        out.extend(std::iter::repeat(String::new()).take(trailing.saturating_sub(1)));
    }
}

/// The inline token for a scalar. `in_item` marks a sequence item, where a
/// token shaped like `key:` or `key: value` opens a mapping.
fn token(value: &Value, in_item: bool) -> Result<String, EncodeError> {
    match value {
        Value::Null => Ok("null".to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) if n.is_finite() => Ok(format_number(*n)),
        Value::Number(n) => Err(EncodeError::NonFiniteNumber(*n)),
        Value::Text(text) => Ok(text_token(text, in_item)),
        Value::Sequence(_) | Value::Mapping(_) => Ok(String::new()),
    }
}

/// Text bare when it reads back as itself, else double-quoted.
///
/// Quoting cannot help text that coerces to another type once unquoted
/// (`42`, `true`), or an item containing `": "`; those are written bare.
fn text_token(text: &str, in_item: bool) -> String {
    let inline = |token: &str| !is_block_indicator(token) && !(in_item && split_entry(token).is_some());

    if is_plain_text(text) && inline(text) {
        return text.to_string();
    }

    let quoted = format!("\"{text}\"");
    if inline(&quoted) && matches!(coerce(&quoted), Value::Text(ref s) if s == text) {
        quoted
    } else {
        text.to_string()
    }
}

fn check_key(key: &str) -> Result<(), EncodeError> {
    let valid = !key.is_empty()
        && key.trim() == key
        && !key.contains(['\n', '\r', '\t'])
        && !key.contains(": ")
        && !key.starts_with("- ")
        && key != "-";

    if valid {
        Ok(())
    } else {
        Err(EncodeError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::decode;
    use pretty_assertions::assert_eq;

    fn sample() -> Value {
        let violation = Mapping::new()
            .with("code", "C1")
            .with("title", "Improper storage")
            .with("critical", true)
            .with("narrative", "Raw chicken above produce.\nMoved during inspection.");

        Value::Mapping(
            Mapping::new()
                .with("receipt_version", 1i64)
                .with(
                    "entity",
                    Mapping::new()
                        .with("type", "school")
                        .with("name", "Example High")
                        .with("parent", Value::Null),
                )
                .with(
                    "inspection",
                    Mapping::new()
                        .with("score", 92.5)
                        .with("violations", vec![Value::Mapping(violation)]),
                )
                .with("tags", vec![Value::from("a"), Value::from("b")]),
        )
    }

    #[test]
    fn test_encode_sample() {
        let out = encode(&sample()).unwrap();

        insta::assert_snapshot!(out, @r###"
        receipt_version: 1
        entity:
          type: school
          name: Example High
          parent:
        inspection:
          score: 92.5
          violations:
            - code: C1
              title: Improper storage
              critical: true
              narrative: |-
                Raw chicken above produce.
                Moved during inspection.
        tags:
          - a
          - b
        "###);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let value = sample();
        assert_eq!(encode(&value).unwrap(), encode(&value).unwrap());
    }

    #[test]
    fn test_sample_round_trips() {
        let value = sample();
        assert_eq!(decode(&encode(&value).unwrap()), value);
    }

    #[test]
    fn test_encode_at_indents_every_line() {
        let value = Value::Mapping(Mapping::new().with("a", Mapping::new().with("b", 1i64)));

        assert_eq!(encode_at(&value, 2).unwrap(), "    a:\n      b: 1");
    }

    #[test]
    fn test_scalar_tokens() {
        let value = Value::Mapping(
            Mapping::new()
                .with("int", 42i64)
                .with("neg", -7i64)
                .with("dec", 0.25)
                .with("empty", "")
                .with("pipe", "|-")
                .with("colon", "abc: def"),
        );

        let out = encode(&value).unwrap();
        assert_eq!(
            out,
            "int: 42\nneg: -7\ndec: 0.25\nempty: |-\npipe: \"|-\"\ncolon: abc: def"
        );
        assert_eq!(decode(&out), value);
    }

    #[test]
    fn test_items_quoted_when_bare_form_reads_differently() {
        let items = ["Note:", "ok", " padded", "'single'", "|2-", "a:b", "- dash"];
        let value = Value::Mapping(
            Mapping::new().with("notes", items.iter().map(|s| Value::from(*s)).collect::<Vec<_>>()),
        );

        let out = encode(&value).unwrap();
        assert_eq!(
            out,
            "notes:\n  - \"Note:\"\n  - ok\n  - \" padded\"\n  - \"'single'\"\n  - \"|2-\"\n  - a:b\n  - - dash"
        );
        assert_eq!(decode(&out), value);
    }

    #[test]
    fn test_trailing_colon_stays_bare_as_mapping_value() {
        let value = Value::Mapping(Mapping::new().with("title", "Note:"));

        let out = encode(&value).unwrap();
        assert_eq!(out, "title: Note:");
        assert_eq!(decode(&out), value);
    }

    #[test]
    fn test_null_sequence_item() {
        let value = Value::Mapping(Mapping::new().with("xs", vec![Value::Null, Value::from(1i64)]));

        let out = encode(&value).unwrap();
        assert_eq!(out, "xs:\n  - null\n  - 1");
        assert_eq!(decode(&out), value);
    }

    #[test]
    fn test_item_with_nested_first_entry() {
        let item = Mapping::new()
            .with("meta", Mapping::new().with("size", 2i64))
            .with("note", Value::Null);
        let value = Value::Mapping(Mapping::new().with("items", vec![Value::Mapping(item)]));

        let out = encode(&value).unwrap();
        assert_eq!(out, "items:\n  - meta:\n      size: 2\n    note:");
        assert_eq!(decode(&out), value);
    }

    #[test]
    fn test_block_chomping_round_trips() {
        for text in ["a\nb", "a\nb\n", "a\n\nb\n\n\n", "\n", "line\n\n"] {
            let value = Value::Mapping(Mapping::new().with("t", text).with("after", 1i64));
            let out = encode(&value).unwrap();
            assert_eq!(decode(&out), value, "{text:?} encoded as {out:?}");
        }
    }

    #[test]
    fn test_multiline_sequence_scalar() {
        let value = Value::Mapping(Mapping::new().with("notes", vec![Value::from("one\ntwo")]));

        let out = encode(&value).unwrap();
        assert_eq!(out, "notes:\n  - |-\n    one\n    two");
        assert_eq!(decode(&out), value);
    }

    #[test]
    fn test_empty_containers_render_bare() {
        let value = Value::Mapping(
            Mapping::new()
                .with("violations", Vec::<Value>::new())
                .with("proof", Mapping::new()),
        );

        assert_eq!(encode(&value).unwrap(), "violations:\nproof:");
    }

    #[test]
    fn test_block_with_indented_first_line() {
        let value = Value::Mapping(
            Mapping::new()
                .with("narrative", "  indented first\nsecond")
                .with("next", 1i64),
        );

        let out = encode(&value).unwrap();
        assert_eq!(out, "narrative: |2-\n    indented first\n  second\nnext: 1");
        assert_eq!(decode(&out), value);
    }

    #[test]
    fn test_block_with_whitespace_only_line() {
        let value = Value::Mapping(Mapping::new().with("narrative", "a\n  \nb"));

        let out = encode(&value).unwrap();
        assert_eq!(out, "narrative: |-\n  a\n    \n  b");
        assert_eq!(decode(&out), value);
    }

    #[test]
    fn test_nested_sequence_items() {
        let value = Value::Mapping(Mapping::new().with(
            "m",
            vec![
                Value::Sequence(vec![Value::from("a"), Value::Sequence(vec![Value::from(1i64)])]),
                Value::from("b"),
            ],
        ));

        let out = encode(&value).unwrap();
        assert_eq!(out, "m:\n  -\n    - a\n    -\n      - 1\n  - b");
        assert_eq!(decode(&out), value);
    }

    #[test]
    fn test_empty_items_render_bare_marker() {
        let value = Value::Mapping(Mapping::new().with(
            "x",
            vec![Value::Mapping(Mapping::new()), Value::Sequence(vec![])],
        ));

        let out = encode(&value).unwrap();
        assert_eq!(out, "x:\n  -\n  -");
        assert_eq!(
            decode(&out),
            Value::Mapping(Mapping::new().with("x", vec![Value::Null, Value::Null]))
        );
    }

    #[test]
    fn test_unrepresentable_values() {
        let nan = Value::Mapping(Mapping::new().with("x", f64::NAN));
        assert!(matches!(encode(&nan), Err(EncodeError::NonFiniteNumber(_))));

        for key in ["", " padded", "a: b", "- a", "multi\nline"] {
            let bad = Value::Mapping(Mapping::new().with(key, 1i64));
            assert_eq!(encode(&bad), Err(EncodeError::InvalidKey(key.to_string())));
        }
    }
}
