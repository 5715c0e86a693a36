//! Scalar coercion: raw tokens to typed values.

use super::value::Value;

/// Coerce a trimmed token into a typed scalar.
///
/// One layer of matching `"` or `'` quotes is stripped first. No escape
/// sequences are interpreted.
pub fn coerce(token: &str) -> Value {
    let s = unquote(token);

    match s {
        "" | "null" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ if is_integer(s) || is_decimal(s) => match s.parse::<f64>() {
            Ok(n) => Value::Number(n),
            Err(_) => Value::Text(s.to_string()),
        },
        _ => Value::Text(s.to_string()),
    }
}

/// Whether `text` would survive as `Text` when printed bare and read back.
pub fn is_plain_text(text: &str) -> bool {
    matches!(coerce(text), Value::Text(ref s) if s == text) && text.trim() == text
}

fn unquote(token: &str) -> &str {
    for quote in ['"', '\''] {
        if token.len() >= 2 && token.starts_with(quote) && token.ends_with(quote) {
            return &token[1..token.len() - 1];
        }
    }
    token
}

/// `^-?[0-9]+$`
fn is_integer(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// `^-?[0-9]+\.[0-9]+$`
fn is_decimal(s: &str) -> bool {
    match s.split_once('.') {
        Some((whole, frac)) => {
            is_integer(whole)
                && !frac.is_empty()
                && frac.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}
