//! Lexical rewriting of expressions into FEEL.
//!
//! The rewrite is a plain text substitution. It does not parse the
//! expression, so operator-like text inside a string literal is rewritten
//! too: `status == 'a == b'` becomes `=status = "a = b"`.

/// Prefix that marks an expression as FEEL.
pub const FEEL_MARKER: char = '=';

/// Rewrites `expression` into a FEEL expression.
///
/// Empty expressions and expressions already starting with `=` are returned
/// unchanged. Otherwise ` == ` becomes ` = `, single quotes become double
/// quotes, and the result is prefixed with `=`. ` != ` is already valid FEEL
/// and is kept.
pub fn normalize(expression: &str) -> String {
    if expression.is_empty() || expression.starts_with(FEEL_MARKER) {
        return expression.to_string();
    }

    let rewritten = expression.replace(" == ", " = ").replace('\'', "\"");
    format!("{FEEL_MARKER}{rewritten}")
}

/// Like [`normalize`] but without the leading marker, for embedding into a
/// larger FEEL expression.
pub fn normalize_inner(expression: &str) -> String {
    let normalized = normalize(expression);
    match normalized.strip_prefix(FEEL_MARKER) {
        Some(inner) => inner.to_string(),
        None => normalized,
    }
}
