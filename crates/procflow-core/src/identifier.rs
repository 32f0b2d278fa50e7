//! Lexical rules for identifiers appearing in a process model.
//!
//! Element and process ids end up as XML `ID` attribute values, so they
//! follow the NCName-like rule used by BPMN tooling. Variable names used in
//! io mappings follow the expression language's identifier rule.

/// Returns `true` when `id` is usable as an XML id.
///
/// The first character must be a letter or underscore; the remaining
/// characters may be letters, digits, `-`, `_`, or `.`.
///
/// # Examples
///
/// ```
/// use procflow_core::identifier::is_xml_id;
///
/// assert!(is_xml_id("order-process_v1.2"));
/// assert!(!is_xml_id("1st-task"));
/// assert!(!is_xml_id(""));
/// ```
pub fn is_xml_id(id: &str) -> bool {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(is_xml_id_char)
}

fn is_xml_id_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '-' | '_' | '.')
}

/// Returns `true` when `name` is a valid process variable name.
///
/// # Examples
///
/// ```
/// use procflow_core::identifier::is_variable_name;
///
/// assert!(is_variable_name("orderTotal"));
/// assert!(is_variable_name("_tmp1"));
/// assert!(!is_variable_name("order-total"));
/// ```
pub fn is_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_alphanumeric() || ch == '_')
}
