//! Expansion of template mapping expressions from regex capture groups.

/// Expand a mapping expression into a concrete string.
///
/// `{group<N>}` placeholders (1-based) substitute the corresponding capture
/// group's text; placeholders referencing groups that do not exist stay
/// literal. The fixed placeholders `{timestamp}`, `{level}`, `{tag}` and
/// `{message}` substitute groups 1-4 (empty string when absent) after the
/// `{group<N>}` pass; both schemes apply to every expression. The result is
/// not sanitized here; participant sanitization happens at render time.
pub fn map_entity(expression: &str, groups: &[String]) -> String {
    if expression.is_empty() {
        return "Unknown".to_string();
    }

    let mut result = expression.to_string();
    for (i, group) in groups.iter().enumerate() {
        let placeholder = format!("{{group{}}}", i + 1);
        if result.contains(&placeholder) {
            result = result.replace(&placeholder, group);
        }
    }

    // Group-position convention: groups 1-4 of the standard log pattern.
    for (placeholder, index) in [
        ("{timestamp}", 0),
        ("{level}", 1),
        ("{tag}", 2),
        ("{message}", 3),
    ] {
        let text = groups.get(index).map(String::as_str).unwrap_or("");
        result = result.replace(placeholder, text);
    }

    if result.is_empty() {
        "Unknown".to_string()
    } else {
        result
    }
}
