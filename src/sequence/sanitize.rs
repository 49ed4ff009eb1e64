//! Participant identifier sanitization for diagram markup.

/// Normalize an arbitrary string into a diagram-safe participant identifier.
///
/// Strips every character that is not alphanumeric, underscore, whitespace or
/// hyphen, then collapses whitespace runs into single underscores. Names not
/// starting with a letter get a `P_` prefix; an empty result becomes
/// `"Unknown"`. Idempotent: `sanitize(sanitize(x)) == sanitize(x)`.
pub fn sanitize_participant(name: &str) -> String {
    let stripped: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    let mut out = String::with_capacity(stripped.len());
    let mut pending_gap = false;
    for c in stripped.trim().chars() {
        if c.is_whitespace() {
            pending_gap = true;
        } else {
            if pending_gap {
                out.push('_');
                pending_gap = false;
            }
            out.push(c);
        }
    }

    if out.is_empty() {
        return "Unknown".to_string();
    }
    match out.chars().next() {
        Some(c) if c.is_alphabetic() => out,
        _ => format!("P_{out}"),
    }
}
