//! Identifiers of the meta-model.

/// A name of a symbol, property, argument or literal.
pub type Identifier = String;

/// Check whether `text` is a valid identifier: a letter or underscore
/// followed by letters, digits or underscores.
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|ch| ch == '_' || ch.is_alphanumeric())
}
