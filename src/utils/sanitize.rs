/// Clean text that came from an untrusted source (contract storage, explorer JSON)
///
/// Keeps printable ASCII only, trims surrounding whitespace and maps an empty
/// result to `None` so "nothing usable" has a single representation.
pub fn sanitize_token_text(text: Option<&str>) -> Option<String> {
    let cleaned: String = text?.chars().filter(|c| matches!(c, ' '..='~')).collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
