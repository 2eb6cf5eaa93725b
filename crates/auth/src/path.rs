/// Normalise a requested location to the form route entries are declared in.
///
/// Query strings and fragments are dropped, a trailing `/` is removed (except
/// for the root) and an empty path becomes `/`. A missing leading `/` is added.
pub fn normalize_path(raw: &str) -> String {
    let without_fragment = raw.split('#').next().unwrap_or_default();
    let without_query = without_fragment.split('?').next().unwrap_or_default();
    let trimmed = without_query.trim();

    let mut path = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    };

    while path.len() > 1 && path.ends_with('/') {
        path.pop();
    }

    path
}
