//! Derived identifiers for child nodes and default data items

/// Separator used when no settings are supplied
pub const DEFAULT_SEPARATOR: &str = "_";

/// Join the non-empty parts of an id with `separator`.
///
/// `create_id("dev", "temp", Some("act"), "_") == "dev_temp_act"`. Empty
/// parents or names are skipped, so a root node keeps its bare name.
pub fn create_id(parent_id: &str, name: &str, suffix: Option<&str>, separator: &str) -> String {
    let mut id = String::with_capacity(parent_id.len() + name.len() + 8);
    for part in [Some(parent_id), Some(name), suffix].into_iter().flatten() {
        if part.is_empty() {
            continue;
        }
        if !id.is_empty() {
            id.push_str(separator);
        }
        id.push_str(part);
    }
    id
}
