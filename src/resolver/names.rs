//! Framework class name -> component table key.
//!
//! The exact map extracted from the framework is consulted first. Unmapped
//! names go through a best-effort guess of the UI library's naming
//! convention; the result may not exist in the component table, in which
//! case callers fall back to the generic lists.

use std::collections::HashMap;

/// Prefix the UI library puts in front of every component name
const LIBRARY_PREFIX: &str = "Q";

/// Ordered (match, replacement) rewrites, each applied to the first occurrence
const ABBREVIATIONS: &[(&str, &str)] = &[("Button", "Btn"), ("Image", "Img")];

/// Map a framework class name to a component table key
pub fn map_class_name(class_map: &HashMap<String, String>, name: &str) -> String {
    match class_map.get(name) {
        Some(mapped) => mapped.clone(),
        None => guess_class_name(name),
    }
}

/// Convention-based guess for names absent from the map
pub fn guess_class_name(name: &str) -> String {
    let mut guess = format!("{}{}", LIBRARY_PREFIX, name);
    for (from, to) in ABBREVIATIONS {
        guess = guess.replacen(from, to, 1);
    }
    guess.to_lowercase()
}
