//! Documentation attachment
//!
//! Source locations address declarations by integer paths. The first pair
//! selects a top-level declaration (message=4, enum=5, service=6) and the rest
//! recurses structurally: field=2, nested message=3, nested enum=4, oneof=8
//! inside a message; method=2 inside a service; value=2 inside an enum.
//!
//! The builder walks the declaration tree and asks this index for the
//! documentation at the path of each entity it creates, so only locations
//! that address a real entity are ever attached.

use std::collections::HashMap;

use super::raw::{Location, SourceCodeInfo};

pub(crate) const FILE_MESSAGE: i32 = 4;
pub(crate) const FILE_ENUM: i32 = 5;
pub(crate) const FILE_SERVICE: i32 = 6;
pub(crate) const MESSAGE_FIELD: i32 = 2;
pub(crate) const MESSAGE_NESTED: i32 = 3;
pub(crate) const MESSAGE_ENUM: i32 = 4;
pub(crate) const MESSAGE_ONEOF: i32 = 8;
pub(crate) const SERVICE_METHOD: i32 = 2;
pub(crate) const ENUM_VALUE: i32 = 2;

/// Combined documentation keyed by location path
#[derive(Debug, Default)]
pub struct CommentIndex {
    by_path: HashMap<Vec<i32>, String>,
}

impl CommentIndex {
    pub fn new(info: Option<&SourceCodeInfo>) -> Self {
        let mut by_path = HashMap::new();

        for location in info.map(|i| i.location.as_slice()).unwrap_or_default() {
            // A definition needs at least the declaration kind and its index
            if location.path.len() < 2 {
                continue;
            }

            let comments = combine_comments(location);
            if !comments.is_empty() {
                by_path.insert(location.path.clone(), comments);
            }
        }

        Self { by_path }
    }

    /// Documentation for the entity at `path`, empty when there is none
    pub fn get(&self, path: &[i32]) -> String {
        self.by_path.get(path).cloned().unwrap_or_default()
    }
}

/// Leading and trailing comments joined by one blank line.
/// Detached comments are never attributed.
pub fn combine_comments(location: &Location) -> String {
    let leading = format_comments(location.leading_comments.as_deref().unwrap_or_default());
    let trailing = format_comments(location.trailing_comments.as_deref().unwrap_or_default());

    match (leading.trim(), trailing.trim()) {
        ("", "") => String::new(),
        (leading, "") => leading.to_string(),
        ("", trailing) => trailing.to_string(),
        (leading, trailing) => format!("{leading}\n\n{trailing}"),
    }
}

/// Strip the single space the compiler keeps after `//` on each line
pub fn format_comments(comment: &str) -> String {
    comment
        .split('\n')
        .map(|line| line.strip_prefix(' ').unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n")
}
