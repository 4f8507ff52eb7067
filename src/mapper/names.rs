//! Name construction
//!
//! Type names follow the companion code generators for the same schema so
//! that independently generated bindings agree:
//! - `<PackageCamel>_<Seg>_..._<Seg>` with each segment CamelCased
//! - map entries lose their `Entry` suffix and gain `_Map`
//! - input shapes gain `_Input`
//!
//! Field and method display names use lower camel case built from a
//! word list; fields are tokenized on underscores, methods on capitals.

use crate::config::FieldNameMode;
use crate::descriptor::Scope;

pub const INPUT_SUFFIX: &str = "Input";
pub const MAP_SUFFIX: &str = "Map";
const MAP_ENTRY_SUFFIX: &str = "Entry";

/// Which shape of a declaration a name is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NameKind {
    pub map_entry: bool,
    pub input: bool,
}

impl NameKind {
    pub const OUTPUT: Self = Self {
        map_entry: false,
        input: false,
    };
    pub const INPUT: Self = Self {
        map_entry: false,
        input: true,
    };
}

/// Builds qualified type names for one compilation
#[derive(Debug, Clone, Default)]
pub struct NameResolver {
    trim_prefix: Option<String>,
}

impl NameResolver {
    pub fn new(trim_prefix: Option<String>) -> Self {
        Self {
            trim_prefix: trim_prefix.filter(|p| !p.is_empty()),
        }
    }

    /// Name for the declaration at `path` inside `scope`
    pub fn type_name<S: AsRef<str>>(&self, scope: &Scope, path: &[S], kind: NameKind) -> String {
        let mut segments: Vec<String> = Vec::with_capacity(path.len() + 2);

        let prefix = match &scope.namespace {
            Some(namespace) => namespace.clone(),
            None => camel_case_slice(scope.package.split('.')),
        };
        if !prefix.is_empty() {
            segments.push(prefix);
        }

        for (i, segment) in path.iter().enumerate() {
            let segment = segment.as_ref();
            if kind.map_entry && i + 1 == path.len() {
                let entry = segment.strip_suffix(MAP_ENTRY_SUFFIX).unwrap_or(segment);
                segments.push(camel_case(entry));
                segments.push(MAP_SUFFIX.to_string());
            } else {
                segments.push(camel_case(segment));
            }
        }

        if kind.input {
            segments.push(INPUT_SUFFIX.to_string());
        }

        let name = segments.join("_");
        match &self.trim_prefix {
            Some(prefix) => name.strip_prefix(prefix.as_str()).unwrap_or(&name).to_string(),
            None => name,
        }
    }
}

/// Display name of a field declared in lower_underscore style
pub fn field_name(name: &str, mode: FieldNameMode) -> String {
    match mode {
        FieldNameMode::LowerCamelCase => to_lower_camel(&parse_lower_underscore(name)),
        FieldNameMode::Preserve => name.to_string(),
    }
}

/// Display name of a method declared in UpperCamel style
pub fn method_name(name: &str, mode: FieldNameMode) -> String {
    match mode {
        FieldNameMode::LowerCamelCase => to_lower_camel(&parse_upper_camel(name)),
        FieldNameMode::Preserve => name.to_string(),
    }
}

/// CamelCase as the Go generator builds it: `_my_field_name_2` -> `XMyFieldName_2`.
/// An underscore before a lowercase letter is dropped and the letter capitalized;
/// digits pass through.
pub fn camel_case(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len() + 1);
    let mut i = 0;

    if bytes.first() == Some(&b'_') {
        out.push(b'X');
        i += 1;
    }

    while i < bytes.len() {
        let c = bytes[i];
        if c == b'_' && i + 1 < bytes.len() && bytes[i + 1].is_ascii_lowercase() {
            i += 1;
            continue;
        }
        if c.is_ascii_digit() {
            out.push(c);
            i += 1;
            continue;
        }

        out.push(c.to_ascii_uppercase());
        while i + 1 < bytes.len() && bytes[i + 1].is_ascii_lowercase() {
            i += 1;
            out.push(bytes[i]);
        }
        i += 1;
    }

    // Only ASCII bytes were rewritten, so non-ASCII sequences are intact
    String::from_utf8_lossy(&out).into_owned()
}

/// [`camel_case`] over parts joined with `_`
pub fn camel_case_slice<'s>(parts: impl IntoIterator<Item = &'s str>) -> String {
    camel_case(&parts.into_iter().collect::<Vec<_>>().join("_"))
}

/// `foo_bar_baz` -> `["foo", "bar", "baz"]`
pub fn parse_lower_underscore(input: &str) -> Vec<String> {
    input
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// `FooBarBaz` -> `["foo", "bar", "baz"]`
pub fn parse_upper_camel(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut running = String::new();

    for c in input.chars() {
        if c.is_ascii_uppercase() && !running.is_empty() {
            words.push(std::mem::take(&mut running));
        }
        running.extend(c.to_lowercase());
    }
    if !running.is_empty() {
        words.push(running);
    }

    words
}

/// First word lowered only if it starts uppercase; later words raised only if
/// they start lowercase. Digits and acronyms pass through.
pub fn to_lower_camel<S: AsRef<str>>(words: &[S]) -> String {
    let mut result = String::new();
    for (i, word) in words.iter().enumerate() {
        let word = word.as_ref();
        let first = word.chars().next();
        if i == 0 && first.is_some_and(|c| c.is_ascii_uppercase()) {
            result.push_str(&lower_case_first(word));
        } else if i != 0 && first.is_some_and(|c| c.is_ascii_lowercase()) {
            result.push_str(&upper_case_first(word));
        } else {
            result.push_str(word);
        }
    }
    result
}

pub fn lower_case_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

pub fn upper_case_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}
