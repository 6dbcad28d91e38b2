//! Path template compilation and matching.
//!
//! A path template is a `/`-delimited list of segments. Each segment is either
//! a literal or a placeholder of the form `<type:name>` or `<name>`:
//!
//! ```text
//! /users/<int:user_id>/posts/<slug>
//!  ^^^^^ ^^^^^^^^^^^^^^ ^^^^^ ^^^^^^
//!  lit   int placeholder lit  str placeholder (type omitted)
//! ```
//!
//! | Type | Character class | Converted to |
//! |---|---|---|
//! | `int` | `\d+` | `i64` |
//! | `float` | `[+-]?(\d*\.)?\d+` | `f64` |
//! | `str` | URL-safe characters except `/` | `String` |
//!
//! Unknown or omitted types fall back to `str`. A segment that looks like a
//! placeholder but is malformed (`<a-b>`, `<int:>`) is kept as a literal.
//! Compilation is permissive: template syntax never causes an error.

use std::fmt;

use halyard_core::{PathValue, PathVariables};
use regex::Regex;

use crate::error::{RouteError, RouteResult};

const INT_CLASS: &str = r"\d+";
const FLOAT_CLASS: &str = r"[+-]?(?:\d*\.)?\d+";
const STR_CLASS: &str = r"[A-Za-z0-9\-._~:?#\[\]@!$&'()*+,;%=]+";

/// The declared type of a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    /// Digits only, converted to `i64`.
    Int,
    /// Signed decimal, converted to `f64`.
    Float,
    /// Any URL-safe segment text.
    Str,
}

impl VariableKind {
    /// Resolves a type name. Lookup is case-insensitive; unknown names are `Str`.
    #[must_use]
    pub fn from_type_name(name: Option<&str>) -> Self {
        match name.map(str::to_ascii_lowercase).as_deref() {
            Some("int") => Self::Int,
            Some("float") => Self::Float,
            _ => Self::Str,
        }
    }

    /// The regex character class for this kind.
    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Int => INT_CLASS,
            Self::Float => FLOAT_CLASS,
            Self::Str => STR_CLASS,
        }
    }

    /// Converts captured text. Returns `None` if it does not fit the type.
    fn convert(self, raw: &str) -> Option<PathValue> {
        match self {
            Self::Int => raw.parse::<i64>().ok().map(PathValue::Int),
            Self::Float => raw.parse::<f64>().ok().map(PathValue::Float),
            Self::Str => Some(PathValue::Str(raw.to_string())),
        }
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
        })
    }
}

/// One parsed template segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matched verbatim.
    Literal(String),
    /// Captured and converted.
    Variable {
        /// Variable name.
        name: String,
        /// Declared type.
        kind: VariableKind,
    },
}

impl Segment {
    /// Parses a single segment.
    ///
    /// Placeholders must match `^<(?:([A-Za-z0-9_]+):)?([A-Za-z0-9_]+)>$`;
    /// anything else is a literal.
    #[must_use]
    pub fn parse(segment: &str) -> Self {
        let placeholder = segment
            .strip_prefix('<')
            .and_then(|s| s.strip_suffix('>'))
            .and_then(|inner| match inner.split_once(':') {
                Some((ty, name)) if is_ident(ty) && is_ident(name) => Some((Some(ty), name)),
                None if is_ident(inner) => Some((None, inner)),
                _ => None,
            });

        match placeholder {
            Some((ty, name)) => Self::Variable {
                name: name.to_string(),
                kind: VariableKind::from_type_name(ty),
            },
            None => Self::Literal(segment.to_string()),
        }
    }
}

fn is_ident(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// A compiled path template.
///
/// # Example
///
/// ```
/// use halyard_router::PathPattern;
///
/// let pattern = PathPattern::compile("/users/<int:user_id>").unwrap();
///
/// let vars = pattern.match_path("/users/10").unwrap();
/// assert_eq!(vars.get_int("user_id"), Some(10));
///
/// assert!(pattern.match_path("/users/abc").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct PathPattern {
    template: String,
    segments: Vec<Segment>,
    regex: Regex,
    /// Capture group `i + 1` holds `schema[i]`.
    schema: Vec<(String, VariableKind)>,
}

impl PathPattern {
    /// Compiles a path template.
    ///
    /// Empty segments (leading, trailing or doubled slashes) are ignored, so
    /// `/users/`, `users` and `/users` compile to the same matcher.
    pub fn compile(template: &str) -> RouteResult<Self> {
        let segments: Vec<Segment> = template
            .split('/')
            .filter(|s| !s.is_empty())
            .map(Segment::parse)
            .collect();

        let mut source = String::from("^/");
        let mut schema = Vec::new();
        for segment in &segments {
            match segment {
                Segment::Literal(text) => source.push_str(&regex::escape(text)),
                Segment::Variable { name, kind } => {
                    source.push('(');
                    source.push_str(kind.class());
                    source.push(')');
                    schema.push((name.clone(), *kind));
                }
            }
            source.push('/');
        }
        source.push('$');

        let regex = Regex::new(&source).map_err(|source| RouteError::Pattern {
            template: template.to_string(),
            source,
        })?;

        Ok(Self {
            template: template.to_string(),
            segments,
            regex,
            schema,
        })
    }

    /// The template this pattern was compiled from.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The parsed segments, in template order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The variable schema: capture group `i + 1` maps to entry `i`.
    #[must_use]
    pub fn schema(&self) -> &[(String, VariableKind)] {
        &self.schema
    }

    /// The compiled regular expression.
    #[must_use]
    pub fn as_regex(&self) -> &Regex {
        &self.regex
    }

    /// Matches a concrete path, returning the typed variables.
    ///
    /// A trailing `/` is appended before matching if absent. Returns `None`
    /// when the path does not match, including when an `int` capture does
    /// not fit in an `i64`.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<PathVariables> {
        let normalized;
        let path = if path.ends_with('/') {
            path
        } else {
            normalized = format!("{path}/");
            normalized.as_str()
        };

        let captures = self.regex.captures(path)?;
        let mut vars = PathVariables::with_capacity(self.schema.len());
        for (i, (name, kind)) in self.schema.iter().enumerate() {
            let raw = captures.get(i + 1)?.as_str();
            vars.push(name.clone(), kind.convert(raw)?);
        }
        Some(vars)
    }

    /// Returns `true` if `path` matches.
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.match_path(path).is_some()
    }
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.regex.as_str() == other.regex.as_str() && self.schema == other.schema
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(template: &str) -> PathPattern {
        PathPattern::compile(template).unwrap()
    }

    #[test]
    fn test_root_matches_only_root() {
        let pattern = compile("/");
        assert!(pattern.is_match("/"));
        assert!(!pattern.is_match("/test"));
        assert!(!pattern.is_match("/test/"));
    }

    #[test]
    fn test_int_variable() {
        let pattern = compile("/users/<int:user_id>");
        let vars = pattern.match_path("/users/10").unwrap();
        assert_eq!(vars.get("user_id"), Some(&PathValue::Int(10)));
        assert!(pattern.match_path("/users/abc").is_none());
    }

    #[test]
    fn test_untyped_variable_is_str() {
        let pattern = compile("/users/<user_id>");
        let vars = pattern.match_path("/users/abc").unwrap();
        assert_eq!(vars.get_str("user_id"), Some("abc"));
    }

    #[test]
    fn test_mixed_variables() {
        let pattern = compile("/users/<str:user_id>/<int:page>");
        let vars = pattern.match_path("/users/abc/1").unwrap();
        assert_eq!(vars.get_str("user_id"), Some("abc"));
        assert_eq!(vars.get_int("page"), Some(1));
        assert_eq!(pattern.schema().len(), 2);
    }

    #[test]
    fn test_float_variable() {
        let pattern = compile("/price/<float:amount>/<int:qty>");
        let vars = pattern.match_path("/price/-12.5/3").unwrap();
        assert_eq!(vars.get_float("amount"), Some(-12.5));
        assert_eq!(vars.get_int("qty"), Some(3));

        let vars = pattern.match_path("/price/.5/1").unwrap();
        assert_eq!(vars.get_float("amount"), Some(0.5));

        let vars = pattern.match_path("/price/7/1").unwrap();
        assert_eq!(vars.get("amount"), Some(&PathValue::Float(7.0)));

        assert!(pattern.match_path("/price/1e5/1").is_none());
    }

    #[test]
    fn test_trailing_slash_is_optional_on_paths() {
        let pattern = compile("/items/<int:id>");
        assert!(pattern.is_match("/items/4"));
        assert!(pattern.is_match("/items/4/"));
        assert!(!pattern.is_match("/items/4//"));
    }

    #[test]
    fn test_template_slashes_are_normalized() {
        assert_eq!(compile("/users/"), compile("/users"));
        assert_eq!(compile("users"), compile("/users"));
        assert_eq!(compile("/a//b"), compile("/a/b"));
    }

    #[test]
    fn test_compiling_twice_is_equivalent() {
        let template = "/orgs/<org>/users/<int:id>";
        assert_eq!(compile(template), compile(template));
        assert_ne!(compile(template), compile("/orgs/<org>/users/<id>"));
    }

    #[test]
    fn test_unknown_type_defaults_to_str() {
        let pattern = compile("/files/<uuid:file_id>");
        assert_eq!(pattern.schema()[0].1, VariableKind::Str);
        let vars = pattern.match_path("/files/abc-123").unwrap();
        assert_eq!(vars.get_str("file_id"), Some("abc-123"));
    }

    #[test]
    fn test_type_lookup_is_case_insensitive() {
        let pattern = compile("/n/<INT:value>");
        assert_eq!(pattern.schema()[0].1, VariableKind::Int);
        assert_eq!(pattern.match_path("/n/5").unwrap().get_int("value"), Some(5));
    }

    #[test]
    fn test_malformed_placeholders_are_literals() {
        for segment in ["<a-b>", "<int:>", "<:x>", "<>", "<a:b:c>", "<open"] {
            assert_eq!(Segment::parse(segment), Segment::Literal(segment.to_string()));
        }

        let pattern = compile("/x/<a-b>");
        assert!(pattern.schema().is_empty());
        assert!(pattern.is_match("/x/<a-b>"));
        assert!(!pattern.is_match("/x/anything"));
    }

    #[test]
    fn test_literals_are_escaped() {
        let pattern = compile("/v1.0/files+dirs");
        assert!(pattern.is_match("/v1.0/files+dirs"));
        assert!(!pattern.is_match("/v1x0/files+dirs"));
        assert!(!pattern.is_match("/v1.0/filesssdirs"));
    }

    #[test]
    fn test_str_does_not_cross_segments() {
        let pattern = compile("/files/<name>");
        assert!(!pattern.is_match("/files/a/b"));
    }

    #[test]
    fn test_int_overflow_is_no_match() {
        let pattern = compile("/n/<int:value>");
        assert!(pattern.match_path("/n/99999999999999999999999").is_none());
        assert_eq!(
            pattern.match_path("/n/9223372036854775807").unwrap().get_int("value"),
            Some(i64::MAX)
        );
    }

    #[test]
    fn test_capture_groups_numbered_in_order() {
        let pattern = compile("/<float:a>/<float:b>/<int:c>");
        let vars = pattern.match_path("/1.5/-2.25/3").unwrap();
        let values: Vec<_> = vars.iter().map(|(n, v)| (n.to_string(), v.clone())).collect();
        assert_eq!(
            values,
            vec![
                ("a".to_string(), PathValue::Float(1.5)),
                ("b".to_string(), PathValue::Float(-2.25)),
                ("c".to_string(), PathValue::Int(3)),
            ]
        );
    }

    #[test]
    fn test_display_is_template() {
        assert_eq!(compile("/users/<int:id>").to_string(), "/users/<int:id>");
    }
}
