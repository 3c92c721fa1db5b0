//! Path templates.
//!
//! A template such as `/api/v1/comment/{id}` is split on `/` into literal and
//! capture segments. Matching is purely structural: the concrete path must have
//! the same number of segments, every literal must match byte for byte and
//! every capture binds the concrete segment verbatim.

use std::collections::HashSet;
use std::fmt;

use crate::routing::error::PatternError;

/// One segment of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Capture(String),
}

/// A compiled route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    template: String,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Compile a template.
    ///
    /// The empty template is accepted and has no segments; it is only useful
    /// as a child template that adds nothing to its parent's path.
    pub fn compile(template: &str) -> Result<Self, PatternError> {
        if template.is_empty() {
            return Ok(Self {
                template: String::new(),
                segments: Vec::new(),
            });
        }

        let rest = template
            .strip_prefix('/')
            .ok_or_else(|| PatternError::NotAbsolute {
                template: template.to_string(),
            })?;

        let mut seen = HashSet::new();
        let mut segments = Vec::new();

        for raw in rest.split('/') {
            let segment = parse_segment(template, raw)?;
            if let Segment::Capture(name) = &segment {
                if !seen.insert(name.clone()) {
                    return Err(PatternError::DuplicateCapture {
                        template: template.to_string(),
                        name: name.clone(),
                    });
                }
            }
            segments.push(segment);
        }

        Ok(Self {
            template: template.to_string(),
            segments,
        })
    }

    /// Append `child` after this pattern.
    ///
    /// A trailing slash on the parent is folded into the child's leading one,
    /// so `/` joined with `/comment` is `/comment`, not `//comment`.
    pub fn join(&self, child: &Pattern) -> Result<Self, PatternError> {
        let joined = format!("{}{}", self.template.trim_end_matches('/'), child.template);
        if joined.is_empty() {
            return Self::compile("/");
        }
        Self::compile(&joined)
    }

    /// The template this pattern was compiled from.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Capture names, in template order.
    pub fn captures(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Capture(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match a concrete path, returning the captured parameters.
    ///
    /// A structural mismatch is `None`; it is not an error. An empty concrete
    /// segment still counts as a segment, so `/comment/` matches
    /// `/comment/{id}` with `id` bound to `""`.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let rest = path.strip_prefix('/')?;
        if self.segments.is_empty() {
            return None;
        }

        let mut params = Params::default();
        let mut concrete = rest.split('/');

        for segment in &self.segments {
            let value = concrete.next()?;
            match segment {
                Segment::Literal(literal) if literal == value => {}
                Segment::Literal(_) => return None,
                Segment::Capture(name) => params.push(name.clone(), value.to_string()),
            }
        }

        if concrete.next().is_some() {
            return None;
        }

        Some(params)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

fn parse_segment(template: &str, raw: &str) -> Result<Segment, PatternError> {
    let has_brace = raw.contains(['{', '}']);
    if !has_brace {
        return Ok(Segment::Literal(raw.to_string()));
    }

    let name = raw
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .filter(|inner| !inner.contains(['{', '}']))
        .ok_or_else(|| PatternError::MalformedSegment {
            template: template.to_string(),
            segment: raw.to_string(),
        })?;

    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(PatternError::InvalidCaptureName {
            template: template.to_string(),
            name: name.to_string(),
        });
    }

    Ok(Segment::Capture(name.to_string()))
}

/// Parameters captured from a concrete path.
///
/// Values are always the raw path segment; nothing is decoded or converted,
/// and a value may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    fn push(&mut self, name: String, value: String) {
        self.entries.push((name, value));
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Look up a parameter, falling back to `default` when absent.
    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_segments() {
        let pattern = Pattern::compile("/api/v1/comment/{id}").unwrap();
        assert_eq!(
            pattern.segments(),
            &[
                Segment::Literal("api".into()),
                Segment::Literal("v1".into()),
                Segment::Literal("comment".into()),
                Segment::Capture("id".into()),
            ]
        );
        assert_eq!(pattern.captures().collect::<Vec<_>>(), vec!["id"]);
    }

    #[test]
    fn test_compile_rejects_malformed() {
        assert!(matches!(
            Pattern::compile("/comment/{id"),
            Err(PatternError::MalformedSegment { .. })
        ));
        assert!(matches!(
            Pattern::compile("/comment/id}"),
            Err(PatternError::MalformedSegment { .. })
        ));
        assert!(matches!(
            Pattern::compile("/comment/x{id}"),
            Err(PatternError::MalformedSegment { .. })
        ));
        assert!(matches!(
            Pattern::compile("/comment/{}"),
            Err(PatternError::InvalidCaptureName { .. })
        ));
        assert!(matches!(
            Pattern::compile("/comment/{a-b}"),
            Err(PatternError::InvalidCaptureName { .. })
        ));
        assert!(matches!(
            Pattern::compile("comment"),
            Err(PatternError::NotAbsolute { .. })
        ));
    }

    #[test]
    fn test_compile_rejects_duplicate_capture() {
        let err = Pattern::compile("/{id}/sub/{id}").unwrap_err();
        assert_eq!(
            err,
            PatternError::DuplicateCapture {
                template: "/{id}/sub/{id}".into(),
                name: "id".into(),
            }
        );
    }

    #[test]
    fn test_match_extracts_params() {
        let pattern = Pattern::compile("/user/{user}/post/{post}").unwrap();
        let params = pattern.matches("/user/ann/post/42").unwrap();
        assert_eq!(params.get("user"), Some("ann"));
        assert_eq!(params.get("post"), Some("42"));
        assert_eq!(params.get_or("missing", "-"), "-");
    }

    #[test]
    fn test_match_is_structural() {
        let pattern = Pattern::compile("/api/comment/{id}").unwrap();
        assert!(pattern.matches("/api/comment").is_none());
        assert!(pattern.matches("/api/comment/7/extra").is_none());
        assert!(pattern.matches("/API/comment/7").is_none());
        assert!(pattern.matches("/api/comment/7/").is_none());
        assert!(pattern.matches("api/comment/7").is_none());
    }

    #[test]
    fn test_capture_is_verbatim() {
        let pattern = Pattern::compile("/file/{name}").unwrap();
        let params = pattern.matches("/file/a%20b.txt").unwrap();
        assert_eq!(params.get("name"), Some("a%20b.txt"));
    }

    #[test]
    fn test_empty_segment_binds_capture() {
        let pattern = Pattern::compile("/comment/{id}").unwrap();
        let params = pattern.matches("/comment/").unwrap();
        assert_eq!(params.get("id"), Some(""));
        assert_eq!(params.len(), 1);

        let literal = Pattern::compile("/comment").unwrap();
        assert!(literal.matches("/comment/").is_none());
    }

    #[test]
    fn test_root_pattern() {
        let pattern = Pattern::compile("/").unwrap();
        assert!(pattern.matches("/").is_some());
        assert!(pattern.matches("/x").is_none());
    }

    #[test]
    fn test_join() {
        let parent = Pattern::compile("/api/v1").unwrap();
        let child = Pattern::compile("/comment/{id}").unwrap();
        assert_eq!(parent.join(&child).unwrap().template(), "/api/v1/comment/{id}");

        let root = Pattern::compile("/").unwrap();
        assert_eq!(root.join(&child).unwrap().template(), "/comment/{id}");

        let empty = Pattern::compile("").unwrap();
        assert_eq!(parent.join(&empty).unwrap().template(), "/api/v1");
        assert_eq!(empty.join(&empty).unwrap().template(), "/");
    }

    #[test]
    fn test_join_detects_duplicate_capture() {
        let parent = Pattern::compile("/org/{id}").unwrap();
        let child = Pattern::compile("/member/{id}").unwrap();
        assert!(matches!(
            parent.join(&child),
            Err(PatternError::DuplicateCapture { .. })
        ));
    }
}
