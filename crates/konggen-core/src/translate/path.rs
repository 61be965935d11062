//! Path template handling.
//!
//! A path such as `/users/{id}/orders/{orderId}` is tokenized into literal
//! text and `{...}` placeholders. From the tokens we produce the Kong
//! `uri_captures` reference form used by request transformations, and the
//! regex route pattern whose named groups populate those captures.

use crate::utils::sanitize_name;
use crate::Error;

/// A piece of a tokenized path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment<'a> {
    /// Verbatim text between placeholders
    Literal(&'a str),
    /// A placeholder; `token` keeps the braces, `name` does not
    Param { token: &'a str, name: &'a str },
}

/// A path split into literal and placeholder segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate<'a> {
    raw: &'a str,
    segments: Vec<PathSegment<'a>>,
}

impl<'a> PathTemplate<'a> {
    /// Tokenize `path`, requiring every `{` to be closed by a `}` before the
    /// next `{` or `/`.
    ///
    /// A path without `{` is a single literal, whatever else it contains.
    /// Placeholder names must stay distinct once reduced to capture names.
    pub fn parse(path: &'a str) -> crate::Result<Self> {
        if !path.contains('{') {
            let segments = if path.is_empty() {
                Vec::new()
            } else {
                vec![PathSegment::Literal(path)]
            };
            return Ok(Self { raw: path, segments });
        }

        let mut segments = Vec::new();
        let mut literal_start = 0;
        let mut open: Option<usize> = None;

        for (i, c) in path.char_indices() {
            match (c, open) {
                ('{', Some(_)) => return Err(malformed(path, i, "nested '{' inside placeholder")),
                ('{', None) => {
                    if literal_start < i {
                        segments.push(PathSegment::Literal(&path[literal_start..i]));
                    }
                    open = Some(i);
                }
                ('}', None) => return Err(malformed(path, i, "'}' without matching '{'")),
                ('}', Some(start)) => {
                    if i == start + 1 {
                        return Err(malformed(path, start, "empty placeholder"));
                    }
                    let name = &path[start + 1..i];
                    let duplicate = segments.iter().any(
                        |s| matches!(s, PathSegment::Param { name: seen, .. } if *seen == name),
                    );
                    if duplicate {
                        return Err(malformed(path, start, "duplicate placeholder"));
                    }
                    let capture = capture_name(name);
                    let collides = segments.iter().any(|s| {
                        matches!(s, PathSegment::Param { name: seen, .. } if capture_name(seen) == capture)
                    });
                    if collides {
                        return Err(malformed(path, start, "duplicate capture name"));
                    }
                    segments.push(PathSegment::Param {
                        token: &path[start..=i],
                        name,
                    });
                    literal_start = i + 1;
                    open = None;
                }
                ('/', Some(_)) => return Err(malformed(path, i, "'/' inside placeholder")),
                _ => {}
            }
        }

        if let Some(start) = open {
            return Err(malformed(path, start, "unclosed placeholder"));
        }
        if literal_start < path.len() {
            segments.push(PathSegment::Literal(&path[literal_start..]));
        }

        Ok(Self {
            raw: path,
            segments,
        })
    }

    pub fn raw(&self) -> &'a str {
        self.raw
    }

    pub fn segments(&self) -> &[PathSegment<'a>] {
        &self.segments
    }

    /// Placeholder names, left to right
    pub fn parameter_names(&self) -> Vec<&'a str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                PathSegment::Param { name, .. } => Some(*name),
                PathSegment::Literal(_) => None,
            })
            .collect()
    }

    pub fn has_parameters(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, PathSegment::Param { .. }))
    }

    /// Every placeholder replaced by `$(uri_captures.{name})`
    pub fn capture_path(&self) -> String {
        self.segments
            .iter()
            .map(|s| match s {
                PathSegment::Literal(text) => text.to_string(),
                PathSegment::Param { token, .. } => capture_reference(token),
            })
            .collect()
    }

    /// Every placeholder replaced by a reference to its regex capture group.
    ///
    /// Differs from [`capture_path`](Self::capture_path) only for names that
    /// are not plain word characters, such as `{file-name}`.
    pub fn replace_uri(&self) -> String {
        self.segments
            .iter()
            .map(|s| match s {
                PathSegment::Literal(text) => text.to_string(),
                PathSegment::Param { name, .. } => {
                    capture_reference(&format!("{{{}}}", capture_name(name)))
                }
            })
            .collect()
    }

    /// Kong route path. Plain prefix paths stay as they are; paths with
    /// placeholders become an anchored `~` regex with one named group each.
    pub fn route_pattern(&self) -> String {
        if !self.has_parameters() {
            return self.raw.to_string();
        }
        let body: String = self
            .segments
            .iter()
            .map(|s| match s {
                PathSegment::Literal(text) => regex::escape(text),
                PathSegment::Param { name, .. } => {
                    format!("(?<{}>[^/]+)", capture_name(name))
                }
            })
            .collect();
        format!("~{}$", body)
    }
}

fn malformed(path: &str, offset: usize, reason: &'static str) -> Error {
    Error::MalformedPath {
        path: path.to_string(),
        offset,
        reason,
    }
}

/// Regex group name for a placeholder
pub fn capture_name(name: &str) -> String {
    sanitize_name(name)
}

/// Characters that cannot appear in a path quoted into a bash script
fn is_shell_unsafe(c: char) -> bool {
    matches!(c, '\'' | '"' | '`' | '$' | '\\') || c.is_control()
}

/// Reject paths whose text would break out of the quoted strings of a
/// generated script.
pub fn check_shell_safe(path: &str) -> crate::Result<()> {
    match path.char_indices().find(|(_, c)| is_shell_unsafe(*c)) {
        Some((offset, _)) => Err(malformed(path, offset, "character not allowed in a route path")),
        None => Ok(()),
    }
}

/// Kong capture lookup wrapping a brace-delimited placeholder token
pub fn capture_reference(token: &str) -> String {
    format!("$(uri_captures.{})", token)
}

/// Rewrite every `{param}` placeholder into its capture reference.
///
/// A path without `{` is returned unchanged. Unbalanced, nested, empty or
/// duplicated placeholders are reported as [`Error::MalformedPath`].
pub fn rewrite(path: &str) -> crate::Result<String> {
    Ok(PathTemplate::parse(path)?.capture_path())
}

/// Prefix every `{` with `$`, turning placeholders into shell expansions.
pub fn dollar_escape(path: &str) -> String {
    path.replace('{', "${")
}
