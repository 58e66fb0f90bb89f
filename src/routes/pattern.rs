// Path patterns for the route table
// URIs like "api/products/{id}" split into literal and parameter segments

use std::fmt;

use thiserror::Error;

/// Errors raised while parsing a route URI
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("empty parameter name")]
    EmptyParameter,

    #[error("invalid parameter name '{0}'")]
    InvalidParameter(String),

    #[error("parameter '{0}' appears more than once")]
    DuplicateParameter(String),

    #[error("unbalanced braces in segment '{0}'")]
    UnbalancedBraces(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A parsed route URI. Empty segments are dropped, so leading, trailing and
/// doubled slashes never change what a pattern matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(uri: &str) -> Result<Self, PatternError> {
        let mut segments = Vec::new();
        let mut seen = Vec::<String>::new();

        for raw in uri.split('/').filter(|s| !s.is_empty()) {
            if let Some(inner) = raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                if inner.is_empty() {
                    return Err(PatternError::EmptyParameter);
                }
                if !inner.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return Err(PatternError::InvalidParameter(inner.to_string()));
                }
                if seen.iter().any(|name| name == inner) {
                    return Err(PatternError::DuplicateParameter(inner.to_string()));
                }
                seen.push(inner.to_string());
                segments.push(Segment::Param(inner.to_string()));
            } else if raw.contains('{') || raw.contains('}') {
                return Err(PatternError::UnbalancedBraces(raw.to_string()));
            } else {
                segments.push(Segment::Literal(raw.to_string()));
            }
        }

        Ok(Self { segments })
    }

    /// Absolute path in the `{param}` syntax axum 0.8 understands
    pub fn path(&self) -> String {
        if self.segments.is_empty() {
            return "/".to_string();
        }

        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(lit) => format!("/{}", lit),
                Segment::Param(name) => format!("/{{{}}}", name),
            })
            .collect()
    }

    /// Pattern with parameter names erased. Two patterns with the same shape
    /// match exactly the same paths.
    pub fn shape(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(lit) => lit.as_str(),
                Segment::Param(_) => "{}",
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Match a request path, returning the captured parameters in order
    pub fn matches(&self, path: &str) -> Option<Vec<(String, String)>> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = Vec::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(lit) if lit == part => {},
                Segment::Literal(_) => return None,
                Segment::Param(name) => params.push((name.clone(), part.to_string())),
            }
        }

        Some(params)
    }

    /// Build a concrete path, substituting every parameter. Returns None if a
    /// parameter is missing or would produce an empty segment.
    pub fn render(&self, params: &[(&str, &str)]) -> Option<String> {
        if self.segments.is_empty() {
            return Some("/".to_string());
        }

        let mut out = String::new();
        for segment in &self.segments {
            out.push('/');
            match segment {
                Segment::Literal(lit) => out.push_str(lit),
                Segment::Param(name) => {
                    let value = params
                        .iter()
                        .find(|(key, _)| key == name)
                        .map(|(_, value)| *value)
                        .filter(|value| !value.is_empty() && !value.contains('/'))?;
                    out.push_str(value);
                },
            }
        }

        Some(out)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
