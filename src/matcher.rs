//! Path template matching.
//!
//! # Template syntax
//! - literal segments match exactly (case-sensitive)
//! - `:name` matches one non-empty segment and captures it as `name`
//! - a final `*name` (or bare `*`) captures the rest of the path, slashes included
//!
//! Templates are compared segment by segment; no regex.

/// One compiled path segment
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    CatchAll(String),
}

/// A compiled route path template.
#[derive(Debug, Clone)]
pub struct PathPattern {
    template: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(template: &str) -> Self {
        let count = template.split('/').count();
        let segments = template
            .split('/')
            .enumerate()
            .map(|(i, raw)| {
                if let Some(name) = raw.strip_prefix(':').filter(|n| !n.is_empty()) {
                    Segment::Param(name.to_string())
                } else if raw.starts_with('*') && i + 1 == count {
                    let name = &raw[1..];
                    Segment::CatchAll(if name.is_empty() { "*" } else { name }.to_string())
                } else {
                    Segment::Literal(raw.to_string())
                }
            })
            .collect();
        Self {
            template: template.to_string(),
            segments,
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Number of literal segments; used to prefer specific templates.
    pub fn specificity(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    /// Match `path`, returning captured parameters in template order.
    pub fn matches(&self, path: &str) -> Option<Vec<(String, String)>> {
        let parts: Vec<&str> = path.split('/').collect();
        let mut params = Vec::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::CatchAll(name) => {
                    let rest = parts.get(i..).map(|p| p.join("/")).unwrap_or_default();
                    params.push((name.clone(), rest));
                    return Some(params);
                }
                Segment::Literal(literal) => {
                    if parts.get(i) != Some(&literal.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => match parts.get(i) {
                    Some(value) if !value.is_empty() => {
                        params.push((name.clone(), value.to_string()));
                    }
                    _ => return None,
                },
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }

    /// Fill the template's parameters from `params`.
    ///
    /// Returns the name of the first parameter without a value on failure.
    pub fn build(&self, params: &[(&str, &str)]) -> Result<String, String> {
        let lookup = |name: &str| {
            params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
                .ok_or_else(|| name.to_string())
        };

        let parts = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(literal) => Ok(literal.clone()),
                Segment::Param(name) | Segment::CatchAll(name) => lookup(name),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parts.join("/"))
    }
}
