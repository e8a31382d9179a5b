//! Route patterns: ordered path segments, each either a literal or a
//! typed variable. The string form writes variables as `{str}`,
//! `{u64}` or `{i64}`, e.g. `/entry/{u64}/comments`.

use anyhow::{Result, bail};
use kstring::KString;

use crate::ppath::PPath;

/// The declared type of a variable segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Str,
    U64,
    I64,
}

impl VarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::U64 => "u64",
            Self::I64 => "i64",
        }
    }

    /// Parse one concrete path segment as this kind. None is the
    /// normal "this pattern does not match here" signal, never an
    /// error.
    fn capture(self, segment: &str) -> Option<Var> {
        match self {
            Self::Str =>
                if segment.is_empty() {
                    None
                } else {
                    Some(Var::Str(KString::from_ref(segment)))
                },
            Self::U64 => segment.parse().ok().map(Var::U64),
            Self::I64 => segment.parse().ok().map(Var::I64),
        }
    }
}

/// A path variable captured by decode, or supplied to encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Var {
    Str(KString),
    U64(u64),
    I64(i64),
}

impl Var {
    pub fn kind(&self) -> VarKind {
        match self {
            Self::Str(_) => VarKind::Str,
            Self::U64(_) => VarKind::U64,
            Self::I64(_) => VarKind::I64,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s.as_str()),
            _ => None
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U64(v) => Some(*v),
            _ => None
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I64(v) => Some(*v),
            _ => None
        }
    }

    fn render(&self) -> Result<KString> {
        match self {
            Self::Str(s) => {
                if s.is_empty() || s.contains('/') {
                    bail!("string variable not representable \
                           as one path segment: {s:?}")
                }
                Ok(s.clone())
            }
            Self::U64(v) => Ok(KString::from_string(v.to_string())),
            Self::I64(v) => Ok(KString::from_string(v.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
    Literal(KString),
    Var(VarKind),
}

#[derive(Debug, thiserror::Error)]
pub enum PatternParseError {
    #[error("route pattern must start with '/': {0:?}")]
    NotAbsolute(Box<String>),
    #[error("invalid variable segment {0:?}, expected \
             {{str}}, {{u64}} or {{i64}}")]
    InvalidVar(Box<String>),
    #[error("literal segment {0:?} contains '{{' or '}}'")]
    ReservedChars(Box<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    segments: Vec<PatternSegment>,
}

impl RoutePattern {
    pub fn from_str(s: &str) -> Result<Self, PatternParseError> {
        if s.chars().next() != Some('/') {
            return Err(PatternParseError::NotAbsolute(Box::new(s.into())));
        }
        let mut segments = Vec::new();
        for segment in crate::ppath::path_segments(s) {
            if segment.starts_with('{') {
                let kind = match segment {
                    "{str}" => VarKind::Str,
                    "{u64}" => VarKind::U64,
                    "{i64}" => VarKind::I64,
                    _ => return Err(PatternParseError::InvalidVar(
                        Box::new(segment.into())))
                };
                segments.push(PatternSegment::Var(kind));
            } else if segment.contains('{') || segment.contains('}') {
                return Err(PatternParseError::ReservedChars(
                    Box::new(segment.into())));
            } else {
                segments.push(PatternSegment::Literal(
                    KString::from_ref(segment)));
            }
        }
        Ok(RoutePattern { segments })
    }

    pub fn segments(&self) -> &[PatternSegment] {
        &self.segments
    }

    /// A pattern with no variable segments matches exactly one path.
    pub fn is_static(&self) -> bool {
        self.segments.iter().all(
            |s| matches!(s, PatternSegment::Literal(_)))
    }

    pub fn num_vars(&self) -> usize {
        self.segments.iter().filter(
            |s| matches!(s, PatternSegment::Var(_))).count()
    }

    /// Match concrete path segments left-to-right. A variable
    /// segment that fails to parse makes the whole pattern a
    /// non-match (the caller goes on to try the next pattern).
    pub fn matches<S: AsRef<str>>(&self, path: &[S]) -> Option<Vec<Var>> {
        if path.len() != self.segments.len() {
            return None;
        }
        let mut vars = Vec::new();
        for (pattern_segment, segment) in self.segments.iter().zip(path) {
            match pattern_segment {
                PatternSegment::Literal(l) =>
                    if l.as_str() != segment.as_ref() {
                        return None;
                    },
                PatternSegment::Var(kind) =>
                    vars.push(kind.capture(segment.as_ref())?),
            }
        }
        Some(vars)
    }

    /// Substitute `vars` into the variable segments, in order. Errors
    /// mean the caller supplied variables that do not fit the
    /// pattern's declaration, which is a bug on their side.
    pub fn render(&self, vars: &[Var]) -> Result<PPath<KString>> {
        if vars.len() != self.num_vars() {
            bail!("pattern {self:?} has {} variable(s), got {}",
                  self.num_vars(), vars.len())
        }
        let mut out = Vec::new();
        let mut vars = vars.iter();
        for pattern_segment in &self.segments {
            match pattern_segment {
                PatternSegment::Literal(l) => out.push(l.clone()),
                PatternSegment::Var(kind) => {
                    let var = vars.next().expect("count checked above");
                    if var.kind() != *kind {
                        bail!("pattern {self:?} declares {{{}}}, \
                               got {var:?}", kind.as_str())
                    }
                    out.push(var.render()?);
                }
            }
        }
        Ok(PPath::new(true, false, out))
    }

    /// True when no concrete path could tell the two patterns apart:
    /// same length and pairwise equal literals resp. equal variable
    /// kinds. Declaring both is an error; patterns that merely
    /// overlap (literal vs. variable, or different kinds) are fine
    /// and resolved by the matching order.
    pub fn indistinguishable_from(&self, other: &RoutePattern) -> bool {
        self.segments == other.segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pat(s: &str) -> RoutePattern {
        RoutePattern::from_str(s).unwrap()
    }

    #[test]
    fn t_parse() {
        assert_eq!(pat("/").segments().len(), 0);
        assert!(pat("/").is_static());
        let p = pat("/entry/{u64}/comments");
        assert_eq!(p.segments().len(), 3);
        assert_eq!(p.num_vars(), 1);
        assert!(! p.is_static());
        assert_eq!(RoutePattern::from_str("entry").err().unwrap().to_string(),
                   "route pattern must start with '/': \"entry\"");
        assert_eq!(RoutePattern::from_str("/a/{x}").err().unwrap().to_string(),
                   "invalid variable segment \"{x}\", expected \
                    {str}, {u64} or {i64}");
        assert!(RoutePattern::from_str("/a}b").is_err());
    }

    #[test]
    fn t_matches() {
        let p = pat("/entry/{u64}");
        assert_eq!(p.matches(&["entry", "42"]), Some(vec![Var::U64(42)]));
        assert_eq!(p.matches(&["entry", "x42"]), None); // parse failure
        assert_eq!(p.matches(&["entry", "-1"]), None);
        assert_eq!(p.matches(&["entry"]), None);
        assert_eq!(p.matches(&["entries", "42"]), None);
        let q = pat("/entry/{i64}");
        assert_eq!(q.matches(&["entry", "-1"]), Some(vec![Var::I64(-1)]));
        let r = pat("/page/{str}");
        assert_eq!(r.matches(&["page", "intro"]),
                   Some(vec![Var::Str(KString::from_ref("intro"))]));
    }

    #[test]
    fn t_render() {
        let p = pat("/entry/{u64}");
        assert_eq!(p.render(&[Var::U64(42)]).unwrap().to_string(),
                   "/entry/42");
        assert!(p.render(&[]).is_err());
        assert!(p.render(&[Var::Str(KString::from_ref("x"))]).is_err());
        assert!(pat("/page/{str}")
                .render(&[Var::Str(KString::from_ref("a/b"))]).is_err());
        assert_eq!(pat("/").render(&[]).unwrap().to_string(), "/");
    }

    #[test]
    fn t_indistinguishable() {
        assert!(pat("/a/{u64}").indistinguishable_from(&pat("/a/{u64}")));
        assert!(! pat("/a/{u64}").indistinguishable_from(&pat("/a/{i64}")));
        assert!(! pat("/a/{u64}").indistinguishable_from(&pat("/a/b")));
        assert!(! pat("/a").indistinguishable_from(&pat("/a/b")));
    }
}
