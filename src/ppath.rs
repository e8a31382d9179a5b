//! Paths independent of the local file system (pure
//! functions). E.g. for use in web applications.

//! Does not concern itself with resolving ".." or ".",
//! i.e. does not offer canonicalization.

use std::fmt::Debug;

use crate::myfrom::MyFrom;

/// Drops empty segments, regardless whether at the beginning, end or
/// in the middle. Can't be used as sole information for path
/// operations, hence `PPath` keeps the absolute and trailing-slash
/// flags separately.
pub fn path_segments<'s>(s: &'s str) -> impl Iterator<Item = &'s str> {
    s.split('/').filter(|s| !s.is_empty())
}

#[derive(Clone, Debug, PartialEq)]
pub struct PPath<Segment: Clone + Debug> {
    is_absolute: bool,
    ends_with_slash: bool,
    segments: Vec<Segment>, // without empty ones
}

impl<'s, T> PPath<T>
where T: MyFrom<&'s str> + Clone + Debug + 's
{
    pub fn from_str(s: &'s str) -> Self {
        let is_absolute = s.chars().next() == Some('/');
        let ends_with_slash = s.chars().last() == Some('/');
        PPath {
            is_absolute,
            ends_with_slash,
            segments: path_segments(s).map(T::myfrom).collect()
        }
    }
}

impl<T> PPath<T>
where T: AsRef<str> + Clone + Debug
{
    pub fn to_string(&self) -> String {
        let mut s = String::new();
        if self.is_absolute {
            s.push('/');
        }
        if self.segments.is_empty() {
            if ! self.is_absolute {
                s.push('.');
                if self.ends_with_slash {
                    s.push('/');
                }
            }
        } else {
            let mut seen = false;
            for p in &self.segments {
                if seen {
                    s.push('/');
                }
                s.push_str(p.as_ref());
                seen = true;
            }
            if self.ends_with_slash {
                s.push('/');
            }
        }
        s
    }

    /// True if there are either `.` or `..` segments.
    pub fn contains_dot_or_dotdot(&self) -> bool {
        self.segments.iter().any(
            |s| {
                match s.as_ref() {
                    "." => true,
                    ".." => true,
                    _ => false
                }
            })
    }

    /// True if there are neither `.` nor `..` segments.
    pub fn is_canonical(&self) -> bool {
        ! self.contains_dot_or_dotdot()
    }

    /// Segments-only comparison: `/foo/` and `/foo` strip the same
    /// prefixes. None when `prefix` is not a leading segment
    /// sequence of `self`; otherwise the path below it, which keeps
    /// the flags of `self`.
    pub fn strip_prefix<P: AsRef<str>>(&self, prefix: &[P]) -> Option<Self> {
        if self.segments.len() < prefix.len() {
            return None;
        }
        for (s, p) in self.segments.iter().zip(prefix.iter()) {
            if s.as_ref() != p.as_ref() {
                return None;
            }
        }
        Some(PPath {
            is_absolute: self.is_absolute,
            ends_with_slash: self.ends_with_slash,
            segments: self.segments[prefix.len()..].to_vec(),
        })
    }

    /// Ignores differences on is_absolute and ends_with_slash.
    pub fn same_document_as_path_str(&self, other: &str) -> bool {
        itertools::equal(self.segments.iter().map(|v| v.as_ref()),
                         path_segments(other))
    }
}

impl<P: Clone + Debug> PPath<P> {
    pub fn new(is_absolute: bool,
               ends_with_slash: bool,
               segments: Vec<P>
    ) -> Self {
        PPath { is_absolute, ends_with_slash, segments }
    }

    pub fn is_absolute(&self) -> bool {
        self.is_absolute
    }

    pub fn ends_with_slash(&self) -> bool {
        self.ends_with_slash
    }

    /// without empty ones
    pub fn segments(&self) -> &[P] {
        &self.segments
    }

    /// The same path placed below `prefix`; keeps the flags of
    /// `self`, except that the result of prepending to anything is
    /// absolute (mount prefixes hang off the site root).
    pub fn prepend_segments(&self, prefix: &[P]) -> Self {
        let mut segments: Vec<P> = prefix.to_vec();
        segments.extend_from_slice(&self.segments);
        PPath {
            is_absolute: true,
            ends_with_slash: self.ends_with_slash,
            segments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_parse_render() {
        let t = |s: &str| -> String {
            PPath::<&str>::from_str(s).to_string()
        };
        assert_eq!(t("/"), "/");
        assert_eq!(t("/hello"), "/hello");
        assert_eq!(t("/hello//world/"), "/hello/world/");
        assert_eq!(t("foo/bar"), "foo/bar");
        assert_eq!(t(""), ".");
        let p = PPath::<&str>::from_str("/a/b/");
        assert!(p.is_absolute());
        assert!(p.ends_with_slash());
        assert_eq!(p.segments(), &["a", "b"]);
    }

    #[test]
    fn t_parse_from_transient_string() {
        // KString segments borrowed from a string built at runtime,
        // as AContext does with the request path
        let s = format!("/entry/{}", 7 * 6);
        let p = PPath::<kstring::KString>::from_str(&s);
        assert_eq!(p.to_string(), "/entry/42");
        assert_eq!(p.segments().len(), 2);
    }

    #[test]
    fn t_strip_prefix() {
        let p = PPath::<&str>::from_str("/docs/intro/setup");
        assert_eq!(p.strip_prefix(&["docs"]).unwrap().to_string(),
                   "/intro/setup");
        assert_eq!(p.strip_prefix(&["docs", "intro"]).unwrap().segments(),
                   &["setup"]);
        assert_eq!(p.strip_prefix(&["doc"]), None);
        assert_eq!(p.strip_prefix(&["docs", "intro", "setup", "x"]), None);
        // the whole path as prefix leaves the (absolute) root
        let root = p.strip_prefix(&["docs", "intro", "setup"]).unwrap();
        assert_eq!(root.segments().len(), 0);
        assert_eq!(root.to_string(), "/");
        // trailing slash is irrelevant for stripping, but preserved
        let p2 = PPath::<&str>::from_str("/docs/");
        assert_eq!(p2.strip_prefix(&["docs"]).unwrap().ends_with_slash(), true);
    }

    #[test]
    fn t_prepend() {
        let p = PPath::<&str>::from_str("/a/b");
        assert_eq!(p.prepend_segments(&["sub"]).to_string(), "/sub/a/b");
        let root = PPath::<&str>::from_str("/");
        assert_eq!(root.prepend_segments(&["sub"]).to_string(), "/sub/");
        // ^ root carries ends_with_slash; segment comparisons don't care
        assert!(root.prepend_segments(&["sub"])
                .same_document_as_path_str("/sub"));
    }

    #[test]
    fn t_canonical() {
        let canon = |s| -> bool {
            PPath::<&str>::from_str(s).is_canonical()
        };
        assert!(canon("a///b/c.html"));
        assert!(canon("c.html"));
        assert!(canon(""));
        assert!(! canon("."));
        assert!(! canon("./a"));
        assert!(! canon("a//./b/c.html"));
        assert!(! canon("a//../c.html"));
    }
}
