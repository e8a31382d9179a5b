
//! Pattern matching and processing help for HTTP request methods.

// https://developer.mozilla.org/en-US/docs/Web/HTTP/Methods

use std::fmt::Debug;

use anyhow::{Result, bail};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpRequestMethod {
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    CONNECT,
    OPTIONS,
    TRACE,
    PATCH,
}

impl HttpRequestMethod {
    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "GET" => Ok(Self::GET),
            "HEAD" => Ok(Self::HEAD),
            "POST" => Ok(Self::POST),
            "PUT" => Ok(Self::PUT),
            "PATCH" => Ok(Self::PATCH),
            "DELETE" => Ok(Self::DELETE),
            "OPTIONS" => Ok(Self::OPTIONS),
            "CONNECT" => Ok(Self::CONNECT),
            "TRACE" => Ok(Self::TRACE),
            _ => bail!("invalid http request method {s:?}")
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::GET => "GET",
            Self::HEAD => "HEAD",
            Self::POST => "POST",
            Self::PUT => "PUT",
            Self::PATCH => "PATCH",
            Self::DELETE => "DELETE",
            Self::OPTIONS => "OPTIONS",
            Self::CONNECT => "CONNECT",
            Self::TRACE => "TRACE",
        }
    }

    pub fn is_post(self) -> bool {
        match self {
            Self::POST => true,
            _ => false
        }
    }

    fn bit(self) -> u16 {
        match self {
            Self::GET => 1 << 0,
            Self::HEAD => 1 << 1,
            Self::POST => 1 << 2,
            Self::PUT => 1 << 3,
            Self::DELETE => 1 << 4,
            Self::CONNECT => 1 << 5,
            Self::OPTIONS => 1 << 6,
            Self::TRACE => 1 << 7,
            Self::PATCH => 1 << 8,
        }
    }

    const ALL: [HttpRequestMethod; 9] = [
        Self::GET, Self::HEAD, Self::POST, Self::PUT, Self::DELETE,
        Self::CONNECT, Self::OPTIONS, Self::TRACE, Self::PATCH,
    ];
}

/// The set of request methods a route pattern accepts. Empty sets are
/// representable but pointless; the grammar rejects them on `add`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct MethodSet(u16);

impl MethodSet {
    pub const fn empty() -> Self {
        MethodSet(0)
    }

    /// GET only; HEAD is *not* implied, list it if you serve it.
    pub fn get() -> Self {
        Self::empty().with(HttpRequestMethod::GET)
    }

    pub fn get_head() -> Self {
        Self::get().with(HttpRequestMethod::HEAD)
    }

    pub fn get_post() -> Self {
        Self::get().with(HttpRequestMethod::POST)
    }

    pub fn post() -> Self {
        Self::empty().with(HttpRequestMethod::POST)
    }

    pub fn with(self, method: HttpRequestMethod) -> Self {
        MethodSet(self.0 | method.bit())
    }

    pub fn contains(self, method: HttpRequestMethod) -> bool {
        self.0 & method.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn members(self) -> impl Iterator<Item = HttpRequestMethod> {
        HttpRequestMethod::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

impl Debug for MethodSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MethodSet{")?;
        let mut seen = false;
        for m in self.members() {
            if seen {
                f.write_str(",")?;
            }
            f.write_str(m.as_str())?;
            seen = true;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_from_str() {
        assert_eq!(HttpRequestMethod::from_str("GET").unwrap(),
                   HttpRequestMethod::GET);
        assert_eq!(HttpRequestMethod::from_str("get").err().unwrap().to_string(),
                   "invalid http request method \"get\"");
        for m in HttpRequestMethod::ALL {
            assert_eq!(HttpRequestMethod::from_str(m.as_str()).unwrap(), m);
        }
    }

    #[test]
    fn t_methodset() {
        let s = MethodSet::get_post();
        assert!(s.contains(HttpRequestMethod::GET));
        assert!(s.contains(HttpRequestMethod::POST));
        assert!(! s.contains(HttpRequestMethod::HEAD));
        assert!(! MethodSet::get().contains(HttpRequestMethod::HEAD));
        assert!(MethodSet::empty().is_empty());
        assert_eq!(format!("{:?}", s), "MethodSet{GET,POST}");
    }
}
