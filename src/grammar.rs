//! The declarative route grammar of one site or subsite: an ordered
//! table from route patterns (plus allowed methods) to the values of
//! a sum-typed route enum, and the total decode/encode pair over it.

use std::fmt::Debug;

use anyhow::{Result, bail};
use kstring::KString;

use crate::http_request_method::{HttpRequestMethod, MethodSet};
use crate::pattern::{RoutePattern, Var};
use crate::ppath::PPath;
use crate::warn;

/// The outcome of resolving a path + method against a grammar (or a
/// whole site map). Failing to resolve is not exceptional, it is the
/// normal "try the next candidate" signal, hence not an error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<R> {
    Found(R),
    /// Some pattern matched the path's shape, but none of those
    /// allowed the request method. Distinct from `NotFound` so
    /// callers can answer 405 rather than 404.
    MethodNotAllowed,
    NotFound,
}

impl<R> Resolution<R> {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }

    pub fn found(self) -> Option<R> {
        match self {
            Resolution::Found(r) => Some(r),
            _ => None
        }
    }

    pub fn map<S>(self, f: impl FnOnce(R) -> S) -> Resolution<S> {
        match self {
            Resolution::Found(r) => Resolution::Found(f(r)),
            Resolution::MethodNotAllowed => Resolution::MethodNotAllowed,
            Resolution::NotFound => Resolution::NotFound,
        }
    }
}

/// One route declaration: symbolic name, pattern, method set, and
/// the fn pair tying the pattern's captures to the route enum.
/// `decode` builds the enum variant from captured variables (same
/// count and kinds as the pattern declares); `encode` is its partial
/// inverse, returning the variables iff the value belongs to this
/// entry.
struct GrammarEntry<R> {
    name: &'static str,
    pattern: RoutePattern,
    methods: MethodSet,
    decode: fn(&[Var]) -> Option<R>,
    encode: fn(&R) -> Option<Vec<Var>>,
}

pub struct Grammar<R> {
    entries: Vec<GrammarEntry<R>>,
}

impl<R: Debug> Grammar<R> {
    pub fn new() -> Self {
        Grammar { entries: Vec::new() }
    }

    /// Declare a route; chainable. Errors on declarations that could
    /// never be told apart at request time (same name, or patterns
    /// matching exactly the same paths), so misconfiguration
    /// surfaces at startup, not per-request.
    pub fn add(
        &mut self,
        name: &'static str,
        pattern: &str,
        methods: MethodSet,
        decode: fn(&[Var]) -> Option<R>,
        encode: fn(&R) -> Option<Vec<Var>>,
    ) -> Result<&mut Self> {
        if methods.is_empty() {
            bail!("route {name:?}: empty method set")
        }
        let pattern = RoutePattern::from_str(pattern)?;
        for entry in &self.entries {
            if entry.name == name {
                bail!("already contained a route named {name:?}")
            }
            if entry.pattern.indistinguishable_from(&pattern) {
                bail!("route {name:?}: pattern {pattern:?} is \
                       indistinguishable from route {:?}", entry.name)
            }
        }
        self.entries.push(GrammarEntry {
            name, pattern, methods, decode, encode
        });
        Ok(self)
    }

    /// Total: never errors, never panics. Fully-static patterns are
    /// tried before variable-capturing ones; within a group,
    /// declaration order decides.
    pub fn decode(
        &self,
        path: &PPath<KString>,
        method: HttpRequestMethod
    ) -> Resolution<R> {
        let segments = path.segments();
        let mut shape_matched = false;
        for static_pass in [true, false] {
            for entry in &self.entries {
                if entry.pattern.is_static() != static_pass {
                    continue;
                }
                if let Some(vars) = entry.pattern.matches(segments) {
                    if ! entry.methods.contains(method) {
                        shape_matched = true;
                        continue;
                    }
                    match (entry.decode)(&vars) {
                        Some(route) => return Resolution::Found(route),
                        None => {
                            // The decode fn is expected to accept
                            // every capture list its own pattern
                            // produces; a refusal is a declaration
                            // bug, treated as a non-match.
                            warn!("route {:?}: decode fn refused \
                                   captures {vars:?}", entry.name);
                        }
                    }
                }
            }
        }
        if shape_matched {
            Resolution::MethodNotAllowed
        } else {
            Resolution::NotFound
        }
    }

    /// Total for every route value this grammar declares; an error
    /// means the value belongs to no entry (or an entry's encode fn
    /// returned variables that do not fit its pattern), which is a
    /// declaration bug.
    pub fn encode(&self, route: &R) -> Result<PPath<KString>> {
        match self.encode_opt(route) {
            Some(path) => path,
            None => bail!("no grammar entry encodes route value {route:?}")
        }
    }

    /// None means the value belongs to no entry of this grammar;
    /// used by site maps, which then go on to ask their mounts.
    pub(crate) fn encode_opt(
        &self, route: &R
    ) -> Option<Result<PPath<KString>>> {
        for entry in &self.entries {
            if let Some(vars) = (entry.encode)(route) {
                return Some(entry.pattern.render(&vars));
            }
        }
        None
    }

    /// The declared method set of the entry owning `route`, for
    /// tests and OPTIONS-style introspection.
    pub fn methods_of(&self, route: &R) -> Option<MethodSet> {
        self.entries.iter().find_map(
            |entry| (entry.encode)(route).map(|_| entry.methods))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_request_method::HttpRequestMethod::{GET, POST, PUT};

    #[derive(Debug, Clone, PartialEq)]
    enum TestRoute {
        Home,
        Contact,
        Entry(u64),
        Page(KString),
        Special,
    }

    fn grammar() -> Grammar<TestRoute> {
        let mut g = Grammar::new();
        g
            .add("home", "/", MethodSet::get(),
                 |_| Some(TestRoute::Home),
                 |r| matches!(r, TestRoute::Home).then(Vec::new)).unwrap()
            .add("contact", "/contact", MethodSet::get_post(),
                 |_| Some(TestRoute::Contact),
                 |r| matches!(r, TestRoute::Contact).then(Vec::new)).unwrap()
            .add("entry", "/entry/{u64}", MethodSet::get(),
                 |vars| Some(TestRoute::Entry(vars.first()?.as_u64()?)),
                 |r| match r {
                     TestRoute::Entry(id) => Some(vec![Var::U64(*id)]),
                     _ => None
                 }).unwrap()
            .add("page", "/page/{str}", MethodSet::get(),
                 |vars| Some(TestRoute::Page(
                     KString::from_ref(vars.first()?.as_str()?))),
                 |r| match r {
                     TestRoute::Page(name) =>
                         Some(vec![Var::Str(name.clone())]),
                     _ => None
                 }).unwrap()
            // declared *after* the variable pattern on purpose; the
            // static pattern must still win for /page/special
            .add("special", "/page/special", MethodSet::get(),
                 |_| Some(TestRoute::Special),
                 |r| matches!(r, TestRoute::Special).then(Vec::new)).unwrap();
        g
    }

    fn decoded(g: &Grammar<TestRoute>, path: &str,
               method: HttpRequestMethod) -> Resolution<TestRoute> {
        g.decode(&PPath::from_str(path), method)
    }

    #[test]
    fn t_roundtrip() {
        let g = grammar();
        let routes = [
            TestRoute::Home,
            TestRoute::Contact,
            TestRoute::Entry(0),
            TestRoute::Entry(184467),
            TestRoute::Page(KString::from_ref("intro")),
            TestRoute::Special,
        ];
        for r in routes {
            let path = g.encode(&r).unwrap();
            for m in g.methods_of(&r).unwrap().members() {
                assert_eq!(g.decode(&path, m), Resolution::Found(r.clone()),
                           "round trip for {r:?} via {:?}", path.to_string());
            }
        }
    }

    #[test]
    fn t_static_wins_over_variable() {
        let g = grammar();
        assert_eq!(decoded(&g, "/page/special", GET),
                   Resolution::Found(TestRoute::Special));
        assert_eq!(decoded(&g, "/page/other", GET),
                   Resolution::Found(TestRoute::Page(KString::from_ref("other"))));
    }

    #[test]
    fn t_method_discrimination() {
        let g = grammar();
        assert_eq!(decoded(&g, "/contact", POST),
                   Resolution::Found(TestRoute::Contact));
        assert_eq!(decoded(&g, "/", POST), Resolution::MethodNotAllowed);
        assert_eq!(decoded(&g, "/entry/5", PUT), Resolution::MethodNotAllowed);
        assert_eq!(decoded(&g, "/entry/5/x", GET), Resolution::NotFound);
        assert_eq!(decoded(&g, "/nosuch", GET), Resolution::NotFound);
    }

    #[test]
    fn t_variable_parse_failure_is_nonmatch() {
        let g = grammar();
        // "abc" does not parse as u64; no other pattern has that
        // shape with a matching literal, except the str catch under
        // /page; /entry/abc matches nothing
        assert_eq!(decoded(&g, "/entry/abc", GET), Resolution::NotFound);
    }

    #[test]
    fn t_add_rejections() {
        let mut g = grammar();
        let err = g.add("entry2", "/entry/{u64}", MethodSet::get(),
                        |_| None, |_| None).err().unwrap();
        assert!(err.to_string().contains("indistinguishable"), "{err}");
        let err = g.add("home", "/elsewhere", MethodSet::get(),
                        |_| None, |_| None).err().unwrap();
        assert_eq!(err.to_string(), "already contained a route named \"home\"");
        let err = g.add("empty", "/empty", MethodSet::empty(),
                        |_| None, |_| None).err().unwrap();
        assert_eq!(err.to_string(), "route \"empty\": empty method set");
    }

    #[test]
    fn t_encode_unknown_value_errors() {
        let mut g: Grammar<TestRoute> = Grammar::new();
        g.add("home", "/", MethodSet::get(),
              |_| Some(TestRoute::Home),
              |r| matches!(r, TestRoute::Home).then(Vec::new)).unwrap();
        assert!(g.encode(&TestRoute::Contact).is_err());
    }
}
