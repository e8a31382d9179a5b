//! The dispatcher: a [`SiteMap`] owns one component's grammar plus
//! its mounts, and resolves paths by asking the grammar first, then
//! each mount in declaration order. `SiteMap<P, P>` is the root map
//! of a whole site; the same type with a bundle state as second
//! parameter is a mounted bundle's map, which is how mounting nests
//! transitively.

use anyhow::{Result, bail};
use kstring::KString;
use rouille::Response;

use crate::acontext::AContext;
use crate::aresponse::AResponse;
use crate::grammar::{Grammar, Resolution};
use crate::http_request_method::HttpRequestMethod;
use crate::http_response_status_codes::HttpResponseStatusCode;
use crate::ppath::PPath;
use crate::subsite::{Mount, MountDyn, Subsite, SubsiteContext};
use crate::webutils::{errorpage_from_error, errorpage_from_status};

/// The root map of a site whose state type `P` is its own host.
pub type SiteRoot<P> = SiteMap<P, P>;

pub struct SiteMap<H: ?Sized, S: Subsite<H>> {
    grammar: Grammar<S::Route>,
    mounts: Vec<Box<dyn MountDyn<H, S>>>,
}

impl<H: ?Sized + 'static, S: Subsite<H>> SiteMap<H, S> {
    pub fn new(grammar: Grammar<S::Route>) -> Self {
        SiteMap { grammar, mounts: Vec::new() }
    }

    /// Attach a bundle; chainable. Mount prefixes must not shadow
    /// each other, so a prefix that equals, extends, or is extended
    /// by an already mounted one is rejected here, at declaration
    /// time. Prefixes competing with the grammar's own patterns are
    /// fine (the grammar is asked first).
    pub fn mount<T: Subsite<H>>(
        &mut self, mount: Mount<H, S, T>
    ) -> Result<&mut Self> {
        let mount: Box<dyn MountDyn<H, S>> = Box::new(mount);
        for existing in &self.mounts {
            if is_segment_prefix(existing.prefix(), mount.prefix())
                || is_segment_prefix(mount.prefix(), existing.prefix())
            {
                bail!("mount prefix {:?} overlaps already mounted {:?}",
                      join_prefix(mount.prefix()),
                      join_prefix(existing.prefix()))
            }
        }
        self.mounts.push(mount);
        Ok(self)
    }

    /// Resolve a path + method to a route value of this component:
    /// own grammar first, then mounts in declaration order. A method
    /// mismatch anywhere along the way is only reported if nothing
    /// later finds a full match.
    pub fn decode(
        &self,
        path: &PPath<KString>,
        method: HttpRequestMethod
    ) -> Resolution<S::Route> {
        let mut shape_matched = false;
        match self.grammar.decode(path, method) {
            Resolution::Found(route) => return Resolution::Found(route),
            Resolution::MethodNotAllowed => shape_matched = true,
            Resolution::NotFound => ()
        }
        for mount in &self.mounts {
            match mount.mount_decode(path, method) {
                Resolution::Found(route) => return Resolution::Found(route),
                Resolution::MethodNotAllowed => shape_matched = true,
                Resolution::NotFound => ()
            }
        }
        if shape_matched {
            Resolution::MethodNotAllowed
        } else {
            Resolution::NotFound
        }
    }

    /// The canonical path of a route value, wherever in the mount
    /// tree its declaration lives. Errors only on values no grammar
    /// entry and no mount owns, which is a declaration bug.
    pub fn encode(&self, route: &S::Route) -> Result<PPath<KString>> {
        if let Some(path) = self.grammar.encode_opt(route) {
            return path;
        }
        for mount in &self.mounts {
            if let Some(path) = mount.mount_encode(route) {
                return path;
            }
        }
        bail!("no route or mount encodes route value {route:?}")
    }

    /// Run the handler a decoded route value belongs to: one of the
    /// mounts' if a mount's `unwrap` claims the value, else this
    /// component's own. `base` is the path prefix under which this
    /// component is reachable; it grows by each mount's prefix on the
    /// way down and ends up in the handler's context for `href`.
    pub fn dispatch_route(
        &self,
        host: &H,
        state: &S,
        req: &AContext,
        base: Vec<KString>,
        route: S::Route,
    ) -> Result<AResponse> {
        for mount in &self.mounts {
            if let Some(res) = mount.dispatch(host, state, req,
                                              &base, &route) {
                return res;
            }
        }
        let context = SubsiteContext::new(host, req, base, self);
        state.handle(&context, route)
    }
}

impl<P: Subsite<P>> SiteMap<P, P> {
    /// Serve one request against the whole site. Total: handler
    /// errors become 500 pages, unresolved paths 404 or 405 pages,
    /// never a panic out of here.
    pub fn dispatch(&self, site: &P, req: &AContext) -> Response {
        match self.dispatch_result(site, req) {
            Ok(response) => response.into_response(),
            Err(err) => errorpage_from_error(err)
        }
    }

    /// Like [`dispatch`](Self::dispatch) but hands handler errors to
    /// the caller; the server loop wants them for the error log
    /// before turning them into 500 pages. Unresolved paths are `Ok`
    /// 404/405 pages, not errors.
    pub fn dispatch_result(
        &self, site: &P, req: &AContext
    ) -> Result<AResponse> {
        if ! req.path().is_canonical() {
            return Ok(errorpage_from_status(
                HttpResponseStatusCode::NotFound404).into());
        }
        match self.decode(req.path(), req.method()) {
            Resolution::Found(route) =>
                self.dispatch_route(site, site, req, Vec::new(), route),
            Resolution::MethodNotAllowed => Ok(errorpage_from_status(
                HttpResponseStatusCode::MethodNotAllowed405).into()),
            Resolution::NotFound => Ok(errorpage_from_status(
                HttpResponseStatusCode::NotFound404).into()),
        }
    }

    /// Canonical absolute URL path for any of the site's route
    /// values, including mounted ones.
    pub fn href(&self, route: &P::Route) -> Result<String> {
        Ok(self.encode(route)?.to_string())
    }
}

fn is_segment_prefix(shorter: &[KString], longer: &[KString]) -> bool {
    shorter.len() <= longer.len()
        && shorter.iter().zip(longer).all(|(a, b)| a == b)
}

fn join_prefix(segments: &[KString]) -> String {
    segments.iter().fold(String::new(), |mut s, segment| {
        s.push('/');
        s.push_str(segment);
        s
    })
}
