//! The subsite side of the embedding mechanism: the [`Subsite`]
//! trait implemented by a bundle's state type, the two-level
//! [`SubsiteContext`] its handlers run in, and the [`Mount`]
//! descriptor binding one bundle instance into an embedding site's
//! route space.

use std::fmt::Debug;
use std::sync::Arc;

use anyhow::{Result, bail};
use kstring::KString;

use crate::acontext::AContext;
use crate::aresponse::AResponse;
use crate::capability::PageShell;
use crate::grammar::Resolution;
use crate::http_request_method::HttpRequestMethod;
use crate::http_response_status_codes::HttpResponseStatusCode;
use crate::ppath::{PPath, path_segments};
use crate::sitemap::SiteMap;
use crate::webutils::htmlresponse;

/// A routeable component: the embedding site itself, or a bundle of
/// routes and handlers meant to be mounted into one. Implemented by
/// the component's own state type; `H` is whatever embedding state
/// hosts it, seen only through the capability traits the impl
/// requires of it.
pub trait Subsite<H: ?Sized>: Sized + Send + Sync + 'static {
    /// The sum-typed route value: one variant per declared route,
    /// carrying the decoded path variables. Only ever produced by a
    /// successful decode.
    type Route: Clone + Debug + Send + Sync + 'static;

    fn handle(
        &self,
        context: &SubsiteContext<'_, H, Self>,
        route: Self::Route,
    ) -> Result<AResponse>;
}

/// The two-level execution environment of one request inside a
/// subsite handler: the bundle's own state is the handler's `&self`;
/// `host` is the delegation handle up into the embedding state.
/// Created per request, dropped with the response.
pub struct SubsiteContext<'r, H: ?Sized, S: Subsite<H>> {
    pub host: &'r H,
    pub req: &'r AContext<'r>,
    base: Vec<KString>,
    routes: &'r SiteMap<H, S>,
}

impl<'r, H: ?Sized + 'static, S: Subsite<H>> SubsiteContext<'r, H, S> {
    pub(crate) fn new(
        host: &'r H,
        req: &'r AContext<'r>,
        base: Vec<KString>,
        routes: &'r SiteMap<H, S>,
    ) -> Self {
        SubsiteContext { host, req, base, routes }
    }

    /// Where this subsite hangs in the embedding site's URL space
    /// (empty for the site itself).
    pub fn base(&self) -> &[KString] {
        &self.base
    }

    /// Canonical absolute URL path for one of this subsite's own
    /// routes, wherever it is mounted. The type of `route` makes
    /// stringly-typed links unnecessary.
    pub fn href(&self, route: &S::Route) -> Result<String> {
        Ok(self.routes.encode(route)?
           .prepend_segments(&self.base)
           .to_string())
    }
}

impl<'r, H: PageShell + ?Sized + 'static, S: Subsite<H>> SubsiteContext<'r, H, S> {
    /// Render `main` in the *embedding site's* page shell; the usual
    /// way for a subsite handler to produce a full page.
    pub fn page(
        &self, head_title: Option<&str>, main: &str
    ) -> Result<AResponse> {
        let page = self.host.render_shell(self.req, head_title, main)?;
        Ok(htmlresponse(HttpResponseStatusCode::OK200, page).into())
    }
}

/// The binding that attaches one bundle instance into an embedding
/// component's route space: a literal path prefix, the injection of
/// bundle routes into the embedder's route enum (`wrap`, which must
/// be injective) with its partial inverse (`unwrap`), and the
/// accessor from embedder state to the bundle's own state.
///
/// `S` is the embedding component, `T` the mounted bundle; since
/// both are [`Subsite`]s over the same ultimate host `H`, mounts
/// nest transitively without the outer dispatcher knowing.
pub struct Mount<H: ?Sized, S: Subsite<H>, T: Subsite<H>> {
    prefix: Vec<KString>,
    wrap: fn(T::Route) -> S::Route,
    unwrap: fn(&S::Route) -> Option<T::Route>,
    accessor: fn(&S) -> &T,
    sub: Arc<SiteMap<H, T>>,
}

impl<H: ?Sized, S: Subsite<H>, T: Subsite<H>> Mount<H, S, T> {
    /// `prefix` is a literal absolute path with at least one
    /// segment; variables or dot segments in it are declaration
    /// errors.
    pub fn new(
        prefix: &str,
        wrap: fn(T::Route) -> S::Route,
        unwrap: fn(&S::Route) -> Option<T::Route>,
        accessor: fn(&S) -> &T,
        sub: Arc<SiteMap<H, T>>,
    ) -> Result<Self> {
        if prefix.chars().next() != Some('/') {
            bail!("mount prefix must start with '/': {prefix:?}")
        }
        let segments: Vec<KString> =
            path_segments(prefix).map(KString::from_ref).collect();
        if segments.is_empty() {
            bail!("mount prefix must have at least one segment: {prefix:?}")
        }
        for segment in &segments {
            match segment.as_str() {
                "." | ".." => bail!("mount prefix segment {segment:?} \
                                     in {prefix:?}"),
                s if s.contains('{') || s.contains('}') =>
                    bail!("mount prefix must be literal, got segment \
                           {segment:?} in {prefix:?}"),
                _ => ()
            }
        }
        Ok(Mount { prefix: segments, wrap, unwrap, accessor, sub })
    }
}

/// Object-safe view of a mount so a site map can hold mounts of
/// heterogeneous bundle types in declaration order.
pub(crate) trait MountDyn<H: ?Sized, S: Subsite<H>>: Send + Sync {
    fn prefix(&self) -> &[KString];

    /// Strip the prefix, delegate the remainder to the bundle's own
    /// codec, lift the result via `wrap`. `NotFound` covers "not
    /// this mount's concern".
    fn mount_decode(
        &self,
        path: &PPath<KString>,
        method: HttpRequestMethod
    ) -> Resolution<S::Route>;

    /// None when the route value is not this mount's; otherwise the
    /// bundle-encoded path with the prefix prepended.
    fn mount_encode(
        &self, route: &S::Route
    ) -> Option<Result<PPath<KString>>>;

    /// None when the route value is not this mount's; otherwise the
    /// bundle's response, produced in a context whose state is the
    /// bundle's own (via the accessor) and whose host stays `H`.
    fn dispatch(
        &self,
        host: &H,
        state: &S,
        req: &AContext,
        base: &[KString],
        route: &S::Route,
    ) -> Option<Result<AResponse>>;
}

impl<H: ?Sized + 'static, S: Subsite<H>, T: Subsite<H>> MountDyn<H, S>
    for Mount<H, S, T>
{
    fn prefix(&self) -> &[KString] {
        &self.prefix
    }

    fn mount_decode(
        &self,
        path: &PPath<KString>,
        method: HttpRequestMethod
    ) -> Resolution<S::Route> {
        match path.strip_prefix(&self.prefix) {
            Some(rest) => self.sub.decode(&rest, method).map(self.wrap),
            None => Resolution::NotFound
        }
    }

    fn mount_encode(
        &self, route: &S::Route
    ) -> Option<Result<PPath<KString>>> {
        let sub_route = (self.unwrap)(route)?;
        Some(self.sub.encode(&sub_route)
             .map(|path| path.prepend_segments(&self.prefix)))
    }

    fn dispatch(
        &self,
        host: &H,
        state: &S,
        req: &AContext,
        base: &[KString],
        route: &S::Route,
    ) -> Option<Result<AResponse>> {
        let sub_route = (self.unwrap)(route)?;
        let sub_state = (self.accessor)(state);
        let mut sub_base = base.to_vec();
        sub_base.extend_from_slice(&self.prefix);
        Some(self.sub.dispatch_route(host, sub_state, req,
                                     sub_base, sub_route))
    }
}
