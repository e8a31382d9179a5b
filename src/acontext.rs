//! Per-request context: the parsed view of a `rouille::Request`
//! handed to handlers. Created fresh per request, never shared
//! across requests.

use std::net::{IpAddr, SocketAddr};
use std::time::SystemTime;

use anyhow::Result;
use kstring::KString;
use rouille::Request;

use crate::http_request_method::HttpRequestMethod;
use crate::ppath::PPath;

pub struct AContext<'r> {
    // Fallback for host(): what this server listens on; ip:port or
    // domain:port or whatever is deemed suitable
    listen_addr: &'r str,
    path: PPath<KString>,
    path_string: String,
    now: SystemTime,
    method: HttpRequestMethod,
    request: &'r Request,
}

impl<'r> AContext<'r> {
    pub fn new(request: &'r Request, listen_addr: &'r str) -> Result<Self> {
        let path_original = request.url(); // path only, percent-decoded
        let path: PPath<KString> = PPath::from_str(&path_original);
        let path_string = path.to_string();
        let method = HttpRequestMethod::from_str(request.method())?;
        Ok(AContext {
            listen_addr,
            path,
            path_string,
            now: SystemTime::now(),
            method,
            request,
        })
    }

    /// Like the request part in Apache style Combined Log Format
    pub fn request_line(&self) -> String {
        // `Request` does not appear to maintain the original request
        // line string, thus have to reconstruct it.
        format!("{} {}",
                self.request.method(),
                self.request.raw_url())
    }

    /// `foo` part in `?foo`
    pub fn query_string(&self) -> &str {
        self.request.raw_query_string()
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.request.header("user-agent")
    }

    pub fn referer(&self) -> Option<&str> {
        self.header("referer")
    }

    pub fn client_ip(&self) -> IpAddr {
        self.request.remote_addr().ip()
    }

    pub fn client_addr(&self) -> &SocketAddr {
        self.request.remote_addr()
    }

    pub fn method(&self) -> HttpRequestMethod {
        self.method
    }

    pub fn is_post(&self) -> bool {
        self.method.is_post()
    }

    /// Only checks query parameters! For `POST` data, use
    /// [`post_input!`](https://docs.rs/rouille/latest/rouille/input/post/index.html)
    pub fn get_param(&self, name: &str) -> Option<String> {
        self.request.get_param(name)
    }

    pub fn host(&self) -> Option<&str> {
        self.request.header("host")
    }

    pub fn host_or_listen_addr(&self) -> &str {
        self.request.header("host").unwrap_or(self.listen_addr)
    }

    pub fn path(&self) -> &PPath<KString> {
        &self.path
    }

    pub fn path_str(&self) -> &str {
        &self.path_string
    }

    pub fn now(&self) -> &SystemTime {
        &self.now
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.request.header(key)
    }

    pub fn request(&self) -> &Request {
        self.request
    }
}
