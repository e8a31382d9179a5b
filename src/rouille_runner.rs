//! Run a site on rouille's threaded server: one task per request,
//! every task sharing the same immutable site state and route map
//! behind `Arc`s.

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use rouille::{Server, Request, Response};

use crate::acontext::AContext;
use crate::apachelog::{log_combined, Logs};
use crate::http_response_status_codes::HttpResponseStatusCode;
use crate::sitemap::SiteRoot;
use crate::subsite::Subsite;
use crate::warn;
use crate::webutils::errorpage_from_status;

/// Make a handler for Rouille's `Server`. Handler errors go to the
/// error log and become 500 pages inside `log_combined`; everything
/// else (404, 405, success) is an access log entry.
pub fn server_handler<P: Subsite<P>>(
    listen_addr: String,
    site: Arc<P>,
    root: Arc<SiteRoot<P>>,
    logs: Arc<Mutex<Logs>>,
) -> impl for<'r> Fn(&'r Request) -> Response
{
    move |request: &Request| -> Response {
        match AContext::new(request, &listen_addr) {
            Ok(context) => {
                log_combined(&context, || {
                    (logs.clone(), root.dispatch_result(&site, &context))
                }).into_response()
            }
            Err(e) => {
                // Only fallible part of context creation is the
                // method parse
                warn!("unusable request: {e:#}");
                errorpage_from_status(
                    HttpResponseStatusCode::NotImplemented501)
            }
        }
    }
}

pub struct Tlskeys {
    pub crt: Vec<u8>,
    pub key: Vec<u8>,
}

/// Run a rouille server in a new thread.
pub fn run_server<P: Subsite<P>>(
    thread_name: &str,
    addr: String,
    tlskeys: Option<Tlskeys>,
    site: Arc<P>,
    root: Arc<SiteRoot<P>>,
    logs: Arc<Mutex<Logs>>,
) -> Result<JoinHandle<()>, std::io::Error>
{
    thread::Builder::new().name(thread_name.into()).spawn(move || {
        let handler = server_handler(addr.clone(), site, root, logs);
        if let Some(Tlskeys { crt, key }) = tlskeys {
            Server::new_ssl(addr, handler, crt, key)
        } else {
            Server::new(addr, handler)
        }
        // Panicking instead of returning Result; this runs in a
        // dedicated thread where panicking achieves the same outcome.
        .expect("error starting server")
            .run()
    })
}
