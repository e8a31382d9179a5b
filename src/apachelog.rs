//! Write HTTP access log files in the Combined Log Format (extended
//! Common Log Format) for access logs (Apache style), as per
//! <https://httpd.apache.org/docs/2.4/logs.html>.

use std::fs::OpenOptions;
use std::mem::swap;
use std::panic;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::{time::{Duration, SystemTime, Instant}, io::{stderr, BufWriter}};
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc, Datelike, Timelike};
use rouille::ResponseBody;

use crate::acontext::AContext;
use crate::aresponse::AResponse;
use crate::http_response_status_codes::HttpResponseStatusCode;
use crate::warn;
use crate::webutils::errorpage_from_status;

static MONTHS: &[&str; 12] = &[
    "Jan", "Feb", "Mar", "Apr", "May", "Jun",
    "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

// "06/Dec/2023:02:02:47 +0000"
pub fn write_time(
    outp: &mut impl Write,
    time: SystemTime
) -> Result<()> {
    let dt: DateTime<Utc> = DateTime::from(time);
    write!(outp, "{:02}/{}/{:04}:{:02}:{:02}:{:02} +0000",
           dt.day(), MONTHS[dt.month0() as usize], dt.year(),
           dt.hour(), dt.minute(), dt.second())?;
    Ok(())
}

// Apache:
// 18.134.151.89 - - [06/Dec/2023:02:02:47 +0100] "GET /login.jsp HTTP/1.1" 404 447 "-" "'Cloud mapping experiment. Contact research@pdrlabs.net'"
// 44.212.94.18 - - [06/Dec/2023:02:38:18 +0100] "GET /resume/nontechnical.html HTTP/1.1" 200 2403 "-" "CCBot/2.0 (https://commoncrawl.org/faq/)"
// We also add duration at the end.

/// Write to access.log. The user field stays "-", there are no
/// authenticated users here.
pub fn write_combined(
    outp: &mut impl Write,
    context: &AContext,
    duration: Duration,
    aresponse: &mut AResponse, // temporarily swaps out ResponseBody and back
) -> Result<()> {
    // Write the time when the log entry is made, not when the
    // request started
    let now = SystemTime::now();
    write!(outp, "{} - - [", context.client_ip())?;
    write_time(outp, now)?;
    let len = {
        // Total HACK to get at the response body length, since those
        // fields are private and there are no accessors, we have to
        // become drastic:
        let mut responsebody = ResponseBody::empty();
        swap(&mut responsebody, &mut aresponse.response.data);
        let (data, length) = responsebody.into_reader_and_size();
        let len = length.clone();
        responsebody =
            if let Some(len) = length {
                ResponseBody::from_reader_and_size(data, len)
            } else {
                ResponseBody::from_reader(data)
            };
        swap(&mut responsebody, &mut aresponse.response.data);
        len
    };
    writeln!(outp, "] {:?} {} {} {:?} {:?} {duration:?}",
             context.request_line(),
             aresponse.response.status_code,
             len.unwrap_or(0), // XX hack, is missing headers and compression and missing at all
             context.referer().unwrap_or("-"),
             context.user_agent().unwrap_or("-")
    )?;
    outp.flush()?;
    Ok(())
}

/// Write to error.log
fn write_error(
    outp: &mut impl Write,
    context: &AContext,
    duration: Duration,
    err: anyhow::Error,
) -> Result<()> {
    let now = SystemTime::now();
    write!(outp, "[")?;
    write_time(outp, now)?;
    writeln!(outp, "] [error] [client {}] {:?} {duration:?}: {err:#}",
             context.client_ip(),
             context.request_line())?;
    outp.flush()?;
    Ok(())
}

/// Panic log to stderr. Panics on errors logging to stderr.
fn write_panic_stderr(
    context: &AContext,
    duration: Duration
) {
    (|| -> std::io::Result<()> {
        let mut outp = BufWriter::new(stderr().lock());
        // We need to feed stderr to a service like daemontools
        // anyway, hence don't print timestamps.
        writeln!(&mut outp, "[panic] handling {:?} after {duration:?}",
                 context.request_line())?;
        outp.flush()?;
        Ok(())
    })().expect("stderr always writable");
}

fn open_log_output(path: String) -> Result<Box<dyn Write + Send + Sync>> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(Path::new(&path))
        .with_context(|| format!("opening log file {path:?}"))?;
    Ok(Box::new(BufWriter::new(file)))
}

/// The log files to write to, access_log for served requests, error
/// log for requests whose handler errored. Buffered; the code calls
/// flush once per entry.
pub struct Logs {
    pub access_log: Box<dyn Write + Send + Sync>,
    pub error_log: Box<dyn Write + Send + Sync>,
}

impl Logs {
    pub fn open_in_basedir(
        logbasedir: &str,
        is_https: bool
    ) -> Result<Arc<Mutex<Logs>>>
    {
        let s = if is_https { "s" } else { "" };
        Ok(Arc::new(Mutex::new(Logs {
            access_log: open_log_output(
                format!("{logbasedir}/http{s}_access.log"))?,
            error_log: open_log_output(
                format!("{logbasedir}/http{s}_error.log"))?,
        })))
    }
}

// rouille::log_custom does not fit here: the logs and the possible
// Error result only exist inside the handler, but log_custom wants
// them up front. Thus, copy and adapt its panic-catching shape.

pub fn log_combined<F>(
    context: &AContext,
    handler: F
) -> AResponse
where
    F: FnOnce() -> (Arc<Mutex<Logs>>, anyhow::Result<AResponse>),
{
    let start_instant = Instant::now();

    // Call the handler and catch panics.
    // Note that we always resume unwinding afterwards.
    let result = panic::catch_unwind(panic::AssertUnwindSafe(handler));
    let elapsed = start_instant.elapsed();

    match result {
        Ok((logs, result)) => match result {
            Ok(mut response) => {
                {
                    let mut _logs = logs.lock().expect(
                        "if `write` panics then we are lost anyway");
                    match write_combined(&mut _logs.access_log, context,
                                         elapsed, &mut response)
                    {
                        Ok(()) => (),
                        Err(e) => warn!("could not write to access log: {e:#}")
                    }
                }
                response
            }
            Err(err) => {
                {
                    let mut _logs = logs.lock().expect(
                        "if `write` panics then we are lost anyway");
                    match write_error(&mut _logs.error_log, context,
                                      elapsed, err) {
                        Ok(()) => (),
                        Err(e) => warn!("could not write to error log: {e:#}")
                    }
                }
                errorpage_from_status(
                    HttpResponseStatusCode::InternalServerError500)
                    .into()
            }
        },
        Err(payload) => {
            write_panic_stderr(context, elapsed);
            // The panic handler will print the payload contents
            panic::resume_unwind(payload);
        }
    }
}
