use crate::logging::{LogRecord, best_effort};
use crate::ports::Logger;
use serde_json::{Map, Value};
use std::net::IpAddr;
use std::sync::Arc;

/// The parts of an inbound HTTP request the observer reports on
#[derive(Debug, Clone, Copy)]
pub struct ObservedRequest<'a> {
    pub method: &'a str,
    /// Path including the query string, as received
    pub path: &'a str,
    pub client_addr: Option<IpAddr>,
    pub body: &'a [u8],
}

/// Logs every inbound request, then always hands control downstream
#[derive(Clone)]
pub struct RequestObserver {
    logger: Arc<dyn Logger>,
}

impl RequestObserver {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }

    /// Log `request` and invoke `proceed` exactly once, returning its output.
    ///
    /// Logging failures are absorbed; they never keep `proceed` from running.
    pub fn observe<R, F>(&self, request: &ObservedRequest<'_>, proceed: F) -> R
    where
        F: FnOnce() -> R,
    {
        best_effort(|| {
            self.logger.info(LogRecord::new(format!(
                "{} {} from IP {}",
                request.method,
                request.path,
                client_ip(request.client_addr)
            )))
        });
        best_effort(|| {
            self.logger.debug(
                LogRecord::new("The request payload was").with_payload(body_payload(request.body)),
            )
        });

        proceed()
    }
}

impl std::fmt::Debug for RequestObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestObserver").finish_non_exhaustive()
    }
}

fn client_ip(addr: Option<IpAddr>) -> String {
    match addr {
        Some(ip) => ip.to_canonical().to_string(),
        None => "unknown".to_string(),
    }
}

// An absent body reads as an empty JSON object
fn body_payload(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Object(Map::new());
    }

    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}
