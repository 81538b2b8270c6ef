//! Response processor
//!
//! Classifies the final status, dispatches the pages to the receiver and
//! runs the secondary processors.

use crate::context::{Receiver, RequestContext, ResponseProcessor, StatusChecker};
use crate::error::{Error, Result};
use crate::pagination::Pages;
use reqwest::StatusCode;
use tracing::{debug, warn};

/// Outcome of the primary path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Status accepted by the checker, receiver skipped
    Accepted,
    /// Status outside 2xx
    Rejected,
    /// Pages handed to the receiver
    Received,
}

/// Check if a status falls outside the 2xx success range
pub fn is_error_code(status: StatusCode) -> bool {
    !status.is_success()
}

/// The processing half of a [`RequestContext`]
pub struct ResponseHandler<'a> {
    status_checker: StatusChecker,
    receiver: Receiver<'a>,
    processors: Vec<ResponseProcessor<'a>>,
}

impl<'a> ResponseHandler<'a> {
    pub fn new(
        status_checker: StatusChecker,
        receiver: Receiver<'a>,
        processors: Vec<ResponseProcessor<'a>>,
    ) -> Self {
        Self {
            status_checker,
            receiver,
            processors,
        }
    }

    /// Take the checker, receiver and processors out of a context
    pub fn from_context(ctx: RequestContext<'a>) -> Self {
        Self::new(ctx.status_checker, ctx.receiver, ctx.response_processors)
    }

    /// Process the pages of a finished call
    ///
    /// Secondary processors run whatever the primary outcome; a primary
    /// failure takes precedence over theirs.
    pub fn process(self, pages: &Pages) -> Result<Disposition> {
        let primary = primary(&self.status_checker, self.receiver, pages);

        let messages: Vec<String> = self
            .processors
            .into_iter()
            .filter_map(|processor| processor(&pages.last).err())
            .map(|e| e.to_string())
            .collect();

        let disposition = primary?;
        if !messages.is_empty() {
            warn!("{} response processor(s) failed", messages.len());
            return Err(Error::ResponseProcessors { messages });
        }
        Ok(disposition)
    }
}

fn primary(checker: &StatusChecker, receiver: Receiver<'_>, pages: &Pages) -> Result<Disposition> {
    let status = pages.last.status;

    if checker(status) {
        debug!("Status {} accepted without decoding", status.as_u16());
        return Ok(Disposition::Accepted);
    }

    if is_error_code(status) {
        let body = pages
            .bodies
            .first()
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .unwrap_or_default();
        return Err(Error::http_status(status.as_u16(), body));
    }

    receiver(&pages.bodies)?;
    Ok(Disposition::Received)
}
