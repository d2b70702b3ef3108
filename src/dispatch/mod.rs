//! Webhook dispatch: verify → decode → per text event search, render, reply.
//!
//! Verification and decoding failures reject the whole call. Everything after
//! that is best-effort per event: a failed search or reply is logged and
//! counted, and the remaining events are still handled.

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::errors::{ShopcrabError, ShopcrabResult};
use crate::line::{Event, MessageEvent, ReplySender, build, decode, verify};
use crate::rakuten::{DEFAULT_HITS, ProductSearch};

/// One inbound webhook call, borrowed for the duration of the dispatch.
#[derive(Debug, Clone, Copy)]
pub struct InboundPayload<'a> {
    pub body: &'a [u8],
    /// Value of `X-Line-Signature`, if the header was present.
    pub signature: Option<&'a str>,
}

/// Per-event tallies for an acknowledged call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    /// Text events that got a reply.
    pub handled: usize,
    /// Events skipped on purpose (non-message, non-text, console verification).
    pub filtered: usize,
    /// Text events whose search, render or reply failed.
    pub failed: usize,
}

pub struct Dispatcher {
    channel_secret: String,
    search: Arc<dyn ProductSearch>,
    replier: Arc<dyn ReplySender>,
}

impl Dispatcher {
    pub fn new(
        channel_secret: impl Into<String>,
        search: Arc<dyn ProductSearch>,
        replier: Arc<dyn ReplySender>,
    ) -> Self {
        Self {
            channel_secret: channel_secret.into(),
            search,
            replier,
        }
    }

    /// Run one webhook call to completion.
    ///
    /// Returns `Authentication` or `Decode` errors before any event is touched;
    /// otherwise always returns a report, whatever happened to individual events.
    pub async fn dispatch(
        &self,
        request_id: &str,
        payload: InboundPayload<'_>,
    ) -> ShopcrabResult<DispatchReport> {
        let Some(signature) = payload.signature.filter(|s| !s.is_empty()) else {
            return Err(ShopcrabError::Authentication(
                "missing X-Line-Signature header".into(),
            ));
        };
        if !verify(payload.body, signature, &self.channel_secret) {
            return Err(ShopcrabError::Authentication("signature mismatch".into()));
        }

        let events = decode(payload.body)?;
        debug!("{}: {} event(s) decoded", request_id, events.len());

        let mut report = DispatchReport::default();
        let mut pending = Vec::new();
        for event in events {
            match event {
                Event::Message(msg) if msg.is_verification() => {
                    debug!("{}: skipping console verification event", request_id);
                    report.filtered += 1;
                }
                Event::Message(msg) if msg.text().is_some() => {
                    pending.push(self.handle_text(request_id, msg));
                }
                Event::Message(msg) => {
                    debug!(
                        "{}: ignoring non-text message ({:?})",
                        request_id, msg.message
                    );
                    report.filtered += 1;
                }
                Event::Other { kind } => {
                    debug!("{}: ignoring {} event", request_id, kind);
                    report.filtered += 1;
                }
            }
        }

        for outcome in join_all(pending).await {
            match outcome {
                Ok(()) => report.handled += 1,
                Err(_) => report.failed += 1,
            }
        }

        info!(
            "{}: acknowledged (handled={}, filtered={}, failed={})",
            request_id, report.handled, report.filtered, report.failed
        );
        Ok(report)
    }

    /// Search, render and reply for one text message. Errors are logged here;
    /// the caller only counts them.
    async fn handle_text(&self, request_id: &str, event: MessageEvent) -> ShopcrabResult<()> {
        let event_id = event.webhook_event_id.as_deref().unwrap_or("-");
        let Some(keyword) = event.text() else {
            return Ok(());
        };
        if event.is_redelivery {
            debug!("{}: event {} is a redelivery", request_id, event_id);
        }

        let result = async {
            let items = self.search.search(keyword, DEFAULT_HITS).await?;
            debug!(
                "{}: event {} found {} product(s)",
                request_id,
                event_id,
                items.len()
            );
            let reply = build(&items);
            self.replier.send_reply(&event.reply_token, &[reply]).await
        }
        .await;

        if let Err(ref e) = result {
            warn!(
                "{}: event {} dropped (retryable={}): {}",
                request_id,
                event_id,
                e.is_retryable(),
                e
            );
        }
        result
    }
}
