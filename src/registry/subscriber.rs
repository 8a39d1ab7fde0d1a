//! Subscriber connection
//!
//! One long-lived push stream. The registry holds the sending half; the
//! HTTP response body owns the receiving half (`EventStream`). When the
//! client goes away the body is dropped, which closes the channel and makes
//! every further `send` fail.

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::task::{Context, Poll};

use bytes::Bytes;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_stream::Stream;
use tokio_util::sync::CancellationToken;

use super::error::DeliveryError;
use super::frame::encode_event;

/// Opaque identity of a registered subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value, for logging
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sending side of a push stream
pub struct SubscriberConnection {
    id: SubscriberId,

    /// Outbound frames; `None` once closed
    tx: Mutex<Option<mpsc::Sender<Bytes>>>,

    /// Cleared on close, before the sender is released
    alive: AtomicBool,

    /// Fired by `close` so `closed()` waiters release their sender clones
    closing: CancellationToken,
}

impl SubscriberConnection {
    /// Create a connection and the stream that carries its frames
    pub fn new(id: SubscriberId, capacity: usize) -> (Self, EventStream) {
        let (tx, rx) = mpsc::channel(capacity.max(1));

        let connection = Self {
            id,
            tx: Mutex::new(Some(tx)),
            alive: AtomicBool::new(true),
            closing: CancellationToken::new(),
        };

        (connection, EventStream { rx })
    }

    /// Identity used for registration and removal
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Whether the connection is still open
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Frame `line` as one push event and queue it for the client
    pub fn send(&self, line: &str) -> Result<(), DeliveryError> {
        self.send_frame(encode_event(line))
    }

    /// Queue an already framed event
    ///
    /// Never waits: a full buffer is reported as [`DeliveryError::Full`].
    pub fn send_frame(&self, frame: Bytes) -> Result<(), DeliveryError> {
        if !self.is_alive() {
            return Err(DeliveryError::Closed);
        }

        let guard = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(tx) = guard.as_ref() else {
            return Err(DeliveryError::Closed);
        };

        match tx.try_send(frame) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(DeliveryError::Full),
            Err(TrySendError::Closed(_)) => Err(DeliveryError::Closed),
        }
    }

    /// Release the transport. Idempotent.
    ///
    /// Dropping the sender ends the client's `EventStream`, which finishes
    /// the HTTP response.
    pub fn close(&self) {
        if !self.alive.swap(false, Ordering::AcqRel) {
            return;
        }

        self.closing.cancel();
        self.tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        tracing::trace!(subscriber = %self.id, "Subscriber transport closed");
    }

    /// Wait until the transport is gone
    ///
    /// Resolves when the client side drops its stream or when `close` is
    /// called locally. Does not poll.
    pub async fn closed(&self) {
        let tx = self
            .tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let Some(tx) = tx else {
            return;
        };

        tokio::select! {
            _ = tx.closed() => {}
            _ = self.closing.cancelled() => {}
        }
    }
}

impl std::fmt::Debug for SubscriberConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberConnection")
            .field("id", &self.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// Receiving side of a push stream, used as a streaming response body
#[derive(Debug)]
pub struct EventStream {
    rx: mpsc::Receiver<Bytes>,
}

impl EventStream {
    /// Next framed event, or `None` once the connection is closed
    pub async fn next_event(&mut self) -> Option<Bytes> {
        self.rx.recv().await
    }

    /// Next queued event without waiting
    pub fn try_next_event(&mut self) -> Option<Bytes> {
        self.rx.try_recv().ok()
    }
}

impl Stream for EventStream {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx).map(|frame| frame.map(Ok))
    }
}
