//! Bounded record channel between a fetcher and an analyzer
//!
//! The channel carries record batches (remote pages) or single records (bulk
//! rows) and one terminal [`Message::End`] marker. It is a thin wrapper over
//! a bounded tokio `mpsc` channel:
//!
//! - `put_*` suspends while the channel is full (backpressure)
//! - [`ChannelReceiver::get`] suspends while it is empty
//! - the end marker can only be posted through [`ChannelSender::finish`],
//!   which consumes the sender, so it is posted at most once and nothing can
//!   follow it
//!
//! Dropping the sender without finishing closes the channel; the receiver
//! then sees `None` instead of `End`, which is how an aborted fetch shows up
//! on the consumer side.

use crate::domain::{LoglensError, Record, Result};
use tokio::sync::mpsc;

/// Item travelling through the channel
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Records from one remote page, in page order
    Batch(Vec<Record>),

    /// A single record from a bulk source
    Record(Record),

    /// End of stream: no more data will arrive
    End,
}

/// Creates a bounded channel holding at most `capacity` messages
///
/// A capacity of zero is raised to one.
pub fn bounded(capacity: usize) -> (ChannelSender, ChannelReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        ChannelSender { tx },
        ChannelReceiver {
            rx,
            finished: false,
        },
    )
}

/// Producer half of the record channel
///
/// Not `Clone`: concurrent fetch tasks borrow one sender, and only its owner
/// can post the end marker.
#[derive(Debug)]
pub struct ChannelSender {
    tx: mpsc::Sender<Message>,
}

impl ChannelSender {
    /// Enqueues a page of records
    pub async fn put_batch(&self, batch: Vec<Record>) -> Result<()> {
        self.send(Message::Batch(batch)).await
    }

    /// Enqueues a single record
    pub async fn put_record(&self, record: Record) -> Result<()> {
        self.send(Message::Record(record)).await
    }

    /// Posts the end marker and closes the channel
    pub async fn finish(self) -> Result<()> {
        self.send(Message::End).await
    }

    /// Blocking variant of [`put_record`](Self::put_record) for use on
    /// blocking threads (`spawn_blocking`). Panics if called from an async
    /// context, like `mpsc::Sender::blocking_send`.
    pub fn blocking_put_record(&self, record: Record) -> Result<()> {
        self.tx
            .blocking_send(Message::Record(record))
            .map_err(|_| receiver_gone())
    }

    /// Blocking variant of [`finish`](Self::finish)
    pub fn blocking_finish(self) -> Result<()> {
        self.tx.blocking_send(Message::End).map_err(|_| receiver_gone())
    }

    /// Number of messages that can be enqueued before `put` suspends
    pub fn available(&self) -> usize {
        self.tx.capacity()
    }

    async fn send(&self, message: Message) -> Result<()> {
        self.tx.send(message).await.map_err(|_| receiver_gone())
    }
}

fn receiver_gone() -> LoglensError {
    LoglensError::ChannelClosed("analyzer stopped receiving records".to_string())
}

/// Consumer half of the record channel
#[derive(Debug)]
pub struct ChannelReceiver {
    rx: mpsc::Receiver<Message>,
    finished: bool,
}

impl ChannelReceiver {
    /// Dequeues the next message
    ///
    /// Returns `Some(Message::End)` exactly once on a finished stream and
    /// `None` afterwards. Returns `None` without an `End` if the sender was
    /// dropped before finishing.
    pub async fn get(&mut self) -> Option<Message> {
        if self.finished {
            return None;
        }
        let message = self.rx.recv().await;
        if matches!(message, Some(Message::End)) {
            self.finished = true;
            self.rx.close();
        }
        message
    }

    /// Whether the end marker has been received
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
