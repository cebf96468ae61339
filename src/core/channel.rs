use crate::errors::ChannelError;
use crossbeam_channel::{bounded, Receiver, SelectedOperation, Sender};
use std::sync::atomic::{AtomicBool, Ordering};

/// What travels on a channel: a payload item or the end-of-stream marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message<T> {
    Data(T),
    EndOfStream,
}

impl<T> Message<T> {
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Message::EndOfStream)
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Message::Data(item) => Some(item),
            Message::EndOfStream => None,
        }
    }
}

/// Bounded FIFO edge between one producer and one consumer.
///
/// Both ends live in the same value: the topology owns the channel and nodes
/// only borrow it while a run is in progress. Capacity 0 is a rendezvous.
pub struct Channel<T> {
    capacity: usize,
    tx: Sender<Message<T>>,
    rx: Receiver<Message<T>>,
    closed: AtomicBool,
    drained: AtomicBool,
}

impl<T> Channel<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        Self {
            capacity,
            tx,
            rx,
            closed: AtomicBool::new(false),
            drained: AtomicBool::new(false),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of messages currently buffered, end marker included
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// True once the consumer has popped the end marker
    pub fn is_drained(&self) -> bool {
        self.drained.load(Ordering::Acquire)
    }

    /// Blocks while the buffer is full
    pub fn push(&self, item: T) -> Result<(), ChannelError> {
        if self.is_closed() {
            return Err(ChannelError::Closed);
        }
        self.tx
            .send(Message::Data(item))
            .map_err(|_| ChannelError::Disconnected)
    }

    /// Enqueue the end marker. Closing twice is a no-op.
    pub fn close(&self) -> Result<(), ChannelError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.tx
            .send(Message::EndOfStream)
            .map_err(|_| ChannelError::Disconnected)
    }

    /// Blocks while the buffer is empty. After the end marker has been popped
    /// once, returns it again without blocking.
    pub fn pop(&self) -> Message<T> {
        if self.is_drained() {
            return Message::EndOfStream;
        }
        let message = self.rx.recv().unwrap_or(Message::EndOfStream);
        self.observe(message)
    }

    pub fn try_pop(&self) -> Option<Message<T>> {
        if self.is_drained() {
            return Some(Message::EndOfStream);
        }
        self.rx.try_recv().ok().map(|message| self.observe(message))
    }

    pub(crate) fn receiver(&self) -> &Receiver<Message<T>> {
        &self.rx
    }

    /// Finish a receive selected through `crossbeam_channel::Select`
    pub(crate) fn complete(&self, oper: SelectedOperation<'_>) -> Message<T> {
        let message = oper.recv(&self.rx).unwrap_or(Message::EndOfStream);
        self.observe(message)
    }

    /// Prepare for another run: clears the markers and anything left behind
    pub(crate) fn reset(&self) -> usize {
        let mut stale = 0;
        while self.rx.try_recv().is_ok() {
            stale += 1;
        }
        self.closed.store(false, Ordering::Release);
        self.drained.store(false, Ordering::Release);
        stale
    }

    fn observe(&self, message: Message<T>) -> Message<T> {
        if message.is_end_of_stream() {
            self.drained.store(true, Ordering::Release);
        }
        message
    }
}

impl<T> std::fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("closed", &self.is_closed())
            .field("drained", &self.is_drained())
            .finish()
    }
}
