use crate::error::Error;
use crate::event::{Event, EventStream};
use crate::frame::Frame;
use crate::split::WSWriter;
use futures::Stream;
use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Server,
}

/// Connection lifecycle. Transitions only ever move forward and `Closed` is
/// terminal, so a late socket event can't resurrect a finished connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    Idle = 0,
    HandshakeInProgress = 1,
    Open = 2,
    Closing = 3,
    Closed = 4,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ConnectionState::Idle,
            1 => ConnectionState::HandshakeInProgress,
            2 => ConnectionState::Open,
            3 => ConnectionState::Closing,
            _ => ConnectionState::Closed,
        }
    }
}

/// State shared between the API handle and the two IO tasks. An atomic is
/// enough because handlers run to completion and only ever push the state
/// forward.
#[derive(Debug, Clone)]
pub(crate) struct StateCell(Arc<AtomicU8>);

impl StateCell {
    pub fn new() -> Self {
        Self(Arc::new(AtomicU8::new(ConnectionState::Idle as u8)))
    }

    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Moves to `next` if that is a forward transition, and reports whether
    /// anything changed. Calls against a `Closed` cell are no-ops.
    pub fn transition(&self, next: ConnectionState) -> bool {
        let mut current = self.0.load(Ordering::Acquire);
        loop {
            if next as u8 <= current {
                return false;
            }
            match self
                .0
                .compare_exchange(current, next as u8, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }
}

/// One WebSocket connection: the send half plus the event surface, tied to
/// exactly one TCP socket. Dropping the connection (and every writer clone)
/// closes the socket, and the socket closing finishes the event stream.
pub struct WSConnection {
    writer: WSWriter,
    events: EventStream,
    state: StateCell,
    role: Role,
}

impl WSConnection {
    pub(crate) fn new(writer: WSWriter, events: EventStream, state: StateCell, role: Role) -> Self {
        Self {
            writer,
            events,
            state,
            role,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// A clonable send half, for registries that fan broadcasts out to other
    /// connections in the same room.
    pub fn writer(&self) -> WSWriter {
        self.writer.clone()
    }

    pub fn send(&self, msg: &str) -> Result<(), Error> {
        self.writer.send(msg)
    }

    pub fn broadcast(&self, msg: &str) -> Result<(), Error> {
        self.writer.broadcast(msg)
    }

    pub fn broadcast_to(&self, msg: &str, room: &str) -> Result<(), Error> {
        self.writer.broadcast_to(msg, room)
    }

    pub fn join(&self, room: &str) -> Result<(), Error> {
        self.writer.join(room)
    }

    pub fn send_ping(&self) -> Result<(), Error> {
        self.writer.send_ping()
    }

    pub fn send_frame(&self, frame: Frame) -> Result<(), Error> {
        self.writer.send_frame(frame)
    }

    /// Initiates the close: the keepalive timer is cancelled, both stream
    /// tasks wind down and the socket is released before `Close` is emitted.
    pub fn close(&self) {
        self.writer.close()
    }

    pub fn split(self) -> (WSWriter, EventStream) {
        (self.writer, self.events)
    }
}

impl Stream for WSConnection {
    type Item = Event;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        Pin::new(&mut this.events).poll_next(cx)
    }
}
