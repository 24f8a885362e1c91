use crate::connection::WSConnection;
use crate::error::Error;
use crate::room::Envelope;
use futures::Stream;
use rand::random;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;

pub type ID = Uuid;

// Used for generating a new UUID, every time a new client connects the server
pub(crate) fn generate_new_uuid() -> Uuid {
    let buf: [u8; 16] = random();
    Uuid::new_v8(buf)
}

/// The closed set of notifications a connection delivers to the application.
/// Handlers subscribe by polling the connection as a `Stream` instead of
/// registering callbacks by name.
#[derive(Debug)]
pub enum Event {
    /// The connection reached the open state and frames can flow.
    Open,
    /// Client side only: the server's accept token matched the expected one.
    Handshake,
    /// A Text frame arrived; the payload is already classified as an envelope.
    Message(Envelope),
    /// A raw chunk as delivered by the socket, before frame decoding.
    RawData(Vec<u8>),
    /// A Ping frame arrived; the Pong reply has already been queued.
    Ping,
    Pong,
    /// Terminal event; the keepalive timer is cancelled and the socket released.
    Close,
    /// A stream failure, always followed by `Close`.
    Error(Error),
}

/// Server-side event surface: one event per accepted peer, carrying the
/// connection handle for the application to drive.
pub enum ServerEvent {
    Connection(ID, WSConnection),
}

pub struct EventStream {
    receiver: UnboundedReceiverStream<Event>,
}

impl EventStream {
    pub(crate) fn new(receiver: UnboundedReceiver<Event>) -> Self {
        Self {
            receiver: UnboundedReceiverStream::new(receiver),
        }
    }
}

impl Stream for EventStream {
    type Item = Event;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        Pin::new(&mut this.receiver).poll_next(cx)
    }
}

pub struct ServerEventStream {
    receiver: UnboundedReceiverStream<ServerEvent>,
}

impl ServerEventStream {
    pub(crate) fn new(receiver: UnboundedReceiver<ServerEvent>) -> Self {
        Self {
            receiver: UnboundedReceiverStream::new(receiver),
        }
    }
}

impl Stream for ServerEventStream {
    type Item = ServerEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        Pin::new(&mut this.receiver).poll_next(cx)
    }
}
