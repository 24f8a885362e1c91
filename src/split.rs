use crate::connection::{ConnectionState, StateCell};
use crate::error::Error;
use crate::frame::{Frame, MAX_PAYLOAD_SIZE};
use crate::room::{Envelope, DEFAULT_ROOM};
use tokio::sync::mpsc::UnboundedSender;

/// Clonable send half of a connection. All methods are synchronous: frames
/// are queued on the outbound channel and the write task drains them in
/// order, so a registry can hold many of these without locking.
#[derive(Clone)]
pub struct WSWriter {
    frame_tx: UnboundedSender<Frame>,
    close_tx: UnboundedSender<()>,
    state: StateCell,
}

impl WSWriter {
    pub(crate) fn new(
        frame_tx: UnboundedSender<Frame>,
        close_tx: UnboundedSender<()>,
        state: StateCell,
    ) -> Self {
        Self {
            frame_tx,
            close_tx,
            state,
        }
    }

    /// Sends a message, wrapping it as `{"msg": ...}` unless it is already
    /// well-formed JSON.
    pub fn send(&self, msg: &str) -> Result<(), Error> {
        self.send_envelope(&Envelope::wrap(msg))
    }

    /// Broadcasts to the default room, `"all"`.
    pub fn broadcast(&self, msg: &str) -> Result<(), Error> {
        self.broadcast_to(msg, DEFAULT_ROOM)
    }

    pub fn broadcast_to(&self, msg: &str, room: &str) -> Result<(), Error> {
        self.send_envelope(&Envelope::broadcast(msg, room))
    }

    pub fn join(&self, room: &str) -> Result<(), Error> {
        self.send_envelope(&Envelope::join(room))
    }

    pub fn send_envelope(&self, envelope: &Envelope) -> Result<(), Error> {
        self.send_frame(Frame::text(envelope.to_payload().into_bytes()))
    }

    pub fn send_ping(&self) -> Result<(), Error> {
        self.send_frame(Frame::ping())
    }

    /// Queues a frame for the write task. Oversized payloads are rejected
    /// here, before anything reaches the socket.
    pub fn send_frame(&self, frame: Frame) -> Result<(), Error> {
        if frame.payload.len() > MAX_PAYLOAD_SIZE {
            return Err(Error::FrameTooLarge(frame.payload.len()));
        }
        if self.state.get() != ConnectionState::Open {
            return Err(Error::ConnectionClosed);
        }
        self.frame_tx
            .send(frame)
            .map_err(|_| Error::CommunicationError)
    }

    /// Signals the read loop to shut the connection down. Safe to call more
    /// than once; only the first call moves the state to `Closing`.
    pub fn close(&self) {
        if self.state.transition(ConnectionState::Closing) {
            let _ = self.close_tx.send(());
        }
    }
}
