use crate::connection::{ConnectionState, StateCell};
use crate::error::Error;
use crate::event::Event;
use crate::frame::{decode_frame, Frame, OpCode};
use crate::keepalive::KeepAliveHandle;
use crate::room::Envelope;
use bytes::BytesMut;
use log::warn;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;

/// Inbound half of a connection: accumulates socket bytes, decodes frames and
/// dispatches them into events. It owns the keepalive handle so that every
/// exit path, clean or not, runs through the same shutdown.
pub(crate) struct ReadStream<R: AsyncReadExt + Unpin> {
    read: R,
    buffer: BytesMut,
    event_tx: UnboundedSender<Event>,
    frame_tx: UnboundedSender<Frame>,
    close_rx: UnboundedReceiver<()>,
    shutdown_tx: watch::Sender<bool>,
    keep_alive: KeepAliveHandle,
    state: StateCell,
}

impl<R: AsyncReadExt + Unpin> ReadStream<R> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        read: R,
        leftover: BytesMut,
        event_tx: UnboundedSender<Event>,
        frame_tx: UnboundedSender<Frame>,
        close_rx: UnboundedReceiver<()>,
        shutdown_tx: watch::Sender<bool>,
        keep_alive: KeepAliveHandle,
        state: StateCell,
    ) -> Self {
        Self {
            read,
            // Bytes the handshake read past the header terminator seed the
            // frame buffer, so a frame coalesced with the upgrade response
            // isn't lost.
            buffer: leftover,
            event_tx,
            frame_tx,
            close_rx,
            shutdown_tx,
            keep_alive,
            state,
        }
    }

    /// Runs until the peer closes, the application asks to close, or the
    /// stream errors. Errors are surfaced as an `Error` event rather than
    /// propagated, and `Close` is always the last event.
    pub async fn poll_events(&mut self) {
        if let Err(err) = self.run().await {
            warn!("read stream terminated: {}", err);
            let _ = self.event_tx.send(Event::Error(err));
        }
        self.shutdown();
    }

    async fn run(&mut self) -> Result<(), Error> {
        // Bytes that rode in with the handshake response are still inbound
        // socket data and get the same raw notification as any later read.
        if !self.buffer.is_empty() {
            let _ = self.event_tx.send(Event::RawData(self.buffer.to_vec()));
        }

        loop {
            // Drain every complete frame before reading again; one read may
            // carry several frames, or only part of one.
            while let Some(frame) = decode_frame(&mut self.buffer)? {
                self.dispatch(frame)?;
            }

            let before = self.buffer.len();
            tokio::select! {
                signal = self.close_rx.recv() => {
                    // None means every API handle was dropped; either way we
                    // stop reading.
                    let _ = signal;
                    return Ok(());
                }
                result = self.read.read_buf(&mut self.buffer) => {
                    if result? == 0 {
                        // Peer EOF
                        return Ok(());
                    }
                    let _ = self.event_tx.send(Event::RawData(self.buffer[before..].to_vec()));
                }
            }
        }
    }

    fn dispatch(&mut self, frame: Frame) -> Result<(), Error> {
        match frame.opcode {
            OpCode::Text => {
                let text = String::from_utf8(frame.payload)?;
                let _ = self.event_tx.send(Event::Message(Envelope::parse(&text)));
            }
            OpCode::Ping => {
                self.frame_tx
                    .send(Frame::pong())
                    .map_err(|_| Error::CommunicationError)?;
                let _ = self.event_tx.send(Event::Ping);
            }
            OpCode::Pong => {
                // No liveness bookkeeping: a missed pong never disconnects.
                let _ = self.event_tx.send(Event::Pong);
            }
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        self.keep_alive.cancel();
        // Tells the write task to flush out and FIN the socket.
        let _ = self.shutdown_tx.send(true);
        self.state.transition(ConnectionState::Closed);
        let _ = self.event_tx.send(Event::Close);
    }
}
