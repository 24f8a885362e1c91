use crate::error::Error;
use crate::frame::{encode_frame, Frame};
use tokio::io::{AsyncWriteExt, WriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::watch;

/// Outbound half of a connection: drains the frame channel in order and
/// writes encoded frames to the socket. Application sends, pong replies and
/// keepalive pings all arrive on the same channel, so wire order matches
/// queue order.
pub(crate) struct WriteStream {
    write_half: WriteHalf<TcpStream>,
    frame_rx: UnboundedReceiver<Frame>,
    shutdown_rx: watch::Receiver<bool>,
}

impl WriteStream {
    pub fn new(
        write_half: WriteHalf<TcpStream>,
        frame_rx: UnboundedReceiver<Frame>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            write_half,
            frame_rx,
            shutdown_rx,
        }
    }

    pub async fn run(&mut self) -> Result<(), Error> {
        loop {
            tokio::select! {
                frame = self.frame_rx.recv() => {
                    match frame {
                        Some(frame) => self.write_frame(frame).await?,
                        // All senders gone: the connection handle and read
                        // task are finished with us.
                        None => break,
                    }
                }
                changed = self.shutdown_rx.changed() => {
                    // Flag flipped, or the read loop dropped its sender.
                    // Frames accepted before the close signal are already in
                    // the channel; they must reach the wire before the FIN.
                    let _ = changed;
                    while let Ok(frame) = self.frame_rx.try_recv() {
                        self.write_frame(frame).await?;
                    }
                    break;
                }
            }
        }

        // Send FIN so the peer observes the close instead of a dangling
        // half-open socket.
        let _ = self.write_half.shutdown().await;
        Ok(())
    }

    async fn write_frame(&mut self, frame: Frame) -> Result<(), Error> {
        let wire = encode_frame(&frame)?;
        self.write_half.write_all(&wire).await?;
        Ok(())
    }
}
