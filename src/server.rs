use crate::config::ServerOptions;
use crate::error::Error;
use crate::event::{generate_new_uuid, ServerEvent, ServerEventStream};
use crate::handshake::accept_async_with_options;
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::mpsc::unbounded_channel;

/// Accept loop wrapper: binds a listener and hands every successfully
/// upgraded peer to the application as a `ServerEvent::Connection`. A failed
/// handshake is logged and never stops the loop, so one bad peer can't take
/// the server down.
pub struct WSServer {
    listener: TcpListener,
    options: ServerOptions,
}

impl WSServer {
    pub async fn bind(options: ServerOptions) -> Result<Self, Error> {
        let listener = TcpListener::bind(("0.0.0.0", options.port)).await?;
        info!("listening on {}", listener.local_addr()?);
        Ok(Self { listener, options })
    }

    /// The actual bound address; useful when the configured port is 0.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    pub fn run(self) -> ServerEventStream {
        let (event_tx, event_rx) = unbounded_channel();

        tokio::spawn(async move {
            loop {
                let (stream, peer) = match self.listener.accept().await {
                    Ok(accepted) => accepted,
                    Err(err) => {
                        error!("accept failed: {}", err);
                        break;
                    }
                };
                debug!("accepted TCP connection from {}", peer);

                let event_tx = event_tx.clone();
                let options = self.options.clone();
                tokio::spawn(async move {
                    match accept_async_with_options(stream, options).await {
                        Ok(connection) => {
                            let id = generate_new_uuid();
                            if event_tx.send(ServerEvent::Connection(id, connection)).is_err() {
                                debug!("server event stream dropped, discarding {}", peer);
                            }
                        }
                        Err(err) => warn!("handshake with {} failed: {}", peer, err),
                    }
                });
            }
        });

        ServerEventStream::new(event_rx)
    }
}
