use futures::StreamExt;
use log::*;
use socket_lite::config::ServerOptions;
use socket_lite::event::{Event, ServerEvent};
use socket_lite::server::WSServer;

#[tokio::main]
async fn main() {
    env_logger::init();

    let options = ServerOptions {
        port: 9002,
        ..Default::default()
    };
    let server = WSServer::bind(options).await.expect("Can't listen");
    let mut events = server.run();

    while let Some(ServerEvent::Connection(id, mut connection)) = events.next().await {
        info!("peer {} connected", id);

        tokio::spawn(async move {
            while let Some(event) = connection.next().await {
                match event {
                    Event::Message(envelope) => {
                        if let Some(msg) = envelope.msg() {
                            if connection.send(msg).is_err() {
                                error!("failed to send message");
                                break;
                            }
                        }
                    }
                    Event::Close => {
                        info!("peer {} disconnected", id);
                        break;
                    }
                    Event::Error(err) => error!("received error from the stream: {}", err),
                    _ => {}
                }
            }
        });
    }
}
