use futures::StreamExt;
use log::*;
use socket_lite::config::ClientOptions;
use socket_lite::event::Event;
use socket_lite::handshake::connect_async_with_options;
use std::time::Duration;

#[tokio::main]
async fn main() {
    env_logger::init();

    let options = ClientOptions {
        port: 9002,
        keep_alive: Duration::from_secs(10),
        ..Default::default()
    };
    let mut connection = connect_async_with_options("127.0.0.1", options)
        .await
        .expect("handshake failed");

    while let Some(event) = connection.next().await {
        match event {
            Event::Handshake => info!("handshake confirmed"),
            Event::Open => {
                connection.join("kitchen").unwrap();
                connection.broadcast_to("new user joined", "kitchen").unwrap();
                connection.send("hello server").unwrap();
            }
            Event::Message(envelope) => info!("MSG: {:?}", envelope),
            Event::Pong => debug!("pong received"),
            Event::Close => {
                info!("connection closed");
                break;
            }
            Event::Error(err) => error!("received error from the stream: {}", err),
            _ => {}
        }
    }
}
