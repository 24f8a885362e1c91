use futures::StreamExt;
use log::*;
use socket_lite::config::ServerOptions;
use socket_lite::event::{Event, ServerEvent, ID};
use socket_lite::room::Envelope;
use socket_lite::server::WSServer;
use socket_lite::split::WSWriter;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// The protocol layer only tags messages with a room; routing a broadcast to
// the other members is the application's job. This demo keeps the registry
// the library deliberately doesn't own.
type Registry = Arc<Mutex<HashMap<String, HashMap<ID, WSWriter>>>>;

#[tokio::main]
async fn main() {
    env_logger::init();

    let options = ServerOptions {
        port: 9002,
        ..Default::default()
    };
    let server = WSServer::bind(options).await.expect("Can't listen");
    let registry: Registry = Arc::new(Mutex::new(HashMap::new()));
    let mut events = server.run();

    while let Some(ServerEvent::Connection(id, mut connection)) = events.next().await {
        info!("peer {} connected", id);
        let registry = registry.clone();

        tokio::spawn(async move {
            let writer = connection.writer();
            while let Some(event) = connection.next().await {
                match event {
                    Event::Message(Envelope::Join { room }) => {
                        info!("peer {} joined room {}", id, room);
                        registry
                            .lock()
                            .unwrap()
                            .entry(room)
                            .or_default()
                            .insert(id, writer.clone());
                    }
                    Event::Message(Envelope::Broadcast { room, msg }) => {
                        if let Some(members) = registry.lock().unwrap().get(&room) {
                            for (member, peer) in members {
                                if *member != id && peer.broadcast_to(&msg, &room).is_err() {
                                    warn!("failed to relay to {}", member);
                                }
                            }
                        }
                    }
                    Event::Close => {
                        for members in registry.lock().unwrap().values_mut() {
                            members.remove(&id);
                        }
                        info!("peer {} disconnected", id);
                        break;
                    }
                    _ => {}
                }
            }
        });
    }
}
