use std::time::Duration;

pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_PROTOCOL_VERSION: u8 = 13;
pub const DEFAULT_ORIGIN: &str = "Espruino";
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(60);

/// Options recognized by the client side of the handshake.
///
/// `key` overrides the randomly generated Sec-WebSocket-Key; it exists for
/// peers (and tests) that pin a fixed nonce. A `keep_alive` of zero disables
/// the ping timer.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub port: u16,
    pub protocol_version: u8,
    pub origin: String,
    pub keep_alive: Duration,
    pub key: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            port: DEFAULT_PORT,
            protocol_version: DEFAULT_PROTOCOL_VERSION,
            origin: DEFAULT_ORIGIN.to_string(),
            keep_alive: DEFAULT_KEEP_ALIVE,
            key: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub port: u16,
    pub keep_alive: Duration,
}

impl Default for ServerOptions {
    fn default() -> Self {
        ServerOptions {
            port: DEFAULT_PORT,
            keep_alive: DEFAULT_KEEP_ALIVE,
        }
    }
}
