use serde_json::Value;

/// Room used by `broadcast` when the caller doesn't name one.
pub const DEFAULT_ROOM: &str = "all";

/// The JSON convention carried inside Text frames. A broadcast tags the
/// message with a room, a join declares membership, and a plain send wraps
/// the message alone. The core never routes by room; an external registry is
/// expected to watch `Join` and `Broadcast` envelopes and fan out itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    Plain { msg: String },
    Broadcast { room: String, msg: String },
    Join { room: String },
    /// Pre-formed JSON on the way out, or inbound text that isn't a
    /// recognizable envelope. Unparseable messages are delivered this way
    /// instead of failing the connection.
    Opaque(String),
}

impl Envelope {
    /// Wraps an outgoing message as `{"msg": ...}` unless it already parses
    /// as JSON, in which case it is sent untouched.
    pub fn wrap(msg: &str) -> Envelope {
        if serde_json::from_str::<Value>(msg).is_ok() {
            Envelope::Opaque(msg.to_string())
        } else {
            Envelope::Plain {
                msg: msg.to_string(),
            }
        }
    }

    pub fn broadcast(msg: &str, room: &str) -> Envelope {
        Envelope::Broadcast {
            room: room.to_string(),
            msg: msg.to_string(),
        }
    }

    pub fn join(room: &str) -> Envelope {
        Envelope::Join {
            room: room.to_string(),
        }
    }

    /// The exact Text-frame payload for this envelope. The layout (including
    /// the single space in broadcasts) matches what existing peers expect
    /// byte for byte; values are JSON-escaped so a quote in the message can't
    /// corrupt the envelope.
    pub fn to_payload(&self) -> String {
        match self {
            Envelope::Plain { msg } => format!("{{\"msg\":{}}}", json_string(msg)),
            Envelope::Broadcast { room, msg } => {
                format!("{{\"room\":{}, \"msg\":{}}}", json_string(room), json_string(msg))
            }
            Envelope::Join { room } => format!("{{\"join\":{}}}", json_string(room)),
            Envelope::Opaque(text) => text.clone(),
        }
    }

    /// Classifies an inbound Text payload. Anything that isn't a JSON object
    /// with the expected keys comes back as `Opaque` with the raw text.
    pub fn parse(text: &str) -> Envelope {
        let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(text) else {
            return Envelope::Opaque(text.to_string());
        };

        if let Some(Value::String(room)) = fields.get("join") {
            return Envelope::Join { room: room.clone() };
        }

        match (fields.get("room"), fields.get("msg")) {
            (Some(Value::String(room)), Some(Value::String(msg))) => Envelope::Broadcast {
                room: room.clone(),
                msg: msg.clone(),
            },
            (None, Some(Value::String(msg))) => Envelope::Plain { msg: msg.clone() },
            _ => Envelope::Opaque(text.to_string()),
        }
    }

    /// The message text, for consumers that don't care about rooms. `Opaque`
    /// yields the raw payload.
    pub fn msg(&self) -> Option<&str> {
        match self {
            Envelope::Plain { msg } => Some(msg),
            Envelope::Broadcast { msg, .. } => Some(msg),
            Envelope::Join { .. } => None,
            Envelope::Opaque(text) => Some(text),
        }
    }

    pub fn room(&self) -> Option<&str> {
        match self {
            Envelope::Broadcast { room, .. } => Some(room),
            Envelope::Join { room } => Some(room),
            _ => None,
        }
    }
}

// Serializing through Value::String gives correct escaping without a
// fallible serde call.
fn json_string(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}
