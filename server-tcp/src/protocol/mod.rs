use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde_json::Value;
use shared::ErrorReport;
use tokio_util::codec::LengthDelimitedCodec;

// Command type identifiers
pub const CMD_PING: u8 = 0x00;
pub const CMD_EMIT: u8 = 0x01;
pub const CMD_EMIT_ACK: u8 = 0x02;

// Response type identifiers
pub const RESP_PONG: u8 = 0x00;
pub const RESP_ACK_OK: u8 = 0x01;
pub const RESP_ACK_ERR: u8 = 0x02;
pub const RESP_ERROR: u8 = 0x04;

pub const MAX_FRAME_LENGTH: usize = 8 * 1024 * 1024;

/// Framing shared by server and client: a 4-byte big-endian length prefix.
pub fn codec() -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .length_field_length(4)
        .max_frame_length(MAX_FRAME_LENGTH)
        .new_codec()
}

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Ping,
    Emit {
        event: String,
        payload: Value,
        ack_id: Option<u64>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Pong,
    Ack {
        ack_id: u64,
        result: Result<Value, ErrorReport>,
    },
    Error { msg: String },
}

impl Request {
    /// Encode a Request into Bytes for transmission
    ///
    /// Format:
    /// - PING: [0x00]
    /// - EMIT: [0x01][event_len: u32][event bytes][payload json]
    /// - EMIT_ACK: [0x02][ack_id: u64][event_len: u32][event bytes][payload json]
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::new();

        match self {
            Request::Ping => {
                buf.put_u8(CMD_PING);
            }
            Request::Emit {
                event,
                payload,
                ack_id,
            } => {
                match ack_id {
                    Some(id) => {
                        buf.put_u8(CMD_EMIT_ACK);
                        buf.put_u64(*id);
                    }
                    None => buf.put_u8(CMD_EMIT),
                }
                let event_bytes = event.as_bytes();
                buf.put_u32(event_bytes.len() as u32);
                buf.put_slice(event_bytes);
                // The payload runs to the end of the frame
                buf.put_slice(payload.to_string().as_bytes());
            }
        }

        buf.freeze()
    }

    /// Decode a Request from Bytes received from the network
    ///
    /// This is called AFTER LengthDelimitedCodec has extracted the frame,
    /// so we receive a complete message as Bytes
    pub fn decode(mut buf: Bytes) -> Result<Self, String> {
        if buf.is_empty() {
            return Err("Empty buffer".to_string());
        }

        let cmd = buf.get_u8();

        match cmd {
            CMD_PING => Ok(Request::Ping),
            CMD_EMIT | CMD_EMIT_ACK => {
                let ack_id = if cmd == CMD_EMIT_ACK {
                    if buf.remaining() < 8 {
                        return Err("Invalid EMIT: missing ack id".to_string());
                    }
                    Some(buf.get_u64())
                } else {
                    None
                };

                if buf.remaining() < 4 {
                    return Err("Invalid EMIT: missing event length".to_string());
                }
                let event_len = buf.get_u32() as usize;
                if buf.remaining() < event_len {
                    return Err(format!(
                        "Invalid EMIT: expected {} event bytes, got {}",
                        event_len,
                        buf.remaining()
                    ));
                }
                let event_bytes = buf.copy_to_bytes(event_len);
                let event = String::from_utf8(event_bytes.to_vec())
                    .map_err(|e| format!("Invalid event name UTF-8: {}", e))?;

                let payload = if buf.has_remaining() {
                    serde_json::from_slice(&buf)
                        .map_err(|e| format!("Invalid EMIT payload: {}", e))?
                } else {
                    Value::Null
                };

                Ok(Request::Emit {
                    event,
                    payload,
                    ack_id,
                })
            }
            _ => Err(format!("Unknown command: 0x{:02X}", cmd)),
        }
    }
}

impl Response {
    /// Encode a Response into Bytes for transmission
    ///
    /// Format:
    /// - PONG: [0x00]
    /// - ACK_OK: [0x01][ack_id: u64][result json]
    /// - ACK_ERR: [0x02][ack_id: u64][error report json]
    /// - ERROR: [0x04][msg_len: u32][msg bytes]
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::new();

        match self {
            Response::Pong => {
                buf.put_u8(RESP_PONG);
            }
            Response::Ack { ack_id, result } => {
                let body = match result {
                    Ok(value) => {
                        buf.put_u8(RESP_ACK_OK);
                        value.to_string()
                    }
                    Err(report) => {
                        buf.put_u8(RESP_ACK_ERR);
                        serde_json::to_string(report).unwrap_or_default()
                    }
                };
                buf.put_u64(*ack_id);
                buf.put_slice(body.as_bytes());
            }
            Response::Error { msg } => {
                buf.put_u8(RESP_ERROR);
                let msg_bytes = msg.as_bytes();
                buf.put_u32(msg_bytes.len() as u32);
                buf.put_slice(msg_bytes);
            }
        }

        buf.freeze()
    }

    /// Decode a Response from Bytes received from the network
    pub fn decode(mut buf: Bytes) -> Result<Self, String> {
        if buf.is_empty() {
            return Err("Empty buffer".to_string());
        }

        let resp_type = buf.get_u8();

        match resp_type {
            RESP_PONG => Ok(Response::Pong),
            RESP_ACK_OK | RESP_ACK_ERR => {
                if buf.remaining() < 8 {
                    return Err("Invalid ACK: missing ack id".to_string());
                }
                let ack_id = buf.get_u64();

                let result = if resp_type == RESP_ACK_OK {
                    Ok(serde_json::from_slice::<Value>(&buf)
                        .map_err(|e| format!("Invalid ACK result: {}", e))?)
                } else {
                    Err(serde_json::from_slice::<ErrorReport>(&buf)
                        .map_err(|e| format!("Invalid ACK error: {}", e))?)
                };

                Ok(Response::Ack { ack_id, result })
            }
            RESP_ERROR => {
                if buf.remaining() < 4 {
                    return Err("Invalid ERROR: missing length".to_string());
                }

                let msg_len = buf.get_u32() as usize;

                if buf.remaining() < msg_len {
                    return Err(format!(
                        "Invalid ERROR: expected {} bytes, got {}",
                        msg_len,
                        buf.remaining()
                    ));
                }

                let msg_bytes = buf.copy_to_bytes(msg_len);
                let msg = String::from_utf8_lossy(&msg_bytes).to_string();
                Ok(Response::Error { msg })
            }
            _ => Err(format!("Unknown response type: 0x{:02X}", resp_type)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_emit_with_ack_decodes() {
        let req = Request::Emit {
            event: "cacheDeleteKeys".to_string(),
            payload: json!({"keys": ["a", "b"]}),
            ack_id: Some(7),
        };

        assert_eq!(Request::decode(req.encode()).unwrap(), req);
    }

    #[test]
    fn test_emit_without_payload_decodes_as_null() {
        let mut buf = BytesMut::new();
        buf.put_u8(CMD_EMIT);
        buf.put_u32(4);
        buf.put_slice(b"ping");

        let decoded = Request::decode(buf.freeze()).unwrap();
        assert_eq!(
            decoded,
            Request::Emit {
                event: "ping".to_string(),
                payload: Value::Null,
                ack_id: None,
            }
        );
    }

    #[test]
    fn test_truncated_emit_is_rejected() {
        let mut buf = BytesMut::new();
        buf.put_u8(CMD_EMIT_ACK);
        buf.put_u32(1);

        assert!(Request::decode(buf.freeze()).is_err());
        assert!(Request::decode(Bytes::from_static(&[0x7F])).is_err());
    }

    #[test]
    fn test_error_ack_carries_report() {
        let resp = Response::Ack {
            ack_id: 3,
            result: Err(ErrorReport {
                kind: "connection".into(),
                message: "timeout".into(),
                causes: Vec::new(),
            }),
        };

        assert_eq!(Response::decode(resp.encode()).unwrap(), resp);
    }
}
