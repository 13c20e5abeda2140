use crate::protocol::{self, Request, Response};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use shared::ErrorReport;
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio_util::codec::{Framed, LengthDelimitedCodec};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("protocol: {0}")]
    Protocol(String),
    #[error("rejected: {}", .0.message)]
    Rejected(ErrorReport),
    #[error("connection closed")]
    Closed,
}

/// Minimal event bus client: emits events and waits for acknowledgments
pub struct EventBusClient {
    framed: Framed<TcpStream, LengthDelimitedCodec>,
    next_ack_id: u64,
}

impl EventBusClient {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            framed: Framed::new(stream, protocol::codec()),
            next_ack_id: 1,
        }
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self, ClientError> {
        Ok(Self::new(TcpStream::connect(addr).await?))
    }

    pub async fn ping(&mut self) -> Result<(), ClientError> {
        self.framed.send(Request::Ping.encode()).await?;
        match self.read().await? {
            Response::Pong => Ok(()),
            other => Err(ClientError::Protocol(format!("expected PONG, got {:?}", other))),
        }
    }

    /// Fire-and-forget: no acknowledgment is requested
    pub async fn emit(&mut self, event: &str, payload: Value) -> Result<(), ClientError> {
        let request = Request::Emit {
            event: event.to_string(),
            payload,
            ack_id: None,
        };
        self.framed.send(request.encode()).await?;
        Ok(())
    }

    /// Emit and wait for the handler's acknowledgment
    pub async fn emit_with_ack(
        &mut self,
        event: &str,
        payload: Value,
    ) -> Result<Value, ClientError> {
        let ack_id = self.next_ack_id;
        self.next_ack_id += 1;

        let request = Request::Emit {
            event: event.to_string(),
            payload,
            ack_id: Some(ack_id),
        };
        self.framed.send(request.encode()).await?;

        loop {
            match self.read().await? {
                Response::Ack { ack_id: id, result } if id == ack_id => {
                    return result.map_err(ClientError::Rejected);
                }
                Response::Error { msg } => return Err(ClientError::Protocol(msg)),
                other => tracing::debug!("Skipping unrelated response: {:?}", other),
            }
        }
    }

    async fn read(&mut self) -> Result<Response, ClientError> {
        let frame = self.framed.next().await.ok_or(ClientError::Closed)??;
        Response::decode(frame.freeze()).map_err(ClientError::Protocol)
    }
}
