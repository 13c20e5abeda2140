use crate::protocol::{self, Request, Response};
use futures::{SinkExt, StreamExt};
use purge::{Ack, EventDispatcher, EventEnvelope};
use serde_json::Value;
use shared::ErrorReport;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::codec::Framed;
use tracing::info;

/// Responses a connection may have queued for its writer at once
pub const RESPONSE_QUEUE_DEPTH: usize = 1024;

/// Accept connections forever, serving each on its own task
pub async fn serve(listener: TcpListener, dispatcher: Arc<EventDispatcher>) {
    loop {
        match listener.accept().await {
            Ok((socket, addr)) => {
                tracing::info!("TCP connection from {addr}");
                let dispatcher = dispatcher.clone();

                tokio::spawn(async move {
                    if let Err(err) = process_connection(socket, dispatcher).await {
                        tracing::warn!("TCP connection {addr} error: {err:?}");
                    }
                });
            }
            Err(e) => {
                tracing::error!("TCP accept error: {}", e);
            }
        }
    }
}

pub async fn process_connection(
    socket: TcpStream,
    dispatcher: Arc<EventDispatcher>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    socket.set_nodelay(true).ok();

    let (mut sink, mut stream) = Framed::new(socket, protocol::codec()).split();

    // Acks settle out of order on other tasks; a single writer owns the sink
    let (tx, mut rx) = mpsc::channel::<Response>(RESPONSE_QUEUE_DEPTH);
    let writer = tokio::spawn(async move {
        while let Some(response) = rx.recv().await {
            sink.send(response.encode()).await?;
        }
        Ok::<_, std::io::Error>(())
    });

    while let Some(frame_result) = stream.next().await {
        let frame = frame_result?;

        let request = match Request::decode(frame.freeze()) {
            Ok(req) => req,
            Err(e) => {
                tracing::error!("Failed to decode request: {}", e);
                let _ = tx.send(Response::Error { msg: e }).await;
                continue;
            }
        };

        match request {
            Request::Ping => {
                let _ = tx.send(Response::Pong).await;
            }
            Request::Emit {
                event,
                payload,
                ack_id,
            } => {
                info!("Received event \"{}\" (ack: {:?})", event, ack_id);

                let ack = ack_id.map(|ack_id| ack_sender(tx.clone(), ack_id));

                dispatcher.dispatch(EventEnvelope::new(event, payload), ack);
            }
        }
    }

    // Pending acks keep the writer alive until they have all been delivered
    drop(tx);
    writer.await??;

    Ok(())
}

/// Ack that queues its result for the connection writer.
///
/// Acks settle on handler tasks and cannot wait, so a full queue (a client
/// that stopped reading) drops the ack with a warning.
fn ack_sender(tx: mpsc::Sender<Response>, ack_id: u64) -> Ack<Value> {
    Ack::new(move |result: shared::Result<Value>| {
        let result = result.map_err(|e| ErrorReport::from(&e));
        match tx.try_send(Response::Ack { ack_id, result }) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!("Response queue full, dropping ack {ack_id}");
            }
            // connection already gone
            Err(TrySendError::Closed(_)) => {}
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::{CacheError, Error};

    #[tokio::test]
    async fn ack_is_queued_for_the_writer() {
        let (tx, mut rx) = mpsc::channel(4);

        ack_sender(tx.clone(), 7).resolve(Ok(json!(2)));
        ack_sender(tx, 8).resolve(Err(Error::Cache(CacheError::Timeout)));

        assert_eq!(
            rx.recv().await,
            Some(Response::Ack {
                ack_id: 7,
                result: Ok(json!(2)),
            })
        );
        match rx.recv().await {
            Some(Response::Ack { ack_id, result }) => {
                assert_eq!(ack_id, 8);
                assert_eq!(result.unwrap_err().kind, "timeout");
            }
            other => panic!("unexpected response: {other:?}"),
        }
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn ack_is_dropped_when_the_queue_is_full() {
        let (tx, mut rx) = mpsc::channel(1);

        ack_sender(tx.clone(), 1).resolve(Ok(json!(1)));
        // Queue holds one response; this one must not block or panic
        ack_sender(tx, 2).resolve(Ok(json!(2)));

        assert_eq!(
            rx.recv().await,
            Some(Response::Ack {
                ack_id: 1,
                result: Ok(json!(1)),
            })
        );
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn ack_after_disconnect_is_discarded() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        ack_sender(tx, 3).resolve(Ok(json!(0)));
    }
}
