use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use super::Publish;
use crate::error::PublishError;

/// WebSocket publish endpoint.
///
/// Binds once, accepts any number of subscribers and pushes every published
/// message to all of them as a text frame. Subscribers that fall more than
/// `capacity` messages behind skip the oldest ones; they never slow the feed.
pub struct WsPublisher {
    tx: broadcast::Sender<Arc<str>>,
    local_addr: SocketAddr,
    accept_task: JoinHandle<()>,
}

impl WsPublisher {
    pub async fn bind(addr: &str, capacity: usize) -> Result<Self, PublishError> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let (tx, _) = broadcast::channel(capacity.max(1));
        let accept_task = tokio::spawn(accept_loop(listener, tx.clone()));
        tracing::info!(%local_addr, "Tick publisher bound");
        Ok(Self {
            tx,
            local_addr,
            accept_task,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Publish for WsPublisher {
    fn publish(&mut self, message: &str) -> Result<usize, PublishError> {
        if self.accept_task.is_finished() {
            return Err(PublishError::Closed);
        }
        // send only fails when nobody is subscribed; the message is dropped like on a PUB socket
        Ok(self.tx.send(Arc::from(message)).unwrap_or(0))
    }
}

impl Drop for WsPublisher {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

async fn accept_loop(listener: TcpListener, tx: broadcast::Sender<Arc<str>>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let rx = tx.subscribe();
                tokio::spawn(async move {
                    if let Err(e) = serve_subscriber(stream, peer, rx).await {
                        tracing::debug!(%peer, error = %e, "Subscriber connection ended with error");
                    }
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to accept subscriber");
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            }
        }
    }
}

async fn serve_subscriber(
    stream: TcpStream,
    peer: SocketAddr,
    mut rx: broadcast::Receiver<Arc<str>>,
) -> anyhow::Result<()> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    tracing::info!(%peer, "Subscriber connected");
    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            msg = rx.recv() => {
                match msg {
                    Ok(text) => write.send(Message::Text(text.to_string())).await?,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(%peer, skipped, "Subscriber lagging, ticks skipped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            incoming = read.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                }
            }
        }
    }

    tracing::info!(%peer, "Subscriber disconnected");
    Ok(())
}
