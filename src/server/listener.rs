//! Chat server listener
//!
//! Binds the TCP listener and serves the HTTP router until shutdown.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::error::Result;
use crate::registry::BroadcastRegistry;
use crate::server::config::ServerConfig;
use crate::server::routes::{self, AppState};

/// Chat broadcast server
pub struct ChatServer {
    config: ServerConfig,
    registry: Arc<BroadcastRegistry>,
}

impl ChatServer {
    /// Create a new server with its own registry
    pub fn new(config: ServerConfig) -> Self {
        let registry = Arc::new(BroadcastRegistry::with_config(config.registry.clone()));
        Self::with_registry(config, registry)
    }

    /// Create a server around an existing registry
    pub fn with_registry(config: ServerConfig, registry: Arc<BroadcastRegistry>) -> Self {
        Self { config, registry }
    }

    /// Get a reference to the broadcast registry
    pub fn registry(&self) -> &Arc<BroadcastRegistry> {
        &self.registry
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    /// Build the HTTP router
    pub fn router(&self) -> Router {
        routes::router(AppState::new(
            Arc::clone(&self.registry),
            self.config.asset_root.clone(),
        ))
    }

    /// Run the server
    ///
    /// This method blocks until the listener fails.
    pub async fn run(&self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener
    ///
    /// When `shutdown` resolves every subscriber is closed, so open event
    /// streams end and in-flight connections can drain.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            addr = %addr,
            asset_root = %self.config.asset_root.display(),
            "Web chat server started on http://localhost:{}",
            addr.port()
        );

        let registry = Arc::clone(&self.registry);
        let shutdown = async move {
            shutdown.await;
            tracing::info!("Shutdown signal received");
            registry.close_all().await;
        };

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        let stats = self.registry.stats().await;
        tracing::info!(
            total_subscribers = stats.total_subscribers,
            messages_published = stats.messages_published,
            events_delivered = stats.events_delivered,
            subscribers_dropped = stats.subscribers_dropped,
            average_fanout = stats.average_fanout(),
            "Server shutdown complete"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    use super::*;

    async fn read_until(stream: &mut TcpStream, needle: &str) -> String {
        let mut seen = Vec::new();
        let mut buf = [0u8; 1024];
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let n = stream.read(&mut buf).await.unwrap();
                assert!(n > 0, "connection closed before {needle:?}");
                seen.extend_from_slice(&buf[..n]);
                if String::from_utf8_lossy(&seen).contains(needle) {
                    break;
                }
            }
        })
        .await
        .unwrap();
        String::from_utf8_lossy(&seen).into_owned()
    }

    async fn post(addr: SocketAddr, body: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!(
            "POST /send HTTP/1.1\r\nHost: localhost\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[test]
    fn test_server_accessors() {
        let addr: SocketAddr = "127.0.0.1:8123".parse().unwrap();
        let server = ChatServer::new(ServerConfig::with_addr(addr).subscriber_buffer(8));

        assert_eq!(server.bind_addr(), addr);
        assert_eq!(server.registry().config().subscriber_buffer, 8);
    }

    #[tokio::test]
    async fn test_shared_registry() {
        let registry = Arc::new(BroadcastRegistry::new());
        let server = ChatServer::with_registry(ServerConfig::default(), Arc::clone(&registry));

        let _sub = registry.subscribe().await;
        assert_eq!(server.registry().subscriber_count().await, 1);
    }

    #[tokio::test]
    async fn test_end_to_end_broadcast() {
        let server = Arc::new(ChatServer::new(ServerConfig::default()));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let serving = {
            let server = Arc::clone(&server);
            tokio::spawn(async move {
                server
                    .serve(listener, async move {
                        let _ = stop_rx.await;
                    })
                    .await
            })
        };

        // Two browsers subscribe
        let mut browsers = Vec::new();
        for _ in 0..2 {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream
                .write_all(b"GET /events HTTP/1.1\r\nHost: localhost\r\n\r\n")
                .await
                .unwrap();
            let head = read_until(&mut stream, "\r\n\r\n").await;
            assert!(head.starts_with("HTTP/1.1 200"));
            assert!(head.to_ascii_lowercase().contains("content-type: text/event-stream"));
            browsers.push(stream);
        }

        tokio::time::timeout(Duration::from_secs(5), async {
            while server.registry().subscriber_count().await < 2 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        let response = post(addr, r#"{"name":"Ann","message":"hi"}"#).await;
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.ends_with("OK"));

        for stream in &mut browsers {
            read_until(stream, "event: message\ndata: Ann: hi\n\n").await;
        }

        // Shutdown closes the open streams and lets serve return
        stop_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), serving)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(server.registry().subscriber_count().await, 0);

        let stats = server.registry().stats().await;
        assert_eq!(stats.total_subscribers, 2);
        assert_eq!(stats.messages_published, 1);
        assert_eq!(stats.events_delivered, 2);
        assert_eq!(stats.subscribers_dropped, 0);
        assert_eq!(stats.average_fanout(), 2.0);
    }
}
