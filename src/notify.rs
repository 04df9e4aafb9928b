use crate::config::schema::NotifyConfig;
use crate::error::{NotifyError, Result};
use async_trait::async_trait;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// Fire-and-forget announcements to external listeners.
#[async_trait]
pub trait Notify: Send + Sync {
    /// Deliver `message`. Failures are logged and swallowed.
    async fn notify(&self, message: &str);
}

/// Sends each message as a single ASCII datagram.
pub struct UdpNotifier {
    socket: UdpSocket,
    target: String,
}

impl UdpNotifier {
    /// Bind an ephemeral local socket for sending to the configured target.
    ///
    /// # Errors
    /// Returns `ButtonError::Io` if the socket cannot be bound.
    pub async fn bind(config: &NotifyConfig) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        Ok(Self {
            socket,
            target: config.target(),
        })
    }

    /// Resolve the target and send `message`.
    ///
    /// # Errors
    /// Returns `NotifyError` if the target does not resolve to an IPv4
    /// address or the send fails.
    pub async fn send(&self, message: &str) -> std::result::Result<(), NotifyError> {
        let addr = tokio::net::lookup_host(self.target.as_str())
            .await?
            .find(SocketAddr::is_ipv4)
            .ok_or_else(|| NotifyError::Resolve(self.target.clone()))?;
        self.socket.send_to(message.as_bytes(), addr).await?;
        Ok(())
    }
}

#[async_trait]
impl Notify for UdpNotifier {
    async fn notify(&self, message: &str) {
        match self.send(message).await {
            Ok(()) => debug!("notified {}: {message}", self.target),
            Err(e) => warn!("notify {} failed ({message}): {e}", self.target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn delivers_datagram_on_loopback() {
        let listener = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let notifier = UdpNotifier::bind(&NotifyConfig {
            host: "127.0.0.1".into(),
            port,
        })
        .await
        .unwrap();

        notifier.notify("press red").await;

        let mut buf = [0u8; 64];
        let (len, _) = tokio::time::timeout(Duration::from_secs(2), listener.recv_from(&mut buf))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&buf[..len], b"press red");
    }

    #[tokio::test]
    async fn unresolvable_target_is_an_error_not_a_panic() {
        let notifier = UdpNotifier::bind(&NotifyConfig {
            host: "no-such-host.invalid".into(),
            port: 9,
        })
        .await
        .unwrap();

        assert!(notifier.send("booted").await.is_err());
        // Swallowed.
        notifier.notify("booted").await;
    }
}
