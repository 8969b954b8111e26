//! Push notification registration and the incoming-notification listener.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::client::USER_AGENT;
use super::session::FileSessionStore;

const REGISTER_PATH: &str = "/v1/notification/register";

/// A notification delivered to this device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Where the notification came from (e.g. "received", "selected").
    pub origin: String,
    #[serde(default)]
    pub data: Value,
}

/// Device registration for push notifications.
#[async_trait]
pub trait PushRegistration: Send + Sync {
    /// Registers this device. Callers treat this as fire-and-forget.
    ///
    /// # Errors
    /// Returns an error if registration failed; callers only log it.
    async fn register(&self) -> Result<()>;

    /// Opens the incoming notification stream, if this transport has one.
    fn notifications(&self) -> Option<mpsc::UnboundedReceiver<Notification>> {
        None
    }
}

/// Handle to a running notification listener.
///
/// Released explicitly with [`NotificationSubscription::release`] or on drop.
#[derive(Debug)]
pub struct NotificationSubscription {
    cancel: CancellationToken,
}

impl NotificationSubscription {
    /// Spawns a listener that logs each incoming notification until released.
    pub fn listen(mut rx: mpsc::UnboundedReceiver<Notification>) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    next = rx.recv() => match next {
                        Some(notification) => handle_notification(&notification),
                        None => break,
                    },
                }
            }
        });
        Self { cancel }
    }

    pub fn release(&self) {
        self.cancel.cancel();
    }

    pub fn is_released(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for NotificationSubscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn handle_notification(notification: &Notification) {
    tracing::info!(
        "Push notification {} with data: {}",
        notification.origin,
        notification.data
    );
}

/// Used when push is disabled in config.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPushRegistration;

#[async_trait]
impl PushRegistration for NoopPushRegistration {
    async fn register(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    #[serde(rename = "deviceId")]
    device_id: &'a str,
    platform: &'static str,
}

/// Registers the install's device id with the notification endpoint.
#[derive(Debug, Clone)]
pub struct HttpPushRegistration {
    base_url: String,
    session: Arc<FileSessionStore>,
    http: reqwest::Client,
}

impl HttpPushRegistration {
    pub fn new(base_url: impl Into<String>, session: Arc<FileSessionStore>) -> Self {
        Self {
            base_url: base_url.into(),
            session,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PushRegistration for HttpPushRegistration {
    async fn register(&self) -> Result<()> {
        // Session file access is blocking std::fs I/O.
        let session = Arc::clone(&self.session);
        let device_id = tokio::task::spawn_blocking(move || session.device_id())
            .await
            .context("Device id lookup task failed")??;
        let url = format!("{}{REGISTER_PATH}", self.base_url);

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .json(&RegisterRequest {
                device_id: &device_id,
                platform: std::env::consts::OS,
            })
            .send()
            .await
            .with_context(|| format!("Failed to reach {url}"))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Push registration failed: HTTP {status}");
        }
        Ok(())
    }
}
