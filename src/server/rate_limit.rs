//! Per-client fixed-window request limiting.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

struct Window {
    count: u32,
    reset_at: Instant,
}

/// Counts requests per client key in fixed windows.
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    clients: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Record a request and report whether it is over the limit.
    /// Requests without a client key are never limited.
    pub async fn is_limited(&self, client: Option<&str>) -> bool {
        self.is_limited_at(client, Instant::now()).await
    }

    pub async fn is_limited_at(&self, client: Option<&str>, now: Instant) -> bool {
        let Some(client) = client else {
            return false;
        };

        let mut clients = self.clients.lock().await;
        match clients.get_mut(client) {
            Some(entry) if now <= entry.reset_at => {
                entry.count = entry.count.saturating_add(1);
                entry.count > self.limit
            }
            _ => {
                clients.insert(
                    client.to_string(),
                    Window {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                false
            }
        }
    }

    /// Drop entries whose window has ended. Returns `(removed, remaining)`.
    pub async fn sweep_at(&self, now: Instant) -> (usize, usize) {
        let mut clients = self.clients.lock().await;
        let before = clients.len();
        clients.retain(|_, entry| now <= entry.reset_at);
        (before - clients.len(), clients.len())
    }

    #[cfg(test)]
    async fn tracked_clients(&self) -> usize {
        self.clients.lock().await.len()
    }
}
