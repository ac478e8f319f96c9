//! A shutdown signal that every clone can observe exactly once.
//!
//! (Ab)uses the fact that acquiring a permit from a zero-capacity
//! [`Semaphore`] only resolves once the semaphore is closed. Closing it is
//! our "send"; a closed-semaphore error from `acquire` is our "recv".

use std::sync::Arc;

use tokio::sync::Semaphore;

#[derive(Clone, Debug)]
pub struct ShutdownChannel {
    inner: Arc<Semaphore>,
}

impl ShutdownChannel {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Semaphore::new(0)),
        }
    }

    /// Signal every current and future clone's [`recv`](Self::recv).
    pub fn send(&self) {
        self.inner.close();
    }

    /// Wait for [`send`](Self::send) to be called (on this or any clone).
    pub async fn recv(&self) {
        let _ = self.inner.acquire().await;
    }

    pub fn is_shutdown(&self) -> bool {
        self.inner.is_closed()
    }
}

impl Default for ShutdownChannel {
    fn default() -> Self {
        Self::new()
    }
}
