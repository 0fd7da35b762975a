//! Cancellation for in-flight fetches.
//!
//! A [`CancelHandle`] owns the trigger; any number of [`CancelSignal`]s
//! observe it. A signal can also carry a deadline, after which it reports
//! cancellation on its own. The pagination controller checks the signal at
//! every suspension point: each page request and each rate-limit wait.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// A handle for triggering cancellation.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelHandle {
    /// Creates a new, untriggered handle.
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx: Arc::new(tx), rx }
    }

    /// Triggers cancellation for every signal derived from this handle.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    /// Returns true if cancellation has been triggered.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Returns a signal observing this handle.
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: Some(self.rx.clone()),
            deadline: None,
        }
    }
}

/// The observing side of a cancellation, optionally bounded by a deadline.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    rx: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

impl CancelSignal {
    /// A signal that is never cancelled.
    pub fn never() -> Self {
        Self::default()
    }

    /// Builder method to set an absolute deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Builder method to set a deadline relative to now.
    ///
    /// A timeout too large to represent as an instant sets no deadline.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    /// Returns the deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true if the handle was triggered or the deadline has passed.
    pub fn is_cancelled(&self) -> bool {
        let triggered = self.rx.as_ref().is_some_and(|rx| *rx.borrow());
        let expired = self.deadline.is_some_and(|d| Instant::now() >= d);
        triggered || expired
    }

    /// Completes once the signal is cancelled.
    ///
    /// Never completes for a signal without a handle or deadline.
    pub async fn cancelled(&self) {
        let triggered = async {
            match self.rx.clone() {
                Some(mut rx) => loop {
                    if *rx.borrow_and_update() {
                        return;
                    }
                    // Handle dropped without cancelling: nothing can trigger us anymore
                    if rx.changed().await.is_err() {
                        std::future::pending::<()>().await;
                    }
                },
                None => std::future::pending::<()>().await,
            }
        };

        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = triggered => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => triggered.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_cancel() {
        let handle = CancelHandle::new();
        let signal = handle.signal();

        assert!(!handle.is_cancelled());
        assert!(!signal.is_cancelled());

        handle.cancel();

        assert!(handle.is_cancelled());
        assert!(signal.is_cancelled());
    }

    #[test]
    fn never_is_not_cancelled() {
        let signal = CancelSignal::never();
        assert!(!signal.is_cancelled());
        assert!(signal.deadline().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_expires() {
        let signal = CancelSignal::never().with_timeout(Duration::from_secs(3));
        assert!(!signal.is_cancelled());

        let start = Instant::now();
        signal.cancelled().await;

        assert!(start.elapsed() >= Duration::from_secs(3));
        assert!(signal.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn huge_timeout_means_no_deadline() {
        let signal = CancelSignal::never().with_timeout(Duration::from_secs(u64::MAX));
        assert_eq!(signal.deadline(), None);
        assert!(!signal.is_cancelled());

        let bounded = CancelSignal::never()
            .with_timeout(Duration::from_secs(5))
            .with_timeout(Duration::from_secs(u64::MAX));
        assert!(bounded.deadline().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn earlier_deadline_wins() {
        let now = Instant::now();
        let signal = CancelSignal::never()
            .with_deadline(now + Duration::from_secs(10))
            .with_deadline(now + Duration::from_secs(2));

        assert_eq!(signal.deadline(), Some(now + Duration::from_secs(2)));
    }

    #[tokio::test]
    async fn cancelled_wakes_on_trigger() {
        let handle = CancelHandle::new();
        let signal = handle.signal();

        let waiter = tokio::spawn(async move {
            signal.cancelled().await;
            true
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.cancel();

        let result = tokio::time::timeout(Duration::from_millis(500), waiter).await;
        assert!(result.unwrap().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_handle_never_cancels() {
        let signal = CancelHandle::new().signal();

        let result = tokio::time::timeout(Duration::from_secs(60), signal.cancelled()).await;
        assert!(result.is_err());
        assert!(!signal.is_cancelled());
    }
}
