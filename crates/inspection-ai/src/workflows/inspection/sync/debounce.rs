use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Trailing-edge debouncer owning at most one pending timer.
///
/// Each `schedule` call cancels the previous timer and starts a new one, so a
/// burst of triggers inside the window runs the task once. Once the window
/// elapses the task is spawned on its own, so a later `cancel` cannot abort
/// work that has already started.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: Mutex::new(None),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn schedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let window = self.window;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            tokio::spawn(task);
        });

        let mut pending = self.pending.lock().expect("debounce mutex poisoned");
        if let Some(previous) = pending.replace(timer) {
            previous.abort();
        }
    }

    /// Cancel the pending timer, returning whether one was still waiting.
    pub fn cancel(&self) -> bool {
        let mut pending = self.pending.lock().expect("debounce mutex poisoned");
        match pending.take() {
            Some(timer) => {
                let waiting = !timer.is_finished();
                timer.abort();
                waiting
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .expect("debounce mutex poisoned")
            .as_ref()
            .map(|timer| !timer.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Ok(pending) = self.pending.get_mut() {
            if let Some(timer) = pending.take() {
                timer.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_task(counter: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
        let counter = Arc::clone(counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_into_single_run() {
        let debouncer = Debouncer::new(Duration::from_millis(500));
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            debouncer.schedule(counting_task(&counter));
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_pending_run() {
        let debouncer = Debouncer::new(Duration::from_millis(500));
        let counter = Arc::new(AtomicUsize::new(0));

        debouncer.schedule(counting_task(&counter));
        assert!(debouncer.cancel());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(!debouncer.cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_triggers_each_run() {
        let debouncer = Debouncer::new(Duration::from_millis(100));
        let counter = Arc::new(AtomicUsize::new(0));

        debouncer.schedule(counting_task(&counter));
        tokio::time::sleep(Duration::from_millis(250)).await;
        debouncer.schedule(counting_task(&counter));
        tokio::time::sleep(Duration::from_millis(250)).await;

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
