//! Cancelable once-per-period display ticker.
//!
//! The ticker owns a spawned task that sends [`Tick`] messages over a bounded
//! channel. It never touches tracker state itself; the station loop reacts to
//! ticks by recomputing elapsed time. Starting a running ticker replaces the
//! task, and cancelling or dropping the ticker aborts it, so at most one timer
//! is ever live.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// A display refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick;

/// Periodic tick source that can be started and cancelled explicitly.
#[derive(Debug)]
pub struct ElapsedTicker {
    period: Duration,
    tx: mpsc::Sender<Tick>,
    handle: Option<JoinHandle<()>>,
}

impl ElapsedTicker {
    /// Creates a stopped ticker and the receiver its ticks arrive on.
    ///
    /// The channel holds a single pending tick; further ticks are dropped
    /// until it is consumed.
    pub fn new(period: Duration) -> (Self, mpsc::Receiver<Tick>) {
        let (tx, rx) = mpsc::channel(1);
        let ticker = Self {
            period,
            tx,
            handle: None,
        };
        (ticker, rx)
    }

    /// Starts ticking. The first tick arrives one period from now.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        self.cancel();

        let tx = self.tx.clone();
        let period = self.period;
        let first = Instant::now() + period;
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(first, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                match tx.try_send(Tick) {
                    Ok(()) | Err(TrySendError::Full(_)) => {}
                    Err(TrySendError::Closed(_)) => break,
                }
            }
        });
        self.handle = Some(handle);
        tracing::debug!(?period, "ticker started");
    }

    /// Stops ticking. Safe to call when already stopped.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("ticker cancelled");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for ElapsedTicker {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period_after_start() {
        let (mut ticker, mut rx) = ElapsedTicker::new(Duration::from_secs(1));
        let started = Instant::now();
        ticker.start();
        assert!(ticker.is_running());

        rx.recv().await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(1));
        rx.recv().await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_ticks() {
        let (mut ticker, mut rx) = ElapsedTicker::new(Duration::from_secs(1));
        ticker.start();
        rx.recv().await.unwrap();

        ticker.cancel();
        assert!(!ticker.is_running());

        time::advance(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_running_task() {
        let (mut ticker, mut rx) = ElapsedTicker::new(Duration::from_secs(1));
        let started = Instant::now();
        ticker.start();

        time::advance(Duration::from_millis(500)).await;
        ticker.start();

        rx.recv().await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_millis(1500));

        time::advance(Duration::from_millis(100)).await;
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_when_stopped_is_noop() {
        let (mut ticker, _rx) = ElapsedTicker::new(Duration::from_secs(1));
        ticker.cancel();
        assert!(!ticker.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_aborts_task() {
        let (mut ticker, mut rx) = ElapsedTicker::new(Duration::from_secs(1));
        ticker.start();
        drop(ticker);

        // With the task aborted and the ticker's sender dropped, the channel closes.
        assert_eq!(rx.recv().await, None);
    }
}
