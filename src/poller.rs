use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use iced::futures::channel::mpsc;

/// Wakes the UI thread. Returns `false` once nobody is listening anymore.
pub trait Signal {
    fn signal(&mut self) -> bool;
}

/// A zero-buffer channel holds a single message per sender, so a full
/// channel just means an update is already pending.
impl Signal for mpsc::Sender<()> {
    fn signal(&mut self) -> bool {
        match self.try_send(()) {
            Ok(()) => true,
            Err(e) => e.is_full(),
        }
    }
}

/// Background thread that signals, then sleeps for the interval, until stopped.
pub struct Poller {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn spawn<S>(interval: Duration, mut signal: S) -> io::Result<Self>
    where
        S: Signal + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let handle = thread::Builder::new()
            .name("poller".into())
            .spawn(move || {
                while flag.load(Ordering::Acquire) {
                    if !signal.signal() {
                        log::debug!("update receiver gone, poller exiting");
                        break;
                    }
                    thread::sleep(interval);
                }
            })?;

        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Clear the running flag and wait for the thread. Takes up to one
    /// interval since the thread only checks the flag after sleeping.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("poller thread panicked");
            }
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;

    #[derive(Clone, Default)]
    struct Counter(Arc<AtomicUsize>);

    impl Signal for Counter {
        fn signal(&mut self) -> bool {
            self.0.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    #[test]
    fn test_signals_once_per_interval() {
        let counter = Counter::default();
        let poller = Poller::spawn(Duration::from_millis(100), counter.clone()).unwrap();
        thread::sleep(Duration::from_millis(350));
        poller.stop();
        let count = counter.0.load(Ordering::SeqCst);
        // Signals at ~0, 100, 200, 300 ms.
        assert!((3..=5).contains(&count), "got {count} signals");
    }

    #[test]
    fn test_channel_holds_one_pending_update() {
        let (mut tx, mut rx) = mpsc::channel::<()>(0);
        assert!(tx.signal());
        assert!(tx.signal());
        assert!(tx.signal());
        drop(tx);

        let mut pending = 0;
        while let Ok(Some(())) = rx.try_next() {
            pending += 1;
        }
        assert_eq!(pending, 1);
    }

    #[test]
    fn test_stops_when_receiver_dropped() {
        let (mut tx, rx) = mpsc::channel::<()>(0);
        drop(rx);
        assert!(!tx.signal());

        let poller = Poller::spawn(Duration::from_secs(3600), tx).unwrap();
        let started = Instant::now();
        poller.stop();
        assert!(started.elapsed() < Duration::from_secs(60));
    }

    #[test]
    fn test_stop_is_bounded_by_interval() {
        let poller = Poller::spawn(Duration::from_millis(50), Counter::default()).unwrap();
        let started = Instant::now();
        drop(poller);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
