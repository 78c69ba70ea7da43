//! Single-slot debounce timer.
//!
//! At most one timer is live per [`Debouncer`]. Scheduling always cancels
//! the pending timer first, so a burst of edits yields one firing, for the
//! last edit, one interval after it. Only the timer is cancellable: once it
//! has fired, whatever `on_fire` started is out of the debouncer's reach.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Observable state of the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    /// Nothing pending.
    Idle,
    /// A timer will fire at `deadline` unless superseded.
    Scheduled { deadline: Instant, generation: u64 },
}

#[derive(Debug)]
struct DebounceSlot {
    state: DebounceState,
    timer: Option<JoinHandle<()>>,
    generation: u64,
}

impl DebounceSlot {
    fn cancel(&mut self) -> bool {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        let was_scheduled = matches!(self.state, DebounceState::Scheduled { .. });
        self.state = DebounceState::Idle;
        was_scheduled
    }

    /// Claim the firing for `generation`. False if it was superseded.
    fn claim(&mut self, generation: u64) -> bool {
        match self.state {
            DebounceState::Scheduled { generation: g, .. } if g == generation => {
                self.state = DebounceState::Idle;
                self.timer = None;
                true
            }
            _ => false,
        }
    }
}

/// Cancel-then-replace debounce timer.
///
/// Cheap to clone; clones share the same slot.
#[derive(Debug, Clone)]
pub struct Debouncer {
    slot: Arc<Mutex<DebounceSlot>>,
    delay: Duration,
}

impl Debouncer {
    /// Create an idle debouncer with the given quiescence interval.
    pub fn new(delay: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(DebounceSlot {
                state: DebounceState::Idle,
                timer: None,
                generation: 0,
            })),
            delay,
        }
    }

    /// The quiescence interval.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Current state of the slot.
    pub fn state(&self) -> DebounceState {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).state
    }

    /// Generation of the most recently scheduled timer (0 if none yet).
    pub fn latest_generation(&self) -> u64 {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).generation
    }

    /// Cancel the pending timer, if any. Returns true if one was pending.
    pub fn cancel(&self) -> bool {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).cancel()
    }

    /// Cancel any pending timer and schedule `on_fire` one interval from now.
    ///
    /// `on_fire` receives the generation it was scheduled under. Must be
    /// called from within a tokio runtime.
    pub fn schedule<F>(&self, on_fire: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.cancel() {
            tracing::debug!("superseded pending debounce timer");
        }

        slot.generation += 1;
        let generation = slot.generation;
        let deadline = Instant::now() + self.delay;
        slot.state = DebounceState::Scheduled {
            deadline,
            generation,
        };

        let shared = Arc::clone(&self.slot);
        slot.timer = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let claimed = shared
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .claim(generation);
            if claimed {
                on_fire(generation);
            }
        }));

        generation
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    const DELAY: Duration = Duration::from_millis(1000);

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_delay() {
        let debouncer = Debouncer::new(DELAY);
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        debouncer.schedule(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::advance(Duration::from_millis(999)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(matches!(debouncer.state(), DebounceState::Scheduled { generation: 1, .. }));

        tokio::time::advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(debouncer.state(), DebounceState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_supersedes_the_pending_timer() {
        let debouncer = Debouncer::new(DELAY);
        let fired = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(AtomicU64::new(0));

        for _ in 0..5 {
            let fired = Arc::clone(&fired);
            let last = Arc::clone(&last);
            debouncer.schedule(move |generation| {
                fired.fetch_add(1, Ordering::SeqCst);
                last.store(generation, Ordering::SeqCst);
            });
            tokio::time::advance(Duration::from_millis(600)).await;
            settle().await;
        }
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::advance(DELAY).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(last.load(Ordering::SeqCst), 5);
        assert_eq!(debouncer.latest_generation(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_firing() {
        let debouncer = Debouncer::new(DELAY);
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        debouncer.schedule(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());
        assert_eq!(debouncer.state(), DebounceState::Idle);

        tokio::time::advance(DELAY * 2).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_is_one_interval_after_scheduling() {
        let debouncer = Debouncer::new(DELAY);
        let start = Instant::now();
        debouncer.schedule(|_| {});
        match debouncer.state() {
            DebounceState::Scheduled { deadline, .. } => assert_eq!(deadline, start + DELAY),
            DebounceState::Idle => panic!("expected a scheduled timer"),
        }
    }
}
