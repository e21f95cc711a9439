use alloc::sync::Arc;
use core::sync::atomic::{AtomicU32, Ordering};

const RUNNING: u32 = 1 << 31;
const SECONDS: u32 = !RUNNING;

/// Whole-second counter advanced by an external tick source.
///
/// The running flag and the seconds share one atomic word, so a [`Ticker::tick`] racing with [`Clock::stop`] either
/// lands before the stop or not at all.
#[derive(Debug, Default)]
pub struct Clock {
    word: Arc<AtomicU32>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts counting, returns `false` if it was already running.
    pub fn start(&mut self) -> bool {
        self.word.fetch_or(RUNNING, Ordering::AcqRel) & RUNNING == 0
    }

    pub fn stop(&mut self) {
        self.word.fetch_and(SECONDS, Ordering::AcqRel);
    }

    /// Zero and stopped.
    pub fn reset(&mut self) {
        self.word.store(0, Ordering::Release);
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.word.load(Ordering::Acquire) & SECONDS
    }

    pub fn is_running(&self) -> bool {
        self.word.load(Ordering::Acquire) & RUNNING != 0
    }

    /// Handle for the periodic tick source. It stays bound across resets.
    pub fn ticker(&self) -> Ticker {
        Ticker {
            word: Arc::clone(&self.word),
        }
    }
}

/// Tick-only handle onto a [`Clock`], meant to be driven once per second.
#[derive(Clone, Debug)]
pub struct Ticker {
    word: Arc<AtomicU32>,
}

impl Ticker {
    /// Advances the clock by one second if it is running. Returns whether it advanced.
    pub fn tick(&self) -> bool {
        self.word
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |word| {
                (word & RUNNING != 0 && word & SECONDS != SECONDS).then_some(word + 1)
            })
            .is_ok()
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.word.load(Ordering::Acquire) & SECONDS
    }
}
