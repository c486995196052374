//! Progress and control plane shared between the workers and an observer.
//!
//! Workers only ever read the control flags, at one checkpoint per pixel.
//! A single controller writes them. Pausing parks workers on a condition
//! variable; resume and cancel both wake them.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Flags {
    paused: bool,
    cancelled: bool,
}

/// Pause and cancel flags.
#[derive(Debug, Default)]
pub struct RenderControl {
    // Lock-free mirrors of `flags` for the per-pixel fast path
    paused: AtomicBool,
    cancelled: AtomicBool,
    flags: Mutex<Flags>,
    wake: Condvar,
}

impl RenderControl {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Flags> {
        // The guarded data is two booleans, a poisoned lock is still usable
        self.flags.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ask workers to stop after their current pixel.
    pub fn pause(&self) {
        let mut flags = self.lock();
        flags.paused = true;
        self.paused.store(true, Ordering::Release);
    }

    /// Let paused workers continue.
    pub fn resume(&self) {
        let mut flags = self.lock();
        flags.paused = false;
        self.paused.store(false, Ordering::Release);
        self.wake.notify_all();
    }

    /// Stop the render. Idempotent, and also releases paused workers.
    pub fn cancel(&self) {
        let mut flags = self.lock();
        flags.cancelled = true;
        self.cancelled.store(true, Ordering::Release);
        self.wake.notify_all();
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Worker checkpoint: blocks while paused, then reports whether to go on.
    ///
    /// Returns `false` once the render has been cancelled.
    pub fn checkpoint(&self) -> bool {
        if !self.paused.load(Ordering::Acquire) {
            return !self.cancelled.load(Ordering::Acquire);
        }

        let flags = self.lock();
        let flags = self
            .wake
            .wait_while(flags, |f| f.paused && !f.cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        !flags.cancelled
    }
}

/// Lifecycle of a render as seen by an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Idle,
    Running,
    Paused,
    Completed,
    Cancelled,
}

impl RenderState {
    fn to_u8(self) -> u8 {
        match self {
            RenderState::Idle => 0,
            RenderState::Running => 1,
            RenderState::Paused => 2,
            RenderState::Completed => 3,
            RenderState::Cancelled => 4,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => RenderState::Running,
            2 => RenderState::Paused,
            3 => RenderState::Completed,
            4 => RenderState::Cancelled,
            _ => RenderState::Idle,
        }
    }

    pub fn is_finished(self) -> bool {
        matches!(self, RenderState::Completed | RenderState::Cancelled)
    }
}

/// Point-in-time progress numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed_pixels: u64,
    pub total_pixels: u64,
    pub completed_tiles: usize,
    pub total_tiles: usize,
}

impl Progress {
    /// Completed share in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total_pixels == 0 {
            1.0
        } else {
            self.completed_pixels as f64 / self.total_pixels as f64
        }
    }
}

/// Live counters updated by the workers and read by observers.
#[derive(Debug)]
pub struct RenderProgress {
    completed_pixels: AtomicU64,
    total_pixels: u64,
    completed_tiles: AtomicUsize,
    total_tiles: usize,
    state: AtomicU8,
    started: Instant,
    // Elapsed nanoseconds frozen at the end of the render, u64::MAX while running
    finished_nanos: AtomicU64,
}

impl RenderProgress {
    pub fn new(total_pixels: u64, total_tiles: usize) -> Self {
        Self {
            completed_pixels: AtomicU64::new(0),
            total_pixels,
            completed_tiles: AtomicUsize::new(0),
            total_tiles,
            state: AtomicU8::new(RenderState::Idle.to_u8()),
            started: Instant::now(),
            finished_nanos: AtomicU64::new(u64::MAX),
        }
    }

    pub fn record_pixel(&self) {
        self.completed_pixels.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tile(&self) {
        self.completed_tiles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> Progress {
        Progress {
            completed_pixels: self.completed_pixels.load(Ordering::Relaxed),
            total_pixels: self.total_pixels,
            completed_tiles: self.completed_tiles.load(Ordering::Relaxed),
            total_tiles: self.total_tiles,
        }
    }

    pub(crate) fn set_state(&self, state: RenderState) {
        self.state.store(state.to_u8(), Ordering::Release);
    }

    /// Stored lifecycle state; pausing is layered on top by the handle.
    pub fn state(&self) -> RenderState {
        RenderState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Freeze the elapsed time and record the terminal state.
    pub(crate) fn finish(&self, state: RenderState) {
        let nanos = u64::try_from(self.started.elapsed().as_nanos()).unwrap_or(u64::MAX - 1);
        self.finished_nanos.store(nanos, Ordering::Release);
        self.set_state(state);
    }

    /// Time since the render started, frozen once it has finished.
    pub fn elapsed(&self) -> Duration {
        match self.finished_nanos.load(Ordering::Acquire) {
            u64::MAX => self.started.elapsed(),
            nanos => Duration::from_nanos(nanos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_flags_are_idempotent() {
        let control = RenderControl::new();
        assert!(control.checkpoint());

        control.pause();
        control.pause();
        assert!(control.is_paused());
        control.resume();
        control.resume();
        assert!(!control.is_paused());

        control.cancel();
        control.cancel();
        assert!(control.is_cancelled());
        assert!(!control.checkpoint());
    }

    #[test]
    fn test_paused_checkpoint_wakes_on_resume() {
        let control = Arc::new(RenderControl::new());
        control.pause();

        let worker = {
            let control = Arc::clone(&control);
            thread::spawn(move || control.checkpoint())
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!worker.is_finished());

        control.resume();
        assert!(worker.join().unwrap());
    }

    #[test]
    fn test_paused_checkpoint_wakes_on_cancel() {
        let control = Arc::new(RenderControl::new());
        control.pause();

        let worker = {
            let control = Arc::clone(&control);
            thread::spawn(move || control.checkpoint())
        };

        thread::sleep(Duration::from_millis(20));
        control.cancel();
        assert!(!worker.join().unwrap());
    }

    #[test]
    fn test_progress_counters() {
        let progress = RenderProgress::new(10, 2);
        assert_eq!(progress.state(), RenderState::Idle);

        for _ in 0..4 {
            progress.record_pixel();
        }
        progress.record_tile();

        let snapshot = progress.snapshot();
        assert_eq!(snapshot.completed_pixels, 4);
        assert_eq!(snapshot.completed_tiles, 1);
        assert_eq!(snapshot.total_tiles, 2);
        assert!((snapshot.fraction() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_elapsed_freezes_on_finish() {
        let progress = RenderProgress::new(1, 1);
        progress.set_state(RenderState::Running);
        thread::sleep(Duration::from_millis(5));
        progress.finish(RenderState::Completed);

        let frozen = progress.elapsed();
        assert!(frozen >= Duration::from_millis(5));
        thread::sleep(Duration::from_millis(5));
        assert_eq!(progress.elapsed(), frozen);
        assert!(progress.state().is_finished());
    }

    #[test]
    fn test_state_round_trip() {
        for state in [
            RenderState::Idle,
            RenderState::Running,
            RenderState::Paused,
            RenderState::Completed,
            RenderState::Cancelled,
        ] {
            assert_eq!(RenderState::from_u8(state.to_u8()), state);
        }
    }
}
