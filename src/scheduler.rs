// src/scheduler.rs

//! Cooperative chunked scheduling. A run enumerates `0..total` in slices of
//! at most `chunk` indices; one slice is executed per host frame, and a
//! generation token invalidates stale continuations when a new run starts.
//!
//! The token check is the whole cancellation mechanism: there is no
//! mid-chunk cancellation, so latency is bounded by one chunk's cost.

use log::{debug, trace, warn};
use std::ops::Range;

/// Identifies one scheduler run. Captured at run start; a continuation
/// holding a stale token gets no further work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunToken(u64);

/// Observable state of the current run, read once per yield boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Idle,
    InProgress { done: u64, total: u64 },
    Finished { done: u64 },
}

#[derive(Debug)]
struct ActiveRun {
    token: RunToken,
    cursor: u64,
    total: u64,
    chunk: u64,
    finished: bool,
}

/// Single-threaded pacing state. Never hands out two overlapping slices;
/// indices are issued in strictly increasing order, each exactly once.
#[derive(Debug, Default)]
pub struct ChunkedScheduler {
    generation: u64,
    run: Option<ActiveRun>,
}

impl ChunkedScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new run, invalidating any previous one. A zero `chunk` is
    /// clamped to 1 with a warning rather than rejected.
    pub fn begin(&mut self, total: u64, chunk: u64) -> RunToken {
        self.generation += 1;
        let token = RunToken(self.generation);
        let chunk = if chunk == 0 {
            warn!("chunk size 0 clamped to 1");
            1
        } else {
            chunk
        };
        debug!("run {token:?}: total={total} chunk={chunk}");
        self.run = Some(ActiveRun {
            token,
            cursor: 0,
            total,
            chunk,
            finished: total == 0,
        });
        token
    }

    /// Next index range for this run, or `None` when the token is stale or
    /// the run is done. One call is one yield boundary.
    pub fn next_slice(&mut self, token: RunToken) -> Option<Range<u64>> {
        let run = self.run.as_mut()?;
        if run.token != token {
            trace!("stale token {token:?}; current is {:?}", run.token);
            return None;
        }
        if run.finished || run.cursor >= run.total {
            return None;
        }
        let start = run.cursor;
        let end = run.total.min(start + run.chunk);
        run.cursor = end;
        if run.cursor >= run.total {
            run.finished = true;
        }
        trace!("run {token:?}: slice {start}..{end}");
        Some(start..end)
    }

    /// Marks the run complete before its enumeration is exhausted (the
    /// owner hit a termination condition). Stale tokens no-op.
    pub fn finish(&mut self, token: RunToken) {
        if let Some(run) = self.run.as_mut() {
            if run.token == token && !run.finished {
                debug!("run {token:?}: finished early at {}", run.cursor);
                run.finished = true;
            }
        }
    }

    /// Invalidates the current run without starting a new one.
    pub fn cancel(&mut self) {
        if self.run.take().is_some() {
            self.generation += 1;
            debug!("run cancelled; generation now {}", self.generation);
        }
    }

    #[inline]
    #[must_use]
    pub fn is_idle(&self) -> bool {
        match &self.run {
            None => true,
            Some(run) => run.finished,
        }
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        match &self.run {
            None => Progress::Idle,
            Some(run) if run.finished => Progress::Finished { done: run.cursor },
            Some(run) => Progress::InProgress {
                done: run.cursor,
                total: run.total,
            },
        }
    }
}
