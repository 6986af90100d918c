//! Compute-once cell with single-flight semantics.
//!
//! Library images memoize their header and module descriptor. Both are
//! expensive to produce and must be produced exactly once per image, even
//! when several threads ask at the same time or when materializing a module
//! reaches back into the same image through a cross-module reference.
//!
//! - The first caller computes; concurrent callers block on a `Condvar` until
//!   the result is stored, then share it.
//! - Failures are stored like successes, so every caller sees the same error.
//! - A caller that re-enters the cell from inside its own computation gets
//!   `LibraryError::Cycle` instead of a deadlock. The same holds across
//!   threads: a caller about to wait on a thread that is itself (directly or
//!   through other waiters) waiting on the caller gets `Cycle` too.
//! - The lock is never held while the computation runs.

use std::sync::OnceLock;
use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex};

use crate::error::{LibraryError, Result};

/// Threads blocked on a cell: `(waiter, runner, cell)`.
///
/// A thread waits on at most one cell at a time, so following edges from a
/// runner walks a single chain.
static WAITS_FOR: Mutex<Vec<(ThreadId, ThreadId, usize)>> = Mutex::new(Vec::new());

/// Who, if anyone, is currently computing the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flight {
    Idle,
    Running(ThreadId),
}

/// A value computed at most once, guarded against racing and re-entrant
/// initialization.
#[derive(Debug)]
pub struct OnceCompute<T> {
    value: OnceLock<Result<T>>,
    flight: Mutex<Flight>,
    landed: Condvar,
}

impl<T> Default for OnceCompute<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OnceCompute<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            value: OnceLock::new(),
            flight: Mutex::new(Flight::Idle),
            landed: Condvar::new(),
        }
    }

    /// The stored outcome, if the computation has finished.
    pub fn get(&self) -> Option<Result<&T>> {
        self.value.get().map(stored)
    }

    /// Whether the computation has finished (successfully or not).
    pub fn is_complete(&self) -> bool {
        self.value.get().is_some()
    }

    /// Return the stored value, computing it first if nobody has yet.
    ///
    /// `owner` names the cell in the `Cycle` error raised on re-entry.
    pub fn get_or_compute(&self, owner: &str, compute: impl FnOnce() -> Result<T>) -> Result<&T> {
        if let Some(done) = self.value.get() {
            return stored(done);
        }

        let me = thread::current().id();
        {
            let mut flight = self.flight.lock();
            loop {
                if let Some(done) = self.value.get() {
                    return stored(done);
                }
                match *flight {
                    Flight::Idle => {
                        *flight = Flight::Running(me);
                        break;
                    }
                    Flight::Running(owner_thread) if owner_thread == me => {
                        return Err(LibraryError::Cycle {
                            library: owner.to_string(),
                        });
                    }
                    Flight::Running(runner) => {
                        {
                            let mut edges = WAITS_FOR.lock();
                            if leads_to(&edges, runner, me) {
                                return Err(LibraryError::Cycle {
                                    library: owner.to_string(),
                                });
                            }
                            edges.push((me, runner, self.id()));
                        }
                        self.landed.wait(&mut flight);
                        WAITS_FOR.lock().retain(|&(waiter, ..)| waiter != me);
                    }
                }
            }
        }

        // Reset the flight even if `compute` panics, so waiters retry instead
        // of blocking forever.
        let _landing = Landing { cell: self };
        let outcome = compute();
        stored(self.value.get_or_init(|| outcome))
    }

    fn id(&self) -> usize {
        std::ptr::from_ref(self) as usize
    }
}

/// Whether the chain of waits starting at `from` reaches `target`.
fn leads_to(edges: &[(ThreadId, ThreadId, usize)], from: ThreadId, target: ThreadId) -> bool {
    let mut current = from;
    for _ in 0..=edges.len() {
        if current == target {
            return true;
        }
        match edges.iter().find(|&&(waiter, ..)| waiter == current) {
            Some(&(_, runner, _)) => current = runner,
            None => return false,
        }
    }
    false
}

fn stored<T>(outcome: &Result<T>) -> Result<&T> {
    outcome.as_ref().map_err(Clone::clone)
}

/// Clears the in-flight marker and wakes waiters when dropped.
struct Landing<'a, T> {
    cell: &'a OnceCompute<T>,
}

impl<T> Drop for Landing<'_, T> {
    fn drop(&mut self) {
        let mut flight = self.cell.flight.lock();
        *flight = Flight::Idle;
        let cell = self.cell.id();
        WAITS_FOR.lock().retain(|&(.., waited_on)| waited_on != cell);
        drop(flight);
        self.cell.landed.notify_all();
    }
}
