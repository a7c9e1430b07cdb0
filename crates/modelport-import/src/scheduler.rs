// ModelPort - 3D Model Import Pipeline
// Copyright (C) 2025 ModelPort Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

//! Cooperative, single-threaded task primitives
//!
//! Everything here runs on the caller's task. Nothing is spawned and no state
//! is shared across threads:
//!
//! - [`run_sequential`] drives indexed subtasks strictly one after another
//! - [`next_turn`] / [`defer`] hand control back to the runtime for one turn
//! - [`CompletionLatch`] joins a known number of completions
//!
//! # Example
//!
//! ```rust
//! use modelport_import::scheduler::{run_sequential, CompletionLatch};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let latch = CompletionLatch::new(3);
//! let squares = run_sequential(3, |_, _| {}, |index| {
//!     let latch = &latch;
//!     async move {
//!         latch.count_down();
//!         index * index
//!     }
//! })
//! .await;
//! latch.wait().await;
//! assert_eq!(squares, vec![0, 1, 4]);
//! # }
//! ```

use std::future::Future;
use tokio::sync::watch;

/// Run `count` indexed subtasks in index order, one in flight at a time.
///
/// `on_start(index, count)` is called immediately before each subtask starts.
/// Outputs are returned in index order once the last subtask has finished.
pub async fn run_sequential<T, S, F, Fut>(count: usize, mut on_start: S, mut task: F) -> Vec<T>
where
    S: FnMut(usize, usize),
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = T>,
{
    let mut outputs = Vec::with_capacity(count);
    for index in 0..count {
        on_start(index, count);
        outputs.push(task(index).await);
    }
    outputs
}

/// Yield to the runtime so pending work gets one turn before we continue
pub async fn next_turn() {
    tokio::task::yield_now().await;
}

/// Run `f` only after the current call stack has given up control once
pub async fn defer<T, F>(f: F) -> T
where
    F: FnOnce() -> T,
{
    next_turn().await;
    f()
}

/// Count-down join for a fixed number of expected completions.
///
/// Waiting on a latch whose count is already zero returns immediately, so a
/// condition that is already satisfied and one that becomes satisfied later
/// look the same to the waiter.
#[derive(Debug)]
pub struct CompletionLatch {
    remaining: watch::Sender<usize>,
}

impl CompletionLatch {
    /// Create a latch expecting `count` completions
    pub fn new(count: usize) -> Self {
        let (remaining, _) = watch::channel(count);
        CompletionLatch { remaining }
    }

    /// Record one completion; extra calls past zero are ignored
    pub fn count_down(&self) {
        self.remaining.send_modify(|remaining| {
            *remaining = remaining.saturating_sub(1);
        });
    }

    /// Completions still outstanding
    pub fn remaining(&self) -> usize {
        *self.remaining.borrow()
    }

    /// Whether every expected completion has happened
    pub fn is_done(&self) -> bool {
        self.remaining() == 0
    }

    /// Wait until the count reaches zero
    pub async fn wait(&self) {
        let mut receiver = self.remaining.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = receiver.wait_for(|remaining| *remaining == 0).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[tokio::test]
    async fn test_run_sequential_preserves_order() {
        let log = RefCell::new(Vec::new());
        let outputs = run_sequential(
            3,
            |index, total| log.borrow_mut().push(format!("start {}/{}", index, total)),
            |index| {
                let log = &log;
                async move {
                    next_turn().await;
                    log.borrow_mut().push(format!("done {}", index));
                    index + 10
                }
            },
        )
        .await;

        assert_eq!(outputs, vec![10, 11, 12]);
        assert_eq!(
            log.into_inner(),
            vec![
                "start 0/3", "done 0", "start 1/3", "done 1", "start 2/3", "done 2"
            ]
        );
    }

    #[tokio::test]
    async fn test_run_sequential_zero_tasks() {
        let mut started = 0;
        let outputs: Vec<()> = run_sequential(0, |_, _| started += 1, |_| async {}).await;
        assert!(outputs.is_empty());
        assert_eq!(started, 0);
    }

    #[tokio::test]
    async fn test_defer_runs_after_turn() {
        let value = defer(|| 42).await;
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_latch_already_done() {
        let latch = CompletionLatch::new(0);
        assert!(latch.is_done());
        latch.wait().await;
    }

    #[tokio::test]
    async fn test_latch_counts_down() {
        let latch = CompletionLatch::new(2);
        latch.count_down();
        assert_eq!(latch.remaining(), 1);
        assert!(!latch.is_done());

        let waiter = async {
            latch.wait().await;
            "joined"
        };
        let completer = async {
            next_turn().await;
            latch.count_down();
        };
        let (joined, _) = tokio::join!(waiter, completer);
        assert_eq!(joined, "joined");
        assert!(latch.is_done());
    }

    #[test]
    fn test_latch_saturates() {
        let latch = CompletionLatch::new(1);
        latch.count_down();
        latch.count_down();
        assert_eq!(latch.remaining(), 0);
    }
}
