// Copyright 2026 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cancellable background re-wrapping.
//!
//! Resizing a large document re-wraps every paragraph, which is too slow for
//! the UI thread. [`Rewrapper`] runs the pass on a worker thread over a clone
//! of the paragraph list; the owner keeps editing its copy and adopts the
//! result when it arrives, unless a newer request has superseded it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use log::debug;

use super::list::ParagraphList;

/// Paragraphs wrapped between generation checks on the worker.
const CANCEL_CHECK_INTERVAL: usize = 64;

struct WrapResult {
    generation: u64,
    break_width: u32,
    list: ParagraphList,
}

/// Owns the re-wrap worker protocol: a monotonically increasing generation
/// counter and a channel carrying finished lists back to the owner thread.
///
/// Each [`request`](Self::request) bumps the generation; a worker that
/// observes a newer generation abandons its pass. [`poll`](Self::poll)
/// discards stale results, so the owner only ever adopts the latest layout.
pub struct Rewrapper {
    generation: Arc<AtomicU64>,
    tx: Sender<WrapResult>,
    rx: Receiver<WrapResult>,
}

impl core::fmt::Debug for Rewrapper {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Rewrapper")
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl Default for Rewrapper {
    fn default() -> Self {
        Self::new()
    }
}

impl Rewrapper {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            tx,
            rx,
        }
    }

    /// Starts a background pass over `list` at `break_width`, superseding
    /// any pass still in flight.
    pub fn request(&self, mut list: ParagraphList, break_width: u32) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let current = Arc::clone(&self.generation);
        let tx = self.tx.clone();
        debug!(
            "rewrap generation {generation}: {} paragraphs at width {break_width}",
            list.len()
        );
        let spawned = thread::Builder::new()
            .name("galley-rewrap".into())
            .spawn(move || {
                let mut start = 0;
                loop {
                    if current.load(Ordering::SeqCst) != generation {
                        debug!("rewrap generation {generation} superseded");
                        return;
                    }
                    match list.relayout_from(start, break_width, Some(CANCEL_CHECK_INTERVAL)) {
                        None => break,
                        Some(resume) => start = resume,
                    }
                }
                debug!("rewrap generation {generation} finished");
                // The receiver dropping just means the owner is gone.
                let _ = tx.send(WrapResult {
                    generation,
                    break_width,
                    list,
                });
            });
        if let Err(err) = spawned {
            log::error!("failed to spawn rewrap worker: {err}");
        }
    }

    /// Invalidates any in-flight pass without starting a new one; its
    /// result, delivered or not, will no longer match the current
    /// generation.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Takes the most recent finished pass, if its generation is still
    /// current. Never blocks.
    pub fn poll(&self) -> Option<(ParagraphList, u32)> {
        let current = self.generation.load(Ordering::SeqCst);
        let mut latest = None;
        while let Ok(result) = self.rx.try_recv() {
            if result.generation == current {
                latest = Some((result.list, result.break_width));
            } else {
                debug!("dropping stale rewrap generation {}", result.generation);
            }
        }
        latest
    }

    /// Whether any request has been made since the last adopted result.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
