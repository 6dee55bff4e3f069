//! Majority vote over consecutive per-frame predictions.

use log::debug;
use serde::{Deserialize, Serialize};

pub const DEFAULT_WINDOW: usize = 5;

/// Winner of one full window of frames.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteDecision {
    pub label: String,
    pub votes: usize,
    pub frames: usize,
}

/// Counts predicted labels and emits the most frequent one every `window`
/// frames, then starts over. Ties go to the label seen first in the window.
#[derive(Clone, Debug)]
pub struct FrameVote {
    window: usize,
    frames: usize,
    counts: Vec<(String, usize)>,
}

impl Default for FrameVote {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl FrameVote {
    /// A window of zero is treated as one.
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            frames: 0,
            counts: Vec::new(),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Frames counted since the last decision.
    pub fn pending(&self) -> usize {
        self.frames
    }

    pub fn push(&mut self, label: &str) -> Option<VoteDecision> {
        match self.counts.iter_mut().find(|(l, _)| l == label) {
            Some((_, n)) => *n += 1,
            None => self.counts.push((label.to_owned(), 1)),
        }
        self.frames += 1;
        if self.frames < self.window {
            return None;
        }

        let mut best = 0;
        for (k, (_, n)) in self.counts.iter().enumerate().skip(1) {
            if *n > self.counts[best].1 {
                best = k;
            }
        }
        let (label, votes) = self.counts.swap_remove(best);
        let decision = VoteDecision {
            label,
            votes,
            frames: self.frames,
        };
        debug!(
            "vote: {:?} with {}/{} frames",
            decision.label, decision.votes, decision.frames
        );
        self.reset();
        Some(decision)
    }

    pub fn reset(&mut self) {
        self.frames = 0;
        self.counts.clear();
    }
}
