//! Input: polled key state and cursor motion turned into view actions.
//!
//! # Invariants
//! - One-shot actions fire on a rising edge only; holding a key never repeats them.
//! - The first cursor sample only seeds tracking and yields no motion.

pub mod action;
mod edge;
mod key;

pub use action::{Action, ActionMapper};
pub use edge::{CursorTracker, EdgeDetector};
pub use key::{HeldKeys, InputSource, Key};

pub fn crate_info() -> &'static str {
    "deskscene-input v0.1.0"
}
