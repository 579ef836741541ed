//! Mock pointer source for tests.
//!
//! Replays a script of positions and errors in order. Once the script runs
//! out, every further query returns `exhausted`, which defaults to
//! [`PointerError::NoActiveWindow`].

use std::collections::VecDeque;

use cursorlink_core::RawPosition;

use crate::application::stream_pointer::{PointerError, PointerSource};

/// A pointer source driven by a fixed script.
#[derive(Debug)]
pub struct ScriptedPointerSource {
    script: VecDeque<Result<RawPosition, PointerError>>,
    /// Result returned after the script is exhausted.
    pub exhausted: Result<RawPosition, PointerError>,
    /// Number of queries served so far.
    pub queries: usize,
}

impl ScriptedPointerSource {
    pub fn new(script: impl IntoIterator<Item = Result<RawPosition, PointerError>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            exhausted: Err(PointerError::NoActiveWindow),
            queries: 0,
        }
    }

    /// A source that reports the given positions, then no active window.
    pub fn positions(positions: impl IntoIterator<Item = (i32, i32)>) -> Self {
        Self::new(
            positions
                .into_iter()
                .map(|(x, y)| Ok(RawPosition::new(x, y))),
        )
    }
}

impl PointerSource for ScriptedPointerSource {
    fn query_position(&mut self) -> Result<RawPosition, PointerError> {
        self.queries += 1;
        self.script
            .pop_front()
            .unwrap_or_else(|| self.exhausted.clone())
    }
}
