//! Cooperative, resumable index construction
//!
//! ```text
//! Idle --start--> Running(current, total) --step*--> Done
//!                        |
//!                        +--cancel--> Cancelled
//! ```
//!
//! Each [`IncrementalIndexBuilder::step`] performs one palette slot's
//! full raster scan, so a single-threaded host can interleave steps
//! with its own event handling. The builder owns snapshots of the raster
//! and palette taken at [`start`](IncrementalIndexBuilder::start); edits
//! to the live document after that do not reach the build.
//!
//! The builder is `Send`, so a host may also drive it from a worker
//! thread. The finished [`PositionIndex`] only leaves the builder as a
//! whole, from the step that completes it.

use super::{IndexEntry, PositionIndex, scan_slot};
use crate::palette::Palette;
use crate::raster::Raster;

/// Builder state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildState {
    /// Not started
    #[default]
    Idle,
    /// `current` slots of `total` done
    Running { current: usize, total: usize },
    /// Finished; the index was handed out
    Done,
    /// Cancelled before finishing
    Cancelled,
}

/// Outcome of one [`IncrementalIndexBuilder::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// One more slot scanned
    Progress { current: usize, total: usize },
    /// Last slot scanned; the finished index
    Complete(PositionIndex),
    /// The build was cancelled; nothing was done
    Cancelled,
    /// Not running (never started or already done); nothing was done
    Idle,
}

impl Step {
    /// Percentage for progress displays, 100 once complete.
    pub fn percent(&self) -> Option<u8> {
        match self {
            Step::Progress { current, total } if *total > 0 => {
                Some((current * 100 / total) as u8)
            }
            Step::Progress { .. } | Step::Complete(_) => Some(100),
            Step::Cancelled | Step::Idle => None,
        }
    }
}

/// Drives [`PositionIndex`] construction one palette slot at a time.
#[derive(Debug, Default)]
pub struct IncrementalIndexBuilder {
    state: BuildState,
    raster: Option<Raster>,
    palette: Palette,
    entries: Vec<IndexEntry>,
}

impl IncrementalIndexBuilder {
    /// Create an idle builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder already started on the given snapshot.
    pub fn started(raster: &Raster, palette: &Palette) -> Self {
        let mut builder = Self::new();
        builder.start(raster, palette);
        builder
    }

    /// Reset to `Running(0, palette.len())` on snapshots of the inputs.
    ///
    /// Any previous progress is discarded.
    pub fn start(&mut self, raster: &Raster, palette: &Palette) {
        self.raster = Some(raster.clone());
        self.palette = palette.clone();
        self.entries = Vec::with_capacity(palette.len());
        self.state = BuildState::Running {
            current: 0,
            total: palette.len(),
        };
        log::debug!(
            "incremental index build started: {} slots over {}x{} raster",
            palette.len(),
            raster.width(),
            raster.height()
        );
    }

    /// Scan the next palette slot.
    pub fn step(&mut self) -> Step {
        let (current, total) = match self.state {
            BuildState::Running { current, total } => (current, total),
            BuildState::Cancelled => return Step::Cancelled,
            BuildState::Idle | BuildState::Done => return Step::Idle,
        };

        if current < total
            && let (Some(raster), Some(color)) = (&self.raster, self.palette.get(current))
        {
            self.entries.push(IndexEntry {
                id: Palette::id_of(current),
                color,
                positions: scan_slot(raster, color),
            });
        }

        let current = (current + 1).min(total);
        if current < total {
            self.state = BuildState::Running { current, total };
            return Step::Progress { current, total };
        }

        self.state = BuildState::Done;
        self.raster = None;
        log::debug!("incremental index build complete: {total} slots");
        Step::Complete(PositionIndex {
            entries: std::mem::take(&mut self.entries),
        })
    }

    /// Stop the build. Has no effect once done or already cancelled.
    pub fn cancel(&mut self) {
        if matches!(self.state, BuildState::Idle | BuildState::Running { .. }) {
            log::debug!("incremental index build cancelled in state {:?}", self.state);
            self.state = BuildState::Cancelled;
            self.raster = None;
            self.entries.clear();
        }
    }

    /// Step until the build finishes or is cancelled.
    ///
    /// Returns `None` if the builder was not running.
    pub fn run_to_completion(&mut self) -> Option<PositionIndex> {
        loop {
            match self.step() {
                Step::Progress { .. } => continue,
                Step::Complete(index) => return Some(index),
                Step::Cancelled | Step::Idle => return None,
            }
        }
    }

    /// Current state.
    pub fn state(&self) -> BuildState {
        self.state
    }

    /// True while steps remain.
    pub fn is_running(&self) -> bool {
        matches!(self.state, BuildState::Running { .. })
    }

    /// Palette snapshot the build runs against.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }
}
