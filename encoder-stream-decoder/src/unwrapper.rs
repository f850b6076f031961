//! Absolute to incremental position conversion
//!
//! An absolute encoder reports its angle modulo the resolution `N`, with no
//! memory of previous revolutions. [`EncoderUnwrapper`] accumulates the
//! per-sample motion into an unbounded signed position, correcting for the
//! jump that appears whenever the reading passes through the `N-1 → 0`
//! boundary in either direction.
//!
//! # Precondition
//!
//! The true motion between two consecutive samples must stay below `N/2`
//! counts. Faster motion (or too slow sampling) is indistinguishable from a
//! rollover in the opposite direction and is silently mis-unwrapped.

use crate::types::{AbsoluteSample, Resolution};

/// Per-channel unwrapper state
///
/// Owned by the caller and passed into [`EncoderUnwrapper::update`]; channels
/// never share state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnwrapperState {
    /// No sample seen yet
    #[default]
    Uninitialized,
    /// Tracking a running position
    Initialized {
        /// Accumulated incremental count since the first sample
        position: i64,
        /// Most recent absolute sample
        last_absolute: AbsoluteSample,
    },
}

impl UnwrapperState {
    /// Current position, `None` until the first sample
    pub fn position(&self) -> Option<i64> {
        match self {
            UnwrapperState::Uninitialized => None,
            UnwrapperState::Initialized { position, .. } => Some(*position),
        }
    }

    /// Last absolute sample consumed, `None` until the first sample
    pub fn last_absolute(&self) -> Option<AbsoluteSample> {
        match self {
            UnwrapperState::Uninitialized => None,
            UnwrapperState::Initialized { last_absolute, .. } => Some(*last_absolute),
        }
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self, UnwrapperState::Initialized { .. })
    }
}

/// Which branch of the unwrap a sample took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rollover {
    /// Plain motion within half a revolution (or the first sample)
    None,
    /// Reading wrapped from the top of the range past zero (position increased)
    Forward,
    /// Reading wrapped from zero past the top of the range (position decreased)
    Backward,
}

/// Result of a single unwrap step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnwrapStep {
    /// Incremental position after the step
    pub position: i64,
    /// Rollover detected on this step
    pub rollover: Rollover,
}

/// Converts absolute samples of a fixed resolution into incremental positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncoderUnwrapper {
    resolution: Resolution,
}

impl EncoderUnwrapper {
    /// Create an unwrapper for encoders with `resolution` counts per revolution
    pub fn new(resolution: Resolution) -> Self {
        Self { resolution }
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Feed the next absolute sample of a channel and return its new position
    pub fn update(&self, state: &mut UnwrapperState, sample: AbsoluteSample) -> i64 {
        self.step(state, sample).position
    }

    /// Like [`update`](Self::update), also reporting any detected rollover
    ///
    /// The first sample of a fresh state becomes the reference point and
    /// yields position 0. Afterwards the signed difference to the previous
    /// sample is added, shifted by one revolution when its magnitude exceeds
    /// `N/2`. A difference of exactly `±N/2` is taken as plain motion.
    pub fn step(&self, state: &mut UnwrapperState, sample: AbsoluteSample) -> UnwrapStep {
        let (position, rollover) = match *state {
            UnwrapperState::Uninitialized => (0, Rollover::None),
            UnwrapperState::Initialized { position, last_absolute } => {
                let n = i64::from(self.resolution.get());
                let half = self.resolution.half();
                let delta = i64::from(sample) - i64::from(last_absolute);

                if delta > half {
                    (position.wrapping_add(delta - n), Rollover::Backward)
                } else if delta < -half {
                    (position.wrapping_add(delta + n), Rollover::Forward)
                } else {
                    (position.wrapping_add(delta), Rollover::None)
                }
            }
        };

        *state = UnwrapperState::Initialized {
            position,
            last_absolute: sample,
        };

        UnwrapStep { position, rollover }
    }
}

/// Free-function form of [`EncoderUnwrapper::update`]
pub fn update(state: &mut UnwrapperState, sample: AbsoluteSample, resolution: Resolution) -> i64 {
    EncoderUnwrapper::new(resolution).update(state, sample)
}
