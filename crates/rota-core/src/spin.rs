//! Spin animation and outcome resolution.
//!
//! Wheel-local slice `i` spans `[i*w, (i+1)*w)`. On screen it is drawn rotated by
//! `origin + rotation`, where `origin = pointer - w/2`, so at rotation 0 slice 0 sits centered
//! under the pointer. The slice under the pointer for any rotation is therefore the one containing
//! the local angle `normalize(pointer - rotation - origin)`.

use crate::geometry::{normalize_angle, signed_delta, slice_at, slice_width};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use serde_with::DeserializeFromStr;
use std::f64::consts::{FRAC_PI_2, PI, TAU};
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;

/// Fixed screen position of the pointer that reads off the result.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Pointer {
    #[default]
    #[strum(serialize = "Top", serialize = "north", serialize = "n")]
    Top,
    #[strum(serialize = "Right", serialize = "east", serialize = "e")]
    Right,
    #[strum(serialize = "Bottom", serialize = "south", serialize = "s")]
    Bottom,
    #[strum(serialize = "Left", serialize = "west", serialize = "w")]
    Left,
}

impl Pointer {
    /// Screen angle in `[0, 2π)`, y axis pointing down.
    pub fn angle(self) -> f64 {
        match self {
            Self::Top => normalize_angle(-FRAC_PI_2),
            Self::Right => 0.0,
            Self::Bottom => FRAC_PI_2,
            Self::Left => PI,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinConfig {
    pub duration_ms: u64,
    /// Full turns every spin makes before the random offset.
    pub min_turns: u32,
    /// Upper bound of the random extra turns added on top of `min_turns`.
    pub extra_turns: u32,
    pub pointer: Pointer,
    /// Fixes the random sequence, making every spin of a session reproducible.
    pub seed: Option<u64>,
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            duration_ms: 5000,
            min_turns: 6,
            extra_turns: 1,
            pointer: Pointer::Top,
            seed: None,
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinError {
    #[error("There are no items on the wheel to spin")]
    EmptyWheel,
    #[error("The wheel is already spinning")]
    AlreadySpinning,
}

pub fn ease_out_cubic(x: f64) -> f64 {
    let x = x.clamp(0.0, 1.0);
    1.0 - (1.0 - x).powi(3)
}

/// Fraction of the animation elapsed, clamped to `[0, 1]`.
pub fn progress(elapsed_ms: f64, duration_ms: f64) -> f64 {
    if duration_ms <= 0.0 || elapsed_ms >= duration_ms {
        return 1.0;
    }
    (elapsed_ms / duration_ms).clamp(0.0, 1.0)
}

pub fn rotation_origin(pointer: f64, count: usize) -> f64 {
    pointer - slice_width(count) / 2.0
}

/// Wheel-local angle sitting under the pointer at `rotation`.
pub fn pointer_local_angle(pointer: f64, rotation: f64, count: usize) -> f64 {
    normalize_angle(pointer - rotation - rotation_origin(pointer, count))
}

/// Screen angle of a wheel-local angle at `rotation`.
pub fn screen_angle(local: f64, pointer: f64, rotation: f64, count: usize) -> f64 {
    normalize_angle(rotation_origin(pointer, count) + rotation + local)
}

pub fn resolve_index(pointer: f64, rotation: f64, count: usize) -> usize {
    slice_at(pointer_local_angle(pointer, rotation, count), count)
}

/// Rotation nearest to `rotation` that puts slice `index`'s bisector exactly under the pointer.
pub fn snap_to_slice(pointer: f64, rotation: f64, index: usize, count: usize) -> f64 {
    let bisector = (index as f64 + 0.5) * slice_width(count);
    rotation + signed_delta(screen_angle(bisector, pointer, rotation, count), pointer)
}

/// How far one spin turns the wheel. Only `offset` decides the outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinPlan {
    pub turns: u32,
    pub offset: f64,
}

impl SpinPlan {
    pub fn random<R: Rng>(rng: &mut R, config: &SpinConfig) -> Self {
        Self {
            turns: config
                .min_turns
                .saturating_add(rng.gen_range(0..=config.extra_turns)),
            offset: rng.gen_range(0.0..TAU),
        }
    }

    pub fn delta(&self) -> f64 {
        TAU * self.turns as f64 + self.offset
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpinState {
    pub current_angle: f64,
    pub start_angle: f64,
    pub target_angle: f64,
    /// Set on the first frame after the request, so scheduling latency is not animated away.
    pub start_timestamp: Option<f64>,
    pub duration_ms: f64,
    pub item_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settlement {
    pub index: usize,
    /// Where the eased animation stopped, before snapping.
    pub raw_angle: f64,
    pub angle: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    Spinning(SpinState),
    Settled(Settlement),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    Idle,
    Frame { angle: f64 },
    Settled(Settlement),
}

pub struct SpinResolver<R = Pcg64> {
    rng: R,
    config: SpinConfig,
    angle: f64,
    phase: Phase,
}

impl SpinResolver<Pcg64> {
    pub fn new(config: SpinConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> SpinResolver<R> {
    pub fn with_rng(config: SpinConfig, rng: R) -> Self {
        Self {
            rng,
            config,
            angle: 0.0,
            phase: Phase::Idle,
        }
    }

    pub fn config(&self) -> &SpinConfig {
        &self.config
    }

    /// Applies to the next spin; an animation in flight keeps its own duration.
    pub fn set_config(&mut self, config: SpinConfig) {
        self.config = config;
    }

    pub fn pointer_angle(&self) -> f64 {
        self.config.pointer.angle()
    }

    /// Current rotation, unbounded.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_spinning(&self) -> bool {
        matches!(self.phase, Phase::Spinning(_))
    }

    pub fn request_spin(&mut self, item_count: usize) -> Result<SpinState, SpinError> {
        self.check_can_start(item_count)?;
        let plan = SpinPlan::random(&mut self.rng, &self.config);
        self.start(plan, item_count)
    }

    pub fn start(&mut self, plan: SpinPlan, item_count: usize) -> Result<SpinState, SpinError> {
        self.check_can_start(item_count)?;
        let state = SpinState {
            current_angle: self.angle,
            start_angle: self.angle,
            target_angle: self.angle + plan.delta(),
            start_timestamp: None,
            duration_ms: self.config.duration_ms as f64,
            item_count,
        };
        log::debug!(
            "Spin started: {} turns + {:.4} rad over {} ms",
            plan.turns,
            plan.offset,
            state.duration_ms
        );
        self.phase = Phase::Spinning(state.clone());
        Ok(state)
    }

    fn check_can_start(&self, item_count: usize) -> Result<(), SpinError> {
        if item_count == 0 {
            return Err(SpinError::EmptyWheel);
        }
        if self.is_spinning() {
            return Err(SpinError::AlreadySpinning);
        }
        Ok(())
    }

    /// Advances the animation to `now_ms`. Called once per display frame.
    pub fn tick(&mut self, now_ms: f64) -> Tick {
        let Phase::Spinning(state) = &mut self.phase else {
            return Tick::Idle;
        };

        let started = *state.start_timestamp.get_or_insert(now_ms);
        let p = progress(now_ms - started, state.duration_ms);
        state.current_angle =
            state.start_angle + (state.target_angle - state.start_angle) * ease_out_cubic(p);
        self.angle = state.current_angle;

        if p < 1.0 {
            return Tick::Frame { angle: self.angle };
        }

        let pointer = self.config.pointer.angle();
        let count = state.item_count;
        let raw_angle = state.target_angle;
        let index = resolve_index(pointer, raw_angle, count);
        let settlement = Settlement {
            index,
            raw_angle,
            angle: snap_to_slice(pointer, raw_angle, index, count),
        };
        self.angle = settlement.angle;
        self.phase = Phase::Settled(settlement);
        Tick::Settled(settlement)
    }
}
