//! Auto-fit: shrink the font until nothing scrolls sideways.
//!
//! The loop measures the content width at the current scale through an
//! injected function and steps the scale down until the content fits or the
//! floor is reached. Once the user zooms or scrolls by hand the loop stops
//! touching the scale until the view is reset.

use log::{debug, warn};
use serde::Serialize;

use crate::config::FitConfig;

/// Allowed slack when comparing widths.
const WIDTH_EPSILON: f64 = 1e-6;
/// Scales this close to the floor snap onto it.
const SCALE_EPSILON: f64 = 1e-9;
/// Hard cap on shrink steps, whatever the configured step size.
pub const MAX_FIT_STEPS: usize = 1000;

/// Who controls the font scale right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FitMode {
    Auto,
    Overridden,
}

/// Font scale of one song view and whether the user has taken over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FitState {
    pub font_scale: f64,
    pub user_overrode: bool,
}

impl FitState {
    pub fn new(config: &FitConfig) -> Self {
        FitState {
            font_scale: config.clamp(config.initial_scale),
            user_overrode: false,
        }
    }

    pub fn mode(&self) -> FitMode {
        if self.user_overrode {
            FitMode::Overridden
        } else {
            FitMode::Auto
        }
    }

    /// Back to automatic sizing at the initial scale. Only song loads and
    /// view mode changes call this.
    pub fn reset(&mut self, config: &FitConfig) {
        *self = FitState::new(config);
    }

    pub fn zoom_in(&mut self, config: &FitConfig) {
        self.set_scale(self.font_scale + config.zoom_step, config);
    }

    pub fn zoom_out(&mut self, config: &FitConfig) {
        self.set_scale(self.font_scale - config.zoom_step, config);
    }

    /// Manual resize. Disables auto-fit for this view.
    pub fn set_scale(&mut self, scale: f64, config: &FitConfig) {
        self.font_scale = config.clamp(scale);
        self.user_overrode = true;
    }

    /// The user scrolled the lyrics sideways. Disables auto-fit for this view.
    pub fn notice_manual_scroll(&mut self) {
        self.user_overrode = true;
    }
}

/// How an auto-fit pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitOutcome {
    /// Content fits after `steps` shrink steps
    Fits { steps: usize },
    /// Minimum scale reached and the content still overflows
    Floor { steps: usize },
    /// The user owns the scale; nothing was measured
    Overridden,
}

/// Shrink `state.font_scale` until `measure_width(scale) <= visible_width`.
///
/// Each iteration lowers the scale by `config.step` (never below
/// `config.min_scale`), so the loop runs at most
/// `ceil((scale - min_scale) / step) + 1` times, and never more than
/// [`MAX_FIT_STEPS`] + 1 times.
///
/// # Example
/// ```
/// use cancionero::config::FitConfig;
/// use cancionero::layout::{auto_fit, FitOutcome, FitState};
///
/// let config = FitConfig::default();
/// let mut state = FitState::new(&config);
///
/// // Content is 500px wide at scale 1.0 and shrinks linearly with it
/// let outcome = auto_fit(&mut state, &config, 400.0, |scale| 500.0 * scale);
///
/// assert_eq!(outcome, FitOutcome::Fits { steps: 4 });
/// assert!((state.font_scale - 0.8).abs() < 1e-9);
/// ```
pub fn auto_fit<F>(state: &mut FitState, config: &FitConfig, visible_width: f64, mut measure_width: F) -> FitOutcome
where
    F: FnMut(f64) -> f64,
{
    if state.user_overrode {
        return FitOutcome::Overridden;
    }

    let start = config.clamp(state.font_scale);
    let mut scale = start;
    let max_steps = step_bound(start, config);
    let mut steps = 0;

    loop {
        let width = measure_width(scale);
        debug!("auto-fit step {}: scale {:.3}, width {:.1} / {:.1}", steps, scale, width, visible_width);

        if width <= visible_width + WIDTH_EPSILON {
            state.font_scale = scale;
            return FitOutcome::Fits { steps };
        }
        if scale <= config.min_scale || steps >= max_steps {
            warn!(
                "auto-fit reached scale {:.3} with {:.1}px still overflowing",
                scale,
                width - visible_width
            );
            state.font_scale = scale;
            return FitOutcome::Floor { steps };
        }

        steps += 1;
        // Derived from the start rather than accumulated, so steps don't drift
        let next = start - steps as f64 * config.step;
        scale = if next.is_nan() || next < config.min_scale + SCALE_EPSILON {
            config.min_scale
        } else {
            next.min(start)
        };
    }
}

/// Shrink steps needed to go from `start` down to the floor, capped.
fn step_bound(start: f64, config: &FitConfig) -> usize {
    let needed = ((start - config.min_scale) / config.step).ceil();
    if needed.is_finite() && needed >= 0.0 {
        (needed as usize).saturating_add(1).min(MAX_FIT_STEPS)
    } else {
        MAX_FIT_STEPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> FitConfig {
        FitConfig {
            initial_scale: 1.0,
            min_scale: 0.5,
            max_scale: 2.0,
            step: 0.1,
            zoom_step: 0.25,
        }
    }

    #[test]
    fn test_no_overflow_keeps_scale() {
        let config = config();
        let mut state = FitState::new(&config);
        let outcome = auto_fit(&mut state, &config, 300.0, |scale| 200.0 * scale);
        assert_eq!(outcome, FitOutcome::Fits { steps: 0 });
        assert_eq!(state.font_scale, 1.0);
    }

    #[test]
    fn test_scale_strictly_decreases_until_fit() {
        let config = config();
        let mut state = FitState::new(&config);
        let mut seen = Vec::new();
        let outcome = auto_fit(&mut state, &config, 140.0, |scale| {
            seen.push(scale);
            200.0 * scale
        });

        assert_eq!(outcome, FitOutcome::Fits { steps: 3 });
        assert!(seen.windows(2).all(|w| w[1] < w[0]));
        assert!(200.0 * state.font_scale <= 140.0 + 1e-9);
        assert!((state.font_scale - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_floor_is_a_terminal_state() {
        let config = config();
        let mut state = FitState::new(&config);
        let mut calls = 0;
        let outcome = auto_fit(&mut state, &config, 10.0, |scale| {
            calls += 1;
            200.0 * scale
        });

        assert_eq!(outcome, FitOutcome::Floor { steps: 5 });
        assert_eq!(state.font_scale, 0.5);
        assert_eq!(calls, 6);
    }

    #[test]
    fn test_constant_width_terminates() {
        let config = config();
        let mut state = FitState::new(&config);
        let outcome = auto_fit(&mut state, &config, 10.0, |_| 1000.0);
        assert!(matches!(outcome, FitOutcome::Floor { .. }));
        assert_eq!(state.font_scale, config.min_scale);
    }

    #[test]
    fn test_degenerate_step_sizes_stay_bounded() {
        for step in [0.0, 1e-300, -0.1, f64::NAN] {
            let config = FitConfig { step, ..config() };
            let mut state = FitState::new(&config);
            let mut calls = 0;
            let outcome = auto_fit(&mut state, &config, 10.0, |_| {
                calls += 1;
                1000.0
            });
            assert!(matches!(outcome, FitOutcome::Floor { .. }), "step {}", step);
            assert!(calls <= MAX_FIT_STEPS + 1, "step {} measured {} times", step, calls);
        }
    }

    #[test]
    fn test_step_bound() {
        assert_eq!(step_bound(1.0, &config()), 6);
        assert_eq!(step_bound(0.5, &config()), 1);
        assert_eq!(step_bound(1.0, &FitConfig { step: 1e-300, ..config() }), MAX_FIT_STEPS);
        assert_eq!(step_bound(1.0, &FitConfig { step: 0.0, ..config() }), MAX_FIT_STEPS);
    }

    #[test]
    fn test_override_leaves_scale_alone() {
        let config = config();
        let mut state = FitState::new(&config);
        state.zoom_in(&config);
        assert_eq!(state.mode(), FitMode::Overridden);

        let mut called = false;
        let outcome = auto_fit(&mut state, &config, 10.0, |scale| {
            called = true;
            1000.0 * scale
        });
        assert_eq!(outcome, FitOutcome::Overridden);
        assert!(!called);
        assert_eq!(state.font_scale, 1.25);
    }

    #[test]
    fn test_manual_scroll_overrides() {
        let config = config();
        let mut state = FitState::new(&config);
        state.notice_manual_scroll();
        assert_eq!(auto_fit(&mut state, &config, 10.0, |_| 100.0), FitOutcome::Overridden);
        assert_eq!(state.font_scale, 1.0);
    }

    #[test]
    fn test_zoom_is_clamped_and_reset_restores_auto() {
        let config = config();
        let mut state = FitState::new(&config);
        for _ in 0..20 {
            state.zoom_out(&config);
        }
        assert_eq!(state.font_scale, config.min_scale);
        state.set_scale(9.0, &config);
        assert_eq!(state.font_scale, config.max_scale);

        state.reset(&config);
        assert_eq!(state.mode(), FitMode::Auto);
        assert_eq!(state.font_scale, 1.0);
    }
}
