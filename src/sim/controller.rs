//! HVAC control strategies.
//!
//! A controller maps the per-step [`ControlState`] to a normalized action.
//! The engine clamps whatever comes back to `[-1, 1]` and replaces failed or
//! non-finite actions with [`fallback_action`].

use thiserror::Error;

use crate::config::ControllerConfig;

use super::expr::{Expr, ExprError};
use super::types::ControlState;

/// Gain of the fixed fallback policy.
pub const FALLBACK_GAIN: f64 = 0.5;

/// Why a controller could not produce an action for a step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlError {
    /// The formula never parsed; every step falls back.
    #[error("formula does not parse: {0}")]
    InvalidFormula(ExprError),

    /// The formula parsed but failed on this step's inputs.
    #[error("formula evaluation failed: {0}")]
    Evaluation(#[from] ExprError),

    /// Any other strategy-specific failure.
    #[error("controller failed: {0}")]
    Failed(String),
}

/// Strategy deciding the HVAC action each step.
///
/// Implemented for the built-in controllers and for any
/// `FnMut(&ControlState, usize) -> Result<f64, ControlError>` closure.
pub trait Controller {
    /// Returns the desired action for `step`. Values outside `[-1, 1]` are
    /// clamped by the engine.
    ///
    /// # Errors
    ///
    /// An error makes the engine apply the fallback policy for this step.
    fn action(&mut self, state: &ControlState, step: usize) -> Result<f64, ControlError>;
}

impl<F> Controller for F
where
    F: FnMut(&ControlState, usize) -> Result<f64, ControlError>,
{
    fn action(&mut self, state: &ControlState, step: usize) -> Result<f64, ControlError> {
        self(state, step)
    }
}

/// `clamp(gain × (target − outdoor), −1, 1)`.
fn proportional(gain: f64, state: &ControlState) -> f64 {
    (gain * (state.temp_target - state.outdoor_temp)).clamp(-1.0, 1.0)
}

/// The fixed policy used whenever a controller fails.
pub fn fallback_action(state: &ControlState) -> f64 {
    proportional(FALLBACK_GAIN, state)
}

/// Heats or cools in proportion to the outdoor/target gap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProportionalController {
    pub gain: f64,
}

impl ProportionalController {
    pub fn new(gain: f64) -> Self {
        Self { gain }
    }
}

impl Default for ProportionalController {
    fn default() -> Self {
        Self { gain: 0.6 }
    }
}

impl Controller for ProportionalController {
    fn action(&mut self, state: &ControlState, _step: usize) -> Result<f64, ControlError> {
        Ok(proportional(self.gain, state))
    }
}

/// Always applies the fallback policy. Never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackController;

impl Controller for FallbackController {
    fn action(&mut self, state: &ControlState, _step: usize) -> Result<f64, ControlError> {
        Ok(fallback_action(state))
    }
}

/// Evaluates a user formula written in the [`expr`](super::expr) grammar.
///
/// Construction never fails. A formula that does not parse is remembered and
/// reported on every step, so the whole run proceeds on the fallback policy.
#[derive(Debug, Clone)]
pub struct FormulaController {
    source: String,
    parsed: Result<Expr, ExprError>,
}

impl FormulaController {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let parsed = Expr::parse(&source);
        if let Err(e) = &parsed {
            let head: String = source.chars().take(80).collect();
            tracing::warn!(formula = %head, error = %e, "formula rejected, every step will fall back");
        }
        Self { source, parsed }
    }

    /// Formula text as supplied.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parse failure, if any.
    pub fn parse_error(&self) -> Option<&ExprError> {
        self.parsed.as_ref().err()
    }
}

impl Controller for FormulaController {
    fn action(&mut self, state: &ControlState, step: usize) -> Result<f64, ControlError> {
        match &self.parsed {
            Ok(expr) => Ok(expr.eval(state, step)?),
            Err(e) => Err(ControlError::InvalidFormula(e.clone())),
        }
    }
}

/// Built-in controller selected by a scenario file.
#[derive(Debug, Clone)]
pub enum ScenarioController {
    Proportional(ProportionalController),
    Fallback(FallbackController),
    Formula(FormulaController),
}

impl ScenarioController {
    /// Builds the controller named by `config.kind`.
    ///
    /// Unknown kinds are rejected by config validation; here they degrade to
    /// the fallback policy.
    pub fn from_config(config: &ControllerConfig) -> Self {
        match config.kind.as_str() {
            "proportional" => Self::Proportional(ProportionalController::new(config.gain)),
            "formula" => Self::Formula(FormulaController::new(
                config.formula.clone().unwrap_or_default(),
            )),
            _ => Self::Fallback(FallbackController),
        }
    }

    /// Short label for logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Proportional(_) => "proportional",
            Self::Fallback(_) => "fallback",
            Self::Formula(_) => "formula",
        }
    }
}

impl Controller for ScenarioController {
    fn action(&mut self, state: &ControlState, step: usize) -> Result<f64, ControlError> {
        match self {
            Self::Proportional(c) => c.action(state, step),
            Self::Fallback(c) => c.action(state, step),
            Self::Formula(c) => c.action(state, step),
        }
    }
}
