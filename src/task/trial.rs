// src/task/trial.rs
use rand::Rng;
use serde::{Serialize, Serializer};

use super::{present, Experiment};
use crate::config::{seconds, AdaptationConfig};
use crate::error::{ExperimentError, Result};
use crate::frontend::Frontend;
use crate::triggers::TriggerKind;
use crate::utils::log::DATA_TARGET;

// -----------------------------------------------------------------------------
// TRIAL DATA
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Pos,
    Neg,
    Neu,
}

impl Feedback {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feedback::Pos => "pos",
            Feedback::Neg => "neg",
            Feedback::Neu => "neu",
        }
    }

    fn trigger(&self) -> TriggerKind {
        match self {
            Feedback::Pos => TriggerKind::FeedbackPos,
            Feedback::Neg => TriggerKind::FeedbackNeg,
            Feedback::Neu => TriggerKind::FeedbackNeu,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "i8")]
pub enum Accuracy {
    Success,
    Failure,
    /// No reaction before the timeout.
    Miss,
}

impl Accuracy {
    pub fn code(&self) -> i8 {
        match self {
            Accuracy::Success => 1,
            Accuracy::Failure => 0,
            Accuracy::Miss => -1,
        }
    }
}

impl From<Accuracy> for i8 {
    fn from(acc: Accuracy) -> i8 {
        acc.code()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedFeedback {
    TooSlow,
    TooFast,
}

/// One row of the behavioural log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialRecord {
    pub block_num: usize,
    pub trial_num: usize,
    #[serde(serialize_with = "rt_or_dash")]
    pub rt: Option<f64>,
    pub allowed_error: f64,
    pub block_type: String,
    pub iti_time: f64,
    pub feedback: Feedback,
    pub acc: Accuracy,
}

fn rt_or_dash<S: Serializer>(rt: &Option<f64>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    match rt {
        Some(rt) => serializer.serialize_f64(*rt),
        None => serializer.serialize_str("-"),
    }
}

// -----------------------------------------------------------------------------
// ADAPTIVE CLASSIFICATION
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub feedback: Feedback,
    pub acc: Accuracy,
    pub allowed_error: f64,
}

/// Timing classification of a single response.
///
/// A response within `allowed_error` ms of `target` seconds is a success and
/// narrows the window by `step`; a response outside it widens the window. A
/// miss leaves the window unchanged.
pub fn classify(rt: Option<f64>, target: f64, allowed_error: f64, step: f64) -> Classification {
    match rt {
        // No step on a miss, not +step like a failure. DESIGN.md, "Misses and tolerance".
        None => Classification {
            feedback: Feedback::Neg,
            acc: Accuracy::Miss,
            allowed_error,
        },
        Some(rt) if (rt - target).abs() <= allowed_error / 1000.0 => Classification {
            feedback: Feedback::Pos,
            acc: Accuracy::Success,
            allowed_error: allowed_error - step,
        },
        Some(_) => Classification {
            feedback: Feedback::Neg,
            acc: Accuracy::Failure,
            allowed_error: allowed_error + step,
        },
    }
}

pub fn speed_feedback(rt: Option<f64>, target: f64) -> SpeedFeedback {
    match rt {
        Some(rt) if rt <= target => SpeedFeedback::TooFast,
        _ => SpeedFeedback::TooSlow,
    }
}

/// Tolerance carried from trial to trial within a session phase.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub allowed_error: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl SessionState {
    pub fn new(adaptation: &AdaptationConfig) -> Self {
        Self {
            allowed_error: adaptation.initial_allowed_error,
            min: adaptation.allowed_error_min,
            max: adaptation.allowed_error_max,
        }
    }

    pub fn reset(&mut self, adaptation: &AdaptationConfig) {
        self.allowed_error = adaptation.initial_allowed_error;
    }

    pub fn set(&mut self, allowed_error: f64) {
        let mut value = allowed_error;
        if let Some(min) = self.min {
            value = value.max(min);
        }
        if let Some(max) = self.max {
            value = value.min(max);
        }
        self.allowed_error = value;
    }
}

// -----------------------------------------------------------------------------
// TRIAL CONTROLLER
// -----------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TrialSpec<'b> {
    pub block_num: usize,
    pub trial_num: usize,
    pub block_type: &'b str,
    pub speed_feedback: bool,
    pub neutral_feedback: bool,
}

pub fn run_trial<F: Frontend>(
    exp: &mut Experiment<'_, F>,
    state: &mut SessionState,
    spec: &TrialSpec<'_>,
) -> Result<TrialRecord> {
    let config = exp.config;
    let timing = &config.timing;
    let adaptation = &config.adaptation;
    let target = adaptation.target_interval;

    exp.triggers.open_trial();
    let mut trial = TrialRecord {
        block_num: spec.block_num,
        trial_num: spec.trial_num,
        rt: None,
        allowed_error: state.allowed_error,
        block_type: spec.block_type.to_string(),
        iti_time: exp.rng.gen_range(timing.iti_min..=timing.iti_max),
        feedback: Feedback::Neg,
        acc: Accuracy::Miss,
    };

    // inter-trial interval with fixation
    let fixation = &exp.stimuli.fixation;
    present(&mut exp.frontend, &mut exp.triggers, fixation, TriggerKind::Fixation)?;
    exp.frontend.wait(seconds(trial.iti_time))?;
    exp.frontend.set_auto_draw(fixation, false);
    exp.check_exit()?;

    // go cue; the response clock starts at its onset
    let star = &exp.stimuli.star;
    exp.frontend.clear_events();
    let cue_onset = present(&mut exp.frontend, &mut exp.triggers, star, TriggerKind::StarStart)?;
    exp.frontend.wait(seconds(timing.star_duration))?;

    exp.triggers.prepare_trigger(TriggerKind::StarEnd);
    exp.frontend.set_auto_draw(star, false);
    exp.frontend.flip()?;
    exp.triggers.send_trigger()?;
    exp.check_exit()?;

    // response
    let response_key = &config.procedure.response_key;
    let keys = exp.frontend.wait_keys(
        std::slice::from_ref(response_key),
        seconds(timing.max_wait),
        cue_onset,
    )?;
    if let Some(keys) = keys {
        if keys.len() != 1 {
            return Err(ExperimentError::UnexpectedResponse(format!(
                "expected one key press, got {}",
                keys.len()
            )));
        }
        if keys[0].key != *response_key {
            return Err(ExperimentError::UnexpectedResponse(format!(
                "expected {}, got {}",
                response_key, keys[0].key
            )));
        }
        trial.rt = Some(keys[0].rt);
        exp.triggers.prepare_trigger(TriggerKind::Reaction);
        exp.triggers.send_trigger()?;
    }
    exp.check_exit()?;

    let outcome = classify(
        trial.rt,
        target,
        state.allowed_error,
        adaptation.allowed_error_step,
    );
    trial.feedback = outcome.feedback;
    trial.acc = outcome.acc;
    state.set(outcome.allowed_error);

    if spec.neutral_feedback {
        trial.feedback = Feedback::Neu;
    }

    // feedback
    let feedback_stim = exp.stimuli.feedback(spec.block_type, trial.feedback)?;
    present(
        &mut exp.frontend,
        &mut exp.triggers,
        feedback_stim,
        trial.feedback.trigger(),
    )?;
    exp.frontend.wait(seconds(timing.feedback_duration))?;
    exp.frontend.set_auto_draw(feedback_stim, false);
    exp.frontend.flip()?;
    exp.check_exit()?;

    if spec.speed_feedback && trial.feedback == Feedback::Neg {
        let (stim, kind) = match speed_feedback(trial.rt, target) {
            SpeedFeedback::TooSlow => (&exp.stimuli.too_slow, TriggerKind::TooSlow),
            SpeedFeedback::TooFast => (&exp.stimuli.too_fast, TriggerKind::TooFast),
        };
        present(&mut exp.frontend, &mut exp.triggers, stim, kind)?;
        exp.frontend.wait(seconds(timing.speed_feedback_duration))?;
        exp.frontend.set_auto_draw(stim, false);
        exp.frontend.flip()?;
        exp.check_exit()?;
    }

    exp.data.beh.push(trial.clone());
    exp.triggers.close_trial(&trial.acc.code().to_string());

    tracing::info!(target: DATA_TARGET, "Trial data: {:?}", trial);
    Ok(trial)
}
