pub mod session;
pub mod trial;

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;

use crate::config::Config;
use crate::data::DataSaver;
use crate::error::{ExperimentError, Result};
use crate::frontend::Frontend;
use crate::stimuli::{Stimulus, StimulusSet};
use crate::triggers::{TriggerHandler, TriggerKind};

/// Everything a running session touches, owned in one place.
pub struct Experiment<'a, F: Frontend> {
    pub config: &'a Config,
    pub frontend: F,
    pub triggers: TriggerHandler,
    pub stimuli: StimulusSet,
    pub data: DataSaver,
    pub rng: StdRng,
}

impl<'a, F: Frontend> Experiment<'a, F> {
    pub fn new(config: &'a Config, frontend: F, triggers: TriggerHandler, data: DataSaver) -> Self {
        let rng = match config.procedure.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            frontend,
            triggers,
            stimuli: StimulusSet::load(&config.stimuli),
            data,
            rng,
        }
    }

    /// Aborts the session when the operator pressed the exit key.
    pub fn check_exit(&mut self) -> Result<()> {
        if self.frontend.exit_requested()? {
            tracing::warn!("exit key pressed, terminating session");
            return Err(ExperimentError::ExitRequested);
        }
        Ok(())
    }
}

/// Starts drawing `stimulus` and sends `kind` right after the flip that shows it.
pub(crate) fn present<F: Frontend>(
    frontend: &mut F,
    triggers: &mut TriggerHandler,
    stimulus: &Stimulus,
    kind: TriggerKind,
) -> Result<Instant> {
    triggers.prepare_trigger(kind);
    frontend.set_auto_draw(stimulus, true);
    let flip_time = frontend.flip()?;
    triggers.send_trigger()?;
    Ok(flip_time)
}
