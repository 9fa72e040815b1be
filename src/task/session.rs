use rand::seq::{index, SliceRandom};

use super::trial::{run_trial, SessionState, TrialSpec};
use super::Experiment;
use crate::error::{ExperimentError, Result};
use crate::frontend::Frontend;
use crate::triggers::TriggerKind;
use crate::utils::log::DATA_TARGET;

pub const TRAINING_BLOCK: &str = "training";

pub fn format_block_text(template: &str, block_num: usize, f_expl: &str) -> String {
    template
        .replace("{block_num}", &block_num.to_string())
        .replace("{f_expl}", f_expl)
}

/// Greeting, training block, then the feedback blocks in a shuffled order
/// repeated `n_block_repetitions` times.
pub fn run_session<F: Frontend>(exp: &mut Experiment<'_, F>) -> Result<()> {
    let config = exp.config;
    let procedure = &config.procedure;
    let texts = &config.texts;

    let mut block_order = procedure.feedback_types.clone();
    block_order.shuffle(&mut exp.rng);
    tracing::info!(target: DATA_TARGET, "Block order: {:?}", block_order);

    for greeting_text in &texts.greeting_texts {
        exp.frontend.show_info(greeting_text, None)?;
    }

    // block 0 is training
    let mut block_num = 0;
    let mut state = SessionState::new(&config.adaptation);
    for trial_num in 0..procedure.n_train_trials {
        let spec = TrialSpec {
            block_num,
            trial_num,
            block_type: TRAINING_BLOCK,
            speed_feedback: true,
            neutral_feedback: false,
        };
        run_trial(exp, &mut state, &spec)?;
    }

    exp.frontend.show_info(&texts.post_training_text, None)?;

    state.reset(&config.adaptation);
    for _ in 0..procedure.n_block_repetitions {
        for block_type in &block_order {
            block_num += 1;
            let f_expl = procedure
                .feedback_explanations
                .get(block_type)
                .ok_or_else(|| {
                    ExperimentError::Config(format!("missing feedback explanation for {}", block_type))
                })?;
            let text = format_block_text(&texts.new_block_text, block_num, f_expl);
            exp.frontend.show_info(&text, None)?;

            let neutral = index::sample(
                &mut exp.rng,
                procedure.n_trials_per_block,
                procedure.n_neutral_trials_per_block,
            )
            .into_vec();
            tracing::info!(target: DATA_TARGET, "Block {} neutral trials: {:?}", block_num, neutral);

            exp.triggers.prepare_trigger(TriggerKind::BlockStart);
            exp.triggers.send_trigger()?;

            for trial_num in 0..procedure.n_trials_per_block {
                let spec = TrialSpec {
                    block_num,
                    trial_num,
                    block_type: block_type.as_str(),
                    speed_feedback: procedure.speed_feedback,
                    neutral_feedback: neutral.contains(&trial_num),
                };
                run_trial(exp, &mut state, &spec)?;
            }
        }
    }

    exp.frontend.show_info(&texts.end_text, None)?;
    tracing::info!("session finished after {} blocks", block_num);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_text_substitutes_placeholders() {
        let text = format_block_text("Blok {block_num}: {f_expl}", 4, "+1 oznacza dobrze");
        assert_eq!(text, "Blok 4: +1 oznacza dobrze");
    }
}
