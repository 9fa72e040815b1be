mod common;

use std::collections::BTreeMap;

use common::{config, experiment, trigger_names, Response, ScriptedFrontend};
use feedback_task::analysis::response_stats::{
    filter_block_type, filter_other_block_types, load_rows, most_recent_file,
};
use feedback_task::task::session::{run_session, TRAINING_BLOCK};
use feedback_task::task::trial::{Accuracy, Feedback, TrialRecord};
use feedback_task::ExperimentError;

fn run_with_rt(rt: f64) -> (Vec<TrialRecord>, Vec<String>, Vec<String>) {
    let config = config();
    let dir = tempfile::tempdir().unwrap();
    let mut frontend = ScriptedFrontend::default();
    frontend.default_rt = Some(rt);
    let mut exp = experiment(&config, frontend, dir.path());
    run_session(&mut exp).unwrap();
    let names = trigger_names(&exp);
    (exp.data.beh, names, exp.frontend.info_texts)
}

#[test]
fn session_runs_training_then_repeated_blocks() {
    let (beh, triggers, info) = run_with_rt(1.0);
    let config = config();

    let training: Vec<_> = beh.iter().filter(|t| t.block_num == 0).collect();
    assert_eq!(training.len(), 3);
    assert!(training.iter().all(|t| t.block_type == "training"));
    assert!(training.iter().all(|t| t.feedback != Feedback::Neu));

    // 3 repetitions of 3 feedback types, 5 trials each
    assert_eq!(beh.len(), 3 + 9 * 5);
    let mut per_block: BTreeMap<usize, Vec<&TrialRecord>> = BTreeMap::new();
    for trial in beh.iter().filter(|t| t.block_num > 0) {
        per_block.entry(trial.block_num).or_default().push(trial);
    }
    assert_eq!(per_block.keys().copied().collect::<Vec<_>>(), (1..=9).collect::<Vec<_>>());
    for trials in per_block.values() {
        assert_eq!(trials.len(), 5);
        let trial_nums: Vec<usize> = trials.iter().map(|t| t.trial_num).collect();
        assert_eq!(trial_nums, vec![0, 1, 2, 3, 4]);
        let neutral = trials.iter().filter(|t| t.feedback == Feedback::Neu).count();
        assert_eq!(neutral, 2);
    }

    // the shuffled order is the same in every repetition
    let order: Vec<&str> = (1..=9)
        .map(|b| per_block[&b][0].block_type.as_str())
        .collect();
    assert_eq!(order[0..3], order[3..6]);
    assert_eq!(order[0..3], order[6..9]);
    let mut types = order[0..3].to_vec();
    types.sort();
    assert_eq!(types, vec!["color", "number", "symbol"]);

    let block_starts = triggers.iter().filter(|n| *n == "block_start").count();
    assert_eq!(block_starts, 9);

    // greetings, post-training, one text per block, end
    assert_eq!(info.len(), 2 + 1 + 9 + 1);
    assert_eq!(info[0], "Witaj");
    assert_eq!(info[2], "Koniec treningu");
    let f_expl = &config.procedure.feedback_explanations[order[0]];
    assert_eq!(info[3], format!("Blok 1: {}", f_expl));
    assert_eq!(info.last().unwrap(), "Koniec");
}

#[test]
fn tolerance_is_reset_after_training() {
    // always on target: every non-neutral trial narrows the window
    let (beh, _, _) = run_with_rt(1.0);

    let training: Vec<_> = beh.iter().filter(|t| t.block_num == 0).collect();
    let windows: Vec<f64> = training.iter().map(|t| t.allowed_error).collect();
    assert_eq!(windows, vec![100.0, 90.0, 80.0]);

    let first_block = beh.iter().find(|t| t.block_num == 1).unwrap();
    assert_eq!(first_block.allowed_error, 100.0);
}

#[test]
fn tolerance_moves_by_step_between_trials() {
    let config = config();
    let dir = tempfile::tempdir().unwrap();
    let responses = [1.05, 1.3, 0.95, 0.6, 1.0, 1.02, 1.5, 0.99]
        .iter()
        .map(|&rt| Response::Press(rt))
        .chain(std::iter::once(Response::Timeout))
        .collect();
    let mut frontend = ScriptedFrontend::with_responses(responses);
    frontend.default_rt = Some(1.01);
    let mut exp = experiment(&config, frontend, dir.path());
    run_session(&mut exp).unwrap();

    let beh = &exp.data.beh;
    for pair in beh.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.block_num == 1 && prev.block_num == 0 {
            continue;
        }
        let expected = match prev.acc {
            Accuracy::Success => prev.allowed_error - 10.0,
            Accuracy::Failure => prev.allowed_error + 10.0,
            Accuracy::Miss => prev.allowed_error,
        };
        assert_eq!(next.allowed_error, expected, "{:?} -> {:?}", prev, next);
    }
    assert!(beh.iter().any(|t| t.acc == Accuracy::Miss));
    assert!(beh.iter().any(|t| t.acc == Accuracy::Failure));
}

#[test]
fn every_trial_has_exactly_one_feedback() {
    let (beh, triggers, _) = run_with_rt(1.3);
    for trial in &beh {
        assert!(matches!(
            trial.feedback,
            Feedback::Pos | Feedback::Neg | Feedback::Neu
        ));
    }
    let feedback_triggers = triggers
        .iter()
        .filter(|n| n.starts_with("feedback_"))
        .count();
    assert_eq!(feedback_triggers, beh.len());
}

#[test]
fn same_seed_gives_same_session() {
    let (first, _, _) = run_with_rt(1.0);
    let (second, _, _) = run_with_rt(1.0);
    assert_eq!(first, second);
}

#[test]
fn exit_mid_session_keeps_completed_trials() {
    let config = config();
    let dir = tempfile::tempdir().unwrap();
    let mut frontend = ScriptedFrontend::default();
    frontend.default_rt = Some(1.0);
    // four checks per trial without speed feedback: stop inside the third trial
    frontend.exit_after_checks = Some(9);
    let mut exp = experiment(&config, frontend, dir.path());

    let result = run_session(&mut exp);
    assert!(matches!(result, Err(ExperimentError::ExitRequested)));
    assert_eq!(exp.data.beh.len(), 2);

    let saved = exp.data.save_beh().unwrap();
    assert_eq!(most_recent_file(dir.path()).unwrap(), saved);
    let rows = load_rows(&saved).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(filter_block_type(&rows, "training").len(), 2);
    assert!(filter_block_type(&rows, "experiment").is_empty());
}

#[test]
fn saved_session_filters_by_feedback_type_or_without_training() {
    let config = config();
    let dir = tempfile::tempdir().unwrap();
    let mut frontend = ScriptedFrontend::default();
    frontend.default_rt = Some(1.0);
    let mut exp = experiment(&config, frontend, dir.path());
    run_session(&mut exp).unwrap();

    let rows = load_rows(exp.data.save_beh().unwrap()).unwrap();
    assert_eq!(filter_other_block_types(&rows, TRAINING_BLOCK).len(), 9 * 5);
    assert_eq!(filter_block_type(&rows, "number").len(), 3 * 5);
    assert!(filter_block_type(&rows, "experiment").is_empty());
}
