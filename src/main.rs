use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use feedback_task::analysis::response_stats::{
    filter_block_type, filter_other_block_types, load_rows, most_recent_file, summarize,
    EXPERIMENT_BLOCK,
};
use feedback_task::config::load_config;
use feedback_task::data::DataSaver;
use feedback_task::frontend::terminal::TerminalFrontend;
use feedback_task::task::session::{run_session, TRAINING_BLOCK};
use feedback_task::task::Experiment;
use feedback_task::triggers::{create_eeg_port, TriggerHandler};
use feedback_task::utils::log::{init_console_log, init_session_log};
use feedback_task::{ExperimentError, Result};

#[derive(Parser, Debug)]
#[command(name = "feedback-task")]
#[command(about = "Adaptive reaction-time feedback task with EEG triggers")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log debug events
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a session
    Run {
        /// Path to the YAML procedure config
        #[arg(short, long, default_value = "config/feedback_task.yaml")]
        config: PathBuf,

        /// Participant identifier, used in the session file names
        #[arg(short, long)]
        participant: String,

        /// Results directory
        #[arg(short, long, default_value = "results")]
        results: PathBuf,

        /// Do not open the EEG trigger port, whatever the config says
        #[arg(long)]
        no_triggers: bool,
    },
    /// Print statistics for the most recent behavioural file
    Stats {
        /// Results directory containing behavioral_data/
        results: PathBuf,

        /// Block type to keep. Sessions record the feedback type of each
        /// block (number, symbol, ...) or "training", so the default matches
        /// no rows written by `run`
        #[arg(short, long, default_value = EXPERIMENT_BLOCK)]
        block_type: String,

        /// Keep every block except training
        #[arg(long, conflicts_with = "block_type")]
        exclude_training: bool,
    },
}

fn run(
    config_path: PathBuf,
    participant: &str,
    results: PathBuf,
    no_triggers: bool,
    verbose: bool,
) -> Result<()> {
    let mut config = load_config(&config_path)?;
    if no_triggers {
        config.triggers.send_eeg_trigg = false;
    }

    let session_id = format!(
        "{}_{}",
        participant,
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let data = DataSaver::new(&results, &session_id);
    let log_path = init_session_log(&data.log_dir(), &session_id, verbose)?;
    println!("Session {} (log: {})", session_id, log_path.display());
    tracing::info!("config: {}", config_path.display());

    let port = create_eeg_port(&config.triggers)?;
    let pulse = Duration::from_secs_f64(config.triggers.trigger_time_ms.max(0.0) / 1000.0);
    let triggers = TriggerHandler::new(port, pulse);
    let frontend = TerminalFrontend::new(&config.procedure.exit_key)?;

    let mut exp = Experiment::new(&config, frontend, triggers, data);
    let outcome = run_session(&mut exp);

    let restored = exp.frontend.shutdown();
    let beh_path = exp.data.save_beh()?;
    exp.data.save_triggers(exp.triggers.events())?;
    restored?;
    println!("Behavioural data saved to {}", beh_path.display());

    match outcome {
        Err(ExperimentError::ExitRequested) => {
            println!("{}", "Experiment terminated by the operator.".yellow());
            Ok(())
        }
        other => other,
    }
}

fn stats(results: PathBuf, block_type: &str, exclude_training: bool, verbose: bool) -> Result<()> {
    init_console_log(verbose);

    println!("Printing statistics for the most recent behavioral file in the given directory...");
    if exclude_training {
        println!("Statistics based on all non-{} trials.", TRAINING_BLOCK);
    } else {
        println!("Statistics based on {} trials only.", block_type);
    }

    let most_recent = most_recent_file(&results)?;
    println!("Using file {}", most_recent.display());

    let rows = load_rows(&most_recent)?;
    let kept = if exclude_training {
        filter_other_block_types(&rows, TRAINING_BLOCK)
    } else {
        filter_block_type(&rows, block_type)
    };
    tracing::debug!("kept {} of {} rows", kept.len(), rows.len());
    let summary = summarize(&kept);

    println!("{}", format!("Trials: {}", summary.n_trials).bold());
    for (feedback, count) in &summary.feedback_counts {
        let line = format!("  feedback {}: {}", feedback, count);
        match feedback.as_str() {
            "pos" => println!("{}", line.green()),
            "neg" => println!("{}", line.red()),
            _ => println!("{}", line.blue()),
        }
    }
    for (acc, count) in &summary.acc_counts {
        println!("  acc {}: {}", acc, count);
    }
    match summary.mean_rt {
        Some(rt) => println!(
            "  mean rt: {:.3} s over {} responses",
            rt, summary.n_responses
        ),
        None => println!("  mean rt: {}", "no responses".white()),
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let result = match args.command {
        Command::Run {
            config,
            participant,
            results,
            no_triggers,
        } => run(config, &participant, results, no_triggers, args.verbose),
        Command::Stats {
            results,
            block_type,
            exclude_training,
        } => stats(results, &block_type, exclude_training, args.verbose),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
