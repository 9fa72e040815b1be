#![allow(dead_code)]

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use feedback_task::config::Config;
use feedback_task::data::DataSaver;
use feedback_task::frontend::{Frontend, KeyPress};
use feedback_task::stimuli::Stimulus;
use feedback_task::task::Experiment;
use feedback_task::triggers::TriggerHandler;
use feedback_task::Result;

pub const CONFIG: &str = r#"
triggers:
  trigger_type: parport
  send_eeg_trigg: false
timing:
  iti_min: 1.0
  iti_max: 2.0
  star_duration: 0.2
  max_wait: 3.0
  feedback_duration: 1.0
  speed_feedback_duration: 0.5
adaptation:
  target_interval: 1.0
  initial_allowed_error: 100.0
  allowed_error_step: 10.0
procedure:
  response_key: space
  speed_feedback: true
  n_train_trials: 3
  n_trials_per_block: 5
  n_neutral_trials_per_block: 2
  n_block_repetitions: 3
  feedback_types: [number, symbol, color]
  feedback_explanations:
    number: "liczby"
    symbol: "symbole"
    color: "kolory"
  seed: 42
texts:
  greeting_texts: ["Witaj", "Instrukcja"]
  post_training_text: "Koniec treningu"
  new_block_text: "Blok {block_num}: {f_expl}"
  end_text: "Koniec"
stimuli:
  experiment_version: v1
  screen_distance: 60.0
  screen_height: 30.0
  fixation_size: 0.5
  star_size: 1.0
  feedback_size: 2.0
  face_feedback_size: 4.0
  text_feedback_size: 1.0
"#;

pub fn config() -> Config {
    let config: Config = serde_yaml::from_str(CONFIG).unwrap();
    config.validate().unwrap();
    config
}

#[derive(Debug, Clone)]
pub enum Response {
    Press(f64),
    Keys(Vec<KeyPress>),
    Timeout,
}

/// Frontend that replays scripted responses and records what was shown.
#[derive(Default)]
pub struct ScriptedFrontend {
    pub responses: VecDeque<Response>,
    /// Used once the script is exhausted.
    pub default_rt: Option<f64>,
    pub drawing: Vec<String>,
    pub frames: Vec<Vec<String>>,
    pub info_texts: Vec<String>,
    pub waited: Duration,
    pub exit_after_checks: Option<usize>,
    pub exit_checks: usize,
}

impl ScriptedFrontend {
    pub fn with_responses(responses: Vec<Response>) -> Self {
        Self {
            responses: responses.into(),
            ..Self::default()
        }
    }

    pub fn shown(&self, label: &str) -> bool {
        self.frames.iter().any(|frame| frame.iter().any(|l| l == label))
    }
}

impl Frontend for ScriptedFrontend {
    fn set_auto_draw(&mut self, stimulus: &Stimulus, on: bool) {
        self.drawing.retain(|l| l != stimulus.label());
        if on {
            self.drawing.push(stimulus.label().to_string());
        }
    }

    fn flip(&mut self) -> Result<Instant> {
        self.frames.push(self.drawing.clone());
        Ok(Instant::now())
    }

    fn wait(&mut self, duration: Duration) -> Result<()> {
        self.waited += duration;
        Ok(())
    }

    fn clear_events(&mut self) {}

    fn wait_keys(
        &mut self,
        keys: &[String],
        _max_wait: Duration,
        _since: Instant,
    ) -> Result<Option<Vec<KeyPress>>> {
        let response = match self.responses.pop_front() {
            Some(response) => response,
            None => match self.default_rt {
                Some(rt) => Response::Press(rt),
                None => Response::Timeout,
            },
        };
        Ok(match response {
            Response::Press(rt) => Some(vec![KeyPress {
                key: keys[0].clone(),
                rt,
            }]),
            Response::Keys(presses) => Some(presses),
            Response::Timeout => None,
        })
    }

    fn exit_requested(&mut self) -> Result<bool> {
        self.exit_checks += 1;
        Ok(self
            .exit_after_checks
            .map_or(false, |limit| self.exit_checks > limit))
    }

    fn show_info(&mut self, text: &str, _duration: Option<Duration>) -> Result<()> {
        self.info_texts.push(text.to_string());
        Ok(())
    }
}

pub fn experiment<'a>(
    config: &'a Config,
    frontend: ScriptedFrontend,
    results: &std::path::Path,
) -> Experiment<'a, ScriptedFrontend> {
    let triggers = TriggerHandler::new(None, Duration::ZERO);
    let data = DataSaver::new(results, "test_session");
    Experiment::new(config, frontend, triggers, data)
}

pub fn trigger_names<F: Frontend>(exp: &Experiment<'_, F>) -> Vec<String> {
    exp.triggers.events().iter().map(|e| e.name.clone()).collect()
}
