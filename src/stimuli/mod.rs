// src/stimuli/mod.rs
use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::StimuliConfig;
use crate::error::{ExperimentError, Result};
use crate::task::trial::Feedback;

#[derive(Debug, Clone, PartialEq)]
pub enum StimulusKind {
    Image { path: PathBuf },
    Text { text: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stimulus {
    pub name: String,
    pub kind: StimulusKind,
    /// Height in window-height units.
    pub height: f64,
    /// Stand-in for the image on text-only frontends.
    pub glyph: String,
}

impl Stimulus {
    pub fn label(&self) -> &str {
        match &self.kind {
            StimulusKind::Text { text } => text,
            StimulusKind::Image { .. } => &self.glyph,
        }
    }
}

/// Visual angle to a fraction of screen height at the configured viewing distance.
pub fn deg_to_height(deg: f64, config: &StimuliConfig) -> f64 {
    let size_in_cm = (deg / 360.0) * (2.0 * std::f64::consts::PI * config.screen_distance);
    size_in_cm / config.screen_height
}

fn load_img(name: &str, glyph: &str, size: f64, config: &StimuliConfig) -> Stimulus {
    Stimulus {
        name: name.to_string(),
        kind: StimulusKind::Image {
            path: config.stimuli_dir.join(name),
        },
        height: deg_to_height(size, config),
        glyph: glyph.to_string(),
    }
}

fn load_text(text: &str, config: &StimuliConfig) -> Stimulus {
    Stimulus {
        name: text.to_string(),
        kind: StimulusKind::Text {
            text: text.to_string(),
        },
        height: deg_to_height(config.text_feedback_size, config),
        glyph: text.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct FeedbackSet {
    pub pos: Stimulus,
    pub neg: Stimulus,
    pub neu: Option<Stimulus>,
}

impl FeedbackSet {
    pub fn get(&self, feedback: Feedback) -> Option<&Stimulus> {
        match feedback {
            Feedback::Pos => Some(&self.pos),
            Feedback::Neg => Some(&self.neg),
            Feedback::Neu => self.neu.as_ref(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StimulusSet {
    pub fixation: Stimulus,
    pub star: Stimulus,
    pub too_slow: Stimulus,
    pub too_fast: Stimulus,
    feedback: HashMap<String, FeedbackSet>,
}

impl StimulusSet {
    pub fn load(config: &StimuliConfig) -> Self {
        let img = |name: &str, glyph: &str, size: f64| load_img(name, glyph, size, config);
        let text = |t: &str| load_text(t, config);
        let version = &config.experiment_version;

        let mut feedback = HashMap::new();
        feedback.insert(
            "number".to_string(),
            FeedbackSet {
                pos: text("+1"),
                neg: text("-1"),
                neu: Some(text("J")),
            },
        );
        feedback.insert(
            "facesimple".to_string(),
            FeedbackSet {
                pos: img("smiley_face.png", ":)", config.feedback_size),
                neg: img("sad_face.png", ":(", config.feedback_size),
                neu: Some(img("empty_face.png", ":|", config.feedback_size)),
            },
        );
        feedback.insert(
            "facecomplex".to_string(),
            FeedbackSet {
                pos: img(&format!("{}/pos.png", version), "(^_^)", config.face_feedback_size),
                neg: img(&format!("{}/neg.png", version), "(>_<)", config.face_feedback_size),
                neu: Some(img(
                    &format!("{}/neu.png", version),
                    "(-_-)",
                    config.face_feedback_size,
                )),
            },
        );
        feedback.insert(
            "symbol".to_string(),
            FeedbackSet {
                pos: img("tick.png", "✓", config.feedback_size),
                neg: img("cross.png", "✗", config.feedback_size),
                neu: Some(img("equal.png", "=", config.feedback_size)),
            },
        );
        feedback.insert(
            "color".to_string(),
            FeedbackSet {
                pos: img("green_square.png", "[green]", config.feedback_size),
                neg: img("red_square.png", "[red]", config.feedback_size),
                neu: Some(img("blue_square.png", "[blue]", config.feedback_size)),
            },
        );
        feedback.insert(
            "text".to_string(),
            FeedbackSet {
                pos: text("dobrze"),
                neg: text("błędnie"),
                neu: Some(text("żyrafa")),
            },
        );
        feedback.insert(
            "training".to_string(),
            FeedbackSet {
                pos: img("thumbs_up.png", "(y)", config.feedback_size),
                neg: img("thumbs_down.png", "(n)", config.feedback_size),
                neu: None,
            },
        );

        Self {
            fixation: img("dot.png", "·", config.fixation_size),
            star: img("star.png", "*", config.star_size),
            too_slow: text("zbyt wolno"),
            too_fast: text("zbyt szybko"),
            feedback,
        }
    }

    pub fn feedback(&self, block_type: &str, feedback: Feedback) -> Result<&Stimulus> {
        self.feedback
            .get(block_type)
            .and_then(|set| set.get(feedback))
            .ok_or_else(|| {
                ExperimentError::Config(format!(
                    "no {} feedback stimulus for block type {}",
                    feedback.as_str(),
                    block_type
                ))
            })
    }
}
