use crate::config::Config;
use crate::history::{check_display_name, HistoryRecord};
use crate::scoring::{InputError, InputRecord, RawInput, ScoreEngine, ValidationPolicy, MAX_DAILY_HOURS};
use crate::session::Session;
use crate::tui::theme::ThemeColors;
use std::time::Instant;

/// Seconds a flash message stays in the status bar
const FLASH_SECS: u64 = 3;

/// Longest accepted display name
const MAX_NAME_LEN: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    NameInput,
    Help,
    Breakdown,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlashKind {
    Info,
    Success,
    Error,
}

/// One row of the input form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    DailyHours,
    ProductionRatio,
    CompletedProjects,
    QualityScore,
    OriginalPosts,
    Replies,
    EmotionalStability,
    TaskAlignment,
    IsTeam,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::DailyHours,
        Field::ProductionRatio,
        Field::CompletedProjects,
        Field::QualityScore,
        Field::OriginalPosts,
        Field::Replies,
        Field::EmotionalStability,
        Field::TaskAlignment,
        Field::IsTeam,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Field::DailyHours => "Daily hours online",
            Field::ProductionRatio => "Production ratio",
            Field::CompletedProjects => "Completed projects",
            Field::QualityScore => "Quality (1-5)",
            Field::OriginalPosts => "Original posts",
            Field::Replies => "Replies",
            Field::EmotionalStability => "Stability (0-10)",
            Field::TaskAlignment => "Alignment (0-10)",
            Field::IsTeam => "Team work",
        }
    }

    /// Current value of this field in the form, for display.
    pub fn display(&self, form: &RawInput) -> String {
        match self {
            Field::DailyHours => format!("{:.1} h", form.daily_hours),
            Field::ProductionRatio => format!("{:.0}%", form.production_ratio * 100.0),
            Field::CompletedProjects => form.completed_projects.to_string(),
            Field::QualityScore => form.quality_score.to_string(),
            Field::OriginalPosts => form.original_posts.to_string(),
            Field::Replies => form.replies.to_string(),
            Field::EmotionalStability => form.emotional_stability.to_string(),
            Field::TaskAlignment => form.task_alignment.to_string(),
            Field::IsTeam => if form.is_team { "yes" } else { "no" }.to_string(),
        }
    }

    /// Move the value by `steps` increments, staying inside the field's domain.
    pub fn adjust(&self, form: &mut RawInput, steps: i64) {
        match self {
            Field::DailyHours => {
                form.daily_hours = step_float(form.daily_hours, 0.5, steps, MAX_DAILY_HOURS)
            }
            Field::ProductionRatio => {
                form.production_ratio = step_float(form.production_ratio, 0.05, steps, 1.0)
            }
            Field::CompletedProjects => {
                form.completed_projects = step_int(form.completed_projects, steps, 0, 999)
            }
            Field::QualityScore => form.quality_score = step_int(form.quality_score, steps, 1, 5),
            Field::OriginalPosts => {
                form.original_posts = step_int(form.original_posts, steps, 0, 9999)
            }
            Field::Replies => form.replies = step_int(form.replies, steps, 0, 9999),
            Field::EmotionalStability => {
                form.emotional_stability = step_int(form.emotional_stability, steps, 0, 10)
            }
            Field::TaskAlignment => {
                form.task_alignment = step_int(form.task_alignment, steps, 0, 10)
            }
            Field::IsTeam => {
                if steps != 0 {
                    form.is_team = !form.is_team
                }
            }
        }
    }
}

fn step_float(value: f64, step: f64, steps: i64, max: f64) -> f64 {
    let next = value + step * steps as f64;
    // Snap to two decimals so repeated steps do not drift
    ((next * 100.0).round() / 100.0).clamp(0.0, max)
}

fn step_int(value: i64, steps: i64, min: i64, max: i64) -> i64 {
    value.saturating_add(steps).clamp(min, max)
}

pub struct App {
    pub form: RawInput,
    pub selected: usize,
    pub session: Session,
    pub input_mode: InputMode,
    pub name_input: String,
    pub display_name: Option<String>,
    pub flash_message: Option<(String, FlashKind, Instant)>,
    pub should_quit: bool,
    pub is_saving: bool,
    pub spinner_frame: usize,
    pub engine: ScoreEngine,
    pub policy: ValidationPolicy,
    pub store_description: String,
    pub colors: ThemeColors,
    /// Bumped on every compute; a finished save only marks the session
    /// saved when it still refers to the same analysis.
    analysis_seq: u64,
    save_request: Option<(u64, HistoryRecord)>,
}

impl App {
    /// Fails with the scoring problems when the configured constants are invalid.
    pub fn new(
        config: &Config,
        store_description: String,
        colors: ThemeColors,
    ) -> Result<Self, Vec<String>> {
        Ok(Self {
            form: RawInput::default(),
            selected: 0,
            session: Session::new(),
            input_mode: InputMode::Normal,
            name_input: String::new(),
            display_name: config.display_name().map(str::to_string),
            flash_message: None,
            should_quit: false,
            is_saving: false,
            spinner_frame: 0,
            engine: ScoreEngine::new(config.effective_scoring())?,
            policy: config.validation,
            store_description,
            colors,
            analysis_seq: 0,
            save_request: None,
        })
    }

    pub fn selected_field(&self) -> Field {
        Field::ALL[self.selected]
    }

    pub fn next_field(&mut self) {
        self.selected = (self.selected + 1) % Field::ALL.len();
    }

    pub fn previous_field(&mut self) {
        self.selected = if self.selected == 0 {
            Field::ALL.len() - 1
        } else {
            self.selected - 1
        };
    }

    pub fn adjust_selected(&mut self, steps: i64) {
        let field = self.selected_field();
        field.adjust(&mut self.form, steps);
    }

    /// Put every field back to its starting value.
    pub fn reset_form(&mut self) {
        self.form = RawInput::default();
        self.show_flash("Form reset".to_string(), FlashKind::Info);
    }

    /// Validate the form, score it and replace the session.
    pub fn compute(&mut self) -> Result<(), InputError> {
        let input = match InputRecord::from_raw(&self.form, self.policy) {
            Ok(input) => input,
            Err(e) => {
                self.show_flash(format!("Invalid input: {}", e), FlashKind::Error);
                return Err(e);
            }
        };
        let result = self.engine.compute(&input);
        let label = result.diagnosis.label();
        self.session = self.session.record(input, result);
        self.analysis_seq += 1;
        self.show_flash(format!("Computed: {}", label), FlashKind::Info);
        Ok(())
    }

    /// Queue the current result for saving. Asks for a display name first
    /// when none is configured.
    pub fn request_save(&mut self) {
        if self.session.last().is_none() {
            self.show_flash(
                "Nothing to save yet: press Enter to compute".to_string(),
                FlashKind::Error,
            );
            return;
        }
        if self.session.is_saved() {
            self.show_flash("This result is already saved".to_string(), FlashKind::Info);
            return;
        }
        if self.is_saving || self.save_request.is_some() {
            self.show_flash("A save is already in progress".to_string(), FlashKind::Info);
            return;
        }
        let Some(name) = self.display_name.clone() else {
            self.start_name_input();
            return;
        };

        if let Some(result) = self.session.last_result() {
            let record = HistoryRecord::now(&name, result);
            self.save_request = Some((self.analysis_seq, record));
        }
    }

    /// Hand the queued save to the caller, marking the app as saving.
    pub fn take_save_request(&mut self) -> Option<(u64, HistoryRecord)> {
        let request = self.save_request.take();
        if request.is_some() {
            self.is_saving = true;
        }
        request
    }

    pub fn save_succeeded(&mut self, seq: u64) {
        self.is_saving = false;
        if seq == self.analysis_seq {
            self.session = self.session.mark_saved();
        }
        let target = self.store_description.clone();
        self.show_flash(format!("Saved to {}", target), FlashKind::Success);
    }

    /// The computed result stays on screen; only a notice is shown.
    pub fn save_failed(&mut self, reason: String) {
        self.is_saving = false;
        self.show_flash(format!("Could not save result: {}", reason), FlashKind::Error);
    }

    pub fn start_name_input(&mut self) {
        self.name_input = self.display_name.clone().unwrap_or_default();
        self.input_mode = InputMode::NameInput;
    }

    pub fn push_name_char(&mut self, c: char) {
        if self.name_input.chars().count() < MAX_NAME_LEN {
            self.name_input.push(c);
        }
    }

    /// Accept the typed name and continue the save that asked for it.
    pub fn confirm_name_input(&mut self) {
        let name = self.name_input.trim().to_string();
        if let Err(e) = check_display_name(&name) {
            self.show_flash(format!("Display name {}", e), FlashKind::Error);
            return;
        }
        self.display_name = Some(name);
        self.name_input.clear();
        self.input_mode = InputMode::Normal;
        self.request_save();
    }

    pub fn cancel_name_input(&mut self) {
        self.name_input.clear();
        self.input_mode = InputMode::Normal;
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Breakdown of the last result; ignored before the first compute.
    pub fn show_breakdown(&mut self) {
        if self.session.last().is_some() {
            self.input_mode = InputMode::Breakdown;
        } else {
            self.show_flash("Nothing computed yet".to_string(), FlashKind::Info);
        }
    }

    pub fn dismiss_breakdown(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn update_flash(&mut self) {
        if let Some((_, _, timestamp)) = self.flash_message {
            if timestamp.elapsed().as_secs() >= FLASH_SECS {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, msg: String, kind: FlashKind) {
        self.flash_message = Some((msg, kind, Instant::now()));
    }

    /// Advance the saving spinner animation frame
    pub fn advance_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }
}
