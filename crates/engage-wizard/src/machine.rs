//! Pure wizard state machine.
//!
//! Sequencing, gating, and validation live here with no I/O. The machine
//! never performs an upload or a database write itself; it tells the driver
//! what to do ([`NextAction::StartUpload`]) and consumes the resolutions the
//! driver feeds back. Upload resolutions are matched against the generation
//! recorded when the attempt started, so results from a source that has
//! since been cleared or replaced fall on the floor.

use engage_core::models::{Goal, Platform, PostAttributes, Tone};
use engage_core::AppError;
use serde::Serialize;
use uuid::Uuid;

/// The ordered steps of the post-creation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Media,
    Platform,
    Niche,
    Goal,
    Tone,
    Complete,
}

impl WizardStep {
    fn forward(self) -> Option<WizardStep> {
        match self {
            WizardStep::Media => Some(WizardStep::Platform),
            WizardStep::Platform => Some(WizardStep::Niche),
            WizardStep::Niche => Some(WizardStep::Goal),
            WizardStep::Goal => Some(WizardStep::Tone),
            // Leaving the final step goes through complete(), not next().
            WizardStep::Tone | WizardStep::Complete => None,
        }
    }

    fn backward(self) -> Option<WizardStep> {
        match self {
            WizardStep::Media | WizardStep::Complete => None,
            WizardStep::Platform => Some(WizardStep::Media),
            WizardStep::Niche => Some(WizardStep::Platform),
            WizardStep::Goal => Some(WizardStep::Niche),
            WizardStep::Tone => Some(WizardStep::Goal),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WizardStep::Media => "media",
            WizardStep::Platform => "platform",
            WizardStep::Niche => "niche",
            WizardStep::Goal => "goal",
            WizardStep::Tone => "tone",
            WizardStep::Complete => "complete",
        }
    }
}

/// A single selection made on one of the attribute steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Platform(Platform),
    Niche(String),
    Goal(Goal),
    Tone(Tone),
}

/// Accumulated attribute selections. Moving back never discards these.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Selections {
    pub platform: Option<Platform>,
    pub niche: Option<String>,
    pub goal: Option<Goal>,
    pub tone: Option<Tone>,
}

impl Selections {
    /// All four attributes, or `None` while any is still unset.
    pub fn to_attributes(&self) -> Option<PostAttributes> {
        Some(PostAttributes {
            platform: self.platform?,
            niche: self.niche.clone()?,
            goal: self.goal?,
            tone: self.tone?,
        })
    }
}

/// What the driver should do after a `request_next` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    /// The step advanced; nothing else to do.
    Advanced(WizardStep),
    /// An upload must be started for the current media source.
    StartUpload,
    /// An upload is already in flight; this call is a no-op.
    UploadPending,
}

/// The wizard state machine for one post-creation session.
#[derive(Debug)]
pub struct WizardMachine {
    step: WizardStep,
    selections: Selections,
    post_id: Option<Uuid>,
    pending_upload: Option<u64>,
}

impl Default for WizardMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardMachine {
    pub fn new() -> Self {
        WizardMachine {
            step: WizardStep::Media,
            selections: Selections::default(),
            post_id: None,
            pending_upload: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    pub fn post_id(&self) -> Option<Uuid> {
        self.post_id
    }

    pub fn pending_upload(&self) -> Option<u64> {
        self.pending_upload
    }

    /// Record an attribute selection. Selections may be revisited after
    /// moving back; they are only locked in by completion.
    pub fn select(&mut self, selection: Selection) -> Result<(), AppError> {
        if self.step() == WizardStep::Complete {
            return Err(AppError::Validation(
                "the wizard is already complete".to_string(),
            ));
        }
        match selection {
            Selection::Platform(platform) => self.selections.platform = Some(platform),
            Selection::Niche(niche) => {
                let trimmed = niche.trim();
                if trimmed.is_empty() {
                    return Err(AppError::Validation("niche must not be empty".to_string()));
                }
                self.selections.niche = Some(trimmed.to_string());
            }
            Selection::Goal(goal) => self.selections.goal = Some(goal),
            Selection::Tone(tone) => self.selections.tone = Some(tone),
        }
        Ok(())
    }

    /// Ask to advance one step.
    ///
    /// On the media step this gates on the upload: the first call asks the
    /// driver to start one, repeat calls while it is in flight are no-ops,
    /// and the step itself only advances when the resolution arrives. On
    /// attribute steps the current selection must be populated.
    pub fn request_next(&mut self) -> Result<NextAction, AppError> {
        match self.step() {
            WizardStep::Media => {
                if self.post_id.is_some() {
                    Ok(NextAction::Advanced(self.advance()))
                } else if self.pending_upload.is_some() {
                    Ok(NextAction::UploadPending)
                } else {
                    Ok(NextAction::StartUpload)
                }
            }
            WizardStep::Platform => self.gated_advance(self.selections.platform.is_some(), "platform"),
            WizardStep::Niche => self.gated_advance(self.selections.niche.is_some(), "niche"),
            WizardStep::Goal => self.gated_advance(self.selections.goal.is_some(), "goal"),
            WizardStep::Tone => Err(AppError::Validation(
                "the final step is left through completion".to_string(),
            )),
            WizardStep::Complete => Err(AppError::Validation(
                "the wizard is already complete".to_string(),
            )),
        }
    }

    /// Move back one step. Selections made so far are kept.
    pub fn back(&mut self) -> Result<WizardStep, AppError> {
        match self.step.backward() {
            Some(previous) => {
                self.step = previous;
                Ok(previous)
            }
            None => Err(AppError::Validation(
                "already on the first step".to_string(),
            )),
        }
    }

    /// The driver started an upload attempt for the given source generation.
    pub fn upload_started(&mut self, generation: u64) {
        self.pending_upload = Some(generation);
    }

    /// An upload attempt finished successfully. Applies only when the
    /// attempt is still the pending one; a stale resolution returns `false`
    /// and changes nothing.
    pub fn resolve_upload(&mut self, generation: u64, post_id: Uuid) -> bool {
        if self.pending_upload != Some(generation) {
            return false;
        }
        self.pending_upload = None;
        self.post_id = Some(post_id);
        if self.step() == WizardStep::Media {
            self.advance();
        }
        true
    }

    /// An upload attempt failed or was orphaned; the media step stays put
    /// and a later `request_next` may retry.
    pub fn upload_settled_without_post(&mut self, generation: u64) {
        if self.pending_upload == Some(generation) {
            self.pending_upload = None;
        }
    }

    /// The media source was cleared or replaced. Any uploaded post no longer
    /// matches the source, and an in-flight attempt is orphaned.
    pub fn media_reset(&mut self) {
        self.post_id = None;
        self.pending_upload = None;
    }

    /// Validate completion and hand back what must be persisted.
    ///
    /// Only permitted from the final step, with every selection populated
    /// and an uploaded post to attach them to. The machine stays on the
    /// final step until [`completion_succeeded`](Self::completion_succeeded);
    /// a failed persistence leaves everything retryable.
    pub fn request_complete(&self) -> Result<(Uuid, PostAttributes), AppError> {
        if self.step() != WizardStep::Tone {
            return Err(AppError::Validation(
                "completion is only permitted from the final step".to_string(),
            ));
        }
        let post_id = self.post_id.ok_or_else(|| {
            AppError::Validation("no uploaded media to complete".to_string())
        })?;
        let attributes = self.selections.to_attributes().ok_or_else(|| {
            AppError::Validation("all selections must be populated".to_string())
        })?;
        Ok((post_id, attributes))
    }

    /// The attribute write was confirmed; the wizard is done.
    pub fn completion_succeeded(&mut self) {
        self.step = WizardStep::Complete;
    }

    fn gated_advance(&mut self, populated: bool, field: &str) -> Result<NextAction, AppError> {
        if populated {
            Ok(NextAction::Advanced(self.advance()))
        } else {
            Err(AppError::Validation(format!(
                "a {} must be selected before continuing",
                field
            )))
        }
    }

    fn advance(&mut self) -> WizardStep {
        if let Some(next) = self.step.forward() {
            self.step = next;
        }
        self.step
    }
}
