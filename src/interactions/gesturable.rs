//! Gesturable - Recognizer configuration shared by gesture interactions.

use crate::engine::{AggregateState, MotionRuntime, RecognizerHandle};
use crate::platform::{GestureRecognizer, View};
use crate::reactive::ReactiveProperty;
use crate::types::RecognizerKind;

/// Where a gesture interaction gets its recognizer from.
#[derive(Debug, Clone, Default)]
pub enum GesturableConfig {
    /// Use the view's pooled recognizer of the interaction's kind.
    #[default]
    RegisterNew,
    /// Use this recognizer, pooling it under its view.
    WithExisting(GestureRecognizer),
}

/// Recognizer configuration plus the toggle and state every gesture
/// interaction exposes.
#[derive(Debug, Clone)]
pub struct Gesturable {
    kind: RecognizerKind,
    config: GesturableConfig,
    enabled: ReactiveProperty<bool>,
    state: AggregateState,
}

impl Gesturable {
    pub fn new(kind: RecognizerKind, config: GesturableConfig) -> Self {
        Self {
            kind,
            config,
            enabled: ReactiveProperty::new(true),
            state: AggregateState::new(),
        }
    }

    pub fn kind(&self) -> RecognizerKind {
        self.kind
    }

    pub fn config(&self) -> &GesturableConfig {
        &self.config
    }

    pub fn enabled(&self) -> &ReactiveProperty<bool> {
        &self.enabled
    }

    pub fn state(&self) -> &AggregateState {
        &self.state
    }

    /// Check out the recognizer for `view` according to the configuration.
    ///
    /// None means the interaction should silently not install.
    pub fn dequeue(&self, view: &View, runtime: &MotionRuntime) -> Option<RecognizerHandle> {
        match &self.config {
            GesturableConfig::RegisterNew => runtime.pool().dequeue(view, self.kind),
            GesturableConfig::WithExisting(recognizer) => {
                if recognizer.kind() != self.kind {
                    tracing::warn!(
                        expected = ?self.kind,
                        actual = ?recognizer.kind(),
                        "existing recognizer has the wrong kind"
                    );
                    return None;
                }
                runtime.pool().adopt(view, recognizer.clone())
            }
        }
    }
}
