//! Core types for spark-motion.
//!
//! Plain data shared by every layer of the runtime: identities, gesture
//! phases and events, and the discrete motion state reported by interactions.

use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// Identities
// =============================================================================

/// Identity of a host view.
///
/// Assigned by the host and stable for the lifetime of the view. The runtime
/// keys every per-view registry by this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u64);

/// Identity of a [`ReactiveProperty`](crate::ReactiveProperty).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyId(u64);

/// Identity of a [`Stream`](crate::Stream) description.
///
/// Cloning a stream keeps its id; every combinator produces a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamId(u64);

/// Identity of a [`GestureRecognizer`](crate::GestureRecognizer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecognizerId(u64);

static NEXT_PROPERTY_ID: AtomicU64 = AtomicU64::new(0);
static NEXT_STREAM_ID: AtomicU64 = AtomicU64::new(0);
static NEXT_RECOGNIZER_ID: AtomicU64 = AtomicU64::new(0);

impl PropertyId {
    pub(crate) fn next() -> Self {
        Self(NEXT_PROPERTY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl StreamId {
    pub(crate) fn next() -> Self {
        Self(NEXT_STREAM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl RecognizerId {
    pub(crate) fn next() -> Self {
        Self(NEXT_RECOGNIZER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

// =============================================================================
// Gesture Types
// =============================================================================

/// Kind of gesture recognizer.
///
/// A view holds at most one live recognizer per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecognizerKind {
    Rotation,
    Pinch,
    Pan,
}

/// Recognition phase reported by the host gesture subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GesturePhase {
    #[default]
    Possible,
    Began,
    Changed,
    Ended,
    Cancelled,
    Failed,
}

impl GesturePhase {
    /// Began or Changed.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Began | Self::Changed)
    }

    /// Ended, Cancelled or Failed.
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled | Self::Failed)
    }

    /// The motion state an interaction reports while its gesture is in this phase.
    pub fn motion_state(self) -> MotionState {
        if self.is_active() {
            MotionState::Active
        } else {
            MotionState::Idle
        }
    }
}

bitflags::bitflags! {
    /// Set of gesture phases, used to filter gesture streams.
    ///
    /// Combine with bitwise OR: `PhaseSet::BEGAN | PhaseSet::CHANGED`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PhaseSet: u8 {
        const POSSIBLE = 1 << 0;
        const BEGAN = 1 << 1;
        const CHANGED = 1 << 2;
        const ENDED = 1 << 3;
        const CANCELLED = 1 << 4;
        const FAILED = 1 << 5;

        /// Phases during which the gesture drives motion.
        const ACTIVE = Self::BEGAN.bits() | Self::CHANGED.bits();
        /// Terminal phases.
        const FINISHED = Self::ENDED.bits() | Self::CANCELLED.bits() | Self::FAILED.bits();
    }
}

impl From<GesturePhase> for PhaseSet {
    fn from(phase: GesturePhase) -> Self {
        match phase {
            GesturePhase::Possible => Self::POSSIBLE,
            GesturePhase::Began => Self::BEGAN,
            GesturePhase::Changed => Self::CHANGED,
            GesturePhase::Ended => Self::ENDED,
            GesturePhase::Cancelled => Self::CANCELLED,
            GesturePhase::Failed => Self::FAILED,
        }
    }
}

impl PhaseSet {
    /// Check if the set contains a phase.
    pub fn includes(self, phase: GesturePhase) -> bool {
        self.contains(phase.into())
    }
}

/// A single event from a gesture recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureEvent {
    /// Recognition phase
    pub phase: GesturePhase,
    /// Rotation in radians since the gesture began
    pub rotation: f64,
}

impl GestureEvent {
    pub fn new(phase: GesturePhase, rotation: f64) -> Self {
        Self { phase, rotation }
    }

    pub fn began(rotation: f64) -> Self {
        Self::new(GesturePhase::Began, rotation)
    }

    pub fn changed(rotation: f64) -> Self {
        Self::new(GesturePhase::Changed, rotation)
    }

    pub fn ended(rotation: f64) -> Self {
        Self::new(GesturePhase::Ended, rotation)
    }

    pub fn cancelled(rotation: f64) -> Self {
        Self::new(GesturePhase::Cancelled, rotation)
    }

    pub fn failed() -> Self {
        Self::new(GesturePhase::Failed, 0.0)
    }
}

// =============================================================================
// Motion State
// =============================================================================

/// Discrete liveness of an interaction, or of a group of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MotionState {
    /// Nothing in progress.
    #[default]
    Idle,
    /// The user is driving the motion.
    Active,
    /// Input has ended but the motion is still coming to rest.
    Settling,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_activity() {
        assert!(GesturePhase::Began.is_active());
        assert!(GesturePhase::Changed.is_active());
        assert!(!GesturePhase::Possible.is_active());
        assert!(GesturePhase::Cancelled.is_finished());
        assert!(!GesturePhase::Changed.is_finished());
    }

    #[test]
    fn test_phase_motion_state() {
        assert_eq!(GesturePhase::Began.motion_state(), MotionState::Active);
        assert_eq!(GesturePhase::Ended.motion_state(), MotionState::Idle);
        assert_eq!(GesturePhase::Possible.motion_state(), MotionState::Idle);
    }

    #[test]
    fn test_phase_set() {
        assert!(PhaseSet::ACTIVE.includes(GesturePhase::Began));
        assert!(PhaseSet::ACTIVE.includes(GesturePhase::Changed));
        assert!(!PhaseSet::ACTIVE.includes(GesturePhase::Ended));
        assert!(PhaseSet::FINISHED.includes(GesturePhase::Failed));

        let custom = PhaseSet::BEGAN | PhaseSet::ENDED;
        assert!(custom.includes(GesturePhase::Ended));
        assert!(!custom.includes(GesturePhase::Changed));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = PropertyId::next();
        let b = PropertyId::next();
        assert_ne!(a, b);
        assert_ne!(StreamId::next(), StreamId::next());
        assert_ne!(RecognizerId::next(), RecognizerId::next());
    }
}
