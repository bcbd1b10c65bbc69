//! Gesture stream combinators.
//!
//! Stages over `Stream<GestureEvent>` that turn raw recognizer events into
//! property values. The accumulating stages track the recognizer phase: every
//! `Began` resets their baseline so a re-engaged gesture never inherits a
//! stale one, and terminal phases clear it without emitting.

use super::property::ReactiveProperty;
use super::stream::Stream;
use crate::types::{GestureEvent, GesturePhase, MotionState, PhaseSet};

impl Stream<GestureEvent> {
    /// Phase of every event.
    pub fn phase(&self) -> Stream<GesturePhase> {
        self.map(|event| event.phase)
    }

    /// Motion state implied by every event's phase.
    pub fn motion_state(&self) -> Stream<MotionState> {
        self.map(|event| event.phase.motion_state())
    }

    /// Forward only events whose phase is in `phases`.
    pub fn when_phase(&self, phases: PhaseSet) -> Stream<GestureEvent> {
        self.filter(move |event| phases.includes(event.phase))
    }

    /// Raw rotation of every event.
    pub fn rotation(&self) -> Stream<f64> {
        self.map(|event| event.rotation)
    }

    /// Rotation relative to the value at the most recent `Began`.
    ///
    /// Emits on Began (always 0.0) and Changed. If the first active event seen
    /// by a subscription is a Changed, it becomes the reference.
    pub fn rotation_delta(&self) -> Stream<f64> {
        self.stateful(
            || None::<f64>,
            |reference, event| match event.phase {
                GesturePhase::Began => {
                    *reference = Some(event.rotation);
                    Some(0.0)
                }
                GesturePhase::Changed => {
                    let start = *reference.get_or_insert(event.rotation);
                    Some(event.rotation - start)
                }
                GesturePhase::Ended | GesturePhase::Cancelled | GesturePhase::Failed => {
                    *reference = None;
                    None
                }
                GesturePhase::Possible => None,
            },
        )
    }

    /// Absolute rotation for `property`: its value captured at `Began` plus
    /// the gesture's rotation.
    ///
    /// A subscription that joins mid-gesture adopts the property's current
    /// value as the starting point, so the first emission does not jump.
    pub fn rotated_from(&self, property: &ReactiveProperty<f64>) -> Stream<f64> {
        let property = property.clone();
        self.stateful(
            || None::<f64>,
            move |baseline, event| match event.phase {
                GesturePhase::Began => {
                    let start = property.read();
                    *baseline = Some(start);
                    Some(start + event.rotation)
                }
                GesturePhase::Changed => {
                    let start = *baseline.get_or_insert_with(|| property.read() - event.rotation);
                    Some(start + event.rotation)
                }
                GesturePhase::Ended | GesturePhase::Cancelled | GesturePhase::Failed => {
                    *baseline = None;
                    None
                }
                GesturePhase::Possible => None,
            },
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================
