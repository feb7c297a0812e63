//! Gesture notifications and the namespaced event names they are bridged as.

use serde::{Deserialize, Serialize};

use crate::Point;

/// Name of the low-level notification emitted for every input sample,
/// before any recognized gesture.
pub const INPUT_EVENT: &str = "hammer.input";

/// Prefix marking bridged gestures, keeping them apart from the renderer's
/// native pointer events.
pub const EVENT_PREFIX: &str = "hammer-";

/// Name a forwarded gesture type is dispatched under.
///
/// ```
/// assert_eq!(canvas_bridge::event_name("pan"), "hammer-pan");
/// ```
#[must_use]
pub fn event_name(gesture_type: &str) -> String {
    format!("{EVENT_PREFIX}{gesture_type}")
}

/// Phase of the underlying pointer input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputPhase {
    /// First pointer went down.
    #[default]
    Start,
    /// Pointer moved.
    Move,
    /// Last pointer lifted.
    End,
    /// Input was cancelled by the host.
    Cancel,
}

/// A notification from the gesture manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureInput {
    /// Gesture type name (`pan`, `tap`, ...). Empty for raw input samples.
    #[serde(rename = "type")]
    pub kind: String,
    /// Center of all active pointers, in client coordinates.
    pub center: Point,
    /// First sample of a gesture sequence.
    pub is_first: bool,
    /// Last sample of a gesture sequence.
    #[serde(default)]
    pub is_final: bool,
    /// Input phase.
    #[serde(default)]
    pub phase: InputPhase,
    /// Movement since the first sample.
    #[serde(default)]
    pub delta: Point,
    /// Pinch scale relative to the first sample (1.0 = unchanged).
    #[serde(default = "unit_scale")]
    pub scale: f32,
    /// Rotation relative to the first sample, in degrees.
    #[serde(default)]
    pub rotation: f32,
    /// Number of active pointers.
    #[serde(default = "single_pointer")]
    pub pointer_count: u32,
    /// Timestamp in milliseconds.
    #[serde(default)]
    pub timestamp_ms: u64,
}

fn unit_scale() -> f32 {
    1.0
}

fn single_pointer() -> u32 {
    1
}

impl GestureInput {
    /// Create a single-pointer notification of the given type.
    #[must_use]
    pub fn new(kind: impl Into<String>, center: Point) -> Self {
        Self {
            kind: kind.into(),
            center,
            is_first: false,
            is_final: false,
            phase: InputPhase::Move,
            delta: Point::ZERO,
            scale: unit_scale(),
            rotation: 0.0,
            pointer_count: single_pointer(),
            timestamp_ms: 0,
        }
    }

    /// Create a raw input sample with no gesture type.
    #[must_use]
    pub fn raw(center: Point) -> Self {
        Self::new(String::new(), center)
    }

    /// Mark this as the first sample of a sequence.
    #[must_use]
    pub fn first(mut self) -> Self {
        self.is_first = true;
        self.with_phase(InputPhase::Start)
    }

    /// Mark this as the last sample of a sequence.
    #[must_use]
    pub fn last(mut self) -> Self {
        self.is_final = true;
        self.with_phase(InputPhase::End)
    }

    /// Set the input phase.
    #[must_use]
    pub fn with_phase(mut self, phase: InputPhase) -> Self {
        self.phase = phase;
        self
    }

    /// Set the timestamp.
    #[must_use]
    pub fn at(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }

    /// Same sample, reported under another gesture type.
    #[must_use]
    pub fn as_type(&self, kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_name_prefixes_exactly() {
        assert_eq!(event_name("tap"), "hammer-tap");
        assert_eq!(event_name("panstart"), "hammer-panstart");
        assert_eq!(event_name(""), "hammer-");
    }

    #[test]
    fn first_and_last_set_phase() {
        let start = GestureInput::new("pan", Point::new(1.0, 2.0)).first();
        assert!(start.is_first);
        assert_eq!(start.phase, InputPhase::Start);

        let end = GestureInput::new("pan", Point::new(1.0, 2.0)).last();
        assert!(end.is_final);
        assert_eq!(end.phase, InputPhase::End);
    }

    #[test]
    fn cancelled_sample_serializes_lowercase_phase() {
        let input = GestureInput::new("pan", Point::ZERO).with_phase(InputPhase::Cancel);
        let json = serde_json::to_value(&input).expect("should serialize");
        assert_eq!(json["phase"], "cancel");
        assert!(!input.is_final);
    }

    #[test]
    fn deserializes_engine_payload_with_defaults() {
        let json = r#"{"type":"tap","center":{"x":3.0,"y":4.0},"is_first":true}"#;
        let input: GestureInput = serde_json::from_str(json).expect("should parse");
        assert_eq!(input.kind, "tap");
        assert_eq!(input.center, Point::new(3.0, 4.0));
        assert!(input.is_first);
        assert!((input.scale - 1.0).abs() < f32::EPSILON);
        assert_eq!(input.pointer_count, 1);
    }

    #[test]
    fn as_type_keeps_sample_data() {
        let input = GestureInput::raw(Point::new(5.0, 6.0)).first().at(42);
        let pan = input.as_type("pan");
        assert_eq!(pan.kind, "pan");
        assert_eq!(pan.center, input.center);
        assert_eq!(pan.timestamp_ms, 42);
        assert!(pan.is_first);
    }
}
