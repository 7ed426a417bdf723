//! Gesture sample record and wire decoding

use serde_json::Value;

/// Zoom percentage used as the target before any sample has arrived.
/// Higher means closer.
pub const DEFAULT_ZOOM: f32 = 85.0;

/// A single gesture reading from the external producer.
///
/// Superseded wholesale by the next sample; no history is retained.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlSample {
    /// Zoom level, 0-100 (higher = closer)
    pub zoom: f32,
    /// Rotation around the X axis, degrees
    pub rotate_x: f32,
    /// Rotation around the Y axis, degrees
    pub rotate_y: f32,
}

impl Default for ControlSample {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            rotate_x: 0.0,
            rotate_y: 0.0,
        }
    }
}

impl ControlSample {
    /// Decode a `gesture_update` payload.
    ///
    /// Returns `None` for any frame that is not a well-formed gesture update
    /// (wrong type tag, missing field, non-numeric field). Callers drop such
    /// frames without touching the shared slot.
    pub fn from_json(json: &Value) -> Option<Self> {
        if json.get("type")?.as_str()? != "gesture_update" {
            return None;
        }

        Some(Self {
            zoom: number_field(json, "zoom")?,
            rotate_x: number_field(json, "rotate_x")?,
            rotate_y: number_field(json, "rotate_y")?,
        })
    }
}

fn number_field(json: &Value, key: &str) -> Option<f32> {
    let value = json.get(key)?.as_f64()?;
    if value.is_finite() {
        Some(value as f32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_gesture_update() {
        let json = serde_json::json!({
            "type": "gesture_update",
            "zoom": 62.5,
            "rotate_x": -12.0,
            "rotate_y": 45.0
        });

        let sample = ControlSample::from_json(&json).unwrap();
        assert_eq!(sample.zoom, 62.5);
        assert_eq!(sample.rotate_x, -12.0);
        assert_eq!(sample.rotate_y, 45.0);
    }

    #[test]
    fn test_decode_integer_fields() {
        let json = serde_json::json!({
            "type": "gesture_update",
            "zoom": 50,
            "rotate_x": 0,
            "rotate_y": 90
        });

        let sample = ControlSample::from_json(&json).unwrap();
        assert_eq!(sample.zoom, 50.0);
        assert_eq!(sample.rotate_y, 90.0);
    }

    #[test]
    fn test_reject_wrong_type_tag() {
        let json = serde_json::json!({
            "type": "telemetry",
            "zoom": 50.0,
            "rotate_x": 0.0,
            "rotate_y": 0.0
        });

        assert!(ControlSample::from_json(&json).is_none());
    }

    #[test]
    fn test_reject_missing_field() {
        let json = serde_json::json!({
            "type": "gesture_update",
            "zoom": 50.0,
            "rotate_x": 0.0
        });

        assert!(ControlSample::from_json(&json).is_none());
    }

    #[test]
    fn test_reject_non_numeric_field() {
        let json = serde_json::json!({
            "type": "gesture_update",
            "zoom": "bad",
            "rotate_x": 0.0,
            "rotate_y": 0.0
        });

        assert!(ControlSample::from_json(&json).is_none());
    }

    #[test]
    fn test_reject_non_object() {
        assert!(ControlSample::from_json(&serde_json::json!(42)).is_none());
        assert!(ControlSample::from_json(&serde_json::json!([1, 2, 3])).is_none());
    }

    #[test]
    fn test_default_sample() {
        let sample = ControlSample::default();
        assert_eq!(sample.zoom, DEFAULT_ZOOM);
        assert_eq!(sample.rotate_x, 0.0);
        assert_eq!(sample.rotate_y, 0.0);
    }
}
