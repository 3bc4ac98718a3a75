// ============================================================
// Layer 3 — Driving Record Domain Types
// ============================================================
// One row of the simulator's driving log: three camera image
// paths captured at the same instant plus the steering angle
// the human driver applied.
//
// Only the center camera has a "true" label. The left and right
// cameras see the road from an offset position, so we synthesize
// their labels by nudging the recorded angle back towards the
// center of the lane:
//
//   left  camera → center + correction   (steer right a bit more)
//   right camera → center - correction   (steer left a bit more)
//
// Example with correction = 0.2:
//   recorded angle  0.05
//   center frame    0.05
//   left frame      0.25
//   right frame    -0.15
//
// Reference: Bojarski et al. (2016) End to End Learning for Self-Driving Cars
//            Rust Book §6 (Enums and Pattern Matching)

use serde::{Deserialize, Serialize};

/// Correction applied to the off-center cameras when none is configured
pub const DEFAULT_STEERING_CORRECTION: f32 = 0.2;

/// Which of the three windshield cameras captured a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Camera {
    Center,
    Left,
    Right,
}

impl Camera {
    /// All cameras in the order frames are emitted for a record
    pub const ALL: [Camera; 3] = [Camera::Center, Camera::Left, Camera::Right];

    /// Steering label for this camera given the recorded center angle.
    pub fn corrected_angle(self, center: f32, correction: f32) -> f32 {
        match self {
            Camera::Center => center,
            Camera::Left   => center + correction,
            Camera::Right  => center - correction,
        }
    }
}

/// A single parsed line of `driving_log.csv`.
///
/// Paths are stored exactly as they appear in the log
/// (with surrounding whitespace removed) and are resolved
/// against the data directory later by the reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrivingRecord {
    pub center:   String,
    pub left:     String,
    pub right:    String,
    /// Steering angle recorded for the center camera
    pub steering: f32,
}

impl DrivingRecord {
    pub fn new(
        center:   impl Into<String>,
        left:     impl Into<String>,
        right:    impl Into<String>,
        steering: f32,
    ) -> Self {
        Self {
            center:   center.into().trim().to_string(),
            left:     left.into().trim().to_string(),
            right:    right.into().trim().to_string(),
            steering,
        }
    }

    /// Image path recorded for the given camera
    pub fn path_for(&self, camera: Camera) -> &str {
        match camera {
            Camera::Center => &self.center,
            Camera::Left   => &self.left,
            Camera::Right  => &self.right,
        }
    }

    /// Expand this record into its three labelled frames,
    /// always in the order center, left, right.
    pub fn frames(&self, correction: f32) -> [LabeledFrame; 3] {
        Camera::ALL.map(|camera| LabeledFrame {
            camera,
            image_path: self.path_for(camera).to_string(),
            steering:   camera.corrected_angle(self.steering, correction),
        })
    }
}

/// One camera image paired with the steering angle it should predict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledFrame {
    pub camera:     Camera,
    pub image_path: String,
    pub steering:   f32,
}

/// Flatten a whole driving log into labelled frames (3 per record).
pub fn expand_records(records: &[DrivingRecord], correction: f32) -> Vec<LabeledFrame> {
    records
        .iter()
        .flat_map(|r| r.frames(correction))
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_corrected_angles() {
        assert!(approx(Camera::Center.corrected_angle(0.05, 0.2), 0.05));
        assert!(approx(Camera::Left.corrected_angle(0.05, 0.2), 0.25));
        assert!(approx(Camera::Right.corrected_angle(0.05, 0.2), -0.15));
    }

    #[test]
    fn test_record_trims_paths() {
        let r = DrivingRecord::new("IMG/c.jpg", " IMG/l.jpg", " IMG/r.jpg ", 0.0);
        assert_eq!(r.left, "IMG/l.jpg");
        assert_eq!(r.right, "IMG/r.jpg");
    }

    #[test]
    fn test_frames_are_center_left_right() {
        let r      = DrivingRecord::new("c.jpg", "l.jpg", "r.jpg", -0.1);
        let frames = r.frames(DEFAULT_STEERING_CORRECTION);

        assert_eq!(frames[0].camera, Camera::Center);
        assert_eq!(frames[0].image_path, "c.jpg");
        assert!(approx(frames[0].steering, -0.1));

        assert_eq!(frames[1].camera, Camera::Left);
        assert_eq!(frames[1].image_path, "l.jpg");
        assert!(approx(frames[1].steering, 0.1));

        assert_eq!(frames[2].camera, Camera::Right);
        assert_eq!(frames[2].image_path, "r.jpg");
        assert!(approx(frames[2].steering, -0.3));
    }

    #[test]
    fn test_expand_produces_three_frames_per_record() {
        let records = vec![
            DrivingRecord::new("a.jpg", "b.jpg", "c.jpg", 0.0),
            DrivingRecord::new("d.jpg", "e.jpg", "f.jpg", 0.5),
        ];
        let frames = expand_records(&records, 0.2);
        assert_eq!(frames.len(), 6);
        assert_eq!(frames[3].image_path, "d.jpg");
        assert!(approx(frames[4].steering, 0.7));
    }

    #[test]
    fn test_zero_correction_keeps_all_labels() {
        let r = DrivingRecord::new("a", "b", "c", 0.3);
        assert!(r.frames(0.0).iter().all(|f| approx(f.steering, 0.3)));
    }
}
