// Contract with the external face-landmark detector.
// We never run detection ourselves; a backend hands us, per frame, zero or
// more faces as ordered lists of normalized [0,1] points. The two indices
// below are fixed by the detector's face-mesh model. Do not renumber them.

use crate::types::{FrameBuffer, Point};

/// Outer corner of the left eye in the detector's landmark numbering.
pub const LEFT_EYE_OUTER: usize = 33;
/// Outer corner of the right eye in the detector's landmark numbering.
pub const RIGHT_EYE_OUTER: usize = 263;

/// One detector callback's worth of results. `faces` may be empty; that is
/// the normal "tracking lost" state, not an error.
#[derive(Clone, Default)]
pub struct LandmarkFrame {
    pub faces: Vec<Vec<Point>>,
}

impl LandmarkFrame {
    /// The eye-corner pair of the first detected face, if that face carries
    /// enough landmarks. Extra faces are ignored on purpose: we only ever
    /// dress one wearer.
    pub fn first_face_eyes(&self) -> Option<(Point, Point)> {
        let face = self.faces.first()?;
        let left = *face.get(LEFT_EYE_OUTER)?;
        let right = *face.get(RIGHT_EYE_OUTER)?;
        Some((left, right))
    }
}

/// A detector backend: give it the current frame, get landmarks back.
/// Implementations are expected to be best-effort and per-frame; nothing is
/// queued between calls.
pub trait LandmarkDetector {
    fn detect(&mut self, frame: &FrameBuffer) -> LandmarkFrame;
}

/// Stand-in backend that never finds a face, so the app runs as a plain
/// mirror until a real face-mesh backend is wired in.
pub struct NoopDetector;

impl LandmarkDetector for NoopDetector {
    fn detect(&mut self, _frame: &FrameBuffer) -> LandmarkFrame {
        LandmarkFrame::default()
    }
}
