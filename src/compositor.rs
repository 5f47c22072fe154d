// Per-frame compositing: runs once for every detector callback and decides
// what this frame looks like.
//
// Three outcomes, none of them errors:
//   Skipped     - nothing usable this callback (no frame, zero-sized surface);
//                 wait for the next one.
//   Background  - video painted, no overlay. The steady state whenever no
//                 face is tracked, the sentinel is selected, or the selected
//                 glasses have not finished loading.
//   Tracked     - video painted and the glasses drawn on the first face.

use crate::align::{self, Placement};
use crate::detector::LandmarkFrame;
use crate::registry::AssetRegistry;
use crate::selection::SelectionState;
use crate::surface::Surface;
use crate::types::{FrameBuffer, Point};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameOutcome {
    Skipped,
    Background,
    Tracked(Placement),
}

/// Compositing knobs that stay fixed across frames.
#[derive(Clone, Copy)]
pub struct CompositeParams {
    pub display_w: usize,
    pub display_h: usize,
    pub pixel_ratio: f32,
    pub mirrored: bool,
}

/// One composite step. Re-reads selection and asset readiness every call, so
/// a selection made a frame ago or a load that just finished shows up here
/// without any propagation delay.
pub fn composite(
    surface: &mut Surface,
    params: &CompositeParams,
    frame: Option<&FrameBuffer>,
    landmarks: &LandmarkFrame,
    registry: &AssetRegistry,
    selection: &SelectionState,
) -> FrameOutcome {
    // The camera not producing yet is a normal transient; skip and retry on
    // the next callback.
    let Some(frame) = frame else { return FrameOutcome::Skipped };
    if frame.width == 0 || frame.height == 0 {
        return FrameOutcome::Skipped;
    }

    // Sizing first, before any paint, so a just-resized window never shows a
    // frame drawn at the old resolution.
    surface.reconcile(params.display_w, params.display_h, params.pixel_ratio);
    if surface.width() == 0 || surface.height() == 0 {
        return FrameOutcome::Skipped;
    }

    surface.clear();
    surface.draw_background(frame, params.mirrored);

    // Only the first face gets glasses; extra faces are ignored by design.
    let Some((left_norm, right_norm)) = landmarks.first_face_eyes() else {
        return FrameOutcome::Background;
    };

    // Sentinel, unknown id, still loading, failed: all mean "no overlay".
    let Some(img) = registry.ready_image(selection.current()) else {
        return FrameOutcome::Background;
    };

    // Normalized landmark coordinates into surface pixel space.
    let w = surface.width() as f32;
    let h = surface.height() as f32;
    let left = Point::new(left_norm.x * w, left_norm.y * h);
    let right = Point::new(right_norm.x * w, right_norm.y * h);

    let placement = align::align(left, right, params.mirrored, w);
    let (ow, oh) = align::overlay_size(placement.interocular, img.width, img.height);
    surface.draw_overlay(img, &placement, ow, oh);

    FrameOutcome::Tracked(placement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::{LEFT_EYE_OUTER, RIGHT_EYE_OUTER};
    use crate::types::OverlayImage;
    use std::path::PathBuf;

    fn params(mirrored: bool) -> CompositeParams {
        CompositeParams { display_w: 640, display_h: 480, pixel_ratio: 1.0, mirrored }
    }

    fn camera_frame() -> FrameBuffer {
        FrameBuffer { width: 640, height: 480, pixels: vec![0x0020_4060; 640 * 480] }
    }

    fn one_face(left: Point, right: Point) -> LandmarkFrame {
        let mut face = vec![Point::new(0.0, 0.0); RIGHT_EYE_OUTER + 1];
        face[LEFT_EYE_OUTER] = left;
        face[RIGHT_EYE_OUTER] = right;
        LandmarkFrame { faces: vec![face] }
    }

    fn registry_with_ready_asset() -> AssetRegistry {
        let mut reg = AssetRegistry::without_loads(vec![PathBuf::from("a.png")]);
        reg.apply_load(1, Ok(OverlayImage::solid(200, 100, 0xFFFF_FFFF)));
        reg
    }

    #[test]
    fn missing_frame_skips_the_whole_step() {
        let mut surface = Surface::new(640, 480);
        let reg = registry_with_ready_asset();
        let sel = SelectionState::new(reg.len());
        let out = composite(&mut surface, &params(false), None, &LandmarkFrame::default(), &reg, &sel);
        assert_eq!(out, FrameOutcome::Skipped);
    }

    #[test]
    fn no_face_paints_background_only() {
        let mut surface = Surface::new(640, 480);
        let reg = registry_with_ready_asset();
        let mut sel = SelectionState::new(reg.len());
        sel.select(1);
        let frame = camera_frame();
        let out = composite(&mut surface, &params(false), Some(&frame), &LandmarkFrame::default(), &reg, &sel);
        assert_eq!(out, FrameOutcome::Background);
        // Background really got painted.
        assert_eq!(surface.frame().pixels[0], 0x0020_4060);
    }

    #[test]
    fn sentinel_selection_paints_background_only() {
        let mut surface = Surface::new(640, 480);
        let reg = registry_with_ready_asset();
        let sel = SelectionState::new(reg.len()); // stays on sentinel
        let frame = camera_frame();
        let lm = one_face(Point::new(0.3, 0.5), Point::new(0.7, 0.5));
        let out = composite(&mut surface, &params(false), Some(&frame), &lm, &reg, &sel);
        assert_eq!(out, FrameOutcome::Background);
    }

    #[test]
    fn tracked_frame_places_overlay_from_landmarks() {
        let mut surface = Surface::new(640, 480);
        let reg = registry_with_ready_asset();
        let mut sel = SelectionState::new(reg.len());
        sel.select(1);
        let frame = camera_frame();
        let lm = one_face(Point::new(0.3, 0.5), Point::new(0.7, 0.5));
        let out = composite(&mut surface, &params(false), Some(&frame), &lm, &reg, &sel);
        let FrameOutcome::Tracked(p) = out else { panic!("expected Tracked, got {out:?}") };
        assert!((p.anchor.x - 320.0).abs() < 1e-3);
        assert!((p.anchor.y - 240.0).abs() < 1e-3);
        assert!((p.angle - 0.0).abs() < 1e-6);
        assert!((p.interocular - 256.0).abs() < 1e-3);
        // The white glasses actually landed on the video.
        assert_eq!(surface.frame().pixels[240 * 640 + 320], 0x00FF_FFFF);
    }

    #[test]
    fn loading_asset_paints_background_only() {
        let mut surface = Surface::new(640, 480);
        let reg = AssetRegistry::without_loads(vec![PathBuf::from("a.png")]); // entry 1 pending
        let mut sel = SelectionState::new(reg.len());
        sel.select(1);
        let frame = camera_frame();
        let lm = one_face(Point::new(0.3, 0.5), Point::new(0.7, 0.5));
        let out = composite(&mut surface, &params(false), Some(&frame), &lm, &reg, &sel);
        assert_eq!(out, FrameOutcome::Background);
    }

    #[test]
    fn mirrored_composite_reflects_placement() {
        let mut surface = Surface::new(640, 480);
        let reg = registry_with_ready_asset();
        let mut sel = SelectionState::new(reg.len());
        sel.select(1);
        let frame = camera_frame();
        let lm = one_face(Point::new(0.2, 0.4), Point::new(0.6, 0.5));
        let plain = composite(&mut surface, &params(false), Some(&frame), &lm, &reg, &sel);
        let mirrored = composite(&mut surface, &params(true), Some(&frame), &lm, &reg, &sel);
        let (FrameOutcome::Tracked(a), FrameOutcome::Tracked(b)) = (plain, mirrored) else {
            panic!("both composites should track");
        };
        assert!((b.anchor.x - (640.0 - a.anchor.x)).abs() < 1e-3);
        assert!((b.angle + a.angle).abs() < 1e-6);
    }

    #[test]
    fn skipped_frame_leaves_previous_pixels_intact() {
        // A camera outage must not disturb the last composited frame; the
        // wiring layer re-presents it as-is, decorations included.
        let mut surface = Surface::new(640, 480);
        let reg = registry_with_ready_asset();
        let mut sel = SelectionState::new(reg.len());
        sel.select(1);
        let frame = camera_frame();
        let lm = one_face(Point::new(0.3, 0.5), Point::new(0.7, 0.5));
        composite(&mut surface, &params(false), Some(&frame), &lm, &reg, &sel);
        let before = surface.frame().pixels.clone();

        let out = composite(&mut surface, &params(false), None, &lm, &reg, &sel);
        assert_eq!(out, FrameOutcome::Skipped);
        assert_eq!(surface.frame().pixels, before);
    }

    #[test]
    fn reconcile_runs_before_painting() {
        // Surface starts at the wrong size; composite must fix it first.
        let mut surface = Surface::new(16, 16);
        let reg = registry_with_ready_asset();
        let sel = SelectionState::new(reg.len());
        let frame = camera_frame();
        composite(&mut surface, &params(false), Some(&frame), &LandmarkFrame::default(), &reg, &sel);
        assert_eq!((surface.width(), surface.height()), (640, 480));
    }
}
