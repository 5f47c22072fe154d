// The per-frame geometry: where to put the glasses, how much to turn them,
// and how big to draw them, all derived from the two eye-corner landmarks.
// Visual: the overlay sticks to the eye line and tilts with the head.
//
// Everything in here is pure math on two points. No drawing, no state.

use crate::types::Point;

/// Overlay width as a multiple of the eye-to-eye pixel distance.
/// Tuned by eye: 1.8 makes typical frames cover the temples without
/// swallowing the eyebrows. Sensible range is about 1.6 to 1.8.
pub const WIDTH_FACTOR: f32 = 1.8;

/// Fraction of the interocular distance added to the anchor's y to push the
/// glasses down from the eye line. 0.0 keeps them centered on the eyes,
/// which is where the stock assets are drawn to sit.
pub const VERTICAL_OFFSET_FACTOR: f32 = 0.0;

/// Where and how to draw the overlay this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub anchor: Point,     // surface-pixel midpoint between the eyes
    pub angle: f32,        // radians, head tilt along the eye line
    pub interocular: f32,  // eye-to-eye distance in surface pixels
}

/// Compute the placement from the two eye corners, already scaled into
/// surface pixel space. `surface_w` is only used when `mirrored` is set,
/// to reflect the anchor so it lands on the mirrored face.
pub fn align(left_eye: Point, right_eye: Point, mirrored: bool, surface_w: f32) -> Placement {
    let dx = right_eye.x - left_eye.x;
    let dy = right_eye.y - left_eye.y;

    let interocular = (dx * dx + dy * dy).sqrt();

    // atan2 gives the tilt of the eye line. With a mirrored background the
    // x axis is flipped, so the same head tilt reads as the opposite
    // rotation; negating keeps the overlay turning with the face.
    let mut angle = dy.atan2(dx);
    if mirrored {
        angle = -angle;
    }

    let mut anchor_x = (left_eye.x + right_eye.x) / 2.0;
    let anchor_y = (left_eye.y + right_eye.y) / 2.0 + interocular * VERTICAL_OFFSET_FACTOR;
    if mirrored {
        // The background is painted flipped, so reflect the anchor about the
        // surface midline to land on the mirrored face.
        anchor_x = surface_w - anchor_x;
    }

    Placement {
        anchor: Point::new(anchor_x, anchor_y),
        angle,
        interocular,
    }
}

/// Overlay draw size for a given placement and the asset's natural pixel
/// dimensions. Width scales off the interocular distance; height follows the
/// asset's aspect ratio exactly, never stretched per axis.
pub fn overlay_size(interocular: f32, natural_w: usize, natural_h: usize) -> (f32, f32) {
    let w = interocular * WIDTH_FACTOR;
    let h = w * (natural_h as f32 / natural_w as f32);
    (w, h)
}
