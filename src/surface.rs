// The drawing surface: the pixel buffer everything is painted into, plus the
// sizing policy that keeps its backing resolution matched to the displayed
// size. All painting is plain software: background blit (optionally
// mirrored), then a rotated, alpha-blended overlay blit.

use crate::align::Placement;
use crate::types::{FrameBuffer, OverlayImage};

pub struct Surface {
    fb: FrameBuffer,
}

impl Surface {
    pub fn new(width: usize, height: usize) -> Self {
        Self { fb: FrameBuffer::new(width, height) }
    }

    /// Match the backing resolution to the displayed size times the device
    /// pixel ratio. Only reallocates when the target actually differs; a
    /// reallocation drops the old pixels, which is fine because every frame
    /// repaints the whole surface right after this call. Returns whether a
    /// resize happened.
    pub fn reconcile(&mut self, display_w: usize, display_h: usize, pixel_ratio: f32) -> bool {
        let target_w = (display_w as f32 * pixel_ratio).round() as usize;
        let target_h = (display_h as f32 * pixel_ratio).round() as usize;
        if target_w == self.fb.width && target_h == self.fb.height {
            return false;
        }
        self.fb = FrameBuffer::new(target_w, target_h);
        true
    }

    pub fn width(&self) -> usize {
        self.fb.width
    }

    pub fn height(&self) -> usize {
        self.fb.height
    }

    /// The finished frame, ready to push to the window.
    pub fn frame(&self) -> &FrameBuffer {
        &self.fb
    }

    /// Mutable access for decorations painted after compositing (HUD text).
    pub fn frame_mut(&mut self) -> &mut FrameBuffer {
        &mut self.fb
    }

    /// Paint everything black. Runs before the background blit so stale
    /// pixels from the previous frame never shine through.
    pub fn clear(&mut self) {
        self.fb.pixels.fill(0);
    }

    /// Paint the camera frame across the whole surface, nearest-neighbor
    /// scaled, flipped left-right when `mirrored` is set (selfie view).
    pub fn draw_background(&mut self, frame: &FrameBuffer, mirrored: bool) {
        if frame.width == 0 || frame.height == 0 || self.fb.width == 0 || self.fb.height == 0 {
            return;
        }
        for y in 0..self.fb.height {
            let sy = y * frame.height / self.fb.height;
            let src_row = sy * frame.width;
            let dst_row = y * self.fb.width;
            for x in 0..self.fb.width {
                let mut sx = x * frame.width / self.fb.width;
                if mirrored {
                    sx = frame.width - 1 - sx;
                }
                self.fb.pixels[dst_row + x] = frame.pixels[src_row + sx];
            }
        }
    }

    /// Blit the overlay centered on the placement anchor, rotated by the
    /// placement angle, scaled to `draw_w` x `draw_h`. Works by walking the
    /// destination bounding box and rotating each pixel back into sprite
    /// space, so no transform state outlives the call.
    pub fn draw_overlay(&mut self, img: &OverlayImage, placement: &Placement, draw_w: f32, draw_h: f32) {
        if img.width == 0 || img.height == 0 || draw_w <= 0.0 || draw_h <= 0.0 {
            return;
        }
        let ax = placement.anchor.x;
        let ay = placement.anchor.y;
        let (sin_a, cos_a) = placement.angle.sin_cos();
        let hw = draw_w / 2.0;
        let hh = draw_h / 2.0;

        // Conservative bounding box: the rotated sprite fits inside the
        // circle of its half-diagonal.
        let radius = (hw * hw + hh * hh).sqrt().ceil() as i32;
        let x0 = ((ax as i32) - radius).max(0);
        let x1 = ((ax as i32) + radius).min(self.fb.width as i32 - 1);
        let y0 = ((ay as i32) - radius).max(0);
        let y1 = ((ay as i32) + radius).min(self.fb.height as i32 - 1);

        for y in y0..=y1 {
            for x in x0..=x1 {
                // Destination pixel center, relative to the anchor.
                let fx = x as f32 + 0.5 - ax;
                let fy = y as f32 + 0.5 - ay;
                // Undo the rotation to land in the sprite's axis-aligned space.
                let lx = cos_a * fx + sin_a * fy;
                let ly = -sin_a * fx + cos_a * fy;
                if lx < -hw || lx >= hw || ly < -hh || ly >= hh {
                    continue;
                }
                let u = ((lx + hw) / draw_w * img.width as f32) as usize;
                let v = ((ly + hh) / draw_h * img.height as f32) as usize;
                let src = img.pixels[v.min(img.height - 1) * img.width + u.min(img.width - 1)];
                let idx = y as usize * self.fb.width + x as usize;
                self.fb.pixels[idx] = blend_over(src, self.fb.pixels[idx]);
            }
        }
    }
}

/// Straight-alpha "source over destination" for one pixel.
/// src is 0xAARRGGBB, dst is 0x00RRGGBB; returns 0x00RRGGBB.
#[inline]
fn blend_over(src: u32, dst: u32) -> u32 {
    let a = src >> 24;
    if a == 0 {
        return dst;
    }
    if a == 255 {
        return src & 0x00FF_FFFF;
    }
    let inv = 255 - a;
    let sr = (src >> 16) & 0xFF;
    let sg = (src >> 8) & 0xFF;
    let sb = src & 0xFF;
    let dr = (dst >> 16) & 0xFF;
    let dg = (dst >> 8) & 0xFF;
    let db = dst & 0xFF;
    // +127 rounds the /255 instead of truncating.
    let r = (sr * a + dr * inv + 127) / 255;
    let g = (sg * a + dg * inv + 127) / 255;
    let b = (sb * a + db * inv + 127) / 255;
    (r << 16) | (g << 8) | b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    fn placement(x: f32, y: f32, angle: f32) -> Placement {
        Placement { anchor: Point::new(x, y), angle, interocular: 0.0 }
    }

    #[test]
    fn reconcile_resizes_once_then_no_ops() {
        let mut s = Surface::new(640, 480);
        assert!(s.reconcile(800, 600, 1.0));
        assert_eq!((s.width(), s.height()), (800, 600));
        // Same parameters again: must be a no-op.
        assert!(!s.reconcile(800, 600, 1.0));
        assert!(!s.reconcile(800, 600, 1.0));
    }

    #[test]
    fn reconcile_rounds_pixel_ratio_scaling() {
        let mut s = Surface::new(0, 0);
        assert!(s.reconcile(101, 51, 1.5));
        assert_eq!((s.width(), s.height()), (152, 77)); // round(151.5), round(76.5)
    }

    #[test]
    fn background_scales_nearest_neighbor() {
        let mut s = Surface::new(4, 4);
        let frame = FrameBuffer {
            width: 2,
            height: 2,
            pixels: vec![0x11, 0x22, 0x33, 0x44],
        };
        s.draw_background(&frame, false);
        // Each source pixel covers a 2x2 quadrant.
        assert_eq!(s.frame().pixels[0], 0x11);
        assert_eq!(s.frame().pixels[3], 0x22);
        assert_eq!(s.frame().pixels[12], 0x33);
        assert_eq!(s.frame().pixels[15], 0x44);
    }

    #[test]
    fn mirrored_background_flips_columns() {
        let mut s = Surface::new(2, 1);
        let frame = FrameBuffer { width: 2, height: 1, pixels: vec![0xAA, 0xBB] };
        s.draw_background(&frame, true);
        assert_eq!(s.frame().pixels, vec![0xBB, 0xAA]);
        s.draw_background(&frame, false);
        assert_eq!(s.frame().pixels, vec![0xAA, 0xBB]);
    }

    #[test]
    fn clear_blacks_out_previous_frame() {
        let mut s = Surface::new(2, 2);
        let frame = FrameBuffer { width: 2, height: 2, pixels: vec![0xFF; 4] };
        s.draw_background(&frame, false);
        s.clear();
        assert!(s.frame().pixels.iter().all(|&p| p == 0));
    }

    #[test]
    fn opaque_overlay_covers_anchor_pixel() {
        let mut s = Surface::new(100, 100);
        let img = OverlayImage::solid(10, 10, 0xFF12_3456);
        s.draw_overlay(&img, &placement(50.0, 50.0, 0.0), 20.0, 20.0);
        assert_eq!(s.frame().pixels[50 * 100 + 50], 0x0012_3456);
        // Outside the sprite nothing changed.
        assert_eq!(s.frame().pixels[0], 0);
    }

    #[test]
    fn transparent_pixels_leave_background_alone() {
        let mut s = Surface::new(10, 10);
        let bg = FrameBuffer { width: 10, height: 10, pixels: vec![0x0000_FF00; 100] };
        s.draw_background(&bg, false);
        let img = OverlayImage::solid(4, 4, 0x0000_0000); // alpha 0
        s.draw_overlay(&img, &placement(5.0, 5.0, 0.0), 4.0, 4.0);
        assert!(s.frame().pixels.iter().all(|&p| p == 0x0000_FF00));
    }

    #[test]
    fn rotation_turns_the_sprite_footprint() {
        // A wide, short sprite rotated a quarter turn should paint above and
        // below the anchor, not left and right of it.
        let mut s = Surface::new(200, 200);
        let img = OverlayImage::solid(100, 10, 0xFFFF_FFFF);
        let p = placement(100.0, 100.0, std::f32::consts::FRAC_PI_2);
        s.draw_overlay(&img, &p, 100.0, 10.0);
        assert_eq!(s.frame().pixels[140 * 200 + 100], 0x00FF_FFFF); // below anchor
        assert_eq!(s.frame().pixels[100 * 200 + 140], 0);           // right of anchor
    }

    #[test]
    fn semi_transparent_overlay_blends() {
        // 50% white over black lands mid-gray.
        let out = blend_over(0x80FF_FFFF, 0x0000_0000);
        let r = (out >> 16) & 0xFF;
        assert!((r as i32 - 128).abs() <= 1);
        // Blend is symmetric in the channels.
        assert_eq!(r, (out >> 8) & 0xFF);
        assert_eq!(r, out & 0xFF);
    }
}
