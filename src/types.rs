// Core pixel and geometry types shared by the whole pipeline.

#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// All-black buffer of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }
}

/// A 2-D point. The detector emits these normalized to [0,1] per frame axis;
/// the alignment step works on them after scaling into surface pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A decoded glasses image, kept in RAM for the whole catalog lifetime.
/// Pixels are 0xAARRGGBB with straight (non-premultiplied) alpha, so the
/// transparent parts of the PNG stay see-through when blitted over the video.
#[derive(Clone)]
pub struct OverlayImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,  // length = width * height
}

impl OverlayImage {
    /// Solid single-color image; handy for tests and debug fills.
    pub fn solid(width: usize, height: usize, argb: u32) -> Self {
        Self { width, height, pixels: vec![argb; width * height] }
    }
}
