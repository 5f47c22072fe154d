// What you SEE now:
// • Live camera is always the base image (mirrored like a selfie by default).
// • Number keys 1..9 pick a pair of glasses; they track your eyes as you move.
// • 0 takes them off. M toggles mirroring. R refetches the catalog. ESC quits.
// • HUD shows the current pair, mirror state and FPS.
//
// Face landmarks come from an external detector behind the LandmarkDetector
// trait; until a backend is wired in, the stub never finds a face and the
// app is just a mirror.

use glasses_tryon::camera::CameraCapture;
use glasses_tryon::catalog;
use glasses_tryon::compositor::{self, CompositeParams, FrameOutcome};
use glasses_tryon::detector::{LandmarkDetector, LandmarkFrame, NoopDetector};
use glasses_tryon::draw::{draw_text_5x7, Drawer};
use glasses_tryon::error::Error;
use glasses_tryon::registry::{AssetRegistry, ReadyState};
use glasses_tryon::selection::SelectionState;
use glasses_tryon::surface::Surface;
use std::path::Path;
use std::time::{Duration, Instant};

/// Where the glasses images and the catalog document live.
const ASSETS_DIR: &str = "assets";
const CATALOG_FILE: &str = "glasses.json";

fn main() -> Result<(), Error> {
    /* --- Catalog + asset preloading ---
       Starts every image load in the background; the loop below never waits
       on them. A missing catalog just means "no glasses to offer". */
    let catalog_path = Path::new(ASSETS_DIR).join(CATALOG_FILE);
    let mut registry = AssetRegistry::load(catalog::read_catalog_or_empty(&catalog_path));
    let mut selection = SelectionState::new(registry.len());

    /* --- Camera + window + surface setup --- */
    let mut cam = CameraCapture::new(0, 640, 480)?;
    let (w, h) = cam.resolution();
    let mut drawer = Drawer::new("Glasses Try-On", w as usize, h as usize)?;
    let mut surface = Surface::new(w as usize, h as usize);

    let mut detector = NoopDetector;
    let mut mirrored = true; // selfie view by default

    /* --- HUD / FPS --- */
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut hud_fps_text = String::from("FPS: 0.0");

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Inputs */
        if drawer.m_pressed_once() {
            mirrored = !mirrored;
        }
        if let Some(id) = drawer.digit_pressed_once() {
            selection.select(id); // out-of-catalog keys are ignored
        }
        if drawer.r_pressed_once() {
            // The only retry path: replace the registry wholesale and restart
            // every load. The selection is re-validated against the new list.
            registry = AssetRegistry::load(catalog::read_catalog_or_empty(&catalog_path));
            selection.rebind(registry.len());
        }

        /* 2) Fold in any asset loads that finished since last frame. */
        registry.absorb();

        /* 3) Grab a fresh live frame. A bad frame skips this pass but never
           stops the loop; the camera usually recovers on the next one. */
        let frame = match cam.next_frame() {
            Ok(f) => Some(f),
            Err(e) => {
                eprintln!("{e}");
                None
            }
        };

        /* 4) Landmarks for this frame from the external detector. */
        let landmarks = match &frame {
            Some(f) => detector.detect(f),
            None => LandmarkFrame::default(),
        };

        /* 5) Composite: size the surface to the window, paint video, and if
           a face is tracked and the chosen glasses are ready, paint them. */
        let (display_w, display_h) = drawer.display_size();
        let params = CompositeParams { display_w, display_h, pixel_ratio: 1.0, mirrored };
        let outcome = compositor::composite(
            &mut surface,
            &params,
            frame.as_ref(),
            &landmarks,
            &registry,
            &selection,
        );
        if outcome == FrameOutcome::Skipped {
            if surface.width() == 0 || surface.height() == 0 {
                // Minimized window; nothing to paint or present.
                std::thread::sleep(Duration::from_millis(16));
                continue;
            }
            // Camera outage: a skipped composite leaves the surface exactly
            // as the last frame painted it, HUD included, so show that
            // rather than stamping a second HUD on top of it.
            drawer.present(surface.frame())?;
            continue;
        }

        /* 6) HUD on top */
        let sel_text = selection_label(&registry, selection.current());
        let mirror_text = if mirrored { "MIRROR ON" } else { "MIRROR OFF" };
        let hud = format!("{sel_text} | {mirror_text} | {hud_fps_text}");
        draw_text_5x7(surface.frame_mut(), 8, 8, &hud, 0x00FF_FFFF);

        /* 7) Present to the window. */
        drawer.present(surface.frame())?;

        /* 8) FPS counter (terminal + HUD once per second) */
        frames_this_second += 1;
        let now = Instant::now();
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            let fps = frames_this_second as f32 / secs;
            println!("FPS: {:.1}", fps);
            hud_fps_text = format!("FPS: {:.1}", fps);
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    Ok(())
}

/// HUD label for the active catalog entry.
fn selection_label(registry: &AssetRegistry, id: usize) -> String {
    if id == 0 {
        return String::from("NONE");
    }
    match registry.entry(id).map(|e| e.state) {
        Some(ReadyState::Ready) => format!("GLASSES {id}"),
        Some(ReadyState::Failed) => format!("GLASSES {id} FAILED"),
        Some(ReadyState::Loading) | Some(ReadyState::Unloaded) => format!("GLASSES {id} LOADING"),
        None => String::from("NONE"),
    }
}
