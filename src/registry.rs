// The asset registry: the ordered catalog of selectable glasses, their
// decoded pixels, and their load state.
//
// Entry 0 is always the synthetic "no glasses" sentinel. It has no source,
// never loads, and counts as Ready from the start; picking it means "draw
// nothing". Every real entry decodes on its own background thread so the
// frame loop never waits on disk or PNG decoding; completions are posted
// over a channel and folded in at the top of each frame via `absorb`.
//
// Load states only move forward (Unloaded -> Loading -> Ready | Failed), so
// the compositor can read them mid-frame without any locking: by the time a
// completion is absorbed, it is final.

use crate::error::Error;
use crate::types::OverlayImage;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadyState {
    Unloaded,
    Loading,
    Ready,
    Failed,
}

pub struct AssetEntry {
    pub source: Option<PathBuf>,      // None only for the sentinel
    pub state: ReadyState,
    pub image: Option<OverlayImage>,  // Some exactly when a real entry is Ready
}

impl AssetEntry {
    fn sentinel() -> Self {
        Self { source: None, state: ReadyState::Ready, image: None }
    }

    fn pending(source: PathBuf) -> Self {
        Self { source: Some(source), state: ReadyState::Unloaded, image: None }
    }
}

pub struct AssetRegistry {
    entries: Vec<AssetEntry>,
    completions: Receiver<(usize, Result<OverlayImage, Error>)>,
}

impl AssetRegistry {
    /// Build the registry for a catalog and kick off every load.
    /// Returns immediately; readiness trickles in through `absorb`.
    pub fn load(sources: Vec<PathBuf>) -> Self {
        let mut registry = Self::without_loads(sources);
        let (tx, rx) = mpsc::channel();
        registry.completions = rx;

        for (id, entry) in registry.entries.iter_mut().enumerate() {
            let Some(source) = entry.source.clone() else { continue };
            entry.state = ReadyState::Loading;
            let tx = tx.clone();
            thread::spawn(move || {
                // The frame loop may have moved on (catalog replaced); a
                // closed channel just means nobody wants this result.
                let _ = tx.send((id, decode_overlay(&source)));
            });
        }
        registry
    }

    /// Registry with the same entry layout but no loader threads; entries
    /// stay Unloaded until `apply_load` is called. Used by test harnesses
    /// that drive load completion by hand.
    pub fn without_loads(sources: Vec<PathBuf>) -> Self {
        let mut entries = Vec::with_capacity(sources.len() + 1);
        entries.push(AssetEntry::sentinel());
        entries.extend(sources.into_iter().map(AssetEntry::pending));
        // Dangling receiver: try_recv reports Disconnected, absorb is a no-op.
        let (_tx, rx) = mpsc::channel();
        Self { entries, completions: rx }
    }

    /// Fold in every load that finished since the last frame. Cheap when
    /// nothing completed; call once at the top of each frame.
    pub fn absorb(&mut self) {
        while let Ok((id, result)) = self.completions.try_recv() {
            self.apply_load(id, result);
        }
    }

    /// Apply one load outcome. Terminal states are never overwritten, so a
    /// stale completion (e.g. from before a catalog retry) cannot regress
    /// an entry.
    pub fn apply_load(&mut self, id: usize, result: Result<OverlayImage, Error>) {
        let Some(entry) = self.entries.get_mut(id) else { return };
        if matches!(entry.state, ReadyState::Ready | ReadyState::Failed) {
            return;
        }
        match result {
            Ok(image) => {
                entry.image = Some(image);
                entry.state = ReadyState::Ready;
            }
            Err(e) => {
                eprintln!("{e}");
                entry.state = ReadyState::Failed;
            }
        }
    }

    /// Number of catalog entries, sentinel included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        // Never true: the sentinel is always present.
        self.entries.is_empty()
    }

    pub fn entry(&self, id: usize) -> Option<&AssetEntry> {
        self.entries.get(id)
    }

    /// The drawable image for `id`, or None when there is nothing to draw
    /// this frame: the sentinel, an unknown id, or an entry that is not
    /// (yet, or ever) Ready.
    pub fn ready_image(&self, id: usize) -> Option<&OverlayImage> {
        let entry = self.entries.get(id)?;
        match entry.state {
            ReadyState::Ready => entry.image.as_ref(),
            _ => None,
        }
    }
}

/// Decode one glasses PNG into the overlay pixel format (0xAARRGGBB).
fn decode_overlay(path: &Path) -> Result<OverlayImage, Error> {
    let img = image::open(path)
        .map_err(|e| Error::AssetLoad(format!("open {}: {e}", path.display())))?;
    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    if w == 0 || h == 0 {
        return Err(Error::AssetLoad(format!("{}: empty image", path.display())));
    }

    let mut pixels = Vec::with_capacity((w as usize) * (h as usize));
    for px in rgba.pixels() {
        let [r, g, b, a] = px.0;
        pixels.push(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32));
    }
    Ok(OverlayImage { width: w as usize, height: h as usize, pixels })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("g{i}.png"))).collect()
    }

    #[test]
    fn sentinel_is_ready_and_imageless() {
        let reg = AssetRegistry::without_loads(sources(2));
        assert_eq!(reg.len(), 3);
        let sentinel = reg.entry(0).unwrap();
        assert_eq!(sentinel.state, ReadyState::Ready);
        assert!(sentinel.source.is_none());
        assert!(reg.ready_image(0).is_none());
    }

    #[test]
    fn empty_catalog_is_sentinel_only() {
        let reg = AssetRegistry::without_loads(Vec::new());
        assert_eq!(reg.len(), 1);
        assert!(reg.ready_image(0).is_none());
    }

    #[test]
    fn pending_entries_are_not_drawable() {
        let reg = AssetRegistry::without_loads(sources(1));
        assert_eq!(reg.entry(1).unwrap().state, ReadyState::Unloaded);
        assert!(reg.ready_image(1).is_none());
    }

    #[test]
    fn successful_load_records_image_and_dimensions() {
        let mut reg = AssetRegistry::without_loads(sources(1));
        reg.apply_load(1, Ok(OverlayImage::solid(200, 100, 0xFF00_0000)));
        let entry = reg.entry(1).unwrap();
        assert_eq!(entry.state, ReadyState::Ready);
        let img = reg.ready_image(1).unwrap();
        assert_eq!((img.width, img.height), (200, 100));
    }

    #[test]
    fn failed_load_degrades_only_that_entry() {
        let mut reg = AssetRegistry::without_loads(sources(2));
        reg.apply_load(1, Err(Error::AssetLoad("boom".into())));
        reg.apply_load(2, Ok(OverlayImage::solid(10, 10, 0xFFFF_FFFF)));
        assert_eq!(reg.entry(1).unwrap().state, ReadyState::Failed);
        assert!(reg.ready_image(1).is_none());
        assert!(reg.ready_image(2).is_some());
    }

    #[test]
    fn terminal_states_never_regress() {
        let mut reg = AssetRegistry::without_loads(sources(1));
        reg.apply_load(1, Err(Error::AssetLoad("first".into())));
        reg.apply_load(1, Ok(OverlayImage::solid(4, 4, 0xFFFF_FFFF)));
        assert_eq!(reg.entry(1).unwrap().state, ReadyState::Failed);
    }

    #[test]
    fn unknown_completion_id_is_ignored() {
        let mut reg = AssetRegistry::without_loads(sources(1));
        reg.apply_load(9, Ok(OverlayImage::solid(4, 4, 0xFFFF_FFFF)));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn load_of_missing_files_eventually_fails_entries() {
        let mut reg = AssetRegistry::load(vec![PathBuf::from("/nonexistent/a.png")]);
        // The loader thread fails fast on a missing file; poll briefly.
        for _ in 0..100 {
            reg.absorb();
            if reg.entry(1).unwrap().state == ReadyState::Failed {
                return;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        panic!("load of a missing file never reported failure");
    }
}
