// Which catalog entry is active right now.
// The compositor re-reads this at the start of every frame, so a selection
// made between two frames shows up on the very next one. Writes come from
// the key handling in main; both sides live on the frame thread.

pub struct SelectionState {
    active: usize,
    catalog_len: usize,
}

impl SelectionState {
    /// Fresh state for a catalog of `catalog_len` entries (sentinel included).
    /// Starts on the sentinel: nothing drawn until the user picks a pair.
    pub fn new(catalog_len: usize) -> Self {
        Self { active: 0, catalog_len }
    }

    /// Set the active entry. Out-of-bounds ids are ignored rather than
    /// clamped, so a stray key press can't silently pick the wrong pair.
    pub fn select(&mut self, id: usize) {
        if id < self.catalog_len {
            self.active = id;
        }
    }

    /// The id the compositor should draw this frame.
    pub fn current(&self) -> usize {
        self.active
    }

    /// Re-validate after the catalog was replaced wholesale. If the active
    /// id no longer exists in the new catalog, fall back to the sentinel.
    pub fn rebind(&mut self, catalog_len: usize) {
        self.catalog_len = catalog_len;
        if self.active >= catalog_len {
            self.active = 0;
        }
    }
}
