//! Batch image import.
//!
//! Decoding happens incrementally — a bounded number of files per UI frame
//! — so the progress window stays live and its Cancel button is honored
//! between files. The app shell drives [`ImageImport::advance`] each frame
//! and collects the outcome when it reports done: the decoded items become
//! one undoable insert, the failures one aggregated warning.

use std::path::PathBuf;

use egui::{Pos2, vec2};

use crate::item::ImageItem;
use crate::{io, log_info, log_warn};

/// Diagonal step between consecutively imported items (scene units).
pub const INSERT_OFFSET: f32 = 50.0;
/// How many files to decode per call to [`ImageImport::advance`].
pub const DECODES_PER_FRAME: usize = 4;

/// An in-progress batch import.
pub struct ImageImport {
    paths: Vec<PathBuf>,
    next: usize,
    anchor: Pos2,
    items: Vec<ImageItem>,
    errors: Vec<PathBuf>,
    cancelled: bool,
}

/// What a finished import produced.
pub struct ImportOutcome {
    pub items: Vec<ImageItem>,
    pub errors: Vec<PathBuf>,
    pub total: usize,
}

impl ImageImport {
    /// Start an import of `paths`, placing the first item centered on
    /// `anchor` and stepping diagonally for each following one.
    pub fn new(paths: Vec<PathBuf>, anchor: Pos2) -> Self {
        Self {
            paths,
            next: 0,
            anchor,
            items: Vec::new(),
            errors: Vec::new(),
            cancelled: false,
        }
    }

    /// Decode up to `budget` files. Returns `true` once the import is
    /// finished (all files processed, or cancelled).
    pub fn advance(&mut self, budget: usize) -> bool {
        for _ in 0..budget {
            if self.cancelled || self.next >= self.paths.len() {
                break;
            }
            let path = self.paths[self.next].clone();
            self.next += 1;

            log_info!("Loading image from file {}", path.display());
            match io::load_image(&path) {
                Ok(image) => {
                    let mut item = ImageItem::new(image, Some(path));
                    item.set_pos_center(self.anchor);
                    self.items.push(item);
                    self.anchor += vec2(INSERT_OFFSET, INSERT_OFFSET);
                }
                Err(e) => {
                    log_warn!("Could not load image {}: {}", path.display(), e);
                    self.errors.push(path);
                }
            }
        }
        self.is_done()
    }

    /// Request cancellation; already-decoded items are kept, remaining
    /// files are skipped.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_done(&self) -> bool {
        self.cancelled || self.next >= self.paths.len()
    }

    /// `(processed, total)` for the progress display.
    pub fn progress(&self) -> (usize, usize) {
        (self.next, self.paths.len())
    }

    pub fn finish(self) -> ImportOutcome {
        ImportOutcome {
            items: self.items,
            errors: self.errors,
            total: self.paths.len(),
        }
    }
}

/// The aggregated warning body for a batch with failures: one line per
/// failed path, preceded by a count.
pub fn format_load_errors(errors: &[PathBuf], total: usize) -> String {
    let mut msg = format!(
        "{} image(s) out of {} could not be opened:",
        errors.len(),
        total
    );
    for path in errors {
        msg.push_str(&format!("\n  {}", path.display()));
    }
    msg
}
