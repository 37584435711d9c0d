//! System clipboard helpers (OS-level copy/paste via arboard).

use image::RgbaImage;

use crate::{log_debug, log_warn};

/// Try to read an image from the system clipboard. Returns `None` if
/// nothing usable is available. Two cases are handled:
///   1. Raw image data (e.g. a screenshot, or copied from an editor).
///   2. Text on the clipboard that happens to be a valid image file path.
pub fn image_from_clipboard() -> Option<RgbaImage> {
    // 1. Raw image data via arboard.
    if let Ok(mut clip) = arboard::Clipboard::new() {
        if let Ok(img_data) = clip.get_image() {
            if let Some(img) = RgbaImage::from_raw(
                img_data.width as u32,
                img_data.height as u32,
                img_data.bytes.into_owned(),
            ) {
                return Some(img);
            }
            log_warn!("Clipboard image data had unexpected dimensions");
        }
    }

    // 2. Plain-text clipboard content as a file path.
    if let Ok(mut clip) = arboard::Clipboard::new() {
        if let Ok(text) = clip.get_text() {
            let path = std::path::Path::new(text.trim());
            if path.is_file() {
                if let Ok(dyn_img) = image::open(path) {
                    return Some(dyn_img.to_rgba8());
                }
            }
        }
    }

    log_debug!("No image data in clipboard");
    None
}

/// Write an RGBA image to the system clipboard.
pub fn image_to_clipboard(img: &RgbaImage) {
    // arboard wants ImageData { width, height, bytes: Cow<[u8]> } in RGBA order.
    if let Ok(mut clip) = arboard::Clipboard::new() {
        let data = arboard::ImageData {
            width: img.width() as usize,
            height: img.height() as usize,
            bytes: std::borrow::Cow::Borrowed(img.as_raw()),
        };
        if let Err(e) = clip.set_image(data) {
            log_warn!("Could not write image to clipboard: {}", e);
        }
    }
}

/// Write plain text to the system clipboard (Debug Log dialog).
pub fn text_to_clipboard(text: &str) {
    if let Ok(mut clip) = arboard::Clipboard::new() {
        if let Err(e) = clip.set_text(text.to_string()) {
            log_warn!("Could not write text to clipboard: {}", e);
        }
    }
}
