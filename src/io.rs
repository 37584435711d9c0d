//! File I/O — the `.bee` scene container, image loading and the native
//! file dialogs.
//!
//! A `.bee` file is a bincode-serialized [`BeeFileV1`]: a magic/version
//! string followed by one record per item, with the pixels embedded as a
//! PNG blob. Loading validates the magic, an item-count bound and every
//! blob before any item reaches the scene.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use egui::pos2;
use image::RgbaImage;
use rfd::FileDialog;
use serde::{Deserialize, Serialize};

use crate::item::ImageItem;
use crate::scene::Scene;
use crate::{log_debug, log_info};

/// Magic header for the .bee container (version 1).
const BEE_MAGIC_V1: &str = "BEE1";

/// Maximum number of items in a .bee file.
/// Prevents memory exhaustion from crafted files.
const MAX_BEE_ITEMS: usize = 10_000;
/// Maximum item image dimension in pixels (per axis).
const MAX_ITEM_DIM: u32 = 32_768;

/// Raster formats offered in the insert-images dialog and accepted for
/// drag-and-drop.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "bmp", "tga", "ico", "tiff", "tif",
];

pub fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}

// ===========================================================================
// BEE SCENE FILE FORMAT
// ===========================================================================

/// Serializable scene container (v1).
#[derive(Serialize, Deserialize)]
pub(crate) struct BeeFileV1 {
    magic: String,
    items: Vec<BeeItemData>,
}

/// One placed image: PNG-encoded pixels plus geometry.
#[derive(Serialize, Deserialize)]
struct BeeItemData {
    image_png: Vec<u8>,
    filename: Option<String>,
    x: f32,
    y: f32,
    z: f32,
    scale: f32,
    rotation: f32,
    flip: i8,
}

/// Error type for .bee file operations.
#[derive(Debug)]
pub enum BeeError {
    Io(std::io::Error),
    Serialize(String),
    InvalidFormat(String),
}

impl std::fmt::Display for BeeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BeeError::Io(e) => write!(f, "I/O error: {}", e),
            BeeError::Serialize(e) => write!(f, "Serialization error: {}", e),
            BeeError::InvalidFormat(e) => write!(f, "Invalid format: {}", e),
        }
    }
}

impl From<std::io::Error> for BeeError {
    fn from(e: std::io::Error) -> Self {
        BeeError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for BeeError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        BeeError::Serialize(e.to_string())
    }
}

/// Serialize the scene to `path` (v1 container).
pub fn save_bee(scene: &Scene, path: &Path) -> Result<(), BeeError> {
    log_info!("Saving {} item(s) to {}", scene.len(), path.display());
    let mut items = Vec::with_capacity(scene.len());
    for item in scene.items() {
        items.push(BeeItemData {
            image_png: item.to_png_bytes().map_err(BeeError::Serialize)?,
            filename: item
                .filename
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
            x: item.pos.x,
            y: item.pos.y,
            z: item.z,
            scale: item.scale(),
            rotation: item.rotation,
            flip: item.flip(),
        });
    }
    let bee = BeeFileV1 {
        magic: BEE_MAGIC_V1.to_string(),
        items,
    };
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    bincode::serialize_into(writer, &bee)?;
    Ok(())
}

/// Load a .bee file into a fresh item list (items arrive unselected).
pub fn load_bee(path: &Path) -> Result<Vec<ImageItem>, BeeError> {
    let raw = std::fs::read(path)?;
    if raw.len() < 12 {
        return Err(BeeError::InvalidFormat("File too small".into()));
    }

    // bincode encodes a String as: 8-byte length prefix + UTF-8 data.
    // The magic is 4 chars, so bytes 8..12 hold it.
    let magic = std::str::from_utf8(&raw[8..12]).unwrap_or("");
    match magic {
        "BEE1" => load_bee_v1(&raw),
        _ => Err(BeeError::InvalidFormat(format!("Unknown magic '{}'", magic))),
    }
}

fn load_bee_v1(raw: &[u8]) -> Result<Vec<ImageItem>, BeeError> {
    let bee: BeeFileV1 = bincode::deserialize(raw)?;

    if bee.items.len() > MAX_BEE_ITEMS {
        return Err(BeeError::InvalidFormat(format!(
            "File contains {} items, which exceeds the maximum of {}",
            bee.items.len(),
            MAX_BEE_ITEMS
        )));
    }

    let mut items = Vec::with_capacity(bee.items.len());
    for (i, data) in bee.items.into_iter().enumerate() {
        let image = ImageItem::image_from_png(&data.image_png)
            .map_err(|e| BeeError::InvalidFormat(format!("Item {}: bad image data: {}", i, e)))?;
        if image.width() > MAX_ITEM_DIM || image.height() > MAX_ITEM_DIM {
            return Err(BeeError::InvalidFormat(format!(
                "Item {}: image size {}x{} exceeds maximum allowed {}x{}",
                i,
                image.width(),
                image.height(),
                MAX_ITEM_DIM,
                MAX_ITEM_DIM
            )));
        }
        items.push(ImageItem::from_saved(
            image,
            data.filename.map(PathBuf::from),
            pos2(data.x, data.y),
            data.z,
            data.scale,
            data.rotation,
            data.flip,
        ));
    }
    log_debug!("Loaded {} item(s)", items.len());
    Ok(items)
}

/// Append a `.bee` suffix unless the path already carries one.
pub fn ensure_bee_extension(path: PathBuf) -> PathBuf {
    let has_bee = path
        .extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("bee"));
    if has_bee {
        return path;
    }
    match path.file_name() {
        Some(name) => {
            let mut name = name.to_os_string();
            name.push(".bee");
            path.with_file_name(name)
        }
        None => path,
    }
}

// ===========================================================================
// Image loading
// ===========================================================================

/// Decode a raster image file to RGBA.
pub fn load_image(path: &Path) -> Result<RgbaImage, String> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|e| e.to_string())
}

// ===========================================================================
// Native file dialogs
// ===========================================================================

pub fn open_file_dialog() -> Option<PathBuf> {
    FileDialog::new()
        .set_title("Open file")
        .add_filter("BeeRef File", &["bee"])
        .pick_file()
}

pub fn save_file_dialog(current: Option<&Path>) -> Option<PathBuf> {
    let mut dialog = FileDialog::new()
        .set_title("Save file")
        .add_filter("BeeRef File", &["bee"]);
    if let Some(current) = current {
        if let Some(dir) = current.parent() {
            dialog = dialog.set_directory(dir);
        }
        if let Some(name) = current.file_name() {
            dialog = dialog.set_file_name(&*name.to_string_lossy());
        }
    }
    dialog.save_file()
}

pub fn insert_images_dialog() -> Option<Vec<PathBuf>> {
    FileDialog::new()
        .set_title("Select one or more images to open")
        .add_filter("Images", IMAGE_EXTENSIONS)
        .pick_files()
}
