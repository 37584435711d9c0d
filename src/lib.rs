//! BeeRef — a reference image viewer.
//!
//! Collect images on an unbounded canvas, move and arrange them, and save
//! the whole board as a single `.bee` file. The library crate holds
//! everything the GUI shell in `main.rs` wires together; the scene, the
//! viewport math and the file pipeline are usable (and tested) without a
//! window.

pub mod app;
pub mod cli;
pub mod components;
pub mod io;
pub mod item;
pub mod logger;
pub mod ops;
pub mod scene;
pub mod settings;
pub mod view;

pub use app::BeeRefApp;
pub use item::ImageItem;
pub use scene::Scene;
pub use view::Viewport;
