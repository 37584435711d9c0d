//! Small modal dialogs: the warning message box and the debug-log viewer.

use egui::{Align2, vec2};

use crate::logger;
use crate::ops::clipboard;

/// Text shown centered over the canvas while the scene is empty.
pub const WELCOME_TEXT: &str = "Paste or drop images here.\nRight-click for more options.";

/// A dismissible warning box: one title, one message, one OK button.
/// At most one is shown at a time; a new warning replaces the old.
#[derive(Default)]
pub struct MessageDialog {
    open: bool,
    title: String,
    text: String,
}

impl MessageDialog {
    /// Queue a warning for display (also mirrored to the session log).
    pub fn warn(&mut self, title: impl Into<String>, text: impl Into<String>) {
        self.title = title.into();
        self.text = text.into();
        crate::log_warn!("{}: {}", self.title, self.text);
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        if !self.open {
            return;
        }
        let mut open = self.open;
        egui::Window::new(self.title.clone())
            .id(egui::Id::new("message_dialog"))
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(&self.text);
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui.button("OK").clicked() {
                        open = false;
                    }
                });
            });
        self.open = open;
    }
}

/// Shows the current session log (Help menu).
#[derive(Default)]
pub struct DebugLogDialog {
    open: bool,
    text: String,
}

impl DebugLogDialog {
    /// (Re-)read the log file and open the dialog.
    pub fn open(&mut self) {
        self.text = match logger::log_path() {
            Some(path) => std::fs::read_to_string(path)
                .unwrap_or_else(|e| format!("Could not read log file: {}", e)),
            None => "Logging is not initialised.".to_string(),
        };
        self.open = true;
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        if !self.open {
            return;
        }
        let mut open = self.open;
        egui::Window::new("BeeRef Debug Log")
            .open(&mut open)
            .default_size(vec2(560.0, 400.0))
            .show(ctx, |ui| {
                if let Some(path) = logger::log_path() {
                    ui.label(path.display().to_string());
                }
                egui::ScrollArea::vertical()
                    .max_height(320.0)
                    .show(ui, |ui| {
                        ui.monospace(&self.text);
                    });
                ui.separator();
                if ui.button("Copy To Clipboard").clicked() {
                    clipboard::text_to_clipboard(&self.text);
                }
            });
        self.open = open;
    }
}
