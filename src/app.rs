//! Application shell — menu bar, keyboard shortcuts, canvas painting and
//! the glue between the viewport, the scene and the file pipeline.

use std::path::PathBuf;
use std::time::Duration;

use egui::{
    Align2, Color32, CursorIcon, Key, KeyboardShortcut, Modifiers, PointerButton, Pos2, Rect,
    Sense, Stroke,
};

use crate::components::dialogs::{DebugLogDialog, MessageDialog, WELCOME_TEXT};
use crate::components::history::{History, SceneCommand};
use crate::io;
use crate::item::ImageItem;
use crate::ops::clipboard;
use crate::ops::insert::{DECODES_PER_FRAME, ImageImport, format_load_errors};
use crate::scene::Scene;
use crate::settings::AppSettings;
use crate::view::{PanOutcome, Panner, PointerEvent, Viewport};
use crate::{log_debug, log_info};

/// Canvas background.
const BACKGROUND: Color32 = Color32::from_rgb(60, 60, 60);
/// Selection outline color.
const SELECTION_STROKE: Color32 = Color32::from_rgb(116, 175, 229);
/// Idle repaint interval — keeps the event loop live for housekeeping even
/// when no input arrives.
const TICK_INTERVAL: Duration = Duration::from_millis(500);

const CTRL: Modifiers = Modifiers::COMMAND;
const CTRL_SHIFT: Modifiers = Modifiers {
    alt: false,
    ctrl: false,
    shift: true,
    mac_cmd: false,
    command: true,
};

const SHORTCUT_OPEN: KeyboardShortcut = KeyboardShortcut::new(CTRL, Key::O);
const SHORTCUT_SAVE: KeyboardShortcut = KeyboardShortcut::new(CTRL, Key::S);
const SHORTCUT_SAVE_AS: KeyboardShortcut = KeyboardShortcut::new(CTRL_SHIFT, Key::S);
const SHORTCUT_INSERT: KeyboardShortcut = KeyboardShortcut::new(CTRL, Key::I);
const SHORTCUT_QUIT: KeyboardShortcut = KeyboardShortcut::new(CTRL, Key::Q);
const SHORTCUT_UNDO: KeyboardShortcut = KeyboardShortcut::new(CTRL, Key::Z);
const SHORTCUT_REDO: KeyboardShortcut = KeyboardShortcut::new(CTRL_SHIFT, Key::Z);
const SHORTCUT_COPY: KeyboardShortcut = KeyboardShortcut::new(CTRL, Key::C);
const SHORTCUT_PASTE: KeyboardShortcut = KeyboardShortcut::new(CTRL, Key::V);
const SHORTCUT_SELECT_ALL: KeyboardShortcut = KeyboardShortcut::new(CTRL, Key::A);
const SHORTCUT_DESELECT: KeyboardShortcut = KeyboardShortcut::new(CTRL_SHIFT, Key::A);
const SHORTCUT_ZOOM_IN: KeyboardShortcut = KeyboardShortcut::new(CTRL, Key::PlusEquals);
const SHORTCUT_ZOOM_OUT: KeyboardShortcut = KeyboardShortcut::new(CTRL, Key::Minus);
const SHORTCUT_RESET_ZOOM: KeyboardShortcut = KeyboardShortcut::new(CTRL, Key::Num0);
const SHORTCUT_FIT_SCENE: KeyboardShortcut = KeyboardShortcut::new(CTRL, Key::Num1);
const SHORTCUT_FIT_SELECTION: KeyboardShortcut = KeyboardShortcut::new(CTRL, Key::Num2);

pub struct BeeRefApp {
    scene: Scene,
    viewport: Viewport,
    history: History,
    panner: Panner,
    /// Path of the last successful open/save; `None` for an unsaved board.
    filename: Option<PathBuf>,
    settings: AppSettings,

    message: MessageDialog,
    log_dialog: DebugLogDialog,

    /// Batch import in progress, stepped a few decodes per frame.
    import: Option<ImageImport>,

    /// True while a primary-button drag is moving the selection.
    dragging_items: bool,
    /// Canvas area in screen coordinates, recorded each frame.
    canvas_rect: Option<Rect>,

    /// File given on the command line, opened on the first frame.
    pending_open: Option<PathBuf>,
    last_title: String,
}

impl BeeRefApp {
    pub fn new(cc: &eframe::CreationContext<'_>, filename: Option<PathBuf>) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        Self {
            scene: Scene::new(),
            viewport: Viewport::new(egui::vec2(1280.0, 720.0)),
            history: History::new(),
            panner: Panner::default(),
            filename: None,
            settings: AppSettings::load(),
            message: MessageDialog::default(),
            log_dialog: DebugLogDialog::default(),
            import: None,
            dragging_items: false,
            canvas_rect: None,
            pending_open: filename,
            last_title: String::new(),
        }
    }

    // --- File pipeline -----------------------------------------------------

    /// Empty the board: scene, undo history, filename and view transform.
    fn clear_scene(&mut self) {
        self.scene.clear();
        self.history.clear();
        self.filename = None;
        self.viewport.reset(self.scene.items_bounding_rect());
    }

    fn open_from_file(&mut self, path: PathBuf) {
        log_info!("Opening file {}", path.display());
        self.clear_scene();
        match io::load_bee(&path) {
            Ok(items) => {
                for item in items {
                    self.scene.add_item(item);
                }
                self.settings.remember_file(&path);
                self.settings.save();
                self.filename = Some(path);
            }
            Err(e) => {
                log_debug!("Load failed: {}", e);
                self.message.warn(
                    "Problem loading file",
                    format!(
                        "Problem loading file {}\nNot accessible or not a proper bee file",
                        path.display()
                    ),
                );
            }
        }
    }

    fn on_action_open(&mut self) {
        if let Some(path) = io::open_file_dialog() {
            self.open_from_file(path);
        }
    }

    fn do_save(&mut self, path: PathBuf) {
        match io::save_bee(&self.scene, &path) {
            Ok(()) => {
                self.settings.remember_file(&path);
                self.settings.save();
                self.filename = Some(path);
            }
            Err(e) => {
                log_debug!("Save failed: {}", e);
                // The previously-recorded filename stays untouched.
                self.message.warn(
                    "Problem saving file",
                    format!(
                        "Problem saving file {}\nFile/directory not accessible",
                        path.display()
                    ),
                );
            }
        }
    }

    fn on_action_save(&mut self) {
        match self.filename.clone() {
            Some(path) => self.do_save(path),
            None => self.on_action_save_as(),
        }
    }

    fn on_action_save_as(&mut self) {
        if let Some(path) = io::save_file_dialog(self.filename.as_deref()) {
            self.do_save(io::ensure_bee_extension(path));
        }
    }

    // --- Insert / clipboard ------------------------------------------------

    fn on_action_insert_images(&mut self) {
        if self.import.is_some() {
            return;
        }
        if let Some(paths) = io::insert_images_dialog()
            && !paths.is_empty()
        {
            self.start_import(paths, self.viewport.view_center_scene());
        }
    }

    fn start_import(&mut self, paths: Vec<PathBuf>, anchor: Pos2) {
        log_info!("Importing {} image file(s)...", paths.len());
        self.import = Some(ImageImport::new(paths, anchor));
    }

    fn on_action_paste(&mut self, ctx: &egui::Context) {
        log_info!("Pasting from clipboard...");
        let Some(image) = clipboard::image_from_clipboard() else {
            log_info!("No image data in clipboard");
            return;
        };
        let anchor = ctx
            .pointer_hover_pos()
            .filter(|pos| self.canvas_rect.is_some_and(|rect| rect.contains(*pos)))
            .map(|pos| self.to_scene(pos))
            .unwrap_or_else(|| self.viewport.view_center_scene());
        let mut item = ImageItem::new(image, None);
        item.set_pos_center(anchor);
        self.history
            .push(SceneCommand::insert(vec![item]), &mut self.scene);
    }

    /// Copy the topmost selected item's pixels to the system clipboard.
    fn on_action_copy(&mut self) {
        let topmost = self
            .scene
            .items()
            .iter()
            .filter(|item| item.selected)
            .max_by(|a, b| a.z.partial_cmp(&b.z).unwrap_or(std::cmp::Ordering::Equal));
        if let Some(item) = topmost {
            log_info!("Copying item to clipboard");
            clipboard::image_to_clipboard(item.image());
        }
    }

    // --- Edit actions ------------------------------------------------------

    fn on_action_delete(&mut self) {
        let ids = self.scene.selected_ids();
        if ids.is_empty() {
            return;
        }
        log_debug!("Deleting {} item(s)...", ids.len());
        self.history
            .push(SceneCommand::delete(ids), &mut self.scene);
    }

    fn on_action_undo(&mut self) {
        if let Some(label) = self.history.undo(&mut self.scene) {
            log_debug!("Undo: {}", label);
        }
    }

    fn on_action_redo(&mut self) {
        if let Some(label) = self.history.redo(&mut self.scene) {
            log_debug!("Redo: {}", label);
        }
    }

    fn push_normalize(&mut self, command: Option<SceneCommand>) {
        if let Some(command) = command {
            self.history.push(command, &mut self.scene);
        }
    }

    // --- View actions ------------------------------------------------------

    fn on_action_fit_scene(&mut self) {
        let items = self.scene.items_bounding_rect();
        self.viewport.fit_rect(items, None, items);
    }

    fn on_action_fit_selection(&mut self) {
        if let Some(rect) = self.scene.selection_bounding_rect() {
            // A single selected item supports toggling back.
            let selected = self.scene.selected_ids();
            let toggle = if selected.len() == 1 {
                selected.first().copied()
            } else {
                None
            };
            self.viewport
                .fit_rect(rect, toggle, self.scene.items_bounding_rect());
        }
    }

    // --- Coordinate helpers ------------------------------------------------

    /// Screen position → scene position, via the canvas origin.
    fn to_scene(&self, screen: Pos2) -> Pos2 {
        let origin = self.canvas_rect.map(|r| r.min).unwrap_or(Pos2::ZERO);
        self.viewport.map_to_scene(screen - origin.to_vec2())
    }

    // --- Frame update ------------------------------------------------------

    fn sync_window_title(&mut self, ctx: &egui::Context) {
        let title = match &self.filename {
            Some(path) => match path.file_name() {
                Some(name) => format!("{} - BeeRef", name.to_string_lossy()),
                None => "BeeRef".to_string(),
            },
            None => "BeeRef".to_string(),
        };
        if title != self.last_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.last_title = title;
        }
    }

    fn step_import(&mut self, ctx: &egui::Context) {
        let mut finished = false;
        if let Some(import) = &mut self.import {
            finished = import.advance(DECODES_PER_FRAME);
            let (processed, total) = import.progress();

            let mut cancel = false;
            egui::Window::new("Loading images...")
                .collapsible(false)
                .resizable(false)
                .anchor(Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.add(
                        egui::ProgressBar::new(processed as f32 / total.max(1) as f32)
                            .text(format!("{} / {}", processed, total)),
                    );
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                });
            if cancel {
                import.cancel();
                finished = true;
            }
            ctx.request_repaint();
        }

        if finished
            && let Some(import) = self.import.take()
        {
            let outcome = import.finish();
            if !outcome.items.is_empty() {
                self.history
                    .push(SceneCommand::insert(outcome.items), &mut self.scene);
            }
            if !outcome.errors.is_empty() {
                self.message.warn(
                    "Problem loading images",
                    format_load_errors(&outcome.errors, outcome.total),
                );
            }
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.input_mut(|i| i.consume_shortcut(&SHORTCUT_REDO)) {
            self.on_action_redo();
        }
        if ctx.input_mut(|i| i.consume_shortcut(&SHORTCUT_UNDO)) {
            self.on_action_undo();
        }
        if ctx.input_mut(|i| i.consume_shortcut(&SHORTCUT_OPEN)) {
            self.on_action_open();
        }
        if ctx.input_mut(|i| i.consume_shortcut(&SHORTCUT_SAVE_AS)) {
            self.on_action_save_as();
        }
        if ctx.input_mut(|i| i.consume_shortcut(&SHORTCUT_SAVE)) {
            self.on_action_save();
        }
        if ctx.input_mut(|i| i.consume_shortcut(&SHORTCUT_INSERT)) {
            self.on_action_insert_images();
        }
        if ctx.input_mut(|i| i.consume_shortcut(&SHORTCUT_PASTE)) {
            self.on_action_paste(ctx);
        }
        if ctx.input_mut(|i| i.consume_shortcut(&SHORTCUT_COPY)) {
            self.on_action_copy();
        }
        if ctx.input_mut(|i| i.consume_shortcut(&SHORTCUT_DESELECT)) {
            self.scene.clear_selection();
        }
        if ctx.input_mut(|i| i.consume_shortcut(&SHORTCUT_SELECT_ALL)) {
            self.scene.select_all();
        }
        if ctx.input_mut(|i| i.consume_shortcut(&SHORTCUT_ZOOM_IN)) {
            self.viewport.zoom_in(self.scene.items_bounding_rect());
        }
        if ctx.input_mut(|i| i.consume_shortcut(&SHORTCUT_ZOOM_OUT)) {
            self.viewport.zoom_out(self.scene.items_bounding_rect());
        }
        if ctx.input_mut(|i| i.consume_shortcut(&SHORTCUT_RESET_ZOOM)) {
            self.viewport.reset(self.scene.items_bounding_rect());
        }
        if ctx.input_mut(|i| i.consume_shortcut(&SHORTCUT_FIT_SCENE)) {
            self.on_action_fit_scene();
        }
        if ctx.input_mut(|i| i.consume_shortcut(&SHORTCUT_FIT_SELECTION)) {
            self.on_action_fit_selection();
        }
        if ctx.input(|i| i.key_pressed(Key::Delete)) {
            self.on_action_delete();
        }
        if ctx.input_mut(|i| i.consume_shortcut(&SHORTCUT_QUIT)) {
            log_info!("User quit. Exiting...");
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if menu_item(ui, "Open...", Some(&SHORTCUT_OPEN), true) {
                        self.on_action_open();
                    }
                    let recent = self.settings.recent_files.clone();
                    ui.menu_button("Open Recent", |ui| {
                        if recent.is_empty() {
                            ui.weak("No recent files");
                        }
                        for path in recent {
                            if ui.button(path.display().to_string()).clicked() {
                                ui.close_menu();
                                self.open_from_file(path);
                            }
                        }
                    });
                    ui.separator();
                    if menu_item(ui, "Save", Some(&SHORTCUT_SAVE), true) {
                        self.on_action_save();
                    }
                    if menu_item(ui, "Save As...", Some(&SHORTCUT_SAVE_AS), true) {
                        self.on_action_save_as();
                    }
                    ui.separator();
                    if menu_item(ui, "Insert Images...", Some(&SHORTCUT_INSERT), true) {
                        self.on_action_insert_images();
                    }
                    ui.separator();
                    if menu_item(ui, "Quit", Some(&SHORTCUT_QUIT), true) {
                        log_info!("User quit. Exiting...");
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    if menu_item(ui, "Undo", Some(&SHORTCUT_UNDO), self.history.can_undo()) {
                        self.on_action_undo();
                    }
                    if menu_item(ui, "Redo", Some(&SHORTCUT_REDO), self.history.can_redo()) {
                        self.on_action_redo();
                    }
                    ui.separator();
                    let has_selection = self.scene.has_selection();
                    if menu_item(ui, "Copy", Some(&SHORTCUT_COPY), has_selection) {
                        self.on_action_copy();
                    }
                    if menu_item(ui, "Paste", Some(&SHORTCUT_PASTE), true) {
                        self.on_action_paste(ctx);
                    }
                    if menu_item(ui, "Delete", None, has_selection) {
                        self.on_action_delete();
                    }
                    ui.separator();
                    if menu_item(
                        ui,
                        "Select All",
                        Some(&SHORTCUT_SELECT_ALL),
                        !self.scene.is_empty(),
                    ) {
                        self.scene.select_all();
                    }
                    if menu_item(ui, "Deselect All", Some(&SHORTCUT_DESELECT), has_selection) {
                        self.scene.clear_selection();
                    }
                });

                ui.menu_button("Items", |ui| {
                    let multi = self.scene.selection_count() >= 2;
                    if menu_item(ui, "Normalize Height", None, multi) {
                        self.push_normalize(self.scene.normalize_height());
                    }
                    if menu_item(ui, "Normalize Width", None, multi) {
                        self.push_normalize(self.scene.normalize_width());
                    }
                    if menu_item(ui, "Normalize Size", None, multi) {
                        self.push_normalize(self.scene.normalize_size());
                    }
                    ui.separator();
                    let has_selection = self.scene.has_selection();
                    if menu_item(ui, "Flip Horizontally", None, has_selection) {
                        self.scene.flip_selected();
                    }
                    if menu_item(ui, "Rotate 90\u{b0} Clockwise", None, has_selection) {
                        self.scene.rotate_selected(90.0);
                    }
                    if menu_item(ui, "Rotate 90\u{b0} Counter-Clockwise", None, has_selection) {
                        self.scene.rotate_selected(-90.0);
                    }
                });

                ui.menu_button("View", |ui| {
                    if menu_item(ui, "Zoom In", Some(&SHORTCUT_ZOOM_IN), true) {
                        self.viewport.zoom_in(self.scene.items_bounding_rect());
                    }
                    if menu_item(ui, "Zoom Out", Some(&SHORTCUT_ZOOM_OUT), true) {
                        self.viewport.zoom_out(self.scene.items_bounding_rect());
                    }
                    if menu_item(ui, "Reset Zoom", Some(&SHORTCUT_RESET_ZOOM), true) {
                        self.viewport.reset(self.scene.items_bounding_rect());
                    }
                    ui.separator();
                    if menu_item(
                        ui,
                        "Fit Scene",
                        Some(&SHORTCUT_FIT_SCENE),
                        !self.scene.is_empty(),
                    ) {
                        self.on_action_fit_scene();
                    }
                    if menu_item(
                        ui,
                        "Fit Selection",
                        Some(&SHORTCUT_FIT_SELECTION),
                        self.scene.has_selection(),
                    ) {
                        self.on_action_fit_selection();
                    }
                });

                ui.menu_button("Help", |ui| {
                    if menu_item(ui, "Debug Log...", None, true) {
                        self.log_dialog.open();
                    }
                });
            });
        });
    }

    // --- Canvas ------------------------------------------------------------

    fn canvas_ui(&mut self, ui: &mut egui::Ui, modal_open: bool) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let canvas_rect = response.rect;
        self.canvas_rect = Some(canvas_rect);
        self.viewport
            .set_viewport_size(canvas_rect.size(), self.scene.items_bounding_rect());

        if !modal_open {
            self.canvas_interaction(ui, &response, canvas_rect);
            response.context_menu(|ui| self.canvas_context_menu(ui));
        }

        // Geometry changed this frame: re-derive the scene rect, or reset
        // the view entirely once the scene empties.
        if self.scene.take_changed() {
            if self.scene.is_empty() {
                log_info!("No items in scene");
                self.viewport.reset(self.scene.items_bounding_rect());
            } else {
                self.viewport
                    .recalc_scene_rect(self.scene.items_bounding_rect());
            }
        }

        self.paint_scene(ui.ctx(), &painter, canvas_rect);
    }

    fn canvas_interaction(&mut self, ui: &mut egui::Ui, response: &egui::Response, rect: Rect) {
        let modifiers = ui.input(|i| i.modifiers);
        let middle_down = ui.input(|i| i.pointer.middle_down());
        let primary_down = ui.input(|i| i.pointer.primary_down());

        // Pan machine first; whatever it doesn't consume is item handling.
        if response.drag_started()
            && (middle_down || primary_down)
            && let Some(pos) = response.interact_pointer_pos()
        {
            let button = if middle_down {
                PointerButton::Middle
            } else {
                PointerButton::Primary
            };
            let outcome = self.panner.handle(PointerEvent::Pressed {
                button,
                alt: modifiers.alt,
                pos,
            });
            if outcome == PanOutcome::Passthrough && button == PointerButton::Primary {
                self.begin_item_interaction(pos, modifiers.shift);
            }
        }

        if response.dragged()
            && let Some(pos) = response.interact_pointer_pos()
        {
            match self.panner.handle(PointerEvent::Moved { pos }) {
                PanOutcome::Panned(delta) => self.viewport.pan_by(delta),
                PanOutcome::Passthrough if self.dragging_items => {
                    self.scene
                        .move_selected(response.drag_delta() / self.viewport.scale());
                }
                _ => {}
            }
        }

        if response.drag_released() {
            self.panner.handle(PointerEvent::Released);
            self.dragging_items = false;
        }

        if self.panner.is_panning() {
            ui.ctx()
                .output_mut(|o| o.cursor_icon = CursorIcon::Grabbing);
        }

        // Double-click an item: fit it to the view, or toggle back.
        if response.double_clicked()
            && let Some(pos) = response.interact_pointer_pos()
        {
            let scene_pos = self.to_scene(pos);
            if let Some(id) = self.scene.item_at(scene_pos)
                && let Some(item) = self.scene.get(id)
            {
                let item_rect = item.scene_rect();
                self.viewport
                    .fit_rect(item_rect, Some(id), self.scene.items_bounding_rect());
            }
        }

        // Wheel: one zoom step per direction.
        let scroll_y = ui.input(|i| i.scroll_delta.y);
        if scroll_y != 0.0 && response.hovered() {
            let items = self.scene.items_bounding_rect();
            if scroll_y > 0.0 {
                self.viewport.zoom_in(items);
            } else {
                self.viewport.zoom_out(items);
            }
        }

        // Dropped image files run through the batch import pipeline.
        let dropped: Vec<PathBuf> = ui.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .filter(|p| {
                    p.extension()
                        .is_some_and(|e| io::is_image_extension(&e.to_string_lossy()))
                })
                .collect()
        });
        if !dropped.is_empty() && self.import.is_none() {
            let anchor = ui
                .ctx()
                .pointer_hover_pos()
                .filter(|pos| rect.contains(*pos))
                .map(|pos| self.to_scene(pos))
                .unwrap_or_else(|| self.viewport.view_center_scene());
            self.start_import(dropped, anchor);
        }
    }

    /// Right-click menu on the canvas, mirroring the most-used actions.
    fn canvas_context_menu(&mut self, ui: &mut egui::Ui) {
        let has_selection = self.scene.has_selection();
        if menu_item(ui, "Paste", Some(&SHORTCUT_PASTE), true) {
            let ctx = ui.ctx().clone();
            self.on_action_paste(&ctx);
        }
        if menu_item(ui, "Insert Images...", Some(&SHORTCUT_INSERT), true) {
            self.on_action_insert_images();
        }
        ui.separator();
        if menu_item(ui, "Copy", Some(&SHORTCUT_COPY), has_selection) {
            self.on_action_copy();
        }
        if menu_item(ui, "Delete", None, has_selection) {
            self.on_action_delete();
        }
        ui.separator();
        if menu_item(
            ui,
            "Fit Selection",
            Some(&SHORTCUT_FIT_SELECTION),
            has_selection,
        ) {
            self.on_action_fit_selection();
        }
        if menu_item(
            ui,
            "Fit Scene",
            Some(&SHORTCUT_FIT_SCENE),
            !self.scene.is_empty(),
        ) {
            self.on_action_fit_scene();
        }
    }

    /// Press on the canvas with the primary button: update the selection
    /// and arm item dragging.
    fn begin_item_interaction(&mut self, screen_pos: Pos2, shift: bool) {
        let scene_pos = self.to_scene(screen_pos);
        match self.scene.item_at(scene_pos) {
            Some(id) => {
                if shift {
                    if let Some(item) = self.scene.get_mut(id) {
                        item.selected = !item.selected;
                    }
                } else if !self.scene.get(id).map(|i| i.selected).unwrap_or(false) {
                    self.scene.clear_selection();
                    if let Some(item) = self.scene.get_mut(id) {
                        item.selected = true;
                    }
                }
                self.dragging_items = self.scene.get(id).map(|i| i.selected).unwrap_or(false);
            }
            None => {
                if !shift {
                    self.scene.clear_selection();
                }
                self.dragging_items = false;
            }
        }
    }

    fn paint_scene(&mut self, ctx: &egui::Context, painter: &egui::Painter, canvas_rect: Rect) {
        painter.rect_filled(canvas_rect, 0.0, BACKGROUND);

        let origin = canvas_rect.min.to_vec2();

        // z-order: lower z first, ties by insertion order.
        let mut order: Vec<(usize, f32)> = self
            .scene
            .items()
            .iter()
            .enumerate()
            .map(|(i, item)| (i, item.z))
            .collect();
        order.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        let viewport = &self.viewport;
        let mut outlines: Vec<[Pos2; 4]> = Vec::new();
        let mut meshes: Vec<egui::Shape> = Vec::new();
        for (index, _) in order {
            let Some(item) = self.scene.item_by_index_mut(index) else {
                continue;
            };
            let corners = item.corners();
            let view_corners =
                corners.map(|c| viewport.map_from_scene(c) + origin);

            // Cheap cull: skip items entirely outside the canvas.
            let mut bounds = Rect::NOTHING;
            for corner in view_corners {
                bounds.extend_with(corner);
            }
            if !bounds.intersects(canvas_rect) {
                continue;
            }

            let texture = item.texture_id(ctx);
            let uv = if item.flip() < 0 {
                // Mirror horizontally by swapping the texture's u axis.
                [
                    egui::pos2(1.0, 0.0),
                    egui::pos2(0.0, 0.0),
                    egui::pos2(0.0, 1.0),
                    egui::pos2(1.0, 1.0),
                ]
            } else {
                [
                    egui::pos2(0.0, 0.0),
                    egui::pos2(1.0, 0.0),
                    egui::pos2(1.0, 1.0),
                    egui::pos2(0.0, 1.0),
                ]
            };

            let mut mesh = egui::Mesh::with_texture(texture);
            for (pos, uv) in view_corners.iter().zip(uv.iter()) {
                mesh.vertices.push(egui::epaint::Vertex {
                    pos: *pos,
                    uv: *uv,
                    color: Color32::WHITE,
                });
            }
            mesh.indices.extend_from_slice(&[0, 1, 2, 0, 2, 3]);
            meshes.push(egui::Shape::mesh(mesh));

            if item.selected {
                outlines.push(view_corners);
            }
        }
        for mesh in meshes {
            painter.add(mesh);
        }
        for corners in outlines {
            painter.add(egui::Shape::closed_line(
                corners.to_vec(),
                Stroke::new(2.0, SELECTION_STROKE),
            ));
        }

        if self.scene.is_empty() && self.import.is_none() {
            painter.text(
                canvas_rect.center(),
                Align2::CENTER_CENTER,
                WELCOME_TEXT,
                egui::FontId::proportional(16.0),
                Color32::from_gray(180),
            );
        }
    }
}

impl eframe::App for BeeRefApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // File given via command line, opened on the first frame.
        if let Some(path) = self.pending_open.take() {
            self.open_from_file(path);
        }

        self.sync_window_title(ctx);
        self.step_import(ctx);

        let modal_open = self.message.is_open() || self.import.is_some();

        self.menu_bar(ctx);

        if !modal_open {
            self.handle_shortcuts(ctx);
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(BACKGROUND))
            .show(ctx, |ui| {
                self.canvas_ui(ui, modal_open);
            });

        self.message.show(ctx);
        self.log_dialog.show(ctx);

        // Periodic tick so housekeeping runs even without input events.
        ctx.request_repaint_after(TICK_INTERVAL);
    }
}

/// A menu entry with an optional shortcut hint; closes the menu on click.
fn menu_item(
    ui: &mut egui::Ui,
    label: &str,
    shortcut: Option<&KeyboardShortcut>,
    enabled: bool,
) -> bool {
    let mut button = egui::Button::new(label);
    if let Some(shortcut) = shortcut {
        button = button.shortcut_text(ui.ctx().format_shortcut(shortcut));
    }
    let clicked = ui.add_enabled(enabled, button).clicked();
    if clicked {
        ui.close_menu();
    }
    clicked
}
