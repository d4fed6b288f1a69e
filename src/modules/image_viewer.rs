//! Image viewer: pixels decoded by the worker, shown as an egui texture, zoom.

use std::path::{Path, PathBuf};

use eframe::egui;

use super::path_prompt::{PathPrompt, PromptOutcome};
use crate::bus::{topics, BusMessage};
use crate::error::{ModuleError, ModuleMountError};
use crate::module::{FeatureModule, ModuleContext};
use crate::protocol::{BackendEvent, TaskId};

pub const ZOOM_STEP: f32 = 1.2;
const MIN_ZOOM: f32 = 0.05;
const MAX_ZOOM: f32 = 40.0;

/// Decoded pixels, kept across hide/show so the texture can be rebuilt.
struct Picture {
    path: PathBuf,
    pixels: egui::ColorImage,
}

pub struct ImageViewer {
    picture: Option<Picture>,
    /// GPU-side copy; only present while mounted.
    texture: Option<egui::TextureHandle>,
    zoom: f32,
    mounted: bool,
    prompt: Option<PathPrompt>,
    loading: Option<TaskId>,
    deferred_open: Option<PathBuf>,
    error: Option<String>,
}

impl Default for ImageViewer {
    fn default() -> Self {
        Self {
            picture: None,
            texture: None,
            zoom: 1.0,
            mounted: false,
            prompt: None,
            loading: None,
            deferred_open: None,
            error: None,
        }
    }
}

impl ImageViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn has_image(&self) -> bool {
        self.picture.is_some()
    }

    pub fn image_size(&self) -> Option<[usize; 2]> {
        self.picture.as_ref().map(|p| p.pixels.size)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn zoom_in(&mut self) {
        if self.has_image() {
            self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
        }
    }

    pub fn zoom_out(&mut self) {
        if self.has_image() {
            self.zoom = (self.zoom / ZOOM_STEP).max(MIN_ZOOM);
        }
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = 1.0;
    }

    pub fn open_path(&mut self, path: PathBuf, cx: &mut ModuleContext<'_>) {
        if self.loading.is_some() {
            return;
        }
        self.error = None;
        self.loading = Some(cx.decode_image(path));
    }

    /// Replace the current picture; the texture is rebuilt on the next frame.
    pub fn show_image(&mut self, path: PathBuf, pixels: egui::ColorImage) {
        self.picture = Some(Picture { path, pixels });
        self.texture = None;
        self.zoom = 1.0;
    }

    fn texture(&mut self, ctx: &egui::Context) -> Option<egui::TextureHandle> {
        let picture = self.picture.as_ref()?;
        let texture = self.texture.get_or_insert_with(|| {
            ctx.load_texture(
                picture.path.display().to_string(),
                picture.pixels.clone(),
                egui::TextureOptions::LINEAR,
            )
        });
        Some(texture.clone())
    }

    fn caption(&self) -> String {
        match &self.picture {
            Some(picture) => {
                let name = picture
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| picture.path.display().to_string());
                let [w, h] = picture.pixels.size;
                format!("{name}  {w}×{h}  {:.0}%", self.zoom * 100.0)
            }
            None => "No image".to_string(),
        }
    }
}

impl FeatureModule for ImageViewer {
    fn mount(&mut self, cx: &mut ModuleContext<'_>) -> Result<(), ModuleMountError> {
        self.mounted = true;
        if let Some(path) = self.deferred_open.take() {
            self.open_path(path, cx);
        }
        Ok(())
    }

    fn unmount(&mut self, _cx: &mut ModuleContext<'_>) {
        self.mounted = false;
        self.texture = None;
        self.loading = None;
    }

    fn on_message(
        &mut self,
        message: &BusMessage,
        cx: &mut ModuleContext<'_>,
    ) -> Result<(), ModuleError> {
        if !message.is(topics::IMAGE_OPEN) {
            return Ok(());
        }
        let path = message.expect_payload::<PathBuf>()?.clone();
        if self.mounted {
            self.open_path(path, cx);
        } else {
            self.deferred_open = Some(path);
        }
        Ok(())
    }

    fn on_task_event(&mut self, event: BackendEvent, _cx: &mut ModuleContext<'_>) {
        let BackendEvent::ImageDecoded { task, path, result } = event else {
            return;
        };
        if self.loading != Some(task) {
            return;
        }
        self.loading = None;
        match result {
            Ok(pixels) => self.show_image(path, pixels),
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    fn ui(&mut self, ui: &mut egui::Ui, cx: &mut ModuleContext<'_>) {
        let loaded = self.has_image();
        ui.horizontal(|ui| {
            if ui
                .add_enabled(self.loading.is_none(), egui::Button::new("Open…"))
                .clicked()
            {
                self.prompt = Some(PathPrompt::new("Open", "picture.png"));
            }
            ui.separator();
            if ui.add_enabled(loaded, egui::Button::new("➕ Zoom in")).clicked() {
                self.zoom_in();
            }
            if ui.add_enabled(loaded, egui::Button::new("➖ Zoom out")).clicked() {
                self.zoom_out();
            }
            if ui.add_enabled(loaded, egui::Button::new("Reset")).clicked() {
                self.reset_zoom();
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if self.loading.is_some() {
                    ui.spinner();
                }
                ui.label(self.caption());
            });
        });

        if let Some(prompt) = self.prompt.as_mut() {
            match prompt.show(ui) {
                Some(PromptOutcome::Submit(path)) => {
                    self.prompt = None;
                    self.open_path(path, cx);
                }
                Some(PromptOutcome::Cancel) => self.prompt = None,
                None => {}
            }
        }

        if let Some(error) = self.error.clone() {
            ui.horizontal(|ui| {
                ui.colored_label(egui::Color32::from_rgb(230, 80, 80), error);
                if ui.small_button("✕").clicked() {
                    self.error = None;
                }
            });
        }

        ui.separator();
        let Some(texture) = self.texture(ui.ctx()) else {
            ui.centered_and_justified(|ui| {
                ui.weak("Open an image to view it here.");
            });
            return;
        };
        let size = texture.size_vec2() * self.zoom;
        egui::ScrollArea::both()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.add(egui::Image::new((texture.id(), size)));
            });
    }
}

/// Whether `path` has an extension this viewer claims.
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            matches!(
                e.to_ascii_lowercase().as_str(),
                "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" | "ico" | "tiff"
            )
        })
        .unwrap_or(false)
}
