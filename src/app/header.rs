//! Header bar with the vigil title, live stats, and feed status

use super::VigilApp;
use crate::theme::colors;
use crate::time::now_seconds;
use eframe::egui;

impl VigilApp {
    pub(crate) fn render_header(&mut self, ui: &mut egui::Ui) {
        self.fps_counter.tick();

        let sync_state = self.sync_state();
        let candles = self.network.candle_count();
        let categories = self.network.category_count();
        let threads = self.network.thread_count();
        let active = self.network.active_category().map(str::to_string);

        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new("Vigil")
                    .color(colors::GOLD)
                    .strong()
                    .size(16.0),
            );
            ui.label(
                egui::RichText::new("a map of lit candles")
                    .color(colors::TEXT_MUTED)
                    .size(11.0),
            );

            if let Some(category) = active {
                ui.add_space(10.0);
                ui.label(
                    egui::RichText::new(format!("praying together: {}", category))
                        .color(colors::GOLD),
                );
            }

            // RIGHT: Status and stats (right-to-left order)
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let (status_color, status_text) = match &sync_state {
                    crate::ws_state::SyncState::Live => {
                        (egui::Color32::from_rgb(100, 200, 100), "Live")
                    }
                    crate::ws_state::SyncState::Connecting => {
                        (egui::Color32::from_rgb(200, 200, 100), "Connecting...")
                    }
                    crate::ws_state::SyncState::Offline => {
                        (egui::Color32::from_rgb(200, 100, 100), "Offline")
                    }
                    crate::ws_state::SyncState::Error(_) => {
                        (egui::Color32::from_rgb(200, 100, 100), "Error")
                    }
                };
                ui.colored_label(status_color, egui::RichText::new(status_text));

                ui.add_space(10.0);

                ui.label(
                    egui::RichText::new(format!("{:.0} fps", self.fps_counter.fps()))
                        .color(colors::TEXT_SECONDARY),
                );
                ui.label(egui::RichText::new("/").color(colors::TEXT_MUTED));

                ui.label(
                    egui::RichText::new(format!("{} threads", threads))
                        .color(colors::TEXT_MUTED),
                );
                ui.label(egui::RichText::new("/").color(colors::TEXT_MUTED));

                ui.label(
                    egui::RichText::new(format!("{} categories", categories))
                        .color(colors::TEXT_MUTED),
                );
                ui.label(egui::RichText::new("/").color(colors::TEXT_MUTED));

                ui.label(
                    egui::RichText::new(format!("{} candles", candles))
                        .color(colors::TEXT_MUTED),
                );
            });
        });
    }
}

/// FPS counter using platform-agnostic time
pub struct FpsCounter {
    frames: Vec<f64>,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            frames: Vec::with_capacity(60),
        }
    }

    pub fn tick(&mut self) {
        let now = now_seconds() * 1000.0;
        self.frames.push(now);
        if self.frames.len() > 60 {
            self.frames.remove(0);
        }
    }

    pub fn fps(&self) -> f64 {
        if self.frames.len() < 2 {
            return 0.0;
        }
        let elapsed = self.frames.last().unwrap() - self.frames.first().unwrap();
        if elapsed == 0.0 {
            return 0.0;
        }
        (self.frames.len() as f64 - 1.0) / (elapsed / 1000.0)
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}
