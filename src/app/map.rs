//! Map panel: world background, thread overlay, candle markers
//!
//! Threads draw under the markers. Dragging pans, scrolling zooms about the
//! pointer; both re-project every candle through the view before the frame
//! is drawn, so threads never lag a pan or zoom.

use eframe::egui;
use egui::{Color32, Pos2, Rect, Sense, Stroke, Vec2};

use crate::core::thread::{GLOW_DOT_ALPHA, GLOW_DOT_RADIUS, THREAD_COLOR, THREAD_WIDTH};
use crate::core::{CandleStatus, GeoPoint, Projector, ScreenPos};
use crate::theme::{category_colors, colors};
use crate::time::{now_epoch_ms, now_seconds};

use super::VigilApp;

/// Pointer-to-marker hit radius in pixels.
const HIT_RADIUS: f32 = 10.0;
const MARKER_RADIUS: f32 = 4.0;

impl VigilApp {
    pub(crate) fn render_map(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let rect = response.rect;

        // Any viewport change re-projects the whole network immediately.
        let mut viewport_changed = self.view.set_size(rect.width(), rect.height());

        if response.dragged() {
            let delta = response.drag_delta();
            if delta != Vec2::ZERO {
                self.view.pan_by(delta.x, delta.y);
                viewport_changed = true;
            }
        }

        if let Some(hover) = response.hover_pos() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                let anchor = ScreenPos::new(hover.x - rect.min.x, hover.y - rect.min.y);
                self.view.zoom_at(anchor, (scroll as f64 * 0.005).exp());
                viewport_changed = true;
            }
        }

        if viewport_changed {
            self.network.refresh_positions(&self.view);
        }

        let to_screen =
            |p: ScreenPos| Pos2::new(rect.min.x + p.x, rect.min.y + p.y);

        self.draw_graticule(&painter, rect);
        self.draw_threads(&painter, &to_screen);

        // Marker positions for drawing and hit testing
        let marker_hits: Vec<(String, Pos2)> = self
            .markers
            .iter()
            .filter_map(|(id, m)| {
                self.view
                    .project(m.geo)
                    .map(|p| (id.clone(), to_screen(p)))
            })
            .filter(|(_, pos)| rect.expand(MARKER_RADIUS * 2.0).contains(*pos))
            .collect();

        let pointer = response.hover_pos();
        let hovered = pointer.and_then(|p| {
            marker_hits
                .iter()
                .filter(|(_, pos)| pos.distance(p) <= HIT_RADIUS)
                .min_by(|(_, a), (_, b)| a.distance(p).total_cmp(&b.distance(p)))
                .map(|(id, pos)| (id.clone(), *pos))
        });

        if response.clicked() {
            match &hovered {
                Some((id, _)) => {
                    if let Some(marker) = self.markers.get(id) {
                        let category = marker.candle.category_or_default().to_string();
                        self.network
                            .activate_category(&category, id, now_seconds());
                        self.selected = Some(id.clone());
                    }
                }
                None => self.selected = None,
            }
        }

        let now_ms = now_epoch_ms();
        for (id, pos) in &marker_hits {
            if let Some(marker) = self.markers.get(id) {
                draw_candle_marker(&painter, *pos, marker, now_ms);
            }
        }

        // Popup for the hovered marker, or the click-pinned one
        let popup = hovered
            .clone()
            .or_else(|| {
                self.selected.as_ref().and_then(|id| {
                    marker_hits
                        .iter()
                        .find(|(hit_id, _)| hit_id == id)
                        .map(|(id, pos)| (id.clone(), *pos))
                })
            });
        if let Some((id, pos)) = popup {
            self.show_candle_popup(ui, &id, pos, now_ms);
        }
    }

    fn draw_graticule(&self, painter: &egui::Painter, rect: Rect) {
        let stroke = Stroke::new(0.5, colors::GRATICULE);
        for lng in (-180..=180).step_by(30) {
            if let Some(p) = self.view.project(GeoPoint { lat: 0.0, lng: lng as f64 }) {
                let x = rect.min.x + p.x;
                if x >= rect.min.x && x <= rect.max.x {
                    painter.vline(x, rect.y_range(), stroke);
                }
            }
        }
        for lat in (-60..=80).step_by(20) {
            if let Some(p) = self.view.project(GeoPoint { lat: lat as f64, lng: 0.0 }) {
                let y = rect.min.y + p.y;
                if y >= rect.min.y && y <= rect.max.y {
                    painter.hline(rect.x_range(), y, stroke);
                }
            }
        }
    }

    fn draw_threads(&self, painter: &egui::Painter, to_screen: impl Fn(ScreenPos) -> Pos2) {
        let (r, g, b) = THREAD_COLOR;
        for draw in self.network.thread_draws() {
            let alpha = (draw.opacity * 255.0) as u8;
            let color = Color32::from_rgba_unmultiplied(r, g, b, alpha);
            painter.line_segment(
                [to_screen(draw.from), to_screen(draw.to)],
                Stroke::new(THREAD_WIDTH, color),
            );
            if let Some(mid) = draw.glow_dot {
                let dot_alpha = (GLOW_DOT_ALPHA * 255.0) as u8;
                painter.circle_filled(
                    to_screen(mid),
                    GLOW_DOT_RADIUS,
                    Color32::from_rgba_unmultiplied(r, g, b, dot_alpha),
                );
            }
        }
    }

    fn show_candle_popup(&self, ui: &mut egui::Ui, id: &str, pos: Pos2, now_ms: f64) {
        let Some(marker) = self.markers.get(id) else {
            return;
        };
        let candle = &marker.candle;

        egui::Area::new(egui::Id::new("candle_popup"))
            .fixed_pos(pos + Vec2::new(10.0, -10.0))
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style())
                    .fill(colors::BG_ELEVATED)
                    .show(ui, |ui| {
                        ui.set_max_width(240.0);
                        ui.label(
                            egui::RichText::new(format!("\u{201C}{}\u{201D}", candle.intention))
                                .color(colors::TEXT_PRIMARY)
                                .italics(),
                        );
                        ui.add_space(4.0);
                        ui.label(
                            egui::RichText::new(format!(
                                "Category: {}",
                                candle.category_or_default()
                            ))
                            .color(colors::TEXT_SECONDARY)
                            .size(11.0),
                        );
                        if let Some(saint) = &candle.saint {
                            ui.label(
                                egui::RichText::new(format!("Intercessor: {}", saint))
                                    .color(colors::TEXT_SECONDARY)
                                    .size(11.0),
                            );
                        }
                        ui.add_space(4.0);
                        ui.label(
                            egui::RichText::new(format!(
                                "{} · {} prayers",
                                candle.age_label(now_ms),
                                candle.prayer_count
                            ))
                            .color(colors::TEXT_MUTED)
                            .size(11.0),
                        );
                    });
            });
    }
}

fn draw_candle_marker(
    painter: &egui::Painter,
    pos: Pos2,
    marker: &super::CandleMarker,
    now_ms: f64,
) {
    let (flame, wax) = category_colors(marker.candle.category_or_default());

    if marker.highlight.is_on() {
        // Golden halo while the candle's category is active
        painter.circle_filled(pos, MARKER_RADIUS * 3.0, colors::GOLD.gamma_multiply(0.25));
        painter.circle_stroke(
            pos,
            MARKER_RADIUS * 2.2,
            Stroke::new(1.5, colors::GOLD),
        );
    }

    let (flame, wax) = match marker.candle.status(now_ms) {
        // Expiring candles burn low
        CandleStatus::Expiring => (flame.gamma_multiply(0.5), wax.gamma_multiply(0.5)),
        _ => (flame, wax),
    };

    painter.circle_filled(pos, MARKER_RADIUS, wax);
    painter.circle_filled(pos + Vec2::new(0.0, -MARKER_RADIUS), MARKER_RADIUS * 0.6, flame);

    if marker.candle.status(now_ms) == CandleStatus::New {
        painter.circle_stroke(pos, MARKER_RADIUS + 1.5, Stroke::new(1.0, flame));
    }
}
