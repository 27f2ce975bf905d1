use crate::core::egui_surface::EguiSurface;
use crate::core::png_export::export_frame_png;
use crate::interfaces::dragsim_interface::DragsimInterface;
use dragsim::core::race::RaceStatus;
use dragsim::interfaces::gui_interface::{RaceCommand, RaceSnapshot};
use dragsim::interfaces::renderer::DragStripScene;
use eframe::{egui, epi};
use flume::{Receiver, Sender};
use helpers::buffer::RingBuffer;
use log::warn;
use std::path::PathBuf;
use std::time::Instant;

/// fit_rect returns the largest rectangle with the inserted aspect ratio (width / height) that
/// fits centered into the available rectangle.
pub fn fit_rect(available: egui::Rect, aspect: f32) -> egui::Rect {
    let screen_width = available.width();
    let screen_height = available.height();

    if screen_height <= 0.0 || aspect <= 0.0 {
        return available;
    }

    if screen_width / screen_height > aspect {
        // screen is wider -> fit height
        let new_width = screen_height * aspect;
        let offset_x = (screen_width - new_width) / 2.0;
        egui::Rect::from_min_size(
            egui::Pos2::new(available.min.x + offset_x, available.min.y),
            egui::Vec2::new(new_width, screen_height),
        )
    } else {
        // screen is taller -> fit width
        let new_height = screen_width / aspect;
        let offset_y = (screen_height - new_height) / 2.0;
        egui::Rect::from_min_size(
            egui::Pos2::new(available.min.x, available.min.y + offset_y),
            egui::Vec2::new(screen_width, new_height),
        )
    }
}

#[derive(Debug)]
pub struct DragRaceApp {
    pub dragsim_interface: DragsimInterface,
    pub scene: DragStripScene,
    pub prev_update: Instant,
    pub prev_update_durations: RingBuffer<u32>,
    pub export_png: Option<PathBuf>,
    pub export_done: bool,
    pub export_path: Option<String>,
}

impl DragRaceApp {
    pub fn new(
        rx: Receiver<RaceSnapshot>,
        tx: Sender<RaceCommand>,
        export_png: Option<PathBuf>,
    ) -> DragRaceApp {
        DragRaceApp {
            dragsim_interface: DragsimInterface::new(rx, tx),
            scene: DragStripScene::default(),
            prev_update: Instant::now(),
            prev_update_durations: RingBuffer::new(10),
            export_png,
            export_done: false,
            export_path: None,
        }
    }

    /// Exports the final frame once per finished race if an export path was set. The export is
    /// re-armed only once a snapshot of the next race arrived.
    fn export_final_frame(&mut self) {
        let snapshot = match self.dragsim_interface.race_state.as_ref() {
            Some(snapshot) => snapshot,
            None => return,
        };
        if !matches!(snapshot.status, RaceStatus::Finished) {
            self.export_done = false;
            return;
        }
        if self.export_done {
            return;
        }
        self.export_done = true;

        let export_png = match self.export_png.as_ref() {
            Some(export_png) => export_png,
            None => return,
        };
        let result = export_frame_png(&self.scene, snapshot, Some(export_png.as_path()));
        self.export_path = match result {
            Ok(path) => Some(path),
            Err(err) => {
                warn!("Could not export final frame: {:#}", err);
                None
            }
        };
    }

    fn race_again(&mut self) {
        self.dragsim_interface.send_command(RaceCommand::Reset);
        self.export_path = None;
    }

    fn set_top_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let finished = matches!(
                self.dragsim_interface.race_state.as_ref().map(|s| s.status),
                Some(RaceStatus::Finished)
            );

            if ui
                .add(egui::Button::new("Race again").enabled(finished))
                .clicked()
            {
                self.race_again();
            }

            if let Some(update_duration) = self.prev_update_durations.get_avg() {
                if update_duration > 0.0 {
                    ui.label(format!(
                        "GUI update frequency: {:.0} Hz",
                        1000.0 / update_duration
                    ));
                }
            }

            if let Some(export_path) = self.export_path.as_ref() {
                ui.label(format!("Final frame saved to {}", export_path));
            }
        });
    }

    pub fn set_ui_content(&mut self, ui: &mut egui::Ui) -> egui::Response {
        // get UI handles
        let (response, painter) =
            ui.allocate_painter(ui.available_size_before_wrap_finite(), egui::Sense::hover());

        // preserve the aspect ratio of the drag strip
        let aspect = (self.scene.width / self.scene.height) as f32;
        let dest_rect = fit_rect(response.rect, aspect);

        if let Some(snapshot) = self.dragsim_interface.race_state.as_ref() {
            let mut surface = EguiSurface::new(&self.scene, dest_rect);
            self.scene.draw(&mut surface, snapshot);
            surface.paint(ui, &painter);
        } else {
            painter.text(
                dest_rect.center(),
                egui::Align2::CENTER_CENTER,
                "Waiting for the race...",
                egui::TextStyle::Heading,
                egui::Color32::WHITE,
            );
        }

        // calculate current UI update duration, append it to the buffer, and set update time
        self.prev_update_durations
            .push(self.prev_update.elapsed().as_millis() as u32);
        self.prev_update = Instant::now();

        response
    }
}

impl epi::App for DragRaceApp {
    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::CtxRef, _frame: &mut epi::Frame) {
        // update race interface
        self.dragsim_interface.update();
        self.export_final_frame();

        egui::CentralPanel::default().show(ctx, |ui| {
            self.set_top_bar(ui);
            egui::Frame::dark_canvas(ui.style()).show(ui, |ui| {
                self.set_ui_content(ui);
            });
        });

        // request repaint of the UI
        ctx.request_repaint();
    }

    fn on_exit(&mut self) {
        self.dragsim_interface.send_command(RaceCommand::Quit);
    }

    fn name(&self) -> &str {
        "Drag Race"
    }
}
