use dragsim::interfaces::renderer::{DragStripScene, FontSize, Point, Rect, RgbaColor, Surface};
use eframe::egui;

/// Text shapes need the fonts of the UI, they are therefore only created when painting.
#[derive(Debug)]
enum PendingShape {
    Shape(egui::Shape),
    Text {
        pos: egui::Pos2,
        text: String,
        style: egui::TextStyle,
        color: egui::Color32,
    },
}

/// EguiSurface maps the scene canvas onto a rectangle of the window and collects the shapes.
#[derive(Debug)]
pub struct EguiSurface {
    to_screen: egui::emath::RectTransform,
    scale: f32,
    shapes: Vec<PendingShape>,
}

impl EguiSurface {
    pub fn new(scene: &DragStripScene, dest_rect: egui::Rect) -> EguiSurface {
        let canvas = egui::Rect::from_min_max(
            egui::Pos2::new(0.0, 0.0),
            egui::Pos2::new(scene.width as f32, scene.height as f32),
        );

        EguiSurface {
            to_screen: egui::emath::RectTransform::from_to(canvas, dest_rect),
            scale: dest_rect.width() / canvas.width(),
            shapes: vec![],
        }
    }

    fn to_pos(&self, point: Point) -> egui::Pos2 {
        self.to_screen
            * egui::Pos2 {
                x: point.x as f32,
                y: point.y as f32,
            }
    }

    /// paint hands all collected shapes to the painter.
    pub fn paint(self, ui: &egui::Ui, painter: &egui::Painter) {
        let shapes: Vec<egui::Shape> = self
            .shapes
            .into_iter()
            .map(|pending| match pending {
                PendingShape::Shape(shape) => shape,
                PendingShape::Text {
                    pos,
                    text,
                    style,
                    color,
                } => egui::Shape::text(
                    ui.fonts(),
                    pos,
                    egui::Align2::CENTER_CENTER,
                    text,
                    style,
                    color,
                ),
            })
            .collect();

        painter.extend(shapes);
    }
}

pub fn to_color32(color: RgbaColor) -> egui::Color32 {
    let alpha = (color.alpha.max(0.0).min(1.0) * 255.0).round() as u8;
    egui::Color32::from_rgba_unmultiplied(color.rgb.r, color.rgb.g, color.rgb.b, alpha)
}

fn to_text_style(size: FontSize) -> egui::TextStyle {
    match size {
        FontSize::Label => egui::TextStyle::Small,
        FontSize::Hud => egui::TextStyle::Body,
        FontSize::Banner => egui::TextStyle::Heading,
    }
}

impl Surface for EguiSurface {
    fn fill_rect(&mut self, rect: Rect, color: RgbaColor) {
        let screen_rect = egui::Rect::from_min_max(
            self.to_pos(Point::new(rect.x, rect.y)),
            self.to_pos(Point::new(rect.x + rect.w, rect.y + rect.h)),
        );
        self.shapes.push(PendingShape::Shape(egui::Shape::rect_filled(
            screen_rect,
            0.0,
            to_color32(color),
        )));
    }

    fn line(&mut self, from: Point, to: Point, width: f64, color: RgbaColor) {
        self.shapes.push(PendingShape::Shape(egui::Shape::line_segment(
            [self.to_pos(from), self.to_pos(to)],
            egui::Stroke::new(width as f32 * self.scale, to_color32(color)),
        )));
    }

    fn text(&mut self, pos: Point, text: &str, size: FontSize, color: RgbaColor) {
        self.shapes.push(PendingShape::Text {
            pos: self.to_pos(pos),
            text: text.to_owned(),
            style: to_text_style(size),
            color: to_color32(color),
        });
    }
}
