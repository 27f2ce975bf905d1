use dragsim::interfaces::gui_interface::RaceSnapshot;
use dragsim::interfaces::renderer::{DragStripScene, FontSize, Point, Rect, RgbaColor, Surface};
use dragsim::post::race_result::get_out_path;
use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

/// PngSurface draws onto a plotters bitmap. Surface calls cannot fail, therefore the first
/// drawing error is kept and reported by `finish`.
pub struct PngSurface<'a> {
    root: DrawingArea<BitMapBackend<'a>, Shift>,
    err: Option<anyhow::Error>,
}

impl<'a> PngSurface<'a> {
    pub fn new(root: DrawingArea<BitMapBackend<'a>, Shift>) -> PngSurface<'a> {
        PngSurface { root, err: None }
    }

    fn draw_result<E>(&mut self, result: Result<(), E>)
    where
        E: Into<anyhow::Error>,
    {
        if let Err(err) = result {
            if self.err.is_none() {
                self.err = Some(err.into());
            }
        }
    }

    /// finish writes the bitmap to its file.
    pub fn finish(mut self) -> anyhow::Result<()> {
        if let Some(err) = self.err.take() {
            return Err(err);
        }
        self.root.present()?;
        Ok(())
    }
}

fn to_plotters_color(color: RgbaColor) -> RGBAColor {
    RGBAColor(color.rgb.r, color.rgb.g, color.rgb.b, color.alpha)
}

fn px(val: f64) -> i32 {
    val.round() as i32
}

impl<'a> Surface for PngSurface<'a> {
    fn fill_rect(&mut self, rect: Rect, color: RgbaColor) {
        let result = self.root.draw(&Rectangle::new(
            [
                (px(rect.x), px(rect.y)),
                (px(rect.x + rect.w), px(rect.y + rect.h)),
            ],
            to_plotters_color(color).filled(),
        ));
        self.draw_result(result);
    }

    fn line(&mut self, from: Point, to: Point, width: f64, color: RgbaColor) {
        let result = self.root.draw(&PathElement::new(
            vec![(px(from.x), px(from.y)), (px(to.x), px(to.y))],
            to_plotters_color(color).stroke_width(width.round().max(1.0) as u32),
        ));
        self.draw_result(result);
    }

    fn text(&mut self, pos: Point, text: &str, size: FontSize, color: RgbaColor) {
        let font_size = match size {
            FontSize::Label => 16,
            FontSize::Hud => 22,
            FontSize::Banner => 56,
        };
        let style = ("sans-serif", font_size)
            .into_font()
            .color(&to_plotters_color(color))
            .pos(Pos::new(HPos::Center, VPos::Center));

        let result = self
            .root
            .draw(&Text::new(text.to_owned(), (px(pos.x), px(pos.y)), style));
        self.draw_result(result);
    }
}

/// export_frame_png draws the snapshot with the scene and saves it as PNG, by default to
/// output/last_race.png. Returns the path to the written file.
pub fn export_frame_png(
    scene: &DragStripScene,
    snapshot: &RaceSnapshot,
    path: Option<&Path>,
) -> anyhow::Result<String> {
    let out_path = get_out_path(path, "last_race.png")?;

    let root = BitMapBackend::new(&out_path, (scene.width as u32, scene.height as u32))
        .into_drawing_area();
    let mut surface = PngSurface::new(root);
    scene.draw(&mut surface, snapshot);
    surface.finish()?;

    let out_path = out_path.to_string_lossy().into_owned();
    info!("Exported final frame to {}", out_path);
    Ok(out_path)
}
