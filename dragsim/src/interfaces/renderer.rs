//! Frame rendering. A `FrameRenderer` receives a snapshot after every processed tick. The
//! `DragStripScene` turns a snapshot into draw calls on a `Surface`, which is implemented by the
//! GUI painter, the PNG exporter and the tests.

use crate::core::race::{Lane, RaceStatus};
use crate::interfaces::gui_interface::{RaceSnapshot, RgbColor};
use crate::post::race_result::{format_distance, format_margin, format_speed, format_time};
use anyhow::Context;
use flume::Sender;
use log::info;

pub trait FrameRenderer {
    /// render presents one snapshot. Rendering must not depend on previous calls, i.e. rendering
    /// the same snapshot twice yields the same frame.
    fn render(&mut self, snapshot: &RaceSnapshot) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }
}

/// Axis-aligned rectangle given by its top left corner and its size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect { x, y, w, h }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RgbaColor {
    pub rgb: RgbColor,
    /// Opacity in [0, 1].
    pub alpha: f64,
}

impl RgbaColor {
    pub const fn opaque(r: u8, g: u8, b: u8) -> RgbaColor {
        RgbaColor {
            rgb: RgbColor::new(r, g, b),
            alpha: 1.0,
        }
    }

    pub fn from_rgb(rgb: RgbColor, alpha: f64) -> RgbaColor {
        RgbaColor { rgb, alpha }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontSize {
    /// Vehicle labels and distance markers
    Label,
    /// Speed read-outs and result details
    Hud,
    /// Countdown numbers and the winner announcement
    Banner,
}

/// Surface is a 2-D canvas of fixed pixel dimensions with the origin in the top left corner.
pub trait Surface {
    fn fill_rect(&mut self, rect: Rect, color: RgbaColor);

    fn line(&mut self, from: Point, to: Point, width: f64, color: RgbaColor);

    /// text draws a single line of text centered at pos.
    fn text(&mut self, pos: Point, text: &str, size: FontSize, color: RgbaColor);
}

const BACKGROUND: RgbaColor = RgbaColor::opaque(31, 41, 55);
const LANE_DIVIDER: RgbaColor = RgbaColor::opaque(75, 85, 99);
const LANE_CENTERLINE: RgbaColor = RgbaColor::opaque(107, 114, 128);
const WHITE: RgbaColor = RgbaColor::opaque(255, 255, 255);
const BLACK: RgbaColor = RgbaColor::opaque(0, 0, 0);
const HUD_BACKGROUND: RgbaColor = RgbaColor {
    rgb: RgbColor::new(0, 0, 0),
    alpha: 0.75,
};
const GO_GREEN: RgbaColor = RgbaColor::opaque(74, 222, 128);
const WINNER_YELLOW: RgbaColor = RgbaColor::opaque(250, 204, 21);

/// Duration the "GO!" banner is shown after the start.
const GO_BANNER_DURATION: f64 = 1.0;

/// DragStripScene draws a two-lane drag strip. All coordinates are canvas pixels.
/// * `width`, `height` - Canvas size
/// * `start_x` - X coordinate of the start line
/// * `finish_width` - Width of the checkered finish marker at the right border
/// * `glyph_w`, `glyph_h` - Size of a vehicle glyph
#[derive(Debug, Clone, PartialEq)]
pub struct DragStripScene {
    pub width: f64,
    pub height: f64,
    pub start_x: f64,
    pub finish_width: f64,
    pub finish_squares: u32,
    pub glyph_w: f64,
    pub glyph_h: f64,
    pub trail_w: f64,
}

impl Default for DragStripScene {
    fn default() -> Self {
        DragStripScene::new(1200.0, 400.0)
    }
}

impl DragStripScene {
    pub fn new(width: f64, height: f64) -> DragStripScene {
        DragStripScene {
            width,
            height,
            start_x: 30.0,
            finish_width: 50.0,
            finish_squares: 20,
            glyph_w: 80.0,
            glyph_h: 50.0,
            trail_w: 30.0,
        }
    }

    /// Usable track length between the start of the glyphs and the finish marker.
    pub fn track_length(&self) -> f64 {
        self.width - 130.0
    }

    /// glyph_x returns the left edge of a vehicle glyph for a normalized progress in [0, 1].
    pub fn glyph_x(&self, progress: f64) -> f64 {
        50.0 + progress * self.track_length()
    }

    /// lane_y returns the y coordinate of the center of the lane (lane A top, lane B bottom).
    pub fn lane_y(&self, lane: Lane) -> f64 {
        match lane {
            Lane::A => self.height / 6.0,
            Lane::B => 5.0 * self.height / 6.0,
        }
    }

    /// draw renders the complete frame for the snapshot.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, snapshot: &RaceSnapshot) {
        self.draw_track(surface, snapshot);

        for lane in Lane::ALL.iter() {
            self.draw_vehicle(surface, snapshot, *lane);
        }

        self.draw_hud(surface, snapshot);
    }

    fn draw_track<S: Surface + ?Sized>(&self, surface: &mut S, snapshot: &RaceSnapshot) {
        let (w, h) = (self.width, self.height);

        surface.fill_rect(Rect::new(0.0, 0.0, w, h), BACKGROUND);

        // lane dividers
        for &y in [h / 3.0, 2.0 * h / 3.0].iter() {
            surface.line(Point::new(0.0, y), Point::new(w, y), 3.0, LANE_DIVIDER);
        }

        // dashed lane center lines
        for lane in Lane::ALL.iter() {
            let y = self.lane_y(*lane);
            let mut x = 0.0;
            while x < w {
                let x_end = (x + 20.0).min(w);
                surface.line(Point::new(x, y), Point::new(x_end, y), 2.0, LANE_CENTERLINE);
                x += 30.0;
            }
        }

        // start line
        surface.line(
            Point::new(self.start_x, 0.0),
            Point::new(self.start_x, h),
            4.0,
            WHITE,
        );

        // checkered finish marker
        let finish_x = w - self.finish_width;
        let square_h = h / self.finish_squares as f64;
        for i in 0..self.finish_squares {
            let color = if i % 2 == 0 { BLACK } else { WHITE };
            surface.fill_rect(
                Rect::new(finish_x, i as f64 * square_h, self.finish_width, square_h),
                color,
            );
        }

        // distance markers on the lane divider between the lanes
        let y_markers = h / 2.0;
        let marker_fracs = [0.25, 0.5, 0.75];
        surface.text(
            Point::new(self.glyph_x(0.0), y_markers),
            "START",
            FontSize::Label,
            WHITE,
        );
        for &frac in marker_fracs.iter() {
            surface.text(
                Point::new(self.glyph_x(frac), y_markers),
                &format_distance(snapshot.distance * frac, snapshot.units),
                FontSize::Label,
                WHITE,
            );
        }
        surface.text(
            Point::new(finish_x - 40.0, y_markers),
            "FINISH",
            FontSize::Label,
            WHITE,
        );
    }

    fn draw_vehicle<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        snapshot: &RaceSnapshot,
        lane: Lane,
    ) {
        let lane_state = &snapshot.lanes[lane.idx()];
        let x = self.glyph_x(snapshot.lane_progress(lane));
        let y = self.lane_y(lane);
        let (gw, gh) = (self.glyph_w, self.glyph_h);

        // motion trail behind the vehicle
        if lane_state.position > 0.0 {
            surface.fill_rect(
                Rect::new(x - self.trail_w, y - gh / 2.0, self.trail_w, gh),
                RgbaColor::from_rgb(lane_state.color, 0.2),
            );
        }

        // body and highlight
        surface.fill_rect(
            Rect::new(x, y - gh / 2.0, gw, gh),
            RgbaColor::from_rgb(lane_state.color, 1.0),
        );
        surface.fill_rect(
            Rect::new(x + 5.0, y - gh / 2.0 + 5.0, gw - 10.0, gh / 3.0),
            RgbaColor::from_rgb(RgbColor::new(255, 255, 255), 0.3),
        );

        // wheels
        let wheel = gh / 4.0;
        for &wx in [x + 10.0, x + gw - 10.0 - wheel].iter() {
            for &wy in [y - gh / 2.0, y + gh / 2.0].iter() {
                surface.fill_rect(Rect::new(wx, wy - wheel / 2.0, wheel, wheel), BLACK);
            }
        }

        surface.text(
            Point::new(x + gw / 2.0, y),
            short_label(&lane_state.label),
            FontSize::Label,
            WHITE,
        );
    }

    fn draw_hud<S: Surface + ?Sized>(&self, surface: &mut S, snapshot: &RaceSnapshot) {
        let (w, h) = (self.width, self.height);

        // speed read-outs, lane A on the left and lane B on the right
        for lane in Lane::ALL.iter() {
            let lane_state = &snapshot.lanes[lane.idx()];
            let x_center = match lane {
                Lane::A => 130.0,
                Lane::B => w - 180.0,
            };
            let y_top = h / 3.0 + 8.0;
            surface.fill_rect(Rect::new(x_center - 110.0, y_top, 220.0, 44.0), HUD_BACKGROUND);
            surface.text(
                Point::new(x_center, y_top + 12.0),
                &lane_state.label,
                FontSize::Label,
                WHITE,
            );
            surface.text(
                Point::new(x_center, y_top + 32.0),
                &format_speed(lane_state.speed, snapshot.units),
                FontSize::Hud,
                RgbaColor::from_rgb(lane_state.color, 1.0),
            );
        }

        let center = Point::new(w / 2.0, h / 2.0);

        match snapshot.status {
            RaceStatus::Countdown => {
                if let Some(countdown) = snapshot.countdown {
                    surface.text(center, &countdown.to_string(), FontSize::Banner, WHITE);
                }
            }
            RaceStatus::Running => {
                if snapshot.racetime < GO_BANNER_DURATION {
                    surface.text(center, "GO!", FontSize::Banner, GO_GREEN);
                }
            }
            RaceStatus::Finished => {
                if let Some(winner) = snapshot.winner {
                    let winner_state = &snapshot.lanes[winner.idx()];
                    let loser_state = &snapshot.lanes[winner.other().idx()];
                    let margin = winner_state.position - loser_state.position;

                    surface.fill_rect(
                        Rect::new(w / 2.0 - 300.0, h / 2.0 - 90.0, 600.0, 180.0),
                        HUD_BACKGROUND,
                    );
                    surface.text(
                        Point::new(center.x, center.y - 45.0),
                        &format!("{} WINS!", winner_state.label),
                        FontSize::Banner,
                        WINNER_YELLOW,
                    );
                    surface.text(
                        Point::new(center.x, center.y + 25.0),
                        &format!("Time: {}", format_time(snapshot.racetime)),
                        FontSize::Hud,
                        WHITE,
                    );
                    surface.text(
                        Point::new(center.x, center.y + 55.0),
                        &format!("Margin: {}", format_margin(margin, snapshot.units)),
                        FontSize::Hud,
                        WHITE,
                    );
                }
            }
        }
    }
}

/// short_label returns the first word of a vehicle label (usually the make) for the glyph.
fn short_label(label: &str) -> &str {
    label.split_whitespace().next().unwrap_or(label)
}

/// SurfaceRenderer draws every snapshot onto its surface.
#[derive(Debug)]
pub struct SurfaceRenderer<S: Surface> {
    pub scene: DragStripScene,
    pub surface: S,
}

impl<S: Surface> SurfaceRenderer<S> {
    pub fn new(scene: DragStripScene, surface: S) -> SurfaceRenderer<S> {
        SurfaceRenderer { scene, surface }
    }
}

impl<S: Surface> FrameRenderer for SurfaceRenderer<S> {
    fn render(&mut self, snapshot: &RaceSnapshot) -> anyhow::Result<()> {
        self.scene.draw(&mut self.surface, snapshot);
        Ok(())
    }
}

/// ChannelRenderer forwards the snapshots to the GUI thread. The final snapshot of a race is
/// always sent, intermediate ones at most with MAX_GUI_UPDATE_FREQUENCY (in race time).
#[derive(Debug)]
pub struct ChannelRenderer {
    tx: Sender<RaceSnapshot>,
    min_update_interval: f64,
    t_last_update: Option<f64>,
}

impl ChannelRenderer {
    pub fn new(tx: Sender<RaceSnapshot>, max_update_frequency: f64) -> ChannelRenderer {
        ChannelRenderer {
            tx,
            min_update_interval: 1.0 / max_update_frequency,
            t_last_update: None,
        }
    }
}

impl FrameRenderer for ChannelRenderer {
    fn render(&mut self, snapshot: &RaceSnapshot) -> anyhow::Result<()> {
        let due = match (snapshot.status, self.t_last_update) {
            (RaceStatus::Running, Some(t_last)) if snapshot.racetime >= t_last => {
                snapshot.racetime >= t_last + self.min_update_interval - 0.001
            }
            _ => true,
        };

        if !due {
            return Ok(());
        }

        self.t_last_update = match snapshot.status {
            RaceStatus::Running => Some(snapshot.racetime),
            _ => None,
        };

        // send current race state
        self.tx
            .send(snapshot.to_owned())
            .context("Failed to send race state to GUI!")
    }
}

/// LogRenderer logs the race progress at most once per second of race time.
#[derive(Debug, Default)]
pub struct LogRenderer {
    t_last_print: Option<f64>,
}

impl LogRenderer {
    pub fn new() -> LogRenderer {
        LogRenderer::default()
    }
}

impl FrameRenderer for LogRenderer {
    fn render(&mut self, snapshot: &RaceSnapshot) -> anyhow::Result<()> {
        if !matches!(snapshot.status, RaceStatus::Running) {
            self.t_last_print = None;
            return Ok(());
        }

        if let Some(t_last) = self.t_last_print {
            if snapshot.racetime < t_last + 0.9999 {
                return Ok(());
            }
        }

        info!(
            "Simulating... Current race time is {:.3}s, positions {:.1} / {:.1} {}",
            snapshot.racetime,
            snapshot.lanes[0].position,
            snapshot.lanes[1].position,
            snapshot.units.distance_label()
        );
        self.t_last_print = Some(snapshot.racetime);
        Ok(())
    }
}
