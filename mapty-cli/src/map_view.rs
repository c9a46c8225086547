//! World map drawn on a braille canvas, standing in for a slippy map.

use log::debug;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::Line,
    widgets::{
        Block, Borders, Paragraph,
        canvas::{Canvas, Map, MapResolution},
    },
};

use mapty::geo::Coords;
use mapty::map::{MapWidget, MarkerId, Popup, ViewOptions};
use mapty::session::{EventSender, SessionEvent};

const MAX_ZOOM: u8 = 18;
/// Cursor steps per half screen.
const CURSOR_STEPS: f64 = 10.0;
/// Rough width of a terminal cell in popup pixels.
const CELL_PX: u16 = 8;

struct TerminalMarker {
    at: Coords,
    popup: Option<Popup>,
}

#[derive(Default)]
pub struct TerminalMap {
    center: Option<Coords>,
    zoom: u8,
    cursor: Coords,
    markers: Vec<TerminalMarker>,
    clicks: Option<EventSender>,
}

impl TerminalMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.center.is_some()
    }

    /// Half the visible longitude and latitude range.
    fn half_span(&self) -> (f64, f64) {
        let lng = 180.0 / 2f64.powf(self.zoom as f64 / 2.0);
        (lng, lng / 2.0)
    }

    fn bounds(&self, center: Coords) -> ([f64; 2], [f64; 2]) {
        let (lng, lat) = self.half_span();
        (
            [center.lng - lng, center.lng + lng],
            [center.lat - lat, center.lat + lat],
        )
    }

    pub fn move_cursor(&mut self, lat_steps: i32, lng_steps: i32) {
        let Some(center) = self.center else {
            return;
        };
        let (lng_half, lat_half) = self.half_span();
        let lat = (self.cursor.lat + lat_steps as f64 * lat_half / CURSOR_STEPS).clamp(-90.0, 90.0);
        let lng = (self.cursor.lng + lng_steps as f64 * lng_half / CURSOR_STEPS).clamp(-180.0, 180.0);
        self.cursor = Coords::new(lat, lng);

        // Scroll when the cursor leaves the screen.
        let (x, y) = self.bounds(center);
        if lng < x[0] || lng > x[1] || lat < y[0] || lat > y[1] {
            self.center = Some(self.cursor);
        }
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + 1).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.saturating_sub(1);
    }

    /// Clicks at the cursor. Returns `false` when nobody listens yet.
    pub fn click(&self) -> bool {
        match &self.clicks {
            Some(tx) => tx.send(SessionEvent::MapClicked(self.cursor)).is_ok(),
            None => false,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let border = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };

        let Some(center) = self.center else {
            let waiting = Paragraph::new("Map not loaded.\nWaiting for your position...")
                .style(Style::default().fg(Color::Gray))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(border)
                        .title("Map"),
                );
            frame.render_widget(waiting, area);
            return;
        };

        let (x_bounds, y_bounds) = self.bounds(center);
        let canvas = Canvas::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title(format!("Map  {}  zoom {}", self.cursor, self.zoom)),
            )
            .marker(Marker::Braille)
            .x_bounds(x_bounds)
            .y_bounds(y_bounds)
            .paint(|ctx| {
                ctx.draw(&Map {
                    color: Color::DarkGray,
                    resolution: MapResolution::High,
                });
                ctx.layer();

                for marker in &self.markers {
                    let (text, color) = match &marker.popup {
                        Some(popup) if popup.open => {
                            let width = (popup.options.max_width / CELL_PX) as usize;
                            let content: String = popup.content.chars().take(width).collect();
                            (format!("● {}", content), popup_color(&popup.options.class_name))
                        }
                        Some(popup) => ("●".to_string(), popup_color(&popup.options.class_name)),
                        None => ("●".to_string(), Color::White),
                    };
                    ctx.print(
                        marker.at.lng,
                        marker.at.lat,
                        Line::styled(text, Style::default().fg(color)),
                    );
                }

                ctx.print(
                    self.cursor.lng,
                    self.cursor.lat,
                    Line::styled(
                        "+",
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                );
            });
        frame.render_widget(canvas, area);
    }
}

fn popup_color(class_name: &str) -> Color {
    match class_name {
        "running-popup" => Color::Green,
        "cycling-popup" => Color::LightRed,
        _ => Color::White,
    }
}

impl MapWidget for TerminalMap {
    fn create_map(&mut self, center: Coords, zoom: u8) {
        self.center = Some(center);
        self.cursor = center;
        self.zoom = zoom.min(MAX_ZOOM);
    }

    fn set_view(&mut self, center: Coords, zoom: u8, options: ViewOptions) {
        debug!(
            "set view {} zoom {} (animate: {}, {:?})",
            center, zoom, options.animate, options.pan_duration
        );
        self.center = Some(center);
        self.cursor = center;
        self.zoom = zoom.min(MAX_ZOOM);
    }

    fn add_marker(&mut self, at: Coords) -> MarkerId {
        self.markers.push(TerminalMarker { at, popup: None });
        MarkerId(self.markers.len() - 1)
    }

    fn bind_popup_content(&mut self, marker: MarkerId, popup: Popup) {
        if let Some(m) = self.markers.get_mut(marker.0) {
            m.popup = Some(popup);
        }
    }

    fn on_click(&mut self, events: EventSender) {
        self.clicks = Some(events);
    }

    fn remove_map(&mut self) {
        *self = TerminalMap::default();
    }
}
