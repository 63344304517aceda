use std::time::Duration;

use egui::{Pos2, Rect, Vec2};
use instant::Instant;
use serde::{Deserialize, Serialize};

/// Rendering surface the engine drives. Implemented by whatever draws the graph.
pub trait Renderer {
    /// Converts a viewport (screen) position into graph coordinates.
    fn viewport_to_graph(&self, pos: Pos2) -> Pos2;

    /// Drops any user-defined viewport override so fitting uses the graph bounds.
    fn clear_viewport_override(&mut self);

    /// Animates the view to fit `bounds` (graph coordinates).
    fn reset_camera(&mut self, bounds: Rect, duration: Duration);

    /// Animates the view to center on `pos` (graph coordinates) keeping the zoom.
    fn center_on(&mut self, pos: Pos2, duration: Duration);
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
struct View {
    zoom: f32,
    pan: Vec2,
}

#[derive(Clone, Debug)]
struct Animation {
    from: View,
    to: View,
    started: Instant,
    duration: Duration,
}

/// Zoom and pan transform over a viewport, with timed transitions.
///
/// Screen position = graph position * zoom + pan.
#[derive(Clone, Debug)]
pub struct Camera {
    view: View,
    /// Screen rect the graph is drawn into
    viewport: Rect,
    /// User-chosen region that fitting should show instead of the graph bounds
    viewport_override: Option<Rect>,
    /// Padding around the graph when fitting
    screen_padding: f32,

    animation: Option<Animation>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Rect::from_min_size(Pos2::ZERO, Vec2::new(800., 600.)))
    }
}

impl Camera {
    pub fn new(viewport: Rect) -> Self {
        Self {
            view: View {
                zoom: 1.,
                pan: Vec2::ZERO,
            },
            viewport,
            viewport_override: None,
            screen_padding: 0.3,
            animation: None,
        }
    }

    pub fn with_padding(mut self, screen_padding: f32) -> Self {
        self.screen_padding = screen_padding;
        self
    }

    pub fn zoom(&self) -> f32 {
        self.view.zoom
    }

    pub fn pan(&self) -> Vec2 {
        self.view.pan
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    pub fn viewport_override(&self) -> Option<Rect> {
        self.viewport_override
    }

    pub fn set_viewport_override(&mut self, region: Option<Rect>) {
        self.viewport_override = region;
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Target of the running animation, or the current view.
    pub fn target(&self) -> (f32, Vec2) {
        let v = self.animation.as_ref().map_or(self.view, |a| a.to);
        (v.zoom, v.pan)
    }

    /// Advances the running animation to wall-clock `now`.
    pub fn tick(&mut self, now: Instant) {
        let Some(anim) = &self.animation else {
            return;
        };
        let elapsed = now.duration_since(anim.started);
        let t = if anim.duration.is_zero() {
            1.
        } else {
            elapsed.as_secs_f32() / anim.duration.as_secs_f32()
        };
        self.advance(t);
    }

    /// Moves the running animation to progress `t` in `[0, 1]`. Completes it at `t >= 1`.
    pub fn advance(&mut self, t: f32) {
        let Some(anim) = &self.animation else {
            return;
        };
        if t >= 1. {
            self.view = anim.to;
            self.animation = None;
            return;
        }
        let t = ease_in_out(t.max(0.));
        self.view = View {
            zoom: anim.from.zoom + (anim.to.zoom - anim.from.zoom) * t,
            pan: anim.from.pan + (anim.to.pan - anim.from.pan) * t,
        };
    }

    /// Jumps to the end of the running animation.
    pub fn finish(&mut self) {
        self.advance(1.);
    }

    pub fn canvas_to_screen_pos(&self, pos: Pos2) -> Pos2 {
        (pos.to_vec2() * self.view.zoom + self.view.pan).to_pos2()
    }

    pub fn screen_to_canvas_pos(&self, pos: Pos2) -> Pos2 {
        ((pos.to_vec2() - self.view.pan) / self.view.zoom).to_pos2()
    }

    /// Zoom and pan that show `bounds` centered in the viewport.
    fn fit(&self, bounds: Rect) -> View {
        // calculate graph dimensions with decorative padding
        let graph_size = bounds.size() * (1. + self.screen_padding);
        let canvas_size = self.viewport.size();

        // choose the minimum of the two zoom factors to avoid distortion
        let zoom_x = canvas_size.x / graph_size.x.max(f32::EPSILON);
        let zoom_y = canvas_size.y / graph_size.y.max(f32::EPSILON);
        let mut zoom = zoom_x.min(zoom_y);
        if !zoom.is_finite() || zoom <= 0. {
            zoom = self.view.zoom;
        }

        // align the centers of the graph and the canvas
        let pan = self.viewport.center().to_vec2() - bounds.center().to_vec2() * zoom;
        View { zoom, pan }
    }

    fn animate_to(&mut self, to: View, duration: Duration) {
        self.animation = Some(Animation {
            from: self.view,
            to,
            started: Instant::now(),
            duration,
        });
        if duration.is_zero() {
            self.finish();
        }
    }
}

impl Renderer for Camera {
    fn viewport_to_graph(&self, pos: Pos2) -> Pos2 {
        self.screen_to_canvas_pos(pos)
    }

    fn clear_viewport_override(&mut self) {
        self.viewport_override = None;
    }

    fn reset_camera(&mut self, bounds: Rect, duration: Duration) {
        let region = self.viewport_override.unwrap_or(bounds);
        let to = self.fit(region);
        self.animate_to(to, duration);
    }

    fn center_on(&mut self, pos: Pos2, duration: Duration) {
        let (zoom, _) = self.target();
        let pan = self.viewport.center().to_vec2() - pos.to_vec2() * zoom;
        self.animate_to(View { zoom, pan }, duration);
    }
}

fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2. * t * t
    } else {
        1. - (-2. * t + 2.).powi(2) / 2.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(Rect::from_min_size(Pos2::ZERO, Vec2::new(200., 100.))).with_padding(0.)
    }

    #[test]
    fn transforms_are_inverse() {
        let mut c = camera();
        c.reset_camera(
            Rect::from_min_max(Pos2::new(-50., -10.), Pos2::new(50., 10.)),
            Duration::ZERO,
        );
        let p = Pos2::new(12., -3.);
        let back = c.viewport_to_graph(c.canvas_to_screen_pos(p));
        assert!((back - p).length() < 1e-4);
    }

    #[test]
    fn fit_centers_bounds() {
        let mut c = camera();
        c.reset_camera(
            Rect::from_min_max(Pos2::new(0., 0.), Pos2::new(100., 100.)),
            Duration::ZERO,
        );
        assert_eq!(c.zoom(), 1.);
        assert_eq!(c.canvas_to_screen_pos(Pos2::new(50., 50.)), Pos2::new(100., 50.));
    }

    #[test]
    fn animation_interpolates_then_completes() {
        let mut c = camera();
        c.reset_camera(
            Rect::from_min_max(Pos2::new(0., 0.), Pos2::new(50., 50.)),
            Duration::from_millis(300),
        );
        assert!(c.is_animating());
        assert_eq!(c.zoom(), 1.);

        c.advance(0.5);
        assert!(c.zoom() > 1. && c.zoom() < 2.);

        c.advance(1.);
        assert!(!c.is_animating());
        assert_eq!(c.zoom(), 2.);
    }

    #[test]
    fn override_wins_until_cleared() {
        let mut c = camera();
        c.set_viewport_override(Some(Rect::from_min_max(
            Pos2::new(0., 0.),
            Pos2::new(400., 400.),
        )));
        let bounds = Rect::from_min_max(Pos2::new(0., 0.), Pos2::new(100., 100.));
        c.reset_camera(bounds, Duration::ZERO);
        assert_eq!(c.zoom(), 0.25);

        c.clear_viewport_override();
        c.reset_camera(bounds, Duration::ZERO);
        assert_eq!(c.zoom(), 1.);
    }

    #[test]
    fn center_on_keeps_zoom() {
        let mut c = camera();
        c.center_on(Pos2::new(10., 10.), Duration::ZERO);
        assert_eq!(c.zoom(), 1.);
        assert_eq!(c.canvas_to_screen_pos(Pos2::new(10., 10.)), Pos2::new(100., 50.));
    }
}
