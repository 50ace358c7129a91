//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │ sky                               (0, 15) top  │
//! │                                                │
//! │   [bricks]        ◯ indicator                  │
//! │                          ● ball                │
//! │  (−20, 0)          + cursor            (20, 0) │
//! │ ▓▓▓▓▓▓▓▓▓▓▓▓▓▓ ground (top y = −9) ▓▓▓▓▓▓▓▓▓▓▓ │
//! │ status bar / key legend                        │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! The window shows the whole world; one world unit is `WIN_W / 40` pixels.

use std::sync::mpsc::Sender;

use anyhow::{Context, Result};
use gesture_intent::Vec2;
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use crate::device::{SimInput, SimKey, SwipeDir};
use crate::scene::{ObjectKind, SceneObject, ToyScene};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:        usize = 800;
pub const WIN_H:        usize = 600;
const STATUS_H:         usize = 30;
const SKY_COLOR:        u32   = 0xFF2B4C7E;
const GROUND_COLOR:     u32   = 0xFF5A3E2B;
const GRASS_COLOR:      u32   = 0xFF3F8F3A;
const WALL_COLOR:       u32   = 0xFF9FB7D9;
const BALL_COLOR:       u32   = 0xFFF2F2F2;
const ASTEROID_COLOR:   u32   = 0xFF8C7B6B;
const EXPLOSION_COLOR:  u32   = 0xFFFF8C1A;
const SELECT_COLOR:     u32   = 0xFFFFD700;
const INDICATOR_COLOR:  u32   = 0xFF66FFCC;
const CURSOR_COLOR:     u32   = 0xFFFFFFFF;
const DEVICE_CURSOR:    u32   = 0xFFFF66CC;
const TEXT_BG:          u32   = 0xFF0F3460;

// ════════════════════════════════════════════════════════════════════════════
// Camera
// ════════════════════════════════════════════════════════════════════════════

/// Maps world units (origin centre, Y up) to pixels (origin top-left, Y down).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub world_size: Vec2,
    pub width:      usize,
    pub height:     usize,
}

impl Camera {
    pub fn new(world_size: Vec2, width: usize, height: usize) -> Self {
        Camera { world_size, width, height }
    }

    /// Pixels per world unit along X.
    pub fn scale(&self) -> f32 { self.width as f32 / self.world_size.x }

    pub fn world_to_screen(&self, p: Vec2) -> (f32, f32) {
        let sx = (p.x / self.world_size.x + 0.5) * self.width as f32;
        let sy = (0.5 - p.y / self.world_size.y) * self.height as f32;
        (sx, sy)
    }

    pub fn screen_to_world(&self, sx: f32, sy: f32) -> Vec2 {
        self.normalized_to_world(Vec2::new(sx / self.width as f32, sy / self.height as f32))
    }

    /// `n` in window fractions, (0,0) top-left.
    pub fn normalized_to_world(&self, n: Vec2) -> Vec2 {
        Vec2::new((n.x - 0.5) * self.world_size.x, (0.5 - n.y) * self.world_size.y)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas — the pixel buffer and drawing primitives
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    pub buf:    Vec<u32>,
    pub width:  usize,
    pub height: usize,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas { buf: vec![SKY_COLOR; width * height], width, height }
    }

    pub fn clear(&mut self, color: u32) { self.buf.fill(color); }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.buf[y * self.width + x])
    }

    fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.buf[y as usize * self.width + x as usize] = color;
        }
    }

    pub fn fill_rect(&mut self, x: isize, y: isize, w: usize, h: usize, color: u32) {
        let x0 = x.max(0) as usize;
        let y0 = y.max(0) as usize;
        let x1 = ((x + w as isize).max(0) as usize).min(self.width);
        let y1 = ((y + h as isize).max(0) as usize).min(self.height);
        for row in y0..y1 {
            for col in x0..x1 {
                self.buf[row * self.width + col] = color;
            }
        }
    }

    pub fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: u32) {
        let r2 = r * r;
        let (x0, x1) = ((cx - r).floor() as isize, (cx + r).ceil() as isize);
        let (y0, y1) = ((cy - r).floor() as isize, (cy + r).ceil() as isize);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.set_pixel(x, y, color);
                }
            }
        }
    }

    pub fn ring(&mut self, cx: f32, cy: f32, r: f32, thickness: f32, color: u32) {
        let outer = r + thickness / 2.0;
        let inner = (r - thickness / 2.0).max(0.0);
        let (x0, x1) = ((cx - outer).floor() as isize, (cx + outer).ceil() as isize);
        let (y0, y1) = ((cy - outer).floor() as isize, (cy + outer).ceil() as isize);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let d = (dx * dx + dy * dy).sqrt();
                if d >= inner && d <= outer {
                    self.set_pixel(x, y, color);
                }
            }
        }
    }

    pub fn line(&mut self, (x0, y0): (f32, f32), (x1, y1): (f32, f32), color: u32) {
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            self.set_pixel((x0 + (x1 - x0) * t) as isize, (y0 + (y1 - y0) * t) as isize, color);
        }
    }

    /// Minimal bitmap font — 3×5 characters.
    /// Each character is encoded as 5 rows × 3 bits.
    pub fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.set_pixel((cx + col) as isize, (y + row) as isize, color);
                    }
                }
            }
            cx += 4; // 3 wide + 1 gap
            if cx + 4 > self.width { break; }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Per-frame input
// ════════════════════════════════════════════════════════════════════════════

/// Window keys the run loop handles itself; gesture keys go to the
/// simulation source.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    pub quit:        bool,
    /// `Some(true)` on press, `Some(false)` on release.
    pub cursor_key:  Option<bool>,
    pub pick_key:    Option<bool>,
    pub reset:       bool,
    pub breakout:    bool,
    /// Mouse position in world units, when over the window.
    pub mouse:       Option<Vec2>,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    canvas: Canvas,
    camera: Camera,
    sim_tx: Sender<SimInput>,
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimInput>, world_size: Vec2) -> Result<Self> {
        let mut window = Window::new(
            "Leap Toy — gesture sandbox",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).context("failed to open the visualizer window")?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            canvas: Canvas::new(WIN_W, WIN_H),
            camera: Camera::new(world_size, WIN_W, WIN_H),
            sim_tx,
        })
    }

    pub fn camera(&self) -> &Camera { &self.camera }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll the keyboard and mouse. Gesture keys are forwarded to the
    /// simulation source.
    pub fn poll_input(&mut self) -> FrameInput {
        let mut input = FrameInput::default();
        if !self.window.is_open() {
            input.quit = true;
            return input;
        }

        let shift = self.window.is_key_down(Key::LeftShift)
                 || self.window.is_key_down(Key::RightShift);
        let pressed  = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        let released = |k: Key| self.window.is_key_released(k);

        let mut sim = Vec::new();

        if pressed(Key::Q) {
            sim.push(SimInput::KeyDown(SimKey::Quit));
            input.quit = true;
        }

        if pressed(Key::C)  { sim.push(SimInput::KeyDown(SimKey::Circle { clockwise: !shift })); }
        if released(Key::C) { sim.push(SimInput::KeyUp(SimKey::Circle { clockwise: !shift })); }

        for (key, direction) in [
            (Key::Left,  SwipeDir::Left),
            (Key::Right, SwipeDir::Right),
            (Key::Up,    SwipeDir::Up),
            (Key::Down,  SwipeDir::Down),
        ] {
            if pressed(key) {
                sim.push(SimInput::KeyDown(SimKey::Swipe { direction, fast: shift }));
            }
        }

        if pressed(Key::K) { sim.push(SimInput::KeyDown(SimKey::KeyTap)); }
        if pressed(Key::T) { sim.push(SimInput::KeyDown(SimKey::ScreenTap)); }
        if pressed(Key::H) { sim.push(SimInput::KeyDown(SimKey::HandNudge)); }

        for (key, sim_key) in [
            (Key::W, SimKey::PitchUp),
            (Key::S, SimKey::PitchDown),
            (Key::A, SimKey::RollLeft),
            (Key::D, SimKey::RollRight),
        ] {
            if pressed(key)  { sim.push(SimInput::KeyDown(sim_key)); }
            if released(key) { sim.push(SimInput::KeyUp(sim_key)); }
        }

        let edge = |k: Key| match (pressed(k), released(k)) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _         => None,
        };
        input.cursor_key = edge(Key::Z);
        input.pick_key   = edge(Key::Space);
        input.reset    = pressed(Key::R);
        input.breakout = pressed(Key::B);

        input.mouse = self
            .window
            .get_mouse_pos(MouseMode::Discard)
            .map(|(x, y)| self.camera.screen_to_world(x, y));

        for s in sim {
            let _ = self.sim_tx.send(s);
        }
        input
    }

    /// Render one frame.
    pub fn render(&mut self, scene: &ToyScene, cursor: Vec2, device_cursor: bool, status: &str) {
        draw_scene(&mut self.canvas, &self.camera, scene);

        // ── Cursor ────────────────────────────────────────────────────────
        let (cx, cy) = self.camera.world_to_screen(cursor);
        let color = if device_cursor { DEVICE_CURSOR } else { CURSOR_COLOR };
        self.canvas.line((cx - 6.0, cy), (cx + 6.0, cy), color);
        self.canvas.line((cx, cy - 6.0), (cx, cy + 6.0), color);

        // ── Status bar ────────────────────────────────────────────────────
        let top = WIN_H - STATUS_H;
        self.canvas.fill_rect(0, top as isize, WIN_W, STATUS_H, TEXT_BG);
        self.canvas.draw_label(status, 10, top + 6, 0xFFEEEEEE);

        // ── Key legend ────────────────────────────────────────────────────
        self.canvas.draw_label(
            "C=circle  arrows=swipe  K=key tap  T=screen tap  WASD=tilt  Space=pick  Z=cursor  R=reset  B=breakout  Q=quit",
            10, WIN_H - 10, 0xFF888888,
        );

        self.window.update_with_buffer(&self.canvas.buf, WIN_W, WIN_H).ok();
    }
}

/// Draw the world (everything except cursor and status bar).
pub fn draw_scene(canvas: &mut Canvas, camera: &Camera, scene: &ToyScene) {
    let cfg   = scene.config();
    let scale = camera.scale();
    canvas.clear(SKY_COLOR);

    // ── Ground and grass ──────────────────────────────────────────────────
    let half_ground = cfg.ground_width / 2.0;
    let (gx0, gy0) = camera.world_to_screen(Vec2::new(-half_ground, cfg.ground_top));
    let (gx1, _)   = camera.world_to_screen(Vec2::new(half_ground, cfg.ground_top));
    let ground_w = (gx1 - gx0).max(0.0) as usize;
    canvas.fill_rect(gx0 as isize, gy0 as isize, ground_w, camera.height, GROUND_COLOR);
    canvas.fill_rect(gx0 as isize, (gy0 - scale * 0.5) as isize, ground_w, (scale * 0.5) as usize, GRASS_COLOR);

    // ── Bounds ────────────────────────────────────────────────────────────
    let half = cfg.camera_size * 0.5;
    let tl = camera.world_to_screen(Vec2::new(-half.x, half.y));
    let tr = camera.world_to_screen(Vec2::new(half.x - 1.0 / scale, half.y));
    let bl = camera.world_to_screen(Vec2::new(-half.x, cfg.ground_top));
    let br = camera.world_to_screen(Vec2::new(half.x - 1.0 / scale, cfg.ground_top));
    canvas.line(tl, tr, WALL_COLOR);
    canvas.line(tl, bl, WALL_COLOR);
    canvas.line(tr, br, WALL_COLOR);

    // ── Objects ───────────────────────────────────────────────────────────
    for obj in scene.objects() {
        draw_object(canvas, camera, obj);
    }

    // ── Circle indicator ──────────────────────────────────────────────────
    if let Some(ind) = scene.indicator() {
        let (cx, cy) = camera.world_to_screen(ind.position);
        let r = ind.radius * scale;
        canvas.ring(cx, cy, r, 2.0, INDICATOR_COLOR);
        // Rotating ticks show the spin direction.
        for k in 0..4 {
            let a = (ind.angle + k as f32 * 90.0).to_radians();
            let (s, c) = a.sin_cos();
            canvas.fill_circle(cx + c * r, cy - s * r, 3.0, INDICATOR_COLOR);
        }
    }
}

fn draw_object(canvas: &mut Canvas, camera: &Camera, obj: &SceneObject) {
    let scale = camera.scale();
    let (cx, cy) = camera.world_to_screen(obj.position);
    let r = obj.radius * scale;
    match obj.kind {
        ObjectKind::Ball => canvas.fill_circle(cx, cy, r, BALL_COLOR),
        ObjectKind::Asteroid => {
            canvas.fill_circle(cx, cy, r, ASTEROID_COLOR);
            let (s, c) = obj.angle.to_radians().sin_cos();
            canvas.line((cx, cy), (cx + c * r, cy - s * r), 0xFF3A3026);
        }
        ObjectKind::Brick => {
            let w = obj.size.x * scale;
            let h = obj.size.y * scale;
            let color = blend(SKY_COLOR, brick_color(obj.position.y), obj.opacity);
            canvas.fill_rect((cx - w / 2.0) as isize, (cy - h / 2.0) as isize, w as usize, h as usize, color);
        }
        ObjectKind::Explosion => {
            let t = obj.lifetime.map_or(1.0, |l| (obj.age / l).clamp(0.0, 1.0));
            canvas.ring(cx, cy, r * (0.3 + t), 3.0, EXPLOSION_COLOR);
        }
    }
    if obj.selected {
        let outline = obj.radius.max(obj.size.x / 2.0) * scale + 3.0;
        canvas.ring(cx, cy, outline, 2.0, SELECT_COLOR);
    }
}

/// Row-dependent brick colour.
fn brick_color(y: f32) -> u32 {
    const PALETTE: [u32; 4] = [0xFFE04E39, 0xFFF2A541, 0xFF4EA5D9, 0xFF7BC950];
    PALETTE[(y.floor() as i32).rem_euclid(PALETTE.len() as i32) as usize]
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0-t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar,br) << 16) | (lerp(ag,bg) << 8) | lerp(ab,bb)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneConfig;

    fn camera() -> Camera { Camera::new(Vec2::new(40.0, 30.0), WIN_W, WIN_H) }

    #[test]
    fn origin_is_window_centre() {
        assert_eq!(camera().world_to_screen(Vec2::ZERO), (400.0, 300.0));
        assert_eq!(camera().screen_to_world(400.0, 300.0), Vec2::ZERO);
    }

    #[test]
    fn world_y_points_up() {
        let cam = camera();
        assert_eq!(cam.world_to_screen(Vec2::new(-20.0, 15.0)), (0.0, 0.0));
        assert_eq!(cam.screen_to_world(800.0, 600.0), Vec2::new(20.0, -15.0));
        assert_eq!(cam.normalized_to_world(Vec2::new(0.25, 0.5)), Vec2::new(-10.0, 0.0));
    }

    #[test]
    fn fill_circle_stays_in_bounds() {
        let mut c = Canvas::new(20, 20);
        c.fill_circle(0.0, 0.0, 50.0, 0xFF112233);
        assert_eq!(c.pixel(19, 19), Some(0xFF112233));
        assert_eq!(c.pixel(20, 0), None);
    }

    #[test]
    fn ring_leaves_centre_empty() {
        let mut c = Canvas::new(40, 40);
        c.clear(0);
        c.ring(20.0, 20.0, 10.0, 2.0, 0xFFFFFFFF);
        assert_eq!(c.pixel(20, 20), Some(0));
        assert_eq!(c.pixel(29, 20), Some(0xFFFFFFFF));
    }

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 0.0), 0xFF000000);
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 1.0), 0xFFFFFFFF);
    }

    #[test]
    fn scene_draws_ball_and_indicator() {
        let cam = camera();
        let mut scene = ToyScene::new(SceneConfig::default());
        scene.show_indicator(Vec2::new(-10.0, 5.0), 3.0, 180.0);
        let mut canvas = Canvas::new(WIN_W, WIN_H);
        draw_scene(&mut canvas, &cam, &scene);

        let (bx, by) = cam.world_to_screen(Vec2::new(5.0, 5.0));
        assert_eq!(canvas.pixel(bx as usize, by as usize), Some(BALL_COLOR));
        let (ix, iy) = cam.world_to_screen(Vec2::new(-10.0, 5.0));
        assert_eq!(canvas.pixel(ix as usize, iy as usize), Some(SKY_COLOR));
        let (rx, ry) = cam.world_to_screen(Vec2::new(-7.0, 5.0));
        assert_eq!(canvas.pixel(rx as usize, ry as usize), Some(INDICATOR_COLOR));
    }
}
