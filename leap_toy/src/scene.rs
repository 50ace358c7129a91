//! The toy scene the intents act on.
//!
//! A 40×30 world centred on the origin: walls at x = ±20, a ceiling at
//! y = 15 and a strip of ground whose top sits at y = −9. Everything in it
//! is a [`SceneObject`]: the ball, swiped asteroids, breakout bricks and
//! short-lived explosion markers. The integrator is deliberately small:
//! gravity, restitution against the bounds and bricks, and "anything an
//! asteroid touches makes it explode".

use gesture_intent::{Intent, IntentSink, Vec2, Vec3};
use rand::Rng;
use tracing::{debug, trace};

// ════════════════════════════════════════════════════════════════════════════
// SceneConfig
// ════════════════════════════════════════════════════════════════════════════

/// Constants of the toy world.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    /// Visible world size, centred on the origin.
    pub camera_size:        Vec2,
    pub ground_width:       f32,
    /// Y of the ground's collision edge.
    pub ground_top:         f32,
    pub gravity:            f32,

    pub ball_start:         Vec2,
    pub ball_radius:        f32,
    pub ball_restitution:   f32,
    /// Ball velocity added per degree of hand tilt.
    pub tilt_gain:          f32,

    pub asteroid_size:      f32,
    /// Seconds before an untouched asteroid disappears.
    pub asteroid_lifetime:  f32,
    /// Spin is drawn from ±this, degrees per second.
    pub asteroid_max_spin:  f32,
    pub explosion_lifetime: f32,

    pub brick_rows:         usize,
    pub brick_columns:      usize,
    pub brick_size:         Vec2,
    pub brick_health:       f32,
    /// Damage the ball deals to a brick per hit in breakout mode.
    pub ball_damage:        f32,
    pub brick_fade_secs:    f32,
    pub breakout_ball_start: Vec2,
}

impl Default for SceneConfig {
    fn default() -> Self {
        SceneConfig {
            camera_size:         Vec2::new(40.0, 30.0),
            ground_width:        40.0,
            ground_top:          -9.0,
            gravity:             -9.8,
            ball_start:          Vec2::new(5.0, 5.0),
            ball_radius:         1.0,
            ball_restitution:    0.5,
            tilt_gain:           0.02,
            asteroid_size:       3.0,
            asteroid_lifetime:   10.0,
            asteroid_max_spin:   90.0,
            explosion_lifetime:  0.6,
            brick_rows:          4,
            brick_columns:       8,
            brick_size:          Vec2::new(2.0, 1.0),
            brick_health:        20.0,
            ball_damage:         10.0,
            brick_fade_secs:     0.5,
            breakout_ball_start: Vec2::new(-5.0, -5.0),
        }
    }
}

impl SceneConfig {
    fn left(&self)    -> f32 { -self.camera_size.x / 2.0 }
    fn right(&self)   -> f32 {  self.camera_size.x / 2.0 }
    fn ceiling(&self) -> f32 {  self.camera_size.y / 2.0 }
}

// ════════════════════════════════════════════════════════════════════════════
// SceneObject
// ════════════════════════════════════════════════════════════════════════════

pub type ObjectId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Ball,
    Asteroid,
    Brick,
    /// Static marker left where an asteroid blew up.
    Explosion,
}

impl ObjectKind {
    fn is_dynamic(self) -> bool { matches!(self, ObjectKind::Ball | ObjectKind::Asteroid) }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneObject {
    pub id:       ObjectId,
    pub kind:     ObjectKind,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Collision radius (circles) or half the smaller side (bricks).
    pub radius:   f32,
    /// Full extent, used for drawing and brick collision.
    pub size:     Vec2,
    /// Degrees.
    pub angle:    f32,
    /// Degrees per second.
    pub spin:     f32,
    pub age:      f32,
    pub lifetime: Option<f32>,
    pub health:   f32,
    /// 1.0 opaque, fades to 0.0 once a brick is destroyed.
    pub opacity:  f32,
    pub selected: bool,
}

impl SceneObject {
    fn new(id: ObjectId, kind: ObjectKind, position: Vec2, radius: f32) -> Self {
        SceneObject {
            id,
            kind,
            position,
            velocity: Vec2::ZERO,
            radius,
            size: Vec2::new(radius * 2.0, radius * 2.0),
            angle: 0.0,
            spin: 0.0,
            age: 0.0,
            lifetime: None,
            health: 0.0,
            opacity: 1.0,
            selected: false,
        }
    }

    fn is_destroyed_brick(&self) -> bool { self.kind == ObjectKind::Brick && self.health <= 0.0 }

    /// True when `p` lies on the object.
    pub fn contains(&self, p: Vec2) -> bool {
        match self.kind {
            ObjectKind::Brick => {
                (p.x - self.position.x).abs() <= self.size.x / 2.0
                    && (p.y - self.position.y).abs() <= self.size.y / 2.0
            }
            _ => p.distance(self.position) <= self.radius,
        }
    }
}

/// The circle indicator sprite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Indicator {
    pub position:         Vec2,
    pub radius:           f32,
    /// Degrees per second, negative is clockwise.
    pub angular_velocity: f32,
    pub angle:            f32,
}

// ════════════════════════════════════════════════════════════════════════════
// Contact helpers
// ════════════════════════════════════════════════════════════════════════════

/// Circle vs axis-aligned box: contact normal (box → circle) and depth.
fn circle_box_contact(c: Vec2, r: f32, center: Vec2, size: Vec2) -> Option<(Vec2, f32)> {
    let half = size * 0.5;
    let closest = Vec2::new(
        c.x.clamp(center.x - half.x, center.x + half.x),
        c.y.clamp(center.y - half.y, center.y + half.y),
    );
    let d = c - closest;
    let dist = d.length();
    if dist > r {
        return None;
    }
    if dist > 1e-6 {
        return Some((d * (1.0 / dist), r - dist));
    }
    // Centre inside the box: push out along the shallower axis.
    let dx = half.x - (c.x - center.x).abs();
    let dy = half.y - (c.y - center.y).abs();
    if dx < dy {
        Some((Vec2::new((c.x - center.x).signum(), 0.0), dx + r))
    } else {
        Some((Vec2::new(0.0, (c.y - center.y).signum()), dy + r))
    }
}

/// Reflect the normal component of `v` off a surface with normal `n`.
fn reflect(v: Vec2, n: Vec2, restitution: f32) -> Vec2 {
    let vn = v.dot(n);
    if vn < 0.0 { v - n * ((1.0 + restitution) * vn) } else { v }
}

// ════════════════════════════════════════════════════════════════════════════
// ToyScene
// ════════════════════════════════════════════════════════════════════════════

pub struct ToyScene {
    cfg:       SceneConfig,
    objects:   Vec<SceneObject>,
    next_id:   ObjectId,
    ball:      Option<ObjectId>,
    indicator: Option<Indicator>,
    held:      Option<ObjectId>,
    breakout:  bool,
}

impl ToyScene {
    pub fn new(cfg: SceneConfig) -> Self {
        let mut scene = ToyScene {
            cfg,
            objects:   Vec::new(),
            next_id:   0,
            ball:      None,
            indicator: None,
            held:      None,
            breakout:  false,
        };
        scene.reset();
        scene
    }

    /// Clear everything and rebuild the sandbox level: bounds, ground, ball.
    pub fn reset(&mut self) {
        self.objects.clear();
        self.indicator = None;
        self.held      = None;
        self.breakout  = false;
        let start = self.cfg.ball_start;
        self.ball = Some(self.spawn_ball(start));
        debug!("scene reset");
    }

    /// Rebuild as the breakout level: a wall of bricks and a damaging ball.
    pub fn start_breakout(&mut self) {
        self.reset();
        self.breakout = true;
        let start = self.cfg.breakout_ball_start;
        if let Some(ball) = self.ball.and_then(|id| self.object_mut(id)) {
            ball.position = start;
        }

        let size = self.cfg.brick_size;
        let rows = self.cfg.brick_rows;
        let x0 = -(rows as f32) * size.x;
        let y0 = 3.0 + size.y * 0.5 + 3.0;
        for row in 0..rows {
            let y = y0 + row as f32 * size.y;
            for col in 0..self.cfg.brick_columns {
                let x = x0 + col as f32 * size.x;
                self.spawn_object(ObjectKind::Brick, Vec2::new(x, y), Vec2::ZERO, None);
            }
        }
        debug!(rows, columns = self.cfg.brick_columns, "breakout level built");
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn config(&self)        -> &SceneConfig        { &self.cfg }
    pub fn objects(&self)       -> &[SceneObject]      { &self.objects }
    pub fn indicator(&self)     -> Option<&Indicator>  { self.indicator.as_ref() }
    pub fn held(&self)          -> Option<ObjectId>    { self.held }
    pub fn is_breakout(&self)   -> bool                { self.breakout }
    pub fn ball(&self)          -> Option<&SceneObject> { self.ball.and_then(|id| self.object(id)) }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn count(&self, kind: ObjectKind) -> usize {
        self.objects.iter().filter(|o| o.kind == kind).count()
    }

    pub fn selection(&self) -> Vec<ObjectId> {
        self.objects.iter().filter(|o| o.selected).map(|o| o.id).collect()
    }

    // ── object lifecycle ──────────────────────────────────────────────────

    pub fn spawn_object(
        &mut self,
        kind: ObjectKind,
        position: Vec2,
        velocity: Vec2,
        lifetime: Option<f32>,
    ) -> ObjectId {
        let id = self.next_id;
        self.next_id += 1;
        let radius = match kind {
            ObjectKind::Ball      => self.cfg.ball_radius,
            ObjectKind::Asteroid  => self.cfg.asteroid_size * 0.4,
            ObjectKind::Brick     => self.cfg.brick_size.x.min(self.cfg.brick_size.y) / 2.0,
            ObjectKind::Explosion => self.cfg.asteroid_size / 2.0,
        };
        let mut obj = SceneObject::new(id, kind, position, radius);
        obj.velocity = velocity;
        obj.lifetime = lifetime;
        match kind {
            ObjectKind::Asteroid => obj.size = Vec2::new(self.cfg.asteroid_size, self.cfg.asteroid_size),
            ObjectKind::Brick => {
                obj.size   = self.cfg.brick_size;
                obj.health = self.cfg.brick_health;
            }
            _ => {}
        }
        trace!(id, ?kind, ?position, "spawn");
        self.objects.push(obj);
        id
    }

    pub fn remove_object(&mut self, id: ObjectId) -> bool {
        let before = self.objects.len();
        self.objects.retain(|o| o.id != id);
        if self.held == Some(id) {
            self.held = None;
        }
        if self.ball == Some(id) {
            self.ball = None;
        }
        self.objects.len() != before
    }

    fn spawn_ball(&mut self, position: Vec2) -> ObjectId {
        self.spawn_object(ObjectKind::Ball, position, Vec2::ZERO, None)
    }

    /// Launch an asteroid along the swipe direction's XY projection.
    pub fn spawn_asteroid(&mut self, position: Vec2, direction: Vec3, speed: f32) -> ObjectId {
        let velocity = direction.xy() * speed;
        let lifetime = Some(self.cfg.asteroid_lifetime);
        let id = self.spawn_object(ObjectKind::Asteroid, position, velocity, lifetime);
        let max_spin = self.cfg.asteroid_max_spin;
        let spin = rand::thread_rng().gen_range(-max_spin..=max_spin);
        if let Some(a) = self.object_mut(id) {
            a.spin = spin;
        }
        debug!(id, ?position, ?velocity, "asteroid launched");
        id
    }

    fn explode(&mut self, id: ObjectId) {
        let Some(pos) = self.object(id).map(|o| o.position) else { return };
        self.remove_object(id);
        let lifetime = Some(self.cfg.explosion_lifetime);
        self.spawn_object(ObjectKind::Explosion, pos, Vec2::ZERO, lifetime);
        debug!(id, ?pos, "asteroid exploded");
    }

    // ── queries ───────────────────────────────────────────────────────────

    /// Everything solid whose centre lies inside the circle.
    pub fn objects_within_circle(&self, center: Vec2, radius: f32) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|o| o.kind != ObjectKind::Explosion && !o.is_destroyed_brick())
            .filter(|o| o.position.distance(center) <= radius)
            .map(|o| o.id)
            .collect()
    }

    /// Topmost solid object under `p`.
    pub fn object_at(&self, p: Vec2) -> Option<ObjectId> {
        self.objects
            .iter()
            .rev()
            .filter(|o| o.kind != ObjectKind::Explosion && !o.is_destroyed_brick())
            .find(|o| o.contains(p))
            .map(|o| o.id)
    }

    // ── indicator ─────────────────────────────────────────────────────────

    pub fn show_indicator(&mut self, position: Vec2, radius: f32, angular_velocity: f32) {
        self.indicator = Some(Indicator { position, radius, angular_velocity, angle: 0.0 });
    }

    pub fn resize_indicator(&mut self, radius: f32, angular_velocity: f32) {
        match self.indicator.as_mut() {
            Some(ind) => {
                ind.radius = radius;
                ind.angular_velocity = angular_velocity;
            }
            None => trace!("resize without a visible indicator"),
        }
    }

    pub fn hide_indicator(&mut self) { self.indicator = None; }

    // ── selection, picking ────────────────────────────────────────────────

    /// Replace the selection with everything inside the circle.
    pub fn select_in_circle(&mut self, center: Vec2, radius: f32) -> usize {
        let hits = self.objects_within_circle(center, radius);
        for o in &mut self.objects {
            o.selected = hits.contains(&o.id);
        }
        debug!(count = hits.len(), ?center, radius, "selection replaced");
        hits.len()
    }

    pub fn delete_selection(&mut self) -> usize {
        let doomed = self.selection();
        for id in &doomed {
            self.remove_object(*id);
        }
        debug!(count = doomed.len(), "selection deleted");
        doomed.len()
    }

    /// Start carrying the object under `p`. Bricks stay where they are.
    pub fn pick_at(&mut self, p: Vec2) -> Option<ObjectId> {
        let id = self.object_at(p)?;
        if self.object(id).map(|o| o.kind) == Some(ObjectKind::Brick) {
            return None;
        }
        self.held = Some(id);
        debug!(id, ?p, "picked");
        Some(id)
    }

    /// Move the carried object to `p`.
    pub fn drag_to(&mut self, p: Vec2) {
        if let Some(obj) = self.held.and_then(|id| self.object_mut(id)) {
            obj.position = p;
            obj.velocity = Vec2::ZERO;
        }
    }

    pub fn drop_held(&mut self) -> Option<ObjectId> {
        let id = self.held.take()?;
        debug!(id, "dropped");
        Some(id)
    }

    /// Pick the object under `p`, or drop the one already carried.
    pub fn primary_action(&mut self, p: Vec2) {
        if self.drop_held().is_none() {
            self.pick_at(p);
        }
    }

    pub fn accelerate_ball(&mut self, x: f32, y: f32) {
        let gain = self.cfg.tilt_gain;
        match self.ball.and_then(|id| self.object_mut(id)) {
            Some(ball) => ball.velocity = ball.velocity + Vec2::new(x, y) * gain,
            None       => trace!("no ball to accelerate"),
        }
    }

    // ── simulation ────────────────────────────────────────────────────────

    /// Advance the world by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.age(dt);
        self.integrate(dt);
        self.collide_ball();
        self.collide_asteroids();
        if let Some(ind) = self.indicator.as_mut() {
            ind.angle = (ind.angle + ind.angular_velocity * dt) % 360.0;
        }
    }

    fn age(&mut self, dt: f32) {
        let fade = dt / self.cfg.brick_fade_secs.max(1e-3);
        for o in &mut self.objects {
            o.age += dt;
            if o.is_destroyed_brick() {
                o.opacity -= fade;
            }
        }
        let expired: Vec<ObjectId> = self
            .objects
            .iter()
            .filter(|o| o.lifetime.is_some_and(|l| o.age >= l) || o.opacity <= 0.0)
            .map(|o| o.id)
            .collect();
        for id in expired {
            trace!(id, "expired");
            self.remove_object(id);
        }
    }

    fn integrate(&mut self, dt: f32) {
        let g = self.cfg.gravity;
        let held = self.held;
        for o in self.objects.iter_mut().filter(|o| o.kind.is_dynamic() && Some(o.id) != held) {
            o.velocity.y += g * dt;
            o.position = o.position + o.velocity * dt;
            o.angle += o.spin * dt;
        }
    }

    fn collide_ball(&mut self) {
        let Some(bi) = self.ball.and_then(|id| self.objects.iter().position(|o| o.id == id)) else {
            return;
        };
        let e = self.cfg.ball_restitution;
        let (left, right, ceiling, ground) = (self.cfg.left(), self.cfg.right(), self.cfg.ceiling(), self.cfg.ground_top);
        let mut ball = self.objects[bi];
        let r = ball.radius;

        if ball.position.x - r < left {
            ball.position.x = left + r;
            ball.velocity.x = -ball.velocity.x * e;
        } else if ball.position.x + r > right {
            ball.position.x = right - r;
            ball.velocity.x = -ball.velocity.x * e;
        }
        if ball.position.y + r > ceiling {
            ball.position.y = ceiling - r;
            ball.velocity.y = -ball.velocity.y * e;
        } else if ball.position.y - r < ground {
            ball.position.y = ground + r;
            ball.velocity.y = -ball.velocity.y * e;
        }

        for j in 0..self.objects.len() {
            let brick = self.objects[j];
            if brick.kind != ObjectKind::Brick || brick.is_destroyed_brick() {
                continue;
            }
            let Some((n, depth)) = circle_box_contact(ball.position, r, brick.position, brick.size) else {
                continue;
            };
            ball.position = ball.position + n * depth;
            ball.velocity = reflect(ball.velocity, n, e);
            if self.breakout {
                let b = &mut self.objects[j];
                b.health -= self.cfg.ball_damage;
                debug!(brick = b.id, health = b.health, "brick hit");
            }
        }

        if Some(ball.id) != self.held {
            self.objects[bi] = ball;
        }
    }

    fn collide_asteroids(&mut self) {
        let (left, right, ceiling, ground) = (self.cfg.left(), self.cfg.right(), self.cfg.ceiling(), self.cfg.ground_top);
        let solids: Vec<SceneObject> = self
            .objects
            .iter()
            .filter(|o| o.kind != ObjectKind::Explosion && !o.is_destroyed_brick())
            .copied()
            .collect();

        let mut doomed = Vec::new();
        for a in solids.iter().filter(|o| o.kind == ObjectKind::Asteroid) {
            let (p, r) = (a.position, a.radius);
            let out_of_bounds = p.x - r < left || p.x + r > right || p.y + r > ceiling || p.y - r < ground;
            let touching = solids.iter().filter(|o| o.id != a.id).any(|o| match o.kind {
                ObjectKind::Brick => circle_box_contact(p, r, o.position, o.size).is_some(),
                _                 => p.distance(o.position) <= r + o.radius,
            });
            if out_of_bounds || touching {
                doomed.push(a.id);
            }
        }
        for id in doomed {
            self.explode(id);
        }
    }
}

impl IntentSink for ToyScene {
    fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::ShowIndicator { position, radius, angular_velocity } => {
                self.show_indicator(position, radius, angular_velocity)
            }
            Intent::ResizeIndicator { radius, angular_velocity } => self.resize_indicator(radius, angular_velocity),
            Intent::HideIndicator                        => self.hide_indicator(),
            Intent::GrabObjectsInCircle { center, radius } => {
                self.select_in_circle(center, radius);
            }
            Intent::SpawnProjectile { position, direction, speed } => {
                self.spawn_asteroid(position, direction, speed);
            }
            Intent::TriggerPrimaryAction { position }   => self.primary_action(position),
            Intent::DeleteSelection                      => {
                self.delete_selection();
            }
            Intent::AccelerateBall { x, y }             => self.accelerate_ball(x, y),
            Intent::SetDeviceDrivesCursor(on)           => trace!(on, "cursor mode is not a scene concern"),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> ToyScene { ToyScene::new(SceneConfig::default()) }

    fn run(scene: &mut ToyScene, secs: f32) {
        let steps = (secs * 60.0) as usize;
        for _ in 0..steps {
            scene.step(1.0 / 60.0);
        }
    }

    #[test]
    fn reset_builds_sandbox_level() {
        let s = scene();
        assert_eq!(s.count(ObjectKind::Ball), 1);
        assert_eq!(s.objects().len(), 1);
        assert_eq!(s.ball().map(|b| b.position), Some(Vec2::new(5.0, 5.0)));
        assert!(s.indicator().is_none());
    }

    #[test]
    fn ball_falls_and_settles_above_ground() {
        let mut s = scene();
        run(&mut s, 5.0);
        let ball = s.ball().copied().unwrap();
        assert!(ball.position.y >= -9.0 + ball.radius - 1e-3);
        assert!(ball.position.y < 0.0);
    }

    #[test]
    fn tilt_accelerates_ball() {
        let mut s = scene();
        s.apply(Intent::AccelerateBall { x: 50.0, y: 0.0 });
        let v = s.ball().unwrap().velocity;
        assert!((v.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn ball_stays_inside_walls() {
        let mut s = scene();
        s.accelerate_ball(5000.0, 0.0);
        run(&mut s, 3.0);
        let ball = s.ball().unwrap();
        assert!(ball.position.x + ball.radius <= 20.0 + 1e-3);
    }

    #[test]
    fn indicator_follows_intents() {
        let mut s = scene();
        s.apply(Intent::ShowIndicator { position: Vec2::new(1.0, 2.0), radius: 3.0, angular_velocity: -180.0 });
        s.apply(Intent::ResizeIndicator { radius: 4.0, angular_velocity: 180.0 });
        let ind = *s.indicator().unwrap();
        assert_eq!(ind.position, Vec2::new(1.0, 2.0));
        assert_eq!(ind.radius, 4.0);
        s.step(0.5);
        assert!((s.indicator().unwrap().angle - 90.0).abs() < 1e-3);
        s.apply(Intent::HideIndicator);
        assert!(s.indicator().is_none());
    }

    #[test]
    fn swipe_spawns_moving_asteroid_with_lifetime() {
        let mut s = scene();
        let id = s.spawn_asteroid(Vec2::new(0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), 20.0);
        let a = *s.object(id).unwrap();
        assert_eq!(a.kind, ObjectKind::Asteroid);
        assert_eq!(a.velocity, Vec2::new(20.0, 0.0));
        assert!((a.radius - 1.2).abs() < 1e-6);
        assert_eq!(a.lifetime, Some(10.0));
        assert!(a.spin.abs() <= 90.0);
    }

    #[test]
    fn asteroid_explodes_on_wall() {
        let mut s = scene();
        let id = s.spawn_asteroid(Vec2::new(0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), 55.0);
        run(&mut s, 1.0);
        assert!(s.object(id).is_none());
        assert!(s.count(ObjectKind::Explosion) >= 1 || s.count(ObjectKind::Asteroid) == 0);
    }

    #[test]
    fn asteroid_explodes_on_ball() {
        let mut s = scene();
        let id = s.spawn_asteroid(Vec2::new(5.0, 7.0), Vec3::ZERO, 0.0);
        s.step(1.0 / 60.0);
        assert!(s.object(id).is_none());
        assert_eq!(s.count(ObjectKind::Explosion), 1);
    }

    #[test]
    fn explosion_marker_expires() {
        let mut s = scene();
        s.spawn_object(ObjectKind::Explosion, Vec2::ZERO, Vec2::ZERO, Some(0.6));
        run(&mut s, 1.0);
        assert_eq!(s.count(ObjectKind::Explosion), 0);
    }

    #[test]
    fn grab_then_delete_removes_only_selection() {
        let mut s = scene();
        let near = s.spawn_object(ObjectKind::Brick, Vec2::new(0.0, 0.0), Vec2::ZERO, None);
        let far  = s.spawn_object(ObjectKind::Brick, Vec2::new(-10.0, 0.0), Vec2::ZERO, None);
        s.apply(Intent::GrabObjectsInCircle { center: Vec2::new(1.0, 0.0), radius: 2.0 });
        assert_eq!(s.selection(), vec![near]);
        s.apply(Intent::DeleteSelection);
        assert!(s.object(near).is_none());
        assert!(s.object(far).is_some());
        assert!(s.ball().is_some());
    }

    #[test]
    fn new_grab_replaces_selection() {
        let mut s = scene();
        let a = s.spawn_object(ObjectKind::Brick, Vec2::new(0.0, 0.0), Vec2::ZERO, None);
        let b = s.spawn_object(ObjectKind::Brick, Vec2::new(-10.0, 0.0), Vec2::ZERO, None);
        s.select_in_circle(Vec2::new(0.0, 0.0), 1.0);
        s.select_in_circle(Vec2::new(-10.0, 0.0), 1.0);
        assert_eq!(s.selection(), vec![b]);
        assert!(!s.object(a).unwrap().selected);
    }

    #[test]
    fn primary_action_picks_then_drops() {
        let mut s = scene();
        let ball = s.ball().unwrap().id;
        s.apply(Intent::TriggerPrimaryAction { position: Vec2::new(5.2, 5.0) });
        assert_eq!(s.held(), Some(ball));
        s.drag_to(Vec2::new(-3.0, 2.0));
        run(&mut s, 0.5);
        assert_eq!(s.ball().unwrap().position, Vec2::new(-3.0, 2.0));
        s.apply(Intent::TriggerPrimaryAction { position: Vec2::ZERO });
        assert_eq!(s.held(), None);
    }

    #[test]
    fn primary_action_on_empty_space_does_nothing() {
        let mut s = scene();
        s.primary_action(Vec2::new(-15.0, 10.0));
        assert_eq!(s.held(), None);
    }

    #[test]
    fn breakout_builds_brick_wall() {
        let mut s = scene();
        s.start_breakout();
        assert!(s.is_breakout());
        assert_eq!(s.count(ObjectKind::Brick), 32);
        assert_eq!(s.ball().unwrap().position, Vec2::new(-5.0, -5.0));
        let lowest = s.objects().iter()
            .filter(|o| o.kind == ObjectKind::Brick)
            .map(|o| o.position.y)
            .fold(f32::INFINITY, f32::min);
        assert_eq!(lowest, 6.5);
    }

    #[test]
    fn ball_destroys_brick_in_two_hits() {
        let mut s = scene();
        s.start_breakout();
        s.objects.retain(|o| o.kind != ObjectKind::Brick);
        let brick = s.spawn_object(ObjectKind::Brick, Vec2::new(-5.0, -2.0), Vec2::ZERO, None);
        assert_eq!(s.object(brick).unwrap().health, 20.0);
        let ball = s.ball().unwrap().id;

        for expected in [10.0, 0.0] {
            if let Some(b) = s.object_mut(ball) {
                b.position = Vec2::new(-5.0, -4.0);
                b.velocity = Vec2::new(0.0, 20.0);
            }
            run(&mut s, 0.2);
            assert_eq!(s.object(brick).unwrap().health, expected);
        }
        run(&mut s, 1.0);
        assert!(s.object(brick).is_none(), "destroyed brick fades out");
    }

    #[test]
    fn bricks_outside_breakout_take_no_damage() {
        let mut s = scene();
        let brick = s.spawn_object(ObjectKind::Brick, Vec2::new(5.0, 2.0), Vec2::ZERO, None);
        run(&mut s, 1.0);
        assert_eq!(s.object(brick).unwrap().health, 20.0);
        assert!(s.ball().unwrap().position.y > 2.0);
    }

    #[test]
    fn reset_clears_everything() {
        let mut s = scene();
        s.start_breakout();
        s.show_indicator(Vec2::ZERO, 2.0, 180.0);
        s.reset();
        assert!(!s.is_breakout());
        assert_eq!(s.objects().len(), 1);
        assert!(s.indicator().is_none());
    }

    #[test]
    fn circle_box_contact_pushes_out_of_top() {
        let (n, depth) = circle_box_contact(Vec2::new(0.0, 1.2), 1.0, Vec2::ZERO, Vec2::new(2.0, 1.0)).unwrap();
        assert!(n.x.abs() < 1e-6 && (n.y - 1.0).abs() < 1e-6);
        assert!((depth - 0.3).abs() < 1e-5);
        assert!(circle_box_contact(Vec2::new(0.0, 3.0), 1.0, Vec2::ZERO, Vec2::new(2.0, 1.0)).is_none());
    }
}
