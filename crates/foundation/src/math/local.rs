use super::Vec2;

/// Origin-relative plan frame: maps already-projected map coordinates into
/// scene ground-plane units.
///
/// The origin is explicit so the mapping is deterministic regardless of
/// where the base coordinates came from. A non-finite origin propagates
/// NaN into every mapped position; callers treat that as "renders nothing",
/// not as an error.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LocalFrame {
    pub base: Vec2,
    pub scale: f64,
}

impl LocalFrame {
    pub fn new(base: Vec2, scale: f64) -> Self {
        Self { base, scale }
    }

    /// Scene ground-plane coordinates for a plan point: `x` maps to scene
    /// x, `y` maps to scene z. Height placement is the caller's concern.
    pub fn to_scene(&self, plan: Vec2) -> Vec2 {
        let offset = plan - self.base;
        Vec2::new(offset.x * self.scale, offset.y * self.scale)
    }
}
