use crate::geom::SCREEN_WIDTH;
use crate::sprite::{Sprite, SpriteKind};

pub(crate) const BIKE_TURN_LEFT_EDGE: f32 = 24.0;
pub(crate) const BIKE_TURN_RIGHT_EDGE: f32 = 1000.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Motion {
    pub(crate) speed: f32,
    pub(crate) moving_right: bool,
}

impl Motion {
    pub(crate) fn new(speed: f32, moving_right: bool) -> Self {
        Self {
            speed,
            moving_right,
        }
    }

    pub(crate) fn for_kind(kind: SpriteKind, moving_right: bool) -> Option<Self> {
        let speed = match kind {
            SpriteKind::Bus => 0.15,
            SpriteKind::Racecar => 0.5,
            SpriteKind::Bike => 0.2,
            SpriteKind::Bulldozer => 0.05,
            SpriteKind::Log => 0.1,
            SpriteKind::LongLog => 0.07,
            SpriteKind::Turtle => 0.085,
            _ => return None,
        };
        Some(Self::new(speed, moving_right))
    }

    fn sign(&self) -> f32 {
        if self.moving_right {
            1.0
        } else {
            -1.0
        }
    }

    pub(crate) fn displacement(&self, delta_ms: u32) -> f32 {
        self.speed * delta_ms as f32 * self.sign()
    }

    /// Move and, once fully off screen, re-enter from the side the object is
    /// travelling away from.
    pub(crate) fn advance_wrapping(&self, sprite: &mut Sprite, delta_ms: u32) {
        sprite.move_by(self.displacement(delta_ms), 0.0);
        if sprite.fully_off_screen() {
            let half = sprite.width() / 2.0;
            let x = if self.moving_right {
                -half
            } else {
                SCREEN_WIDTH + half
            };
            sprite.set_x(x);
        }
    }

    pub(crate) fn advance_patrol(&mut self, sprite: &mut Sprite, delta_ms: u32) {
        sprite.move_by(self.displacement(delta_ms), 0.0);
        if sprite.x() <= BIKE_TURN_LEFT_EDGE {
            self.moving_right = true;
        }
        if sprite.x() >= BIKE_TURN_RIGHT_EDGE {
            self.moving_right = false;
        }
    }
}
