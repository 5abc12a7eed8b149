use crate::entity::{Contact, EntityId, Event, UpdateContext};
use crate::geom::{BoundingBox, SCREEN_WIDTH};
use crate::input::Direction;
use crate::sprite::Sprite;
use crate::tags::Tag;
use crate::world::{Holes, HOLE_Y};

/// The frog. Besides its own box it keeps one probe box a tile beyond each
/// edge, used to notice solid obstacles before stepping into them.
#[derive(Clone, Debug)]
pub(crate) struct Player {
    probes: [BoundingBox; 4],
    solids: [Option<EntityId>; 4],
    ride: Option<EntityId>,
    pusher: Option<EntityId>,
}

impl Player {
    pub(crate) fn new(sprite: &Sprite) -> Self {
        let mut p = Self {
            probes: [BoundingBox::new(0.0, 0.0, sprite.width(), sprite.height()); 4],
            solids: [None; 4],
            ride: None,
            pusher: None,
        };
        p.refresh_probes(sprite);
        p
    }

    pub(crate) fn ride(&self) -> Option<EntityId> {
        self.ride
    }

    pub(crate) fn pusher(&self) -> Option<EntityId> {
        self.pusher
    }

    pub(crate) fn solid_neighbours(&self) -> [Option<EntityId>; 4] {
        self.solids
    }

    fn refresh_probes(&mut self, sprite: &Sprite) {
        for dir in Direction::ALL {
            let (ox, oy) = dir.offset();
            self.probes[dir.index()].set_center(
                sprite.x() + ox * sprite.width(),
                sprite.y() + oy * sprite.height(),
            );
        }
    }

    pub(crate) fn respawn(&mut self, sprite: &mut Sprite, x: f32, y: f32) {
        self.ride = None;
        self.pusher = None;
        self.solids = [None; 4];
        sprite.set_position(x, y);
        self.refresh_probes(sprite);
    }

    /// Record `other` as the solid neighbour for every probe it overlaps. A
    /// probe keeps the first neighbour it saw until that one moves away.
    pub(crate) fn observe(&mut self, other: &Contact) {
        if !other.tags.has(Tag::Solid) {
            return;
        }
        for dir in Direction::ALL {
            let slot = &mut self.solids[dir.index()];
            if slot.is_none() && self.probes[dir.index()].intersects(&other.bounds) {
                *slot = Some(other.id);
            }
        }
    }

    fn free_directions(&mut self, ctx: &UpdateContext<'_>) -> [bool; 4] {
        let mut free = [true; 4];
        for dir in Direction::ALL {
            let i = dir.index();
            let blocked = self.solids[i].is_some()
                && ctx.solids[i].is_some_and(|c| self.probes[i].intersects(&c.bounds));
            if blocked {
                free[i] = false;
            } else {
                self.solids[i] = None;
            }
        }
        free
    }

    pub(crate) fn update(&mut self, sprite: &mut Sprite, ctx: &UpdateContext<'_>) -> Option<Event> {
        let free = self.free_directions(ctx);

        let (mut dx, mut dy) = (0.0, 0.0);
        for dir in Direction::ALL {
            if ctx.input.pressed(dir) && free[dir.index()] {
                let (ox, oy) = dir.offset();
                dx += ox * sprite.width();
                dy += oy * sprite.height();
            }
        }

        // carried along by whatever we stand on, but never off the screen
        match ctx.ride.filter(|r| sprite.collides(Some(&r.bounds))) {
            Some(ride) => {
                sprite.move_by(ride.displacement(ctx.delta_ms), 0.0);
                if !sprite.on_screen_x(sprite.x()) {
                    let half = sprite.width() / 2.0;
                    let moving_right = ride.motion.is_some_and(|m| m.moving_right);
                    sprite.set_x(if moving_right { SCREEN_WIDTH - half } else { half });
                }
            }
            None => self.ride = None,
        }

        // solids push, and pushing us off the screen costs a life
        match ctx.pusher.filter(|p| sprite.collides(Some(&p.bounds))) {
            Some(pusher) => {
                sprite.move_by(pusher.displacement(ctx.delta_ms), 0.0);
                if !sprite.on_screen_x(sprite.x()) {
                    return Some(Event::LifeLost);
                }
            }
            None => self.pusher = None,
        }

        if !sprite.on_screen_x(sprite.x() + dx) {
            dx = 0.0;
        }
        if !sprite.on_screen_y(sprite.y() + dy) {
            dy = 0.0;
        }
        sprite.move_by(dx, dy);

        let arrival = Self::arrival(sprite, ctx.holes);
        self.refresh_probes(sprite);
        arrival
    }

    fn arrival(sprite: &Sprite, holes: &Holes) -> Option<Event> {
        if (sprite.y() - HOLE_Y).abs() > f32::EPSILON {
            return None;
        }
        match holes.find(sprite.x()) {
            Some(i) if !holes.is_filled(i) => Some(Event::HoleReached(i)),
            _ => Some(Event::LifeLost),
        }
    }

    /// Tag-driven reactions to touching `other`; each tag is checked on its
    /// own so one contact can trigger several reactions.
    pub(crate) fn on_collision(&mut self, other: &Contact, ride: Option<&Contact>) -> Vec<Event> {
        let mut events = Vec::new();
        if other.tags.has(Tag::Ride) {
            self.ride = Some(other.id);
        }
        if other.tags.has(Tag::Hazard) {
            let riding = match self.ride {
                Some(id) if id == other.id => other.tags.has(Tag::Ride),
                Some(_) => ride.is_some_and(|r| r.tags.has(Tag::Ride)),
                None => false,
            };
            if !riding {
                events.push(Event::LifeLost);
            }
        }
        if other.tags.has(Tag::ExtraLife) && other.pickup_active {
            events.push(Event::PickupTaken(other.id));
        }
        if other.tags.has(Tag::Solid) {
            self.pusher = Some(other.id);
        }
        events
    }
}

#[cfg(test)]
impl Player {
    pub(crate) fn probe(&self, dir: Direction) -> &BoundingBox {
        &self.probes[dir.index()]
    }
}
