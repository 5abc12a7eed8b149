use crate::geom::BoundingBox;
use crate::input::Input;
use crate::motion::Motion;
use crate::player::Player;
use crate::sprite::{Sprite, SpriteKind};
use crate::tags::{Tag, Tags};
use crate::timed::{Pickup, PickupChange, TurtleCycle, TurtlePhase};
use crate::world::Holes;
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct EntityId(pub(crate) usize);

/// Read-only snapshot of another entity, taken right before it is needed so
/// reactions never hold a borrow into the entity store.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Contact {
    pub(crate) id: EntityId,
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) width: f32,
    pub(crate) bounds: BoundingBox,
    pub(crate) tags: Tags,
    pub(crate) motion: Option<Motion>,
    pub(crate) pickup_active: bool,
}

impl Contact {
    pub(crate) fn of(
        id: EntityId,
        sprite: &Sprite,
        motion: Option<Motion>,
        pickup_active: bool,
    ) -> Self {
        Self {
            id,
            x: sprite.x(),
            y: sprite.y(),
            width: sprite.width(),
            bounds: *sprite.bounds(),
            tags: sprite.tags(),
            motion,
            pickup_active,
        }
    }

    pub(crate) fn displacement(&self, delta_ms: u32) -> f32 {
        self.motion.map_or(0.0, |m| m.displacement(delta_ms))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Event {
    LifeLost,
    HoleReached(usize),
    PickupTaken(EntityId),
}

pub(crate) struct UpdateContext<'a> {
    pub(crate) input: Input,
    pub(crate) delta_ms: u32,
    pub(crate) ride: Option<Contact>,
    pub(crate) pusher: Option<Contact>,
    pub(crate) solids: [Option<Contact>; 4],
    pub(crate) hosts: &'a [Contact],
    pub(crate) holes: &'a Holes,
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct References {
    pub(crate) ride: Option<EntityId>,
    pub(crate) pusher: Option<EntityId>,
    pub(crate) solids: [Option<EntityId>; 4],
    pub(crate) wants_hosts: bool,
}

#[derive(Clone, Debug)]
pub(crate) enum Role {
    /// Static terrain. A hazard tile covered by something rideable stops
    /// being a hazard until the ride moves off it.
    Tile { masked_by: Option<EntityId> },
    Traffic(Motion),
    Patrol(Motion),
    Turtle { motion: Motion, cycle: TurtleCycle },
    Pickup(Pickup),
    Player(Box<Player>),
}

#[derive(Clone, Debug)]
pub(crate) struct Entity {
    pub(crate) id: EntityId,
    pub(crate) sprite: Sprite,
    pub(crate) role: Role,
}

impl Entity {
    pub(crate) fn from_level(
        id: EntityId,
        kind: SpriteKind,
        x: f32,
        y: f32,
        moving_right: bool,
    ) -> Self {
        let (tags, role) = match (kind, Motion::for_kind(kind, moving_right)) {
            (SpriteKind::Water, _) => (Tags::of(&[Tag::Hazard]), Role::Tile { masked_by: None }),
            (SpriteKind::Tree, _) => (Tags::of(&[Tag::Solid]), Role::Tile { masked_by: None }),
            (SpriteKind::Bulldozer, Some(m)) => (Tags::of(&[Tag::Solid]), Role::Traffic(m)),
            (SpriteKind::Bike, Some(m)) => (Tags::of(&[Tag::Hazard]), Role::Patrol(m)),
            (SpriteKind::Bus | SpriteKind::Racecar, Some(m)) => {
                (Tags::of(&[Tag::Hazard]), Role::Traffic(m))
            }
            (SpriteKind::Log | SpriteKind::LongLog, Some(m)) => {
                (Tags::of(&[Tag::Ride]), Role::Traffic(m))
            }
            (SpriteKind::Turtle, Some(motion)) => (
                Tags::of(&[Tag::Ride]),
                Role::Turtle {
                    motion,
                    cycle: TurtleCycle::default(),
                },
            ),
            _ => (Tags::NONE, Role::Tile { masked_by: None }),
        };
        Self {
            id,
            sprite: Sprite::tagged(kind, x, y, tags),
            role,
        }
    }

    pub(crate) fn player(id: EntityId, x: f32, y: f32) -> Self {
        let sprite = Sprite::new(SpriteKind::Frog, x, y);
        let player = Player::new(&sprite);
        Self {
            id,
            sprite,
            role: Role::Player(Box::new(player)),
        }
    }

    pub(crate) fn pickup(id: EntityId, rng: &mut impl Rng) -> Self {
        Self {
            id,
            sprite: Sprite::with_tags(SpriteKind::ExtraLife, 0.0, 0.0, &[Tag::ExtraLife]),
            role: Role::Pickup(Pickup::new(rng)),
        }
    }

    pub(crate) fn motion(&self) -> Option<Motion> {
        match &self.role {
            Role::Traffic(m) | Role::Patrol(m) => Some(*m),
            Role::Turtle { motion, .. } => Some(*motion),
            _ => None,
        }
    }

    pub(crate) fn contact(&self) -> Contact {
        let active = matches!(&self.role, Role::Pickup(p) if p.is_active());
        Contact::of(self.id, &self.sprite, self.motion(), active)
    }

    pub(crate) fn as_player(&self) -> Option<&Player> {
        match &self.role {
            Role::Player(p) => Some(&**p),
            _ => None,
        }
    }

    pub(crate) fn as_pickup_mut(&mut self) -> Option<&mut Pickup> {
        match &mut self.role {
            Role::Pickup(p) => Some(p),
            _ => None,
        }
    }

    pub(crate) fn is_visible(&self) -> bool {
        match &self.role {
            Role::Turtle { cycle, .. } => cycle.phase() == TurtlePhase::Surfaced,
            Role::Pickup(p) => p.is_active(),
            _ => true,
        }
    }

    pub(crate) fn reach(&self) -> BoundingBox {
        match &self.role {
            Role::Player(_) => self
                .sprite
                .bounds()
                .inflated(self.sprite.width(), self.sprite.height()),
            _ => *self.sprite.bounds(),
        }
    }

    pub(crate) fn references(&self) -> References {
        match &self.role {
            Role::Tile { masked_by } => References {
                ride: *masked_by,
                ..References::default()
            },
            Role::Player(p) => References {
                ride: p.ride(),
                pusher: p.pusher(),
                solids: p.solid_neighbours(),
                wants_hosts: false,
            },
            Role::Pickup(_) => References {
                wants_hosts: true,
                ..References::default()
            },
            _ => References::default(),
        }
    }

    pub(crate) fn update(&mut self, ctx: &UpdateContext<'_>, rng: &mut impl Rng) -> Option<Event> {
        match &mut self.role {
            Role::Tile { masked_by } => {
                if masked_by.is_some() {
                    let still_covered = ctx.ride.is_some_and(|r| {
                        r.tags.has(Tag::Ride) && self.sprite.collides(Some(&r.bounds))
                    });
                    if !still_covered {
                        self.sprite.add_tag(Tag::Hazard);
                        *masked_by = None;
                    }
                }
                None
            }
            Role::Traffic(m) => {
                m.advance_wrapping(&mut self.sprite, ctx.delta_ms);
                None
            }
            Role::Patrol(m) => {
                m.advance_patrol(&mut self.sprite, ctx.delta_ms);
                None
            }
            Role::Turtle { motion, cycle } => {
                motion.advance_wrapping(&mut self.sprite, ctx.delta_ms);
                cycle.advance(&mut self.sprite, ctx.delta_ms);
                None
            }
            Role::Pickup(p) => {
                match p.update(&mut self.sprite, ctx.delta_ms, ctx.hosts, rng) {
                    Some(PickupChange::Appeared(host)) => {
                        log::info!("extra life appeared on entity {}", host.0);
                    }
                    Some(PickupChange::Expired) => log::debug!("extra life expired"),
                    None => {}
                }
                None
            }
            Role::Player(p) => p.update(&mut self.sprite, ctx),
        }
    }

    pub(crate) fn collides(&mut self, other: &Contact) -> bool {
        if let Role::Player(p) = &mut self.role {
            p.observe(other);
        }
        self.sprite.collides(Some(&other.bounds))
    }

    /// React to touching `other`. `ride` is the current state of whatever the
    /// player was riding before this call, if anything.
    pub(crate) fn on_collision(&mut self, other: &Contact, ride: Option<&Contact>) -> Vec<Event> {
        match &mut self.role {
            Role::Player(p) => p.on_collision(other, ride),
            Role::Tile { masked_by } => {
                if self.sprite.has_tag(Tag::Hazard) && other.tags.has(Tag::Ride) {
                    self.sprite.remove_tag(Tag::Hazard);
                    *masked_by = Some(other.id);
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }
}
