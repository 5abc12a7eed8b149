use crate::collision::{AllPairs, BroadPhase};
use crate::entity::{Contact, Entity, EntityId, Event, Role, UpdateContext};
use crate::geom::BoundingBox;
use crate::input::Input;
use crate::level::Placement;
use crate::render::Canvas;
use crate::sprite::{Sprite, SpriteKind};
use rand::rngs::StdRng;

pub(crate) const HOLE_Y: f32 = 48.0;
/// Exclusive x ranges of the five goal holes, left to right.
pub(crate) const HOLE_X_RANGES: [(f32, f32); 5] = [
    (72.0, 168.0),
    (264.0, 360.0),
    (456.0, 552.0),
    (648.0, 744.0),
    (840.0, 936.0),
];
pub(crate) const PLAYER_START: (f32, f32) = (512.0, 720.0);

const LIFE_ICON_X: f32 = 24.0;
const LIFE_ICON_Y: f32 = 744.0;
const LIFE_ICON_SPACING: f32 = 32.0;

#[derive(Clone, Debug, Default)]
pub(crate) struct Holes {
    filled: [bool; HOLE_X_RANGES.len()],
}

impl Holes {
    pub(crate) fn is_filled(&self, i: usize) -> bool {
        self.filled.get(i).copied().unwrap_or(false)
    }

    pub(crate) fn fill(&mut self, i: usize) {
        if let Some(f) = self.filled.get_mut(i) {
            *f = true;
        }
    }

    pub(crate) fn all_filled(&self) -> bool {
        self.filled.iter().all(|f| *f)
    }

    pub(crate) fn filled_count(&self) -> usize {
        self.filled.iter().filter(|f| **f).count()
    }

    pub(crate) fn find(&self, x: f32) -> Option<usize> {
        HOLE_X_RANGES.iter().position(|&(lo, hi)| x > lo && x < hi)
    }

    pub(crate) fn marker_x(i: usize) -> Option<f32> {
        HOLE_X_RANGES.get(i).map(|&(lo, hi)| (lo + hi) / 2.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    Running,
    LevelCleared,
    GameOver,
}

pub(crate) struct World {
    entities: Vec<Entity>,
    player: EntityId,
    hosts: Vec<EntityId>,
    holes: Holes,
    lives: u32,
    life_icons: Vec<Sprite>,
    markers: Vec<Sprite>,
    rng: StdRng,
    broad_phase: Box<dyn BroadPhase>,
    reach: Vec<BoundingBox>,
    pairs: Vec<(usize, usize)>,
    outcome: Outcome,
}

impl World {
    /// Entities are stored in placement order, followed by the player and
    /// the extra-life pickup.
    pub(crate) fn new(placements: &[Placement], lives: u32, mut rng: StdRng) -> Self {
        let mut entities: Vec<Entity> = placements
            .iter()
            .enumerate()
            .map(|(i, p)| Entity::from_level(EntityId(i), p.kind, p.x, p.y, p.moving_right))
            .collect();
        let hosts = entities
            .iter()
            .filter(|e| e.sprite.kind().is_log())
            .map(|e| e.id)
            .collect();

        let player = EntityId(entities.len());
        entities.push(Entity::player(player, PLAYER_START.0, PLAYER_START.1));
        let pickup = EntityId(entities.len());
        entities.push(Entity::pickup(pickup, &mut rng));

        let life_icons = (0..lives).map(|i| life_icon(i as usize)).collect();

        Self {
            entities,
            player,
            hosts,
            holes: Holes::default(),
            lives,
            life_icons,
            markers: Vec::new(),
            rng,
            broad_phase: Box::new(AllPairs),
            reach: Vec::new(),
            pairs: Vec::new(),
            outcome: Outcome::Running,
        }
    }

    pub(crate) fn with_broad_phase(mut self, broad_phase: Box<dyn BroadPhase>) -> Self {
        self.broad_phase = broad_phase;
        self
    }

    pub(crate) fn lives(&self) -> u32 {
        self.lives
    }

    pub(crate) fn holes(&self) -> &Holes {
        &self.holes
    }

    pub(crate) fn entity_count(&self) -> usize {
        self.entities.len()
    }

    fn contact(&self, id: Option<EntityId>) -> Option<Contact> {
        id.and_then(|id| self.entities.get(id.0)).map(Entity::contact)
    }

    /// Advance one frame: update every entity in order, run the collision
    /// pass, then check for a cleared level. Does nothing once the world has
    /// reached a terminal outcome.
    pub(crate) fn update(&mut self, input: Input, delta_ms: u32) -> Outcome {
        if self.outcome != Outcome::Running {
            return self.outcome;
        }

        for i in 0..self.entities.len() {
            let refs = self.entities[i].references();
            let hosts: Vec<Contact> = if refs.wants_hosts {
                self.hosts.iter().filter_map(|id| self.contact(Some(*id))).collect()
            } else {
                Vec::new()
            };
            let ctx = UpdateContext {
                input,
                delta_ms,
                ride: self.contact(refs.ride),
                pusher: self.contact(refs.pusher),
                solids: refs.solids.map(|s| self.contact(s)),
                hosts: &hosts,
                holes: &self.holes,
            };
            let event = self.entities[i].update(&ctx, &mut self.rng);
            if let Some(event) = event {
                self.apply(event);
            }
            if self.outcome != Outcome::Running {
                return self.outcome;
            }
        }

        self.collide();
        if self.outcome == Outcome::Running && self.holes.all_filled() {
            log::info!("all holes filled");
            self.outcome = Outcome::LevelCleared;
        }
        self.outcome
    }

    fn collide(&mut self) {
        self.reach.clear();
        self.reach.extend(self.entities.iter().map(Entity::reach));
        let mut pairs = std::mem::take(&mut self.pairs);
        self.broad_phase.pairs(&self.reach, &mut pairs);

        'pairs: for &(i, j) in &pairs {
            let other = self.entities[j].contact();
            if !self.entities[i].collides(&other) {
                continue;
            }
            let ride = self.entities[i]
                .as_player()
                .and_then(|p| self.contact(p.ride()));
            for event in self.entities[i].on_collision(&other, ride.as_ref()) {
                self.apply(event);
                if self.outcome != Outcome::Running {
                    break 'pairs;
                }
            }
        }
        self.pairs = pairs;
    }

    fn apply(&mut self, event: Event) {
        if self.outcome != Outcome::Running {
            return;
        }
        match event {
            Event::LifeLost => self.lose_life(),
            Event::HoleReached(i) => {
                self.holes.fill(i);
                if let Some(x) = Holes::marker_x(i) {
                    self.markers.push(Sprite::new(SpriteKind::Frog, x, HOLE_Y));
                }
                log::info!(
                    "hole {} filled ({}/{})",
                    i,
                    self.holes.filled_count(),
                    HOLE_X_RANGES.len()
                );
                self.respawn_player();
            }
            Event::PickupTaken(id) => {
                let pickup = self.entities.get_mut(id.0).and_then(Entity::as_pickup_mut);
                let Some(pickup) = pickup else {
                    return;
                };
                if !pickup.is_active() {
                    return;
                }
                pickup.deactivate(&mut self.rng);
                self.gain_life();
            }
        }
    }

    fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            log::info!("last life lost");
            self.outcome = Outcome::GameOver;
            return;
        }
        self.life_icons.pop();
        log::info!("life lost, {} left", self.lives);
        self.respawn_player();
    }

    fn gain_life(&mut self) {
        self.lives += 1;
        self.life_icons.push(life_icon(self.life_icons.len()));
        log::info!("extra life collected, {} lives", self.lives);
    }

    fn respawn_player(&mut self) {
        self.place_player(PLAYER_START.0, PLAYER_START.1);
    }

    pub(crate) fn place_player(&mut self, x: f32, y: f32) {
        if let Some(Entity {
            sprite,
            role: Role::Player(p),
            ..
        }) = self.entities.get_mut(self.player.0)
        {
            p.respawn(sprite, x, y);
        }
    }

    /// Draw visible entities in list order; life icons and hole markers go
    /// right after the player so they sit above the terrain.
    pub(crate) fn render(&self, canvas: &mut impl Canvas) {
        for e in &self.entities {
            if !e.is_visible() {
                continue;
            }
            canvas.draw(&e.sprite);
            if e.id == self.player {
                for s in self.life_icons.iter().chain(&self.markers) {
                    canvas.draw(s);
                }
            }
        }
    }
}

#[cfg(test)]
impl World {
    pub(crate) fn hole_status(&self, i: usize) -> bool {
        self.holes.is_filled(i)
    }

    pub(crate) fn player_sprite(&self) -> &Sprite {
        &self.entities[self.player.0].sprite
    }
}

fn life_icon(i: usize) -> Sprite {
    Sprite::new(
        SpriteKind::LifeIcon,
        LIFE_ICON_X + i as f32 * LIFE_ICON_SPACING,
        LIFE_ICON_Y,
    )
}
