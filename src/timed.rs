//! Entities whose state changes on a timetable. All timing is derived from
//! the frame deltas handed to `update`, so state only ever changes on the
//! simulation thread.

use crate::entity::{Contact, EntityId};
use crate::sprite::Sprite;
use crate::tags::Tag;
use rand::Rng;

const TURTLE_SURFACE_MS: u32 = 7000;
const TURTLE_SUBMERGED_MS: u32 = 2000;

const PICKUP_DELAY_SECS_MIN: u32 = 25;
const PICKUP_DELAY_SECS_MAX: u32 = 35;
const PICKUP_ACTIVE_MS: u32 = 14_000;
const PICKUP_STEP_MS: u32 = 2000;
const PICKUP_STEP_PX: f32 = 48.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TurtlePhase {
    Surfaced,
    Submerged,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct TurtleCycle {
    elapsed_ms: u32,
}

impl TurtleCycle {
    pub(crate) fn phase(&self) -> TurtlePhase {
        if self.elapsed_ms < TURTLE_SURFACE_MS {
            TurtlePhase::Surfaced
        } else {
            TurtlePhase::Submerged
        }
    }

    pub(crate) fn advance(&mut self, sprite: &mut Sprite, delta_ms: u32) -> TurtlePhase {
        let period = TURTLE_SURFACE_MS + TURTLE_SUBMERGED_MS;
        self.elapsed_ms = (self.elapsed_ms + delta_ms % period) % period;
        let phase = self.phase();
        match phase {
            TurtlePhase::Surfaced => {
                sprite.add_tag(Tag::Ride);
                sprite.remove_tag(Tag::Hazard);
            }
            TurtlePhase::Submerged => {
                sprite.remove_tag(Tag::Ride);
                sprite.add_tag(Tag::Hazard);
            }
        }
        phase
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum PickupState {
    Hidden {
        wait_ms: u32,
    },
    Riding {
        host: EntityId,
        offset: f32,
        moving_right: bool,
        active_left_ms: u32,
        step_acc_ms: u32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PickupChange {
    Appeared(EntityId),
    Expired,
}

/// The extra-life pickup: hidden for a random while, then riding a log for a
/// fixed time, hopping one tile at a time along it.
#[derive(Clone, Debug)]
pub(crate) struct Pickup {
    state: PickupState,
}

fn draw_delay_ms(rng: &mut impl Rng) -> u32 {
    rng.gen_range(PICKUP_DELAY_SECS_MIN..=PICKUP_DELAY_SECS_MAX) * 1000
}

impl Pickup {
    pub(crate) fn new(rng: &mut impl Rng) -> Self {
        Self {
            state: PickupState::Hidden {
                wait_ms: draw_delay_ms(rng),
            },
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        matches!(self.state, PickupState::Riding { .. })
    }

    pub(crate) fn deactivate(&mut self, rng: &mut impl Rng) {
        self.state = PickupState::Hidden {
            wait_ms: draw_delay_ms(rng),
        };
    }

    pub(crate) fn update(
        &mut self,
        sprite: &mut Sprite,
        delta_ms: u32,
        hosts: &[Contact],
        rng: &mut impl Rng,
    ) -> Option<PickupChange> {
        let mut change = None;
        match &mut self.state {
            PickupState::Hidden { wait_ms } => {
                if delta_ms < *wait_ms {
                    *wait_ms -= delta_ms;
                    return None;
                }
                if hosts.is_empty() {
                    log::debug!("extra life due but no log to ride; rescheduling");
                    self.deactivate(rng);
                    return None;
                }
                let host = hosts[rng.gen_range(0..hosts.len())].id;
                self.state = PickupState::Riding {
                    host,
                    offset: 0.0,
                    moving_right: true,
                    active_left_ms: PICKUP_ACTIVE_MS,
                    step_acc_ms: 0,
                };
                change = Some(PickupChange::Appeared(host));
            }
            PickupState::Riding {
                host,
                offset,
                moving_right,
                active_left_ms,
                step_acc_ms,
            } => {
                let host_width = hosts.iter().find(|c| c.id == *host).map(|c| c.width);
                match host_width {
                    Some(width) if delta_ms < *active_left_ms => {
                        *active_left_ms -= delta_ms;
                        *step_acc_ms += delta_ms;
                        let half = width / 2.0;
                        while *step_acc_ms >= PICKUP_STEP_MS {
                            *step_acc_ms -= PICKUP_STEP_MS;
                            let dir = if *moving_right { 1.0 } else { -1.0 };
                            if (*offset + PICKUP_STEP_PX * dir).abs() > half {
                                *moving_right = !*moving_right;
                            }
                            let dir = if *moving_right { 1.0 } else { -1.0 };
                            *offset += PICKUP_STEP_PX * dir;
                        }
                    }
                    _ => {
                        self.deactivate(rng);
                        return Some(PickupChange::Expired);
                    }
                }
            }
        }

        if let PickupState::Riding { host, offset, .. } = &self.state {
            if let Some(log) = hosts.iter().find(|c| c.id == *host) {
                sprite.set_position(log.x + *offset, log.y);
            }
        }
        change
    }
}

#[cfg(test)]
impl Pickup {
    pub(crate) fn state(&self) -> &PickupState {
        &self.state
    }

    pub(crate) fn host(&self) -> Option<EntityId> {
        match self.state {
            PickupState::Riding { host, .. } => Some(host),
            PickupState::Hidden { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::Motion;
    use crate::sprite::SpriteKind;
    use crate::tags::Tags;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn log_contact(id: usize, x: f32, y: f32) -> Contact {
        let s = Sprite::with_tags(SpriteKind::Log, x, y, &[Tag::Ride]);
        Contact::of(EntityId(id), &s, Motion::for_kind(SpriteKind::Log, true), false)
    }

    #[test]
    fn turtle_surfaces_then_submerges_on_schedule() {
        let mut s = Sprite::with_tags(SpriteKind::Turtle, 100.0, 240.0, &[Tag::Ride]);
        let mut cycle = TurtleCycle::default();
        assert_eq!(cycle.advance(&mut s, 6999), TurtlePhase::Surfaced);
        assert!(s.has_tag(Tag::Ride));
        assert_eq!(cycle.advance(&mut s, 1), TurtlePhase::Submerged);
        assert!(!s.has_tag(Tag::Ride));
        assert!(s.has_tag(Tag::Hazard));
        assert_eq!(cycle.advance(&mut s, 1999), TurtlePhase::Submerged);
        assert_eq!(cycle.advance(&mut s, 1), TurtlePhase::Surfaced);
        assert_eq!(s.tags(), Tags::of(&[Tag::Ride]));
    }

    #[test]
    fn turtle_cycle_repeats_indefinitely() {
        let mut s = Sprite::with_tags(SpriteKind::Turtle, 100.0, 240.0, &[Tag::Ride]);
        let mut cycle = TurtleCycle::default();
        let mut submerged_frames = 0;
        for _ in 0..(9000 * 5 / 100) {
            if cycle.advance(&mut s, 100) == TurtlePhase::Submerged {
                submerged_frames += 1;
            }
        }
        assert_eq!(submerged_frames, 5 * 20);
    }

    #[test]
    fn pickup_waits_for_its_delay() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut p = Pickup::new(&mut rng);
        let PickupState::Hidden { wait_ms } = *p.state() else {
            panic!("pickup should start hidden");
        };
        assert!((25_000..=35_000).contains(&wait_ms));
        assert_eq!(wait_ms % 1000, 0);

        let mut s = Sprite::with_tags(SpriteKind::ExtraLife, 0.0, 0.0, &[Tag::ExtraLife]);
        let hosts = [log_contact(3, 300.0, 192.0), log_contact(5, 700.0, 240.0)];
        assert_eq!(p.update(&mut s, wait_ms - 1, &hosts, &mut rng), None);
        assert!(!p.is_active());

        let change = p.update(&mut s, 1, &hosts, &mut rng);
        let host = p.host().expect("pickup should be riding");
        assert_eq!(change, Some(PickupChange::Appeared(host)));
        let log = hosts.iter().find(|c| c.id == host).unwrap();
        assert_eq!((s.x(), s.y()), (log.x, log.y));
    }

    #[test]
    fn pickup_oscillates_within_half_the_log() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut p = Pickup::new(&mut rng);
        let mut s = Sprite::with_tags(SpriteKind::ExtraLife, 0.0, 0.0, &[Tag::ExtraLife]);
        let hosts = [log_contact(0, 500.0, 144.0)];
        p.update(&mut s, 40_000, &hosts, &mut rng);
        assert!(p.is_active());

        let half = hosts[0].width / 2.0;
        let mut offsets = vec![];
        for _ in 0..6 {
            p.update(&mut s, PICKUP_STEP_MS, &hosts, &mut rng);
            let PickupState::Riding { offset, .. } = *p.state() else {
                panic!("expired too early");
            };
            assert!(offset.abs() <= half);
            assert_eq!(s.x(), 500.0 + offset);
            offsets.push(offset);
        }
        assert_eq!(offsets, vec![48.0, 96.0, 48.0, 0.0, -48.0, -96.0]);
    }

    #[test]
    fn pickup_follows_a_moving_host() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = Pickup::new(&mut rng);
        let mut s = Sprite::with_tags(SpriteKind::ExtraLife, 0.0, 0.0, &[Tag::ExtraLife]);
        p.update(&mut s, 40_000, &[log_contact(2, 100.0, 96.0)], &mut rng);
        p.update(&mut s, 16, &[log_contact(2, 101.6, 96.0)], &mut rng);
        assert_eq!((s.x(), s.y()), (101.6, 96.0));
    }

    #[test]
    fn pickup_expires_after_active_window() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut p = Pickup::new(&mut rng);
        let mut s = Sprite::with_tags(SpriteKind::ExtraLife, 0.0, 0.0, &[Tag::ExtraLife]);
        let hosts = [log_contact(0, 500.0, 144.0)];
        p.update(&mut s, 40_000, &hosts, &mut rng);
        assert_eq!(p.update(&mut s, PICKUP_ACTIVE_MS - 1, &hosts, &mut rng), None);
        assert!(p.is_active());
        assert_eq!(p.update(&mut s, 1, &hosts, &mut rng), Some(PickupChange::Expired));
        assert!(!p.is_active());
        assert!(matches!(p.state(), PickupState::Hidden { wait_ms } if *wait_ms >= 25_000));
    }

    #[test]
    fn pickup_without_logs_stays_hidden() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut p = Pickup::new(&mut rng);
        let mut s = Sprite::with_tags(SpriteKind::ExtraLife, 0.0, 0.0, &[Tag::ExtraLife]);
        assert_eq!(p.update(&mut s, 40_000, &[], &mut rng), None);
        assert!(!p.is_active());
    }
}
