use crate::collision::BroadPhaseKind;
use crate::input::Input;
use crate::level::LevelSet;
use crate::world::{Outcome, World};
use anyhow::Context;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SessionStatus {
    Playing,
    GameOver,
    Finished,
}

pub(crate) struct Session {
    levels: LevelSet,
    broad_phase: BroadPhaseKind,
    level: u32,
    world: World,
    rng: StdRng,
    status: SessionStatus,
}

impl Session {
    pub(crate) fn start(
        levels: LevelSet,
        broad_phase: BroadPhaseKind,
        first_level: u32,
        lives: u32,
        seed: u64,
    ) -> anyhow::Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let level = first_level.max(1);
        let world = build_world(&levels, broad_phase, level, lives.max(1), &mut rng)
            .with_context(|| format!("starting level {level}"))?;
        Ok(Self {
            levels,
            broad_phase,
            level,
            world,
            rng,
            status: SessionStatus::Playing,
        })
    }

    pub(crate) fn level(&self) -> u32 {
        self.level
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Advance one frame. Once the session has ended further calls change
    /// nothing.
    pub(crate) fn update(&mut self, input: Input, delta_ms: u32) -> anyhow::Result<SessionStatus> {
        if self.status != SessionStatus::Playing {
            return Ok(self.status);
        }
        match self.world.update(input, delta_ms) {
            Outcome::Running => {}
            Outcome::GameOver => {
                log::info!("game over on level {}", self.level);
                self.status = SessionStatus::GameOver;
            }
            Outcome::LevelCleared => self.advance()?,
        }
        Ok(self.status)
    }

    fn advance(&mut self) -> anyhow::Result<()> {
        let next = self.level + 1;
        if !self.levels.exists(next) {
            log::info!("level {} cleared, no more levels", self.level);
            self.status = SessionStatus::Finished;
            return Ok(());
        }
        log::info!("level {} cleared, loading level {next}", self.level);
        self.world = build_world(
            &self.levels,
            self.broad_phase,
            next,
            self.world.lives(),
            &mut self.rng,
        )
            .with_context(|| format!("loading level {next}"))?;
        self.level = next;
        log::debug!("level {next} has {} entities", self.world.entity_count());
        Ok(())
    }
}

fn build_world(
    levels: &LevelSet,
    broad_phase: BroadPhaseKind,
    level: u32,
    lives: u32,
    rng: &mut StdRng,
) -> anyhow::Result<World> {
    let data = levels.load(level)?;
    if data.placements.is_empty() {
        log::warn!("level {level} has no entities");
    }
    let world = World::new(&data.placements, lives, StdRng::seed_from_u64(rng.gen()));
    Ok(world.with_broad_phase(broad_phase.build()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn levels(files: &[&str]) -> (TempDir, LevelSet) {
        let dir = tempdir().unwrap();
        for (i, text) in files.iter().enumerate() {
            fs::write(dir.path().join(format!("{i}.lvl")), text).unwrap();
        }
        let set = LevelSet::new(dir.path());
        (dir, set)
    }

    fn clear_level(session: &mut Session) -> SessionStatus {
        let mut status = SessionStatus::Playing;
        for (lo, hi) in crate::world::HOLE_X_RANGES {
            session.world.place_player((lo + hi) / 2.0, 96.0);
            status = session
                .update(
                    Input {
                        up: true,
                        ..Input::default()
                    },
                    16,
                )
                .unwrap();
        }
        status
    }

    #[test]
    fn missing_first_level_is_an_error() {
        let (_dir, set) = levels(&[]);
        let err = Session::start(set, BroadPhaseKind::AllPairs, 1, 3, 1).err().unwrap();
        assert!(format!("{err:#}").contains("starting level 1"));
    }

    #[test]
    fn clearing_a_level_loads_the_next_and_keeps_lives() {
        let (_dir, set) = levels(&["grass,24,720\n", "grass,24,720\ngrass,72,720\n"]);
        let mut s = Session::start(set, BroadPhaseKind::AllPairs, 1, 3, 9).unwrap();
        assert_eq!(s.world().entity_count(), 3);

        // lose one life on the bank between two holes
        s.world.place_player(216.0, 96.0);
        s.update(
            Input {
                up: true,
                ..Input::default()
            },
            16,
        )
        .unwrap();
        assert_eq!(s.world().lives(), 2);

        assert_eq!(clear_level(&mut s), SessionStatus::Playing);
        assert_eq!(s.level(), 2);
        assert_eq!(s.world().entity_count(), 4);
        assert_eq!(s.world().lives(), 2);
        assert!(!s.world().hole_status(0));
    }

    #[test]
    fn clearing_the_last_level_finishes() {
        let (_dir, set) = levels(&["grass,24,720\n"]);
        let mut s = Session::start(set, BroadPhaseKind::AllPairs, 1, 3, 2).unwrap();
        assert_eq!(clear_level(&mut s), SessionStatus::Finished);
        assert_eq!(s.update(Input::default(), 16).unwrap(), SessionStatus::Finished);
        assert_eq!(s.level(), 1);
    }

    #[test]
    fn running_out_of_lives_ends_the_session() {
        let (_dir, set) = levels(&["water,512,336\n"]);
        let mut s = Session::start(set, BroadPhaseKind::AllPairs, 1, 1, 4).unwrap();
        s.world.place_player(512.0, 336.0);
        assert_eq!(s.update(Input::default(), 16).unwrap(), SessionStatus::GameOver);
        assert_eq!(s.status, SessionStatus::GameOver);
    }

    #[test]
    fn sweep_sessions_carry_across_levels() {
        let (_dir, set) = levels(&["grass,24,720\n", "grass,24,720\n"]);
        let mut s = Session::start(set, BroadPhaseKind::Sweep, 1, 3, 5).unwrap();
        assert_eq!(clear_level(&mut s), SessionStatus::Playing);
        assert_eq!(s.level(), 2);
        assert_eq!(clear_level(&mut s), SessionStatus::Finished);
    }

    #[test]
    fn starting_level_can_be_chosen() {
        let (_dir, set) = levels(&["grass,24,720\n", "tree,48,48\n"]);
        let s = Session::start(set, BroadPhaseKind::AllPairs, 2, 3, 0).unwrap();
        assert_eq!(s.level(), 2);
    }
}
