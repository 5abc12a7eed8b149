mod app;
mod collision;
mod config;
mod entity;
mod game;
mod geom;
mod input;
mod level;
mod logging;
mod motion;
mod player;
mod render;
mod sprite;
mod tags;
mod timed;
mod world;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "leapfrog")]
#[command(about = "Cross the road, ride the river, fill the five holes", long_about = None)]
pub(crate) struct Args {
    /// Directory holding 0.lvl, 1.lvl, ...
    #[arg(long)]
    levels: Option<PathBuf>,

    /// Level to start on (1-based).
    #[arg(long)]
    level: Option<u32>,

    #[arg(long)]
    lives: Option<u32>,

    /// RNG seed; 0 picks one from the clock.
    #[arg(long)]
    seed: Option<u64>,

    /// Render rate cap. The simulation runs at a fixed step regardless.
    #[arg(long)]
    fps: Option<u32>,

    #[arg(long)]
    theme: Option<String>,

    /// How candidate collision pairs are picked.
    #[arg(long, value_enum)]
    broad_phase: Option<collision::BroadPhaseKind>,

    /// Where to write the log instead of the data directory.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log at debug level.
    #[arg(long, short, default_value_t = false)]
    verbose: bool,

    /// Persist the effective settings for future runs.
    #[arg(long, default_value_t = false)]
    save_settings: bool,
}

impl Args {
    fn overrides(&self) -> config::Overrides {
        config::Overrides {
            levels_dir: self.levels.clone(),
            first_level: self.level,
            lives: self.lives,
            seed: self.seed,
            fps: self.fps,
            theme: self.theme.clone(),
            broad_phase: self.broad_phase,
            log_file: self.log_file.clone(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    app::run(Args::parse())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_become_overrides() {
        let args = Args::parse_from([
            "leapfrog", "--levels", "lv", "--lives", "5", "--seed", "9", "-v",
        ]);
        assert!(args.verbose);
        let o = args.overrides();
        assert_eq!(o.levels_dir, Some(PathBuf::from("lv")));
        assert_eq!(o.lives, Some(5));
        assert_eq!(o.seed, Some(9));
        assert_eq!(o.fps, None);
        assert_eq!(o.broad_phase, None);
    }

    #[test]
    fn broad_phase_flag_takes_kebab_case_names() {
        let args = Args::parse_from(["leapfrog", "--broad-phase", "sweep"]);
        assert_eq!(
            args.overrides().broad_phase,
            Some(collision::BroadPhaseKind::Sweep)
        );
        assert!(Args::try_parse_from(["leapfrog", "--broad-phase", "grid"]).is_err());
    }
}
