use crate::config::{load_settings, project_paths, save_settings_atomic, Settings};
use crate::game::{Session, SessionStatus};
use crate::input::{collect_input_nonblocking, Command, Input};
use crate::level::LevelSet;
use crate::logging;
use crate::render::{
    fit_view, theme_index, themes, TermCanvas, Terminal, FOOTER_ROWS, HUD_ROWS, PLAY_COLS,
    PLAY_ROWS,
};
use crate::world::HOLE_X_RANGES;
use crate::Args;
use anyhow::Context;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

const SIM_STEP_MS: u32 = 16;
// clamp if the process was suspended or the terminal stalled
const MAX_FRAME: Duration = Duration::from_millis(250);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Ending {
    Quit,
    GameOver,
    Finished,
}

pub(crate) struct App {
    settings: Settings,
    session: Session,
    term: Terminal,
    theme_idx: usize,
    paused: bool,
}

impl App {
    fn init(settings: Settings, session: Session) -> anyhow::Result<Self> {
        let theme_idx = theme_index(&settings.theme);
        let term = Terminal::begin()?;
        Ok(Self {
            settings,
            session,
            term,
            theme_idx,
            paused: false,
        })
    }

    fn run(&mut self) -> anyhow::Result<Ending> {
        let fps = self.settings.fps_cap.clamp(10, 240);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);
        let sim_step = Duration::from_millis(SIM_STEP_MS as u64);

        let mut last = Instant::now();
        let mut acc = Duration::ZERO;
        let mut pending = Input::default();

        loop {
            let frame_start = Instant::now();
            self.term.resize_if_needed()?;

            let frame = collect_input_nonblocking()?;
            for c in &frame.commands {
                match c {
                    Command::Quit => {
                        log::info!("quit on level {}", self.session.level());
                        return Ok(Ending::Quit);
                    }
                    Command::Pause => self.paused = !self.paused,
                    Command::Theme => self.theme_idx = self.theme_idx.wrapping_add(1),
                }
            }

            let now = Instant::now();
            let dt = now.saturating_duration_since(last).min(MAX_FRAME);
            last = now;

            if self.paused {
                pending = Input::default();
            } else {
                pending.merge(frame.input);
                acc += dt;
            }

            // presses go to the first step that runs after them
            while acc >= sim_step {
                acc -= sim_step;
                let status = self.session.update(pending, SIM_STEP_MS)?;
                pending = Input::default();
                match status {
                    SessionStatus::Playing => {}
                    SessionStatus::GameOver => return Ok(Ending::GameOver),
                    SessionStatus::Finished => return Ok(Ending::Finished),
                }
            }

            self.render_frame()?;
            spin_sleep(frame_dt, frame_start);
        }
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        let all = themes();
        let theme = all[self.theme_idx % all.len()];
        let r = &mut self.term.renderer;
        r.clear_to(theme.hud_fg, theme.hud_bg);

        let Some(view) = fit_view(r.width(), r.height()) else {
            let msg = format!(
                "Terminal too small. Try at least {}x{}.",
                PLAY_COLS,
                HUD_ROWS + PLAY_ROWS + FOOTER_ROWS
            );
            r.put_str(0, 0, &msg, theme.hud_fg, theme.hud_bg);
            return self.term.flush();
        };

        let world = self.session.world();
        let line1 = format!(
            "LEAPFROG  |  Level {}  Lives {}  Holes {}/{}",
            self.session.level(),
            world.lives(),
            world.holes().filled_count(),
            HOLE_X_RANGES.len()
        );
        let line2 = if self.paused {
            "PAUSED  |  Space resume   T theme   Q quit"
        } else {
            "Arrows/WASD move   Space pause   T theme   Q quit"
        };
        r.put_str(0, 0, &line1, theme.hud_fg, theme.hud_bg);
        r.put_str(0, 1, line2, theme.hud_fg, theme.hud_bg);

        for y in 0..PLAY_ROWS {
            for x in 0..PLAY_COLS {
                r.put(view.play_x + x, view.play_y + y, ' ', theme.hud_fg, theme.road_bg);
            }
        }
        world.render(&mut TermCanvas { r, view, theme });

        let footer = format!("Theme: {}", theme.name);
        let fx = view.play_x + PLAY_COLS.saturating_sub(footer.chars().count() as u16);
        let fy = view.play_y + PLAY_ROWS;
        self.term
            .renderer
            .put_str(fx, fy, &footer, theme.accent_fg, theme.hud_bg);
        self.term.flush()
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
        ^ 0xC0FFEE_u64
}

pub(crate) fn run(args: Args) -> anyhow::Result<()> {
    let paths = project_paths()?;
    let loaded = load_settings(&paths.settings_path);
    let mut settings = loaded.as_ref().cloned().unwrap_or_default();
    settings.apply(args.overrides());

    let log_path = settings.log_file.clone().unwrap_or(paths.log_path);
    logging::init(args.verbose, &log_path)?;
    if let Err(e) = &loaded {
        log::warn!("using default settings: {e:#}");
    }

    if args.save_settings {
        save_settings_atomic(&paths.settings_path, &settings).context("saving settings")?;
        log::info!("settings saved to {}", paths.settings_path.display());
    }

    let seed = match settings.seed {
        0 => clock_seed(),
        s => s,
    };
    log::info!(
        "starting at level {} with {} lives, seed {seed}, {:?} broad phase",
        settings.first_level,
        settings.starting_lives,
        settings.broad_phase
    );

    // load before touching the terminal so a bad level directory reports cleanly
    let levels = LevelSet::new(&settings.levels_dir);
    let session = Session::start(
        levels,
        settings.broad_phase,
        settings.first_level,
        settings.starting_lives,
        seed,
    )
    .with_context(|| format!("level directory {}", settings.levels_dir.display()))?;

    let mut app = App::init(settings, session)?;
    let res = app.run();
    let restored = app.term.end();
    let ending = res?;
    restored?;

    let world = app.session.world();
    match ending {
        Ending::Quit => println!("Quit on level {}.", app.session.level()),
        Ending::GameOver => println!(
            "Game over on level {} with {} of {} holes filled.",
            app.session.level(),
            world.holes().filled_count(),
            HOLE_X_RANGES.len()
        ),
        Ending::Finished => println!(
            "All levels cleared with {} {} left.",
            world.lives(),
            if world.lives() == 1 { "life" } else { "lives" }
        ),
    }
    Ok(())
}

fn spin_sleep(target: Duration, start: Instant) {
    let end = start + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
