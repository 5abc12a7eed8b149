use crate::collision::BroadPhaseKind;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) levels_dir: PathBuf,
    pub(crate) starting_lives: u32,
    pub(crate) first_level: u32,
    pub(crate) fps_cap: u32,
    /// 0 picks a fresh seed every run.
    pub(crate) seed: u64,
    pub(crate) theme: String,
    pub(crate) broad_phase: BroadPhaseKind,
    pub(crate) log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            levels_dir: PathBuf::from("levels"),
            starting_lives: 3,
            first_level: 1,
            fps_cap: 60,
            seed: 0,
            theme: "Mint CRT".to_string(),
            broad_phase: BroadPhaseKind::AllPairs,
            log_file: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Overrides {
    pub(crate) levels_dir: Option<PathBuf>,
    pub(crate) first_level: Option<u32>,
    pub(crate) lives: Option<u32>,
    pub(crate) seed: Option<u64>,
    pub(crate) fps: Option<u32>,
    pub(crate) theme: Option<String>,
    pub(crate) broad_phase: Option<BroadPhaseKind>,
    pub(crate) log_file: Option<PathBuf>,
}

impl Settings {
    pub(crate) fn apply(&mut self, o: Overrides) {
        if let Some(v) = o.levels_dir {
            self.levels_dir = v;
        }
        if let Some(v) = o.first_level {
            self.first_level = v;
        }
        if let Some(v) = o.lives {
            self.starting_lives = v;
        }
        if let Some(v) = o.seed {
            self.seed = v;
        }
        if let Some(v) = o.fps {
            self.fps_cap = v;
        }
        if let Some(v) = o.theme {
            self.theme = v;
        }
        if let Some(v) = o.broad_phase {
            self.broad_phase = v;
        }
        if let Some(v) = o.log_file {
            self.log_file = Some(v);
        }
        self.starting_lives = self.starting_lives.max(1);
        self.first_level = self.first_level.max(1);
        self.fps_cap = self.fps_cap.clamp(10, 240);
    }
}

pub(crate) struct Paths {
    pub(crate) settings_path: PathBuf,
    pub(crate) log_path: PathBuf,
}

pub(crate) fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "leapfrog", "Leapfrog")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir)
        .with_context(|| format!("creating data directory {}", dir.display()))?;
    Ok(Paths {
        settings_path: dir.join("settings.json"),
        log_path: dir.join("leapfrog.log"),
    })
}

/// A missing file means defaults. Anything else that goes wrong is returned
/// so the caller can report it once logging is up.
pub(crate) fn load_settings(path: &Path) -> Result<Settings> {
    match fs::read_to_string(path) {
        Ok(s) => serde_json::from_str(&s).with_context(|| format!("parsing {}", path.display())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Settings::default()),
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
    }
}

pub(crate) fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data).with_context(|| format!("writing {}", tmp.display()))?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

pub(crate) fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    // rename only replaces an existing target on unix
    if cfg!(windows) && to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to)
        .with_context(|| format!("renaming {} to {}", from.display(), to.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn settings_survive_a_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let s = Settings {
            starting_lives: 5,
            theme: "Amber Terminal".to_string(),
            seed: 77,
            ..Settings::default()
        };
        save_settings_atomic(&path, &s).unwrap();
        save_settings_atomic(&path, &s).unwrap();
        assert_eq!(load_settings(&path).unwrap(), s);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "starting_lives": 7 }"#).unwrap();
        let s = load_settings(&path).unwrap();
        assert_eq!(s.starting_lives, 7);
        assert_eq!(s.levels_dir, PathBuf::from("levels"));
    }

    #[test]
    fn garbage_is_reported_and_absence_is_not() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        let err = load_settings(&path).unwrap_err();
        assert!(format!("{err:#}").contains("settings.json"));
        assert_eq!(
            load_settings(&dir.path().join("absent.json")).unwrap(),
            Settings::default()
        );
    }

    #[test]
    fn saving_over_an_existing_file_replaces_it() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{}").unwrap();
        let s = Settings {
            broad_phase: BroadPhaseKind::Sweep,
            ..Settings::default()
        };
        save_settings_atomic(&path, &s).unwrap();
        assert_eq!(load_settings(&path).unwrap().broad_phase, BroadPhaseKind::Sweep);
    }

    #[test]
    fn overrides_win_and_are_clamped() {
        let mut s = Settings::default();
        s.apply(Overrides {
            lives: Some(0),
            fps: Some(1000),
            first_level: Some(2),
            theme: Some("Amber Terminal".to_string()),
            ..Overrides::default()
        });
        assert_eq!(s.starting_lives, 1);
        assert_eq!(s.fps_cap, 240);
        assert_eq!(s.first_level, 2);
        assert_eq!(s.theme, "Amber Terminal");
        assert_eq!(s.seed, 0);
    }
}
