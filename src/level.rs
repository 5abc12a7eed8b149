//! Level files: one `kind,x,y[,moveRight]` record per line.

use crate::sprite::SpriteKind;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum LevelError {
    #[error("cannot read level file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Placement {
    pub(crate) kind: SpriteKind,
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) moving_right: bool,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct LevelData {
    pub(crate) placements: Vec<Placement>,
    pub(crate) skipped: usize,
    pub(crate) unknown: usize,
}

fn parse_coord(field: Option<&str>, name: &str, line: usize) -> Result<f32, LevelError> {
    let raw = field.ok_or_else(|| LevelError::Malformed {
        line,
        reason: format!("missing {name}"),
    })?;
    raw.trim().parse::<f32>().map_err(|_| LevelError::Malformed {
        line,
        reason: format!("{name} is not a number: {raw:?}"),
    })
}

fn parse_flag(field: Option<&str>, line: usize) -> Result<bool, LevelError> {
    let raw = field.ok_or_else(|| LevelError::Malformed {
        line,
        reason: "missing direction flag".to_string(),
    })?;
    match raw.trim() {
        s if s.eq_ignore_ascii_case("true") => Ok(true),
        s if s.eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(LevelError::Malformed {
            line,
            reason: format!("direction flag is not a boolean: {raw:?}"),
        }),
    }
}

pub(crate) fn parse_line(text: &str, line: usize) -> Result<Option<Placement>, LevelError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let mut fields = text.split(',');
    let name = fields.next().unwrap_or_default().trim();
    let Some(kind) = SpriteKind::from_level_name(name) else {
        log::debug!("line {line}: unknown entity kind {name:?}, skipping");
        return Ok(None);
    };
    let x = parse_coord(fields.next(), "x", line)?;
    let y = parse_coord(fields.next(), "y", line)?;
    let moving_right = if kind.is_static() {
        false
    } else {
        parse_flag(fields.next(), line)?
    };
    Ok(Some(Placement {
        kind,
        x,
        y,
        moving_right,
    }))
}

pub(crate) fn parse_level(text: &str) -> LevelData {
    let mut data = LevelData::default();
    for (i, raw) in text.lines().enumerate() {
        match parse_line(raw, i + 1) {
            Ok(Some(p)) => data.placements.push(p),
            Ok(None) => {
                if !raw.trim().is_empty() {
                    data.unknown += 1;
                }
            }
            Err(e) => {
                log::warn!("{e}");
                data.skipped += 1;
            }
        }
    }
    data
}

pub(crate) fn load_level(path: &Path) -> Result<LevelData, LevelError> {
    let text = fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let data = parse_level(&text);
    log::info!(
        "loaded {} ({} entities, {} bad lines, {} unknown kinds)",
        path.display(),
        data.placements.len(),
        data.skipped,
        data.unknown
    );
    Ok(data)
}

/// A directory of numbered level files. Level `n` (1-based) lives in
/// `<dir>/<n-1>.lvl`.
#[derive(Clone, Debug)]
pub(crate) struct LevelSet {
    dir: PathBuf,
}

impl LevelSet {
    pub(crate) fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub(crate) fn path_for(&self, level: u32) -> PathBuf {
        self.dir.join(format!("{}.lvl", level.saturating_sub(1)))
    }

    pub(crate) fn exists(&self, level: u32) -> bool {
        level >= 1 && self.path_for(level).is_file()
    }

    pub(crate) fn load(&self, level: u32) -> Result<LevelData, LevelError> {
        load_level(&self.path_for(level))
    }
}
