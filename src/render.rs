use crate::geom::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::sprite::{Sprite, SpriteKind};
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Stdout, Write};

pub(crate) const HUD_ROWS: u16 = 2;
pub(crate) const FOOTER_ROWS: u16 = 1;

pub(crate) const CELL_PX_W: f32 = 24.0;
pub(crate) const CELL_PX_H: f32 = 48.0;

pub(crate) const PLAY_COLS: u16 = (SCREEN_WIDTH / CELL_PX_W) as u16 + 1;
pub(crate) const PLAY_ROWS: u16 = (SCREEN_HEIGHT / CELL_PX_H) as u16;

pub(crate) trait Canvas {
    fn draw(&mut self, sprite: &Sprite);
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Theme {
    pub(crate) name: &'static str,
    pub(crate) hud_fg: Color,
    pub(crate) hud_bg: Color,

    pub(crate) road_bg: Color,
    pub(crate) grass_bg: Color,
    pub(crate) water_bg: Color,

    pub(crate) tree_fg: Color,
    pub(crate) frog_fg: Color,
    pub(crate) car_fg: Color,
    pub(crate) dozer_fg: Color,
    pub(crate) log_fg: Color,
    pub(crate) turtle_fg: Color,
    pub(crate) pickup_fg: Color,
    pub(crate) accent_fg: Color,
}

pub(crate) fn themes() -> Vec<Theme> {
    vec![
        Theme {
            name: "Mint CRT",
            hud_fg: Color::Rgb {
                r: 160,
                g: 255,
                b: 210,
            },
            hud_bg: Color::Rgb { r: 5, g: 7, b: 10 },
            road_bg: Color::Rgb {
                r: 10,
                g: 10,
                b: 14,
            },
            grass_bg: Color::Rgb {
                r: 12,
                g: 30,
                b: 14,
            },
            water_bg: Color::Rgb { r: 7, g: 16, b: 34 },
            tree_fg: Color::Rgb {
                r: 90,
                g: 200,
                b: 110,
            },
            frog_fg: Color::Rgb {
                r: 180,
                g: 255,
                b: 120,
            },
            car_fg: Color::Rgb {
                r: 255,
                g: 160,
                b: 140,
            },
            dozer_fg: Color::Rgb {
                r: 255,
                g: 210,
                b: 90,
            },
            log_fg: Color::Rgb {
                r: 210,
                g: 190,
                b: 140,
            },
            turtle_fg: Color::Rgb {
                r: 160,
                g: 210,
                b: 255,
            },
            pickup_fg: Color::Rgb {
                r: 255,
                g: 120,
                b: 180,
            },
            accent_fg: Color::Rgb {
                r: 255,
                g: 220,
                b: 140,
            },
        },
        Theme {
            name: "Amber Terminal",
            hud_fg: Color::Rgb {
                r: 255,
                g: 190,
                b: 95,
            },
            hud_bg: Color::Rgb { r: 7, g: 6, b: 3 },
            road_bg: Color::Rgb { r: 12, g: 10, b: 8 },
            grass_bg: Color::Rgb { r: 22, g: 16, b: 6 },
            water_bg: Color::Rgb { r: 8, g: 8, b: 20 },
            tree_fg: Color::Rgb {
                r: 200,
                g: 150,
                b: 60,
            },
            frog_fg: Color::Rgb {
                r: 255,
                g: 220,
                b: 120,
            },
            car_fg: Color::Rgb {
                r: 255,
                g: 140,
                b: 80,
            },
            dozer_fg: Color::Rgb {
                r: 255,
                g: 240,
                b: 170,
            },
            log_fg: Color::Rgb {
                r: 220,
                g: 180,
                b: 120,
            },
            turtle_fg: Color::Rgb {
                r: 160,
                g: 200,
                b: 255,
            },
            pickup_fg: Color::Rgb {
                r: 255,
                g: 110,
                b: 90,
            },
            accent_fg: Color::Rgb {
                r: 255,
                g: 235,
                b: 160,
            },
        },
    ]
}

pub(crate) fn theme_index(name: &str) -> usize {
    themes()
        .iter()
        .position(|t| t.name.eq_ignore_ascii_case(name))
        .unwrap_or(0)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct FrameCell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

const BLANK: FrameCell = FrameCell {
    ch: ' ',
    fg: Color::White,
    bg: Color::Black,
};

/// Double-buffered cell grid; only cells that changed since the last flush
/// are sent to the terminal.
pub(crate) struct Renderer {
    w: u16,
    h: u16,
    prev: Vec<FrameCell>,
    cur: Vec<FrameCell>,
}

impl Renderer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            prev: vec![BLANK; (w as usize) * (h as usize)],
            cur: vec![BLANK; (w as usize) * (h as usize)],
        }
    }

    pub(crate) fn resize(&mut self, w: u16, h: u16) {
        *self = Self::new(w, h);
    }

    pub(crate) fn width(&self) -> u16 {
        self.w
    }

    pub(crate) fn height(&self) -> u16 {
        self.h
    }

    pub(crate) fn clear_to(&mut self, fg: Color, bg: Color) {
        for c in &mut self.cur {
            c.ch = ' ';
            c.fg = fg;
            c.bg = bg;
        }
    }

    pub(crate) fn cell(&self, x: u16, y: u16) -> Option<FrameCell> {
        if x >= self.w || y >= self.h {
            return None;
        }
        Some(self.cur[(y as usize) * (self.w as usize) + (x as usize)])
    }

    pub(crate) fn put(&mut self, x: u16, y: u16, ch: char, fg: Color, bg: Color) {
        if x >= self.w || y >= self.h {
            return;
        }
        let i = (y as usize) * (self.w as usize) + (x as usize);
        self.cur[i] = FrameCell { ch, fg, bg };
    }

    pub(crate) fn put_fg(&mut self, x: u16, y: u16, ch: char, fg: Color) {
        if let Some(c) = self.cell(x, y) {
            self.put(x, y, ch, fg, c.bg);
        }
    }

    pub(crate) fn put_str(&mut self, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
        let mut xx = x;
        for ch in s.chars() {
            if xx >= self.w {
                break;
            }
            self.put(xx, y, ch, fg, bg);
            xx += 1;
        }
    }

    pub(crate) fn flush_diff(&mut self, out: &mut Stdout) -> io::Result<()> {
        queue!(out, BeginSynchronizedUpdate)?;
        let mut cur_fg = None::<Color>;
        let mut cur_bg = None::<Color>;

        for y in 0..self.h {
            let row_off = (y as usize) * (self.w as usize);
            for x in 0..self.w {
                let i = row_off + (x as usize);
                let a = self.cur[i];
                if a == self.prev[i] {
                    continue;
                }
                queue!(out, cursor::MoveTo(x, y))?;
                if cur_fg != Some(a.fg) {
                    queue!(out, SetForegroundColor(a.fg))?;
                    cur_fg = Some(a.fg);
                }
                if cur_bg != Some(a.bg) {
                    queue!(out, SetBackgroundColor(a.bg))?;
                    cur_bg = Some(a.bg);
                }
                queue!(out, Print(a.ch))?;
            }
        }

        queue!(out, ResetColor, EndSynchronizedUpdate)?;
        out.flush()?;
        self.prev.copy_from_slice(&self.cur);
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Viewport {
    pub(crate) term_w: u16,
    pub(crate) term_h: u16,
    pub(crate) play_x: u16,
    pub(crate) play_y: u16,
}

pub(crate) fn fit_view(term_w: u16, term_h: u16) -> Option<Viewport> {
    if term_w < PLAY_COLS || term_h < HUD_ROWS + PLAY_ROWS + FOOTER_ROWS {
        return None;
    }
    Some(Viewport {
        term_w,
        term_h,
        play_x: (term_w - PLAY_COLS) / 2,
        play_y: HUD_ROWS,
    })
}

fn pattern(kind: SpriteKind) -> &'static str {
    match kind {
        SpriteKind::Frog => "@@",
        SpriteKind::Grass => " ",
        SpriteKind::Water => "~ ",
        SpriteKind::Tree => "♣♣",
        SpriteKind::Bus => "[##]",
        SpriteKind::Racecar => "<=>",
        SpriteKind::Bike => "ô",
        SpriteKind::Bulldozer => "[%%]",
        SpriteKind::Log | SpriteKind::LongLog => "=",
        SpriteKind::Turtle => "()",
        SpriteKind::ExtraLife => "++",
        SpriteKind::LifeIcon => "♥",
    }
}

pub(crate) struct TermCanvas<'a> {
    pub(crate) r: &'a mut Renderer,
    pub(crate) view: Viewport,
    pub(crate) theme: Theme,
}

impl TermCanvas<'_> {
    fn fg_for(&self, kind: SpriteKind) -> Color {
        let t = &self.theme;
        match kind {
            SpriteKind::Frog => t.frog_fg,
            SpriteKind::Tree => t.tree_fg,
            SpriteKind::Grass => t.hud_fg,
            SpriteKind::Water => t.turtle_fg,
            SpriteKind::Bus | SpriteKind::Racecar | SpriteKind::Bike => t.car_fg,
            SpriteKind::Bulldozer => t.dozer_fg,
            SpriteKind::Log | SpriteKind::LongLog => t.log_fg,
            SpriteKind::Turtle => t.turtle_fg,
            SpriteKind::ExtraLife => t.pickup_fg,
            SpriteKind::LifeIcon => t.accent_fg,
        }
    }

    fn bg_for(&self, kind: SpriteKind) -> Option<Color> {
        match kind {
            SpriteKind::Grass | SpriteKind::Tree => Some(self.theme.grass_bg),
            SpriteKind::Water => Some(self.theme.water_bg),
            _ => None,
        }
    }
}

fn column_span(left: f32, right: f32) -> Option<(u16, u16)> {
    let first = (left / CELL_PX_W).floor().max(0.0);
    let last = ((right / CELL_PX_W).ceil() - 1.0).min(PLAY_COLS as f32 - 1.0);
    if last < first {
        return None;
    }
    Some((first as u16, last as u16))
}

impl Canvas for TermCanvas<'_> {
    fn draw(&mut self, sprite: &Sprite) {
        let kind = sprite.kind();
        let fg = self.fg_for(kind);

        // icons live in the footer rather than on top of the start row
        if kind == SpriteKind::LifeIcon {
            let col = (sprite.x() / CELL_PX_W).floor() as u16;
            let y = self.view.play_y + PLAY_ROWS;
            self.r.put_fg(self.view.play_x + col, y, '♥', fg);
            return;
        }

        let row = (sprite.y() / CELL_PX_H).floor();
        if !(0.0..PLAY_ROWS as f32).contains(&row) {
            return;
        }
        let half = sprite.width() / 2.0;
        let Some((first, last)) = column_span(sprite.x() - half, sprite.x() + half) else {
            return;
        };
        let y = self.view.play_y + row as u16;
        let glyphs: Vec<char> = pattern(kind).chars().collect();
        for (k, col) in (first..=last).enumerate() {
            let x = self.view.play_x + col;
            let ch = glyphs[k % glyphs.len()];
            match self.bg_for(kind) {
                Some(bg) => self.r.put(x, y, ch, fg, bg),
                None => self.r.put_fg(x, y, ch, fg),
            }
        }
    }
}

pub(crate) struct Terminal {
    pub(crate) out: Stdout,
    pub(crate) renderer: Renderer,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;
        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            renderer: Renderer::new(cols, rows),
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            terminal::Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<Option<(u16, u16)>> {
        let (c, r) = terminal::size()?;
        if c == self.renderer.width() && r == self.renderer.height() {
            return Ok(None);
        }
        self.renderer.resize(c, r);
        execute!(self.out, terminal::Clear(ClearType::All))?;
        Ok(Some((c, r)))
    }

    pub(crate) fn flush(&mut self) -> anyhow::Result<()> {
        self.renderer.flush_diff(&mut self.out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn canvas_setup() -> (Renderer, Viewport, Theme) {
        let view = fit_view(PLAY_COLS, HUD_ROWS + PLAY_ROWS + FOOTER_ROWS).unwrap();
        let r = Renderer::new(view.term_w, view.term_h);
        (r, view, themes()[0])
    }

    #[test]
    fn playfield_dimensions() {
        assert_eq!(PLAY_COLS, 43);
        assert_eq!(PLAY_ROWS, 16);
        assert!(fit_view(42, 40).is_none());
        assert!(fit_view(80, 18).is_none());
        assert_eq!(fit_view(83, 30).unwrap().play_x, 20);
    }

    #[rstest]
    #[case(0.0, 48.0, Some((0, 1)))]
    #[case(464.0, 560.0, Some((19, 23)))]
    #[case(-100.0, -10.0, None)]
    #[case(1000.0, 1200.0, Some((41, 42)))]
    fn column_spans(#[case] left: f32, #[case] right: f32, #[case] want: Option<(u16, u16)>) {
        assert_eq!(column_span(left, right), want);
    }

    #[test]
    fn frog_keeps_the_tile_background() {
        let (mut r, view, theme) = canvas_setup();
        {
            let mut c = TermCanvas {
                r: &mut r,
                view,
                theme,
            };
            c.draw(&Sprite::new(SpriteKind::Water, 504.0, 336.0));
            c.draw(&Sprite::new(SpriteKind::Frog, 504.0, 336.0));
        }
        let cell = r.cell(20, HUD_ROWS + 7).unwrap();
        assert_eq!(cell.ch, '@');
        assert_eq!(cell.fg, theme.frog_fg);
        assert_eq!(cell.bg, theme.water_bg);
    }

    #[test]
    fn life_icons_go_to_the_footer() {
        let (mut r, view, theme) = canvas_setup();
        TermCanvas {
            r: &mut r,
            view,
            theme,
        }
        .draw(&Sprite::new(SpriteKind::LifeIcon, 56.0, 744.0));
        let cell = r.cell(2, HUD_ROWS + PLAY_ROWS).unwrap();
        assert_eq!(cell.ch, '♥');
    }

    #[test]
    fn theme_lookup_ignores_case() {
        assert_eq!(theme_index("amber terminal"), 1);
        assert_eq!(theme_index("nope"), 0);
    }
}
