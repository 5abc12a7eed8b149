use crate::geom::{BoundingBox, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::tags::{Tag, Tags};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SpriteKind {
    Frog,
    Grass,
    Water,
    Tree,
    Bus,
    Racecar,
    Bike,
    Bulldozer,
    Log,
    LongLog,
    Turtle,
    ExtraLife,
    LifeIcon,
}

impl SpriteKind {
    pub(crate) fn size(self) -> (f32, f32) {
        match self {
            SpriteKind::Frog => (48.0, 48.0),
            SpriteKind::Grass | SpriteKind::Water | SpriteKind::Tree => (48.0, 48.0),
            SpriteKind::Bus => (96.0, 48.0),
            SpriteKind::Racecar => (96.0, 48.0),
            SpriteKind::Bike => (48.0, 48.0),
            SpriteKind::Bulldozer => (96.0, 48.0),
            SpriteKind::Log => (192.0, 48.0),
            SpriteKind::LongLog => (288.0, 48.0),
            SpriteKind::Turtle => (144.0, 48.0),
            SpriteKind::ExtraLife => (48.0, 48.0),
            SpriteKind::LifeIcon => (32.0, 32.0),
        }
    }

    pub(crate) fn from_level_name(name: &str) -> Option<Self> {
        match name {
            "water" => Some(SpriteKind::Water),
            "grass" => Some(SpriteKind::Grass),
            "tree" => Some(SpriteKind::Tree),
            "bus" => Some(SpriteKind::Bus),
            "racecar" => Some(SpriteKind::Racecar),
            "bike" => Some(SpriteKind::Bike),
            "bulldozer" => Some(SpriteKind::Bulldozer),
            "log" => Some(SpriteKind::Log),
            "longLog" => Some(SpriteKind::LongLog),
            "turtle" => Some(SpriteKind::Turtle),
            _ => None,
        }
    }

    pub(crate) fn is_static(self) -> bool {
        matches!(self, SpriteKind::Grass | SpriteKind::Water | SpriteKind::Tree)
    }

    pub(crate) fn is_log(self) -> bool {
        matches!(self, SpriteKind::Log | SpriteKind::LongLog)
    }
}

/// The bounding box is rewritten by every position setter, so it never lags
/// behind `x`/`y`.
#[derive(Clone, Debug)]
pub(crate) struct Sprite {
    kind: SpriteKind,
    x: f32,
    y: f32,
    bounds: BoundingBox,
    tags: Tags,
}

impl Sprite {
    pub(crate) fn new(kind: SpriteKind, x: f32, y: f32) -> Self {
        Self::with_tags(kind, x, y, &[])
    }

    pub(crate) fn with_tags(kind: SpriteKind, x: f32, y: f32, tags: &[Tag]) -> Self {
        Self::tagged(kind, x, y, Tags::of(tags))
    }

    pub(crate) fn tagged(kind: SpriteKind, x: f32, y: f32, tags: Tags) -> Self {
        let (w, h) = kind.size();
        Self {
            kind,
            x,
            y,
            bounds: BoundingBox::new(x, y, w, h),
            tags,
        }
    }

    pub(crate) fn kind(&self) -> SpriteKind {
        self.kind
    }

    pub(crate) fn x(&self) -> f32 {
        self.x
    }

    pub(crate) fn y(&self) -> f32 {
        self.y
    }

    pub(crate) fn width(&self) -> f32 {
        self.kind.size().0
    }

    pub(crate) fn height(&self) -> f32 {
        self.kind.size().1
    }

    pub(crate) fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub(crate) fn set_x(&mut self, x: f32) {
        self.x = x;
        self.bounds.set_center(self.x, self.y);
    }

    pub(crate) fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
        self.bounds.set_center(x, y);
    }

    pub(crate) fn move_by(&mut self, dx: f32, dy: f32) {
        self.set_position(self.x + dx, self.y + dy);
    }

    pub(crate) fn tags(&self) -> Tags {
        self.tags
    }

    pub(crate) fn has_tag(&self, tag: Tag) -> bool {
        self.tags.has(tag)
    }

    pub(crate) fn add_tag(&mut self, tag: Tag) {
        self.tags.add(tag);
    }

    pub(crate) fn remove_tag(&mut self, tag: Tag) {
        self.tags.remove(tag);
    }

    pub(crate) fn collides(&self, other: Option<&BoundingBox>) -> bool {
        other.is_some_and(|b| self.bounds.intersects(b))
    }

    pub(crate) fn on_screen_x(&self, x: f32) -> bool {
        let half = self.width() / 2.0;
        x + half <= SCREEN_WIDTH && x - half >= 0.0
    }

    pub(crate) fn on_screen_y(&self, y: f32) -> bool {
        let half = self.height() / 2.0;
        y + half <= SCREEN_HEIGHT && y - half >= 0.0
    }

    pub(crate) fn fully_off_screen(&self) -> bool {
        let (hw, hh) = (self.width() / 2.0, self.height() / 2.0);
        self.x > SCREEN_WIDTH + hw || self.x < -hw || self.y > SCREEN_HEIGHT + hh || self.y < -hh
    }
}

#[cfg(test)]
impl Sprite {
    pub(crate) fn set_y(&mut self, y: f32) {
        self.y = y;
        self.bounds.set_center(self.x, self.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn bounds_follow_every_mutation() {
        let mut s = Sprite::new(SpriteKind::Bus, 10.0, 20.0);
        assert_eq!(s.bounds().center(), (10.0, 20.0));
        s.set_x(33.5);
        assert_eq!(s.bounds().center(), (33.5, 20.0));
        s.set_y(-4.0);
        assert_eq!(s.bounds().center(), (33.5, -4.0));
        s.move_by(1.5, 2.0);
        assert_eq!(s.bounds().center(), (s.x(), s.y()));
        s.set_position(500.0, 600.0);
        assert_eq!(s.bounds().center(), (500.0, 600.0));
    }

    #[test]
    fn collides_with_nothing_is_false() {
        let s = Sprite::new(SpriteKind::Frog, 0.0, 0.0);
        assert!(!s.collides(None));
        let other = Sprite::new(SpriteKind::Grass, 10.0, 0.0);
        assert!(s.collides(Some(other.bounds())));
    }

    #[rstest]
    #[case("water", Some(SpriteKind::Water))]
    #[case("longLog", Some(SpriteKind::LongLog))]
    #[case("bulldozer", Some(SpriteKind::Bulldozer))]
    #[case("longlog", None)]
    #[case("submarine", None)]
    fn level_names(#[case] name: &str, #[case] kind: Option<SpriteKind>) {
        assert_eq!(SpriteKind::from_level_name(name), kind);
    }

    #[rstest]
    #[case(24.0, true)]
    #[case(23.0, false)]
    #[case(1000.0, true)]
    #[case(1001.0, false)]
    fn frog_screen_edges(#[case] x: f32, #[case] inside: bool) {
        let s = Sprite::new(SpriteKind::Frog, 512.0, 720.0);
        assert_eq!(s.on_screen_x(x), inside);
    }
}
