pub(crate) const SCREEN_WIDTH: f32 = 1024.0;
pub(crate) const SCREEN_HEIGHT: f32 = 768.0;

// boxes are shrunk slightly so that tiles sitting edge to edge never touch
const FUZZ: f32 = 0.95;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct BoundingBox {
    cx: f32,
    cy: f32,
    w: f32,
    h: f32,
}

impl BoundingBox {
    pub(crate) fn new(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self {
            cx,
            cy,
            w: w * FUZZ,
            h: h * FUZZ,
        }
    }

    pub(crate) fn set_center(&mut self, cx: f32, cy: f32) {
        self.cx = cx;
        self.cy = cy;
    }

    pub(crate) fn left(&self) -> f32 {
        self.cx - self.w / 2.0
    }

    pub(crate) fn right(&self) -> f32 {
        self.cx + self.w / 2.0
    }

    pub(crate) fn top(&self) -> f32 {
        self.cy - self.h / 2.0
    }

    pub(crate) fn bottom(&self) -> f32 {
        self.cy + self.h / 2.0
    }

    /// Strict overlap test; boxes that only share an edge do not intersect.
    pub(crate) fn intersects(&self, other: &BoundingBox) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    pub(crate) fn inflated(&self, dx: f32, dy: f32) -> Self {
        Self {
            cx: self.cx,
            cy: self.cy,
            w: self.w + dx * 2.0,
            h: self.h + dy * 2.0,
        }
    }
}

#[cfg(test)]
impl BoundingBox {
    pub(crate) fn center(&self) -> (f32, f32) {
        (self.cx, self.cy)
    }

    pub(crate) fn width(&self) -> f32 {
        self.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn fuzz_shrinks_extent() {
        let b = BoundingBox::new(100.0, 100.0, 48.0, 48.0);
        assert_relative_eq!(b.width(), 45.6, epsilon = 1e-4);
        assert_relative_eq!(b.left(), 100.0 - 22.8, epsilon = 1e-4);
    }

    #[rstest]
    #[case(0.0, 0.0, true)]
    #[case(40.0, 0.0, true)]
    #[case(48.0, 0.0, false)] // neighbouring tile
    #[case(0.0, 48.0, false)]
    #[case(40.0, 40.0, true)]
    #[case(200.0, 0.0, false)]
    fn tile_intersections(#[case] dx: f32, #[case] dy: f32, #[case] hit: bool) {
        let a = BoundingBox::new(24.0, 24.0, 48.0, 48.0);
        let b = BoundingBox::new(24.0 + dx, 24.0 + dy, 48.0, 48.0);
        assert_eq!(a.intersects(&b), hit);
        assert_eq!(b.intersects(&a), hit);
    }

    #[test]
    fn moving_center_moves_edges() {
        let mut b = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        b.set_center(50.0, 60.0);
        assert_eq!(b.center(), (50.0, 60.0));
        assert!(b.left() > 40.0 && b.right() < 60.0);
    }
}
