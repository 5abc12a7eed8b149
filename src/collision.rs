use crate::geom::BoundingBox;
use serde::{Deserialize, Serialize};

/// Chooses which ordered entity pairs are worth a narrow-phase test.
///
/// `reach[i]` is the area in which entity `i` can react to others. Pairs must
/// come out in ascending `(first, second)` order, since reactions are
/// order dependent.
pub(crate) trait BroadPhase {
    fn pairs(&mut self, reach: &[BoundingBox], out: &mut Vec<(usize, usize)>);
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct AllPairs;

impl BroadPhase for AllPairs {
    fn pairs(&mut self, reach: &[BoundingBox], out: &mut Vec<(usize, usize)>) {
        out.clear();
        let n = reach.len();
        out.reserve(n * n.saturating_sub(1));
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    out.push((i, j));
                }
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct SweepX {
    order: Vec<usize>,
}

impl BroadPhase for SweepX {
    fn pairs(&mut self, reach: &[BoundingBox], out: &mut Vec<(usize, usize)>) {
        out.clear();
        self.order.clear();
        self.order.extend(0..reach.len());
        self.order
            .sort_by(|&a, &b| reach[a].left().total_cmp(&reach[b].left()));

        for (k, &a) in self.order.iter().enumerate() {
            for &b in &self.order[k + 1..] {
                if reach[b].left() >= reach[a].right() {
                    break;
                }
                if reach[a].intersects(&reach[b]) {
                    out.push((a, b));
                    out.push((b, a));
                }
            }
        }
        out.sort_unstable();
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum BroadPhaseKind {
    #[default]
    AllPairs,
    Sweep,
}

impl BroadPhaseKind {
    pub(crate) fn build(self) -> Box<dyn BroadPhase> {
        match self {
            BroadPhaseKind::AllPairs => Box::new(AllPairs),
            BroadPhaseKind::Sweep => Box::new(SweepX::default()),
        }
    }
}
