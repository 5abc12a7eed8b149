use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Tag {
    Hazard,
    Ride,
    Solid,
    ExtraLife,
}

impl Tag {
    pub(crate) const ALL: [Tag; 4] = [Tag::Hazard, Tag::Ride, Tag::Solid, Tag::ExtraLife];

    fn bit(self) -> u8 {
        match self {
            Tag::Hazard => 1 << 0,
            Tag::Ride => 1 << 1,
            Tag::Solid => 1 << 2,
            Tag::ExtraLife => 1 << 3,
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Tag::Hazard => "hazard",
            Tag::Ride => "ride",
            Tag::Solid => "solid",
            Tag::ExtraLife => "extraLife",
        }
    }
}

#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Tags(u8);

impl Tags {
    pub(crate) const NONE: Tags = Tags(0);

    pub(crate) fn of(tags: &[Tag]) -> Self {
        let mut out = Tags::NONE;
        for &t in tags {
            out.add(t);
        }
        out
    }

    pub(crate) fn add(&mut self, tag: Tag) {
        self.0 |= tag.bit();
    }

    pub(crate) fn remove(&mut self, tag: Tag) {
        self.0 &= !tag.bit();
    }

    pub(crate) fn has(self, tag: Tag) -> bool {
        self.0 & tag.bit() != 0
    }

    pub(crate) fn iter(self) -> impl Iterator<Item = Tag> {
        Tag::ALL.into_iter().filter(move |t| self.has(*t))
    }
}

#[cfg(test)]
impl Tags {
    pub(crate) fn len(self) -> usize {
        self.0.count_ones() as usize
    }
}

impl fmt::Debug for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.iter().map(Tag::name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adding_twice_is_a_noop() {
        let mut t = Tags::of(&[Tag::Hazard]);
        t.add(Tag::Hazard);
        assert_eq!(t.len(), 1);
        assert!(t.has(Tag::Hazard));
    }

    #[test]
    fn removing_absent_tag_is_safe() {
        let mut t = Tags::of(&[Tag::Solid]);
        t.remove(Tag::Ride);
        assert_eq!(t, Tags::of(&[Tag::Solid]));
        t.remove(Tag::Solid);
        assert_eq!(t, Tags::NONE);
        t.remove(Tag::Solid);
        assert_eq!(t.len(), 0);
    }

    #[test]
    fn tags_are_independent() {
        let t = Tags::of(&[Tag::Ride, Tag::ExtraLife]);
        let got: Vec<Tag> = t.iter().collect();
        assert_eq!(got, vec![Tag::Ride, Tag::ExtraLife]);
        assert!(!t.has(Tag::Hazard));
        assert_eq!(format!("{t:?}"), r#"{"ride", "extraLife"}"#);
    }
}
