#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Terrain classification of a single grid cell.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terrain {
    #[default]
    Normal,
    Forbidden,
}

/// Per-cell metadata stored in a grid's cell map.
///
/// A cell is blocked iff its terrain is [Terrain::Forbidden]. `extra` is an
/// application-defined tag the library carries but does not interpret.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NavCell {
    pub terrain: Terrain,
    pub extra: i32,
}

impl NavCell {
    #[inline]
    #[must_use]
    pub const fn new(terrain: Terrain, extra: i32) -> Self {
        Self { terrain, extra }
    }

    #[inline]
    #[must_use]
    pub const fn forbidden() -> Self {
        Self::new(Terrain::Forbidden, 0)
    }

    #[inline]
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.terrain == Terrain::Forbidden
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_cell_is_passable() {
        let cell = NavCell::default();
        assert_eq!(cell.terrain, Terrain::Normal);
        assert_eq!(cell.extra, 0);
        assert!(!cell.is_blocked());
    }

    #[test]
    fn test_forbidden_cell_is_blocked() {
        assert!(NavCell::forbidden().is_blocked());
        assert!(NavCell::new(Terrain::Forbidden, 7).is_blocked());
    }
}
