use crate::Coord;
use fxhash::FxHasher;
use indexmap::{IndexMap, IndexSet};
use std::hash::BuildHasherDefault;

/// Map from coord to value. Insertion-ordered and deterministically hashed,
/// so iteration order is reproducible across runs.
pub type CoordMap<V> = IndexMap<Coord, V, BuildHasherDefault<FxHasher>>;

/// Set of coords with the same ordering and hashing guarantees as [CoordMap].
pub type CoordSet = IndexSet<Coord, BuildHasherDefault<FxHasher>>;

/// Ordered list of coords.
pub type CoordList = Vec<Coord>;

/// Look up a cost table entry, treating absent keys as `+∞`.
///
/// The planner's g/rhs tables only store cells that have been touched; every
/// other cell implicitly carries an infinite estimate.
#[inline]
#[must_use]
pub fn cost_of(table: &CoordMap<f32>, c: Coord) -> f32 {
    table.get(&c).copied().unwrap_or(f32::INFINITY)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::coord;

    #[test]
    fn test_cost_of_defaults_to_infinity() {
        let mut table = CoordMap::default();
        table.insert(coord(1, 1), 2.5);

        assert_eq!(cost_of(&table, coord(1, 1)), 2.5);
        assert!(cost_of(&table, coord(0, 0)).is_infinite());
    }

    #[test]
    fn test_iteration_order_is_insertion_order() {
        let mut set = CoordSet::default();
        set.insert(coord(5, 5));
        set.insert(coord(0, 0));
        set.insert(coord(3, 1));

        let order: Vec<_> = set.iter().copied().collect();
        assert_eq!(order, vec![coord(5, 5), coord(0, 0), coord(3, 1)]);
    }
}
