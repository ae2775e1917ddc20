//! Broad-phase collision: two things touch when their occupied cells intersect.

use std::collections::HashSet;

use crate::object::{Entity, Handle};
use crate::types::Cell;

pub fn intersects(a: &HashSet<Cell>, b: &HashSet<Cell>) -> bool {
    !a.is_disjoint(b)
}

/// Whether two entities occupied a common cell in their last render.
pub fn touching(a: &dyn Entity, b: &dyn Entity) -> bool {
    intersects(&a.body().coords, &b.body().coords)
}

/// Like [`touching`], but each side includes all of its descendants.
pub fn family_touching(a: &dyn Entity, b: &dyn Entity) -> bool {
    intersects(&a.body().all_coords(), &b.body().all_coords())
}

/// First candidate, in order, whose cells meet `cells`.
///
/// Candidates that are currently borrowed are skipped.
pub fn first_hit<'a>(cells: &HashSet<Cell>, candidates: &'a [Handle]) -> Option<&'a Handle> {
    if cells.is_empty() {
        return None;
    }
    candidates.iter().find(|c| {
        c.try_borrow()
            .map(|e| intersects(cells, &e.body().coords))
            .unwrap_or(false)
    })
}
