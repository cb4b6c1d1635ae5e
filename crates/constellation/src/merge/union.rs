//! Pairwise union of two boundaries by walking their crossing graph.
//!
//! Steps
//! 1. Enumerate segment pairs `(a_i, b_j)` in index order and record every
//!    crossing on both segments.
//! 2. No crossings: containment test (against the convex envelope) or disjoint.
//!    Odd count: unsupported topology, both boundaries kept.
//! 3. Even count: put A's vertices, B's vertices and the crossings in one arena
//!    with stable ids; cut each boundary open at its crossings, ordered by
//!    distance from the segment start, into a successor table.
//! 4. Start on an A vertex that lies on the convex hull of the arena (so the
//!    walk starts on the outer perimeter, never on a hole), follow successors
//!    and hop to the other boundary at every crossing, stop at the start.
//! 5. A ring with less area than the larger input traced an overlap (crossings
//!    that sit on input vertices can steer the walk inward); the next hull
//!    vertex is tried as start. If none yields a full ring, the merge fails.

use tracing::debug;

use crate::geom::{
    classify, convex_hull_indices, segment_intersection, BareHull, HullError, Pt2,
};

/// Relative slack when comparing a walked ring's area against the inputs.
const AREA_EPS: f64 = 1e-9;

/// Why two boundaries could not be merged topologically.
///
/// `merge` turns every variant into "both boundaries, unmerged"; `try_union`
/// exposes them for callers that want to count or log them.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum MergeError {
    /// Two simple closed curves crossing transversally meet an even number of
    /// times; an odd count means touching or near-tangent geometry.
    #[error("boundaries cross at an odd number of points ({count})")]
    UnsupportedIntersectionTopology { count: usize },
    /// No vertex of either boundary is on the outer convex hull.
    #[error("no boundary vertex lies on the outer hull of the crossing arena")]
    NoOuterStart,
    /// The successor walk did not come back to its start.
    #[error("boundary walk did not close after {steps} steps")]
    OpenWalk { steps: usize },
    /// The walk closed on a ring smaller than the larger input, i.e. it
    /// traced an overlap rather than the outer perimeter.
    #[error("walk closed on area {area}, below the larger input's {required}")]
    ShrunkenUnion { area: f64, required: f64 },
    /// The walk closed but produced an unusable ring.
    #[error("merged boundary is degenerate: {0}")]
    Degenerate(#[from] HullError),
}

/// Outcome of a successful union attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum Union {
    /// The boundaries crossed; one combined boundary.
    Merged(BareHull),
    /// No crossings and every vertex of the second is inside the first.
    FirstContainsSecond,
    /// No crossings and every vertex of the first is inside the second.
    SecondContainsFirst,
    /// No crossings and no containment.
    Disjoint,
}

/// Stable arena id: A's vertices, then B's, then crossings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);

/// Array-backed successor table over arena ids.
#[derive(Clone, Debug)]
struct Successors {
    next: Vec<Option<VertexId>>,
}

impl Successors {
    fn with_len(n: usize) -> Self {
        Self {
            next: vec![None; n],
        }
    }
    #[inline]
    fn get(&self, v: VertexId) -> Option<VertexId> {
        self.next.get(v.0).copied().flatten()
    }
    #[inline]
    fn contains(&self, v: VertexId) -> bool {
        self.get(v).is_some()
    }
    fn link(&mut self, from: VertexId, to: VertexId) {
        self.next[from.0] = Some(to);
    }
}

/// Points shared by both boundaries plus their crossings.
struct Arena {
    points: Vec<Pt2>,
    n_a: usize,
    n_b: usize,
}

impl Arena {
    fn a(&self, i: usize) -> VertexId {
        VertexId(i)
    }
    fn b(&self, j: usize) -> VertexId {
        VertexId(self.n_a + j)
    }
    fn is_a(&self, v: VertexId) -> bool {
        v.0 < self.n_a
    }
    fn is_b(&self, v: VertexId) -> bool {
        v.0 >= self.n_a && v.0 < self.n_a + self.n_b
    }
}

/// Merge two boundaries: one element if merged (or one contains the other),
/// both inputs otherwise.
pub fn merge(a: &BareHull, b: &BareHull) -> Vec<BareHull> {
    match try_union(a, b) {
        Ok(Union::Merged(h)) => vec![h],
        Ok(Union::FirstContainsSecond) => vec![a.clone()],
        Ok(Union::SecondContainsFirst) => vec![b.clone()],
        Ok(Union::Disjoint) => vec![a.clone(), b.clone()],
        Err(err) => {
            debug!(error = %err, n_a = a.len(), n_b = b.len(), "declining to merge boundaries");
            vec![a.clone(), b.clone()]
        }
    }
}

/// Union of two boundaries, with the failure modes made explicit.
pub fn try_union(a: &BareHull, b: &BareHull) -> Result<Union, MergeError> {
    let n_a = a.len();
    let n_b = b.len();
    let mut points: Vec<Pt2> = Vec::with_capacity(n_a + n_b);
    points.extend_from_slice(a.points());
    points.extend_from_slice(b.points());

    // Crossing ids recorded per segment, in segment-pair enumeration order.
    let mut on_a: Vec<Vec<VertexId>> = vec![Vec::new(); n_a];
    let mut on_b: Vec<Vec<VertexId>> = vec![Vec::new(); n_b];
    for (i, seg_a) in a.segments().enumerate() {
        for (j, seg_b) in b.segments().enumerate() {
            if let Some(hit) = segment_intersection(&seg_a, &seg_b) {
                let id = VertexId(points.len());
                points.push(hit.point);
                on_a[i].push(id);
                on_b[j].push(id);
            }
        }
    }
    let n_crossings = points.len() - n_a - n_b;

    if n_crossings == 0 {
        if all_inside(b.points(), a) {
            return Ok(Union::FirstContainsSecond);
        }
        if all_inside(a.points(), b) {
            return Ok(Union::SecondContainsFirst);
        }
        return Ok(Union::Disjoint);
    }
    if n_crossings % 2 == 1 {
        return Err(MergeError::UnsupportedIntersectionTopology { count: n_crossings });
    }

    let arena = Arena { points, n_a, n_b };
    let succ_a = cut_open(&arena, a, |i| arena.a(i), &mut on_a);
    let succ_b = cut_open(&arena, b, |j| arena.b(j), &mut on_b);

    let tables = [&succ_a, &succ_b];
    let required = a.area().max(b.area());
    let mut last_err = MergeError::NoOuterStart;
    for (start, first_is_a) in outer_starts(&arena) {
        let attempt = walk(&arena, tables, start, first_is_a).and_then(|ring| {
            let merged = BareHull::from_ring(ring)?;
            let area = merged.area();
            if area + AREA_EPS * required.max(1.0) < required {
                return Err(MergeError::ShrunkenUnion { area, required });
            }
            Ok(merged)
        });
        match attempt {
            Ok(merged) => return Ok(Union::Merged(merged)),
            Err(err) => {
                debug!(start = start.0, error = %err, "walk rejected; trying next outer start");
                last_err = err;
            }
        }
    }
    Err(last_err)
}

/// Follow successors from `start`, hopping tables at every crossing.
fn walk(
    arena: &Arena,
    tables: [&Successors; 2],
    start: VertexId,
    first_is_a: bool,
) -> Result<Vec<Pt2>, MergeError> {
    let mut current = if first_is_a { 0 } else { 1 };
    let mut ring: Vec<VertexId> = vec![start];
    let max_steps = arena.points.len() + 1;
    loop {
        let last = ring[ring.len() - 1];
        let next = tables[current]
            .get(last)
            .ok_or(MergeError::OpenWalk { steps: ring.len() })?;
        if next == start {
            break;
        }
        if ring.len() >= max_steps {
            return Err(MergeError::OpenWalk { steps: ring.len() });
        }
        ring.push(next);
        let other = 1 - current;
        if tables[other].contains(next) {
            current = other;
        }
    }
    Ok(ring.into_iter().map(|v| arena.points[v.0]).collect())
}

/// Successor table for one boundary with its crossings spliced in.
fn cut_open(
    arena: &Arena,
    hull: &BareHull,
    id_of: impl Fn(usize) -> VertexId,
    crossings: &mut [Vec<VertexId>],
) -> Successors {
    let mut succ = Successors::with_len(arena.points.len());
    for (i, j) in hull.i_segments() {
        let origin = hull.points()[i];
        let on_segment = &mut crossings[i];
        // Stable: equal distances keep segment-pair enumeration order.
        on_segment.sort_by(|p, q| {
            let dp = (arena.points[p.0] - origin).norm_squared();
            let dq = (arena.points[q.0] - origin).norm_squared();
            dp.total_cmp(&dq)
        });
        let mut src = id_of(i);
        for &x in on_segment.iter() {
            succ.link(src, x);
            src = x;
        }
        succ.link(src, id_of(j));
    }
    succ
}

/// Walk starts on the arena's convex hull: A vertices by ascending id, then
/// B vertices.
fn outer_starts(arena: &Arena) -> Vec<(VertexId, bool)> {
    let mut hull: Vec<VertexId> = convex_hull_indices(&arena.points)
        .into_iter()
        .map(VertexId)
        .collect();
    hull.sort();
    let from_a = hull.iter().filter(|v| arena.is_a(**v)).map(|v| (*v, true));
    let from_b = hull.iter().filter(|v| arena.is_b(**v)).map(|v| (*v, false));
    from_a.chain(from_b).collect()
}

/// Every point strictly inside the convex envelope of `hull`.
fn all_inside(points: &[Pt2], hull: &BareHull) -> bool {
    let envelope = hull.convex_envelope();
    classify(points, &envelope).into_iter().all(|inside| inside)
}
