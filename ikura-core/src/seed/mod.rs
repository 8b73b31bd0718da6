//! Seed selection over nearest-neighbour digraphs.
//!
//! A seed is a vertex whose closed out-neighbourhood becomes one
//! cluster. Seeds must have at least one out-arc and pairwise disjoint
//! closed neighbourhoods; the methods below differ only in the order in
//! which candidate vertices are examined, which is what decides how many
//! seeds (and therefore clusters) the scan yields.

mod exclusion;
mod inwards;


pub(crate) use inwards::InwardsOrder;

use crate::{
    clustering::ClusterLabel,
    digraph::{Digraph, PointIndex},
    error::{Error, ErrorCode, Result},
    mem,
};

/// Vertex examination order used by [`find_seeds`].
///
/// The updating variants maintain the in-degree order live: claiming a
/// vertex for a cluster decrements the counts of vertices that lose a
/// potential seed-making in-arc, pulling them forward in the scan.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum SeedMethod {
    /// Scan vertices in index order.
    Lexical,
    /// Scan vertices by ascending in-degree of the NNG.
    #[default]
    InwardsOrder,
    /// As [`SeedMethod::InwardsOrder`], decrementing counts of
    /// neighbours' neighbours when a seed is accepted.
    InwardsUpdating,
    /// As [`SeedMethod::InwardsUpdating`], also decrementing direct
    /// neighbours when a candidate is skipped without being claimed.
    InwardsAltUpdating,
    /// Scan by ascending in-degree of the exclusion graph.
    ExclusionOrder,
    /// As [`SeedMethod::ExclusionOrder`], with live decrements.
    ExclusionUpdating,
}

/// Selects a maximal set of seeds from `nng` under `method`.
///
/// Every returned seed has at least one out-arc, and no two seeds have
/// overlapping closed out-neighbourhoods. The seed order determines the
/// cluster labels assigned downstream.
///
/// # Errors
/// [`ErrorCode::InvalidInput`] when `nng` has fewer than two vertices or
/// no arcs; [`ErrorCode::TooLargeProblem`] when the seed count would
/// reach the cluster label capacity; allocation failures as
/// [`ErrorCode::NoMemory`].
///
/// # Examples
/// ```
/// use ikura_core::{Digraph, SeedMethod, find_seeds};
///
/// let nng = Digraph::from_rows(6, &[&[1], &[0], &[3], &[2], &[5], &[4]])?;
/// let seeds = find_seeds(&nng, SeedMethod::Lexical)?;
/// assert_eq!(seeds, vec![0, 2, 4]);
/// # Ok::<(), ikura_core::Error>(())
/// ```
pub fn find_seeds(nng: &Digraph, method: SeedMethod) -> Result<Vec<PointIndex>> {
    if nng.vertex_count() < 2 {
        return Err(Error::with_message(
            ErrorCode::InvalidInput,
            "seed finding requires at least two vertices",
        ));
    }
    if nng.is_empty() {
        return Err(Error::with_message(
            ErrorCode::InvalidInput,
            "the nearest-neighbour digraph has no arcs",
        ));
    }
    #[cfg(feature = "extensive-checks")]
    {
        if !nng.is_valid() {
            return Err(Error::with_message(
                ErrorCode::InvalidInput,
                "the nearest-neighbour digraph failed the structural audit",
            ));
        }
    }

    let mut seeds = SeedResult::with_capacity_hint(nng.vertex_count())?;
    match method {
        SeedMethod::Lexical => find_seeds_lexical(nng, &mut seeds)?,
        SeedMethod::InwardsOrder => find_seeds_inwards(nng, false, &mut seeds)?,
        SeedMethod::InwardsUpdating => find_seeds_inwards(nng, true, &mut seeds)?,
        SeedMethod::InwardsAltUpdating => find_seeds_inwards_alt(nng, &mut seeds)?,
        SeedMethod::ExclusionOrder => exclusion::find_seeds_exclusion(nng, false, &mut seeds)?,
        SeedMethod::ExclusionUpdating => exclusion::find_seeds_exclusion(nng, true, &mut seeds)?,
    }

    tracing::debug!(
        method = ?method,
        vertices = nng.vertex_count(),
        seeds = seeds.len(),
        "seed selection finished"
    );
    Ok(seeds.into_seeds())
}

/// Seed list under construction.
///
/// Growth follows a fixed schedule (an eighth plus a constant, capped at
/// the label capacity) so near-capacity problems degrade predictably
/// instead of doubling past the cap.
pub(crate) struct SeedResult {
    seeds: Vec<PointIndex>,
}

impl SeedResult {
    fn with_capacity_hint(vertices: usize) -> Result<Self> {
        let capacity = (vertices / 16 + 8).min(ClusterLabel::MAX_CLUSTERS);
        Ok(Self {
            seeds: mem::try_vec_with_capacity(capacity)?,
        })
    }

    pub(crate) fn push(&mut self, seed: PointIndex) -> Result<()> {
        if self.seeds.len() == ClusterLabel::MAX_CLUSTERS {
            return Err(Error::with_message(
                ErrorCode::TooLargeProblem,
                "too many clusters for the cluster label type",
            ));
        }
        if self.seeds.len() == self.seeds.capacity() {
            let target = (self.seeds.capacity() + self.seeds.capacity() / 8 + 1024)
                .min(ClusterLabel::MAX_CLUSTERS);
            let additional = target - self.seeds.len();
            if self.seeds.try_reserve_exact(additional).is_err() {
                return Err(Error::new(ErrorCode::NoMemory));
            }
        }
        self.seeds.push(seed);
        Ok(())
    }

    fn len(&self) -> usize {
        self.seeds.len()
    }

    fn into_seeds(mut self) -> Vec<PointIndex> {
        self.seeds.shrink_to_fit();
        self.seeds
    }
}

/// A vertex can seed iff it is unclaimed, has out-arcs, and all of its
/// out-neighbours are unclaimed.
fn seedable(v: usize, nng: &Digraph, marks: &[bool]) -> bool {
    if marks[v] {
        return false;
    }
    let row = nng.out(v);
    !row.is_empty() && row.iter().all(|&x| !marks[x as usize])
}

fn mark_seed_and_neighbours(seed: usize, nng: &Digraph, marks: &mut [bool]) {
    for &x in nng.out(seed) {
        debug_assert!(!marks[x as usize]);
        marks[x as usize] = true;
    }
    marks[seed] = true; // seed last, so a self-loop does not trip the assert
}

fn find_seeds_lexical(nng: &Digraph, seeds: &mut SeedResult) -> Result<()> {
    let mut marks = mem::try_filled_vec(false, nng.vertex_count())?;
    for v in 0..nng.vertex_count() {
        if seedable(v, nng, &marks) {
            seeds.push(v as PointIndex)?;
            mark_seed_and_neighbours(v, nng, &mut marks);
        }
    }
    Ok(())
}

fn find_seeds_inwards(nng: &Digraph, updating: bool, seeds: &mut SeedResult) -> Result<()> {
    let mut order = InwardsOrder::new(nng, updating)?;
    let mut marks = mem::try_filled_vec(false, nng.vertex_count())?;

    for cursor in 0..nng.vertex_count() {
        #[cfg(all(feature = "stable", debug_assertions))]
        {
            if updating {
                order.debug_check_sort(cursor);
            }
        }

        let v = order.sorted()[cursor] as usize;
        if !seedable(v, nng, &marks) {
            continue;
        }
        seeds.push(v as PointIndex)?;
        mark_seed_and_neighbours(v, nng, &mut marks);

        if updating {
            // Each claimed neighbour `a` stops being a potential seed, so
            // every still-viable `b` pointed at by `a` loses one in-arc
            // that could have made it part of a seed's neighbourhood.
            for &a in nng.out(v) {
                for &b in nng.out(a as usize) {
                    let bu = b as usize;
                    if !marks[bu] && cursor < order.position_of(bu) && !nng.out(bu).is_empty() {
                        order.decrement(b, cursor);
                    }
                }
            }
        }
    }
    Ok(())
}

/// Alternative updating scan: decrements also fire when a candidate is
/// passed over without being claimed, and the accept path only expands
/// through neighbours the scan has not yet finalised.
fn find_seeds_inwards_alt(nng: &Digraph, seeds: &mut SeedResult) -> Result<()> {
    let mut order = InwardsOrder::new(nng, true)?;
    let mut marks = mem::try_filled_vec(false, nng.vertex_count())?;

    for cursor in 0..nng.vertex_count() {
        #[cfg(all(feature = "stable", debug_assertions))]
        {
            order.debug_check_sort(cursor);
        }

        let v = order.sorted()[cursor] as usize;
        if seedable(v, nng, &marks) {
            seeds.push(v as PointIndex)?;
            mark_seed_and_neighbours(v, nng, &mut marks);

            for &a in nng.out(v) {
                if cursor < order.position_of(a as usize) {
                    for &b in nng.out(a as usize) {
                        let bu = b as usize;
                        if !marks[bu] && cursor < order.position_of(bu) && !nng.out(bu).is_empty()
                        {
                            order.decrement(b, cursor);
                        }
                    }
                }
            }
        } else if !marks[v] {
            for &a in nng.out(v) {
                let au = a as usize;
                if !marks[au] && cursor < order.position_of(au) && !nng.out(au).is_empty() {
                    order.decrement(a, cursor);
                }
            }
        }
    }
    Ok(())
}
