//! Shared fixtures for the integration suites.

use ikura_core::{NeighbourOracle, OracleError, PointIndex};

/// Points on a line, searched by brute force. A query point counts as
/// its own nearest neighbour.
pub struct LinePoints {
    positions: Vec<f32>,
}

impl LinePoints {
    pub fn evenly_spaced(count: usize, spacing: f32) -> Self {
        Self {
            positions: (0..count).map(|i| i as f32 * spacing).collect(),
        }
    }

    pub fn from_positions(positions: Vec<f32>) -> Self {
        Self { positions }
    }
}

impl NeighbourOracle for LinePoints {
    fn len(&self) -> usize {
        self.positions.len()
    }

    fn name(&self) -> &str {
        "line-points"
    }

    fn search(
        &self,
        queries: &mut Vec<PointIndex>,
        k: usize,
        radius: Option<f32>,
        out: &mut Vec<PointIndex>,
    ) -> Result<(), OracleError> {
        if k == 0 || k > self.positions.len() {
            return Err(OracleError::InvalidK {
                k,
                points: self.positions.len(),
            });
        }
        out.clear();
        let mut kept = 0_usize;
        let mut candidates: Vec<(f32, PointIndex)> = Vec::with_capacity(self.positions.len());
        for slot in 0..queries.len() {
            let query = queries[slot] as usize;
            let origin = *self
                .positions
                .get(query)
                .ok_or(OracleError::OutOfBounds { index: query })?;
            candidates.clear();
            for (i, &position) in self.positions.iter().enumerate() {
                let distance = (position - origin).abs();
                if radius.map_or(true, |r| distance <= r) {
                    candidates.push((distance, i as PointIndex));
                }
            }
            if candidates.len() < k {
                continue;
            }
            candidates.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            queries[kept] = query as PointIndex;
            kept += 1;
            out.extend(candidates[..k].iter().map(|&(_, i)| i));
        }
        queries.truncate(kept);
        Ok(())
    }
}
