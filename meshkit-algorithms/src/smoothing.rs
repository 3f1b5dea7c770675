//! Laplacian mesh smoothing.
//!
//! One call performs one relaxation step: every vertex is blended towards a
//! weighted average `S_i` of its neighbors,
//!
//! ```text
//! p_i' = (1 - alpha) * S_i + alpha * p_i
//! ```
//!
//! so `alpha = 1` leaves the mesh untouched and `alpha = 0` moves every vertex
//! all the way to its neighbor average.

use meshkit_core::{Error, Point3f, Result, TriangleMesh, Vector3f};

use crate::adjacency::CotangentCache;
use crate::normals::{recompute_normals, NormalWeighting};

/// Weight sums below this are treated as zero and the vertex is left in place.
const MIN_WEIGHT_SUM: f32 = 1e-6;

/// Neighbor weighting for the Laplacian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmoothingWeights {
    /// Every incident triangle contributes its other two vertices equally.
    Uniform,
    /// Cotangent edge weights (geometry-aware).
    #[default]
    Cotangent,
}

/// Options for [`laplacian_smooth`].
#[derive(Debug, Clone)]
pub struct SmoothOptions {
    /// Blend factor in `[0, 1]`; the weight kept on the original position.
    pub alpha: f32,

    /// How neighbors are weighted.
    pub weighting: SmoothingWeights,
}

impl Default for SmoothOptions {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            weighting: SmoothingWeights::Cotangent,
        }
    }
}

impl SmoothOptions {
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_weighting(mut self, weighting: SmoothingWeights) -> Self {
        self.weighting = weighting;
        self
    }

    /// Pick cotangent or uniform weights from a flag.
    pub fn with_cotangent(self, use_cotangent: bool) -> Self {
        self.with_weighting(if use_cotangent {
            SmoothingWeights::Cotangent
        } else {
            SmoothingWeights::Uniform
        })
    }
}

/// Apply one Laplacian smoothing step to `mesh` in place.
///
/// All targets are computed from the old positions before any vertex moves.
/// Afterwards normals are recomputed with uniform weighting. Cotangent
/// weights are taken from `cache`, which rebuilds them when stale.
///
/// Vertices without neighbors, or whose weights sum to (nearly) zero, keep
/// their position.
///
/// # Errors
/// [`Error::InvalidParameter`] if `alpha` lies outside `[0, 1]` and
/// [`Error::EmptyMesh`] for a mesh without vertices. The mesh is unchanged in
/// both cases.
///
/// # Example
/// ```rust
/// use meshkit_core::{Point3f, TriangleMesh};
/// use meshkit_algorithms::{laplacian_smooth, CotangentCache, SmoothOptions};
///
/// let mut mesh = TriangleMesh::from_vertices_and_faces(
///     vec![
///         Point3f::new(0.0, 0.0, 0.0),
///         Point3f::new(1.0, 0.0, 0.0),
///         Point3f::new(0.0, 1.0, 0.0),
///     ],
///     vec![[0, 1, 2]],
/// );
/// let mut cache = CotangentCache::default();
/// laplacian_smooth(&mut mesh, &SmoothOptions::default().with_alpha(0.9), &mut cache)?;
/// # Ok::<(), meshkit_core::Error>(())
/// ```
pub fn laplacian_smooth(
    mesh: &mut TriangleMesh,
    options: &SmoothOptions,
    cache: &mut CotangentCache,
) -> Result<()> {
    let alpha = options.alpha;
    if !(0.0..=1.0).contains(&alpha) {
        return Err(Error::invalid_param("alpha", alpha, "must be within [0, 1]"));
    }
    mesh.require_vertices()?;

    let targets = match options.weighting {
        SmoothingWeights::Cotangent => cotangent_targets(mesh, cache),
        SmoothingWeights::Uniform => uniform_targets(mesh),
    };

    let smoothed = mesh
        .vertices()
        .iter()
        .zip(&targets)
        .map(|(p, s)| Point3f::from(s.coords * (1.0 - alpha) + p.coords * alpha))
        .collect();

    mesh.set_positions(smoothed)?;
    recompute_normals(mesh, NormalWeighting::Uniform)?;

    log::debug!(
        "smoothed {} vertices (alpha = {alpha}, {:?} weights)",
        mesh.vertex_count(),
        options.weighting
    );
    Ok(())
}

/// `S_i = Σ w_ij p_j / Σ w_ij` over the cotangent-weighted neighbors.
fn cotangent_targets(mesh: &TriangleMesh, cache: &mut CotangentCache) -> Vec<Point3f> {
    let weights = cache.get_or_build(mesh);
    let positions = mesh.vertices();

    positions
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let mut sum = 0.0f32;
            let mut acc = Vector3f::zeros();
            for (&j, &w) in weights.neighbors(i) {
                sum += w;
                acc += positions[j].coords * w;
            }
            if sum.abs() < MIN_WEIGHT_SUM {
                p
            } else {
                Point3f::from(acc / sum)
            }
        })
        .collect()
}

/// Each incident triangle adds its two other vertices; the total is divided
/// by twice the number of incident triangles.
fn uniform_targets(mesh: &TriangleMesh) -> Vec<Point3f> {
    let positions = mesh.vertices();
    let mut sums = vec![Vector3f::zeros(); positions.len()];
    let mut counts = vec![0usize; positions.len()];

    for &[a, b, c] in mesh.faces() {
        let (pa, pb, pc) = (positions[a].coords, positions[b].coords, positions[c].coords);
        sums[a] += pb + pc;
        sums[b] += pa + pc;
        sums[c] += pa + pb;
        counts[a] += 2;
        counts[b] += 2;
        counts[c] += 2;
    }

    positions
        .iter()
        .zip(sums.iter().zip(&counts))
        .map(|(&p, (sum, &count))| {
            if count == 0 {
                p
            } else {
                Point3f::from(sum / count as f32)
            }
        })
        .collect()
}
