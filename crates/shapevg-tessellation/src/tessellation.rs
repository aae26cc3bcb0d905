use shapevg_mesh::{MeshSink, ShapeMesh};

use crate::curve::DEFAULT_LUT_PRECISION;
use crate::error::TessellationError;
use crate::pool::BufferPool;
use crate::ring::RingVertex;
use crate::shape::{Shape, ShapeBuilder, StrokeVertex};

/// The scratch buffers a tessellation call leases from.
///
/// Not `Sync`. Use one set per thread, or [`with_shared_pools`].
#[derive(Debug)]
pub struct BufferPools {
    pub(crate) rings: BufferPool<RingVertex>,
    pub(crate) strokes: BufferPool<StrokeVertex>,
    pub(crate) lengths: BufferPool<f32>,
    lut_precision: usize,
}

impl BufferPools {
    pub fn new() -> Self {
        Self {
            rings: BufferPool::new(),
            strokes: BufferPool::new(),
            lengths: BufferPool::new(),
            lut_precision: DEFAULT_LUT_PRECISION,
        }
    }

    /// Sets the number of samples of the arc-length tables used for splines.
    pub fn with_lut_precision(mut self, precision: usize) -> Self {
        self.lut_precision = precision.max(1);
        self
    }

    pub fn lut_precision(&self) -> usize {
        self.lut_precision
    }

    /// Leases not handed back yet, over all pools.
    pub fn outstanding_leases(&self) -> usize {
        self.rings.outstanding_leases()
            + self.strokes.outstanding_leases()
            + self.lengths.outstanding_leases()
    }
}

impl Default for BufferPools {
    fn default() -> Self {
        Self::new()
    }
}

/// Replaces the contents of `sink` with the mesh of `shape`.
///
/// On error the sink is left empty.
pub fn tessellate<S: MeshSink>(
    shape: &Shape,
    pools: &BufferPools,
    sink: &mut S,
) -> Result<(), TessellationError> {
    sink.clear();
    shape.validate()?;

    let budget = shape.budget();
    log::trace!(
        "tessellating {}: {} records, {} vertices, {} triangles",
        shape.name(),
        budget.ring_records,
        budget.vertices,
        budget.triangles
    );
    sink.reserve(budget.vertices, budget.triangles);

    if let Err(e) = shape.build(pools, sink) {
        sink.clear();
        return Err(e);
    }
    Ok(())
}

/// Owns a set of pools and turns shapes into standalone meshes.
#[derive(Debug, Default)]
pub struct Tessellator {
    pools: BufferPools,
}

impl Tessellator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lut_precision(self, precision: usize) -> Self {
        Self {
            pools: self.pools.with_lut_precision(precision),
        }
    }

    pub fn pools(&self) -> &BufferPools {
        &self.pools
    }

    pub fn tessellate(&mut self, shape: &Shape) -> Result<ShapeMesh, TessellationError> {
        let mut mesh = ShapeMesh::new();
        self.tessellate_into(shape, &mut mesh)?;
        Ok(mesh)
    }

    /// Like [`tessellate`](Self::tessellate), reusing the allocations of `sink`.
    pub fn tessellate_into<S: MeshSink>(
        &mut self,
        shape: &Shape,
        sink: &mut S,
    ) -> Result<(), TessellationError> {
        tessellate(shape, &self.pools, sink)
    }
}

thread_local! {
    static SHARED_POOLS: BufferPools = BufferPools::new();
}

/// Runs `f` with the pools of the current thread.
pub fn with_shared_pools<R>(f: impl FnOnce(&BufferPools) -> R) -> R {
    SHARED_POOLS.with(f)
}

/// [`tessellate`] using the pools of the current thread.
pub fn tessellate_shared<S: MeshSink>(shape: &Shape, sink: &mut S) -> Result<(), TessellationError> {
    with_shared_pools(|pools| tessellate(shape, pools, sink))
}
