//! The seam to the downstream solid-voxel navmesh engine.

use std::fmt;

use crate::builder::NavMeshBuildInput;
use crate::transform::NavMeshTransform;

/// A downstream stage failed; carries the stage name for the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavMeshStageError {
    pub stage: String,
}

impl NavMeshStageError {
    pub fn new(stage: impl Into<String>) -> Self {
        NavMeshStageError {
            stage: stage.into(),
        }
    }
}

impl fmt::Display for NavMeshStageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "navmesh stage failed: {}", self.stage)
    }
}

impl std::error::Error for NavMeshStageError {}

/// The finished routing artifact: the transform for mapping queries back
/// to geographic coordinates plus whatever the solver produced.
#[derive(Debug)]
pub struct NavMesh<T> {
    pub transform: NavMeshTransform,
    pub data: T,
}

/// The voxel/contour/poly/detail solver behind a thin adapter.
///
/// Implementations wrap the third-party engine; they run on the worker
/// thread and own the input buffers for the duration of the solve.
pub trait VoxelPipeline: Send + 'static {
    type Output: Send + 'static;

    fn build(&mut self, input: &NavMeshBuildInput) -> Result<Self::Output, NavMeshStageError>;
}

/// Test and dry-run pipeline: records input sizes, solves nothing.
#[derive(Debug, Default)]
pub struct NullPipeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NullPipelineStats {
    pub vertex_count: usize,
    pub triangle_count: usize,
    pub connection_count: usize,
}

impl VoxelPipeline for NullPipeline {
    type Output = NullPipelineStats;

    fn build(&mut self, input: &NavMeshBuildInput) -> Result<Self::Output, NavMeshStageError> {
        input
            .settings
            .validate()
            .map_err(|_| NavMeshStageError::new("validate settings"))?;
        Ok(NullPipelineStats {
            vertex_count: input.soup.vertex_count(),
            triangle_count: input.soup.triangle_count(),
            connection_count: input.connections.count(),
        })
    }
}
