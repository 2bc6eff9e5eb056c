//! Solver parameters for the downstream voxel/contour/poly/detail stage.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionType {
    Watershed,
    Monotone,
    Layers,
}

impl PartitionType {
    pub fn id(self) -> u8 {
        match self {
            PartitionType::Watershed => 0,
            PartitionType::Monotone => 1,
            PartitionType::Layers => 2,
        }
    }
}

/// Agent and rasterization constants handed to the voxel pipeline.
///
/// All lengths are meters, the slope is degrees, areas are in cells.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavMeshSettings {
    pub cell_size: f64,
    pub cell_height: f64,
    pub agent_height: f64,
    pub agent_radius: f64,
    pub agent_max_climb: f64,
    pub agent_max_slope: f64,
    pub region_min_area: f64,
    pub region_merge_area: f64,
    pub max_edge_len: f64,
    pub max_simplification_error: f64,
    pub detail_sample_dist: f64,
    pub detail_sample_max_error: f64,
    pub partition_type: PartitionType,
}

impl Default for NavMeshSettings {
    fn default() -> Self {
        NavMeshSettings {
            cell_size: 0.2,
            cell_height: 0.2,
            agent_height: 1.8,
            agent_radius: 0.3,
            agent_max_climb: 0.5,
            agent_max_slope: 45.0,
            region_min_area: 8.0,
            region_merge_area: 20.0,
            max_edge_len: 12.0,
            max_simplification_error: 1.3,
            detail_sample_dist: 6.0,
            detail_sample_max_error: 1.0,
            partition_type: PartitionType::Monotone,
        }
    }
}

impl NavMeshSettings {
    /// Rejects parameter combinations the voxel stage cannot work with.
    pub fn validate(&self) -> Result<(), String> {
        if self.cell_size <= 0.0 || self.cell_height <= 0.0 {
            return Err("cell size and height must be positive".into());
        }
        if self.agent_height <= 0.0 || self.agent_radius < 0.0 {
            return Err("agent dimensions must be positive".into());
        }
        if !(0.0..90.0).contains(&self.agent_max_slope) {
            return Err("agent max slope must be in [0, 90)".into());
        }
        Ok(())
    }
}
