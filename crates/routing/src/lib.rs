pub mod area;
pub mod builder;
pub mod debugio;
pub mod filter;
pub mod pipeline;
pub mod settings;
pub mod soup;
pub mod stroke;
pub mod transform;

pub use area::AreaType;
pub use builder::{NavMeshBuildInput, NavMeshBuilder, NavMeshJob};
pub use pipeline::{NavMesh, NavMeshStageError, VoxelPipeline};
pub use settings::{NavMeshSettings, PartitionType};
pub use soup::{LinkDirection, OffMeshConnections, TriangleSoup};
pub use transform::NavMeshTransform;
