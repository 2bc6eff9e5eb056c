/// Navmesh area classification, matching the walkable-area convention of
/// the downstream voxel engine (63 is the fully walkable area id).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum AreaType {
    #[default]
    Unwalkable = 0,
    Stairs = 1,
    Elevator = 2,
    Escalator = 3,
    MovingWalkway = 4,
    Walkable = 63,
}

impl AreaType {
    pub fn id(self) -> u8 {
        self as u8
    }
}
