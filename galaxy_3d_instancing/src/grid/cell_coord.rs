/// Integer cell coordinates within one grid level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCellCoord2 {
    pub x: i64,
    pub y: i64,
}

impl GridCellCoord2 {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Cell coordinates qualified by their grid level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCellCoord {
    pub x: i64,
    pub y: i64,
    pub level: usize,
}

impl GridCellCoord {
    pub fn new(x: i64, y: i64, level: usize) -> Self {
        Self { x, y, level }
    }

    /// Drop the level component
    pub fn xy(&self) -> GridCellCoord2 {
        GridCellCoord2::new(self.x, self.y)
    }
}
