use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    pub width: Coord,
    pub height: Coord,
}

impl GridConfig {
    pub const DEFAULT_WIDTH: Coord = 20;
    pub const DEFAULT_HEIGHT: Coord = 20;

    pub const fn new_unchecked(width: Coord, height: Coord) -> Self {
        Self { width, height }
    }

    pub fn new(width: Coord, height: Coord) -> Result<Self> {
        Self::new_unchecked(width, height).validated()
    }

    /// Parses a `{ "width": .., "height": .. }` document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|err| {
            log::warn!("Rejected grid config: {err}");
            TileError::InvalidConfig
        })?;
        config.validated()
    }

    pub fn validated(self) -> Result<Self> {
        if self.width == 0 || self.height == 0 {
            return Err(TileError::InvalidConfig);
        }
        Ok(self)
    }

    pub const fn size(&self) -> Coord2 {
        (self.width, self.height)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.width, self.height)
    }

    pub const fn contains(&self, cell: CellIndex) -> bool {
        cell.get() >= 1 && cell.get() <= self.total_cells()
    }

    /// Checked conversion of a raw one-based index.
    pub fn cell(&self, index: CellCount) -> Result<CellIndex> {
        let cell = CellIndex::new_unchecked(index);
        if self.contains(cell) {
            Ok(cell)
        } else {
            Err(TileError::OutOfRange)
        }
    }

    pub fn cell_at(&self, coords: Coord2) -> Result<CellIndex> {
        if coords.0 < self.width && coords.1 < self.height {
            Ok(CellIndex::from_coords(coords, self.width))
        } else {
            Err(TileError::OutOfRange)
        }
    }

    pub fn coords_of(&self, cell: CellIndex) -> Result<Coord2> {
        if self.contains(cell) {
            Ok(cell.to_coords(self.width))
        } else {
            Err(TileError::OutOfRange)
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = CellIndex> + use<> {
        (1..=self.total_cells()).map(CellIndex::new_unchecked)
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::new_unchecked(Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT)
    }
}

/// Everything a host needs to stand up an in-memory engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub grid: GridConfig,
    /// Seed for handle generation in [`MockBackend`].
    #[serde(default)]
    pub backend_seed: u64,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|err| {
            log::warn!("Rejected engine config: {err}");
            TileError::InvalidConfig
        })?;
        config.grid.validated()?;
        Ok(config)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            backend_seed: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_is_twenty_by_twenty() {
        assert_eq!(GridConfig::default().total_cells(), 400);
    }

    #[test]
    fn zero_sized_grid_is_rejected() {
        assert_eq!(GridConfig::new(0, 5), Err(TileError::InvalidConfig));
        assert_eq!(GridConfig::new(5, 0), Err(TileError::InvalidConfig));
    }

    #[test]
    fn cell_bounds_are_one_based() {
        let grid = GridConfig::new(2, 2).unwrap();
        assert_eq!(grid.cell(0), Err(TileError::OutOfRange));
        assert_eq!(grid.cell(5), Err(TileError::OutOfRange));
        assert_eq!(grid.cell(4).unwrap().get(), 4);
        assert_eq!(grid.cell_at((1, 1)).unwrap().get(), 4);
        assert_eq!(grid.cell_at((2, 0)), Err(TileError::OutOfRange));
    }

    #[test]
    fn parses_json_config() {
        let grid = GridConfig::from_json(r#"{ "width": 3, "height": 7 }"#).unwrap();
        assert_eq!(grid.size(), (3, 7));
        assert_eq!(
            GridConfig::from_json(r#"{ "width": 0, "height": 7 }"#),
            Err(TileError::InvalidConfig)
        );
        assert_eq!(GridConfig::from_json("nonsense"), Err(TileError::InvalidConfig));
    }

    #[test]
    fn engine_config_defaults_missing_fields() {
        let config = EngineConfig::from_json(r#"{ "backend_seed": 9 }"#).unwrap();
        assert_eq!(config.grid, GridConfig::default());
        assert_eq!(config.backend_seed, 9);
    }
}
