use core::fmt;
use serde::{Deserialize, Serialize};

/// Single coordinate axis used for grid width, height, and positions.
pub type Coord = u8;

/// Count type used for cell indices and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(x, y)`, zero based.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Authenticated caller identity, as supplied by the surrounding platform.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identity(pub [u8; 20]);

impl Identity {
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// One-based, row-major index of a grid cell.
///
/// Cell `1` is the top-left corner `(0, 0)`; cell `width` is `(width - 1, 0)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellIndex(CellCount);

impl CellIndex {
    /// Caller is responsible for bounds; see [`crate::GridConfig::cell`] for the checked form.
    pub const fn new_unchecked(index: CellCount) -> Self {
        Self(index)
    }

    pub const fn get(self) -> CellCount {
        self.0
    }

    pub const fn from_coords((x, y): Coord2, width: Coord) -> Self {
        Self(y as CellCount * width as CellCount + x as CellCount + 1)
    }

    pub const fn to_coords(self, width: Coord) -> Coord2 {
        let zero_based = self.0 - 1;
        let width = width as CellCount;
        ((zero_based % width) as Coord, (zero_based / width) as Coord)
    }

    /// Next cell in probe order, wrapping from the last cell back to `1`.
    pub(crate) const fn next_wrapping(self, total_cells: CellCount) -> Self {
        Self((self.0 % total_cells) + 1)
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<CellIndex> for u32 {
    fn from(cell: CellIndex) -> Self {
        cell.0.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn coords_round_trip_on_row_major_layout() {
        let width = 20;
        assert_eq!(CellIndex::new_unchecked(1).to_coords(width), (0, 0));
        assert_eq!(CellIndex::new_unchecked(20).to_coords(width), (19, 0));
        assert_eq!(CellIndex::new_unchecked(21).to_coords(width), (0, 1));
        assert_eq!(CellIndex::from_coords((19, 19), width).get(), 400);
    }

    #[test]
    fn probing_wraps_to_first_cell() {
        assert_eq!(CellIndex::new_unchecked(4).next_wrapping(4).get(), 1);
        assert_eq!(CellIndex::new_unchecked(2).next_wrapping(4).get(), 3);
    }

    #[test]
    fn identity_displays_as_hex() {
        let mut bytes = [0u8; 20];
        bytes[19] = 0xab;
        assert_eq!(
            Identity::from_bytes(bytes).to_string(),
            "0x00000000000000000000000000000000000000ab"
        );
    }
}
