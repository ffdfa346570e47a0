//! Cell grid indexer
//!
//! Towers sit on a rectangular grid and are numbered row-major from 1. The
//! ordinal in a tower's name determines its 4-connected neighbours and its
//! cell id; the ordinal in a UE's name determines its radio identifier.
//! Indexing runs once at startup, any failure here is a configuration fault.

use std::collections::BTreeMap;

use ransim_common::{Tower, Ue};
use thiserror::Error;
use tracing::info;

/// Errors raised while indexing towers and UEs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    /// The name carries no decimal ordinal
    #[error("cannot parse an ordinal from name {0:?}")]
    InvalidName(String),

    /// The ordinal does not address a grid position
    #[error("ordinal {ordinal} is outside the {rows}x{cols} grid")]
    OutOfGrid {
        /// Parsed ordinal
        ordinal: u32,
        /// Grid rows
        rows: u32,
        /// Grid columns
        cols: u32,
    },

    /// Rows or columns are zero
    #[error("invalid grid dimensions {rows}x{cols}")]
    InvalidDimensions {
        /// Grid rows
        rows: u32,
        /// Grid columns
        cols: u32,
    },
}

/// Rectangular tower grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    rows: u32,
    cols: u32,
}

impl GridShape {
    /// Creates a grid shape, rejecting empty grids.
    pub fn new(rows: u32, cols: u32) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::InvalidDimensions { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    /// Number of rows.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Number of grid positions.
    pub fn len(&self) -> u32 {
        self.rows * self.cols
    }

    /// Always false, a shape has at least one position.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns `(row, col)` of a 1-based ordinal.
    pub fn position(&self, ordinal: u32) -> Result<(u32, u32), GridError> {
        if ordinal == 0 || ordinal > self.len() {
            return Err(GridError::OutOfGrid {
                ordinal,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let index = ordinal - 1;
        Ok((index / self.cols, index % self.cols))
    }

    /// Returns the 1-based ordinal at `(row, col)`.
    pub fn ordinal_at(&self, row: u32, col: u32) -> u32 {
        row * self.cols + col + 1
    }
}

/// Extracts the first run of decimal digits from an entity name.
pub fn parse_ordinal(name: &str) -> Result<u32, GridError> {
    let digits: String = name
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits
        .parse()
        .map_err(|_| GridError::InvalidName(name.to_string()))
}

/// Name of the tower with the given ordinal.
pub fn tower_name(ordinal: u32) -> String {
    format!("Tower-{ordinal}")
}

/// Returns the up, left, right and down neighbours that exist in the grid.
pub fn make_neighbors(name: &str, shape: GridShape) -> Result<Vec<String>, GridError> {
    let ordinal = parse_ordinal(name)?;
    let (row, col) = shape.position(ordinal)?;

    let mut neighbors = Vec::with_capacity(4);
    if row > 0 {
        neighbors.push(shape.ordinal_at(row - 1, col));
    }
    if col > 0 {
        neighbors.push(shape.ordinal_at(row, col - 1));
    }
    if col + 1 < shape.cols() {
        neighbors.push(shape.ordinal_at(row, col + 1));
    }
    if row + 1 < shape.rows() {
        neighbors.push(shape.ordinal_at(row + 1, col));
    }
    Ok(neighbors.into_iter().map(tower_name).collect())
}

/// Cell id: the tower ordinal as 7 upper-case hex digits.
pub fn make_ecid(name: &str) -> Result<String, GridError> {
    let ordinal = parse_ordinal(name)?;
    Ok(format!("{ordinal:07X}"))
}

/// Radio identifier: the UE ordinal plus one as 4 upper-case hex digits.
pub fn make_crnti(name: &str) -> Result<String, GridError> {
    let ordinal = parse_ordinal(name)?;
    Ok(format!("{:04X}", u64::from(ordinal) + 1))
}

/// Fills network identifiers, capacity and neighbours of every tower.
pub fn index_towers(
    towers: &mut BTreeMap<String, Tower>,
    shape: GridShape,
    plmn_id: &str,
    max_ues: u32,
) -> Result<(), GridError> {
    for tower in towers.values_mut() {
        tower.plmn_id = plmn_id.to_string();
        tower.ecid = make_ecid(&tower.name)?;
        tower.max_ues = max_ues;
        tower.neighbors = make_neighbors(&tower.name, shape)?;
        info!("Neighbors of {} - {}", tower.name, tower.neighbors.join(", "));
    }
    Ok(())
}

/// Fills the radio identifier of every UE.
pub fn index_ues(ues: &mut [Ue]) -> Result<(), GridError> {
    for ue in ues.iter_mut() {
        ue.crnti = make_crnti(&ue.name)?;
    }
    Ok(())
}
