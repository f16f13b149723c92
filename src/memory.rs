// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

use itertools::Itertools;
use std::fmt;

/// Fixed-length working memory for a single run.
///
/// Unlike later Intcode revisions, memory never grows: every address must lie in `[0, len)`.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Memory {
    cells: Box<[i64]>,
}

impl Memory {
    fn slot(&self, address: i64) -> Option<usize> {
        usize::try_from(address)
            .ok()
            .filter(|&i| i < self.cells.len())
    }

    /// Read the cell at `address`, or `None` if it is out of range
    pub fn get(&self, address: i64) -> Option<i64> {
        self.slot(address).map(|i| self.cells[i])
    }

    /// Mutable access to the cell at `address`, or `None` if it is out of range
    pub fn get_mut(&mut self, address: i64) -> Option<&mut i64> {
        self.slot(address).map(|i| &mut self.cells[i])
    }

    /// Whether `address` lies inside memory
    pub fn contains(&self, address: i64) -> bool {
        self.slot(address).is_some()
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether memory has no cells at all
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.cells
    }

    pub fn into_vec(self) -> Vec<i64> {
        self.cells.into_vec()
    }
}

impl FromIterator<i64> for Memory {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<i64>> for Memory {
    fn from(cells: Vec<i64>) -> Self {
        Self {
            cells: cells.into_boxed_slice(),
        }
    }
}

impl IntoIterator for Memory {
    type Item = i64;
    type IntoIter = std::vec::IntoIter<i64>;
    fn into_iter(self) -> Self::IntoIter {
        self.cells.into_vec().into_iter()
    }
}

impl std::ops::Index<i64> for Memory {
    type Output = i64;
    fn index(&self, i: i64) -> &i64 {
        match self.slot(i) {
            Some(i) => &self.cells[i],
            None => panic!("address {i} out of range for memory of length {}", self.len()),
        }
    }
}

impl std::ops::IndexMut<i64> for Memory {
    fn index_mut(&mut self, i: i64) -> &mut i64 {
        let len = self.len();
        match self.slot(i) {
            Some(i) => &mut self.cells[i],
            None => panic!("address {i} out of range for memory of length {len}"),
        }
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "[{}]", self.cells.iter().format(","))
    }
}
