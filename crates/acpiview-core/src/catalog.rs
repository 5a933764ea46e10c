//! Category catalog: the closed set of record kinds the data store knows.
//!
//! Adding a category is a build-time change. Numeric indices outside the
//! catalog are rejected with [`StoreError::InvalidCategory`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::store::StoreError;

/// Kinds of metadata that table decoders can push into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// PPTT processor hierarchy node structures.
    PpttProcs = 0,
    /// MADT GIC CPU interface (GICC) structures.
    MadtGicC = 1,
    /// Signatures of every installed ACPI table.
    InstalledTables = 2,
}

impl Category {
    /// Number of categories in the catalog.
    pub const COUNT: usize = 3;

    /// Every category, in index order.
    pub const ALL: [Category; Category::COUNT] = [
        Category::PpttProcs,
        Category::MadtGicC,
        Category::InstalledTables,
    ];

    /// Position of this category in the catalog.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short human-readable name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Category::PpttProcs => "PPTT processor",
            Category::MadtGicC => "MADT GICC",
            Category::InstalledTables => "installed table",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<usize> for Category {
    type Error = StoreError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Category::ALL
            .get(index)
            .copied()
            .ok_or(StoreError::InvalidCategory(index))
    }
}

impl TryFrom<u32> for Category {
    type Error = StoreError;

    fn try_from(index: u32) -> Result<Self, Self::Error> {
        Category::try_from(index as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_position() {
        for (position, category) in Category::ALL.iter().enumerate() {
            assert_eq!(category.index(), position);
            assert_eq!(Category::try_from(position).unwrap(), *category);
        }
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        assert!(matches!(
            Category::try_from(Category::COUNT),
            Err(StoreError::InvalidCategory(3))
        ));
        assert!(matches!(
            Category::try_from(u32::MAX),
            Err(StoreError::InvalidCategory(_))
        ));
    }

    #[test]
    fn test_categories_are_ordered() {
        assert!(Category::PpttProcs < Category::MadtGicC);
        assert!(Category::MadtGicC < Category::InstalledTables);
    }
}
