//! Fixed-offset payload layouts read by the validators.
//!
//! The data store keeps raw bytes and never interprets them, so every
//! validator states the layout it expects for each category it reads. All
//! multi-byte ACPI fields are little-endian.

use thiserror::Error;

use crate::catalog::Category;

/// A payload that is too short for the layout a validator expects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{category} record is {actual} bytes, expected at least {expected}")]
pub struct LayoutError {
    pub category: Category,
    pub expected: usize,
    pub actual: usize,
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&data[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}

fn check_len(category: Category, data: &[u8], expected: usize) -> Result<(), LayoutError> {
    if data.len() < expected {
        return Err(LayoutError {
            category,
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

/// MADT GIC CPU interface structure (GICC).
///
/// | offset | size | field |
/// |--------|------|-------|
/// | 0 | 1 | type (0x0B) |
/// | 1 | 1 | length |
/// | 4 | 4 | CPU interface number |
/// | 8 | 4 | ACPI processor UID |
/// | 12 | 4 | flags |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GiccEntry {
    pub cpu_interface_number: u32,
    pub acpi_processor_uid: u32,
    pub flags: u32,
}

impl GiccEntry {
    /// MADT interrupt controller structure type for a GICC.
    pub const TYPE: u8 = 0x0B;

    /// Length of a full ACPI 6.4 GICC structure.
    pub const LENGTH: u8 = 80;

    /// Bytes needed to read every field above.
    pub const MIN_LENGTH: usize = 16;

    /// Read a GICC from a stored payload.
    pub fn parse(data: &[u8]) -> Result<Self, LayoutError> {
        check_len(Category::MadtGicC, data, Self::MIN_LENGTH)?;
        Ok(Self {
            cpu_interface_number: read_u32(data, 4),
            acpi_processor_uid: read_u32(data, 8),
            flags: read_u32(data, 12),
        })
    }

    /// Read only the processor UID, which is all the cross-validation needs.
    pub fn parse_uid(data: &[u8]) -> Result<u32, LayoutError> {
        check_len(Category::MadtGicC, data, 12)?;
        Ok(read_u32(data, 8))
    }

    /// Encode as a full-length GICC structure.
    pub fn encode(&self) -> Vec<u8> {
        let mut data = vec![0u8; Self::LENGTH as usize];
        data[0] = Self::TYPE;
        data[1] = Self::LENGTH;
        data[4..8].copy_from_slice(&self.cpu_interface_number.to_le_bytes());
        data[8..12].copy_from_slice(&self.acpi_processor_uid.to_le_bytes());
        data[12..16].copy_from_slice(&self.flags.to_le_bytes());
        data
    }
}

/// PPTT processor hierarchy node structure.
///
/// | offset | size | field |
/// |--------|------|-------|
/// | 0 | 1 | type (0x00) |
/// | 1 | 1 | length |
/// | 4 | 4 | flags |
/// | 8 | 4 | parent |
/// | 12 | 4 | ACPI processor ID |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PpttProcessor {
    pub flags: u32,
    pub parent: u32,
    pub acpi_processor_id: u32,
}

impl PpttProcessor {
    /// PPTT structure type for a processor hierarchy node.
    pub const TYPE: u8 = 0x00;

    /// Length of a processor node with no private resources.
    pub const LENGTH: u8 = 20;

    /// Bytes needed to read every field above.
    pub const MIN_LENGTH: usize = 16;

    pub const FLAG_PHYSICAL_PACKAGE: u32 = 1 << 0;
    pub const FLAG_ACPI_ID_VALID: u32 = 1 << 1;
    pub const FLAG_IS_THREAD: u32 = 1 << 2;
    pub const FLAG_NODE_IS_LEAF: u32 = 1 << 3;

    /// Build a node for a processing unit or cluster.
    pub fn new(acpi_processor_id: u32, leaf: bool) -> Self {
        let mut flags = Self::FLAG_ACPI_ID_VALID;
        if leaf {
            flags |= Self::FLAG_NODE_IS_LEAF;
        }
        Self {
            flags,
            parent: 0,
            acpi_processor_id,
        }
    }

    /// Read a processor node from a stored payload.
    pub fn parse(data: &[u8]) -> Result<Self, LayoutError> {
        check_len(Category::PpttProcs, data, Self::MIN_LENGTH)?;
        Ok(Self {
            flags: read_u32(data, 4),
            parent: read_u32(data, 8),
            acpi_processor_id: read_u32(data, 12),
        })
    }

    /// Whether this node is an actual processing unit rather than a cluster.
    pub fn is_leaf(&self) -> bool {
        self.flags & Self::FLAG_NODE_IS_LEAF != 0
    }

    /// Encode as a processor node with no private resources.
    pub fn encode(&self) -> Vec<u8> {
        let mut data = vec![0u8; Self::LENGTH as usize];
        data[0] = Self::TYPE;
        data[1] = Self::LENGTH;
        data[4..8].copy_from_slice(&self.flags.to_le_bytes());
        data[8..12].copy_from_slice(&self.parent.to_le_bytes());
        data[12..16].copy_from_slice(&self.acpi_processor_id.to_le_bytes());
        data
    }
}

/// Installed table record: the packed 4-byte signature in native order.
pub fn parse_installed_signature(data: &[u8]) -> Result<u32, LayoutError> {
    check_len(Category::InstalledTables, data, 4)?;
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&data[..4]);
    Ok(u32::from_ne_bytes(bytes))
}

/// Encode an installed table record.
pub fn encode_installed_signature(signature: u32) -> [u8; 4] {
    signature.to_ne_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gicc_field_offsets() {
        let entry = GiccEntry {
            cpu_interface_number: 0x0102_0304,
            acpi_processor_uid: 7,
            flags: 1,
        };
        let data = entry.encode();

        assert_eq!(data.len(), 80);
        assert_eq!(data[0], 0x0B);
        assert_eq!(&data[8..12], &[7, 0, 0, 0]);
        assert_eq!(&data[4..8], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(GiccEntry::parse(&data).unwrap(), entry);
        assert_eq!(GiccEntry::parse_uid(&data).unwrap(), 7);
    }

    #[test]
    fn test_pptt_leaf_flag() {
        let leaf = PpttProcessor::new(4, true);
        let cluster = PpttProcessor::new(4, false);

        assert!(leaf.is_leaf());
        assert!(!cluster.is_leaf());

        let data = leaf.encode();
        assert_eq!(data[4] & 0x08, 0x08);
        assert_eq!(&data[12..16], &[4, 0, 0, 0]);
        assert!(PpttProcessor::parse(&data).unwrap().is_leaf());
    }

    #[test]
    fn test_short_payloads_rejected() {
        let err = PpttProcessor::parse(&[0u8; 15]).unwrap_err();
        assert_eq!(err.category, Category::PpttProcs);
        assert_eq!(err.expected, 16);
        assert_eq!(err.actual, 15);

        assert!(GiccEntry::parse_uid(&[0u8; 11]).is_err());
        assert!(GiccEntry::parse_uid(&[0u8; 12]).is_ok());
        assert!(parse_installed_signature(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_installed_signature_native_order() {
        let signature = u32::from_ne_bytes(*b"APIC");
        let data = encode_installed_signature(signature);
        assert_eq!(&data, b"APIC");
        assert_eq!(parse_installed_signature(&data).unwrap(), signature);
    }
}
