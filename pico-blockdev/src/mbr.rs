//! Master Boot Record (MBR) parsing
//!
//! Parses the classic DOS partition table found in sector 0 of a disk.
//! Only the four primary entries are decoded; CHS fields are ignored.

use static_assertions::const_assert_eq;

use crate::device::SECTOR_SIZE;

/// MBR signature bytes at offset 510-511
pub const MBR_SIGNATURE: [u8; 2] = [0x55, 0xAA];

/// MBR signature offset
pub const MBR_SIGNATURE_OFFSET: usize = 510;

/// Offset of the partition table within the sector
pub const PARTITION_TABLE_OFFSET: usize = 0x1BE;

/// Partition entry size
pub const PARTITION_ENTRY_SIZE: usize = 16;

/// Number of partition entries in MBR
pub const MAX_PARTITIONS: usize = 4;

const_assert_eq!(
    PARTITION_TABLE_OFFSET + MAX_PARTITIONS * PARTITION_ENTRY_SIZE,
    MBR_SIGNATURE_OFFSET
);
const_assert_eq!(MBR_SIGNATURE_OFFSET + MBR_SIGNATURE.len(), SECTOR_SIZE);

/// Partition type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionType {
    Empty,
    FAT12,
    FAT16,
    FAT32,
    Extended,
    NTFS,
    Linux,
    LVM,
    GptProtective,
    Unknown(u8),
}

impl PartitionType {
    pub fn from_code(code: u8) -> Self {
        match code {
            0x00 => Self::Empty,
            0x01 => Self::FAT12,
            0x04 | 0x06 | 0x0E => Self::FAT16,
            0x0B | 0x0C | 0x1B | 0x1C => Self::FAT32,
            0x05 | 0x0F => Self::Extended,
            0x07 => Self::NTFS,
            0x83 => Self::Linux,
            0x8E => Self::LVM,
            0xEE => Self::GptProtective,
            _ => Self::Unknown(code),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Empty => "Empty",
            Self::FAT12 => "FAT12",
            Self::FAT16 => "FAT16",
            Self::FAT32 => "FAT32",
            Self::Extended => "Extended",
            Self::NTFS => "NTFS/exFAT",
            Self::Linux => "Linux",
            Self::LVM => "LVM",
            Self::GptProtective => "GPT protective",
            Self::Unknown(_) => "Unknown",
        }
    }
}

/// MBR partition entry (16 bytes on disk)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MbrPartitionEntry {
    /// Status / boot indicator byte (0x80 = bootable)
    pub boot_indicator: u8,
    /// System id byte
    pub type_code: u8,
    /// First absolute sector
    pub start_sector: u32,
    /// Number of sectors
    pub sector_count: u32,
}

impl MbrPartitionEntry {
    /// Parse from a 16-byte table entry
    pub fn from_bytes(data: &[u8; PARTITION_ENTRY_SIZE]) -> Self {
        Self {
            boot_indicator: data[0],
            type_code: data[4],
            start_sector: u32::from_le_bytes([data[8], data[9], data[10], data[11]]),
            sector_count: u32::from_le_bytes([data[12], data[13], data[14], data[15]]),
        }
    }

    /// Whether the scanner treats this slot as holding a partition.
    ///
    /// The status byte is the occupancy signal, not the type byte: an entry
    /// with a type but a zero status byte is skipped, and an entry with a
    /// non-zero status byte is taken even when its type is `Empty`.
    pub fn is_occupied(&self) -> bool {
        self.boot_indicator != 0
    }

    pub fn partition_type(&self) -> PartitionType {
        PartitionType::from_code(self.type_code)
    }

    pub fn is_bootable(&self) -> bool {
        self.boot_indicator == 0x80
    }

    /// Get partition end sector (exclusive)
    pub fn end_sector(&self) -> u32 {
        self.start_sector.saturating_add(self.sector_count)
    }
}

/// Master Boot Record
#[derive(Debug, Clone, Copy)]
pub struct MasterBootRecord {
    pub entries: [MbrPartitionEntry; MAX_PARTITIONS],
}

impl MasterBootRecord {
    /// Parse MBR from sector 0 data.
    ///
    /// Returns `None` if the buffer is shorter than a sector or the
    /// `0x55 0xAA` signature is missing.
    pub fn parse(sector: &[u8]) -> Option<Self> {
        if sector.len() < SECTOR_SIZE {
            return None;
        }
        if sector[MBR_SIGNATURE_OFFSET..MBR_SIGNATURE_OFFSET + 2] != MBR_SIGNATURE {
            return None;
        }

        let mut entries = [MbrPartitionEntry {
            boot_indicator: 0,
            type_code: 0,
            start_sector: 0,
            sector_count: 0,
        }; MAX_PARTITIONS];

        for (i, entry) in entries.iter_mut().enumerate() {
            let offset = PARTITION_TABLE_OFFSET + i * PARTITION_ENTRY_SIZE;
            let mut raw = [0u8; PARTITION_ENTRY_SIZE];
            raw.copy_from_slice(&sector[offset..offset + PARTITION_ENTRY_SIZE]);
            *entry = MbrPartitionEntry::from_bytes(&raw);
        }

        Some(Self { entries })
    }

    /// Occupied entries with their table slot, in slot order 0..3
    pub fn occupied(&self) -> impl Iterator<Item = (usize, &MbrPartitionEntry)> {
        self.entries.iter().enumerate().filter(|(_, e)| e.is_occupied())
    }

    /// Count occupied partitions
    pub fn partition_count(&self) -> usize {
        self.occupied().count()
    }

    /// Get partition by table slot
    pub fn partition(&self, index: usize) -> Option<&MbrPartitionEntry> {
        self.entries.get(index).filter(|e| e.is_occupied())
    }
}
