//! MBR partition scanner

use crate::device::SECTOR_SIZE;
use crate::mbr::MasterBootRecord;
use crate::partition::Partition;
use crate::tree::{BlockDeviceTree, DeviceId};

/// Read sector 0 of `disk` and register one partition device per occupied
/// MBR entry, in table order. Returns the number of partitions created.
///
/// A failed read or a sector without the MBR signature is not an error;
/// the disk is simply left unpartitioned.
pub(crate) fn scan_partitions(tree: &mut BlockDeviceTree, disk: DeviceId) -> usize {
    let mut sector = [0u8; SECTOR_SIZE];
    if let Err(err) = tree.read_sector(disk, &mut sector, 0, 1) {
        blk_debug!("disk {}: sector 0 unreadable ({}), not scanning", disk.index(), err);
        return 0;
    }

    let Some(mbr) = MasterBootRecord::parse(&sector) else {
        blk_debug!("disk {}: no MBR signature", disk.index());
        return 0;
    };
    blk_debug!("disk {}: MBR with {} occupied entries", disk.index(), mbr.partition_count());

    let mut created = 0;
    for (slot, entry) in mbr.occupied() {
        let partition = Partition::new(entry.start_sector, entry.sector_count);
        match tree.add_partition(disk, partition) {
            Ok(id) => {
                blk_debug!(
                    "disk {}: slot {} -> device {} (sectors {}..{}, {})",
                    disk.index(),
                    slot,
                    id.index(),
                    partition.start_sector,
                    partition.end_sector(),
                    entry.partition_type().description()
                );
                created += 1;
            }
            Err(err) => {
                blk_warn!("disk {}: slot {} not registered: {}", disk.index(), slot, err);
            }
        }
    }
    created
}
