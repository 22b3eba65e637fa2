//! Block device tree tests

mod common;

use std::sync::Arc;

use mockall::mock;
use pico_api::{Error, Result};
use pico_blockdev::{BlockDevice, BlockDeviceTree, IoctlCommand, Partition, SECTOR_SIZE};

use common::{mbr_sector, shared, EventLog, RamDisk};

mock! {
    pub Disk {}

    impl BlockDevice for Disk {
        fn init(&self) -> Result<()>;
        fn read_sector(&self, buf: &mut [u8], start_sector: u32, count: u32) -> Result<()>;
        fn write_sector(&self, buf: &[u8], start_sector: u32, count: u32) -> Result<()>;
        fn ioctl(&self, cmd: IoctlCommand) -> Result<u32>;
    }
}

/// Mock whose sector 0 holds a single partition starting at 2048
fn mock_with_partition_at_2048() -> MockDisk {
    let sector0 = mbr_sector(&[(0, 0x80, 0x83, 2048, 4096)]);
    let mut disk = MockDisk::new();
    disk.expect_read_sector()
        .withf(|_, start, count| *start == 0 && *count == 1)
        .times(1)
        .returning(move |buf, _, _| {
            buf[..SECTOR_SIZE].copy_from_slice(&sector0);
            Ok(())
        });
    disk
}

#[test]
fn test_scan_creates_partitions_in_slot_order() {
    let sector0 = mbr_sector(&[(0, 0x80, 0x0C, 2048, 1000), (2, 0x01, 0x83, 8192, 500)]);
    let (_, disk) = shared(RamDisk::with_sector0(16384, &sector0));
    let log = Arc::new(EventLog::default());
    let mut tree = BlockDeviceTree::with_hook(log.clone());

    let root = tree.register(disk);

    assert_eq!(tree.children(root), Ok(2));
    let parts: Vec<_> = tree.partitions_of(root).collect();
    assert_eq!(parts.len(), 2);
    assert_eq!(tree.partition_info(parts[0]), Ok(Some(Partition::new(2048, 1000))));
    assert_eq!(tree.partition_info(parts[1]), Ok(Some(Partition::new(8192, 500))));
    assert_eq!(tree.parent(parts[0]), Ok(Some(root)));

    // Partitions are announced before the disk that spawned them
    let events = log.registered.lock().unwrap();
    let order: Vec<_> = events.iter().map(|info| info.id).collect();
    assert_eq!(order, vec![parts[0], parts[1], root]);
    assert_eq!(events[2].children, 2);
}

#[test]
fn test_missing_signature_leaves_disk_unpartitioned() {
    let mut sector0 = mbr_sector(&[(0, 0x80, 0x83, 2048, 1000)]);
    sector0[510] = 0;
    let (_, disk) = shared(RamDisk::with_sector0(4096, &sector0));
    let mut tree = BlockDeviceTree::new();

    let root = tree.register(disk);

    assert_eq!(tree.children(root), Ok(0));
    assert_eq!(tree.len(), 1);
}

#[test]
fn test_failed_read_is_silent() {
    let (ram, disk) = shared(RamDisk::failing(64));
    let mut tree = BlockDeviceTree::new();

    let root = tree.register(disk);

    assert_eq!(tree.children(root), Ok(0));
    assert_eq!(*ram.reads.lock().unwrap(), vec![(0, 1)]);
}

#[test]
fn test_partition_read_adds_start_offset() {
    let mut disk = mock_with_partition_at_2048();
    disk.expect_read_sector()
        .withf(|_, start, count| *start == 2058 && *count == 1)
        .times(1)
        .returning(|_, _, _| Ok(()));

    let mut tree = BlockDeviceTree::new();
    let root = tree.register(Arc::new(disk));
    let part = tree.partitions_of(root).next().unwrap();

    let mut buf = [0u8; SECTOR_SIZE];
    tree.read_sector(part, &mut buf, 10, 1).unwrap();
}

#[test]
fn test_partition_ioctl_size_is_local() {
    let mut disk = mock_with_partition_at_2048();
    disk.expect_ioctl()
        .withf(|cmd| *cmd == IoctlCommand::GetSectorSize)
        .times(1)
        .returning(|_| Ok(512));
    disk.expect_ioctl()
        .withf(|cmd| *cmd == IoctlCommand::Other(0x42))
        .times(1)
        .returning(|_| Err(Error::Errno(95)));

    let mut tree = BlockDeviceTree::new();
    let root = tree.register(Arc::new(disk));
    let part = tree.partitions_of(root).next().unwrap();

    assert_eq!(tree.ioctl(part, IoctlCommand::GetSize), Ok(4096));
    assert_eq!(tree.ioctl(part, IoctlCommand::GetSectorSize), Ok(512));
    assert_eq!(tree.ioctl(part, IoctlCommand::Other(0x42)), Err(Error::Errno(95)));
}

#[test]
fn test_partition_write_lands_at_absolute_sector() {
    let sector0 = mbr_sector(&[(1, 0x80, 0x83, 16, 16)]);
    let (ram, disk) = shared(RamDisk::with_sector0(64, &sector0));
    let mut tree = BlockDeviceTree::new();
    let root = tree.register(disk);
    let part = tree.partitions_of(root).next().unwrap();

    let payload = [0xA5u8; SECTOR_SIZE];
    tree.write_sector(part, &payload, 3, 1).unwrap();

    assert_eq!(*ram.writes.lock().unwrap(), vec![(19, 1)]);
    assert_eq!(ram.sector(19), payload.to_vec());

    let mut back = [0u8; SECTOR_SIZE];
    tree.read_sector(part, &mut back, 3, 1).unwrap();
    assert_eq!(back, payload);
}

#[test]
fn test_partition_without_parent_op_is_not_supported() {
    let mut disk = mock_with_partition_at_2048();
    disk.expect_write_sector().returning(|_, _, _| Err(Error::NotSupported));

    let mut tree = BlockDeviceTree::new();
    let root = tree.register(Arc::new(disk));
    let part = tree.partitions_of(root).next().unwrap();

    let buf = [0u8; SECTOR_SIZE];
    assert_eq!(tree.write_sector(part, &buf, 0, 1), Err(Error::NotSupported));
}

// The status byte, not the type byte, decides occupancy. Standard MBR
// readers would do the opposite for both entries below.
#[test]
fn test_occupancy_uses_status_byte() {
    let sector0 = mbr_sector(&[(0, 0x00, 0x83, 100, 10), (1, 0x80, 0x00, 200, 20)]);
    let (_, disk) = shared(RamDisk::with_sector0(512, &sector0));
    let mut tree = BlockDeviceTree::new();

    let root = tree.register(disk);

    let parts: Vec<_> = tree.partitions_of(root).collect();
    assert_eq!(parts.len(), 1);
    assert_eq!(tree.partition_info(parts[0]), Ok(Some(Partition::new(200, 20))));
}

#[test]
fn test_partitions_are_not_rescanned() {
    // The partition's own first sector carries a valid MBR too
    let nested = mbr_sector(&[(0, 0x80, 0x83, 1, 1)]);
    let (ram, disk) = shared(RamDisk::with_sector0(64, &mbr_sector(&[(0, 0x80, 0x83, 8, 8)])));
    ram.write_sector(&nested, 8, 1).unwrap();

    let mut tree = BlockDeviceTree::new();
    let root = tree.register(disk);
    let part = tree.partitions_of(root).next().unwrap();

    assert_eq!(tree.children(part), Ok(0));
    assert_eq!(tree.len(), 2);
}

#[test]
fn test_unregister_removes_partitions() {
    let sector0 = mbr_sector(&[(0, 0x80, 0x83, 8, 8), (3, 0x80, 0x83, 32, 8)]);
    let (_, disk) = shared(RamDisk::with_sector0(64, &sector0));
    let log = Arc::new(EventLog::default());
    let mut tree = BlockDeviceTree::with_hook(log.clone());
    let root = tree.register(disk);
    let parts: Vec<_> = tree.partitions_of(root).collect();

    tree.unregister(root).unwrap();

    assert!(tree.is_empty());
    assert_eq!(*log.unregistered.lock().unwrap(), vec![parts[0], parts[1], root]);
    let mut buf = [0u8; SECTOR_SIZE];
    assert_eq!(tree.read_sector(parts[0], &mut buf, 0, 1), Err(Error::NoDevice));
}

#[test]
fn test_init_forwards_to_driver() {
    let mut disk = MockDisk::new();
    disk.expect_read_sector().returning(|_, _, _| Err(Error::Io));
    disk.expect_init().times(1).returning(|| Ok(()));

    let mut tree = BlockDeviceTree::new();
    let root = tree.register(Arc::new(disk));
    assert_eq!(tree.init(root), Ok(()));
}

#[test]
fn test_hook_can_be_swapped() {
    let log = Arc::new(EventLog::default());
    let mut tree = BlockDeviceTree::new();

    let before = tree.register(shared(RamDisk::new(8)).1);
    tree.set_hook(Some(log.clone()));
    let during = tree.register(shared(RamDisk::new(8)).1);
    tree.set_hook(None);
    tree.register(shared(RamDisk::new(8)).1);

    let seen: Vec<_> = log.registered.lock().unwrap().iter().map(|info| info.id).collect();
    assert_eq!(seen, vec![during]);
    assert_ne!(before, during);
}
