//! Shared stand-ins for block device tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use pico_api::{Error, Result};
use pico_blockdev::{BlockDevice, DeviceId, DeviceInfo, IoctlCommand, RegistrationHook, SECTOR_SIZE};

/// In-memory disk that records every sector access
pub struct RamDisk {
    data: Mutex<Vec<u8>>,
    pub reads: Mutex<Vec<(u32, u32)>>,
    pub writes: Mutex<Vec<(u32, u32)>>,
    fail_reads: bool,
}

impl RamDisk {
    pub fn new(sectors: usize) -> Self {
        Self {
            data: Mutex::new(vec![0u8; sectors * SECTOR_SIZE]),
            reads: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
            fail_reads: false,
        }
    }

    pub fn failing(sectors: usize) -> Self {
        Self {
            fail_reads: true,
            ..Self::new(sectors)
        }
    }

    pub fn with_sector0(sectors: usize, sector0: &[u8; SECTOR_SIZE]) -> Self {
        let disk = Self::new(sectors);
        disk.data.lock().unwrap()[..SECTOR_SIZE].copy_from_slice(sector0);
        disk
    }

    pub fn sector(&self, index: usize) -> Vec<u8> {
        let data = self.data.lock().unwrap();
        data[index * SECTOR_SIZE..(index + 1) * SECTOR_SIZE].to_vec()
    }
}

impl BlockDevice for RamDisk {
    fn init(&self) -> Result<()> {
        Ok(())
    }

    fn read_sector(&self, buf: &mut [u8], start_sector: u32, count: u32) -> Result<()> {
        self.reads.lock().unwrap().push((start_sector, count));
        if self.fail_reads {
            return Err(Error::Io);
        }
        let data = self.data.lock().unwrap();
        let start = start_sector as usize * SECTOR_SIZE;
        let len = count as usize * SECTOR_SIZE;
        let src = data.get(start..start + len).ok_or(Error::InvalidArgument)?;
        buf[..len].copy_from_slice(src);
        Ok(())
    }

    fn write_sector(&self, buf: &[u8], start_sector: u32, count: u32) -> Result<()> {
        self.writes.lock().unwrap().push((start_sector, count));
        let mut data = self.data.lock().unwrap();
        let start = start_sector as usize * SECTOR_SIZE;
        let len = count as usize * SECTOR_SIZE;
        let dst = data.get_mut(start..start + len).ok_or(Error::InvalidArgument)?;
        dst.copy_from_slice(&buf[..len]);
        Ok(())
    }

    fn ioctl(&self, cmd: IoctlCommand) -> Result<u32> {
        match cmd {
            IoctlCommand::GetSize => Ok((self.data.lock().unwrap().len() / SECTOR_SIZE) as u32),
            IoctlCommand::GetSectorSize => Ok(SECTOR_SIZE as u32),
            IoctlCommand::GetReadOnly => Ok(0),
            IoctlCommand::Sync => Ok(0),
            IoctlCommand::Other(_) => Err(Error::NotSupported),
        }
    }
}

/// Hook that records registration events in order
#[derive(Default)]
pub struct EventLog {
    pub registered: Mutex<Vec<DeviceInfo>>,
    pub unregistered: Mutex<Vec<DeviceId>>,
}

impl RegistrationHook for EventLog {
    fn on_register(&self, info: &DeviceInfo) {
        self.registered.lock().unwrap().push(*info);
    }

    fn on_unregister(&self, id: DeviceId) {
        self.unregistered.lock().unwrap().push(id);
    }
}

/// Build a signed MBR sector from `(slot, status, type, start, count)` tuples
pub fn mbr_sector(entries: &[(usize, u8, u8, u32, u32)]) -> [u8; SECTOR_SIZE] {
    let mut sector = [0u8; SECTOR_SIZE];
    sector[510] = 0x55;
    sector[511] = 0xAA;
    for &(slot, status, ptype, start, count) in entries {
        let offset = 0x1BE + slot * 16;
        sector[offset] = status;
        sector[offset + 4] = ptype;
        sector[offset + 8..offset + 12].copy_from_slice(&start.to_le_bytes());
        sector[offset + 12..offset + 16].copy_from_slice(&count.to_le_bytes());
    }
    sector
}

pub fn shared<T: BlockDevice + 'static>(dev: T) -> (Arc<T>, Arc<dyn BlockDevice>) {
    let dev = Arc::new(dev);
    let erased: Arc<dyn BlockDevice> = dev.clone();
    (dev, erased)
}
