//! Block device tree
//!
//! Devices live in an arena owned by [`BlockDeviceTree`]. Whole-disk devices
//! wrap a driver; partition devices hold the [`DeviceId`] of their parent
//! instead of a pointer, and every access goes through the generation check
//! so a handle can never reach a slot that has been reused.

extern crate alloc;

use alloc::sync::Arc;
use alloc::vec::Vec;

use pico_api::{Error, Result};

use crate::device::{BlockDevice, IoctlCommand};
use crate::partition::Partition;
use crate::scan;

/// Handle to a device in a [`BlockDeviceTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId {
    index: u32,
    generation: u32,
}

impl DeviceId {
    /// Arena slot of this device
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

/// Snapshot of a device's place in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
    pub id: DeviceId,
    pub parent: Option<DeviceId>,
    /// Geometry, for partition devices
    pub partition: Option<Partition>,
    /// Partitions spawned from this device
    pub children: usize,
}

/// Registration event sink
pub trait RegistrationHook: Send + Sync {
    /// Called once per registered device, partitions before their disk
    fn on_register(&self, info: &DeviceInfo) {
        let _ = info;
    }

    /// Called once per removed device, partitions before their disk
    fn on_unregister(&self, id: DeviceId) {
        let _ = id;
    }
}

enum DeviceKind {
    Disk(Arc<dyn BlockDevice>),
    Partition(Partition),
}

struct DeviceNode {
    kind: DeviceKind,
    parent: Option<DeviceId>,
    children: usize,
}

struct Slot {
    generation: u32,
    node: Option<DeviceNode>,
}

/// Arena of block devices
pub struct BlockDeviceTree {
    slots: Vec<Slot>,
    /// Live devices in registration order
    order: Vec<DeviceId>,
    hook: Option<Arc<dyn RegistrationHook>>,
}

impl BlockDeviceTree {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            order: Vec::new(),
            hook: None,
        }
    }

    pub fn with_hook(hook: Arc<dyn RegistrationHook>) -> Self {
        let mut tree = Self::new();
        tree.hook = Some(hook);
        tree
    }

    pub fn set_hook(&mut self, hook: Option<Arc<dyn RegistrationHook>>) {
        self.hook = hook;
    }

    /// Register a whole-disk device.
    ///
    /// The disk is scanned for an MBR before the hook sees it, so its
    /// partitions are registered (and announced) first. A failed read or a
    /// missing signature just leaves the disk unpartitioned.
    pub fn register(&mut self, driver: Arc<dyn BlockDevice>) -> DeviceId {
        let id = self.insert(DeviceNode {
            kind: DeviceKind::Disk(driver),
            parent: None,
            children: 0,
        });
        blk_info!("registering disk {}", id.index());
        self.register_node(id);
        id
    }

    /// Create a partition device under `parent` and register it.
    ///
    /// Partitions are never scanned themselves.
    pub(crate) fn add_partition(&mut self, parent: DeviceId, partition: Partition) -> Result<DeviceId> {
        self.node(parent)?;
        let id = self.insert(DeviceNode {
            kind: DeviceKind::Partition(partition),
            parent: Some(parent),
            children: 0,
        });
        self.node_mut(parent)?.children += 1;
        self.register_node(id);
        Ok(id)
    }

    fn register_node(&mut self, id: DeviceId) {
        let is_root = matches!(self.node(id), Ok(node) if node.parent.is_none());
        if is_root {
            let found = scan::scan_partitions(self, id);
            blk_debug!("disk {}: {} partition(s)", id.index(), found);
        }
        if let (Some(hook), Ok(info)) = (self.hook.clone(), self.info(id)) {
            hook.on_register(&info);
        }
    }

    /// Remove a whole-disk device and every partition chained to it
    pub fn unregister(&mut self, id: DeviceId) -> Result<()> {
        if self.node(id)?.parent.is_some() {
            return Err(Error::InvalidArgument);
        }
        let doomed: Vec<DeviceId> = self
            .order
            .iter()
            .copied()
            .filter(|dev| *dev != id && self.is_descendant_of(*dev, id))
            .chain(core::iter::once(id))
            .collect();

        for dev in doomed {
            self.remove(dev);
            if let Some(hook) = &self.hook {
                hook.on_unregister(dev);
            }
        }
        blk_info!("unregistered disk {}", id.index());
        Ok(())
    }

    /// Initialise a device; resets its child counter first
    pub fn init(&mut self, id: DeviceId) -> Result<()> {
        let node = self.node_mut(id)?;
        node.children = 0;
        match &node.kind {
            DeviceKind::Disk(driver) => driver.init(),
            DeviceKind::Partition(_) => Ok(()),
        }
    }

    pub fn read_sector(&self, id: DeviceId, buf: &mut [u8], start_sector: u32, count: u32) -> Result<()> {
        let node = self.node(id)?;
        match &node.kind {
            DeviceKind::Disk(driver) => driver.read_sector(buf, start_sector, count),
            DeviceKind::Partition(part) => {
                let parent = node.parent.ok_or(Error::NoDevice)?;
                self.read_sector(parent, buf, part.translate(start_sector)?, count)
            }
        }
    }

    pub fn write_sector(&self, id: DeviceId, buf: &[u8], start_sector: u32, count: u32) -> Result<()> {
        let node = self.node(id)?;
        match &node.kind {
            DeviceKind::Disk(driver) => driver.write_sector(buf, start_sector, count),
            DeviceKind::Partition(part) => {
                let parent = node.parent.ok_or(Error::NoDevice)?;
                self.write_sector(parent, buf, part.translate(start_sector)?, count)
            }
        }
    }

    pub fn ioctl(&self, id: DeviceId, cmd: IoctlCommand) -> Result<u32> {
        let node = self.node(id)?;
        match (&node.kind, cmd) {
            (DeviceKind::Disk(driver), _) => driver.ioctl(cmd),
            (DeviceKind::Partition(part), IoctlCommand::GetSize) => Ok(part.num_sectors),
            (DeviceKind::Partition(_), _) => {
                let parent = node.parent.ok_or(Error::NoDevice)?;
                self.ioctl(parent, cmd)
            }
        }
    }

    /// Number of partitions spawned from `id` since its last init
    pub fn children(&self, id: DeviceId) -> Result<usize> {
        Ok(self.node(id)?.children)
    }

    pub fn parent(&self, id: DeviceId) -> Result<Option<DeviceId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn partition_info(&self, id: DeviceId) -> Result<Option<Partition>> {
        match self.node(id)?.kind {
            DeviceKind::Partition(part) => Ok(Some(part)),
            DeviceKind::Disk(_) => Ok(None),
        }
    }

    pub fn info(&self, id: DeviceId) -> Result<DeviceInfo> {
        let node = self.node(id)?;
        Ok(DeviceInfo {
            id,
            parent: node.parent,
            partition: match node.kind {
                DeviceKind::Partition(part) => Some(part),
                DeviceKind::Disk(_) => None,
            },
            children: node.children,
        })
    }

    /// Live devices in registration order
    pub fn devices(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.order.iter().copied()
    }

    /// Partitions whose parent is `id`, in creation order
    pub fn partitions_of(&self, id: DeviceId) -> impl Iterator<Item = DeviceId> + '_ {
        self.order
            .iter()
            .copied()
            .filter(move |dev| matches!(self.node(*dev), Ok(node) if node.parent == Some(id)))
    }

    pub fn contains(&self, id: DeviceId) -> bool {
        self.node(id).is_ok()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn is_descendant_of(&self, dev: DeviceId, ancestor: DeviceId) -> bool {
        let mut cursor = self.node(dev).ok().and_then(|node| node.parent);
        while let Some(parent) = cursor {
            if parent == ancestor {
                return true;
            }
            cursor = self.node(parent).ok().and_then(|node| node.parent);
        }
        false
    }

    fn insert(&mut self, node: DeviceNode) -> DeviceId {
        let id = match self.slots.iter().position(|slot| slot.node.is_none()) {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.node = Some(node);
                DeviceId {
                    index: index as u32,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                DeviceId {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };
        self.order.push(id);
        id
    }

    fn remove(&mut self, id: DeviceId) {
        if let Some(slot) = self.slots.get_mut(id.index()) {
            if slot.generation == id.generation && slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
        }
        self.order.retain(|dev| *dev != id);
    }

    fn node(&self, id: DeviceId) -> Result<&DeviceNode> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or(Error::NoDevice)
    }

    fn node_mut(&mut self, id: DeviceId) -> Result<&mut DeviceNode> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(Error::NoDevice)
    }
}

impl Default for BlockDeviceTree {
    fn default() -> Self {
        Self::new()
    }
}
