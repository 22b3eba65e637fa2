//! File types, flags and metadata passed through the VFS

extern crate alloc;

use alloc::string::String;

use bitflags::bitflags;

/// Process-wide descriptor returned to callers
pub type Fd = i32;

/// Driver-relative descriptor
pub type LocalFd = i32;

bitflags! {
    /// Flags for `open`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpenFlags: i32 {
        const WRONLY    = 1;
        const RDWR      = 2;
        const CREAT     = 0o100;
        const EXCL      = 0o200;
        const NOCTTY    = 0o400;
        const TRUNC     = 0o1000;
        const APPEND    = 0o2000;
        const NONBLOCK  = 0o4000;
        const SYNC      = 0o10000;
        const DIRECTORY = 0o200000;
    }
}

impl OpenFlags {
    /// Read-only access: no access-mode bits set
    pub const RDONLY: Self = Self::empty();

    const ACCMODE: i32 = 3;

    pub fn is_readable(&self) -> bool {
        self.bits() & Self::ACCMODE != Self::WRONLY.bits()
    }

    pub fn is_writable(&self) -> bool {
        self.bits() & Self::ACCMODE != 0
    }
}

bitflags! {
    /// Modes for `access`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AccessMode: i32 {
        const X_OK = 1;
        const W_OK = 2;
        const R_OK = 4;
    }
}

impl AccessMode {
    /// Existence test only
    pub const F_OK: Self = Self::empty();
}

/// File type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Regular,
    Directory,
    CharDevice,
    BlockDevice,
    Fifo,
    Socket,
    Symlink,
}

/// File mode/permissions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileMode(pub u32);

impl FileMode {
    pub const S_IFMT: u32   = 0o170000;  // Type mask
    pub const S_IFREG: u32  = 0o100000;  // Regular file
    pub const S_IFDIR: u32  = 0o040000;  // Directory
    pub const S_IFCHR: u32  = 0o020000;  // Character device
    pub const S_IFBLK: u32  = 0o060000;  // Block device
    pub const S_IFIFO: u32  = 0o010000;  // FIFO
    pub const S_IFSOCK: u32 = 0o140000;  // Socket
    pub const S_IFLNK: u32  = 0o120000;  // Symbolic link

    pub fn new(mode: u32) -> Self {
        Self(mode)
    }

    pub fn file_type(&self) -> FileType {
        match self.0 & Self::S_IFMT {
            Self::S_IFDIR => FileType::Directory,
            Self::S_IFCHR => FileType::CharDevice,
            Self::S_IFBLK => FileType::BlockDevice,
            Self::S_IFIFO => FileType::Fifo,
            Self::S_IFSOCK => FileType::Socket,
            Self::S_IFLNK => FileType::Symlink,
            _ => FileType::Regular,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.0 & Self::S_IFMT == Self::S_IFDIR
    }

    pub fn permissions(&self) -> u32 {
        self.0 & 0o777
    }
}

/// File attributes (stat structure equivalent)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stat {
    pub ino: u64,           // Inode number
    pub mode: FileMode,     // Mode and permissions
    pub nlink: u32,         // Number of hard links
    pub size: u64,          // Size in bytes
    pub blksize: u32,       // Block size
    pub blocks: u64,        // Number of 512B blocks
    pub atime: i64,         // Access time
    pub mtime: i64,         // Modification time
    pub ctime: i64,         // Change time
}

/// Access and modification times for `utime`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Utimbuf {
    pub actime: i64,
    pub modtime: i64,
}

/// Seek whence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekWhence {
    Set,  // Absolute position
    Cur,  // Relative to current
    End,  // Relative to end
}

impl SeekWhence {
    pub fn from_raw(whence: i32) -> Option<Self> {
        match whence {
            0 => Some(Self::Set),
            1 => Some(Self::Cur),
            2 => Some(Self::End),
            _ => None,
        }
    }
}

/// Directory entry for readdir
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub ino: u64,
    pub name: String,
    pub file_type: FileType,
}

impl DirEntry {
    pub fn new(ino: u64, name: &str, file_type: FileType) -> Self {
        Self {
            ino,
            name: String::from(name),
            file_type,
        }
    }
}

impl Default for DirEntry {
    fn default() -> Self {
        Self {
            ino: 0,
            name: String::new(),
            file_type: FileType::Regular,
        }
    }
}
