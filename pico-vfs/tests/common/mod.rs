//! Shared stand-ins for VFS tests

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use pico_api::{Error, Result};
use pico_vfs::{
    DirEntry, DirState, FileMode, FileType, LocalFd, OpenFlags, SeekWhence, Stat, VfsOps,
};

struct OpenFile {
    path: String,
    pos: usize,
}

struct MemDir {
    names: Vec<String>,
    pos: usize,
}

/// Flat in-memory filesystem that records what it was asked to do
#[derive(Default)]
pub struct MemFs {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
    handles: Mutex<BTreeMap<LocalFd, OpenFile>>,
    next_local: Mutex<LocalFd>,
    /// Mount-relative paths seen by path calls
    pub paths: Mutex<Vec<String>>,
    /// Local descriptors passed to close
    pub closed: Mutex<Vec<LocalFd>>,
    /// Directory streams handed back through closedir
    pub dirs_closed: Mutex<usize>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filesystem whose local descriptors start at `first`
    pub fn starting_at(first: LocalFd) -> Self {
        let fs = Self::default();
        *fs.next_local.lock().unwrap() = first;
        fs
    }

    pub fn with_files(files: &[(&str, &[u8])]) -> Self {
        let fs = Self::default();
        {
            let mut map = fs.files.lock().unwrap();
            for (path, data) in files {
                map.insert(path.to_string(), data.to_vec());
            }
        }
        fs
    }

    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(path).cloned()
    }

    pub fn open_handles(&self) -> usize {
        self.handles.lock().unwrap().len()
    }

    fn seen(&self, path: &str) {
        self.paths.lock().unwrap().push(path.to_string());
    }

    fn with_handle<R>(&self, fd: LocalFd, f: impl FnOnce(&mut OpenFile) -> Result<R>) -> Result<R> {
        let mut handles = self.handles.lock().unwrap();
        let handle = handles.get_mut(&fd).ok_or(Error::BadDescriptor)?;
        f(handle)
    }
}

impl VfsOps for MemFs {
    fn open(&self, path: &str, flags: OpenFlags, _mode: u32) -> Result<LocalFd> {
        self.seen(path);
        {
            let mut files = self.files.lock().unwrap();
            if !files.contains_key(path) {
                if !flags.contains(OpenFlags::CREAT) {
                    return Err(Error::NotFound);
                }
                files.insert(path.to_string(), Vec::new());
            } else if flags.contains(OpenFlags::TRUNC) {
                files.insert(path.to_string(), Vec::new());
            }
        }

        let mut next = self.next_local.lock().unwrap();
        let local = *next;
        *next += 1;
        self.handles
            .lock()
            .unwrap()
            .insert(local, OpenFile { path: path.to_string(), pos: 0 });
        Ok(local)
    }

    fn stat(&self, path: &str) -> Result<Stat> {
        self.seen(path);
        let files = self.files.lock().unwrap();
        if path == "/" {
            return Ok(Stat {
                mode: FileMode::new(FileMode::S_IFDIR | 0o755),
                ..Stat::default()
            });
        }
        let data = files.get(path).ok_or(Error::NotFound)?;
        Ok(Stat {
            mode: FileMode::new(FileMode::S_IFREG | 0o644),
            size: data.len() as u64,
            nlink: 1,
            ..Stat::default()
        })
    }

    fn link(&self, old_path: &str, new_path: &str) -> Result<()> {
        let mut files = self.files.lock().unwrap();
        let data = files.get(old_path).cloned().ok_or(Error::NotFound)?;
        files.insert(new_path.to_string(), data);
        Ok(())
    }

    fn unlink(&self, path: &str) -> Result<()> {
        self.seen(path);
        self.files
            .lock()
            .unwrap()
            .remove(path)
            .map(|_| ())
            .ok_or(Error::NotFound)
    }

    fn rename(&self, src: &str, dst: &str) -> Result<()> {
        let mut files = self.files.lock().unwrap();
        let data = files.remove(src).ok_or(Error::NotFound)?;
        files.insert(dst.to_string(), data);
        Ok(())
    }

    fn opendir(&self, path: &str) -> Result<DirState> {
        self.seen(path);
        if path != "/" {
            return Err(Error::NotFound);
        }
        let names = self
            .files
            .lock()
            .unwrap()
            .keys()
            .map(|name| name.trim_start_matches('/').to_string())
            .collect();
        Ok(Box::new(MemDir { names, pos: 0 }))
    }

    fn close(&self, fd: LocalFd) -> Result<()> {
        self.closed.lock().unwrap().push(fd);
        self.handles
            .lock()
            .unwrap()
            .remove(&fd)
            .map(|_| ())
            .ok_or(Error::BadDescriptor)
    }

    fn read(&self, fd: LocalFd, buf: &mut [u8]) -> Result<usize> {
        self.with_handle(fd, |handle| {
            let files = self.files.lock().unwrap();
            let data = files.get(&handle.path).ok_or(Error::Io)?;
            let start = handle.pos.min(data.len());
            let n = buf.len().min(data.len() - start);
            buf[..n].copy_from_slice(&data[start..start + n]);
            handle.pos += n;
            Ok(n)
        })
    }

    fn write(&self, fd: LocalFd, buf: &[u8]) -> Result<usize> {
        self.with_handle(fd, |handle| {
            let mut files = self.files.lock().unwrap();
            let data = files.get_mut(&handle.path).ok_or(Error::Io)?;
            let end = handle.pos + buf.len();
            if data.len() < end {
                data.resize(end, 0);
            }
            data[handle.pos..end].copy_from_slice(buf);
            handle.pos = end;
            Ok(buf.len())
        })
    }

    fn fstat(&self, fd: LocalFd) -> Result<Stat> {
        let path = self.with_handle(fd, |handle| Ok(handle.path.clone()))?;
        self.stat(&path)
    }

    fn lseek(&self, fd: LocalFd, offset: i64, whence: SeekWhence) -> Result<i64> {
        self.with_handle(fd, |handle| {
            let len = self
                .files
                .lock()
                .unwrap()
                .get(&handle.path)
                .map_or(0, Vec::len) as i64;
            let base = match whence {
                SeekWhence::Set => 0,
                SeekWhence::Cur => handle.pos as i64,
                SeekWhence::End => len,
            };
            let pos = base + offset;
            if pos < 0 {
                return Err(Error::InvalidArgument);
            }
            handle.pos = pos as usize;
            Ok(pos)
        })
    }

    fn pread(&self, fd: LocalFd, buf: &mut [u8], offset: u64) -> Result<usize> {
        self.with_handle(fd, |handle| {
            let files = self.files.lock().unwrap();
            let data = files.get(&handle.path).ok_or(Error::Io)?;
            let start = (offset as usize).min(data.len());
            let n = buf.len().min(data.len() - start);
            buf[..n].copy_from_slice(&data[start..start + n]);
            Ok(n)
        })
    }

    fn fsync(&self, fd: LocalFd) -> Result<()> {
        self.with_handle(fd, |_| Ok(()))
    }

    fn readdir(&self, dir: &mut DirState) -> Result<Option<DirEntry>> {
        let dir = dir.downcast_mut::<MemDir>().ok_or(Error::BadDescriptor)?;
        let entry = dir
            .names
            .get(dir.pos)
            .map(|name| DirEntry::new(dir.pos as u64 + 1, name, FileType::Regular));
        if entry.is_some() {
            dir.pos += 1;
        }
        Ok(entry)
    }

    fn telldir(&self, dir: &DirState) -> Result<i64> {
        let dir = dir.downcast_ref::<MemDir>().ok_or(Error::BadDescriptor)?;
        Ok(dir.pos as i64)
    }

    fn seekdir(&self, dir: &mut DirState, loc: i64) -> Result<()> {
        let dir = dir.downcast_mut::<MemDir>().ok_or(Error::BadDescriptor)?;
        dir.pos = loc as usize;
        Ok(())
    }

    fn closedir(&self, dir: DirState) -> Result<()> {
        dir.downcast::<MemDir>().map_err(|_| Error::BadDescriptor)?;
        *self.dirs_closed.lock().unwrap() += 1;
        Ok(())
    }
}

/// Driver that owns a fixed descriptor range and echoes writes back
#[derive(Default)]
pub struct Uart {
    pub written: Mutex<Vec<(LocalFd, Vec<u8>)>>,
    pub closed: Mutex<Vec<LocalFd>>,
}

impl VfsOps for Uart {
    fn write(&self, fd: LocalFd, buf: &[u8]) -> Result<usize> {
        self.written.lock().unwrap().push((fd, buf.to_vec()));
        Ok(buf.len())
    }

    fn close(&self, fd: LocalFd) -> Result<()> {
        self.closed.lock().unwrap().push(fd);
        Ok(())
    }
}
