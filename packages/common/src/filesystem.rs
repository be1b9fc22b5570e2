use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// File system abstraction for document open/save and testing
pub trait FileSystem {
    type Reader: io::Read + Seek;
    type Writer: Write + Seek;

    /// Check if a file exists
    fn exists(&self, path: &Path) -> bool;

    /// Open an existing file for reading
    fn open(&self, path: &Path) -> io::Result<Self::Reader>;

    /// Create (or truncate) a file for writing
    fn create(&self, path: &Path) -> io::Result<Self::Writer>;

    /// Remove a file, used to discard a half-written output
    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// Real file system implementation
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    type Reader = BufReader<File>;
    type Writer = BufWriter<File>;

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn open(&self, path: &Path) -> io::Result<Self::Reader> {
        Ok(BufReader::new(File::open(path)?))
    }

    fn create(&self, path: &Path) -> io::Result<Self::Writer> {
        Ok(BufWriter::new(File::create(path)?))
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}

type FileMap = Rc<RefCell<HashMap<PathBuf, Vec<u8>>>>;

/// Mock file system for testing
///
/// Clones share the same file map, so a test can keep one handle while the
/// code under test writes through another. `fail_writes_after` makes every
/// write that would reach past the given file offset fail, which is how a
/// full disk shows up.
#[derive(Clone, Default)]
pub struct MockFileSystem {
    files: FileMap,
    write_limit: Option<u64>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: PathBuf, contents: Vec<u8>) {
        self.files.borrow_mut().insert(path, contents);
    }

    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.borrow().get(path).cloned()
    }

    pub fn fail_writes_after(mut self, offset: u64) -> Self {
        self.write_limit = Some(offset);
        self
    }
}

impl FileSystem for MockFileSystem {
    type Reader = Cursor<Vec<u8>>;
    type Writer = MockFile;

    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn open(&self, path: &Path) -> io::Result<Self::Reader> {
        self.contents(path)
            .map(Cursor::new)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }

    fn create(&self, path: &Path) -> io::Result<Self::Writer> {
        self.files.borrow_mut().insert(path.to_path_buf(), Vec::new());
        Ok(MockFile {
            path: path.to_path_buf(),
            files: Rc::clone(&self.files),
            pos: 0,
            limit: self.write_limit,
        })
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        self.files
            .borrow_mut()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }
}

/// Writable handle into a [`MockFileSystem`]
pub struct MockFile {
    path: PathBuf,
    files: FileMap,
    pos: u64,
    limit: Option<u64>,
}

impl Write for MockFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let end = self.pos + buf.len() as u64;
        if let Some(limit) = self.limit {
            if end > limit {
                return Err(io::Error::other("no space left on device"));
            }
        }

        let mut files = self.files.borrow_mut();
        let data = files.entry(self.path.clone()).or_default();
        let (start, end) = (self.pos as usize, end as usize);
        if data.len() < end {
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(buf);
        self.pos = end as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for MockFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let len = self
            .files
            .borrow()
            .get(&self.path)
            .map(|data| data.len() as u64)
            .unwrap_or(0);

        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(delta) => len.checked_add_signed(delta),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
        };

        match target {
            Some(offset) => {
                self.pos = offset;
                Ok(offset)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of file",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_write_past_end_zero_fills() {
        let fs = MockFileSystem::new();
        let path = PathBuf::from("out.wri");
        let mut file = fs.create(&path).unwrap();

        file.seek(SeekFrom::Start(4)).unwrap();
        file.write_all(b"ab").unwrap();

        assert_eq!(fs.contents(&path).unwrap(), vec![0, 0, 0, 0, b'a', b'b']);
    }

    #[test]
    fn test_mock_write_limit() {
        let fs = MockFileSystem::new().fail_writes_after(3);
        let path = PathBuf::from("out.wri");
        let mut file = fs.create(&path).unwrap();

        assert!(file.write_all(b"abc").is_ok());
        assert!(file.write_all(b"d").is_err());
        assert!(fs.exists(&path));

        fs.remove(&path).unwrap();
        assert!(!fs.exists(&path));
    }
}
