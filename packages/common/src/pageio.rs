//! Page-granular I/O helpers.
//!
//! A Write file is a sequence of fixed 128-byte pages. Everything outside
//! the text area is addressed by page number.

use crate::{CommonError, CommonResult};
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Size of every page in the file
pub const PAGE_SIZE: usize = 128;

/// One page of file data
pub type Page = [u8; PAGE_SIZE];

/// Page number within a file
pub type PageNumber = u16;

/// Byte offset of the start of page `pn`
pub fn page_offset(pn: PageNumber) -> u64 {
    u64::from(pn) * PAGE_SIZE as u64
}

/// Number of whole pages needed to hold `len` bytes
pub fn pages_for(len: u64) -> CommonResult<PageNumber> {
    PageNumber::try_from(len.div_ceil(PAGE_SIZE as u64))
        .map_err(|_| CommonError::TooManyPages { len })
}

/// Seek to the start of page `pn`.
///
/// A buffered writer flushes on seek, so a write that failed earlier
/// surfaces here rather than at the write call.
pub fn seek_to_page<S: Seek>(stream: &mut S, pn: PageNumber) -> CommonResult<()> {
    stream.seek(SeekFrom::Start(page_offset(pn)))?;
    Ok(())
}

/// Write one full page at the current position
pub fn write_page<W: Write>(out: &mut W, page: &Page) -> CommonResult<()> {
    out.write_all(page)?;
    Ok(())
}

/// Read `buf.len()` bytes from the start of page `pn`
pub fn read_page<R: Read + Seek>(input: &mut R, pn: PageNumber, buf: &mut [u8]) -> CommonResult<()> {
    seek_to_page(input, pn)?;
    input.read_exact(buf).map_err(|err| match err.kind() {
        io::ErrorKind::UnexpectedEof => CommonError::ShortPage {
            page: pn,
            wanted: buf.len(),
        },
        _ => CommonError::Io(err),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_pages_for() {
        assert_eq!(pages_for(0).unwrap(), 0);
        assert_eq!(pages_for(1).unwrap(), 1);
        assert_eq!(pages_for(128).unwrap(), 1);
        assert_eq!(pages_for(129).unwrap(), 2);
    }

    #[test]
    fn test_pages_for_past_last_page() {
        let last = u64::from(PageNumber::MAX) * PAGE_SIZE as u64;
        assert_eq!(pages_for(last).unwrap(), PageNumber::MAX);
        assert!(matches!(
            pages_for(last + 1),
            Err(CommonError::TooManyPages { len }) if len == last + 1
        ));
    }

    #[test]
    fn test_read_page_short() {
        let mut data = Cursor::new(vec![7u8; 200]);
        let mut buf = [0u8; PAGE_SIZE];

        assert!(read_page(&mut data, 0, &mut buf).is_ok());
        assert_eq!(buf[0], 7);

        let err = read_page(&mut data, 1, &mut buf).unwrap_err();
        assert!(matches!(err, CommonError::ShortPage { page: 1, .. }));
    }

    #[test]
    fn test_write_page_at_offset() {
        let mut out = Cursor::new(Vec::new());
        seek_to_page(&mut out, 2).unwrap();
        write_page(&mut out, &[1u8; PAGE_SIZE]).unwrap();

        let data = out.into_inner();
        assert_eq!(data.len(), 3 * PAGE_SIZE);
        assert!(data[..2 * PAGE_SIZE].iter().all(|&b| b == 0));
        assert!(data[2 * PAGE_SIZE..].iter().all(|&b| b == 1));
    }
}
