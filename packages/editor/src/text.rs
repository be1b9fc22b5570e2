use crate::errors::{WriteError, WriteResult};
use crate::run_list::Cp;
use writekit_format::FC_TEXT_START;

/// Longest text whose end still has a file offset
pub const MAX_TEXT: usize = (Cp::MAX - FC_TEXT_START) as usize;

fn room_for(len: usize, extra: usize) -> WriteResult<()> {
    match len.checked_add(extra) {
        Some(total) if total <= MAX_TEXT => Ok(()),
        _ => Err(WriteError::out_of_range(
            "text length",
            i64::try_from(len.saturating_add(extra)).unwrap_or(i64::MAX),
        )),
    }
}

/// Append-only document text with a single rollback point
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    bytes: Vec<u8>,
    breakpoint: Option<usize>,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length as a character position; appends keep it within `MAX_TEXT`
    pub fn len(&self) -> Cp {
        Cp::try_from(self.bytes.len()).unwrap_or(Cp::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn last(&self) -> Option<u8> {
        self.bytes.last().copied()
    }

    pub fn push(&mut self, byte: u8) -> WriteResult<()> {
        room_for(self.bytes.len(), 1)?;
        self.bytes.try_reserve(1)?;
        self.bytes.push(byte);
        Ok(())
    }

    pub fn append(&mut self, bytes: &[u8]) -> WriteResult<()> {
        room_for(self.bytes.len(), bytes.len())?;
        self.bytes.try_reserve(bytes.len())?;
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }

    pub fn has_breakpoint(&self) -> bool {
        self.breakpoint.is_some()
    }

    pub fn breakpoint(&mut self) -> WriteResult<()> {
        if self.breakpoint.is_some() {
            return Err(WriteError::BreakpointPending);
        }
        self.breakpoint = Some(self.bytes.len());
        Ok(())
    }

    pub fn commit(&mut self) {
        self.breakpoint = None;
    }

    pub fn rollback(&mut self) -> WriteResult<()> {
        let len = self.breakpoint.take().ok_or(WriteError::NoBreakpoint)?;
        self.bytes.truncate(len);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.bytes = Vec::new();
        self.breakpoint = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rollback_truncates() {
        let mut text = TextBuffer::new();
        text.append(b"abc").unwrap();
        text.breakpoint().unwrap();
        text.append(b"def").unwrap();
        text.rollback().unwrap();
        assert_eq!(text.as_bytes(), b"abc");
        assert!(text.rollback().is_err());
    }

    #[test]
    fn test_length_bound() {
        assert!(room_for(0, MAX_TEXT).is_ok());
        assert!(room_for(MAX_TEXT - 1, 1).is_ok());
        assert!(matches!(
            room_for(MAX_TEXT, 1),
            Err(WriteError::OutOfRange { what: "text length", .. })
        ));
        assert!(room_for(usize::MAX, 1).is_err());
        assert_eq!(Cp::try_from(MAX_TEXT).unwrap() + FC_TEXT_START, Cp::MAX);
    }
}
