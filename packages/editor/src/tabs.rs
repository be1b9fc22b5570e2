use crate::errors::{WriteError, WriteResult};
use writekit_format::{TabAlignment, TabStop, MAX_TABS};

/// Document-wide tab stops, kept in ascending position order.
///
/// They are laid into every paragraph record when the file is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabStops {
    stops: Vec<TabStop>,
}

impl TabStops {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[TabStop] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    fn position(value: i32) -> WriteResult<u16> {
        u16::try_from(value)
            .ok()
            .filter(|&pos| pos > 0)
            .ok_or_else(|| WriteError::out_of_range("tab position", value))
    }

    /// Add a stop, or change the alignment of the one already there
    pub fn set(&mut self, position: i32, decimal: bool) -> WriteResult<()> {
        let position = Self::position(position)?;
        let alignment = if decimal {
            TabAlignment::Decimal
        } else {
            TabAlignment::Normal
        };

        let at = self
            .stops
            .iter()
            .position(|tab| tab.position >= position)
            .unwrap_or(self.stops.len());
        if let Some(tab) = self.stops.get_mut(at).filter(|tab| tab.position == position) {
            tab.alignment = alignment;
            return Ok(());
        }

        if self.stops.len() >= MAX_TABS {
            return Err(WriteError::TooManyTabs { max: MAX_TABS });
        }
        self.stops.insert(at, TabStop { position, alignment });
        Ok(())
    }

    pub fn clear(&mut self, position: i32) -> WriteResult<()> {
        if self.stops.is_empty() {
            return Err(WriteError::TabNotFound {
                position: position.into(),
            });
        }
        let position = Self::position(position)?;
        match self.stops.iter().position(|tab| tab.position == position) {
            Some(at) => {
                self.stops.remove(at);
                Ok(())
            }
            None => Err(WriteError::TabNotFound {
                position: position.into(),
            }),
        }
    }

    pub fn cancel(&mut self) {
        self.stops.clear();
    }

    /// Take the stops found in a file as they are
    pub fn replace(&mut self, stops: Vec<TabStop>) {
        self.stops = stops;
        self.stops.truncate(MAX_TABS);
    }
}
