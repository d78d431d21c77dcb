//! Fixed set of four photo slots with a focus cursor.

use crate::types::EncodedImage;
use thiserror::Error;

/// Number of photos required per session.
pub const SLOT_COUNT: usize = 4;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotError {
    #[error("slot index {0} out of range (0..{SLOT_COUNT})")]
    OutOfRange(usize),
}

/// Four optional normalized images plus the slot targeted by the next
/// capture or upload.
#[derive(Debug, Clone, Default)]
pub struct PhotoSlotStore {
    slots: [Option<EncodedImage>; SLOT_COUNT],
    focus: usize,
}

impl PhotoSlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `image` in slot `index`.
    ///
    /// When the focused slot is filled and the next slot is empty, focus
    /// advances to it. Filling any other slot leaves focus where it is.
    pub fn set_slot(&mut self, index: usize, image: EncodedImage) -> Result<(), SlotError> {
        check_index(index)?;
        self.slots[index] = Some(image);

        if index == self.focus && index + 1 < SLOT_COUNT && self.slots[index + 1].is_none() {
            self.focus = index + 1;
        }
        Ok(())
    }

    /// Empty slot `index`. Focus is not moved.
    pub fn clear_slot(&mut self, index: usize) -> Result<Option<EncodedImage>, SlotError> {
        check_index(index)?;
        Ok(self.slots[index].take())
    }

    pub fn set_focus(&mut self, index: usize) -> Result<(), SlotError> {
        check_index(index)?;
        self.focus = index;
        Ok(())
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn get(&self, index: usize) -> Option<&EncodedImage> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn completed_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.completed_count() == SLOT_COUNT
    }

    /// Occupied slots in index order.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, &EncodedImage)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|img| (i, img)))
    }

    /// Empty every slot and return focus to the first one.
    pub fn clear(&mut self) {
        self.slots = Default::default();
        self.focus = 0;
    }
}

fn check_index(index: usize) -> Result<(), SlotError> {
    if index < SLOT_COUNT {
        Ok(())
    } else {
        Err(SlotError::OutOfRange(index))
    }
}
