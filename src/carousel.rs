use crate::error::ShowreelError;
use crate::item::RotationItem;

/// Fixed, ordered list of items plus the index of the one on screen.
#[derive(Debug, Clone)]
pub struct CarouselState {
    items: Vec<RotationItem>,
    current_index: usize,
}

impl CarouselState {
    pub fn new(items: Vec<RotationItem>) -> Result<Self, ShowreelError> {
        if items.is_empty() {
            return Err(ShowreelError::EmptyRotation);
        }
        Ok(Self {
            items,
            current_index: 0,
        })
    }

    /// Moves to the next item, wrapping after the last one.
    pub fn advance(&mut self) -> &RotationItem {
        self.current_index = (self.current_index + 1) % self.items.len();
        &self.items[self.current_index]
    }

    pub fn current(&self) -> &RotationItem {
        &self.items[self.current_index]
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[RotationItem] {
        &self.items
    }
}
