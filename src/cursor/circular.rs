// src/cursor/circular.rs

/// Round-robin position over an owned list.
///
/// The cursor points at one element at a time. [`advance`](Self::advance)
/// moves to the next element, wrapping at the end. [`remove`](Self::remove)
/// takes the current element out; the cursor then points "between"
/// elements and the next `advance` lands on the element that followed the
/// removed one.
#[derive(Debug)]
pub struct CircularCursor<T> {
    items: Vec<T>,
    position: usize,
    after_removal: bool,
}

impl<T> CircularCursor<T> {
    /// Cursor positioned at the first element of `items`.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            position: 0,
            after_removal: false,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Element under the cursor. `None` right after a removal or when empty.
    pub fn value(&self) -> Option<&T> {
        if self.after_removal {
            return None;
        }
        self.items.get(self.position)
    }

    pub fn value_mut(&mut self) -> Option<&mut T> {
        if self.after_removal {
            return None;
        }
        self.items.get_mut(self.position)
    }

    /// Move to the next element, wrapping around.
    ///
    /// Returns `false` when no elements are left.
    pub fn advance(&mut self) -> bool {
        if self.items.is_empty() {
            return false;
        }
        if self.after_removal {
            self.after_removal = false;
            if self.position >= self.items.len() {
                self.position = 0;
            }
        } else {
            self.position = (self.position + 1) % self.items.len();
        }
        true
    }

    /// Remove the element under the cursor.
    pub fn remove(&mut self) -> Option<T> {
        if self.after_removal || self.position >= self.items.len() {
            return None;
        }
        self.after_removal = true;
        Some(self.items.remove(self.position))
    }
}
