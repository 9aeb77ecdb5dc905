//! Wrapping cursor over a fixed-size pool.

use std::sync::{Mutex, PoisonError};

use super::DispatchError;

/// Hands out pool indices in round-robin order.
///
/// The cursor always sits in `[0, len)`. Every call to [`Ticker::advance`]
/// returns the current cursor and moves it to `(cursor + 1) % len` inside a
/// single critical section, so concurrent callers observe a total order of
/// advances.
#[derive(Debug)]
pub struct Ticker {
    len: usize,
    cursor: Mutex<usize>,
}

impl Ticker {
    /// Create a ticker for a pool of `len` entries.
    ///
    /// Returns `DispatchError::EmptyPool` when `len` is zero.
    pub fn new(len: usize) -> Result<Self, DispatchError> {
        if len == 0 {
            return Err(DispatchError::EmptyPool);
        }
        Ok(Self {
            len,
            cursor: Mutex::new(0),
        })
    }

    /// Return the current cursor and advance it, wrapping to zero.
    pub fn advance(&self) -> usize {
        // A panic elsewhere cannot leave the cursor out of range.
        let mut cursor = self.cursor.lock().unwrap_or_else(PoisonError::into_inner);
        let current = *cursor;
        *cursor = (current + 1) % self.len;
        current
    }

    /// Index the next call to `advance` will return.
    pub fn position(&self) -> usize {
        *self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pool size this ticker cycles over.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; a ticker cannot be built over an empty pool.
    pub fn is_empty(&self) -> bool {
        false
    }
}
