//! Local view state for like, save and follow buttons.
//!
//! The displayed value flips as soon as the user acts and is rolled back if
//! the backend write fails. While a write is in flight further taps are
//! ignored.

use std::future::Future;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OptimisticToggle {
    value: bool,
    in_flight: bool,
}

impl OptimisticToggle {
    pub fn new(value: bool) -> Self {
        Self { value, in_flight: false }
    }

    pub fn value(&self) -> bool {
        self.value
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Flips the value and returns the new one, or `None` while a previous
    /// toggle has not settled.
    pub fn begin(&mut self) -> Option<bool> {
        if self.in_flight {
            return None;
        }
        self.in_flight = true;
        self.value = !self.value;
        Some(self.value)
    }

    /// Keeps the flipped value on success, restores the previous one on failure.
    pub fn settle<T, E>(&mut self, result: &Result<T, E>) -> bool {
        if self.in_flight && result.is_err() {
            self.value = !self.value;
        }
        self.in_flight = false;
        self.value
    }

    /// Runs `write` for the new value between [`begin`](Self::begin) and
    /// [`settle`](Self::settle). Returns `None` when the tap was ignored.
    pub async fn run<F, Fut, T, E>(&mut self, write: F) -> Option<Result<T, E>>
    where
        F: FnOnce(bool) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let target = self.begin()?;
        let result = write(target).await;
        self.settle(&result);
        Some(result)
    }
}
