//! The ordered instance list of one series and the current position in it.

use std::fmt;

use thiserror::Error;

use crate::model::InstanceId;

/// Study and series identifiers addressing one series on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRef {
    pub study_id: String,
    pub series_id: String,
}

impl SeriesRef {
    pub fn new(study_id: impl Into<String>, series_id: impl Into<String>) -> Self {
        Self {
            study_id: study_id.into(),
            series_id: series_id.into(),
        }
    }
}

impl fmt::Display for SeriesRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.study_id, self.series_id)
    }
}

/// Reasons a navigation request is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("Invalid frame number")]
    InvalidFrameNumber,
    #[error("Frame index {index} out of range (series has {len} frames)")]
    OutOfRange { index: usize, len: usize },
    #[error("The series has no frames")]
    Empty,
}

/// Instance ids of a series in display order, with a cursor.
#[derive(Debug, Clone)]
pub struct Series {
    reference: SeriesRef,
    instances: Vec<InstanceId>,
    current: Option<usize>,
}

impl Series {
    /// Create a series positioned on its first frame (if any).
    pub fn new(reference: SeriesRef, instances: Vec<InstanceId>) -> Self {
        let current = if instances.is_empty() { None } else { Some(0) };
        Self {
            reference,
            instances,
            current,
        }
    }

    pub fn reference(&self) -> &SeriesRef {
        &self.reference
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_id(&self) -> Option<&InstanceId> {
        self.current.and_then(|i| self.instances.get(i))
    }

    /// One-based number of the current frame, as shown to the user.
    pub fn current_number(&self) -> Option<usize> {
        self.current.map(|i| i + 1)
    }

    /// Move to a zero-based index. Returns the id now current.
    pub fn go_to(&mut self, index: usize) -> Result<&InstanceId, NavigationError> {
        if self.instances.is_empty() {
            return Err(NavigationError::Empty);
        }
        if index >= self.instances.len() {
            return Err(NavigationError::OutOfRange {
                index,
                len: self.instances.len(),
            });
        }
        self.current = Some(index);
        Ok(&self.instances[index])
    }

    /// Move to a frame number typed by the user (one-based, surrounding
    /// whitespace ignored).
    pub fn go_to_number(&mut self, text: &str) -> Result<&InstanceId, NavigationError> {
        let number: usize = text
            .trim()
            .parse()
            .map_err(|_| NavigationError::InvalidFrameNumber)?;
        if number == 0 || number > self.instances.len() {
            return Err(NavigationError::InvalidFrameNumber);
        }
        self.go_to(number - 1)
    }

    /// Step forwards or backwards, stopping at either end.
    pub fn step(&mut self, forward: bool) -> Result<&InstanceId, NavigationError> {
        let current = self.current.ok_or(NavigationError::Empty)?;
        let index = if forward {
            (current + 1).min(self.instances.len() - 1)
        } else {
            current.saturating_sub(1)
        };
        self.go_to(index)
    }
}
