//! Load state shared by the read-only screens.

use crate::error::ApiError;

/// Data fetched from the backend plus the status of the latest fetch.
///
/// A failed fetch records its message and keeps whatever was loaded before.
#[derive(Debug, Clone)]
pub struct Loadable<T> {
    data: Option<T>,
    loading: bool,
    error: Option<String>,
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> Loadable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        self.data.as_mut()
    }

    /// Loaded data, starting from `T::default()` if nothing was fetched yet.
    pub fn data_or_default(&mut self) -> &mut T
    where
        T: Default,
    {
        self.data.get_or_insert_with(T::default)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed fetch, cleared by the next success.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn begin(&mut self) {
        self.loading = true;
    }

    /// Record the outcome of a fetch started with [`Loadable::begin`].
    pub fn finish(&mut self, result: Result<T, ApiError>) -> Result<(), ApiError> {
        self.loading = false;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
