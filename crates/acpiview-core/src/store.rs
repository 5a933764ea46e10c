//! Category-keyed store for metadata extracted while decoding ACPI tables.
//!
//! Decoders push opaque copies of the structures they recognise; validators
//! read them back once every table has been parsed. The store never looks
//! inside a payload. Each category keeps its records in push order so that
//! diagnostics come out in decode order.

use std::convert::Infallible;

use thiserror::Error;
use tracing::debug;

use crate::catalog::Category;

/// Errors from data store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Meta data type is not recognised: {0}")]
    InvalidCategory(usize),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("No {0} data found")]
    NotFound(Category),

    #[error("Failed to allocate resources for {0} record")]
    OutOfResources(Category),
}

impl From<Infallible> for StoreError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

/// One stored copy of a decoded structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    kind: Category,
    length: u8,
    data: Box<[u8]>,
}

impl Record {
    /// The tag given to this record when it was stored.
    pub fn kind(&self) -> Category {
        self.kind
    }

    /// Payload length in bytes.
    pub fn length(&self) -> u8 {
        self.length
    }

    /// Payload bytes, exactly as they were pushed.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Store of ACPI metadata, one ordered list per [`Category`].
///
/// The lifetime of a store is one invocation: build it (or [`init`] it)
/// before decoding, read it during validation, [`reset`] it when done.
///
/// [`init`]: DataStore::init
/// [`reset`]: DataStore::reset
#[derive(Debug, Default)]
pub struct DataStore {
    lists: [Vec<Record>; Category::COUNT],
}

impl DataStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset every category to an empty list. Idempotent.
    pub fn init(&mut self) {
        self.reset();
    }

    /// Copy `data` into a new record tagged `kind` and append it to `category`.
    ///
    /// Both `category` and `kind` accept either a [`Category`] or a raw
    /// catalog index. Payloads are limited to 255 bytes.
    ///
    /// # Errors
    ///
    /// * `InvalidCategory` - `category` or `kind` is not in the catalog
    /// * `InvalidParameter` - `data` is longer than 255 bytes
    /// * `OutOfResources` - the copy could not be allocated; nothing is stored
    pub fn store<C, K>(&mut self, category: C, kind: K, data: &[u8]) -> Result<(), StoreError>
    where
        C: TryInto<Category>,
        K: TryInto<Category>,
        StoreError: From<C::Error> + From<K::Error>,
    {
        let category: Category = category.try_into()?;
        let kind: Category = kind.try_into()?;

        let length = u8::try_from(data.len()).map_err(|_| {
            StoreError::InvalidParameter(format!(
                "{} byte payload exceeds the 255 byte record limit",
                data.len()
            ))
        })?;

        let mut payload = Vec::new();
        payload
            .try_reserve_exact(data.len())
            .map_err(|_| StoreError::OutOfResources(category))?;
        payload.extend_from_slice(data);

        let list = &mut self.lists[category.index()];
        // Reserve the slot before pushing so a failure leaves the list untouched.
        list.try_reserve(1)
            .map_err(|_| StoreError::OutOfResources(category))?;
        list.push(Record {
            kind,
            length,
            data: payload.into_boxed_slice(),
        });

        debug!(category = ?category, kind = ?kind, length, "stored record");
        Ok(())
    }

    /// Number of records in `category`.
    ///
    /// A category that never received a record reports `NotFound`, which
    /// callers treat as a count of zero.
    pub fn count<C>(&self, category: C) -> Result<usize, StoreError>
    where
        C: TryInto<Category>,
        StoreError: From<C::Error>,
    {
        Ok(self.get_all(category)?.len())
    }

    /// All records in `category`, in the order they were stored.
    pub fn get_all<C>(&self, category: C) -> Result<&[Record], StoreError>
    where
        C: TryInto<Category>,
        StoreError: From<C::Error>,
    {
        let category: Category = category.try_into()?;
        let list = &self.lists[category.index()];
        if list.is_empty() {
            return Err(StoreError::NotFound(category));
        }
        Ok(list)
    }

    /// Total number of records across every category.
    pub fn len(&self) -> usize {
        self.lists.iter().map(Vec::len).sum()
    }

    /// True when no category holds a record.
    pub fn is_empty(&self) -> bool {
        self.lists.iter().all(Vec::is_empty)
    }

    /// Release every record and payload, returning the store to its empty state.
    pub fn reset(&mut self) {
        for list in self.lists.iter_mut() {
            *list = Vec::new();
        }
    }
}
