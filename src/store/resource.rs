//! Generic remote-resource state and keyed collections.
//!
//! Every slice is a [`Remote<T>`]: the slice's data plus the `loading`/`error`
//! pair driven by the request lifecycle. List-shaped data uses [`Collection`],
//! whose named folds replace the ad-hoc push/filter each slice used to inline.

use serde::{Deserialize, Serialize};

/// Entity identified by an equality key
pub trait Keyed {
    type Key: PartialEq;

    fn key(&self) -> Self::Key;
}

/// Ordered list of keyed entities
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection<T> {
    items: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Collection { items: Vec::new() }
    }
}

impl<T: Keyed> Collection<T> {
    pub fn new(items: Vec<T>) -> Self {
        Collection { items }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.items.iter().find(|item| &item.key() == key)
    }

    /// Fetch fold: the server list becomes the whole collection
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// Create fold
    pub fn append(&mut self, item: T) {
        self.items.push(item);
    }

    /// Newest-first create fold
    pub fn prepend(&mut self, item: T) {
        self.items.insert(0, item);
    }

    /// Replace the item with the same key in place, if any. Returns whether it was found.
    pub fn update(&mut self, item: T) -> bool {
        self.update_or_return(item).is_none()
    }

    /// Replace in place, or append when the key is new
    pub fn upsert(&mut self, item: T) {
        if let Some(item) = self.update_or_return(item) {
            self.items.push(item);
        }
    }

    /// Delete fold: removes the first item whose key matches
    pub fn remove_by_id(&mut self, key: &T::Key) -> Option<T> {
        let index = self.items.iter().position(|item| &item.key() == key)?;
        Some(self.items.remove(index))
    }

    fn update_or_return(&mut self, item: T) -> Option<T> {
        let key = item.key();
        match self.items.iter_mut().find(|existing| existing.key() == key) {
            Some(slot) => {
                *slot = item;
                None
            }
            None => Some(item),
        }
    }
}

/// Slice data plus its request lifecycle
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Remote<T> {
    pub data: T,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Remote<T> {
    pub fn new(data: T) -> Self {
        Remote {
            data,
            loading: false,
            error: None,
        }
    }

    /// Applies the success fold and ends the request
    pub fn resolve<R>(&mut self, fold: impl FnOnce(&mut T) -> R) -> R {
        self.loading = false;
        self.error = None;
        fold(&mut self.data)
    }
}

/// The part of a slice the reducer drives without knowing its data type
pub trait Lifecycle {
    /// Request started: `loading=true`, previous error cleared
    fn begin(&mut self);

    /// Request failed: `loading=false`, error recorded, data untouched
    fn reject(&mut self, message: String);

    fn clear_error(&mut self);

    /// Loading follows what is still in flight once an answer is folded
    fn set_loading(&mut self, loading: bool);

    fn is_loading(&self) -> bool;
}

impl<T> Lifecycle for Remote<T> {
    fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    fn reject(&mut self, message: String) {
        self.loading = false;
        self.error = Some(message);
    }

    fn clear_error(&mut self) {
        self.error = None;
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn is_loading(&self) -> bool {
        self.loading
    }
}
