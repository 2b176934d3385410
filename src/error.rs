use thiserror::Error;

/// Errors returned by [`HashMap`](crate::HashMap) and
/// [`HashTable`](crate::HashTable) operations.
///
/// None of these leave the table partially modified: a failing call returns
/// before touching any bucket or entry.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// The key passed to the operation was the null key (see
    /// [`TableKey::is_null`](crate::key::TableKey::is_null)).
    #[error("key is null")]
    NullKey,
    /// No live entry matches the requested key.
    #[error("the given key was not present in the table")]
    KeyNotFound,
    /// A live entry with an equal key already exists.
    #[error("an entry with the same key already exists")]
    DuplicateKey,
    /// Tables must be created with room for at least one entry.
    #[error("capacity must be greater than zero")]
    ZeroCapacity,
}
