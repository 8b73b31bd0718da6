//! Fallible buffer allocation.
//!
//! All working buffers in the core go through these helpers so that a
//! failed allocation surfaces as [`ErrorCode::NoMemory`] instead of an
//! abort. This is what keeps the algebra's greedy-then-exact arc count
//! protocol meaningful: the greedy upper bound is allowed to fail.

use crate::error::{Error, ErrorCode, Result};

/// Allocate a vector of `len` copies of `value`.
#[track_caller]
pub(crate) fn try_filled_vec<T: Clone>(value: T, len: usize) -> Result<Vec<T>> {
    let mut vec = Vec::new();
    if vec.try_reserve_exact(len).is_err() {
        return Err(Error::new(ErrorCode::NoMemory));
    }
    vec.resize(len, value);
    Ok(vec)
}

/// Allocate an empty vector with room for `capacity` elements.
#[track_caller]
pub(crate) fn try_vec_with_capacity<T>(capacity: usize) -> Result<Vec<T>> {
    let mut vec = Vec::new();
    if vec.try_reserve_exact(capacity).is_err() {
        return Err(Error::new(ErrorCode::NoMemory));
    }
    Ok(vec)
}
