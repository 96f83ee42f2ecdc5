//! Portable parallel iteration
//!
//! With the `parallel` feature the helpers run on the rayon thread pool,
//! otherwise they fall back to sequential iteration. Every helper returns its
//! results in index order, so parallel and sequential runs produce identical
//! output.
//!
//! ```ignore
//! use crate::core::parallel::*;
//!
//! let squares: Vec<usize> = map_indexed(100, Device::Parallel, |i| i * i);
//! ```

use crate::core::types::Device;

/// Check if parallel processing is available
#[inline]
pub fn is_parallel_available() -> bool {
    cfg!(feature = "parallel")
}

/// Parallel map over a range of indices
#[cfg(feature = "parallel")]
pub fn parallel_map_indexed<U, F>(count: usize, f: F) -> Vec<U>
where
    U: Send,
    F: Fn(usize) -> U + Sync + Send,
{
    use rayon::prelude::*;
    (0..count).into_par_iter().map(f).collect()
}

#[cfg(not(feature = "parallel"))]
pub fn parallel_map_indexed<U, F>(count: usize, f: F) -> Vec<U>
where
    F: Fn(usize) -> U,
{
    (0..count).map(f).collect()
}

/// Parallel map over a slice
#[cfg(feature = "parallel")]
pub fn parallel_map<T, U, F>(data: &[T], f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    use rayon::prelude::*;
    data.par_iter().map(f).collect()
}

#[cfg(not(feature = "parallel"))]
pub fn parallel_map<T, U, F>(data: &[T], f: F) -> Vec<U>
where
    F: Fn(&T) -> U,
{
    data.iter().map(f).collect()
}

/// Map over `0..count` on the requested device
pub fn map_indexed<U, F>(count: usize, device: Device, f: F) -> Vec<U>
where
    U: Send,
    F: Fn(usize) -> U + Sync + Send,
{
    match device {
        Device::Parallel => parallel_map_indexed(count, f),
        Device::Sequential => (0..count).map(f).collect(),
    }
}

/// Map over a slice on the requested device
pub fn map_slice<T, U, F>(data: &[T], device: Device, f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    match device {
        Device::Parallel => parallel_map(data, f),
        Device::Sequential => data.iter().map(f).collect(),
    }
}
