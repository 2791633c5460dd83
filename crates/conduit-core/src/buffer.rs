//! Pre-sized scratch buffers for the audio thread.
//!
//! The [`BufferPool`] owns a fixed set of float buffers allocated once at
//! setup time. Processing code borrows them per period instead of
//! allocating, which keeps the audio callback allocation-free. A linear
//! effect chain needs exactly two slots (ping-pong).

use alloc::vec;
use alloc::vec::Vec;

/// Pool of reusable float scratch buffers.
#[derive(Debug, Clone)]
pub struct BufferPool {
    buffers: Vec<Vec<f32>>,
    block_size: usize,
}

impl BufferPool {
    /// Creates a pool with `count` zeroed slots of `block_size` samples each.
    pub fn new(count: usize, block_size: usize) -> Self {
        let buffers = (0..count).map(|_| vec![0.0; block_size]).collect();
        Self {
            buffers,
            block_size,
        }
    }

    /// Returns the number of buffer slots.
    pub fn count(&self) -> usize {
        self.buffers.len()
    }

    /// Returns the size of each slot in samples.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Returns a reference to the slot at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= count()`.
    #[inline]
    pub fn get(&self, idx: usize) -> &[f32] {
        &self.buffers[idx]
    }

    /// Returns a mutable reference to the slot at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= count()`.
    #[inline]
    pub fn get_mut(&mut self, idx: usize) -> &mut [f32] {
        &mut self.buffers[idx]
    }

    /// Borrows two distinct slots mutably at once.
    ///
    /// # Panics
    ///
    /// Panics if `a == b` or either index is out of range.
    #[inline]
    pub fn pair_mut(&mut self, a: usize, b: usize) -> (&mut [f32], &mut [f32]) {
        assert_ne!(a, b, "pair_mut requires distinct slots");
        if a < b {
            let (lo, hi) = self.buffers.split_at_mut(b);
            (&mut lo[a], &mut hi[0])
        } else {
            let (lo, hi) = self.buffers.split_at_mut(a);
            (&mut hi[0], &mut lo[b])
        }
    }

    /// Resizes every slot to a new block size, zeroing new samples.
    ///
    /// Allocates; call from setup code, never from the audio thread.
    pub fn resize_all(&mut self, block_size: usize) {
        #[cfg(feature = "tracing")]
        tracing::debug!("buffer_pool: resize {} slots to {block_size}", self.buffers.len());

        self.block_size = block_size;
        for buf in &mut self.buffers {
            buf.resize(block_size, 0.0);
        }
    }

    /// Clears every slot to zero.
    pub fn clear_all(&mut self) {
        for buf in &mut self.buffers {
            buf.fill(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_dimensions() {
        let pool = BufferPool::new(2, 128);
        assert_eq!(pool.count(), 2);
        assert_eq!(pool.block_size(), 128);
        assert_eq!(pool.get(1).len(), 128);
    }

    #[test]
    fn test_pair_mut_is_disjoint() {
        let mut pool = BufferPool::new(3, 4);
        {
            let (a, b) = pool.pair_mut(2, 0);
            a.fill(2.0);
            b.fill(1.0);
        }
        assert_eq!(pool.get(0), &[1.0; 4]);
        assert_eq!(pool.get(1), &[0.0; 4]);
        assert_eq!(pool.get(2), &[2.0; 4]);
    }

    #[test]
    #[should_panic]
    fn test_pair_mut_same_slot_panics() {
        let mut pool = BufferPool::new(2, 4);
        let _ = pool.pair_mut(1, 1);
    }

    #[test]
    fn test_resize_and_clear() {
        let mut pool = BufferPool::new(2, 4);
        pool.get_mut(0).fill(0.5);
        pool.resize_all(8);
        assert_eq!(pool.block_size(), 8);
        assert_eq!(pool.get(0)[..4], [0.5; 4]);
        assert_eq!(pool.get(0)[4..], [0.0; 4]);
        pool.clear_all();
        assert!(pool.get(0).iter().all(|&s| s == 0.0));
    }
}
