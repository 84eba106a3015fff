//! Per-frame transient storage for shaded vertices and interpolated
//! fragments.
//!
//! Allocation bumps within fixed-capacity blocks and opens a new
//! block on overflow, so millions of same-frame values avoid
//! individual heap allocations. Handles are indices, not references;
//! everything is invalidated en masse by `reset` (or by dropping the
//! arena with its frame).

use super::RenderError;

/// Byte budget of one block.
const BLOCK_BYTES: usize = 4 << 20;

pub struct FrameArena<T> {
    blocks: Vec<Vec<T>>,
    block_cap: usize,
    len: usize,
}

impl<T> FrameArena<T> {
    /// Fails if a single element cannot fit in one block; that is a
    /// configuration error, not something to paper over at runtime.
    pub fn new() -> Result<Self, RenderError> {
        let size = std::mem::size_of::<T>();
        if size > BLOCK_BYTES {
            return Err(RenderError::ArenaElementTooLarge {
                size,
                block_bytes: BLOCK_BYTES,
            });
        }
        let block_cap = if size == 0 { BLOCK_BYTES } else { BLOCK_BYTES / size };
        Ok(Self {
            blocks: Vec::new(),
            block_cap,
            len: 0,
        })
    }

    pub fn alloc(&mut self, value: T) -> u32 {
        let block = self.len / self.block_cap;
        if block == self.blocks.len() {
            self.blocks.push(Vec::with_capacity(self.block_cap));
        }
        self.blocks[block].push(value);
        let handle = self.len as u32;
        self.len += 1;
        handle
    }

    pub fn get(&self, handle: u32) -> Option<&T> {
        let i = handle as usize;
        self.blocks.get(i / self.block_cap)?.get(i % self.block_cap)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Invalidates every outstanding handle; block memory is kept for
    /// reuse.
    pub fn reset(&mut self) {
        for block in &mut self.blocks {
            block.clear();
        }
        self.len = 0;
    }
}

impl<T> std::ops::Index<u32> for FrameArena<T> {
    type Output = T;

    fn index(&self, handle: u32) -> &T {
        let i = handle as usize;
        &self.blocks[i / self.block_cap][i % self.block_cap]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_sequential() {
        let mut arena = FrameArena::new().unwrap();
        for i in 0..100u32 {
            assert_eq!(arena.alloc(i as u64), i);
        }
        assert_eq!(arena.len(), 100);
        assert_eq!(arena[42], 42);
    }

    #[test]
    fn test_block_rollover_keeps_handles_valid() {
        // 64 KiB elements: 64 per block.
        let mut arena = FrameArena::<[u8; 1 << 16]>::new().unwrap();
        let mut handles = Vec::new();
        for i in 0..100u8 {
            handles.push(arena.alloc([i; 1 << 16]));
        }
        for (i, &h) in handles.iter().enumerate() {
            assert_eq!(arena[h][0], i as u8);
        }
    }

    #[test]
    fn test_oversized_element_is_an_error() {
        assert!(matches!(
            FrameArena::<[u8; (4 << 20) + 1]>::new(),
            Err(RenderError::ArenaElementTooLarge { .. })
        ));
    }

    #[test]
    fn test_alloc_after_reset_restarts_at_block_zero() {
        let mut arena = FrameArena::<[u8; 1 << 16]>::new().unwrap();
        for i in 0..70u8 {
            arena.alloc([i; 1 << 16]);
        }
        arena.reset();
        let h = arena.alloc([9; 1 << 16]);
        assert_eq!(h, 0);
        assert_eq!(arena[h][0], 9);
    }

    #[test]
    fn test_reset_invalidates_handles() {
        let mut arena = FrameArena::new().unwrap();
        let h = arena.alloc(7u32);
        arena.reset();
        assert!(arena.get(h).is_none());
        assert!(arena.is_empty());
    }
}
