// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use std::fs::File;
use std::sync::Arc;

/// Backing storage for a run of bytes that is too long to edit in place.
///
/// A block is immutable for its entire lifetime; edits never write into a
/// block, they re-slice it or replace it. Sharing is done through `Arc`, so
/// the backing store (heap allocation or file mapping) is released exactly
/// when the last slice into it is dropped.
pub(crate) enum Block {
    /// Heap-allocated bytes
    Heap(Box<[u8]>),

    /// A read-only, shared mapping of an input file
    Mmap(memmap2::Mmap),
}

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Heap(data) => write!(f, "Block::Heap({}B)", data.len()),
            Self::Mmap(map) => write!(f, "Block::Mmap({}B)", map.len()),
        }
    }
}

impl Block {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Heap(data) => data,
            Self::Mmap(map) => map,
        }
    }

    /// Maps a file read-only.
    ///
    /// The safety caveat of `memmap2` is that the mapping is only as immutable
    /// as the underlying file; a concurrent writer to the file can change the
    /// bytes under us. That is the documented contract of loading a buffer
    /// from a file, same as for any editor that maps its input.
    #[allow(unsafe_code)]
    pub fn map_file(file: &File) -> std::io::Result<Self> {
        let map = unsafe { memmap2::Mmap::map(file)? };
        Ok(Self::Mmap(map))
    }
}

/// A window into a shared [`Block`].
///
/// Cloning bumps the block refcount; narrowing produces a new window into the
/// same block without touching the bytes.
#[derive(Clone)]
pub(crate) struct BlockSlice {
    block: Arc<Block>,
    start: usize,
    len: usize,
}

impl std::fmt::Debug for BlockSlice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BlockSlice({}..{} of {:?})", self.start, self.start + self.len, self.block)
    }
}

impl BlockSlice {
    /// Window covering a whole block.
    pub fn new(block: Arc<Block>) -> Self {
        let len = block.as_bytes().len();
        Self { block, start: 0, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn as_bytes(&self) -> &[u8] {
        let end = self.start + self.len;

        self.block
            .as_bytes()
            .get(self.start..end)
            .expect("window should be in block bounds")
    }

    /// Sub-window, sharing the same block.
    ///
    /// # Panics
    ///
    /// Panics if the requested range does not lie inside this window.
    pub fn slice(&self, start: usize, len: usize) -> Self {
        assert!(
            start + len <= self.len,
            "window out of bounds: {start}+{len} > {}",
            self.len,
        );

        Self {
            block: self.block.clone(),
            start: self.start + start,
            len,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn block_slice_narrowing() {
        let block = Arc::new(Block::Heap(b"hello world".to_vec().into_boxed_slice()));
        let whole = BlockSlice::new(block);
        assert_eq!(b"hello world", whole.as_bytes());

        let world = whole.slice(6, 5);
        assert_eq!(b"world", world.as_bytes());

        let orl = world.slice(1, 3);
        assert_eq!(b"orl", orl.as_bytes());
    }

    #[test]
    #[should_panic(expected = "window out of bounds")]
    fn block_slice_out_of_bounds() {
        let block = Arc::new(Block::Heap(b"abc".to_vec().into_boxed_slice()));
        let whole = BlockSlice::new(block);
        let _ = whole.slice(1, 3);
    }

    #[test]
    fn block_sharing_is_by_refcount() {
        let block = Arc::new(Block::Heap(b"0123456789".to_vec().into_boxed_slice()));
        let a = BlockSlice::new(block.clone());
        let b = a.slice(2, 8);
        drop(a);

        // the narrowed window keeps the block alive
        assert_eq!(2, Arc::strong_count(&block));
        assert_eq!(b"23456789", b.as_bytes());
    }
}
