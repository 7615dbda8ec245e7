// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

mod delete;
mod insert;
mod verify;

use crate::block::{Block, BlockSlice};
use crate::iter::{Bytes, Chunks, SliceIter};
use crate::node::{Inner, InnerSlot, Leaf, Node};
use crate::piece::Piece;
use crate::{Result, HIGH_WATER};
use arrayvec::ArrayVec;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

/// A persistent, copy-on-write B+-tree sequence of bytes.
///
/// The tree maps byte positions to runs of bytes stored in shared,
/// reference-counted blocks. All edits go through a path copy-on-write step,
/// so a cloned handle is a true snapshot: it keeps observing the bytes it was
/// cloned from, at the cost of one root refcount bump.
///
/// A handle may be mutated by one thread at a time; snapshots can be read
/// from any number of threads concurrently.
#[derive(Clone)]
pub struct SliceTree {
    pub(crate) root: Arc<Node>,
    pub(crate) height: u8,
    pub(crate) len: u64,
}

impl std::fmt::Debug for SliceTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SliceTree(len={}, height={})", self.len, self.height)
    }
}

impl Default for SliceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SliceTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Arc::new(Node::Leaf(Leaf::default())),
            height: 1,
            len: 0,
        }
    }

    /// Creates a tree holding the contents of a file.
    ///
    /// Small files are read into an editable buffer. Anything longer than
    /// [`HIGH_WATER`](crate::HIGH_WATER) is memory-mapped read-only and the
    /// tree references the mapping; edits never write back to the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, read, or mapped.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();

        if len == 0 {
            return Ok(Self::new());
        }

        let piece = if len <= HIGH_WATER as u64 {
            log::debug!("reading {len}B file into a small buffer");

            let mut buf = Vec::with_capacity(HIGH_WATER);
            (&file).read_to_end(&mut buf)?;
            Piece::from_bytes(&buf)
        } else {
            log::debug!("memory-mapping {len}B file");

            let block = Block::map_file(&file)?;
            Piece::Shared(BlockSlice::new(Arc::new(block)))
        };

        let mut leaf = Leaf::default();
        leaf.pieces.push(piece);

        Ok(Self {
            root: Arc::new(Node::Leaf(leaf)),
            height: 1,
            len,
        })
    }

    /// Returns the document length in bytes.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns `true` if the document holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts bytes at the given position, shifting everything behind it.
    ///
    /// Returns the number of line feeds (`\n`) inserted.
    ///
    /// # Panics
    ///
    /// Panics if `pos > self.len()`.
    pub fn insert(&mut self, pos: u64, bytes: impl AsRef<[u8]>) -> usize {
        let bytes = bytes.as_ref();

        assert!(
            pos <= self.len,
            "insert position {pos} out of bounds (len={})",
            self.len,
        );

        if bytes.is_empty() {
            return 0;
        }

        log::trace!("insert {}B at {pos}", bytes.len());

        let root = Arc::make_mut(&mut self.root);
        if let Some(sibling) = insert::node_insert(root, pos, bytes) {
            self.grow_root(sibling);
        }
        // a refill on the way back up can merge the root's last two children
        self.collapse_root();
        self.len += bytes.len() as u64;

        linefeeds(bytes)
    }

    /// Removes up to `count` bytes starting at the given position, clipped to
    /// the end of the document.
    ///
    /// Returns the number of line feeds (`\n`) removed.
    pub fn remove(&mut self, pos: u64, count: u64) -> usize {
        if pos >= self.len {
            return 0;
        }

        let mut rest = count.min(self.len - pos);
        let mut linefeeds = 0;

        log::trace!("remove {rest}B at {pos}");

        // each descent removes at most one leaf's worth of bytes at `pos`,
        // keeping the rebalancing work per descent bounded; repeat until the
        // whole range is gone
        while rest > 0 {
            let root = Arc::make_mut(&mut self.root);
            let removal = delete::node_delete(root, pos, rest);
            debug_assert!(removal.removed > 0, "a descent must make progress");

            rest -= removal.removed;
            self.len -= removal.removed;
            linefeeds += removal.linefeeds;

            if let Some(sibling) = removal.split {
                self.grow_root(sibling);
            }
            self.collapse_root();
        }

        linefeeds
    }

    /// Returns the byte at the given position, if any.
    #[must_use]
    pub fn get(&self, pos: u64) -> Option<u8> {
        if pos >= self.len {
            return None;
        }

        let mut node = self.root.as_ref();
        let mut pos = pos;

        loop {
            match node {
                Node::Inner(inner) => {
                    let (idx, off) = inner.locate(pos);
                    node = inner.slots[idx].child.as_ref();
                    pos = off;
                }
                Node::Leaf(leaf) => {
                    let (idx, off) = leaf.locate(pos);
                    return leaf.pieces[idx].as_bytes().get(off).copied();
                }
            }
        }
    }

    /// Writes the document bytes to a sink, in order, without any framing.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        for chunk in self.chunks() {
            writer.write_all(chunk)?;
        }
        Ok(())
    }

    /// Copies the document into a `Vec`.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len as usize);
        for chunk in self.chunks() {
            out.extend_from_slice(chunk);
        }
        out
    }

    /// Creates a cursor positioned at byte 0.
    #[must_use]
    pub fn iter(&self) -> SliceIter<'_> {
        SliceIter::new(self, 0)
    }

    /// Creates a cursor positioned at the given byte (clipped to the
    /// one-past-the-end position).
    #[must_use]
    pub fn iter_at(&self, pos: u64) -> SliceIter<'_> {
        SliceIter::new(self, pos)
    }

    /// Iterates over the stored chunks, front to back.
    ///
    /// Concatenating the chunks yields exactly the document bytes.
    #[must_use]
    pub fn chunks(&self) -> Chunks<'_> {
        Chunks::new(self, 0)
    }

    /// Iterates over the document bytes, front to back.
    #[must_use]
    pub fn bytes(&self) -> Bytes<'_> {
        Bytes::new(self, 0)
    }

    /// Installs a new root above the old one after a split reached the top.
    fn grow_root(&mut self, sibling: Arc<Node>) {
        let old = std::mem::replace(&mut self.root, Arc::new(Node::Leaf(Leaf::default())));

        let mut slots = ArrayVec::new();
        slots.push(InnerSlot {
            span: old.total_span(),
            child: old,
        });
        slots.push(InnerSlot {
            span: sibling.total_span(),
            child: sibling,
        });

        self.root = Arc::new(Node::Inner(Inner { slots }));
        self.height += 1;

        log::debug!("tree height grew to {}", self.height);
    }

    /// Replaces an inner root that is down to a single child with that child.
    fn collapse_root(&mut self) {
        while let Node::Inner(inner) = self.root.as_ref() {
            if inner.slots.len() > 1 {
                break;
            }

            let child = inner.slots[0].child.clone();
            self.root = child;
            self.height -= 1;

            log::debug!("tree height shrank to {}", self.height);
        }
    }
}

pub(crate) fn linefeeds(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| b == b'\n').count()
}
