// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! A K.I.S.S. implementation of a copy-on-write B+-tree byte sequence.
//!
//! ##### About
//!
//! This crate exports a [`SliceTree`], a mutable sequence of bytes meant to
//! back a text editor buffer. The bytes are stored in a B+-tree of fixed-arity
//! nodes whose leaves reference shared, reference-counted byte blocks: short
//! runs live in small heap buffers that are edited in place, long runs live in
//! large immutable blocks (heap-allocated or memory-mapped from a file) that
//! are never copied on edit, only re-sliced.
//!
//! Every node and block is reference counted, and any node about to be
//! mutated is made unique first (path copy-on-write). Cloning a tree is
//! therefore O(1) and yields a snapshot that is completely unaffected by
//! later edits to the original, while still sharing all unchanged structure:
//!
//! ```
//! use slice_tree::SliceTree;
//!
//! let mut doc = SliceTree::new();
//! doc.insert(0, "hello world");
//! doc.insert(5, ",");
//! assert_eq!(doc.to_vec(), b"hello, world");
//!
//! // O(1) snapshot
//! let snapshot = doc.clone();
//!
//! doc.remove(0, 7);
//! assert_eq!(doc.to_vec(), b"world");
//!
//! // the snapshot still sees the old bytes
//! assert_eq!(snapshot.to_vec(), b"hello, world");
//! ```
//!
//! Insertion and deletion are O(log n) in the document size, plus the cost of
//! shifting bytes inside at most one small block. Iteration is chunk-based:
//!
//! ```
//! # use slice_tree::SliceTree;
//! let mut doc = SliceTree::new();
//! doc.insert(0, "one\ntwo\n");
//!
//! let mut out = vec![];
//! for chunk in doc.chunks() {
//!     out.extend_from_slice(chunk);
//! }
//! assert_eq!(out, doc.to_vec());
//! ```
//!
//! Large files are not read into memory: [`SliceTree::from_file`] memory-maps
//! anything bigger than a kilobyte and the tree references the mapping until
//! the last edit has superseded it.

#![deny(unsafe_code)]
#![deny(clippy::all, missing_docs, clippy::cargo)]
#![deny(clippy::unwrap_used)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(clippy::expect_used)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::option_if_let_else)]

mod block;
mod error;
mod iter;
mod node;
mod piece;
mod tree;

pub use error::{Error, Result};
pub use iter::{Bytes, Chunks, SliceIter};
pub use tree::SliceTree;

/// Spans at or below this many bytes are stored in small in-place-editable
/// buffers; anything longer is referenced through an immutable shared block.
pub const HIGH_WATER: usize = 1_024;
