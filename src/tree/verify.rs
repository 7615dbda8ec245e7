// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::SliceTree;
use crate::node::{Node, MIN_FILL};
use crate::piece::Piece;
use crate::HIGH_WATER;

impl SliceTree {
    /// Walks the whole tree and panics on the first violated structural
    /// invariant. O(n); meant for tests and debug builds, not production
    /// paths.
    #[doc(hidden)]
    pub fn verify(&self) {
        let total = check_node(self.root.as_ref(), self.height, true);
        assert_eq!(
            self.len, total,
            "cached length should match the root span"
        );
    }
}

fn check_node(node: &Node, height: u8, is_root: bool) -> u64 {
    match node {
        Node::Inner(inner) => {
            assert!(height > 1, "inner node at leaf height");

            let min = if is_root { 2 } else { MIN_FILL };
            assert!(
                inner.slots.len() >= min,
                "inner node underfull: {} < {min}",
                inner.slots.len(),
            );

            let mut total = 0;

            for slot in &inner.slots {
                let span = check_node(slot.child.as_ref(), height - 1, false);
                assert_eq!(slot.span, span, "cached span should match child span");
                assert!(span > 0, "empty subtree");
                total += span;
            }

            total
        }
        Node::Leaf(leaf) => {
            assert_eq!(1, height, "leaf above leaf height");

            // an empty document is a root leaf with no pieces, so the root
            // leaf has no minimum
            if !is_root {
                assert!(
                    leaf.pieces.len() >= MIN_FILL,
                    "leaf underfull: {} < {MIN_FILL}",
                    leaf.pieces.len(),
                );
            }

            let mut total = 0;
            let mut prev_small = false;

            for piece in &leaf.pieces {
                assert!(!piece.is_empty(), "empty piece");

                match piece {
                    Piece::Small(buf) => {
                        assert!(
                            buf.len() <= HIGH_WATER,
                            "small piece over the high-water mark"
                        );
                        assert!(!prev_small, "two adjacent small pieces");
                        prev_small = true;
                    }
                    Piece::Shared(view) => {
                        assert!(
                            view.len() > HIGH_WATER,
                            "shared piece at or below the high-water mark"
                        );
                        prev_small = false;
                    }
                }

                total += piece.len() as u64;
            }

            total
        }
    }
}
