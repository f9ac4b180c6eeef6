// Copyright (c) 2022 Christoph Grenz (Papoo Software & Media GmbH) <info@papoo.de>
// SPDX-License-Identifier: LGPL-3.0-or-later

use std::collections::BinaryHeap;

/// Upper bound for the preallocated heap, independent of the requested count
const MAX_PREALLOCATED: usize = 1024;

/// A queue that retains only the `limit` smallest items pushed into it.
///
/// Backed by a max-[`BinaryHeap`], so the largest retained item is evicted
/// (or the new item rejected) once the limit is reached. Memory stays
/// bounded by `limit` no matter how many items are offered.
#[derive(Debug, Clone)]
pub struct OldestQueue<T> {
	heap: BinaryHeap<T>,
	limit: usize,
}

impl<T: Ord> OldestQueue<T> {
	/// Creates an empty queue that keeps at most `limit` items.
	#[must_use]
	pub fn new(limit: usize) -> Self {
		Self {
			heap: BinaryHeap::with_capacity(limit.min(MAX_PREALLOCATED)),
			limit,
		}
	}

	#[inline]
	pub fn len(&self) -> usize {
		self.heap.len()
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.heap.is_empty()
	}

	/// Offers an item to the queue.
	///
	/// Returns `false` if the item was rejected because the queue is full
	/// and every retained item is smaller.
	#[inline]
	pub fn push(&mut self, item: T) -> bool {
		if self.limit == 0 {
			return false;
		}
		if self.heap.len() >= self.limit {
			match self.heap.peek() {
				Some(largest) if &item >= largest => return false,
				_ => {
					self.heap.pop();
				}
			}
		}
		self.heap.push(item);
		true
	}

	/// Consumes the queue and returns the retained items in ascending order.
	#[inline]
	pub fn into_sorted_vec(self) -> Vec<T> {
		self.heap.into_sorted_vec()
	}
}
