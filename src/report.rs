// Copyright (c) 2022 Christoph Grenz (Papoo Software & Media GmbH) <info@papoo.de>
// SPDX-License-Identifier: LGPL-3.0-or-later

use crate::reclaimer::Removal;
use std::ops::AddAssign;

/// Outcome counts of one or more deletion batches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletionReport {
	/// Candidates a deletion was attempted for
	pub attempted: u64,
	/// Files removed by this process
	pub deleted: u64,
	/// Files that were already gone when their turn came
	pub missing: u64,
	/// Files that couldn't be removed
	pub failed: u64,
}

impl DeletionReport {
	/// Deletions that ended with the file being gone
	#[inline]
	pub fn succeeded(&self) -> u64 {
		self.deleted + self.missing
	}

	/// Count the given deletion result into the report
	#[inline]
	pub fn count<E>(&mut self, r: &Result<Removal, E>) {
		self.attempted += 1;
		match r {
			Ok(Removal::Deleted) => self.deleted += 1,
			Ok(Removal::AlreadyGone) => self.missing += 1,
			Err(_) => self.failed += 1,
		}
	}

	/// Merge the counts of the given report
	#[inline]
	pub fn merge(&mut self, other: DeletionReport) {
		self.attempted += other.attempted;
		self.deleted += other.deleted;
		self.missing += other.missing;
		self.failed += other.failed;
	}
}

impl AddAssign for DeletionReport {
	#[inline]
	fn add_assign(&mut self, other: Self) {
		self.merge(other);
	}
}

impl std::iter::Sum<Self> for DeletionReport {
	fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
		let mut acc = Self::default();
		for item in iter {
			acc.merge(item);
		}
		acc
	}
}
