// Copyright (c) 2022 Papoo Software & Media GmbH <info@papoo.de>
// SPDX-License-Identifier: LGPL-3.0-or-later

use crate::oldest_queue::OldestQueue;
use glob::{MatchOptions, Pattern};
use std::cmp::Ordering;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// File names are compared without regard to case, so `*.jpg` matches `DSC0001.JPG`
const NAME_MATCH: MatchOptions = MatchOptions {
	case_sensitive: false,
	require_literal_separator: false,
	require_literal_leading_dot: false,
};

/// A file eligible for deletion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
	path: PathBuf,
	modified: SystemTime,
	order: u64,
}

impl FileCandidate {
	#[inline]
	pub fn new(path: PathBuf, modified: SystemTime, order: u64) -> Self {
		Self { path, modified, order }
	}

	#[inline]
	pub fn path(&self) -> &Path {
		&self.path
	}

	#[inline]
	pub fn modified(&self) -> &SystemTime {
		&self.modified
	}

	/// Position in the directory traversal, breaks ties between equal timestamps
	#[inline]
	pub fn order(&self) -> u64 {
		self.order
	}

	/// Checks whether the file is still present right now
	///
	/// A dangling symlink still counts as present.
	#[inline]
	pub fn exists(&self) -> bool {
		self.path.symlink_metadata().is_ok()
	}
}

impl PartialOrd for FileCandidate {
	#[inline]
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for FileCandidate {
	#[inline]
	fn cmp(&self, other: &Self) -> Ordering {
		self.modified
			.cmp(&other.modified)
			.then(self.order.cmp(&other.order))
			.then_with(|| self.path.cmp(&other.path))
	}
}

/// Returns the `count` least recently modified regular files below `root`
/// whose file name matches `pattern` (ignoring case), oldest first.
///
/// Directory entries are visited in file name order and the scan stays on
/// the filesystem of `root`. Unreadable entries and subtrees are skipped.
#[instrument(level = "debug", skip(pattern), fields(pattern = pattern.as_str()))]
pub fn select_oldest(root: &Path, pattern: &Pattern, count: usize) -> Vec<FileCandidate> {
	if count == 0 {
		return Vec::new();
	}

	let mut queue = OldestQueue::new(count);
	let mut order = 0u64;
	let walker = WalkDir::new(root)
		.follow_links(false)
		.same_file_system(true)
		.sort_by_file_name();

	for entry in walker {
		let entry = match entry {
			Ok(entry) => entry,
			Err(e) => {
				warn!(
					path=?e.path(),
					error=&e as &dyn Error,
					"Skipping unreadable entry {:?}: {}", e.path().unwrap_or(root), e
				);
				continue;
			}
		};
		if !entry.file_type().is_file() {
			continue;
		}
		if !pattern.matches_with(&entry.file_name().to_string_lossy(), NAME_MATCH) {
			continue;
		}

		let modified = match entry.metadata().map_err(Into::into).and_then(|m| m.modified()) {
			Ok(modified) => modified,
			Err(e) => {
				warn!(path=?entry.path(), "Skipping {:?}: {}", entry.path(), e);
				continue;
			}
		};

		queue.push(FileCandidate::new(entry.into_path(), modified, order));
		order += 1;
	}

	queue.into_sorted_vec()
}
