// Copyright (c) 2022 Papoo Software & Media GmbH <info@papoo.de>
// SPDX-License-Identifier: LGPL-3.0-or-later

use nix::sys::statvfs::statvfs;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Kernel view of the mounts visible to this process
pub const MOUNT_TABLE_PATH: &str = "/proc/self/mounts";

/// Snapshot of a mounted volume's capacity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
	/// Mount point, also the root of the file scan
	pub root: PathBuf,
	pub total: u64,
	pub available: u64,
}

impl Volume {
	/// Occupied bytes as seen by unprivileged users
	#[inline]
	pub fn occupied(&self) -> u64 {
		self.total.saturating_sub(self.available)
	}
}

/// Per-cycle measurement errors
#[derive(Error, Debug)]
pub enum VolumeError {
	#[error("no mounted volume matches `{0}`")]
	NotFound(String),
	#[error("couldn't read the mount table: {0}")]
	MountTable(#[source] io::Error),
	#[error("couldn't get free space information for `{path}`: {source}")]
	Stat {
		path: PathBuf,
		#[source]
		source: nix::Error,
	},
}

/// Resolves volume identifiers to fresh capacity snapshots
pub trait VolumeSource {
	fn find(&self, identifier: &str) -> Result<Volume, VolumeError>;
}

/// Reads the kernel mount table and `statvfs()` on every lookup
#[derive(Debug, Clone)]
pub struct MountTable {
	table: PathBuf,
}

impl Default for MountTable {
	fn default() -> Self {
		Self {
			table: PathBuf::from(MOUNT_TABLE_PATH),
		}
	}
}

impl MountTable {
	/// Uses a different file in `/proc/mounts` format
	pub fn with_table(table: impl Into<PathBuf>) -> Self {
		Self { table: table.into() }
	}

	/// Returns the mount point of `identifier` if it is currently mounted
	///
	/// When a mount point is listed more than once the last entry is the
	/// visible one, but all of them share the path.
	pub fn mount_point(&self, identifier: &str) -> Result<Option<PathBuf>, VolumeError> {
		let content = fs::read_to_string(&self.table).map_err(VolumeError::MountTable)?;
		Ok(content
			.lines()
			.filter_map(|line| line.split_whitespace().nth(1))
			.map(unescape_mount_field)
			.filter(|mount_point| mount_point == identifier)
			.last()
			.map(PathBuf::from))
	}
}

impl VolumeSource for MountTable {
	fn find(&self, identifier: &str) -> Result<Volume, VolumeError> {
		let root = self
			.mount_point(identifier)?
			.ok_or_else(|| VolumeError::NotFound(identifier.to_owned()))?;
		capacity(&root)
	}
}

/// Reads total and available capacity of the filesystem containing `root`
pub fn capacity(root: &Path) -> Result<Volume, VolumeError> {
	let stat = statvfs(root).map_err(|source| VolumeError::Stat {
		path: root.to_owned(),
		source,
	})?;
	let fragment_size = stat.fragment_size() as u64;
	Ok(Volume {
		root: root.to_owned(),
		total: stat.blocks() as u64 * fragment_size,
		available: stat.blocks_available() as u64 * fragment_size,
	})
}

/// Decodes the octal escapes (`\040` for space etc.) used in mount tables
fn unescape_mount_field(field: &str) -> String {
	let bytes = field.as_bytes();
	let mut out = Vec::with_capacity(bytes.len());
	let mut i = 0;
	while i < bytes.len() {
		if bytes[i] == b'\\' && i + 4 <= bytes.len() {
			let digits = &bytes[i + 1..i + 4];
			if digits.iter().all(|d| (b'0'..=b'7').contains(d)) {
				let value = digits.iter().fold(0u16, |acc, d| acc * 8 + u16::from(d - b'0'));
				if let Ok(value) = u8::try_from(value) {
					out.push(value);
					i += 4;
					continue;
				}
			}
		}
		out.push(bytes[i]);
		i += 1;
	}
	String::from_utf8_lossy(&out).into_owned()
}
