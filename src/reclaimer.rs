// Copyright (c) 2022 Papoo Software & Media GmbH <info@papoo.de>
// SPDX-License-Identifier: LGPL-3.0-or-later

use crate::report::DeletionReport;
use crate::selector::FileCandidate;
use crate::status::{StatusLine, StatusSink};
use std::error::Error;
use std::fmt;
use std::fs::remove_file;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Successful outcomes of a single deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
	Deleted,
	AlreadyGone,
}

/// Classification of a failed deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionFailureKind {
	PermissionDenied,
	Io,
	Unknown,
}

impl DeletionFailureKind {
	/// EACCES and EPERM are permission errors, any other errno is an I/O error
	pub fn classify(error: &io::Error) -> Self {
		match error.raw_os_error() {
			Some(libc::EACCES | libc::EPERM) => Self::PermissionDenied,
			Some(_) => Self::Io,
			None if error.kind() == io::ErrorKind::PermissionDenied => Self::PermissionDenied,
			None => Self::Unknown,
		}
	}
}

impl fmt::Display for DeletionFailureKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::PermissionDenied => "Permission denied",
			Self::Io => "I/O failure",
			Self::Unknown => "Unknown failure",
		})
	}
}

/// A file that couldn't be deleted
#[derive(Error, Debug)]
#[error("{kind} while deleting {path:?}: {source}")]
pub struct DeletionFailure {
	pub path: PathBuf,
	pub kind: DeletionFailureKind,
	#[source]
	pub source: io::Error,
}

impl DeletionFailure {
	pub fn new(path: &Path, source: io::Error) -> Self {
		Self {
			path: path.to_owned(),
			kind: DeletionFailureKind::classify(&source),
			source,
		}
	}
}

/// Removes files from the filesystem
pub trait FileRemover {
	fn remove(&self, path: &Path) -> io::Result<()>;
}

/// Deletes for real
#[derive(Debug, Default, Clone, Copy)]
pub struct FsRemover;

impl FileRemover for FsRemover {
	#[inline]
	fn remove(&self, path: &Path) -> io::Result<()> {
		remove_file(path)
	}
}

/// Only logs what would be deleted
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunRemover;

impl FileRemover for DryRunRemover {
	fn remove(&self, path: &Path) -> io::Result<()> {
		info!(path=?path, "[DRY RUN] Would delete {:?}", path);
		Ok(())
	}
}

impl<R: FileRemover + ?Sized> FileRemover for &R {
	#[inline]
	fn remove(&self, path: &Path) -> io::Result<()> {
		(**self).remove(path)
	}
}

/// Returns `true` if `occupied` bytes call for reclaiming space
#[inline]
pub fn over_limit(occupied: u64, limit: u64) -> bool {
	occupied > limit
}

/// Deletes a single candidate, treating an already missing file as success
pub fn delete_candidate<R: FileRemover + ?Sized>(
	candidate: &FileCandidate,
	remover: &R,
) -> Result<Removal, DeletionFailure> {
	let path = candidate.path();
	if !candidate.exists() {
		debug!(path=?path, "Already gone: {:?}", path);
		return Ok(Removal::AlreadyGone);
	}

	let result = remover.remove(path);

	debug!(
		path=?path,
		error=result.as_ref().err().map(|v| v as &dyn Error),
		"Deleting file {:?}: {}", path, if result.is_ok() {"ok"} else {"failed"}
	);

	match result {
		Ok(()) => Ok(Removal::Deleted),
		Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Removal::AlreadyGone),
		Err(e) => Err(DeletionFailure::new(path, e)),
	}
}

/// Deletes `candidates` in order if `occupied` exceeds `limit`
///
/// Failures are reported to `status` and never abort the batch. There is no
/// rollback, a partially processed batch is a valid outcome.
pub fn reclaim<R, S>(
	occupied: u64,
	limit: u64,
	candidates: &[FileCandidate],
	remover: &R,
	status: &mut S,
) -> DeletionReport
where
	R: FileRemover + ?Sized,
	S: StatusSink + ?Sized,
{
	let mut report = DeletionReport::default();
	if !over_limit(occupied, limit) {
		return report;
	}

	for candidate in candidates {
		let result = delete_candidate(candidate, remover);
		report.count(&result);
		if let Err(failure) = result {
			warn!(
				path=?&failure.path,
				error=&failure.source as &dyn Error,
				"{}", failure
			);
			status.emit(StatusLine::DeletionFailed {
				reason: failure.source.to_string(),
				path: failure.path,
				kind: failure.kind,
			});
		}
	}

	report
}
