// Copyright (c) 2022 Papoo Software & Media GmbH <info@papoo.de>
// SPDX-License-Identifier: LGPL-3.0-or-later

use crate::reclaimer::DeletionFailureKind;
use crate::report::DeletionReport;
use chrono::Local;
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

/// Human readable progress messages of the reclaim loop
#[derive(Debug, Clone, PartialEq)]
pub enum StatusLine {
	/// Occupied bytes measured at the start of a cycle
	Measured { occupied: u64 },
	/// The volume couldn't be measured, reclaiming is skipped this cycle
	VolumeUnavailable { volume: String, reason: String },
	/// Occupied space exceeds the limit, a batch for `pattern` starts
	Triggered { count: usize, pattern: String },
	/// A single file couldn't be deleted
	DeletionFailed {
		path: PathBuf,
		kind: DeletionFailureKind,
		reason: String,
	},
	/// Totals of one cycle that deleted anything
	CycleSummary(DeletionReport),
	/// The loop goes to sleep
	Sleeping { interval: Duration },
}

impl fmt::Display for StatusLine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			StatusLine::Measured { occupied } => write!(f, "Drive size is {} Bytes.", occupied),
			StatusLine::VolumeUnavailable { volume, reason } => {
				write!(f, "Volume {} unavailable, skipping this check: {}", volume, reason)
			}
			StatusLine::Triggered { count, pattern } => write!(
				f,
				"Drive size too large! Deleting oldest {} files of type {}",
				count, pattern
			),
			StatusLine::DeletionFailed { path, kind, reason } => {
				write!(f, "{} while deleting {:?}: {}", kind, path, reason)
			}
			StatusLine::CycleSummary(report) => write!(
				f,
				"Deleted {} of {} files ({} already gone, {} failed).",
				report.deleted,
				report.attempted,
				report.missing,
				report.failed
			),
			StatusLine::Sleeping { interval } => {
				let secs = interval.as_secs();
				if secs >= 60 && secs % 60 == 0 {
					write!(f, "Now sleeping for {} minutes...", secs / 60)
				} else {
					write!(f, "Now sleeping for {} seconds...", secs)
				}
			}
		}
	}
}

/// Receiver of status lines
pub trait StatusSink {
	fn emit(&mut self, line: StatusLine);
}

/// Writes timestamped status lines to standard output
#[derive(Debug, Default)]
pub struct ConsoleStatus;

impl StatusSink for ConsoleStatus {
	fn emit(&mut self, line: StatusLine) {
		let stdout = io::stdout();
		let mut out = stdout.lock();
		let result = writeln!(out, "{}: {}", Local::now().format("%Y-%m-%d %H:%M:%S"), line).and_then(|_| out.flush());
		if let Err(e) = result {
			trace!(error=&e as &dyn std::error::Error, "Couldn't write status line: {}", e);
		}
	}
}

/// Keeps status lines in memory
#[derive(Debug, Default, Clone)]
pub struct RecordedStatus {
	pub lines: Vec<StatusLine>,
}

impl StatusSink for RecordedStatus {
	fn emit(&mut self, line: StatusLine) {
		self.lines.push(line);
	}
}

impl<S: StatusSink + ?Sized> StatusSink for &mut S {
	#[inline]
	fn emit(&mut self, line: StatusLine) {
		(**self).emit(line)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_line_texts() {
		assert_eq!(
			StatusLine::Measured { occupied: 12_000_000_000 }.to_string(),
			"Drive size is 12000000000 Bytes."
		);
		assert_eq!(
			StatusLine::Triggered {
				count: 3,
				pattern: "*.jpg".to_owned()
			}
			.to_string(),
			"Drive size too large! Deleting oldest 3 files of type *.jpg"
		);
		assert_eq!(
			StatusLine::Sleeping {
				interval: Duration::from_secs(180)
			}
			.to_string(),
			"Now sleeping for 3 minutes..."
		);
		assert_eq!(
			StatusLine::Sleeping {
				interval: Duration::from_secs(45)
			}
			.to_string(),
			"Now sleeping for 45 seconds..."
		);
	}

	#[test]
	fn test_failure_line() {
		let line = StatusLine::DeletionFailed {
			path: PathBuf::from("/srv/a.jpg"),
			kind: DeletionFailureKind::PermissionDenied,
			reason: "Permission denied (os error 13)".to_owned(),
		};
		assert_eq!(
			line.to_string(),
			"Permission denied while deleting \"/srv/a.jpg\": Permission denied (os error 13)"
		);
	}

	#[test]
	fn test_recorded_through_reference() {
		fn emit_one<S: StatusSink>(mut sink: S) {
			sink.emit(StatusLine::Measured { occupied: 1 });
		}

		let mut recorded = RecordedStatus::default();
		emit_one(&mut recorded);
		assert_eq!(recorded.lines, vec![StatusLine::Measured { occupied: 1 }]);
	}
}
