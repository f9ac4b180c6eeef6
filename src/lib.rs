// Copyright (c) 2022 Papoo Software & Media GmbH <info@papoo.de>
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Keeps a mounted volume below an occupancy limit.
//!
//! Every cycle measures the volume once and, if the occupied space exceeds
//! the limit, deletes the oldest files of each configured pattern. The loop
//! then sleeps until the next cycle or a shutdown request.

#[macro_use]
extern crate tracing;

pub mod cmdargs;
mod config;
mod oldest_queue;
mod reclaimer;
mod report;
mod scheduler;
mod selector;
pub mod signals;
mod status;
mod threshold;
mod volume;

#[cfg(test)]
mod tests;

pub use config::{ConfigError, Policy, DEFAULT_INTERVAL, DEFAULT_PATTERNS};
pub use oldest_queue::OldestQueue;
pub use reclaimer::{
	delete_candidate, over_limit, reclaim, DeletionFailure, DeletionFailureKind, DryRunRemover, FileRemover,
	FsRemover, Removal,
};
pub use report::DeletionReport;
pub use scheduler::{ChannelTicker, CycleOutcome, Scheduler, Ticker, Wake};
pub use selector::{select_oldest, FileCandidate};
pub use status::{ConsoleStatus, RecordedStatus, StatusLine, StatusSink};
pub use threshold::{ParseThresholdError, Threshold};
pub use volume::{capacity, MountTable, Volume, VolumeError, VolumeSource, MOUNT_TABLE_PATH};
