// Copyright (c) 2022 Papoo Software & Media GmbH <info@papoo.de>
// SPDX-License-Identifier: LGPL-3.0-or-later

use crate::config::Policy;
use crate::reclaimer::{over_limit, reclaim, FileRemover};
use crate::report::DeletionReport;
use crate::selector::select_oldest;
use crate::status::{StatusLine, StatusSink};
use crate::volume::VolumeSource;
use crossbeam::channel::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

/// Why a wait between two cycles ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
	Elapsed,
	Shutdown,
}

/// Suspends the loop between two cycles
pub trait Ticker {
	fn wait(&mut self, interval: Duration) -> Wake;
}

/// Sleeps until the interval elapsed or a shutdown request arrives
///
/// Requests sent while a cycle is running are picked up by the next wait,
/// so a cycle is never interrupted.
#[derive(Debug, Clone)]
pub struct ChannelTicker {
	shutdown: Receiver<()>,
}

impl ChannelTicker {
	pub fn new(shutdown: Receiver<()>) -> Self {
		Self { shutdown }
	}
}

impl Ticker for ChannelTicker {
	fn wait(&mut self, interval: Duration) -> Wake {
		match self.shutdown.recv_timeout(interval) {
			Err(RecvTimeoutError::Timeout) => Wake::Elapsed,
			Ok(()) | Err(RecvTimeoutError::Disconnected) => Wake::Shutdown,
		}
	}
}

/// What happened during one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
	/// The volume couldn't be measured, nothing was deleted
	Skipped,
	/// Occupied space was within the limit
	WithinLimit { occupied: u64, limit: u64 },
	/// Occupied space exceeded the limit and the patterns were processed
	Reclaimed {
		occupied: u64,
		limit: u64,
		report: DeletionReport,
	},
}

/// The measure, select and reclaim loop for one volume
pub struct Scheduler<V, R, S> {
	policy: Policy,
	volumes: V,
	remover: R,
	status: S,
}

impl<V, R, S> Scheduler<V, R, S>
where
	V: VolumeSource,
	R: FileRemover,
	S: StatusSink,
{
	pub fn new(policy: Policy, volumes: V, remover: R, status: S) -> Self {
		Self {
			policy,
			volumes,
			remover,
			status,
		}
	}

	#[inline]
	pub fn policy(&self) -> &Policy {
		&self.policy
	}

	#[inline]
	pub fn status(&self) -> &S {
		&self.status
	}

	/// Runs a single measure and reclaim pass
	///
	/// The occupancy is measured once up front and that value governs every
	/// pattern of this cycle, even when earlier patterns already freed enough.
	pub fn run_cycle(&mut self) -> CycleOutcome {
		let volume = match self.volumes.find(&self.policy.volume) {
			Ok(volume) => volume,
			Err(e) => {
				warn!(volume=%self.policy.volume, "{}", e);
				self.status.emit(StatusLine::VolumeUnavailable {
					volume: self.policy.volume.clone(),
					reason: e.to_string(),
				});
				return CycleOutcome::Skipped;
			}
		};

		let occupied = volume.occupied();
		let limit = self.policy.max_occupied.limit(volume.total);
		debug!(
			total = volume.total,
			available = volume.available,
			occupied,
			limit,
			"Measured {:?}", volume.root
		);
		self.status.emit(StatusLine::Measured { occupied });

		if !over_limit(occupied, limit) {
			return CycleOutcome::WithinLimit { occupied, limit };
		}

		let mut report = DeletionReport::default();
		for pattern in &self.policy.patterns {
			self.status.emit(StatusLine::Triggered {
				count: self.policy.delete_count,
				pattern: pattern.as_str().to_owned(),
			});

			let start = Instant::now();
			let candidates = select_oldest(&volume.root, pattern, self.policy.delete_count);
			debug!(
				"Selected {} candidates for {} ({:.2}s).",
				candidates.len(),
				pattern,
				start.elapsed().as_secs_f64()
			);

			report += reclaim(occupied, limit, &candidates, &self.remover, &mut self.status);
		}

		if report.attempted > 0 {
			self.status.emit(StatusLine::CycleSummary(report));
		}
		info!(
			deleted = report.deleted,
			missing = report.missing,
			failed = report.failed,
			"Cycle done"
		);

		CycleOutcome::Reclaimed {
			occupied,
			limit,
			report,
		}
	}

	/// Alternates cycles and waits until `ticker` reports a shutdown
	///
	/// Returns the number of completed cycles.
	pub fn run<T: Ticker + ?Sized>(&mut self, ticker: &mut T) -> u64 {
		let mut cycles = 0;
		loop {
			self.run_cycle();
			cycles += 1;

			self.status.emit(StatusLine::Sleeping {
				interval: self.policy.interval,
			});
			if ticker.wait(self.policy.interval) == Wake::Shutdown {
				info!("Shutdown requested after {} cycles", cycles);
				return cycles;
			}
		}
	}
}
