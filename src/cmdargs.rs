// Copyright (c) 2022 Papoo Software & Media GmbH <info@papoo.de>
// SPDX-License-Identifier: LGPL-3.0-or-later

use crate::threshold::Threshold;
use clap::Parser;

/// Keeps a volume below an occupancy limit by periodically deleting the
/// oldest files of selected file types.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
	/// Mount point of the volume to guard, matched exactly (e.g. `/srv/media`).
	pub volume: String,

	/// Maximum occupied space. A plain byte count, or attach 'K', 'M', 'G',
	/// 'T' (or `Ki`, `Mi`, ...) for larger units, or '%' for a percentage of
	/// the volume's total size.
	#[clap(value_name = "MAX_OCCUPIED")]
	pub max_occupied: Threshold,

	/// Number of oldest files deleted per file pattern whenever the limit is exceeded.
	#[clap(value_name = "DELETE_COUNT")]
	pub delete_count: usize,

	/// Glob pattern of file names eligible for deletion. May be repeated;
	/// replaces the built-in list (`*.avi`, `*.mov`, `*.png`, `*.jpg`).
	#[clap(short, long = "pattern", value_name = "GLOB")]
	pub patterns: Vec<String>,

	/// Seconds to sleep between two checks.
	#[clap(short, long, value_name = "SECONDS", default_value_t = 180)]
	pub interval: u64,

	/// Only report which files would be deleted.
	#[clap(short = 'n', long)]
	pub dry_run: bool,

	/// Run a single check and exit instead of looping.
	#[clap(long)]
	pub once: bool,

	/// Increase verbosity
	#[clap(short, long, action = clap::ArgAction::Count)]
	pub verbose: u8,
}
