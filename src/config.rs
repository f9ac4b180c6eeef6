// Copyright (c) 2022 Papoo Software & Media GmbH <info@papoo.de>
// SPDX-License-Identifier: LGPL-3.0-or-later

use crate::cmdargs::Args;
use crate::threshold::Threshold;
use glob::Pattern;
use std::time::Duration;
use thiserror::Error;

/// File patterns reclaimed when none are given on the command line
pub const DEFAULT_PATTERNS: [&str; 4] = ["*.avi", "*.mov", "*.png", "*.jpg"];

/// Pause between two cycles when none is given on the command line
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(180);

/// Fatal startup errors
#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("invalid file pattern `{pattern}`: {source}")]
	Pattern {
		pattern: String,
		#[source]
		source: glob::PatternError,
	},
	#[error("the check interval must be at least one second")]
	ZeroInterval,
}

/// Reclaim policy, fixed for the lifetime of the process
#[derive(Debug, Clone)]
pub struct Policy {
	/// Mount point of the guarded volume
	pub volume: String,

	/// Maximum occupied space before files are deleted
	pub max_occupied: Threshold,

	/// Files deleted per pattern whenever the limit is exceeded
	pub delete_count: usize,

	/// Eligible file name patterns, processed in this order
	pub patterns: Vec<Pattern>,

	/// Pause between two cycles
	pub interval: Duration,

	/// Report deletions without performing them
	pub dry_run: bool,
}

impl Policy {
	/// Creates a policy with the built-in patterns and interval
	pub fn new(volume: impl Into<String>, max_occupied: Threshold, delete_count: usize) -> Self {
		Self {
			volume: volume.into(),
			max_occupied,
			delete_count,
			patterns: DEFAULT_PATTERNS
				.iter()
				.filter_map(|p| Pattern::new(p).ok())
				.collect(),
			interval: DEFAULT_INTERVAL,
			dry_run: false,
		}
	}

	/// Replaces the pattern list
	pub fn with_patterns<I, S>(mut self, patterns: I) -> Result<Self, ConfigError>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		self.patterns = patterns
			.into_iter()
			.map(|p| {
				let p = p.as_ref();
				Pattern::new(p).map_err(|source| ConfigError::Pattern {
					pattern: p.to_owned(),
					source,
				})
			})
			.collect::<Result<_, _>>()?;
		Ok(self)
	}

	/// Validates the command line and freezes it into a policy
	pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
		if args.interval == 0 {
			return Err(ConfigError::ZeroInterval);
		}
		let mut policy = Self::new(args.volume.clone(), args.max_occupied, args.delete_count);
		if !args.patterns.is_empty() {
			policy = policy.with_patterns(&args.patterns)?;
		}
		policy.interval = Duration::from_secs(args.interval);
		policy.dry_run = args.dry_run;
		Ok(policy)
	}
}
