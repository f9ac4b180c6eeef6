// Copyright (c) 2022 Papoo Software & Media GmbH <info@papoo.de>
// SPDX-License-Identifier: LGPL-3.0-or-later

use std::fmt;
use std::num::{ParseFloatError, ParseIntError};
use std::str::FromStr;
use thiserror::Error;

/// Unit suffixes accepted after a byte count, longest first.
const UNITS: [(&str, f64); 9] = [
	("Ki", 1024.0),
	("Mi", 1048576.0),
	("Gi", 1073741824.0),
	("Ti", 1099511627776.0),
	("K", 1000.0),
	("k", 1000.0),
	("M", 1000000.0),
	("G", 1000000000.0),
	("T", 1000000000000.0),
];

/// Maximum occupied space on a volume, either in bytes or relative to its capacity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
	Bytes(u64),
	Percent(f64),
}

impl Threshold {
	/// Resolves the limit in bytes for a volume of `total` bytes
	#[inline]
	pub fn limit(&self, total: u64) -> u64 {
		match self {
			Threshold::Bytes(n) => *n,
			Threshold::Percent(p) => (*p / 100.0 * total as f64) as u64,
		}
	}
}

impl fmt::Display for Threshold {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Threshold::Bytes(n) => write!(f, "{}", n),
			Threshold::Percent(p) => write!(f, "{}%", p),
		}
	}
}

/// Error type for parsing a `Threshold`
#[derive(Error, Debug)]
pub enum ParseThresholdError {
	#[error("expected a non-negative byte count, optionally with a unit or `%`")]
	Empty,
	#[error("expected a non-negative byte count, optionally with a unit or `%`")]
	InvalidInt(#[from] ParseIntError),
	#[error("expected a non-negative byte count, optionally with a unit or `%`")]
	InvalidFloat(#[from] ParseFloatError),
	#[error("`{0}` is not a valid unit. Known units are `K`, `Ki`, `M`, `Mi`, `G`, `Gi`, `T`, `Ti`, `%`.")]
	InvalidUnit(char),
	#[error("a percentage must lie between 0 and 100, got {0}")]
	PercentOutOfRange(f64),
	#[error("`{0}` is not a finite non-negative number")]
	NotFinite(String),
}

/// Parses the numeric part in front of a unit or `%`
fn parse_amount(number: &str) -> Result<f64, ParseThresholdError> {
	let value = number.parse::<f64>()?;
	if !value.is_finite() || value.is_sign_negative() {
		return Err(ParseThresholdError::NotFinite(number.to_owned()));
	}
	Ok(value)
}

impl FromStr for Threshold {
	type Err = ParseThresholdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let s = s.trim();
		let last = s.chars().last().ok_or(ParseThresholdError::Empty)?;

		if s.starts_with('-') {
			return Err(s.parse::<u64>().unwrap_err().into());
		}

		if last.is_ascii_digit() {
			return Ok(Threshold::Bytes(s.parse()?));
		}

		if let Some(number) = s.strip_suffix('%') {
			let percent = parse_amount(number)?;
			if !(0.0..=100.0).contains(&percent) {
				return Err(ParseThresholdError::PercentOutOfRange(percent));
			}
			return Ok(Threshold::Percent(percent));
		}

		for (suffix, factor) in UNITS {
			if let Some(number) = s.strip_suffix(suffix) {
				return Ok(Threshold::Bytes((parse_amount(number)? * factor) as u64));
			}
		}

		Err(ParseThresholdError::InvalidUnit(last))
	}
}
