// Copyright (c) 2022 Papoo Software & Media GmbH <info@papoo.de>
// SPDX-License-Identifier: LGPL-3.0-or-later

use clap::Parser;
use spacewarden::cmdargs::Args;
use spacewarden::signals::shutdown_channel;
use spacewarden::{
	ChannelTicker, ConsoleStatus, DryRunRemover, FileRemover, FsRemover, MountTable, Policy, Scheduler,
};
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::prelude::*;

/// Installs the diagnostic log subscriber
///
/// Logs go to the journal when stderr is connected to it, otherwise to stderr.
/// `RUST_LOG` overrides the level derived from `verbose`.
fn init_logging(verbose: u8) {
	let level = match verbose {
		0 => Level::WARN,
		1 => Level::INFO,
		2 => Level::DEBUG,
		_ => Level::TRACE,
	};
	let filter = EnvFilter::builder()
		.with_default_directive(LevelFilter::from_level(level).into())
		.from_env_lossy();

	#[cfg(feature = "systemd")]
	let journald = std::env::var_os("JOURNAL_STREAM").and_then(|_| tracing_journald::layer().ok());
	#[cfg(not(feature = "systemd"))]
	let journald: Option<tracing_subscriber::layer::Identity> = None;

	let stderr = journald
		.is_none()
		.then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

	tracing_subscriber::registry().with(filter).with(journald).with(stderr).init();
}

fn run<R: FileRemover>(policy: Policy, remover: R, once: bool) -> std::io::Result<()> {
	// Must happen before any other thread exists
	let shutdown = if once { None } else { Some(shutdown_channel()?) };

	let mut scheduler = Scheduler::new(policy, MountTable::default(), remover, ConsoleStatus);
	match shutdown {
		None => {
			scheduler.run_cycle();
		}
		Some(receiver) => {
			scheduler.run(&mut ChannelTicker::new(receiver));
		}
	}
	Ok(())
}

/// Main function
///
/// Parses the arguments and runs the reclaim loop until a termination signal arrives.
fn main() -> ExitCode {
	let args = Args::parse();
	init_logging(args.verbose);

	let policy = match Policy::from_args(&args) {
		Ok(policy) => policy,
		Err(e) => {
			error!("{}", e);
			eprintln!("error: {}", e);
			return ExitCode::from(2);
		}
	};

	info!(
		volume = %policy.volume,
		max_occupied = %policy.max_occupied,
		delete_count = policy.delete_count,
		interval = policy.interval.as_secs(),
		dry_run = policy.dry_run,
		"Guarding volume"
	);

	let result = if policy.dry_run {
		run(policy, DryRunRemover, args.once)
	} else {
		run(policy, FsRemover, args.once)
	};

	match result {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			error!("{}", e);
			eprintln!("error: {}", e);
			ExitCode::FAILURE
		}
	}
}
