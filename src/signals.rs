// Copyright (c) 2022 Papoo Software & Media GmbH <info@papoo.de>
// SPDX-License-Identifier: LGPL-3.0-or-later

use crossbeam::channel::{self, Receiver};
use nix::sys::signal::{SigSet, Signal};
use std::io;
use std::thread;

/// Signals that end the reclaim loop
pub const SHUTDOWN_SIGNALS: [Signal; 3] = [Signal::SIGINT, Signal::SIGTERM, Signal::SIGHUP];

/// Turns termination signals into messages on the returned channel
///
/// Blocks [`SHUTDOWN_SIGNALS`] for the calling thread and every thread it
/// spawns afterwards, so this must run before any other thread is started.
/// A helper thread then waits for them synchronously.
pub fn shutdown_channel() -> io::Result<Receiver<()>> {
	let mut set = SigSet::empty();
	for signal in SHUTDOWN_SIGNALS {
		set.add(signal);
	}
	set.thread_block()?;

	let (sender, receiver) = channel::bounded(1);
	thread::Builder::new().name("signals".to_owned()).spawn(move || loop {
		match set.wait() {
			Ok(signal) => {
				info!("Received {}, stopping after the current cycle", signal);
				// A full channel already carries a pending request
				if let Err(channel::TrySendError::Disconnected(())) = sender.try_send(()) {
					return;
				}
			}
			Err(e) => {
				error!("Waiting for signals failed: {}", e);
				return;
			}
		}
	})?;

	Ok(receiver)
}
