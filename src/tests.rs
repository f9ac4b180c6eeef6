use crate::{
	select_oldest, CycleOutcome, DeletionReport, DryRunRemover, FileRemover, FsRemover, Policy, RecordedStatus,
	Scheduler, StatusLine, Threshold, Ticker, Volume, VolumeError, VolumeSource, Wake,
};
use filetime::{set_file_mtime, FileTime};
use glob::Pattern;
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A volume of fixed size rooted in a scratch directory
struct FakeVolume {
	root: PathBuf,
	total: u64,
	occupied: u64,
}

impl VolumeSource for FakeVolume {
	fn find(&self, identifier: &str) -> Result<Volume, VolumeError> {
		if identifier != "/guarded" {
			return Err(VolumeError::NotFound(identifier.to_owned()));
		}
		Ok(Volume {
			root: self.root.clone(),
			total: self.total,
			available: self.total - self.occupied,
		})
	}
}

/// Records removal requests without touching the filesystem
#[derive(Default)]
struct RecordingRemover {
	calls: RefCell<Vec<PathBuf>>,
}

impl FileRemover for RecordingRemover {
	fn remove(&self, path: &Path) -> io::Result<()> {
		self.calls.borrow_mut().push(path.to_owned());
		Ok(())
	}
}

struct Shutdown;

impl Ticker for Shutdown {
	fn wait(&mut self, _interval: Duration) -> Wake {
		Wake::Shutdown
	}
}

fn touch(root: &Path, name: &str, mtime: i64) -> PathBuf {
	let path = root.join(name);
	fs::create_dir_all(path.parent().unwrap()).unwrap();
	fs::write(&path, b"payload").unwrap();
	set_file_mtime(&path, FileTime::from_unix_time(mtime, 0)).unwrap();
	path
}

fn jpg_policy(max: u64, count: usize) -> Policy {
	Policy::new("/guarded", Threshold::Bytes(max), count)
		.with_patterns(["*.jpg"])
		.unwrap()
}

/// 12 GB occupied with a 10 GB limit deletes the three oldest of five JPEGs
#[test]
fn test_over_limit_deletes_oldest() {
	let dir = tempfile::tempdir().unwrap();
	let root = dir.path();
	let newest = touch(root, "2016/08/e.jpg", 1_470_000_500);
	let oldest = touch(root, "2016/07/a.jpg", 1_470_000_100);
	let second = touch(root, "b.jpg", 1_470_000_200);
	let fourth = touch(root, "misc/d.jpg", 1_470_000_400);
	let third = touch(root, "c.jpg", 1_470_000_300);
	let other = touch(root, "notes.txt", 1);

	let volume = FakeVolume {
		root: root.to_owned(),
		total: 20_000_000_000,
		occupied: 12_000_000_000,
	};
	let mut scheduler = Scheduler::new(jpg_policy(10_000_000_000, 3), volume, FsRemover, RecordedStatus::default());

	let outcome = scheduler.run_cycle();
	assert_eq!(
		outcome,
		CycleOutcome::Reclaimed {
			occupied: 12_000_000_000,
			limit: 10_000_000_000,
			report: DeletionReport {
				attempted: 3,
				deleted: 3,
				missing: 0,
				failed: 0,
			},
		}
	);

	for path in [&oldest, &second, &third] {
		assert!(!path.exists(), "{:?} should be deleted", path);
	}
	for path in [&fourth, &newest, &other] {
		assert!(path.exists(), "{:?} should remain", path);
	}

	let lines = &scheduler.status().lines;
	assert_eq!(lines[0], StatusLine::Measured { occupied: 12_000_000_000 });
	assert_eq!(
		lines[1],
		StatusLine::Triggered {
			count: 3,
			pattern: "*.jpg".to_owned()
		}
	);
	assert!(matches!(lines[2], StatusLine::CycleSummary(DeletionReport { deleted: 3, .. })));
	assert_eq!(lines.len(), 3);
}

/// 5 GB occupied with a 10 GB limit only reports the measurement
#[test]
fn test_under_limit_only_measures() {
	let dir = tempfile::tempdir().unwrap();
	let files: Vec<_> = (0..4).map(|i| touch(dir.path(), &format!("{}.jpg", i), i)).collect();

	let volume = FakeVolume {
		root: dir.path().to_owned(),
		total: 20_000_000_000,
		occupied: 5_000_000_000,
	};
	let mut scheduler = Scheduler::new(jpg_policy(10_000_000_000, 3), volume, FsRemover, RecordedStatus::default());

	for _ in 0..2 {
		assert!(matches!(scheduler.run_cycle(), CycleOutcome::WithinLimit { .. }));
	}
	assert!(files.iter().all(|f| f.exists()));
	assert_eq!(
		scheduler.status().lines,
		vec![StatusLine::Measured { occupied: 5_000_000_000 }; 2]
	);
}

/// Occupancy exactly at the limit is not over it
#[test]
fn test_at_limit_is_noop() {
	let dir = tempfile::tempdir().unwrap();
	let file = touch(dir.path(), "a.jpg", 1);
	let volume = FakeVolume {
		root: dir.path().to_owned(),
		total: 100,
		occupied: 50,
	};
	let mut scheduler = Scheduler::new(jpg_policy(50, 1), volume, FsRemover, RecordedStatus::default());
	assert!(matches!(scheduler.run_cycle(), CycleOutcome::WithinLimit { occupied: 50, limit: 50 }));
	assert!(file.exists());
}

/// Every built-in pattern gets its own batch from the same measurement
#[test]
fn test_default_patterns_share_one_measurement() {
	let dir = tempfile::tempdir().unwrap();
	let root = dir.path();
	let old = [
		touch(root, "a.avi", 10),
		touch(root, "a.mov", 10),
		touch(root, "a.png", 10),
		touch(root, "a.jpg", 10),
	];
	let young = [
		touch(root, "b.avi", 20),
		touch(root, "b.mov", 20),
		touch(root, "b.png", 20),
		touch(root, "b.jpg", 20),
	];
	let text = touch(root, "a.txt", 1);

	let volume = FakeVolume {
		root: root.to_owned(),
		total: 1000,
		occupied: 900,
	};
	let mut scheduler = Scheduler::new(
		Policy::new("/guarded", Threshold::Percent(80.0), 1),
		volume,
		FsRemover,
		RecordedStatus::default(),
	);

	let outcome = scheduler.run_cycle();
	assert!(matches!(
		outcome,
		CycleOutcome::Reclaimed {
			occupied: 900,
			limit: 800,
			report: DeletionReport { deleted: 4, .. }
		}
	));
	assert!(old.iter().all(|p| !p.exists()));
	assert!(young.iter().all(|p| p.exists()));
	assert!(text.exists());

	let triggered: Vec<_> = scheduler
		.status()
		.lines
		.iter()
		.filter_map(|line| match line {
			StatusLine::Triggered { pattern, .. } => Some(pattern.as_str()),
			_ => None,
		})
		.collect();
	assert_eq!(triggered, ["*.avi", "*.mov", "*.png", "*.jpg"]);
}

/// Fewer matches than requested deletes all of them without complaint
#[test]
fn test_shortfall_is_not_an_error() {
	let dir = tempfile::tempdir().unwrap();
	let a = touch(dir.path(), "a.jpg", 1);
	let b = touch(dir.path(), "sub/b.jpg", 2);

	let volume = FakeVolume {
		root: dir.path().to_owned(),
		total: 100,
		occupied: 99,
	};
	let mut scheduler = Scheduler::new(jpg_policy(10, 10), volume, FsRemover, RecordedStatus::default());

	match scheduler.run_cycle() {
		CycleOutcome::Reclaimed { report, .. } => {
			assert_eq!(report.attempted, 2);
			assert_eq!(report.failed, 0);
		}
		other => panic!("unexpected outcome {:?}", other),
	}
	assert!(!a.exists() && !b.exists());
	assert!(!scheduler
		.status()
		.lines
		.iter()
		.any(|l| matches!(l, StatusLine::DeletionFailed { .. })));
}

/// Without interim changes two cycles pick exactly the same files
#[test]
fn test_selection_is_deterministic() {
	let dir = tempfile::tempdir().unwrap();
	for (name, mtime) in [("x/1.jpg", 5), ("x/2.jpg", 5), ("3.jpg", 5), ("4.jpg", 1), ("5.jpg", 9)] {
		touch(dir.path(), name, mtime);
	}

	let volume = FakeVolume {
		root: dir.path().to_owned(),
		total: 100,
		occupied: 99,
	};
	let remover = RecordingRemover::default();
	let mut scheduler = Scheduler::new(jpg_policy(10, 3), volume, &remover, RecordedStatus::default());

	scheduler.run_cycle();
	let first = remover.calls.borrow_mut().split_off(0);
	scheduler.run_cycle();
	let second = remover.calls.borrow().clone();

	assert_eq!(first, second);
	let names: Vec<_> = first.iter().map(|p| p.strip_prefix(dir.path()).unwrap().to_owned()).collect();
	assert_eq!(
		names,
		[PathBuf::from("4.jpg"), PathBuf::from("3.jpg"), PathBuf::from("x/1.jpg")]
	);

	let pattern = Pattern::new("*.jpg").unwrap();
	assert_eq!(select_oldest(dir.path(), &pattern, 3), select_oldest(dir.path(), &pattern, 3));
}

/// A dry run walks the same files but leaves them alone
#[test]
fn test_dry_run_cycle() {
	let dir = tempfile::tempdir().unwrap();
	let file = touch(dir.path(), "a.jpg", 1);
	let volume = FakeVolume {
		root: dir.path().to_owned(),
		total: 100,
		occupied: 99,
	};
	let mut scheduler = Scheduler::new(jpg_policy(10, 1), volume, DryRunRemover, RecordedStatus::default());

	assert!(matches!(
		scheduler.run_cycle(),
		CycleOutcome::Reclaimed {
			report: DeletionReport { deleted: 1, .. },
			..
		}
	));
	assert!(file.exists());
}

/// An unknown volume never triggers deletion and the loop keeps going
#[test]
fn test_unknown_volume() {
	let dir = tempfile::tempdir().unwrap();
	let file = touch(dir.path(), "a.jpg", 1);
	let volume = FakeVolume {
		root: dir.path().to_owned(),
		total: 100,
		occupied: 99,
	};
	let policy = Policy::new("/elsewhere", Threshold::Bytes(0), 1)
		.with_patterns(["*.jpg"])
		.unwrap();
	let mut scheduler = Scheduler::new(policy, volume, FsRemover, RecordedStatus::default());

	assert_eq!(scheduler.run(&mut Shutdown), 1);
	assert!(file.exists());
	let lines = &scheduler.status().lines;
	assert!(matches!(lines[0], StatusLine::VolumeUnavailable { .. }));
	assert!(matches!(lines[1], StatusLine::Sleeping { .. }));
}

/// Upper-case camera output is reclaimed by the built-in lower-case patterns
#[test]
fn test_default_patterns_match_upper_case() {
	let dir = tempfile::tempdir().unwrap();
	let photo = touch(dir.path(), "DCIM/DSC0001.JPG", 1);
	let clip = touch(dir.path(), "clip.MOV", 2);

	let volume = FakeVolume {
		root: dir.path().to_owned(),
		total: 100,
		occupied: 99,
	};
	let mut scheduler = Scheduler::new(
		Policy::new("/guarded", Threshold::Bytes(10), 5),
		volume,
		FsRemover,
		RecordedStatus::default(),
	);

	assert!(matches!(
		scheduler.run_cycle(),
		CycleOutcome::Reclaimed {
			report: DeletionReport { attempted: 2, deleted: 2, .. },
			..
		}
	));
	assert!(!photo.exists() && !clip.exists());
}
