/*!
# Rip DVD: Ripping
*/

pub(crate) mod opts;

use crate::{
	KillSwitch,
	READ_BATCH,
	RipDvdError,
	RipRequest,
	SECTOR_SIZE,
	SectorSource,
	title::SectorRange,
};
use std::path::{
	Path,
	PathBuf,
};
use tempfile::NamedTempFile;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Rip Progress.
///
/// Emitted after every successful batch write. `bytes_total` is fixed for
/// the whole rip — the a-priori playlist size — and `bytes_written` only
/// ever climbs, reaching the total exactly when the rip completes.
pub struct Progress {
	bytes_written: u64,
	bytes_total: u64,
}

impl Progress {
	#[must_use]
	/// # Bytes Written So Far.
	pub const fn bytes_written(&self) -> u64 { self.bytes_written }

	#[must_use]
	/// # Total Bytes Expected.
	pub const fn bytes_total(&self) -> u64 { self.bytes_total }

	#[must_use]
	/// # Finished?
	pub const fn done(&self) -> bool { self.bytes_written == self.bytes_total }
}



/// # Rip!
///
/// The one-stop entry point: parse the disc named by the request, resolve
/// the title and chapter range, and stream the result to the request's
/// destination.
///
/// ## Errors
///
/// This will bubble up any parse/request/IO errors encountered along the
/// way, including [`RipDvdError::Killed`] if the switch was tripped.
pub fn rip<P>(request: &RipRequest, on_progress: P, killed: &KillSwitch)
-> Result<PathBuf, RipDvdError>
where P: FnMut(Progress) {
	crate::Disc::new(request.video_ts())?.rip(request, on_progress, killed)
}

/// # Drive a Sector Source Over a Playlist.
///
/// The engine proper: open the source, stream every range — one key-request
/// seek per cell, reads batched [`READ_BATCH`] sectors at a time — into the
/// destination, and only let the output materialize if the whole run
/// succeeds.
///
/// The output is staged as a sibling temp file and persisted at the end, so
/// failure and cancellation never leave a partial destination behind; the
/// source is closed again on every exit path.
///
/// ## Errors
///
/// Any source, write, or cancellation error aborts the rip.
pub(crate) fn rip_playlist<S, P>(
	src: &mut S,
	playlist: &[SectorRange],
	destination: &Path,
	decrypt: bool,
	mut on_progress: P,
	killed: &KillSwitch,
) -> Result<PathBuf, RipDvdError>
where S: SectorSource, P: FnMut(Progress) {
	src.open()?;
	let res = RipWriter::new(destination).and_then(|mut writer| {
		drive(src, playlist, &mut writer, decrypt, &mut on_progress, killed)?;
		writer.finish()
	});
	src.close();

	res.map(|()| destination.to_path_buf())
}

/// # The Batch Loop.
///
/// Kept apart from the open/close/persist choreography so an early return
/// is always safe: the caller owns the cleanup.
fn drive<S, P>(
	src: &mut S,
	playlist: &[SectorRange],
	writer: &mut RipWriter,
	decrypt: bool,
	on_progress: &mut P,
	killed: &KillSwitch,
) -> Result<(), RipDvdError>
where S: SectorSource, P: FnMut(Progress) {
	let bytes_total: u64 = playlist.iter().map(SectorRange::bytes).sum();
	let mut bytes_written: u64 = 0;
	let mut buf = vec![0_u8; usize::from(READ_BATCH) * usize::from(SECTOR_SIZE)];

	for rng in playlist {
		if killed.killed() { return Err(RipDvdError::Killed); }

		// Each cell gets its own seek; on an encrypted disc this is also
		// where the title key for the cell gets negotiated, which is why
		// adjacent ranges are never merged upstream.
		src.seek(rng.start(), decrypt)?;

		let mut remaining = rng.sector_count();
		while remaining != 0 {
			if killed.killed() { return Err(RipDvdError::Killed); }

			let want = remaining.min(u32::from(READ_BATCH)) as u16;
			let got = src.read(&mut buf, want, decrypt)?;
			if got == 0 {
				// The cursor sits at the first sector that didn't arrive.
				return Err(RipDvdError::SectorRead(rng.start() + (rng.sector_count() - remaining)));
			}

			let len = usize::from(got) * usize::from(SECTOR_SIZE);
			writer.write_all(&buf[..len])?;
			bytes_written += len as u64;
			remaining -= u32::from(got);

			on_progress(Progress { bytes_written, bytes_total });
			if killed.killed() { return Err(RipDvdError::Killed); }
		}
	}

	Ok(())
}



/// # Rip Writer.
///
/// A thin wrapper around a tempfile staged next to the destination: bytes
/// accumulate in the temp file, and only a clean [`RipWriter::finish`] makes
/// them real. Dropping the writer any other way unlinks the stage, which is
/// the entirety of the failure cleanup story.
struct RipWriter {
	dst: PathBuf,
	tmp: NamedTempFile,
}

impl RipWriter {
	/// # New Writer.
	///
	/// The stage lives in the destination's parent directory to guarantee
	/// the final persist is a cheap rename. A missing parent is created.
	///
	/// ## Errors
	///
	/// This will bubble up any I/O-related errors.
	fn new(dst: &Path) -> Result<Self, RipDvdError> {
		if dst.is_dir() {
			return Err(RipDvdError::Write(dst.to_string_lossy().into_owned()));
		}

		let parent = match dst.parent() {
			Some(p) if ! p.as_os_str().is_empty() => p,
			_ => Path::new("."),
		};
		if ! parent.is_dir() {
			std::fs::create_dir_all(parent)
				.map_err(|_| RipDvdError::Write(dst.to_string_lossy().into_owned()))?;
		}

		let tmp = tempfile::Builder::new()
			.tempfile_in(parent)
			.map_err(|_| RipDvdError::Write(dst.to_string_lossy().into_owned()))?;

		Ok(Self { dst: dst.to_path_buf(), tmp })
	}

	/// # Write a Batch.
	///
	/// ## Errors
	///
	/// Returns an error if the bytes don't land.
	fn write_all(&mut self, data: &[u8]) -> Result<(), RipDvdError> {
		use std::io::Write;

		self.tmp.write_all(data)
			.map_err(|_| RipDvdError::Write(self.dst.to_string_lossy().into_owned()))
	}

	/// # Finish It Off!
	///
	/// Flush the data (just in case) and move the stage into place,
	/// replacing any previous destination.
	///
	/// ## Errors
	///
	/// Returns an error if the flush or rename fails.
	fn finish(mut self) -> Result<(), RipDvdError> {
		use std::io::Write;

		self.tmp.flush()
			.map_err(|_| RipDvdError::Write(self.dst.to_string_lossy().into_owned()))?;

		self.tmp.persist(&self.dst)
			.map(|_| ())
			.map_err(|_| RipDvdError::Write(self.dst.to_string_lossy().into_owned()))
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[derive(Debug, Clone, Copy, Eq, PartialEq)]
	/// # A Recorded Source Operation.
	enum Op {
		Open,
		Seek(u32, bool),
		Read(u16, bool),
		Close,
	}

	#[derive(Debug)]
	/// # Scripted Sector Source.
	///
	/// Hands back sectors filled with their own number's low byte, keeping a
	/// full trace of everything asked of it. `limit` caps sectors per read
	/// (to exercise short-read looping); `end` pretends the data stops at
	/// the given sector.
	struct MockSource {
		ops: Vec<Op>,
		pos: u32,
		limit: Option<u16>,
		end: Option<u32>,
	}

	impl MockSource {
		const fn new() -> Self {
			Self { ops: Vec::new(), pos: 0, limit: None, end: None }
		}
	}

	impl SectorSource for MockSource {
		fn open(&mut self) -> Result<(), RipDvdError> {
			self.ops.push(Op::Open);
			Ok(())
		}

		fn seek(&mut self, sector: u32, request_key: bool) -> Result<u32, RipDvdError> {
			self.ops.push(Op::Seek(sector, request_key));
			self.pos = sector;
			Ok(sector)
		}

		fn read(&mut self, buf: &mut [u8], sectors: u16, decrypt: bool)
		-> Result<u16, RipDvdError> {
			self.ops.push(Op::Read(sectors, decrypt));

			let mut want = sectors;
			if let Some(limit) = self.limit { want = want.min(limit); }
			if let Some(end) = self.end {
				if end <= self.pos { return Ok(0); }
				want = want.min((end - self.pos) as u16);
			}

			for s in 0..want {
				let from = usize::from(s) * usize::from(SECTOR_SIZE);
				let to = from + usize::from(SECTOR_SIZE);
				buf[from..to].fill((self.pos + u32::from(s)) as u8);
			}
			self.pos += u32::from(want);
			Ok(want)
		}

		fn supports_decryption(&self) -> bool { true }

		fn close(&mut self) { self.ops.push(Op::Close); }
	}

	/// # Run a Rip Against a Mock.
	///
	/// The tempdir rides along in the return value so the output survives
	/// long enough to inspect.
	fn run(
		src: &mut MockSource,
		playlist: &[SectorRange],
		decrypt: bool,
		kill_after: Option<usize>,
	) -> (tempfile::TempDir, PathBuf, Result<PathBuf, RipDvdError>, Vec<Progress>) {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let dst = dir.path().join("out.mpg");
		let killed = KillSwitch::default();

		let mut events: Vec<Progress> = Vec::new();
		let res = rip_playlist(
			src,
			playlist,
			&dst,
			decrypt,
			|p| {
				events.push(p);
				if kill_after.is_some_and(|n| n <= events.len()) { killed.kill(); }
			},
			&killed,
		);

		(dir, dst, res, events)
	}

	#[test]
	fn t_rip_single_cell() {
		// One 4096-sector cell, no decryption: 8,388,608 bytes.
		let mut src = MockSource::new();
		let (_dir, dst, res, events) = run(
			&mut src,
			&[SectorRange { start: 0, last: 4095 }],
			false,
			None,
		);

		assert_eq!(res, Ok(dst.clone()));
		let raw = std::fs::read(&dst).expect("Missing rip output.");
		assert_eq!(raw.len(), 8_388_608);
		assert_eq!(raw.len() % usize::from(SECTOR_SIZE), 0);

		// Sector content should line up with sector numbers.
		assert!(raw[..2048].iter().all(|&b| b == 0));
		assert!(raw[2048 * 100..2048 * 101].iter().all(|&b| b == 100));

		// Progress never regresses, and lands exactly on the total.
		assert!(! events.is_empty());
		assert!(events.windows(2).all(|w| w[0].bytes_written() <= w[1].bytes_written()));
		assert!(events.iter().all(|p| p.bytes_written() <= p.bytes_total()));
		let last = events[events.len() - 1];
		assert_eq!(last.bytes_written(), 8_388_608);
		assert!(last.done());

		// And the source was seeked once, without a key request.
		assert_eq!(src.ops[..2], [Op::Open, Op::Seek(0, false)]);
		assert_eq!(src.ops[src.ops.len() - 1], Op::Close);
	}

	#[test]
	fn t_rip_key_ordering() {
		// Three cells, decryption on: every cell must open with its own
		// key-request seek before any decrypted read touches it.
		let mut src = MockSource::new();
		let playlist = [
			SectorRange { start: 0, last: 99 },
			SectorRange { start: 1000, last: 1099 },
			SectorRange { start: 2000, last: 2099 },
		];
		let (_dir, dst, res, _) = run(&mut src, &playlist, true, None);

		assert_eq!(res, Ok(dst));
		assert_eq!(
			src.ops,
			vec![
				Op::Open,
				Op::Seek(0, true), Op::Read(64, true), Op::Read(36, true),
				Op::Seek(1000, true), Op::Read(64, true), Op::Read(36, true),
				Op::Seek(2000, true), Op::Read(64, true), Op::Read(36, true),
				Op::Close,
			],
		);
	}

	#[test]
	fn t_rip_short_reads() {
		// A source that dribbles ten sectors at a time still adds up.
		let mut src = MockSource::new();
		src.limit = Some(10);
		let (_dir, dst, res, events) = run(
			&mut src,
			&[SectorRange { start: 0, last: 149 }],
			false,
			None,
		);

		assert_eq!(res, Ok(dst.clone()));
		let raw = std::fs::read(&dst).expect("Missing rip output.");
		assert_eq!(raw.len(), 150 * usize::from(SECTOR_SIZE));
		assert_eq!(events.len(), 15);
		assert!(events[events.len() - 1].done());
	}

	#[test]
	fn t_rip_cancelled() {
		// Kill after the second batch: a distinguished error, and no
		// destination file left behind.
		let mut src = MockSource::new();
		let playlist = [
			SectorRange { start: 0, last: 99 },
			SectorRange { start: 1000, last: 1099 },
			SectorRange { start: 2000, last: 2099 },
		];
		let (_dir, dst, res, events) = run(&mut src, &playlist, false, Some(2));

		assert_eq!(res, Err(RipDvdError::Killed));
		assert!(! dst.exists(), "Cancellation left the destination behind!");
		assert!((2..=3).contains(&events.len()));

		// The source still got closed.
		assert_eq!(src.ops[src.ops.len() - 1], Op::Close);
	}

	#[test]
	fn t_rip_premature_end() {
		// Data running out mid-cell is a hard error, not a soft stop.
		let mut src = MockSource::new();
		src.end = Some(80);
		let (_dir, dst, res, _) = run(
			&mut src,
			&[SectorRange { start: 0, last: 99 }],
			false,
			None,
		);

		assert_eq!(res, Err(RipDvdError::SectorRead(80)));
		assert!(! dst.exists(), "A failed rip left the destination behind!");
	}
}
