/*!
# Rip DVD: File-Backed Sector Source

On an unencrypted disc the `VTS_nn_m.VOB` files concatenate, in lexical
order, into exactly the logical-sector space C_ADT counts in, so sector N
of the title set is just byte `N × 2048` of that concatenation. This source
maps logical sectors onto (file, offset) pairs across the roughly-1GiB
segments, keeping at most one file handle open at a time.
*/

use crate::{
	RipDvdError,
	SECTOR_SIZE,
	SectorSource,
};
use std::{
	fs::File,
	io::{
		Read,
		Seek,
		SeekFrom,
	},
	path::{
		Path,
		PathBuf,
	},
};



#[derive(Debug)]
/// # One VOB Segment.
struct VobFile {
	path: PathBuf,
	first_sector: u32,
	sectors: u32,
}

#[derive(Debug)]
/// # File-Backed Sector Source.
///
/// Bound to a `VIDEO_TS` directory and title set at construction; never a
/// device. This variant cannot decrypt, and says so.
pub(crate) struct VobSource {
	files: Vec<VobFile>,
	pos: u32,
	handle: Option<(usize, File)>,
}

impl VobSource {
	/// # New.
	///
	/// Enumerate the title set's movie VOBs — `VTS_nn_1.VOB` onward, the
	/// `_0` menu VOB excluded, case-insensitively — and lay them end to end
	/// into one contiguous sector table.
	///
	/// ## Errors
	///
	/// Returns an error if the directory is unreadable or holds no movie
	/// VOBs for the title set.
	pub(crate) fn new(video_ts: &Path, vts: u8) -> Result<Self, RipDvdError> {
		let prefix = format!("VTS_{vts:02}_");
		let mut found: Vec<(String, PathBuf, u64)> = Vec::new();

		let rd = std::fs::read_dir(video_ts)
			.map_err(|_| RipDvdError::MissingFile(video_ts.to_string_lossy().into_owned()))?;
		for e in rd.flatten() {
			let path = e.path();
			let Some(name) = path.file_name().and_then(|n| n.to_str()) else { continue; };
			let name = name.to_ascii_uppercase();

			// VTS_nn_m.VOB with m in 1..=9.
			if
				name.len() == 12 &&
				name.starts_with(&prefix) &&
				name.ends_with(".VOB") &&
				name.as_bytes()[7].is_ascii_digit() &&
				name.as_bytes()[7] != b'0'
			{
				let Ok(meta) = e.metadata() else { continue; };
				found.push((name, path, meta.len()));
			}
		}

		if found.is_empty() {
			return Err(RipDvdError::MissingFile(
				video_ts.join(format!("{prefix}1.VOB")).to_string_lossy().into_owned()
			));
		}

		// Lexical order is playback order.
		found.sort_unstable_by(|a, b| a.0.cmp(&b.0));

		let mut files = Vec::with_capacity(found.len());
		let mut first_sector: u32 = 0;
		for (_, path, len) in found {
			let sectors = (len.wrapping_div(u64::from(SECTOR_SIZE))) as u32;
			files.push(VobFile { path, first_sector, sectors });
			first_sector += sectors;
		}

		Ok(Self {
			files,
			pos: 0,
			handle: None,
		})
	}

	/// # Which File Holds This Sector?
	fn file_at(&self, sector: u32) -> Option<usize> {
		self.files.iter().position(|f|
			f.first_sector <= sector &&
			sector < f.first_sector + f.sectors
		)
	}
}

impl SectorSource for VobSource {
	fn open(&mut self) -> Result<(), RipDvdError> { Ok(()) }

	fn seek(&mut self, sector: u32, _request_key: bool) -> Result<u32, RipDvdError> {
		self.pos = sector;
		Ok(sector)
	}

	fn read(&mut self, buf: &mut [u8], sectors: u16, decrypt: bool) -> Result<u16, RipDvdError> {
		if decrypt { return Err(RipDvdError::CapabilityViolation); }

		let mut done: u16 = 0;
		while done < sectors {
			// Ran off the end of the last segment?
			let Some(idx) = self.file_at(self.pos) else { break; };

			// Swap handles when crossing into a different segment.
			if self.handle.as_ref().map_or(true, |(i, _)| *i != idx) {
				let f = File::open(&self.files[idx].path)
					.map_err(|_| RipDvdError::MissingFile(
						self.files[idx].path.to_string_lossy().into_owned()
					))?;
				self.handle.replace((idx, f));
			}

			let file = &self.files[idx];
			let in_file = self.pos - file.first_sector;
			let want = u32::from(sectors - done)
				.min(file.sectors - in_file) as u16;

			let from = usize::from(done) * usize::from(SECTOR_SIZE);
			let to = from + usize::from(want) * usize::from(SECTOR_SIZE);

			if let Some((_, handle)) = self.handle.as_mut() {
				handle.seek(SeekFrom::Start(u64::from(in_file) * u64::from(SECTOR_SIZE)))
					.and_then(|_| handle.read_exact(&mut buf[from..to]))
					.map_err(|_| RipDvdError::SectorRead(self.pos))?;
			}

			done += want;
			self.pos += u32::from(want);
		}

		Ok(done)
	}

	fn supports_decryption(&self) -> bool { false }

	fn close(&mut self) { self.handle = None; }
}
