/*!
# Rip DVD: Title Model

Value-typed snapshots of a parsed title: chapters, cells, and stream
metadata, all immutable once the decoder pass has produced them, plus the
resolver that flattens a (chapter range of a) title into the ordered
sector-range playlist the rip engine consumes.
*/

use crate::{
	ifo::vmg::TitleEntry,
	ifo::vts::VtsTitle,
	RipDvdError,
	SECTOR_SIZE,
};



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Audio Coding Format.
pub enum AudioCoding {
	/// # Dolby AC-3.
	Ac3,

	/// # MPEG-1 Layer II.
	Mpeg1,

	/// # MPEG-2 Extended.
	Mpeg2,

	/// # Linear PCM.
	Lpcm,

	/// # DTS.
	Dts,

	/// # Something Else.
	Unknown,
}

impl AudioCoding {
	/// # From Attribute Bits.
	///
	/// The three coding bits of the first audio-attribute byte.
	pub(crate) const fn from_bits(bits: u8) -> Self {
		match bits {
			0 => Self::Ac3,
			2 => Self::Mpeg1,
			3 => Self::Mpeg2,
			4 => Self::Lpcm,
			6 => Self::Dts,
			_ => Self::Unknown,
		}
	}

	#[must_use]
	/// # As Str.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Ac3 => "AC-3",
			Self::Mpeg1 => "MPEG-1",
			Self::Mpeg2 => "MPEG-2",
			Self::Lpcm => "LPCM",
			Self::Dts => "DTS",
			Self::Unknown => "?",
		}
	}
}



#[derive(Debug, Clone, PartialEq)]
/// # Audio Stream (Metadata Only).
pub struct AudioStream {
	pub(crate) index: u8,
	pub(crate) language: String,
	pub(crate) coding: AudioCoding,
	pub(crate) channels: u8,
	pub(crate) sample_rate: u32,
}

impl AudioStream {
	#[must_use]
	/// # Stream Index (0-based).
	pub const fn index(&self) -> u8 { self.index }

	#[must_use]
	/// # ISO-639 Language, or `und`.
	pub fn language(&self) -> &str { &self.language }

	#[must_use]
	/// # Coding Format.
	pub const fn coding(&self) -> AudioCoding { self.coding }

	#[must_use]
	/// # Channel Count (1..=8).
	pub const fn channels(&self) -> u8 { self.channels }

	#[must_use]
	/// # Sample Rate.
	pub const fn sample_rate(&self) -> u32 { self.sample_rate }
}

#[derive(Debug, Clone, PartialEq)]
/// # Subtitle Stream (Metadata Only).
pub struct SubtitleStream {
	pub(crate) index: u8,
	pub(crate) language: String,
}

impl SubtitleStream {
	#[must_use]
	/// # Stream Index (0-based).
	pub const fn index(&self) -> u8 { self.index }

	#[must_use]
	/// # ISO-639 Language, or `und`.
	pub fn language(&self) -> &str { &self.language }
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Chapter.
///
/// A PGC program: a 1-based, inclusive run of cells. Chapters partition a
/// title's cell list without gaps or overlaps.
pub struct Chapter {
	pub(crate) number: u16,
	pub(crate) first_cell: u16,
	pub(crate) last_cell: u16,
	pub(crate) duration_ms: u64,
	pub(crate) start_ms: u64,
}

impl Chapter {
	#[must_use]
	/// # Chapter Number (1-based).
	pub const fn number(&self) -> u16 { self.number }

	#[must_use]
	/// # First Cell (1-based, inclusive).
	pub const fn first_cell(&self) -> u16 { self.first_cell }

	#[must_use]
	/// # Last Cell (1-based, inclusive).
	pub const fn last_cell(&self) -> u16 { self.last_cell }

	#[must_use]
	/// # Duration in Milliseconds.
	pub const fn duration_ms(&self) -> u64 { self.duration_ms }

	#[must_use]
	/// # Offset From the Start of the Title, in Milliseconds.
	pub const fn start_ms(&self) -> u64 { self.start_ms }
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Cell Reference.
///
/// One cell in playback order: the smallest addressable unit of a title,
/// pinned to a contiguous run of logical sectors by the PGC/C_ADT join.
pub struct CellRef {
	pub(crate) vob_id: u16,
	pub(crate) cell_id: u8,
	pub(crate) angle: u8,
	pub(crate) start_sector: u32,
	pub(crate) last_sector: u32,
	pub(crate) duration_ms: u64,
}

impl CellRef {
	#[must_use]
	/// # VOB ID.
	pub const fn vob_id(&self) -> u16 { self.vob_id }

	#[must_use]
	/// # Cell ID.
	pub const fn cell_id(&self) -> u8 { self.cell_id }

	#[must_use]
	/// # Angle (0, or 1..=9).
	pub const fn angle(&self) -> u8 { self.angle }

	#[must_use]
	/// # First Sector.
	pub const fn start_sector(&self) -> u32 { self.start_sector }

	#[must_use]
	/// # Last Sector (Inclusive).
	pub const fn last_sector(&self) -> u32 { self.last_sector }

	#[must_use]
	/// # Sector Count.
	pub const fn sector_count(&self) -> u32 { self.last_sector - self.start_sector + 1 }

	#[must_use]
	/// # Duration in Milliseconds.
	pub const fn duration_ms(&self) -> u64 { self.duration_ms }
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Sector Range.
///
/// An inclusive run of logical sectors, one per playlist cell. Adjacent
/// ranges are deliberately never merged: on an encrypted disc the CSS title
/// key changes at cell boundaries, so every cell must be entered through its
/// own seek.
pub struct SectorRange {
	pub(crate) start: u32,
	pub(crate) last: u32,
}

impl SectorRange {
	#[must_use]
	/// # First Sector.
	pub const fn start(&self) -> u32 { self.start }

	#[must_use]
	/// # Last Sector (Inclusive).
	pub const fn last(&self) -> u32 { self.last }

	#[must_use]
	/// # Sector Count.
	pub const fn sector_count(&self) -> u32 { self.last - self.start + 1 }

	#[must_use]
	/// # Byte Length.
	pub const fn bytes(&self) -> u64 {
		self.sector_count() as u64 * SECTOR_SIZE as u64
	}
}



#[derive(Debug, Clone)]
/// # Title.
///
/// A fully parsed title: the TT_SRPT pointer joined with the chapter, cell,
/// and stream data from its title set.
pub struct Title {
	pub(crate) number: u16,
	pub(crate) vts_number: u8,
	pub(crate) angle_count: u8,
	pub(crate) duration_ms: u64,
	pub(crate) chapters: Vec<Chapter>,
	pub(crate) cells: Vec<CellRef>,
	pub(crate) audio: Vec<AudioStream>,
	pub(crate) subtitles: Vec<SubtitleStream>,
}

impl Title {
	/// # New.
	///
	/// Join a global title entry with its parsed title-set data.
	pub(crate) fn new(entry: &TitleEntry, vts: VtsTitle) -> Self {
		Self {
			number: entry.title_number,
			vts_number: entry.vts_number,
			angle_count: entry.angle_count,
			duration_ms: vts.duration_ms,
			chapters: vts.chapters,
			cells: vts.cells,
			audio: vts.audio,
			subtitles: vts.subtitles,
		}
	}
}

impl Title {
	#[must_use]
	/// # Title Number (1-based, disc-wide).
	pub const fn number(&self) -> u16 { self.number }

	#[must_use]
	/// # Title Set Number.
	pub const fn vts_number(&self) -> u8 { self.vts_number }

	#[must_use]
	/// # Angle Count.
	pub const fn angle_count(&self) -> u8 { self.angle_count }

	#[must_use]
	/// # Duration in Milliseconds.
	pub const fn duration_ms(&self) -> u64 { self.duration_ms }

	#[must_use]
	/// # Chapters.
	pub fn chapters(&self) -> &[Chapter] { &self.chapters }

	#[must_use]
	/// # Cells, in Playback Order.
	pub fn cells(&self) -> &[CellRef] { &self.cells }

	#[must_use]
	/// # Audio Streams.
	pub fn audio(&self) -> &[AudioStream] { &self.audio }

	#[must_use]
	/// # Subtitle Streams.
	pub fn subtitles(&self) -> &[SubtitleStream] { &self.subtitles }

	#[must_use]
	/// # Total Byte Length.
	///
	/// The a-priori size of a whole-title rip.
	pub fn bytes(&self) -> u64 {
		self.cells.iter().map(|c| u64::from(c.sector_count()) * u64::from(SECTOR_SIZE)).sum()
	}
}

impl Title {
	/// # Resolve the Playlist.
	///
	/// Flatten the title — or an inclusive, 1-based chapter range of it —
	/// into the ordered sector ranges to read, one per cell.
	///
	/// ## Errors
	///
	/// Returns an error if the chapter range is inverted, zero-based, or
	/// runs past the last chapter.
	pub fn playlist(&self, chapters: Option<(u16, u16)>) -> Result<Vec<SectorRange>, RipDvdError> {
		let cells = match chapters {
			None => &self.cells[..],
			Some((first, last)) => {
				if first == 0 || last < first || self.chapters.len() < usize::from(last) {
					return Err(RipDvdError::ChapterRange(first, last));
				}

				let a = usize::from(self.chapters[usize::from(first) - 1].first_cell);
				let b = usize::from(self.chapters[usize::from(last) - 1].last_cell);
				&self.cells[a - 1..b]
			},
		};

		Ok(cells.iter()
			.map(|c| SectorRange { start: c.start_sector, last: c.last_sector })
			.collect())
	}
}



#[cfg(test)]
mod test {
	use super::*;

	/// # Five-Chapter Test Title.
	///
	/// One cell per chapter, 1000 sectors each.
	fn test_title() -> Title {
		let chapters: Vec<Chapter> = (0..5_u16)
			.map(|k| Chapter {
				number: k + 1,
				first_cell: k + 1,
				last_cell: k + 1,
				duration_ms: 60_000,
				start_ms: u64::from(k) * 60_000,
			})
			.collect();
		let cells: Vec<CellRef> = (0..5_u32)
			.map(|k| CellRef {
				vob_id: 1,
				cell_id: k as u8 + 1,
				angle: 0,
				start_sector: k * 1000,
				last_sector: k * 1000 + 999,
				duration_ms: 60_000,
			})
			.collect();

		Title {
			number: 1,
			vts_number: 1,
			angle_count: 1,
			duration_ms: 300_000,
			chapters,
			cells,
			audio: Vec::new(),
			subtitles: Vec::new(),
		}
	}

	#[test]
	fn t_playlist_full() {
		let title = test_title();
		let list = title.playlist(None).expect("Full playlist failed.");

		assert_eq!(list.len(), 5);
		assert_eq!(list[0], SectorRange { start: 0, last: 999 });
		assert_eq!(list[4], SectorRange { start: 4000, last: 4999 });

		// One range per cell, adjacent or not.
		assert!(list.windows(2).all(|w| w[0].last + 1 == w[1].start));
	}

	#[test]
	fn t_playlist_range() {
		let title = test_title();
		let list = title.playlist(Some((2, 4))).expect("Chapter playlist failed.");

		assert_eq!(list.len(), 3);
		assert_eq!(list[0], SectorRange { start: 1000, last: 1999 });
		assert_eq!(list[1], SectorRange { start: 2000, last: 2999 });
		assert_eq!(list[2], SectorRange { start: 3000, last: 3999 });

		// A single chapter works too.
		let list = title.playlist(Some((5, 5))).expect("Chapter playlist failed.");
		assert_eq!(list, vec![SectorRange { start: 4000, last: 4999 }]);
	}

	#[test]
	fn t_playlist_bad_range() {
		let title = test_title();

		for rng in [(0, 3), (3, 2), (4, 6), (6, 6)] {
			assert_eq!(
				title.playlist(Some(rng)),
				Err(RipDvdError::ChapterRange(rng.0, rng.1)),
				"Range {rng:?} should have been rejected.",
			);
		}
	}

	#[test]
	fn t_title_bytes() {
		let title = test_title();
		assert_eq!(title.bytes(), 5000 * 2048);
		assert_eq!(
			title.playlist(None)
				.expect("Full playlist failed.")
				.iter()
				.map(SectorRange::bytes)
				.sum::<u64>(),
			title.bytes(),
		);
	}
}
