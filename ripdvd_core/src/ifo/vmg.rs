/*!
# Rip DVD: VMG Decoding

`VIDEO_TS.IFO` — the Video Manager — carries one table this program cares
about: TT_SRPT, the global title index mapping each playable title to the
title set (and title-within-set) that actually holds its data.
*/

use crate::{
	ifo::reader,
	RipDvdError,
	VMG_FILE,
	VMG_MAGIC,
};



/// # TT_SRPT Sector Pointer.
const TT_SRPT_PTR: usize = 0xC4;

/// # TT_SRPT Header Size.
const SRPT_HEADER: usize = 8;

/// # TT_SRPT Entry Size.
const SRPT_ENTRY: usize = 12;

/// # Maximum Titles Per Disc.
const MAX_TITLES: u16 = 99;



#[derive(Debug, Clone, Copy, PartialEq)]
/// # Global Title Entry.
///
/// One row of TT_SRPT. This is only a pointer — the real title structure
/// (chapters, cells, streams) lives in the referenced `VTS_nn_0.IFO` and is
/// parsed separately.
pub(crate) struct TitleEntry {
	/// # Title Number (1-based, disc-wide).
	pub(crate) title_number: u16,

	/// # Angle Count.
	pub(crate) angle_count: u8,

	/// # Declared Chapter Count.
	pub(crate) chapter_count: u16,

	/// # Title Set Number.
	pub(crate) vts_number: u8,

	/// # Title Number Within the Set.
	pub(crate) title_in_vts: u8,

	/// # Title Set Entry Sector.
	pub(crate) vts_entry_sector: u32,
}

/// # Parse `VIDEO_TS.IFO`.
///
/// Validate the magic tag and walk TT_SRPT into a list of [`TitleEntry`].
///
/// ## Errors
///
/// Returns an error if the image is truncated, mislabeled, or carries an
/// impossible title count.
pub(crate) fn parse_vmg(buf: &[u8]) -> Result<Vec<TitleEntry>, RipDvdError> {
	if reader::ascii(buf, 0, 12)? != VMG_MAGIC {
		return Err(RipDvdError::CorruptIfo(VMG_FILE.to_owned(), "bad magic"));
	}

	let srpt = reader::sector_ptr(buf, TT_SRPT_PTR)?;
	let title_count = reader::u16_be(buf, srpt)?;
	if title_count == 0 || MAX_TITLES < title_count {
		return Err(RipDvdError::CorruptIfo(VMG_FILE.to_owned(), "impossible title count"));
	}

	// Bytes [2..8) of the header are padding and a table-length field nothing
	// downstream needs; the entries follow directly.
	let mut out = Vec::with_capacity(usize::from(title_count));
	for i in 0..usize::from(title_count) {
		let base = srpt + SRPT_HEADER + SRPT_ENTRY * i;

		// Byte zero holds playback-type bits, also unneeded.
		out.push(TitleEntry {
			title_number: i as u16 + 1,
			angle_count: reader::byte(buf, base + 1)?,
			chapter_count: reader::u16_be(buf, base + 2)?,
			vts_number: reader::byte(buf, base + 6)?,
			title_in_vts: reader::byte(buf, base + 7)?,
			vts_entry_sector: reader::u32_be(buf, base + 8)?,
		});
	}

	Ok(out)
}
