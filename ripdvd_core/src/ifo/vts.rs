/*!
# Rip DVD: VTS Decoding

Each `VTS_nn_0.IFO` describes one Video Title Set: the audio/subtitle
attribute tables, the program chains (PGC) that script playback, and the
cell address table (C_ADT) that pins cells to sector ranges. Joining the
selected PGC's cell playback list against C_ADT is what turns "title 3,
chapters 2-4" into something a sector source can actually read.
*/

use crate::{
	ifo::reader,
	title::{
		AudioCoding,
		AudioStream,
		CellRef,
		Chapter,
		SubtitleStream,
	},
	RipDvdError,
	VTS_MAGIC,
};
use fyi_msg::Msg;



/// # Audio Stream Count.
const AUDIO_COUNT: usize = 0x200;

/// # Audio Attribute Table.
const AUDIO_TABLE: usize = 0x202;

/// # Audio Attribute Entry Size.
const AUDIO_ENTRY: usize = 8;

/// # Maximum Audio Streams.
const AUDIO_MAX: u16 = 8;

/// # Subtitle Stream Count.
const SUB_COUNT: usize = 0x254;

/// # Subtitle Attribute Table.
const SUB_TABLE: usize = 0x256;

/// # Subtitle Attribute Entry Size.
const SUB_ENTRY: usize = 6;

/// # Maximum Subtitle Streams.
const SUB_MAX: u16 = 32;

/// # VTS_PGCI Sector Pointer.
const PGCI_PTR: usize = 0xCC;

/// # C_ADT Sector Pointer.
const C_ADT_PTR: usize = 0xE0;

/// # C_ADT Header Size.
const C_ADT_HEADER: usize = 8;

/// # C_ADT Entry Size.
const C_ADT_ENTRY: usize = 12;

/// # Cell Playback Entry Size.
const CELL_PLAYBACK_ENTRY: usize = 24;

/// # Program Map Offset (Relative to the PGC).
const PGC_PROGRAM_MAP: usize = 0xE6;

/// # Cell Playback Offset (Relative to the PGC).
const PGC_CELL_PLAYBACK: usize = 0xE8;



#[derive(Debug, Clone, PartialEq)]
/// # Parsed Title-Set Data.
///
/// Everything a [`crate::Title`] needs from its `VTS_nn_0.IFO`.
pub(crate) struct VtsTitle {
	/// # PGC Playback Duration (ms).
	pub(crate) duration_ms: u64,

	/// # Audio Streams.
	pub(crate) audio: Vec<AudioStream>,

	/// # Subtitle Streams.
	pub(crate) subtitles: Vec<SubtitleStream>,

	/// # Chapters.
	pub(crate) chapters: Vec<Chapter>,

	/// # Cells, in Playback Order.
	pub(crate) cells: Vec<CellRef>,
}

#[derive(Debug, Clone, Copy)]
/// # A PGC Cell Playback Entry.
struct PgcCell {
	duration_ms: u64,
	start_sector: u32,
	last_sector: u32,
}

#[derive(Debug, Clone, Copy)]
/// # A Cell Address Table Entry.
struct AdtCell {
	vob_id: u16,
	cell_id: u8,
	angle: u8,
	start_sector: u32,
	last_sector: u32,
}



/// # Parse a `VTS_nn_0.IFO`.
///
/// Decode the stream attribute tables, the PGC selected by `title_in_vts`,
/// and the cell address table, joining the latter two into the title's
/// playback cells and chapters.
///
/// ## Errors
///
/// Returns an error if the image is truncated, mislabeled, or internally
/// inconsistent.
pub(crate) fn parse_vts(buf: &[u8], file: &str, title_in_vts: u8)
-> Result<VtsTitle, RipDvdError> {
	if reader::ascii(buf, 0, 12)? != VTS_MAGIC {
		return Err(RipDvdError::CorruptIfo(file.to_owned(), "bad magic"));
	}

	let audio = parse_audio(buf)?;
	let subtitles = parse_subtitles(buf)?;

	let pgc = locate_pgc(buf, file, title_in_vts)?;
	let program_count = usize::from(reader::byte(buf, pgc + 2)?);
	let cell_count = usize::from(reader::byte(buf, pgc + 3)?);
	let duration_ms = reader::bcd_duration(buf, pgc + 4)?;
	if program_count == 0 || cell_count == 0 || cell_count < program_count {
		return Err(RipDvdError::CorruptIfo(file.to_owned(), "impossible program chain counts"));
	}

	let program_map = parse_program_map(buf, file, pgc, program_count, cell_count)?;
	let pgc_cells = parse_cell_playback(buf, file, pgc, cell_count)?;
	let adt = parse_cell_addresses(buf, file)?;

	let cells = join_cells(file, &pgc_cells, &adt);
	let chapters = build_chapters(&program_map, &cells);

	Ok(VtsTitle { duration_ms, audio, subtitles, chapters, cells })
}



/// # Parse the Audio Attribute Table.
fn parse_audio(buf: &[u8]) -> Result<Vec<AudioStream>, RipDvdError> {
	let count = reader::u16_be(buf, AUDIO_COUNT)?.min(AUDIO_MAX);
	let mut out = Vec::with_capacity(usize::from(count));
	for i in 0..usize::from(count) {
		let base = AUDIO_TABLE + AUDIO_ENTRY * i;
		let b0 = reader::byte(buf, base)?;
		let b1 = reader::byte(buf, base + 1)?;

		out.push(AudioStream {
			index: i as u8,
			language: stream_language(buf, base + 2)?,
			coding: AudioCoding::from_bits((b0 >> 5) & 0b0111),
			channels: (b1 & 0b0111) + 1,
			sample_rate:
				if (b1 >> 4) & 0b0011 == 0 { 48_000 }
				else { 96_000 },
		});
	}

	Ok(out)
}

/// # Parse the Subtitle Attribute Table.
fn parse_subtitles(buf: &[u8]) -> Result<Vec<SubtitleStream>, RipDvdError> {
	let count = reader::u16_be(buf, SUB_COUNT)?.min(SUB_MAX);
	let mut out = Vec::with_capacity(usize::from(count));
	for i in 0..usize::from(count) {
		let base = SUB_TABLE + SUB_ENTRY * i;
		out.push(SubtitleStream {
			index: i as u8,
			language: stream_language(buf, base + 2)?,
		});
	}

	Ok(out)
}

/// # Stream Language Code.
///
/// Two ASCII letters make an ISO-639 code; a zeroed or garbage field means
/// the authoring left it undetermined.
fn stream_language(buf: &[u8], off: usize) -> Result<String, RipDvdError> {
	let a = reader::byte(buf, off)?;
	let b = reader::byte(buf, off + 1)?;
	if a.is_ascii_alphabetic() && b.is_ascii_alphabetic() {
		Ok(String::from_utf8_lossy(&[a.to_ascii_lowercase(), b.to_ascii_lowercase()]).into_owned())
	}
	else { Ok("und".to_owned()) }
}

/// # Locate the Title's PGC.
///
/// Follow the VTS_PGCI pointer, pick the search entry for `title_in_vts`
/// (clamped to the table, as players do), and resolve the PGC's byte offset.
fn locate_pgc(buf: &[u8], file: &str, title_in_vts: u8) -> Result<usize, RipDvdError> {
	let pgci = reader::sector_ptr(buf, PGCI_PTR)?;
	let pgc_count = reader::u16_be(buf, pgci)?;
	if pgc_count == 0 {
		return Err(RipDvdError::CorruptIfo(file.to_owned(), "empty program chain table"));
	}

	let index = usize::from(title_in_vts).clamp(1, usize::from(pgc_count)) - 1;
	let offset = reader::u32_be(buf, pgci + 8 + 8 * index + 4)? as usize;
	if offset == 0 || buf.len() <= pgci + offset {
		return Err(RipDvdError::CorruptIfo(file.to_owned(), "impossible program chain offset"));
	}

	Ok(pgci + offset)
}

/// # Parse the Program Map.
///
/// One byte per program: the 1-based number of its first cell. The map must
/// start at cell one and climb strictly so chapters partition the cell list.
fn parse_program_map(
	buf: &[u8],
	file: &str,
	pgc: usize,
	program_count: usize,
	cell_count: usize,
) -> Result<Vec<u16>, RipDvdError> {
	let off = pgc + usize::from(reader::u16_be(buf, pgc + PGC_PROGRAM_MAP)?);
	let raw = buf.get(off..off + program_count).ok_or(RipDvdError::Truncated)?;

	let map: Vec<u16> = raw.iter().copied().map(u16::from).collect();
	let ordered = map.windows(2).all(|w| w[0] < w[1]);
	if map[0] != 1 || ! ordered || usize::from(map[program_count - 1]) > cell_count {
		return Err(RipDvdError::CorruptIfo(file.to_owned(), "bad program map"));
	}

	Ok(map)
}

/// # Parse the Cell Playback Table.
fn parse_cell_playback(buf: &[u8], file: &str, pgc: usize, cell_count: usize)
-> Result<Vec<PgcCell>, RipDvdError> {
	let off = pgc + usize::from(reader::u16_be(buf, pgc + PGC_CELL_PLAYBACK)?);
	let mut out = Vec::with_capacity(cell_count);
	for i in 0..cell_count {
		let base = off + CELL_PLAYBACK_ENTRY * i;

		// Byte zero is the cell type; playback doesn't need it.
		let duration_ms = reader::bcd_duration(buf, base + 4)?;
		let start_sector = reader::u32_be(buf, base + 8)?;
		let last_sector = reader::u32_be(buf, base + 20)?;
		if last_sector < start_sector {
			return Err(RipDvdError::CorruptIfo(file.to_owned(), "inverted cell sectors"));
		}

		out.push(PgcCell { duration_ms, start_sector, last_sector });
	}

	Ok(out)
}

/// # Parse the Cell Address Table.
fn parse_cell_addresses(buf: &[u8], file: &str) -> Result<Vec<AdtCell>, RipDvdError> {
	let cadt = reader::sector_ptr(buf, C_ADT_PTR)?;

	// The header names its own final byte; the entry count follows from that.
	let last_byte = reader::u32_be(buf, cadt + 4)? as usize;
	if last_byte + 1 < C_ADT_HEADER {
		return Err(RipDvdError::CorruptIfo(file.to_owned(), "impossible cell address table length"));
	}
	let count = (last_byte + 1 - C_ADT_HEADER).wrapping_div(C_ADT_ENTRY);

	let mut out = Vec::with_capacity(count);
	for i in 0..count {
		let base = cadt + C_ADT_HEADER + C_ADT_ENTRY * i;
		out.push(AdtCell {
			vob_id: reader::u16_be(buf, base)?,
			cell_id: reader::byte(buf, base + 2)?,
			angle: reader::byte(buf, base + 3)?,
			start_sector: reader::u32_be(buf, base + 4)?,
			last_sector: reader::u32_be(buf, base + 8)?,
		});
	}

	Ok(out)
}

/// # Join PGC Cells With C_ADT.
///
/// Prefer an exact sector-range match, then an entry fully containing the
/// PGC range. When a disc's tables are too mangled for either, synthesize an
/// identity so the title stays playable; the sectors themselves always come
/// from the PGC.
fn join_cells(file: &str, pgc_cells: &[PgcCell], adt: &[AdtCell]) -> Vec<CellRef> {
	let mut out = Vec::with_capacity(pgc_cells.len());
	for (i, cell) in pgc_cells.iter().enumerate() {
		let hit = adt.iter()
			.find(|a|
				a.start_sector == cell.start_sector &&
				a.last_sector == cell.last_sector
			)
			.or_else(|| adt.iter().find(|a|
				a.start_sector <= cell.start_sector &&
				cell.last_sector <= a.last_sector
			));

		match hit {
			Some(a) => out.push(CellRef {
				vob_id: a.vob_id,
				cell_id: a.cell_id,
				angle: a.angle,
				start_sector: cell.start_sector,
				last_sector: cell.last_sector,
				duration_ms: cell.duration_ms,
			}),
			None => {
				Msg::warning(format!(
					"{file}: cell #{} has no address-table entry; synthesizing one.",
					i + 1,
				)).eprint();
				out.push(CellRef {
					vob_id: 1,
					cell_id: i as u8 + 1,
					angle: 0,
					start_sector: cell.start_sector,
					last_sector: cell.last_sector,
					duration_ms: cell.duration_ms,
				});
			},
		}
	}

	out
}

/// # Build the Chapters.
///
/// Walk the program map: chapter `k` runs from its own first cell up to (but
/// not including) the next chapter's, with the final chapter running out the
/// cell list. Durations are cell-duration sums; start offsets a running
/// prefix.
fn build_chapters(program_map: &[u16], cells: &[CellRef]) -> Vec<Chapter> {
	let cell_count = cells.len() as u16;
	let mut out = Vec::with_capacity(program_map.len());
	let mut start_ms: u64 = 0;

	for (k, &first_cell) in program_map.iter().enumerate() {
		let last_cell = program_map.get(k + 1).map_or(cell_count, |&n| n - 1);
		let duration_ms: u64 = cells[usize::from(first_cell) - 1..usize::from(last_cell)]
			.iter()
			.map(CellRef::duration_ms)
			.sum();

		out.push(Chapter {
			number: k as u16 + 1,
			first_cell,
			last_cell,
			duration_ms,
			start_ms,
		});
		start_ms += duration_ms;
	}

	out
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::SECTOR_SIZE;

	/// # Test File Label.
	const FILE: &str = "VTS_01_0.IFO";

	/// # Write a Big-Endian u16.
	fn put16(buf: &mut [u8], off: usize, v: u16) {
		buf[off..off + 2].copy_from_slice(&v.to_be_bytes());
	}

	/// # Write a Big-Endian u32.
	fn put32(buf: &mut [u8], off: usize, v: u32) {
		buf[off..off + 4].copy_from_slice(&v.to_be_bytes());
	}

	/// # Synthetic VTS Image.
	///
	/// Two audio streams, one subtitle stream, and a single PGC holding three
	/// programs of one 1000-sector, one-minute cell apiece. The PGCI sits at
	/// sector two, C_ADT at sector four.
	fn vts_image() -> Vec<u8> {
		let mut buf = vec![0_u8; usize::from(SECTOR_SIZE) * 5];
		buf[..12].copy_from_slice(VTS_MAGIC.as_bytes());

		// Audio: AC-3 5.1 English at 48kHz, then LPCM stereo at 96kHz with a
		// zeroed language field.
		put16(&mut buf, AUDIO_COUNT, 2);
		let a0 = AUDIO_TABLE;
		buf[a0] = 0 << 5;
		buf[a0 + 1] = 5; // Six channels, rate bits zero.
		buf[a0 + 2] = b'e';
		buf[a0 + 3] = b'n';
		let a1 = AUDIO_TABLE + AUDIO_ENTRY;
		buf[a1] = 4 << 5;
		buf[a1 + 1] = 0b0001_0001; // Two channels, rate bits one.

		// Subtitles: French.
		put16(&mut buf, SUB_COUNT, 1);
		buf[SUB_TABLE + 2] = b'f';
		buf[SUB_TABLE + 3] = b'r';

		// PGCI at sector two, one PGC at +0x10.
		put32(&mut buf, PGCI_PTR, 2);
		let pgci = usize::from(SECTOR_SIZE) * 2;
		put16(&mut buf, pgci, 1);
		put32(&mut buf, pgci + 8 + 4, 0x10);

		// The PGC itself: three programs over three cells, 00:03:00 PAL.
		let pgc = pgci + 0x10;
		buf[pgc + 2] = 3;
		buf[pgc + 3] = 3;
		buf[pgc + 4..pgc + 8].copy_from_slice(&[0x00, 0x03, 0x00, 0x80]);
		put16(&mut buf, pgc + PGC_PROGRAM_MAP, 0x100);
		put16(&mut buf, pgc + PGC_CELL_PLAYBACK, 0x110);

		// Program map: cells 1, 2, 3.
		buf[pgc + 0x100] = 1;
		buf[pgc + 0x101] = 2;
		buf[pgc + 0x102] = 3;

		// Cell playback: one minute and 1000 sectors each.
		for i in 0..3 {
			let base = pgc + 0x110 + CELL_PLAYBACK_ENTRY * i;
			buf[base + 4..base + 8].copy_from_slice(&[0x00, 0x01, 0x00, 0x80]);
			put32(&mut buf, base + 8, i as u32 * 1000);
			put32(&mut buf, base + 20, i as u32 * 1000 + 999);
		}

		// C_ADT at sector four: three matching entries, VOB #1.
		put32(&mut buf, C_ADT_PTR, 4);
		let cadt = usize::from(SECTOR_SIZE) * 4;
		put32(&mut buf, cadt + 4, (C_ADT_HEADER + C_ADT_ENTRY * 3 - 1) as u32);
		for i in 0..3 {
			let base = cadt + C_ADT_HEADER + C_ADT_ENTRY * i;
			put16(&mut buf, base, 1);
			buf[base + 2] = i as u8 + 1;
			buf[base + 3] = 0;
			put32(&mut buf, base + 4, i as u32 * 1000);
			put32(&mut buf, base + 8, i as u32 * 1000 + 999);
		}

		buf
	}

	#[test]
	fn t_parse_vts_streams() {
		let vts = parse_vts(&vts_image(), FILE, 1).expect("VTS parse failed.");

		assert_eq!(vts.audio.len(), 2);
		assert_eq!(vts.audio[0].coding, AudioCoding::Ac3);
		assert_eq!(vts.audio[0].channels, 6);
		assert_eq!(vts.audio[0].sample_rate, 48_000);
		assert_eq!(vts.audio[0].language, "en");
		assert_eq!(vts.audio[1].coding, AudioCoding::Lpcm);
		assert_eq!(vts.audio[1].channels, 2);
		assert_eq!(vts.audio[1].sample_rate, 96_000);
		assert_eq!(vts.audio[1].language, "und");

		assert_eq!(vts.subtitles.len(), 1);
		assert_eq!(vts.subtitles[0].language, "fr");
	}

	#[test]
	fn t_parse_vts_cells() {
		let vts = parse_vts(&vts_image(), FILE, 1).expect("VTS parse failed.");

		assert_eq!(vts.duration_ms, 180_000);
		assert_eq!(vts.cells.len(), 3);
		for (i, cell) in vts.cells.iter().enumerate() {
			assert_eq!(cell.vob_id, 1);
			assert_eq!(cell.cell_id, i as u8 + 1);
			assert_eq!(cell.angle, 0);
			assert_eq!(cell.start_sector, i as u32 * 1000);
			assert_eq!(cell.last_sector, i as u32 * 1000 + 999);
			assert_eq!(cell.sector_count(), 1000);
		}
	}

	#[test]
	fn t_parse_vts_chapters() {
		let vts = parse_vts(&vts_image(), FILE, 1).expect("VTS parse failed.");
		assert_eq!(vts.chapters.len(), 3);

		// Chapters must partition the cell list exactly.
		assert_eq!(vts.chapters[0].first_cell, 1);
		for w in vts.chapters.windows(2) {
			assert_eq!(w[1].first_cell, w[0].last_cell + 1);
		}
		assert_eq!(
			vts.chapters[vts.chapters.len() - 1].last_cell,
			vts.cells.len() as u16,
		);

		// And their durations/offsets must tally with the cells.
		let total: u64 = vts.chapters.iter().map(Chapter::duration_ms).sum();
		assert_eq!(total, vts.duration_ms);
		assert_eq!(vts.chapters[1].start_ms, 60_000);
		assert_eq!(vts.chapters[2].start_ms, 120_000);
	}

	#[test]
	fn t_join_containment() {
		// Stretch the second C_ADT entry so it merely contains the PGC range;
		// its identity should still win through.
		let mut buf = vts_image();
		let base = usize::from(SECTOR_SIZE) * 4 + C_ADT_HEADER + C_ADT_ENTRY;
		put32(&mut buf, base + 4, 900);
		put32(&mut buf, base + 8, 2100);

		let vts = parse_vts(&buf, FILE, 1).expect("VTS parse failed.");
		assert_eq!(vts.cells[1].cell_id, 2);

		// The sectors played still come from the PGC.
		assert_eq!(vts.cells[1].start_sector, 1000);
		assert_eq!(vts.cells[1].last_sector, 1999);
	}

	#[test]
	fn t_join_synthesized() {
		// Empty the address table altogether.
		let mut buf = vts_image();
		let cadt = usize::from(SECTOR_SIZE) * 4;
		put32(&mut buf, cadt + 4, (C_ADT_HEADER - 1) as u32);

		let vts = parse_vts(&buf, FILE, 1).expect("VTS parse failed.");
		assert_eq!(vts.cells.len(), 3);
		for (i, cell) in vts.cells.iter().enumerate() {
			assert_eq!(cell.vob_id, 1);
			assert_eq!(cell.cell_id, i as u8 + 1);
			assert_eq!(cell.angle, 0);
			assert_eq!(cell.start_sector, i as u32 * 1000);
		}
	}

	#[test]
	fn t_parse_vts_bad_magic() {
		let mut buf = vts_image();
		buf[..12].copy_from_slice(b"NOTAVALIDHDR");

		assert_eq!(
			parse_vts(&buf, FILE, 1),
			Err(RipDvdError::CorruptIfo(FILE.to_owned(), "bad magic")),
		);
	}

	#[test]
	fn t_parse_vts_bad_map() {
		// A program map that skips cell one is nonsense.
		let mut buf = vts_image();
		let pgc = usize::from(SECTOR_SIZE) * 2 + 0x10;
		buf[pgc + 0x100] = 2;

		assert_eq!(
			parse_vts(&buf, FILE, 1),
			Err(RipDvdError::CorruptIfo(FILE.to_owned(), "bad program map")),
		);
	}
}
