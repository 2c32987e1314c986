/*!
# Rip DVD: IFO Byte Primitives
*/

use crate::RipDvdError;



/// # Byte At.
///
/// Return the byte at `off`.
///
/// ## Errors
///
/// Returns [`RipDvdError::Truncated`] if the offset is out of bounds.
pub(crate) fn byte(buf: &[u8], off: usize) -> Result<u8, RipDvdError> {
	buf.get(off).copied().ok_or(RipDvdError::Truncated)
}

/// # Big-Endian u16.
///
/// Decode the two bytes starting at `off`.
///
/// ## Errors
///
/// Returns [`RipDvdError::Truncated`] if the range is out of bounds.
pub(crate) fn u16_be(buf: &[u8], off: usize) -> Result<u16, RipDvdError> {
	buf.get(off..off + 2)
		.and_then(|b| b.try_into().ok())
		.map(u16::from_be_bytes)
		.ok_or(RipDvdError::Truncated)
}

/// # Big-Endian u32.
///
/// Decode the four bytes starting at `off`.
///
/// ## Errors
///
/// Returns [`RipDvdError::Truncated`] if the range is out of bounds.
pub(crate) fn u32_be(buf: &[u8], off: usize) -> Result<u32, RipDvdError> {
	buf.get(off..off + 4)
		.and_then(|b| b.try_into().ok())
		.map(u32::from_be_bytes)
		.ok_or(RipDvdError::Truncated)
}

/// # BCD Byte.
///
/// Two packed decimal digits. Hardware doesn't validate the digit range and
/// neither do we.
pub(crate) const fn bcd_byte(b: u8) -> u8 { ((b >> 4) & 0xF) * 10 + (b & 0xF) }

#[allow(clippy::integer_division)] // Whole milliseconds are the contract.
/// # BCD Duration.
///
/// Decode the four-byte `HH MM SS FF` playback time used throughout the PGC
/// tables into whole milliseconds. The frame byte carries the frame count in
/// its (BCD) low six bits and a rate indicator in the top two: `0b11` is
/// 30fps NTSC; everything else — including the reserved values — plays back
/// at 25fps.
///
/// ## Errors
///
/// Returns [`RipDvdError::Truncated`] if the range is out of bounds.
pub(crate) fn bcd_duration(buf: &[u8], off: usize) -> Result<u64, RipDvdError> {
	let raw = buf.get(off..off + 4).ok_or(RipDvdError::Truncated)?;
	let hours = u64::from(bcd_byte(raw[0]));
	let minutes = u64::from(bcd_byte(raw[1]));
	let seconds = u64::from(bcd_byte(raw[2]));

	let fps: u64 = if raw[3] >> 6 == 0b11 { 30 } else { 25 };
	let frames = u64::from(bcd_byte(raw[3] & 0b0011_1111));

	Ok(
		(hours * 3_600 + minutes * 60 + seconds) * 1_000 +
		frames * 1_000 / fps
	)
}

/// # Sector Pointer.
///
/// The top-level IFO tables are located by u32 *sector* numbers; this reads
/// one and scales it to a byte offset within the same file.
///
/// ## Errors
///
/// Returns [`RipDvdError::Truncated`] if the pointer itself is out of
/// bounds.
pub(crate) fn sector_ptr(buf: &[u8], off: usize) -> Result<usize, RipDvdError> {
	u32_be(buf, off).map(|v| v as usize * usize::from(crate::SECTOR_SIZE))
}

/// # Fixed-Length ASCII Tag.
///
/// Read `len` bytes starting at `off` as ASCII. Non-ASCII content comes back
/// as an empty string so equality checks against known tags simply fail.
///
/// ## Errors
///
/// Returns [`RipDvdError::Truncated`] if the range is out of bounds.
pub(crate) fn ascii(buf: &[u8], off: usize, len: usize) -> Result<&str, RipDvdError> {
	let raw = buf.get(off..off + len).ok_or(RipDvdError::Truncated)?;
	if raw.is_ascii() {
		Ok(std::str::from_utf8(raw).unwrap_or_default())
	}
	else { Ok("") }
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_ints() {
		let buf: [u8; 6] = [0x00, 0x01, 0x02, 0x03, 0x04, 0x05];

		assert_eq!(u16_be(&buf, 0), Ok(0x0001));
		assert_eq!(u16_be(&buf, 3), Ok(0x0304));
		assert_eq!(u16_be(&buf, 5), Err(RipDvdError::Truncated));

		assert_eq!(u32_be(&buf, 1), Ok(0x0102_0304));
		assert_eq!(u32_be(&buf, 3), Err(RipDvdError::Truncated));

		assert_eq!(byte(&buf, 5), Ok(0x05));
		assert_eq!(byte(&buf, 6), Err(RipDvdError::Truncated));
	}

	#[test]
	fn t_bcd_byte() {
		// Encode-then-decode should round-trip the whole two-digit range.
		for n in 0..=99_u8 {
			let enc = ((n / 10) << 4) | (n % 10);
			assert_eq!(bcd_byte(enc), n, "BCD round-trip failed for {n}.");
		}
	}

	#[test]
	fn t_bcd_duration() {
		// 01:30:25 + 12 frames, NTSC (0b11 rate bits): 12/30s is 400ms.
		let ntsc = [0x01, 0x30, 0x25, 0b1100_0000 | 0x12];
		assert_eq!(bcd_duration(&ntsc, 0), Ok(5_425_400));

		// Same but PAL (0b10): 12/25s is 480ms.
		let pal = [0x01, 0x30, 0x25, 0b1000_0000 | 0x12];
		assert_eq!(bcd_duration(&pal, 0), Ok(5_425_480));

		// Reserved rate bits fall back to PAL.
		let reserved = [0x01, 0x30, 0x25, 0x12];
		assert_eq!(bcd_duration(&reserved, 0), Ok(5_425_480));

		// Out of range.
		assert_eq!(bcd_duration(&ntsc, 1), Err(RipDvdError::Truncated));
	}

	#[test]
	fn t_ascii() {
		let buf = b"DVDVIDEO-VMG\xFF";

		assert_eq!(ascii(buf, 0, 12), Ok("DVDVIDEO-VMG"));
		assert_eq!(ascii(buf, 9, 3), Ok("VMG"));
		assert_eq!(ascii(buf, 0, 13), Ok(""));
		assert_eq!(ascii(buf, 10, 4), Err(RipDvdError::Truncated));
	}
}
