/*!
# Rip DVD: Sector Sources

A sector source is the small capability the rip engine drives: position a
cursor on a logical sector (optionally negotiating the CSS title key for
the cell starting there) and read whole sectors forward. There are exactly
two of them — [`CssSource`] wraps a raw device behind libdvdcss, while
[`VobSource`] addresses the segmented `VTS_nn_m.VOB` files directly — and
the engine picks one at construction, never both.
*/

pub(crate) mod css;
pub(crate) mod vob;

pub(crate) use css::CssSource;
pub(crate) use vob::VobSource;

use crate::RipDvdError;



/// # Sector Source.
///
/// Sector counts per call are small (the engine batches 64 at a time) and
/// short reads are fine; the engine loops. A `read` with `decrypt` only
/// makes sense after a key-request `seek` covering the same cell, and only
/// against a source that says it supports decryption.
pub(crate) trait SectorSource {
	/// # Open.
	///
	/// Acquire whatever handle the source needs. Calling this on an
	/// already-open source is a no-op.
	///
	/// ## Errors
	///
	/// Returns an error if the underlying device, library, or file set is
	/// unavailable.
	fn open(&mut self) -> Result<(), RipDvdError>;

	/// # Seek.
	///
	/// Position the cursor at a logical sector. With `request_key`, a
	/// decrypting source must negotiate the title key for the cell starting
	/// there before the next read.
	///
	/// ## Errors
	///
	/// Returns an error if positioning (or key negotiation) fails.
	fn seek(&mut self, sector: u32, request_key: bool) -> Result<u32, RipDvdError>;

	/// # Read.
	///
	/// Fill `buf` with up to `sectors` whole sectors from the cursor,
	/// advancing it. Returns the number of sectors actually read; zero means
	/// the source ran out of data.
	///
	/// ## Errors
	///
	/// Returns an error on read failure, or if `decrypt` is requested from a
	/// source that cannot oblige.
	fn read(&mut self, buf: &mut [u8], sectors: u16, decrypt: bool) -> Result<u16, RipDvdError>;

	/// # Can This Source Decrypt?
	fn supports_decryption(&self) -> bool;

	/// # Close.
	///
	/// Release the handle(s). The source may be re-opened afterward.
	fn close(&mut self);
}
