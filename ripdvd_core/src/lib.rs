/*!
# Rip DVD: Library
*/

#![deny(unsafe_code)]

#![warn(
	clippy::filetype_is_file,
	clippy::integer_division,
	clippy::needless_borrow,
	clippy::nursery,
	clippy::pedantic,
	clippy::perf,
	clippy::suboptimal_flops,
	clippy::unneeded_field_pattern,
	macro_use_extern_crate,
	missing_copy_implementations,
	missing_debug_implementations,
	missing_docs,
	non_ascii_idents,
	trivial_casts,
	trivial_numeric_casts,
	unreachable_pub,
	unused_crate_dependencies,
	unused_extern_crates,
	unused_import_braces,
)]

#![allow(
	clippy::doc_markdown,
	clippy::module_name_repetitions,
	clippy::redundant_pub_crate,
)]

mod abort;
mod disc;
mod error;
mod ifo;
mod rip;
mod source;
mod title;

pub use abort::KillSwitch;
pub use disc::Disc;
pub use error::RipDvdError;
pub use rip::{
	opts::RipRequest,
	Progress,
	rip,
};
pub(crate) use source::{
	CssSource,
	SectorSource,
	VobSource,
};
pub use title::{
	AudioCoding,
	AudioStream,
	CellRef,
	Chapter,
	SectorRange,
	SubtitleStream,
	Title,
};



/// # Bytes Per Sector.
///
/// DVD-Video addressing is always in terms of 2048-byte logical sectors;
/// every table in the IFO files counts in these units.
pub const SECTOR_SIZE: u16 = 2048;

/// # Sectors Per Read Batch.
///
/// The engine reads up to this many sectors at a time (128 KiB), a middle
/// ground between syscall overhead and progress granularity.
pub(crate) const READ_BATCH: u16 = 64;

/// # Main IFO Tag.
pub(crate) const VMG_MAGIC: &str = "DVDVIDEO-VMG";

/// # Title-Set IFO Tag.
pub(crate) const VTS_MAGIC: &str = "DVDVIDEO-VTS";

/// # Main IFO File Name.
pub(crate) const VMG_FILE: &str = "VIDEO_TS.IFO";
