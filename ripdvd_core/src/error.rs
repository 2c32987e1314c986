/*!
# Rip DVD: Errors
*/

use fyi_msg::Msg;
use std::{
	error::Error,
	fmt,
};



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Errors.
pub enum RipDvdError {
	/// # Bug!
	Bug(&'static str),

	/// # Decryption requested from a source that can't.
	CapabilityViolation,

	/// # Invalid chapter range.
	ChapterRange(u16, u16),

	/// # Unusable IFO data.
	CorruptIfo(String, &'static str),

	/// # CSS library missing or unopenable.
	DecryptionUnavailable(String),

	/// # Decryption without a raw device path.
	DeviceRequired,

	/// # User Abort.
	Killed,

	/// # A referenced file is absent.
	MissingFile(String),

	/// # Invalid title number.
	NoTitle(u16),

	/// # No playable titles at all.
	NoTitles,

	/// # Sector read failure.
	SectorRead(u32),

	/// # IFO access out of bounds.
	Truncated,

	/// # Writing to disk.
	Write(String),

	#[cfg(feature = "bin")]
	/// # CLI Parsing failure.
	CliParse(&'static str),

	#[cfg(feature = "bin")]
	/// # Print Help (Not an Error).
	PrintHelp,

	#[cfg(feature = "bin")]
	/// # Print Version (Not an Error).
	PrintVersion,
}

impl Error for RipDvdError {}

impl From<RipDvdError> for Msg {
	#[inline]
	fn from(src: RipDvdError) -> Self { Self::error(src.to_string()) }
}

impl fmt::Display for RipDvdError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bug(s) => write!(f, "Bug: {s}."),
			Self::CapabilityViolation => f.write_str("Decryption was requested from a source that cannot decrypt."),
			Self::ChapterRange(a, b) => write!(f, "Invalid chapter range ({a}-{b})."),
			Self::CorruptIfo(file, reason) => write!(f, "{file} is corrupt: {reason}."),
			Self::DecryptionUnavailable(s) => write!(f, "{s}."),
			Self::DeviceRequired => f.write_str("Decryption requires a raw device path, like /dev/sr0."),
			Self::Killed => f.write_str("User abort."),
			Self::MissingFile(s) => write!(f, "Missing file {s}."),
			Self::NoTitle(n) => write!(f, "There is no title #{n} on this disc."),
			Self::NoTitles => f.write_str("No playable titles were found."),
			Self::SectorRead(n) => write!(f, "Read error at sector {n}."),
			Self::Truncated => f.write_str("Unexpected end of IFO data."),
			Self::Write(s) => write!(f, "Unable to write to {s}."),

			#[cfg(feature = "bin")]
			Self::CliParse(s) => write!(f, "Unable to parse {s}."),

			#[cfg(feature = "bin")]
			Self::PrintHelp => f.write_str("Help."),

			#[cfg(feature = "bin")]
			Self::PrintVersion => f.write_str(concat!("Rip DVD v", env!("CARGO_PKG_VERSION"))),
		}
	}
}
