/*!
# Rip DVD: Rip Requests
*/

use crate::RipDvdError;
use std::path::{
	Path,
	PathBuf,
};



#[derive(Debug, Clone)]
/// # Rip Request.
///
/// Everything the engine needs to know: where the disc metadata lives,
/// which title (and optionally which chapters) to pull, whether to
/// descramble — and through which device — and where the output lands.
///
/// This uses builder-style construction. Start with [`RipRequest::new`],
/// then chain any desired `with_` methods.
pub struct RipRequest {
	video_ts: PathBuf,
	raw_device: Option<PathBuf>,
	title: u16,
	chapters: Option<(u16, u16)>,
	decrypt: bool,
	destination: PathBuf,
}

impl RipRequest {
	#[must_use]
	/// # New.
	///
	/// The defaults beyond the two required paths: title #1, every chapter,
	/// no decryption.
	pub fn new<P, Q>(video_ts: P, destination: Q) -> Self
	where P: AsRef<Path>, Q: AsRef<Path> {
		Self {
			video_ts: video_ts.as_ref().to_path_buf(),
			raw_device: None,
			title: 1,
			chapters: None,
			decrypt: false,
			destination: destination.as_ref().to_path_buf(),
		}
	}

	#[must_use]
	/// # With Title.
	///
	/// Set the (1-based) title to rip.
	pub fn with_title(self, title: u16) -> Self {
		Self {
			title,
			..self
		}
	}

	#[must_use]
	/// # With Chapter Range.
	///
	/// Restrict the rip to an inclusive, 1-based chapter range. `None` rips
	/// the whole title.
	pub fn with_chapters(self, chapters: Option<(u16, u16)>) -> Self {
		Self {
			chapters,
			..self
		}
	}

	#[must_use]
	/// # With Decryption.
	///
	/// Descramble through the CSS library. Requires a raw device path.
	///
	/// The default is disabled.
	pub fn with_decrypt(self, decrypt: bool) -> Self {
		Self {
			decrypt,
			..self
		}
	}

	#[must_use]
	/// # With Raw Device.
	///
	/// The device to hand the CSS library, like `/dev/sr0`. Only meaningful
	/// alongside [`RipRequest::with_decrypt`].
	pub fn with_raw_device<P>(self, raw_device: P) -> Self
	where P: AsRef<Path> {
		Self {
			raw_device: Some(raw_device.as_ref().to_path_buf()),
			..self
		}
	}
}

impl RipRequest {
	#[must_use]
	/// # VIDEO_TS Path.
	pub fn video_ts(&self) -> &Path { &self.video_ts }

	#[must_use]
	/// # Raw Device Path, If Any.
	pub fn raw_device(&self) -> Option<&Path> { self.raw_device.as_deref() }

	#[must_use]
	/// # Title Number.
	pub const fn title(&self) -> u16 { self.title }

	#[must_use]
	/// # Chapter Range.
	pub const fn chapters(&self) -> Option<(u16, u16)> { self.chapters }

	#[must_use]
	/// # Decrypt?
	pub const fn decrypt(&self) -> bool { self.decrypt }

	#[must_use]
	/// # Destination Path.
	pub fn destination(&self) -> &Path { &self.destination }

	/// # Sanity Check.
	///
	/// Catch the requests that can be known-bad without a disc in hand.
	///
	/// ## Errors
	///
	/// Returns an error for a zero title, an inverted or zero-based chapter
	/// range, or decryption without a device.
	pub(crate) fn validate(&self) -> Result<(), RipDvdError> {
		if self.title == 0 { return Err(RipDvdError::NoTitle(0)); }
		if let Some((a, b)) = self.chapters {
			if a == 0 || b < a { return Err(RipDvdError::ChapterRange(a, b)); }
		}
		if self.decrypt && self.raw_device.is_none() {
			return Err(RipDvdError::DeviceRequired);
		}
		Ok(())
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_request_builder() {
		let req = RipRequest::new("/mnt/dvd/VIDEO_TS", "/tmp/out.mpg")
			.with_title(3)
			.with_chapters(Some((2, 4)))
			.with_decrypt(true)
			.with_raw_device("/dev/sr0");

		assert_eq!(req.video_ts(), Path::new("/mnt/dvd/VIDEO_TS"));
		assert_eq!(req.destination(), Path::new("/tmp/out.mpg"));
		assert_eq!(req.title(), 3);
		assert_eq!(req.chapters(), Some((2, 4)));
		assert!(req.decrypt());
		assert_eq!(req.raw_device(), Some(Path::new("/dev/sr0")));
		assert!(req.validate().is_ok());
	}

	#[test]
	fn t_request_validate() {
		let base = RipRequest::new("/mnt/dvd/VIDEO_TS", "/tmp/out.mpg");
		assert!(base.validate().is_ok());

		assert_eq!(
			base.clone().with_title(0).validate(),
			Err(RipDvdError::NoTitle(0)),
		);

		assert_eq!(
			base.clone().with_chapters(Some((0, 2))).validate(),
			Err(RipDvdError::ChapterRange(0, 2)),
		);
		assert_eq!(
			base.clone().with_chapters(Some((4, 2))).validate(),
			Err(RipDvdError::ChapterRange(4, 2)),
		);

		assert_eq!(
			base.clone().with_decrypt(true).validate(),
			Err(RipDvdError::DeviceRequired),
		);
		assert!(
			base.with_decrypt(true).with_raw_device("/dev/sr0").validate().is_ok(),
		);
	}
}
