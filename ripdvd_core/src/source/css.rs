/*!
# Rip DVD: CSS Sector Source

The decrypting source drives libdvdcss against a raw device. The library is
resolved at runtime — all five entry points up front, during `open` — so an
unencrypted workflow never needs it installed at all, and a missing or
broken install surfaces as one actionable error instead of a loader crash.
*/

use crate::{
	RipDvdError,
	SECTOR_SIZE,
	SectorSource,
};
use fyi_msg::Msg;
use libloading::{
	Library,
	os::unix::Symbol as RawSymbol,
};
use std::{
	ffi::{
		c_char,
		c_int,
		c_void,
		CStr,
		CString,
	},
	os::unix::ffi::OsStrExt,
	path::{
		Path,
		PathBuf,
	},
};



#[cfg(target_os = "macos")]
/// # Library Candidates.
const CSS_LIBRARIES: [&str; 2] = ["libdvdcss.2.dylib", "libdvdcss.dylib"];

#[cfg(not(target_os = "macos"))]
/// # Library Candidates.
const CSS_LIBRARIES: [&str; 2] = ["libdvdcss.so.2", "libdvdcss.so"];

/// # Flag: None.
const DVDCSS_NOFLAGS: c_int = 0;

/// # Flag: Decrypt While Reading.
const DVDCSS_READ_DECRYPT: c_int = 1;

/// # Flag: Seeking Within MPEG Data.
const DVDCSS_SEEK_MPEG: c_int = 1;

/// # Flag: Negotiate the Title Key While Seeking.
const DVDCSS_SEEK_KEY: c_int = 2;

/// # `dvdcss_open`.
type OpenFn = unsafe extern "C" fn(*const c_char) -> *mut c_void;

/// # `dvdcss_close`.
type CloseFn = unsafe extern "C" fn(*mut c_void) -> c_int;

/// # `dvdcss_seek`.
type SeekFn = unsafe extern "C" fn(*mut c_void, c_int, c_int) -> c_int;

/// # `dvdcss_read`.
type ReadFn = unsafe extern "C" fn(*mut c_void, *mut c_void, c_int, c_int) -> c_int;

/// # `dvdcss_error`.
type ErrorFn = unsafe extern "C" fn(*mut c_void) -> *const c_char;



#[derive(Debug)]
/// # CSS Sector Source.
///
/// Construction is cheap and infallible; the library load and device
/// handshake happen in [`SectorSource::open`].
pub(crate) struct CssSource {
	device: PathBuf,
	css: Option<DvdCss>,
	pos: u32,
}

impl CssSource {
	/// # New.
	pub(crate) fn new<P>(device: P) -> Self
	where P: AsRef<Path> {
		Self {
			device: device.as_ref().to_path_buf(),
			css: None,
			pos: 0,
		}
	}
}

impl SectorSource for CssSource {
	fn open(&mut self) -> Result<(), RipDvdError> {
		if self.css.is_none() {
			self.css.replace(DvdCss::open(&self.device)?);
			self.pos = 0;
		}
		Ok(())
	}

	fn seek(&mut self, sector: u32, request_key: bool) -> Result<u32, RipDvdError> {
		let css = self.css.as_ref().ok_or(RipDvdError::Bug("seek on an unopened source"))?;
		let flags =
			if request_key { DVDCSS_SEEK_KEY }
			else { DVDCSS_SEEK_MPEG };
		let landed = css.seek(sector, flags).map_err(|e| {
			Msg::warning(format!("libdvdcss: {}.", css.error())).eprint();
			e
		})?;
		self.pos = landed;
		Ok(landed)
	}

	fn read(&mut self, buf: &mut [u8], sectors: u16, decrypt: bool) -> Result<u16, RipDvdError> {
		let css = self.css.as_ref().ok_or(RipDvdError::Bug("read on an unopened source"))?;
		let flags =
			if decrypt { DVDCSS_READ_DECRYPT }
			else { DVDCSS_NOFLAGS };
		let got = css.read(buf, sectors, flags, self.pos).map_err(|e| {
			Msg::warning(format!("libdvdcss: {}.", css.error())).eprint();
			e
		})?;
		self.pos += u32::from(got);
		Ok(got)
	}

	fn supports_decryption(&self) -> bool { true }

	fn close(&mut self) { self.css = None; }
}



#[derive(Debug)]
/// # A Live libdvdcss Handle.
///
/// The symbols are resolved once and carried alongside the library they
/// came from; field order keeps the `Library` alive until after the handle
/// has been closed.
struct DvdCss {
	handle: *mut c_void,
	fn_close: RawSymbol<CloseFn>,
	fn_seek: RawSymbol<SeekFn>,
	fn_read: RawSymbol<ReadFn>,
	fn_error: RawSymbol<ErrorFn>,
	_lib: Library,
}

impl Drop for DvdCss {
	#[allow(unsafe_code)]
	fn drop(&mut self) {
		if ! self.handle.is_null() {
			unsafe { (self.fn_close)(self.handle); }
		}
	}
}

impl DvdCss {
	#[allow(unsafe_code)]
	/// # Open.
	///
	/// Load the library, resolve every entry point, and open the device.
	///
	/// ## Errors
	///
	/// Any failure along the way comes back as
	/// [`RipDvdError::DecryptionUnavailable`] with a message naming what was
	/// missing.
	fn open(device: &Path) -> Result<Self, RipDvdError> {
		let lib = CSS_LIBRARIES.iter()
			.find_map(|name| unsafe { Library::new(name) }.ok())
			.ok_or_else(|| RipDvdError::DecryptionUnavailable(format!(
				"{} could not be loaded; install libdvdcss 2.x somewhere the system loader looks, like /usr/lib or /usr/local/lib",
				CSS_LIBRARIES[0],
			)))?;

		// A missing symbol is as fatal as a missing library, and better
		// discovered now than mid-rip.
		let fn_open = resolve::<OpenFn>(&lib, b"dvdcss_open\0")?;
		let fn_close = resolve::<CloseFn>(&lib, b"dvdcss_close\0")?;
		let fn_seek = resolve::<SeekFn>(&lib, b"dvdcss_seek\0")?;
		let fn_read = resolve::<ReadFn>(&lib, b"dvdcss_read\0")?;
		let fn_error = resolve::<ErrorFn>(&lib, b"dvdcss_error\0")?;

		let dev = CString::new(device.as_os_str().as_bytes())
			.map_err(|_| RipDvdError::DecryptionUnavailable(format!(
				"the device path {} cannot be passed to libdvdcss",
				device.display(),
			)))?;

		let handle = unsafe { fn_open(dev.as_ptr()) };
		if handle.is_null() {
			return Err(RipDvdError::DecryptionUnavailable(format!(
				"libdvdcss could not open {}",
				device.display(),
			)));
		}

		Ok(Self {
			handle,
			fn_close,
			fn_seek,
			fn_read,
			fn_error,
			_lib: lib,
		})
	}

	#[allow(unsafe_code)]
	/// # Seek.
	///
	/// Returns the block the library actually landed on.
	///
	/// ## Errors
	///
	/// A negative return from the library is a positioning (or key
	/// negotiation) failure.
	fn seek(&self, sector: u32, flags: c_int) -> Result<u32, RipDvdError> {
		let wanted = c_int::try_from(sector).map_err(|_| RipDvdError::SectorRead(sector))?;
		let landed = unsafe { (self.fn_seek)(self.handle, wanted, flags) };
		u32::try_from(landed).map_err(|_| RipDvdError::SectorRead(sector))
	}

	#[allow(unsafe_code)]
	/// # Read.
	///
	/// Returns the number of sectors the library handed back, which may be
	/// fewer than asked.
	///
	/// ## Errors
	///
	/// A negative return from the library is a read failure; `pos` only
	/// feeds the error.
	fn read(&self, buf: &mut [u8], sectors: u16, flags: c_int, pos: u32)
	-> Result<u16, RipDvdError> {
		debug_assert!(
			usize::from(sectors) * usize::from(SECTOR_SIZE) <= buf.len(),
			"Read buffer too small for the requested sectors!",
		);

		let got = unsafe {
			(self.fn_read)(
				self.handle,
				buf.as_mut_ptr().cast(),
				c_int::from(sectors),
				flags,
			)
		};

		u16::try_from(got).map_err(|_| RipDvdError::SectorRead(pos))
	}

	#[allow(unsafe_code)]
	/// # Last Library Error.
	fn error(&self) -> String {
		let ptr = unsafe { (self.fn_error)(self.handle) };
		if ptr.is_null() { "unknown error".to_owned() }
		else {
			unsafe { CStr::from_ptr(ptr) }
				.to_string_lossy()
				.into_owned()
		}
	}
}



#[allow(unsafe_code)]
/// # Resolve a Symbol.
///
/// ## Errors
///
/// Converts a resolution failure into [`RipDvdError::DecryptionUnavailable`]
/// naming the symbol.
fn resolve<T>(lib: &Library, name: &[u8]) -> Result<RawSymbol<T>, RipDvdError> {
	unsafe { lib.get::<T>(name) }
		.map(|sym| unsafe { sym.into_raw() })
		.map_err(|_| RipDvdError::DecryptionUnavailable(format!(
			"the installed libdvdcss is missing {}; version 2.x is required",
			String::from_utf8_lossy(&name[..name.len() - 1]),
		)))
}
