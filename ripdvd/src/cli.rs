/*!
# Rip DVD: CLI
*/

use argyle::Argument;
use dactyl::traits::BytesToUnsigned;
use ripdvd_core::{
	RipDvdError,
	RipRequest,
};
use std::path::{
	Path,
	PathBuf,
};



/// # Parsed CLI Bits.
pub(super) struct Parsed {
	/// # The Rip Request.
	pub(super) request: RipRequest,

	/// # Summarize and Stop?
	pub(super) list: bool,

	/// # Skip the Summary?
	pub(super) no_summary: bool,
}



/// # Parse Options.
pub(super) fn parse() -> Result<Parsed, RipDvdError> {
	let args = argyle::args()
		.with_keywords(include!(concat!(env!("OUT_DIR"), "/argyle.rs")));

	let mut chapters = None;
	let mut decrypt = false;
	let mut dev: Option<PathBuf> = None;
	let mut input: Option<PathBuf> = None;
	let mut list = false;
	let mut no_summary = false;
	let mut output: Option<PathBuf> = None;
	let mut title: u16 = 1;
	for arg in args {
		match arg {
			Argument::Key("--decrypt") => { decrypt = true; },
			Argument::Key("-h" | "--help") => return Err(RipDvdError::PrintHelp),
			Argument::Key("--list") => { list = true; },
			Argument::Key("--no-summary") => { no_summary = true; },
			Argument::Key("-V" | "--version") => return Err(RipDvdError::PrintVersion),

			Argument::KeyWithValue("-c" | "--chapter" | "--chapters", s) => {
				chapters.replace(parse_chapters(&s)?);
			},
			Argument::KeyWithValue("-d" | "--dev", s) => { dev.replace(PathBuf::from(s)); },
			Argument::KeyWithValue("-i" | "--input", s) => { input.replace(PathBuf::from(s)); },
			Argument::KeyWithValue("-o" | "--output", s) => { output.replace(PathBuf::from(s)); },
			Argument::KeyWithValue("-t" | "--title", s) => {
				title = u16::btou(s.trim().as_bytes())
					.ok_or(RipDvdError::CliParse("-t/--title"))?;
			},

			_ => {},
		}
	}

	// The input is the one thing we can't guess.
	let input = input.ok_or(RipDvdError::CliParse("-i/--input"))?;

	let mut request = RipRequest::new(
		find_video_ts(&input),
		output.unwrap_or_else(|| PathBuf::from(format!("title_{title:02}.mpg"))),
	)
		.with_title(title)
		.with_chapters(chapters)
		.with_decrypt(decrypt);
	if let Some(dev) = dev { request = request.with_raw_device(dev); }

	Ok(Parsed { request, list, no_summary })
}



/// # Parse a Chapter Range.
///
/// Either an inclusive `a-b` range or a single chapter number.
fn parse_chapters(raw: &str) -> Result<(u16, u16), RipDvdError> {
	let raw = raw.trim();

	if let Some((a, b)) = raw.split_once('-') {
		let a = u16::btou(a.trim().as_bytes())
			.ok_or(RipDvdError::CliParse("-c/--chapters"))?;
		let b = u16::btou(b.trim().as_bytes())
			.ok_or(RipDvdError::CliParse("-c/--chapters"))?;
		if a == 0 || b < a { Err(RipDvdError::CliParse("-c/--chapters")) }
		else { Ok((a, b)) }
	}
	else {
		let n = u16::btou(raw.as_bytes())
			.ok_or(RipDvdError::CliParse("-c/--chapters"))?;
		if n == 0 { Err(RipDvdError::CliParse("-c/--chapters")) }
		else { Ok((n, n)) }
	}
}

/// # Resolve the VIDEO_TS Directory.
///
/// People pass the disc root and the `VIDEO_TS` directory about equally
/// often; accept either. (The IFO look-ups downstream are case-insensitive,
/// so a lowercase tree works too.)
fn find_video_ts(input: &Path) -> PathBuf {
	if input.join("VIDEO_TS.IFO").is_file() { return input.to_path_buf(); }

	if let Ok(rd) = std::fs::read_dir(input) {
		for e in rd.flatten() {
			let path = e.path();
			if
				path.is_dir() &&
				path.file_name()
					.and_then(|n| n.to_str())
					.is_some_and(|n| n.eq_ignore_ascii_case("VIDEO_TS"))
			{
				return path;
			}
		}
	}

	input.to_path_buf()
}
