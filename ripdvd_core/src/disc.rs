/*!
# Rip DVD: Disc
*/

use crate::{
	CssSource,
	ifo::{
		vmg,
		vts,
	},
	KillSwitch,
	Progress,
	rip::rip_playlist,
	RipDvdError,
	RipRequest,
	Title,
	VMG_FILE,
	VobSource,
};
use dactyl::NiceU64;
use fyi_msg::Msg;
use std::{
	fmt,
	path::{
		Path,
		PathBuf,
	},
};



#[derive(Debug)]
/// # Disc.
///
/// The parsed disc model: every playable title, in TT_SRPT order, read
/// once from the IFO files and immutable from then on.
pub struct Disc {
	video_ts: PathBuf,
	titles: Vec<Title>,
}

impl fmt::Display for Disc {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		const DIVIDER: &str = "\x1b[2m--------------------------------------------------------------\x1b[0m\n";

		writeln!(
			f,
			"\x1b[1;38;5;199mVIDEO_TS:\x1b[0m {}",
			self.video_ts.display(),
		)?;

		// Start the title table.
		f.write_str("\n\x1b[2m##   LENGTH  CHAP.  ANG.            SIZE  AUDIO / SUBS\x1b[0m\n")?;
		f.write_str(DIVIDER)?;

		for t in &self.titles {
			writeln!(
				f,
				"{:02}  {:>7}  {:>5}  {:>4}  {:>14}  {} \x1b[2m/\x1b[0m {}",
				t.number(),
				nice_duration(t.duration_ms()),
				t.chapters().len(),
				t.angle_count(),
				NiceU64::from(t.bytes()).as_str(),
				nice_languages(t.audio().iter().map(|a| format!(
					"{} {}",
					a.language(),
					a.coding().as_str(),
				))),
				nice_languages(t.subtitles().iter().map(|s| s.language().to_owned())),
			)?;
		}

		// Close it off!
		f.write_str(DIVIDER)?;
		writeln!(f)
	}
}

impl Disc {
	/// # New.
	///
	/// Load and parse the disc structure from a `VIDEO_TS` directory!
	///
	/// Titles whose title set is missing or unparseable are warned about and
	/// dropped; only a disc yielding nothing at all is an error.
	///
	/// ## Errors
	///
	/// This will return an error if `VIDEO_TS.IFO` is absent or corrupt, or
	/// no title survives the pass.
	pub fn new<P>(video_ts: P) -> Result<Self, RipDvdError>
	where P: AsRef<Path> {
		let video_ts = video_ts.as_ref();
		let vmg_path = find_file(video_ts, VMG_FILE)
			.ok_or_else(|| RipDvdError::MissingFile(
				video_ts.join(VMG_FILE).to_string_lossy().into_owned()
			))?;
		let raw = std::fs::read(&vmg_path)
			.map_err(|_| RipDvdError::MissingFile(vmg_path.to_string_lossy().into_owned()))?;

		let mut titles = Vec::new();
		for entry in vmg::parse_vmg(&raw)? {
			if entry.vts_number == 0 {
				Msg::warning(format!(
					"Title #{} points at title set zero; skipping it.",
					entry.title_number,
				)).eprint();
				continue;
			}

			// Find and read the title set's IFO.
			let name = format!("VTS_{:02}_0.IFO", entry.vts_number);
			let Some(path) = find_file(video_ts, &name) else {
				Msg::warning(format!(
					"{name} is missing; skipping title #{}.",
					entry.title_number,
				)).eprint();
				continue;
			};
			let Ok(raw) = std::fs::read(&path) else {
				Msg::warning(format!(
					"{name} is unreadable; skipping title #{}.",
					entry.title_number,
				)).eprint();
				continue;
			};

			// A parse failure drops the title, not the disc.
			match vts::parse_vts(&raw, &name, entry.title_in_vts) {
				Ok(parsed) => { titles.push(Title::new(&entry, parsed)); },
				Err(e) => {
					Msg::warning(format!(
						"Title #{} could not be parsed: {e}",
						entry.title_number,
					)).eprint();
				},
			}
		}

		if titles.is_empty() { return Err(RipDvdError::NoTitles); }
		Ok(Self {
			video_ts: video_ts.to_path_buf(),
			titles,
		})
	}
}

impl Disc {
	#[must_use]
	/// # VIDEO_TS Path.
	pub fn video_ts(&self) -> &Path { &self.video_ts }

	#[must_use]
	/// # Titles, in TT_SRPT Order.
	pub fn titles(&self) -> &[Title] { &self.titles }

	#[must_use]
	/// # A Specific Title.
	pub fn title(&self, number: u16) -> Option<&Title> {
		self.titles.iter().find(|t| t.number() == number)
	}
}

impl Disc {
	/// # Rip!
	///
	/// Stream the requested title (or chapter range) to the request's
	/// destination, through CSS if decryption was asked for, and return the
	/// destination path.
	///
	/// ## Errors
	///
	/// This will bubble up any request/IO/read errors encountered along the
	/// way; on failure or cancellation no destination file is left behind.
	pub fn rip<P>(&self, request: &RipRequest, on_progress: P, killed: &KillSwitch)
	-> Result<PathBuf, RipDvdError>
	where P: FnMut(Progress) {
		request.validate()?;
		let title = self.title(request.title())
			.ok_or(RipDvdError::NoTitle(request.title()))?;
		let playlist = title.playlist(request.chapters())?;

		// The source variant is fixed here, once, for the whole rip. An
		// unencrypted title ripped through the CSS handle simply comes back
		// unscrambled; the reverse mistake is caught as a capability error.
		if request.decrypt() {
			let device = request.raw_device().ok_or(RipDvdError::DeviceRequired)?;
			let mut src = CssSource::new(device);
			rip_playlist(&mut src, &playlist, request.destination(), true, on_progress, killed)
		}
		else {
			let mut src = VobSource::new(&self.video_ts, title.vts_number())?;
			rip_playlist(&mut src, &playlist, request.destination(), false, on_progress, killed)
		}
	}
}



/// # Find a File, Case-Insensitively.
///
/// Exact match first; failing that, scan the directory for a name that
/// matches modulo case, which is how half the world's ripped `video_ts`
/// folders arrive.
fn find_file(dir: &Path, name: &str) -> Option<PathBuf> {
	let direct = dir.join(name);
	if direct.is_file() { return Some(direct); }

	let rd = std::fs::read_dir(dir).ok()?;
	for e in rd.flatten() {
		let path = e.path();
		if
			path.is_file() &&
			path.file_name()
				.and_then(|n| n.to_str())
				.is_some_and(|n| n.eq_ignore_ascii_case(name))
		{
			return Some(path);
		}
	}

	None
}

#[allow(clippy::integer_division)] // Whole seconds are wanted.
/// # H:MM:SS.
fn nice_duration(ms: u64) -> String {
	let secs = ms.wrapping_div(1_000);
	format!(
		"{}:{:02}:{:02}",
		secs / 3_600,
		secs / 60 % 60,
		secs % 60,
	)
}

/// # Comma-Joined Stream Summary.
fn nice_languages<I>(iter: I) -> String
where I: Iterator<Item=String> {
	let out = iter.collect::<Vec<String>>().join(", ");
	if out.is_empty() { "--".to_owned() }
	else { out }
}
