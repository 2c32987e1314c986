/*!
# Rip DVD!
*/

#![forbid(unsafe_code)]

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

mod cli;

use dactyl::{
	NiceElapsed,
	NiceU64,
};
use fyi_msg::{
	Msg,
	Progless,
};
use ripdvd_core::{
	Disc,
	KillSwitch,
	Progress,
	RipDvdError,
	SectorRange,
};
use std::sync::{
	atomic::{
		AtomicBool,
		Ordering::{
			Relaxed,
			SeqCst,
		},
	},
	Arc,
};



/// # Bytes Per Progress Step.
///
/// The bar ticks in whole mebibytes; anything finer is just terminal noise.
const MIB: u64 = 1_048_576;



/// # Main.
///
/// This lets us bubble up startup errors so they can be pretty-printed.
fn main() {
	match _main() {
		Ok(()) => {},
		Err(RipDvdError::PrintHelp) => { helper(); },
		Err(RipDvdError::PrintVersion) => {
			println!(concat!("Rip DVD v", env!("CARGO_PKG_VERSION")));
		},
		Err(e) => {
			Msg::from(e).eprint();
			std::process::exit(1);
		},
	}
}

#[inline]
/// # Actual Main.
///
/// This does all the stuff.
fn _main() -> Result<(), RipDvdError> {
	let cli::Parsed { request, list, no_summary } = cli::parse()?;

	// Read the disc structure and maybe show it off.
	let disc = Disc::new(request.video_ts())?;
	if ! no_summary { eprintln!("{disc}"); }

	// Go ahead and leave if there's no ripping to do.
	if list { return Ok(()); }

	// The a-priori rip size doubles as the progress ceiling.
	let title = disc.title(request.title())
		.ok_or(RipDvdError::NoTitle(request.title()))?;
	let bytes_total: u64 = title.playlist(request.chapters())?
		.iter()
		.map(SectorRange::bytes)
		.sum();

	// Set up the ripper!
	let progress = Progless::default();
	let _res = progress.reset(
		std::num::NonZero::new(u32::try_from(bytes_total.div_ceil(MIB)).unwrap_or(u32::MAX))
			.unwrap_or(std::num::NonZero::<u32>::MIN)
	);
	progress.set_title(Some(Msg::new(
		("Ripping", 199_u8),
		format!("Title #{:02}…", request.title()),
	)));

	let killed = KillSwitch::default();
	sigint(killed.inner(), Some(progress.clone()));

	// Rip and rip and rip!
	let now = std::time::Instant::now();
	let mut ticked: u64 = 0;
	let dst = disc.rip(
		&request,
		|p: Progress| {
			let mib = p.bytes_written().wrapping_div(MIB);
			while ticked < mib {
				progress.increment();
				ticked += 1;
			}
		},
		&killed,
	)?;
	progress.finish();

	Msg::success(format!(
		"Ripped {} bytes to {} in {}.",
		NiceU64::from(bytes_total),
		dst.display(),
		NiceElapsed::from(now),
	)).eprint();
	Ok(())
}

/// # Hook Up CTRL+C.
fn sigint(killed: Arc<AtomicBool>, progress: Option<Progless>) {
	let _res = ctrlc::set_handler(move ||
		if killed.compare_exchange(false, true, SeqCst, Relaxed).is_ok() {
			if let Some(p) = &progress { let _res = p.push_msg(Msg::warning("Early shutdown in progress.")); }
		}
	);
}

#[cold]
/// # Print Help.
fn helper() {
	println!(concat!(
		r#"
   .--------.
  / .------. \    "#, "\x1b[38;5;199mRip DVD\x1b[0;38;5;69m v", env!("CARGO_PKG_VERSION"), "\x1b[0m", r#"
 / /  .--.  \ \   One title, one chapter range,
 | |  |()|  | |   one MPEG program stream.
 \ \  `--'  / /
  \ `------' /
   `--------'

USAGE:
    ripdvd [OPTIONS]

BASIC SETTINGS:
    -i, --input <PATH>    The disc root or VIDEO_TS directory.
    -t, --title <NUM>     The title to rip. [default: 1]
    -c, --chapters <RNG>  An inclusive chapter range, like 2-4, or a single
                          chapter number. [default: the whole title]
    -o, --output <PATH>   The destination file.
                          [default: ./title_##.mpg]

DECRYPTION:
        --decrypt         Descramble the title through libdvdcss (which must
                          be installed somewhere the system loader looks).
                          Unencrypted discs don't need this; the VOB files
                          are read directly.
    -d, --dev <PATH>      The raw device path for the drive holding the
                          disc, like /dev/sr0. Required with --decrypt.

MISCELLANEOUS:
        --list            Print the disc summary to STDERR and exit (without
                          ripping anything).
        --no-summary      Skip the disc summary and jump straight to
                          ripping.
    -h, --help            Print help information to STDOUT and exit.
    -V, --version         Print version information to STDOUT and exit.

EARLY EXIT:
    Press "#, "\x1b[38;5;208mCTRL\x1b[0m+\x1b[38;5;208mC\x1b[0m", r#" to stop a rip early. Partial output is removed, so
    there's nothing to clean up but your schedule.
"#
	));
}
