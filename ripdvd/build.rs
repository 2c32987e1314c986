/*!
# Rip DVD: Build
*/

use argyle::KeyWordsBuilder;
use std::path::PathBuf;



/// # Set Up CLI Arguments.
fn main() {
	println!("cargo:rerun-if-env-changed=CARGO_PKG_VERSION");

	let mut builder = KeyWordsBuilder::default();
	builder.push_keys([
		"--decrypt",
		"-h", "--help",
		"--list",
		"--no-summary",
		"-V", "--version",
	]);
	builder.push_keys_with_values([
		"-c", "--chapter", "--chapters",
		"-d", "--dev",
		"-i", "--input",
		"-o", "--output",
		"-t", "--title",
	]);
	builder.save(out_path("argyle.rs"));
}

/// # Output Path.
///
/// Append the sub-path to OUT_DIR and return it.
fn out_path(stub: &str) -> PathBuf {
	std::fs::canonicalize(std::env::var("OUT_DIR").expect("Missing OUT_DIR."))
		.expect("Missing OUT_DIR.")
		.join(stub)
}
