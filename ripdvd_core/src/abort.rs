/*!
# Rip DVD: Kill Switch
*/

use std::sync::{
	Arc,
	atomic::{
		AtomicBool,
		Ordering::{
			Acquire,
			Release,
		},
	},
};



#[derive(Debug, Default)]
/// # Kill Switch.
///
/// A rip can take a long while, so the engine re-checks this flag at every
/// batch boundary and bails early — partial output removed — once it has
/// been tripped.
///
/// The binary's CTRL-C intercept sets the value via [`KillSwitch::inner`];
/// anything holding the switch itself can use [`KillSwitch::kill`] directly.
pub struct KillSwitch(Arc<AtomicBool>);

impl KillSwitch {
	#[must_use]
	/// # Dead?
	pub fn killed(&self) -> bool { self.0.load(Acquire) }

	/// # Trip the Switch.
	pub fn kill(&self) { self.0.store(true, Release); }

	#[must_use]
	/// # Inner Clone.
	pub fn inner(&self) -> Arc<AtomicBool> { Arc::clone(&self.0) }
}
