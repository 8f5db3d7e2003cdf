use std::sync::mpsc;
use std::sync::mpsc::RecvTimeoutError;
use std::thread;
use std::time::Duration;

/// Default cadence of "still running" messages for slow git operations.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);

/// A sink for human-readable progress messages.
///
/// Any `Fn(&str) + Sync` closure is a progress sink. The sink must be `Sync`
/// because heartbeat messages are emitted from a timer thread while the
/// resolving thread is blocked on git.
pub trait Progress: Sync {
	fn notify(&self, message: &str);
}

impl<F> Progress for F
where
	F: Fn(&str) + Sync,
{
	fn notify(&self, message: &str) {
		self(message);
	}
}

/// Forwards progress messages to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl Progress for TracingProgress {
	fn notify(&self, message: &str) {
		tracing::info!(target: "mdcorpus::progress", "{message}");
	}
}

/// Send a single message when a sink is configured.
pub(crate) fn report(progress: Option<&dyn Progress>, message: impl AsRef<str>) {
	if let Some(progress) = progress {
		progress.notify(message.as_ref());
	}
}

/// Run `operation`, reporting `start` before it begins and `heartbeat` every
/// `interval` until it returns.
///
/// The timer runs on a scoped thread that waits on a done-signal channel.
/// Dropping the sender wakes it immediately and the thread is joined before
/// this function returns, so no heartbeat can be observed after the
/// operation's result is handed back. Without a sink the operation runs
/// inline and no thread is spawned.
pub(crate) fn run_with_heartbeat<T>(
	progress: Option<&dyn Progress>,
	interval: Duration,
	start: &str,
	heartbeat: &str,
	operation: impl FnOnce() -> T,
) -> T {
	let Some(progress) = progress else {
		return operation();
	};

	progress.notify(start);

	thread::scope(|scope| {
		let (done_tx, done_rx) = mpsc::channel::<()>();
		let ticker = scope.spawn(move || {
			while let Err(RecvTimeoutError::Timeout) = done_rx.recv_timeout(interval) {
				progress.notify(heartbeat);
			}
		});

		let result = operation();
		drop(done_tx);

		if let Err(panic) = ticker.join() {
			std::panic::resume_unwind(panic);
		}

		result
	})
}
