use std::process::Command;

use crate::GitCommandError;

/// Executes git commands on behalf of the resolver.
///
/// The resolver never spawns `git` itself. Production code uses
/// [`ProcessGitRunner`]; tests substitute fakes that record the arguments
/// and return canned output.
pub trait GitRunner: Sync {
	/// Run `git` with `args` and return the combined stdout and stderr.
	///
	/// A non-zero exit must be reported as [`GitCommandError::Failed`] with
	/// the combined output attached so failures can be classified.
	fn run(&self, args: &[String]) -> Result<String, GitCommandError>;
}

impl<T: GitRunner + ?Sized> GitRunner for &T {
	fn run(&self, args: &[String]) -> Result<String, GitCommandError> {
		(**self).run(args)
	}
}

/// Runs the `git` executable found on `PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessGitRunner;

impl GitRunner for ProcessGitRunner {
	fn run(&self, args: &[String]) -> Result<String, GitCommandError> {
		tracing::debug!(args = %args.join(" "), "running git");

		let output = Command::new("git")
			.args(args)
			.env("GIT_TERMINAL_PROMPT", "0")
			.output()?;

		let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
		combined.push_str(&String::from_utf8_lossy(&output.stderr));

		if !output.status.success() {
			let status = output
				.status
				.code()
				.map_or_else(|| "unknown status".to_string(), |code| format!("status {code}"));
			return Err(GitCommandError::failed(args, status, &combined));
		}

		Ok(combined)
	}
}
