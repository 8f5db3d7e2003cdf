use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum CorpusError {
	#[error(transparent)]
	#[diagnostic(code(mdcorpus::io_error))]
	Io(#[from] std::io::Error),

	#[error("invalid source configuration: {0}")]
	#[diagnostic(code(mdcorpus::config))]
	Config(String),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(mdcorpus::config_parse),
		help("check that mdcorpus.toml is valid TOML with `[[sources]]` and `[curation]` sections")
	)]
	ConfigParse(String),

	#[error("source {name} local root does not exist: {}", .root.display())]
	#[diagnostic(
		code(mdcorpus::local_root_not_found),
		help("absolute roots are used as local overrides and must already exist")
	)]
	LocalRootNotFound { name: String, root: PathBuf },

	#[error("stat source {name} local root {}: {source}", .root.display())]
	#[diagnostic(code(mdcorpus::local_root_io))]
	LocalRootIo {
		name: String,
		root: PathBuf,
		source: std::io::Error,
	},

	#[error("create cache directory {}: {source}", .path.display())]
	#[diagnostic(code(mdcorpus::cache_dir_create))]
	CacheDirCreate {
		path: PathBuf,
		source: std::io::Error,
	},

	#[error("stat cached repository for {name} at {}: {source}", .path.display())]
	#[diagnostic(code(mdcorpus::cache_io))]
	CacheIo {
		name: String,
		path: PathBuf,
		source: std::io::Error,
	},

	#[error("repository not found or inaccessible: {remote}")]
	#[diagnostic(
		code(mdcorpus::repository_not_found),
		help("check the repository url and your git credentials")
	)]
	RepositoryNotFound { name: String, remote: String },

	#[error("commit not found: {commit}")]
	#[diagnostic(
		code(mdcorpus::commit_not_found),
		help("pin `commit_sha` to a full commit that exists on the remote")
	)]
	CommitNotFound { name: String, commit: String },

	#[error("network error while accessing {remote}")]
	#[diagnostic(code(mdcorpus::network), help("the remote may be unreachable, retry later"))]
	Network { name: String, remote: String },

	#[error("{context}: {source}")]
	#[diagnostic(code(mdcorpus::git_command))]
	GitCommand {
		context: String,
		source: GitCommandError,
	},

	#[error("source {name} root {root:?} not found in commit {commit}")]
	#[diagnostic(
		code(mdcorpus::root_not_found_in_commit),
		help("`root` is relative to the repository and must exist at the pinned commit")
	)]
	RootNotFoundInCommit {
		name: String,
		root: String,
		commit: String,
	},

	#[error("stat source {name} root {}: {source}", .path.display())]
	#[diagnostic(code(mdcorpus::root_io))]
	RootIo {
		name: String,
		path: PathBuf,
		source: std::io::Error,
	},
}

impl CorpusError {
	/// Whether a caller may reasonably retry the failed operation.
	///
	/// Only network failures are transient. Everything else needs a
	/// configuration or repository change first.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::Network { .. })
	}
}

/// A git invocation that could not be started or exited unsuccessfully.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GitCommandError {
	#[error("failed to run git: {0}")]
	Spawn(#[from] std::io::Error),

	#[error("git {args} exited with {status}: {output}")]
	Failed {
		args: String,
		status: String,
		output: String,
	},
}

impl GitCommandError {
	pub fn failed(args: &[String], status: impl Into<String>, output: impl AsRef<str>) -> Self {
		Self::Failed {
			args: args.join(" "),
			status: status.into(),
			output: output.as_ref().trim().to_string(),
		}
	}
}

pub type CorpusResult<T> = Result<T, CorpusError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
