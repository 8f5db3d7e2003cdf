use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::LazyLock;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

use crate::CorpusError;
use crate::CorpusResult;
use crate::GitCommandError;
use crate::git::GitRunner;
use crate::git::ProcessGitRunner;
use crate::heartbeat::HEARTBEAT_INTERVAL;
use crate::heartbeat::Progress;
use crate::heartbeat::report;
use crate::heartbeat::run_with_heartbeat;

/// An external repository pinned to one commit, or a local override.
///
/// When `root` is an absolute path the source is read straight from disk and
/// `repository`/`commit_sha` are ignored. Otherwise `root` is relative to the
/// repository checkout at `commit_sha`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
	pub name: String,
	#[serde(default)]
	pub root: String,
	#[serde(default)]
	pub repository: String,
	#[serde(default)]
	pub commit_sha: String,
}

impl SourceConfig {
	/// A source resolved through the git cache.
	pub fn remote(
		name: impl Into<String>,
		repository: impl Into<String>,
		commit_sha: impl Into<String>,
		root: impl Into<String>,
	) -> Self {
		Self {
			name: name.into(),
			root: root.into(),
			repository: repository.into(),
			commit_sha: commit_sha.into(),
		}
	}

	/// A source read directly from an absolute local directory.
	pub fn local(name: impl Into<String>, root: impl AsRef<Path>) -> Self {
		Self {
			name: name.into(),
			root: root.as_ref().to_string_lossy().into_owned(),
			..Self::default()
		}
	}

	pub fn is_local_override(&self) -> bool {
		Path::new(self.root.trim()).is_absolute()
	}
}

/// Resolves sources into local directories backed by a shared clone cache.
///
/// Every remote gets one clone under `cache_dir/<cache key>`. Clones are
/// reused across calls and never deleted; a pinned commit missing from the
/// clone is fetched on demand before being checked out.
#[derive(Debug, Clone)]
pub struct SourceResolver<R = ProcessGitRunner> {
	runner: R,
	heartbeat_interval: Duration,
}

impl SourceResolver<ProcessGitRunner> {
	pub fn new() -> Self {
		Self::with_runner(ProcessGitRunner)
	}
}

impl Default for SourceResolver<ProcessGitRunner> {
	fn default() -> Self {
		Self::new()
	}
}

impl<R: GitRunner> SourceResolver<R> {
	pub fn with_runner(runner: R) -> Self {
		Self {
			runner,
			heartbeat_interval: HEARTBEAT_INTERVAL,
		}
	}

	/// Override how often slow git operations report that they are still
	/// running.
	#[must_use]
	pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
		self.heartbeat_interval = interval;
		self
	}

	pub fn runner(&self) -> &R {
		&self.runner
	}

	/// Make `source` available locally and return its root directory.
	///
	/// Failures are returned immediately without retrying. The error kind
	/// tells the caller whether a retry makes sense, see
	/// [`CorpusError::is_retryable`].
	pub fn resolve(
		&self,
		source: &SourceConfig,
		cache_dir: &Path,
		progress: Option<&dyn Progress>,
	) -> CorpusResult<PathBuf> {
		let root = source.root.trim();
		if root.is_empty() {
			return Err(CorpusError::Config(format!(
				"source {} root is required",
				source.name
			)));
		}

		if Path::new(root).is_absolute() {
			report(
				progress,
				format!("source {}: using local override root {root}", source.name),
			);
			return validate_local_root(&source.name, Path::new(root));
		}

		self.resolve_remote(source, root, cache_dir, progress)
	}

	fn resolve_remote(
		&self,
		source: &SourceConfig,
		root: &str,
		cache_dir: &Path,
		progress: Option<&dyn Progress>,
	) -> CorpusResult<PathBuf> {
		validate_remote_inputs(source, cache_dir)?;

		let remote = normalize_repository(&source.repository).map_err(|error| {
			CorpusError::Config(format!("source {} repository: {error}", source.name))
		})?;

		std::fs::create_dir_all(cache_dir).map_err(|error| {
			CorpusError::CacheDirCreate {
				path: cache_dir.to_path_buf(),
				source: error,
			}
		})?;

		let key = cache_key(&remote);
		let repo_dir = cache_dir.join(&key);
		report(
			progress,
			format!(
				"source {}: resolving repository in cache {}",
				source.name,
				repo_dir.display()
			),
		);

		let lock = cache_entry_lock(&cache_entry_lock_key(source, cache_dir, &key)?);
		let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

		self.ensure_repo_cached(source, &remote, &repo_dir, progress)?;
		self.ensure_pinned_commit(source, &remote, &repo_dir, progress)?;
		self.checkout_pinned_commit(source, &repo_dir, progress)?;

		let resolved_root = root
			.split('/')
			.filter(|segment| !segment.is_empty())
			.fold(repo_dir, |path, segment| path.join(segment));
		report(
			progress,
			format!(
				"source {}: validating root {}",
				source.name,
				resolved_root.display()
			),
		);

		validate_repo_root(source, root, &resolved_root)
	}

	fn ensure_repo_cached(
		&self,
		source: &SourceConfig,
		remote: &str,
		repo_dir: &Path,
		progress: Option<&dyn Progress>,
	) -> CorpusResult<()> {
		let git_dir = repo_dir.join(".git");
		let cached = git_dir.try_exists().map_err(|error| {
			CorpusError::CacheIo {
				name: source.name.clone(),
				path: git_dir.clone(),
				source: error,
			}
		})?;

		if cached {
			tracing::debug!(source = %source.name, repo_dir = %repo_dir.display(), "cache hit");
			report(progress, format!("source {}: cache hit for repository", source.name));
			return Ok(());
		}

		tracing::debug!(source = %source.name, %remote, "cache miss");
		let args = git_args(["clone", "--no-checkout", remote, &path_arg(repo_dir)]);
		run_with_heartbeat(
			progress,
			self.heartbeat_interval,
			&format!("source {}: cache miss, cloning repository", source.name),
			&format!("source {}: still cloning repository", source.name),
			|| self.runner.run(&args),
		)
		.map_err(|error| {
			classify_git_error(
				error,
				source,
				remote,
				format!("clone source {}", source.name),
			)
		})?;

		Ok(())
	}

	fn ensure_pinned_commit(
		&self,
		source: &SourceConfig,
		remote: &str,
		repo_dir: &Path,
		progress: Option<&dyn Progress>,
	) -> CorpusResult<()> {
		let commit = source.commit_sha.trim();
		if self.cached_commit_exists(repo_dir, commit) {
			report(
				progress,
				format!(
					"source {}: pinned commit {} already cached",
					source.name,
					short_commit(commit)
				),
			);
			return Ok(());
		}

		let args = git_args([
			"-C",
			&path_arg(repo_dir),
			"fetch",
			"--depth",
			"1",
			"origin",
			commit,
		]);
		run_with_heartbeat(
			progress,
			self.heartbeat_interval,
			&format!(
				"source {}: fetching pinned commit {}",
				source.name,
				short_commit(commit)
			),
			&format!(
				"source {}: still fetching pinned commit {}",
				source.name,
				short_commit(commit)
			),
			|| self.runner.run(&args),
		)
		.map_err(|error| {
			classify_git_error(
				error,
				source,
				remote,
				format!("fetch source {} commit {commit}", source.name),
			)
		})?;

		Ok(())
	}

	/// Probe for the commit object in the local clone.
	///
	/// Every probe failure counts as "not cached" so that the fetch runs.
	/// Failures that are not the usual unknown-object answer are logged
	/// because they can point at a damaged cache entry.
	fn cached_commit_exists(&self, repo_dir: &Path, commit: &str) -> bool {
		let args = git_args([
			"-C",
			&path_arg(repo_dir),
			"cat-file",
			"-e",
			&format!("{commit}^{{commit}}"),
		]);

		match self.runner.run(&args) {
			Ok(_) => true,
			Err(error) => {
				let text = error.to_string();
				if !is_unknown_object(&text) {
					tracing::warn!(
						repo_dir = %repo_dir.display(),
						%commit,
						error = %text,
						"commit probe failed unexpectedly, fetching anyway"
					);
				}
				false
			}
		}
	}

	fn checkout_pinned_commit(
		&self,
		source: &SourceConfig,
		repo_dir: &Path,
		progress: Option<&dyn Progress>,
	) -> CorpusResult<()> {
		let commit = source.commit_sha.trim();
		let args = git_args([
			"-C",
			&path_arg(repo_dir),
			"checkout",
			"--detach",
			"--force",
			commit,
		]);
		run_with_heartbeat(
			progress,
			self.heartbeat_interval,
			&format!(
				"source {}: checking out commit {}",
				source.name,
				short_commit(commit)
			),
			&format!(
				"source {}: still checking out commit {}",
				source.name,
				short_commit(commit)
			),
			|| self.runner.run(&args),
		)
		.map_err(|error| {
			CorpusError::GitCommand {
				context: format!("checkout source {} commit {commit}", source.name),
				source: error,
			}
		})?;

		Ok(())
	}
}

/// Resolve `source` with the `git` executable and no progress reporting.
pub fn resolve_source(source: &SourceConfig, cache_dir: &Path) -> CorpusResult<PathBuf> {
	SourceResolver::new().resolve(source, cache_dir, None)
}

/// Turn the accepted repository spellings into a canonical clone url.
///
/// SSH remotes are kept as written, http(s) urls gain a `.git` suffix and
/// `github.com/owner/repo` or bare `owner/repo` shorthands expand to GitHub
/// https urls. Anything else is passed to git untouched.
pub fn normalize_repository(repository: &str) -> CorpusResult<String> {
	let repo = repository.trim();
	if repo.is_empty() {
		return Err(CorpusError::Config("repository is required".to_string()));
	}

	if repo.starts_with("git@") || repo.starts_with("ssh://") {
		return Ok(repo.to_string());
	}

	if repo.starts_with("http://") || repo.starts_with("https://") {
		let trimmed = repo.trim_end_matches('/');
		if trimmed.ends_with(".git") {
			return Ok(trimmed.to_string());
		}
		return Ok(format!("{trimmed}.git"));
	}

	if repo.starts_with("github.com/") {
		return Ok(format!("https://{}.git", repo.trim_end_matches('/')));
	}

	if repo.contains('/') && !Path::new(repo).is_absolute() && !repo.starts_with('.') {
		let slug = repo.trim_end_matches('/').trim_start_matches('/');
		return Ok(format!("https://github.com/{slug}.git"));
	}

	Ok(repo.to_string())
}

/// The cache directory name for a normalized remote: the first 8 bytes of
/// the SHA-256 of the trimmed, lower-cased url as 16 hex characters.
pub fn cache_key(remote: &str) -> String {
	let digest = Sha256::digest(remote.trim().to_lowercase().as_bytes());
	hex::encode(&digest[..8])
}

/// Map clone and fetch failures onto the error kinds callers act on.
///
/// Matching is a case-insensitive substring search over git's combined
/// output only. The command line is left out because it carries the remote
/// and cache paths. Unrecognized failures are kept as
/// [`CorpusError::GitCommand`].
pub fn classify_git_error(
	error: GitCommandError,
	source: &SourceConfig,
	remote: &str,
	context: String,
) -> CorpusError {
	let text = match &error {
		GitCommandError::Failed { output, .. } => output.to_lowercase(),
		GitCommandError::Spawn(io_error) => io_error.to_string().to_lowercase(),
	};
	let matches_any = |patterns: &[&str]| patterns.iter().any(|pattern| text.contains(pattern));

	if matches_any(&["repository not found", "could not read from remote repository"]) {
		return CorpusError::RepositoryNotFound {
			name: source.name.clone(),
			remote: remote.to_string(),
		};
	}

	if matches_any(&["couldn't find remote ref", "not our ref"]) {
		return CorpusError::CommitNotFound {
			name: source.name.clone(),
			commit: source.commit_sha.trim().to_string(),
		};
	}

	if matches_any(&["failed to connect", "timed out", "could not resolve host"]) {
		return CorpusError::Network {
			name: source.name.clone(),
			remote: remote.to_string(),
		};
	}

	CorpusError::GitCommand {
		context,
		source: error,
	}
}

fn is_unknown_object(text: &str) -> bool {
	text.contains("Not a valid object name")
		|| text.contains("invalid object")
		|| text.contains("unknown revision")
}

fn validate_remote_inputs(source: &SourceConfig, cache_dir: &Path) -> CorpusResult<()> {
	if source.repository.trim().is_empty() {
		return Err(CorpusError::Config(format!(
			"source {} repository is required",
			source.name
		)));
	}

	if source.commit_sha.trim().is_empty() {
		return Err(CorpusError::Config(format!(
			"source {} commit_sha is required",
			source.name
		)));
	}

	if cache_dir.to_string_lossy().trim().is_empty() {
		return Err(CorpusError::Config(
			"cache directory is required".to_string(),
		));
	}

	Ok(())
}

fn validate_local_root(name: &str, root: &Path) -> CorpusResult<PathBuf> {
	match std::fs::metadata(root) {
		Ok(_) => Ok(clean_path(root)),
		Err(error) if error.kind() == ErrorKind::NotFound => {
			Err(CorpusError::LocalRootNotFound {
				name: name.to_string(),
				root: root.to_path_buf(),
			})
		}
		Err(error) => {
			Err(CorpusError::LocalRootIo {
				name: name.to_string(),
				root: root.to_path_buf(),
				source: error,
			})
		}
	}
}

fn validate_repo_root(
	source: &SourceConfig,
	root: &str,
	resolved_root: &Path,
) -> CorpusResult<PathBuf> {
	match std::fs::metadata(resolved_root) {
		Ok(_) => Ok(clean_path(resolved_root)),
		Err(error) if error.kind() == ErrorKind::NotFound => {
			Err(CorpusError::RootNotFoundInCommit {
				name: source.name.clone(),
				root: root.to_string(),
				commit: source.commit_sha.trim().to_string(),
			})
		}
		Err(error) => {
			Err(CorpusError::RootIo {
				name: source.name.clone(),
				path: resolved_root.to_path_buf(),
				source: error,
			})
		}
	}
}

/// Lexically normalize a path: drop `.` segments, fold `..` into the
/// preceding segment and collapse repeated separators.
pub(crate) fn clean_path(path: &Path) -> PathBuf {
	let mut cleaned = PathBuf::new();
	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				let last_is_normal =
					matches!(cleaned.components().next_back(), Some(Component::Normal(_)));
				if last_is_normal {
					cleaned.pop();
				} else if !cleaned.has_root() {
					cleaned.push(component);
				}
			}
			other => cleaned.push(other),
		}
	}

	if cleaned.as_os_str().is_empty() {
		PathBuf::from(".")
	} else {
		cleaned
	}
}

/// The lock registry key for one cache entry. The cache directory is
/// canonicalized so every spelling of it maps to the same lock.
pub(crate) fn cache_entry_lock_key(
	source: &SourceConfig,
	cache_dir: &Path,
	key: &str,
) -> CorpusResult<PathBuf> {
	let canonical = std::fs::canonicalize(cache_dir).map_err(|error| {
		CorpusError::CacheIo {
			name: source.name.clone(),
			path: cache_dir.to_path_buf(),
			source: error,
		}
	})?;

	Ok(canonical.join(key))
}

/// Process-wide lock for one cache entry.
///
/// Two resolves of the same remote would otherwise interleave clone, fetch
/// and checkout inside one working tree. Other processes sharing the cache
/// directory are not covered. Entries nobody holds are pruned on every call.
pub(crate) fn cache_entry_lock(entry: &Path) -> Arc<Mutex<()>> {
	static LOCKS: LazyLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
		LazyLock::new(|| Mutex::new(HashMap::new()));

	let mut locks = LOCKS.lock().unwrap_or_else(PoisonError::into_inner);
	locks.retain(|_, lock| Arc::strong_count(lock) > 1);
	Arc::clone(locks.entry(entry.to_path_buf()).or_default())
}

fn short_commit(commit: &str) -> &str {
	commit.get(..8).unwrap_or(commit)
}

fn path_arg(path: &Path) -> String {
	path.to_string_lossy().into_owned()
}

fn git_args<const N: usize>(args: [&str; N]) -> Vec<String> {
	args.into_iter().map(str::to_string).collect()
}
