use std::path::Path;
use std::process::Command;

use mdcorpus_core::AnyEmptyResult;
use mdcorpus_core::AnyResult;
use mdcorpus_core::CorpusError;
use mdcorpus_core::SourceConfig;
use mdcorpus_core::SourceResolver;
use mdcorpus_core::cache_key;
use mdcorpus_core::resolve_source;

fn git_available() -> bool {
	Command::new("git")
		.arg("--version")
		.output()
		.is_ok_and(|output| output.status.success())
}

fn git(dir: &Path, args: &[&str]) -> AnyResult<String> {
	let output = Command::new("git")
		.arg("-C")
		.arg(dir)
		.args([
			"-c",
			"user.name=mdcorpus",
			"-c",
			"user.email=mdcorpus@example.com",
			"-c",
			"commit.gpgsign=false",
		])
		.args(args)
		.output()?;

	if !output.status.success() {
		return Err(String::from_utf8_lossy(&output.stderr).into_owned().into());
	}

	Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn commit_all(dir: &Path, message: &str) -> AnyResult<String> {
	git(dir, &["add", "."])?;
	git(dir, &["commit", "--quiet", "-m", message])?;
	git(dir, &["rev-parse", "HEAD"])
}

#[test]
fn resolves_pinned_commits_from_a_local_remote() -> AnyEmptyResult {
	if !git_available() {
		return Ok(());
	}

	let tmp = tempfile::tempdir()?;
	let origin = tmp.path().join("origin");
	std::fs::create_dir_all(origin.join("docs"))?;
	git(&origin, &["init", "--quiet"])?;

	std::fs::write(origin.join("docs/intro.md"), "# Intro\n")?;
	let first = commit_all(&origin, "first")?;

	std::fs::write(origin.join("docs/intro.md"), "# Intro\n\nUpdated.\n")?;
	std::fs::create_dir_all(origin.join("guides"))?;
	std::fs::write(origin.join("guides/setup.md"), "# Setup\n")?;
	let second = commit_all(&origin, "second")?;

	let cache_dir = tmp.path().join("cache");
	let repository = origin.to_string_lossy().into_owned();
	let resolver = SourceResolver::new();

	let root = resolve_source(
		&SourceConfig::remote("origin", &repository, &first, "docs"),
		&cache_dir,
	)?;
	assert_eq!(root, cache_dir.join(cache_key(&repository)).join("docs"));
	assert_eq!(std::fs::read_to_string(root.join("intro.md"))?, "# Intro\n");

	let error = resolver
		.resolve(
			&SourceConfig::remote("origin", &repository, &first, "guides"),
			&cache_dir,
			None,
		)
		.unwrap_err();
	assert!(matches!(error, CorpusError::RootNotFoundInCommit { .. }));

	let root = resolver.resolve(
		&SourceConfig::remote("origin", &repository, &second, "docs"),
		&cache_dir,
		None,
	)?;
	assert_eq!(
		std::fs::read_to_string(root.join("intro.md"))?,
		"# Intro\n\nUpdated.\n"
	);
	assert!(root.parent().is_some_and(|repo| repo.join("guides/setup.md").is_file()));

	Ok(())
}
