mod common;

use std::path::Path;

use mdcorpus_cli::Commands;
use mdcorpus_cli::MdcorpusCli;
use mdcorpus_core::AnyEmptyResult;

fn write_config(dir: &Path, content: &str) -> AnyEmptyResult {
	std::fs::write(dir.join("mdcorpus.toml"), content)?;
	Ok(())
}

fn local_source(name: &str, root: &Path) -> String {
	format!("[[sources]]\nname = \"{name}\"\nroot = '{}'\n", root.display())
}

#[test]
fn resolve_prints_local_override_roots() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let docs = tmp.path().join("docs");
	let guides = tmp.path().join("guides");
	std::fs::create_dir_all(&docs)?;
	std::fs::create_dir_all(&guides)?;
	write_config(
		tmp.path(),
		&format!(
			"{}\n{}",
			local_source("docs", &docs),
			local_source("guides", &guides)
		),
	)?;

	common::mdcorpus_cmd()
		.arg("resolve")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains(format!("docs\t{}", docs.display())))
		.stdout(predicates::str::contains(format!(
			"guides\t{}",
			guides.display()
		)))
		.stderr(predicates::str::contains("using local override root"));

	Ok(())
}

#[test]
fn resolve_only_selected_sources() -> AnyEmptyResult {
	use predicates::prelude::PredicateBooleanExt;

	let tmp = tempfile::tempdir()?;
	let docs = tmp.path().join("docs");
	std::fs::create_dir_all(&docs)?;
	write_config(
		tmp.path(),
		&format!(
			"{}\n{}",
			local_source("docs", &docs),
			local_source("missing", &tmp.path().join("missing"))
		),
	)?;

	common::mdcorpus_cmd()
		.arg("resolve")
		.arg("--source")
		.arg("docs")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("docs\t"))
		.stdout(predicates::str::contains("missing").not());

	Ok(())
}

#[test]
fn resolve_fails_for_missing_local_root() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_config(
		tmp.path(),
		&local_source("missing", &tmp.path().join("missing")),
	)?;

	common::mdcorpus_cmd()
		.arg("resolve")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.failure()
		.code(2)
		.stderr(predicates::str::contains("mdcorpus::local_root_not_found"));

	Ok(())
}

#[test]
fn resolve_fails_for_unknown_source() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let docs = tmp.path().join("docs");
	std::fs::create_dir_all(&docs)?;
	write_config(tmp.path(), &local_source("docs", &docs))?;

	common::mdcorpus_cmd()
		.arg("resolve")
		.arg("--source")
		.arg("nope")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.failure()
		.code(2)
		.stderr(predicates::str::contains("unknown source `nope`"));

	Ok(())
}

#[test]
fn resolve_requires_a_config_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::mdcorpus_cmd()
		.arg("resolve")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.failure()
		.code(2)
		.stderr(predicates::str::contains("no mdcorpus.toml found"));

	Ok(())
}

#[test]
fn resolve_reports_invalid_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_config(
		tmp.path(),
		"[curation]\nmax_readme_share = 1.5\n",
	)?;

	common::mdcorpus_cmd()
		.arg("resolve")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.failure()
		.code(2)
		.stderr(predicates::str::contains("mdcorpus::config_parse"));

	Ok(())
}

#[test]
fn resolve_warns_when_no_sources_are_configured() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_config(tmp.path(), "cache_dir = \"cache\"\n")?;

	common::mdcorpus_cmd()
		.arg("resolve")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::is_empty())
		.stderr(predicates::str::contains("no sources configured"));

	Ok(())
}

#[test]
fn resolve_accepts_repeated_source_flags() {
	use clap::Parser;

	let cli = MdcorpusCli::parse_from([
		"mdcorpus",
		"resolve",
		"--source",
		"docs",
		"-s",
		"guides",
		"--cache-dir",
		"/tmp/cache",
	]);
	match cli.command {
		Some(Commands::Resolve { cache_dir, sources }) => {
			assert_eq!(sources, ["docs", "guides"]);
			assert_eq!(cache_dir.as_deref(), Some(Path::new("/tmp/cache")));
		}
		_ => panic!("expected Resolve command"),
	}

	let cli = MdcorpusCli::parse_from(["mdcorpus", "resolve"]);
	match cli.command {
		Some(Commands::Resolve { cache_dir, sources }) => {
			assert!(sources.is_empty());
			assert!(cache_dir.is_none());
		}
		_ => panic!("expected Resolve command"),
	}
}
