mod common;

use mdcorpus_core::AnyEmptyResult;

#[test]
fn info_without_config_uses_defaults() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let default_cache = tmp.path().join(".mdcorpus/cache").display().to_string();

	common::mdcorpus_cmd()
		.arg("info")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("(none)"))
		.stdout(predicates::str::contains(default_cache));

	Ok(())
}

#[test]
fn info_resolves_dot_config_mdcorpus_toml() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir_all(tmp.path().join(".config"))?;
	std::fs::write(
		tmp.path().join(".config/mdcorpus.toml"),
		"cache_dir = \"corpus-cache\"\n",
	)?;

	let expected_path = tmp.path().join(".config/mdcorpus.toml").display().to_string();
	let expected_cache = tmp.path().join("corpus-cache").display().to_string();

	common::mdcorpus_cmd()
		.arg("info")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains(expected_path))
		.stdout(predicates::str::contains(expected_cache));

	Ok(())
}

#[test]
fn info_lists_sources_and_curation() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("mdcorpus.toml"),
		r#"
[[sources]]
name = "widgets"
repository = "acme/widgets"
commit_sha = "0123456789abcdef0123456789abcdef01234567"
root = "docs"

[curation]
near_duplicate_threshold = 0.9

[curation.balance.docs]
max = 0.5
"#,
	)?;

	common::mdcorpus_cmd()
		.arg("info")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains(
			"https://github.com/acme/widgets.git@0123456789ab docs",
		))
		.stdout(predicates::str::contains("jaccard >= 0.9"))
		.stdout(predicates::str::contains("uncapped"))
		.stdout(predicates::str::contains("[0, 0.5]"));

	Ok(())
}
