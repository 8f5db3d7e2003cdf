use std::path::Path;
use std::sync::Mutex;
use std::sync::PoisonError;

use crate::Category;
use crate::CollectedRecord;
use crate::GitCommandError;
use crate::GitRunner;

type Responder = dyn Fn(&[String]) -> Result<String, GitCommandError> + Send + Sync;

/// A git runner that records every invocation and answers from a closure.
pub(crate) struct FakeGitRunner {
	calls: Mutex<Vec<Vec<String>>>,
	respond: Box<Responder>,
}

impl FakeGitRunner {
	pub(crate) fn new(
		respond: impl Fn(&[String]) -> Result<String, GitCommandError> + Send + Sync + 'static,
	) -> Self {
		Self {
			calls: Mutex::new(Vec::new()),
			respond: Box::new(respond),
		}
	}

	/// Behaves like a real remote holding `tree`: cloning creates `.git` and
	/// every listed directory, the commit probe reports an unknown object and
	/// fetch and checkout succeed.
	pub(crate) fn simulated(tree: &'static [&'static str]) -> Self {
		Self::new(move |args| simulate_git(args, tree))
	}

	pub(crate) fn calls(&self) -> Vec<Vec<String>> {
		self.calls
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}

	/// The git subcommand of every call, skipping any `-C <dir>` prefix.
	pub(crate) fn subcommands(&self) -> Vec<String> {
		self.calls()
			.iter()
			.map(|args| subcommand(args).to_string())
			.collect()
	}
}

impl GitRunner for FakeGitRunner {
	fn run(&self, args: &[String]) -> Result<String, GitCommandError> {
		self.calls
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.push(args.to_vec());
		(self.respond)(args)
	}
}

pub(crate) fn subcommand(args: &[String]) -> &str {
	if args.first().is_some_and(|arg| arg == "-C") {
		args.get(2).map_or("", String::as_str)
	} else {
		args.first().map_or("", String::as_str)
	}
}

pub(crate) fn simulate_git(
	args: &[String],
	tree: &[&str],
) -> Result<String, GitCommandError> {
	match subcommand(args) {
		"clone" => {
			let repo_dir = Path::new(&args[3]);
			std::fs::create_dir_all(repo_dir.join(".git"))?;
			for dir in tree {
				std::fs::create_dir_all(repo_dir.join(dir))?;
			}
			Ok(format!("Cloning into '{}'...\n", repo_dir.display()))
		}
		"cat-file" => {
			Err(git_failure(
				args,
				&format!("fatal: Not a valid object name {}", args[4]),
			))
		}
		_ => Ok(String::new()),
	}
}

pub(crate) fn git_failure(args: &[String], output: &str) -> GitCommandError {
	GitCommandError::failed(args, "status 128", output)
}

pub(crate) const COMMIT_A: &str = "0123456789abcdef0123456789abcdef01234567";
pub(crate) const COMMIT_B: &str = "89abcdef0123456789abcdef0123456789abcdef";

pub(crate) fn record(id: &str, content_sha256: &str, category: Category) -> CollectedRecord {
	CollectedRecord {
		record_id: id.to_string(),
		content_sha256: content_sha256.to_string(),
		token_set: crate::tokenize(id),
		category,
		is_readme: false,
	}
}

pub(crate) fn record_with_tokens(id: &str, tokens: &[&str]) -> CollectedRecord {
	CollectedRecord {
		record_id: id.to_string(),
		content_sha256: crate::sha256_hex(id.as_bytes()),
		token_set: tokens.iter().map(|token| (*token).to_string()).collect(),
		category: Category::Docs,
		is_readme: false,
	}
}

pub(crate) fn doc(id: &str) -> CollectedRecord {
	record(id, &crate::sha256_hex(id.as_bytes()), Category::Docs)
}

pub(crate) fn code(id: &str) -> CollectedRecord {
	record(id, &crate::sha256_hex(id.as_bytes()), Category::Code)
}

pub(crate) fn readme(id: &str) -> CollectedRecord {
	CollectedRecord {
		is_readme: true,
		..record(id, &crate::sha256_hex(id.as_bytes()), Category::Readme)
	}
}

pub(crate) fn strings(items: &[&str]) -> Vec<String> {
	items.iter().map(|item| (*item).to_string()).collect()
}

pub(crate) fn ids(records: &[CollectedRecord]) -> Vec<&str> {
	records
		.iter()
		.map(|record| record.record_id.as_str())
		.collect()
}
