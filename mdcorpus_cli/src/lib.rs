use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Resolve pinned corpus sources into a local clone cache.",
	long_about = "mdcorpus acquires the markdown corpus used to tune lint rules. Every source \
	              is a repository pinned to an exact commit, or a local directory override. \
	              Remote sources are cloned once into a content-addressed cache and checked \
	              out at their pinned commit.\n\nQuick start:\n  mdcorpus info       Show the \
	              loaded config and sources\n  mdcorpus resolve    Resolve every source to a \
	              local root\n  mdcorpus cache-key  Print the cache key of a repository"
)]
pub struct MdcorpusCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Resolve configured sources to local directories.
	///
	/// Remote sources are cloned into the cache on first use, fetched when
	/// the pinned commit is missing and checked out at that commit. Local
	/// overrides are validated in place. Prints one `name<TAB>root` line per
	/// source. Progress is written to stderr.
	Resolve {
		/// Override the cache directory from the config file.
		#[arg(long)]
		cache_dir: Option<PathBuf>,

		/// Resolve only the named source. Repeat to select several.
		#[arg(long = "source", short)]
		sources: Vec<String>,
	},
	/// Print the normalized remote and cache key for a repository.
	///
	/// Accepts the same forms a source config does: `owner/name` shorthand,
	/// full URLs and local paths.
	CacheKey {
		/// Repository reference to normalize.
		repository: String,
	},
	/// Print the discovered config file, cache directory and sources.
	Info,
}
