use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use mdcorpus_cli::Commands;
use mdcorpus_cli::MdcorpusCli;
use mdcorpus_core::CorpusConfig;
use mdcorpus_core::CorpusError;
use mdcorpus_core::Progress;
use mdcorpus_core::SourceConfig;
use mdcorpus_core::SourceResolver;
use mdcorpus_core::cache_key;
use mdcorpus_core::normalize_repository;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

/// Environment variable holding `tracing` filter directives.
const LOG_ENV: &str = "MDCORPUS_LOG";

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = MdcorpusCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match &args.command {
		Some(Commands::Resolve { cache_dir, sources }) => {
			run_resolve(&args, cache_dir.as_deref(), sources)
		}
		Some(Commands::CacheKey { repository }) => run_cache_key(repository),
		Some(Commands::Info) => run_info(&args),
		None => {
			eprintln!("No subcommand specified. Run `mdcorpus --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Render corpus errors through miette so codes and help text show.
		match e.downcast::<CorpusError>() {
			Ok(corpus_err) => {
				let report: miette::Report = (*corpus_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr. `MDCORPUS_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_directives = if verbose { "mdcorpus_core=debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directives));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.try_init()
		.ok();
}

/// Prints resolver progress to stderr.
struct StderrProgress;

impl Progress for StderrProgress {
	fn notify(&self, message: &str) {
		eprintln!("{} {message}", colored!("::", green));
	}
}

fn resolve_root(args: &MdcorpusCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn print_section(title: &str) {
	println!();
	println!("{}", colored!(title, bold));
}

fn print_field(label: &str, value: impl std::fmt::Display) {
	println!("{label:<20} {value}");
}

fn load_config(root: &Path) -> Result<CorpusConfig, Box<dyn std::error::Error>> {
	CorpusConfig::load(root)?.ok_or_else(|| {
		format!(
			"no mdcorpus.toml found in {}. Run with `--path` to point at the project root.",
			root.display()
		)
		.into()
	})
}

fn select_sources<'a>(
	config: &'a CorpusConfig,
	names: &[String],
) -> Result<Vec<&'a SourceConfig>, Box<dyn std::error::Error>> {
	if names.is_empty() {
		return Ok(config.sources.iter().collect());
	}

	let mut selected = Vec::with_capacity(names.len());
	for name in names {
		let Some(source) = config.source(name) else {
			return Err(format!("unknown source `{name}`").into());
		};
		selected.push(source);
	}

	Ok(selected)
}

fn run_resolve(
	args: &MdcorpusCli,
	cache_dir: Option<&Path>,
	names: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = load_config(&root)?;
	let sources = select_sources(&config, names)?;

	if sources.is_empty() {
		eprintln!("{} no sources configured", colored!("warning:", yellow));
		return Ok(());
	}

	let cache_dir = cache_dir.map_or_else(|| config.cache_dir(&root), Path::to_path_buf);
	let resolver = SourceResolver::new();
	for source in sources {
		let local_root = resolver.resolve(source, &cache_dir, Some(&StderrProgress))?;
		println!("{}\t{}", source.name, local_root.display());
	}

	Ok(())
}

fn run_cache_key(repository: &str) -> Result<(), Box<dyn std::error::Error>> {
	let remote = normalize_repository(repository)?;
	let key = cache_key(&remote);

	print_field("remote", &remote);
	print_field("cache key", key);

	Ok(())
}

fn run_info(args: &MdcorpusCli) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config_path = CorpusConfig::resolve_path(&root);
	let config = CorpusConfig::load(&root)?.unwrap_or_default();

	print_section("Project");
	print_field("root", root.display());
	print_field(
		"config",
		config_path.map_or_else(|| "(none)".to_string(), |path| path.display().to_string()),
	);
	print_field("cache dir", config.cache_dir(&root).display());

	print_section("Sources");
	if config.sources.is_empty() {
		println!("(none)");
	}
	for source in &config.sources {
		let location = if source.is_local_override() {
			format!("local override {}", source.root)
		} else {
			let remote = normalize_repository(&source.repository)
				.unwrap_or_else(|_| source.repository.clone());
			let commit = source.commit_sha.get(..12).unwrap_or(&source.commit_sha);
			format!("{remote}@{commit} {}", source.root)
		};
		print_field(&source.name, location);
	}

	let curation = &config.curation;
	print_section("Curation");
	print_field(
		"near duplicates",
		curation
			.near_duplicate_threshold
			.map_or_else(|| "off".to_string(), |threshold| format!("jaccard >= {threshold}")),
	);
	print_field(
		"readme share",
		curation
			.max_readme_share
			.map_or_else(|| "uncapped".to_string(), |share| format!("<= {share}")),
	);
	for (category, range) in &curation.balance {
		print_field(
			&format!("balance {category}"),
			format!("[{}, {}]", range.min, range.max),
		);
	}

	Ok(())
}
