use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::CorpusError;
use crate::CorpusResult;
use crate::curate::CurationOptions;
use crate::resolver::SourceConfig;

/// Config file names looked up under a project root, in priority order.
pub const CONFIG_FILE_CANDIDATES: &[&str] =
	&["mdcorpus.toml", ".mdcorpus.toml", ".config/mdcorpus.toml"];

/// Cache directory used when the config does not name one.
pub const DEFAULT_CACHE_DIR: &str = ".mdcorpus/cache";

/// Configuration loaded from `mdcorpus.toml`.
///
/// ```toml
/// cache_dir = ".mdcorpus/cache"
///
/// [[sources]]
/// name = "widgets"
/// repository = "acme/widgets"
/// commit_sha = "0123456789abcdef0123456789abcdef01234567"
/// root = "docs"
///
/// [curation]
/// near_duplicate_threshold = 0.9
/// max_readme_share = 0.2
///
/// [curation.balance.docs]
/// min = 0.1
/// max = 0.5
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct CorpusConfig {
	/// Directory holding cached clones. Relative paths are resolved against
	/// the project root.
	#[serde(default)]
	pub cache_dir: Option<PathBuf>,
	/// Sources to resolve, in the order they are listed.
	#[serde(default)]
	pub sources: Vec<SourceConfig>,
	/// Filtering applied to the collected records.
	#[serde(default)]
	pub curation: CurationOptions,
}

impl CorpusConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load and validate the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> CorpusResult<Option<CorpusConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::from_toml(&content)?;
		tracing::debug!(
			path = %config_path.display(),
			sources = config.sources.len(),
			"loaded corpus config"
		);

		Ok(Some(config))
	}

	/// Parse and validate config content.
	pub fn from_toml(content: &str) -> CorpusResult<CorpusConfig> {
		let config: CorpusConfig =
			toml::from_str(content).map_err(|e| CorpusError::ConfigParse(e.to_string()))?;
		config.validate()?;

		Ok(config)
	}

	/// The absolute cache directory for a config loaded from `root`.
	pub fn cache_dir(&self, root: &Path) -> PathBuf {
		let dir = self
			.cache_dir
			.clone()
			.unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR));

		if dir.is_absolute() {
			dir
		} else {
			root.join(dir)
		}
	}

	/// Look up a source by name.
	pub fn source(&self, name: &str) -> Option<&SourceConfig> {
		self.sources.iter().find(|source| source.name == name)
	}

	/// Check values serde cannot: unique source names and shares in `[0, 1]`.
	pub fn validate(&self) -> CorpusResult<()> {
		let mut names = HashSet::new();
		for source in &self.sources {
			if source.name.trim().is_empty() {
				return Err(CorpusError::ConfigParse(
					"every source needs a non-empty `name`".to_string(),
				));
			}
			if !names.insert(source.name.as_str()) {
				return Err(CorpusError::ConfigParse(format!(
					"duplicate source name `{}`",
					source.name
				)));
			}
		}

		let curation = &self.curation;
		if let Some(threshold) = curation.near_duplicate_threshold {
			ensure_share("curation.near_duplicate_threshold", threshold)?;
		}
		if let Some(share) = curation.max_readme_share {
			ensure_share("curation.max_readme_share", share)?;
		}
		for (category, range) in &curation.balance {
			ensure_share(&format!("curation.balance.{category}.min"), range.min)?;
			ensure_share(&format!("curation.balance.{category}.max"), range.max)?;
			if range.min > range.max {
				return Err(CorpusError::ConfigParse(format!(
					"curation.balance.{category}: min {} is greater than max {}",
					range.min, range.max
				)));
			}
		}

		Ok(())
	}
}

fn ensure_share(key: &str, value: f64) -> CorpusResult<()> {
	if (0.0..=1.0).contains(&value) {
		return Ok(());
	}

	Err(CorpusError::ConfigParse(format!(
		"`{key}` must be between 0 and 1, got {value}"
	)))
}
