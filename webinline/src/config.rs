use miette::{Context, IntoDiagnostic};
use serde_derive::Deserialize;
use std::{fs, path::Path};
use webinline_core::compose::PlaceholderMode;

pub const DEFAULT_CONFIG_FILE: &str = "webinline.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
	pub placeholders: Option<PlaceholderMode>,
	pub format: Option<ReportFormat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ReportFormat {
	Text,
	Json,
}

impl Default for ReportFormat {
	fn default() -> Self {
		Self::Text
	}
}

/// Settings for one `compile` run after the config file and flags are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileSettings {
	pub placeholders: PlaceholderMode,
	pub format: ReportFormat,
}

impl Config {
	/// Reads `path`, or [`DEFAULT_CONFIG_FILE`] when no path was given. Only the
	/// default file is allowed to be missing.
	pub fn load(path: Option<&Path>) -> miette::Result<Self> {
		let config_file = path
			.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE))
			.canonicalize();

		match config_file {
			Err(_) if path.is_none() => Ok(Config::default()),
			Err(error) => Err(error)
				.into_diagnostic()
				.wrap_err("Failed to find config file"),
			Ok(config_file) => toml::from_str(
				&fs::read_to_string(&config_file)
					.into_diagnostic()
					.wrap_err("Failed to read config file")?,
			)
			.into_diagnostic()
			.wrap_err_with(|| format!("Failed to parse config file {}", config_file.display())),
		}
	}
}

impl From<Config> for CompileSettings {
	fn from(config: Config) -> Self {
		Self {
			placeholders: config.placeholders.unwrap_or_default(),
			format: config.format.unwrap_or_default(),
		}
	}
}

impl CompileSettings {
	/// Command line flags win over the config file.
	pub fn with_flags(mut self, strict_placeholders: bool, format: Option<ReportFormat>) -> Self {
		if strict_placeholders {
			self.placeholders = PlaceholderMode::Strict;
		}
		if let Some(format) = format {
			self.format = format;
		}
		self
	}
}
