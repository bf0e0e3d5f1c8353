use crate::{
	error::{Error, Result},
	map_err,
};
use serde_derive::Serialize;
use std::{
	fmt,
	fs::{self, File},
	io::{ErrorKind, Write},
	path::{Path, PathBuf},
};
use tracing::instrument;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetKind {
	Html,
	Css,
	Js,
}

impl fmt::Display for AssetKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Html => "HTML",
			Self::Css => "CSS",
			Self::Js => "JavaScript",
		})
	}
}

/// A source file as read from disk. Never modified after loading.
#[derive(Clone, Debug)]
pub struct SourceAsset {
	pub kind: AssetKind,
	pub path: PathBuf,
	pub raw_text: String,
	pub byte_size: usize,
}

/// Reads `path` as UTF-8.
///
/// A missing file is reported as [`Error::AssetNotFound`] so the caller can tell a
/// misconfigured build apart from an unreadable file.
#[instrument(level = "debug")]
pub fn load(kind: AssetKind, path: &Path) -> Result<SourceAsset> {
	let raw_text = match fs::read_to_string(path) {
		Ok(raw_text) => raw_text,
		Err(error) if error.kind() == ErrorKind::NotFound => {
			return Err(Error::AssetNotFound {
				kind,
				path: path.to_path_buf(),
			})
		}
		Err(error) => {
			return map_err!(
				Err(error),
				AssetReadError(format!("failed to read {kind} file {}", path.display())),
			)
		}
	};

	tracing::debug!(%kind, bytes = raw_text.len(), "loaded asset");

	Ok(SourceAsset {
		kind,
		path: path.to_path_buf(),
		byte_size: raw_text.len(),
		raw_text,
	})
}

/// Creates or truncates `path` and writes `text` to it as UTF-8.
#[instrument(level = "debug", skip(text))]
pub fn write(path: &Path, text: &str) -> Result<()> {
	let mut file = map_err!(
		File::create(path),
		AssetWriteError(format!("failed to create {}", path.display())),
	)?;

	map_err!(
		file.write_all(text.as_bytes()),
		AssetWriteError(format!("failed to write to {}", path.display())),
	)?;

	Ok(())
}
