use crate::{asset::AssetKind, build::BuildStage};
use std::result::Result as StdResult;
use thiserror::Error;

pub type Result<T> = StdResult<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
	#[error("{kind} file not found: {}", path.display())]
	AssetNotFound {
		kind: AssetKind,
		path: std::path::PathBuf,
	},
	#[error("{message}")]
	AssetReadError {
		message: String,
		source: std::io::Error,
	},
	#[error("{message}")]
	AssetWriteError {
		message: String,
		source: std::io::Error,
	},
	#[error("failed to minify {kind}: {message}")]
	MinificationError { kind: AssetKind, message: String },
	#[error("minifier unavailable: {0}")]
	CapabilityUnavailable(String),
	#[error("{0}")]
	Placeholder(String),
	#[error("build failed while {stage}")]
	Stage {
		stage: BuildStage,
		#[source]
		source: Box<Error>,
	},
	#[error("set global default error")]
	TraceSetGlobalDefault(#[from] tracing::subscriber::SetGlobalDefaultError),
}

impl Error {
	/// The error that started the failure, with any stage context removed.
	pub fn root(&self) -> &Error {
		match self {
			Self::Stage { source, .. } => source.root(),
			error => error,
		}
	}

	/// The pipeline stage the failure happened in, if the orchestrator saw it.
	pub fn stage(&self) -> Option<BuildStage> {
		match self {
			Self::Stage { stage, .. } => Some(*stage),
			_ => None,
		}
	}
}

#[macro_export]
macro_rules! map_err {
	(
		@map_err_core
		$expr:expr,
		$variant:ident $msg:literal
	) => {
		$expr.map_err(
			#[inline]
			|error| Error::$variant {
				message: $msg.into(),
				source: error,
			}
		)
	};
	(
		@map_err_core
		$expr:expr,
		$variant:ident $msg:expr
	) => {
		$expr.map_err(
			#[inline]
			|error| Error::$variant {
				message: $msg,
				source: error,
			}
		)
	};
	(
		$expr:expr,
		$variant:ident($msg:literal)$(,)?
	) => {
		map_err!(
			@map_err_core
			$expr,
			$variant $msg
		)
	};
	(
		$expr:expr,
		$variant:ident($msg:expr)$(,)?
	) => {
		map_err!(
			@map_err_core
			$expr,
			$variant $msg
		)
	};
}

#[macro_export]
macro_rules! err {
	($variant:ident($msg:literal)) => {
		Error::$variant($msg.into())
	};
	($variant:ident($msg:expr)) => {
		Error::$variant($msg)
	};
}
