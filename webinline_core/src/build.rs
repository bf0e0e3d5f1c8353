use crate::{
	asset::{self, AssetKind},
	compose::{compose, PlaceholderMode},
	error::{Error, Result},
	minify::{HtmlMinifyOptions, Minifier},
	report::{BuildReport, CombinedDocument, MinificationResult},
};
use std::{fmt, path::PathBuf};
use tracing::instrument;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildStage {
	Loading,
	MinifyingAssets,
	Composing,
	MinifyingFinal,
	Writing,
}

impl fmt::Display for BuildStage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Loading => "loading assets",
			Self::MinifyingAssets => "minifying assets",
			Self::Composing => "composing",
			Self::MinifyingFinal => "minifying the combined document",
			Self::Writing => "writing output",
		})
	}
}

#[derive(Clone, Debug)]
pub struct BuildRequest {
	pub html_path: PathBuf,
	pub css_path: PathBuf,
	pub js_path: PathBuf,
	pub output_path: PathBuf,
}

/// Turns an HTML template, a stylesheet and a script into one self-contained document.
pub struct Pipeline<M> {
	minifier: M,
	html_options: HtmlMinifyOptions,
	placeholders: PlaceholderMode,
}

impl<M: Minifier> Pipeline<M> {
	pub fn new(minifier: M) -> Self {
		Self {
			minifier,
			html_options: HtmlMinifyOptions::EMBEDDED,
			placeholders: PlaceholderMode::default(),
		}
	}

	pub fn with_placeholder_mode(mut self, placeholders: PlaceholderMode) -> Self {
		self.placeholders = placeholders;
		self
	}

	pub fn placeholder_mode(&self) -> PlaceholderMode {
		self.placeholders
	}

	/// Runs every stage in order. The output file is only touched once everything
	/// before [`BuildStage::Writing`] has succeeded.
	#[instrument(skip_all, fields(output = %request.output_path.display()))]
	pub fn build(&self, request: &BuildRequest) -> Result<BuildReport> {
		let (template, css, js) = in_stage(BuildStage::Loading, || {
			Ok((
				asset::load(AssetKind::Html, &request.html_path)?,
				asset::load(AssetKind::Css, &request.css_path)?,
				asset::load(AssetKind::Js, &request.js_path)?,
			))
		})?;

		let (css, js) = in_stage(BuildStage::MinifyingAssets, || {
			let minified_css = self.minifier.minify_css(&css.raw_text)?;
			let css = MinificationResult::new(AssetKind::Css, &css.raw_text, minified_css);
			tracing::debug!(
				original = css.original_bytes,
				minified = css.minified_bytes,
				"minified CSS"
			);

			let minified_js = self.minifier.minify_js(&js.raw_text)?;
			let js = MinificationResult::new(AssetKind::Js, &js.raw_text, minified_js);
			tracing::debug!(
				original = js.original_bytes,
				minified = js.minified_bytes,
				"minified JavaScript"
			);

			Ok((css, js))
		})?;

		let composition = in_stage(BuildStage::Composing, || {
			compose(
				&template.raw_text,
				&css.minified_text,
				&js.minified_text,
				self.placeholders,
			)
		})?;

		let combined = in_stage(BuildStage::MinifyingFinal, || {
			let minified = self
				.minifier
				.minify_html(&composition.text, &self.html_options)?;
			Ok(CombinedDocument::new(composition.text, minified))
		})?;
		tracing::debug!(
			before = combined.size_before_final_minify,
			after = combined.size_after_final_minify,
			"minified combined document"
		);

		in_stage(BuildStage::Writing, || {
			asset::write(&request.output_path, &combined.text_after_final_minify)
		})?;

		let report = BuildReport::new(&request.output_path, css, js, &combined);
		tracing::info!(
			total_original = report.total_original,
			total_final = report.total_final,
			"build complete"
		);

		Ok(report)
	}
}

fn in_stage<T>(stage: BuildStage, run: impl FnOnce() -> Result<T>) -> Result<T> {
	tracing::debug!(%stage, "entering stage");

	run().map_err(|source| Error::Stage {
		stage,
		source: Box::new(source),
	})
}
