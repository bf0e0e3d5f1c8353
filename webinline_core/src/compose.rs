use crate::{
	err,
	error::{Error, Result},
};
use serde_derive::Deserialize;
use tracing::instrument;

pub const CSS_PLACEHOLDER: &str = "/* CSS_PLACEHOLDER */";
pub const JS_PLACEHOLDER: &str = "/* JS_PLACEHOLDER */";

/// How strictly the template's markers are checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaceholderMode {
	/// A missing marker is skipped and the build carries on.
	Permissive,
	/// Each marker must appear exactly once.
	Strict,
}

impl Default for PlaceholderMode {
	fn default() -> Self {
		Self::Permissive
	}
}

#[derive(Debug, Clone)]
pub struct Composition {
	pub text: String,
	pub css_replacements: usize,
	pub js_replacements: usize,
}

/// Splices minified CSS and JS into the template by literal replacement of the two
/// markers, CSS first. Nothing is escaped, so neither input may contain marker text.
#[instrument(level = "debug", skip(template, css, js))]
pub fn compose(template: &str, css: &str, js: &str, mode: PlaceholderMode) -> Result<Composition> {
	let css_replacements = template.matches(CSS_PLACEHOLDER).count();
	let text = template.replace(CSS_PLACEHOLDER, css);

	let js_replacements = text.matches(JS_PLACEHOLDER).count();
	let text = text.replace(JS_PLACEHOLDER, js);

	for (marker, count) in [
		(CSS_PLACEHOLDER, css_replacements),
		(JS_PLACEHOLDER, js_replacements),
	] {
		match (mode, count) {
			(_, 1) => {}
			(PlaceholderMode::Permissive, 0) => {
				tracing::warn!("template has no {marker} marker, nothing substituted");
			}
			(PlaceholderMode::Permissive, count) => {
				tracing::warn!("template has {count} {marker} markers, all substituted");
			}
			(PlaceholderMode::Strict, count) => {
				return Err(err!(Placeholder(format!(
					"expected exactly one {marker} marker in the template, found {count}"
				))));
			}
		}
	}

	Ok(Composition {
		text,
		css_replacements,
		js_replacements,
	})
}
