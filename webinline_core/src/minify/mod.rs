mod css;
mod html;
mod js;

use crate::{
	err,
	error::{Error, Result},
};
use tracing::instrument;

/// The three reductions a build needs. Implementations must not change what the
/// text renders or executes as.
pub trait Minifier {
	fn minify_css(&self, text: &str) -> Result<String>;

	fn minify_js(&self, text: &str) -> Result<String>;

	fn minify_html(&self, text: &str, options: &HtmlMinifyOptions) -> Result<String>;
}

impl<M: Minifier + ?Sized> Minifier for &M {
	fn minify_css(&self, text: &str) -> Result<String> {
		(**self).minify_css(text)
	}

	fn minify_js(&self, text: &str) -> Result<String> {
		(**self).minify_js(text)
	}

	fn minify_html(&self, text: &str, options: &HtmlMinifyOptions) -> Result<String> {
		(**self).minify_html(text, options)
	}
}

/// Controls what the HTML pass is allowed to change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HtmlMinifyOptions {
	/// Drop comments, except `<!--! ... -->`.
	pub strip_comments: bool,
	/// Collapse whitespace runs in text to one space and drop whitespace-only text
	/// that spans a line break.
	pub collapse_whitespace: bool,
	/// Also drop whitespace-only text on a single line. Implies `collapse_whitespace`.
	pub collapse_all_whitespace: bool,
	/// Write `disabled="disabled"` and `disabled=""` as `disabled`.
	pub reduce_boolean_attributes: bool,
	/// Unquote attribute values where HTML allows it.
	pub drop_optional_attribute_quotes: bool,
	/// Leave text inside `<pre>` untouched.
	pub preserve_preformatted: bool,
}

impl HtmlMinifyOptions {
	/// The settings every embedded build uses. Keeps one separating space where text
	/// needs it and never removes attribute quotes, so the result can be served as-is.
	pub const EMBEDDED: HtmlMinifyOptions = HtmlMinifyOptions {
		strip_comments: true,
		collapse_whitespace: true,
		collapse_all_whitespace: false,
		reduce_boolean_attributes: true,
		drop_optional_attribute_quotes: false,
		preserve_preformatted: true,
	};
}

/// lightningcss for stylesheets, better_minify_js for scripts, and a lol_html pass for markup.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardMinifier {
	_private: (),
}

impl StandardMinifier {
	/// Builds the minifier and checks each language against a small sample, so a broken
	/// capability fails before any build work starts.
	#[instrument(level = "debug")]
	pub fn probe() -> Result<Self> {
		let minifier = Self::default();

		let checks = [
			("CSS", minifier.minify_css("a { color: red; }"), "a{color:red}"),
			("JavaScript", minifier.minify_js("var a = 1;"), "var a=1"),
			(
				"HTML",
				minifier.minify_html("<p>\n  ok  <!-- c -->\n</p>", &HtmlMinifyOptions::EMBEDDED),
				"<p> ok </p>",
			),
		];

		for (language, result, expected) in checks {
			match result {
				Ok(output) if output.contains(expected) => {
					tracing::debug!(language, "minifier ready");
				}
				Ok(output) => {
					return Err(err!(CapabilityUnavailable(format!(
						"{language} minifier produced unexpected output {output:?}"
					))))
				}
				Err(error) => {
					return Err(err!(CapabilityUnavailable(format!(
						"{language} minifier failed its self-check: {error}"
					))))
				}
			}
		}

		// String values must come out unchanged, escapes included.
		let escaped = minifier.minify_js(r#"var s = "a\n\"b\\c";"#).map_err(|error| {
			err!(CapabilityUnavailable(format!(
				"JavaScript minifier failed its self-check: {error}"
			)))
		})?;
		if js::first_string_literal(&escaped).as_deref() != Some("a\n\"b\\c") {
			return Err(err!(CapabilityUnavailable(format!(
				"JavaScript minifier changed a string value: {escaped:?}"
			))));
		}

		Ok(minifier)
	}
}

/// Inserts a backslash into every `</tag` (ASCII case-insensitive) so minified text can
/// sit inside a `<tag>` element. `<\/` reads as `</` in CSS and JS strings alike.
pub(crate) fn escape_closing_tag(text: &str, tag: &str) -> String {
	let needle = format!("</{}", tag.to_ascii_lowercase());
	// Lowercasing ASCII keeps byte offsets
	let lowered = text.to_ascii_lowercase();
	let mut out = String::with_capacity(text.len());
	let mut copied = 0;

	for (at, _) in lowered.match_indices(&needle) {
		out.push_str(&text[copied..=at]);
		out.push('\\');
		copied = at + 1;
	}
	out.push_str(&text[copied..]);

	out
}

impl Minifier for StandardMinifier {
	#[instrument(level = "trace", skip_all)]
	fn minify_css(&self, text: &str) -> Result<String> {
		css::minify_css(text)
	}

	#[instrument(level = "trace", skip_all)]
	fn minify_js(&self, text: &str) -> Result<String> {
		js::minify_js(text)
	}

	#[instrument(level = "trace", skip(self, text))]
	fn minify_html(&self, text: &str, options: &HtmlMinifyOptions) -> Result<String> {
		html::minify_html(text, options)
	}
}
