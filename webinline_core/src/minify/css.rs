use super::escape_closing_tag;
use crate::{
	asset::AssetKind,
	error::{Error, Result},
};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use std::fmt::Display;
use tracing::instrument;

impl<T: Display> From<lightningcss::error::Error<T>> for Error {
	fn from(value: lightningcss::error::Error<T>) -> Self {
		Self::MinificationError {
			kind: AssetKind::Css,
			message: format!("{}", value),
		}
	}
}

#[instrument(level = "trace", skip(source))]
#[inline]
pub(crate) fn minify_css(source: &str) -> Result<String> {
	let mut stylesheet = StyleSheet::parse(source, ParserOptions::default())?;
	stylesheet.minify(MinifyOptions::default())?;

	let printer_options = PrinterOptions {
		minify: true,
		..PrinterOptions::default()
	};

	let minified = stylesheet.to_css(printer_options)?.code;

	// Printing resolves `\3c /style>` and `<\/style>` to a literal closing tag.
	Ok(escape_closing_tag(&minified, "style"))
}
