use super::escape_closing_tag;
use crate::{
	asset::AssetKind,
	error::{Error, Result},
};
use better_minify_js::{minify, Session, TopLevelMode};
use tracing::instrument;

/// Minifies a classic (non-module) script. Global mode keeps top-level names intact
/// since inline `<script>` code shares the page's global scope.
#[instrument(level = "trace", skip(source))]
#[inline]
pub(crate) fn minify_js(source: &str) -> Result<String> {
	let session = Session::new();
	let mut out = Vec::with_capacity(source.len());

	minify(&session, TopLevelMode::Global, source.as_bytes(), &mut out).map_err(|error| {
		Error::MinificationError {
			kind: AssetKind::Js,
			message: error.to_string(),
		}
	})?;

	let minified = String::from_utf8(out).map_err(|error| Error::MinificationError {
		kind: AssetKind::Js,
		message: format!("minified script is not valid UTF-8: {error}"),
	})?;

	// The minifier may print `"<\/script>"` as `"</script>"`.
	Ok(escape_closing_tag(&minified, "script"))
}

/// Value of the first string or template literal in `code`, with escapes resolved.
/// `None` when there is no complete literal.
pub(crate) fn first_string_literal(code: &str) -> Option<String> {
	let start = code.find(['"', '\'', '`'])?;
	let mut chars = code[start..].chars();
	let quote = chars.next()?;
	let mut value = String::new();

	while let Some(c) = chars.next() {
		match c {
			c if c == quote => return Some(value),
			'\\' => match chars.next()? {
				'n' => value.push('\n'),
				't' => value.push('\t'),
				'r' => value.push('\r'),
				'b' => value.push('\u{8}'),
				'f' => value.push('\u{c}'),
				'v' => value.push('\u{b}'),
				'0' => value.push('\0'),
				'x' => value.push(hex_char(&mut chars, 2)?),
				'u' => {
					let mut braced = chars.clone();
					if braced.next() == Some('{') {
						let digits: String = braced.by_ref().take_while(|&c| c != '}').collect();
						value.push(char::from_u32(u32::from_str_radix(&digits, 16).ok()?)?);
						chars = braced;
					} else {
						value.push(hex_char(&mut chars, 4)?);
					}
				}
				// line continuation
				'\n' => {}
				'\r' => {
					let mut rest = chars.clone();
					if rest.next() == Some('\n') {
						chars = rest;
					}
				}
				escaped => value.push(escaped),
			},
			c => value.push(c),
		}
	}

	None
}

fn hex_char(chars: &mut std::str::Chars<'_>, len: usize) -> Option<char> {
	let digits: String = chars.by_ref().take(len).collect();
	if digits.len() != len {
		return None;
	}
	char::from_u32(u32::from_str_radix(&digits, 16).ok()?)
}
