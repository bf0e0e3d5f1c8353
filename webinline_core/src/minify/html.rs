use super::HtmlMinifyOptions;
use crate::{
	asset::AssetKind,
	error::{Error, Result},
};
use lol_html::{
	doc_comments, doc_text, element,
	html_content::{Comment, ContentType, Element, TextChunk, TextType},
	HtmlRewriter, OutputSink, Settings,
};
use std::{cell::Cell, error::Error as StdError, rc::Rc};
use tracing::instrument;

type HandlerResult = std::result::Result<(), Box<dyn StdError + Send + Sync>>;

const BOOLEAN_ATTRIBUTES: [&str; 24] = [
	"allowfullscreen",
	"async",
	"autofocus",
	"autoplay",
	"checked",
	"controls",
	"default",
	"defer",
	"disabled",
	"formnovalidate",
	"hidden",
	"inert",
	"ismap",
	"itemscope",
	"loop",
	"multiple",
	"muted",
	"nomodule",
	"novalidate",
	"open",
	"readonly",
	"required",
	"reversed",
	"selected",
];

struct Sink<'b> {
	buf: &'b mut Vec<u8>,
}

impl<'b> OutputSink for Sink<'b> {
	#[inline]
	fn handle_chunk(&mut self, chunk: &[u8]) {
		self.buf.extend_from_slice(chunk)
	}
}

#[instrument(level = "trace", skip(source))]
pub(crate) fn minify_html(source: &str, options: &HtmlMinifyOptions) -> Result<String> {
	let options = *options;
	let collapsing = options.collapse_whitespace || options.collapse_all_whitespace;
	// Number of currently open <pre> elements
	let preformatted = Rc::new(Cell::new(0usize));
	// Whether the output so far ends with a space written by the whitespace pass
	let trailing_space = Rc::new(Cell::new(false));

	let mut element_content_handlers = vec![];
	if options.preserve_preformatted {
		element_content_handlers.push(element!("pre", make_track_preformatted(&preformatted)));
	}
	if options.reduce_boolean_attributes || options.drop_optional_attribute_quotes {
		element_content_handlers.push(element!("*", make_rewrite_start_tag(options)));
	}
	if collapsing {
		element_content_handlers.push(element!("*", make_reset_trailing_space(&trailing_space)));
	}

	let mut document_content_handlers = vec![];
	if options.strip_comments || collapsing {
		document_content_handlers.push(doc_comments!(make_handle_comment(
			options,
			&trailing_space
		)));
	}
	if collapsing {
		document_content_handlers.push(doc_text!(make_collapse_text(
			options,
			&preformatted,
			&trailing_space
		)));
	}

	let mut buf = Vec::with_capacity(source.len());
	let mut rewriter = HtmlRewriter::new(
		Settings {
			element_content_handlers,
			document_content_handlers,
			..Settings::default()
		},
		Sink { buf: &mut buf },
	);

	rewriter.write(source.as_bytes()).map_err(html_error)?;
	rewriter.end().map_err(html_error)?;

	String::from_utf8(buf).map_err(html_error)
}

#[inline]
fn html_error(error: impl std::fmt::Display) -> Error {
	Error::MinificationError {
		kind: AssetKind::Html,
		message: error.to_string(),
	}
}

fn make_handle_comment(
	options: HtmlMinifyOptions,
	trailing_space: &Rc<Cell<bool>>,
) -> impl FnMut(&mut Comment) -> HandlerResult {
	let trailing_space = trailing_space.clone();
	move |comment| {
		if options.strip_comments && !comment.text().starts_with('!') {
			// Nothing is written, so whitespace on both sides still meets.
			comment.remove();
		} else {
			trailing_space.set(false);
		}

		Ok(())
	}
}

fn make_reset_trailing_space(
	trailing_space: &Rc<Cell<bool>>,
) -> impl FnMut(&mut Element) -> HandlerResult {
	let trailing_space = trailing_space.clone();
	move |el| {
		trailing_space.set(false);

		if let Some(handlers) = el.end_tag_handlers() {
			let trailing_space = trailing_space.clone();
			handlers.push(Box::new(move |_end| {
				trailing_space.set(false);
				Ok(())
			}));
		}

		Ok(())
	}
}

fn make_track_preformatted(depth: &Rc<Cell<usize>>) -> impl FnMut(&mut Element) -> HandlerResult {
	let depth = depth.clone();
	move |el| {
		depth.set(depth.get() + 1);

		if let Some(handlers) = el.end_tag_handlers() {
			let depth = depth.clone();
			handlers.push(Box::new(move |_end| {
				depth.set(depth.get().saturating_sub(1));
				Ok(())
			}));
		}

		Ok(())
	}
}

/// Text nodes arrive in chunks. Chunks are held back until the last one of the node so
/// whitespace runs spanning a chunk boundary still collapse to a single space.
fn make_collapse_text(
	options: HtmlMinifyOptions,
	preformatted: &Rc<Cell<usize>>,
	trailing_space: &Rc<Cell<bool>>,
) -> impl FnMut(&mut TextChunk) -> HandlerResult {
	let preformatted = preformatted.clone();
	let trailing_space = trailing_space.clone();
	let mut pending = String::new();
	move |chunk| {
		// Script, style, textarea and title contents are not markup text.
		if chunk.text_type() != TextType::Data || preformatted.get() > 0 {
			if !chunk.as_str().is_empty() {
				trailing_space.set(false);
			}
			return Ok(());
		}

		pending.push_str(chunk.as_str());

		if chunk.last_in_text_node() {
			let mut collapsed = collapse_text(&pending, &options);
			if trailing_space.get() && collapsed.starts_with(' ') {
				collapsed.remove(0);
			}
			if !collapsed.is_empty() {
				trailing_space.set(collapsed.ends_with(' '));
			}

			chunk.replace(&collapsed, ContentType::Html);
			pending.clear();
		} else {
			chunk.remove();
		}

		Ok(())
	}
}

fn collapse_text(text: &str, options: &HtmlMinifyOptions) -> String {
	if text.chars().all(|c| c.is_ascii_whitespace()) {
		let spans_lines = text.contains(|c: char| c == '\n' || c == '\r');
		if text.is_empty() || spans_lines || options.collapse_all_whitespace {
			return String::new();
		}
		return " ".into();
	}

	let mut collapsed = String::with_capacity(text.len());
	let mut in_whitespace = false;
	for c in text.chars() {
		if c.is_ascii_whitespace() {
			if !in_whitespace {
				collapsed.push(' ');
			}
			in_whitespace = true;
		} else {
			collapsed.push(c);
			in_whitespace = false;
		}
	}

	collapsed
}

fn make_rewrite_start_tag(options: HtmlMinifyOptions) -> impl FnMut(&mut Element) -> HandlerResult {
	move |el| {
		if let Some(tag) = rewrite_start_tag(el, &options) {
			el.start_tag().replace(&tag, ContentType::Html);
		}

		Ok(())
	}
}

/// Builds a replacement start tag, or `None` when no attribute can be shortened and
/// the original bytes should stay.
fn rewrite_start_tag(el: &Element, options: &HtmlMinifyOptions) -> Option<String> {
	let mut tag = format!("<{}", el.tag_name_preserve_case());
	let mut shortened = false;
	let mut ends_unquoted = false;

	for attribute in el.attributes() {
		let name = attribute.name_preserve_case();
		let value = attribute.value();

		tag.push(' ');
		tag.push_str(&name);
		ends_unquoted = false;

		if options.reduce_boolean_attributes
			&& BOOLEAN_ATTRIBUTES.contains(&attribute.name().as_str())
			&& (value.is_empty() || value.eq_ignore_ascii_case(&name))
		{
			shortened = true;
			continue;
		}

		tag.push('=');
		if options.drop_optional_attribute_quotes && can_unquote(&value) {
			tag.push_str(&value);
			shortened = true;
			ends_unquoted = true;
		} else {
			// Values that held a double quote came from a single-quoted attribute.
			let quote = if value.contains('"') { '\'' } else { '"' };
			tag.push(quote);
			tag.push_str(&value);
			tag.push(quote);
		}
	}

	if !shortened {
		return None;
	}

	if el.is_self_closing() {
		// An unquoted value would swallow the slash.
		tag.push_str(if ends_unquoted { " /" } else { "/" });
	}
	tag.push('>');

	Some(tag)
}

fn can_unquote(value: &str) -> bool {
	!value.is_empty()
		&& !value
			.chars()
			.any(|c| c.is_ascii_whitespace() || matches!(c, '"' | '\'' | '=' | '<' | '>' | '`'))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn embedded(html: &str) -> String {
		minify_html(html, &HtmlMinifyOptions::EMBEDDED).unwrap()
	}

	#[test]
	fn no_options_is_a_pass_through() {
		let options = HtmlMinifyOptions {
			strip_comments: false,
			collapse_whitespace: false,
			collapse_all_whitespace: false,
			reduce_boolean_attributes: false,
			drop_optional_attribute_quotes: false,
			preserve_preformatted: false,
		};
		let html = "<div  class=\"a\">\n  <!-- note -->\n  <input disabled=\"disabled\">\n</div>";

		assert_eq!(minify_html(html, &options).unwrap(), html);
	}

	#[test]
	fn strips_comments_but_keeps_bang_comments() {
		assert_eq!(
			embedded("<p>a<!-- drop -->b<!--! keep --></p>"),
			"<p>ab<!--! keep --></p>"
		);
	}

	#[test]
	fn keeps_comments_when_not_stripping() {
		let options = HtmlMinifyOptions {
			strip_comments: false,
			..HtmlMinifyOptions::EMBEDDED
		};

		assert_eq!(
			minify_html("<p><!-- keep --></p>", &options).unwrap(),
			"<p><!-- keep --></p>"
		);
	}

	#[test]
	fn collapses_whitespace_runs_to_one_space() {
		assert_eq!(
			embedded("<p>hello   \t wide\n\n   world</p>"),
			"<p>hello wide world</p>"
		);
	}

	#[test]
	fn drops_indentation_between_tags() {
		assert_eq!(
			embedded("<ul>\n    <li>one</li>\n    <li>two</li>\n</ul>\n"),
			"<ul><li>one</li><li>two</li></ul>"
		);
	}

	#[test]
	fn keeps_single_separating_space() {
		assert_eq!(
			embedded("<b>bold</b> <i>italic</i>"),
			"<b>bold</b> <i>italic</i>"
		);
	}

	#[test]
	fn collapses_whitespace_around_a_stripped_comment() {
		assert_eq!(
			embedded("<p>x</p>   <!-- c -->   <p>y</p>"),
			"<p>x</p> <p>y</p>"
		);
		assert_eq!(embedded("<p>a <!-- c --> b</p>"), "<p>a b</p>");
	}

	#[test]
	fn keeps_space_on_both_sides_of_a_kept_comment() {
		assert_eq!(
			embedded("<p>a <!--! legal --> b</p>"),
			"<p>a <!--! legal --> b</p>"
		);
	}

	#[test]
	fn tags_separate_whitespace_runs() {
		assert_eq!(
			embedded("<p>a <b>bold</b> c</p>"),
			"<p>a <b>bold</b> c</p>"
		);
	}

	#[test]
	fn collapse_all_drops_single_line_whitespace() {
		let options = HtmlMinifyOptions {
			collapse_all_whitespace: true,
			..HtmlMinifyOptions::EMBEDDED
		};

		assert_eq!(
			minify_html("<b>bold</b> <i>italic</i>", &options).unwrap(),
			"<b>bold</b><i>italic</i>"
		);
	}

	#[test]
	fn preserves_preformatted_text() {
		let html = "<div>\n  <pre>  keep\n    this  </pre>\n  <p>  and   this </p>\n</div>";

		assert_eq!(
			embedded(html),
			"<div><pre>  keep\n    this  </pre><p> and this </p></div>"
		);
	}

	#[test]
	fn collapses_preformatted_text_when_not_preserving() {
		let options = HtmlMinifyOptions {
			preserve_preformatted: false,
			..HtmlMinifyOptions::EMBEDDED
		};

		assert_eq!(
			minify_html("<pre>  a\n    b</pre>", &options).unwrap(),
			"<pre> a b</pre>"
		);
	}

	#[test]
	fn leaves_script_and_style_text_alone() {
		let html = "<style>a  {  }</style><script>let  x = \"  \";</script><textarea>  x  </textarea>";

		assert_eq!(embedded(html), html);
	}

	#[test]
	fn reduces_boolean_attributes() {
		assert_eq!(
			embedded("<input type=\"checkbox\" checked=\"checked\" disabled=\"\">"),
			"<input type=\"checkbox\" checked disabled>"
		);
	}

	#[test]
	fn leaves_non_boolean_empty_attributes_quoted() {
		assert_eq!(
			embedded("<option value=\"\" selected=\"selected\">none</option>"),
			"<option value=\"\" selected>none</option>"
		);
	}

	#[test]
	fn keeps_tags_without_reducible_attributes_byte_for_byte() {
		let html = "<a   href='/x'  title=\"t\">x</a>";

		assert_eq!(embedded(html), html);
	}

	#[test]
	fn keeps_attribute_quotes_by_default() {
		let html = "<div class=\"a\" id=\"main\"></div>";

		assert_eq!(embedded(html), html);
	}

	#[test]
	fn drops_optional_quotes_when_asked() {
		let options = HtmlMinifyOptions {
			drop_optional_attribute_quotes: true,
			..HtmlMinifyOptions::EMBEDDED
		};

		assert_eq!(
			minify_html("<div class=\"a b\" id=\"main\" data-x='say \"hi\"'></div>", &options)
				.unwrap(),
			"<div class=\"a b\" id=main data-x='say \"hi\"'></div>"
		);
	}

	#[test]
	fn self_closing_slash_survives_rewrite() {
		let options = HtmlMinifyOptions {
			drop_optional_attribute_quotes: true,
			..HtmlMinifyOptions::EMBEDDED
		};

		assert_eq!(
			minify_html("<img src=\"a.png\"/>", &options).unwrap(),
			"<img src=a.png />"
		);
		assert_eq!(
			embedded("<input hidden=\"hidden\"/>"),
			"<input hidden/>"
		);
	}

	#[test]
	fn keeps_doctype_and_entities() {
		assert_eq!(
			embedded("<!DOCTYPE html>\n<p>a&nbsp;&amp;  b</p>"),
			"<!DOCTYPE html><p>a&nbsp;&amp; b</p>"
		);
	}
}
