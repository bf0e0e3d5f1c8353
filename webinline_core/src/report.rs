use crate::asset::AssetKind;
use serde_derive::Serialize;
use std::{
	collections::BTreeMap,
	fmt,
	path::{Path, PathBuf},
};

const RULE_WIDTH: usize = 60;

/// Bytes saved going from `original` to `minified`. Negative when minification grew
/// the text.
#[inline]
pub fn savings(original: usize, minified: usize) -> i64 {
	original as i64 - minified as i64
}

/// Savings as a percentage of `original`. An empty original reports 0.
#[inline]
pub fn savings_pct(original: usize, minified: usize) -> f64 {
	if original == 0 {
		return 0.0;
	}

	savings(original, minified) as f64 / original as f64 * 100.0
}

#[derive(Debug, Clone, Serialize)]
pub struct MinificationResult {
	pub kind: AssetKind,
	pub original_bytes: usize,
	pub minified_bytes: usize,
	#[serde(skip)]
	pub minified_text: String,
}

impl MinificationResult {
	/// Sizes are taken from the texts themselves so the report can never drift from
	/// what was produced.
	pub fn new(kind: AssetKind, original: &str, minified_text: String) -> Self {
		Self {
			kind,
			original_bytes: original.len(),
			minified_bytes: minified_text.len(),
			minified_text,
		}
	}

	pub fn saved(&self) -> i64 {
		savings(self.original_bytes, self.minified_bytes)
	}

	pub fn saved_pct(&self) -> f64 {
		savings_pct(self.original_bytes, self.minified_bytes)
	}
}

#[derive(Debug, Clone)]
pub struct CombinedDocument {
	pub text_before_final_minify: String,
	pub text_after_final_minify: String,
	pub size_before_final_minify: usize,
	pub size_after_final_minify: usize,
}

impl CombinedDocument {
	pub fn new(before: String, after: String) -> Self {
		Self {
			size_before_final_minify: before.len(),
			size_after_final_minify: after.len(),
			text_before_final_minify: before,
			text_after_final_minify: after,
		}
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
	pub output: PathBuf,
	pub per_asset: BTreeMap<AssetKind, MinificationResult>,
	pub combined_before: usize,
	pub combined_after: usize,
	pub total_original: usize,
	pub total_final: usize,
	pub total_saved: i64,
	pub total_saved_pct: f64,
}

impl BuildReport {
	pub fn new(
		output: &Path,
		css: MinificationResult,
		js: MinificationResult,
		combined: &CombinedDocument,
	) -> Self {
		let css_original = css.original_bytes as i64;
		let js_original = js.original_bytes as i64;
		let combined_before = combined.size_before_final_minify as i64;

		// The template's own bytes are whatever the composed document holds beyond the
		// CSS and JS, so they are counted once.
		let total_original =
			(css_original + js_original + (combined_before - css_original - js_original)).max(0)
				as usize;
		let total_final = combined.size_after_final_minify;

		Self {
			output: output.to_path_buf(),
			per_asset: BTreeMap::from([(AssetKind::Css, css), (AssetKind::Js, js)]),
			combined_before: combined.size_before_final_minify,
			combined_after: combined.size_after_final_minify,
			total_original,
			total_final,
			total_saved: savings(total_original, total_final),
			total_saved_pct: savings_pct(total_original, total_final),
		}
	}

	pub fn combined_saved(&self) -> i64 {
		savings(self.combined_before, self.combined_after)
	}

	pub fn combined_saved_pct(&self) -> f64 {
		savings_pct(self.combined_before, self.combined_after)
	}
}

impl fmt::Display for BuildReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for result in self.per_asset.values() {
			writeln!(f, "Minified {}", result.kind)?;
			writeln!(f, "   Original: {} bytes", grouped(result.original_bytes as i64))?;
			writeln!(f, "   Minified: {} bytes", grouped(result.minified_bytes as i64))?;
			writeln!(
				f,
				"   Saved: {} bytes ({:.1}%)",
				grouped(result.saved()),
				result.saved_pct()
			)?;
			writeln!(f)?;
		}

		writeln!(f, "Minified {}", AssetKind::Html)?;
		writeln!(f, "   Combined (before): {} bytes", grouped(self.combined_before as i64))?;
		writeln!(f, "   Minified (after):  {} bytes", grouped(self.combined_after as i64))?;
		writeln!(
			f,
			"   Saved: {} bytes ({:.1}%)",
			grouped(self.combined_saved()),
			self.combined_saved_pct()
		)?;
		writeln!(f)?;

		let rule = "=".repeat(RULE_WIDTH);
		let output_name = self
			.output
			.file_name()
			.map(|name| name.to_string_lossy())
			.unwrap_or_else(|| self.output.to_string_lossy());

		writeln!(f, "{rule}")?;
		writeln!(f, "Build complete: {output_name}")?;
		writeln!(f, "   Total original:  {} bytes", grouped(self.total_original as i64))?;
		writeln!(f, "   Total minified:  {} bytes", grouped(self.total_final as i64))?;
		writeln!(
			f,
			"   Total saved:     {} bytes ({:.1}%)",
			grouped(self.total_saved),
			self.total_saved_pct
		)?;
		write!(f, "{rule}")
	}
}

/// `1234567` as `1,234,567`.
fn grouped(value: i64) -> String {
	let digits = value.unsigned_abs().to_string();
	let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

	if value < 0 {
		out.push('-');
	}
	for (i, digit) in digits.chars().enumerate() {
		if i > 0 && (digits.len() - i) % 3 == 0 {
			out.push(',');
		}
		out.push(digit);
	}

	out
}
