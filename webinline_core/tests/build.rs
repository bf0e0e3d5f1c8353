use std::fs;
use tempfile::{tempdir, TempDir};
use webinline_core::{
	asset::AssetKind,
	build::{BuildRequest, BuildStage, Pipeline},
	compose::PlaceholderMode,
	error::Error,
	minify::StandardMinifier,
};

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <!-- inlined at build time -->
    <style>/* CSS_PLACEHOLDER */</style>
  </head>
  <body>
    <h1>Hello   there</h1>
    <input type="checkbox" checked="checked">
    <script>/* JS_PLACEHOLDER */</script>
  </body>
</html>
"#;

const CSS: &str = "body {\n  color: red;\n}\n\nh1 {\n  margin: 0px;\n}\n";
const JS: &str = "function greet(name) {\n  return \"hi \" + name;\n}\n\ngreet(\"you\");\n";

fn fixture(template: &str) -> (TempDir, BuildRequest) {
	let dir = tempdir().unwrap();
	fs::write(dir.path().join("webapp.html"), template).unwrap();
	fs::write(dir.path().join("webapp.css"), CSS).unwrap();
	fs::write(dir.path().join("webapp.js"), JS).unwrap();

	let request = BuildRequest {
		html_path: dir.path().join("webapp.html"),
		css_path: dir.path().join("webapp.css"),
		js_path: dir.path().join("webapp.js"),
		output_path: dir.path().join("webapp.min.html"),
	};

	(dir, request)
}

fn pipeline() -> Pipeline<StandardMinifier> {
	Pipeline::new(StandardMinifier::probe().unwrap())
}

#[test]
fn embeds_minified_assets() {
	let (_dir, request) = fixture(
		"<html><style>/* CSS_PLACEHOLDER */</style><script>/* JS_PLACEHOLDER */</script></html>",
	);
	fs::write(&request.css_path, "body { color: red; }").unwrap();
	fs::write(&request.js_path, "function f() { return 1; }").unwrap();

	let report = pipeline().build(&request).unwrap();
	let output = fs::read_to_string(&request.output_path).unwrap();

	assert!(output.starts_with("<html><style>body{color:red}</style><script>"), "{output}");
	assert!(output.ends_with("</script></html>"), "{output}");
	assert!(!output.contains("function f() { return 1; }"), "{output}");
	assert!(!output.contains("PLACEHOLDER"));
	assert!(report.total_saved >= 0);
}

#[test]
fn full_document_is_reduced() {
	let (_dir, request) = fixture(TEMPLATE);

	let report = pipeline().build(&request).unwrap();
	let output = fs::read_to_string(&request.output_path).unwrap();

	assert!(output.starts_with("<!DOCTYPE html><html><head><style>"), "{output}");
	assert!(!output.contains("inlined at build time"));
	assert!(output.contains("<h1>Hello there</h1>"));
	assert!(output.contains("<input type=\"checkbox\" checked>"));
	assert!(output.contains("greet"));
	assert!(report.total_final < report.total_original);
	assert!(report.total_saved_pct > 0.0);
}

#[test]
fn reported_sizes_match_the_output() {
	let (_dir, request) = fixture(TEMPLATE);

	let report = pipeline().build(&request).unwrap();
	let output = fs::read(&request.output_path).unwrap();

	assert_eq!(report.total_final, output.len());
	assert_eq!(report.per_asset[&AssetKind::Css].original_bytes, CSS.len());
	assert_eq!(report.per_asset[&AssetKind::Js].original_bytes, JS.len());
	assert_eq!(report.total_original, report.combined_before);
	assert_eq!(
		report.combined_before,
		TEMPLATE.len() - "/* CSS_PLACEHOLDER *//* JS_PLACEHOLDER */".len()
			+ report.per_asset[&AssetKind::Css].minified_bytes
			+ report.per_asset[&AssetKind::Js].minified_bytes
	);
}

#[test]
fn builds_are_idempotent() {
	let (_dir, request) = fixture(TEMPLATE);
	let pipeline = pipeline();

	pipeline.build(&request).unwrap();
	let first = fs::read(&request.output_path).unwrap();
	pipeline.build(&request).unwrap();
	let second = fs::read(&request.output_path).unwrap();

	assert_eq!(first, second);
}

#[test]
fn missing_inputs_leave_no_output() {
	for kind in [AssetKind::Html, AssetKind::Css, AssetKind::Js] {
		let (_dir, request) = fixture(TEMPLATE);
		let missing = match kind {
			AssetKind::Html => &request.html_path,
			AssetKind::Css => &request.css_path,
			AssetKind::Js => &request.js_path,
		};
		fs::remove_file(missing).unwrap();

		let error = pipeline().build(&request).unwrap_err();

		assert_eq!(error.stage(), Some(BuildStage::Loading));
		assert!(
			matches!(error.root(), Error::AssetNotFound { kind: missing_kind, .. } if *missing_kind == kind),
			"{error:?}"
		);
		assert!(!request.output_path.exists());
	}
}

#[test]
fn missing_marker_still_builds() {
	let (_dir, request) = fixture("<html><style>/* CSS_PLACEHOLDER */</style></html>");

	let report = pipeline().build(&request).unwrap();
	let output = fs::read_to_string(&request.output_path).unwrap();

	assert!(output.contains("<style>body{color:red}h1{margin:0}</style>"), "{output}");
	assert!(!output.contains("greet"));
	assert_eq!(report.total_final, output.len());
}

#[test]
fn strict_mode_rejects_missing_marker() {
	let (_dir, request) = fixture("<html><style>/* CSS_PLACEHOLDER */</style></html>");

	let error = pipeline()
		.with_placeholder_mode(PlaceholderMode::Strict)
		.build(&request)
		.unwrap_err();

	assert_eq!(error.stage(), Some(BuildStage::Composing));
	assert!(!request.output_path.exists());
}

#[test]
fn malformed_stylesheet_fails_before_writing() {
	let (_dir, request) = fixture(TEMPLATE);
	fs::write(&request.css_path, "a > > b { color: red; }").unwrap();

	let error = pipeline().build(&request).unwrap_err();

	assert_eq!(error.stage(), Some(BuildStage::MinifyingAssets));
	assert!(matches!(
		error.root(),
		Error::MinificationError {
			kind: AssetKind::Css,
			..
		}
	));
	assert!(!request.output_path.exists());
}

#[test]
fn inlined_assets_cannot_close_their_element() {
	let (_dir, request) = fixture(TEMPLATE);
	fs::write(&request.css_path, "h1::before { content: \"\\3c /style>\"; }").unwrap();
	fs::write(&request.js_path, "var tag = \"<\\/script>\";\nvar line = \"a\\nb\";\n").unwrap();

	pipeline().build(&request).unwrap();
	let output = fs::read_to_string(&request.output_path).unwrap();

	assert_eq!(output.matches("</style>").count(), 1, "{output}");
	assert_eq!(output.matches("</script>").count(), 1, "{output}");
	assert!(output.contains("<\\/style>"), "{output}");
	assert!(output.contains("<\\/script>"), "{output}");
	assert!(!output.contains("\\\\n"), "{output}");
}
