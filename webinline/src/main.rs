use clap::{Parser, Subcommand};
use config::{CompileSettings, Config, ReportFormat};
use miette::{Context, IntoDiagnostic};
use std::{
	io,
	path::{Path, PathBuf},
};
use tracing::Level;
use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter, Registry};
use webinline_core::{
	build::{BuildRequest, Pipeline},
	error::Result,
	minify::StandardMinifier,
	report::BuildReport,
};

mod config;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
	/// Config file
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Verbose logs
	#[arg(short, long)]
	verbose: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Clone, Debug, Subcommand, PartialEq, Eq)]
enum Command {
	/// Inline a stylesheet and a script into an HTML template and minify the result
	Compile {
		/// HTML template with the placeholder markers
		html: PathBuf,
		/// Stylesheet to inline
		css: PathBuf,
		/// Script to inline
		js: PathBuf,
		/// Where to write the combined document
		output: PathBuf,

		/// Fail unless each placeholder marker appears exactly once
		#[arg(long)]
		strict_placeholders: bool,

		/// Report format
		#[arg(long, value_enum)]
		format: Option<ReportFormat>,
	},
	/// Check that the minifiers are available
	Install,
}

impl Command {
	fn exec(&self, config: Config) -> miette::Result<()> {
		match self {
			Self::Compile {
				html,
				css,
				js,
				output,
				strict_placeholders,
				format,
			} => {
				let settings =
					CompileSettings::from(config).with_flags(*strict_placeholders, *format);

				let request = BuildRequest {
					html_path: html.clone(),
					css_path: css.clone(),
					js_path: js.clone(),
					output_path: output.clone(),
				};

				let minifier = StandardMinifier::probe().into_diagnostic()?;
				let pipeline = Pipeline::new(minifier).with_placeholder_mode(settings.placeholders);

				if settings.format == ReportFormat::Text {
					print_sources(&request);
				}

				let report = pipeline
					.build(&request)
					.into_diagnostic()
					.wrap_err_with(|| format!("Failed to build {}", output.display()))?;

				print_report(&report, settings.format)
			}
			Self::Install => {
				StandardMinifier::probe()
					.into_diagnostic()
					.wrap_err("Minifiers are not available")?;
				println!("Minifiers for HTML, CSS and JavaScript are ready");

				Ok(())
			}
		}
	}
}

fn print_sources(request: &BuildRequest) {
	println!("Building from:");
	println!("   HTML: {}", file_name(&request.html_path));
	println!("   CSS:  {}", file_name(&request.css_path));
	println!("   JS:   {}", file_name(&request.js_path));
	println!();
}

fn print_report(report: &BuildReport, format: ReportFormat) -> miette::Result<()> {
	match format {
		ReportFormat::Text => println!("{report}"),
		ReportFormat::Json => println!(
			"{}",
			serde_json::to_string_pretty(report)
				.into_diagnostic()
				.wrap_err("Failed to serialize build report")?
		),
	}

	Ok(())
}

fn file_name(path: &Path) -> String {
	path.file_name()
		.unwrap_or(path.as_os_str())
		.to_string_lossy()
		.into_owned()
}

fn main() -> miette::Result<()> {
	let cli = Cli::parse();

	let config = Config::load(cli.config.as_deref())?;

	init_tracing(cli.verbose).into_diagnostic()?;

	cli.command.exec(config)
}

fn init_tracing(verbose: bool) -> Result<()> {
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("webinline=info"));
	let tracing_subscriber = Registry::default().with(env_filter);

	// stdout carries the report
	let fmt_layer = if verbose {
		tracing_subscriber::fmt::layer()
			.with_writer(io::stderr.with_max_level(Level::TRACE))
			.with_span_events(FmtSpan::CLOSE)
	} else {
		// always show at least warnings
		tracing_subscriber::fmt::layer()
			.with_writer(io::stderr.with_max_level(Level::WARN))
			.with_span_events(FmtSpan::CLOSE)
	};

	let tracing_subscriber = tracing_subscriber.with(fmt_layer);
	tracing::subscriber::set_global_default(tracing_subscriber)?;

	Ok(())
}
