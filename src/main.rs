//! Sequencer CLI
//!
//! Usage:
//!   sequencer [OPTIONS] [FILE]
//!
//! Options:
//!   -y, --yaml                 Read the document as YAML instead of JSON
//!   -o, --output [FILE]        Write to FILE; bare `-o` names the file after the title and version
//!   -t, --target-dir <DIR>     Directory for the output file
//!   -f, --force                Overwrite an existing output file
//!   -v, --verbose              Debug-level logging on stderr
//!   -I, --id <ID>              Identifier carried by every log line
//!   -d, --debug                Draw the debug overlay
//!   -s, --stylesheet <FILE>    Default styles (TOML format)
//!   -h, --help                 Print help

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{debug, info_span, Level};

use sequencer::parser::StyledText;
use sequencer::{parse_as, render_document, Document, InputFormat, RenderConfig, Stylesheet};

#[derive(Parser)]
#[command(name = "sequencer")]
#[command(about = "Draws UML sequence diagrams described in JSON or YAML")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Input is YAML rather than JSON
    #[arg(short, long)]
    yaml: bool,

    /// Output file; without a value the name is built from title and version
    #[arg(short, long, num_args = 0..=1, default_missing_value = "")]
    output: Option<PathBuf>,

    /// Directory the output file is written to
    #[arg(short, long)]
    target_dir: Option<PathBuf>,

    /// Overwrite an existing output file
    #[arg(short, long)]
    force: bool,

    /// Debug-level log messages on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Identifier attached to every log line
    #[arg(short = 'I', long)]
    id: Option<String>,

    /// Debug overlay: rule and label every line
    #[arg(short, long)]
    debug: bool,

    /// Stylesheet file with default styles (TOML format)
    #[arg(short, long)]
    stylesheet: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();

    let id = cli.id.clone().unwrap_or_else(|| format!("pid-{}", std::process::id()));
    let span = info_span!("sequencer", id = %id);
    let _guard = span.enter();

    if let Err(message) = run(&cli) {
        eprintln!("Error: {}", message);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    // Load stylesheet
    let stylesheet = match &cli.stylesheet {
        Some(path) => Stylesheet::from_file(path)
            .map_err(|e| format!("loading stylesheet '{}': {}", path.display(), e))?,
        None => Stylesheet::default(),
    };

    // Read input
    let (source, filename) = match &cli.input {
        Some(path) => {
            let content = fs::read_to_string(path)
                .map_err(|e| format!("reading file '{}': {}", path.display(), e))?;
            (content, path.display().to_string())
        }
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| format!("reading from stdin: {}", e))?;
            (buffer, "<stdin>".to_string())
        }
    };

    let format = if cli.yaml { InputFormat::Yaml } else { InputFormat::Json };
    let doc = parse_as(&source, format).map_err(|e| e.format(&source, &filename))?;
    debug!(actors = doc.actors.len(), lines = doc.lines.len(), "document read");

    let config = RenderConfig::new()
        .with_stylesheet(stylesheet)
        .with_format(format)
        .with_debug(cli.debug);
    let svg = render_document(&doc, &config).map_err(|e| e.to_string())?;

    match output_path(cli, &doc) {
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", svg).map_err(|e| format!("writing to stdout: {}", e))
        }
        Some(path) => write_file(&path, &svg, cli.force),
    }
}

/// Where the SVG goes, or `None` for stdout
fn output_path(cli: &Cli, doc: &Document) -> Option<PathBuf> {
    let named = match cli.output.as_deref() {
        None => return None,
        Some(path) if path.as_os_str().is_empty() => PathBuf::from(derived_name(doc)),
        Some(path) => path.to_path_buf(),
    };
    Some(match &cli.target_dir {
        Some(dir) => dir.join(named),
        None => named,
    })
}

fn write_file(path: &Path, svg: &str, force: bool) -> Result<(), String> {
    if !force && path.exists() {
        return Err(format!(
            "cannot write to file '{}' as it already exists",
            path.display()
        ));
    }
    debug!(path = %path.display(), "writing output");
    fs::write(path, svg).map_err(|e| format!("writing file '{}': {}", path.display(), e))
}

/// `<title>_<version>.svg` with anything unsafe in a file name replaced
fn derived_name(doc: &Document) -> String {
    fn joined(text: Option<&StyledText>, missing: &str) -> String {
        match text.map(|t| t.text.lines().concat()) {
            Some(s) if !s.is_empty() => s,
            _ => missing.to_string(),
        }
    }

    let stem = format!(
        "{}_{}",
        joined(doc.title.as_ref(), "NoTitleSet"),
        joined(doc.version.as_ref(), "NoVersionSet")
    );
    let safe: String = stem
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}.svg", safe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(source: &str) -> Document {
        parse_as(source, InputFormat::Json).unwrap()
    }

    #[test]
    fn test_derived_name() {
        let d = doc(r#"{"title": "Login Flow", "version": ["1", ".2"]}"#);
        assert_eq!(derived_name(&d), "Login_Flow_1.2.svg");
    }

    #[test]
    fn test_derived_name_defaults() {
        assert_eq!(derived_name(&doc("{}")), "NoTitleSet_NoVersionSet.svg");
    }

    #[test]
    fn test_derived_name_strips_separators() {
        let d = doc(r#"{"title": {"text": "a/b:c"}, "version": "v1"}"#);
        assert_eq!(derived_name(&d), "a_b_c_v1.svg");
    }

    #[test]
    fn test_output_flags() {
        let d = doc(r#"{"title": "T", "version": "1"}"#);
        let cli = Cli::parse_from(["sequencer", "in.json"]);
        assert_eq!(output_path(&cli, &d), None);

        let cli = Cli::parse_from(["sequencer", "-o", "--target-dir", "out"]);
        assert_eq!(output_path(&cli, &d), Some(PathBuf::from("out").join("T_1.svg")));

        let cli = Cli::parse_from(["sequencer", "--output", "x.svg"]);
        assert_eq!(output_path(&cli, &d), Some(PathBuf::from("x.svg")));
    }
}
