// SPDX-License-Identifier: MIT
//
// tml-tty — render terminal markup language documents to any terminal.
//
// This is the binary that wires the two library crates together:
//
//   tml-term   → terminal profiles, raw mode, output sinks
//   tml-render → style stack, style diff, line formatter, markup source
//
// One run, start to finish:
//
//   argv → Cli → terminal profile → input + output opened
//        → raw mode (if asked for and the output is a terminal)
//        → RenderOptions (width, line ending)
//        → markup::parse → Renderer → sink → restore terminal
//
// Every failure ends the run with "tml-tty: <error>" on stderr and exit
// status 1. A failure to restore the terminal is reported on its own and
// changes neither the exit status nor the error that ended rendering.

use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use tml_render::config::{OutputDevice, RenderOptions};
use tml_render::markup::{self, wrap_in_root};
use tml_render::{Error, RenderStats, Renderer, Result};
use tml_term::output::{OutputMode, OutputSink};
use tml_term::profile::TerminalProfile;
use tml_term::terminal::{self, Fd, RawMode};

/// Descriptor of standard output.
const STDOUT_FD: Fd = 1;

// ─── Command Line ────────────────────────────────────────────────────────────

/// tml-tty - render terminal markup to the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "tml-tty",
    version,
    about = "Render terminal markup language (TML) to the terminal"
)]
struct Cli {
    /// Treat the input as a document body (wrap it in an implicit <tml> root)
    #[arg(short = 'b', long = "body")]
    body: bool,

    /// Print diagnostic traces to stderr
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// Put the terminal in raw mode and end lines with CR LF
    #[arg(short = 'r', long = "rawtty")]
    rawtty: bool,

    /// Write every control string and text run straight to the output
    #[arg(short = 'u', long = "unbuffered")]
    unbuffered: bool,

    /// Terminal type (default: $TERM)
    #[arg(short = 't', long = "term", value_name = "TERM")]
    term: Option<String>,

    /// Output width in columns (0 = terminal width)
    #[arg(short = 'w', long = "width", value_name = "N", default_value_t = 0)]
    width: usize,

    /// Read markup from FILE instead of stdin
    #[arg(short = 'i', long = "in", value_name = "FILE")]
    input: Option<PathBuf>,

    /// Write output to FILE instead of stdout
    #[arg(short = 'o', long = "out", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Inline markup to render instead of reading input (implies --body)
    #[arg(value_name = "EXPRESSION")]
    expression: Option<String>,
}

impl Cli {
    /// Whether the markup gets an implicit root element.
    const fn wraps_root(&self) -> bool {
        self.body || self.expression.is_some()
    }

    const fn output_mode(&self) -> OutputMode {
        if self.unbuffered {
            OutputMode::Raw
        } else {
            OutputMode::Buffered
        }
    }
}

// ─── Logging ─────────────────────────────────────────────────────────────────

/// Install the stderr subscriber. `RUST_LOG` overrides the level.
fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "tml_tty={level},tml_render={level},tml_term={level}"
        ))
    });

    // Fails only if a subscriber is already installed.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(debug)
                .without_time(),
        )
        .try_init();
}

// ─── Setup ───────────────────────────────────────────────────────────────────

/// Pick the terminal profile from `--term`, falling back to `$TERM`.
fn resolve_profile(flag: Option<&str>, env_term: Option<&str>) -> Result<TerminalProfile> {
    let name = flag
        .or(env_term)
        .filter(|s| !s.is_empty())
        .ok_or(Error::MissingTerminal)?;
    TerminalProfile::lookup(name).ok_or_else(|| Error::UnknownTerminal(name.to_owned()))
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    let input: Box<dyn BufRead> = match path {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };
    Ok(input)
}

#[cfg(unix)]
fn file_fd(file: &File) -> Fd {
    use std::os::unix::io::AsRawFd;
    file.as_raw_fd()
}

#[cfg(not(unix))]
const fn file_fd(_file: &File) -> Fd {
    -1
}

#[cfg(unix)]
fn stdout_writer(unbuffered: bool) -> Box<dyn Write> {
    if unbuffered {
        return Box::new(tml_term::output::FdWriter::stdout());
    }
    Box::new(io::stdout())
}

#[cfg(not(unix))]
fn stdout_writer(_unbuffered: bool) -> Box<dyn Write> {
    Box::new(io::stdout())
}

/// Open the output and return it with the descriptor used for terminal
/// queries.
fn open_output(path: Option<&Path>, unbuffered: bool) -> Result<(Box<dyn Write>, Fd)> {
    Ok(match path {
        Some(path) => {
            let file = File::create(path)?;
            let fd = file_fd(&file);
            (Box::new(file) as Box<dyn Write>, fd)
        }
        None => (stdout_writer(unbuffered), STDOUT_FD),
    })
}

// ─── Run ─────────────────────────────────────────────────────────────────────

fn run(cli: &Cli) -> Result<RenderStats> {
    let env_term = env::var("TERM").ok();
    let profile = resolve_profile(cli.term.as_deref(), env_term.as_deref())?;
    tracing::debug!(term = profile.name, "terminal type");

    let input = match cli.expression {
        Some(_) => None,
        None => Some(open_input(cli.input.as_deref())?),
    };
    let (output, fd) = open_output(cli.output.as_deref(), cli.unbuffered)?;

    let device = OutputDevice {
        is_tty: terminal::is_tty(fd),
        window_width: terminal::window_width(fd),
        profile_columns: profile.columns,
    };
    let options = RenderOptions::resolve(cli.width, device, cli.rawtty);
    tracing::debug!(
        terminal_width = options.terminal_width,
        width = options.width,
        "output width"
    );

    let raw = if cli.rawtty && device.is_tty {
        RawMode::enable(fd).map_err(Error::TerminalSetup)?
    } else {
        RawMode::inactive()
    };

    let sink = OutputSink::new(output, cli.output_mode());
    let rendered = render(cli, input, profile, sink, options);
    let restored = raw.restore().map_err(Error::TerminalRestore);

    settle(rendered, restored)
}

/// Combine the rendering outcome with the terminal teardown outcome.
///
/// A teardown failure is reported on stderr and never changes the result:
/// a successful render stays successful, a failed one keeps its own error.
fn settle(rendered: Result<RenderStats>, restored: Result<()>) -> Result<RenderStats> {
    if let Err(teardown) = restored {
        tracing::error!(error = %teardown, "terminal teardown failed");
        eprintln!("tml-tty: {teardown}");
    }
    rendered
}

fn render<W: Write>(
    cli: &Cli,
    input: Option<Box<dyn BufRead>>,
    profile: TerminalProfile,
    sink: OutputSink<W>,
    options: RenderOptions,
) -> Result<RenderStats> {
    let mut renderer = Renderer::new(profile, sink, options);

    match (&cli.expression, input) {
        (Some(expression), _) => markup::parse(wrap_in_root(expression.as_bytes()), &mut renderer)?,
        (None, Some(input)) if cli.wraps_root() => markup::parse(wrap_in_root(input), &mut renderer)?,
        (None, Some(input)) => markup::parse(input, &mut renderer)?,
        (None, None) => {}
    }

    let stats = renderer.finish()?;
    renderer.into_sink().into_inner()?;
    Ok(stats)
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version print to stdout and succeed.
            let code = i32::from(e.use_stderr());
            let _ = e.print();
            process::exit(code);
        }
    };

    init_logging(cli.debug);

    match run(&cli) {
        Ok(stats) => tracing::debug!(
            lines = stats.lines,
            bytes = stats.bytes,
            pushes = stats.pushes,
            "done"
        ),
        Err(e) => {
            eprintln!("tml-tty: {e}");
            process::exit(1);
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tml-tty").chain(args.iter().copied())).unwrap()
    }

    // ── Command line ──────────────────────────────────────────────────

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = parse(&[]);
        assert!(!cli.body && !cli.debug && !cli.rawtty && !cli.unbuffered);
        assert_eq!(cli.term, None);
        assert_eq!(cli.width, 0);
        assert_eq!(cli.input, None);
        assert_eq!(cli.output, None);
        assert_eq!(cli.expression, None);
        assert_eq!(cli.output_mode(), OutputMode::Buffered);
        assert!(!cli.wraps_root());
    }

    #[test]
    fn short_flags() {
        let cli = parse(&[
            "-b", "-d", "-r", "-u", "-t", "vt100", "-w", "40", "-i", "in.tml", "-o", "out.txt",
        ]);
        assert!(cli.body && cli.debug && cli.rawtty && cli.unbuffered);
        assert_eq!(cli.term.as_deref(), Some("vt100"));
        assert_eq!(cli.width, 40);
        assert_eq!(cli.input, Some(PathBuf::from("in.tml")));
        assert_eq!(cli.output, Some(PathBuf::from("out.txt")));
        assert_eq!(cli.output_mode(), OutputMode::Raw);
    }

    #[test]
    fn long_flags() {
        let cli = parse(&[
            "--body",
            "--debug",
            "--rawtty",
            "--unbuffered",
            "--term=xterm",
            "--width",
            "72",
            "--in",
            "a",
            "--out",
            "b",
        ]);
        assert!(cli.body && cli.debug && cli.rawtty && cli.unbuffered);
        assert_eq!(cli.term.as_deref(), Some("xterm"));
        assert_eq!(cli.width, 72);
    }

    #[test]
    fn expression_implies_root() {
        let cli = parse(&["<b>hi</b>"]);
        assert_eq!(cli.expression.as_deref(), Some("<b>hi</b>"));
        assert!(cli.wraps_root());
    }

    #[test]
    fn unknown_flag_is_an_error() {
        let err = Cli::try_parse_from(["tml-tty", "-x"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
        assert!(err.use_stderr());
    }

    #[test]
    fn bad_width_is_an_error() {
        let err = Cli::try_parse_from(["tml-tty", "-w", "wide"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn help_is_not_an_error_exit() {
        let err = Cli::try_parse_from(["tml-tty", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert!(!err.use_stderr());
    }

    // ── Terminal type ─────────────────────────────────────────────────

    #[test]
    fn flag_overrides_environment() {
        let p = resolve_profile(Some("vt100"), Some("xterm")).unwrap();
        assert_eq!(p.name, "vt100");
    }

    #[test]
    fn environment_used_without_flag() {
        let p = resolve_profile(None, Some("xterm-256color")).unwrap();
        assert_eq!(p.name, "xterm-256color");
    }

    #[test]
    fn missing_terminal_type() {
        assert!(matches!(resolve_profile(None, None), Err(Error::MissingTerminal)));
        assert!(matches!(resolve_profile(None, Some("")), Err(Error::MissingTerminal)));
    }

    #[test]
    fn unknown_terminal_type() {
        match resolve_profile(Some("hp2621"), None) {
            Err(Error::UnknownTerminal(name)) => assert_eq!(name, "hp2621"),
            other => panic!("expected unknown terminal, got {other:?}"),
        }
    }

    // ── Teardown ──────────────────────────────────────────────────────

    fn restore_failure() -> Error {
        Error::TerminalRestore(io::Error::other("tcsetattr failed"))
    }

    fn stats() -> RenderStats {
        RenderStats {
            lines: 2,
            bytes: 10,
            pushes: 1,
        }
    }

    #[test]
    fn settle_clean_run() {
        assert_eq!(settle(Ok(stats()), Ok(())).unwrap(), stats());
    }

    #[test]
    fn settle_keeps_success_when_restore_fails() {
        assert_eq!(settle(Ok(stats()), Err(restore_failure())).unwrap(), stats());
    }

    #[test]
    fn settle_keeps_render_error_when_restore_succeeds() {
        let err = settle(Err(Error::markup(3, "unclosed token")), Ok(())).unwrap_err();
        assert!(matches!(err, Error::Markup { position: 3, .. }), "{err:?}");
    }

    #[test]
    fn restore_failure_never_replaces_render_error() {
        let err = settle(Err(Error::markup(3, "unclosed token")), Err(restore_failure())).unwrap_err();
        assert!(matches!(err, Error::Markup { position: 3, .. }), "{err:?}");
    }

    // ── Rendering ─────────────────────────────────────────────────────

    fn render_to_string(cli: &Cli, input: Option<&'static str>, term: &str) -> Result<String> {
        let profile = resolve_profile(Some(term), None)?;
        let input = input.map(|s| Box::new(s.as_bytes()) as Box<dyn BufRead>);
        let mut out = Vec::new();
        let sink = OutputSink::new(&mut out, cli.output_mode());
        let options = RenderOptions::resolve(cli.width, OutputDevice::default(), cli.rawtty);
        render(cli, input, profile, sink, options)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    #[test]
    fn renders_expression() {
        let cli = parse(&["<red>hi</red>"]);
        let out = render_to_string(&cli, None, "xterm").unwrap();
        assert_eq!(out, "\x1b[31mhi\x1b[0m\n");
    }

    #[test]
    fn renders_document_from_input() {
        let cli = parse(&[]);
        let out = render_to_string(&cli, Some("<tml><b>x</b></tml>"), "vt100").unwrap();
        assert_eq!(out, "\x1b[1mx\x1b[0m\n");
    }

    #[test]
    fn body_mode_needs_no_root() {
        let cli = parse(&["-b"]);
        let out = render_to_string(&cli, Some("a <u>b</u>"), "dumb").unwrap();
        assert_eq!(out, "a b\n");
    }

    #[test]
    fn body_without_flag_is_a_markup_error() {
        let cli = parse(&[]);
        let err = render_to_string(&cli, Some("a <u>b</u>"), "dumb").unwrap_err();
        assert!(matches!(err, Error::Markup { .. }), "{err:?}");
    }

    #[test]
    fn rawtty_flag_ends_lines_with_crlf() {
        let cli = parse(&["-r", "-w", "3", "abcd"]);
        let out = render_to_string(&cli, None, "dumb").unwrap();
        assert_eq!(out, "abc\r\nd\r\n");
    }

    #[test]
    fn width_override_wraps() {
        let cli = parse(&["-u", "-w", "4", "abcdefgh"]);
        let out = render_to_string(&cli, None, "dumb").unwrap();
        assert_eq!(out, "abcd\nefgh\n");
    }
}
