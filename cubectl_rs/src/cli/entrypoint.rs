//! CLI entry point of the `cubectl` binary.
//!
//! One invocation is a straight pipeline: compile the tokens, let the alias
//! layer rewrite them, lower the descriptor into a request, send it and turn
//! the response into text. Everything printed is collected in a
//! [`Transcript`] first, so the same text can be appended to the history log
//! after it reached the terminal.

use std::io::{self, IsTerminal, Read, Write};

use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::alias::{AliasOutcome, run_aliases};
use crate::cli::command::help_texts::USAGE;
use crate::cli::command::{CommandDescriptor, CommandKind, View};
use crate::cli::parser::{HELP_FLAGS, compile};
use crate::colors::Painter;
use crate::config::{Config, load_config};
use crate::error::exit_code;
use crate::help::{HelpContext, NO_HELP, RunningCube, running_cubes, schema_help};
use crate::history;
use crate::render::{Node, Printer};
use crate::request::{HttpRequest, Method, lower};
use crate::transport::{Response, Transport};
use crate::types::ColorMode;

const DATAMODEL_MARKER: &str = "datamodel:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Out,
    Err,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Plain,
    Warn,
    Error,
}

#[derive(Debug, Clone)]
struct Segment {
    stream: Stream,
    tone: Tone,
    text: String,
}

/// Everything one invocation prints, in order.
///
/// Colors are applied only when emitting; [`Transcript::plain`] is what goes
/// to the history log.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    segments: Vec<Segment>,
}

impl Transcript {
    fn push(&mut self, stream: Stream, tone: Tone, text: impl Into<String>) {
        let text = text.into();
        if !text.is_empty() {
            self.segments.push(Segment { stream, tone, text });
        }
    }

    pub fn out(&mut self, text: impl Into<String>) {
        self.push(Stream::Out, Tone::Plain, text);
    }

    /// Stdout text that deserves attention (non-2xx status lines).
    pub fn warn(&mut self, text: impl Into<String>) {
        self.push(Stream::Out, Tone::Warn, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(Stream::Err, Tone::Error, text);
    }

    /// All text, uncolored, stdout and stderr interleaved.
    pub fn plain(&self) -> String {
        self.segments.iter().map(|segment| segment.text.as_str()).collect()
    }

    /// Unescape `datamodel` strings, which the daemon ships as one long
    /// escaped line folded by the YAML/table output.
    pub fn unescape_datamodel(&mut self) {
        if !self.plain().contains(DATAMODEL_MARKER) {
            return;
        }
        for segment in &mut self.segments {
            segment.text = unescape(&segment.text);
        }
    }

    pub fn emit(&self, painter: &Painter) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        let mut stderr = io::stderr().lock();
        for segment in &self.segments {
            let text = paint(painter, segment.tone, &segment.text);
            match segment.stream {
                Stream::Out => stdout.write_all(text.as_bytes())?,
                Stream::Err => {
                    stdout.flush()?;
                    stderr.write_all(text.as_bytes())?;
                }
            }
        }
        stdout.flush()?;
        stderr.flush()
    }
}

/// Paint the text but not its trailing newline.
fn paint(painter: &Painter, tone: Tone, text: &str) -> String {
    let (line, newline) = match text.strip_suffix('\n') {
        Some(line) => (line, "\n"),
        None => (text, ""),
    };
    let painted = match tone {
        Tone::Plain => return text.to_string(),
        Tone::Warn => painter.warn(line),
        Tone::Error => painter.error(line),
    };
    format!("{}{}", painted, newline)
}

fn unescape(text: &str) -> String {
    text.replace("\n    ", " ")
        .replace("\\n", "\n")
        .replace("\\t", "\t")
        .replace("\\\"", "\"")
}

/// Presentation settings of the output stage.
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    pub debug: bool,
    /// Invocation was a bare `cubectl` or `cubectl -h`.
    pub root: bool,
    pub expert: bool,
    /// Running instances listed by root help.
    pub running: Vec<RunningCube>,
    /// Wrap tables to this width.
    pub max_width: Option<usize>,
}

impl OutputOptions {
    fn help_context(&self) -> HelpContext {
        HelpContext {
            root: self.root,
            expert: self.expert,
            running: self.running.clone(),
            max_width: self.max_width,
        }
    }
}

/// Turn a daemon response into text. Returns the process exit code.
pub fn respond(
    descriptor: &CommandDescriptor,
    response: &Response,
    options: &OutputOptions,
    transcript: &mut Transcript,
) -> i32 {
    let code = exit_code::from_status(response.status);
    let failed = !response.is_success();

    if failed && !response.body.is_empty() {
        transcript.out(format!("{}\n", String::from_utf8_lossy(&response.body)));
        return code;
    }

    if descriptor.is_help_request() {
        if failed {
            transcript.out(format!("\n{}\n\n", NO_HELP));
        }
    } else if failed {
        transcript.warn(format!("{}\n", response.status_line()));
    } else if options.debug {
        transcript.out(format!("{}\n", response.status_line()));
    }

    let node = match Node::parse(&response.body) {
        Ok(node) => node,
        Err(err) => {
            if options.debug {
                transcript.out(format!("{}\n", err));
            }
            return code;
        }
    };

    if descriptor.is_help_request() {
        transcript.out(schema_help(descriptor, &node, &options.help_context()));
        return code;
    }

    if failed
        || matches!(
            descriptor.command(),
            CommandKind::Add | CommandKind::Del | CommandKind::Set
        )
    {
        return code;
    }

    let view = descriptor.view().cloned().unwrap_or_default();
    match view {
        View::Table { detail, hidden } => {
            let table = Printer::new(&hidden)
                .max_width(options.max_width)
                .render(&node, detail.depth());
            transcript.out(format!("{}\n", table));
        }
        View::Json => match serde_json::from_slice::<serde_json::Value>(&response.body)
            .and_then(|value| serde_json::to_string_pretty(&value))
        {
            Ok(text) => transcript.out(format!("{}\n", text)),
            Err(err) => transcript.error(format!("{}\n", err)),
        },
        View::Yaml => match serde_json::from_slice::<serde_json::Value>(&response.body) {
            Ok(value) => match serde_yaml::to_string(&value) {
                Ok(text) => transcript.out(format!("{}\n", text)),
                Err(err) => transcript.error(format!("Yaml converter error {}\n", err)),
            },
            Err(err) => transcript.error(format!("{}\n", err)),
        },
    }
    code
}

fn is_root_help(args: &[String]) -> bool {
    match args {
        [] => true,
        [only] => HELP_FLAGS.contains(&only.as_str()),
        _ => false,
    }
}

/// Root help lists the instances the daemon is running.
fn wants_running_cubes(descriptor: &CommandDescriptor) -> bool {
    descriptor.is_help_request()
        && descriptor.command() == CommandKind::None
        && descriptor.path_segments().is_empty()
}

fn fetch_running_cubes(transport: &Transport, config: &Config) -> Vec<RunningCube> {
    let request = HttpRequest {
        method: Method::Get,
        url: format!("{}cubes/", config.base_url()),
        body: None,
    };
    match transport.perform(&request) {
        Ok(response) if response.is_success() => match Node::parse(&response.body) {
            Ok(node) => running_cubes(&node),
            Err(err) => {
                debug!(error = %err, "cubes/ answer is not JSON");
                Vec::new()
            }
        },
        Ok(response) => {
            debug!(status = response.status, "cubes/ request refused");
            Vec::new()
        }
        Err(err) => {
            debug!(error = %err, "cannot list running cubes");
            Vec::new()
        }
    }
}

fn terminal_width() -> Option<usize> {
    let term = console::Term::stdout();
    if !term.is_term() {
        return None;
    }
    term.size_checked().map(|(_, cols)| usize::from(cols))
}

/// Standard input, or an empty stream when it is an interactive terminal.
fn stdin_source() -> Box<dyn Read> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        Box::new(io::empty())
    } else {
        Box::new(stdin)
    }
}

/// Run one invocation (`args` without the program name) against the daemon.
pub fn execute(args: &[String], config: &Config, transcript: &mut Transcript) -> i32 {
    let root = is_root_help(args);
    let tokens: &[String] = if root { &[] } else { args };

    let mut descriptor = match compile(tokens) {
        Ok(descriptor) => descriptor,
        Err(err) => {
            transcript.error(format!("{}\n", err));
            return exit_code::USAGE;
        }
    };

    match run_aliases(&mut descriptor) {
        Ok(AliasOutcome::Handled(text)) => {
            transcript.out(text);
            return exit_code::SUCCESS;
        }
        Ok(AliasOutcome::Continue { preamble }) => {
            if let Some(preamble) = preamble {
                transcript.out(preamble);
            }
        }
        Err(err) => {
            transcript.error(format!("{}\n", err));
            return exit_code::USAGE;
        }
    }

    let request = match lower(&descriptor, &config.lower_config(), &mut stdin_source()) {
        Ok(request) => request,
        Err(err) => {
            transcript.error(format!("{}\n", err));
            return exit_code::USAGE;
        }
    };
    debug!("{}", request);

    let transport = match Transport::new(&config.base_url(), config.tls_files()) {
        Ok(transport) => transport,
        Err(err) => {
            transcript.error(format!("{}\n", err));
            return exit_code::REQUEST_FAILED;
        }
    };

    let response = match transport.perform(&request) {
        Ok(response) => response,
        Err(err) => {
            if root {
                transcript.out(USAGE);
                transcript.out("\n");
            }
            transcript.error(format!("{}\n", err));
            return exit_code::REQUEST_FAILED;
        }
    };

    let running = if wants_running_cubes(&descriptor) && response.is_success() {
        fetch_running_cubes(&transport, config)
    } else {
        Vec::new()
    };

    let options = OutputOptions {
        debug: config.debug,
        root,
        expert: config.expert,
        running,
        max_width: terminal_width(),
    };
    respond(&descriptor, &response, &options, transcript)
}

/// Logs go to stderr; stdout carries only rendered output.
fn init_tracing(debug: bool) {
    let fallback = if debug { "warn,cubectl=debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .try_init();
}

/// Run the CLI. This is the whole `main()` body; returns the exit code.
pub fn run() -> i32 {
    let argv: Vec<String> = std::env::args().collect();

    let loaded = match load_config(|name: &str| std::env::var(name).ok()) {
        Ok(loaded) => loaded,
        Err(err) => {
            let painter = Painter::new(ColorMode::Auto);
            eprintln!("{}", painter.error(&format!("{:#}", err)));
            return exit_code::USAGE;
        }
    };

    init_tracing(loaded.config.debug);
    for warning in &loaded.warnings {
        warn!("{}", warning);
    }
    if let Some(path) = &loaded.path {
        debug!(path = %path.display(), "configuration loaded");
    }

    let mut transcript = Transcript::default();
    let code = execute(argv.get(1..).unwrap_or_default(), &loaded.config, &mut transcript);
    transcript.unescape_datamodel();

    if let Err(err) = transcript.emit(&Painter::new(loaded.config.color)) {
        debug!(error = %err, "output stream closed");
    }

    if loaded.config.log_commands
        && let Some(path) = loaded.history_path()
        && let Err(err) = history::append(&path, &argv, &transcript.plain())
    {
        debug!(error = %format!("{:#}", err), "command not logged");
    }

    code
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(tokens: &[&str]) -> CommandDescriptor {
        compile(tokens).unwrap()
    }

    fn response(status: u16, reason: &str, body: &str) -> Response {
        Response {
            status,
            reason: reason.to_string(),
            body: body.as_bytes().to_vec(),
        }
    }

    fn answer(tokens: &[&str], response: &Response, options: &OutputOptions) -> (i32, String) {
        let mut transcript = Transcript::default();
        let code = respond(&descriptor(tokens), response, options, &mut transcript);
        (code, transcript.plain())
    }

    #[test]
    fn test_error_body_is_printed_verbatim() {
        let resp = response(404, "Not Found", "cube br9 does not exist");
        let (code, out) = answer(&["br9", "show"], &resp, &OutputOptions::default());
        assert_eq!(code, exit_code::BAD_STATUS_CODE);
        assert_eq!(out, "cube br9 does not exist\n");
    }

    #[test]
    fn test_empty_error_body_prints_status_line() {
        let resp = response(500, "Internal Server Error", "");
        let (code, out) = answer(&["br1", "show"], &resp, &OutputOptions::default());
        assert_eq!(code, exit_code::BAD_STATUS_CODE);
        assert_eq!(out, "500 Internal Server Error\n");
    }

    #[test]
    fn test_status_line_only_in_debug_mode() {
        let resp = response(200, "OK", r#"{"name": "br1"}"#);
        let (_, quiet) = answer(&["br1", "show"], &resp, &OutputOptions::default());
        assert_eq!(quiet, "name: br1\n\n");

        let debug = OutputOptions {
            debug: true,
            ..OutputOptions::default()
        };
        let (_, loud) = answer(&["br1", "show"], &resp, &debug);
        assert_eq!(loud, "200 OK\nname: br1\n\n");
    }

    #[test]
    fn test_help_without_support() {
        let resp = response(405, "Method Not Allowed", "");
        let (code, out) = answer(&["br1", "?"], &resp, &OutputOptions::default());
        assert_eq!(code, exit_code::BAD_STATUS_CODE);
        assert_eq!(out, format!("\n{}\n\n", NO_HELP));
    }

    #[test]
    fn test_invalid_json_is_silent_unless_debug() {
        let resp = response(200, "OK", "not json");
        let (code, out) = answer(&["br1", "show"], &resp, &OutputOptions::default());
        assert_eq!(code, exit_code::SUCCESS);
        assert_eq!(out, "");

        let debug = OutputOptions {
            debug: true,
            ..OutputOptions::default()
        };
        let (_, out) = answer(&["br1", "show"], &resp, &debug);
        assert!(out.starts_with("200 OK\ninvalid JSON response:"));
    }

    #[test]
    fn test_mutations_print_nothing() {
        let resp = response(200, "OK", r#"{"name": "br1"}"#);
        let cases: [&[&str]; 3] = [&["br1", "add"], &["br1", "del"], &["br1", "set", "loglevel=DEBUG"]];
        for tokens in cases {
            let (code, out) = answer(tokens, &resp, &OutputOptions::default());
            assert_eq!(code, exit_code::SUCCESS);
            assert_eq!(out, "");
        }
    }

    #[test]
    fn test_create_without_command_renders_answer() {
        let resp = response(201, "Created", r#"{"name": "br1"}"#);
        let (code, out) = answer(&["br1"], &resp, &OutputOptions::default());
        assert_eq!(code, exit_code::SUCCESS);
        assert_eq!(out, "name: br1\n\n");
    }

    #[test]
    fn test_show_modes() {
        let body = r#"{"name": "br1", "ports": [{"name": "p1"}, {"name": "p2"}]}"#;
        let resp = response(200, "OK", body);
        let options = OutputOptions::default();

        let (_, brief) = answer(&["br1", "show", "-brief"], &resp, &options);
        assert_eq!(brief, "name: br1\nports: [2 items]\n\n");

        let (_, json) = answer(&["br1", "show", "-json"], &resp, &options);
        assert!(json.starts_with("{\n  \"name\": \"br1\",\n  \"ports\": ["));

        let (_, yaml) = answer(&["br1", "show", "-yaml"], &resp, &options);
        assert!(yaml.starts_with("name: br1\nports:\n"));
    }

    #[test]
    fn test_hidden_fields_reach_printer() {
        let resp = response(200, "OK", r#"{"name": "br1", "uuid": "abc"}"#);
        let (_, out) = answer(&["br1", "show", "-hide=uuid"], &resp, &OutputOptions::default());
        assert_eq!(out, "name: br1\n\n");
    }

    #[test]
    fn test_help_renders_schema() {
        let schema = r#"{"params": {"loglevel": {"type": "leaf", "simpletype": "string", "description": "Logging level"}}}"#;
        let resp = response(200, "OK", schema);
        let (code, out) = answer(&["br1", "set", "?"], &resp, &OutputOptions::default());
        assert_eq!(code, exit_code::SUCCESS);
        assert!(out.contains("Keyword"));
        assert!(out.contains(" loglevel=value"));
    }

    #[test]
    fn test_root_help_has_hint() {
        let resp = response(200, "OK", r#"{"commands": ["add", "show"]}"#);
        let options = OutputOptions {
            root: true,
            ..OutputOptions::default()
        };
        let mut transcript = Transcript::default();
        respond(&CommandDescriptor::help_request(), &resp, &options, &mut transcript);
        assert!(transcript.plain().starts_with("For help on keywords use '?'\n"));
    }

    #[test]
    fn test_root_help_flags() {
        let args = |parts: &[&str]| parts.iter().map(|part| part.to_string()).collect::<Vec<_>>();
        assert!(is_root_help(&args(&[])));
        assert!(is_root_help(&args(&["-h"])));
        assert!(is_root_help(&args(&["--help"])));
        assert!(!is_root_help(&args(&["-h", "br1"])));
        assert!(!is_root_help(&args(&["br1"])));
    }

    #[test]
    fn test_running_cubes_only_for_root_help() {
        assert!(wants_running_cubes(&CommandDescriptor::help_request()));
        assert!(!wants_running_cubes(&descriptor(&["br1", "?"])));
        assert!(!wants_running_cubes(&descriptor(&["add", "?"])));
        assert!(!wants_running_cubes(&descriptor(&["br1", "show"])));
    }

    #[test]
    fn test_syntax_error_goes_to_stderr() {
        let mut transcript = Transcript::default();
        let args = vec!["br1".to_string(), "show".to_string(), "add".to_string()];
        let code = execute(&args, &Config::default(), &mut transcript);
        assert_eq!(code, exit_code::USAGE);
        assert_eq!(transcript.segments.len(), 1);
        assert_eq!(transcript.segments[0].stream, Stream::Err);
        assert_eq!(transcript.plain(), "Multiple commands found: add and show\n");
    }

    #[test]
    fn test_handled_alias_sends_nothing() {
        let mut transcript = Transcript::default();
        let args = vec!["connect".to_string(), "?".to_string()];
        let code = execute(&args, &Config::default(), &mut transcript);
        assert_eq!(code, exit_code::SUCCESS);
        assert!(transcript.plain().contains("connect"));
    }

    #[test]
    fn test_datamodel_unescape() {
        let mut transcript = Transcript::default();
        transcript.out("datamodel: module x {\\n\\tleaf \\\"a\\\";\n    }\n");
        transcript.unescape_datamodel();
        assert_eq!(transcript.plain(), "datamodel: module x {\n\tleaf \"a\"; }\n");
    }

    #[test]
    fn test_unescape_needs_datamodel() {
        let mut transcript = Transcript::default();
        transcript.out("path: c:\\new\n");
        transcript.unescape_datamodel();
        assert_eq!(transcript.plain(), "path: c:\\new\n");
    }

    #[test]
    fn test_paint_keeps_newline_outside_colors() {
        let painter = Painter::new(ColorMode::Always);
        assert_eq!(paint(&painter, Tone::Error, "boom\n"), "\x1b[31mboom\x1b[0m\n");
        assert_eq!(paint(&painter, Tone::Plain, "ok\n"), "ok\n");
    }
}
