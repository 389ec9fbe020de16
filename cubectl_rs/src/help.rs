//! Help pages.
//!
//! Schema help is built from the daemon's answer to an `OPTIONS ?help=X`
//! request. A few client-side commands have fixed pages instead.

use crate::cli::command::{CommandDescriptor, CommandKind};
use crate::render::Node;
use crate::render::columns::ColumnFormat;
use crate::render::format::format_scalar;
use crate::types::CLIENT_NAME;

pub const NO_HELP: &str = "No help is available for this command";

pub const ROOT_HELP_HINT: &str = "For help on keywords use '?'";

const HEADER: [&str; 3] = ["Keyword", "Type", "Description"];

/// Client-side commands listed in the root help page.
const CLIENT_COMMANDS: &[(&str, &str)] = &[
    ("cubes", "Show running service instances (e.g. br1, nat2, ..)"),
    ("topology", "Show topology of service instances"),
    ("netdevs", "Show net devices available"),
];

/// A running service instance, as listed by `cubes/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningCube {
    pub service: String,
    pub name: String,
}

/// Inputs to schema help that do not come from the schema itself.
#[derive(Debug, Clone, Default)]
pub struct HelpContext {
    /// Top-level help (no tokens, or `-h`), which gets the keyword hint.
    pub root: bool,
    /// Show expert-only client commands.
    pub expert: bool,
    pub running: Vec<RunningCube>,
    pub max_width: Option<usize>,
}

/// Rows of a help table. Every row after the header is shifted right by
/// one space per cell.
#[derive(Debug, Default)]
struct HelpTable {
    rows: Vec<Vec<String>>,
    has_header: bool,
}

impl HelpTable {
    fn header(&mut self) {
        if !self.has_header {
            self.rows.insert(0, HEADER.iter().map(|cell| cell.to_string()).collect());
            self.has_header = true;
        }
    }

    fn row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.rows
            .push(cells.into_iter().map(|cell| format!(" {}", cell.as_ref())).collect());
    }

    fn blank(&mut self) {
        self.row([""]);
    }

    fn render(&self, max_width: Option<usize>) -> String {
        ColumnFormat::new().max_width(max_width).format(&self.rows)
    }
}

fn fields<'n>(schema: &'n Node, key: &str) -> &'n [(String, Node)] {
    match schema.get(key) {
        Some(Node::Object(fields)) => fields,
        _ => &[],
    }
}

fn list<'n>(schema: &'n Node, key: &str) -> &'n [Node] {
    match schema.get(key) {
        Some(Node::List(items)) => items,
        _ => &[],
    }
}

fn text<'n>(node: &'n Node, key: &str) -> &'n str {
    node.get(key).and_then(Node::as_str).unwrap_or("")
}

fn is_key(param: &Node) -> bool {
    text(param, "type") == "key"
}

/// Type column: leaves and keys show their simple type.
fn type_name(param: &Node) -> &str {
    match param.get("type").and_then(Node::as_str) {
        None | Some("leaf") | Some("key") => text(param, "simpletype"),
        Some("list") => "list",
        Some("complex") => "container",
        Some(_) => "",
    }
}

/// `(values, <key> placeholders)` for one list element.
fn element_row(element: &Node) -> (String, String) {
    let mut values = String::new();
    let mut keys = String::new();
    if let Node::Object(fields) = element {
        for (key, value) in fields {
            if let Node::Scalar(scalar) = value {
                values.push_str(&format_scalar(scalar));
                values.push(' ');
            }
            keys.push_str(&format!("<{}> ", key));
        }
    }
    (values, keys)
}

fn element_rows(table: &mut HelpTable, elements: &[Node]) {
    for element in elements {
        let (values, keys) = element_row(element);
        table.row([values, keys, String::new()]);
    }
}

fn key_param_rows(table: &mut HelpTable, params: &[(String, Node)]) {
    for (key, param) in params.iter().filter(|(_, param)| is_key(param)) {
        table.row([format!("<{}>", key).as_str(), type_name(param), text(param, "description")]);
    }
}

fn plain_param_rows(table: &mut HelpTable, params: &[(String, Node)], suffix: &str) {
    let plain: Vec<_> = params.iter().filter(|(_, param)| !is_key(param)).collect();
    if plain.is_empty() {
        return;
    }
    table.header();
    for (key, param) in plain {
        table.row([format!("{}{}", key, suffix).as_str(), type_name(param), text(param, "description")]);
    }
}

/// Render help for `descriptor` from the schema node the daemon returned.
pub fn schema_help(descriptor: &CommandDescriptor, schema: &Node, ctx: &HelpContext) -> String {
    let mut table = HelpTable::default();
    let mut example: Vec<String> = std::iter::once(CLIENT_NAME.to_string())
        .chain(descriptor.path_segments().iter().filter(|s| !s.is_empty()).cloned())
        .chain(std::iter::once(descriptor.command().keyword().to_string()))
        .filter(|part| !part.is_empty())
        .collect();

    let params = fields(schema, "params");
    let elements = list(schema, "elements");

    match descriptor.command() {
        CommandKind::Add => {
            if !params.is_empty() {
                table.header();
            }
            for (key, param) in params {
                table.row([format!("<{}>", key).as_str(), type_name(param), text(param, "description")]);
                example.push(text(param, "example").to_string());
            }
            let optional = fields(schema, "optional-params");
            if !optional.is_empty() {
                table.blank();
                table.row(["Other parameters:"]);
            }
            for (key, param) in optional {
                table.row([format!("{}=value", key).as_str(), type_name(param), text(param, "description")]);
                let sample = text(param, "example");
                if !sample.is_empty() {
                    example.push(format!("{}={}", key, sample));
                }
            }
        }
        CommandKind::Show => {
            plain_param_rows(&mut table, params, "");
            if !elements.is_empty() {
                table.header();
                element_rows(&mut table, elements);
            } else if !params.is_empty() {
                table.header();
                key_param_rows(&mut table, params);
            }
        }
        CommandKind::Set => {
            if !params.is_empty() {
                table.header();
            }
            for (key, param) in params {
                table.row([format!("{}=value", key).as_str(), type_name(param), text(param, "description")]);
            }
        }
        CommandKind::Del => {
            if let Some(first) = elements.first() {
                table.header();
                let (values, _) = element_row(first);
                example.extend(values.split_whitespace().map(str::to_string));
                element_rows(&mut table, elements);
            } else {
                if !params.is_empty() {
                    table.header();
                }
                for (key, param) in params {
                    table.row([format!("<{}>", key).as_str(), type_name(param), text(param, "description")]);
                    example.push(text(param, "example").to_string());
                }
            }
        }
        CommandKind::None => {
            no_command_rows(&mut table, descriptor, schema, ctx);
        }
    }

    let mut out = String::new();
    if ctx.root {
        out.push_str(ROOT_HELP_HINT);
        out.push('\n');
    }
    out.push('\n');

    if !table.has_header {
        out.push_str(NO_HELP);
        out.push('\n');
        return out;
    }

    out.push_str(&table.render(ctx.max_width));
    if matches!(descriptor.command(), CommandKind::Add | CommandKind::Del) {
        example.retain(|part| !part.is_empty());
        out.push_str(&format!("\nExample:\n {}\n", example.join(" ")));
    }
    out
}

fn no_command_rows(table: &mut HelpTable, descriptor: &CommandDescriptor, schema: &Node, ctx: &HelpContext) {
    let commands = list(schema, "commands");
    if !commands.is_empty() {
        table.header();
    }
    for command in commands.iter().filter_map(Node::as_str) {
        let description = CommandKind::from_keyword(command)
            .map(|kind| kind.description())
            .unwrap_or_default();
        table.row([command, "command", description.as_str()]);
    }

    let params = fields(schema, "params");
    if schema.get("params").is_some() {
        plain_param_rows(table, params, "");
    } else {
        plain_param_rows(table, fields(schema, "in"), "=value");
    }

    let elements = list(schema, "elements");
    if !elements.is_empty() {
        table.header();
        element_rows(table, elements);
    } else if !params.is_empty() {
        table.header();
        key_param_rows(table, params);
    }

    let actions = list(schema, "actions");
    if !actions.is_empty() {
        table.header();
    }
    for action in actions.iter().filter_map(Node::as_str) {
        table.row([action, "action", ""]);
    }

    if descriptor.path_segments().is_empty() {
        table.blank();
        table.row(["connect", "command", "Connect ports"]);
        table.row(["disconnect", "command", "Disconnect ports"]);
        table.row(["attach", "command", "Attach a transparent service to a port"]);
        table.row(["detach", "command", "Detach a transparent service from a port"]);
        table.blank();
        if ctx.expert {
            table.row(["services", "command", "Show/Add/Del services (e.g. Bridge, Router, ..)"]);
        }
        for (name, description) in CLIENT_COMMANDS {
            table.row([*name, "command", *description]);
        }

        if !ctx.running.is_empty() {
            table.blank();
            table.row(["Running Services", "Type"]);
            for cube in &ctx.running {
                table.row([cube.name.as_str(), cube.service.as_str(), "Running Service instance"]);
            }
        }
    }
}

/// Running instances from a `cubes/` answer: service name to list of cubes.
pub fn running_cubes(cubes: &Node) -> Vec<RunningCube> {
    let Node::Object(services) = cubes else {
        return Vec::new();
    };
    services
        .iter()
        .flat_map(|(service, instances)| {
            let instances: &[Node] = match instances {
                Node::List(items) => items,
                _ => &[],
            };
            instances.iter().filter_map(move |instance| {
                instance.get("name").and_then(Node::as_str).map(|name| RunningCube {
                    service: service.clone(),
                    name: name.to_string(),
                })
            })
        })
        .collect()
}

// ============================================================================
// Fixed pages for client-side commands
// ============================================================================

fn page(table: &HelpTable, example: Option<&str>) -> String {
    let mut out = format!("\n{}", table.render(None));
    if let Some(example) = example {
        out.push_str(&format!("\nExample:\n {}\n", example));
    }
    out
}

/// `connect ?` and `disconnect ?`.
pub fn connect_help(keyword: &str) -> String {
    let mut table = HelpTable::default();
    table.header();
    table.row(["<from>", "cube:port", "Endpoint of the connection (E.g. br1:port1)"]);
    table.row(["<to>", "cube:port", "Endpoint of the connection (E.g. rt2:port2)"]);
    page(&table, Some(&format!("{} br1:port1 rt2:port2", keyword)))
}

pub fn attach_help() -> String {
    let mut table = HelpTable::default();
    table.header();
    table.row(["<cube>", "string", "Transparent service instance to attach (E.g. fw1)"]);
    table.row(["<port>", "cube:port", "Port the service is attached to (E.g. br1:port1)"]);
    table.blank();
    table.row(["Other parameters:"]);
    table.row(["position=value", "auto|first|last", "Position in the chain of the port"]);
    table.row(["before=value", "string", "Attach before this service"]);
    table.row(["after=value", "string", "Attach after this service"]);
    page(&table, Some("attach fw1 br1:port1 position=first"))
}

pub fn detach_help() -> String {
    let mut table = HelpTable::default();
    table.header();
    table.row(["<cube>", "string", "Transparent service instance to detach (E.g. fw1)"]);
    table.row(["<port>", "cube:port", "Port the service is attached to (E.g. br1:port1)"]);
    page(&table, Some("detach fw1 br1:port1"))
}

/// `services [add|del|show] ?`.
pub fn services_help(command: CommandKind) -> String {
    let mut table = HelpTable::default();
    match command {
        CommandKind::None => {
            table.header();
            for kind in [CommandKind::Add, CommandKind::Del, CommandKind::Show] {
                table.row([kind.keyword(), "command", kind.description().as_str()]);
            }
            page(&table, None)
        }
        CommandKind::Add => {
            table.header();
            table.row(["name=value", "string", "Name of the service"]);
            table.row([
                "servicecontroller=value",
                "string",
                "Name of the library (e.g. libpcn-bridge.so)",
            ]);
            page(
                &table,
                Some("services add name=bridge servicecontroller=libpcn-bridge.so"),
            )
        }
        CommandKind::Del | CommandKind::Show => {
            table.header();
            table.row(["<name>", "string", "Name of the service"]);
            page(&table, Some(&format!("services {} bridge", command)))
        }
        CommandKind::Set => format!("\n{}\n", NO_HELP),
    }
}
