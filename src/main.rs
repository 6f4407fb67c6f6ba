// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::sync::Arc;

use anyhow::{bail, Context};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use the_tmtc_console::catalog::{Catalog, CatalogReader, Payload};
use the_tmtc_console::config::consts::DEFAULT_LOG_FILTER;
use the_tmtc_console::config::{load_and_validate_catalog, NodeKind};
use the_tmtc_console::model::{DeviceIdentifier, Message, Variant};
use the_tmtc_console::multiplex::{Filter, MultiplexHub, SelectCriteria};
use the_tmtc_console::nodes::{Terminal, TranscriptEntry};

const HELP: &str = "\
Commands:
  send <device> <name> [attr=value ...]   send a command through the multiplex
  query <device> <name>                   stored message with that name
  get <device> <attr>                     current value of an attribute
  select <device> [name]                  all stored messages, or one by name
  stats <device>                          record count and index overhead
  dump <device>                           table snapshot as JSON
  wiring                                  established catalog bindings
  help                                    this text
  quit";

/// One line typed at the console prompt.
#[derive(Debug, PartialEq)]
enum Command {
    Send {
        device: DeviceIdentifier,
        name: String,
        attributes: Vec<(String, Variant)>,
    },
    Query { device: DeviceIdentifier, name: String },
    Get { device: DeviceIdentifier, attribute: String },
    Select { device: DeviceIdentifier, name: Option<String> },
    Stats { device: DeviceIdentifier },
    Dump { device: DeviceIdentifier },
    Wiring,
    Help,
    Quit,
}

impl Command {
    /// Parse a console line. Blank lines parse to `None`.
    fn parse(line: &str) -> anyhow::Result<Option<Command>> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let device = |position: usize| -> anyhow::Result<DeviceIdentifier> {
            args.get(position)
                .map(DeviceIdentifier::new)
                .with_context(|| format!("'{}' needs a device", verb))
        };
        let word = |position: usize, what: &str| -> anyhow::Result<String> {
            args.get(position)
                .map(|s| s.to_string())
                .with_context(|| format!("'{}' needs {}", verb, what))
        };

        let command = match verb {
            "send" => {
                let mut attributes = Vec::new();
                for pair in args.iter().skip(2) {
                    let Some((name, value)) = pair.split_once('=') else {
                        bail!("attribute '{}' is not of the form name=value", pair);
                    };
                    attributes.push((name.to_string(), Variant::parse(value)));
                }
                Command::Send {
                    device: device(0)?,
                    name: word(1, "a message name")?,
                    attributes,
                }
            }
            "query" => Command::Query {
                device: device(0)?,
                name: word(1, "a message name")?,
            },
            "get" => Command::Get {
                device: device(0)?,
                attribute: word(1, "an attribute name")?,
            },
            "select" => Command::Select {
                device: device(0)?,
                name: args.get(1).map(|s| s.to_string()),
            },
            "stats" => Command::Stats { device: device(0)? },
            "dump" => Command::Dump { device: device(0)? },
            "wiring" => Command::Wiring,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => bail!("unknown command '{}' (try 'help')", other),
        };
        Ok(Some(command))
    }
}

/// The catalog plus the two nodes the console talks to directly.
struct Console {
    catalog: Catalog,
    hub: Arc<MultiplexHub>,
    terminal: Arc<Terminal>,
}

impl Console {
    fn open(path: &str) -> anyhow::Result<Self> {
        let config = load_and_validate_catalog(path).with_context(|| format!("loading catalog '{}'", path))?;
        let catalog = CatalogReader::read(&config)?;
        wire_return_paths(&catalog)?;

        let hub = catalog
            .multiplex()
            .cloned()
            .context("catalog declares no multiplex node")?;
        let terminal = catalog
            .terminal()
            .cloned()
            .context("catalog declares no terminal node")?;
        Ok(Self { catalog, hub, terminal })
    }

    /// Run one command. Returns `false` when the session should end.
    fn execute(&self, command: Command) -> anyhow::Result<bool> {
        match command {
            Command::Send {
                device,
                name,
                attributes,
            } => {
                let mut message = Message::new(device, name);
                for (attr, value) in attributes {
                    message = message.with_attribute(attr, value);
                }
                let seen = self.terminal.transcript_len();
                self.terminal.send(message);
                for entry in self.terminal.transcript_since(seen) {
                    print_entry(&entry);
                }
            }
            Command::Query { device, name } => match self.hub.query(&Message::new(device, name)) {
                Some(message) => println!("  {}", message),
                None => println!("  (no such message)"),
            },
            Command::Get { device, attribute } => match self.hub.query_value(&device, &attribute) {
                Some(value) => println!("  {} = {}", attribute, value),
                None => println!("  (no value for '{}')", attribute),
            },
            Command::Select { device, name } => {
                let filter = name.map(Filter::Name).unwrap_or(Filter::All);
                let mut criteria = SelectCriteria::new(filter);
                self.hub.select(&device, &mut criteria)?;
                if criteria.matches().is_empty() {
                    println!("  (empty selection)");
                }
                for message in criteria.matches() {
                    println!("  {}", message);
                }
            }
            Command::Stats { device } => {
                let stats = self
                    .hub
                    .stats(&device)
                    .with_context(|| format!("device '{}' is not configured", device))?;
                println!("  state:             {:?}", stats.state);
                println!("  records:           {}", stats.record_count);
                println!("  overhead temporal: {}", stats.overhead_temporal);
                println!("  overhead spatial:  {}", stats.overhead_spatial);
            }
            Command::Dump { device } => {
                let snapshot = self
                    .hub
                    .snapshot(&device)
                    .with_context(|| format!("device '{}' is not configured", device))?;
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            }
            Command::Wiring => print_wiring(&self.catalog),
            Command::Help => println!("{}", HELP),
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }
}

/// Connect each terminal and loopback link back into the first multiplex.
///
/// A receiver id accepts one sender, so the catalog document wires the
/// multiplex outwards and the upstream halves are added here.
fn wire_return_paths(catalog: &Catalog) -> anyhow::Result<()> {
    let Some(hub_id) = catalog.ids_of(NodeKind::Multiplex).first().copied() else {
        return Ok(());
    };
    for id in catalog.ids_of(NodeKind::Terminal) {
        catalog.link(id, "send", hub_id, "received_from_user")?;
    }
    for id in catalog.ids_of(NodeKind::Loopback) {
        catalog.link(id, "received", hub_id, "received_from_device")?;
    }
    Ok(())
}

fn print_wiring(catalog: &Catalog) {
    println!("🔌 Wiring:");
    for binding in catalog.resolver().established() {
        println!("  {}", binding);
    }
    for diagnostic in &catalog.report().diagnostics {
        println!("  ⚠️  {}", diagnostic);
    }
}

fn print_entry(entry: &TranscriptEntry) {
    match entry {
        TranscriptEntry::Sent(message) => println!("  ➡️  {}", message),
        TranscriptEntry::Received(Payload::Message(message)) => println!("  ⬅️  {}", message),
        TranscriptEntry::Received(Payload::Text(text)) => println!("  ⬅️  {}", text),
        TranscriptEntry::Received(Payload::Empty) => {}
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Level is overridden by `RUST_LOG`; logs go to stderr, the console to stdout
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <catalog.yaml>", args[0]);
        eprintln!("Example: {} configs/console-demo.yaml", args[0]);
        std::process::exit(1);
    }

    let console = Console::open(&args[1])?;

    println!("🛰️  TM/TC Console");
    println!("═══════════════════════════════════");
    println!("Catalog: {}", args[1]);
    println!(
        "Devices: {}",
        console
            .hub
            .devices()
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    print_wiring(&console.catalog);
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("❌ {}", e);
                continue;
            }
        };
        match console.execute(command) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => println!("❌ {:#}", e),
        }
    }

    Ok(())
}
