use std::fmt::Write as _;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::{Config, OutputFormat};
use crate::engine::{RejectionReason, ReservationRegistry};
use crate::limits::MAX_TOP_SLOTS;
use crate::model::*;
use crate::report::{Summary, SummaryReporter};

pub const HELP: &str = "\
commands:
  book <resource> <name> <requester-id> <YYYY-MM-DD> <HH:MM|-> <HH:MM|-> [quantity]
  cancel <booking-id>
  available <YYYY-MM-DD>
  usage
  schedule
  summary [limit]
  help
  quit
resources: 1/Bed, 2/Ventilator, 3/Ultrasound, 4/Electrocardiograph
use '-' for both times to book the whole day; quote names containing spaces";

const RULE: &str = "------------------------";

/// Parsed console command.
#[derive(Debug, PartialEq)]
pub enum Command {
    Book(BookingRequest),
    Cancel { id: BookingId },
    Available { date: NaiveDate },
    Usage,
    Schedule,
    Summary { limit: Option<usize> },
    Help,
}

/// One line of console input: a command to run, or the request to leave.
#[derive(Debug, PartialEq)]
pub enum Input {
    Command(Command),
    Quit,
}

impl Command {
    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Command::Book(_) => "book",
            Command::Cancel { .. } => "cancel",
            Command::Available { .. } => "available",
            Command::Usage => "usage",
            Command::Schedule => "schedule",
            Command::Summary { .. } => "summary",
            Command::Help => "help",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0} (try 'help')")]
    UnknownCommand(String),
    #[error("{command}: expected {expected} arguments, got {got}")]
    WrongArity {
        command: &'static str,
        expected: &'static str,
        got: usize,
    },
    #[error("unterminated quote")]
    UnterminatedQuote,
    #[error("invalid number: {0}")]
    InvalidNumber(String),
    #[error(transparent)]
    Rejected(#[from] RejectionReason),
    #[error("render error: {0}")]
    Render(#[from] serde_json::Error),
}

/// Split on whitespace, keeping double-quoted runs together.
fn tokenize(line: &str) -> Result<Vec<String>, ConsoleError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if in_quotes {
        return Err(ConsoleError::UnterminatedQuote);
    }
    if has_token {
        tokens.push(current);
    }
    Ok(tokens)
}

fn optional_time(token: &str) -> Option<&str> {
    if token == "-" { None } else { Some(token) }
}

pub fn parse_line(line: &str) -> Result<Input, ConsoleError> {
    let tokens = tokenize(line)?;
    let Some((head, args)) = tokens.split_first() else {
        return Err(ConsoleError::Empty);
    };

    match head.to_ascii_lowercase().as_str() {
        "quit" | "exit" => Ok(Input::Quit),
        head => parse_command(head, args).map(Input::Command),
    }
}

fn parse_command(head: &str, args: &[String]) -> Result<Command, ConsoleError> {
    match head {
        "book" => parse_book(args),
        "cancel" => {
            let [id] = args else {
                return Err(ConsoleError::WrongArity {
                    command: "cancel",
                    expected: "1",
                    got: args.len(),
                });
            };
            let id = id.parse().map_err(|_| ConsoleError::InvalidNumber(id.clone()))?;
            Ok(Command::Cancel { id })
        }
        "available" => {
            let [date] = args else {
                return Err(ConsoleError::WrongArity {
                    command: "available",
                    expected: "1",
                    got: args.len(),
                });
            };
            Ok(Command::Available { date: parse_date(date)? })
        }
        "usage" => Ok(Command::Usage),
        "schedule" => Ok(Command::Schedule),
        "summary" => match args {
            [] => Ok(Command::Summary { limit: None }),
            [limit] => {
                let limit: usize = limit
                    .parse()
                    .map_err(|_| ConsoleError::InvalidNumber(limit.clone()))?;
                Ok(Command::Summary {
                    limit: Some(limit.min(MAX_TOP_SLOTS)),
                })
            }
            _ => Err(ConsoleError::WrongArity {
                command: "summary",
                expected: "0 or 1",
                got: args.len(),
            }),
        },
        "help" | "?" => Ok(Command::Help),
        other => Err(ConsoleError::UnknownCommand(other.to_string())),
    }
}

fn parse_book(args: &[String]) -> Result<Command, ConsoleError> {
    if !(6..=7).contains(&args.len()) {
        return Err(ConsoleError::WrongArity {
            command: "book",
            expected: "6 or 7",
            got: args.len(),
        });
    }
    let resource_type: ResourceType = args[0].parse()?;
    let requester = Requester::new(&args[1], &args[2])?;
    let interval = TimeInterval::parse(&args[3], optional_time(&args[4]), optional_time(&args[5]))?;
    let quantity = match args.get(6) {
        Some(q) => q.parse::<u32>().map_err(|_| {
            RejectionReason::InvalidQuantity(format!("'{q}' is not a positive integer"))
        })?,
        None => 1,
    };
    Ok(Command::Book(BookingRequest {
        resource_type,
        requester,
        interval,
        quantity,
    }))
}

/// Executes parsed commands against a registry and renders the results.
pub struct Console {
    registry: Arc<ReservationRegistry>,
    output: OutputFormat,
    top_slots: usize,
}

impl Console {
    pub fn new(registry: Arc<ReservationRegistry>, config: &Config) -> Self {
        Self {
            registry,
            output: config.output,
            top_slots: config.top_slots,
        }
    }

    pub async fn execute(&self, command: Command) -> Result<String, ConsoleError> {
        match command {
            Command::Book(request) => {
                let confirmation = self.registry.book(request).await?;
                self.render(&confirmation, render_confirmation)
            }
            Command::Cancel { id } => {
                let booking = self.registry.cancel(id).await?;
                self.render(&booking, render_cancellation)
            }
            Command::Available { date } => {
                let resources = self.registry.available_resources(date).await;
                self.render(&resources, |r| render_availability(date, r))
            }
            Command::Usage => {
                let usage = self.registry.usage().await;
                self.render(&usage, |u| render_usage(u))
            }
            Command::Schedule => {
                let schedule = self.registry.schedule().await;
                self.render(&schedule, |s| render_schedule(s))
            }
            Command::Summary { limit } => {
                let reporter = SummaryReporter::capture(&self.registry).await;
                let summary = reporter.summary(limit.unwrap_or(self.top_slots));
                self.render(&summary, render_summary)
            }
            Command::Help => Ok(HELP.to_string()),
        }
    }

    /// Parse, execute and render one input line. Errors are rendered too.
    /// Returns `None` when the line asks to quit.
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let result = match parse_line(line) {
            Ok(Input::Quit) => return None,
            Ok(Input::Command(command)) => {
                let label = command.label();
                let result = self.execute(command).await;
                let status = if result.is_ok() { "ok" } else { "error" };
                metrics::counter!(crate::observability::COMMANDS_TOTAL, "command" => label, "status" => status)
                    .increment(1);
                result
            }
            Err(e) => Err(e),
        };
        Some(result.unwrap_or_else(|e| format!("Error: {e}")))
    }

    fn render<T: Serialize + ?Sized>(&self, value: &T, text: impl FnOnce(&T) -> String) -> Result<String, ConsoleError> {
        match self.output {
            OutputFormat::Text => Ok(text(value)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        }
    }
}

// ── Text rendering ───────────────────────────────────────────────

fn render_confirmation(c: &BookingConfirmation) -> String {
    let r = &c.request;
    let ids: Vec<String> = c.booking_ids.iter().map(|id| id.to_string()).collect();
    let mut out = String::new();
    let _ = writeln!(out, "Booking Successful!");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Name: {}", r.requester.name);
    let _ = writeln!(out, "ID: {}", r.requester.id);
    let _ = writeln!(out, "Resource: {}", r.resource_type);
    let _ = writeln!(out, "Date: {}", r.interval.date().format(DATE_FORMAT));
    let _ = writeln!(out, "Time: {}", r.interval.window());
    let _ = writeln!(out, "Amount: {}", r.quantity);
    let _ = writeln!(out, "Booking IDs: {}", ids.join(", "));
    let _ = writeln!(out, "{} Left: {}", r.resource_type, c.remaining_capacity);
    out.push_str(RULE);
    out
}

fn render_cancellation(b: &Booking) -> String {
    format!(
        "Cancelled booking {}: {} {} for {}",
        b.id, b.resource_type, b.interval, b.requester
    )
}

fn render_availability(date: NaiveDate, resources: &[ResourceAvailability]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Available Resources on {}:", date.format(DATE_FORMAT));
    let _ = writeln!(out, "{RULE}");
    for r in resources {
        let _ = writeln!(out, "{}:", r.resource_type);
        let _ = writeln!(out, "  - Available: {}/{}", r.available, r.capacity);
        if r.unavailable_slots.is_empty() {
            let _ = writeln!(out, "  - Available all day");
            continue;
        }
        let _ = writeln!(out, "  - Unavailable time:");
        for slot in &r.unavailable_slots {
            match slot.holders.as_slice() {
                [only] => {
                    let _ = writeln!(out, "    - {} (Used by {only})", slot.interval.window());
                }
                holders => {
                    let _ = writeln!(
                        out,
                        "    - {} (Used by {} users)",
                        slot.interval.window(),
                        holders.len()
                    );
                }
            }
        }
    }
    out.push_str(RULE);
    out
}

fn render_usage(usage: &[Usage]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Resource Usage:");
    let _ = writeln!(out, "{RULE}");
    for u in usage {
        let _ = writeln!(out, "{}: {}/{}", u.resource_type, u.in_use, u.capacity);
    }
    out.push_str(RULE);
    out
}

fn render_schedule(bookings: &[Booking]) -> String {
    if bookings.is_empty() {
        return "No bookings.".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(out, "Current Schedule of Bookings:");
    let _ = writeln!(out, "{RULE}");
    for b in bookings {
        let _ = writeln!(
            out,
            "#{} {} {} - {}",
            b.id, b.interval, b.resource_type, b.requester
        );
    }
    out.push_str(RULE);
    out
}

fn render_summary(summary: &Summary) -> String {
    if summary.total_bookings == 0 {
        return "No bookings available for summary.".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(out, "Summary of Bookings ({} total):", summary.total_bookings);
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Number of bookings by resource:");
    for c in &summary.by_resource {
        let _ = writeln!(out, "  {}: {}", c.resource_type, c.bookings);
    }
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Top time slots with highest bookings:");
    for s in &summary.top_slots {
        let _ = writeln!(out, "  {}: {}", s.slot, s.bookings);
    }
    out.push_str(RULE);
    out
}
