//! Line-oriented terminal front end for the dashboard.
//!
//! Each input line is one edit (a keystroke burst in a browser). Edits to
//! the search parameters go through the debouncer; fetches run on spawned
//! tasks so the console keeps accepting edits while they are in flight.

use crate::chart::render_text;
use crate::dashboard::Dashboard;
use crate::debounce::QueryDebouncer;
use crate::store::FetchTicket;
use crate::types::{Article, ChartKind, NewsError, NewsSource, QueryParameters, Result};
use crate::utils::today;
use chrono::NaiveDate;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

const CHART_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Pdf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Query(String),
    From(Option<NaiveDate>),
    To(Option<NaiveDate>),
    Author(String),
    Rate(String),
    Chart(ChartKind),
    Theme,
    /// Fetch right away, skipping the debounce window.
    Fetch,
    Export(ExportFormat),
    Show,
    /// Hold input until pending triggers and fetches have settled.
    Wait,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  q <text>            search query (debounced)
  from <YYYY-MM-DD>   start date, '-' clears
  to <YYYY-MM-DD>     end date, '-' clears
  author <text>       filter by author, empty clears
  rate <amount>       payout per article
  chart line|bar|pie  switch chart projection
  theme               toggle light/dark
  fetch               fetch now
  export csv|pdf      write the payout report
  show                redraw the dashboard
  wait                wait for pending fetches
  quit";

fn parse_date_arg(arg: &str) -> Result<Option<NaiveDate>> {
    if arg.is_empty() || arg == "-" {
        return Ok(None);
    }
    NaiveDate::parse_from_str(arg, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| NewsError::General(format!("Invalid date {:?}: {}", arg, e)))
}

pub fn parse_command(line: &str) -> Result<Command> {
    let line = line.trim();
    let (verb, arg) = match line.split_once(char::is_whitespace) {
        Some((verb, arg)) => (verb, arg.trim()),
        None => (line, ""),
    };

    match verb {
        "q" | "query" | "search" => Ok(Command::Query(arg.to_string())),
        "from" => Ok(Command::From(parse_date_arg(arg)?)),
        "to" => Ok(Command::To(parse_date_arg(arg)?)),
        "author" => Ok(Command::Author(arg.to_string())),
        "rate" => Ok(Command::Rate(arg.to_string())),
        "chart" => Ok(Command::Chart(arg.parse()?)),
        "theme" => Ok(Command::Theme),
        "fetch" => Ok(Command::Fetch),
        "export" => match arg.to_lowercase().as_str() {
            "csv" => Ok(Command::Export(ExportFormat::Csv)),
            "pdf" => Ok(Command::Export(ExportFormat::Pdf)),
            other => Err(NewsError::General(format!("Unknown export format: {}", other))),
        },
        "show" | "" => Ok(Command::Show),
        "wait" => Ok(Command::Wait),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(NewsError::General(format!("Unknown command: {}", other))),
    }
}

/// Full text rendering of the dashboard.
pub fn render_dashboard(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    let ctx = dashboard.context();
    let user = ctx
        .user()
        .and_then(|u| u.email.clone())
        .unwrap_or_else(|| "unknown user".to_string());
    let params = dashboard.params();
    let show_date = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string());

    out.push_str(&format!("== News Dashboard == [{} theme] signed in as {}\n", ctx.theme(), user));
    out.push_str(&format!(
        "Search: {:?}  From: {}  To: {}  Author filter: {:?}\n",
        params.query,
        show_date(params.from),
        show_date(params.to),
        dashboard.author_filter()
    ));
    out.push_str(&format!(
        "Payout per article: ${}  Total Payout: ${}\n",
        dashboard.rate(),
        dashboard.total_display()
    ));

    let chart = dashboard.chart();
    out.push_str(&format!("-- Article Trends ({:?}) --\n", chart.kind));
    out.push_str(&render_text(&chart, CHART_WIDTH));

    if dashboard.loading() {
        out.push_str("Loading articles...\n");
        return out;
    }

    let cards = dashboard.cards();
    out.push_str(&format!("-- Articles ({}) --\n", cards.len()));
    for (i, card) in cards.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, card.title));
        out.push_str(&format!("   {} | {}\n", card.author, card.date));
        out.push_str(&format!("   {}\n", card.description));
    }
    out
}

fn spawn_fetch(
    source: Arc<dyn NewsSource>,
    ticket: FetchTicket,
    done_tx: mpsc::UnboundedSender<(FetchTicket, Vec<Article>)>,
) {
    tokio::spawn(async move {
        let articles = source.fetch(&ticket.params).await;
        // Console already gone: nothing left to update.
        let _ = done_tx.send((ticket, articles));
    });
}

enum Flow {
    Continue,
    Wait,
    Quit,
}

struct Console<W: Write> {
    dashboard: Dashboard,
    source: Arc<dyn NewsSource>,
    debouncer: QueryDebouncer,
    done_tx: mpsc::UnboundedSender<(FetchTicket, Vec<Article>)>,
    awaiting_trigger: bool,
    output: W,
}

impl<W: Write> Console<W> {
    fn push_params(&mut self) {
        self.debouncer.push(self.dashboard.params().clone());
        self.awaiting_trigger = true;
    }

    fn start_fetch(&mut self, params: QueryParameters) {
        let ticket = self.dashboard.begin_fetch(params);
        spawn_fetch(self.source.clone(), ticket, self.done_tx.clone());
    }

    fn apply(&mut self, command: Command) -> Result<Flow> {
        let today = today();
        match command {
            Command::Query(query) => {
                self.dashboard.set_query(query);
                self.push_params();
            }
            Command::From(from) => {
                self.dashboard.set_from(from, today)?;
                self.push_params();
            }
            Command::To(to) => {
                self.dashboard.set_to(to, today)?;
                self.push_params();
            }
            Command::Author(author) => {
                self.dashboard.set_author_filter(author);
                writeln!(
                    self.output,
                    "{} articles match, Total Payout: ${}",
                    self.dashboard.filtered().len(),
                    self.dashboard.total_display()
                )?;
            }
            Command::Rate(input) => {
                self.dashboard.set_payout_rate(&input)?;
                writeln!(self.output, "Total Payout: ${}", self.dashboard.total_display())?;
            }
            Command::Chart(kind) => {
                self.dashboard.select_chart(kind);
                write!(self.output, "{}", render_text(&self.dashboard.chart(), CHART_WIDTH))?;
            }
            Command::Theme => {
                let theme = self.dashboard.context_mut().toggle_theme();
                writeln!(self.output, "Theme: {}", theme)?;
            }
            Command::Fetch => {
                // The immediate fetch covers the current parameters.
                self.debouncer.cancel();
                self.awaiting_trigger = false;
                let params = self.dashboard.params().clone();
                self.start_fetch(params);
            }
            Command::Export(format) => {
                let exported = match format {
                    ExportFormat::Csv => self.dashboard.export_csv(),
                    ExportFormat::Pdf => self.dashboard.export_pdf(),
                };
                // Only failures writing to `output` end the console.
                match exported {
                    Ok(outcome) => {
                        writeln!(self.output, "Wrote {} rows to {}", outcome.rows, outcome.path.display())?
                    }
                    Err(e) => {
                        warn!("Export failed: {}", e);
                        writeln!(self.output, "error: {}", e)?
                    }
                }
            }
            Command::Show => write!(self.output, "{}", render_dashboard(&self.dashboard))?,
            Command::Wait => return Ok(Flow::Wait),
            Command::Help => writeln!(self.output, "{}", HELP)?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Run one line; user errors are reported and the console carries on.
    fn handle_line(&mut self, line: &str) -> Result<Flow> {
        match parse_command(line).and_then(|command| self.apply(command)) {
            Ok(flow) => Ok(flow),
            Err(NewsError::Io(e)) => Err(NewsError::Io(e)),
            Err(e) => {
                writeln!(self.output, "error: {}", e)?;
                Ok(Flow::Continue)
            }
        }
    }

    fn settled(&self) -> bool {
        !self.awaiting_trigger && !self.dashboard.loading()
    }
}

/// Drive the dashboard from `input` until `quit` or end of input, writing
/// to `output`. Returns the dashboard so callers can inspect final state.
pub async fn run_console<R, W>(
    dashboard: Dashboard,
    source: Arc<dyn NewsSource>,
    debounce: Duration,
    input: R,
    output: W,
) -> Result<Dashboard>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let (debouncer, mut triggers) = QueryDebouncer::new(debounce);
    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    let mut console = Console {
        dashboard,
        source,
        debouncer,
        done_tx,
        awaiting_trigger: false,
        output,
    };

    let mut lines = input.lines();
    let mut input_open = true;
    let mut waiting = false;

    // Initial load, as on first render.
    console.push_params();

    loop {
        if waiting && console.settled() {
            waiting = false;
            write!(console.output, "{}", render_dashboard(&console.dashboard))?;
        }
        if !input_open && !waiting {
            break;
        }

        tokio::select! {
            line = lines.next_line(), if input_open && !waiting => {
                match line? {
                    Some(line) => match console.handle_line(&line)? {
                        Flow::Continue => {}
                        Flow::Wait => waiting = true,
                        Flow::Quit => break,
                    },
                    None => {
                        debug!("Console input closed");
                        input_open = false;
                    }
                }
            }
            Some(params) = triggers.recv() => {
                console.awaiting_trigger = false;
                console.start_fetch(params);
            }
            Some((ticket, articles)) = done_rx.recv() => {
                let seq = ticket.seq;
                if console.dashboard.complete_fetch(ticket, articles) {
                    writeln!(
                        console.output,
                        "Fetch #{}: {} articles, Total Payout: ${}",
                        seq,
                        console.dashboard.filtered().len(),
                        console.dashboard.total_display()
                    )?;
                } else {
                    warn!("Fetch #{} arrived after a newer result and was dropped", seq);
                }
            }
        }
    }

    console.debouncer.cancel();
    Ok(console.dashboard)
}
