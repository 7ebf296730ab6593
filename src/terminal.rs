// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

//! Line-oriented terminal frontend.
//!
//! The loop here is the UI context: it owns the [`AppState`], reads commands
//! from stdin and drains refresh reports between commands.

use anyhow::Result;
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::app::{AppState, Conversion, UiSink};
use crate::error::InputError;
use crate::models::{Currency, RateTable};
use crate::refresh::{RateRefresher, RefreshInbox};

pub const HELP: &str = "\
Commands:
  <keys>                  calculator keys, e.g. 12+8=  (C clears, bs deletes)
  convert <amount> [FROM TO]
  from <CODE> | to <CODE> | swap
  rates                   show the rate table
  refresh                 fetch live rates in the background
  help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Keys(Vec<String>),
    Convert {
        amount: String,
        currencies: Option<(Currency, Currency)>,
    },
    SelectFrom(Currency),
    SelectTo(Currency),
    Swap,
    Rates,
    Refresh,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, InputError> {
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let command = match (first.to_ascii_lowercase().as_str(), rest.as_slice()) {
        ("quit" | "exit" | "q", []) => Command::Quit,
        ("help" | "?", []) => Command::Help,
        ("rates", []) => Command::Rates,
        ("refresh", []) => Command::Refresh,
        ("swap", []) => Command::Swap,
        ("from", [code]) => Command::SelectFrom(code.parse()?),
        ("to", [code]) => Command::SelectTo(code.parse()?),
        ("convert", [amount]) => Command::Convert {
            amount: amount.to_string(),
            currencies: None,
        },
        ("convert", [amount, from, to]) => Command::Convert {
            amount: amount.to_string(),
            currencies: Some((from.parse()?, to.parse()?)),
        },
        ("clear", []) => Command::Keys(vec!["C".to_string()]),
        ("bs", []) => Command::Keys(vec!["BS".to_string()]),
        _ => Command::Keys(key_labels(line)?),
    };

    Ok(Some(command))
}

/// Split a run of calculator keys like `12+8=` into single-key labels.
pub fn key_labels(keys: &str) -> Result<Vec<String>, InputError> {
    keys.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '0'..='9' | '.' | '+' | '-' | '*' | '/' | '=' | '×' | '÷' | '⌫' => Ok(c.to_string()),
            'C' | 'c' => Ok("C".to_string()),
            other => Err(InputError::UnknownKey(other.to_string())),
        })
        .collect()
}

pub fn render_rates(table: &RateTable) -> String {
    let mut out = String::new();
    for (currency, rate) in table.iter() {
        out.push_str(&format!("{:<4} {:>12.4}  {}\n", currency, rate, currency.name()));
    }
    if let Some(fetched_at) = table.fetched_at() {
        out.push_str(&format!("fetched {}\n", fetched_at.format("%Y-%m-%d %H:%M:%S")));
    }
    out.trim_end().to_string()
}

/// Prints UI callbacks to stdout.
#[derive(Debug, Default)]
pub struct TerminalUi;

impl UiSink for TerminalUi {
    fn on_display_changed(&mut self, text: &str) {
        println!("[ {} ]", text);
    }

    fn on_conversion_result(&mut self, result: Result<&Conversion, &InputError>) {
        match result {
            Ok(conversion) => println!("Result: {}", conversion),
            Err(e) => println!("Error: {}", e),
        }
    }

    fn on_rate_status_changed(&mut self, as_of: &str, status: &str) {
        println!("{}\n{}", as_of, status);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Continue,
    Print(String),
    Quit,
}

/// The UI-side state plus the means to start refreshes.
pub struct Session {
    pub app: AppState,
    refresher: RateRefresher,
}

impl Session {
    pub fn new(app: AppState, refresher: RateRefresher) -> Self {
        Self { app, refresher }
    }

    pub fn execute(&mut self, command: Command, ui: &mut impl UiSink) -> Result<Flow, InputError> {
        match command {
            Command::Keys(labels) => {
                for label in &labels {
                    self.app.press(label, ui)?;
                }
            }
            Command::Convert { amount, currencies } => {
                if let Some((from, to)) = currencies {
                    self.app.select_from(Some(from));
                    self.app.select_to(Some(to));
                }
                self.app.convert_and_show(&amount, ui);
            }
            Command::SelectFrom(currency) => self.app.select_from(Some(currency)),
            Command::SelectTo(currency) => self.app.select_to(Some(currency)),
            Command::Swap => {
                self.app.swap();
                let (from, to) = self.app.selection();
                return Ok(Flow::Print(format!("{} -> {}", label(from), label(to))));
            }
            Command::Rates => {
                self.app.show_rate_status(ui);
                return Ok(Flow::Print(render_rates(self.app.rates())));
            }
            Command::Refresh => {
                let handle = self.app.begin_refresh(&self.refresher, ui);
                debug!(attempt = handle.attempt(), "Refresh requested");
            }
            Command::Help => return Ok(Flow::Print(HELP.to_string())),
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }
}

fn label(currency: Option<Currency>) -> &'static str {
    currency.map(Currency::code).unwrap_or("-")
}

/// Run the interactive loop until `quit` or end of input.
pub async fn run_interactive(
    mut session: Session,
    inbox: RefreshInbox,
    refresh_on_startup: bool,
) -> Result<()> {
    let mut ui = TerminalUi;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut reports = Box::pin(inbox.into_stream());

    println!("{}", HELP);
    session.app.show_rate_status(&mut ui);
    if refresh_on_startup {
        session.execute(Command::Refresh, &mut ui)?;
    }

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let command = match parse_command(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        println!("Error: {}", e);
                        continue;
                    }
                };
                match session.execute(command, &mut ui) {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Print(text)) => println!("{}", text),
                    Ok(Flow::Quit) => break,
                    Err(e) => println!("Error: {}", e),
                }
            }
            Some(report) = reports.next() => {
                session.app.apply_refresh(report, &mut ui);
            }
        }
    }

    Ok(())
}
