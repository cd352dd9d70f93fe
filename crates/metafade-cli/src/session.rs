// File: crates/metafade-cli/src/session.rs

//! The interactive session: a line-oriented event loop over the reducer.

use crate::config::Config;
use anyhow::{Context, Result, bail};
use metafade_core::{
    AppState, Command, Event, ImageHandle, Inspector, PickMode, PickOutcome, PickRequest, Picker,
    ScrubOutcome, render, scrub_all,
};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

pub const HELP: &str = "\
Commands:
  single       pick one image
  multiple     pick several images
  toggle <n>   show or hide the metadata of image n
  proceed      remove metadata from the selected images
  clear        drop the current selection
  state        print the session state as JSON
  help         show this help
  quit         leave the session";

/// One parsed line of user input.
#[derive(Debug, PartialEq)]
enum Input {
    Event(Event),
    State,
    Help,
    Quit,
}

fn parse_input(line: &str) -> Result<Option<Input>> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let input = match command.to_ascii_lowercase().as_str() {
        "single" => Input::Event(Event::RequestPick(PickMode::Single)),
        "multiple" => Input::Event(Event::RequestPick(PickMode::Multiple)),
        "toggle" | "show" => {
            let number: usize = words
                .next()
                .context("toggle needs an image number")?
                .parse()
                .context("image numbers are whole numbers")?;
            if number == 0 {
                bail!("image numbers start at 1");
            }
            Input::Event(Event::ToggleMetadata(number - 1))
        }
        "proceed" => Input::Event(Event::Proceed),
        "clear" => Input::Event(Event::Clear),
        "state" => Input::State,
        "help" | "?" => Input::Help,
        "quit" | "exit" => Input::Quit,
        other => bail!("unknown command `{other}`, try `help`"),
    };
    Ok(Some(input))
}

/// Terminal front end. Reads commands and picker answers from the same
/// line source, writes screens to `out`.
pub struct Console<R, W> {
    lines: Lines<R>,
    out: W,
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(input: R, out: W) -> Self {
        Self {
            lines: input.lines(),
            out,
        }
    }

    async fn next_line(&mut self) -> Result<Option<String>> {
        self.lines
            .next_line()
            .await
            .context("Failed to read from input")
    }

    fn say(&mut self, text: impl std::fmt::Display) -> Result<()> {
        writeln!(self.out, "{text}").context("Failed to write output")
    }

    pub fn into_output(self) -> W {
        self.out
    }
}

impl<R, W> Picker for Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    async fn pick(&mut self, request: PickRequest) -> PickOutcome {
        let prompt = match request.mode {
            PickMode::Single => "Image path (empty line cancels):",
            PickMode::Multiple => "Image paths, one per line (empty line ends the list):",
        };
        if let Err(e) = self.say(prompt) {
            tracing::warn!("{e:#}");
        }

        let mut handles = Vec::new();
        loop {
            let line = match self.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("{e:#}");
                    return PickOutcome::Cancelled;
                }
            };
            let path = line.trim();
            if path.is_empty() {
                break;
            }
            handles.push(ImageHandle::new(path));
            if request.mode == PickMode::Single {
                break;
            }
        }
        PickOutcome::from_handles(request, handles)
    }
}

/// How a session ended.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub scrubbed: usize,
    pub failed: usize,
}

/// Runs the session until `quit` or end of input.
pub async fn run<R, W>(
    console: &mut Console<R, W>,
    config: &Config,
    inspector: &impl Inspector,
) -> Result<Summary>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut state = AppState::default();
    let mut summary = Summary::default();

    loop {
        console.say(render(&state, inspector))?;
        let Some(line) = console.next_line().await? else {
            break;
        };

        let event = match parse_input(&line) {
            Ok(None) => continue,
            Ok(Some(Input::Event(event))) => event,
            Ok(Some(Input::State)) => {
                console.say(serde_json::to_string_pretty(&state)?)?;
                continue;
            }
            Ok(Some(Input::Help)) => {
                console.say(HELP)?;
                continue;
            }
            Ok(Some(Input::Quit)) => break,
            Err(e) => {
                console.say(format!("{e:#}"))?;
                continue;
            }
        };

        let mut next = state.update(event);
        while let Some(command) = next.take() {
            next = match command {
                Command::Pick(request) => {
                    let outcome = console.pick(request).await;
                    state.update(Event::PickerResolved(outcome))
                }
                Command::Scrub(handles) => {
                    let results = scrub_all(&handles, &config.profile, config.save_target());
                    let mut outcomes = Vec::with_capacity(results.len());
                    for (handle, result) in &results {
                        match result {
                            Ok(report) => {
                                summary.scrubbed += 1;
                                console.say(format!(
                                    "Removed {} metadata entries from {}.",
                                    report.metadata_removed.len(),
                                    handle.label()
                                ))?;
                            }
                            Err(e) => {
                                summary.failed += 1;
                                console.say(format!("Failed to scrub {}: {e}", handle.label()))?;
                            }
                        }
                        outcomes.push(ScrubOutcome::from_result(handle.clone(), result));
                    }
                    state.update(Event::ScrubFinished(outcomes))
                }
            };
        }
    }

    Ok(summary)
}
