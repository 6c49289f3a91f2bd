use std::fmt::Display;
use std::io::Write;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Failed to read input")]
    Io { source: std::io::Error },

    #[error("Input closed before a {what} was selected")]
    InputClosed { what: String },

    #[error("Found {count} {what}s but interactive mode is disabled. Please pass --{what} to choose one.")]
    SelectionRequired { what: String, count: usize },
}

/// Numbered-list picker used for profiles and clusters.
pub struct Prompter<I> {
    input: I,
    interactive: bool,
}

impl<I> Prompter<I>
where
    I: AsyncBufRead + Unpin,
{
    pub fn new(input: I, interactive: bool) -> Self {
        Self { input, interactive }
    }

    /// Returns the index of the chosen item. A single item is picked without
    /// asking. Callers must reject an empty list before calling this.
    pub async fn choose<T, W>(
        &mut self,
        out: &mut W,
        what: &str,
        heading: &str,
        items: &[T],
    ) -> Result<usize, PromptError>
    where
        T: Display,
        W: Write,
    {
        if items.len() <= 1 {
            return Ok(0);
        }

        if !self.interactive {
            return Err(PromptError::SelectionRequired {
                what: what.to_string(),
                count: items.len(),
            });
        }

        let io = |source| PromptError::Io { source };

        writeln!(out, "\n{}", heading).map_err(io)?;
        for (i, item) in items.iter().enumerate() {
            writeln!(out, "  {}. {}", i + 1, item).map_err(io)?;
        }

        let mut line = String::new();
        loop {
            write!(out, "\nSelect {} (1-{}): ", what, items.len()).map_err(io)?;
            out.flush().map_err(io)?;

            line.clear();
            let read = self.input.read_line(&mut line).await.map_err(io)?;
            if read == 0 {
                return Err(PromptError::InputClosed {
                    what: what.to_string(),
                });
            }

            match parse_choice(&line, items.len()) {
                Some(index) => return Ok(index),
                None => writeln!(
                    out,
                    "Invalid selection. Please choose a number between 1 and {}.",
                    items.len()
                )
                .map_err(io)?,
            }
        }
    }
}

/// Maps a 1-based answer onto a 0-based index, or `None` if it is out of range.
fn parse_choice(input: &str, count: usize) -> Option<usize> {
    match input.trim().parse::<usize>() {
        Ok(choice) if (1..=count).contains(&choice) => Some(choice - 1),
        _ => None,
    }
}
