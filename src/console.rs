//! Line commands of the interactive front end.

use std::path::PathBuf;

use crate::models::{ColorLimits, QuantizationRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Load an image file
    Open(PathBuf),
    /// Set the color count
    Colors(i64),
    /// One color more (scroll up)
    More,
    /// One color less (scroll down)
    Less,
    /// Set or, with `None`, toggle monochrome
    Mono(Option<bool>),
    /// Save the quantized image
    Save(PathBuf),
    /// Save the palette strip
    Palette(PathBuf),
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  open <path>      Load an image
  colors <n>       Set the number of colors
  more | less      One color more or less
  mono [on|off]    Set or toggle monochrome
  save <path>      Save the posterized image as PNG
  palette <path>   Save the palette as PNG
  status           Show session state
  quit             Exit";

impl ConsoleCommand {
    /// Parse one input line; `Ok(None)` for blank lines
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "open" | "o" => ConsoleCommand::Open(path_arg(word, rest)?),
            "colors" | "c" => {
                let n = rest
                    .parse::<i64>()
                    .map_err(|_| format!("'{word}' needs a number, got '{rest}'"))?;
                ConsoleCommand::Colors(n)
            }
            "more" | "+" => ConsoleCommand::More,
            "less" | "-" => ConsoleCommand::Less,
            "mono" | "x" => match rest.to_ascii_lowercase().as_str() {
                "" => ConsoleCommand::Mono(None),
                "on" | "true" | "1" => ConsoleCommand::Mono(Some(true)),
                "off" | "false" | "0" => ConsoleCommand::Mono(Some(false)),
                other => return Err(format!("'mono' takes on or off, got '{other}'")),
            },
            "save" | "s" => ConsoleCommand::Save(path_arg(word, rest)?),
            "palette" | "p" => ConsoleCommand::Palette(path_arg(word, rest)?),
            "status" => ConsoleCommand::Status,
            "help" | "?" => ConsoleCommand::Help,
            "quit" | "exit" | "q" => ConsoleCommand::Quit,
            other => return Err(format!("Unknown command '{other}', try 'help'")),
        };
        Ok(Some(command))
    }

    /// New control state after this command, if it changes the controls
    pub fn apply(
        &self,
        current: QuantizationRequest,
        limits: ColorLimits,
    ) -> Option<QuantizationRequest> {
        match *self {
            ConsoleCommand::Colors(n) => Some(QuantizationRequest::clamped(
                n,
                current.monochrome,
                limits,
            )),
            ConsoleCommand::More => Some(current.stepped(1, limits)),
            ConsoleCommand::Less => Some(current.stepped(-1, limits)),
            ConsoleCommand::Mono(None) => Some(current.toggled()),
            ConsoleCommand::Mono(Some(on)) => Some(current.with_monochrome(on)),
            _ => None,
        }
    }
}

fn path_arg(word: &str, rest: &str) -> Result<PathBuf, String> {
    if rest.is_empty() {
        Err(format!("'{word}' needs a path"))
    } else {
        Ok(PathBuf::from(rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: ColorLimits = ColorLimits { min: 2, max: 32 };

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            ConsoleCommand::parse("open photos/cat.jpg").unwrap(),
            Some(ConsoleCommand::Open(PathBuf::from("photos/cat.jpg")))
        );
        assert_eq!(
            ConsoleCommand::parse("  colors 12 ").unwrap(),
            Some(ConsoleCommand::Colors(12))
        );
        assert_eq!(ConsoleCommand::parse("x").unwrap(), Some(ConsoleCommand::Mono(None)));
        assert_eq!(
            ConsoleCommand::parse("mono off").unwrap(),
            Some(ConsoleCommand::Mono(Some(false)))
        );
        assert_eq!(ConsoleCommand::parse("QUIT").unwrap(), Some(ConsoleCommand::Quit));
        assert_eq!(ConsoleCommand::parse("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_keeps_spaces_in_paths() {
        assert_eq!(
            ConsoleCommand::parse("save my output.png").unwrap(),
            Some(ConsoleCommand::Save(PathBuf::from("my output.png")))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(ConsoleCommand::parse("colors many").is_err());
        assert!(ConsoleCommand::parse("open").is_err());
        assert!(ConsoleCommand::parse("mono maybe").is_err());
        assert!(ConsoleCommand::parse("frobnicate").is_err());
    }

    #[test]
    fn test_apply_adjusts_controls() {
        let current = QuantizationRequest::new(6, false);
        assert_eq!(
            ConsoleCommand::Colors(100).apply(current, LIMITS),
            Some(QuantizationRequest::new(32, false))
        );
        assert_eq!(
            ConsoleCommand::Less.apply(current, LIMITS),
            Some(QuantizationRequest::new(5, false))
        );
        assert_eq!(
            ConsoleCommand::Mono(None).apply(current, LIMITS),
            Some(QuantizationRequest::new(6, true))
        );
        assert_eq!(ConsoleCommand::Status.apply(current, LIMITS), None);
    }
}
