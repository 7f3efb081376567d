//! Text commands a host application forwards to the client.
//!
//! Only `ChangeHost <value>` exists. The command word is matched
//! case-insensitively; the value is everything after it, trimmed.

use std::str::FromStr;

use crate::error::WebreqError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ChangeHost(String),
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, WebreqError> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        if word.eq_ignore_ascii_case("ChangeHost") {
            if rest.is_empty() {
                return Err(WebreqError::MissingCommandValue("ChangeHost"));
            }
            return Ok(Command::ChangeHost(rest.to_string()));
        }
        Err(WebreqError::UnknownCommand(word.to_string()))
    }
}

impl FromStr for Command {
    type Err = WebreqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::parse(s)
    }
}
