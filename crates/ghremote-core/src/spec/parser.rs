//! Recursive-descent parser for remote specs.
//!
//! ```text
//! spec     := [owner "/"] repo ["/" subdir] [selector]
//! subdir   := segment ("/" segment)*
//! selector := "@*" | "@" ref | "#" digits
//! ```
//!
//! `owner`, `repo` and subdir segments stop at `/`, `@` or `#`. A ref runs
//! to the end of the input, so branch names such as `feature/x` survive.

use crate::error::{RemoteError, Result};

use super::{RELEASE_MARKER, RepoSpec, Selector};

const SEPARATORS: [char; 3] = ['/', '@', '#'];

pub(super) struct SpecParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> SpecParser<'a> {
    pub(super) fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub(super) fn parse(mut self) -> Result<RepoSpec> {
        let first = self.segment("repository")?;

        let (owner, repo) = if self.eat('/') {
            let repo = self.segment("repository")?;
            (Some(first), repo)
        } else {
            (None, first)
        };

        let subdir = if self.eat('/') {
            Some(self.subdir()?)
        } else {
            None
        };

        let selector = self.selector()?;

        Ok(RepoSpec {
            owner,
            repo,
            subdir,
            selector,
        })
    }

    /// One or more `/`-separated, non-empty segments.
    fn subdir(&mut self) -> Result<String> {
        let mut parts = vec![self.segment("subdirectory")?];
        while self.eat('/') {
            parts.push(self.segment("subdirectory")?);
        }
        Ok(parts.join("/"))
    }

    fn selector(&mut self) -> Result<Option<Selector>> {
        let start = self.pos;
        let Some(marker) = self.bump() else {
            return Ok(None);
        };

        let rest = self.rest();
        match marker {
            '@' if rest == RELEASE_MARKER => Ok(Some(Selector::Release)),
            '@' if rest.starts_with(RELEASE_MARKER) => Err(self.error(format!(
                "release selector must be exactly '@{RELEASE_MARKER}', got '@{rest}'"
            ))),
            '@' if rest.is_empty() => {
                Err(self.error(format!("empty ref after '@' at offset {start}")))
            }
            '@' => {
                self.reject_blank(rest, "ref", self.pos)?;
                Ok(Some(Selector::Ref(rest.to_string())))
            }
            '#' => self.pull_number(rest).map(|n| Some(Selector::Pull(n))),
            other => Err(self.error(format!("unexpected '{other}' at offset {start}"))),
        }
    }

    fn pull_number(&self, digits: &str) -> Result<u64> {
        if digits.is_empty() {
            return Err(self.error("missing pull request number after '#'"));
        }
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(self.error(format!(
                "pull request number must be digits, got '{digits}'"
            )));
        }
        match digits.parse::<u64>() {
            Ok(0) => Err(self.error("pull request number must be positive")),
            Ok(number) => Ok(number),
            Err(_) => Err(self.error(format!("pull request number '{digits}' is too large"))),
        }
    }

    /// Read up to the next separator; the result must be non-empty.
    fn segment(&mut self, field: &str) -> Result<String> {
        let start = self.pos;
        let rest = self.rest();
        let len = rest.find(SEPARATORS).unwrap_or(rest.len());
        let value = &rest[..len];

        if value.is_empty() {
            return Err(match self.peek() {
                None if start > 0 => self.error(format!("trailing '/' leaves an empty {field}")),
                None => self.error(format!("missing {field}")),
                Some(c) => self.error(format!("empty {field} before '{c}' at offset {start}")),
            });
        }
        self.reject_blank(value, field, start)?;

        self.pos += len;
        Ok(value.to_string())
    }

    fn reject_blank(&self, value: &str, field: &str, offset: usize) -> Result<()> {
        if let Some((i, c)) = value
            .char_indices()
            .find(|(_, c)| c.is_whitespace() || c.is_control())
        {
            return Err(self.error(format!(
                "{field} contains {c:?} at offset {}",
                offset + i
            )));
        }
        Ok(())
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn error(&self, reason: impl Into<String>) -> RemoteError {
        RemoteError::invalid_spec(self.input, reason)
    }
}
