//! Line decoder
//!
//! Turns exactly one terminated line of client input into a [`Command`].
//!
//! ```text
//! LOGIN <name>
//! LOGOUT
//! JOIN #<room>
//! PART #<room>
//! MSG <target> <text>
//! ```
//!
//! Keywords are case-sensitive and come from [`CommandKind::keyword`].
//! A line ends at the first CR or LF; a CRLF pair counts as one terminator.
//! Names, rooms and text are byte runs; no encoding is assumed.

use crate::command::{Command, CommandKind};
use crate::error::DecodeError;
use crate::types::ROOM_SIGIL;

/// Decode one line of client input
///
/// `line` must hold the payload followed by CR, LF or CRLF and nothing
/// else. Input without a terminator fails with [`DecodeError::Unterminated`].
pub fn decode(line: &[u8]) -> Result<Command, DecodeError> {
    let payload = strip_terminator(line)?;
    Scanner::new(payload).command()
}

/// Split off the line terminator, returning the payload
fn strip_terminator(line: &[u8]) -> Result<&[u8], DecodeError> {
    let end = line
        .iter()
        .position(|&b| b == b'\r' || b == b'\n')
        .ok_or(DecodeError::Unterminated)?;

    let terminator = &line[end..];
    let terminator_len = if terminator.starts_with(b"\r\n") { 2 } else { 1 };
    if terminator.len() > terminator_len {
        // More than one line was handed in
        return Err(DecodeError::TrailingArguments);
    }

    Ok(&line[..end])
}

/// Cursor over a single line payload (terminator already removed)
struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    fn command(&mut self) -> Result<Command, DecodeError> {
        match self.peek() {
            Some(b'L') => self.login_or_logout(),
            Some(b'J') => {
                let room = self.one_arg(CommandKind::Join, Self::room)?;
                Ok(Command::Join { room })
            }
            Some(b'P') => {
                let room = self.one_arg(CommandKind::Part, Self::room)?;
                Ok(Command::Part { room })
            }
            Some(b'M') => self.message(),
            _ => Err(DecodeError::InvalidCommand),
        }
    }

    /// LOGIN and LOGOUT share "LOG"; the 4th byte tells them apart.
    fn login_or_logout(&mut self) -> Result<Command, DecodeError> {
        if self.input.get(3) == Some(&b'O') {
            self.keyword(CommandKind::Logout)?;
            self.finish()?;
            Ok(Command::Logout)
        } else {
            let name = self.one_arg(CommandKind::Login, Self::word)?;
            Ok(Command::Login { name })
        }
    }

    fn message(&mut self) -> Result<Command, DecodeError> {
        self.keyword(CommandKind::Message)?;
        self.separator()?;

        // Rooms first, then fall back to a plain user name
        let mark = self.pos;
        let receiver = match self.room() {
            Ok(room) => room,
            Err(_) => {
                self.pos = mark;
                self.word()?
            }
        };

        self.separator()?;
        let text = self.text()?;

        Ok(Command::Message {
            receiver: receiver.to_vec(),
            text: text.to_vec(),
        })
    }

    /// `<keyword> <arg>` with nothing but spaces after the argument
    fn one_arg(
        &mut self,
        kind: CommandKind,
        arg: fn(&mut Scanner<'a>) -> Result<&'a [u8], DecodeError>,
    ) -> Result<Vec<u8>, DecodeError> {
        self.keyword(kind)?;
        self.separator()?;
        let value = arg(self)?;
        self.finish()?;
        Ok(value.to_vec())
    }

    fn keyword(&mut self, kind: CommandKind) -> Result<(), DecodeError> {
        let keyword = kind.keyword();
        if !self.rest().starts_with(keyword.as_bytes()) {
            return Err(DecodeError::InvalidCommand);
        }
        self.pos += keyword.len();
        Ok(())
    }

    /// At least one space, then any number more
    fn separator(&mut self) -> Result<(), DecodeError> {
        if self.peek() != Some(b' ') {
            return Err(DecodeError::MissingSeparator);
        }
        self.skip_spaces();
        Ok(())
    }

    fn skip_spaces(&mut self) {
        while self.peek() == Some(b' ') {
            self.pos += 1;
        }
    }

    /// Non-empty run of non-whitespace bytes
    fn word(&mut self) -> Result<&'a [u8], DecodeError> {
        let rest = self.rest();
        let len = rest
            .iter()
            .position(|b| b.is_ascii_whitespace())
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(DecodeError::EmptyArgument);
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    /// `#` followed by a word; the sigil is kept in the result
    fn room(&mut self) -> Result<&'a [u8], DecodeError> {
        let start = self.pos;
        match self.peek() {
            None => return Err(DecodeError::EmptyArgument),
            Some(ROOM_SIGIL) => self.pos += 1,
            Some(_) => return Err(DecodeError::MissingSigil),
        }
        if let Err(e) = self.word() {
            self.pos = start;
            return Err(e);
        }
        Ok(&self.input[start..self.pos])
    }

    /// Everything up to the end of the line, spaces included
    fn text(&mut self) -> Result<&'a [u8], DecodeError> {
        let rest = self.rest();
        if rest.is_empty() {
            return Err(DecodeError::EmptyArgument);
        }
        self.pos = self.input.len();
        Ok(rest)
    }

    /// Only spaces may remain
    fn finish(&mut self) -> Result<(), DecodeError> {
        self.skip_spaces();
        if self.pos != self.input.len() {
            return Err(DecodeError::TrailingArguments);
        }
        Ok(())
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn rest(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login(name: &str) -> Command {
        Command::Login {
            name: name.as_bytes().to_vec(),
        }
    }

    fn join(room: &str) -> Command {
        Command::Join {
            room: room.as_bytes().to_vec(),
        }
    }

    fn msg(receiver: &str, text: &str) -> Command {
        Command::Message {
            receiver: receiver.as_bytes().to_vec(),
            text: text.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_login() {
        assert_eq!(decode(b"LOGIN alice\r\n"), Ok(login("alice")));
        assert_eq!(decode(b"LOGIN alice\n"), Ok(login("alice")));
        assert_eq!(decode(b"LOGIN alice\r"), Ok(login("alice")));
    }

    #[test]
    fn test_login_extra_spaces() {
        assert_eq!(decode(b"LOGIN   alice  \r\n"), Ok(login("alice")));
    }

    #[test]
    fn test_login_no_newline() {
        assert_eq!(decode(b"LOGIN alice"), Err(DecodeError::Unterminated));
    }

    #[test]
    fn test_login_requires_separator() {
        assert_eq!(decode(b"LOGINalice\r\n"), Err(DecodeError::MissingSeparator));
        assert_eq!(decode(b"LOGIN\r\n"), Err(DecodeError::MissingSeparator));
    }

    #[test]
    fn test_login_missing_name() {
        assert_eq!(decode(b"LOGIN \r\n"), Err(DecodeError::EmptyArgument));
    }

    #[test]
    fn test_login_trailing_word() {
        assert_eq!(decode(b"LOGIN alice bob\r\n"), Err(DecodeError::TrailingArguments));
    }

    #[test]
    fn test_logout() {
        assert_eq!(decode(b"LOGOUT\n"), Ok(Command::Logout));
        assert_eq!(decode(b"LOGOUT\r\n"), Ok(Command::Logout));
        assert_eq!(decode(b"LOGOUT  \r\n"), Ok(Command::Logout));
    }

    #[test]
    fn test_logout_no_newline() {
        assert_eq!(decode(b"LOGOUT"), Err(DecodeError::Unterminated));
    }

    #[test]
    fn test_logout_with_argument() {
        assert_eq!(decode(b"LOGOUT now\r\n"), Err(DecodeError::TrailingArguments));
        assert_eq!(decode(b"LOGOUTX\r\n"), Err(DecodeError::TrailingArguments));
    }

    #[test]
    fn test_misspelled_log_keyword() {
        assert_eq!(decode(b"LOGX alice\r\n"), Err(DecodeError::InvalidCommand));
        assert_eq!(decode(b"LOGOFF\r\n"), Err(DecodeError::InvalidCommand));
        assert_eq!(decode(b"L\r\n"), Err(DecodeError::InvalidCommand));
    }

    #[test]
    fn test_join() {
        assert_eq!(decode(b"JOIN #chatroom\r\n"), Ok(join("#chatroom")));
    }

    #[test]
    fn test_join_missing_sigil() {
        let err = decode(b"JOIN chatroom\r\n").unwrap_err();
        assert_eq!(err, DecodeError::MissingSigil);
        assert_eq!(err.to_string(), "chatrooms must begin with '#'");
    }

    #[test]
    fn test_join_missing_room_name() {
        assert_eq!(decode(b"JOIN #\n"), Err(DecodeError::EmptyArgument));
        assert_eq!(decode(b"JOIN \n"), Err(DecodeError::EmptyArgument));
    }

    #[test]
    fn test_join_no_newline() {
        assert_eq!(decode(b"JOIN #test"), Err(DecodeError::Unterminated));
    }

    #[test]
    fn test_join_trailing_word() {
        assert_eq!(decode(b"JOIN #a #b\r\n"), Err(DecodeError::TrailingArguments));
    }

    #[test]
    fn test_join_keyword_runs_into_argument() {
        assert_eq!(decode(b"JOIN#room\r\n"), Err(DecodeError::MissingSeparator));
        assert_eq!(decode(b"JOINT #room\r\n"), Err(DecodeError::MissingSeparator));
    }

    #[test]
    fn test_part() {
        assert_eq!(
            decode(b"PART #chatroom\r\n"),
            Ok(Command::Part {
                room: b"#chatroom".to_vec()
            })
        );
        assert_eq!(decode(b"PART chatroom\r\n"), Err(DecodeError::MissingSigil));
        assert_eq!(decode(b"PART #\n"), Err(DecodeError::EmptyArgument));
        assert_eq!(decode(b"PART #test"), Err(DecodeError::Unterminated));
    }

    #[test]
    fn test_msg_to_room() {
        assert_eq!(
            decode(b"MSG #chatroom hello, world\r\n"),
            Ok(msg("#chatroom", "hello, world"))
        );
    }

    #[test]
    fn test_msg_to_user() {
        assert_eq!(
            decode(b"MSG username hello, world\r\n"),
            Ok(msg("username", "hello, world"))
        );
    }

    #[test]
    fn test_msg_text_keeps_inner_spaces() {
        assert_eq!(decode(b"MSG bob  a  b \n"), Ok(msg("bob", "a  b ")));
    }

    #[test]
    fn test_msg_lone_sigil_falls_back_to_word() {
        assert_eq!(decode(b"MSG # hi\r\n"), Ok(msg("#", "hi")));
    }

    #[test]
    fn test_msg_no_newline() {
        assert_eq!(
            decode(b"MSG username hello, world"),
            Err(DecodeError::Unterminated)
        );
    }

    #[test]
    fn test_msg_missing_text() {
        assert_eq!(decode(b"MSG bob\r\n"), Err(DecodeError::MissingSeparator));
        assert_eq!(decode(b"MSG bob \r\n"), Err(DecodeError::EmptyArgument));
        assert_eq!(decode(b"MSG \r\n"), Err(DecodeError::EmptyArgument));
    }

    #[test]
    fn test_unknown_keyword() {
        assert_eq!(decode(b"HELLO\r\n"), Err(DecodeError::InvalidCommand));
        assert_eq!(decode(b"join #room\r\n"), Err(DecodeError::InvalidCommand));
        assert_eq!(decode(b"\r\n"), Err(DecodeError::InvalidCommand));
        assert_eq!(decode(b" LOGIN alice\r\n"), Err(DecodeError::InvalidCommand));
    }

    #[test]
    fn test_more_than_one_line() {
        assert_eq!(
            decode(b"LOGIN alice\r\nJOIN #a\r\n"),
            Err(DecodeError::TrailingArguments)
        );
        assert_eq!(decode(b"LOGIN alice\n\n"), Err(DecodeError::TrailingArguments));
    }

    #[test]
    fn test_non_utf8_operands_kept_verbatim() {
        assert_eq!(
            decode(b"LOGIN \xff\xfe\r\n"),
            Ok(Command::Login {
                name: vec![0xff, 0xfe]
            })
        );
        assert_eq!(
            decode(b"MSG bob caf\xe9\r\n"),
            Ok(Command::Message {
                receiver: b"bob".to_vec(),
                text: b"caf\xe9".to_vec(),
            })
        );
        assert_eq!(
            decode(b"JOIN #\xe9t\xe9\r\n"),
            Ok(Command::Join {
                room: b"#\xe9t\xe9".to_vec()
            })
        );
    }

    #[test]
    fn test_utf8_name() {
        assert_eq!(decode("LOGIN zoë\r\n".as_bytes()), Ok(login("zoë")));
    }

    #[test]
    fn test_decode_is_pure() {
        for line in [&b"MSG #room same input\r\n"[..], &b"JOIN room\r\n"[..]] {
            let first = decode(line);
            let second = decode(line);
            assert_eq!(first, second);
        }
    }
}
