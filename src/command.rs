//! Inbound command grammar
//!
//! Turns one received line into a typed [`Command`]. A line starting with
//! `/` names a command by its first whitespace-delimited token; anything
//! else is chat text. Arity is checked here so handlers only ever see
//! well-formed commands.

use crate::error::CommandError;

/// Client → Server command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Broadcast text to every online user (`/say` or bare text)
    Say { text: String },
    /// Change own nickname
    Nick { nickname: String },
    /// Private message to one user
    Whisper { target: String, text: String },
    /// List online users with their addresses
    List,
    /// Show the help block (`/help` or `/?`)
    Help,
    /// Look up a user's address
    Whois { target: String },
    /// Disconnect a user
    Kick { target: String },
    /// Ban a user's address and disconnect everyone on it
    IpBan { target: String },
    /// Any other `/keyword`; rejected by the dispatcher, not the parser
    Unknown { keyword: String },
}

impl Command {
    /// Parse a single decoded line.
    ///
    /// Returns `CommandError::IncorrectSyntax` when a recognized keyword has
    /// the wrong number of arguments.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();

        if !line.starts_with('/') {
            if line.is_empty() {
                return Err(syntax_error("/say"));
            }
            return Ok(Command::Say {
                text: line.to_string(),
            });
        }

        let (keyword, rest) = split_first(line);
        let args: Vec<&str> = rest.split_whitespace().collect();

        match keyword {
            "/say" => {
                if rest.is_empty() {
                    return Err(syntax_error(keyword));
                }
                Ok(Command::Say {
                    text: rest.to_string(),
                })
            }
            "/nick" => single_arg(keyword, &args).map(|nickname| Command::Nick { nickname }),
            "/whisper" => {
                let (target, text) = split_first(rest);
                if target.is_empty() || text.is_empty() {
                    return Err(syntax_error(keyword));
                }
                Ok(Command::Whisper {
                    target: target.to_string(),
                    text: text.to_string(),
                })
            }
            "/list" => no_args(keyword, &args).map(|()| Command::List),
            "/help" | "/?" => no_args(keyword, &args).map(|()| Command::Help),
            "/whois" => single_arg(keyword, &args).map(|target| Command::Whois { target }),
            "/kick" => single_arg(keyword, &args).map(|target| Command::Kick { target }),
            "/ipban" => single_arg(keyword, &args).map(|target| Command::IpBan { target }),
            _ => Ok(Command::Unknown {
                keyword: keyword.to_string(),
            }),
        }
    }
}

/// Split off the first whitespace-delimited token, returning it and the
/// remainder with leading whitespace removed.
fn split_first(s: &str) -> (&str, &str) {
    match s.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim_start()),
        None => (s, ""),
    }
}

fn single_arg(keyword: &str, args: &[&str]) -> Result<String, CommandError> {
    match args {
        [arg] => Ok((*arg).to_string()),
        _ => Err(syntax_error(keyword)),
    }
}

fn no_args(keyword: &str, args: &[&str]) -> Result<(), CommandError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(syntax_error(keyword))
    }
}

fn syntax_error(keyword: &str) -> CommandError {
    CommandError::IncorrectSyntax(keyword.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_text_is_say() {
        let cmd = Command::parse("hello there  world\n").unwrap();
        assert_eq!(
            cmd,
            Command::Say {
                text: "hello there  world".to_string()
            }
        );
    }

    #[test]
    fn test_say_keyword_strips_keyword() {
        let cmd = Command::parse("/say hi all").unwrap();
        assert_eq!(
            cmd,
            Command::Say {
                text: "hi all".to_string()
            }
        );
    }

    #[test]
    fn test_say_requires_text() {
        assert!(Command::parse("/say").is_err());
        assert!(Command::parse("/say   ").is_err());
        assert!(Command::parse("   \n").is_err());
    }

    #[test]
    fn test_nick_arity() {
        assert_eq!(
            Command::parse("/nick Alice").unwrap(),
            Command::Nick {
                nickname: "Alice".to_string()
            }
        );
        assert_eq!(
            Command::parse("/nick"),
            Err(CommandError::IncorrectSyntax("/nick".to_string()))
        );
        assert!(Command::parse("/nick Alice Bob").is_err());
    }

    #[test]
    fn test_whisper_keeps_spaces_in_text() {
        let cmd = Command::parse("/whisper Bob hello  there").unwrap();
        assert_eq!(
            cmd,
            Command::Whisper {
                target: "Bob".to_string(),
                text: "hello  there".to_string()
            }
        );
    }

    #[test]
    fn test_whisper_needs_target_and_text() {
        assert!(Command::parse("/whisper").is_err());
        assert!(Command::parse("/whisper Bob").is_err());
    }

    #[test]
    fn test_no_argument_commands() {
        assert_eq!(Command::parse("/list").unwrap(), Command::List);
        assert_eq!(Command::parse("/help").unwrap(), Command::Help);
        assert_eq!(Command::parse("/?").unwrap(), Command::Help);
        assert!(Command::parse("/list all").is_err());
        assert!(Command::parse("/? me").is_err());
    }

    #[test]
    fn test_target_commands() {
        assert_eq!(
            Command::parse("/whois Bob").unwrap(),
            Command::Whois {
                target: "Bob".to_string()
            }
        );
        assert_eq!(
            Command::parse("/kick Bob").unwrap(),
            Command::Kick {
                target: "Bob".to_string()
            }
        );
        assert_eq!(
            Command::parse("/ipban Bob").unwrap(),
            Command::IpBan {
                target: "Bob".to_string()
            }
        );
        assert!(Command::parse("/whois").is_err());
        assert!(Command::parse("/kick Bob now").is_err());
        assert!(Command::parse("/ipban").is_err());
    }

    #[test]
    fn test_unknown_keyword_is_accepted() {
        let cmd = Command::parse("/dance wildly").unwrap();
        assert_eq!(
            cmd,
            Command::Unknown {
                keyword: "/dance".to_string()
            }
        );
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(
            Command::parse("/NICK Alice").unwrap(),
            Command::Unknown {
                keyword: "/NICK".to_string()
            }
        );
    }
}
