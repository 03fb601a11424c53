//! Inbound command recognition.
//!
//! Commands are recognized by unanchored patterns rather than by strict
//! command parsing: a message triggers every command whose pattern appears
//! anywhere in it, and text that matches nothing is ignored.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use teloxide::utils::command::BotCommands;

/// Bot commands, as advertised in the chat client's command menu.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Greeting")]
    Start,

    #[command(description = "Show this help")]
    Help,

    #[command(description = "Check that the bot is alive")]
    Ping,

    #[command(description = "Basic system status")]
    Status,

    #[command(description = "List active, downloading or paused torrents")]
    Torrents,

    #[command(description = "Pause torrent: /pause <id>")]
    Pause(String),

    #[command(description = "Resume torrent: /resume <id>")]
    Resume(String),

    #[command(description = "Add a torrent: /add <magnet link>")]
    Add(String),
}

impl Command {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Ping => "ping",
            Command::Status => "status",
            Command::Torrents => "torrents",
            Command::Pause(_) => "pause",
            Command::Resume(_) => "resume",
            Command::Add(_) => "add",
        }
    }
}

/// A compiled command pattern.
struct CommandPattern {
    regex: Regex,
    build: fn(&Captures<'_>) -> Command,
}

impl CommandPattern {
    fn new(pattern: &str, build: fn(&Captures<'_>) -> Command) -> Self {
        Self {
            regex: Regex::new(pattern).expect("Invalid command pattern"),
            build,
        }
    }
}

fn first_group(caps: &Captures<'_>) -> String {
    caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default()
}

fn patterns() -> &'static [CommandPattern] {
    static PATTERNS: OnceLock<Vec<CommandPattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            CommandPattern::new(r"/start", |_| Command::Start),
            CommandPattern::new(r"/help", |_| Command::Help),
            CommandPattern::new(r"/ping", |_| Command::Ping),
            CommandPattern::new(r"/status", |_| Command::Status),
            CommandPattern::new(r"(?i)/torrents", |_| Command::Torrents),
            CommandPattern::new(r"/pause (\d+)", |c| Command::Pause(first_group(c))),
            CommandPattern::new(r"/resume (\d+)", |c| Command::Resume(first_group(c))),
            CommandPattern::new(r"(?i)/add (.+)", |c| Command::Add(first_group(c))),
        ]
    })
}

/// Every command triggered by `text`, in pattern order.
pub fn parse_commands(text: &str) -> Vec<Command> {
    patterns()
        .iter()
        .filter_map(|p| p.regex.captures(text).map(|caps| (p.build)(&caps)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse_commands("/start"), vec![Command::Start]);
        assert_eq!(parse_commands("/help"), vec![Command::Help]);
        assert_eq!(parse_commands("/ping"), vec![Command::Ping]);
        assert_eq!(parse_commands("/status"), vec![Command::Status]);
        assert_eq!(parse_commands("/torrents"), vec![Command::Torrents]);
    }

    #[test]
    fn test_torrents_is_case_insensitive() {
        assert_eq!(parse_commands("/TORRENTS"), vec![Command::Torrents]);
        assert!(parse_commands("/PING").is_empty());
    }

    #[test]
    fn test_pause_and_resume_require_digits() {
        assert_eq!(parse_commands("/pause 12"), vec![Command::Pause("12".to_string())]);
        assert_eq!(parse_commands("/resume 7"), vec![Command::Resume("7".to_string())]);
        assert!(parse_commands("/pause abc").is_empty());
        assert!(parse_commands("/pause").is_empty());
        assert!(parse_commands("/resume -3").is_empty());
    }

    #[test]
    fn test_add_captures_rest_of_line() {
        assert_eq!(
            parse_commands("/ADD  magnet:?xt=urn:btih:abc "),
            vec![Command::Add(" magnet:?xt=urn:btih:abc ".to_string())]
        );
        assert!(parse_commands("/add").is_empty());
    }

    #[test]
    fn test_unmatched_text() {
        assert!(parse_commands("hello there").is_empty());
        assert!(parse_commands("/unknown").is_empty());
    }

    #[test]
    fn test_patterns_are_unanchored() {
        assert_eq!(parse_commands("please /ping"), vec![Command::Ping]);
        assert_eq!(parse_commands("/start@seedbot_bot"), vec![Command::Start]);
        assert_eq!(
            parse_commands("/help /ping"),
            vec![Command::Help, Command::Ping]
        );
    }

    #[test]
    fn test_command_menu_lists_every_command() {
        assert_eq!(Command::bot_commands().len(), 8);
    }
}
