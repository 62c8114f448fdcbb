//! Parsing of lines typed into the interactive session.

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Plain text: send it as a prompt
    Ask(String),
    /// Blank line: send whatever is in the composer
    AskComposer,
    NewThread,
    ListThreads,
    /// Switch to the n-th listed thread (1-based)
    Switch(usize),
    /// Delete the n-th listed thread (1-based)
    Delete(usize),
    Clear,
    Retry,
    ListPrompts,
    /// Insert the n-th suggested prompt into the composer (1-based)
    UsePrompt(usize),
    Help,
    Quit,
    /// A slash command that could not be understood
    Invalid(String),
}

pub const HELP_TEXT: &str = "\
Commands:
  <text>       ask a question
  (empty)      send the composer contents
  /new         start a new conversation
  /threads     list conversations
  /switch <n>  switch to conversation n
  /delete <n>  delete conversation n
  /clear       clear the current conversation
  /retry       put the last failed prompt back in the composer
  /prompts     list suggested prompts
  /use <n>     put suggested prompt n in the composer
  /help        show this help
  /quit        exit
Press Ctrl+C while an answer streams to stop it.";

/// Parse one input line.
pub fn parse_command(line: &str) -> ReplCommand {
    let line = line.trim();
    if line.is_empty() {
        return ReplCommand::AskComposer;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return ReplCommand::Ask(line.to_string());
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();
    let extra = parts.next().is_some();

    let numbered = |make: fn(usize) -> ReplCommand| match arg.map(str::parse::<usize>) {
        Some(Ok(n)) if n > 0 && !extra => make(n),
        _ => ReplCommand::Invalid(format!("/{} expects a number, e.g. /{} 1", name, name)),
    };

    match name {
        "new" => ReplCommand::NewThread,
        "threads" | "list" => ReplCommand::ListThreads,
        "switch" => numbered(ReplCommand::Switch),
        "delete" => numbered(ReplCommand::Delete),
        "clear" => ReplCommand::Clear,
        "retry" => ReplCommand::Retry,
        "prompts" => ReplCommand::ListPrompts,
        "use" => numbered(ReplCommand::UsePrompt),
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        other => ReplCommand::Invalid(format!("Unknown command /{}. Type /help.", other)),
    }
}
