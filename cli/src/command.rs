//! Permissive parser for the command grammar shared by process arguments and REPL lines
//!
//! Unknown switches and stray words never fail a line; they are collected in
//! [`ParsedLine::ignored`]. Recognized switches become [`Action`]s, emitted in
//! the fixed order help, add, list, done, delete, version, exit.

use todo_core::{ListFilter, TodoError, TodoId, TodoValidator};

/// Topics with their own help text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelpTopic {
    Add,
    List,
    Done,
    Delete,
    Version,
}

impl HelpTopic {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "add" => Some(HelpTopic::Add),
            "list" => Some(HelpTopic::List),
            "done" => Some(HelpTopic::Done),
            "delete" => Some(HelpTopic::Delete),
            "version" => Some(HelpTopic::Version),
            _ => None,
        }
    }
}

/// One thing a line asks the session to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Welcome,
    /// `None` is general help
    Help(Option<HelpTopic>),
    Add,
    List(ListFilter),
    Toggle(Vec<TodoId>),
    Delete(Vec<TodoId>),
    Version,
    Exit,
    /// A switch was recognized but its value was missing or malformed
    Invalid(TodoError),
}

/// Actions in execution order plus the tokens nobody claimed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLine {
    pub actions: Vec<Action>,
    pub ignored: Vec<String>,
}

impl ParsedLine {
    pub fn is_noop(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn wants_exit(&self) -> bool {
        self.actions.contains(&Action::Exit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Switch {
    Help,
    Add,
    List,
    Done,
    Delete,
    Version,
    Exit,
}

impl Switch {
    fn lookup(name: &str) -> Option<Self> {
        match name {
            "--help" | "-h" => Some(Switch::Help),
            "--add" | "-a" => Some(Switch::Add),
            "--list" | "-l" => Some(Switch::List),
            "--done" | "-u" => Some(Switch::Done),
            "--delete" | "-d" => Some(Switch::Delete),
            "--version" | "-v" => Some(Switch::Version),
            "--exit" | "-e" => Some(Switch::Exit),
            _ => None,
        }
    }

    fn takes_value(self) -> bool {
        matches!(
            self,
            Switch::Help | Switch::List | Switch::Done | Switch::Delete
        )
    }

    /// Whether `next` can be taken as this switch's value
    ///
    /// Id lists may start with a negative id, so `-3` is a value for
    /// `--done`/`--delete` while `-l` is not.
    fn accepts(self, next: &str) -> bool {
        match next.strip_prefix('-') {
            None => true,
            Some(rest) => {
                matches!(self, Switch::Done | Switch::Delete)
                    && rest.starts_with(|c: char| c.is_ascii_digit())
            }
        }
    }

    fn flag_name(self) -> &'static str {
        match self {
            Switch::Help => "help",
            Switch::Add => "add",
            Switch::List => "list",
            Switch::Done => "done",
            Switch::Delete => "delete",
            Switch::Version => "version",
            Switch::Exit => "exit",
        }
    }
}

/// Ids collected from every occurrence of `--done` or `--delete`
#[derive(Debug, Default)]
struct IdSlot {
    ids: Vec<TodoId>,
    errors: Vec<TodoError>,
}

impl IdSlot {
    fn absorb(&mut self, flag: &str, value: Option<&str>) {
        let parsed = match value {
            Some(value) => TodoValidator::parse_id_list(flag, value),
            None => Err(TodoError::missing_value(flag)),
        };
        match parsed {
            Ok(ids) => self.ids.extend(ids),
            Err(e) => self.errors.push(e),
        }
    }

    fn emit(self, make: fn(Vec<TodoId>) -> Action, actions: &mut Vec<Action>) {
        if !self.ids.is_empty() {
            actions.push(make(self.ids));
        }
        actions.extend(self.errors.into_iter().map(Action::Invalid));
    }
}

#[derive(Debug, Default)]
struct Collected {
    help: Option<Option<HelpTopic>>,
    add: bool,
    list: Option<ListFilter>,
    done: IdSlot,
    delete: IdSlot,
    version: bool,
    exit: bool,
    ignored: Vec<String>,
}

impl Collected {
    fn into_parsed(self) -> ParsedLine {
        let mut actions = Vec::new();
        if let Some(topic) = self.help {
            actions.push(Action::Help(topic));
        }
        if self.add {
            actions.push(Action::Add);
        }
        if let Some(filter) = self.list {
            actions.push(Action::List(filter));
        }
        self.done.emit(Action::Toggle, &mut actions);
        self.delete.emit(Action::Delete, &mut actions);
        if self.version {
            actions.push(Action::Version);
        }
        if self.exit {
            actions.push(Action::Exit);
        }
        ParsedLine {
            actions,
            ignored: self.ignored,
        }
    }
}

/// Split `--flag=value` into its name and inline value; short switches never carry one
fn split_inline(token: &str) -> (&str, Option<&str>) {
    if token.starts_with("--") {
        if let Some((name, value)) = token.split_once('=') {
            return (name, Some(value));
        }
    }
    (token, None)
}

/// Parse already-split tokens
pub fn parse_tokens<S: AsRef<str>>(tokens: &[S]) -> ParsedLine {
    let mut collected = Collected::default();
    let mut tokens = tokens.iter().map(AsRef::as_ref).peekable();

    while let Some(token) = tokens.next() {
        let (name, inline) = split_inline(token);
        let Some(switch) = Switch::lookup(name) else {
            collected.ignored.push(token.to_string());
            continue;
        };

        let value = if switch.takes_value() {
            inline.or_else(|| tokens.next_if(|next| switch.accepts(next)))
        } else {
            if inline.is_some() {
                collected.ignored.push(token.to_string());
            }
            None
        };

        match switch {
            Switch::Help => collected.help = Some(value.and_then(HelpTopic::parse)),
            Switch::Add => collected.add = true,
            Switch::List => collected.list = Some(value.map(ListFilter::parse).unwrap_or_default()),
            Switch::Done => collected.done.absorb(switch.flag_name(), value),
            Switch::Delete => collected.delete.absorb(switch.flag_name(), value),
            Switch::Version => collected.version = true,
            Switch::Exit => collected.exit = true,
        }
    }

    collected.into_parsed()
}

/// Parse the initial process arguments; no arguments at all asks for the welcome banner
pub fn parse_args<S: AsRef<str>>(args: &[S]) -> ParsedLine {
    if args.is_empty() {
        return ParsedLine {
            actions: vec![Action::Welcome],
            ignored: Vec::new(),
        };
    }
    parse_tokens(args)
}

/// Parse one REPL line; a blank line is a no-op
pub fn parse_line(line: &str) -> ParsedLine {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    parse_tokens(&tokens)
}
