use std::{
    borrow::Cow,
    fmt,
    io::{self, Lines, StdinLock},
};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::{ValidationContext, ValidationResult, Validator},
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};
use shell_words::split;

use cofrinho_domain::Category;

use crate::cli::core::{CliError, CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::output;

/// Set to run commands from stdin without prompts or colours.
pub const SCRIPT_ENV: &str = "COFRINHO_CLI_SCRIPT";

const EDIT_FIELDS: [&str; 5] = ["category", "count", "description", "start", "total"];
const CONFIG_KEYS: [&str; 5] = ["category", "color", "policy", "retention", "theme"];

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;
    let mut input = Input::open(&context)?;

    while context.running {
        let Some(line) = input.next_line(&context)? else {
            break;
        };
        match handle_line(&mut context, &line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err)?,
        }
        input.refresh(&context);
    }
    Ok(())
}

/// Source of shell lines: the line editor, or stdin in script mode.
enum Input {
    Terminal(Box<Editor<ShellHelper, DefaultHistory>>),
    Script(Lines<StdinLock<'static>>),
}

impl Input {
    fn open(context: &ShellContext) -> Result<Self, CliError> {
        if context.mode == CliMode::Script {
            return Ok(Input::Script(io::stdin().lines()));
        }

        let mut editor = Editor::<ShellHelper, DefaultHistory>::new()?;
        editor.set_helper(Some(ShellHelper::new(context)));
        editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
        output::info("Type `help` to list commands. `?` completes.");
        Ok(Input::Terminal(Box::new(editor)))
    }

    /// Next non-blank line, or `None` once the user or the script is done.
    fn next_line(&mut self, context: &ShellContext) -> Result<Option<String>, CliError> {
        match self {
            Input::Script(lines) => Ok(lines.next().transpose()?),
            Input::Terminal(editor) => loop {
                match editor.readline(&context.prompt()) {
                    Ok(line) if line.trim().is_empty() => continue,
                    Ok(line) => {
                        editor.add_history_entry(line.trim()).ok();
                        return Ok(Some(line));
                    }
                    Err(ReadlineError::Interrupted) => {
                        if context.confirm_exit()? {
                            return Ok(None);
                        }
                    }
                    Err(ReadlineError::Eof) => {
                        output::info("Exiting shell.");
                        return Ok(None);
                    }
                    Err(err) => return Err(err.into()),
                }
            },
        }
    }

    /// Keeps position completion in step with the wallet after each command.
    fn refresh(&mut self, context: &ShellContext) {
        if let Input::Terminal(editor) = self {
            if let Some(helper) = editor.helper_mut() {
                helper.plan_count = context.session.plans().len();
                helper.card_count = context.session.cards().len();
            }
        }
    }
}

fn handle_line(context: &mut ShellContext, line: &str) -> Result<LoopControl, CommandError> {
    let tokens = match parse_command_line(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            output::warning(err);
            return Ok(LoopControl::Continue);
        }
    };

    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    if raw.starts_with('#') {
        return Ok(LoopControl::Continue);
    }

    let args: Vec<&str> = rest.iter().map(String::as_str).collect();
    let control = context.dispatch(&raw.to_lowercase(), raw, &args)?;
    if control == LoopControl::Exit {
        context.running = false;
    }
    Ok(control)
}

/// Completes command names and the arguments whose values are known up front.
struct ShellHelper {
    commands: Vec<&'static str>,
    plan_count: usize,
    card_count: usize,
}

impl ShellHelper {
    fn new(context: &ShellContext) -> Self {
        let mut commands = context.command_names();
        commands.sort_unstable();
        Self {
            commands,
            plan_count: context.session.plans().len(),
            card_count: context.session.cards().len(),
        }
    }

    /// Values that fit the next word, given the words already typed.
    fn options(&self, words: &[String]) -> Vec<String> {
        let Some(command) = words.first().map(|word| word.to_lowercase()) else {
            return owned(&self.commands);
        };
        let index = words.len();
        let previous = words.last().map(|word| word.to_lowercase());

        match (command.as_str(), index) {
            ("help", 1) => owned(&self.commands),
            ("show" | "toggle" | "edit" | "delete", 1) => positions(self.plan_count),
            ("card-status" | "card-delete", 1) => positions(self.card_count),
            ("card-status", 2) => owned(&["ativo", "inativo"]),
            ("cards", 2) => owned(&["todos", "ativo", "inativo"]),
            ("add", 5) => categories(),
            ("edit", 2) => owned(&EDIT_FIELDS),
            ("edit", 3) if previous.as_deref() == Some("category") => categories(),
            ("config", 1) => owned(&["set"]),
            ("config", 2) => owned(&CONFIG_KEYS),
            ("config", 3) => match previous.as_deref() {
                Some("category") => categories(),
                Some("policy") => owned(&["strict", "lenient"]),
                Some("theme") => owned(&["iconic", "plain"]),
                Some("color") => owned(&["on", "off"]),
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn positions(count: usize) -> Vec<String> {
    (1..=count).map(|position| position.to_string()).collect()
}

fn categories() -> Vec<String> {
    Category::ALL
        .iter()
        .map(|category| category.label().to_string())
        .collect()
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        let start = prefix
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        // Unbalanced quotes before the cursor: nothing sensible to offer.
        let Ok(words) = split(&prefix[..start]) else {
            return Ok((start, Vec::new()));
        };

        let needle = prefix[start..].to_lowercase();
        let candidates = self
            .options(&words)
            .into_iter()
            .filter(|option| option.to_lowercase().starts_with(&needle))
            .map(|option| Pair {
                display: option.clone(),
                replacement: option,
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }
}

impl Validator for ShellHelper {
    fn validate(&self, _ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        Ok(ValidationResult::Valid(None))
    }
}

pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, ParseError> {
    split(input).map_err(|err| ParseError {
        message: err.to_string(),
    })
}

#[derive(Debug)]
pub(crate) struct ParseError {
    message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
