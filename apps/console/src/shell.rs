//! Line commands for the interactive session.

use client_core::{Tab, UserAction};

pub const HELP: &str = "\
commands:
  classify <text>      classify a text
  history              reload classification history
  tab <classify|annotate|training>
  text <text>          set the annotation text
  main <category>      select the main category
  sub <name>           check a sub-category
  unsub <name>         uncheck a sub-category
  submit               submit the annotation form
  stats                load annotation statistics
  suggest              ask for an AI suggestion on the annotation text
  retrain              retrain the model
  overview             load training data statistics
  evaluate             evaluate the model
  help                 show this list
  quit";

#[derive(Debug, PartialEq)]
pub enum ShellCommand {
    Action(UserAction),
    Help,
    Quit,
}

pub fn parse_line(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let action = match verb {
        "help" | "?" => return Ok(Some(ShellCommand::Help)),
        "quit" | "exit" => return Ok(Some(ShellCommand::Quit)),
        "classify" => UserAction::Classify {
            text: rest.to_string(),
        },
        "history" => UserAction::ReloadHistory,
        "tab" => UserAction::SwitchTab(
            Tab::parse(rest).ok_or_else(|| format!("unknown tab `{rest}`"))?,
        ),
        "text" => UserAction::EditAnnotationText(rest.to_string()),
        "main" => UserAction::SelectMainCategory(required(verb, rest)?),
        "sub" | "unsub" => UserAction::ToggleSubCategory {
            name: required(verb, rest)?,
            checked: verb == "sub",
        },
        "submit" => UserAction::SubmitAnnotation,
        "stats" => UserAction::LoadAnnotationStats,
        "suggest" => UserAction::RequestAiSuggestion,
        "retrain" => UserAction::Retrain,
        "overview" => UserAction::LoadTrainingOverview,
        "evaluate" => UserAction::EvaluateModel,
        other => return Err(format!("unknown command `{other}`; try `help`")),
    };
    Ok(Some(ShellCommand::Action(action)))
}

fn required(verb: &str, rest: &str) -> Result<String, String> {
    if rest.is_empty() {
        Err(format!("`{verb}` needs an argument"))
    } else {
        Ok(rest.to_string())
    }
}
