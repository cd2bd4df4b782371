use crate::command::HelpTopic;

pub const WELCOME: &str =
    "Welcome to todo, a command-line task tracker! Type \"--help\" for more information on the usage.";

const GENERAL: &str = "\
Usage: todo [--config-file <path>] [--database-url <url>] [--log-level <level>] [--once] [COMMAND...]

  Add an item                  --add, -a
  List the items               --list, -l [all|pending|done]
  Toggle items done/pending    --done, -u <id,id,...>
  Delete items                 --delete, -d <id,id,...>
  Show this message            --help, -h [command]
  Show the application version --version, -v
  Leave the session            --exit, -e

Several commands may be given on one line; they run in the order
help, add, list, done, delete, version, exit.";

const FOOTER: &str =
    "For more information on each specific command, type \"--help <add|list|done|delete|version>\".";

fn topic_text(topic: HelpTopic) -> &'static str {
    match topic {
        HelpTopic::Add => {
            "\
--add, -a
  Asks for a title, then for a numeric id, and stores a new pending item.
  The id must not be in use already."
        }
        HelpTopic::List => {
            "\
--list, -l [all|pending|done]
  Lists the stored items. \"pending\" shows open items, \"done\" shows
  finished ones; anything else, or no value, shows everything.
  Order is not guaranteed."
        }
        HelpTopic::Done => {
            "\
--done, -u <id,id,...>
  Flips each listed item between done and pending. Ids are processed one
  by one; unknown ids are reported and the rest still apply."
        }
        HelpTopic::Delete => {
            "\
--delete, -d <id,id,...>
  Deletes each listed item. Ids are processed one by one; unknown ids are
  reported and the rest still apply."
        }
        HelpTopic::Version => {
            "\
--version, -v
  Prints the application version."
        }
    }
}

/// Help text for a topic, or the general help when no topic was recognized
pub fn render_help(topic: Option<HelpTopic>) -> String {
    match topic {
        Some(topic) => format!("{}\n\n{}", topic_text(topic), FOOTER),
        None => format!("{GENERAL}\n\n{FOOTER}"),
    }
}

pub fn version_line() -> String {
    format!("todo {}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_help_lists_every_switch() {
        let text = render_help(None);
        for switch in ["--add", "--list", "--done", "--delete", "--help", "--version", "--exit"] {
            assert!(text.contains(switch), "missing {switch}");
        }
        assert!(text.ends_with(FOOTER));
    }

    #[test]
    fn test_topic_help_has_footer() {
        let text = render_help(Some(HelpTopic::Done));
        assert!(text.starts_with("--done, -u"));
        assert!(text.ends_with(FOOTER));
        assert!(!text.contains("Usage:"));
    }

    #[test]
    fn test_version_line() {
        assert_eq!(version_line(), format!("todo {}", env!("CARGO_PKG_VERSION")));
    }
}
