use todo_cli::command::{parse_args, parse_line, parse_tokens, Action, HelpTopic};
use todo_core::{ListFilter, TodoError};

#[test]
fn test_no_arguments_is_welcome() {
    let parsed = parse_args::<&str>(&[]);
    assert_eq!(parsed.actions, vec![Action::Welcome]);
}

#[test]
fn test_list_filters() {
    assert_eq!(
        parse_line("--list pending").actions,
        vec![Action::List(ListFilter::Pending)]
    );
    assert_eq!(parse_line("-l done").actions, vec![Action::List(ListFilter::Done)]);
    assert_eq!(parse_line("--list").actions, vec![Action::List(ListFilter::All)]);
    // Case-sensitive, unknown means all
    assert_eq!(parse_line("--list Done").actions, vec![Action::List(ListFilter::All)]);
    assert_eq!(
        parse_line("--list=pending").actions,
        vec![Action::List(ListFilter::Pending)]
    );
}

#[test]
fn test_done_and_delete_take_id_lists() {
    assert_eq!(parse_line("--done 1,2").actions, vec![Action::Toggle(vec![1, 2])]);
    assert_eq!(parse_line("-d 3").actions, vec![Action::Delete(vec![3])]);
    assert_eq!(parse_line("--delete=4,5,").actions, vec![Action::Delete(vec![4, 5])]);
}

#[test]
fn test_negative_ids_as_separate_values() {
    assert_eq!(parse_line("-u -3").actions, vec![Action::Toggle(vec![-3])]);
    assert_eq!(
        parse_line("--delete -3,4 --list").actions,
        vec![Action::List(ListFilter::All), Action::Delete(vec![-3, 4])]
    );
    let parsed = parse_line("-d -3");
    assert!(parsed.ignored.is_empty());
}

#[test]
fn test_repeated_id_switches_accumulate() {
    assert_eq!(
        parse_line("--done 1 -u 2,3").actions,
        vec![Action::Toggle(vec![1, 2, 3])]
    );
}

#[test]
fn test_done_without_ids_is_a_parse_error() {
    let parsed = parse_line("--done");
    assert_eq!(parsed.actions, vec![Action::Invalid(TodoError::missing_value("done"))]);

    // A following switch is not taken as the value
    let parsed = parse_line("--done --list");
    assert_eq!(
        parsed.actions,
        vec![
            Action::List(ListFilter::All),
            Action::Invalid(TodoError::missing_value("done")),
        ]
    );
}

#[test]
fn test_malformed_id_list_rejects_whole_value() {
    let parsed = parse_line("--delete 1,two,3");
    assert_eq!(parsed.actions, vec![Action::Invalid(TodoError::invalid_id("two"))]);
}

#[test]
fn test_fixed_action_order() {
    let parsed = parse_line("--exit --version --delete 2 --done 1 --list --add --help");
    assert_eq!(
        parsed.actions,
        vec![
            Action::Help(None),
            Action::Add,
            Action::List(ListFilter::All),
            Action::Toggle(vec![1]),
            Action::Delete(vec![2]),
            Action::Version,
            Action::Exit,
        ]
    );
    assert!(parsed.wants_exit());
}

#[test]
fn test_help_topics() {
    assert_eq!(
        parse_line("--help list").actions,
        vec![Action::Help(Some(HelpTopic::List))]
    );
    assert_eq!(parse_line("-h nonsense").actions, vec![Action::Help(None)]);
    assert_eq!(parse_line("-h").actions, vec![Action::Help(None)]);
}

#[test]
fn test_unknown_tokens_are_ignored() {
    let parsed = parse_tokens(&["--new", "stray", "-l", "done", "-x", "--exit=now"]);
    assert_eq!(
        parsed.actions,
        vec![Action::List(ListFilter::Done), Action::Exit]
    );
    assert_eq!(parsed.ignored, vec!["--new", "stray", "-x", "--exit=now"]);
}

#[test]
fn test_only_unknown_tokens_is_noop() {
    let parsed = parse_line("hello world");
    assert!(parsed.is_noop());
    assert_eq!(parsed.ignored.len(), 2);
}
