//! Random test data generators using the fake crate
//!
//! Provides realistic random data including:
//! - Todo titles
//! - Random todo sets with unique ids
//! - Property-based testing strategies

use fake::faker::lorem::en::Sentence;
use fake::Fake;
use proptest::prelude::*;
use rand::Rng;
use todo_core::{ListFilter, NewTodo, Todo, TodoId};

/// Generate a realistic todo title
pub fn generate_title() -> String {
    Sentence(2..6).fake()
}

/// Generate a random todo with a realistic title
pub fn generate_random_todo() -> Todo {
    let id: TodoId = (1..99_999).fake();
    Todo {
        id,
        title: generate_title(),
        done: rand::thread_rng().gen_bool(0.5),
    }
}

/// Generate `count` todos with ids `1..=count`
pub fn generate_todos(count: usize) -> Vec<Todo> {
    (1..=count as TodoId)
        .map(|id| Todo {
            id,
            title: generate_title(),
            done: rand::thread_rng().gen_bool(0.5),
        })
        .collect()
}

/// Proptest strategy for list filters
pub fn list_filter_strategy() -> impl Strategy<Value = ListFilter> {
    prop_oneof![
        Just(ListFilter::All),
        Just(ListFilter::Pending),
        Just(ListFilter::Done),
    ]
}

/// Proptest strategy for free-form titles, including quotes and separators
pub fn title_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 '\";%_-]{1,40}".prop_filter("title must not be blank", |t| !t.trim().is_empty())
}

/// Proptest strategy for a set of creation payloads with unique ids
pub fn new_todos_strategy(max: usize) -> impl Strategy<Value = Vec<NewTodo>> {
    prop::collection::btree_map(1i64..1_000, title_strategy(), 0..max).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(id, title)| NewTodo::new(id, title))
            .collect()
    })
}

/// Proptest strategy for a store state: records plus the ids to toggle to done
pub fn store_state_strategy(max: usize) -> impl Strategy<Value = (Vec<NewTodo>, Vec<bool>)> {
    new_todos_strategy(max).prop_flat_map(|todos| {
        let len = todos.len();
        (Just(todos), prop::collection::vec(any::<bool>(), len))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_todos_have_unique_ids() {
        let todos = generate_todos(20);
        let mut ids: Vec<_> = todos.iter().map(|t| t.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 20);
        assert!(todos.iter().all(|t| !t.title.is_empty()));
    }

    proptest! {
        #[test]
        fn test_title_strategy_never_blank(title in title_strategy()) {
            prop_assert!(!title.trim().is_empty());
        }

        #[test]
        fn test_store_state_lengths_match((todos, flags) in store_state_strategy(10)) {
            prop_assert_eq!(todos.len(), flags.len());
        }
    }
}
