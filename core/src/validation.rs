use crate::{
    error::{Result, TodoError},
    models::{NewTodo, TodoId},
};

/// Validation of user-supplied values before they reach the store
pub struct TodoValidator;

impl TodoValidator {
    /// Parse a single id typed at the `Id:` prompt
    ///
    /// Surrounding whitespace is ignored; anything that is not an integer is
    /// rejected.
    pub fn parse_id(value: &str) -> Result<TodoId> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(TodoError::empty_field("id"));
        }
        trimmed
            .parse::<TodoId>()
            .map_err(|_| TodoError::invalid_id(trimmed))
    }

    /// Parse the comma-separated id list of `--done` / `--delete`
    ///
    /// Empty pieces (`1,,2` or a trailing comma) are skipped. A piece that is
    /// not an integer rejects the whole list, as does a list with no ids.
    /// Duplicates are kept: each occurrence is its own operation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use todo_core::validation::TodoValidator;
    ///
    /// assert_eq!(TodoValidator::parse_id_list("done", "1,2,").unwrap(), vec![1, 2]);
    /// assert!(TodoValidator::parse_id_list("done", "1,x").is_err());
    /// assert!(TodoValidator::parse_id_list("done", ",").is_err());
    /// ```
    pub fn parse_id_list(flag: &str, value: &str) -> Result<Vec<TodoId>> {
        let mut ids = Vec::new();
        for piece in value.split(',') {
            if piece.is_empty() {
                continue;
            }
            let id = piece
                .parse::<TodoId>()
                .map_err(|_| TodoError::invalid_id(piece))?;
            ids.push(id);
        }

        if ids.is_empty() {
            return Err(TodoError::missing_value(flag));
        }
        Ok(ids)
    }

    /// Validate a title typed at the `Title:` prompt, returning it trimmed
    pub fn validate_title(title: &str) -> Result<String> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(TodoError::empty_field("title"));
        }
        Ok(trimmed.to_string())
    }

    /// Build a creation payload from raw prompt answers
    pub fn new_todo(id: &str, title: &str) -> Result<NewTodo> {
        let title = Self::validate_title(title)?;
        let id = Self::parse_id(id)?;
        Ok(NewTodo::new(id, title))
    }
}
