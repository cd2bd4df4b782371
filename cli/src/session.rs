//! The interactive session: runs parsed lines against the store and renders results
//!
//! A session owns at most one repository. Whatever ends it (`--exit`, end of
//! input, an interrupt, or `--once`) goes through [`Session::release`], so the
//! connection is closed exactly once.

use std::fmt;
use std::future::Future;
use std::io;
use std::sync::Arc;

use todo_core::{
    BatchKind, BatchReport, ItemOutcome, ListFilter, RowResult, TodoError, TodoId,
    TodoRepository, TodoValidator,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::command::{parse_args, parse_line, Action, ParsedLine};
use crate::help;

/// The store a session talks to, or why there is none
#[derive(Clone)]
pub enum StoreHandle {
    Ready(Arc<dyn TodoRepository>),
    /// Startup could not connect; store commands report the reason
    Unavailable(String),
}

impl fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreHandle::Ready(_) => f.write_str("Ready"),
            StoreHandle::Unavailable(reason) => f.debug_tuple("Unavailable").field(reason).finish(),
        }
    }
}

/// Whether the session keeps reading after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Session<R, W> {
    store: StoreHandle,
    input: R,
    output: W,
    prompt: String,
}

impl<R, W> Session<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(store: StoreHandle, input: R, output: W) -> Self {
        Self {
            store,
            input,
            output,
            prompt: "todo> ".to_string(),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Give back the output sink, e.g. to inspect what was written
    pub fn into_output(self) -> W {
        self.output
    }

    /// Run the initial arguments, then the REPL until exit, end of input or Ctrl-C
    pub async fn start<S: AsRef<str>>(&mut self, args: &[S], once: bool) -> io::Result<()> {
        self.start_until(args, once, interrupted()).await
    }

    /// Same as [`start`](Self::start) with a caller-provided shutdown signal
    ///
    /// `shutdown` is raced against the whole session, so it also cuts short an
    /// `--add` prompt or a store call in flight.
    pub async fn start_until<S, F>(&mut self, args: &[S], once: bool, shutdown: F) -> io::Result<()>
    where
        S: AsRef<str>,
        F: Future<Output = ()>,
    {
        // Polling `shutdown` first installs the signal listener before any action runs
        let finished = tokio::select! {
            biased;
            () = shutdown => None,
            result = self.run(args, once) => Some(result),
        };

        let result = match finished {
            Some(result) => result,
            None => {
                info!("Interrupted, ending session");
                self.say("").await
            }
        };

        self.release().await;
        result
    }

    async fn run<S: AsRef<str>>(&mut self, args: &[S], once: bool) -> io::Result<()> {
        let flow = self.execute(parse_args(args)).await?;
        if flow == Flow::Continue && !once {
            self.repl().await
        } else {
            Ok(())
        }
    }

    /// Read and execute lines until `--exit` or end of input
    pub async fn repl(&mut self) -> io::Result<()> {
        loop {
            self.output.write_all(self.prompt.as_bytes()).await?;
            self.output.flush().await?;

            let mut line = String::new();
            if self.input.read_line(&mut line).await? == 0 {
                debug!("End of input, ending session");
                return self.say("").await;
            }
            if self.execute(parse_line(&line)).await? == Flow::Exit {
                return Ok(());
            }
        }
    }

    /// Run every action of a parsed line in order
    pub async fn execute(&mut self, parsed: ParsedLine) -> io::Result<Flow> {
        if !parsed.ignored.is_empty() {
            debug!(ignored = ?parsed.ignored, "Ignoring unrecognized tokens");
        }

        let mut flow = Flow::Continue;
        for action in parsed.actions {
            match action {
                Action::Welcome => self.say(help::WELCOME).await?,
                Action::Help(topic) => self.say(&help::render_help(topic)).await?,
                Action::Add => self.add().await?,
                Action::List(filter) => self.list(filter).await?,
                Action::Toggle(ids) => self.batch(BatchKind::Toggle, &ids).await?,
                Action::Delete(ids) => self.batch(BatchKind::Delete, &ids).await?,
                Action::Version => self.say(&help::version_line()).await?,
                Action::Exit => flow = Flow::Exit,
                Action::Invalid(err) => self.say(&render_error(&err)).await?,
            }
        }
        Ok(flow)
    }

    /// Close the store connection if there is one; safe to call repeatedly
    pub async fn release(&mut self) {
        if let StoreHandle::Ready(repository) = &self.store {
            match repository.close().await {
                Ok(true) => info!("Store connection closed"),
                Ok(false) => debug!("Store connection was already closed"),
                Err(e) => warn!(error = %e, "Failed to close store connection"),
            }
        }
    }

    fn repository(&self) -> Result<Arc<dyn TodoRepository>, String> {
        match &self.store {
            StoreHandle::Ready(repository) => Ok(Arc::clone(repository)),
            StoreHandle::Unavailable(reason) => Err(format!("store unavailable: {reason}")),
        }
    }

    async fn add(&mut self) -> io::Result<()> {
        let repository = match self.repository() {
            Ok(repository) => repository,
            Err(message) => return self.say(&message).await,
        };

        let Some(title) = self.ask("Title: ").await? else {
            return self.say("\nerror: add cancelled").await;
        };
        let Some(id) = self.ask("Id: ").await? else {
            return self.say("\nerror: add cancelled").await;
        };

        let new_todo = match TodoValidator::new_todo(&id, &title) {
            Ok(new_todo) => new_todo,
            Err(e) => return self.say(&render_error(&e)).await,
        };

        match repository.create(new_todo).await {
            Ok(todo) => self.say(&format!("Added {todo}")).await,
            Err(e) => {
                debug!(error = %e, "Create failed");
                self.say(&render_error(&e)).await
            }
        }
    }

    async fn list(&mut self, filter: ListFilter) -> io::Result<()> {
        let repository = match self.repository() {
            Ok(repository) => repository,
            Err(message) => return self.say(&message).await,
        };

        match repository.list(filter).await {
            Ok(rows) => self.say(&render_rows(&rows)).await,
            Err(e) => self.say(&render_error(&e)).await,
        }
    }

    async fn batch(&mut self, kind: BatchKind, ids: &[TodoId]) -> io::Result<()> {
        let repository = match self.repository() {
            Ok(repository) => repository,
            Err(message) => return self.say(&message).await,
        };

        let report = match kind {
            BatchKind::Toggle => repository.toggle_batch(ids).await,
            BatchKind::Delete => repository.delete_batch(ids).await,
        };
        self.say(&render_report(&report)).await
    }

    /// Prompt on the session's own streams; `None` at end of input
    async fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        self.output.write_all(question.as_bytes()).await?;
        self.output.flush().await?;

        let mut answer = String::new();
        if self.input.read_line(&mut answer).await? == 0 {
            return Ok(None);
        }
        Ok(Some(answer.trim_end_matches(['\r', '\n']).to_string()))
    }

    async fn say(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await
    }
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

pub fn render_error(error: &TodoError) -> String {
    format!("error: {error}")
}

/// One line per row; decode failures are shown in place
pub fn render_rows(rows: &[RowResult]) -> String {
    if rows.is_empty() {
        return "No tasks.".to_string();
    }
    rows.iter()
        .map(|row| match row {
            Ok(todo) => todo.to_string(),
            Err(decode) => format!("! {decode}"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per id, in the order the ids were given
pub fn render_report(report: &BatchReport) -> String {
    report
        .outcomes
        .iter()
        .map(|(id, outcome)| match outcome {
            ItemOutcome::Applied => format!("{} {id}", report.kind.verb()),
            ItemOutcome::NotFound => format!("no task with id {id}"),
            ItemOutcome::Failed(e) => format!("error: task {id}: {e}"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_core::{DecodeError, Todo};

    #[test]
    fn test_render_rows() {
        let rows: Vec<RowResult> = vec![
            Ok(Todo {
                id: 2,
                title: "write report".to_string(),
                done: true,
            }),
            Ok(Todo::new(1, "buy milk")),
            Err(DecodeError::new(3, "column 'title': unexpected null")),
        ];
        assert_eq!(
            render_rows(&rows),
            "[x] 2  write report\n[ ] 1  buy milk\n! row 3: column 'title': unexpected null"
        );
        assert_eq!(render_rows(&[]), "No tasks.");
    }

    #[test]
    fn test_render_report() {
        let mut report = BatchReport::new(BatchKind::Delete);
        report.record(1, Ok(1));
        report.record(7, Ok(0));
        report.record(8, Err(TodoError::connection_closed()));

        let rendered = render_report(&report);
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines[0], "deleted 1");
        assert_eq!(lines[1], "no task with id 7");
        assert!(lines[2].starts_with("error: task 8: "));
    }

    #[test]
    fn test_store_handle_debug_hides_repository() {
        let handle = StoreHandle::Unavailable("refused".to_string());
        assert_eq!(format!("{handle:?}"), "Unavailable(\"refused\")");
    }
}
