//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the task store operations to Dart via FRB.
//! - Hold the process-wide store so UI code never owns storage handles.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Host calls are serialized through one mutex; there is one mutator.
//! - Unknown ids and blank text are reported as `ok=false` responses, never errors.
//! - A response never hides that changes are not durable: storage fallback,
//!   load recovery and failed write-back are spelled out in `message` and
//!   `persisted`.

use log::{error, warn};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};
use tasklist_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    FilterSelector, LoadOutcome, Priority, SqliteGateway, Task, TaskId, TaskStore,
};

const DB_FILE_NAME: &str = "tasklist.sqlite3";
const DB_PATH_ENV: &str = "TASKLIST_DB_PATH";
static DEFAULT_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static SESSION: Mutex<Option<Session>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One task row as rendered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub text: String,
    /// `high|medium|low`.
    pub priority: String,
    pub completed: bool,
}

/// Response of `tasks_open`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLoadResponse {
    /// False when stored tasks were lost or changes cannot be saved.
    pub ok: bool,
    /// Number of tasks restored from storage.
    pub restored: u32,
    pub message: String,
}

/// Response of `tasks_list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    /// Visible tasks in insertion order.
    pub items: Vec<TaskItem>,
    /// Effective filter name; unknown names fall back to `all`.
    pub applied_filter: String,
    pub message: String,
}

/// Response of every mutation call and of `tasks_flush`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    /// Whether the call took effect.
    pub ok: bool,
    pub task_id: Option<String>,
    /// Whether the current list is stored durably after this call.
    pub persisted: bool,
    pub message: String,
}

impl TaskActionResponse {
    fn success(message: impl Into<String>, task_id: Option<String>) -> Self {
        Self {
            ok: true,
            task_id,
            persisted: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task_id: None,
            persisted: false,
            message: message.into(),
        }
    }
}

/// Process-wide store plus the durability notices the host must see.
struct Session {
    store: TaskStore<SqliteGateway>,
    /// Set when the file database could not be opened and an in-memory one
    /// stands in for it.
    volatile: Option<String>,
    /// Load recovery notice, reported with the next response only.
    pending_notice: Option<String>,
}

impl Session {
    fn open(path: PathBuf) -> Result<(Self, LoadOutcome), String> {
        let (gateway, volatile) = match SqliteGateway::open(&path) {
            Ok(gateway) => (gateway, None),
            Err(err) => {
                error!(
                    "event=tasks_open module=ffi status=error error_code=db_unavailable error={err}"
                );
                let gateway = SqliteGateway::open_in_memory()
                    .map_err(|memory_err| format!("task database unavailable: {memory_err}"))?;
                (gateway, Some(err.to_string()))
            }
        };

        let mut store = TaskStore::new(gateway);
        let outcome = store.load();
        let session = Self {
            store,
            volatile,
            pending_notice: None,
        };
        Ok((session, outcome))
    }

    /// Appends durability notices to a mutation response.
    fn finish(&mut self, mut response: TaskActionResponse) -> TaskActionResponse {
        let mut notes = vec![response.message];
        if let Some(notice) = self.pending_notice.take() {
            notes.push(notice);
        }
        if let Some(reason) = &self.volatile {
            notes.push(format!("Changes will not be saved: {reason}."));
        } else if self.store.is_dirty() {
            notes.push("Changes not saved yet; call tasks_flush to retry.".to_string());
        }

        response.persisted = self.volatile.is_none() && !self.store.is_dirty();
        response.message = notes.join(" ");
        response
    }
}

/// Opens the task database and loads the stored list.
///
/// `db_path` overrides the default location (`TASKLIST_DB_PATH`, then the
/// temp directory). When the database cannot be opened at all, the session
/// continues on a private in-memory database and every later response says
/// so.
///
/// # FFI contract
/// - Call once at startup before the first `tasks_list`.
/// - Calling again replaces the active store.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_open(db_path: Option<String>) -> TaskLoadResponse {
    let path = db_path
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(resolve_default_db_path);

    let (session, outcome) = match Session::open(path) {
        Ok(opened) => opened,
        Err(message) => {
            return TaskLoadResponse {
                ok: false,
                restored: 0,
                message,
            }
        }
    };

    let response = match (outcome, &session.volatile) {
        (LoadOutcome::Recovered(err), _) => TaskLoadResponse {
            ok: false,
            restored: 0,
            message: format!("Stored tasks could not be loaded: {err}"),
        },
        (_, Some(reason)) => TaskLoadResponse {
            ok: false,
            restored: 0,
            message: format!("Task database unavailable, changes will not be saved: {reason}"),
        },
        (LoadOutcome::FirstRun, None) => TaskLoadResponse {
            ok: true,
            restored: 0,
            message: "No saved tasks.".to_string(),
        },
        (LoadOutcome::Restored { count }, None) => TaskLoadResponse {
            ok: true,
            restored: u32::try_from(count).unwrap_or(u32::MAX),
            message: format!("Loaded {count} task(s)."),
        },
    };

    *lock_session() = Some(session);
    response
}

/// Lists tasks visible under `filter` (`all|active|completed|high|medium|low`).
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_list(filter: String) -> TaskListResponse {
    let (selector, message) = match filter.parse::<FilterSelector>() {
        Ok(selector) => (selector, String::new()),
        Err(err) => (FilterSelector::All, err.to_string()),
    };

    let applied_filter = selector.as_str().to_string();
    with_session(|session| {
        let items = session
            .store
            .filtered(selector)
            .into_iter()
            .map(to_task_item)
            .collect::<Vec<_>>();
        let mut message = if message.is_empty() {
            format!("{} task(s).", items.len())
        } else {
            message
        };
        if let Some(notice) = session.pending_notice.take() {
            message = format!("{message} {notice}");
        }
        TaskListResponse {
            items,
            applied_filter: applied_filter.clone(),
            message,
        }
    })
    .unwrap_or_else(|message| TaskListResponse {
        items: Vec::new(),
        applied_filter,
        message,
    })
}

/// Adds a task with medium priority.
#[flutter_rust_bridge::frb(sync)]
pub fn task_add(text: String) -> TaskActionResponse {
    with_session(|session| {
        let response = match session.store.add(text) {
            Some(task) => TaskActionResponse::success("Task added.", Some(task.id.to_string())),
            None => TaskActionResponse::failure("Task text is empty."),
        };
        session.finish(response)
    })
    .unwrap_or_else(TaskActionResponse::failure)
}

/// Deletes a task; deleting an unknown id is reported but harmless.
#[flutter_rust_bridge::frb(sync)]
pub fn task_remove(id: String) -> TaskActionResponse {
    let task_id = TaskId::from(id);
    with_session(|session| {
        let response = if session.store.remove(&task_id) {
            TaskActionResponse::success("Task removed.", Some(task_id.to_string()))
        } else {
            TaskActionResponse::failure(format!("Task not found: {task_id}"))
        };
        session.finish(response)
    })
    .unwrap_or_else(TaskActionResponse::failure)
}

/// Replaces text and priority of a task with the final draft values.
#[flutter_rust_bridge::frb(sync)]
pub fn task_edit(id: String, text: String, priority: String) -> TaskActionResponse {
    let priority = match priority.parse::<Priority>() {
        Ok(priority) => priority,
        Err(err) => return TaskActionResponse::failure(err.to_string()),
    };
    let task_id = TaskId::from(id);
    with_session(|session| {
        let response = if session.store.edit(&task_id, text, priority) {
            TaskActionResponse::success("Task updated.", Some(task_id.to_string()))
        } else {
            TaskActionResponse::failure(format!("Task not found: {task_id}"))
        };
        session.finish(response)
    })
    .unwrap_or_else(TaskActionResponse::failure)
}

/// Flips completion of a task.
#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle(id: String) -> TaskActionResponse {
    let task_id = TaskId::from(id);
    with_session(|session| {
        let response = if session.store.toggle_complete(&task_id) {
            TaskActionResponse::success("Task toggled.", Some(task_id.to_string()))
        } else {
            TaskActionResponse::failure(format!("Task not found: {task_id}"))
        };
        session.finish(response)
    })
    .unwrap_or_else(TaskActionResponse::failure)
}

/// Retries writing the current list after a failed write-back.
///
/// # FFI contract
/// - `ok=false` while the database stays unreachable; the in-memory list is
///   kept either way.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_flush() -> TaskActionResponse {
    with_session(flush_session).unwrap_or_else(TaskActionResponse::failure)
}

fn flush_session(session: &mut Session) -> TaskActionResponse {
    if let Some(reason) = &session.volatile {
        return TaskActionResponse::failure(format!(
            "Task database unavailable, changes will not be saved: {reason}"
        ));
    }
    let response = match session.store.flush() {
        Ok(()) => TaskActionResponse::success("Tasks saved.", None),
        Err(err) => TaskActionResponse::failure(format!("Tasks not saved: {err}")),
    };
    session.finish(response)
}

fn resolve_default_db_path() -> PathBuf {
    DEFAULT_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn lock_session() -> MutexGuard<'static, Option<Session>> {
    SESSION.lock().unwrap_or_else(|poisoned| {
        warn!("event=store_lock module=ffi status=recovered reason=poisoned");
        poisoned.into_inner()
    })
}

/// Runs `f` on the active session, opening the default database first when
/// the host never called `tasks_open`.
fn with_session<T>(f: impl FnOnce(&mut Session) -> T) -> Result<T, String> {
    let mut guard = lock_session();
    if guard.is_none() {
        let (mut session, outcome) = Session::open(resolve_default_db_path())?;
        if let LoadOutcome::Recovered(err) = outcome {
            session.pending_notice = Some(format!("Stored tasks could not be loaded: {err}."));
        }
        *guard = Some(session);
    }
    guard
        .as_mut()
        .map(f)
        .ok_or_else(|| "task store unavailable".to_string())
}

fn to_task_item(task: &Task) -> TaskItem {
    TaskItem {
        id: task.id.to_string(),
        text: task.text.clone(),
        priority: task.priority.as_str().to_string(),
        completed: task.completed,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, flush_session, init_logging, ping, task_add, task_edit, task_remove,
        task_toggle, tasks_flush, tasks_list, tasks_open, Session, TaskActionResponse,
    };
    use tasklist_core::{LoadOutcome, SqliteGateway, TaskStore};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn task_edit_rejects_unknown_priority_before_touching_store() {
        let response = task_edit("any".to_string(), "x".to_string(), "urgent".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("urgent"));
    }

    // One test owns the process-wide store so parallel tests cannot interleave.
    #[test]
    fn store_flow_persists_across_reopen() {
        let dir = tempfile::tempdir().expect("temp dir");
        let db_path = dir.path().join("ffi.sqlite3");
        let db_path_str = db_path.to_str().expect("utf-8 path").to_string();

        let opened = tasks_open(Some(db_path_str.clone()));
        assert!(opened.ok, "{}", opened.message);
        assert_eq!(opened.restored, 0);

        assert!(!task_add("   ".to_string()).ok);
        let added = task_add("Buy milk".to_string());
        assert!(added.ok, "{}", added.message);
        assert!(added.persisted);
        let task_id = added.task_id.expect("add should return task_id");
        let other = task_add("Walk dog".to_string())
            .task_id
            .expect("add should return task_id");

        let edited = task_edit(task_id.clone(), "Buy oat milk".to_string(), "HIGH".to_string());
        assert!(edited.ok, "{}", edited.message);
        assert!(task_toggle(task_id.clone()).ok);
        assert!(!task_toggle("missing".to_string()).ok);

        let completed = tasks_list("completed".to_string());
        assert_eq!(completed.applied_filter, "completed");
        assert_eq!(completed.items.len(), 1);
        assert_eq!(completed.items[0].text, "Buy oat milk");
        assert_eq!(completed.items[0].priority, "high");
        assert!(completed.items[0].completed);

        let fallback = tasks_list("someday".to_string());
        assert_eq!(fallback.applied_filter, "all");
        assert_eq!(fallback.items.len(), 2);

        assert!(task_remove(other.clone()).ok);
        assert!(!task_remove(other).ok);

        let flushed = tasks_flush();
        assert!(flushed.ok, "{}", flushed.message);
        assert!(flushed.persisted);

        let reopened = tasks_open(Some(db_path_str));
        assert!(reopened.ok, "{}", reopened.message);
        assert_eq!(reopened.restored, 1);
        let all = tasks_list("all".to_string());
        assert_eq!(all.items.len(), 1);
        assert_eq!(all.items[0].id, task_id);
    }

    fn in_memory_session() -> Session {
        let mut store = TaskStore::new(SqliteGateway::open_in_memory().expect("memory db"));
        store.load();
        Session {
            store,
            volatile: None,
            pending_notice: None,
        }
    }

    #[test]
    fn unopenable_database_falls_back_and_says_changes_are_lost() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("missing").join("nested").join("tasks.db");

        let (mut session, outcome) = Session::open(path).expect("fallback session");
        assert!(matches!(outcome, LoadOutcome::FirstRun));
        assert!(session.volatile.is_some());

        let added = session.store.add("ephemeral").expect("task added");
        let response = session.finish(TaskActionResponse::success(
            "Task added.",
            Some(added.id.to_string()),
        ));
        assert!(response.ok);
        assert!(!response.persisted);
        assert!(response.message.contains("will not be saved"), "{}", response.message);

        let flushed = flush_session(&mut session);
        assert!(!flushed.ok);
    }

    #[test]
    fn load_recovery_notice_is_reported_once() {
        let mut session = in_memory_session();
        session.pending_notice = Some("Stored tasks could not be loaded: bad data.".to_string());

        let first = session.finish(TaskActionResponse::success("Task added.", None));
        assert!(first.message.contains("could not be loaded"));
        assert!(first.persisted);

        let second = session.finish(TaskActionResponse::success("Task added.", None));
        assert_eq!(second.message, "Task added.");
    }

    #[test]
    fn failed_write_back_is_reported_until_flush_succeeds() {
        let mut session = in_memory_session();
        let conn = session.store.gateway().connection();
        conn.execute_batch("ALTER TABLE kv_store RENAME TO kv_store_offline;")
            .expect("rename table");

        session.store.add("unsaved").expect("task added");
        let response = session.finish(TaskActionResponse::success("Task added.", None));
        assert!(!response.persisted);
        assert!(response.message.contains("tasks_flush"), "{}", response.message);
        assert!(!flush_session(&mut session).ok);

        session
            .store
            .gateway()
            .connection()
            .execute_batch("ALTER TABLE kv_store_offline RENAME TO kv_store;")
            .expect("restore table");
        let flushed = flush_session(&mut session);
        assert!(flushed.ok, "{}", flushed.message);
        assert!(flushed.persisted);
    }
}
