use std::cell::Cell;
use std::collections::HashSet;
use todo_core::db::open_db_in_memory;
use todo_core::{
    Clock, ManualClock, NewTodo, RepoResult, SqliteTodoRepository, Todo, TodoId, TodoRepository,
    TodoService, TodoServiceError,
};

/// Repository wrapper that counts store round-trips.
struct CountingRepo<R> {
    inner: R,
    reads: Cell<usize>,
    writes: Cell<usize>,
}

impl<R> CountingRepo<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            reads: Cell::new(0),
            writes: Cell::new(0),
        }
    }

    fn read(&self) {
        self.reads.set(self.reads.get() + 1);
    }

    fn write(&self) {
        self.writes.set(self.writes.get() + 1);
    }

    fn reset(&self) {
        self.reads.set(0);
        self.writes.set(0);
    }

    fn counts(&self) -> (usize, usize) {
        (self.reads.get(), self.writes.get())
    }
}

impl<R: TodoRepository> TodoRepository for CountingRepo<R> {
    fn insert(&self, todo: &NewTodo) -> RepoResult<Todo> {
        self.write();
        self.inner.insert(todo)
    }

    fn save(&self, todo: &Todo) -> RepoResult<Todo> {
        self.write();
        self.inner.save(todo)
    }

    fn find_by_id(&self, id: TodoId) -> RepoResult<Option<Todo>> {
        self.read();
        self.inner.find_by_id(id)
    }

    fn exists_by_id(&self, id: TodoId) -> RepoResult<bool> {
        self.read();
        self.inner.exists_by_id(id)
    }

    fn delete_by_id(&self, id: TodoId) -> RepoResult<()> {
        self.write();
        self.inner.delete_by_id(id)
    }

    fn find_all(&self) -> RepoResult<Vec<Todo>> {
        self.read();
        self.inner.find_all()
    }

    fn find_incomplete_ordered_by_created_desc(&self) -> RepoResult<Vec<Todo>> {
        self.read();
        self.inner.find_incomplete_ordered_by_created_desc()
    }

    fn find_completed_ordered_by_updated_desc(&self) -> RepoResult<Vec<Todo>> {
        self.read();
        self.inner.find_completed_ordered_by_updated_desc()
    }

    fn find_by_completed(&self, completed: bool) -> RepoResult<Vec<Todo>> {
        self.read();
        self.inner.find_by_completed(completed)
    }

    fn find_by_title_containing_ignore_case(&self, needle: &str) -> RepoResult<Vec<Todo>> {
        self.read();
        self.inner.find_by_title_containing_ignore_case(needle)
    }
}

fn counts<R: TodoRepository, C: Clock>(service: &TodoService<CountingRepo<R>, C>) -> (usize, usize) {
    let counts = service.repository().counts();
    service.repository().reset();
    counts
}

fn id_set(todos: &[Todo]) -> HashSet<TodoId> {
    todos.iter().map(|todo| todo.id).collect()
}

fn ids(todos: &[Todo]) -> Vec<TodoId> {
    todos.iter().map(|todo| todo.id).collect()
}

#[test]
fn create_yields_incomplete_todo_with_equal_timestamps_and_fresh_id() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new(1_700_000_000_000);
    let service = TodoService::with_clock(SqliteTodoRepository::try_new(&conn).unwrap(), &clock);

    let first = service.create("write report").unwrap();
    let second = service.create("write report").unwrap();

    assert_eq!(first.title, "write report");
    assert!(!first.completed);
    assert_eq!(first.created_at, 1_700_000_000_000);
    assert_eq!(first.created_at, first.updated_at);
    assert_ne!(first.id, second.id);
}

#[test]
fn update_with_same_title_keeps_title_but_advances_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new(1_000);
    let service = TodoService::with_clock(SqliteTodoRepository::try_new(&conn).unwrap(), &clock);
    let todo = service.create("original").unwrap();

    clock.advance(10);
    let once = service.update(todo.id, "renamed").unwrap();
    clock.advance(10);
    let twice = service.update(todo.id, "renamed").unwrap();

    assert_eq!(once.title, "renamed");
    assert_eq!(twice.title, "renamed");
    assert!(once.updated_at > todo.updated_at);
    assert!(twice.updated_at > once.updated_at);
    assert_eq!(twice.created_at, todo.created_at);
}

#[test]
fn updated_at_advances_even_within_the_same_millisecond() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new(5_000);
    let service = TodoService::with_clock(SqliteTodoRepository::try_new(&conn).unwrap(), &clock);
    let todo = service.create("frozen clock").unwrap();

    let first = service.toggle(todo.id).unwrap();
    let second = service.update(todo.id, "still frozen").unwrap();

    assert_eq!(first.updated_at, 5_001);
    assert_eq!(second.updated_at, 5_002);
}

#[test]
fn toggle_twice_restores_completion_and_advances_each_time() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new(1_000);
    let service = TodoService::with_clock(SqliteTodoRepository::try_new(&conn).unwrap(), &clock);
    let todo = service.create("flip me").unwrap();

    clock.advance(1);
    let flipped = service.toggle(todo.id).unwrap();
    clock.advance(1);
    let restored = service.toggle(todo.id).unwrap();

    assert!(flipped.completed);
    assert!(!restored.completed);
    assert_eq!(restored.title, todo.title);
    assert!(todo.updated_at < flipped.updated_at);
    assert!(flipped.updated_at < restored.updated_at);
}

#[test]
fn missing_id_fails_with_not_found_and_changes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = TodoService::new(SqliteTodoRepository::try_new(&conn).unwrap());
    let existing = service.create("keep me").unwrap();
    let before = service.list_all().unwrap();
    let missing = TodoId(existing.id.get() + 100);

    assert!(matches!(
        service.update(missing, "x"),
        Err(TodoServiceError::NotFound(id)) if id == missing
    ));
    assert!(matches!(
        service.toggle(missing),
        Err(TodoServiceError::NotFound(id)) if id == missing
    ));
    assert!(matches!(
        service.delete(missing),
        Err(TodoServiceError::NotFound(id)) if id == missing
    ));
    assert!(matches!(
        service.get(missing),
        Err(TodoServiceError::NotFound(id)) if id == missing
    ));

    assert_eq!(service.list_all().unwrap(), before);
}

#[test]
fn incomplete_and_completed_partition_all_todos() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new(0);
    let service = TodoService::with_clock(SqliteTodoRepository::try_new(&conn).unwrap(), &clock);

    let mut created = Vec::new();
    for index in 0..7 {
        clock.advance(3);
        created.push(service.create(format!("task {index}")).unwrap());
    }
    for todo in created.iter().step_by(2) {
        clock.advance(1);
        service.toggle(todo.id).unwrap();
    }

    let all = id_set(&service.list_all().unwrap());
    let incomplete = id_set(&service.list_incomplete().unwrap());
    let completed = id_set(&service.list_completed().unwrap());

    assert_eq!(all.len(), 7);
    assert!(incomplete.is_disjoint(&completed));
    let union: HashSet<_> = incomplete.union(&completed).copied().collect();
    assert_eq!(union, all);
    assert_eq!(completed.len(), 4);
}

#[test]
fn list_views_follow_creation_and_completion_order() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new(10_000);
    let service = TodoService::with_clock(SqliteTodoRepository::try_new(&conn).unwrap(), &clock);

    let a = service.create("A").unwrap();
    clock.advance(50);
    let b = service.create("B").unwrap();

    assert_eq!(ids(&service.list_incomplete().unwrap()), vec![b.id, a.id]);

    clock.advance(50);
    service.toggle(a.id).unwrap();
    clock.advance(50);
    service.toggle(b.id).unwrap();

    assert_eq!(ids(&service.list_completed().unwrap()), vec![b.id, a.id]);
    assert!(service.list_incomplete().unwrap().is_empty());

    clock.advance(50);
    service.update(a.id, "A, edited after completion").unwrap();
    assert_eq!(ids(&service.list_completed().unwrap()), vec![a.id, b.id]);
}

#[test]
fn delete_removes_todo_from_every_view() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new(100);
    let service = TodoService::with_clock(SqliteTodoRepository::try_new(&conn).unwrap(), &clock);

    let open = service.create("open").unwrap();
    clock.advance(1);
    let done = service.create("done").unwrap();
    service.toggle(done.id).unwrap();

    service.delete(open.id).unwrap();
    service.delete(done.id).unwrap();

    assert!(service.list_all().unwrap().is_empty());
    assert!(service.list_incomplete().unwrap().is_empty());
    assert!(service.list_completed().unwrap().is_empty());
    assert!(matches!(
        service.delete(open.id),
        Err(TodoServiceError::NotFound(_))
    ));
}

#[test]
fn blank_titles_are_refused_by_the_store_and_nothing_is_persisted() {
    let conn = open_db_in_memory().unwrap();
    let service = TodoService::new(SqliteTodoRepository::try_new(&conn).unwrap());

    assert!(matches!(service.create(""), Err(TodoServiceError::Validation(_))));
    assert!(matches!(service.create("   "), Err(TodoServiceError::Validation(_))));
    assert!(service.list_all().unwrap().is_empty());

    let todo = service.create("real").unwrap();
    assert!(matches!(
        service.update(todo.id, "\t"),
        Err(TodoServiceError::Validation(_))
    ));
    assert_eq!(service.get(todo.id).unwrap().title, "real");
}

#[test]
fn each_operation_makes_one_store_round_trip_per_step() {
    let conn = open_db_in_memory().unwrap();
    let repo = CountingRepo::new(SqliteTodoRepository::try_new(&conn).unwrap());
    let clock = ManualClock::new(1);
    let service = TodoService::with_clock(repo, &clock);
    let todo = service.create("count me").unwrap();
    assert_eq!(counts(&service), (0, 1));

    service.update(todo.id, "counted").unwrap();
    assert_eq!(counts(&service), (1, 1));

    service.toggle(todo.id).unwrap();
    assert_eq!(counts(&service), (1, 1));

    service.list_all().unwrap();
    assert_eq!(counts(&service), (1, 0));
    service.list_incomplete().unwrap();
    assert_eq!(counts(&service), (1, 0));
    service.list_completed().unwrap();
    assert_eq!(counts(&service), (1, 0));

    service.delete(todo.id).unwrap();
    assert_eq!(counts(&service), (1, 1));

    service.toggle(todo.id).unwrap_err();
    assert_eq!(counts(&service), (1, 0));
}

#[test]
fn status_filter_and_search_are_served_from_the_store() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new(1);
    let service = TodoService::with_clock(SqliteTodoRepository::try_new(&conn).unwrap(), &clock);

    let milk = service.create("Buy milk").unwrap();
    let bread = service.create("buy BREAD").unwrap();
    let call = service.create("Call plumber").unwrap();
    service.toggle(bread.id).unwrap();

    assert_eq!(ids(&service.list_by_status(false).unwrap()), vec![milk.id, call.id]);
    assert_eq!(ids(&service.list_by_status(true).unwrap()), vec![bread.id]);
    assert_eq!(ids(&service.search("BUY").unwrap()), vec![milk.id, bread.id]);
    assert_eq!(ids(&service.search("plumb").unwrap()), vec![call.id]);
    assert_eq!(service.search("   ").unwrap().len(), 3);
    assert!(service.search("dentist").unwrap().is_empty());
}

#[test]
fn search_keeps_surrounding_whitespace_in_the_needle() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new(1);
    let service = TodoService::with_clock(SqliteTodoRepository::try_new(&conn).unwrap(), &clock);

    let call = service.create("Call plumber").unwrap();
    service.create("plumbing").unwrap();

    assert_eq!(ids(&service.search(" PLUMB").unwrap()), vec![call.id]);
    assert!(service.search("plumb ").unwrap().is_empty());
    assert!(service.search("  plumb ").unwrap().is_empty());
    assert_eq!(service.search(" \t ").unwrap().len(), 2);
}

#[test]
fn concurrent_writers_resolve_by_last_write_wins() {
    let conn = open_db_in_memory().unwrap();
    let service = TodoService::with_clock(
        SqliteTodoRepository::try_new(&conn).unwrap(),
        ManualClock::new(1_000),
    );
    let todo = service.create("shared").unwrap();

    // Two callers read the same row before either writes back.
    let writer_a = SqliteTodoRepository::try_new(&conn).unwrap();
    let writer_b = SqliteTodoRepository::try_new(&conn).unwrap();
    let mut seen_by_a = writer_a.find_by_id(todo.id).unwrap().unwrap();
    let mut seen_by_b = writer_b.find_by_id(todo.id).unwrap().unwrap();

    seen_by_a.rename("renamed by a", 2_000);
    seen_by_b.toggle(2_001);
    writer_a.save(&seen_by_a).unwrap();
    writer_b.save(&seen_by_b).unwrap();

    let stored = service.get(todo.id).unwrap();
    assert_eq!(stored.title, "shared");
    assert!(stored.completed);
    assert_eq!(stored.updated_at, 2_001);
}
