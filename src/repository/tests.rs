//! Repository Integration Tests
//!
//! Tests for the repositories and the reindexer against real SQLite
//! databases (in-memory, or a temp file when two connections are needed).

#[cfg(test)]
mod tests {
    use crate::domain::{Board, DomainError, Section, Task, TaskPriority};
    use crate::repository::{
        init_db, BoardRepository, DbState, Repository, SectionPositioningOperations,
        SectionRepository, TaskAttachmentOperations, TaskPositioningOperations, TaskRepository,
        TxLimits,
    };
    use std::path::Path;
    use std::time::Duration;

    struct Fixture {
        db: DbState,
        boards: BoardRepository,
        sections: SectionRepository,
        tasks: TaskRepository,
    }

    impl Fixture {
        fn new(db: DbState) -> Self {
            Self {
                boards: BoardRepository::new(db.clone()),
                sections: SectionRepository::new(db.clone()),
                tasks: TaskRepository::new(db.clone()),
                db,
            }
        }

        async fn board(&self, name: &str) -> Board {
            self.boards.create(&Board::new(0, name.to_string())).await.expect("Failed to create board")
        }

        async fn section(&self, board_id: u32, title: &str) -> Section {
            self.sections
                .create(&Section::new(0, board_id, title.to_string()))
                .await
                .expect("Failed to create section")
        }

        async fn task(&self, section_id: u32, title: &str) -> Task {
            self.tasks
                .create(&Task::new(0, section_id, title.to_string()))
                .await
                .expect("Failed to create task")
        }

        async fn order(&self, section_id: u32) -> Vec<(String, u32)> {
            self.tasks
                .list_by_section(section_id)
                .await
                .unwrap()
                .into_iter()
                .map(|t| (t.title, t.position))
                .collect()
        }
    }

    async fn setup_test_db() -> Fixture {
        // Use in-memory database for tests
        let db = init_db(Path::new(":memory:"), TxLimits::default())
            .await
            .expect("Failed to init test DB");
        Fixture::new(db)
    }

    fn pairs(items: &[(&str, u32)]) -> Vec<(String, u32)> {
        items.iter().map(|(t, p)| (t.to_string(), *p)).collect()
    }

    #[tokio::test]
    async fn test_append_assigns_sequential_positions() {
        let fx = setup_test_db().await;
        let board = fx.board("Sales").await;
        let section = fx.section(board.id, "Todo").await;

        for (i, title) in ["a", "b", "c", "d"].iter().enumerate() {
            let task = fx.task(section.id, title).await;
            assert_eq!(task.position, i as u32);
        }
        assert_eq!(
            fx.order(section.id).await,
            pairs(&[("a", 0), ("b", 1), ("c", 2), ("d", 3)])
        );
    }

    #[tokio::test]
    async fn test_delete_then_append_scenario() {
        let fx = setup_test_db().await;
        let board = fx.board("Pipeline").await;
        let s1 = fx.section(board.id, "S1").await;
        fx.task(s1.id, "T1").await;
        let t2 = fx.task(s1.id, "T2").await;
        fx.task(s1.id, "T3").await;

        fx.tasks.delete(t2.id).await.expect("Delete failed");
        assert_eq!(fx.order(s1.id).await, pairs(&[("T1", 0), ("T3", 1)]));

        let t4 = fx.task(s1.id, "T4").await;
        assert_eq!(t4.position, 2);
        assert_eq!(fx.order(s1.id).await, pairs(&[("T1", 0), ("T3", 1), ("T4", 2)]));
    }

    #[tokio::test]
    async fn test_move_task_between_sections() {
        let fx = setup_test_db().await;
        let board = fx.board("Support").await;
        let a_section = fx.section(board.id, "A").await;
        let b_section = fx.section(board.id, "B").await;
        let a = fx.task(a_section.id, "a").await;
        let b = fx.task(a_section.id, "b").await;
        let c = fx.task(a_section.id, "c").await;
        let x = fx.task(b_section.id, "x").await;
        let y = fx.task(b_section.id, "y").await;

        let map = fx
            .tasks
            .move_tasks(a_section.id, b_section.id, &[x.id, b.id, y.id])
            .await
            .expect("Move failed");

        assert_eq!(fx.order(a_section.id).await, pairs(&[("a", 0), ("c", 1)]));
        assert_eq!(fx.order(b_section.id).await, pairs(&[("x", 0), ("b", 1), ("y", 2)]));
        assert_eq!(map.get(&a.id), Some(&0));
        assert_eq!(map.get(&c.id), Some(&1));
        assert_eq!(map.get(&b.id), Some(&1));
        assert_eq!(map.len(), 5);

        let moved = fx.tasks.find_by_id(b.id).await.unwrap().unwrap();
        assert_eq!(moved.section_id, b_section.id);
    }

    #[tokio::test]
    async fn test_reorder_within_section() {
        let fx = setup_test_db().await;
        let board = fx.board("Ops").await;
        let section = fx.section(board.id, "Doing").await;
        let a = fx.task(section.id, "a").await;
        let b = fx.task(section.id, "b").await;
        let c = fx.task(section.id, "c").await;

        fx.tasks.move_tasks(section.id, section.id, &[c.id, a.id, b.id]).await.unwrap();

        assert_eq!(fx.order(section.id).await, pairs(&[("c", 0), ("a", 1), ("b", 2)]));
    }

    #[tokio::test]
    async fn test_stale_order_is_a_conflict() {
        let fx = setup_test_db().await;
        let board = fx.board("Ops").await;
        let section = fx.section(board.id, "Doing").await;
        let a = fx.task(section.id, "a").await;
        fx.task(section.id, "b").await;

        // The client only knew about `a`
        let err = fx.tasks.move_tasks(section.id, section.id, &[a.id]).await.unwrap_err();
        assert!(matches!(err, DomainError::ConcurrentModification(_)));
        assert!(err.is_retryable());
        assert_eq!(fx.db.metrics().snapshot().conflicts, 1);
    }

    #[tokio::test]
    async fn test_duplicate_ids_are_rejected() {
        let fx = setup_test_db().await;
        let board = fx.board("Ops").await;
        let section = fx.section(board.id, "Doing").await;
        let a = fx.task(section.id, "a").await;
        let b = fx.task(section.id, "b").await;

        let err = fx
            .tasks
            .move_tasks(section.id, section.id, &[a.id, b.id, a.id])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_failed_write_rolls_back_whole_reorder() {
        let fx = setup_test_db().await;
        let board = fx.board("Ops").await;
        let section = fx.section(board.id, "Doing").await;
        let mut ids = Vec::new();
        for title in ["a", "b", "c", "d"] {
            ids.push(fx.task(section.id, title).await.id);
        }

        // Abort the last of the four position writes
        let last = ids[0];
        fx.db
            .read(move |conn| {
                conn.execute_batch(&format!(
                    "CREATE TRIGGER fail_position BEFORE UPDATE OF position ON tasks
                     WHEN NEW.id = {} BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
                    last
                ))
                .map_err(crate::repository::db_err)
            })
            .await
            .unwrap();

        let reversed: Vec<u32> = ids.iter().rev().copied().collect();
        let err = fx.tasks.move_tasks(section.id, section.id, &reversed).await.unwrap_err();

        assert!(matches!(err, DomainError::Internal(_)));
        assert_eq!(
            fx.order(section.id).await,
            pairs(&[("a", 0), ("b", 1), ("c", 2), ("d", 3)])
        );
        assert_eq!(fx.db.metrics().snapshot().rolled_back, 1);
    }

    #[tokio::test]
    async fn test_update_does_not_touch_position() {
        let fx = setup_test_db().await;
        let board = fx.board("Ops").await;
        let section = fx.section(board.id, "Doing").await;
        fx.task(section.id, "a").await;
        let mut b = fx.task(section.id, "b").await;

        b.title = "b2".to_string();
        b.priority = TaskPriority::High;
        b.position = 0;
        b.section_id = 999;
        let updated = fx.tasks.update(&b).await.expect("Update failed");

        assert_eq!(updated.title, "b2");
        assert_eq!(updated.priority, TaskPriority::High);
        assert_eq!(updated.position, 1);
        assert_eq!(updated.section_id, section.id);
    }

    #[tokio::test]
    async fn test_create_in_missing_section() {
        let fx = setup_test_db().await;
        let err = fx.tasks.create(&Task::new(0, 42, "orphan".to_string())).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert!(fx.tasks.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_task_cascades_attachments() {
        let fx = setup_test_db().await;
        let board = fx.board("Ops").await;
        let section = fx.section(board.id, "Doing").await;
        let task = fx.task(section.id, "a").await;

        fx.tasks.add_comment(task.id, "first").await.unwrap();
        fx.tasks.add_comment(task.id, "second").await.unwrap();
        fx.tasks.link_document(task.id, "Contract", "https://docs.example/1").await.unwrap();
        assert_eq!(fx.tasks.list_comments(task.id).await.unwrap().len(), 2);
        assert_eq!(fx.tasks.list_documents(task.id).await.unwrap().len(), 1);

        fx.tasks.delete(task.id).await.unwrap();

        let leftovers: i64 = fx
            .db
            .read(|conn| {
                conn.query_row(
                    "SELECT (SELECT COUNT(*) FROM task_comments) + (SELECT COUNT(*) FROM task_documents)",
                    [],
                    |row| row.get(0),
                )
                .map_err(crate::repository::db_err)
            })
            .await
            .unwrap();
        assert_eq!(leftovers, 0);
        assert!(matches!(
            fx.tasks.list_comments(task.id).await.unwrap_err(),
            DomainError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_delete_section_cascades_and_closes_gap() {
        let fx = setup_test_db().await;
        let board = fx.board("Ops").await;
        let todo = fx.section(board.id, "Todo").await;
        let doing = fx.section(board.id, "Doing").await;
        let done = fx.section(board.id, "Done").await;
        fx.task(doing.id, "a").await;
        fx.task(doing.id, "b").await;

        fx.sections.delete(doing.id).await.unwrap();

        let sections = fx.sections.list_by_board(board.id).await.unwrap();
        let ids: Vec<(u32, u32)> = sections.iter().map(|s| (s.id, s.position)).collect();
        assert_eq!(ids, vec![(todo.id, 0), (done.id, 1)]);
        assert!(fx.tasks.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_board_cascades() {
        let fx = setup_test_db().await;
        let board = fx.board("Ops").await;
        let section = fx.section(board.id, "Todo").await;
        fx.task(section.id, "a").await;

        fx.boards.delete(board.id).await.unwrap();

        assert!(fx.sections.list().await.unwrap().is_empty());
        assert!(fx.tasks.list().await.unwrap().is_empty());
        assert!(matches!(
            fx.boards.delete(board.id).await.unwrap_err(),
            DomainError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_move_section_between_boards() {
        let fx = setup_test_db().await;
        let first = fx.board("First").await;
        let second = fx.board("Second").await;
        let a = fx.section(first.id, "a").await;
        let b = fx.section(first.id, "b").await;
        let x = fx.section(second.id, "x").await;

        fx.sections.move_sections(first.id, second.id, &[a.id, x.id]).await.unwrap();

        let first_map = fx.sections.board_positions(first.id).await.unwrap();
        let second_map = fx.sections.board_positions(second.id).await.unwrap();
        assert_eq!(first_map.into_iter().collect::<Vec<_>>(), vec![(b.id, 0)]);
        assert_eq!(second_map.get(&a.id), Some(&0));
        assert_eq!(second_map.get(&x.id), Some(&1));
    }

    #[tokio::test]
    async fn test_reindex_repairs_corrupted_positions() {
        let fx = setup_test_db().await;
        let board = fx.board("Ops").await;
        let section = fx.section(board.id, "Doing").await;
        for title in ["a", "b", "c"] {
            fx.task(section.id, title).await;
        }

        fx.db
            .read(|conn| {
                conn.execute("UPDATE tasks SET position = position * 10 + 5", [])
                    .map(|_| ())
                    .map_err(crate::repository::db_err)
            })
            .await
            .unwrap();

        fx.tasks.reindex_section(section.id).await.unwrap();
        assert_eq!(fx.order(section.id).await, pairs(&[("a", 0), ("b", 1), ("c", 2)]));

        let positions = fx.tasks.section_positions(section.id).await.unwrap();
        assert_eq!(positions.values().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_lock_wait_times_out() {
        let limits = TxLimits {
            lock_timeout: Duration::from_millis(50),
            ..TxLimits::default()
        };
        let db = init_db(Path::new(":memory:"), limits).await.unwrap();
        let fx = Fixture::new(db);
        let board = fx.board("Ops").await;
        let section = fx.section(board.id, "Doing").await;
        let a = fx.task(section.id, "a").await;

        let guard = fx.db.conn.lock().await;
        let err = fx.tasks.move_tasks(section.id, section.id, &[a.id]).await.unwrap_err();
        drop(guard);

        assert!(matches!(err, DomainError::PersistenceTimeout(_)));
        assert_eq!(fx.db.metrics().snapshot().timeouts, 1);
    }

    #[tokio::test]
    async fn test_foreign_write_lock_is_a_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boards.db");
        let limits = TxLimits {
            busy_timeout: Duration::from_millis(50),
            ..TxLimits::default()
        };
        let fx = Fixture::new(init_db(&path, limits).await.unwrap());
        let board = fx.board("Ops").await;
        let section = fx.section(board.id, "Doing").await;
        let a = fx.task(section.id, "a").await;

        let blocker = rusqlite::Connection::open(&path).unwrap();
        blocker.execute_batch("BEGIN IMMEDIATE;").unwrap();

        let err = fx.tasks.move_tasks(section.id, section.id, &[a.id]).await.unwrap_err();
        assert!(matches!(err, DomainError::ConcurrentModification(_)));

        blocker.execute_batch("ROLLBACK;").unwrap();
        fx.tasks.move_tasks(section.id, section.id, &[a.id]).await.unwrap();
    }

    #[tokio::test]
    async fn test_transaction_deadline_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boards.db");
        let fx = Fixture::new(init_db(&path, TxLimits::default()).await.unwrap());
        let board = fx.board("Ops").await;
        let section = fx.section(board.id, "Doing").await;
        let a = fx.task(section.id, "a").await;
        let b = fx.task(section.id, "b").await;

        let hurried = TxLimits {
            transaction_timeout: Duration::ZERO,
            ..TxLimits::default()
        };
        let rushed = Fixture::new(init_db(&path, hurried).await.unwrap());
        let err = rushed
            .tasks
            .move_tasks(section.id, section.id, &[b.id, a.id])
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::PersistenceTimeout(_)));
        assert_eq!(fx.order(section.id).await, pairs(&[("a", 0), ("b", 1)]));
    }

    #[tokio::test]
    async fn test_commits_are_counted() {
        let fx = setup_test_db().await;
        let board = fx.board("Ops").await;
        fx.section(board.id, "Todo").await;

        assert_eq!(fx.db.metrics().snapshot().committed, 2);
    }
}
