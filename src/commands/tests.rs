use crate::config::AppConfig;
use crate::domain::TaskPriority;
use crate::repository::{init_db, TxLimits};
use crate::{bootstrap, AppState};
use super::*;

async fn state() -> AppState {
    let config = AppConfig::in_memory();
    let db = init_db(&config.db_path, TxLimits::from_config(&config))
        .await
        .expect("init db");
    AppState::new(config, db)
}

/// Board with one section holding tasks in the given order: (board, section, task ids)
async fn section_with_tasks(state: &AppState, titles: &[&str]) -> (u32, u32, Vec<u32>) {
    let board = create_board(state, "Board".into(), None).await.unwrap();
    let section = create_section(state, board.id, "Todo".into()).await.unwrap();
    let mut ids = Vec::new();
    for title in titles {
        let task = create_task(state, section.id, title.to_string(), None, None).await.unwrap();
        ids.push(task.id);
    }
    (board.id, section.id, ids)
}

#[tokio::test]
async fn test_board_lifecycle() {
    let state = state().await;
    let board = create_board(&state, "Work".into(), Some("day job".into())).await.unwrap();

    let renamed = update_board(&state, board.id, Some("Office".into()), None).await.unwrap();
    assert_eq!(renamed.name, "Office");
    assert_eq!(renamed.description.as_deref(), Some("day job"));

    delete_board(&state, board.id).await.unwrap();
    assert!(list_boards(&state).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sections_keep_creation_order() {
    let state = state().await;
    let board = create_board(&state, "Board".into(), None).await.unwrap();
    for title in ["Todo", "Doing", "Done"] {
        create_section(&state, board.id, title.into()).await.unwrap();
    }

    let titles: Vec<String> = list_sections(&state, board.id)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.title)
        .collect();
    assert_eq!(titles, vec!["Todo", "Doing", "Done"]);
}

#[tokio::test]
async fn test_rename_and_delete_section() {
    let state = state().await;
    let board = create_board(&state, "Board".into(), None).await.unwrap();
    let first = create_section(&state, board.id, "Todo".into()).await.unwrap();
    let second = create_section(&state, board.id, "Done".into()).await.unwrap();

    let renamed = rename_section(&state, second.id, "Shipped".into()).await.unwrap();
    assert_eq!(renamed.title, "Shipped");
    assert_eq!(renamed.position, 1);

    delete_section(&state, first.id).await.unwrap();
    let remaining = list_sections(&state, board.id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].position, 0);
}

#[tokio::test]
async fn test_move_sections_reorders_board() {
    let state = state().await;
    let board = create_board(&state, "Board".into(), None).await.unwrap();
    let a = create_section(&state, board.id, "A".into()).await.unwrap();
    let b = create_section(&state, board.id, "B".into()).await.unwrap();

    let map = move_sections(&state, board.id, board.id, vec![b.id, a.id]).await.unwrap();
    assert_eq!(map[&b.id], 0);
    assert_eq!(map[&a.id], 1);
}

#[tokio::test]
async fn test_move_tasks_across_sections() {
    let state = state().await;
    let (board_id, todo, tasks) = section_with_tasks(&state, &["a", "b", "c"]).await;
    let done = create_section(&state, board_id, "Done".into()).await.unwrap();

    move_tasks(&state, todo, done.id, vec![tasks[1]]).await.unwrap();

    let left: Vec<u32> = list_tasks(&state, todo).await.unwrap().iter().map(|t| t.id).collect();
    assert_eq!(left, vec![tasks[0], tasks[2]]);
    let moved = list_tasks(&state, done.id).await.unwrap();
    assert_eq!(moved.len(), 1);
    assert_eq!((moved[0].id, moved[0].position), (tasks[1], 0));
}

#[tokio::test]
async fn test_update_task_keeps_unset_fields() {
    let state = state().await;
    let (_, section_id, _) = section_with_tasks(&state, &[]).await;
    let task = create_task(&state, section_id, "Write docs".into(), Some("draft".into()), Some("high".into()))
        .await
        .unwrap();

    let updated = update_task(&state, task.id, None, None, Some("low".into()), Some(1_700_000_000_000))
        .await
        .unwrap();
    assert_eq!(updated.title, "Write docs");
    assert_eq!(updated.content.as_deref(), Some("draft"));
    assert_eq!(updated.priority, TaskPriority::Low);
    assert_eq!(updated.due_at, Some(1_700_000_000_000));
    assert_eq!(updated.position, 0);
}

#[tokio::test]
async fn test_task_attachments() {
    let state = state().await;
    let (_, _, tasks) = section_with_tasks(&state, &["a"]).await;

    add_task_comment(&state, tasks[0], "looks good".into()).await.unwrap();
    link_task_document(&state, tasks[0], "Design".into(), "https://example.org/doc".into())
        .await
        .unwrap();

    assert_eq!(list_task_comments(&state, tasks[0]).await.unwrap()[0].body, "looks good");
    assert_eq!(list_task_documents(&state, tasks[0]).await.unwrap()[0].name, "Design");

    delete_task(&state, tasks[0]).await.unwrap();
    assert!(list_task_comments(&state, tasks[0]).await.is_err());
}

#[tokio::test]
async fn test_stale_drag_asks_to_refresh() {
    let state = state().await;
    let (_, section_id, tasks) = section_with_tasks(&state, &["a", "b", "c"]).await;

    let err = move_tasks(&state, section_id, section_id, vec![tasks[2], tasks[0]])
        .await
        .unwrap_err();
    assert!(err.contains("refresh"), "unexpected message: {}", err);
    assert_eq!(state.db_state.metrics().snapshot().conflicts, 1);
}

#[tokio::test]
async fn test_missing_task_message() {
    let state = state().await;
    let err = update_task(&state, 404, Some("x".into()), None, None, None).await.unwrap_err();
    assert!(err.contains("404"));
}

#[tokio::test]
async fn test_database_status() {
    let state = state().await;
    create_board(&state, "Board".into(), None).await.unwrap();

    let status = database_status(&state, 10).await.unwrap();
    assert!(status.healthy);
    assert_eq!(status.metrics.committed, 1);
    assert!(status.recent_logs.len() <= 10);
}

#[tokio::test]
async fn test_bootstrap_opens_database_and_log() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        db_path: dir.path().join("boards.db"),
        log_dir: dir.path().join("logs"),
        ..AppConfig::default()
    };

    let state = bootstrap(config).await.unwrap();
    assert!(state.db_state.is_initialized().await);
    assert!(dir.path().join("boards.db").exists());
    assert!(rolling_logger::log_path().is_some());
}
