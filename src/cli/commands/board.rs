//! Board command implementation.

use colored::Colorize;
use serde_json::json;

use super::{report_queued, Context};
use crate::cli::args::{BoardCommands, ColumnCommands, ItemCommands, OutputFormat};
use crate::core::{ColumnId, ItemId};
use crate::error::BoardsyncError;
use crate::features::board::BoardStore;
use crate::features::sync::{Mutation, SyncQueue};
use crate::output::{format_board, to_json};
use crate::storage::Database;

/// Execute board subcommands.
///
/// # Errors
///
/// Returns an error if a column or card is unknown, a move is out of range,
/// or local storage fails.
pub fn board(ctx: &Context, cmd: BoardCommands) -> Result<String, BoardsyncError> {
    match cmd {
        BoardCommands::Show { project } => {
            let db = Database::open(&ctx.paths)?;
            let board = BoardStore::new(&db).load(project)?;
            format_board(&board, ctx.format)
        }
        BoardCommands::Column {
            command: ColumnCommands::Add { project, id, title },
        } => {
            let db = Database::open(&ctx.paths)?;
            let store = BoardStore::new(&db);
            let mut board = store.load(project)?;
            let id = ColumnId::parse(&id)?;
            board.add_column(id.clone(), &title)?;
            store.save(&board)?;

            match ctx.format {
                OutputFormat::Json => to_json(&json!({"project_id": project, "column": id, "title": title})),
                OutputFormat::Pretty => Ok(format!("{} Added column {} to project {project}", "✓".green(), title.bold())),
            }
        }
        BoardCommands::Item {
            command: ItemCommands::Add {
                project,
                column,
                item,
                index,
            },
        } => {
            let db = Database::open(&ctx.paths)?;
            let store = BoardStore::new(&db);
            let mut board = store.load(project)?;
            let column = ColumnId::parse(&column)?;
            let item = ItemId::parse(&item)?;
            board.add_item(&column, item.clone(), index)?;
            store.save(&board)?;

            match ctx.format {
                OutputFormat::Json => to_json(&json!({"project_id": project, "column": column, "item": item})),
                OutputFormat::Pretty => Ok(format!("{} Placed {item} in {column}", "✓".green())),
            }
        }
        BoardCommands::Move {
            project,
            item,
            from,
            to,
            index,
            sync_now,
        } => {
            let item = ItemId::parse(&item)?;
            let from = ColumnId::parse(&from)?;
            let to = ColumnId::parse(&to)?;

            let client = ctx.open_client_for(sync_now)?;
            let db = client.queue().database();

            let mut board = BoardStore::new(db).load(project)?;
            let mutation = Mutation::MoveTask(board.move_item(&item, &from, &to, index)?);

            // The moved card and its queued move commit together or not at all.
            let tx = db.transaction()?;
            BoardStore::save_in(&tx, &board)?;
            let id = SyncQueue::enqueue_in(&tx, &mutation)?;
            tx.commit()
                .map_err(|e| BoardsyncError::Database(format!("Failed to commit board move: {e}")))?;

            report_queued(&client, &id, &mutation, sync_now, ctx.format)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::SyncNowArg;

    fn setup() -> (tempfile::TempDir, Context) {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let ctx = Context::load(Some(temp_dir.path().to_path_buf()), Some(OutputFormat::Json)).unwrap();

        for (id, title) in [("todo", "To Do"), ("done", "Done")] {
            board(
                &ctx,
                BoardCommands::Column {
                    command: ColumnCommands::Add {
                        project: 7,
                        id: id.to_string(),
                        title: title.to_string(),
                    },
                },
            )
            .unwrap();
        }
        board(
            &ctx,
            BoardCommands::Item {
                command: ItemCommands::Add {
                    project: 7,
                    column: "todo".to_string(),
                    item: "t1".to_string(),
                    index: None,
                },
            },
        )
        .unwrap();

        (temp_dir, ctx)
    }

    fn move_t1(ctx: &Context) -> Result<String, BoardsyncError> {
        board(
            ctx,
            BoardCommands::Move {
                project: 7,
                item: "t1".to_string(),
                from: "todo".to_string(),
                to: "done".to_string(),
                index: 0,
                sync_now: SyncNowArg::default(),
            },
        )
    }

    fn column_of_t1(ctx: &Context) -> Option<String> {
        let db = Database::open(&ctx.paths).unwrap();
        let board = BoardStore::new(&db).load(7).unwrap();
        board
            .locate(&ItemId::parse("t1").unwrap())
            .map(|(column, _)| column.to_string())
    }

    #[test]
    fn test_move_saves_board_and_queues_move() {
        let (_temp_dir, ctx) = setup();

        move_t1(&ctx).unwrap();

        assert_eq!(column_of_t1(&ctx).as_deref(), Some("done"));
        let entries = ctx.open_queue().unwrap().list_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(matches!(entries[0].payload, Mutation::MoveTask(_)));
    }

    #[test]
    fn test_failed_enqueue_leaves_board_unchanged() {
        let (_temp_dir, ctx) = setup();
        Database::open(&ctx.paths)
            .unwrap()
            .connection()
            .execute_batch(
                "CREATE TRIGGER reject_insert BEFORE INSERT ON sync_queue
                 BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
            )
            .unwrap();

        let err = move_t1(&ctx).unwrap_err();

        assert!(err.is_storage());
        assert!(err.to_string().contains("disk full"));
        assert_eq!(column_of_t1(&ctx).as_deref(), Some("todo"));
        assert_eq!(ctx.open_queue().unwrap().pending_count().unwrap(), 0);
    }
}
