//! Task command implementation.

use chrono::NaiveDate;

use super::{queue_mutation, Context};
use crate::cli::args::{AddTaskArgs, TaskCommands};
use crate::core::ColumnId;
use crate::error::BoardsyncError;
use crate::features::sync::{CreateTask, Mutation, Priority};

/// Execute task subcommands.
///
/// # Errors
///
/// Returns an error if the arguments are invalid or the mutation cannot be queued.
pub fn task(ctx: &Context, cmd: TaskCommands) -> Result<String, BoardsyncError> {
    match cmd {
        TaskCommands::Add(args) => add_task(ctx, args),
    }
}

fn add_task(ctx: &Context, args: AddTaskArgs) -> Result<String, BoardsyncError> {
    let mutation = Mutation::CreateTask(build_task(&args)?);
    let client = ctx.open_client_for(args.sync_now)?;
    queue_mutation(&client, &mutation, args.sync_now, ctx.format)
}

fn build_task(args: &AddTaskArgs) -> Result<CreateTask, BoardsyncError> {
    let title = args.title.trim();
    if title.is_empty() {
        return Err(BoardsyncError::InvalidInput(
            "task title cannot be empty".to_string(),
        ));
    }

    let priority = Priority::from_name(&args.priority).ok_or_else(|| {
        BoardsyncError::InvalidInput(format!(
            "unknown priority '{}' (expected low, medium or high)",
            args.priority
        ))
    })?;

    let due_date = args
        .due
        .as_deref()
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
                BoardsyncError::InvalidInput(format!("invalid due date '{s}' (expected YYYY-MM-DD)"))
            })
        })
        .transpose()?;

    Ok(CreateTask {
        title: title.to_string(),
        description: args.description.clone(),
        project_id: args.project,
        column_id: args.column.as_deref().map(ColumnId::parse).transpose()?,
        due_date,
        priority,
        assignee_id: args.assignee,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::SyncNowArg;

    fn args(title: &str) -> AddTaskArgs {
        AddTaskArgs {
            title: title.to_string(),
            project: 7,
            column: None,
            description: None,
            due: None,
            priority: "medium".to_string(),
            assignee: None,
            sync_now: SyncNowArg::default(),
        }
    }

    #[test]
    fn test_build_task() {
        let mut a = args("  Buy milk ");
        a.due = Some("2024-12-31".to_string());
        a.priority = "HIGH".to_string();
        a.column = Some("todo".to_string());

        let task = build_task(&a).unwrap();
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 12, 31));
        assert_eq!(task.column_id.unwrap().as_str(), "todo");
    }

    #[test]
    fn test_build_task_rejects_bad_input() {
        assert!(build_task(&args("   ")).is_err());

        let mut a = args("t");
        a.due = Some("31/12/2024".to_string());
        assert!(build_task(&a).is_err());

        let mut a = args("t");
        a.priority = "urgent".to_string();
        assert!(build_task(&a).is_err());
    }
}
