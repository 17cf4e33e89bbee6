//! Project command implementation.

use super::{queue_mutation, Context};
use crate::cli::args::ProjectCommands;
use crate::error::BoardsyncError;
use crate::features::sync::{CreateProject, Mutation, UpdateProject};

/// Execute project subcommands.
///
/// # Errors
///
/// Returns an error if the arguments are invalid or the mutation cannot be queued.
pub fn project(ctx: &Context, cmd: ProjectCommands) -> Result<String, BoardsyncError> {
    let (mutation, sync_now) = match cmd {
        ProjectCommands::Add {
            name,
            workspace,
            description,
            personal,
            sync_now,
        } => {
            let name = name.trim();
            if name.is_empty() {
                return Err(BoardsyncError::InvalidInput(
                    "project name cannot be empty".to_string(),
                ));
            }
            let mutation = Mutation::CreateProject(CreateProject {
                workspace_id: workspace,
                name: name.to_string(),
                description,
                is_personal: personal,
            });
            (mutation, sync_now)
        }
        ProjectCommands::Update {
            id,
            name,
            description,
            sync_now,
        } => {
            if name.is_none() && description.is_none() {
                return Err(BoardsyncError::InvalidInput(
                    "nothing to update: pass --name or --description".to_string(),
                ));
            }
            let mutation = Mutation::UpdateProject(UpdateProject {
                project_id: id,
                name,
                description,
            });
            (mutation, sync_now)
        }
        ProjectCommands::Delete { id, sync_now } => {
            (Mutation::DeleteProject { project_id: id }, sync_now)
        }
    };

    let client = ctx.open_client_for(sync_now)?;
    queue_mutation(&client, &mutation, sync_now, ctx.format)
}
