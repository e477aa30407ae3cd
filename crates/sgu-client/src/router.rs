//! Command dispatch.
//!
//! Maps every leaf command to exactly one wire request. This table is the
//! protocol contract with the remote service: request kinds and field sets
//! must match it exactly. Dispatch ensures a live connection before sending.
//!
//! Item arguments equal to `"hand"` are substituted at invocation time with
//! the player's held item (compared by value, never identity); commands that
//! carry a quantity take the held stack's count along with it.

use std::sync::Arc;

use sgu_proto::{Request, RequestBuilder};

use crate::cli::{
    Command, GroupCommands, InventoryCommands, ItemCommands, ProjectCommands,
    ProjectItemCommands, ProjectScope, ViewCommands,
};
use crate::connection::ConnectionManager;
use crate::error::ClientError;
use crate::host::PlayerHandle;
use crate::transport::Transport;

/// Literal item argument meaning "whatever I'm holding".
const HAND_LITERAL: &str = "hand";
/// Sentinel meaning "not group-scoped" / "no source project".
const NO_ID: i64 = -1;

/// Translates commands into requests and sends them.
pub struct CommandRouter<T: Transport> {
    connection: ConnectionManager<T>,
    player: Arc<dyn PlayerHandle>,
}

impl<T: Transport> CommandRouter<T> {
    /// Create a router over a connection manager.
    #[must_use]
    pub fn new(connection: ConnectionManager<T>, player: Arc<dyn PlayerHandle>) -> Self {
        Self { connection, player }
    }

    /// The underlying connection manager.
    #[must_use]
    pub fn connection(&self) -> &ConnectionManager<T> {
        &self.connection
    }

    /// Mutable access to the underlying connection manager.
    pub fn connection_mut(&mut self) -> &mut ConnectionManager<T> {
        &mut self.connection
    }

    /// Execute one command: ensure a live connection, then send the mapped
    /// request. `connect` and `disconnect` drive the connection directly.
    ///
    /// # Errors
    ///
    /// Returns an error if argument resolution, connecting, or sending
    /// fails.
    pub async fn dispatch(&mut self, command: &Command) -> Result<(), ClientError> {
        match command {
            Command::Connect => self.connection.ensure_connected().await,
            Command::Disconnect => self.connection.close().await,
            other => {
                let request = self.build_request(other)?;
                self.connection.ensure_connected().await?;
                self.connection.send(&request).await
            }
        }
    }

    /// Build the request for a command without sending it.
    ///
    /// # Errors
    ///
    /// Returns an error for `connect`/`disconnect` (which carry no
    /// request), a `hand` argument with nothing held, or GROUP scope
    /// without a group id.
    pub fn build_request(&self, command: &Command) -> Result<Request, ClientError> {
        match command {
            Command::Connect | Command::Disconnect => Err(ClientError::InvalidArgument(
                "connect/disconnect do not map to a request".into(),
            )),
            Command::Group { command } => Ok(Self::group_request(command)),
            Command::Inventory { command } => Ok(Self::inventory_request(command)),
            Command::Items { command } => self.item_request(command),
            Command::Projects { command } => self.project_request(command),
        }
    }

    fn group_request(command: &GroupCommands) -> Request {
        match command {
            GroupCommands::Create { group_name } => RequestBuilder::new("group-create")
                .field_str("group_name", group_name.clone())
                .build(),
            GroupCommands::List => RequestBuilder::new("group-list").build(),
            GroupCommands::Info { group_id } => RequestBuilder::new("group-info-req")
                .field_int("group_id", *group_id)
                .build(),
            GroupCommands::Delete { group_id } => RequestBuilder::new("group-delete")
                .field_int("group_id", *group_id)
                .build(),
            GroupCommands::Transfer {
                group_id,
                new_owner_username,
            } => RequestBuilder::new("group-transfer")
                .field_int("group_id", *group_id)
                .field_str("new_owner_username", new_owner_username.clone())
                .build(),
            GroupCommands::Add {
                group_id,
                new_member_username,
            } => RequestBuilder::new("group-add")
                .field_int("group_id", *group_id)
                .field_str("new_member_username", new_member_username.clone())
                .build(),
            GroupCommands::Remove {
                group_id,
                member_username,
            } => RequestBuilder::new("group-remove")
                .field_int("group_id", *group_id)
                .field_str("member_username", member_username.clone())
                .build(),
            GroupCommands::Leave { group_id } => RequestBuilder::new("group-leave")
                .field_int("group_id", *group_id)
                .build(),
        }
    }

    fn inventory_request(command: &InventoryCommands) -> Request {
        match command {
            InventoryCommands::Add { inv_id } => RequestBuilder::new("inventory-add")
                .field_str("external_id", inv_id.clone())
                .build(),
            InventoryCommands::Remove { inv_id } => RequestBuilder::new("inventory-remove")
                .field_str("external_id", inv_id.clone())
                .build(),
        }
    }

    fn item_request(&self, command: &ItemCommands) -> Result<Request, ClientError> {
        let request = match command {
            ItemCommands::Get { inv_id } => RequestBuilder::new("item-get")
                .field_str("external_id", inv_id.clone())
                .build(),
            ItemCommands::Add {
                inv_id,
                item_id,
                item_qty,
            } => {
                let (item_id, item_qty) = self.resolve_item(item_id, *item_qty)?;
                RequestBuilder::new("item-add")
                    .field_str("external_id", inv_id.clone())
                    .field_str("item_id", item_id)
                    .field_int("item_qty", item_qty)
                    .build()
            }
            ItemCommands::Remove {
                inv_id,
                item_id,
                item_qty,
            } => {
                let (item_id, item_qty) = self.resolve_item(item_id, *item_qty)?;
                RequestBuilder::new("item-remove")
                    .field_str("external_id", inv_id.clone())
                    .field_str("item_id", item_id)
                    .field_int("item_qty", item_qty)
                    .build()
            }
            ItemCommands::Delete { inv_id, item_id } => {
                let item_id = self.resolve_item_id(item_id)?;
                RequestBuilder::new("item-delete")
                    .field_str("external_id", inv_id.clone())
                    .field_str("item_id", item_id)
                    .build()
            }
            ItemCommands::Transfer {
                item_id,
                item_qty,
                source_id,
                target_id,
            } => {
                let (item_id, item_qty) = self.resolve_item(item_id, *item_qty)?;
                RequestBuilder::new("item-transfer")
                    .field_str("source_id", source_id.clone())
                    .field_str("target_id", target_id.clone())
                    .field_str("item_id", item_id)
                    .field_int("item_qty", item_qty)
                    .build()
            }
        };
        Ok(request)
    }

    fn project_request(&self, command: &ProjectCommands) -> Result<Request, ClientError> {
        let request = match command {
            ProjectCommands::View { command } => match command {
                ViewCommands::All => RequestBuilder::new("project-view-all").build(),
                ViewCommands::One { project_id } => RequestBuilder::new("project-view-one")
                    .field_int("project_id", *project_id)
                    .build(),
            },
            ProjectCommands::Create {
                name,
                scope,
                desc,
                group_id,
            } => {
                let group_id = Self::resolve_group(*scope, *group_id)?;
                RequestBuilder::new("project-create")
                    .field_str("name", name.clone())
                    .field_str("scope", scope.as_wire())
                    .field_str("desc", desc.clone())
                    .field_int("group_id", group_id)
                    .build()
            }
            ProjectCommands::Delete { project_id } => RequestBuilder::new("project-delete")
                .field_int("project_id", *project_id)
                .build(),
            ProjectCommands::Transfer {
                project_id,
                new_owner_username,
            } => RequestBuilder::new("project-transfer")
                .field_int("project_id", *project_id)
                .field_str("new_owner_username", new_owner_username.clone())
                .build(),
            ProjectCommands::Scope {
                project_id,
                scope,
                group_id,
            } => {
                let group_id = Self::resolve_group(*scope, *group_id)?;
                RequestBuilder::new("project-scope")
                    .field_int("project_id", *project_id)
                    .field_int("group_id", group_id)
                    .field_str("scope", scope.as_wire())
                    .build()
            }
            ProjectCommands::Item { command } => self.project_item_request(command)?,
        };
        Ok(request)
    }

    fn project_item_request(&self, command: &ProjectItemCommands) -> Result<Request, ClientError> {
        let request = match command {
            ProjectItemCommands::Track {
                project_id,
                item_id,
                item_qty,
            } => {
                let (item_id, item_qty) = self.resolve_item(item_id, *item_qty)?;
                RequestBuilder::new("project-item-track")
                    .field_int("project_id", *project_id)
                    .field_str("item_id", item_id)
                    .field_int("item_qty", item_qty)
                    .build()
            }
            ProjectItemCommands::Delete {
                project_id,
                item_id,
            } => {
                let item_id = self.resolve_item_id(item_id)?;
                RequestBuilder::new("project-item-delete")
                    .field_int("project_id", *project_id)
                    .field_str("item_id", item_id)
                    .build()
            }
            ProjectItemCommands::Add {
                project_id,
                item_id,
                item_qty,
                external_id,
            } => {
                let (item_id, item_qty) = self.resolve_item(item_id, *item_qty)?;
                RequestBuilder::new("project-item-add")
                    .field_int("project_id", *project_id)
                    .field_str("item_id", item_id)
                    .field_int("item_qty", item_qty)
                    .field_str("external_id", external_id.clone())
                    .build()
            }
            ProjectItemCommands::Remove {
                project_id,
                item_id,
                item_qty,
                external_id,
            } => {
                let (item_id, item_qty) = self.resolve_item(item_id, *item_qty)?;
                RequestBuilder::new("project-item-remove")
                    .field_int("project_id", *project_id)
                    .field_str("item_id", item_id)
                    .field_int("item_qty", item_qty)
                    .field_str("external_id", external_id.clone())
                    .build()
            }
            ProjectItemCommands::Reserve {
                project_id,
                item_id,
                item_qty,
                external_id,
                source_project_id,
            } => {
                let (item_id, item_qty) = self.resolve_item(item_id, *item_qty)?;
                RequestBuilder::new("project-item-reserve")
                    .field_int("target_project_id", *project_id)
                    .field_str("item_id", item_id)
                    .field_int("item_qty", item_qty)
                    .field_str("external_id", external_id.clone())
                    .field_int("source_project_id", source_project_id.unwrap_or(NO_ID))
                    .build()
            }
            ProjectItemCommands::Release {
                project_id,
                item_id,
                item_qty,
                external_id,
            } => {
                let (item_id, item_qty) = self.resolve_item(item_id, *item_qty)?;
                RequestBuilder::new("project-item-release")
                    .field_int("project_id", *project_id)
                    .field_str("item_id", item_id)
                    .field_int("item_qty", item_qty)
                    .field_str("external_id", external_id.clone())
                    .build()
            }
        };
        Ok(request)
    }

    /// Resolve an item id and quantity, substituting the held item for the
    /// `hand` literal.
    fn resolve_item(&self, item_id: &str, item_qty: i64) -> Result<(String, i64), ClientError> {
        if item_id == HAND_LITERAL {
            let held = self.held_item()?;
            Ok((held.0, held.1))
        } else {
            Ok((item_id.to_string(), item_qty))
        }
    }

    /// Resolve an item id alone, for commands without a quantity.
    fn resolve_item_id(&self, item_id: &str) -> Result<String, ClientError> {
        if item_id == HAND_LITERAL {
            Ok(self.held_item()?.0)
        } else {
            Ok(item_id.to_string())
        }
    }

    fn held_item(&self) -> Result<(String, i64), ClientError> {
        let held = self.player.held_item().ok_or_else(|| {
            ClientError::InvalidArgument("nothing is held to substitute for \"hand\"".into())
        })?;
        Ok((held.item_id, held.count))
    }

    /// GROUP scope requires a real group id; other scopes send the
    /// "not group-scoped" sentinel.
    fn resolve_group(scope: ProjectScope, group_id: Option<i64>) -> Result<i64, ClientError> {
        match (scope, group_id) {
            (ProjectScope::Group, Some(id)) => Ok(id),
            (ProjectScope::Group, None) => Err(ClientError::InvalidArgument(
                "GROUP scope requires --group-id".into(),
            )),
            _ => Ok(NO_ID),
        }
    }
}
