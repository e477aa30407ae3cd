//! Command-line argument parsing with clap.
//!
//! [`Cli`] carries the binary's startup flags; [`CommandLine`] is the
//! per-invocation command tree the REPL parses on every line. Each leaf
//! command maps to exactly one wire request (see [`crate::router`]).

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// SGU client - remote inventory and project tracking.
#[derive(Parser, Debug, Clone)]
#[command(name = "sgu")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the endpoint configuration file.
    #[arg(short, long, env = "SGU_CONFIG", default_value = "sgu.json")]
    pub config: PathBuf,

    /// Username presented to the service when no access key is stored.
    #[arg(short, long, env = "SGU_USERNAME", default_value = "player")]
    pub username: String,

    /// Connect timeout in seconds (0 waits indefinitely).
    #[arg(long, default_value_t = 10)]
    pub connect_timeout_secs: u64,
}

/// One line of user input: a single service command.
#[derive(Parser, Debug, Clone)]
#[command(name = "sgu", no_binary_name = true)]
#[command(about = "SGU service commands", long_about = None)]
pub struct CommandLine {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Open the connection to the configured service address.
    Connect,

    /// Gracefully close the connection.
    Disconnect,

    /// Group membership and ownership.
    Group {
        /// Group subcommand to execute.
        #[command(subcommand)]
        command: GroupCommands,
    },

    /// Register or unregister tracked inventories.
    Inventory {
        /// Inventory subcommand to execute.
        #[command(subcommand)]
        command: InventoryCommands,
    },

    /// Items within tracked inventories.
    Items {
        /// Items subcommand to execute.
        #[command(subcommand)]
        command: ItemCommands,
    },

    /// Project tracking.
    Projects {
        /// Projects subcommand to execute.
        #[command(subcommand)]
        command: ProjectCommands,
    },
}

/// Group subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum GroupCommands {
    /// Create a new group.
    Create {
        /// Name for the new group.
        group_name: String,
    },

    /// List the groups you belong to.
    List,

    /// Show a group's members and ownership.
    Info {
        /// Group to inspect.
        group_id: i64,
    },

    /// Delete a group you own.
    Delete {
        /// Group to delete.
        group_id: i64,
    },

    /// Transfer group ownership to another member.
    Transfer {
        /// Group to transfer.
        group_id: i64,
        /// Member receiving ownership.
        new_owner_username: String,
    },

    /// Add a member to a group.
    Add {
        /// Group to add to.
        group_id: i64,
        /// Player to add.
        new_member_username: String,
    },

    /// Remove a member from a group.
    Remove {
        /// Group to remove from.
        group_id: i64,
        /// Member to remove.
        member_username: String,
    },

    /// Leave a group you belong to.
    Leave {
        /// Group to leave.
        group_id: i64,
    },
}

/// Inventory subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum InventoryCommands {
    /// Start tracking an inventory.
    Add {
        /// External identifier of the inventory.
        inv_id: String,
    },

    /// Stop tracking an inventory.
    Remove {
        /// External identifier of the inventory.
        inv_id: String,
    },
}

/// Item subcommands.
///
/// Item arguments accept the literal `hand` to mean the currently held item.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ItemCommands {
    /// Show the contents of a tracked inventory.
    Get {
        /// Inventory to show.
        inv_id: String,
    },

    /// Record items added to an inventory.
    Add {
        /// Inventory that changed.
        inv_id: String,
        /// Item identifier, or `hand`.
        item_id: String,
        /// Quantity added.
        item_qty: i64,
    },

    /// Record items removed from an inventory.
    Remove {
        /// Inventory that changed.
        inv_id: String,
        /// Item identifier, or `hand`.
        item_id: String,
        /// Quantity removed.
        item_qty: i64,
    },

    /// Delete an item entry from an inventory.
    Delete {
        /// Inventory to edit.
        inv_id: String,
        /// Item identifier, or `hand`.
        item_id: String,
    },

    /// Move items between tracked inventories.
    Transfer {
        /// Item identifier, or `hand`.
        item_id: String,
        /// Quantity to move.
        item_qty: i64,
        /// Inventory to move from.
        source_id: String,
        /// Inventory to move to.
        target_id: String,
    },
}

/// Project subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ProjectCommands {
    /// View projects.
    View {
        /// View subcommand to execute.
        #[command(subcommand)]
        command: ViewCommands,
    },

    /// Create a project.
    Create {
        /// Project name.
        name: String,
        /// Visibility scope.
        scope: ProjectScope,
        /// Description.
        #[arg(default_value = "")]
        desc: String,
        /// Owning group, required for GROUP scope.
        #[arg(long)]
        group_id: Option<i64>,
    },

    /// Delete a project you own.
    Delete {
        /// Project to delete.
        project_id: i64,
    },

    /// Transfer project ownership.
    Transfer {
        /// Project to transfer.
        project_id: i64,
        /// Player receiving ownership.
        new_owner_username: String,
    },

    /// Change a project's visibility scope.
    Scope {
        /// Project to change.
        project_id: i64,
        /// New scope.
        scope: ProjectScope,
        /// Owning group, required for GROUP scope.
        #[arg(long)]
        group_id: Option<i64>,
    },

    /// Tracked items within a project.
    Item {
        /// Project item subcommand to execute.
        #[command(subcommand)]
        command: ProjectItemCommands,
    },
}

/// Project view subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ViewCommands {
    /// View all projects visible to you.
    All,

    /// View one project.
    One {
        /// Project to view.
        project_id: i64,
    },
}

/// Project item subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ProjectItemCommands {
    /// Track an item requirement on a project.
    Track {
        /// Project to track on.
        project_id: i64,
        /// Item identifier, or `hand`.
        item_id: String,
        /// Required quantity.
        item_qty: i64,
    },

    /// Stop tracking an item on a project.
    Delete {
        /// Project to edit.
        project_id: i64,
        /// Item identifier, or `hand`.
        item_id: String,
    },

    /// Contribute items to a project from an inventory.
    Add {
        /// Project to contribute to.
        project_id: i64,
        /// Item identifier, or `hand`.
        item_id: String,
        /// Quantity contributed.
        item_qty: i64,
        /// Inventory the items came from.
        external_id: String,
    },

    /// Withdraw contributed items from a project.
    Remove {
        /// Project to withdraw from.
        project_id: i64,
        /// Item identifier, or `hand`.
        item_id: String,
        /// Quantity withdrawn.
        item_qty: i64,
        /// Inventory the items return to.
        external_id: String,
    },

    /// Reserve items held in an inventory for a project.
    Reserve {
        /// Project the reservation is for.
        project_id: i64,
        /// Item identifier, or `hand`.
        item_id: String,
        /// Quantity to reserve.
        item_qty: i64,
        /// Inventory holding the items.
        external_id: String,
        /// Project currently holding the items, if any.
        source_project_id: Option<i64>,
    },

    /// Release a reservation back to its inventory.
    Release {
        /// Project holding the reservation.
        project_id: i64,
        /// Item identifier, or `hand`.
        item_id: String,
        /// Quantity to release.
        item_qty: i64,
        /// Inventory the items return to.
        external_id: String,
    },
}

/// Project visibility scope, rendered on the wire as its uppercase name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "UPPER")]
pub enum ProjectScope {
    /// Visible to everyone.
    Public,
    /// Visible to the owner only.
    Private,
    /// Visible to one group.
    Group,
}

impl ProjectScope {
    /// The wire literal for this scope.
    #[must_use]
    pub const fn as_wire(self) -> &'static str {
        match self {
            Self::Public => "PUBLIC",
            Self::Private => "PRIVATE",
            Self::Group => "GROUP",
        }
    }
}

/// Split a REPL line into command tokens, honoring double quotes.
#[must_use]
pub fn split_command_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;
    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        CommandLine::try_parse_from(split_command_line(line))
            .unwrap()
            .command
    }

    #[test]
    fn parses_connect_and_disconnect() {
        assert_eq!(parse("connect"), Command::Connect);
        assert_eq!(parse("disconnect"), Command::Disconnect);
    }

    #[test]
    fn parses_group_transfer() {
        let command = parse("group transfer 3 alice");
        assert_eq!(
            command,
            Command::Group {
                command: GroupCommands::Transfer {
                    group_id: 3,
                    new_owner_username: "alice".into(),
                }
            }
        );
    }

    #[test]
    fn parses_items_add() {
        let command = parse("items add chest1 stick 5");
        assert_eq!(
            command,
            Command::Items {
                command: ItemCommands::Add {
                    inv_id: "chest1".into(),
                    item_id: "stick".into(),
                    item_qty: 5,
                }
            }
        );
    }

    #[test]
    fn parses_project_create_with_quoted_desc() {
        let command = parse(r#"projects create castle PUBLIC "the big one""#);
        assert_eq!(
            command,
            Command::Projects {
                command: ProjectCommands::Create {
                    name: "castle".into(),
                    scope: ProjectScope::Public,
                    desc: "the big one".into(),
                    group_id: None,
                }
            }
        );
    }

    #[test]
    fn parses_group_scope_with_group_id() {
        let command = parse("projects scope 7 GROUP --group-id 2");
        assert_eq!(
            command,
            Command::Projects {
                command: ProjectCommands::Scope {
                    project_id: 7,
                    scope: ProjectScope::Group,
                    group_id: Some(2),
                }
            }
        );
    }

    #[test]
    fn parses_reserve_with_and_without_source() {
        let with = parse("projects item reserve 4 stick 8 chest1 2");
        assert_eq!(
            with,
            Command::Projects {
                command: ProjectCommands::Item {
                    command: ProjectItemCommands::Reserve {
                        project_id: 4,
                        item_id: "stick".into(),
                        item_qty: 8,
                        external_id: "chest1".into(),
                        source_project_id: Some(2),
                    }
                }
            }
        );

        let without = parse("projects item reserve 4 stick 8 chest1");
        assert_eq!(
            without,
            Command::Projects {
                command: ProjectCommands::Item {
                    command: ProjectItemCommands::Reserve {
                        project_id: 4,
                        item_id: "stick".into(),
                        item_qty: 8,
                        external_id: "chest1".into(),
                        source_project_id: None,
                    }
                }
            }
        );
    }

    #[test]
    fn rejects_lowercase_scope() {
        let tokens = split_command_line("projects create castle public");
        assert!(CommandLine::try_parse_from(tokens).is_err());
    }

    #[test]
    fn rejects_unknown_command() {
        let tokens = split_command_line("frobnicate 3");
        assert!(CommandLine::try_parse_from(tokens).is_err());
    }

    #[test]
    fn split_honors_quotes() {
        assert_eq!(
            split_command_line(r#"projects create "my castle" PUBLIC"#),
            vec!["projects", "create", "my castle", "PUBLIC"]
        );
    }

    #[test]
    fn split_empty_quotes_make_empty_token() {
        assert_eq!(split_command_line(r#"a "" b"#), vec!["a", "", "b"]);
    }

    #[test]
    fn split_collapses_whitespace() {
        assert_eq!(split_command_line("  group   list  "), vec!["group", "list"]);
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["sgu"]);
        assert_eq!(cli.config, PathBuf::from("sgu.json"));
        assert_eq!(cli.username, "player");
        assert_eq!(cli.connect_timeout_secs, 10);
    }
}
