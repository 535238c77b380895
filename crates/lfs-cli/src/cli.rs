use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "lfs-meta",
    about = "Lock and metadata server for large-file versioning",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file (overrides the configuration file)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Manage users
    #[command(subcommand)]
    User(UserAction),
    /// Inspect object metadata
    #[command(subcommand)]
    Object(ObjectAction),
    /// Inspect and remove locks
    #[command(subcommand)]
    Lock(LockAction),
}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Disable authentication on object metadata routes
    #[arg(long)]
    pub public: bool,
    #[arg(long, requires = "admin_pass")]
    pub admin_user: Option<String>,
    #[arg(long, requires = "admin_user")]
    pub admin_pass: Option<String>,
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Add a user or replace its secret
    Add { name: String, secret: String },
    /// Remove a user
    Remove { name: String },
    /// List user names
    List,
}

#[derive(Subcommand)]
pub enum ObjectAction {
    /// List every object record
    List,
}

#[derive(Subcommand)]
pub enum LockAction {
    /// List locks in id order
    List {
        /// Glob on the lock path
        #[arg(long, default_value = "")]
        path: String,
        /// Hex cursor to resume from
        #[arg(long)]
        cursor: Option<String>,
        #[arg(short = 'n', long, default_value = "100")]
        limit: usize,
    },
    /// Force-remove a lock by hex id
    Remove { id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_user_add() {
        let cli = Cli::try_parse_from(["lfs-meta", "--db", "x.db", "user", "add", "alice", "pw"])
            .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("x.db")));
        assert!(matches!(
            cli.command,
            Command::User(UserAction::Add { ref name, .. }) if name == "alice"
        ));
    }

    #[test]
    fn admin_flags_come_in_pairs() {
        assert!(Cli::try_parse_from(["lfs-meta", "serve", "--admin-user", "root"]).is_err());
        assert!(Cli::try_parse_from([
            "lfs-meta",
            "serve",
            "--admin-user",
            "root",
            "--admin-pass",
            "pw"
        ])
        .is_ok());
    }

    #[test]
    fn lock_list_defaults() {
        let cli = Cli::try_parse_from(["lfs-meta", "lock", "list"]).unwrap();
        match cli.command {
            Command::Lock(LockAction::List { path, cursor, limit }) => {
                assert!(path.is_empty());
                assert!(cursor.is_none());
                assert_eq!(limit, 100);
            }
            _ => panic!("expected lock list"),
        }
    }
}
