use anyhow::Context;
use colored::Colorize;
use lfs_server::{LfsServer, ServerConfig};
use lfs_store::{AdminCredential, MetaStore};
use lfs_types::LockId;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    match cli.command {
        Command::Serve(args) => cmd_serve(config, args),
        Command::User(action) => cmd_user(&open_store(&config)?, action),
        Command::Object(ObjectAction::List) => cmd_object_list(&open_store(&config)?),
        Command::Lock(action) => cmd_lock(&open_store(&config)?, action),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<ServerConfig> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    Ok(config)
}

fn open_store(config: &ServerConfig) -> anyhow::Result<MetaStore> {
    tracing::debug!(db = %config.db_path.display(), "opening store");
    MetaStore::open(&config.db_path, config.auth.clone())
        .with_context(|| format!("opening database {}", config.db_path.display()))
}

fn cmd_serve(mut config: ServerConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if args.public {
        config.auth.public = true;
    }
    if let (Some(user), Some(pass)) = (args.admin_user, args.admin_pass) {
        config.auth.admin = Some(AdminCredential { user, pass });
    }

    let server = LfsServer::new(config)?;
    println!(
        "{} lfs-meta on {} (db: {})",
        "✓".green().bold(),
        server.config().bind_addr.to_string().bold(),
        server.config().db_path.display()
    );
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_user(store: &MetaStore, action: UserAction) -> anyhow::Result<()> {
    match action {
        UserAction::Add { name, secret } => {
            store.add_user(&name, &secret)?;
            println!("{} Added user {}", "✓".green(), name.bold());
        }
        UserAction::Remove { name } => {
            store.delete_user(&name)?;
            println!("Removed user {}", name.bold());
        }
        UserAction::List => {
            let users = store.users()?;
            if users.is_empty() {
                println!("No users.");
            }
            for user in users {
                println!("  {}", user.name);
            }
        }
    }
    Ok(())
}

fn cmd_object_list(store: &MetaStore) -> anyhow::Result<()> {
    let objects = store.objects()?;
    if objects.is_empty() {
        println!("No objects.");
    }
    for object in objects {
        println!("  {}  {}", object.oid.yellow(), object.size);
    }
    Ok(())
}

fn cmd_lock(store: &MetaStore, action: LockAction) -> anyhow::Result<()> {
    match action {
        LockAction::List {
            path,
            cursor,
            limit,
        } => {
            let cursor = match cursor {
                Some(raw) => raw.parse::<LockId>()?,
                None => LockId::ZERO,
            };
            let page = store.lock_list(&path, cursor, limit)?;
            for lock in &page.locks {
                println!(
                    "{}  {}  {}  {}",
                    lock.id.to_string().yellow(),
                    lock.path.bold(),
                    lock.owner.cyan(),
                    lock.locked_at.to_rfc3339().dimmed()
                );
            }
            println!(
                "{} of {} locks",
                page.locks.len(),
                store.lock_count()?
            );
            if page.has_more {
                println!("next cursor: {}", page.next_cursor.to_string().yellow());
            }
        }
        LockAction::Remove { id } => {
            let id: LockId = id.parse()?;
            let lock = store.lock_delete(id, "", true)?;
            println!(
                "{} Removed lock {} on {} (owner {})",
                "✓".green(),
                lock.id.to_string().yellow(),
                lock.path.bold(),
                lock.owner
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn run(dir: &TempDir, args: &[&str]) -> anyhow::Result<()> {
        let db = dir.path().join("cli.db");
        let mut argv = vec!["lfs-meta", "--db", db.to_str().unwrap()];
        argv.extend_from_slice(args);
        run_command(Cli::try_parse_from(argv)?)
    }

    fn store(dir: &TempDir) -> MetaStore {
        MetaStore::open(&dir.path().join("cli.db"), Default::default()).unwrap()
    }

    #[test]
    fn user_lifecycle() {
        let dir = TempDir::new().unwrap();
        run(&dir, &["user", "add", "alice", "pw"]).unwrap();
        run(&dir, &["user", "list"]).unwrap();
        assert!(store(&dir).validate_user("alice", "pw"));

        run(&dir, &["user", "remove", "alice"]).unwrap();
        assert!(store(&dir).users().unwrap().is_empty());
    }

    #[test]
    fn lock_remove_forces() {
        let dir = TempDir::new().unwrap();
        let id = store(&dir).lock_add("/big.bin", "alice").unwrap().id;
        run(&dir, &["lock", "list"]).unwrap();
        let hex = id.to_string();
        run(&dir, &["lock", "remove", hex.as_str()]).unwrap();
        assert_eq!(store(&dir).lock_count().unwrap(), 0);
    }

    #[test]
    fn bad_lock_id_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(run(&dir, &["lock", "remove", "not-hex"]).is_err());
    }
}
