use anyhow::Result;
use clap::{Parser, Subcommand};
use lvc::areas::repository::Repository;
use lvc::commands::porcelain::ResetMode;
use lvc::errors::EngineError;

#[derive(Parser)]
#[command(
    name = "lvc",
    version = "0.1.0",
    about = "A content-addressable version control engine",
    long_about = "A git-like version control engine with delta-compressed \
    content-addressable storage, line-level diffing, branches, stash, and \
    working-tree reconciliation."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(name = "init", about = "Initialize a new repository in the current directory")]
    Init,
    #[command(name = "add", about = "Stage files for the next version")]
    Add {
        #[arg(default_value = ".", help = "Files or directories to stage ('.' for everything)")]
        paths: Vec<String>,
    },
    #[command(name = "commit", about = "Record the staged files as a new version")]
    Commit {
        #[arg(short = 'v', long = "version", help = "Unique label for the new version")]
        version: String,
        #[arg(short, long, help = "Message describing the version")]
        message: String,
    },
    #[command(
        name = "diff",
        about = "Show changes between the working tree and a version, or between two versions"
    )]
    Diff {
        #[arg(help = "Older version label")]
        from: Option<String>,
        #[arg(help = "Newer version label (defaults to HEAD)")]
        to: Option<String>,
    },
    #[command(name = "log", about = "Show the version history from HEAD backwards")]
    Log {
        #[arg(default_value_t = 10, help = "Maximum number of versions to show")]
        count: usize,
    },
    #[command(name = "status", about = "Show staged, modified, and untracked paths")]
    Status,
    #[command(
        name = "rebuild",
        visible_alias = "restore",
        about = "Materialize a version's files onto the working tree"
    )]
    Rebuild {
        #[arg(help = "Version label to restore")]
        version: String,
    },
    #[command(name = "versions", visible_alias = "ls", about = "List all versions")]
    Versions,
    #[command(name = "show", about = "Show a version's metadata and file list")]
    Show {
        #[arg(help = "Version label to show")]
        version: String,
    },
    #[command(name = "branch", about = "List, create, or delete branches")]
    Branch {
        #[arg(help = "Name of the branch to create")]
        name: Option<String>,
        #[arg(short = 'd', long = "delete", value_name = "NAME", help = "Delete a branch")]
        delete: Option<String>,
    },
    #[command(
        name = "checkout",
        visible_alias = "co",
        about = "Switch to a branch or version"
    )]
    Checkout {
        #[arg(help = "Branch name or version label")]
        target: String,
        #[arg(short, long, help = "Proceed even if staged changes would be overwritten")]
        force: bool,
    },
    #[command(name = "blame", about = "Attribute each line of a file to the version that introduced it")]
    Blame {
        #[arg(help = "Tracked file to annotate")]
        file: String,
    },
    #[command(name = "stash", about = "Shelve and restore the staging area")]
    Stash {
        #[command(subcommand)]
        action: Option<StashAction>,
    },
    #[command(name = "reset", about = "Clear the staging area")]
    Reset {
        #[arg(long, help = "Clear the index only", conflicts_with_all = ["mixed", "hard"])]
        soft: bool,
        #[arg(long, help = "Clear the index, keep working-tree edits", conflicts_with = "hard")]
        mixed: bool,
        #[arg(long, help = "Clear the index and restore the working tree (discards edits)")]
        hard: bool,
    },
}

#[derive(Subcommand)]
enum StashAction {
    #[command(about = "Shelve the staged changes (default)")]
    Push {
        #[arg(short, long, help = "Message for the stash entry")]
        message: Option<String>,
    },
    #[command(about = "Restore the most recent stash entry")]
    Pop,
    #[command(about = "List stash entries, newest first")]
    List,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // corruption means on-disk data loss and deserves the loud prefix
        match err.downcast_ref::<EngineError>() {
            Some(EngineError::CorruptObject(_)) => eprintln!("fatal: {:#}", err),
            _ => eprintln!("error: {:#}", err),
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let pwd = std::env::current_dir()?;
    let mut repository = Repository::new(&pwd.to_string_lossy(), Box::new(std::io::stdout()))?;

    match &cli.command {
        Commands::Init => repository.init().await?,
        Commands::Add { paths } => repository.add(paths).await?,
        Commands::Commit { version, message } => repository.commit(version, message).await?,
        Commands::Diff { from, to } => repository.diff(from.as_deref(), to.as_deref())?,
        Commands::Log { count } => repository.log(*count)?,
        Commands::Status => repository.status().await?,
        Commands::Rebuild { version } => repository.rebuild(version).await?,
        Commands::Versions => repository.versions()?,
        Commands::Show { version } => repository.show(version)?,
        Commands::Branch { name, delete } => {
            repository.branch(name.as_deref(), delete.as_deref())?
        }
        Commands::Checkout { target, force } => repository.checkout(target, *force).await?,
        Commands::Blame { file } => repository.blame(file)?,
        Commands::Stash { action } => match action {
            None | Some(StashAction::Push { message: None }) => {
                repository.stash_push(None).await?
            }
            Some(StashAction::Push { message }) => {
                repository.stash_push(message.as_deref()).await?
            }
            Some(StashAction::Pop) => repository.stash_pop().await?,
            Some(StashAction::List) => repository.stash_list()?,
        },
        Commands::Reset { soft, hard, .. } => {
            let mode = if *hard {
                ResetMode::Hard
            } else if *soft {
                ResetMode::Soft
            } else {
                ResetMode::Mixed
            };
            repository.reset(mode).await?
        }
    }

    Ok(())
}
