//! Akredo CLI - Main entry point

use akredo_core::{EntityKind, ReviewAction, ReviewStatus};
use akredo_rpc::{commands, AppContext};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "akredo")]
#[command(about = "Akredo - Evidence validation & revision lifecycle", long_about = None)]
struct Cli {
    /// Data directory path
    #[arg(short, long, default_value = "./data")]
    data: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a file as new evidence
    Submit {
        /// Path to the content file
        path: PathBuf,
        /// Entity kind (document | evidence_file)
        #[arg(long, default_value = "evidence_file")]
        kind: EntityKind,
        /// Owning actor ID
        #[arg(long)]
        owner: String,
        /// Criteria IDs to tag (repeatable)
        #[arg(long = "criteria")]
        criteria: Vec<String>,
        /// Review cycle ID
        #[arg(long)]
        cycle: String,
        /// Optional change note
        #[arg(long)]
        note: Option<String>,
        /// Save as draft instead of submitting for review
        #[arg(long)]
        draft: bool,
    },

    /// Upload a new version of an existing entity
    Revise {
        /// Entity ID
        id: String,
        /// Path to the new content file
        path: PathBuf,
        /// What changed (required for every version after the first)
        #[arg(long)]
        note: String,
        /// Acting user ID
        #[arg(long)]
        actor: String,
        /// Fail unless the stored current version matches
        #[arg(long)]
        expected_version: Option<u32>,
    },

    /// Apply a review action
    Review {
        /// Entity ID
        id: String,
        /// Action (submit | open | approve | reject | request_changes | revise)
        action: ReviewAction,
        /// Review note (mandatory for reject)
        #[arg(long)]
        note: Option<String>,
        /// Acting user ID
        #[arg(long)]
        actor: String,
    },

    /// Add criteria tags to a draft entity
    Tag {
        /// Entity ID
        id: String,
        /// Criteria IDs (repeatable)
        #[arg(long = "criteria")]
        criteria: Vec<String>,
        /// Review cycle ID
        #[arg(long)]
        cycle: String,
        /// Acting user ID
        #[arg(long)]
        actor: String,
    },

    /// Remove criteria tags from a draft entity
    Untag {
        /// Entity ID
        id: String,
        /// Criteria IDs (repeatable)
        #[arg(long = "criteria")]
        criteria: Vec<String>,
        /// Review cycle ID
        #[arg(long)]
        cycle: String,
        /// Acting user ID
        #[arg(long)]
        actor: String,
    },

    /// Show an entity with versions, transitions and tags
    Show {
        /// Entity ID
        id: String,
    },

    /// List entities by review status
    List {
        /// Status (draft | submitted | in_review | approved | rejected)
        status: String,
    },

    /// Find entities by criterion and cycle
    Find {
        /// Review cycle ID
        #[arg(long)]
        cycle: String,
        /// Criterion ID
        #[arg(long)]
        criteria: String,
        /// Filter by review status
        #[arg(long)]
        status: Option<String>,
    },

    /// List notifications for a recipient
    Inbox {
        /// Recipient selector (user:<id> or role:<name>)
        recipient: String,
        /// Only unread notifications
        #[arg(long)]
        unread: bool,
    },

    /// Mark a notification as read
    Read {
        /// Notification ID
        id: String,
        /// Acting user ID
        #[arg(long)]
        actor: String,
    },

    /// Delete a notification
    Delete {
        /// Notification ID
        id: String,
        /// Acting user ID
        #[arg(long)]
        actor: String,
    },

    /// Show the audit trail
    Audit {
        /// Filter by target ID
        #[arg(long)]
        target: Option<String>,
        /// Filter by actor ID
        #[arg(long)]
        actor: Option<String>,
        /// Only entries at or after this RFC 3339 timestamp
        #[arg(long)]
        from: Option<String>,
        /// Only entries at or before this RFC 3339 timestamp
        #[arg(long)]
        to: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    // Create application context
    let mut ctx = AppContext::new(&cli.data)?;

    match cli.command {
        Commands::Submit {
            path,
            kind,
            owner,
            criteria,
            cycle,
            note,
            draft,
        } => {
            commands::submit(
                &mut ctx,
                &path,
                kind,
                &owner,
                &criteria,
                &cycle,
                note.as_deref(),
                draft,
            )?;
        }

        Commands::Revise {
            id,
            path,
            note,
            actor,
            expected_version,
        } => {
            commands::revise(&mut ctx, &id, &path, &note, &actor, expected_version)?;
        }

        Commands::Review {
            id,
            action,
            note,
            actor,
        } => {
            commands::review(&mut ctx, &id, action, note.as_deref(), &actor)?;
        }

        Commands::Tag {
            id,
            criteria,
            cycle,
            actor,
        } => {
            commands::tag(&mut ctx, &id, &criteria, &cycle, &actor)?;
        }

        Commands::Untag {
            id,
            criteria,
            cycle,
            actor,
        } => {
            commands::untag(&mut ctx, &id, &criteria, &cycle, &actor)?;
        }

        Commands::Show { id } => {
            commands::show(&ctx, &id)?;
        }

        Commands::List { status } => {
            commands::list(&ctx, ReviewStatus::parse(&status)?)?;
        }

        Commands::Find {
            cycle,
            criteria,
            status,
        } => {
            let status = status.as_deref().map(ReviewStatus::parse).transpose()?;
            commands::find(&ctx, &cycle, &criteria, status)?;
        }

        Commands::Inbox { recipient, unread } => {
            commands::inbox(&ctx, &recipient, unread)?;
        }

        Commands::Read { id, actor } => {
            commands::read_notification(&mut ctx, &id, &actor)?;
        }

        Commands::Delete { id, actor } => {
            commands::delete_notification(&mut ctx, &id, &actor)?;
        }

        Commands::Audit {
            target,
            actor,
            from,
            to,
        } => {
            commands::audit(
                &ctx,
                target.as_deref(),
                actor.as_deref(),
                from.as_deref(),
                to.as_deref(),
            )?;
        }
    }

    Ok(())
}
