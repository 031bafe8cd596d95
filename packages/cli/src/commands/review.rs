use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use colored::{ColoredString, Colorize};
use journal_editor::{ReviewDesk, Submission, SubmissionStatus};
use std::path::Path;

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Submission key
    pub id: String,

    /// New status (pending, approved, rejected, revision-requested)
    pub status: String,

    /// Review comments shown to the author
    #[arg(short, long)]
    pub comments: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum ReviewCommand {
    /// List submissions, newest first
    List,

    /// Change a submission's status
    Set(SetArgs),
}

pub async fn review(command: ReviewCommand, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let desk = ReviewDesk::new(config.services()?.store);

    match command {
        ReviewCommand::List => {
            let submissions = desk.list().await?;
            if submissions.is_empty() {
                println!("{}", "⚠️  No submissions".yellow());
                return Ok(());
            }

            for submission in &submissions {
                println!("{}", render_submission(submission));
            }
            Ok(())
        }
        ReviewCommand::Set(args) => {
            let status: SubmissionStatus = args.status.parse().map_err(|e| anyhow!("{}", e))?;
            let updated = desk.update(&args.id, status, args.comments).await?;

            println!(
                "  {} submissions/{} is now {}",
                "✓".green(),
                updated.id,
                colored_status(updated.status)
            );
            Ok(())
        }
    }
}

fn colored_status(status: SubmissionStatus) -> ColoredString {
    match status {
        SubmissionStatus::Pending => status.as_str().yellow(),
        SubmissionStatus::Approved => status.as_str().green(),
        SubmissionStatus::Rejected => status.as_str().red(),
        SubmissionStatus::RevisionRequested => status.as_str().cyan(),
    }
}

fn render_submission(submission: &Submission) -> String {
    let received = submission
        .received_at()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());

    let mut line = format!(
        "{}  {}  {} [{}]",
        received,
        submission.id.dimmed(),
        submission.title.bright_white(),
        colored_status(submission.status)
    );
    if let Some(email) = &submission.email {
        line.push_str(&format!(" <{}>", email));
    }
    if !submission.review_comments.is_empty() {
        line.push_str(&format!("\n    {}", submission.review_comments));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_undated_submission() {
        colored::control::set_override(false);

        let submission = Submission {
            id: "s1".to_string(),
            title: "Coral bleaching".to_string(),
            email: Some("author@uni.edu".to_string()),
            status: SubmissionStatus::RevisionRequested,
            review_comments: "Add error bars".to_string(),
            ..Submission::default()
        };

        assert_eq!(
            render_submission(&submission),
            "-  s1  Coral bleaching [revision requested] <author@uni.edu>\n    Add error bars"
        );
    }
}
