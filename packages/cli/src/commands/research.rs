use crate::config::Config;
use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use journal_editor::{Catalog, ResearchRecord, ResearchSummary, DEFAULT_PAGE_SIZE};
use std::path::Path;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Research key
    pub id: String,

    /// Print the stored record as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only titles containing this text (case-insensitive)
    #[arg(short, long)]
    pub search: Option<String>,

    /// Maximum number of articles shown
    #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Research key
    pub id: String,

    /// Confirm the deletion
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Debug, Subcommand)]
pub enum ResearchCommand {
    /// Print one research article
    Show(ShowArgs),

    /// List or search research articles
    List(ListArgs),

    /// Delete a research article
    Delete(DeleteArgs),
}

pub async fn research(command: ResearchCommand, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let catalog = Catalog::new(config.services()?.store);

    match command {
        ResearchCommand::Show(args) => show(&catalog, args).await,
        ResearchCommand::List(args) => list(&catalog, args).await,
        ResearchCommand::Delete(args) => delete(&catalog, args).await,
    }
}

async fn show(catalog: &Catalog, args: ShowArgs) -> Result<()> {
    let record = catalog.fetch(&args.id).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print!("{}", render_record(&args.id, &record));
    }
    Ok(())
}

/// Matching summaries, capped at `--limit`; no search term matches everything
async fn matching(catalog: &Catalog, args: &ListArgs) -> Result<Vec<ResearchSummary>> {
    let term = args.search.as_deref().unwrap_or("");
    Ok(catalog.search(term, args.limit).await?)
}

async fn list(catalog: &Catalog, args: ListArgs) -> Result<()> {
    let summaries = matching(catalog, &args).await?;

    if summaries.is_empty() {
        println!("{}", "⚠️  No research found".yellow());
        return Ok(());
    }

    for summary in &summaries {
        println!("{}", render_summary(summary));
    }
    println!();
    println!("{} article(s)", summaries.len());
    Ok(())
}

async fn delete(catalog: &Catalog, args: DeleteArgs) -> Result<()> {
    if !args.yes {
        println!(
            "{} This permanently removes research/{}",
            "⚠️".yellow(),
            args.id.bright_white()
        );
        println!("Use --yes to confirm");
        return Ok(());
    }

    catalog.delete(&args.id).await?;
    println!("  {} Deleted research/{}", "✓".green(), args.id);
    Ok(())
}

fn render_summary(summary: &ResearchSummary) -> String {
    let category = summary
        .category
        .map(|c| c.label().to_string())
        .unwrap_or_else(|| "Uncategorized".to_string());

    let mut line = format!(
        "{}  {} [{}] {} topic(s)",
        summary.id.dimmed(),
        summary.title.bright_white().bold(),
        category,
        summary.topic_count
    );
    if !summary.abstract_preview.is_empty() {
        line.push_str(&format!("\n    {}", summary.abstract_preview));
    }
    line
}

fn render_record(id: &str, record: &ResearchRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} ({})\n", record.title.bright_white().bold(), id));

    if !record.category.is_empty() {
        out.push_str(&format!("Category: {}\n", record.category));
    }
    if let Some(url) = &record.main_image {
        out.push_str(&format!("Image:    {}\n", url));
    }
    if let Some(url) = &record.pdf {
        out.push_str(&format!("PDF:      {}\n", url));
    }
    if !record.abstract_text.is_empty() {
        out.push_str(&format!("\n{}\n", record.abstract_text));
    }

    for (t, topic) in record.topics.iter().enumerate() {
        out.push_str(&format!("\n{}. {}\n", t + 1, topic.title.bold()));
        if !topic.description.is_empty() {
            out.push_str(&format!("   {}\n", topic.description));
        }
        for (s, subtopic) in topic.subtopics.iter().enumerate() {
            out.push_str(&format!("   {}.{} {}\n", t + 1, s + 1, subtopic.title));
            if !subtopic.description.is_empty() {
                out.push_str(&format!("       {}\n", subtopic.description));
            }
        }
    }
    out
}
