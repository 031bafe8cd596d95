use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use journal_editor::{
    AttachmentTarget, Category, Document, EditSession, Mutation, PendingFile, ResearchRecord,
    ReviewDesk,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// Research manifest (JSON in the stored record layout)
    pub manifest: PathBuf,

    /// Overwrite an existing research entry instead of creating one
    #[arg(long)]
    pub id: Option<String>,

    /// Also file the article in the review queue
    #[arg(long)]
    pub track: bool,

    /// Show what would be uploaded without contacting any service
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn submit(args: SubmitArgs, cwd: &Path) -> Result<()> {
    let manifest = cwd.join(&args.manifest);
    let document = load_manifest(&manifest)?;

    let pdfs = usize::from(document.pdf.is_pending());
    let images = document.pending_uploads() - pdfs;

    println!("{}", "📤 Submitting research...".bright_blue().bold());
    println!("  Title:   {}", document.title.bright_white());
    println!("  Topics:  {}", document.topics.len());
    println!("  Uploads: {} image(s), {} PDF", images, pdfs);

    if args.dry_run {
        println!();
        println!("{}", "Dry run, nothing uploaded or written".yellow());
        return Ok(());
    }

    let config = Config::load(cwd)?;
    config.check_uploads(images, pdfs)?;
    let services = config.services()?;

    let mut session = EditSession::with_document(services.clone(), document, args.id);
    let outcome = session.submit().await?;

    info!(id = %outcome.id, created = outcome.created, uploads = outcome.uploads, "Manifest submitted");

    let verb = if outcome.created { "Created" } else { "Updated" };
    println!(
        "  {} {} research/{} ({} upload(s))",
        "✓".green(),
        verb,
        outcome.id,
        outcome.uploads
    );

    if args.track {
        let email = config.user.as_ref().and_then(|u| u.email.clone());
        let filed = ReviewDesk::new(services.store.clone())
            .enqueue(&outcome.record.title, email, outcome.record.pdf.clone())
            .await?;
        println!("  {} Filed for review as submissions/{}", "✓".green(), filed.id);
    }

    println!();
    println!("{}", "✅ Submitted!".green().bold());
    Ok(())
}

/// Read a manifest into an authoring tree
///
/// Attachment fields holding an `http(s)` URL stay resolved. Anything else is
/// a file path relative to the manifest and becomes a pending upload.
pub fn load_manifest(path: &Path) -> Result<Document> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Cannot read manifest {}", path.display()))?;
    let record: ResearchRecord = serde_json::from_str(&content)
        .with_context(|| format!("Invalid manifest {}", path.display()))?;

    if !record.category.trim().is_empty() {
        record.category.parse::<Category>()?;
    }

    let local = local_attachments(&record);
    let mut document = record.into_document();
    let base = path.parent().unwrap_or_else(|| Path::new("."));

    for (target, file) in local {
        let file = read_pending(&base.join(&file))?;
        debug!(?target, name = %file.name, bytes = file.len(), "Attachment read from disk");
        document.apply(Mutation::SetAttachment { target, file })?;
    }

    Ok(document)
}

fn is_remote(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn local_attachments(record: &ResearchRecord) -> Vec<(AttachmentTarget, String)> {
    let mut local = Vec::new();
    let mut push = |target: AttachmentTarget, value: &Option<String>| {
        if let Some(value) = value.as_deref().map(str::trim) {
            if !value.is_empty() && !is_remote(value) {
                local.push((target, value.to_string()));
            }
        }
    };

    push(AttachmentTarget::Main, &record.main_image);
    push(AttachmentTarget::Pdf, &record.pdf);

    for (t, topic) in record.topics.iter().enumerate() {
        push(AttachmentTarget::Topic { topic: t }, &topic.image);
        for (s, subtopic) in topic.subtopics.iter().enumerate() {
            push(AttachmentTarget::Subtopic { topic: t, subtopic: s }, &subtopic.image);
        }
    }

    local
}

fn read_pending(path: &Path) -> Result<PendingFile> {
    let bytes = fs::read(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    Ok(PendingFile::new(name, content_type(path), bytes))
}

fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journal_editor::Attachment;

    fn write_manifest(dir: &Path, json: &str) -> PathBuf {
        let path = dir.join("research.json");
        fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_manifest_local_files_become_pending() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cover.png"), [1u8, 2, 3]).unwrap();
        fs::write(dir.path().join("paper.pdf"), b"%PDF").unwrap();
        fs::create_dir(dir.path().join("figs")).unwrap();
        fs::write(dir.path().join("figs/north.jpg"), [9u8; 10]).unwrap();

        let path = write_manifest(
            dir.path(),
            r#"{
                "title": "Coastal erosion",
                "category": "earth sciences",
                "mainImage": "cover.png",
                "pdf": "paper.pdf",
                "topics": [{
                    "title": "Sites",
                    "image": "https://img.test/sites.png",
                    "subtopics": [{ "subtopicTitle": "North", "subtopicImage": "figs/north.jpg" }]
                }]
            }"#,
        );

        let doc = load_manifest(&path).unwrap();

        assert_eq!(doc.category, Some(Category::EarthSciences));
        assert_eq!(doc.pending_uploads(), 3);
        assert_eq!(doc.main_image.pending().unwrap().content_type, "image/png");
        assert_eq!(doc.pdf.pending().unwrap().name, "paper.pdf");
        assert_eq!(
            doc.topics[0].image,
            Attachment::Resolved("https://img.test/sites.png".to_string())
        );

        let north = doc.topics[0].subtopics[0].image.pending().unwrap();
        assert_eq!(north.name, "north.jpg");
        assert_eq!(north.content_type, "image/jpeg");
        assert_eq!(north.len(), 10);
    }

    #[test]
    fn test_manifest_unknown_category() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(dir.path(), r#"{ "title": "x", "category": "Astrology" }"#);

        let err = load_manifest(&path).unwrap_err();
        assert!(err.to_string().contains("Astrology"));
    }

    #[test]
    fn test_manifest_missing_attachment_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(dir.path(), r#"{ "title": "x", "mainImage": "gone.png" }"#);

        let err = load_manifest(&path).unwrap_err();
        assert!(err.to_string().contains("gone.png"));
    }

    #[test]
    fn test_content_type_by_extension() {
        assert_eq!(content_type(Path::new("a.JPEG")), "image/jpeg");
        assert_eq!(content_type(Path::new("a.webp")), "image/webp");
        assert_eq!(content_type(Path::new("notes")), "application/octet-stream");
    }
}
