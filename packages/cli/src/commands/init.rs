use crate::config::{Config, UserConfig, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::Path;

const SAMPLE_MANIFEST: &str = "research.json";

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Realtime database root URL
    #[arg(long, default_value = "http://localhost:9000")]
    pub database_url: String,

    /// Bucket that receives PDF uploads
    #[arg(long, default_value = "")]
    pub bucket: String,

    /// User id submits are made as
    #[arg(long)]
    pub uid: Option<String>,

    /// Email recorded on review submissions
    #[arg(long)]
    pub email: Option<String>,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing journal workspace...".bright_blue().bold());

    let config = Config {
        database_url: args.database_url,
        storage_bucket: args.bucket,
        user: args.uid.map(|uid| UserConfig { uid, email: args.email }),
        ..Config::default()
    };

    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    let manifest = cwd.join(SAMPLE_MANIFEST);
    if !manifest.exists() {
        fs::write(&manifest, sample_manifest())?;
        println!("  {} Created {}", "✓".green(), SAMPLE_MANIFEST);
    }

    println!();
    println!("{}", "✅ Workspace initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} (image and pdf fields take URLs or local paths)", SAMPLE_MANIFEST);
    println!("  2. Run: journal submit {} --dry-run", SAMPLE_MANIFEST);
    println!("  3. Run: journal submit {}", SAMPLE_MANIFEST);

    Ok(())
}

fn sample_manifest() -> String {
    let sample = serde_json::json!({
        "title": "Untitled research",
        "abstract": "",
        "category": "Others",
        "mainImage": null,
        "pdf": null,
        "topics": [{
            "title": "Introduction",
            "description": "",
            "image": null,
            "subtopics": [{
                "subtopicTitle": "Background",
                "subtopicDescription": "",
                "subtopicImage": null
            }]
        }]
    });
    serde_json::to_string_pretty(&sample).unwrap_or_default()
}
