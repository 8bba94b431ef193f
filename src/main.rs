use anyhow::Result;
use clap::Parser;
use colored::*;

use asset_mirror::{MirrorCommand, PageMirror};

#[tokio::main]
async fn main() -> Result<()> {
    let args = MirrorCommand::parse();

    let mirror = PageMirror::new(args.options())?;
    let report = mirror.process_page(&args.url).await?;

    println!(
        "✅ Done. HTML: {}, assets under: {}",
        report.html_path.display().to_string().green(),
        report.assets_dir.display()
    );
    println!(
        "📊 {} downloaded, {} already present, {} failed",
        report.downloaded, report.reused, report.failed
    );
    Ok(())
}
