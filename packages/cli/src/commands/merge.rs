use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use writekit_editor::{Document, ReadOptions};

#[derive(Debug, Args)]
pub struct MergeArgs {
    /// Input .wri files; the first sets the page setup and tabs
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output .wri file
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Formatted text of every file after the first
fn appended() -> ReadOptions {
    ReadOptions {
        text: true,
        char_info: true,
        ..ReadOptions::default()
    }
}

pub fn merge(args: MergeArgs) -> Result<()> {
    println!("{}", "📎 Merging Write files...".bright_blue().bold());

    let mut doc = Document::new();
    for (index, input) in args.inputs.iter().enumerate() {
        let result = if index == 0 {
            doc.open(input)
        } else {
            doc.read(input, appended())
        };
        result.map_err(|err| anyhow::anyhow!("{}: {}", input.display(), err))?;
        println!("  {} {}", "✓".green(), input.display());
    }

    let header = doc.save(&args.output)?;
    println!();
    println!(
        "✨ {} {} ({} bytes of text)",
        "Wrote".green().bold(),
        args.output.display(),
        header.text_len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &std::path::Path, text: &str, bold: bool) {
        let mut doc = Document::new();
        doc.doc_margin_top(720).unwrap();
        doc.char_bold(bold).unwrap();
        doc.text(text).unwrap();
        doc.save(path).unwrap();
    }

    #[test]
    fn test_merge_files() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("a.wri");
        let second = temp_dir.path().join("b.wri");
        let output = temp_dir.path().join("out.wri");
        write(&first, "plain\n", false);
        write(&second, "bold\n", true);

        merge(MergeArgs {
            inputs: vec![first, second],
            output: output.clone(),
        })
        .unwrap();

        let mut merged = Document::new();
        merged.open(&output).unwrap();
        assert_eq!(merged.contents(), b"plain\r\nbold\r\n");
        let bold: Vec<bool> = merged.character_runs().map(|r| r.prop.bold).collect();
        assert_eq!(bold, vec![false, true]);
        assert_eq!(merged.section().to_sep().top_margin, 720);
    }

    #[test]
    fn test_merge_reports_bad_input() {
        let temp_dir = TempDir::new().unwrap();
        let junk = temp_dir.path().join("junk.wri");
        std::fs::write(&junk, vec![0u8; 256]).unwrap();

        let err = merge(MergeArgs {
            inputs: vec![junk],
            output: temp_dir.path().join("out.wri"),
        })
        .unwrap_err();
        assert!(err.to_string().contains("junk.wri"));
    }
}
