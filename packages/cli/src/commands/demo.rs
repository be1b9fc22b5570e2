use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use writekit_editor::{Document, Justification, ScriptPosition, WriteResult};

#[derive(Debug, Args)]
pub struct DemoArgs {
    /// Output .wri file
    #[arg(short, long, default_value = "demo.wri")]
    pub output: PathBuf,
}

pub fn demo(args: DemoArgs, cwd: &str, config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(cwd, config_path)?;

    println!("{}", "📝 Building demo document...".bright_blue().bold());
    let mut doc = Document::new();
    config.apply(&mut doc)?;
    build(&mut doc)?;

    let header = doc.save(&args.output)?;
    println!(
        "  {} Wrote {} ({} bytes of text, {} pages)",
        "✓".green(),
        args.output.display(),
        header.text_len(),
        header.pn_mac
    );
    Ok(())
}

/// A header on the right, the page number centered in the footer, and a
/// little of everything in the body
pub fn build(doc: &mut Document) -> WriteResult<()> {
    doc.doc_header()?;
    doc.char_font_name("Helv")?;
    doc.para_justify(Justification::Right)?;
    doc.text("WriteKit manual")?;

    doc.doc_footer()?;
    doc.char_font_name("Helv")?;
    doc.para_justify(Justification::Center)?;
    doc.text("- ")?;
    doc.doc_insert_page_number()?;
    doc.text(" -")?;
    doc.doc_print_on_first_page(true)?;
    doc.doc_return()?;

    doc.para_justify(Justification::Center)?;
    doc.char_bold(true)?;
    doc.char_font_size(18)?;
    doc.text("Writing Write files\n")?;
    doc.char_normal()?;
    doc.char_font_size(12)?;
    doc.para_normal()?;

    doc.para_interline(360)?;
    doc.text("Text is appended at the end, and formatting applies to what follows. ")?;
    doc.char_italic(true)?;
    doc.text("Italic")?;
    doc.char_italic(false)?;
    doc.text(", ")?;
    doc.char_underline(true)?;
    doc.text("underlined")?;
    doc.char_underline(false)?;
    doc.text(" and E = mc")?;
    doc.char_script(ScriptPosition::Superscript)?;
    doc.text("2")?;
    doc.char_script(ScriptPosition::Normal)?;
    doc.text(" all work.\n")?;
    doc.para_normal()?;

    doc.doc_tab_set(2880, false)?;
    doc.doc_tab_set(5760, true)?;
    doc.char_font_name("Courier")?;
    doc.text("Item\tQuantity\tPrice\n")?;
    doc.text("Paper\t500\t4.50\n")?;
    doc.text("Ink\t2\t19.95\n")?;
    doc.char_font_name("Arial")?;

    doc.para_indent_left(720)?;
    doc.para_indent_first(-360)?;
    doc.text("-\tAn indented paragraph with a hanging first line, long enough to wrap onto a second line.\n")?;
    doc.para_normal()?;

    doc.text("\x0cThe second page starts here.")?;
    Ok(())
}
