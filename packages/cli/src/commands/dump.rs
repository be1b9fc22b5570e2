use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use writekit_common::read_page;
use writekit_editor::{
    CharacterProps, Document, FileHeader, FontEntry, ParagraphProps, Section, TabAlignment,
    TabStop,
};
use writekit_format::{from_latin1, HEADER_SIZE, PAGE_SIZE};

#[derive(Debug, Args)]
pub struct DumpArgs {
    /// Input .wri file
    pub input: PathBuf,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunReport<P> {
    first: u32,
    lim: u32,
    props: P,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DumpReport {
    header: FileHeader,
    text: String,
    character_runs: Vec<RunReport<CharacterProps>>,
    paragraphs: Vec<RunReport<ParagraphProps>>,
    tabs: Vec<TabStop>,
    fonts: Vec<FontEntry>,
    section: Section,
}

pub fn dump(args: DumpArgs) -> Result<()> {
    let mut input = BufReader::new(File::open(&args.input)?);
    let mut page = [0u8; PAGE_SIZE];
    read_page(&mut input, 0, &mut page[..HEADER_SIZE])?;
    let header = FileHeader::decode(&page)?;

    let mut doc = Document::new();
    doc.open(&args.input)?;

    match args.format.as_str() {
        "json" => {
            let report = report(header, &doc);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "text" => print_text(&header, &doc)?,
        other => {
            return Err(anyhow::anyhow!(
                "Unknown format: {}. Use: text or json",
                other
            ))
        }
    }
    Ok(())
}

fn report(header: FileHeader, doc: &Document) -> DumpReport {
    DumpReport {
        header,
        text: from_latin1(doc.contents()),
        character_runs: doc
            .character_runs()
            .filter(|run| !run.is_empty())
            .map(|run| RunReport {
                first: run.first,
                lim: run.lim,
                props: run.prop,
            })
            .collect(),
        paragraphs: doc
            .paragraphs()
            .resolved()
            .filter(|(run, _)| !run.is_empty())
            .map(|(run, props)| RunReport {
                first: run.first,
                lim: run.lim,
                props: *props,
            })
            .collect(),
        tabs: doc.tab_stops().to_vec(),
        fonts: doc.fonts().to_vec(),
        section: doc.section().clone(),
    }
}

fn print_text(header: &FileHeader, doc: &Document) -> Result<()> {
    println!("{}", "Header".bright_blue().bold());
    println!("  text       {} bytes (fcMac {})", header.text_len(), header.fc_mac);
    println!("  characters pages {}..{}", header.pn_char()?, header.pn_para);
    println!("  paragraphs pages {}..{}", header.pn_para, header.pn_fntb);
    if header.has_section_table() {
        println!("  section    page {}, table page {}", header.pn_sep, header.pn_setb);
    } else {
        println!("  section    {}", "none".dimmed());
    }
    println!("  fonts      pages {}..{}", header.pn_ffntb, header.pn_mac);

    println!();
    println!("{}", "Character runs".bright_blue().bold());
    for run in doc.character_runs().filter(|run| !run.is_empty()) {
        println!(
            "  {:>6}..{:<6} {}",
            run.first,
            run.lim,
            describe_chp(&run.prop, doc.fonts())
        );
    }

    println!();
    println!("{}", "Paragraphs".bright_blue().bold());
    for (run, props) in doc.paragraphs().resolved().filter(|(run, _)| !run.is_empty()) {
        println!("  {:>6}..{:<6} {}", run.first, run.lim, describe_pap(props));
    }

    println!();
    println!("{}", "Tabs".bright_blue().bold());
    if doc.tab_stops().is_empty() {
        println!("  {}", "none".dimmed());
    }
    for tab in doc.tab_stops() {
        let kind = match tab.alignment {
            TabAlignment::Normal => "left",
            TabAlignment::Decimal => "decimal",
        };
        println!("  {} {}", tab.position, kind);
    }

    println!();
    println!("{}", "Fonts".bright_blue().bold());
    for (code, font) in doc.fonts().iter().enumerate() {
        println!("  {:>2} {} (family {})", code, font.name, font.family);
    }

    let section = doc.section();
    let sep = section.to_sep();
    println!();
    println!("{}", "Page setup".bright_blue().bold());
    println!("  page       {} x {}", sep.page_width, sep.page_height);
    println!(
        "  margins    left {} top {} right {} bottom {}",
        sep.left_margin,
        sep.top_margin,
        section.right_margin(),
        section.bottom_margin()
    );
    println!(
        "  header {} from top, footer {} from bottom",
        sep.header_top,
        section.footer_distance()
    );

    println!();
    println!("{}", "Text".bright_blue().bold());
    for line in from_latin1(doc.contents()).split("\r\n") {
        println!("  {}", line.escape_debug());
    }
    Ok(())
}

fn describe_chp(chp: &CharacterProps, fonts: &[FontEntry]) -> String {
    let font = fonts
        .get(usize::from(chp.font_code()))
        .map(|font| font.name.as_str())
        .unwrap_or("?");
    let mut parts = vec![format!("{} {}pt", font, f32::from(chp.half_points) / 2.0)];
    for (on, name) in [
        (chp.bold, "bold"),
        (chp.italic, "italic"),
        (chp.underline, "underline"),
        (chp.special, "page-number"),
    ] {
        if on {
            parts.push(name.to_string());
        }
    }
    match chp.script() {
        writekit_editor::ScriptPosition::Normal => {}
        script => parts.push(format!("{:?}", script).to_lowercase()),
    }
    parts.join(" ")
}

fn describe_pap(pap: &ParagraphProps) -> String {
    let mut text = format!(
        "{:?} indent {}/{}/{} spacing {}",
        pap.justification, pap.left_indent, pap.first_indent, pap.right_indent, pap.line_spacing
    )
    .to_lowercase();
    if pap.is_running_head() {
        text.push_str(if pap.footer { " [footer]" } else { " [header]" });
    }
    text
}
