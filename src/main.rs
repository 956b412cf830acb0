// ABOUTME: Main entry point for the vomit program.
// ABOUTME: Provides CLI interface and executes commands from the library.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use vomit::{
    html, outline, pdf, server, slides, workspace, Config, Document, MarkdownRenderer,
    ResourceMode, Stylesheet,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a markdown presentation as a standalone HTML deck
    Html(HtmlArgs),

    /// Print the slides (and speaker notes) of a presentation
    Slides(SlidesArgs),

    /// Print the slide and heading outline of a document
    Outline(JsonInputArgs),

    /// Print the editor status line for a document
    Status(InputArgs),

    /// Export a presentation to PDF through a headless browser
    ExportPdf(ExportPdfArgs),

    /// Serve the editor preview, audience and presenter views and follow edits
    Present(PresentArgs),

    /// List a directory the way the editor's file tree shows it
    Files(FilesArgs),

    /// Search markdown files under a directory
    Search(SearchArgs),
}

#[derive(Args)]
struct InputArgs {
    /// Path to the markdown file
    input: PathBuf,
}

#[derive(Args)]
struct JsonInputArgs {
    /// Path to the markdown file
    input: PathBuf,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct HtmlArgs {
    /// Path to the markdown file
    #[arg(short, long)]
    input: PathBuf,

    /// Path to output HTML file
    #[arg(short, long)]
    output: PathBuf,

    /// CSS files to include (local paths or URLs)
    #[arg(long, value_delimiter = ',')]
    css: Option<Vec<String>>,

    /// Mode for CSS: 'embed' to embed content or 'link' to reference
    #[arg(long)]
    mode: Option<String>,
}

#[derive(Args)]
struct SlidesArgs {
    /// Path to the markdown file
    input: PathBuf,

    /// Include speaker notes
    #[arg(long)]
    notes: bool,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ExportPdfArgs {
    /// Path to the markdown file
    #[arg(short, long)]
    input: PathBuf,

    /// Path to output PDF file
    #[arg(short, long)]
    output: PathBuf,

    /// CSS files to include (local paths or URLs)
    #[arg(long, value_delimiter = ',')]
    css: Option<Vec<String>>,
}

#[derive(Args)]
struct PresentArgs {
    /// Path to the markdown file
    input: PathBuf,

    /// Also run the presenter view with notes and timer
    #[arg(long)]
    presenter: bool,

    /// HTTP port; the WebSocket channel uses the next port
    #[arg(short, long)]
    port: Option<u16>,

    /// CSS files to include (local paths or URLs)
    #[arg(long, value_delimiter = ',')]
    css: Option<Vec<String>>,
}

#[derive(Args)]
struct FilesArgs {
    /// Directory to list
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SearchArgs {
    /// Text to search for (case-insensitive)
    query: String,

    /// Directory to search
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

fn stylesheets(css: &Option<Vec<String>>) -> Vec<Stylesheet> {
    css.as_ref()
        .map(|files| files.iter().map(|path| Stylesheet::new(path)).collect())
        .unwrap_or_default()
}

fn read_input(path: &Path) -> anyhow::Result<Document> {
    Document::open(path).with_context(|| format!("Failed to open {:?}", path))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(command: &Commands, config: &Config) -> anyhow::Result<()> {
    match command {
        Commands::Html(args) => {
            let document = read_input(&args.input)?;
            let mode = match &args.mode {
                Some(mode) => mode.parse::<ResourceMode>()?,
                None => config.resource_mode(),
            };
            let deck = html::render_deck(
                document.content(),
                document.base_path().as_deref(),
                &MarkdownRenderer::default(),
                &stylesheets(&args.css),
                mode,
            );
            html::write_html_to_file(&deck, &args.output)?;
            println!("HTML generated successfully: {:?}", args.output);
        }
        Commands::Slides(args) => {
            let document = read_input(&args.input)?;
            let slides = slides::from_document(document.content());
            if args.json {
                return print_json(&slides);
            }
            let total = slides.len();
            if total == 0 {
                println!("No slides");
            }
            for (index, slide) in slides.iter().enumerate() {
                println!("--- Slide {} / {} ---", index + 1, total);
                println!("{}", slide.content);
                if args.notes && slide.has_notes() {
                    println!("[notes]");
                    println!("{}", slide.notes);
                }
            }
        }
        Commands::Outline(args) => {
            let document = read_input(&args.input)?;
            let items = outline::extract(document.content());
            if args.json {
                return print_json(&items);
            }
            for item in items {
                let indent = match item.kind {
                    outline::OutlineKind::Slide | outline::OutlineKind::H1 => "",
                    outline::OutlineKind::H2 => "  ",
                    outline::OutlineKind::H3 => "    ",
                };
                println!("{:>4}  {}{}", item.line + 1, indent, item.text);
            }
        }
        Commands::Status(args) => {
            let document = read_input(&args.input)?;
            println!("{}", document.status());
        }
        Commands::ExportPdf(args) => {
            let document = read_input(&args.input)?;
            let bytes = pdf::export_pdf(
                document.content(),
                document.base_path().as_deref(),
                &MarkdownRenderer::default(),
                &stylesheets(&args.css),
                &config.export_config(),
            )?;
            pdf::write_pdf(&bytes, &args.output)?;
            println!("PDF exported successfully: {:?}", args.output);
        }
        Commands::Present(args) => {
            let serve_config = config.serve_config(
                args.input.clone(),
                args.presenter,
                args.port,
                stylesheets(&args.css),
            )?;
            server::serve(&serve_config)?;
        }
        Commands::Files(args) => {
            let entries = workspace::list_directory(&args.dir);
            if args.json {
                return print_json(&entries);
            }
            for entry in entries {
                let suffix = if entry.is_directory { "/" } else { "" };
                println!("{}{}", entry.name, suffix);
            }
        }
        Commands::Search(args) => {
            let results = workspace::search_in_files(&args.dir, &args.query);
            if args.json {
                return print_json(&results);
            }
            for file in results {
                for found in file.matches {
                    println!("{}:{}: {}", file.path.display(), found.line, found.text);
                }
            }
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let result = match &cli.command {
        Some(command) => run(command, &config),
        None => {
            println!("No command specified. Use --help for usage information.");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
