use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use docxide_html::{DefaultImageLoader, RenderConfig, convert_html_file_with};

#[derive(Parser, Debug)]
#[command(version, about = "Render an HTML fragment into a .docx document")]
struct Args {
    /// Input HTML file.
    input: PathBuf,

    /// Output .docx path. Defaults to the input path with a .docx extension.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Font family forced onto every run.
    #[arg(long)]
    font: Option<String>,

    /// Font size in points forced onto every run.
    #[arg(long)]
    font_size: Option<f32>,

    /// Draw the default grid border on tables nested inside table cells.
    #[arg(long)]
    nested_table_border: bool,

    /// Indent per list level, in twips.
    #[arg(long, default_value_t = 360)]
    numbering_indent: i64,

    /// Directory relative image paths are resolved against. Defaults to the
    /// input file's directory.
    #[arg(long)]
    base_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("docx"));
    let base_dir = args
        .base_dir
        .clone()
        .or_else(|| args.input.parent().map(PathBuf::from))
        .unwrap_or_default();

    let mut config = RenderConfig::default()
        .with_table_in_cell_border(args.nested_table_border)
        .with_numbering_indent(args.numbering_indent);
    if let Some(font) = args.font {
        config = config.with_global_font(font);
    }
    if let Some(size) = args.font_size {
        config = config.with_global_font_size((size * 2.0).round().max(1.0) as u32);
    }

    let loader = DefaultImageLoader::with_base_dir(base_dir);
    match convert_html_file_with(&args.input, &output, config, loader) {
        Ok(()) => {
            println!("{}", output.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
