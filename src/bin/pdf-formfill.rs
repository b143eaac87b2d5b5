//! PDF Form Fill CLI tool
//!
//! A command-line tool for batch-filling a folder of PDF forms with shared
//! field values, using one PDF as the template for field discovery.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use pdf_formfill::pdf::{
    discover_fields, fill_batch, scan_documents, summarize, BatchFillOptions, FieldMap,
    DEFAULT_PATTERN,
};

/// PDF Form Fill - batch-fill a folder of PDF forms
#[derive(Parser)]
#[command(name = "pdf-formfill")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # List the fillable fields of a form
    pdf-formfill fields forms/application.pdf

    # Fill every PDF in a folder with the same values
    pdf-formfill fill forms --set \"Name=Jane Doe\" --set \"Date=2026-08-06\"

    # Use a key=value file and an explicit template
    pdf-formfill fill forms --template application.pdf --data values.txt

    # Show page and field counts
    pdf-formfill info forms/application.pdf")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the form fields discovered in a template PDF
    Fields {
        /// Template PDF file
        template: PathBuf,
    },

    /// Fill every matching PDF in a folder with the same field values
    Fill {
        /// Folder containing the PDF forms
        folder: PathBuf,

        /// Template file name within the folder (default: first PDF found)
        #[arg(long)]
        template: Option<String>,

        /// Field value as NAME=VALUE (repeatable)
        #[arg(long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,

        /// File of NAME=VALUE lines ('#' starts a comment)
        #[arg(long, value_name = "FILE")]
        data: Option<PathBuf>,

        /// Filename pattern selecting the documents to fill
        #[arg(long = "match", value_name = "PATTERN", default_value = DEFAULT_PATTERN)]
        pattern: String,

        /// Output directory (default: <folder>/filled_forms)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Prefix for output file names
        #[arg(long, default_value = "filled_")]
        prefix: String,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Fields { template } => cmd_fields(template),
        Commands::Fill {
            folder,
            template,
            set,
            data,
            pattern,
            output_dir,
            prefix,
        } => cmd_fill(folder, template, set, data, pattern, output_dir, prefix),
        Commands::Info { input } => cmd_info(input),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// List the fields of a template PDF
fn cmd_fields(template: PathBuf) -> Result<()> {
    let fields = discover_fields(&template)
        .with_context(|| format!("Failed to read fields from {}", template.display()))?;

    if fields.is_empty() {
        println!("No fillable form fields found in {}", template.display());
        println!("Make sure the document is a fillable form.");
        return Ok(());
    }

    println!("{} field(s) in {}:", fields.len(), template.display());
    for (name, value) in &fields {
        if value.is_empty() {
            println!("  {}", name);
        } else {
            println!("  {} = {}", name, value);
        }
    }

    Ok(())
}

/// Fill every PDF in a folder with the same field values
fn cmd_fill(
    folder: PathBuf,
    template: Option<String>,
    set: Vec<String>,
    data: Option<PathBuf>,
    pattern: String,
    output_dir: Option<PathBuf>,
    prefix: String,
) -> Result<()> {
    let documents = scan_documents(&folder, &pattern)?;
    eprintln!("Found {} PDF files", documents.len());

    // Template defaults to the first scanned file
    let template_name = match template {
        Some(name) => {
            if !documents.iter().any(|doc| doc == &name) {
                bail!("Template {} is not among the scanned documents", name);
            }
            name
        }
        None => documents[0].clone(),
    };

    // Seed the map with the template's fields and current values, the way
    // the entry form would be pre-populated
    let mut values = discover_fields(&folder.join(&template_name))
        .with_context(|| format!("Failed to read fields from template {}", template_name))?;
    if values.is_empty() {
        bail!(
            "No form fields found in template {} - nothing to fill",
            template_name
        );
    }

    // Overlay file entries, then explicit --set pairs
    if let Some(path) = data {
        for (name, value) in parse_data_file(&path)? {
            warn_unknown_field(&values, &name);
            values.insert(name, value);
        }
    }
    for pair in &set {
        let (name, value) = parse_pair(pair)?;
        warn_unknown_field(&values, &name);
        values.insert(name, value);
    }

    let output_dir = output_dir.unwrap_or_else(|| folder.join("filled_forms"));

    let options = BatchFillOptions {
        source_dir: folder,
        documents,
        values,
        output_dir: output_dir.clone(),
        prefix,
    };

    let report = fill_batch(&options, |index, total, name| {
        eprintln!("[{}/{}] {}", index, total, name);
    })?;

    println!(
        "Completed: {} filled, {} errors",
        report.success_count(),
        report.error_count()
    );
    for (name, err) in &report.failed {
        println!("  failed: {} ({})", name, err);
    }
    println!("Filled PDFs saved to: {}", output_dir.display());

    Ok(())
}

/// Show information about a PDF
fn cmd_info(input: PathBuf) -> Result<()> {
    let summary = summarize(&input)?;

    println!("File: {}", input.display());
    println!("Pages: {}", summary.page_count);
    println!("Form fields: {}", summary.field_count);

    if let Some(title) = summary.title {
        println!("Title: {}", title);
    }
    if let Some(author) = summary.author {
        println!("Author: {}", author);
    }

    Ok(())
}

fn warn_unknown_field(values: &FieldMap, name: &str) {
    if !values.contains_key(name) {
        eprintln!(
            "Warning: field {:?} is not in the template; kept in case other documents carry it",
            name
        );
    }
}

/// Split a NAME=VALUE assignment
fn parse_pair(pair: &str) -> Result<(String, String)> {
    match pair.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => bail!("Invalid field assignment {:?} (expected NAME=VALUE)", pair),
    }
}

/// Read NAME=VALUE lines from a file; blank lines and '#' comments skipped
fn parse_data_file(path: &Path) -> Result<Vec<(String, String)>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read value file {}", path.display()))?;

    let mut pairs = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (name, value) =
            parse_pair(line).with_context(|| format!("{}:{}", path.display(), line_no + 1))?;
        pairs.push((name, value));
    }

    Ok(pairs)
}
