use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::{Path as FsPath, PathBuf};
use swift_surgeon::config::{insertion_for, replacement_for, StepResult};
use swift_surgeon::edit::write_rewrite;
use swift_surgeon::path::enumerate;
use swift_surgeon::report::{render_json, render_text, unified_diff, FileReport};
use swift_surgeon::{
    apply_script, init_tracing, load_config, load_script, parse, AddressingScheme,
    DiagnosticExtractor, EditResult, InsertPosition, NodePath, OutputFormat, SurgeonConfig,
    SyntaxTree,
};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "swift-surgeon")]
#[command(about = "Diagnostics and structural edits for Swift sources", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// The node an edit addresses.
#[derive(Args, Clone)]
#[group(required = true, multiple = false)]
struct TargetArgs {
    /// Token path: the N-th token of the file
    #[arg(long)]
    path: Option<String>,

    /// Declaration path, e.g. 1.2 for the second member of the first declaration
    #[arg(long)]
    decl: Option<String>,
}

impl TargetArgs {
    fn node_path(&self) -> Result<NodePath> {
        let path = match (&self.path, &self.decl) {
            (Some(path), _) => NodePath::parse(AddressingScheme::Token, path)?,
            (None, Some(decl)) => NodePath::parse(AddressingScheme::Declaration, decl)?,
            (None, None) => anyhow::bail!("either --path or --decl is required"),
        };
        Ok(path)
    }
}

/// What to do with an edited document.
#[derive(Args, Clone, Copy)]
struct OutputArgs {
    /// Write the result back to the file
    #[arg(short, long)]
    write: bool,

    /// Show a unified diff instead of the full result
    #[arg(short, long)]
    diff: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Report parser diagnostics for files or directories
    Diagnose {
        /// Files, or directories searched for .swift files
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output format (text or json)
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// List addressable nodes with their paths
    Paths {
        file: PathBuf,

        /// List declaration paths instead of token paths
        #[arg(long)]
        declarations: bool,
    },

    /// Replace a node with new text
    Replace {
        file: PathBuf,
        #[command(flatten)]
        target: TargetArgs,
        #[arg(long)]
        text: String,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Delete a node; the removed text goes to stderr
    Delete {
        file: PathBuf,
        #[command(flatten)]
        target: TargetArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Insert new text next to a node
    Insert {
        file: PathBuf,
        #[command(flatten)]
        target: TargetArgs,
        #[arg(long)]
        text: String,
        /// Insert before the anchor instead of after it
        #[arg(long)]
        before: bool,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Set or remove the documentation comment of a node
    Doc {
        file: PathBuf,
        #[command(flatten)]
        target: TargetArgs,
        /// New documentation; omit to remove it
        #[arg(long)]
        text: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Run an edit script against a file
    Apply {
        file: PathBuf,
        #[arg(short, long)]
        script: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SurgeonConfig::default(),
    };

    match cli.command {
        Commands::Diagnose { paths, format } => {
            cmd_diagnose(&config, &paths, format.unwrap_or(config.output.format))
        }
        Commands::Paths { file, declarations } => cmd_paths(&file, declarations),
        Commands::Replace {
            file,
            target,
            text,
            output,
        } => {
            let (tree, before) = load_tree(&file)?;
            let path = target.node_path()?;
            let node = replacement_for(&tree, &path, &text)?;
            let after = config.engine().replace(&tree, &path, node)?;
            finish(&file, &before, &after, output)
        }
        Commands::Delete {
            file,
            target,
            output,
        } => {
            let (tree, before) = load_tree(&file)?;
            let (removed, after) = config.engine().delete(&tree, &target.node_path()?)?;
            eprintln!("{}", format!("removed {:?}", removed).dimmed());
            finish(&file, &before, &after, output)
        }
        Commands::Insert {
            file,
            target,
            text,
            before: insert_before,
            output,
        } => {
            let (tree, before) = load_tree(&file)?;
            let anchor = target.node_path()?;
            let position = if insert_before {
                InsertPosition::Before
            } else {
                InsertPosition::After
            };
            let nodes = insertion_for(&tree, &anchor, &text, position)?;
            let after = config.engine().insert(&tree, nodes, &anchor, position)?;
            finish(&file, &before, &after, output)
        }
        Commands::Doc {
            file,
            target,
            text,
            output,
        } => {
            let (tree, before) = load_tree(&file)?;
            let after =
                config
                    .engine()
                    .modify_documentation(&tree, &target.node_path()?, text.as_deref())?;
            finish(&file, &before, &after, output)
        }
        Commands::Apply {
            file,
            script,
            output,
        } => cmd_apply(&config, &file, &script, output),
    }
}

/// Helper: Read and parse one file.
fn load_tree(file: &FsPath) -> Result<(SyntaxTree, String)> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let parsed = parse(file.display().to_string(), &text);
    if parsed.has_errors() {
        eprintln!(
            "{}",
            format!(
                "Warning: {} has {} parser diagnostic(s); run `swift-surgeon diagnose` for details",
                file.display(),
                parsed.diagnostics.len()
            )
            .yellow()
        );
    }
    Ok((parsed.tree, text))
}

/// Helper: Write, diff or print an edited document.
fn finish(file: &FsPath, before: &str, after: &SyntaxTree, output: OutputArgs) -> Result<()> {
    let after = after.render();
    if output.diff {
        print!("{}", unified_diff(&file.display().to_string(), before, &after));
    }
    if output.write {
        match write_rewrite(file, before, &after)? {
            EditResult::Applied { file, .. } => {
                eprintln!("{} Wrote {}", "✓".green(), file.display());
            }
            EditResult::AlreadyApplied { file } | EditResult::Unchanged { file } => {
                eprintln!("{} No changes to {}", "⊙".yellow(), file.display());
            }
        }
    } else if !output.diff {
        print!("{after}");
    }
    Ok(())
}

/// Helper: Collect .swift files from the given paths.
fn discover_swift_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        if !path.exists() {
            anyhow::bail!("{} does not exist", path.display());
        }
        let mut found = Vec::new();
        for entry in WalkDir::new(path) {
            let entry = entry?;
            if entry.file_type().is_file()
                && entry.path().extension().and_then(|s| s.to_str()) == Some("swift")
            {
                found.push(entry.path().to_path_buf());
            }
        }
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

fn cmd_diagnose(config: &SurgeonConfig, paths: &[PathBuf], format: OutputFormat) -> Result<()> {
    let extractor = DiagnosticExtractor::new(config.extractor_options());
    let mut reports = Vec::new();
    for file in discover_swift_files(paths)? {
        let text = fs::read_to_string(&file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let identity = file.display().to_string();
        let parsed = parse(identity.as_str(), &text);
        reports.push(FileReport {
            file: identity,
            diagnostics: extractor.extract(&parsed.tree, &parsed.diagnostics),
        });
    }

    match format {
        OutputFormat::Text => print!("{}", render_text(&reports)),
        OutputFormat::Json => println!("{}", render_json(&reports)?),
    }

    if reports.iter().any(|report| report.error_count() > 0) {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_paths(file: &FsPath, declarations: bool) -> Result<()> {
    let (tree, text) = load_tree(file)?;
    let converter = swift_surgeon::LocationConverter::from_text(&text);
    let scheme = if declarations {
        AddressingScheme::Declaration
    } else {
        AddressingScheme::Token
    };
    for (path, node) in enumerate(&tree, scheme) {
        let location = converter
            .location(node.content_offset())
            .map(|l| l.to_string())
            .unwrap_or_default();
        let content = node.node.content_text();
        let first_line = content.lines().next().unwrap_or("");
        let indent = "  ".repeat(path.depth().saturating_sub(1));
        println!(
            "{indent}{} {} {} {}",
            path.to_string().bold(),
            node.node.kind_name().cyan(),
            location.dimmed(),
            first_line
        );
    }
    Ok(())
}

fn cmd_apply(config: &SurgeonConfig, file: &FsPath, script_path: &FsPath, output: OutputArgs) -> Result<()> {
    let script = load_script(script_path)?;
    let (tree, before) = load_tree(file)?;
    if !script.meta.name.is_empty() {
        eprintln!("Script: {}", script.meta.name);
    }
    let outcome = match apply_script(&tree, &script, &config.engine()) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            std::process::exit(1);
        }
    };
    for result in &outcome.results {
        let marker = match result {
            StepResult::Deleted { .. } => "-".red(),
            _ => "✓".green(),
        };
        eprintln!("{marker} {result}");
    }
    finish(file, &before, &outcome.tree, output)
}
