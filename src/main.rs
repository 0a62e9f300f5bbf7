//! jobcard – command-line job card renderer.
//!
//! Usage:
//!   jobcard render <record.json> [-o out.pdf] [--layout F] [--settings F] [--inline]
//!   jobcard preview [-o out.pdf] [--layout F] [--settings F]
//!   jobcard layout init|show|apply <edits.json>
//!   jobcard settings init --company-name NAME --address TEXT
//!
//! If `-o` is omitted the PDF is written to `<jobcard number>.pdf` in the
//! current directory (`preview.pdf` for previews).

use std::{fs, path::Path, path::PathBuf, process};

use clap::{Parser, Subcommand};

use jobcard_forge::assets::ImageSource;
use jobcard_forge::pipeline::{render_jobcard, render_preview, Disposition, RenderConfig, RenderedDocument};
use jobcard_forge::record::Jobcard;
use jobcard_forge::settings::{BrandingSettings, SettingsRepository};
use jobcard_forge::template::{ElementEdit, TemplateLayoutStore};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(author, version, about = "Render job cards to paginated PDF")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct Stores {
    /// Template layout file
    #[arg(long, default_value = "template_layout.json")]
    layout: PathBuf,

    /// Branding settings file
    #[arg(long, default_value = "settings.json")]
    settings: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a job card record (JSON) to PDF
    Render {
        record: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        stores: Stores,
        /// Report an inline disposition instead of an attachment
        #[arg(long)]
        inline: bool,
        /// Print the frozen page layout as JSON
        #[arg(long)]
        dump_layout: bool,
    },
    /// Render the sample job card against the current template
    Preview {
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        stores: Stores,
        #[arg(long)]
        dump_layout: bool,
    },
    /// Inspect or edit the template layout
    Layout {
        #[arg(long, default_value = "template_layout.json")]
        file: PathBuf,
        #[command(subcommand)]
        action: LayoutAction,
    },
    /// Manage the branding settings
    Settings {
        #[arg(long, default_value = "settings.json")]
        file: PathBuf,
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand, Debug)]
enum LayoutAction {
    /// Seed default geometry if the store is empty
    Init,
    /// Print the stored geometry
    Show,
    /// Apply a JSON array of `{name, x, y, width, height}` edits
    Apply { edits: PathBuf },
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Create the settings instance (fails if one exists)
    Init {
        #[arg(long)]
        company_name: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = "")]
        contact: String,
        /// Logo image path or data URI
        #[arg(long)]
        logo: Option<String>,
        /// Watermark image path or data URI (defaults to the logo)
        #[arg(long)]
        watermark: Option<String>,
    },
    /// Print the current settings
    Show,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let config = RenderConfig::default();
    match cli.command {
        Command::Render {
            record,
            output,
            stores,
            inline,
            dump_layout,
        } => {
            let json = fs::read_to_string(&record)
                .map_err(|e| format!("reading '{}': {e}", record.display()))?;
            let card = Jobcard::from_json(&json)?;
            let (branding, layout) = load_stores(&stores)?;
            let doc = render_jobcard(card, branding, layout, &config)?;
            let disposition = if inline {
                Disposition::Inline
            } else {
                Disposition::Attachment
            };
            finish(&doc, output, disposition, dump_layout)
        }
        Command::Preview {
            output,
            stores,
            dump_layout,
        } => {
            let (branding, layout) = load_stores(&stores)?;
            let mut doc = render_preview(branding, layout, &config)?;
            doc.filename = "preview.pdf".to_string();
            finish(&doc, output, Disposition::Inline, dump_layout)
        }
        Command::Layout { file, action } => {
            let mut store = TemplateLayoutStore::open(&file)?;
            match action {
                LayoutAction::Init => {
                    if store.ensure_defaults()? {
                        eprintln!("Seeded {} elements into '{}'", store.len(), file.display());
                    } else {
                        eprintln!("'{}' already holds {} elements", file.display(), store.len());
                    }
                }
                LayoutAction::Show => println!("{}", store.to_json()?),
                LayoutAction::Apply { edits } => {
                    let json = fs::read_to_string(&edits)?;
                    let edits: Vec<ElementEdit> = serde_json::from_str(&json)?;
                    let applied = store.apply_edits(&edits)?;
                    eprintln!("Applied {applied} edit(s) to '{}'", file.display());
                }
            }
            Ok(())
        }
        Command::Settings { file, action } => {
            let mut repo = SettingsRepository::open(&file)?;
            match action {
                SettingsAction::Init {
                    company_name,
                    address,
                    contact,
                    logo,
                    watermark,
                } => {
                    repo.create(BrandingSettings {
                        company_name,
                        company_address: address,
                        company_contact: contact,
                        logo: logo.map(ImageSource::from),
                        watermark: watermark.map(ImageSource::from),
                    })?;
                    eprintln!("Created settings in '{}'", file.display());
                }
                SettingsAction::Show => println!("{}", serde_json::to_string_pretty(&repo.snapshot())?),
            }
            Ok(())
        }
    }
}

/// Branding and template geometry for one render. An empty layout store is
/// seeded with defaults first.
fn load_stores(stores: &Stores) -> CliResult<(BrandingSettings, jobcard_forge::LayoutSnapshot)> {
    let branding = SettingsRepository::open(&stores.settings)?.snapshot();
    let mut layout = TemplateLayoutStore::open(&stores.layout)?;
    layout.ensure_defaults()?;
    Ok((branding, layout.snapshot()))
}

fn finish(
    doc: &RenderedDocument,
    output: Option<PathBuf>,
    disposition: Disposition,
    dump_layout: bool,
) -> CliResult<()> {
    if dump_layout {
        println!("{}", doc.layout.to_json());
    }
    let output = output.unwrap_or_else(|| PathBuf::from(&doc.filename));
    write_output(&output, &doc.bytes)?;
    let pages = doc.page_count();
    eprintln!(
        "Wrote '{}' ({} bytes, {} page{}) [Content-Disposition: {}]",
        output.display(),
        doc.bytes.len(),
        pages,
        if pages == 1 { "" } else { "s" },
        doc.content_disposition(disposition)
    );
    Ok(())
}

fn write_output(output: &Path, bytes: &[u8]) -> CliResult<()> {
    // Create output directory if necessary.
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(output, bytes).map_err(|e| format!("writing '{}': {e}", output.display()))?;
    Ok(())
}
