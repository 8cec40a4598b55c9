//! # datamerge CLI
//!
//! Headless driver for the box layout editor.
//!
//! ## Usage
//!
//! ```bash
//! # Template-space geometry for a layout, no server needed
//! datamerge geometry --layout layout.json --template-size 1600x1200
//!
//! # Render one record and print its preview URL
//! datamerge --server http://localhost:5000 preview \
//!     --template card.png --data people.csv --layout layout.json --record 3
//!
//! # Render every record and save the zip
//! datamerge download --template card.png --data people.csv \
//!     --layout layout.json --output cards.zip
//!
//! # Text-only variant (no template)
//! datamerge --variant text-only download --data people.csv \
//!     --layout layout.json --output labels.zip
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;

use datamerge::{
    DataMergeError,
    client::{HttpMergeClient, UploadFile},
    config::{ClientConfig, DEFAULT_BASE_URL, EditorConfig},
    editor::{EditorSession, capabilities::Variant},
    geometry::Size,
    layout::LayoutDocument,
    spreadsheet::{Record, SpreadsheetData},
    submission::FontScaling,
    template::Template,
    workflow::MergeSession,
};

/// datamerge - template-based bulk image generation
#[derive(Parser, Debug)]
#[command(name = "datamerge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Render service base URL
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    server: String,

    /// Editor variant: combined, images-only, text-only or text-on-template
    #[arg(long, global = true, default_value = "combined")]
    variant: Variant,

    /// How font sizes follow the template scale: horizontal or max
    /// (defaults to the variant's own rule)
    #[arg(long, global = true)]
    font_scaling: Option<FontScaling>,

    /// Progress polling interval in milliseconds
    #[arg(long, global = true, default_value = "500")]
    poll_interval_ms: u64,

    /// Increase log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the template-space box configuration for a layout
    Geometry {
        /// Layout JSON (preview pixels)
        #[arg(long, value_name = "FILE")]
        layout: PathBuf,

        /// Native template size, e.g. 1600x1200
        #[arg(long, value_name = "WxH")]
        template_size: Option<Size>,
    },

    /// Upload inputs, place the layout and render one record
    Preview {
        #[command(flatten)]
        inputs: Inputs,

        /// 1-based record number
        #[arg(long, default_value = "1")]
        record: i64,
    },

    /// Upload inputs, place the layout and download every record as a zip
    Download {
        #[command(flatten)]
        inputs: Inputs,

        /// Where to write the archive
        #[arg(long, short, value_name = "ZIP")]
        output: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct Inputs {
    /// Template image (not used by the text-only variant)
    #[arg(long, value_name = "IMG")]
    template: Option<PathBuf>,

    /// Spreadsheet (CSV or Excel)
    #[arg(long, value_name = "SHEET")]
    data: PathBuf,

    /// Layout JSON (preview pixels)
    #[arg(long, value_name = "FILE")]
    layout: PathBuf,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), DataMergeError> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut editor_config = EditorConfig::for_variant(cli.variant);
    if let Some(scaling) = cli.font_scaling {
        editor_config.font_scaling = scaling;
    }
    let client_config = ClientConfig {
        poll_interval: Duration::from_millis(cli.poll_interval_ms),
        ..ClientConfig::new(cli.server.clone())
    };

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        match cli.command {
            Commands::Geometry {
                layout,
                template_size,
            } => geometry(&editor_config, &layout, template_size).await,
            Commands::Preview { inputs, record } => {
                let mut session = open_session(&client_config, editor_config, &inputs).await?;
                session.generate_previews().await?;
                let url = session.show_record(record).await?;
                let resolved = session.service().resolve(&url)?;
                println!("{}", resolved);
                Ok(())
            }
            Commands::Download { inputs, output } => {
                let mut session = open_session(&client_config, editor_config, &inputs).await?;
                session.generate_previews().await?;
                let archive = session.download_all().await?;
                tokio::fs::write(&output, &archive.bytes).await?;
                println!(
                    "Saved {} images to {} ({} bytes)",
                    archive.file_count,
                    output.display(),
                    archive.bytes.len()
                );
                Ok(())
            }
        }
    })
}

/// Offline: lay the boxes out over an empty spreadsheet with every column
/// the layout mentions, then print the submission geometry.
async fn geometry(
    config: &EditorConfig,
    layout: &Path,
    template_size: Option<Size>,
) -> Result<(), DataMergeError> {
    let doc = LayoutDocument::from_path(layout).await?;
    let mut editor = EditorSession::new(config.capabilities(), config.max_canvas);

    if config.capabilities().requires_template {
        let size = template_size.ok_or_else(|| {
            DataMergeError::validation(format!(
                "--template-size is required for the {} variant",
                config.variant
            ))
        })?;
        editor.set_template(Template::new("template", "", size))?;
    }

    let mut columns: Vec<String> = doc.boxes.iter().map(|b| b.column.clone()).collect();
    columns.sort();
    columns.dedup();
    let record: Record = columns.iter().map(|c| (c.clone(), String::new())).collect();
    editor.load_spreadsheet(SpreadsheetData::new(columns, vec![record]));

    doc.apply(&mut editor)?;
    let configs = editor.submission_geometry(config.font_scaling)?;
    let json = serde_json::to_string_pretty(&configs)
        .map_err(|e| DataMergeError::MalformedResponse(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

async fn open_session(
    client_config: &ClientConfig,
    editor_config: EditorConfig,
    inputs: &Inputs,
) -> Result<MergeSession<HttpMergeClient>, DataMergeError> {
    let client = HttpMergeClient::new(client_config, editor_config.variant)?;
    let mut session = MergeSession::new(client, editor_config, client_config.poll_interval);

    if session.editor().capabilities().requires_template {
        let path = inputs.template.as_ref().ok_or_else(|| {
            DataMergeError::validation("Please select an image file to upload")
        })?;
        let file = UploadFile::from_path(path).await?;
        session.upload_template(&file).await?;
    }

    let file = UploadFile::from_path(&inputs.data).await?;
    let records = session.upload_spreadsheet(&file).await?;
    log::info!("{} records loaded from {}", records, inputs.data.display());

    let layout = LayoutDocument::from_path(&inputs.layout).await?;
    layout.apply(session.editor_mut())?;
    session.load_images().await;
    Ok(session)
}
