use clap::{Parser, Subcommand, ValueEnum};
use form033_core::config::core_config_from_env_values;
use form033_core::stats::{clinical_summary, index_lines};
use form033_core::{Form033Report, Form033Service, InMemoryPatientSource, StaticRankedOptions};
use form033_wire::{layout_document, legend_document, validate_export, Form033Export, Snapshot};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "form033")]
#[command(about = "Form033 dental chart encoder")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the Form033 export for a patient snapshot
    Build {
        /// Snapshot file (.json, .yaml or .yml)
        snapshot: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
        /// Single-line JSON output
        #[arg(long)]
        compact: bool,
    },
    /// Print the CPO-D / ceo-d indices of a snapshot
    Indices {
        /// Snapshot file (.json, .yaml or .yml)
        snapshot: PathBuf,
    },
    /// Print a plain-text clinical summary of a snapshot
    Summary {
        /// Snapshot file (.json, .yaml or .yml)
        snapshot: PathBuf,
        /// Free-text observations appended to the summary
        #[arg(long)]
        observations: Option<String>,
    },
    /// Print the symbol legend
    Legend,
    /// Print the tooth layout of both grids
    Layout,
    /// Check the structure of an export document
    Validate {
        /// Export JSON file
        export: PathBuf,
    },
}

fn report_for(snapshot: &Path) -> anyhow::Result<Form033Report> {
    let cfg = core_config_from_env_values(
        std::env::var("FORM033_ESTABLISHMENT").ok(),
        std::env::var("FORM033_PROVINCE").ok(),
        std::env::var("FORM033_CANTON").ok(),
    )?;
    let record = Snapshot::read(snapshot)?;
    let service = Form033Service::new(
        Arc::new(cfg),
        InMemoryPatientSource::new(),
        StaticRankedOptions::standard(),
    );
    Ok(service.generate_for_record(&record)?)
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("form033_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Build {
            snapshot,
            format,
            compact,
        }) => {
            let report = report_for(&snapshot)?;
            let text = match format {
                OutputFormat::Json => Form033Export::to_json(&report, !compact)?,
                OutputFormat::Yaml => Form033Export::to_yaml(&report)?,
            };
            println!("{}", text.trim_end());
        }
        Some(Commands::Indices { snapshot }) => {
            let report = report_for(&snapshot)?;
            for line in index_lines(&report.indices) {
                println!("{line}");
            }
        }
        Some(Commands::Summary {
            snapshot,
            observations,
        }) => {
            let report = report_for(&snapshot)?;
            print!(
                "{}",
                clinical_summary(&report.indices, observations.as_deref())
            );
        }
        Some(Commands::Legend) => {
            let legend = legend_document();
            println!("Catalog revision {}", legend.catalog_revision);
            for group in legend.groups {
                println!("\n{}", group.label);
                for symbol in group.symbols {
                    println!(
                        "  {:<10} {:<8} {} {}",
                        symbol.key, symbol.glyph, symbol.color, symbol.description
                    );
                }
            }
        }
        Some(Commands::Layout) => {
            let layout = layout_document();
            println!("Permanent");
            for row in &layout.permanent {
                println!("  {}", row.join(" "));
            }
            println!("Temporary");
            for row in &layout.temporary {
                println!("  {}", row.join(" "));
            }
        }
        Some(Commands::Validate { export }) => {
            let text = std::fs::read_to_string(&export)?;
            let doc = validate_export(&text)?;
            println!(
                "{}: valid export (catalog revision {}, patient {})",
                export.display(),
                doc.catalog_revision,
                doc.patient_section.patient_id
            );
        }
        None => {
            println!("Use 'form033 --help' for commands");
        }
    }

    Ok(())
}
