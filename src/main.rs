#![cfg(not(tarpaulin_include))]

use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use std::fs;
use std::path::PathBuf;

use fairvis::app;
use fairvis::catalog::Catalog;
use fairvis::config::Settings;
use fairvis::downloader::template_xlsx;
use fairvis::graph::{chart_file_name, visualize_barplot, visualize_polar_barplots};
use fairvis::loader::load_workbook;
use fairvis::merge::merge_workbook;

#[derive(Parser)]
#[command(name = "fairvis", version, about = "Dashboard for FAIR assessments of computational models")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    settings: Settings,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the dashboard (default)
    Serve,
    /// Print the indicator table and the loaded models
    Summary,
    /// Validate an indicator workbook and write the merged model tables as CSV
    Merge {
        /// Workbook with `indicators`, `models` and one sheet per model
        workbook: PathBuf,
        /// Output directory (default: the workbook's directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write the charts of one model as SVG files
    Plot {
        model: String,
        #[arg(long, default_value = "plots")]
        out: PathBuf,
    },
    /// Write a blank assessment template
    Template {
        #[arg(long, default_value = "FAIR_assessment_template.xlsx")]
        out: PathBuf,
    },
}

/// Main entry point for the FAIR assessment dashboard
///
/// Without a subcommand the web server is started with the settings taken
/// from the command line and the `FAIRVIS_*` environment variables.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let settings = cli.settings;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => app::run(settings).await?,
        Command::Summary => {
            let catalog = Catalog::load(&settings)?;
            println!("{}", catalog.indicators.table());
            for model in catalog.models.values() {
                let counts = model.class_counts();
                println!(
                    "{}: {} indicators, NA={} 0.0={} 0.5={} 1.0={}",
                    model.model_id,
                    model.indicators.len(),
                    counts.not_assessed,
                    counts.zero,
                    counts.half,
                    counts.one
                );
            }
        }
        Command::Merge { workbook, out } => {
            let merged = merge_workbook(&load_workbook(&workbook)?)?;
            for validity in &merged.validity {
                println!("{}: valid = {}", validity.model_id, validity.valid);
            }
            let out = out.unwrap_or_else(|| {
                workbook
                    .parent()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("."))
            });
            merged.write_csvs(&out)?;
        }
        Command::Plot { model, out } => {
            let catalog = Catalog::load(&settings)?;
            let assessment = catalog.model(&model)?;
            fs::create_dir_all(&out)?;

            let (figs, keys) = visualize_polar_barplots(assessment)?;
            for (svg, key) in figs.iter().zip(&keys) {
                let path = out.join(chart_file_name(&model, key));
                fs::write(&path, svg)?;
                info!("Wrote {}", path.display());
            }
            let path = out.join(chart_file_name(&model, "barplot"));
            fs::write(&path, visualize_barplot(assessment)?)?;
            info!("Wrote {}", path.display());
        }
        Command::Template { out } => {
            let catalog = Catalog::load(&settings)?;
            fs::write(&out, template_xlsx(&catalog.indicators)?)?;
            info!("Wrote {}", out.display());
        }
    }

    Ok(())
}
