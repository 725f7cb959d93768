use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "icp-etl")]
#[command(about = "Batch jobs integrating the IC Project API with adjacent systems")]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub job: Job,
}

#[derive(Debug, Subcommand)]
pub enum Job {
    /// Download a PDF for every invoice issued this year
    DownloadInvoices {
        /// Directory the PDF files are written to
        #[arg(long, default_value = "invoices")]
        output_dir: PathBuf,
    },

    /// Email an XLSX report of overdue unpaid invoices
    UnpaidReport,

    /// Export all projects to a CSV file
    ExportProjects {
        #[arg(long, default_value = "projects.csv")]
        output: PathBuf,
    },

    /// Create projects from a CSV file
    ImportProjects {
        #[arg(long)]
        csv: PathBuf,
    },

    /// Create contractors from a CSV file
    ImportContractors {
        #[arg(long)]
        csv: PathBuf,
    },

    /// Create users from a CSV file
    ImportUsers {
        #[arg(long)]
        csv: PathBuf,
    },

    /// Create costs from a CSV file, resolving categories and tax rates by name
    ImportCosts {
        #[arg(long)]
        csv: PathBuf,
    },

    /// Mirror Apilo orders into kanban tasks
    SyncOrders,
}
