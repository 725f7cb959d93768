use clap::Parser;
use icp_etl::config::cli::{Cli, Job};
use icp_etl::config::{ApiloConfig, IcpConfig, SmtpConfig};
use icp_etl::core::{ApiClient, Auth, ImportSummary};
use icp_etl::utils::logger;
use icp_etl::{jobs, Result};

fn icp_client(config: &IcpConfig) -> Result<ApiClient> {
    ApiClient::new(config.api_url(), Auth::Token(config.token.clone()))
}

fn report(summary: ImportSummary) {
    println!("✅ {} created, {} failed", summary.created, summary.failed);
}

async fn run(cli: Cli) -> Result<()> {
    match cli.job {
        Job::DownloadInvoices { output_dir } => {
            let icp = IcpConfig::from_env()?;
            jobs::download_invoices::run(&icp_client(&icp)?, &output_dir).await
        }
        Job::UnpaidReport => {
            let icp = IcpConfig::from_env()?;
            let smtp = SmtpConfig::from_env()?;
            jobs::unpaid_report::run(&icp_client(&icp)?, &icp, &smtp).await
        }
        Job::ExportProjects { output } => {
            let icp = IcpConfig::from_env()?;
            jobs::export_projects::run(&icp_client(&icp)?, &output).await
        }
        Job::ImportProjects { csv } => {
            let icp = IcpConfig::from_env()?;
            report(jobs::import_projects::run(&icp_client(&icp)?, &csv).await?);
            Ok(())
        }
        Job::ImportContractors { csv } => {
            let icp = IcpConfig::from_env()?;
            report(jobs::import_contractors::run(&icp_client(&icp)?, &csv).await?);
            Ok(())
        }
        Job::ImportUsers { csv } => {
            let icp = IcpConfig::from_env()?;
            report(jobs::import_users::run(&icp_client(&icp)?, &csv).await?);
            Ok(())
        }
        Job::ImportCosts { csv } => {
            let icp = IcpConfig::from_env()?;
            report(jobs::import_costs::run(&icp_client(&icp)?, &csv).await?);
            Ok(())
        }
        Job::SyncOrders => {
            let icp = IcpConfig::from_env()?;
            let apilo = ApiloConfig::from_env()?;
            let apilo_client = ApiClient::new(apilo.api_url(), Auth::Bearer(apilo.token.clone()))?;
            jobs::sync_orders::run(&icp_client(&icp)?, &apilo_client, &apilo).await
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    if let Err(e) = run(cli).await {
        tracing::error!("job failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}
