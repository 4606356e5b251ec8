use clap::Parser;
use mcp_for_azure_devops_repos::azure::client::AzureDevOpsClient;
use mcp_for_azure_devops_repos::config::Config;
use mcp_for_azure_devops_repos::mcp::server::AdoMcpServer;
use mcp_for_azure_devops_repos::server::http;
use rmcp::ServiceExt;
use rmcp::transport::stdio;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run as a streamable-HTTP server instead of stdio
    #[arg(long)]
    server: bool,

    /// Port to run the server on
    #[arg(long, default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = Config::from_env()?;
    let client = AzureDevOpsClient::new(config);
    let mcp_server = AdoMcpServer::new(client);

    if args.server {
        log::info!("Starting web server on port {}", args.port);
        http::run_server(mcp_server, args.port).await?;
    } else {
        log::info!("Starting stdio server");
        let service = mcp_server.serve(stdio()).await?;
        service.waiting().await?;
    }

    Ok(())
}
