use std::{net::SocketAddr, sync::Arc};

use tracing::info;
use zabbix_domain_mcp::{
    build_app,
    config::Config,
    logging,
    lookup::NetworkLookup,
    zabbix::ZabbixClient,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let config = Config::from_env()?;

    let backend = Arc::new(ZabbixClient::new(&config.zabbix)?);
    let lookups = Arc::new(NetworkLookup::new(&config.lookups));
    let bind_socket = config.bind_socket()?;
    let state = AppState::new(
        config.api_token.clone(),
        config.allowed_cidr,
        backend,
        lookups,
        config.interface.clone(),
    );
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(bind_socket).await?;

    info!(
        bind_addr = %config.bind_addr,
        bind_port = config.bind_port,
        zabbix_api_url = %config.zabbix.api_url,
        "server starting"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
