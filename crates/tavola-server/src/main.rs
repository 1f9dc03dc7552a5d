use tavola_server::config::Config;

#[tokio::main]
async fn main() {
    tavola_server::init_tracing();

    let config = Config::from_env();
    if let Err(err) = tavola_server::start_server(config).await {
        tracing::error!(error = %err, "server exited with error");
        std::process::exit(1);
    }
}
