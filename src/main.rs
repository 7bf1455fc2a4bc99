use inquiry_relay::{
    configuration::get_configuration,
    startup::Application,
    telemetry::{get_subscriber, init_subscriber},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("inquiry-relay".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber)?;

    let config = get_configuration().inspect_err(|e| {
        tracing::error!(
            error.cause_chain = ?e,
            error.message = %e,
            "Failed to read configuration"
        )
    })?;

    let app = Application::build(config).await.inspect_err(|e| {
        tracing::error!(
            error.cause_chain = ?e,
            error.message = %e,
            "Failed to build the application"
        )
    })?;
    tracing::info!("Backend running on port {}", app.get_port());

    app.run_until_stopped().await?;
    tracing::info!("API has exited");

    Ok(())
}
