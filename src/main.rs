use homework_bot::{Config, HomeworkPoller, PracticumClient, TelegramBot, run_with_shutdown};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stdout)
        .with_target(false)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "startup aborted: environment is incomplete");
            return ExitCode::FAILURE;
        }
    };

    let api = match PracticumClient::new(&config) {
        Ok(api) => api,
        Err(e) => {
            tracing::error!(error = %e, "startup aborted");
            return ExitCode::FAILURE;
        }
    };
    let bot = match TelegramBot::new(&config) {
        Ok(bot) => bot,
        Err(e) => {
            tracing::error!(error = %e, "startup aborted");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        endpoint = api.endpoint(),
        chat_id = %config.credentials.telegram_chat_id,
        interval_secs = config.retry_interval.as_secs(),
        "starting homework bot"
    );

    run_with_shutdown(HomeworkPoller::new(api, bot, &config)).await;
    ExitCode::SUCCESS
}
