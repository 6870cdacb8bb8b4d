use std::process::ExitCode;

use cryptogram_demo::{ClientConfig, Session, TerminalView, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let config = match ClientConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        endpoint = %config.endpoint,
        bits = config.key_size_bits,
        "starting cryptogram demo"
    );
    if config.key_size_bits < 2048 {
        tracing::warn!("{}-bit RSA is not secure for new systems", config.key_size_bits);
    }

    let mut session = match Session::new(config, TerminalView::stdout()) {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    // The session already warned about a failed exchange and rendered it
    // inline; only a fatal key generation error is reported here.
    match session.load().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            if e.is_fatal() {
                tracing::error!("{}", e);
            }
            ExitCode::FAILURE
        }
    }
}
