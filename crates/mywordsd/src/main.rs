// # mywordsd - MyWords HTTP service
//
// The daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Registering the Supabase backend and DeepSeek oracle
// 4. Serving HTTP until SIGINT/SIGTERM
//
// ## Example
//
// ```bash
// export SUPABASE_URL=https://xyz.supabase.co
// export SUPABASE_ANON_KEY=...
// export DEEPSEEK_API_KEY=...
// export MYWORDS_STATIC_DIR=/srv/mywords/dist
//
// mywordsd
// ```

use mywordsd::Config;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum MywordsExitCode {
    CleanShutdown = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<MywordsExitCode> for ExitCode {
    fn from(code: MywordsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return MywordsExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return MywordsExitCode::ConfigError.into();
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return MywordsExitCode::ConfigError.into();
    }

    info!("Starting mywordsd");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return MywordsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = mywordsd::run(config).await {
            error!("Server error: {:#}", e);
            MywordsExitCode::RuntimeError
        } else {
            MywordsExitCode::CleanShutdown
        }
    });

    result.into()
}
