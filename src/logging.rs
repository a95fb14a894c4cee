// src/logging.rs

use std::io::IsTerminal;
use std::sync::OnceLock;

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

static INITIALISED: OnceLock<()> = OnceLock::new();

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("ログ出力は初期化済みです")]
    AlreadyInitialised,
    #[error("ログ出力を初期化できません: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// グローバルなログ出力を設定する
///
/// 出力レベルは `RUST_LOG` で指定し、未指定なら `info`。
pub fn init() -> Result<(), LoggingError> {
    INITIALISED
        .set(())
        .map_err(|_| LoggingError::AlreadyInitialised)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);
    Registry::default().with(filter).with(fmt_layer).try_init()?;
    Ok(())
}
