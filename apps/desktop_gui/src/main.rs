mod config;
mod controller;
mod ui;

use anyhow::Context;
use eframe::egui;
use shared::error::BoardError;
use tokio::runtime::Builder;
use tracing_subscriber::EnvFilter;

use crate::controller::{
    events::{UiError, UiErrorContext},
    session::SessionController,
};
use crate::ui::BoardApp;

const APP_TITLE: &str = "Announcement Board";

fn startup() -> Result<SessionController, BoardError> {
    let config = config::load_config()?;
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| BoardError::Connection(format!("failed to build runtime: {err}")))?;
    let store = runtime.block_on(storage::open_store(&config.store_target()))?;
    SessionController::new(runtime, store, config.allowed_authors)
}

fn report_fatal(err: &BoardError) {
    let notice = UiError::from_board_error(UiErrorContext::Startup, err);
    tracing::error!(context = ?notice.context(), code = ?notice.code(), error = %notice.message(), "startup failed");
    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Error)
        .set_title(notice.title())
        .set_description(notice.message())
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let controller = match startup() {
        Ok(controller) => controller,
        Err(err) => {
            report_fatal(&err);
            return Err(err).context("announcement board could not start");
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size([760.0, 560.0])
            .with_min_inner_size([560.0, 400.0]),
        ..Default::default()
    };
    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(|_cc| Ok(Box::new(BoardApp::new(controller)))),
    )
    .map_err(|err| anyhow::anyhow!("window event loop failed: {err}"))
}
