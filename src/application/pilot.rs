//! Scripted driver for exercising an [`App`] in tests and demos.

use tracing::instrument;

use crate::application::app::App;
use crate::application::error::ApplicationResult;
use crate::config::Settings;

/// Drives an app the way a user would, waiting for each step to settle.
#[derive(Debug, Clone)]
pub struct Pilot {
    app: App,
}

impl Pilot {
    pub fn new(app: App) -> Self {
        Self { app }
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    /// Presses each key in turn, waiting until it has been handled.
    #[instrument(level = "debug", skip(self))]
    pub async fn press(&self, keys: &[&str]) -> ApplicationResult<()> {
        for key in keys {
            self.app.press(key).await?;
        }
        Ok(())
    }

    /// Waits until all queued work has been applied.
    pub async fn pause(&self) -> ApplicationResult<()> {
        self.app.settle().await
    }

    pub async fn exit(self) -> ApplicationResult<()> {
        self.app.shutdown().await
    }
}

impl App {
    /// Starts an app with default settings and wraps it in a [`Pilot`].
    pub fn run_test() -> Pilot {
        Self::run_test_with(Settings::default())
    }

    pub fn run_test_with(settings: Settings) -> Pilot {
        Pilot::new(App::start(settings))
    }
}
