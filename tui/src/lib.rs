pub mod app;
pub mod form;

use anyhow::Result;
use slidegen_common::DeckConfig;

pub use app::*;
pub use form::*;

/// Run the interactive generation form until the user quits.
pub async fn run_interactive(config: DeckConfig) -> Result<()> {
    let mut app = InteractiveApp::new(config);
    app.run().await
}
