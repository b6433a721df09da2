// Entrypoint for the CLI application.
// - Keeps `main` small: create an API client and dispatch to the UI.
// - Returns `anyhow::Result` so every failure exits non-zero with a
//   diagnostic.

use plantdiag_cli::{api::ApiClient, ui};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    // Endpoint and token come from the environment (HF_INFERENCE_URL,
    // HF_API_TOKEN) with defaults. See `api::ApiClient::from_env`.
    let api = ApiClient::from_env()?;

    // One-shot mode: an image path argument runs a single classify and
    // exits. Without it, start the interactive menu.
    if let Some(path) = std::env::args().nth(1) {
        return ui::classify_and_print(&api, &PathBuf::from(path));
    }
    ui::main_menu(api)
}
