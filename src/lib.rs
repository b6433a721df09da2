// Library root
// -----------
// This crate exposes a small library surface for the CLI. The binary
// (`main.rs`) uses these modules to implement the client.
//
// Module responsibilities:
// - `api`: Encapsulates the HTTP interaction with the hosted inference
//   endpoint (one binary POST per classification) and token persistence
//   helpers.
// - `ui`: Implements the one-shot print sequence and the terminal-based
//   interactive menu, delegating requests to `api`.
//
// Keeping this separation makes it easier to test the API logic or
// replace the UI in the future (for example, adding a TUI or GUI).
pub mod api;
pub mod ui;
