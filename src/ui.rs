// UI layer: the one-shot print sequence and a simple interactive menu
// using `dialoguer`. The functions are small and synchronous to make the
// flow easy to follow.

use crate::api::{persist_token, ApiClient, InferenceResponse};
use anyhow::Result;
use dialoguer::{Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Run a single classification and print the raw result: the numeric
/// status code on one line, the JSON-decoded body on the next. The
/// status line is printed before the body is decoded, so a non-JSON
/// body still shows the status before the decode failure propagates.
pub fn classify_and_print(api: &ApiClient, image_path: &Path) -> Result<()> {
    let resp = api.classify(image_path)?;
    println!("{}", resp.status().as_u16());
    println!("{}", resp.json()?);
    Ok(())
}

/// Main interactive menu. Receives an `ApiClient` instance and runs a
/// simple select loop until the user chooses "Exit".
///
/// Note: `Select::interact()` is keyboard-driven: you can use arrow keys
/// and Enter to choose an option.
pub fn main_menu(mut api: ApiClient) -> Result<()> {
    loop {
        let items = vec!["Classify image", "Save API token", "Exit"];
        // `Select` shows a keyboard-navigable list in the terminal.
        let selection = Select::new().items(&items).default(0).interact()?;
        match selection {
            0 => {
                handle_classify(&api)?;
            }
            1 => {
                // `Password` hides the token while typing. Persist it to
                // disk so future runs pick it up without the env var.
                let token: String = Password::new().with_prompt("API token").interact()?;
                api.set_token(&token);
                persist_token(&token)?;
                println!("Token saved.");
            }
            2 => break,
            _ => {}
        }
    }
    Ok(())
}

/// Prompt for an image path, run the request behind a spinner and report
/// the outcome. Failures are printed, not propagated, so the menu stays
/// usable after a bad path or a network error.
fn handle_classify(api: &ApiClient) -> Result<()> {
    let path: String = Input::new()
        .with_prompt("Image file path")
        .default("th.jpg".into())
        .interact_text()?;
    let pb = PathBuf::from(path);

    // indicatif spinner while the blocking request is in flight.
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    spinner.set_message("Classifying...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let outcome = api.classify(&pb);
    spinner.finish_and_clear();

    match outcome {
        Ok(resp) => print_outcome(&resp),
        Err(e) => println!("Classification failed: {}", e),
    }
    Ok(())
}

fn print_outcome(resp: &InferenceResponse) {
    println!("{}", resp.status().as_u16());
    match resp.json() {
        Ok(body) => {
            println!("{}", body);
            // Friendly summary when the body is a classification list.
            if let Some(top) = resp.predictions().and_then(|p| p.into_iter().next()) {
                println!("Top prediction: {} ({:.1}%)", top.label, top.score * 100.0);
            }
        }
        Err(e) => println!("Response was not valid JSON: {}", e),
    }
}
