use std::path::Path;

use dialoguer::{Confirm, Input};

use crate::error::Result;

/// `y`/`n` in any case, surrounding whitespace ignored.
pub fn parse_choice(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" => Some(true),
        "n" => Some(false),
        _ => None,
    }
}

/// Asks the operator twice before any team is changed. The first prompt
/// repeats until `y` or `n` is typed; both must be answered yes.
pub fn confirm_run(preview: &Path) -> Result<bool> {
    println!(
        "\n'{}' has been written outlining the team -> namespace mapping.\nPlease review before proceeding.\n",
        preview.display()
    );

    let choice: String = Input::new()
        .with_prompt("Would you like to proceed with execution? Y or N")
        .default("N".to_string())
        .validate_with(|input: &String| -> std::result::Result<(), &'static str> {
            parse_choice(input)
                .map(|_| ())
                .ok_or("Invalid choice. Please enter Y or N.")
        })
        .interact_text()?;

    if parse_choice(&choice) != Some(true) {
        return Ok(false);
    }

    Ok(Confirm::new()
        .with_prompt("Are you SURE you want to proceed?")
        .default(false)
        .wait_for_newline(true)
        .interact()?)
}
