//! Prompts sent in place of the raw user text.

use crate::project::Project;

/// User turn sent when resuming an unfinished generation.
pub const CONTINUATION_PROMPT: &str = "Continue generating the project. Please resume from where you left off and do not repeat any files or code. If all files are complete, send the FINISH action.";

/// Prompt carrying the whole current project for a follow-up instruction.
///
/// Layout: original request, new instruction, indented tree listing, then
/// one delimited block per file in path order.
pub fn project_update_prompt(original: &str, instruction: &str, project: &Project) -> String {
    let mut prompt = String::new();
    prompt.push_str("You are updating an existing project.\n\n");
    prompt.push_str("Original request:\n");
    prompt.push_str(original.trim());
    prompt.push_str("\n\nNew instruction:\n");
    prompt.push_str(instruction.trim());
    prompt.push_str("\n\nCurrent file tree:\n");
    prompt.push_str(&project.tree().render());
    prompt.push_str("\nCurrent files:\n");

    for (path, content) in project.contents() {
        prompt.push_str(&format!("--- START OF FILE: {path} ---\n"));
        prompt.push_str(content);
        if !content.ends_with('\n') {
            prompt.push('\n');
        }
        prompt.push_str(&format!("--- END OF FILE: {path} ---\n"));
    }

    prompt.push_str(
        "\nApply the new instruction. Re-send every new or changed file in full with CREATE_FILE \
         followed by APPEND_TO_FILE, leave unchanged files out, and end with FINISH.",
    );
    prompt
}
