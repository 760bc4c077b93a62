//! Instruction templates sent to the language model.

const ANALYSIS_INSTRUCTIONS: &str = "You are an expert AI legal consultant. Review this legal document and perform the following:
1. **Summary**: Provide a concise summary of the document's purpose and key points in 2-3 sentences.
2. **Issues**: Identify any ambiguous, biased, or unclear clauses. List them under 'Issues:'.
Use this exact structure for your response:
Summary:
[Your summary here]

Issues:
- [Issue 1]
- [Issue 2]
Text to analyze:

";

#[must_use]
pub fn analysis_prompt(text: &str) -> String {
    format!("{ANALYSIS_INSTRUCTIONS}{text}")
}

/// Prompt for revising one paragraph-aligned chunk.
#[must_use]
pub fn chunk_prompt(chunk: &str, issues: &[String]) -> String {
    revision_prompt("Revise this legal text chunk", chunk, issues)
}

/// Prompt for revising a whole document in one call.
#[must_use]
pub fn document_prompt(text: &str, issues: &[String]) -> String {
    revision_prompt("Revise this legal text", text, issues)
}

fn revision_prompt(lead: &str, text: &str, issues: &[String]) -> String {
    let listed = issues
        .iter()
        .map(|issue| format!("- {issue}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "{lead} to address the listed issues with clarity, fairness, and precision:\nIssues:\n{listed}\n\nText:\n{text}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_prompt_ends_with_text() {
        let prompt = analysis_prompt("The lessee shall...");
        assert!(prompt.starts_with("You are an expert AI legal consultant."));
        assert!(prompt.contains("Summary:\n[Your summary here]\n\nIssues:\n"));
        assert!(prompt.ends_with("Text to analyze:\n\nThe lessee shall..."));
    }

    #[test]
    fn chunk_prompt_lists_issues_in_order() {
        let issues = vec!["Vague term".to_owned(), "One-sided penalty".to_owned()];
        let prompt = chunk_prompt("Clause 7.", &issues);
        assert_eq!(
            prompt,
            "Revise this legal text chunk to address the listed issues with clarity, fairness, and precision:\n\
             Issues:\n- Vague term\n- One-sided penalty\n\nText:\nClause 7."
        );
    }

    #[test]
    fn document_prompt_uses_whole_text_lead() {
        let prompt = document_prompt("Body", &["X".to_owned()]);
        assert!(prompt.starts_with("Revise this legal text to address"));
        assert!(prompt.ends_with("\n\nText:\nBody"));
    }
}
