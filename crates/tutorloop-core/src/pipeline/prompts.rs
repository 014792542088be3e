//! Prompt templates for the pipeline's generation calls

use super::Evaluation;

/// Marker the evaluator emits when a solution needs review
pub const REVIEW_MARKER: &str = "HUMAN_FEEDBACK_NEEDED";

/// Marker the evaluator emits when a solution is accepted
pub const APPROVED_MARKER: &str = "APPROVED:";

/// Score both axes must reach to be approved
pub const APPROVAL_BAR: u8 = 8;

pub fn solution_prompt(question: &str, source_label: &str, context: &str) -> String {
    format!(
        "Create a step-by-step solution. If information is incomplete, be honest about limitations.\n\
         STUDENT'S QUESTION: {question}\n\
         SOURCE: {source_label}\n\
         CONTEXT: {context}\n\
         \n\
         IMPORTANT: Provide a clear, step-by-step mathematical solution.\n\
         Your solution must be accurate, educational, and honest about knowledge limits.\n"
    )
}

pub fn evaluation_prompt(question: &str, solution: &str) -> String {
    format!(
        "Evaluate this solution for the question: '{question}'.\n\
         Score it from 1-10 on Accuracy and 1-10 on Clarity.\n\
         If both scores are {bar} or above, respond with \"{APPROVED_MARKER} [solution]\".\n\
         If any score is below {bar}, respond with exactly this phrase:\n\
         '{REVIEW_MARKER}: Accuracy Score: [score], Clarity Score: [score]. Reason: [brief reason]'.\n\
         \n\
         SOLUTION TO EVALUATE: {solution}\n",
        bar = APPROVAL_BAR,
    )
}

pub fn correction_prompt(question: &str, review: &Evaluation) -> String {
    format!(
        "As a math professor, provide an EXCELLENT answer to this student question.\n\
         \n\
         QUESTION: {question}\n\
         \n\
         The previous AI attempt received low scores:\n\
         - Accuracy: {accuracy}/10\n\
         - Clarity: {clarity}/10\n\
         - Issues: {reason}\n\
         \n\
         Please provide a comprehensive, accurate, and clear step-by-step solution.\n\
         Be educational and thorough.\n",
        accuracy = review.accuracy,
        clarity = review.clarity,
        reason = review.reason,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solution_prompt_interpolates() {
        let prompt = solution_prompt("Solve x+1=2", "Knowledge Base", "ctx");
        assert!(prompt.contains("STUDENT'S QUESTION: Solve x+1=2"));
        assert!(prompt.contains("SOURCE: Knowledge Base"));
        assert!(prompt.contains("CONTEXT: ctx"));
    }

    #[test]
    fn test_evaluation_prompt_names_markers() {
        let prompt = evaluation_prompt("q", "s");
        assert!(prompt.contains("HUMAN_FEEDBACK_NEEDED: Accuracy Score"));
        assert!(prompt.contains("\"APPROVED: [solution]\""));
        assert!(prompt.contains("8 or above"));
    }

    #[test]
    fn test_correction_prompt_carries_scores() {
        let review = Evaluation {
            accuracy: 4,
            clarity: 7,
            reason: "skipped a step".to_string(),
        };
        let prompt = correction_prompt("q", &review);
        assert!(prompt.contains("- Accuracy: 4/10"));
        assert!(prompt.contains("- Clarity: 7/10"));
        assert!(prompt.contains("- Issues: skipped a step"));
    }
}
