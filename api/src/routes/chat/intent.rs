//! Closed intent dispatch for the patient chat.
//!
//! Every incoming message is classified into exactly one variant, and the
//! chat route dispatches on the enum. Classification is deterministic
//! keyword matching; anything unrecognized falls through to `Answer`, so
//! the chat never blocks on a clarification turn.

/// What the patient is asking the assistant to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Process an attached report through the document pipeline.
    ProcessUpload,
    /// Show the recorded embryology summary card.
    ShowResult,
    /// Upcoming appointment card.
    Appointments,
    /// Current treatment plan card.
    Treatments,
    /// Question about the patient's own results (RAG with patient nudge).
    ResultsQa,
    /// General question (RAG over the precedence chain).
    Answer,
}

/// Classifies a chat message.
pub fn classify(message: &str) -> Intent {
    let m = message.to_lowercase();

    if m.contains("attach") || (m.contains("process") && (m.contains("upload") || m.contains("report"))) {
        return Intent::ProcessUpload;
    }
    if m.contains("show") && m.contains("result") {
        return Intent::ShowResult;
    }
    if m.contains("appointment") {
        return Intent::Appointments;
    }
    if m.contains("treatment") || m.contains("regimen") {
        return Intent::Treatments;
    }
    if m.contains("my result") || m.contains("my results") || m.contains("my embryo") {
        return Intent::ResultsQa;
    }
    Intent::Answer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quick_action_messages_route_as_expected() {
        assert_eq!(classify("show my embryology result"), Intent::ShowResult);
        assert_eq!(classify("clinic policy information"), Intent::Answer);
        assert_eq!(
            classify("ask about my results: how many good embryos on day 5?"),
            Intent::ResultsQa
        );
        assert_eq!(classify("when is my next appointment?"), Intent::Appointments);
        assert_eq!(classify("what treatment am I on?"), Intent::Treatments);
    }

    #[test]
    fn upload_phrasings() {
        assert_eq!(classify("please process my upload now"), Intent::ProcessUpload);
        assert_eq!(classify("I attached a new report"), Intent::ProcessUpload);
    }

    #[test]
    fn unknown_falls_back_to_answer() {
        assert_eq!(classify("what is the cancellation policy?"), Intent::Answer);
        assert_eq!(classify(""), Intent::Answer);
    }
}
