use crate::models::Question;

/// Reserved command tokens use a short prefix so they stay easy to print and
/// scan. Matching is case-insensitive.
pub const COMMAND_PREFIX: &str = "c:";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QrCommand {
    Restart,
    OpenHelp,
    CloseHelp,
    StartRound,
}

impl QrCommand {
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "c:r" => Some(QrCommand::Restart),
            "c:i" => Some(QrCommand::OpenHelp),
            "c:c" => Some(QrCommand::CloseHelp),
            "c:s" => Some(QrCommand::StartRound),
            _ => None,
        }
    }

    /// Phone-facing description of what the code does.
    pub fn message(&self) -> &'static str {
        match self {
            QrCommand::Restart => "Restart Quiz",
            QrCommand::OpenHelp => "Open Help Menu",
            QrCommand::CloseHelp => "Close Help Menu",
            QrCommand::StartRound => "Start Quiz",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanAction {
    Command(QrCommand),
    /// Resolved full option id of the current question.
    Answer(String),
    /// Carried the command prefix but matched no known command. Consumed so
    /// it is never mistaken for an answer.
    UnknownCommand(String),
    Ignored,
}

/// Classifies a scan token in priority order: reserved command, exact option
/// id, bare letter suffix, noise.
pub fn classify(token: &str, current_question: Option<&Question>) -> ScanAction {
    let token = token.trim();

    if token.to_ascii_lowercase().starts_with(COMMAND_PREFIX) {
        return match QrCommand::parse(token) {
            Some(command) => ScanAction::Command(command),
            None => {
                log::debug!("Unknown command token: {}", token);
                ScanAction::UnknownCommand(token.to_string())
            }
        };
    }

    if let Some(question) = current_question {
        if question.option(token).is_some() {
            return ScanAction::Answer(token.to_string());
        }
        // Phone cameras transmit only the printed letter
        if let Some(option) = question.option_for_letter(token) {
            return ScanAction::Answer(option.id.clone());
        }
    }

    log::debug!("Ignoring unrecognized scan token: {}", token);
    ScanAction::Ignored
}

/// Human-readable description of a scanned code, shown on the phone after the
/// callout.
pub fn scan_message(token: &str) -> String {
    let token = token.trim();

    if token.to_ascii_lowercase().starts_with(COMMAND_PREFIX) {
        return match QrCommand::parse(token) {
            Some(command) => command.message().to_string(),
            None => format!("Unknown command: {}", token),
        };
    }

    // For full option ids show just the printed letter
    let letter = token.rsplit('_').next().unwrap_or(token);
    format!("Pick {}", letter.to_ascii_uppercase())
}
