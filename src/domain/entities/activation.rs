//! Action activation - how an Action decides it is eligible for a turn

/// Chat mode supplied by the surrounding host; selects which of an
/// Action's two activation rules applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatMode {
    Normal,
    Focus,
}

impl ChatMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatMode::Normal => "normal",
            ChatMode::Focus => "focus",
        }
    }
}

/// Activation rule for an Action. Exactly one rule is active per chat mode.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivationRule {
    /// Always eligible.
    Always,
    /// Eligible when any keyword occurs in the input text.
    Keyword {
        keywords: Vec<String>,
        case_sensitive: bool,
    },
    /// Eligible with independent probability per evaluation.
    Random { probability: f64 },
    /// Eligibility delegated to an external judge collaborator.
    Judge { prompt: String },
}

impl ActivationRule {
    pub fn keywords(keywords: Vec<String>, case_sensitive: bool) -> Self {
        ActivationRule::Keyword {
            keywords,
            case_sensitive,
        }
    }

    pub fn random(probability: f64) -> Self {
        ActivationRule::Random { probability }
    }

    pub fn judge(prompt: impl Into<String>) -> Self {
        ActivationRule::Judge {
            prompt: prompt.into(),
        }
    }
}
