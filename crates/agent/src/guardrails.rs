use shopsense_core::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardrailDecision {
    Allow,
    Deny { reason_code: &'static str, user_message: String, error: DomainError },
}

impl GuardrailDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    pub fn into_result(self) -> Result<(), DomainError> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny { error, .. } => Err(error),
        }
    }
}

/// Checks run on shopper input before it reaches the router. Without a
/// length cap only empty input is refused.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputGuard {
    pub max_message_chars: Option<usize>,
}

impl InputGuard {
    pub fn new(max_message_chars: Option<usize>) -> Self {
        Self { max_message_chars }
    }

    pub fn evaluate(&self, text: &str) -> GuardrailDecision {
        if text.trim().is_empty() {
            return GuardrailDecision::Deny {
                reason_code: "empty_message",
                user_message: "Type a question about products, prices, or your cart.".to_string(),
                error: DomainError::EmptyMessage,
            };
        }

        let Some(max) = self.max_message_chars else {
            return GuardrailDecision::Allow;
        };
        let actual = text.chars().count();
        if actual > max {
            return GuardrailDecision::Deny {
                reason_code: "message_too_long",
                user_message: format!(
                    "That message is too long. Please keep it under {max} characters."
                ),
                error: DomainError::MessageTooLong { max, actual },
            };
        }

        GuardrailDecision::Allow
    }
}
