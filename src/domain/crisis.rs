use crate::error::{AppError, AppResult};

/// Free-text description of the incident, as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrisisDescription(String);

impl CrisisDescription {
    pub fn parse(input: impl Into<String>) -> AppResult<Self> {
        let input = input.into();
        if input.trim().is_empty() {
            return Err(AppError::Validation(
                "Please enter a crisis scenario.".to_string(),
            ));
        }
        Ok(Self(input))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_descriptions() {
        for input in ["", "   ", "\n\t  \r\n"] {
            let err = CrisisDescription::parse(input).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "accepted {input:?}");
        }
    }

    #[test]
    fn keeps_text_verbatim() {
        let description = CrisisDescription::parse("  Kia recalls 80,000 vehicles\n").unwrap();
        assert_eq!(description.as_str(), "  Kia recalls 80,000 vehicles\n");
    }
}
