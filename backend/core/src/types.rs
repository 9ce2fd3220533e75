use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// Accepted range for `max_new_tokens`.
pub const MAX_NEW_TOKENS_RANGE: RangeInclusive<u32> = 10..=1024;

/// Accepted range for `temperature`.
pub const TEMPERATURE_RANGE: RangeInclusive<f32> = 0.1..=2.5;

pub const DEFAULT_MAX_NEW_TOKENS: u32 = 400;
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Generation controls sent with every request.
///
/// Values are only reachable through the validating constructor and setters,
/// so a `GenerationParameters` is always in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationParameters {
    max_new_tokens: u32,
    temperature: f32,
    return_full_text: bool,
}

impl GenerationParameters {
    pub fn new(max_new_tokens: u32, temperature: f32) -> Result<Self, ChatError> {
        check_max_new_tokens(max_new_tokens)?;
        check_temperature(temperature)?;
        Ok(Self {
            max_new_tokens,
            temperature,
            return_full_text: false,
        })
    }

    pub fn max_new_tokens(&self) -> u32 {
        self.max_new_tokens
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn return_full_text(&self) -> bool {
        self.return_full_text
    }

    pub fn set_max_new_tokens(&mut self, value: u32) -> Result<(), ChatError> {
        check_max_new_tokens(value)?;
        self.max_new_tokens = value;
        Ok(())
    }

    pub fn set_temperature(&mut self, value: f32) -> Result<(), ChatError> {
        check_temperature(value)?;
        self.temperature = value;
        Ok(())
    }
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            return_full_text: false,
        }
    }
}

fn check_max_new_tokens(value: u32) -> Result<(), ChatError> {
    if MAX_NEW_TOKENS_RANGE.contains(&value) {
        Ok(())
    } else {
        Err(ChatError::InvalidParameter(format!(
            "max_new_tokens must be between {} and {}, got {value}",
            MAX_NEW_TOKENS_RANGE.start(),
            MAX_NEW_TOKENS_RANGE.end()
        )))
    }
}

fn check_temperature(value: f32) -> Result<(), ChatError> {
    if TEMPERATURE_RANGE.contains(&value) {
        Ok(())
    } else {
        Err(ChatError::InvalidParameter(format!(
            "temperature must be between {} and {}, got {value}",
            TEMPERATURE_RANGE.start(),
            TEMPERATURE_RANGE.end()
        )))
    }
}

/// Body posted to the inference endpoint for one submission.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub inputs: String,
    pub parameters: GenerationParameters,
}

impl GenerationRequest {
    pub fn new(inputs: impl Into<String>, parameters: GenerationParameters) -> Self {
        Self {
            inputs: inputs.into(),
            parameters,
        }
    }
}

/// One completed exchange in the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub user_text: String,
    pub model_text: String,
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(user_text: impl Into<String>, model_text: impl Into<String>) -> Self {
        Self {
            user_text: user_text.into(),
            model_text: model_text.into(),
            created_at: Utc::now(),
        }
    }
}
