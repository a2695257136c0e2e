use super::Exchange;
use crate::vocab::Proficiency;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::borrow::Cow;

const INSTRUCTIONS: &str = "You are a language tutor preparing a practice \
module on the learner's topic. Produce two or three exercise sets, each with \
a one-sentence instruction and three to five exercises. Every exercise is a \
prompt the learner answers with a short free-text response, together with the \
single expected answer. Do not number the prompts; the client numbers them. \
Where it feels natural, work the suggested vocabulary into the prompts.";

/// One prompt/answer exercise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub prompt: String,
    pub answer: String,
}

/// An ordered group of exercises sharing one instruction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExerciseSet {
    pub instructions: String,
    pub items: Vec<Exercise>,
}

/// The exercise sets generated for one topic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Module {
    pub sets: Vec<ExerciseSet>,
}

impl Module {
    /// Total number of exercises across all sets.
    pub fn item_count(&self) -> usize {
        self.sets.iter().map(|set| set.items.len()).sum()
    }
}

/// Request for a fresh module on a topic.
#[derive(Debug, Clone)]
pub struct GenerateModule {
    pub topic: String,
    pub proficiency: Proficiency,
    pub vocabulary: Vec<&'static str>,
}

impl Exchange for GenerateModule {
    type Response = Module;

    const SHAPE: &'static str = "module";

    fn instructions(&self) -> Cow<'_, str> {
        INSTRUCTIONS.into()
    }

    fn payload(&self) -> String {
        format!(
            "Topic: {}\nLearner level: {}\nSuggested vocabulary: {}",
            self.topic,
            self.proficiency,
            self.vocabulary.join(", ")
        )
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "sets": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "instructions": { "type": "string" },
                            "items": {
                                "type": "array",
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "prompt": { "type": "string" },
                                        "answer": { "type": "string" }
                                    },
                                    "required": ["prompt", "answer"],
                                    "additionalProperties": false
                                }
                            }
                        },
                        "required": ["instructions", "items"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["sets"],
            "additionalProperties": false
        })
    }

    fn validate(&self, module: &Module) -> Result<(), String> {
        for set in &module.sets {
            for item in &set.items {
                if item.prompt.trim().is_empty() {
                    return Err("a generated exercise has an empty prompt".into());
                }
            }
        }

        Ok(())
    }
}
