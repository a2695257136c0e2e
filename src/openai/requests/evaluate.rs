use super::Exchange;
use crate::openai::requests::generate::Module;
use serde::Deserialize;
use serde_json::{json, Value};
use std::borrow::Cow;

const INSTRUCTIONS: &str = "You are a language tutor grading a learner's \
answers to a practice module. For every exercise give a score from 0 to 100 \
and one sentence of feedback; judge meaning, not spelling or punctuation. \
For every set give the average score and a short summary. For the module as \
a whole give an overall score, a short summary, and the rules the learner \
should remember, each as one short imperative sentence. Keep the sets and \
exercises in the order they were answered.";

/// Scored feedback for one exercise.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ItemEvaluation {
    pub score: u8,
    pub feedback: String,
}

/// Scored feedback for one exercise set.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SetEvaluation {
    pub average_score: f64,
    pub feedback: String,
    pub items: Vec<ItemEvaluation>,
}

/// Scored feedback mirroring the module that was answered.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ModuleEvaluation {
    pub sets: Vec<SetEvaluation>,
    pub score: f64,
    pub feedback: String,
    pub remembered_rules: Vec<String>,
}

/// Request to grade a module's collected answers.
///
/// Owns the module so the answered exercises and the returned scores can be
/// shown side by side after the exchange.
#[derive(Debug, Clone)]
pub struct EvaluateModule {
    pub module: Module,
    pub answers: Vec<Vec<String>>,
}

impl EvaluateModule {
    /// Pair a module with the learner's answers, one per exercise in
    /// module order.
    pub fn new(module: Module, answers: Vec<Vec<String>>) -> Self {
        EvaluateModule { module, answers }
    }
}

impl Exchange for EvaluateModule {
    type Response = ModuleEvaluation;

    const SHAPE: &'static str = "module_evaluation";

    fn instructions(&self) -> Cow<'_, str> {
        INSTRUCTIONS.into()
    }

    fn payload(&self) -> String {
        let sets: Vec<Value> = self
            .module
            .sets
            .iter()
            .zip(&self.answers)
            .map(|(set, answers)| {
                let items: Vec<Value> = set
                    .items
                    .iter()
                    .zip(answers)
                    .map(|(item, answer)| {
                        json!({
                            "prompt": item.prompt,
                            "expected_answer": item.answer,
                            "learner_answer": answer,
                        })
                    })
                    .collect();

                json!({ "instructions": set.instructions, "items": items })
            })
            .collect();

        json!({ "sets": sets }).to_string()
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
                            "average_score": { "type": "number" },
                            "feedback": { "type": "string" },
                            "items": {
                                "type": "array",
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "score": { "type": "integer" },
                                        "feedback": { "type": "string" }
                                    },
                                    "required": ["score", "feedback"],
                                    "additionalProperties": false
                                }
                            }
                        },
                        "required": ["average_score", "feedback", "items"],
                        "additionalProperties": false
                    }
                },
                "score": { "type": "number" },
                "feedback": { "type": "string" },
                "remembered_rules": {
                    "type": "array",
                    "items": { "type": "string" }
                }
            },
            "required": ["sets", "score", "feedback", "remembered_rules"],
            "additionalProperties": false
        })
    }

    fn validate(&self, evaluation: &ModuleEvaluation) -> Result<(), String> {
        if evaluation.sets.len() != self.module.sets.len() {
            return Err(format!(
                "evaluation has {} sets, the module has {}",
                evaluation.sets.len(),
                self.module.sets.len()
            ));
        }

        for (set, scored) in self.module.sets.iter().zip(&evaluation.sets) {
            if scored.items.len() != set.items.len() {
                return Err(format!(
                    "an evaluated set has {} items, the module set has {}",
                    scored.items.len(),
                    set.items.len()
                ));
            }

            if let Some(item) = scored.items.iter().find(|item| item.score > 100) {
                return Err(format!("an exercise score of {} is out of range", item.score));
            }
        }

        Ok(())
    }
}
