//! The interactive exercise loop.
//!
//! Prompts for a topic, walks the learner through the generated module,
//! has the answers evaluated, and loops on the post-evaluation menu. All
//! remote work goes through the [`Tutor`] seam; this module only reads
//! lines, prints results, and decides what happens next.

use std::io::{self, BufRead, Write};

use colored::{ColoredString, Colorize};
use log::{debug, info};

use crate::errors::DrillError;
use crate::openai::requests::evaluate::{EvaluateModule, ModuleEvaluation};
use crate::openai::requests::generate::{GenerateModule, Module};
use crate::openai::Client;
use crate::terminal::SessionController;
use crate::vocab::{self, Proficiency};

/// What the learner picked on the post-evaluation menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    RepeatTopic,
    NewTopic,
    Exit,
}

/// Parse one menu line. Exactly `1`, `2` or `3` after trimming; anything
/// else is rejected and the menu is shown again.
pub fn parse_menu_choice(line: &str) -> Option<MenuChoice> {
    match line.trim() {
        "1" => Some(MenuChoice::RepeatTopic),
        "2" => Some(MenuChoice::NewTopic),
        "3" => Some(MenuChoice::Exit),
        _ => None,
    }
}

/// The two exchanges the loop needs, behind a seam so tests can drive the
/// flow with a scripted tutor.
pub(crate) trait Tutor {
    async fn generate(&mut self, request: GenerateModule) -> Result<Module, DrillError>;

    async fn evaluate(&mut self, request: &EvaluateModule)
        -> Result<ModuleEvaluation, DrillError>;
}

/// Production tutor: the exchange client wrapped in the session controller.
pub struct RemoteTutor {
    client: Client,
    session: SessionController,
}

impl RemoteTutor {
    pub fn new(client: Client, session: SessionController) -> Self {
        RemoteTutor { client, session }
    }
}

impl Tutor for RemoteTutor {
    async fn generate(&mut self, request: GenerateModule) -> Result<Module, DrillError> {
        self.session.run_with_indicator(self.client.send(request)).await
    }

    async fn evaluate(
        &mut self,
        request: &EvaluateModule,
    ) -> Result<ModuleEvaluation, DrillError> {
        self.session.run_with_indicator(self.client.send(request)).await
    }
}

/// One learner session over a line-based input and a sink for everything
/// the session prints.
pub struct ExerciseFlow<R, W> {
    input: R,
    output: W,
    topic_override: Option<String>,
    proficiency: Proficiency,
}

impl<R: BufRead, W: Write> ExerciseFlow<R, W> {
    /// `topic_override` is the topic given on the command line, consumed
    /// by the first round instead of prompting.
    pub fn new(
        input: R,
        output: W,
        topic_override: Option<String>,
        proficiency: Proficiency,
    ) -> Self {
        ExerciseFlow { input, output, topic_override, proficiency }
    }

    /// Run rounds until the learner exits or input ends.
    pub async fn run<T: Tutor>(&mut self, tutor: &mut T) -> io::Result<()> {
        loop {
            let Some(topic) = self.next_topic()? else {
                break;
            };

            let request = GenerateModule {
                topic: topic.clone(),
                proficiency: self.proficiency,
                vocabulary: vocab::sample(self.proficiency, vocab::DEFAULT_SAMPLE_SIZE),
            };

            let module = match tutor.generate(request).await {
                Ok(module) => module,
                Err(error) => {
                    writeln!(self.output, "{}", error.to_string().red())?;
                    writeln!(
                        self.output,
                        "No exercises were generated. Try again, or try a different topic."
                    )?;
                    continue;
                }
            };
            info!("generated {} exercises for \"{}\"", module.item_count(), topic);

            let answers = self.collect_answers(&module)?;
            let request = EvaluateModule::new(module, answers);

            match tutor.evaluate(&request).await {
                Ok(evaluation) => self.show_evaluation(&request, &evaluation)?,
                Err(error) => {
                    writeln!(self.output, "{}", error.to_string().red())?;
                    writeln!(
                        self.output,
                        "Your answers were not evaluated. Try the topic again."
                    )?;
                    continue;
                }
            }

            match self.menu_choice()? {
                Some(MenuChoice::RepeatTopic) => {
                    self.topic_override = Some(topic);
                }
                Some(MenuChoice::NewTopic) => {}
                Some(MenuChoice::Exit) | None => break,
            }
        }

        Ok(())
    }

    /// Next topic to practice: the pending override if there is one,
    /// otherwise prompt until a non-empty line or end of input.
    fn next_topic(&mut self) -> io::Result<Option<String>> {
        if let Some(topic) = self.topic_override.take() {
            debug!("using provided topic: {}", topic);
            return Ok(Some(topic));
        }

        loop {
            writeln!(self.output)?;
            write!(
                self.output,
                "{} ",
                "Topic to practice (e.g. past tense):".bold().white()
            )?;
            self.output.flush()?;

            match self.read_line()? {
                None => return Ok(None),
                Some(line) if line.is_empty() => continue,
                Some(line) => return Ok(Some(line)),
            }
        }
    }

    /// Present every exercise in module order and collect one answer per
    /// exercise. End of input counts as an empty answer.
    fn collect_answers(&mut self, module: &Module) -> io::Result<Vec<Vec<String>>> {
        let mut answers = Vec::with_capacity(module.sets.len());

        for (index, set) in module.sets.iter().enumerate() {
            writeln!(self.output)?;
            writeln!(
                self.output,
                "{} {}",
                format!("Set {}:", index + 1).bold().white(),
                set.instructions
            )?;

            let mut set_answers = Vec::with_capacity(set.items.len());
            for (number, item) in set.items.iter().enumerate() {
                writeln!(self.output, "  {}. {}", number + 1, item.prompt)?;
                write!(self.output, "  > ")?;
                self.output.flush()?;

                set_answers.push(self.read_line()?.unwrap_or_default());
            }

            answers.push(set_answers);
        }

        Ok(answers)
    }

    /// Show the graded module: every exercise with the learner's answer
    /// and its score, then per-set and overall summaries.
    fn show_evaluation(
        &mut self,
        request: &EvaluateModule,
        evaluation: &ModuleEvaluation,
    ) -> io::Result<()> {
        let rounds = request.module.sets.iter().zip(&request.answers).zip(&evaluation.sets);

        for (index, ((set, answers), scored)) in rounds.enumerate() {
            writeln!(self.output)?;
            writeln!(
                self.output,
                "{} {} {}",
                format!("Set {}:", index + 1).bold().white(),
                format!("{:.0}/100", scored.average_score).bright_cyan(),
                scored.feedback
            )?;

            for ((item, answer), graded) in set.items.iter().zip(answers).zip(&scored.items) {
                writeln!(self.output, "  {}", item.prompt)?;
                writeln!(self.output, "    your answer: {}", answer)?;
                writeln!(
                    self.output,
                    "    {} {}",
                    score_text(graded.score),
                    graded.feedback
                )?;
            }
        }

        writeln!(self.output)?;
        writeln!(
            self.output,
            "{} {} {}",
            "Overall:".bold().white(),
            format!("{:.0}/100", evaluation.score).bright_cyan(),
            evaluation.feedback
        )?;

        if !evaluation.remembered_rules.is_empty() {
            writeln!(self.output, "{}", "Rules to remember:".bold().white())?;
            for rule in &evaluation.remembered_rules {
                writeln!(self.output, "  - {}", rule)?;
            }
        }

        Ok(())
    }

    /// Show the menu until a valid choice is entered. `None` on end of
    /// input, which the caller treats as exit.
    fn menu_choice(&mut self) -> io::Result<Option<MenuChoice>> {
        loop {
            writeln!(self.output)?;
            writeln!(self.output, "{}", "What next?".bold().white())?;
            writeln!(self.output, "  1. Practice this topic again")?;
            writeln!(self.output, "  2. Pick a new topic")?;
            writeln!(self.output, "  3. Exit")?;
            write!(self.output, "> ")?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                return Ok(None);
            };

            match parse_menu_choice(&line) {
                Some(choice) => return Ok(Some(choice)),
                None => writeln!(self.output, "Invalid choice. Enter 1, 2 or 3.")?,
            }
        }
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();

        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        Ok(Some(line.trim().to_string()))
    }
}

fn score_text(score: u8) -> ColoredString {
    let text = format!("{}/100", score);

    if score >= 90 {
        text.green()
    } else if score >= 70 {
        text.yellow()
    } else {
        text.red()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::requests::evaluate::{ItemEvaluation, SetEvaluation};
    use crate::openai::requests::generate::{Exercise, ExerciseSet};
    use proptest::prelude::*;
    use std::collections::VecDeque;
    use std::io::Cursor;

    struct FakeTutor {
        generations: VecDeque<Result<Module, DrillError>>,
        evaluations: VecDeque<Result<ModuleEvaluation, DrillError>>,
        topics_seen: Vec<String>,
    }

    impl FakeTutor {
        fn new(
            generations: Vec<Result<Module, DrillError>>,
            evaluations: Vec<Result<ModuleEvaluation, DrillError>>,
        ) -> Self {
            FakeTutor {
                generations: generations.into(),
                evaluations: evaluations.into(),
                topics_seen: vec![],
            }
        }
    }

    impl Tutor for FakeTutor {
        async fn generate(&mut self, request: GenerateModule) -> Result<Module, DrillError> {
            self.topics_seen.push(request.topic);
            self.generations.pop_front().expect("unexpected generate call")
        }

        async fn evaluate(
            &mut self,
            _request: &EvaluateModule,
        ) -> Result<ModuleEvaluation, DrillError> {
            self.evaluations.pop_front().expect("unexpected evaluate call")
        }
    }

    fn small_module() -> Module {
        Module {
            sets: vec![ExerciseSet {
                instructions: "Translate into Spanish.".to_string(),
                items: vec![Exercise {
                    prompt: "the water".to_string(),
                    answer: "el agua".to_string(),
                }],
            }],
        }
    }

    fn passing_evaluation() -> ModuleEvaluation {
        ModuleEvaluation {
            sets: vec![SetEvaluation {
                average_score: 100.0,
                feedback: "Perfect set.".to_string(),
                items: vec![ItemEvaluation {
                    score: 100,
                    feedback: "Correct.".to_string(),
                }],
            }],
            score: 100.0,
            feedback: "Well done.".to_string(),
            remembered_rules: vec!["Agua takes el despite being feminine.".to_string()],
        }
    }

    fn flow<'a>(
        input: &'a str,
        output: &'a mut Vec<u8>,
        topic: Option<&str>,
    ) -> ExerciseFlow<Cursor<&'a [u8]>, &'a mut Vec<u8>> {
        ExerciseFlow::new(
            Cursor::new(input.as_bytes()),
            output,
            topic.map(str::to_string),
            Proficiency::Intermediate,
        )
    }

    #[tokio::test]
    async fn test_round_runs_to_exit() {
        let mut tutor =
            FakeTutor::new(vec![Ok(small_module())], vec![Ok(passing_evaluation())]);
        let mut output = Vec::new();
        let mut flow = flow("el agua\n3\n", &mut output, Some("articles"));

        flow.run(&mut tutor).await.unwrap();
        drop(flow);

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("the water"));
        assert!(printed.contains("your answer: el agua"));
        assert!(printed.contains("Overall:"));
        assert!(printed.contains("Rules to remember:"));
        assert!(printed.contains("Agua takes el"));
        assert!(!printed.contains("Topic to practice"));
        assert_eq!(tutor.topics_seen, vec!["articles"]);
    }

    #[tokio::test]
    async fn test_generation_failure_returns_to_topic_prompt() {
        let mut tutor = FakeTutor::new(
            vec![
                Err(DrillError::exchange("service returned 500")),
                Ok(small_module()),
            ],
            vec![Ok(passing_evaluation())],
        );
        let mut output = Vec::new();
        let mut flow = flow("irregular verbs\nel agua\n3\n", &mut output, Some("articles"));

        flow.run(&mut tutor).await.unwrap();
        drop(flow);

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("service returned 500"));
        assert!(printed.contains("No exercises were generated"));
        assert!(printed.contains("Topic to practice"));
        assert_eq!(tutor.topics_seen, vec!["articles", "irregular verbs"]);
    }

    #[tokio::test]
    async fn test_evaluation_failure_is_reported_and_flow_continues() {
        let mut tutor = FakeTutor::new(
            vec![Ok(small_module())],
            vec![Err(DrillError::exchange("service returned 503"))],
        );
        let mut output = Vec::new();
        let mut flow = flow("el agua\n", &mut output, Some("articles"));

        flow.run(&mut tutor).await.unwrap();
        drop(flow);

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("Your answers were not evaluated"));
        assert!(printed.contains("Topic to practice"));
    }

    #[tokio::test]
    async fn test_repeat_topic_skips_the_prompt() {
        let mut tutor = FakeTutor::new(
            vec![Ok(small_module()), Ok(small_module())],
            vec![Ok(passing_evaluation()), Ok(passing_evaluation())],
        );
        let mut output = Vec::new();
        let mut flow = flow("el agua\n1\nel agua\n3\n", &mut output, Some("past tense"));

        flow.run(&mut tutor).await.unwrap();
        drop(flow);

        let printed = String::from_utf8(output).unwrap();
        assert!(!printed.contains("Topic to practice"));
        assert_eq!(tutor.topics_seen, vec!["past tense", "past tense"]);
    }

    #[tokio::test]
    async fn test_invalid_menu_choice_reprompts() {
        let mut tutor =
            FakeTutor::new(vec![Ok(small_module())], vec![Ok(passing_evaluation())]);
        let mut output = Vec::new();
        let mut flow = flow("el agua\n9\n2\n", &mut output, Some("articles"));

        flow.run(&mut tutor).await.unwrap();
        drop(flow);

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("Invalid choice. Enter 1, 2 or 3."));
        assert!(printed.contains("Topic to practice"));
    }

    #[tokio::test]
    async fn test_end_of_input_exits_without_exchanges() {
        let mut tutor = FakeTutor::new(vec![], vec![]);
        let mut output = Vec::new();
        let mut flow = flow("", &mut output, None);

        flow.run(&mut tutor).await.unwrap();
        drop(flow);

        assert!(tutor.topics_seen.is_empty());
    }

    #[tokio::test]
    async fn test_blank_topic_line_reprompts() {
        let mut tutor =
            FakeTutor::new(vec![Ok(small_module())], vec![Ok(passing_evaluation())]);
        let mut output = Vec::new();
        let mut flow = flow("\n\nfood\nel agua\n3\n", &mut output, None);

        flow.run(&mut tutor).await.unwrap();
        drop(flow);

        assert_eq!(tutor.topics_seen, vec!["food"]);
    }

    #[test]
    fn test_menu_choices_map_to_actions() {
        assert_eq!(parse_menu_choice("1"), Some(MenuChoice::RepeatTopic));
        assert_eq!(parse_menu_choice(" 2 "), Some(MenuChoice::NewTopic));
        assert_eq!(parse_menu_choice("3\n"), Some(MenuChoice::Exit));
        assert_eq!(parse_menu_choice("exit"), None);
        assert_eq!(parse_menu_choice(""), None);
    }

    proptest! {
        #[test]
        fn test_menu_parse_accepts_exactly_the_three_digits(line in ".*") {
            let parsed = parse_menu_choice(&line);

            match line.trim() {
                "1" => prop_assert_eq!(parsed, Some(MenuChoice::RepeatTopic)),
                "2" => prop_assert_eq!(parsed, Some(MenuChoice::NewTopic)),
                "3" => prop_assert_eq!(parsed, Some(MenuChoice::Exit)),
                _ => prop_assert_eq!(parsed, None),
            }
        }
    }
}
