//! Vocabulary sampling for exercise generation.
//!
//! Generated exercises read better when the service is nudged toward words
//! the learner plausibly knows. The table below is ordered by general usage
//! frequency (most common first); the proficiency level selects the window
//! of ranks that sampling draws from.

use clap::ValueEnum;
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;
use std::ops::Range;

/// Default number of words offered to the generator per module.
pub const DEFAULT_SAMPLE_SIZE: usize = 8;

/// Learner proficiency. Selects the frequency-rank window that vocabulary
/// sampling draws from; passed in explicitly rather than read from any
/// process-wide state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Proficiency {
    /// High-frequency words only.
    Beginner,
    /// Mid-frequency words, overlapping both neighbours.
    #[default]
    Intermediate,
    /// The rarer end of the table.
    Advanced,
}

impl Proficiency {
    /// The window of frequency ranks this level samples from.
    fn rank_window(&self) -> Range<usize> {
        let n = WORDS.len();
        match self {
            Proficiency::Beginner => 0..n * 2 / 5,
            Proficiency::Intermediate => n / 5..n * 4 / 5,
            Proficiency::Advanced => n * 3 / 5..n,
        }
    }
}

impl fmt::Display for Proficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Proficiency::Beginner => "beginner",
            Proficiency::Intermediate => "intermediate",
            Proficiency::Advanced => "advanced",
        };
        write!(f, "{}", name)
    }
}

/// Sample up to `count` distinct words for the given proficiency.
pub fn sample(proficiency: Proficiency, count: usize) -> Vec<&'static str> {
    sample_with_rng(&mut rand::thread_rng(), proficiency, count)
}

/// Sample with a caller-provided RNG, so tests can seed it.
pub fn sample_with_rng<R: Rng + ?Sized>(
    rng: &mut R,
    proficiency: Proficiency,
    count: usize,
) -> Vec<&'static str> {
    let window = proficiency.rank_window();
    WORDS[window].choose_multiple(rng, count).copied().collect()
}

/// Common English words ordered by approximate usage frequency, most
/// frequent first. Function words are excluded on purpose: they carry no
/// exercise value.
static WORDS: &[&str] = &[
    "time", "people", "way", "day", "thing", "life", "world", "school",
    "family", "student", "country", "problem", "hand", "place", "week",
    "company", "system", "question", "work", "government", "number", "night",
    "home", "water", "room", "mother", "area", "money", "story", "month",
    "book", "eye", "job", "word", "business", "side", "kind", "head",
    "house", "service", "friend", "father", "power", "hour", "game", "line",
    "member", "city", "name", "team", "minute", "idea", "body", "parent",
    "face", "level", "office", "door", "health", "person", "art", "history",
    "party", "result", "change", "morning", "reason", "research", "moment",
    "teacher", "force", "education", "foot", "age", "policy", "process",
    "music", "market", "sense", "nation", "plan", "college", "interest",
    "death", "experience", "effect", "class", "control", "care", "field",
    "development", "role", "effort", "rate", "heart", "light", "voice",
    "price", "report", "decision", "view", "relationship", "town", "road",
    "difference", "value", "building", "action", "model", "season",
    "society", "tax", "position", "record", "paper", "space", "ground",
    "form", "event", "matter", "center", "couple", "site", "project",
    "activity", "table", "court", "situation", "cost", "industry", "figure",
    "street", "image", "phone", "picture", "practice", "piece", "land",
    "product", "doctor", "wall", "patient", "worker", "news", "test",
    "movie", "support", "technology", "basis", "direction", "strategy",
    "instance", "circumstance", "consequence", "assumption", "perception",
];
