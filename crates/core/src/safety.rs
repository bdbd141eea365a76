//! Content-safety scan applied to prompts before they leave the process.
//!
//! Matching is a case-insensitive substring search over a fixed phrase list,
//! so short entries also match inside longer words.

pub const SAFE_HARBOR_POSITIVE: &str =
    "Please ensure your response follows respectful and safe communication guidelines.";
pub const SAFE_HARBOR_CONSTRUCTIVE: &str = "Your input may contain harmful or inappropriate content. If you’re feeling overwhelmed or distressed, please reach out to a trusted person or mental health professional.";

/// Blocked phrases: profanity, self-harm, violence and harassment.
pub const BLOCKLIST: &[&str] = &[
    // profanity and hate speech
    "fuck",
    "shit",
    "bastard",
    "asshole",
    "dick",
    "piss",
    "crap",
    "slut",
    "bitch",
    "whore",
    "motherfucker",
    "son of a bitch",
    "cunt",
    "dumbass",
    "idiot",
    "retard",
    "scumbag",
    "moron",
    "loser",
    "hate you",
    "i hate everything",
    "kill you",
    "screw you",
    // self-harm
    "kill myself",
    "i want to die",
    "i want to disappear",
    "i hate my life",
    "i want it to end",
    "end it all",
    "die",
    "suicide",
    "i feel empty",
    "worthless",
    "no reason to live",
    "cut myself",
    "cutting",
    "hurt myself",
    "self harm",
    "jump off",
    "overdose",
    "i give up",
    "i’m done",
    "life is meaningless",
    "can’t take it anymore",
    "mental breakdown",
    // violence and threats
    "shoot up",
    "stab",
    "burn down",
    "blow up",
    "beat up",
    "i will hurt",
    "i will kill",
    "school shooting",
    "massacre",
    "murder",
    "rape",
    "terrorist",
    "explode",
    "threat",
    // harassment and discrimination
    "racist",
    "nazi",
    "jew hater",
    "homophobe",
    "transphobe",
    "go kill yourself",
    "you should die",
    "go die",
    "n-word",
    "faggot",
    "retarded",
    "cripple",
    "slave",
];

/// First blocklisted phrase found in `text`, if any.
#[must_use]
pub fn first_match(text: &str) -> Option<&'static str> {
    let normalized = text.to_lowercase();
    BLOCKLIST
        .iter()
        .copied()
        .find(|phrase| normalized.contains(phrase))
}

/// The advisory reply returned instead of a model completion, as the
/// `{"positiveFeedback", "constructiveFeedback"}` JSON body.
#[must_use]
pub fn safe_harbor_reply() -> String {
    serde_json::json!({
        "positiveFeedback": SAFE_HARBOR_POSITIVE,
        "constructiveFeedback": SAFE_HARBOR_CONSTRUCTIVE,
    })
    .to_string()
}
