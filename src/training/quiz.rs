use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: usize,
    pub prompt: &'static str,
    pub options: [&'static str; 4],
    pub correct: usize,
}

/// The quiz every course currently uses.
pub static QUESTION_BANK: [Question; 3] = [
    Question {
        id: 1,
        prompt: "Which basic PPE must be worn before entering the plant area?",
        options: [
            "Safety helmet, safety glasses, safety shoes",
            "T-shirt, shorts, sandals",
            "Motorcycle helmet, cloth gloves",
            "Sunglasses, sneakers",
        ],
        correct: 0,
    },
    Question {
        id: 2,
        prompt: "You find someone injured by an electric shock. What do you do first?",
        options: [
            "Run in and pull the injured person away",
            "Call the nurse immediately",
            "Cut the power at the source",
            "Throw water to put out any fire",
        ],
        correct: 2,
    },
    Question {
        id: 3,
        prompt: "Which Permit to Work covers work that produces sparks?",
        options: [
            "Cold Work Permit",
            "Hot Work Permit",
            "Confined Space Permit",
            "Excavation Permit",
        ],
        correct: 1,
    },
];

/// Answers keyed by question id, holding the chosen option index.
pub type Answers = BTreeMap<usize, usize>;

pub fn all_answered(answers: &Answers) -> bool {
    QUESTION_BANK.iter().all(|q| answers.contains_key(&q.id))
}

/// Percentage of correct answers, rounded to the nearest whole number.
pub fn score(answers: &Answers) -> u32 {
    let correct = QUESTION_BANK
        .iter()
        .filter(|q| answers.get(&q.id) == Some(&q.correct))
        .count();
    ((correct as f64 / QUESTION_BANK.len() as f64) * 100.0).round() as u32
}
