//! Built-in assessment catalog seeded at startup.

/// A catalog question: text plus optional group within its assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionSeed {
    pub text: &'static str,
    pub group: Option<i64>,
}

/// An assessment and the questions seeded for it, in order.
#[derive(Debug, Clone, Copy)]
pub struct AssessmentSeed {
    pub name: &'static str,
    pub questions: &'static [QuestionSeed],
}

const fn q(group: i64, text: &'static str) -> QuestionSeed {
    QuestionSeed {
        text,
        group: Some(group),
    }
}

const fn ungrouped(text: &'static str) -> QuestionSeed {
    QuestionSeed { text, group: None }
}

/// Verbal Behavior Milestones Assessment and Placement Program.
const VB_MAPP: &[QuestionSeed] = &[
    // Animal sounds & song fill-ins
    q(1, "A kitty says..."),
    q(1, "Twinkle, twinkle, little..."),
    q(1, "Ready, set..."),
    q(1, "The wheels on the bus go..."),
    q(1, "A dog says..."),
    // Name, fill-ins, associations
    q(2, "What is your name?"),
    q(2, "You brush your..."),
    q(2, "Shoes and..."),
    q(2, "You ride a..."),
    q(2, "You eat..."),
    // Simple what questions
    q(3, "What can you drink?"),
    q(3, "What can fly?"),
    q(3, "What are some numbers?"),
    q(3, "What are some colors?"),
    q(3, "What are some animals?"),
    // Simple who, where, how old
    q(4, "Who is your teacher?"),
    q(4, "Where do you wash your hands?"),
    q(4, "Who lives on a farm?"),
    q(4, "How old are you?"),
    q(4, "Why do you use a bandaid?"),
    // Categories, function, features
    q(5, "What shape are wheels?"),
    q(5, "What grows outside?"),
    q(5, "What can sting you?"),
    q(5, "What do you smell with?"),
    q(5, "What color are wheels?"),
    // Adjectives, prepositions, adverbs
    q(6, "What do you wear on your head?"),
    q(6, "What do you eat with?"),
    q(6, "What's above a house?"),
    q(6, "What are some hot things?"),
    q(6, "What's under a house?"),
    // Multiple part questions
    q(7, "What makes you sad?"),
    q(7, "What animal has a long neck?"),
    q(7, "Tell me something that is not a food."),
    q(7, "What do you do with money?"),
    q(7, "What's something that is sticky?"),
    q(8, "Where do you put your dirty clothes?"),
    q(8, "What do you take to a birthday party?"),
    q(8, "What day is today?"),
    q(8, "Why do people wear glasses?"),
    q(8, "How do you know if someone is sick?"),
    q(8, "What do you see in a city?"),
];

/// Essential for Living Skills.
const ESFLS: &[QuestionSeed] = &[
    ungrouped("Can the patient make requests for essential items?"),
    ungrouped("Is the patient able to tolerate specific situations?"),
    ungrouped("Can the patient engage in daily living activities?"),
];

/// Assessment of Basic Language and Learning Skills, Revised.
const ABLLS_R: &[QuestionSeed] = &[
    ungrouped("How would you rate the patient's visual performance skills?"),
    ungrouped("Can the patient follow instructions?"),
    ungrouped("Does the patient demonstrate language comprehension?"),
];

/// Default catalog, in insertion order.
pub static DEFAULT_CATALOG: &[AssessmentSeed] = &[
    AssessmentSeed {
        name: "VB-MAPP",
        questions: VB_MAPP,
    },
    AssessmentSeed {
        name: "ESFLS",
        questions: ESFLS,
    },
    AssessmentSeed {
        name: "ABLLS-R",
        questions: ABLLS_R,
    },
];

/// Seed questions for `name` in `catalog`. Unknown names have none.
pub fn questions_for(catalog: &[AssessmentSeed], name: &str) -> &'static [QuestionSeed] {
    catalog
        .iter()
        .find(|a| a.name == name)
        .map(|a| a.questions)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashSet};

    use super::*;
    use crate::onboarding::model::normalize_question_text;

    #[test]
    fn three_canonical_assessments_in_order() {
        let names: Vec<_> = DEFAULT_CATALOG.iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["VB-MAPP", "ESFLS", "ABLLS-R"]);
    }

    #[test]
    fn vb_mapp_is_grouped_into_eight_groups() {
        let questions = questions_for(DEFAULT_CATALOG, "VB-MAPP");
        assert_eq!(questions.len(), 41);
        let groups: BTreeSet<i64> = questions.iter().filter_map(|q| q.group).collect();
        assert_eq!(groups, (1..=8).collect());
        assert!(questions.iter().all(|q| q.group.is_some()));
    }

    #[test]
    fn small_assessments_are_ungrouped() {
        for name in ["ESFLS", "ABLLS-R"] {
            let questions = questions_for(DEFAULT_CATALOG, name);
            assert_eq!(questions.len(), 3);
            assert!(questions.iter().all(|q| q.group.is_none()));
        }
    }

    #[test]
    fn unknown_assessment_has_no_questions() {
        assert!(questions_for(DEFAULT_CATALOG, "PEAK").is_empty());
    }

    #[test]
    fn catalog_text_is_globally_unique() {
        let mut seen = HashSet::new();
        for seed in DEFAULT_CATALOG {
            for question in seed.questions {
                let key = normalize_question_text(question.text).to_lowercase();
                assert!(seen.insert(key), "duplicate question: {}", question.text);
            }
        }
    }
}
