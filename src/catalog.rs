//! Static registry of the twelve insight categories.
//!
//! Each category names the survey questions that feed it and the guidance
//! text for each score band. Categories are fixed contracts: the analytics
//! service's response shape must match them by question identifier. The
//! registry is defined once at process start and never mutated.
//!
//! Some questions deliberately feed more than one category (for example a
//! positive self-view question contributes to both resilience and academic
//! confidence); each category is still scored independently.

use crate::models::Band;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// A survey question referenced by an insight category.
#[derive(Debug, Clone, Copy)]
pub struct QuestionRef {
    pub id: &'static str,
    pub text: &'static str,
}

/// Per-band guidance text for one category.
#[derive(Debug, Clone, Copy)]
pub struct Interpretation {
    pub excellent: &'static str,
    pub good: &'static str,
    pub average: &'static str,
    pub poor: &'static str,
}

impl Interpretation {
    /// Guidance text for the given band.
    pub fn for_band(&self, band: Band) -> &'static str {
        match band {
            Band::Excellent => self.excellent,
            Band::Good => self.good,
            Band::Average => self.average,
            Band::Poor => self.poor,
        }
    }
}

/// One of the twelve psychometric insight categories.
#[derive(Debug, Clone, Copy)]
pub struct InsightCategory {
    /// Unique key, e.g. `growth_mindset`.
    pub id: &'static str,
    pub title: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    /// Why the construct matters to educators.
    pub rationale: &'static str,
    pub questions: &'static [QuestionRef],
    pub interpretation: Interpretation,
}

static CATALOG: &[InsightCategory] = &[
    InsightCategory {
        id: "growth_mindset",
        title: "Growth Mindset",
        icon: "🌱",
        description: "Measures students' belief that intelligence and abilities can be developed through effort and learning.",
        rationale: "Students with a growth mindset are more likely to persist through challenges, embrace feedback, and achieve better academic outcomes.",
        questions: &[
            QuestionRef {
                id: "Q5",
                text: "No matter who you are, you can change your intelligence a lot",
            },
            QuestionRef {
                id: "Q26",
                text: "Your intelligence is something about you that you can change very much",
            },
        ],
        interpretation: Interpretation {
            excellent: "Most students believe they can improve their abilities - excellent foundation for learning",
            good: "Good growth mindset culture, but room for improvement",
            average: "Mixed beliefs about ability to improve - consider growth mindset interventions",
            poor: "Fixed mindset prevalent - urgent need for growth mindset education",
        },
    },
    InsightCategory {
        id: "academic_momentum",
        title: "Academic Momentum",
        icon: "🚀",
        description: "Captures students' intrinsic drive, engagement with learning, and commitment to excellence.",
        rationale: "Students with high academic momentum are self-motivated and more likely to sustain performance through challenges.",
        questions: &[
            QuestionRef {
                id: "Q14",
                text: "I strive to achieve the goals I set for myself",
            },
            QuestionRef {
                id: "Q16",
                text: "I enjoy learning new things",
            },
            QuestionRef {
                id: "Q17",
                text: "I'm not happy unless my work is the best it can be",
            },
            QuestionRef {
                id: "Q9",
                text: "I am a hard working student",
            },
        ],
        interpretation: Interpretation {
            excellent: "Students show strong drive and engagement - maintain this momentum",
            good: "Good levels of motivation, but could be strengthened",
            average: "Moderate engagement - explore ways to boost intrinsic motivation",
            poor: "Low academic drive - investigate underlying causes and provide support",
        },
    },
    InsightCategory {
        id: "study_effectiveness",
        title: "Study Effectiveness",
        icon: "📚",
        description: "Measures adoption of evidence-based study techniques that improve learning and retention.",
        rationale: "Effective study techniques significantly improve exam performance and long-term retention of material.",
        questions: &[
            QuestionRef {
                id: "Q7",
                text: "I test myself on important topics until I remember them",
            },
            QuestionRef {
                id: "Q12",
                text: "I spread out my revision, rather than cramming at the last minute",
            },
            QuestionRef {
                id: "Q15",
                text: "I summarise important information in diagrams, tables or lists",
            },
        ],
        interpretation: Interpretation {
            excellent: "Students use proven study techniques - likely to achieve strong results",
            good: "Good study habits, but some techniques could be improved",
            average: "Mixed study practices - provide training on effective techniques",
            poor: "Poor study habits prevalent - urgent need for study skills training",
        },
    },
    InsightCategory {
        id: "exam_confidence",
        title: "Exam Confidence",
        icon: "💪",
        description: "Students' belief in their ability to achieve their potential in final exams.",
        rationale: "Confidence correlates with performance - students who believe they can succeed are more likely to do so.",
        questions: &[QuestionRef {
            id: "Outcome_Q",
            text: "I am confident I will achieve my potential in my final exams",
        }],
        interpretation: Interpretation {
            excellent: "High confidence levels - students believe in their ability to succeed",
            good: "Good confidence, but some students need reassurance",
            average: "Mixed confidence - identify and support less confident students",
            poor: "Low confidence widespread - investigate causes and provide support",
        },
    },
    InsightCategory {
        id: "organization_skills",
        title: "Organization Skills",
        icon: "📋",
        description: "Measures students' ability to plan, organize, and manage their academic responsibilities.",
        rationale: "Well-organized students are less stressed, more productive, and better able to balance multiple demands.",
        questions: &[
            QuestionRef {
                id: "Q2",
                text: "I plan and organise my time to get my work done",
            },
            QuestionRef {
                id: "Q22",
                text: "My books/files are organised",
            },
            QuestionRef {
                id: "Q11",
                text: "I always meet deadlines",
            },
        ],
        interpretation: Interpretation {
            excellent: "Students are highly organized - a key success factor",
            good: "Good organizational skills, minor improvements possible",
            average: "Mixed organization - provide tools and training",
            poor: "Poor organization widespread - implement organizational support systems",
        },
    },
    InsightCategory {
        id: "resilience_factor",
        title: "Resilience",
        icon: "🛡️",
        description: "Students' ability to bounce back from setbacks and maintain a positive outlook.",
        rationale: "Resilient students persist through challenges and learn from failures rather than being defeated by them.",
        questions: &[
            QuestionRef {
                id: "Q13",
                text: "I don't let a poor test/assessment result get me down for too long",
            },
            QuestionRef {
                id: "Q8",
                text: "I have a positive view of myself",
            },
            QuestionRef {
                id: "Q27",
                text: "I like hearing feedback about how I can improve",
            },
        ],
        interpretation: Interpretation {
            excellent: "High resilience - students bounce back well from setbacks",
            good: "Good resilience, but some students need support",
            average: "Mixed resilience - build culture of learning from mistakes",
            poor: "Low resilience - implement resilience-building programs",
        },
    },
    InsightCategory {
        id: "stress_management",
        title: "Stress Management",
        icon: "🧘",
        description: "Students' ability to handle academic pressure and control exam nerves.",
        rationale: "Effective stress management improves performance, wellbeing, and prevents burnout.",
        questions: &[
            QuestionRef {
                id: "Q20",
                text: "I feel I can cope with the pressure at school/college/University",
            },
            QuestionRef {
                id: "Q28",
                text: "I can control my nerves in tests/practical assessments",
            },
        ],
        interpretation: Interpretation {
            excellent: "Students manage stress well - maintain supportive environment",
            good: "Good stress management, but monitor for changes",
            average: "Some students struggling - provide stress management resources",
            poor: "High stress levels - urgent intervention needed",
        },
    },
    InsightCategory {
        id: "active_learning",
        title: "Active Learning",
        icon: "🎯",
        description: "Engagement with active learning techniques that deepen understanding and retention.",
        rationale: "Active learning techniques are proven to be more effective than passive studying.",
        questions: &[
            QuestionRef {
                id: "Q7",
                text: "I test myself on important topics until I remember them",
            },
            QuestionRef {
                id: "Q23",
                text: "When preparing for a test/exam I teach someone else the material",
            },
            QuestionRef {
                id: "Q19",
                text: "When revising I mix different kinds of topics/subjects in one study session",
            },
        ],
        interpretation: Interpretation {
            excellent: "Strong use of active learning - excellent practice",
            good: "Good active learning, could expand techniques",
            average: "Some active learning - promote more techniques",
            poor: "Passive learning dominant - teach active strategies",
        },
    },
    InsightCategory {
        id: "support_readiness",
        title: "Support Readiness",
        icon: "🤝",
        description: "Students' perception of having adequate support to achieve their goals.",
        rationale: "Students who feel supported are more likely to seek help when needed and achieve better outcomes.",
        questions: &[QuestionRef {
            id: "Outcome_Q2",
            text: "I have the support I need to achieve this year",
        }],
        interpretation: Interpretation {
            excellent: "Students feel well-supported - maintain this environment",
            good: "Good support perception, but some gaps exist",
            average: "Mixed feelings about support - investigate specific needs",
            poor: "Students feel unsupported - review support systems urgently",
        },
    },
    InsightCategory {
        id: "time_management",
        title: "Time Management",
        icon: "⏰",
        description: "Students' ability to effectively plan and use their time for academic work.",
        rationale: "Good time management reduces stress, improves work quality, and enables better work-life balance.",
        questions: &[
            QuestionRef {
                id: "Q2",
                text: "I plan and organise my time to get my work done",
            },
            QuestionRef {
                id: "Q4",
                text: "I complete all my homework on time",
            },
            QuestionRef {
                id: "Q11",
                text: "I always meet deadlines",
            },
        ],
        interpretation: Interpretation {
            excellent: "Excellent time management skills across cohort",
            good: "Good time management, minor improvements possible",
            average: "Mixed time management - provide planning tools",
            poor: "Poor time management - implement time management training",
        },
    },
    InsightCategory {
        id: "academic_confidence",
        title: "Academic Confidence",
        icon: "🎓",
        description: "Students' belief in their academic abilities and positive self-perception.",
        rationale: "Academic confidence is a strong predictor of achievement and willingness to take on challenges.",
        questions: &[
            QuestionRef {
                id: "Q10",
                text: "I am confident in my academic ability",
            },
            QuestionRef {
                id: "Q8",
                text: "I have a positive view of myself",
            },
        ],
        interpretation: Interpretation {
            excellent: "High academic confidence - students believe in themselves",
            good: "Good confidence levels, some students need boosting",
            average: "Mixed confidence - identify and support less confident students",
            poor: "Low academic confidence - build success experiences",
        },
    },
    InsightCategory {
        id: "revision_readiness",
        title: "Revision Readiness",
        icon: "📝",
        description: "Students' perception of being equipped to handle revision and study challenges.",
        rationale: "Feeling prepared for revision reduces anxiety and improves study effectiveness.",
        questions: &[QuestionRef {
            id: "Outcome_Q3",
            text: "I feel equipped to face the study and revision challenges this year",
        }],
        interpretation: Interpretation {
            excellent: "Students feel well-prepared for revision challenges",
            good: "Good preparation, but some students need support",
            average: "Mixed readiness - provide revision skills training",
            poor: "Students feel unprepared - urgent revision support needed",
        },
    },
];

static INDEX: Lazy<HashMap<&'static str, &'static InsightCategory>> =
    Lazy::new(|| CATALOG.iter().map(|c| (c.id, c)).collect());

/// All registered insight categories, in registration order.
pub fn catalog() -> &'static [InsightCategory] {
    CATALOG
}

/// Look up one category by id.
pub fn get_insight(id: &str) -> Option<&'static InsightCategory> {
    INDEX.get(id).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_twelve_categories() {
        assert_eq!(catalog().len(), 12);
    }

    #[test]
    fn test_category_ids_are_unique() {
        let mut ids: Vec<&str> = catalog().iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 12);
    }

    #[test]
    fn test_get_insight_known_and_unknown() {
        let growth = get_insight("growth_mindset").unwrap();
        assert_eq!(growth.title, "Growth Mindset");
        assert_eq!(growth.questions.len(), 2);
        assert!(get_insight("not_a_category").is_none());
    }

    #[test]
    fn test_every_category_has_questions_and_guidance() {
        for category in catalog() {
            assert!(!category.questions.is_empty(), "{} has no questions", category.id);
            assert!(!category.interpretation.excellent.is_empty());
            assert!(!category.interpretation.poor.is_empty());
        }
    }

    #[test]
    fn test_question_overlap_is_intentional() {
        // Q8 (positive self-view) feeds both resilience and academic confidence.
        let resilience = get_insight("resilience_factor").unwrap();
        let confidence = get_insight("academic_confidence").unwrap();
        assert!(resilience.questions.iter().any(|q| q.id == "Q8"));
        assert!(confidence.questions.iter().any(|q| q.id == "Q8"));
    }

    #[test]
    fn test_interpretation_for_band() {
        use crate::models::Band;
        let growth = get_insight("growth_mindset").unwrap();
        assert_eq!(
            growth.interpretation.for_band(Band::Excellent),
            growth.interpretation.excellent
        );
        assert_eq!(
            growth.interpretation.for_band(Band::Poor),
            growth.interpretation.poor
        );
    }
}
