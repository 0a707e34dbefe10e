mod rules;

use serde::{Deserialize, Serialize};

use super::domain::{CandidateDocument, ParameterSet};

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("unable to serialize resume for keyword search: {0}")]
    Corpus(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionKind {
    Skill,
    Keyword,
    ContactInfo,
    Education,
}

/// One line of the score, kept so a result can be audited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub kind: CriterionKind,
    pub label: String,
    pub weight: u32,
    pub matched: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    pub score: u8,
    pub matched: u32,
    pub total: u32,
    pub criteria: Vec<CriterionScore>,
}

impl ScoreOutcome {
    pub fn missing(&self) -> impl Iterator<Item = &CriterionScore> {
        self.criteria.iter().filter(|criterion| !criterion.matched)
    }
}

/// Weighted skill/keyword/format matcher. Stateless; the same inputs always
/// produce the same outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtsScorer;

impl AtsScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn compute(
        &self,
        parameters: &ParameterSet,
        candidate: &CandidateDocument,
    ) -> Result<ScoreOutcome, ScoringError> {
        let mut criteria = Vec::with_capacity(
            parameters.required_skills.len() + parameters.keywords.len() + 2,
        );

        rules::score_skills(parameters, candidate, &mut criteria);

        if !parameters.keywords.is_empty() {
            let corpus = rules::keyword_corpus(candidate)?;
            rules::score_keywords(parameters, &corpus, &mut criteria);
        }

        rules::score_format(parameters, candidate, &mut criteria);

        let total: u32 = criteria.iter().map(|criterion| criterion.weight).sum();
        let matched: u32 = criteria
            .iter()
            .filter(|criterion| criterion.matched)
            .map(|criterion| criterion.weight)
            .sum();

        Ok(ScoreOutcome {
            score: rules::percentage(matched, total),
            matched,
            total,
            criteria,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ats::domain::{
        EducationEntry, FormatRequirements, ParameterSetId, PersonalInfo, ResumeId, UserId,
        WeightedKeyword, WeightedSkill,
    };
    use chrono::{TimeZone, Utc};

    fn parameters(skills: &[(&str, u8)], keywords: &[(&str, u8)]) -> ParameterSet {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        ParameterSet {
            id: ParameterSetId("params-test".to_string()),
            owner_id: UserId("rec-1".to_string()),
            name: "Frontend".to_string(),
            required_skills: skills
                .iter()
                .map(|(skill, weight)| WeightedSkill {
                    skill: skill.to_string(),
                    weight: *weight,
                })
                .collect(),
            required_experience: 0,
            required_education: None,
            keywords: keywords
                .iter()
                .map(|(keyword, weight)| WeightedKeyword {
                    keyword: keyword.to_string(),
                    weight: *weight,
                })
                .collect(),
            format_requirements: FormatRequirements {
                preferred_length: None,
                requires_contact_info: false,
                requires_education: false,
            },
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn candidate(skills: &[&str]) -> CandidateDocument {
        CandidateDocument {
            id: ResumeId("resume-test".to_string()),
            owner_id: UserId("stu-1".to_string()),
            skills: skills.iter().map(|skill| skill.to_string()).collect(),
            personal_info: PersonalInfo {
                name: "Asha Rao".to_string(),
                email: Some("asha@example.edu".to_string()),
                ..PersonalInfo::default()
            },
            education: Vec::new(),
            experience: Vec::new(),
            projects: Vec::new(),
            certifications: Vec::new(),
            ats_score: None,
            version: 0,
        }
    }

    fn score(parameters: &ParameterSet, candidate: &CandidateDocument) -> ScoreOutcome {
        AtsScorer::new()
            .compute(parameters, candidate)
            .expect("scoring succeeds")
    }

    #[test]
    fn empty_parameter_set_scores_zero() {
        let outcome = score(&parameters(&[], &[]), &candidate(&["React"]));
        assert_eq!((outcome.score, outcome.matched, outcome.total), (0, 0, 0));
        assert!(outcome.criteria.is_empty());
    }

    #[test]
    fn exact_skill_match_scores_full_marks() {
        let outcome = score(
            &parameters(&[("React", 5)], &[]),
            &candidate(&["React", "Node"]),
        );
        assert_eq!((outcome.score, outcome.matched, outcome.total), (100, 5, 5));
    }

    #[test]
    fn missing_skill_scores_zero() {
        let outcome = score(&parameters(&[("React", 5)], &[]), &candidate(&["Node"]));
        assert_eq!((outcome.score, outcome.matched, outcome.total), (0, 0, 5));
        assert_eq!(outcome.missing().count(), 1);
    }

    #[test]
    fn skill_match_is_case_sensitive() {
        let outcome = score(&parameters(&[("React", 5)], &[]), &candidate(&["react"]));
        assert_eq!(outcome.matched, 0);
    }

    #[test]
    fn keywords_match_anywhere_case_insensitively() {
        let mut resume = candidate(&["Node"]);
        resume.personal_info.summary = Some("Graduate engineer".to_string());

        let outcome = score(&parameters(&[("React", 5)], &[("graduate", 5)]), &resume);
        assert_eq!((outcome.score, outcome.matched, outcome.total), (50, 5, 10));
    }

    #[test]
    fn keyword_search_ignores_cached_score_and_version() {
        let mut resume = candidate(&[]);
        resume.ats_score = Some(77);
        resume.version = 77;

        let outcome = score(&parameters(&[], &[("77", 3)]), &resume);
        assert_eq!(outcome.matched, 0);
    }

    #[test]
    fn contact_point_requires_email_and_phone() {
        let mut set = parameters(&[], &[]);
        set.format_requirements.requires_contact_info = true;

        let mut resume = candidate(&[]);
        let without_phone = score(&set, &resume);
        assert_eq!((without_phone.matched, without_phone.total), (0, 1));

        resume.personal_info.phone = Some("   ".to_string());
        assert_eq!(score(&set, &resume).matched, 0);

        resume.personal_info.phone = Some("+91 98450 00000".to_string());
        assert_eq!(score(&set, &resume).score, 100);
    }

    #[test]
    fn education_point_requires_an_entry() {
        let mut set = parameters(&[], &[]);
        set.format_requirements.requires_education = true;

        let mut resume = candidate(&[]);
        assert_eq!(score(&set, &resume).score, 0);

        resume.education.push(EducationEntry {
            institution: "IIT Madras".to_string(),
            ..EducationEntry::default()
        });
        assert_eq!(score(&set, &resume).score, 100);
    }

    #[test]
    fn one_of_three_rounds_down_to_thirty_three() {
        let set = parameters(&[("React", 1), ("Rust", 1), ("Go", 1)], &[]);
        let outcome = score(&set, &candidate(&["Rust"]));
        assert_eq!((outcome.matched, outcome.total, outcome.score), (1, 3, 33));
    }

    #[test]
    fn adding_matches_never_lowers_the_score() {
        let set = parameters(&[("React", 4), ("SQL", 2)], &[("kubernetes", 3)]);
        let mut resume = candidate(&["React"]);
        let before = score(&set, &resume).score;

        resume.skills.push("SQL".to_string());
        let with_skill = score(&set, &resume).score;
        assert!(with_skill >= before);

        resume.experience.push(crate::ats::domain::ExperienceEntry {
            title: "Intern".to_string(),
            organization: "Cloudworks".to_string(),
            description: Some("Ran Kubernetes clusters".to_string()),
            ..Default::default()
        });
        let with_keyword = score(&set, &resume).score;
        assert!(with_keyword >= with_skill);
        assert_eq!(with_keyword, 100);
    }

    #[test]
    fn score_stays_within_bounds_and_repeats() {
        let mut set = parameters(&[("React", 10), ("Rust", 1)], &[("asha", 5), ("zzz", 1)]);
        set.format_requirements = FormatRequirements::default();
        let resume = candidate(&["React", "Rust"]);

        let first = score(&set, &resume);
        let second = score(&set, &resume);
        assert_eq!(first, second);
        assert!(first.score <= 100);
        assert!(first.matched <= first.total);
    }
}
