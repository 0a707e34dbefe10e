use serde::Serialize;

use super::super::domain::{
    CandidateDocument, CertificationEntry, EducationEntry, ExperienceEntry, ParameterSet,
    PersonalInfo, ProjectEntry, ResumeId, UserId,
};
use super::{CriterionKind, CriterionScore};

/// Resume fields searched by keyword criteria. Everything except the cached
/// score and the write token, so a stored score never changes the next run.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchableDocument<'a> {
    id: &'a ResumeId,
    owner_id: &'a UserId,
    skills: &'a [String],
    personal_info: &'a PersonalInfo,
    education: &'a [EducationEntry],
    experience: &'a [ExperienceEntry],
    projects: &'a [ProjectEntry],
    certifications: &'a [CertificationEntry],
}

pub(crate) fn keyword_corpus(candidate: &CandidateDocument) -> Result<String, serde_json::Error> {
    let searchable = SearchableDocument {
        id: &candidate.id,
        owner_id: &candidate.owner_id,
        skills: &candidate.skills,
        personal_info: &candidate.personal_info,
        education: &candidate.education,
        experience: &candidate.experience,
        projects: &candidate.projects,
        certifications: &candidate.certifications,
    };
    Ok(serde_json::to_string(&searchable)?.to_lowercase())
}

pub(crate) fn score_skills(
    parameters: &ParameterSet,
    candidate: &CandidateDocument,
    criteria: &mut Vec<CriterionScore>,
) {
    for entry in &parameters.required_skills {
        criteria.push(CriterionScore {
            kind: CriterionKind::Skill,
            label: entry.skill.clone(),
            weight: u32::from(entry.weight),
            matched: candidate.has_skill(&entry.skill),
        });
    }
}

pub(crate) fn score_keywords(
    parameters: &ParameterSet,
    corpus: &str,
    criteria: &mut Vec<CriterionScore>,
) {
    for entry in &parameters.keywords {
        criteria.push(CriterionScore {
            kind: CriterionKind::Keyword,
            label: entry.keyword.clone(),
            weight: u32::from(entry.weight),
            matched: corpus.contains(&entry.keyword.to_lowercase()),
        });
    }
}

pub(crate) fn score_format(
    parameters: &ParameterSet,
    candidate: &CandidateDocument,
    criteria: &mut Vec<CriterionScore>,
) {
    let format = &parameters.format_requirements;

    if format.requires_contact_info {
        criteria.push(CriterionScore {
            kind: CriterionKind::ContactInfo,
            label: "email and phone present".to_string(),
            weight: 1,
            matched: candidate.personal_info.has_contact_details(),
        });
    }

    if format.requires_education {
        criteria.push(CriterionScore {
            kind: CriterionKind::Education,
            label: "education listed".to_string(),
            weight: 1,
            matched: !candidate.education.is_empty(),
        });
    }
}

/// `matched / total` as a whole percentage, rounding halves up. Zero when
/// nothing was possible.
pub(crate) fn percentage(matched: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let matched = u64::from(matched.min(total));
    let total = u64::from(total);
    let rounded = (matched * 200 + total) / (total * 2);
    rounded as u8
}
