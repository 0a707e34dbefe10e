use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::domain::{
    default_true, FormatRequirements, ParameterSet, ParameterSetId, UserId, WeightedKeyword,
    WeightedSkill,
};

pub const SKILL_WEIGHT_RANGE: std::ops::RangeInclusive<u8> = 1..=10;
pub const KEYWORD_WEIGHT_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// Rejections raised before a parameter set is stored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParameterValidationError {
    #[error("parameter set name must not be blank")]
    BlankName,
    #[error("required skill at position {index} is blank")]
    BlankSkill { index: usize },
    #[error("keyword at position {index} is blank")]
    BlankKeyword { index: usize },
    #[error("skill '{skill}' has weight {weight}; expected 1-10")]
    SkillWeight { skill: String, weight: u8 },
    #[error("keyword '{keyword}' has weight {weight}; expected 1-5")]
    KeywordWeight { keyword: String, weight: u8 },
    #[error("update payload changes nothing")]
    EmptyPatch,
}

/// Creation payload submitted by a recruiter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSetDraft {
    pub name: String,
    #[serde(default)]
    pub required_skills: Vec<WeightedSkill>,
    #[serde(default)]
    pub required_experience: u32,
    #[serde(default)]
    pub required_education: Option<String>,
    #[serde(default)]
    pub keywords: Vec<WeightedKeyword>,
    #[serde(default)]
    pub format_requirements: FormatRequirements,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl ParameterSetDraft {
    pub fn validate(&self) -> Result<(), ParameterValidationError> {
        validate_name(&self.name)?;
        validate_skills(&self.required_skills)?;
        validate_keywords(&self.keywords)
    }

    pub fn into_parameter_set(
        self,
        id: ParameterSetId,
        owner_id: UserId,
        now: DateTime<Utc>,
    ) -> ParameterSet {
        ParameterSet {
            id,
            owner_id,
            name: self.name.trim().to_string(),
            required_skills: self.required_skills,
            required_experience: self.required_experience,
            required_education: self.required_education,
            keywords: self.keywords,
            format_requirements: self.format_requirements,
            active: self.active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Absent field stays `None`; an explicit `null` becomes `Some(None)`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Nested partial update for [`FormatRequirements`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatRequirementsPatch {
    #[serde(default, deserialize_with = "nullable")]
    pub preferred_length: Option<Option<u32>>,
    #[serde(default)]
    pub requires_contact_info: Option<bool>,
    #[serde(default)]
    pub requires_education: Option<bool>,
}

impl FormatRequirementsPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Partial update: only fields present in the payload change. Nullable fields
/// are cleared by an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSetPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub required_skills: Option<Vec<WeightedSkill>>,
    #[serde(default)]
    pub required_experience: Option<u32>,
    #[serde(default, deserialize_with = "nullable")]
    pub required_education: Option<Option<String>>,
    #[serde(default)]
    pub keywords: Option<Vec<WeightedKeyword>>,
    #[serde(default)]
    pub format_requirements: Option<FormatRequirementsPatch>,
    #[serde(default)]
    pub active: Option<bool>,
}

impl ParameterSetPatch {
    pub fn validate(&self) -> Result<(), ParameterValidationError> {
        if self.is_empty() {
            return Err(ParameterValidationError::EmptyPatch);
        }
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(skills) = &self.required_skills {
            validate_skills(skills)?;
        }
        if let Some(keywords) = &self.keywords {
            validate_keywords(keywords)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.required_skills.is_none()
            && self.required_experience.is_none()
            && self.required_education.is_none()
            && self.keywords.is_none()
            && self.format_requirements.map_or(true, |format| format.is_empty())
            && self.active.is_none()
    }

    /// Apply onto a stored set. Callers validate first.
    pub fn apply(self, target: &mut ParameterSet, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            target.name = name.trim().to_string();
        }
        if let Some(skills) = self.required_skills {
            target.required_skills = skills;
        }
        if let Some(years) = self.required_experience {
            target.required_experience = years;
        }
        if let Some(education) = self.required_education {
            target.required_education = education;
        }
        if let Some(keywords) = self.keywords {
            target.keywords = keywords;
        }
        if let Some(format) = self.format_requirements {
            let current = &mut target.format_requirements;
            if let Some(length) = format.preferred_length {
                current.preferred_length = length;
            }
            if let Some(flag) = format.requires_contact_info {
                current.requires_contact_info = flag;
            }
            if let Some(flag) = format.requires_education {
                current.requires_education = flag;
            }
        }
        if let Some(active) = self.active {
            target.active = active;
        }
        target.updated_at = now;
    }
}

fn validate_name(name: &str) -> Result<(), ParameterValidationError> {
    if name.trim().is_empty() {
        return Err(ParameterValidationError::BlankName);
    }
    Ok(())
}

fn validate_skills(skills: &[WeightedSkill]) -> Result<(), ParameterValidationError> {
    for (index, entry) in skills.iter().enumerate() {
        if entry.skill.trim().is_empty() {
            return Err(ParameterValidationError::BlankSkill { index });
        }
        if !SKILL_WEIGHT_RANGE.contains(&entry.weight) {
            return Err(ParameterValidationError::SkillWeight {
                skill: entry.skill.clone(),
                weight: entry.weight,
            });
        }
    }
    Ok(())
}

fn validate_keywords(keywords: &[WeightedKeyword]) -> Result<(), ParameterValidationError> {
    for (index, entry) in keywords.iter().enumerate() {
        if entry.keyword.trim().is_empty() {
            return Err(ParameterValidationError::BlankKeyword { index });
        }
        if !KEYWORD_WEIGHT_RANGE.contains(&entry.weight) {
            return Err(ParameterValidationError::KeywordWeight {
                keyword: entry.keyword.clone(),
                weight: entry.weight,
            });
        }
    }
    Ok(())
}
