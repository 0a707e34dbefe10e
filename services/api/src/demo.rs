use crate::infra::{InMemoryCandidates, InMemoryParameterSets};
use chrono::Utc;
use clap::Args;
use internmatch::ats::{
    AtsScorer, AtsService, CandidateDocument, EducationEntry, ExperienceEntry, FormatRequirements,
    ParameterSetDraft, ParameterSetId, PersonalInfo, Principal, ProjectEntry, ResumeId,
    ResumeSubmission, Role, ScoreOutcome, ScoreView, UserId, WeightedKeyword, WeightedSkill,
};
use internmatch::config::ScoringConfig;
use internmatch::error::AppError;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Parameter-set JSON (same shape as the POST /ats/parameters body)
    #[arg(long)]
    pub(crate) parameters: PathBuf,
    /// Resume JSON (same shape as the POST /ats/resumes body)
    #[arg(long)]
    pub(crate) resume: PathBuf,
    /// Print the API response shape instead of the per-criterion breakdown
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Let recruiters score with parameter sets they do not own
    #[arg(long)]
    pub(crate) relax_parameter_ownership: bool,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        parameters,
        resume,
        json,
    } = args;

    let draft: ParameterSetDraft = serde_json::from_str(&fs::read_to_string(&parameters)?)?;
    let submission: ResumeSubmission = serde_json::from_str(&fs::read_to_string(&resume)?)?;
    let outcome = score_files(draft, submission)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ScoreView::from(&outcome))?);
    } else {
        render_outcome("Offline score", &outcome);
    }
    Ok(())
}

fn score_files(
    draft: ParameterSetDraft,
    submission: ResumeSubmission,
) -> Result<ScoreOutcome, AppError> {
    draft
        .validate()
        .map_err(|err| AppError::Ats(err.into()))?;

    let parameters = draft.into_parameter_set(
        ParameterSetId("offline".to_string()),
        UserId("offline".to_string()),
        Utc::now(),
    );
    let candidate = CandidateDocument::from_submission(
        ResumeId("offline".to_string()),
        UserId("offline".to_string()),
        submission,
    );

    Ok(AtsScorer::new().compute(&parameters, &candidate)?)
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = ScoringConfig {
        enforce_parameter_ownership: !args.relax_parameter_ownership,
        ..ScoringConfig::default()
    };
    let service = AtsService::new(
        Arc::new(InMemoryParameterSets::default()),
        Arc::new(InMemoryCandidates::default()),
        config,
    );

    let recruiter = Principal::new("demo-recruiter", Role::Recruiter);
    let rival = Principal::new("rival-recruiter", Role::Recruiter);
    let student = Principal::new("demo-student", Role::Student);
    let classmate = Principal::new("demo-classmate", Role::Student);

    println!("InternMatch ATS demo");

    let parameters = service.create_parameter_set(&recruiter, demo_parameters())?;
    println!(
        "Recruiter {} created parameter set {} ({} skills, {} keywords)",
        recruiter.user_id,
        parameters.id,
        parameters.required_skills.len(),
        parameters.keywords.len()
    );

    let resume = service.submit_resume(&student, demo_resume())?;
    println!("Student {} submitted resume {}", student.user_id, resume.id);

    let first = service.calculate_score(&student, &resume.id, &parameters.id)?;
    render_outcome("\nInitial score", &first);

    let mut improved = demo_resume();
    improved.skills.push("TypeScript".to_string());
    improved.personal_info.phone = Some("+91 98200 12345".to_string());
    let updated = service.replace_resume(&student, &resume.id, improved)?;
    println!(
        "\nResume updated (version {}); cached score still {:?} until rescored",
        updated.version, updated.ats_score
    );

    let second = service.calculate_score(&recruiter, &resume.id, &parameters.id)?;
    render_outcome("Rescored by recruiter", &second);

    println!("\nAccess checks");
    match service.calculate_score(&classmate, &resume.id, &parameters.id) {
        Ok(outcome) => println!("- classmate scored resume: {}", outcome.score),
        Err(err) => println!("- classmate denied: {err}"),
    }
    match service.calculate_score(&rival, &resume.id, &parameters.id) {
        Ok(outcome) => println!("- rival recruiter scored with foreign set: {}", outcome.score),
        Err(err) => println!("- rival recruiter denied: {err}"),
    }

    Ok(())
}

fn render_outcome(title: &str, outcome: &ScoreOutcome) {
    println!(
        "{title}: {} / 100 ({} of {} weight matched)",
        outcome.score, outcome.matched, outcome.total
    );
    for criterion in &outcome.criteria {
        let mark = if criterion.matched { "x" } else { " " };
        println!(
            "  [{mark}] {:?} '{}' (weight {})",
            criterion.kind, criterion.label, criterion.weight
        );
    }
}

fn demo_parameters() -> ParameterSetDraft {
    ParameterSetDraft {
        name: "Frontend micro-internship".to_string(),
        required_skills: vec![
            WeightedSkill {
                skill: "React".to_string(),
                weight: 8,
            },
            WeightedSkill {
                skill: "TypeScript".to_string(),
                weight: 5,
            },
        ],
        required_experience: 0,
        required_education: Some("Pursuing a bachelor's degree".to_string()),
        keywords: vec![
            WeightedKeyword {
                keyword: "accessibility".to_string(),
                weight: 3,
            },
            WeightedKeyword {
                keyword: "open source".to_string(),
                weight: 2,
            },
        ],
        format_requirements: FormatRequirements::default(),
        active: true,
    }
}

fn demo_resume() -> ResumeSubmission {
    ResumeSubmission {
        skills: vec!["React".to_string(), "CSS".to_string()],
        personal_info: PersonalInfo {
            name: "Ananya Menon".to_string(),
            email: Some("ananya@example.edu".to_string()),
            phone: None,
            location: Some("Kochi".to_string()),
            summary: Some("Third-year student who cares about accessibility".to_string()),
            links: vec!["https://github.com/ananya-dev".to_string()],
        },
        education: vec![EducationEntry {
            institution: "Cochin University".to_string(),
            degree: Some("B.Tech".to_string()),
            field_of_study: Some("Information Technology".to_string()),
            start_year: Some(2023),
            end_year: Some(2027),
            grade: None,
        }],
        experience: vec![ExperienceEntry {
            title: "Web volunteer".to_string(),
            organization: "Kerala Startup Mission".to_string(),
            start_date: Some("2024-06".to_string()),
            end_date: Some("2024-08".to_string()),
            description: Some("Rebuilt event pages in React".to_string()),
        }],
        projects: vec![ProjectEntry {
            name: "Screen-reader friendly timetable".to_string(),
            description: None,
            technologies: vec!["React".to_string()],
            link: None,
        }],
        certifications: Vec::new(),
    }
}
