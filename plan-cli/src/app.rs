//! Glue between the command line, the loaders and the calculation core.

use std::fs::{self, File};
use std::path::Path;

use anyhow::{Context, Result};
use plan_core::{
    ChildSupportWorksheet, FinancialDerivationEngine, FormData, Section, SectionValidator,
    SupportSchedule, UploadedFiles, ValidationErrors,
};
use plan_data::{AnswersLoader, ScheduleLoader};
use tracing::{debug, info};

use crate::config::PlanConfig;
use crate::utils::{parse_assignment, parse_uploads};

/// Validation outcome for one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionReport {
    pub id: String,
    pub title: String,
    pub errors: ValidationErrors,
}

/// Builds the derivation engine from the configured guideline and schedule.
///
/// `schedule` overrides the schedule named in the config file; with neither
/// the built-in schedule is used.
pub fn build_engine(
    config: &PlanConfig,
    schedule: Option<&Path>,
) -> Result<FinancialDerivationEngine> {
    let guideline = config
        .guideline_config()
        .context("Failed to apply guideline settings")?;

    let schedule = match schedule.or(config.schedule.as_deref()) {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open: {}", path.display()))?;
            let schedule = ScheduleLoader::parse(file)
                .with_context(|| format!("Failed to parse schedule: {}", path.display()))?;
            info!(path = %path.display(), brackets = schedule.brackets().len(), "loaded support schedule");
            schedule
        }
        None => SupportSchedule::standard(),
    };

    let worksheet = ChildSupportWorksheet::new(guideline, schedule)?;
    Ok(FinancialDerivationEngine::new(worksheet))
}

/// Reads saved answers, then applies `path=value` overrides in order.
pub fn load_answers(
    path: Option<&Path>,
    assignments: &[String],
) -> Result<FormData> {
    let mut answers = match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open: {}", path.display()))?;
            AnswersLoader::parse(file)
                .with_context(|| format!("Failed to parse answers: {}", path.display()))?
        }
        None => FormData::new(),
    };

    for assignment in assignments {
        let (path, value) = parse_assignment(assignment)?;
        debug!(path = %path, kind = value.kind(), "applying answer override");
        answers = answers.set(&path, value);
    }
    Ok(answers)
}

pub fn load_uploads(path: Option<&Path>) -> Result<UploadedFiles> {
    let Some(path) = path else {
        return Ok(UploadedFiles::new());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read upload list: {}", path.display()))?;
    parse_uploads(&text).with_context(|| format!("Failed to parse upload list: {}", path.display()))
}

/// Validates every section, in order.
pub fn validate_all(
    sections: &[Section],
    answers: &FormData,
    uploads: &UploadedFiles,
) -> Vec<SectionReport> {
    sections
        .iter()
        .map(|section| SectionReport {
            id: section.id.clone(),
            title: section.title.clone(),
            errors: SectionValidator::validate(section, answers, uploads),
        })
        .collect()
}
