//! Plain-text and JSON rendering of command results.
//!
//! Amounts are rounded half-up to cents here and only here.

use std::fmt::{self, Write};

use anyhow::Result;
use clap::ValueEnum;
use plan_core::{DerivedValues, Parent, Section};

use crate::app::SectionReport;
use crate::utils::{money, opt_parent_display, percent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn render_derived(
    derived: &DerivedValues,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let mut out = String::new();
            write_derived(&mut out, derived)?;
            Ok(out)
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(derived)?),
    }
}

fn write_derived(
    out: &mut String,
    derived: &DerivedValues,
) -> fmt::Result {
    let incomes = &derived.incomes;

    writeln!(out, "Income")?;
    for parent in Parent::BOTH {
        writeln!(
            out,
            "  {:<28}{:>14}  ({})",
            format!("{} net income", opt_parent_display(Some(parent))),
            money(incomes.net_income(parent)),
            percent(incomes.income_percentage(parent)),
        )?;
    }
    writeln!(out, "  {:<28}{:>14}", "Combined net income", money(incomes.combined_net_income))?;

    let Some(support) = &derived.child_support else {
        writeln!(out)?;
        return writeln!(out, "Child support: no children entered");
    };

    writeln!(out)?;
    writeln!(out, "Child support")?;
    let basis = if support.used_percentage_fallback {
        "Basic obligation (above schedule)"
    } else {
        "Basic obligation"
    };
    let rows = [
        (basis.to_string(), money(support.basic_obligation)),
        ("Parent 1 share".to_string(), money(support.parent1_share)),
        ("Parent 2 share".to_string(), money(support.parent2_share)),
        (
            "Health insurance difference".to_string(),
            money(support.health_insurance_share.difference()),
        ),
        ("Childcare difference".to_string(), money(support.childcare_share.difference())),
        (
            format!(
                "Time-sharing ({} / {})",
                percent(support.parent1_overnight_percentage),
                percent(support.parent2_overnight_percentage)
            ),
            money(support.time_sharing_adjustment),
        ),
        ("Final monthly amount".to_string(), money(support.final_amount)),
    ];
    for (label, amount) in rows {
        writeln!(out, "  {label:<34}{amount:>14}")?;
    }
    writeln!(
        out,
        "  Paid by {} to {}",
        opt_parent_display(support.paying_parent),
        opt_parent_display(support.receiving_parent)
    )
}

/// Lists failing sections and their errors, or confirms all passed.
pub fn render_validation(
    reports: &[SectionReport],
    format: OutputFormat,
) -> Result<String> {
    if format == OutputFormat::Json {
        let map: serde_json::Map<String, serde_json::Value> = reports
            .iter()
            .filter(|r| !r.errors.is_empty())
            .map(|r| -> Result<(String, serde_json::Value)> {
                Ok((r.id.clone(), serde_json::to_value(&r.errors)?))
            })
            .collect::<Result<_>>()?;
        return Ok(serde_json::to_string_pretty(&map)?);
    }

    let mut out = String::new();
    write_validation(&mut out, reports)?;
    Ok(out)
}

fn write_validation(
    out: &mut String,
    reports: &[SectionReport],
) -> fmt::Result {
    for report in reports {
        if report.errors.is_empty() {
            writeln!(out, "[ok]   {}", report.title)?;
            continue;
        }
        writeln!(out, "[fail] {}", report.title)?;
        for (field, message) in report.errors.iter() {
            writeln!(out, "         {field}: {message}")?;
        }
    }
    Ok(())
}

pub fn render_sections(sections: &[Section]) -> Result<String> {
    let mut out = String::new();
    write_sections(&mut out, sections)?;
    Ok(out)
}

fn write_sections(
    out: &mut String,
    sections: &[Section],
) -> fmt::Result {
    for (index, section) in sections.iter().enumerate() {
        writeln!(out, "{}. {} ({})", index + 1, section.title, section.id)?;
        for question in &section.questions {
            let marker = if question.required { "*" } else { " " };
            writeln!(
                out,
                "   {marker} {:<44} {:<15} {}",
                question.id,
                question.kind.as_str(),
                question.label
            )?;
        }
    }
    Ok(())
}
