//! Prompt construction for the two grant searches.
//!
//! The homepage cache uses a fixed demographic profile and a "recent and
//! upcoming" window; the dashboard search embeds the caller's profile and
//! asks for deadlines within the next three years.

use chrono::{Datelike, NaiveDate};
use grantbridge_core::LegacyProfile;

/// Demographic profile used for the homepage featured grants.
pub const FEATURED_PROFILE: &[(&str, &str)] = &[
    ("Age", "18-24"),
    ("Country", "United States"),
    ("Education", "Undergraduate student"),
    ("Field of study", "Any"),
    ("Financial need", "Yes"),
];

/// Number of grants requested per featured search.
pub const FEATURED_REQUEST_COUNT: usize = 10;

/// Years ahead covered by the dashboard search.
pub const SEARCH_WINDOW_YEARS: i32 = 3;

const RECORD_FIELDS: &str = "title, description, amount, deadline (YYYY-MM-DD when known), eligibility \
    (one criterion per line), organization, requirements (separated by semicolons), tags (comma separated) \
    and link (the official application URL)";

/// Prompt for the cached homepage grants.
pub fn featured_prompt(today: NaiveDate) -> String {
    let profile = FEATURED_PROFILE
        .iter()
        .map(|(label, value)| format!("- {label}: {value}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Today is {today}. Find {FEATURED_REQUEST_COUNT} recent and upcoming scholarships or grants that are \
         currently open or opening soon for a student with this profile:\n{profile}\n\n\
         Prefer well-known national programs with verifiable application pages. \
         For each grant return {RECORD_FIELDS}.",
        today = today.format("%Y-%m-%d"),
    )
}

/// Prompt for the personalized dashboard search.
pub fn dashboard_prompt(profile: &LegacyProfile, today: NaiveDate) -> String {
    let identifiers = if profile.identifiers.is_empty() {
        "None".to_string()
    } else {
        profile.identifiers.join(", ")
    };

    let lines = [
        ("Age", profile.age.to_string()),
        ("Country", profile.country.clone()),
        ("Gender", profile.gender.clone()),
        ("Citizenship", profile.citizenship.clone()),
        ("Education level", profile.education.clone()),
        ("Degree type", profile.degree_type.clone()),
        ("Year of study", profile.year_of_study.clone()),
        ("Field of study", profile.field_of_study.clone()),
        ("GPA", profile.gpa.clone()),
        ("Income bracket", profile.income_bracket.clone()),
        ("Ethnicity", profile.ethnicity.clone()),
        ("Financial need", if profile.financial_need { "Yes" } else { "No" }.to_string()),
        ("Identifiers", identifiers),
    ];

    let described = lines
        .iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(label, value)| format!("- {label}: {value}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Today is {today}. Find scholarships and grants this student is eligible for with application \
         deadlines between now and {until}:\n{described}\n\n\
         Only include opportunities whose eligibility matches the profile. \
         For each grant return {RECORD_FIELDS}, plus difficulty (Easy, Medium or Hard).",
        today = today.format("%Y-%m-%d"),
        until = today.year() + SEARCH_WINDOW_YEARS,
    )
}
