//! CSV serialization of scrape records.
//!
//! One header row, then one row per record in the order given. Fields are
//! quoted only when they contain a comma, a quote or a line break.

use crate::types::DetailRecord;

/// Column names, in output order.
pub const CSV_HEADER: &[&str] = &[
    "login",
    "name",
    "location",
    "bio",
    "company",
    "blog",
    "email",
    "twitter_username",
    "html_url",
    "followers",
    "following",
    "public_repos",
    "created_at",
    "updated_at",
    "confidence_score",
    "is_likely",
    "provenance",
];

/// Separator used to flatten the provenance list into one field.
pub const PROVENANCE_SEPARATOR: &str = " | ";

/// Serialize records to CSV. Rows end with `\n`.
#[must_use]
pub fn records_to_csv(records: &[DetailRecord]) -> String {
    let mut out = String::new();
    push_row(&mut out, CSV_HEADER.iter().map(|h| (*h).to_owned()));
    for record in records {
        push_row(&mut out, record_fields(record));
    }
    out
}

/// Quote a field if it contains a separator, quote or line break.
#[must_use]
pub fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

fn push_row(out: &mut String, fields: impl Iterator<Item = String>) {
    let row = fields
        .map(|f| escape_field(&f))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&row);
    out.push('\n');
}

fn record_fields(record: &DetailRecord) -> impl Iterator<Item = String> {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    let timestamp = |v: &Option<chrono::DateTime<chrono::Utc>>| {
        v.map(|t| t.to_rfc3339()).unwrap_or_default()
    };

    [
        record.login.clone(),
        text(&record.name),
        text(&record.location),
        text(&record.bio),
        text(&record.company),
        text(&record.blog),
        text(&record.email),
        text(&record.twitter_username),
        record.html_url.clone(),
        record.followers.to_string(),
        record.following.to_string(),
        record.public_repos.to_string(),
        timestamp(&record.created_at),
        timestamp(&record.updated_at),
        record.confidence_score.to_string(),
        record.is_likely.to_string(),
        record.provenance.join(PROVENANCE_SEPARATOR),
    ]
    .into_iter()
}
