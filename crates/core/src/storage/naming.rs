//! Object naming rules.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeZone, Utc};

/// Last millisecond stamp handed out by [`unique_stamp`].
static LAST_STAMP_MILLIS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Replace every character outside `[A-Za-z0-9._-]` with `-`.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Millisecond stamp for a new object, strictly increasing within the process.
///
/// Uploads landing in the same millisecond are pushed forward one millisecond
/// each, so names built from the stamp never collide.
#[must_use]
pub fn unique_stamp(now: DateTime<Utc>) -> DateTime<Utc> {
    let wanted = now.timestamp_millis();
    let next = |last: i64| wanted.max(last.saturating_add(1));
    let previous = LAST_STAMP_MILLIS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(next(last)))
        .unwrap_or_else(|last| last);
    Utc.timestamp_millis_opt(next(previous))
        .single()
        .unwrap_or(now)
}

/// Server-assigned object name: `{millis}-{sanitized original}`.
#[must_use]
pub fn object_name(original: &str, now: DateTime<Utc>) -> String {
    format!("{}-{}", now.timestamp_millis(), sanitize_filename(original))
}

/// Recover the upload time encoded in an object name, if it has one.
#[must_use]
pub fn created_at_from_name(name: &str) -> Option<DateTime<Utc>> {
    let (millis, _) = name.split_once('-')?;
    if millis.is_empty() || !millis.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Utc.timestamp_millis_opt(millis.parse().ok()?).single()
}

/// Join a folder and an object name.
#[must_use]
pub fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}
