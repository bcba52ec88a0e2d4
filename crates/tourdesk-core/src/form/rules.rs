//! Field validation rules shared by the drafts.

use std::path::Path;
use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;

use crate::models::PhotoUpload;

/// Profile photos are capped at 5 MiB.
pub const MAX_PHOTO_BYTES: u64 = 5120 * 1024;

pub const ALLOWED_PHOTO_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

pub const PHOTO_SIZE_ERROR: &str = "Photo size must be less than 5MB";
pub const PHOTO_TYPE_ERROR: &str = "Please select a valid image file (JPEG, PNG, GIF, WebP)";
pub const END_TIME_ORDER_ERROR: &str = "End time must be after start time";
pub const TIME_FORMAT_ERROR: &str = "Time must be HH:MM";

/// Loose `something@something.something` shape, the same one the API's own
/// forms accept. Anything stricter is left to the server.
const EMAIL_PATTERN: &str = r"\S+@\S+\.\S+";

static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE
        .get_or_init(|| Regex::new(EMAIL_PATTERN).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(email))
}

/// Validation message for an email field, if any.
pub fn email_error(email: &str) -> Option<&'static str> {
    if is_blank(email) {
        Some("Email is required")
    } else if !is_valid_email(email) {
        Some("Email is invalid")
    } else {
        None
    }
}

pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Type is checked after size, so a wrong type is the reported problem.
pub fn photo_error(photo: &PhotoUpload) -> Option<&'static str> {
    if !ALLOWED_PHOTO_TYPES.contains(&photo.mime_type.as_str()) {
        Some(PHOTO_TYPE_ERROR)
    } else if photo.size() > MAX_PHOTO_BYTES {
        Some(PHOTO_SIZE_ERROR)
    } else {
        None
    }
}

/// Read a photo from disk. Size is checked from metadata before reading.
pub fn load_photo(path: &Path) -> Result<PhotoUpload, String> {
    let mime_type = mime_from_extension(path).ok_or_else(|| PHOTO_TYPE_ERROR.to_string())?;
    let meta = std::fs::metadata(path).map_err(|e| format!("Cannot read photo: {}", e))?;
    if !meta.is_file() {
        return Err("Photo path is not a file".to_string());
    }
    if meta.len() > MAX_PHOTO_BYTES {
        return Err(PHOTO_SIZE_ERROR.to_string());
    }
    let bytes = std::fs::read(path).map_err(|e| format!("Cannot read photo: {}", e))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("photo")
        .to_string();
    Ok(PhotoUpload {
        file_name,
        mime_type: mime_type.to_string(),
        bytes,
    })
}

pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Validation message for a clock-time field, if any.
pub fn time_error(value: &str, required: &'static str) -> Option<&'static str> {
    if is_blank(value) {
        Some(required)
    } else if parse_time(value).is_none() {
        Some(TIME_FORMAT_ERROR)
    } else {
        None
    }
}

/// True when both values are clock times and `start` is strictly before `end`.
pub fn is_time_ordered(start: &str, end: &str) -> bool {
    match (parse_time(start), parse_time(end)) {
        (Some(s), Some(e)) => s < e,
        _ => false,
    }
}

pub fn parse_number<T: std::str::FromStr + Default>(input: &str) -> Result<T, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(T::default());
    }
    input.parse().map_err(|_| "Must be a number".to_string())
}
