//! Client-side form validation.
//!
//! Forms are checked before anything is sent so that obviously bad input
//! never costs a round trip. The backend still validates everything.

use std::path::Path;

use chrono::{Datelike, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Result, ValidationErrors};
use crate::models::{NewBook, NewBranch, NewStaff};

pub const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_NAME_LENGTH: usize = 100;
const UPLOAD_EXTENSIONS: &[&str] = &["pdf", "epub", "doc", "docx"];

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9-]+(\.[a-zA-Z0-9-]+)*\.[a-zA-Z]{2,}$"
    ).unwrap();

    /// Optional leading +, then 7-15 digits once spaces and dashes are removed
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9]{7,15}$").unwrap();
}

pub fn validate_name(name: &str) -> std::result::Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Name is required".to_string());
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(format!("Name is too long (max {} characters)", MAX_NAME_LENGTH));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> std::result::Result<(), String> {
    let email = email.trim();
    if email.is_empty() {
        return Err("Email is required".to_string());
    }
    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> std::result::Result<(), String> {
    let compact: String = phone
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    if compact.is_empty() {
        return Err("Phone number is required".to_string());
    }
    if !PHONE_REGEX.is_match(&compact) {
        return Err("Phone number must be 7 to 15 digits".to_string());
    }
    Ok(())
}

pub fn validate_password(password: &str) -> std::result::Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }
    Ok(())
}

pub fn validate_year(year: Option<i32>) -> std::result::Result<(), String> {
    if let Some(year) = year {
        let max = Utc::now().year() + 1;
        if !(1000..=max).contains(&year) {
            return Err(format!("Year must be between 1000 and {}", max));
        }
    }
    Ok(())
}

pub fn validate_upload_file(path: &Path) -> std::result::Result<(), String> {
    if !path.is_file() {
        return Err(format!("File not found: {}", path.display()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if !UPLOAD_EXTENSIONS.contains(&extension.as_str()) {
        return Err(format!(
            "Unsupported file type. Allowed: {}",
            UPLOAD_EXTENSIONS.join(", ")
        ));
    }
    Ok(())
}

pub fn validate_new_staff(staff: &NewStaff) -> Result<()> {
    let mut errors = ValidationErrors::new();
    errors.check("name", validate_name(&staff.name));
    errors.check("email", validate_email(&staff.email));
    errors.check("phone", validate_phone(&staff.phone));
    errors.check("password", validate_password(&staff.password));
    errors.finish()
}

pub fn validate_new_book(book: &NewBook) -> Result<()> {
    let mut errors = ValidationErrors::new();
    if book.title.trim().is_empty() {
        errors.add("title", "Title is required");
    }
    if book.author.trim().is_empty() {
        errors.add("author", "Author is required");
    }
    errors.check("year", validate_year(book.year));
    errors.check("file", validate_upload_file(&book.file));
    errors.finish()
}

pub fn validate_new_branch(branch: &NewBranch) -> Result<()> {
    let mut errors = ValidationErrors::new();
    errors.check("name", validate_name(&branch.name));
    errors.finish()
}
