/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh)
/// - `account`: Account management and deletion
/// - `companies`: Company registration, listing and search
/// - `reviews`: Review submission, editing and withdrawal
/// - `admin`: Moderation queue operations

pub mod account;
pub mod admin;
pub mod auth;
pub mod companies;
pub mod health;
pub mod reviews;
