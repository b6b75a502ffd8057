//! # firmrate shared library
//!
//! Core functionality shared by the firmrate services.
//!
//! ## Modules
//!
//! - `auth`: Password hashing, JWT tokens, auth context and guards
//! - `collation`: Locale-aware name ordering
//! - `db`: Connection pool and migrations
//! - `email`: Address validation and normalization
//! - `mail`: Transactional email delivery
//! - `models`: Database models and CRUD operations

pub mod auth;
pub mod collation;
pub mod db;
pub mod email;
pub mod mail;
pub mod models;
