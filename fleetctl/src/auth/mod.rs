//! Credential handling for user accounts.
//!
//! Only password hashing lives here. Single sign-on users carry an external subject id and are
//! never verified locally.

pub mod password;
