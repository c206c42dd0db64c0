//! API route handlers

pub mod health;
pub mod logs;
pub mod wellbores;
pub mod wells;
