/// State management module
///
/// This module handles all application state, including:
/// - The ordered image set and navigation (image_set.rs)
/// - Shared data structures (data.rs)
/// - User settings persisted as JSON (settings.rs)
/// - The per-image Clean/Dirty session and flushing (session.rs)

pub mod data;
pub mod image_set;
pub mod session;
pub mod settings;
