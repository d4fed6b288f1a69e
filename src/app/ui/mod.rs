//! Window panels rendered by the app.

pub mod panels;
