//! UI layer for the announcement board: one window, rendered per screen.

pub mod app;

pub use app::BoardApp;
