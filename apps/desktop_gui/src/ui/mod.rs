//! UI layer: document dropdown, row modal, and upload form.

pub mod app;

pub use app::DocPickApp;
