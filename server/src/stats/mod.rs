pub mod action;
pub mod aggregate;
pub mod chart;
pub mod encoder;
pub mod form;
pub mod history;
pub mod record;
pub mod summary;
