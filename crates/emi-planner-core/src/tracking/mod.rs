pub mod dashboard;
pub mod demo;
pub mod loan;
pub mod note;
pub mod reminder;
pub mod store;
