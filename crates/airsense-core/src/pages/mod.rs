//! Full-screen pages shown on the board display

pub mod error;
pub mod readings;

pub use error::ErrorPage;
pub use readings::ReadingsPage;
