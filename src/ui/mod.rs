pub mod growth;
pub mod panels;
pub mod plot;
