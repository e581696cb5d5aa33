pub mod list;
pub mod reset;
pub mod search;
pub mod sort;
pub mod status;
pub mod table;
pub mod toggle;
