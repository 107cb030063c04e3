pub mod catalog;
pub mod earning;
pub mod proof;
pub mod task;
pub mod worker;
