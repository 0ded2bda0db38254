pub mod providers;
pub mod recommendations;
pub mod similarity;
pub mod similarity_log;
