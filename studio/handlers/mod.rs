pub mod controls;
pub mod downloads;
pub mod events;
pub mod graph;
pub mod training;
pub mod uploads;
