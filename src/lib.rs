pub mod config;
pub mod events;
pub mod geometry;
pub mod gui;
pub mod sys;
