pub mod config;
pub mod consts;
pub mod controller;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod io;
pub mod render;
pub mod selection;
pub mod text_box;
pub mod transform;
pub mod viewport;
pub mod worker;
