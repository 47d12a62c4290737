#![allow(non_snake_case)]

pub mod aa_models;
pub mod alphabet;
pub mod constants;
pub mod gtr;
pub mod utils;
