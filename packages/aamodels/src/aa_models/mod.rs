pub mod wag;
