// src/services/mod.rs
pub mod bond;
pub mod calculations;
pub mod clock;
pub mod db;
pub mod fetch;
pub mod index;
pub mod normalize;
pub mod pipeline;
pub mod supabase;
pub mod sync;
pub mod table;
