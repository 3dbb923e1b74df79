pub mod alerts;
pub mod detail;
pub mod legend;
pub mod world_map;
