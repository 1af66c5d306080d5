pub mod parameters;
pub mod patient;
pub mod regimen;
