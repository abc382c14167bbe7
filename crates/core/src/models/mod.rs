pub mod chart;
pub mod chat;
pub mod credits;
pub mod geometry;
pub mod selection;
pub mod series;
pub mod session;
pub mod symbol;
