pub mod component;
pub mod day;
pub mod interval;
pub mod period;
pub mod series;
pub mod source;
