pub mod gauge;
pub mod sub_tabs;
pub mod surface;
pub mod time_series;
